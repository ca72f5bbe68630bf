//! Strip non-content markup from a parsed page.
//!
//! Parsing goes through `scraper` (html5ever), which tolerates unknown and
//! unbalanced tags and repairs the tree the way browsers do, so there is no
//! failure mode here: the worst case is an empty document.

use scraper::node::Element;
use scraper::{Html, Node};

/// Elements removed outright, with everything inside them.
const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "iframe", "aside",
];

/// Case-insensitive substrings of `class`/`id` marking ads, sidebars and menus.
const NOISE_MARKERS: &[&str] = &["advert", "sidebar", "menu"];

/// Whole class tokens that mark navigation or ad slots. Matched as tokens
/// because as substrings they hit words like "canvas" or "header".
const NOISE_CLASS_TOKENS: &[&str] = &["nav", "ad", "ads"];

/// Structural roots that are never removed, whatever their class says.
const PROTECTED_TAGS: &[&str] = &["html", "head", "body", "main", "article"];

/// Parse `html` and detach every noise subtree.
///
/// ```
/// use gist_web::normalize;
///
/// let doc = normalize("<body><nav>Home</nav><script>x()</script><p>Story.</p></body>");
/// let text: String = doc.root_element().text().collect();
/// assert_eq!(text.trim(), "Story.");
/// ```
pub fn normalize(html: &str) -> Html {
    let mut doc = Html::parse_document(html);
    let removed = strip_noise(&mut doc);
    tracing::debug!(target: "gist.extract", removed, "normalize.stripped");
    doc
}

/// Detach noise subtrees from an already parsed document.
///
/// Returns how many subtrees were removed; nested noise inside a removed
/// subtree is not counted separately.
pub fn strip_noise(doc: &mut Html) -> usize {
    let doomed: Vec<_> = doc
        .tree
        .root()
        .descendants()
        .filter(|node| is_noise_node(node.value()))
        .filter(|node| !node.ancestors().any(|a| is_noise_node(a.value())))
        .map(|node| node.id())
        .collect();

    let mut removed = 0;
    for id in doomed {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
            removed += 1;
        }
    }
    removed
}

fn is_noise_node(node: &Node) -> bool {
    node.as_element().is_some_and(is_noise_element)
}

fn is_noise_element(el: &Element) -> bool {
    let name = el.name();
    if PROTECTED_TAGS.contains(&name) {
        return false;
    }
    if NOISE_TAGS.contains(&name) {
        return true;
    }

    let class = el.attr("class").unwrap_or("").to_ascii_lowercase();
    let id = el.attr("id").unwrap_or("").to_ascii_lowercase();
    if NOISE_MARKERS
        .iter()
        .any(|m| class.contains(m) || id.contains(m))
    {
        return true;
    }
    class
        .split_whitespace()
        .any(|token| NOISE_CLASS_TOKENS.contains(&token))
}
