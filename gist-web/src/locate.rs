//! Locate the readable part of a normalized page.
//!
//! Two strategies:
//!
//! - [`Strategy::Selectors`]: probe a fixed, prioritized list of content
//!   region selectors and take the text of the first that yields any,
//!   falling back to the body.
//! - [`Strategy::Sections`]: split the page at `h1`-`h6` headings into
//!   titled sections, and also gather the text of every content region (or
//!   the body, when there are none) as the "main content" string.
//!
//! Text nodes are concatenated as written, so inline markup never splits a
//! word; block elements contribute a word break. All text leaving this
//! module is whitespace-normalized.

use std::collections::HashMap;
use std::sync::LazyLock;

use gist_common::Section;
use scraper::{ElementRef, Html, Node, Selector};

use crate::text::normalize_whitespace;

/// Content region selectors, highest priority first.
pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".blog-post",
    ".main-content",
    "main",
    "#main",
    ".content",
    "[role=\"main\"]",
];

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Elements whose boundaries separate words.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table", "td", "th", "tr", "ul",
];

static CONTENT: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    CONTENT_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
});
static ANY_CONTENT: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse(&CONTENT_SELECTORS.join(", ")).ok());
static HEADINGS: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse(&HEADING_TAGS.join(", ")).ok());
static BODY: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("body").ok());

/// Which locating strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Selectors,
    Sections,
}

/// Everything the pipeline needs from a page, as owned text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Heading sections in document order; always empty for `Selectors`.
    pub sections: Vec<Section>,
    /// Selected region text (`Selectors`) or concatenated regions (`Sections`),
    /// with the body text standing in when no region has any.
    pub main_content: String,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.main_content.is_empty()
    }

    /// Text the overview is generated from: main content when present,
    /// otherwise the first section's body.
    pub fn overview_source(&self) -> Option<&str> {
        if !self.main_content.is_empty() {
            return Some(&self.main_content);
        }
        self.sections.first().map(|s| s.summary.as_str())
    }

    /// Total characters of extracted text.
    pub fn content_length(&self) -> usize {
        if !self.main_content.is_empty() {
            return self.main_content.chars().count();
        }
        self.sections.iter().map(|s| s.summary.chars().count()).sum()
    }
}

/// Run `strategy` over an already normalized document.
pub fn extract(doc: &Html, strategy: Strategy) -> Extraction {
    let extraction = match strategy {
        Strategy::Selectors => Extraction {
            sections: Vec::new(),
            main_content: main_text(doc),
        },
        Strategy::Sections => Extraction {
            sections: sections(doc),
            main_content: Some(content_regions_text(doc))
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| body_text(doc)),
        },
    };
    tracing::debug!(
        target: "gist.extract",
        ?strategy,
        sections = extraction.sections.len(),
        main_chars = extraction.main_content.len(),
        "locate.done"
    );
    extraction
}

/// Text of the first content selector that matches anything with text.
///
/// Falls back to the body text, then to the whole document's text. The
/// result is empty only when the document has no text at all.
pub fn main_text(doc: &Html) -> String {
    for (selector, name) in CONTENT.iter().zip(CONTENT_SELECTORS) {
        let text = join_texts(doc.select(selector));
        if !text.is_empty() {
            tracing::trace!(target: "gist.extract", selector = name, "locate.selector_hit");
            return text;
        }
    }

    body_text(doc)
}

/// Text of `<body>`, or of the whole document when the body has none.
fn body_text(doc: &Html) -> String {
    let body = BODY
        .as_ref()
        .and_then(|sel| doc.select(sel).next())
        .map(element_text)
        .unwrap_or_default();
    if !body.is_empty() {
        return body;
    }
    element_text(doc.root_element())
}

/// Concatenated text of every content region, in document order, counting
/// nested matches once.
pub fn content_regions_text(doc: &Html) -> String {
    let Some(any) = ANY_CONTENT.as_ref() else {
        return String::new();
    };
    let outermost = doc.select(any).filter(|el| {
        !el.ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| any.matches(&a))
    });
    join_texts(outermost)
}

/// Heading-delimited sections in document order.
///
/// A section's body is the text of the nodes that follow its heading under
/// the same parent, up to the next heading of any level. Sections with an
/// empty title or body are dropped.
pub fn sections(doc: &Html) -> Vec<Section> {
    let Some(headings) = HEADINGS.as_ref() else {
        return Vec::new();
    };

    // Each parent's children flattened once; headings are located by index.
    let mut children_of = HashMap::new();
    let mut out = Vec::new();

    for heading in doc.select(headings) {
        let title = element_text(heading);
        if title.is_empty() {
            continue;
        }
        let Some(parent) = heading.parent() else {
            continue;
        };
        let siblings: &Vec<_> = children_of
            .entry(parent.id())
            .or_insert_with(|| parent.children().collect());
        let Some(start) = siblings.iter().position(|n| n.id() == heading.id()) else {
            continue;
        };

        let mut raw = String::new();
        for node in &siblings[start + 1..] {
            if is_heading(node.value()) {
                break;
            }
            match node.value() {
                Node::Text(t) => raw.push_str(t),
                _ => {
                    if let Some(el) = ElementRef::wrap(*node) {
                        push_text(el, &mut raw);
                    }
                }
            }
        }

        let body = normalize_whitespace(&raw);
        if body.is_empty() {
            continue;
        }
        out.push(Section::new(title, body));
    }
    out
}

fn is_heading(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|el| HEADING_TAGS.contains(&el.name()))
}

fn element_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(el, &mut raw);
    normalize_whitespace(&raw)
}

/// Append the raw text under `el`, padding block elements with spaces.
fn push_text(el: ElementRef<'_>, out: &mut String) {
    let block = BLOCK_TAGS.contains(&el.value().name());
    if block {
        out.push(' ');
    }
    for child in el.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            _ => {
                if let Some(inner) = ElementRef::wrap(child) {
                    push_text(inner, out);
                }
            }
        }
    }
    if block {
        out.push(' ');
    }
}

fn join_texts<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> String {
    elements
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
