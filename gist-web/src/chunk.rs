//! Sentence-aligned chunking under a character budget.
//!
//! Sentences are runs of non-terminator characters followed by one or more
//! of `.`, `!`, `?`. Chunks are built greedily from whole sentences, so a
//! chunk only exceeds the budget when a single sentence does, and then it
//! carries that sentence alone and intact.
//!
//! Text with no terminal punctuation has no sentences and yields no chunks;
//! text after the last terminator is not part of any sentence.

use std::sync::LazyLock;

use gist_common::PipelineMode;
use regex::Regex;

static SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?]+[.!?]+").expect("sentence pattern is a valid literal"));

/// Split `text` into sentence-like units, in order, leading whitespace kept.
///
/// ```
/// use gist_web::split_sentences;
///
/// assert_eq!(
///     split_sentences("Hi there! Ready?? Go. trailing"),
///     vec!["Hi there!", " Ready??", " Go."]
/// );
/// ```
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Greedily pack whole sentences into chunks of at most `max_len` characters.
///
/// ```
/// use gist_web::chunk_text;
///
/// let chunks = chunk_text("One. Two. Three.", 10);
/// assert_eq!(chunks, vec!["One. Two.", "Three."]);
/// ```
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in split_sentences(text) {
        let len = sentence.chars().count();
        if current_len + len <= max_len {
            current.push_str(sentence);
            current_len += len;
        } else {
            push_trimmed(&mut chunks, &current);
            current = sentence.to_string();
            current_len = len;
        }
    }
    push_trimmed(&mut chunks, &current);
    chunks
}

fn push_trimmed(chunks: &mut Vec<String>, buf: &str) {
    let trimmed = buf.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Chunking policy for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    max_len: usize,
}

impl Chunker {
    pub const STRUCTURED_MAX: usize = 500;
    pub const FLAT_MAX: usize = 4000;

    /// A budget of zero is treated as one character.
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
        }
    }

    pub fn for_mode(mode: PipelineMode) -> Self {
        match mode {
            PipelineMode::Structured => Self::new(Self::STRUCTURED_MAX),
            PipelineMode::Flat => Self::new(Self::FLAT_MAX),
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        chunk_text(text, self.max_len)
    }

    /// Only the first chunk; `None` when the text has no sentences.
    pub fn first_chunk(&self, text: &str) -> Option<String> {
        self.chunk(text).into_iter().next()
    }
}
