//! Page acquisition and content extraction.
//!
//! - Single-attempt page fetcher over `gist-http` (`fetch`)
//! - Noise stripping on a permissively parsed DOM (`normalize`)
//! - Content location by selector priority or heading sections (`locate`)
//! - Sentence-aligned, length-bounded chunking (`chunk`)
//! - Whitespace and word helpers shared by the above (`text`)

pub mod chunk;
pub mod fetch;
pub mod locate;
pub mod normalize;
pub mod text;

pub use chunk::{Chunker, chunk_text, split_sentences};
pub use fetch::{FetchedPage, HttpPageFetcher, PageFetcher, validate_url};
pub use locate::{Extraction, Strategy, extract};
pub use normalize::normalize;
