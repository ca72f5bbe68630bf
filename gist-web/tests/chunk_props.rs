//! Property tests for the sentence chunker.

use gist_web::{chunk_text, split_sentences};
use proptest::prelude::*;

/// Sentences of lowercase words, each closed by 1-3 terminators, joined by
/// single spaces.
fn prose() -> impl Strategy<Value = String> {
    let word = "[a-z]{1,12}";
    let sentence = (
        prop::collection::vec(word, 1..15),
        prop::sample::select(vec![".", "!", "?", "...", "?!"]),
    )
        .prop_map(|(words, end)| format!("{}{}", words.join(" "), end));
    prop::collection::vec(sentence, 0..40).prop_map(|s| s.join(" "))
}

proptest! {
    #[test]
    fn chunks_respect_budget_unless_single_sentence(text in prose(), max_len in 1usize..300) {
        for chunk in chunk_text(&text, max_len) {
            let len = chunk.chars().count();
            if len > max_len {
                prop_assert_eq!(split_sentences(&chunk).len(), 1, "oversized chunk {:?}", chunk);
            }
        }
    }

    #[test]
    fn chunks_reassemble_every_sentence_in_order(text in prose(), max_len in 1usize..300) {
        let chunks = chunk_text(&text, max_len);
        let rejoined = chunks.join(" ");
        let expected: String = split_sentences(&text).concat();
        prop_assert_eq!(rejoined, expected.trim());
    }

    #[test]
    fn no_sentence_is_split_across_chunks(text in prose(), max_len in 1usize..300) {
        let from_chunks: Vec<String> = chunk_text(&text, max_len)
            .iter()
            .flat_map(|c| split_sentences(c).into_iter().map(|s| s.trim().to_string()).collect::<Vec<_>>())
            .collect();
        let from_text: Vec<String> = split_sentences(&text)
            .into_iter()
            .map(|s| s.trim().to_string())
            .collect();
        prop_assert_eq!(from_chunks, from_text);
    }
}
