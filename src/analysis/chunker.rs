//! Word-bounded document chunking.
//!
//! Splits extracted text into chunks of at most `chunk_words`
//! whitespace-delimited words. Boundaries fall on word boundaries only,
//! chunks are produced lazily, and whitespace-only input yields nothing.

/// Lazy iterator over word-bounded chunks of `text`.
pub fn word_chunks(text: &str, chunk_words: usize) -> WordChunks<'_> {
    WordChunks {
        words: text.split_whitespace(),
        // A zero chunk size would yield empty chunks forever; clamp to 1.
        chunk_words: chunk_words.max(1),
    }
}

pub struct WordChunks<'a> {
    words: std::str::SplitWhitespace<'a>,
    chunk_words: usize,
}

impl<'a> Iterator for WordChunks<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut chunk = String::new();
        for _ in 0..self.chunk_words {
            match self.words.next() {
                Some(word) => {
                    if !chunk.is_empty() {
                        chunk.push(' ');
                    }
                    chunk.push_str(word);
                }
                None => break,
            }
        }
        if chunk.is_empty() {
            None
        } else {
            Some(chunk)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_words_in_chunks_of_two() {
        let chunks: Vec<String> = word_chunks("a b c d e", 2).collect();
        assert_eq!(chunks, vec!["a b", "c d", "e"]);
    }

    #[test]
    fn test_chunk_count_is_ceil_of_words_over_size() {
        for (word_count, chunk_size) in [(1, 1), (7, 3), (10, 3), (9, 3), (100, 7)] {
            let text = vec!["w"; word_count].join(" ");
            let chunks: Vec<String> = word_chunks(&text, chunk_size).collect();
            assert_eq!(chunks.len(), word_count.div_ceil(chunk_size));
            assert!(chunks
                .iter()
                .all(|c| c.split_whitespace().count() <= chunk_size));
        }
    }

    #[test]
    fn test_concatenation_reconstructs_word_sequence() {
        let text = "the quick  brown\tfox\njumps over the lazy dog";
        let rejoined = word_chunks(text, 3).collect::<Vec<_>>().join(" ");
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined.split_whitespace().collect::<Vec<_>>(), original);
    }

    #[test]
    fn test_empty_and_whitespace_only_text_yield_no_chunks() {
        assert_eq!(word_chunks("", 10).count(), 0);
        assert_eq!(word_chunks("   \n\t  ", 10).count(), 0);
    }

    #[test]
    fn test_chunk_size_larger_than_text_yields_single_chunk() {
        let chunks: Vec<String> = word_chunks("a b c", 100).collect();
        assert_eq!(chunks, vec!["a b c"]);
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let chunks: Vec<String> = word_chunks("a b", 0).collect();
        assert_eq!(chunks, vec!["a", "b"]);
    }
}
