//! Splitting long replies to fit the host platform's message ceiling.

/// Split `text` into consecutive chunks of at most `limit` characters.
///
/// Concatenating the chunks in order reproduces `text` exactly. The result
/// is never empty: the empty string yields a single empty chunk, so callers
/// always have at least one message to deliver. Splitting happens on char
/// boundaries, keeping every chunk valid UTF-8.
pub fn split(text: &str, limit: usize) -> Vec<String> {
    assert!(limit > 0, "chunk limit must be positive");

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        if count == limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    chunks.push(current);

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenation_reproduces_input() {
        for limit in [1, 2, 7, 1900] {
            for text in ["", "a", "hello world", "line\nbreaks and  spaces"] {
                let chunks = split(text, limit);
                assert!(!chunks.is_empty());
                assert_eq!(chunks.concat(), text);
                for chunk in &chunks {
                    assert!(chunk.chars().count() <= limit);
                }
            }
        }
    }

    #[test]
    fn empty_string_yields_one_empty_chunk() {
        assert_eq!(split("", 1900), vec![String::new()]);
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_chunk() {
        assert_eq!(split("aaaa", 2), vec!["aa".to_string(), "aa".to_string()]);
    }

    #[test]
    fn splits_on_char_boundaries() {
        let chunks = split("日本語のテキスト", 3);
        assert_eq!(chunks, vec!["日本語", "のテキ", "スト"]);
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        assert_eq!(split("4", 1900), vec!["4".to_string()]);
    }
}
