//! Splitting page text into fixed-size overlapping windows.

/// Splits one page of text into windows of at most `chunk_size` characters,
/// with consecutive windows sharing exactly `overlap` characters.
///
/// Sizes are counted in characters, not bytes, so multi-byte text never gets
/// cut mid-codepoint. Whitespace-only input yields no chunks. The final
/// window may be shorter than `chunk_size` but still starts `overlap`
/// characters before the previous window's end, so context at a chunk
/// boundary is never lost.
pub fn split_page(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    assert!(overlap < chunk_size, "overlap must be smaller than chunk size");

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start = end - overlap;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: usize = 1000;
    const OVERLAP: usize = 100;

    #[test]
    fn short_text_is_a_single_chunk() {
        let text = "Apple Inc. reported revenue of $100B in 2024.";
        let chunks = split_page(text, SIZE, OVERLAP);
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn text_of_exactly_chunk_size_is_a_single_chunk() {
        let text = "x".repeat(SIZE);
        let chunks = split_page(&text, SIZE, OVERLAP);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chars().count(), SIZE);
    }

    #[test]
    fn every_chunk_is_within_the_size_limit() {
        let text = "lorem ipsum dolor sit amet ".repeat(200);
        for chunk in split_page(&text, SIZE, OVERLAP) {
            assert!(chunk.chars().count() <= SIZE);
        }
    }

    #[test]
    fn consecutive_chunks_overlap_by_exactly_one_hundred_characters() {
        let text: String = ('a'..='z').cycle().take(3210).collect();
        let chunks = split_page(&text, SIZE, OVERLAP);
        assert!(chunks.len() > 1);

        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let next: Vec<char> = pair[1].chars().collect();
            let tail: String = prev[prev.len() - OVERLAP..].iter().collect();
            let head: String = next[..OVERLAP].iter().collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn multibyte_text_never_splits_a_codepoint() {
        let text = "áéíóú€ñ".repeat(400);
        let chunks = split_page(&text, SIZE, OVERLAP);
        assert!(chunks.len() > 1);
        // Reconstructing with the overlap removed gives back the original.
        let mut rebuilt: String = chunks[0].clone();
        for chunk in &chunks[1..] {
            let chars: Vec<char> = chunk.chars().collect();
            rebuilt.extend(chars[OVERLAP..].iter());
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn whitespace_only_text_yields_nothing() {
        assert!(split_page("", SIZE, OVERLAP).is_empty());
        assert!(split_page("   \n\t  ", SIZE, OVERLAP).is_empty());
    }
}
