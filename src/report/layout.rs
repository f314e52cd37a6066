//! Text layout for the summary and transcript pages.
//!
//! Wrapping is fixed-width character slicing, so page contents and counts
//! depend only on the input text.

use crate::models::Turn;

/// Header line opening the first transcript page
pub const TRANSCRIPT_HEADER: &str = "Conversation:";

/// Geometry of the transcript section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptLayout {
    /// Characters per wrapped line
    pub columns: usize,
    /// Wrapped lines per page, header excluded
    pub lines_per_page: usize,
}

impl Default for TranscriptLayout {
    fn default() -> Self {
        Self {
            columns: 80,
            lines_per_page: 58,
        }
    }
}

/// Slice `text` into `columns`-character pieces joined by newlines.
///
/// Existing newline characters are ordinary characters here: they count
/// toward the column and stay inside the piece they fall in.
pub fn hard_wrap(text: &str, columns: usize) -> String {
    let columns = columns.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(columns)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `"<ROLE>: <text>\n\n"` for every turn that carries text
pub fn transcript_stream(transcript: &[Turn]) -> String {
    let mut stream = String::new();
    for turn in transcript {
        if let Some(text) = turn.content.text() {
            stream.push_str(&turn.role.label());
            stream.push_str(": ");
            stream.push_str(&text);
            stream.push_str("\n\n");
        }
    }
    stream
}

/// Wrap the whole stream globally and split it into display lines
pub fn wrap_lines(stream: &str, columns: usize) -> Vec<String> {
    if stream.is_empty() {
        return Vec::new();
    }
    hard_wrap(stream, columns).split('\n').map(str::to_string).collect()
}

/// Cut `lines` into pages of `per_page` lines; only the last may be short
pub fn paginate(lines: &[String], per_page: usize) -> Vec<Vec<String>> {
    lines.chunks(per_page.max(1)).map(<[String]>::to_vec).collect()
}

/// Wrap each line of a short text block independently
pub fn wrap_block(text: &str, columns: usize) -> Vec<String> {
    text.split('\n')
        .flat_map(|line| {
            if line.is_empty() {
                vec![String::new()]
            } else {
                hard_wrap(line, columns).split('\n').map(str::to_string).collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_wrap_counts_newlines_as_columns() {
        assert_eq!(hard_wrap("ab\ncd", 3), "ab\n\ncd");
        assert_eq!(hard_wrap("abcdef", 3), "abc\ndef");
        assert_eq!(hard_wrap("", 3), "");
    }

    #[test]
    fn wrap_lines_is_character_based() {
        let lines = wrap_lines("héllo wörld", 4);
        assert_eq!(lines, vec!["héll", "o wö", "rld"]);
    }

    #[test]
    fn empty_stream_has_no_lines() {
        assert!(wrap_lines("", 80).is_empty());
        assert!(paginate(&[], 58).is_empty());
    }

    #[test]
    fn wrap_block_keeps_blank_lines() {
        assert_eq!(wrap_block("abcd\n\nx", 3), vec!["abc", "d", "", "x"]);
    }
}
