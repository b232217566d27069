//! Offset-preserving text folding for fuzzy comparison
//!
//! Re-extraction introduces differences that defeat literal search: smart
//! quotes, dash variants, soft hyphens, hyphenated line breaks, case drift,
//! reflowed whitespace. `FoldedText` normalizes all of these while recording,
//! for every folded character, the byte range it came from in the original
//! text, so any window over the folded text maps back to an exact span.

use super::types::Span;

/// Characters the fold treats as quote-like, mapped to a single class.
fn is_quote(ch: char) -> bool {
    matches!(
        ch,
        '"' | '\'' | '`' | '\u{00B4}' | '\u{2018}'..='\u{201F}'
    )
}

/// Dash variants (hyphen, en/em dash, horizontal bar, minus), one class.
fn is_dash(ch: char) -> bool {
    matches!(ch, '-' | '\u{2010}'..='\u{2015}' | '\u{2212}')
}

/// Fold one character to its comparison form.
///
/// Quotes collapse to `'`, dashes to `-`, letters to lowercase. Returns the
/// first character of the lowercase expansion; fuzzy comparison does not
/// need the rare multi-character expansions to be exact.
pub fn fold_char(ch: char) -> char {
    if is_quote(ch) {
        '\''
    } else if is_dash(ch) {
        '-'
    } else if ch.is_whitespace() {
        ' '
    } else {
        ch.to_lowercase().next().unwrap_or(ch)
    }
}

/// A normalized view of a text that maps every folded character back to the
/// byte range it covers in the original.
#[derive(Debug, Clone)]
pub struct FoldedText {
    chars: Vec<char>,
    /// Original byte range `(start, end)` of each folded character
    ranges: Vec<(usize, usize)>,
}

impl FoldedText {
    /// Fold `text`, collapsing whitespace runs, dropping soft hyphens and
    /// repairing hyphenated line breaks (`sug-\ngests` folds to `suggests`).
    pub fn fold(text: &str) -> Self {
        let mut chars = Vec::new();
        let mut ranges = Vec::new();
        let mut iter = text.char_indices().peekable();

        while let Some((start, ch)) = iter.next() {
            let end = start + ch.len_utf8();

            // Soft hyphens only exist to break lines
            if ch == '\u{00AD}' {
                continue;
            }

            // A dash immediately followed by whitespace is line-break
            // hyphenation: drop the dash and the whitespace run after it
            if is_dash(ch) && iter.peek().is_some_and(|(_, next)| next.is_whitespace()) {
                while iter.peek().is_some_and(|(_, next)| next.is_whitespace()) {
                    iter.next();
                }
                continue;
            }

            if ch.is_whitespace() {
                // Collapse the whole run into one space
                let mut run_end = end;
                while let Some((next_start, next)) = iter.peek().copied() {
                    if !next.is_whitespace() {
                        break;
                    }
                    run_end = next_start + next.len_utf8();
                    iter.next();
                }
                // Leading whitespace folds away entirely
                if !chars.is_empty() {
                    chars.push(' ');
                    ranges.push((start, run_end));
                }
                continue;
            }

            chars.push(fold_char(ch));
            ranges.push((start, end));
        }

        // Trailing collapsed whitespace carries no signal
        if chars.last() == Some(&' ') {
            chars.pop();
            ranges.pop();
        }

        Self { chars, ranges }
    }

    /// Folded characters
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Number of folded characters
    pub fn char_len(&self) -> usize {
        self.chars.len()
    }

    /// Original byte span covered by folded characters `[start, end)`.
    ///
    /// `start < end <= char_len()` must hold.
    pub fn byte_span(&self, start: usize, end: usize) -> Span {
        Span::new(self.ranges[start].0, self.ranges[end - 1].1)
    }

    /// Folded character range covered by an original byte span: the first
    /// folded char starting at or after `span.start` through the last one
    /// ending at or before `span.end`.
    pub fn char_range(&self, span: &Span) -> (usize, usize) {
        let start = self.ranges.partition_point(|&(s, _)| s < span.start);
        let end = self.ranges.partition_point(|&(_, e)| e <= span.end);
        (start, end.max(start))
    }

    /// First occurrence of `needle` within folded chars `[from, to)`.
    pub fn find_within(&self, needle: &[char], from: usize, to: usize) -> Option<usize> {
        if needle.is_empty() || to > self.chars.len() || from >= to {
            return None;
        }
        let window = to - from;
        if needle.len() > window {
            return None;
        }
        (from..=to - needle.len()).find(|&i| self.chars[i..i + needle.len()] == *needle)
    }
}
