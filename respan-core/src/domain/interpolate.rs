//! Nearest-neighbor fallback
//!
//! When no tier matches an annotation and when no source chunk overlaps a
//! target, the result is interpolated from the nearest reference item rather
//! than discarded: downstream consumers must always receive something they
//! can surface for manual review.

use super::types::Span;

/// Pick the reference item nearest to `target` by offset gap.
///
/// Items starting at or before the target count as preceding (gap measured
/// from their end), the rest as following (gap measured to their start).
/// Ties break toward the preceding item. Returns `None` only for an empty
/// reference list.
pub fn nearest<'a, T>(items: &'a [(Span, T)], target: &Span) -> Option<&'a T> {
    let mut preceding: Option<(usize, &T)> = None;
    let mut following: Option<(usize, &T)> = None;

    for (span, item) in items {
        if span.start <= target.start {
            let gap = target.start.saturating_sub(span.end);
            if preceding.as_ref().map_or(true, |&(g, _)| gap <= g) {
                preceding = Some((gap, item));
            }
        } else {
            let gap = span.start.saturating_sub(target.end);
            if following.as_ref().map_or(true, |&(g, _)| gap < g) {
                following = Some((gap, item));
            }
        }
    }

    match (preceding, following) {
        (Some((pg, p)), Some((fg, _))) if pg <= fg => Some(p),
        (Some(_), Some((_, f))) => Some(f),
        (Some((_, p)), None) => Some(p),
        (None, Some((_, f))) => Some(f),
        (None, None) => None,
    }
}

/// Estimate where a lost span would land, given the displacement observed on
/// a recovered neighbor.
///
/// The old span is shifted by `shift`, clamped into the revised document and
/// snapped outward to character boundaries. Returns `None` when the estimate
/// collapses to nothing inside the document.
pub fn shifted_span(text: &str, old_span: &Span, shift: isize) -> Option<Span> {
    let len = text.len();
    let start = old_span.start as isize + shift;
    let start = start.clamp(0, len as isize) as usize;
    let end = (start + old_span.len()).min(len);

    let mut start = start;
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = end;
    while end < len && !text.is_char_boundary(end) {
        end += 1;
    }

    (start < end).then_some(Span::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<(Span, &'static str)> {
        vec![
            (Span::new(0, 10), "first"),
            (Span::new(20, 30), "second"),
            (Span::new(100, 120), "third"),
        ]
    }

    #[test]
    fn picks_the_nearer_side() {
        let refs = items();
        // 35..40 is 5 past "second" and 60 before "third"
        assert_eq!(nearest(&refs, &Span::new(35, 40)), Some(&"second"));
        // 95..98 is 65 past "second" and 2 before "third"
        assert_eq!(nearest(&refs, &Span::new(95, 98)), Some(&"third"));
    }

    #[test]
    fn ties_break_toward_preceding() {
        let refs = vec![(Span::new(0, 10), "before"), (Span::new(25, 30), "after")];
        // Gap of 5 on both sides
        assert_eq!(nearest(&refs, &Span::new(15, 20)), Some(&"before"));
    }

    #[test]
    fn target_before_everything_takes_the_following_item() {
        let refs = items();
        assert_eq!(nearest(&refs[1..], &Span::new(0, 5)), Some(&"second"));
        assert_eq!(nearest::<&str>(&[], &Span::new(0, 5)), None);
    }

    #[test]
    fn shifted_span_clamps_to_document() {
        let text = "0123456789";
        assert_eq!(shifted_span(text, &Span::new(2, 5), 3), Some(Span::new(5, 8)));
        assert_eq!(shifted_span(text, &Span::new(2, 5), -10), Some(Span::new(0, 3)));
        assert_eq!(shifted_span(text, &Span::new(8, 12), 0), Some(Span::new(8, 10)));
        assert_eq!(shifted_span(text, &Span::new(8, 12), 100), None);
    }

    #[test]
    fn shifted_span_snaps_to_char_boundaries() {
        let text = "aé\u{00E9}bc"; // multi-byte characters at 1..3 and 3..5
        let estimated = shifted_span(text, &Span::new(0, 2), 2).unwrap();
        assert!(text.is_char_boundary(estimated.start));
        assert!(text.is_char_boundary(estimated.end));
        assert!(!estimated.is_empty());
    }
}
