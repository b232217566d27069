//! Overlap indexing between two chunkings of the same text
//!
//! Both chunk lists are sorted by span and swept together with a monotonic
//! source pointer, so documents with tens of thousands of chunks stay
//! near-linearithmic: sort dominates, and each target only examines the
//! sources whose spans can still intersect it.

use smallvec::SmallVec;

use super::types::{OverlapRecord, SourceChunk, Span, TargetChunk};

fn span_order(a: &Span, a_id: &str, b: &Span, b_id: &str) -> std::cmp::Ordering {
    (a.start, a.end, a_id).cmp(&(b.start, b.end, b_id))
}

/// For every target chunk, find all source chunks whose spans overlap it.
///
/// Returns one record list per target, in target input order; records within
/// a list follow source span order. The overlap fraction is the share of the
/// *target* span covered by the intersection.
pub fn index_overlaps(sources: &[SourceChunk], targets: &[TargetChunk]) -> Vec<Vec<OverlapRecord>> {
    let mut source_order: Vec<usize> = (0..sources.len()).collect();
    source_order
        .sort_unstable_by(|&a, &b| span_order(&sources[a].span, &sources[a].id, &sources[b].span, &sources[b].id));

    let mut target_order: Vec<usize> = (0..targets.len()).collect();
    target_order
        .sort_unstable_by(|&a, &b| span_order(&targets[a].span, &targets[a].id, &targets[b].span, &targets[b].id));

    let mut results: Vec<Vec<OverlapRecord>> = vec![Vec::new(); targets.len()];
    let mut low = 0;

    for &t in &target_order {
        let target = &targets[t];

        // Sources ending at or before this target can never overlap a later
        // target either; the pointer only moves forward.
        while low < source_order.len() && sources[source_order[low]].span.end <= target.span.start {
            low += 1;
        }

        let mut candidates: SmallVec<[usize; 8]> = SmallVec::new();
        for &s in &source_order[low..] {
            let source = &sources[s];
            if source.span.start >= target.span.end {
                break;
            }
            if source.span.overlaps(&target.span) {
                candidates.push(s);
            }
        }

        results[t] = candidates
            .iter()
            .filter_map(|&s| {
                let source = &sources[s];
                let overlap = source.span.intersect(&target.span)?;
                Some(OverlapRecord {
                    source_id: source.id.clone(),
                    target_id: target.id.clone(),
                    overlap,
                    fraction: overlap.len() as f64 / target.span.len() as f64,
                })
            })
            .collect();
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ChunkAttributes;

    fn source(id: &str, start: usize, end: usize) -> SourceChunk {
        SourceChunk {
            id: id.to_string(),
            span: Span::new(start, end),
            attributes: ChunkAttributes::default(),
        }
    }

    fn target(id: &str, start: usize, end: usize) -> TargetChunk {
        TargetChunk {
            id: id.to_string(),
            span: Span::new(start, end),
            text: String::new(),
        }
    }

    #[test]
    fn fractions_cover_the_target_share() {
        // Mirrors the two-source straddle: A=[0,50) B=[40,100), T=[30,70)
        let sources = vec![source("a", 0, 50), source("b", 40, 100)];
        let targets = vec![target("t", 30, 70)];
        let records = &index_overlaps(&sources, &targets)[0];
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_id, "a");
        assert_eq!(records[0].overlap, Span::new(30, 50));
        assert!((records[0].fraction - 0.5).abs() < f64::EPSILON);
        assert_eq!(records[1].source_id, "b");
        assert_eq!(records[1].overlap, Span::new(40, 70));
        assert!((records[1].fraction - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn touching_spans_do_not_overlap() {
        let sources = vec![source("a", 0, 30)];
        let targets = vec![target("t", 30, 60)];
        assert!(index_overlaps(&sources, &targets)[0].is_empty());
    }

    #[test]
    fn results_keep_target_input_order() {
        let sources = vec![source("a", 0, 100)];
        let targets = vec![target("late", 60, 80), target("early", 10, 20)];
        let results = index_overlaps(&sources, &targets);
        assert_eq!(results[0][0].target_id, "late");
        assert_eq!(results[1][0].target_id, "early");
    }

    #[test]
    fn pointer_does_not_skip_long_straddling_sources() {
        // A long source spans many targets; short dead sources in between
        // must not stall or hide it.
        let sources = vec![source("long", 0, 1000), source("dead", 5, 10), source("mid", 400, 450)];
        let targets = vec![target("t1", 20, 30), target("t2", 420, 430), target("t3", 900, 950)];
        let results = index_overlaps(&sources, &targets);
        assert_eq!(results[0].len(), 1);
        assert_eq!(results[1].len(), 2);
        assert_eq!(results[2].len(), 1);
        assert_eq!(results[1][0].source_id, "long");
        assert_eq!(results[1][1].source_id, "mid");
    }

    #[test]
    fn contained_target_has_fraction_one() {
        let sources = vec![source("a", 0, 100)];
        let targets = vec![target("t", 20, 40)];
        let records = &index_overlaps(&sources, &targets)[0];
        assert_eq!(records[0].fraction, 1.0);
    }
}
