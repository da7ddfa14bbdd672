//! Interval algebra over absolute time spans.
//!
//! Presence data is noisy: intervals overlap, repeat and run past the
//! shift. Everything that sums minutes goes through [`merge_spans`] first
//! so overlapping time is only ever counted once.

use chrono::{Duration, NaiveDateTime};

/// A half-open span of absolute time, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    /// Inclusive start.
    pub start: NaiveDateTime,
    /// Exclusive end.
    pub end: NaiveDateTime,
}

impl Span {
    /// Creates a span. An end before the start yields an empty span at `start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Creates a span from a start and a length in minutes.
    pub fn from_minutes(start: NaiveDateTime, minutes: i64) -> Self {
        Self::new(start, start + Duration::minutes(minutes.max(0)))
    }

    /// Returns true if the span covers no time.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Length of the span.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// The part of the span inside `[lower, upper)`, if any.
    pub fn clip(&self, lower: NaiveDateTime, upper: NaiveDateTime) -> Option<Span> {
        let clipped = Span::new(self.start.max(lower), self.end.min(upper));
        (!clipped.is_empty()).then_some(clipped)
    }
}

/// Merges spans into a sorted list of disjoint, non-empty spans.
pub fn merge_spans(mut spans: Vec<Span>) -> Vec<Span> {
    spans.retain(|s| !s.is_empty());
    spans.sort();

    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

/// Removes `cut` from every span, splitting spans it falls inside.
pub fn subtract_span(spans: &[Span], cut: Span) -> Vec<Span> {
    let mut result = Vec::with_capacity(spans.len() + 1);
    for span in spans {
        if cut.end <= span.start || cut.start >= span.end {
            result.push(*span);
            continue;
        }
        if span.start < cut.start {
            result.push(Span::new(span.start, cut.start));
        }
        if cut.end < span.end {
            result.push(Span::new(cut.end, span.end));
        }
    }
    result
}

/// Total whole minutes covered by already-disjoint spans.
pub fn total_minutes(spans: &[Span]) -> i64 {
    spans
        .iter()
        .fold(Duration::zero(), |acc, s| acc + s.duration())
        .num_minutes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_new_never_inverts() {
        let span = Span::new(at(10, 0), at(9, 0));
        assert!(span.is_empty());
        assert_eq!(span.duration(), Duration::zero());
    }

    #[test]
    fn test_clip_inside_and_outside() {
        let span = Span::new(at(8, 0), at(10, 0));
        assert_eq!(span.clip(at(9, 0), at(17, 0)), Some(Span::new(at(9, 0), at(10, 0))));
        assert_eq!(span.clip(at(10, 0), at(17, 0)), None);
    }

    #[test]
    fn test_merge_overlapping_and_touching() {
        let merged = merge_spans(vec![
            Span::new(at(12, 0), at(12, 30)),
            Span::new(at(9, 0), at(10, 0)),
            Span::new(at(9, 30), at(11, 0)),
            Span::new(at(11, 0), at(11, 15)),
            Span::new(at(13, 0), at(13, 0)),
        ]);
        assert_eq!(
            merged,
            vec![
                Span::new(at(9, 0), at(11, 15)),
                Span::new(at(12, 0), at(12, 30)),
            ]
        );
        assert_eq!(total_minutes(&merged), 165);
    }

    #[test]
    fn test_subtract_splits_span() {
        let spans = vec![Span::new(at(12, 0), at(14, 0))];
        let result = subtract_span(&spans, Span::new(at(13, 0), at(13, 30)));
        assert_eq!(
            result,
            vec![
                Span::new(at(12, 0), at(13, 0)),
                Span::new(at(13, 30), at(14, 0)),
            ]
        );
        assert_eq!(total_minutes(&result), 90);
    }

    #[test]
    fn test_subtract_disjoint_cut_is_noop() {
        let spans = vec![Span::new(at(12, 0), at(13, 0))];
        assert_eq!(subtract_span(&spans, Span::new(at(14, 0), at(15, 0))), spans);
    }

    #[test]
    fn test_total_minutes_truncates_seconds() {
        let start = at(9, 0);
        let span = Span::new(start, start + Duration::seconds(150));
        assert_eq!(total_minutes(&[span]), 2);
    }
}
