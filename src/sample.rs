//! Bounded head/middle/tail sampling of oversized files.
//!
//! Downstream consumers (the summarization collaborator) have input-size
//! limits; for files over the line budget this produces three
//! representative slices. Slice boundaries are snapped inward so no slice
//! starts or ends inside an extracted unit's line range - a function is
//! either whole in a slice or absent. Snapping inward (shrinking) keeps
//! every slice within its cap. With no unit boundaries available the cuts
//! are raw line cuts.

use serde::{Deserialize, Serialize};

use crate::inventory::SourceFile;
use crate::model::{flatten, Span, StructuralUnit};

/// One contiguous slice of a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slice {
    pub span: Span,
    pub text: String,
}

/// Head/middle/tail slices of one oversized file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub file: String,
    pub total_lines: usize,
    pub head: Slice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle: Option<Slice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail: Option<Slice>,
}

impl Sample {
    /// Total sampled line count across all present slices.
    pub fn sampled_lines(&self) -> usize {
        let count = |s: &Slice| s.span.end_line - s.span.start_line + 1;
        count(&self.head)
            + self.middle.as_ref().map(|s| count(s)).unwrap_or(0)
            + self.tail.as_ref().map(|s| count(s)).unwrap_or(0)
    }
}

/// Sample a file against a line budget.
///
/// Returns None when the file fits the budget. Deterministic for a given
/// file, unit list, and budget.
pub fn sample(file: &SourceFile, units: &[StructuralUnit], budget_lines: usize) -> Option<Sample> {
    let total = file.line_count();
    if total <= budget_lines {
        return None;
    }

    let per_slice = (budget_lines / 3).max(1);
    let spans: Vec<Span> = flatten(units).iter().map(|u| u.span).collect();

    // Head: [1, h], h snapped down so it does not end inside a unit.
    let mut head_end = per_slice.min(total);
    loop {
        match spans
            .iter()
            .find(|s| head_end >= s.start_line && head_end < s.end_line)
        {
            Some(s) if s.start_line > 1 => head_end = s.start_line - 1,
            Some(_) => {
                // A unit starts at line 1 and extends past the cap; fall
                // back to a raw cut.
                head_end = per_slice.min(total);
                break;
            }
            None => break,
        }
    }

    // Tail: [t, total], t snapped up so it does not start inside a unit.
    let mut tail_start = total.saturating_sub(per_slice) + 1;
    loop {
        match spans
            .iter()
            .find(|s| tail_start > s.start_line && tail_start <= s.end_line)
        {
            Some(s) if s.end_line < total => tail_start = s.end_line + 1,
            Some(_) => {
                tail_start = total.saturating_sub(per_slice) + 1;
                break;
            }
            None => break,
        }
    }
    let tail = if tail_start > head_end {
        Some(slice(file, tail_start, total))
    } else {
        None
    };

    // Middle: centered on the midpoint, clamped strictly between head and
    // tail, both ends snapped inward.
    let middle = {
        let half = per_slice / 2;
        let mid = total / 2;
        let mut start = mid.saturating_sub(half).max(head_end + 1);
        let mut end = (start + per_slice - 1).min(tail_start.saturating_sub(1));

        while let Some(s) = spans
            .iter()
            .find(|s| start > s.start_line && start <= s.end_line)
        {
            start = s.end_line + 1;
        }
        while end >= start {
            match spans
                .iter()
                .find(|s| end >= s.start_line && end < s.end_line)
            {
                Some(s) => end = s.start_line.saturating_sub(1),
                None => break,
            }
        }

        if start <= end && end < tail_start && start > head_end {
            Some(slice(file, start, end))
        } else {
            None
        }
    };

    Some(Sample {
        file: file.path.clone(),
        total_lines: total,
        head: slice(file, 1, head_end),
        middle,
        tail,
    })
}

fn slice(file: &SourceFile, start: usize, end: usize) -> Slice {
    let span = Span::new(start, end);
    Slice {
        text: span.text(file),
        span,
    }
}
