//! Merging of raw recognition fragments into editable regions.
//!
//! Word-level recognizer output is too granular to edit meaningfully, so
//! fragments are regrouped into line-level units: first into line buckets by
//! vertical proximity, then merged left to right within each line wherever
//! the horizontal gap is small in absolute terms or relative to the text
//! size.

use tracing::debug;

use crate::geometry::Rect;

use super::region::Region;

/// Vertical tolerance, in native-space pixels, for assigning a fragment to
/// an existing line bucket. Sized for high-resolution rasterization where a
/// line of body text is tens of pixels tall.
pub const LINE_Y_TOLERANCE: f32 = 30.0;

/// Absolute horizontal gap, in native-space pixels, below which two
/// fragments on the same line merge.
pub const MERGE_GAP_ABSOLUTE: f32 = 50.0;

/// Relative threshold: fragments also merge when the gap is below this
/// factor times the taller of the two heights, which keeps large print
/// together even when the absolute threshold is too tight.
pub const MERGE_GAP_HEIGHT_FACTOR: f32 = 2.0;

/// A raw recognized text span with its bounding box, in native page
/// coordinates, prior to merging.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
    /// Recognizer confidence, when the fragment came from OCR.
    pub confidence: Option<f32>,
}

impl Fragment {
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            width,
            height,
            text: text.into(),
            confidence: None,
        }
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    #[inline]
    fn right(&self) -> f32 {
        self.x + self.width
    }
}

struct LineBucket {
    avg_y: f32,
    fragments: Vec<Fragment>,
}

/// Merges recognition fragments into editable regions.
///
/// # Algorithm
///
/// 1. **Line grouping**: each fragment joins the first bucket whose running
///    average y is within [`LINE_Y_TOLERANCE`]; the bucket's average is
///    updated as the incremental mean of its members' y values. Fragments
///    matching no bucket start a new one.
/// 2. **Intra-line merge**: within a bucket, fragments are sorted by
///    ascending x and accumulated left to right. A candidate joins the
///    current run when the gap between the run's right edge and the
///    candidate's left edge is below [`MERGE_GAP_ABSOLUTE`] or below
///    [`MERGE_GAP_HEIGHT_FACTOR`] times the taller height, whichever is
///    more permissive; touching or overlapping fragments always join. On
///    join the text concatenates with no separator, the run extends to the
///    candidate's right edge, keeps the greater height, the topmost y, and
///    the leading fragment's confidence.
///
/// Regions are emitted in line-bucket creation order, then left to right
/// within each line, with `index` assigned 1..n in emission order, which is
/// the reading order the numbering in the editing UI relies on.
#[must_use]
pub fn merge_fragments(fragments: &[Fragment]) -> Vec<Region> {
    if fragments.is_empty() {
        return Vec::new();
    }

    debug!(count = fragments.len(), "merging recognition fragments");

    let mut lines: Vec<LineBucket> = Vec::new();

    for fragment in fragments {
        match lines
            .iter_mut()
            .find(|line| (line.avg_y - fragment.y).abs() < LINE_Y_TOLERANCE)
        {
            Some(line) => {
                let members = line.fragments.len() as f32;
                line.avg_y = (line.avg_y * members + fragment.y) / (members + 1.0);
                line.fragments.push(fragment.clone());
            }
            None => lines.push(LineBucket {
                avg_y: fragment.y,
                fragments: vec![fragment.clone()],
            }),
        }
    }

    debug!(lines = lines.len(), "grouped fragments into lines");

    let mut regions = Vec::new();
    let mut next_index: u32 = 1;

    for line in &mut lines {
        line.fragments.sort_by(|a, b| a.x.total_cmp(&b.x));

        let mut current: Option<Fragment> = None;

        for fragment in line.fragments.drain(..) {
            match current.as_mut() {
                None => current = Some(fragment),
                Some(run) => {
                    let gap = fragment.x - run.right();
                    let relative = MERGE_GAP_HEIGHT_FACTOR * run.height.max(fragment.height);

                    if gap < MERGE_GAP_ABSOLUTE || gap < relative {
                        run.text.push_str(&fragment.text);
                        run.width = fragment.right() - run.x;
                        run.height = run.height.max(fragment.height);
                        run.y = run.y.min(fragment.y);
                    } else {
                        debug!(gap, left = %run.text, right = %fragment.text, "gap too wide, splitting run");
                        let finished = std::mem::replace(run, fragment);
                        regions.push(emit(finished, next_index));
                        next_index += 1;
                    }
                }
            }
        }

        if let Some(run) = current {
            regions.push(emit(run, next_index));
            next_index += 1;
        }
    }

    debug!(regions = regions.len(), "merge complete");
    regions
}

fn emit(run: Fragment, index: u32) -> Region {
    let Fragment {
        x,
        y,
        width,
        height,
        text,
        confidence,
    } = run;

    let region = Region::from_recognition(index, Rect::new(x, y, width, height), text);
    match confidence {
        Some(confidence) => region.with_confidence(confidence),
        None => region,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(merge_fragments(&[]).is_empty());
    }

    #[test]
    fn test_close_fragments_merge_end_to_end() {
        // gap = 45 - (10 + 30) = 5, well under both thresholds.
        let fragments = vec![
            Fragment::new(10.0, 10.0, 30.0, 20.0, "AB"),
            Fragment::new(45.0, 12.0, 30.0, 20.0, "CD"),
        ];

        let regions = merge_fragments(&fragments);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].text, "ABCD");
        assert_eq!(regions[0].rect.width, 65.0);
        assert_eq!(regions[0].rect.y, 10.0);
        assert_eq!(regions[0].rect.height, 20.0);
        assert_eq!(regions[0].index, 1);
    }

    #[test]
    fn test_absolute_threshold_boundary() {
        // height 24 makes the relative threshold 48, so only the absolute
        // rule can admit gap 49 ...
        let merged = merge_fragments(&[
            Fragment::new(0.0, 0.0, 10.0, 24.0, "a"),
            Fragment::new(59.0, 0.0, 10.0, 24.0, "b"),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "ab");

        // ... and gap 50 passes neither rule.
        let split = merge_fragments(&[
            Fragment::new(0.0, 0.0, 10.0, 24.0, "a"),
            Fragment::new(60.0, 0.0, 10.0, 24.0, "b"),
        ]);
        assert_eq!(split.len(), 2);
    }

    #[test]
    fn test_relative_threshold_admits_wide_gap() {
        // gap = 70 fails the absolute rule but 2 * max(40, 40) = 80 admits it.
        let merged = merge_fragments(&[
            Fragment::new(0.0, 0.0, 10.0, 40.0, "BIG"),
            Fragment::new(80.0, 0.0, 10.0, 40.0, "TYPE"),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "BIGTYPE");
    }

    #[test]
    fn test_overlapping_fragments_always_merge() {
        let merged = merge_fragments(&[
            Fragment::new(0.0, 0.0, 30.0, 10.0, "over"),
            Fragment::new(20.0, 0.0, 30.0, 10.0, "lap"),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].rect.width, 50.0);
    }

    #[test]
    fn test_merge_keeps_topmost_edge_and_max_height() {
        let merged = merge_fragments(&[
            Fragment::new(0.0, 14.0, 20.0, 18.0, "lo"),
            Fragment::new(25.0, 8.0, 20.0, 30.0, "hi"),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].rect.y, 8.0);
        assert_eq!(merged[0].rect.height, 30.0);
    }

    #[test]
    fn test_index_follows_line_then_x_order() {
        // Two lines; the second line's fragments arrive right-to-left.
        let fragments = vec![
            Fragment::new(500.0, 10.0, 40.0, 20.0, "A2"),
            Fragment::new(10.0, 12.0, 40.0, 20.0, "A1"),
            Fragment::new(300.0, 200.0, 40.0, 20.0, "B1"),
        ];

        let regions = merge_fragments(&fragments);
        let ordered: Vec<(&str, u32)> = regions
            .iter()
            .map(|r| (r.text.as_str(), r.index))
            .collect();
        // A1 and A2 are 450 apart, far beyond both thresholds, so they stay
        // separate but sort left to right; B1 opens a second line.
        assert_eq!(ordered, vec![("A1", 1), ("A2", 2), ("B1", 3)]);
    }

    #[test]
    fn test_line_bucket_running_mean() {
        // y = 0 and y = 25 land in one bucket (avg 12.5); y = 40 is within
        // tolerance of the updated mean even though it is 40 away from the
        // first fragment.
        let regions = merge_fragments(&[
            Fragment::new(0.0, 0.0, 10.0, 10.0, "a"),
            Fragment::new(15.0, 25.0, 10.0, 10.0, "b"),
            Fragment::new(30.0, 40.0, 10.0, 10.0, "c"),
        ]);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].text, "abc");
    }

    #[test]
    fn test_merged_region_keeps_leading_confidence() {
        let merged = merge_fragments(&[
            Fragment::new(0.0, 0.0, 30.0, 20.0, "ab").with_confidence(88.0),
            Fragment::new(35.0, 0.0, 30.0, 20.0, "cd").with_confidence(52.0),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].confidence, Some(88.0));
    }

    #[test]
    fn test_recognition_seed_style() {
        let regions = merge_fragments(&[Fragment::new(0.0, 0.0, 100.0, 20.0, "seed")]);
        let region = &regions[0];
        assert_eq!(region.font_size, 16.0);
        assert_eq!(region.original_text, "seed");
        assert!(!region.is_edited);
        assert!(region.mask.is_none());
    }
}
