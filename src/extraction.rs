use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::geometry::BoundingBox;
use crate::models::{Role, Turn};

/// Four comma-separated numbers in square brackets, e.g. `[10, 20.5, 30, 40]`
static BOX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*(\d+\.?\d*)\s*,\s*(\d+\.?\d*)\s*,\s*(\d+\.?\d*)\s*,\s*(\d+\.?\d*)\s*\]")
        .expect("box pattern is a valid regex")
});

/// Truncate a matched number toward zero
fn truncate(number: &str) -> Option<i64> {
    number.parse::<f64>().ok().map(|value| value.trunc() as i64)
}

/// All boxes literally named in `text`, left to right
pub fn scan_boxes(text: &str) -> Vec<[i64; 4]> {
    BOX_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            Some([
                truncate(&caps[1])?,
                truncate(&caps[2])?,
                truncate(&caps[3])?,
                truncate(&caps[4])?,
            ])
        })
        .collect()
}

/// Boxes the assistant proposed anywhere in the transcript.
///
/// Order is first appearance; an exact duplicate is dropped even when it
/// reappears in a later turn.
pub fn extract_proposed_boxes(transcript: &[Turn]) -> Vec<BoundingBox> {
    let mut seen = HashSet::new();
    let mut boxes = Vec::new();

    for turn in transcript {
        if turn.role != Role::Assistant {
            continue;
        }
        let Some(text) = turn.content.text() else {
            continue;
        };

        for coords in scan_boxes(&text) {
            if seen.insert(coords) {
                let [x1, y1, x2, y2] = coords;
                boxes.push(BoundingBox::new(x1 as f64, y1 as f64, x2 as f64, y2 as f64));
            }
        }
    }

    boxes
}
