//! Width buckets
//!
//! Glyph advance widths rounded to a fixed quantum. A stroke glyph is drawn
//! once per bucket instead of once per glyph.

use std::collections::{BTreeMap, BTreeSet};

/// Bucket size in font units
pub const WIDTH_QUANTUM: u32 = 100;

/// Bucket width mapped to the names of the glyphs that fall into it.
///
/// Ordered maps keep every traversal, and therefore every generated
/// statement, in ascending width and name order.
pub type WidthBuckets = BTreeMap<u32, BTreeSet<String>>;

/// Round `width` to the nearest multiple of [`WIDTH_QUANTUM`], never below one
/// quantum. Halfway values round to the even multiple.
pub fn width_bucket(width: f64) -> u32 {
    let quantum = f64::from(WIDTH_QUANTUM);
    let bucket = (width / quantum).round_ties_even() * quantum;
    if bucket > quantum {
        bucket as u32
    } else {
        WIDTH_QUANTUM
    }
}

/// Group `(name, width)` pairs by width bucket
pub fn group_by_width<'a>(glyphs: impl IntoIterator<Item = (&'a str, f64)>) -> WidthBuckets {
    let mut buckets = WidthBuckets::new();
    for (name, width) in glyphs {
        buckets
            .entry(width_bucket(width))
            .or_default()
            .insert(name.to_string());
    }
    buckets
}
