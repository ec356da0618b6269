//! Generated stroke substitution rules
//!
//! A stroke mark following a glyph is swapped for the stroke drawn at that
//! glyph's width bucket. The lookup filters marks through a set holding only
//! the base stroke, so other marks between the glyph and the stroke do not
//! break the context.

use std::fmt::Write;

use crate::synth::WidthBuckets;

/// One contextual single substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrokeSubstitution {
    pub bucket: u32,
    /// Glyphs that must precede the stroke, sorted
    pub context: Vec<String>,
    pub replacement: String,
}

/// The feature block selecting width-matched strokes for one base stroke glyph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrokeRules {
    pub base: String,
    pub substitutions: Vec<StrokeSubstitution>,
}

impl StrokeRules {
    /// Build rules for `base`, one substitution per bucket in ascending width.
    ///
    /// Narrow buckets come first so that engines applying the first matching
    /// rule never let a wider context shadow a narrower one.
    pub fn new(base: &str, buckets: &WidthBuckets) -> Self {
        let substitutions = buckets
            .iter()
            .map(|(&bucket, members)| StrokeSubstitution {
                bucket,
                context: members.iter().cloned().collect(),
                replacement: stroke_glyph_name(base, bucket),
            })
            .collect();

        Self {
            base: base.to_string(),
            substitutions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty()
    }

    /// Name of the mark filtering class.
    ///
    /// Characters FEA does not allow in a class name are written as `_XX_`
    /// (hex codepoint) and a literal underscore as `__`, so distinct bases
    /// never share a class.
    pub fn class_name(&self) -> String {
        let mut escaped = String::with_capacity(self.base.len() + 4);
        for c in self.base.chars() {
            match c {
                '_' => escaped.push_str("__"),
                c if c.is_ascii_alphanumeric() || c == '.' => escaped.push(c),
                // Writing to a String cannot fail
                c => {
                    let _ = write!(escaped, "_{:X}_", u32::from(c));
                }
            }
        }
        format!("{escaped}_set")
    }

    /// Render the rules as a `mark` feature block
    pub fn to_fea(&self) -> String {
        let class = self.class_name();
        let mut fea = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(fea, "feature mark {{");
        let _ = writeln!(fea, "    @{class} = [{}];", self.base);
        let _ = writeln!(fea, "    lookupflag UseMarkFilteringSet @{class};");
        for sub in &self.substitutions {
            let _ = writeln!(
                fea,
                "    sub [{}] {}' by {};",
                sub.context.join(" "),
                self.base,
                sub.replacement
            );
        }
        let _ = writeln!(fea, "}} mark;");
        fea
    }
}

/// Name of the stroke glyph drawn for `bucket`
pub fn stroke_glyph_name(base: &str, bucket: u32) -> String {
    format!("{base}.{bucket}")
}
