//! Companion source merging
//!
//! A family can ship a script-specific core plus a separately maintained
//! complementary script. The companion UFO is folded into the primary one
//! before any other stage runs. The primary always wins: nothing it already
//! defines is overwritten.

use std::collections::{BTreeSet, HashSet};

use crate::font_source::{FontSource, CATEGORIES_KEY, GLYPH_ORDER_KEY, SKIP_EXPORT_KEY};

/// What a companion merge changed in the primary source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub glyphs_added: usize,
    /// Companion glyphs whose names already existed in the primary
    pub glyphs_skipped: Vec<String>,
    pub groups_extended: usize,
    pub kerning_pairs_added: usize,
}

/// Merge `companion` into `primary` without overwriting anything
pub fn merge_companion(primary: &mut FontSource, companion: &FontSource) -> MergeReport {
    let mut report = MergeReport::default();
    let primary_order = primary.glyph_order();

    for glyph in companion.glyphs() {
        if primary.contains_glyph(glyph.name().as_str()) {
            tracing::debug!("Companion glyph '{}' already in primary, skipping", glyph.name());
            report.glyphs_skipped.push(glyph.name().to_string());
            continue;
        }
        primary.insert_glyph(glyph.clone());
        report.glyphs_added += 1;
    }

    merge_glyph_order(primary, primary_order, companion);
    merge_categories(primary, companion);
    merge_skip_export(primary, companion);
    report.groups_extended = merge_groups(primary, companion);
    report.kerning_pairs_added = merge_kerning(primary, companion);

    tracing::info!(
        "Merged companion: {} glyphs added, {} skipped, {} kerning pairs added",
        report.glyphs_added,
        report.glyphs_skipped.len(),
        report.kerning_pairs_added
    );
    report
}

/// Primary order followed by companion order, first occurrence kept.
///
/// `primary_order` is taken before companion glyphs join the layer.
fn merge_glyph_order(
    primary: &mut FontSource,
    primary_order: Vec<String>,
    companion: &FontSource,
) {
    if !primary.has_lib_key(GLYPH_ORDER_KEY) && !companion.has_lib_key(GLYPH_ORDER_KEY) {
        return;
    }
    let mut seen = HashSet::new();
    let order: Vec<String> = primary_order
        .into_iter()
        .chain(companion.glyph_order())
        .filter(|name| seen.insert(name.clone()))
        .collect();
    primary.set_glyph_order(&order);
}

fn merge_categories(primary: &mut FontSource, companion: &FontSource) {
    if !companion.has_lib_key(CATEGORIES_KEY) {
        return;
    }
    let mut categories = primary.categories();
    for (name, category) in companion.categories() {
        categories.entry(name).or_insert(category);
    }
    primary.set_string_map(CATEGORIES_KEY, &categories);
}

fn merge_skip_export(primary: &mut FontSource, companion: &FontSource) {
    if !companion.has_lib_key(SKIP_EXPORT_KEY) {
        return;
    }
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let skipped: Vec<String> = primary
        .string_list(SKIP_EXPORT_KEY)
        .into_iter()
        .chain(companion.string_list(SKIP_EXPORT_KEY))
        .filter(|name| seen.insert(name.clone()))
        .collect();
    primary.set_string_list(SKIP_EXPORT_KEY, &skipped);
}

/// Union group membership; returns how many groups gained members
fn merge_groups(primary: &mut FontSource, companion: &FontSource) -> usize {
    let groups = &mut primary.font_mut().groups;
    let mut extended = 0;
    for (group, members) in &companion.font().groups {
        let target = groups.entry(group.clone()).or_default();
        let before = target.len();
        for member in members {
            if !target.contains(member) {
                target.push(member.clone());
            }
        }
        if target.len() > before {
            extended += 1;
        }
    }
    extended
}

/// Insert companion kerning pairs the primary does not define
fn merge_kerning(primary: &mut FontSource, companion: &FontSource) -> usize {
    let kerning = &mut primary.font_mut().kerning;
    let mut added = 0;
    for (first, seconds) in &companion.font().kerning {
        let row = kerning.entry(first.clone()).or_default();
        for (second, value) in seconds {
            if !row.contains_key(second) {
                row.insert(second.clone(), *value);
                added += 1;
            }
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_source::tests::{boxed_glyph, source_with};
    use crate::font_source::MARK_CATEGORY;
    use norad::Name;
    use std::collections::BTreeMap;

    fn name(text: &str) -> Name {
        Name::new(text).unwrap()
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn primary() -> FontSource {
        let mut source = source_with(vec![
            boxed_glyph("alef-ar", 250.0, Some('\u{0627}')),
            boxed_glyph("space", 300.0, Some(' ')),
        ]);
        source.set_glyph_order(&names(&["space", "alef-ar"]));
        source.set_category("alef-ar", "base");
        source
    }

    fn companion() -> FontSource {
        let mut source = source_with(vec![
            boxed_glyph("A", 600.0, Some('A')),
            boxed_glyph("V", 620.0, Some('V')),
            boxed_glyph("space", 200.0, Some(' ')),
        ]);
        source.set_glyph_order(&names(&["space", "A", "V"]));
        source.set_category("alef-ar", "ligature");
        source.set_category("A", "base");
        source
            .font_mut()
            .groups
            .insert(name("public.kern1.A"), vec![name("A")]);
        let mut row = BTreeMap::new();
        row.insert(name("V"), -80.0);
        source.font_mut().kerning.insert(name("A"), row);
        source
    }

    #[test]
    fn test_primary_glyph_wins() {
        let mut primary = primary();
        let report = merge_companion(&mut primary, &companion());

        assert_eq!(report.glyphs_added, 2);
        assert_eq!(report.glyphs_skipped, names(&["space"]));
        assert_eq!(primary.glyph("space").unwrap().width, 300.0);
        assert!(primary.contains_glyph("A"));
    }

    #[test]
    fn test_glyph_order_is_deduplicated() {
        let mut primary = primary();
        merge_companion(&mut primary, &companion());
        assert_eq!(primary.glyph_order(), names(&["space", "alef-ar", "A", "V"]));
    }

    #[test]
    fn test_implicit_primary_order_comes_first() {
        let mut primary = source_with(vec![
            boxed_glyph("space", 300.0, Some(' ')),
            boxed_glyph("alef-ar", 250.0, Some('\u{0627}')),
        ]);
        merge_companion(&mut primary, &companion());
        assert_eq!(primary.glyph_order(), names(&["alef-ar", "space", "A", "V"]));
    }

    #[test]
    fn test_categories_keep_primary_entries() {
        let mut primary = primary();
        merge_companion(&mut primary, &companion());
        assert_eq!(primary.category("alef-ar"), Some("base"));
        assert_eq!(primary.category("A"), Some("base"));
    }

    #[test]
    fn test_skip_export_lists_are_unioned() {
        let mut primary = primary();
        primary.set_string_list(SKIP_EXPORT_KEY, &names(&["_part"]));
        let mut companion = companion();
        companion.set_string_list(SKIP_EXPORT_KEY, &names(&["_part", "_stem"]));

        merge_companion(&mut primary, &companion);
        assert_eq!(primary.string_list(SKIP_EXPORT_KEY), names(&["_part", "_stem"]));
    }

    #[test]
    fn test_groups_and_kerning_are_merged() {
        let mut primary = primary();
        let report = merge_companion(&mut primary, &companion());

        assert_eq!(report.groups_extended, 1);
        assert_eq!(report.kerning_pairs_added, 1);
        assert_eq!(
            primary.font().groups.get("public.kern1.A"),
            Some(&vec![name("A")])
        );
        assert!(primary.validate_references().is_ok());
    }

    #[test]
    fn test_existing_kerning_pair_is_kept() {
        let mut primary = primary();
        merge_companion(&mut primary, &companion());
        primary
            .font_mut()
            .kerning
            .get_mut("A")
            .unwrap()
            .insert(name("V"), -20.0);

        let report = merge_companion(&mut primary, &companion());
        assert_eq!(report.kerning_pairs_added, 0);
        assert_eq!(primary.font().kerning["A"]["V"], -20.0);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut primary = primary();
        merge_companion(&mut primary, &companion());
        let order = primary.glyph_order();
        let glyph_count = primary.layer().len();

        let report = merge_companion(&mut primary, &companion());
        assert_eq!(report.glyphs_added, 0);
        assert_eq!(report.groups_extended, 0);
        assert_eq!(primary.glyph_order(), order);
        assert_eq!(primary.layer().len(), glyph_count);
    }

    #[test]
    fn test_marks_from_companion_are_recognised() {
        let mut primary = primary();
        let mut companion = companion();
        companion.insert_glyph(boxed_glyph("acutecomb", 0.0, Some('\u{0301}')));
        companion.set_category("acutecomb", MARK_CATEGORY);

        merge_companion(&mut primary, &companion);
        assert!(primary.is_mark("acutecomb"));
    }
}
