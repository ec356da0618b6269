//! Production glyph names
//!
//! Maps friendly development names (`alef.fina`, `lam_alef`) to the
//! Unicode-derived names expected in shipped fonts (`uni0627.fina`,
//! `uni06440627`). Resolution is pure: it reads the glyph table and nothing
//! else.
//!
//! Every recursive call works on a strictly shorter name (a suffix or a
//! ligature component is stripped), so resolution always terminates, whatever
//! the glyph table contains.

use std::collections::{BTreeMap, HashSet};

use norad::Layer;
use tracing::{debug, warn};

use crate::font_source::{FontSource, POSTSCRIPT_NAMES_KEY};

/// Resolve the production name of `name` against the glyph table.
///
/// First match wins:
/// 1. the glyph's own Unicode value (`uniXXXX`, or `uXXXXX` above the BMP)
/// 2. `base.suffix` where `base` is a glyph: `production_name(base).suffix`
/// 3. a ligature `a_b[.suffix]` of BMP components: `uniAAAABBBB[.suffix]`
/// 4. any other resolvable ligature: `prod(a)_prod(b)[.suffix]`
/// 5. the name itself
pub fn production_name(name: &str, layer: &Layer) -> String {
    if let Some(codepoint) = layer
        .get_glyph(name)
        .and_then(|glyph| glyph.codepoints.iter().next())
    {
        return unicode_name(codepoint);
    }

    if let Some((base, suffix)) = name.rsplit_once('.') {
        if !base.is_empty() && layer.contains_glyph(base) {
            return format!("{}.{}", production_name(base, layer), suffix);
        }
    }

    ligature_name(name, layer).unwrap_or_else(|| name.to_string())
}

/// Production names for every glyph in the layer, keyed by glyph name
pub fn production_names(layer: &Layer) -> BTreeMap<String, String> {
    layer
        .iter()
        .map(|glyph| {
            let name = glyph.name().as_str();
            (name.to_string(), production_name(name, layer))
        })
        .collect()
}

/// `uniXXXX` for BMP codepoints, `uXXXXX` above
pub fn unicode_name(codepoint: char) -> String {
    let value = codepoint as u32;
    if value > 0xFFFF {
        format!("u{value:04X}")
    } else {
        format!("uni{value:04X}")
    }
}

fn ligature_name(name: &str, layer: &Layer) -> Option<String> {
    // A ligature's suffix applies to the whole ligature, so split at the
    // first dot: `lam_alef.fina.alt` has components `lam`, `alef`.
    let (stem, suffix) = match name.find('.') {
        Some(index) => name.split_at(index),
        None => (name, ""),
    };
    if !stem.contains('_') {
        return None;
    }

    let mut resolved = Vec::new();
    for part in stem.split('_') {
        if part.is_empty() {
            return None;
        }
        let component = if layer.contains_glyph(part) {
            production_name(part, layer)
        } else {
            let suffixed = format!("{part}{suffix}");
            if suffix.is_empty() || !layer.contains_glyph(&suffixed) {
                return None;
            }
            let full = production_name(&suffixed, layer);
            match full.strip_suffix(suffix) {
                Some(stripped) => stripped.to_string(),
                None => full,
            }
        };
        resolved.push(component);
    }

    let bmp_digits: Option<Vec<&str>> = resolved.iter().map(|r| bmp_hex(r)).collect();
    Some(match bmp_digits {
        Some(digits) => format!("uni{}{}", digits.concat(), suffix),
        None => format!("{}{}", resolved.join("_"), suffix),
    })
}

/// The four hex digits of a `uniXXXX` name
fn bmp_hex(name: &str) -> Option<&str> {
    let digits = name.strip_prefix("uni")?;
    let is_upper_hex = |b: u8| b.is_ascii_digit() || (b'A'..=b'F').contains(&b);
    (digits.len() == 4 && digits.bytes().all(is_upper_hex)).then_some(digits)
}

/// Store production names in the font lib so the compiler renames glyphs.
///
/// Names already authored in `public.postscriptNames` are kept and count as
/// taken. Only names that differ are written. When two glyphs would get the
/// same production name the second keeps its own name. Returns the number of
/// newly renamed glyphs.
pub fn export_production_names(source: &mut FontSource) -> usize {
    let names = production_names(source.layer());
    let glyph_names: HashSet<&str> = names.keys().map(String::as_str).collect();

    let mut renames = source.string_map(POSTSCRIPT_NAMES_KEY);
    let mut taken: HashSet<String> = renames.values().cloned().collect();
    let mut count = 0;
    for (glyph, production) in &names {
        if glyph == production {
            continue;
        }
        if let Some(authored) = renames.get(glyph) {
            debug!("Keeping authored production name {glyph} -> {authored}");
            continue;
        }
        if glyph_names.contains(production.as_str()) || !taken.insert(production.clone()) {
            warn!("Production name '{production}' for '{glyph}' is already taken, keeping '{glyph}'");
            continue;
        }
        debug!("Production name {glyph} -> {production}");
        renames.insert(glyph.clone(), production.clone());
        count += 1;
    }

    if !renames.is_empty() || source.has_lib_key(POSTSCRIPT_NAMES_KEY) {
        source.set_string_map(POSTSCRIPT_NAMES_KEY, &renames);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_source::tests::{boxed_glyph, source_with};

    fn arabic_source() -> FontSource {
        source_with(vec![
            boxed_glyph("alef", 250.0, Some('\u{0627}')),
            boxed_glyph("alef.fina", 260.0, None),
            boxed_glyph("lam", 300.0, Some('\u{0644}')),
            boxed_glyph("lam_alef", 500.0, None),
            boxed_glyph("lam_alef.fina", 510.0, None),
            boxed_glyph("beh.init", 200.0, None),
            boxed_glyph("beh_alef.fina", 400.0, None),
            boxed_glyph("beh.fina", 300.0, None),
            boxed_glyph("alefMath", 300.0, Some('\u{1EE00}')),
            boxed_glyph("alef_alefMath", 600.0, None),
            boxed_glyph("lam_ghost", 600.0, None),
            boxed_glyph("space", 200.0, Some(' ')),
            boxed_glyph(".notdef", 500.0, None),
        ])
    }

    fn resolve(name: &str) -> String {
        production_name(name, arabic_source().layer())
    }

    #[test]
    fn test_unicode_prefix_boundary() {
        assert_eq!(resolve("alef"), "uni0627");
        assert_eq!(resolve("space"), "uni0020");
        assert_eq!(resolve("alefMath"), "u1EE00");
        assert_eq!(unicode_name('\u{FFFF}'), "uniFFFF");
        assert_eq!(unicode_name('\u{10000}'), "u10000");
    }

    #[test]
    fn test_suffixed_names() {
        assert_eq!(resolve("alef.fina"), "uni0627.fina");
        // `beh` is not in the table, so the suffix cannot be resolved
        assert_eq!(resolve("beh.init"), "beh.init");
    }

    #[test]
    fn test_ligatures() {
        assert_eq!(resolve("lam_alef"), "uni06440627");
        // `lam_alef` exists, so the suffix rule applies first
        assert_eq!(resolve("lam_alef.fina"), "uni06440627.fina");
        assert_eq!(resolve("alef_alefMath"), "uni0627_u1EE00");
    }

    #[test]
    fn test_ligature_reattaches_suffix_to_components() {
        // `beh` only exists as `beh.fina`; `alef` exists on its own
        assert_eq!(resolve("beh_alef.fina"), "beh_uni0627.fina");
    }

    #[test]
    fn test_unresolvable_names_are_unchanged() {
        assert_eq!(resolve("lam_ghost"), "lam_ghost");
        assert_eq!(resolve(".notdef"), ".notdef");
        assert_eq!(resolve("not_in_font"), "not_in_font");
    }

    #[test]
    fn test_canonical_names_are_fixed_points() {
        let source = source_with(vec![
            boxed_glyph("uni0627", 250.0, Some('\u{0627}')),
            boxed_glyph("uni0627.fina", 250.0, None),
            boxed_glyph("u1EE00", 250.0, Some('\u{1EE00}')),
            boxed_glyph("uni06440627", 500.0, None),
        ]);
        for name in ["uni0627", "uni0627.fina", "u1EE00", "uni06440627"] {
            let once = production_name(name, source.layer());
            assert_eq!(once, name);
            assert_eq!(production_name(&once, source.layer()), once);
        }
    }

    #[test]
    fn test_export_production_names_skips_identity_and_clashes() {
        let mut source = source_with(vec![
            boxed_glyph("alef", 250.0, Some('\u{0627}')),
            boxed_glyph("alefAlt", 250.0, Some('\u{0627}')),
            boxed_glyph(".notdef", 500.0, None),
        ]);
        let renamed = export_production_names(&mut source);
        assert_eq!(renamed, 1);

        let map = source.string_map(POSTSCRIPT_NAMES_KEY);
        assert_eq!(map.get("alef").map(String::as_str), Some("uni0627"));
        assert!(!map.contains_key("alefAlt"));
        assert!(!map.contains_key(".notdef"));
    }

    #[test]
    fn test_export_keeps_authored_production_names() {
        let mut source = source_with(vec![
            boxed_glyph("alef", 250.0, Some('\u{0627}')),
            boxed_glyph("ornament", 400.0, None),
            boxed_glyph("lam", 300.0, Some('\u{0644}')),
        ]);
        let mut authored = BTreeMap::new();
        authored.insert("ornament".to_string(), "uniFD3E".to_string());
        authored.insert("lam".to_string(), "lam.handmade".to_string());
        source.set_string_map(POSTSCRIPT_NAMES_KEY, &authored);

        assert_eq!(export_production_names(&mut source), 1);

        let map = source.string_map(POSTSCRIPT_NAMES_KEY);
        assert_eq!(map.get("ornament").map(String::as_str), Some("uniFD3E"));
        assert_eq!(map.get("lam").map(String::as_str), Some("lam.handmade"));
        assert_eq!(map.get("alef").map(String::as_str), Some("uni0627"));
    }

    #[test]
    fn test_authored_names_count_as_taken() {
        let mut source = source_with(vec![
            boxed_glyph("alef", 250.0, Some('\u{0627}')),
            boxed_glyph("ornament", 400.0, None),
        ]);
        let mut authored = BTreeMap::new();
        authored.insert("ornament".to_string(), "uni0627".to_string());
        source.set_string_map(POSTSCRIPT_NAMES_KEY, &authored);

        assert_eq!(export_production_names(&mut source), 0);
        let map = source.string_map(POSTSCRIPT_NAMES_KEY);
        assert!(!map.contains_key("alef"));
    }
}
