//! Font info: names, license and vertical metrics
//!
//! Helpers for the font-wide fields the build rewrites. Everything here works
//! on `norad::FontInfo` directly.

use norad::FontInfo;

/// Display name combining family and style names
pub fn display_name(info: &FontInfo) -> String {
    let parts: Vec<&str> = [&info.family_name, &info.style_name]
        .iter()
        .filter_map(|name| name.as_deref())
        .filter(|name| !name.is_empty())
        .collect();

    if parts.is_empty() {
        "Untitled Font".to_string()
    } else {
        parts.join(" ")
    }
}

/// Store license text in the OpenType name table fields
pub fn apply_license(info: &mut FontInfo, text: &str) {
    info.open_type_name_license = Some(text.trim_end().to_string());
}

/// Append `suffix` to every family-level name.
///
/// `suffix` is appended verbatim to human-readable names (it normally starts
/// with a space) and with whitespace removed to the PostScript name, before
/// its style part.
pub fn append_name_suffix(info: &mut FontInfo, suffix: &str) {
    let old_family = info.family_name.clone();

    for name in [
        &mut info.family_name,
        &mut info.style_map_family_name,
        &mut info.open_type_name_preferred_family_name,
    ] {
        if let Some(name) = name.as_mut() {
            name.push_str(suffix);
        }
    }

    if let (Some(full), Some(old), Some(new)) = (
        info.postscript_full_name.as_mut(),
        old_family.as_deref(),
        info.family_name.as_deref(),
    ) {
        if let Some(rest) = full.strip_prefix(old) {
            *full = format!("{new}{rest}");
        } else {
            full.push_str(suffix);
        }
    }

    if let Some(ps_name) = info.postscript_font_name.as_mut() {
        let compact: String = suffix.chars().filter(|c| !c.is_whitespace()).collect();
        *ps_name = match ps_name.split_once('-') {
            Some((family, style)) => format!("{family}{compact}-{style}"),
            None => format!("{ps_name}{compact}"),
        };
    }
}

/// Override the ascender in every vertical-metrics field that carries one
pub fn override_ascender(info: &mut FontInfo, ascender: i32) {
    info.open_type_hhea_ascender = Some(ascender);
    info.open_type_os2_typo_ascender = Some(ascender);
    info.open_type_os2_win_ascent = Some(ascender.max(0) as u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named_info() -> FontInfo {
        let mut info = FontInfo::default();
        info.family_name = Some("Amiri".to_string());
        info.style_name = Some("Regular".to_string());
        info.style_map_family_name = Some("Amiri".to_string());
        info.postscript_font_name = Some("Amiri-Regular".to_string());
        info.postscript_full_name = Some("Amiri Regular".to_string());
        info
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(&named_info()), "Amiri Regular");
        assert_eq!(display_name(&FontInfo::default()), "Untitled Font");
    }

    #[test]
    fn test_append_name_suffix() {
        let mut info = named_info();
        append_name_suffix(&mut info, " Quran");
        assert_eq!(info.family_name.as_deref(), Some("Amiri Quran"));
        assert_eq!(info.style_map_family_name.as_deref(), Some("Amiri Quran"));
        assert_eq!(info.postscript_full_name.as_deref(), Some("Amiri Quran Regular"));
        assert_eq!(info.postscript_font_name.as_deref(), Some("AmiriQuran-Regular"));
        // Fields that were never set stay unset
        assert_eq!(info.open_type_name_preferred_family_name, None);
    }

    #[test]
    fn test_override_ascender() {
        let mut info = named_info();
        override_ascender(&mut info, 1124);
        assert_eq!(info.open_type_hhea_ascender, Some(1124));
        assert_eq!(info.open_type_os2_typo_ascender, Some(1124));
        assert_eq!(info.open_type_os2_win_ascent, Some(1124));
    }

    #[test]
    fn test_license_is_trimmed() {
        let mut info = FontInfo::default();
        apply_license(&mut info, "SIL Open Font License 1.1\n\n");
        assert_eq!(
            info.open_type_name_license.as_deref(),
            Some("SIL Open Font License 1.1")
        );
    }
}
