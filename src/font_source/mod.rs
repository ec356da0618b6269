//! Font source access
//!
//! [`FontSource`] wraps a `norad::Font` and exposes the handful of operations
//! the build stages need: glyph lookup and mutation, the lib metadata map
//! (glyph order, OpenType categories, export lists), the feature buffer, and
//! reference validation. The metadata map is an explicit field of the font
//! it belongs to; no stage keeps global state.

pub mod metrics;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use norad::{Font, FontInfo, Glyph, Layer};
use plist::Value;

use crate::core::errors::{BuildResult, ReferenceKind, SourceError};
use crate::data::ufo;

/// Lib key holding the glyph order, which defines binary glyph index order
pub const GLYPH_ORDER_KEY: &str = "public.glyphOrder";
/// Lib key mapping glyph names to OpenType categories ("base", "mark", ...)
pub const CATEGORIES_KEY: &str = "public.openTypeCategories";
/// Lib key listing glyphs that are dropped from the compiled font
pub const SKIP_EXPORT_KEY: &str = "public.skipExportGlyphs";
/// Lib key mapping glyph names to production names
pub const POSTSCRIPT_NAMES_KEY: &str = "public.postscriptNames";

/// Category tag for combining marks
pub const MARK_CATEGORY: &str = "mark";

/// A mutable in-memory font source
#[derive(Debug, Clone)]
pub struct FontSource {
    font: Font,
    path: Option<PathBuf>,
}

impl FontSource {
    pub fn new(font: Font) -> Self {
        Self { font, path: None }
    }

    /// Load a UFO from disk
    pub fn load(path: impl AsRef<Path>) -> BuildResult<Self> {
        let path = path.as_ref();
        let font = ufo::load_ufo_from_path(path)?;
        Ok(Self {
            font,
            path: Some(path.to_path_buf()),
        })
    }

    /// Path the source was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn font_mut(&mut self) -> &mut Font {
        &mut self.font
    }

    pub fn into_font(self) -> Font {
        self.font
    }

    pub fn info(&self) -> &FontInfo {
        &self.font.font_info
    }

    pub fn info_mut(&mut self) -> &mut FontInfo {
        &mut self.font.font_info
    }

    // Glyph table

    pub fn layer(&self) -> &Layer {
        self.font.default_layer()
    }

    pub fn layer_mut(&mut self) -> &mut Layer {
        self.font.default_layer_mut()
    }

    pub fn glyph(&self, name: &str) -> Option<&Glyph> {
        self.layer().get_glyph(name)
    }

    pub fn glyph_mut(&mut self, name: &str) -> Option<&mut Glyph> {
        self.layer_mut().get_glyph_mut(name)
    }

    pub fn contains_glyph(&self, name: &str) -> bool {
        self.layer().contains_glyph(name)
    }

    /// Insert a glyph, replacing any glyph with the same name
    pub fn insert_glyph(&mut self, glyph: Glyph) {
        self.layer_mut().insert_glyph(glyph);
    }

    pub fn remove_glyph(&mut self, name: &str) -> Option<Glyph> {
        self.layer_mut().remove_glyph(name)
    }

    /// All glyphs of the default layer, in name order
    pub fn glyphs(&self) -> impl Iterator<Item = &Glyph> {
        self.layer().iter()
    }

    pub fn glyph_names(&self) -> impl Iterator<Item = &str> {
        self.glyphs().map(|glyph| glyph.name().as_str())
    }

    // Feature buffer

    pub fn features(&self) -> &str {
        &self.font.features
    }

    pub fn set_features(&mut self, text: String) {
        self.font.features = text;
    }

    /// Append text to the feature buffer, keeping statements on separate lines
    pub fn append_features(&mut self, text: &str) {
        let features = &mut self.font.features;
        if !features.is_empty() && !features.ends_with('\n') {
            features.push('\n');
        }
        features.push_str(text);
    }

    // Metadata map

    /// The OpenType category of a glyph, if one is recorded
    pub fn category(&self, name: &str) -> Option<&str> {
        self.font
            .lib
            .get(CATEGORIES_KEY)?
            .as_dictionary()?
            .get(name)?
            .as_string()
    }

    pub fn is_mark(&self, name: &str) -> bool {
        self.category(name) == Some(MARK_CATEGORY)
    }

    /// Record a glyph's OpenType category, creating the map if needed
    pub fn set_category(&mut self, name: &str, category: &str) {
        let entry = self
            .font
            .lib
            .get_mut(CATEGORIES_KEY)
            .and_then(Value::as_dictionary_mut);
        match entry {
            Some(categories) => {
                categories.insert(name.to_string(), Value::String(category.to_string()));
            }
            None => {
                let mut categories = plist::Dictionary::new();
                categories.insert(name.to_string(), Value::String(category.to_string()));
                self.font
                    .lib
                    .insert(CATEGORIES_KEY.to_string(), Value::Dictionary(categories));
            }
        }
    }

    /// The whole category map, sorted by glyph name
    pub fn categories(&self) -> BTreeMap<String, String> {
        self.string_map(CATEGORIES_KEY)
    }

    /// Read a lib entry that maps strings to strings
    pub fn string_map(&self, key: &str) -> BTreeMap<String, String> {
        self.font
            .lib
            .get(key)
            .and_then(Value::as_dictionary)
            .map(|dict| {
                dict.iter()
                    .filter_map(|(k, v)| Some((k.clone(), v.as_string()?.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Replace a string-to-string lib entry
    pub fn set_string_map(&mut self, key: &str, map: &BTreeMap<String, String>) {
        let mut dict = plist::Dictionary::new();
        for (k, v) in map {
            dict.insert(k.clone(), Value::String(v.clone()));
        }
        self.font.lib.insert(key.to_string(), Value::Dictionary(dict));
    }

    /// Read a lib entry that holds a list of strings
    pub fn string_list(&self, key: &str) -> Vec<String> {
        self.font
            .lib
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_string().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_lib_key(&self, key: &str) -> bool {
        self.font.lib.contains_key(key)
    }

    /// Replace a string-list lib entry
    pub fn set_string_list(&mut self, key: &str, items: &[String]) {
        let values = items.iter().cloned().map(Value::String).collect();
        self.font.lib.insert(key.to_string(), Value::Array(values));
    }

    /// The explicit glyph order, or the layer's name order when none is stored
    pub fn glyph_order(&self) -> Vec<String> {
        if self.has_lib_key(GLYPH_ORDER_KEY) {
            self.string_list(GLYPH_ORDER_KEY)
        } else {
            self.glyph_names().map(str::to_string).collect()
        }
    }

    pub fn set_glyph_order(&mut self, order: &[String]) {
        self.set_string_list(GLYPH_ORDER_KEY, order);
    }

    /// Check that every glyph name referenced by the glyph order, groups,
    /// kerning and components exists in the glyph table.
    pub fn validate_references(&self) -> Result<(), SourceError> {
        let layer = self.layer();
        let dangling = |kind: ReferenceKind, name: &str| SourceError::DanglingReference {
            kind,
            name: name.to_string(),
        };

        if self.has_lib_key(GLYPH_ORDER_KEY) {
            for name in self.string_list(GLYPH_ORDER_KEY) {
                if !layer.contains_glyph(&name) {
                    return Err(dangling(ReferenceKind::GlyphOrder, &name));
                }
            }
        }

        for (group, members) in &self.font.groups {
            for member in members {
                if !layer.contains_glyph(member.as_str()) {
                    return Err(dangling(
                        ReferenceKind::Group(group.to_string()),
                        member.as_str(),
                    ));
                }
            }
        }

        let groups: HashSet<&str> = self.font.groups.keys().map(|name| name.as_str()).collect();
        let is_known = |name: &str| groups.contains(name) || layer.contains_glyph(name);
        for (first, seconds) in &self.font.kerning {
            if !is_known(first.as_str()) {
                return Err(dangling(ReferenceKind::Kerning, first.as_str()));
            }
            if let Some(second) = seconds.keys().find(|second| !is_known(second.as_str())) {
                return Err(dangling(ReferenceKind::Kerning, second.as_str()));
            }
        }

        for glyph in layer.iter() {
            for component in &glyph.components {
                if !layer.contains_glyph(component.base.as_str()) {
                    return Err(dangling(
                        ReferenceKind::Component(glyph.name().to_string()),
                        component.base.as_str(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Names of glyphs tagged with `category`
    pub fn glyphs_in_category(&self, category: &str) -> BTreeSet<String> {
        self.categories()
            .into_iter()
            .filter(|(_, value)| value == category)
            .map(|(name, _)| name)
            .collect()
    }
}

impl From<Font> for FontSource {
    fn from(font: Font) -> Self {
        Self::new(font)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::rectangle_contour;
    use kurbo::Rect;

    /// Build a glyph with one rectangle contour of the given advance width
    pub(crate) fn boxed_glyph(name: &str, width: f64, codepoint: Option<char>) -> Glyph {
        let mut glyph = Glyph::new(name);
        glyph.width = width;
        if let Some(c) = codepoint {
            glyph.codepoints.insert(c);
        }
        if width > 0.0 {
            glyph
                .contours
                .push(rectangle_contour(Rect::new(10.0, 0.0, width - 10.0, 500.0)));
        }
        glyph
    }

    const PLIST_HEADER: &str = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" ",
        "\"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
    );

    /// Write a minimal UFO 3 holding the given GLIF sources, keyed by glyph name
    pub(crate) fn write_fixture_ufo(
        dir: &std::path::Path,
        glifs: &[(&str, &str)],
    ) -> std::path::PathBuf {
        let ufo = dir.join("Fixture.ufo");
        let glyphs_dir = ufo.join("glyphs");
        std::fs::create_dir_all(&glyphs_dir).unwrap();
        std::fs::write(
            ufo.join("metainfo.plist"),
            format!(
                "{PLIST_HEADER}<plist version=\"1.0\"><dict>\
                 <key>creator</key><string>fontsmith</string>\
                 <key>formatVersion</key><integer>3</integer>\
                 </dict></plist>\n"
            ),
        )
        .unwrap();
        std::fs::write(
            ufo.join("layercontents.plist"),
            format!(
                "{PLIST_HEADER}<plist version=\"1.0\"><array><array>\
                 <string>public.default</string><string>glyphs</string>\
                 </array></array></plist>\n"
            ),
        )
        .unwrap();

        let mut contents = String::new();
        for (name, glif) in glifs {
            let file_name = format!("{name}.glif");
            std::fs::write(glyphs_dir.join(&file_name), glif).unwrap();
            contents.push_str(&format!("<key>{name}</key><string>{file_name}</string>"));
        }
        std::fs::write(
            glyphs_dir.join("contents.plist"),
            format!("{PLIST_HEADER}<plist version=\"1.0\"><dict>{contents}</dict></plist>\n"),
        )
        .unwrap();
        ufo
    }

    pub(crate) fn source_with(glyphs: Vec<Glyph>) -> FontSource {
        let mut source = FontSource::new(Font::new());
        for glyph in glyphs {
            source.insert_glyph(glyph);
        }
        source
    }

    fn name(text: &str) -> norad::Name {
        norad::Name::new(text).unwrap()
    }

    #[test]
    fn test_categories_round_trip() {
        let mut source = source_with(vec![boxed_glyph("fatha", 0.0, None)]);
        assert!(!source.is_mark("fatha"));
        source.set_category("fatha", MARK_CATEGORY);
        source.set_category("alef", "base");
        assert!(source.is_mark("fatha"));
        assert_eq!(source.category("alef"), Some("base"));
        assert_eq!(
            source.glyphs_in_category(MARK_CATEGORY),
            BTreeSet::from(["fatha".to_string()])
        );
    }

    #[test]
    fn test_glyph_order_falls_back_to_layer_order() {
        let mut source = source_with(vec![
            boxed_glyph("beh", 300.0, None),
            boxed_glyph("alef", 200.0, None),
        ]);
        assert_eq!(source.glyph_order(), vec!["alef", "beh"]);

        source.set_glyph_order(&["beh".to_string(), "alef".to_string()]);
        assert_eq!(source.glyph_order(), vec!["beh", "alef"]);
    }

    #[test]
    fn test_append_features_separates_lines() {
        let mut source = source_with(vec![]);
        source.set_features("languagesystem DFLT dflt;".to_string());
        source.append_features("feature mark {\n} mark;\n");
        assert_eq!(
            source.features(),
            "languagesystem DFLT dflt;\nfeature mark {\n} mark;\n"
        );
    }

    #[test]
    fn test_validate_references_accepts_consistent_font() {
        let mut source = source_with(vec![
            boxed_glyph("alef", 200.0, Some('\u{0627}')),
            boxed_glyph("beh", 300.0, Some('\u{0628}')),
        ]);
        source.set_glyph_order(&["alef".to_string(), "beh".to_string()]);
        source
            .font_mut()
            .groups
            .insert(name("public.kern1.alef"), vec![name("alef")]);
        source
            .font_mut()
            .kerning
            .entry(name("public.kern1.alef"))
            .or_default()
            .insert(name("beh"), -20.0);
        assert_eq!(source.validate_references(), Ok(()));
    }

    #[test]
    fn test_validate_references_reports_dangling_order_entry() {
        let mut source = source_with(vec![boxed_glyph("alef", 200.0, None)]);
        source.set_glyph_order(&["alef".to_string(), "ghost".to_string()]);
        assert_eq!(
            source.validate_references(),
            Err(SourceError::DanglingReference {
                kind: ReferenceKind::GlyphOrder,
                name: "ghost".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_references_reports_dangling_component() {
        let mut composite = Glyph::new("alefHamza");
        composite.components.push(norad::Component::new(
            name("hamza"),
            crate::data::affine_to_norad(kurbo::Affine::IDENTITY),
            None,
        ));
        let source = source_with(vec![boxed_glyph("alef", 200.0, None), composite]);
        assert_eq!(
            source.validate_references(),
            Err(SourceError::DanglingReference {
                kind: ReferenceKind::Component("alefHamza".to_string()),
                name: "hamza".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_references_reports_dangling_group_member() {
        let mut source = source_with(vec![boxed_glyph("alef", 200.0, None)]);
        source
            .font_mut()
            .groups
            .insert(name("alefs"), vec![name("alef"), name("alef.fina")]);
        assert!(matches!(
            source.validate_references(),
            Err(SourceError::DanglingReference { kind: ReferenceKind::Group(_), .. })
        ));
    }
}
