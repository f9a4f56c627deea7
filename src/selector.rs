//! Within-category glyph indexing.

use crate::catalog::{CategoryId, GlyphCatalog};

/// Picks the glyph at `floor(position × len)`, clamped to the last entry.
///
/// Total for every `position` in [0, 1]: the catalog guarantees non-empty
/// sequences, and the clamp covers a position that defensively arrives at
/// exactly 1.
pub fn select_glyph(catalog: &GlyphCatalog, category: CategoryId, position: f32) -> &str {
    let sequence = catalog.glyphs(category);
    let scaled = (position.max(0.0) * sequence.len() as f32).floor() as usize;
    let index = scaled.min(sequence.len() - 1);
    &sequence[index]
}

#[cfg(test)]
mod tests {
    use super::select_glyph;
    use crate::catalog::{build_catalog, GlyphCatalog};
    use crate::schema::CatalogConfig;

    fn catalog() -> GlyphCatalog {
        let config: CatalogConfig = serde_yaml::from_str(
            r#"
literals:
  - { category: green, glyphs: "🌿🍀🌱🌲" }
  - { category: red, glyphs: "🍎" }
"#,
        )
        .expect("catalog config should parse");
        build_catalog(&config).expect("catalog should build")
    }

    #[test]
    fn index_stays_in_bounds_across_positions() {
        let catalog = catalog();
        let green = catalog.category_id("green").expect("green should exist");
        for step in 0..=1000 {
            let position = step as f32 / 1000.0;
            let glyph = select_glyph(&catalog, green, position);
            assert!(catalog.glyphs(green).iter().any(|g| g == glyph));
        }
    }

    #[test]
    fn position_zero_selects_the_first_glyph() {
        let catalog = catalog();
        let green = catalog.category_id("green").expect("green should exist");
        assert_eq!(select_glyph(&catalog, green, 0.0), "🌿");
    }

    #[test]
    fn position_one_clamps_to_the_last_glyph() {
        let catalog = catalog();
        let green = catalog.category_id("green").expect("green should exist");
        assert_eq!(select_glyph(&catalog, green, 1.0), "🌲");
    }

    #[test]
    fn quarters_map_to_successive_glyphs() {
        let catalog = catalog();
        let green = catalog.category_id("green").expect("green should exist");
        assert_eq!(select_glyph(&catalog, green, 0.0), "🌿");
        assert_eq!(select_glyph(&catalog, green, 0.25), "🍀");
        assert_eq!(select_glyph(&catalog, green, 0.5), "🌱");
        assert_eq!(select_glyph(&catalog, green, 0.75), "🌲");
    }

    #[test]
    fn single_glyph_category_is_constant() {
        let catalog = catalog();
        let red = catalog.category_id("red").expect("red should exist");
        for step in 0..=10 {
            assert_eq!(select_glyph(&catalog, red, step as f32 / 10.0), "🍎");
        }
    }
}
