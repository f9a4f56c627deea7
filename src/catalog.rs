//! Glyph catalog: per color category, an ordered sequence of candidate
//! glyphs.
//!
//! Built once at startup, either from literal glyph lists or by sweeping
//! Unicode code-point ranges through a classifier, then immutable for the
//! life of the process. Glyphs are grapheme clusters stored whole; a
//! multi-code-point emoji is never split.

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Result};
use unicode_segmentation::UnicodeSegmentation;

use crate::schema::{CatalogConfig, CodePointRange};

/// Index into the catalog's fixed category list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(usize);

impl CategoryId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct GlyphCatalog {
    names: Vec<String>,
    glyphs: Vec<Vec<String>>,
}

impl GlyphCatalog {
    pub fn category_count(&self) -> usize {
        self.names.len()
    }

    pub fn category_id(&self, name: &str) -> Option<CategoryId> {
        self.names
            .iter()
            .position(|candidate| candidate == name)
            .map(CategoryId)
    }

    pub fn category_name(&self, id: CategoryId) -> &str {
        &self.names[id.0]
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Glyph sequence for a category. Non-empty by construction.
    pub fn glyphs(&self, id: CategoryId) -> &[String] {
        &self.glyphs[id.0]
    }

    pub fn total_glyphs(&self) -> usize {
        self.glyphs.iter().map(Vec::len).sum()
    }
}

/// First-match classifier over per-category reference sets.
///
/// The reference sets are an approximate color heuristic and may overlap;
/// priority order decides overlaps, so it must match the declared order
/// exactly.
#[derive(Debug, Clone)]
pub struct GlyphClassifier {
    classes: Vec<(CategoryId, HashSet<String>)>,
}

impl GlyphClassifier {
    pub fn classify(&self, glyph: &str) -> Option<CategoryId> {
        self.classes
            .iter()
            .find(|(_, reference)| reference.contains(glyph))
            .map(|(id, _)| *id)
    }
}

/// Accumulates categories and glyph sequences, then seals them into an
/// immutable catalog.
#[derive(Debug)]
pub struct CatalogBuilder {
    names: Vec<String>,
    index: HashMap<String, CategoryId>,
    glyphs: Vec<Vec<String>>,
    placeholder: String,
}

impl CatalogBuilder {
    pub fn new(placeholder: &str) -> Self {
        Self {
            names: Vec::new(),
            index: HashMap::new(),
            glyphs: Vec::new(),
            placeholder: placeholder.to_owned(),
        }
    }

    /// Registers a category, keeping its first-declared position.
    pub fn declare_category(&mut self, name: &str) -> CategoryId {
        if let Some(id) = self.index.get(name) {
            return *id;
        }
        let id = CategoryId(self.names.len());
        self.names.push(name.to_owned());
        self.index.insert(name.to_owned(), id);
        self.glyphs.push(Vec::new());
        id
    }

    /// Appends the grapheme clusters of `glyphs` to a category's sequence.
    pub fn push_literals(&mut self, id: CategoryId, glyphs: &str) {
        for cluster in glyphs.graphemes(true) {
            if cluster.trim().is_empty() {
                continue;
            }
            self.glyphs[id.0].push(cluster.to_owned());
        }
    }

    /// Builds the classifier for the declared classes, in declaration order.
    pub fn classifier(&mut self, classes: &[(String, String)]) -> GlyphClassifier {
        let mut ordered = Vec::with_capacity(classes.len());
        for (category, reference) in classes {
            let id = self.declare_category(category);
            let set = reference
                .graphemes(true)
                .filter(|cluster| !cluster.trim().is_empty())
                .map(str::to_owned)
                .collect::<HashSet<_>>();
            ordered.push((id, set));
        }
        GlyphClassifier { classes: ordered }
    }

    /// Sweeps every code point in the inclusive ranges through the
    /// classifier, appending matches in ascending code-point order.
    /// Unclassifiable code points are skipped; that is not an error.
    pub fn scan_ranges(&mut self, ranges: &[CodePointRange], classifier: &GlyphClassifier) {
        for range in ranges {
            for code in range.start..=range.end {
                let Some(decoded) = char::from_u32(code) else {
                    continue;
                };
                let mut glyph = String::new();
                glyph.push(decoded);
                if let Some(id) = classifier.classify(&glyph) {
                    self.glyphs[id.0].push(glyph);
                }
            }
        }
    }

    /// Seals the catalog. Any category left empty is seeded with the
    /// placeholder glyph so selection never indexes an empty sequence.
    pub fn finish(mut self) -> Result<GlyphCatalog> {
        if self.names.is_empty() {
            return Err(anyhow!("catalog has no categories"));
        }
        for sequence in &mut self.glyphs {
            if sequence.is_empty() {
                sequence.push(self.placeholder.clone());
            }
        }
        Ok(GlyphCatalog {
            names: self.names,
            glyphs: self.glyphs,
        })
    }
}

/// Builds the catalog a manifest describes: literal sequences first where
/// given, then a classified sweep over the configured code-point ranges.
pub fn build_catalog(config: &CatalogConfig) -> Result<GlyphCatalog> {
    let mut builder = CatalogBuilder::new(&config.placeholder);

    let classes = config
        .classes
        .iter()
        .map(|class| (class.category.clone(), class.glyphs.clone()))
        .collect::<Vec<_>>();
    let classifier = builder.classifier(&classes);

    for literal in &config.literals {
        let id = builder.declare_category(&literal.category);
        builder.push_literals(id, &literal.glyphs);
    }

    builder.scan_ranges(&config.ranges, &classifier);
    builder.finish()
}
