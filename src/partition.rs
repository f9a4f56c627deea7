//! Domain partition: maps a noise sample in [0, 1) to a color category and a
//! fractional position inside that category's band.

use anyhow::{anyhow, Result};

use crate::catalog::{CategoryId, GlyphCatalog};
use crate::schema::PartitionConfig;

#[derive(Debug, Clone, Copy)]
struct Band {
    upper: f32,
    category: CategoryId,
}

#[derive(Debug, Clone, Copy)]
struct WarpSegment {
    upper: f32,
    to: f32,
}

/// Ordered band table over [0, 1), with an optional piecewise remap applied
/// to the sample before banding. Bands are half-open: a band owns
/// [previous upper, upper).
#[derive(Debug, Clone)]
pub struct NoisePartition {
    bands: Vec<Band>,
    warp: Vec<WarpSegment>,
}

impl NoisePartition {
    /// Resolves a validated partition config against the catalog's category
    /// set. Unknown category names are a load error, not a render fault.
    pub fn from_config(config: &PartitionConfig, catalog: &GlyphCatalog) -> Result<Self> {
        let bands = config
            .bands
            .iter()
            .map(|band| {
                let category = catalog.category_id(&band.category).ok_or_else(|| {
                    anyhow!(
                        "partition references unknown category '{}'. Declare it in the catalog",
                        band.category
                    )
                })?;
                Ok(Band {
                    upper: band.upper,
                    category,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let warp = config
            .warp
            .iter()
            .map(|segment| WarpSegment {
                upper: segment.upper,
                to: segment.to,
            })
            .collect();

        Ok(Self { bands, warp })
    }

    pub fn first_category(&self) -> CategoryId {
        self.bands[0].category
    }

    pub fn last_category(&self) -> CategoryId {
        self.bands[self.bands.len() - 1].category
    }

    pub fn categories(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.bands.iter().map(|band| band.category)
    }

    /// Maps a sample to its category and its linear position within the
    /// band, both half-open. A sample at or above 1 clamps to just under 1
    /// instead of faulting; the noise contract forbids it, but a blended
    /// octave sum can brush the ceiling.
    pub fn categorize(&self, sample: f32) -> (CategoryId, f32) {
        let sample = sample.clamp(0.0, 1.0 - f32::EPSILON);
        let sample = self.warp(sample);

        let mut lower = 0.0_f32;
        for band in &self.bands {
            if sample < band.upper {
                let position = (sample - lower) / (band.upper - lower);
                return (band.category, position.clamp(0.0, 1.0 - f32::EPSILON));
            }
            lower = band.upper;
        }

        // Unreachable once bands end at 1.0 and the sample is clamped below
        // it; the last band is the catch-all regardless.
        let last = &self.bands[self.bands.len() - 1];
        (last.category, 1.0 - f32::EPSILON)
    }

    fn warp(&self, sample: f32) -> f32 {
        if self.warp.is_empty() {
            return sample;
        }

        let mut lower = 0.0_f32;
        let mut lower_to = 0.0_f32;
        for segment in &self.warp {
            if sample < segment.upper {
                let span = segment.upper - lower;
                let mapped = lower_to + (sample - lower) / span * (segment.to - lower_to);
                return mapped.clamp(0.0, 1.0 - f32::EPSILON);
            }
            lower = segment.upper;
            lower_to = segment.to;
        }
        sample
    }
}
