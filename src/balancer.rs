//! Distribution balancer: a crude proportional feedback from the realized
//! category histogram back into the spatial scale.
//!
//! Two branches and a clamp, nothing more: under-represented outlier bands
//! get a large scale boost, over-represented middle bands a small creep.

use anyhow::{anyhow, Result};

use crate::catalog::{CategoryId, GlyphCatalog};
use crate::partition::NoisePartition;
use crate::schema::BalancerConfig;

#[derive(Debug, Clone)]
pub struct BalancerPolicy {
    outliers: Vec<CategoryId>,
    middle: Vec<CategoryId>,
    under_threshold: f32,
    over_threshold: f32,
    boost: f32,
    creep: f32,
    min_scale: f32,
    max_scale: f32,
}

impl BalancerPolicy {
    /// Resolves category names against the catalog. Empty `outliers`
    /// defaults to the partition's extreme bands; empty `middle` to every
    /// interior band.
    pub fn from_config(
        config: &BalancerConfig,
        catalog: &GlyphCatalog,
        partition: &NoisePartition,
    ) -> Result<Self> {
        let resolve = |names: &[String]| -> Result<Vec<CategoryId>> {
            names
                .iter()
                .map(|name| {
                    catalog.category_id(name).ok_or_else(|| {
                        anyhow!("balancer references unknown category '{name}'")
                    })
                })
                .collect()
        };

        let mut outliers = resolve(&config.outliers)?;
        if outliers.is_empty() {
            outliers = vec![partition.first_category(), partition.last_category()];
            outliers.dedup();
        }

        let mut middle = resolve(&config.middle)?;
        if middle.is_empty() {
            middle = partition
                .categories()
                .filter(|category| !outliers.contains(category))
                .collect();
            middle.dedup();
        }

        Ok(Self {
            outliers,
            middle,
            under_threshold: config.under_threshold,
            over_threshold: config.over_threshold,
            boost: config.boost,
            creep: config.creep,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
        })
    }

    pub fn scale_bounds(&self) -> (f32, f32) {
        (self.min_scale, self.max_scale)
    }

    /// One adjustment step from a frame's histogram. Returns the new scale,
    /// always inside `[min_scale, max_scale]`.
    pub fn adjust(&self, histogram: &[u32], total_samples: u32, scale: f32) -> f32 {
        if total_samples == 0 {
            return scale.clamp(self.min_scale, self.max_scale);
        }

        let ideal = total_samples as f32 / histogram.len().max(1) as f32;

        let outlier_starved = self.outliers.iter().any(|category| {
            let count = histogram.get(category.index()).copied().unwrap_or(0);
            (count as f32 / ideal) < self.under_threshold
        });

        let adjusted = if outlier_starved {
            scale * self.boost
        } else if !self.middle.is_empty() {
            let middle_total: u32 = self
                .middle
                .iter()
                .map(|category| histogram.get(category.index()).copied().unwrap_or(0))
                .sum();
            let middle_ratio = middle_total as f32 / (self.middle.len() as f32 * ideal);
            if middle_ratio > self.over_threshold {
                scale * self.creep
            } else {
                scale
            }
        } else {
            scale
        };

        adjusted.clamp(self.min_scale, self.max_scale)
    }
}
