use anyhow::{bail, Result};
use serde::{de::Error as DeError, Deserialize, Deserializer};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub environment: Environment,
    pub field: FieldConfig,
    pub partition: PartitionConfig,
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub balancer: Option<BalancerConfig>,
    #[serde(default)]
    pub interaction: InteractionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Environment {
    pub grid: GridSize,
    pub fps: u32,
    pub duration: Duration,
}

impl Environment {
    pub fn validate(&self) -> Result<()> {
        if self.grid.columns == 0 || self.grid.rows == 0 {
            bail!(
                "grid must be positive, got {}x{}",
                self.grid.columns,
                self.grid.rows
            );
        }

        if self.fps == 0 {
            bail!("fps must be > 0");
        }

        match self.duration {
            Duration::Seconds(seconds) => {
                if seconds <= 0.0 {
                    bail!("duration in seconds must be > 0");
                }
            }
            Duration::Frames { frames } => {
                if frames == 0 {
                    bail!("duration frames must be > 0");
                }
            }
        }

        Ok(())
    }

    pub fn total_frames(&self) -> u32 {
        match self.duration {
            Duration::Seconds(seconds) => {
                let frames = (seconds * self.fps as f32).ceil();
                frames.max(1.0) as u32
            }
            Duration::Frames { frames } => frames.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSize {
    pub columns: u32,
    pub rows: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum Duration {
    Seconds(f32),
    Frames { frames: u32 },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    pub scale: f32,
    #[serde(default = "default_time_step")]
    pub time_step: f32,
    #[serde(default)]
    pub seed: u32,
    #[serde(default)]
    pub octaves: Option<OctaveConfig>,
}

impl FieldConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            bail!("field.scale must be positive, got {}", self.scale);
        }
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            bail!("field.time_step must be positive, got {}", self.time_step);
        }
        if let Some(octaves) = &self.octaves {
            octaves.validate()?;
        }
        Ok(())
    }
}

/// Detail octave blended over the base field. The detail layer runs at a
/// higher spatial and temporal frequency than the base layer.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OctaveConfig {
    #[serde(default = "default_detail_frequency")]
    pub detail_frequency: f32,
    #[serde(default = "default_detail_time_factor")]
    pub detail_time_factor: f32,
    #[serde(default = "default_base_weight")]
    pub base_weight: f32,
    #[serde(default = "default_detail_weight")]
    pub detail_weight: f32,
}

impl OctaveConfig {
    pub fn validate(&self) -> Result<()> {
        if self.detail_frequency <= 1.0 {
            bail!(
                "field.octaves.detail_frequency must exceed 1, got {}",
                self.detail_frequency
            );
        }
        if self.detail_time_factor <= 1.0 {
            bail!(
                "field.octaves.detail_time_factor must exceed 1, got {}",
                self.detail_time_factor
            );
        }
        if self.base_weight <= 0.0 || self.detail_weight < 0.0 {
            bail!("field.octaves weights must be positive");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartitionConfig {
    pub bands: Vec<BandConfig>,
    #[serde(default)]
    pub warp: Vec<WarpConfig>,
}

impl PartitionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bands.is_empty() {
            bail!("partition.bands must not be empty");
        }

        let mut previous = 0.0_f32;
        for band in &self.bands {
            if !band.upper.is_finite() || band.upper <= previous || band.upper > 1.0 {
                bail!(
                    "partition band '{}' upper bound {} must increase within (0, 1]",
                    band.category,
                    band.upper
                );
            }
            previous = band.upper;
        }
        let last = self.bands.last().map(|band| band.upper).unwrap_or(0.0);
        if (last - 1.0).abs() > f32::EPSILON {
            bail!("partition bands must end at 1.0, got {last}");
        }

        if !self.warp.is_empty() {
            let mut previous_upper = 0.0_f32;
            let mut previous_to = 0.0_f32;
            for segment in &self.warp {
                if segment.upper <= previous_upper || segment.upper > 1.0 {
                    bail!(
                        "partition warp bound {} must increase within (0, 1]",
                        segment.upper
                    );
                }
                if segment.to <= previous_to || segment.to > 1.0 {
                    bail!(
                        "partition warp target {} must increase within (0, 1]",
                        segment.to
                    );
                }
                previous_upper = segment.upper;
                previous_to = segment.to;
            }
            let last = &self.warp[self.warp.len() - 1];
            if (last.upper - 1.0).abs() > f32::EPSILON || (last.to - 1.0).abs() > f32::EPSILON {
                bail!("partition warp must end at upper: 1.0, to: 1.0");
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandConfig {
    pub upper: f32,
    pub category: String,
}

/// One segment of the piecewise remap applied before banding: samples in
/// [previous upper, upper) map linearly onto [previous to, to).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarpConfig {
    pub upper: f32,
    pub to: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    #[serde(default)]
    pub ranges: Vec<CodePointRange>,
    #[serde(default)]
    pub classes: Vec<ClassConfig>,
    #[serde(default)]
    pub literals: Vec<ClassConfig>,
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() && self.literals.is_empty() {
            bail!("catalog must declare classes or literals");
        }
        if !self.ranges.is_empty() && self.classes.is_empty() {
            bail!("catalog.ranges requires catalog.classes to classify against");
        }
        if self.placeholder.is_empty() {
            bail!("catalog.placeholder must not be empty");
        }

        for range in &self.ranges {
            if range.start > range.end {
                bail!(
                    "catalog range {:#X}-{:#X} is reversed",
                    range.start,
                    range.end
                );
            }
        }

        for class in self.classes.iter().chain(self.literals.iter()) {
            if class.category.trim().is_empty() {
                bail!("catalog category name cannot be empty");
            }
        }

        Ok(())
    }
}

/// Inclusive code-point range, written as hex strings in the manifest
/// (`{ start: "1F300", end: "1F5FF" }`).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodePointRange {
    #[serde(deserialize_with = "deserialize_code_point")]
    pub start: u32,
    #[serde(deserialize_with = "deserialize_code_point")]
    pub end: u32,
}

fn deserialize_code_point<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Hex(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Hex(text) => {
            let digits = text
                .trim()
                .trim_start_matches("U+")
                .trim_start_matches("0x");
            u32::from_str_radix(digits, 16)
                .map_err(|_| DeError::custom(format!("invalid code point '{text}'")))
        }
    }
}

/// A category's reference glyphs. In `classes` the list order is the
/// classifier priority (first match wins); in `literals` the glyphs become
/// the category's sequence directly.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassConfig {
    pub category: String,
    pub glyphs: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BalancerConfig {
    #[serde(default)]
    pub outliers: Vec<String>,
    #[serde(default)]
    pub middle: Vec<String>,
    #[serde(default = "default_under_threshold")]
    pub under_threshold: f32,
    #[serde(default = "default_over_threshold")]
    pub over_threshold: f32,
    #[serde(default = "default_boost")]
    pub boost: f32,
    #[serde(default = "default_creep")]
    pub creep: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl BalancerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_scale <= 0.0 || self.max_scale <= self.min_scale {
            bail!(
                "balancer scale range [{}, {}] must be positive and ordered",
                self.min_scale,
                self.max_scale
            );
        }
        if self.under_threshold <= 0.0 || self.over_threshold <= 0.0 {
            bail!("balancer thresholds must be positive");
        }
        if self.boost <= 1.0 || self.creep <= 1.0 {
            bail!("balancer growth factors must exceed 1");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InteractionConfig {
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    #[serde(default)]
    pub gestures: Vec<GestureConfig>,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            gestures: Vec::new(),
        }
    }
}

impl InteractionConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            bail!(
                "interaction.sensitivity must be positive, got {}",
                self.sensitivity
            );
        }
        for gesture in &self.gestures {
            gesture.validate()?;
        }
        Ok(())
    }
}

/// Scripted input delivered before the named frame renders. Exactly one of
/// `drag` or `resize` must be present.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GestureConfig {
    pub frame: u32,
    #[serde(default)]
    pub drag: Option<DragGesture>,
    #[serde(default)]
    pub resize: Option<ResizeGesture>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DragGesture {
    pub from: [f32; 2],
    pub to: [f32; 2],
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResizeGesture {
    pub columns: u32,
    pub rows: u32,
}

impl GestureConfig {
    pub fn validate(&self) -> Result<()> {
        match (&self.drag, &self.resize) {
            (Some(_), Some(_)) | (None, None) => {
                bail!(
                    "gesture at frame {} must script exactly one of drag or resize",
                    self.frame
                );
            }
            _ => {}
        }
        if let Some(resize) = &self.resize {
            if resize.columns == 0 || resize.rows == 0 {
                bail!("gesture at frame {} resizes to an empty grid", self.frame);
            }
        }
        Ok(())
    }
}

pub fn validate_manifest_schema(manifest: &Manifest) -> Result<()> {
    manifest.environment.validate()?;
    manifest.field.validate()?;
    manifest.partition.validate()?;
    manifest.catalog.validate()?;
    if let Some(balancer) = &manifest.balancer {
        balancer.validate()?;
    }
    manifest.interaction.validate()?;
    Ok(())
}

fn default_time_step() -> f32 {
    0.0009
}

fn default_detail_frequency() -> f32 {
    8.0
}

fn default_detail_time_factor() -> f32 {
    3.0
}

fn default_base_weight() -> f32 {
    0.8
}

fn default_detail_weight() -> f32 {
    0.3
}

fn default_placeholder() -> String {
    "❓".to_owned()
}

fn default_under_threshold() -> f32 {
    0.5
}

fn default_over_threshold() -> f32 {
    1.2
}

fn default_boost() -> f32 {
    10.0
}

fn default_creep() -> f32 {
    1.05
}

fn default_sensitivity() -> f32 {
    0.4
}
