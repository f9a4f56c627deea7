use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use crate::schema::{validate_manifest_schema, Manifest};

/// One `--set key=value` override, applied after parse and before
/// validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamOverride {
    pub key: String,
    pub value: f32,
}

impl ParamOverride {
    pub fn parse(raw: &str) -> Result<Self> {
        let Some((key, value)) = raw.split_once('=') else {
            bail!("override '{raw}' must look like key=value");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("override '{raw}' has an empty key");
        }
        let value = value
            .trim()
            .parse::<f32>()
            .map_err(|_| anyhow!("override '{raw}' has a non-numeric value"))?;
        Ok(Self {
            key: key.to_owned(),
            value,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ManifestLoadOptions {
    pub overrides: Vec<ParamOverride>,
}

pub fn load_and_validate_manifest(path: &Path) -> Result<Manifest> {
    load_and_validate_manifest_with_options(path, &ManifestLoadOptions::default())
}

pub fn load_and_validate_manifest_with_options(
    path: &Path,
    options: &ManifestLoadOptions,
) -> Result<Manifest> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let mut manifest: Manifest = serde_yaml::from_str(&contents).map_err(|error| {
        let location = error
            .location()
            .map(|location| format!("line {}, column {}", location.line(), location.column()))
            .unwrap_or_else(|| "unknown location".to_owned());
        anyhow!(
            "failed to parse yaml in {} at {}: {}",
            path.display(),
            location,
            error
        )
    })?;

    apply_overrides(&mut manifest, &options.overrides)?;
    validate_manifest_schema(&manifest)?;
    Ok(manifest)
}

fn apply_overrides(manifest: &mut Manifest, overrides: &[ParamOverride]) -> Result<()> {
    for entry in overrides {
        match entry.key.as_str() {
            "field.scale" => manifest.field.scale = entry.value,
            "field.time_step" => manifest.field.time_step = entry.value,
            "field.seed" => manifest.field.seed = entry.value as u32,
            "interaction.sensitivity" => manifest.interaction.sensitivity = entry.value,
            other => bail!(
                "unknown override key '{other}' (supported: field.scale, field.time_step, \
                 field.seed, interaction.sensitivity)"
            ),
        }
    }
    Ok(())
}
