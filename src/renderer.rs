//! Frame orchestration: drives FieldSampler → NoisePartition → GlyphSelector
//! across the grid, draws into a GlyphFrame, and closes the balancer
//! feedback loop.
//!
//! All mutable session state (offset, scale, histogram) lives in an explicit
//! state struct owned here; components stay stateless and receive what they
//! need per call.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::balancer::BalancerPolicy;
use crate::catalog::{build_catalog, GlyphCatalog};
use crate::field::FieldSampler;
use crate::frame::GlyphFrame;
use crate::noise::{NoiseSource, PerlinField};
use crate::offset::{DragEvent, OffsetController, ViewOffset};
use crate::partition::NoisePartition;
use crate::schema::{InteractionConfig, Manifest};
use crate::selector::select_glyph;

/// Discrete input delivered between frames; applied atomically before the
/// next frame renders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Drag(DragEvent),
    Resize { columns: u32, rows: u32 },
}

/// Mutable per-session state. The offset and scale persist across frames;
/// the histogram is rebuilt every frame.
#[derive(Debug, Clone)]
struct SessionState {
    controller: OffsetController,
    scale: f32,
    histogram: Vec<u32>,
}

/// Category counts realized by the most recent frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameStats {
    pub frame: u32,
    pub total: u32,
    pub scale: f32,
    pub counts: BTreeMap<String, u32>,
}

pub struct HeatmapRenderer {
    catalog: GlyphCatalog,
    partition: NoisePartition,
    sampler: FieldSampler,
    balancer: Option<BalancerPolicy>,
    columns: usize,
    rows: usize,
    time_step: f32,
    last_frame: u32,
    state: SessionState,
}

impl HeatmapRenderer {
    /// Builds the pipeline a validated manifest describes, with the default
    /// Perlin noise primitive.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self> {
        let noise = Box::new(PerlinField::new(manifest.field.seed));
        Self::with_noise(manifest, noise)
    }

    /// Same pipeline with a caller-supplied noise primitive. Tests inject
    /// scripted sources through this seam.
    pub fn with_noise(manifest: &Manifest, noise: Box<dyn NoiseSource>) -> Result<Self> {
        let catalog = build_catalog(&manifest.catalog)?;
        let partition = NoisePartition::from_config(&manifest.partition, &catalog)?;
        let balancer = manifest
            .balancer
            .as_ref()
            .map(|config| BalancerPolicy::from_config(config, &catalog, &partition))
            .transpose()?;
        let sampler = FieldSampler::from_config(noise, &manifest.field);

        let category_count = catalog.category_count();
        Ok(Self {
            catalog,
            partition,
            sampler,
            balancer,
            columns: manifest.environment.grid.columns as usize,
            rows: manifest.environment.grid.rows as usize,
            time_step: manifest.field.time_step,
            last_frame: 0,
            state: SessionState {
                controller: OffsetController::new(manifest.interaction.sensitivity),
                scale: manifest.field.scale,
                histogram: vec![0; category_count],
            },
        })
    }

    pub fn catalog(&self) -> &GlyphCatalog {
        &self.catalog
    }

    pub fn grid(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    pub fn offset(&self) -> ViewOffset {
        self.state.controller.offset()
    }

    pub fn scale(&self) -> f32 {
        self.state.scale
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Drag(drag) => self.state.controller.on_drag(drag),
            InputEvent::Resize { columns, rows } => {
                self.columns = columns.max(1) as usize;
                self.rows = rows.max(1) as usize;
            }
        }
    }

    /// Renders one frame: every cell row-major through the sampling →
    /// partition → selection pipeline, then one balancer step over the
    /// realized histogram.
    pub fn render_frame(&mut self, frame_index: u32) -> GlyphFrame {
        let mut frame = GlyphFrame::blank(self.columns, self.rows);
        let time = frame_index as f32 * self.time_step;
        let offset = self.state.controller.offset();

        self.state.histogram.iter_mut().for_each(|count| *count = 0);

        for y in 0..self.rows {
            for x in 0..self.columns {
                let sample =
                    self.sampler
                        .sample(x as f32, y as f32, offset, time, self.state.scale);
                let (category, position) = self.partition.categorize(sample);
                let glyph = select_glyph(&self.catalog, category, position);
                frame.set(x, y, glyph);
                self.state.histogram[category.index()] += 1;
            }
        }

        if let Some(balancer) = &self.balancer {
            let total = (self.columns * self.rows) as u32;
            self.state.scale = balancer.adjust(&self.state.histogram, total, self.state.scale);
        }

        self.last_frame = frame_index;
        frame
    }

    /// Stats for the most recently rendered frame.
    pub fn frame_stats(&self) -> FrameStats {
        let counts = self
            .catalog
            .category_names()
            .zip(self.state.histogram.iter())
            .map(|(name, count)| (name.to_owned(), *count))
            .collect::<BTreeMap<_, _>>();
        FrameStats {
            frame: self.last_frame,
            total: self.state.histogram.iter().sum(),
            scale: self.state.scale,
            counts,
        }
    }
}

/// Expands the manifest's scripted gestures into the events due before
/// `frame` renders.
pub fn scripted_events(interaction: &InteractionConfig, frame: u32) -> Vec<InputEvent> {
    interaction
        .gestures
        .iter()
        .filter(|gesture| gesture.frame == frame)
        .filter_map(|gesture| {
            if let Some(drag) = &gesture.drag {
                return Some(InputEvent::Drag(DragEvent {
                    prev_x: drag.from[0],
                    prev_y: drag.from[1],
                    cur_x: drag.to[0],
                    cur_y: drag.to[1],
                }));
            }
            gesture.resize.map(|resize| InputEvent::Resize {
                columns: resize.columns,
                rows: resize.rows,
            })
        })
        .collect()
}
