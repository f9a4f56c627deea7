//! Pan offset accumulated from pointer drags.

/// 2D view offset added to every cell coordinate before noise sampling.
/// Accumulates for the whole session; never wraps, never clamps.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewOffset {
    pub x: f32,
    pub y: f32,
}

/// One pointer drag, as delivered by the input source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEvent {
    pub prev_x: f32,
    pub prev_y: f32,
    pub cur_x: f32,
    pub cur_y: f32,
}

/// Turns drag deltas into offset movement. The sign is inverted so dragging
/// right pulls the sampled field left, which reads as dragging the pattern
/// under the cursor.
#[derive(Debug, Clone)]
pub struct OffsetController {
    offset: ViewOffset,
    sensitivity: f32,
}

impl OffsetController {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            offset: ViewOffset::default(),
            sensitivity,
        }
    }

    pub fn offset(&self) -> ViewOffset {
        self.offset
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn on_drag(&mut self, drag: DragEvent) {
        self.offset.x += -(drag.cur_x - drag.prev_x) * self.sensitivity;
        self.offset.y += -(drag.cur_y - drag.prev_y) * self.sensitivity;
    }
}
