use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> u64 {
        self.x as u64 + self.w as u64
    }

    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.h as u64
    }

    /// Open-interval overlap test.
    ///
    /// Rectangles that only share an edge or a corner do not intersect, so a
    /// rectangle may be placed flush against its neighbours.
    pub fn intersects(&self, other: &Rect) -> bool {
        let (ax, ay, aw, ah) = (self.x as i64, self.y as i64, self.w as i64, self.h as i64);
        let (bx, by, bw, bh) = (other.x as i64, other.y as i64, other.w as i64, other.h as i64);
        ax > bx - aw && ax < bx + bw && ay > by - ah && ay < by + bh
    }
}

/// A leaf image placed within the atlas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Frame {
    /// `/`-joined path of the leaf inside the asset tree.
    pub key: String,
    /// Placed rectangle (image size, padding excluded).
    pub frame: Rect,
}

/// Result of packing an asset tree: canvas size plus one frame per leaf.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    /// Canvas width after power-of-two/square adjustments.
    pub width: u32,
    /// Canvas height after power-of-two/square adjustments.
    pub height: u32,
    /// Bounding box of the placed images.
    pub content_width: u32,
    pub content_height: u32,
    /// Frames in packing order.
    pub frames: Vec<Frame>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Layout {
    pub fn new(width: u32, height: u32, content: (u32, u32), frames: Vec<Frame>) -> Self {
        let index = frames
            .iter()
            .enumerate()
            .map(|(i, f)| (f.key.clone(), i))
            .collect();
        Self {
            width,
            height,
            content_width: content.0,
            content_height: content.1,
            frames,
            index,
        }
    }

    /// Looks up the placement of a leaf by its key.
    pub fn placement(&self, key: &str) -> Option<Rect> {
        self.index.get(key).map(|&i| self.frames[i].frame)
    }

    /// Computes packing statistics for this layout.
    pub fn stats(&self) -> PackStats {
        let canvas_area = (self.width as u64) * (self.height as u64);
        let used_area: u64 = self
            .frames
            .iter()
            .map(|f| (f.frame.w as u64) * (f.frame.h as u64))
            .sum();
        let occupancy = if canvas_area > 0 {
            used_area as f64 / canvas_area as f64
        } else {
            0.0
        };
        PackStats {
            num_frames: self.frames.len(),
            canvas_width: self.width,
            canvas_height: self.height,
            canvas_area,
            used_area,
            occupancy,
        }
    }
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    pub num_frames: usize,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Canvas width * height.
    pub canvas_area: u64,
    /// Sum of frame width * height.
    pub used_area: u64,
    /// used_area / canvas_area (0.0 to 1.0). Higher is better.
    pub occupancy: f64,
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Frames: {}, Canvas: {}x{}, Occupancy: {:.2}%, Used Area: {} px², Wasted: {} px²",
            self.num_frames,
            self.canvas_width,
            self.canvas_height,
            self.occupancy * 100.0,
            self.used_area,
            self.wasted_area(),
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.canvas_area.saturating_sub(self.used_area)
    }
}
