use crate::error::{Result, SheetPackError};
use crate::model::Rect;
use tracing::trace;

/// Greedy placement engine over a frontier of candidate origins.
///
/// Every placed rectangle consumes one frontier point and frees two new ones:
/// its top-right and bottom-left corners. Each call to [`place`] tries every
/// frontier point, drops the ones that would overlap something already placed,
/// and keeps the point whose resulting bounding box has the smallest area.
/// Ties go to the point that entered the frontier first. Placements are never
/// revisited.
///
/// [`place`]: FrontierPacker::place
#[derive(Debug, Clone)]
pub struct FrontierPacker {
    frontier: Vec<(u32, u32)>,
    placed: Vec<Rect>,
    // running max of x+w / y+h over `placed`
    bounds: (u32, u32),
    max_width: Option<u32>,
    max_height: Option<u32>,
}

impl Default for FrontierPacker {
    fn default() -> Self {
        Self::new()
    }
}

impl FrontierPacker {
    /// Unbounded packer with the frontier seeded at the origin.
    pub fn new() -> Self {
        Self::with_limits(None, None)
    }

    /// Packer that rejects any position extending past the given ceilings.
    pub fn with_limits(max_width: Option<u32>, max_height: Option<u32>) -> Self {
        Self {
            frontier: vec![(0, 0)],
            placed: Vec::new(),
            bounds: (0, 0),
            max_width,
            max_height,
        }
    }

    /// Places a `width` x `height` rectangle and returns its origin.
    ///
    /// Fails with [`SheetPackError::NoViablePosition`] when no frontier point
    /// can hold the rectangle: zero-sized input, coordinate overflow, a
    /// configured ceiling, or every point overlapping a placed rectangle.
    pub fn place(&mut self, width: u32, height: u32) -> Result<(u32, u32)> {
        let no_room = || SheetPackError::NoViablePosition {
            width,
            height,
            placed: self.placed.len(),
        };
        if width == 0 || height == 0 {
            return Err(no_room());
        }

        let mut best: Option<(usize, u32, u32, u64)> = None;
        for (idx, &(px, py)) in self.frontier.iter().enumerate() {
            let (Some(right), Some(bottom)) = (px.checked_add(width), py.checked_add(height))
            else {
                continue;
            };
            if !self.within_limits(right, bottom) {
                continue;
            }
            let candidate = Rect::new(px, py, width, height);
            if self.placed.iter().any(|r| candidate.intersects(r)) {
                continue;
            }
            let score = (self.bounds.0.max(right) as u64) * (self.bounds.1.max(bottom) as u64);
            match best {
                Some((_, _, _, best_score)) if best_score <= score => {}
                _ => best = Some((idx, right, bottom, score)),
            }
        }

        let Some((idx, right, bottom, score)) = best else {
            return Err(no_room());
        };
        let (x, y) = self.frontier.remove(idx);
        self.frontier.push((right, y));
        self.frontier.push((x, bottom));
        self.placed.push(Rect::new(x, y, width, height));
        self.bounds = (self.bounds.0.max(right), self.bounds.1.max(bottom));
        trace!(x, y, width, height, score, frontier = self.frontier.len(), "placed");
        Ok((x, y))
    }

    /// Size of the origin-anchored box enclosing every placed rectangle.
    pub fn bounding_size(&self) -> (u32, u32) {
        self.bounds
    }

    /// Candidate origins in discovery order.
    pub fn frontier(&self) -> &[(u32, u32)] {
        &self.frontier
    }

    /// Placed rectangles in placement order.
    pub fn placed(&self) -> &[Rect] {
        &self.placed
    }

    fn within_limits(&self, right: u32, bottom: u32) -> bool {
        self.max_width.is_none_or(|w| right <= w) && self.max_height.is_none_or(|h| bottom <= h)
    }
}
