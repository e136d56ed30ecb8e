//! Uniform-grid spatial hash.
//!
//! Space is cut into square cells of `cell_size`; each node is stored in the
//! bucket of the cell containing its centre. A neighbour query scans the 3x3
//! block of cells around the query point, so any node within `cell_size` of
//! it is always returned. Candidates farther away may also be returned and
//! callers still check the exact distance.

use std::collections::HashMap;

use crate::layout::Vec2;

/// Quantized cell coordinate: `(floor(x / cell_size), floor(y / cell_size))`.
pub type CellKey = (i32, i32);

/// Spatial hash over node slots.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<usize>>,
    len: usize,
}

impl SpatialHash {
    /// Create an empty hash. Cell size should be at least the query radius.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: sanitize(cell_size),
            cells: HashMap::new(),
            len: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing a point.
    #[inline]
    pub fn cell_of(&self, pos: Vec2) -> CellKey {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    /// Insert a node slot at a position.
    pub fn insert(&mut self, slot: usize, pos: Vec2) {
        let key = self.cell_of(pos);
        self.cells.entry(key).or_default().push(slot);
        self.len += 1;
    }

    /// Replace the contents with `points`, switching to a new cell size.
    ///
    /// Bucket allocations are kept for reuse across iterations.
    pub fn rebuild<I>(&mut self, cell_size: f32, points: I)
    where
        I: IntoIterator<Item = (usize, Vec2)>,
    {
        self.clear();
        self.cell_size = sanitize(cell_size);
        for (slot, pos) in points {
            self.insert(slot, pos);
        }
    }

    /// Slots stored in the 3x3 cell block around `pos`, in no particular order.
    pub fn nearby(&self, pos: Vec2) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.cell_of(pos);
        (-1..=1)
            .flat_map(move |dx| (-1..=1).map(move |dy| (cx + dx, cy + dy)))
            .filter_map(move |key| self.cells.get(&key))
            .flat_map(|bucket| bucket.iter().copied())
    }

    /// Clear all slots, keeping bucket allocations.
    pub fn clear(&mut self) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Number of slots in the hash.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for SpatialHash {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Zero, negative or non-finite cell sizes would put everything in one
/// degenerate cell or overflow the key.
fn sanitize(cell_size: f32) -> f32 {
    if cell_size.is_finite() && cell_size > f32::EPSILON {
        cell_size
    } else {
        1.0
    }
}
