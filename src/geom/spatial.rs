use crate::model::{Bounds, LatLng};
use std::collections::HashMap;

/// Spatial hash grid over the marker snapshot.
///
/// Divides the world into fixed-size cells keyed by floor-divided
/// lng/lat and stores marker indices per cell. A polygon's bounds query
/// returns every marker that could fall inside them (false positives
/// allowed, false negatives never); the exact ray-cast test runs only on
/// the survivors. Rebuilt from scratch each classification pass; the
/// marker set is replaced wholesale between passes.
pub struct MarkerGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl MarkerGrid {
    /// Build from marker positions with the given cell size in degrees
    pub fn build(positions: impl IntoIterator<Item = LatLng>, cell_size: f64) -> Self {
        let mut grid = Self {
            cells: HashMap::new(),
            cell_size,
        };
        for (idx, pos) in positions.into_iter().enumerate() {
            let cell = grid.to_cell(pos);
            grid.cells.entry(cell).or_default().push(idx);
        }
        grid
    }

    #[inline(always)]
    fn to_cell(&self, pos: LatLng) -> (i32, i32) {
        let x = (pos.lng / self.cell_size).floor() as i32;
        let y = (pos.lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Marker indices in every cell overlapping the bounds.
    ///
    /// Points live in exactly one cell, so the result carries no
    /// duplicates.
    pub fn query_bounds(&self, bounds: &Bounds) -> Vec<usize> {
        let min_cell = self.to_cell(LatLng::new(bounds.min_lat, bounds.min_lng));
        let max_cell = self.to_cell(LatLng::new(bounds.max_lat, bounds.max_lng));

        let mut results = Vec::new();
        for y in min_cell.1..=max_cell.1 {
            for x in min_cell.0..=max_cell.0 {
                if let Some(indices) = self.cells.get(&(x, y)) {
                    results.extend_from_slice(indices);
                }
            }
        }
        results
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
