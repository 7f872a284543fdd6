use std::fmt;

use serde::Serialize;

use crate::error::GridError;

/// Default number of grid rows.
pub const DEFAULT_ROWS: u32 = 3;

/// Default number of grid columns.
pub const DEFAULT_COLS: u32 = 4;

// =============================================================================
// GridSpec
// =============================================================================

/// Row and column count of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
}

impl GridSpec {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Total number of tiles the grid produces.
    pub fn tile_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Check that both counts are positive.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GridError::InvalidGridSpec {
                rows: self.rows,
                cols: self.cols,
                reason: "rows and cols must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Map a row-major index back to `(row, col)`.
    pub fn position(&self, index: usize) -> Option<(u32, u32)> {
        if self.cols == 0 || index >= self.tile_count() {
            return None;
        }
        let cols = self.cols as usize;
        Some(((index / cols) as u32, (index % cols) as u32))
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl fmt::Display for GridSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

// =============================================================================
// RemainderPolicy
// =============================================================================

/// What to do with pixels left over by floor division.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Every cell is exactly `cell_width × cell_height`; the trailing strip
    /// along each axis belongs to no tile.
    #[default]
    Drop,

    /// The last column extends to `width` and the last row to `height`.
    Stretch,
}

impl RemainderPolicy {
    pub const fn name(&self) -> &'static str {
        match self {
            RemainderPolicy::Drop => "drop",
            RemainderPolicy::Stretch => "stretch",
        }
    }
}

// =============================================================================
// Region
// =============================================================================

/// Pixel rectangle of one tile, `[left, right) × [top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
    pub row: u32,
    pub col: u32,
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Region {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Row-major position of this region in a grid with `cols` columns.
    pub fn index(&self, cols: u32) -> usize {
        self.row as usize * cols as usize + self.col as usize
    }

    /// Whether two regions share at least one pixel.
    pub fn overlaps(&self, other: &Region) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// Whether the region is non-empty and lies inside a `width × height` raster.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.left < self.right
            && self.top < self.bottom
            && self.right <= width
            && self.bottom <= height
    }
}

// =============================================================================
// Partitioning
// =============================================================================

/// Partition a raster into grid regions using [`RemainderPolicy::Drop`].
///
/// Returns `rows * cols` regions in row-major order.
///
/// # Errors
///
/// - [`GridError::InvalidGridSpec`] if `rows` or `cols` is zero, or if the
///   grid has more columns than `width` (rows than `height`) pixels
/// - [`GridError::InvalidRaster`] if `width` or `height` is zero
pub fn partition(width: u32, height: u32, grid: GridSpec) -> Result<Vec<Region>, GridError> {
    partition_with(width, height, grid, RemainderPolicy::Drop)
}

/// Partition a raster into grid regions with an explicit remainder policy.
pub fn partition_with(
    width: u32,
    height: u32,
    grid: GridSpec,
    policy: RemainderPolicy,
) -> Result<Vec<Region>, GridError> {
    grid.validate()?;

    if width == 0 || height == 0 {
        return Err(GridError::InvalidRaster {
            reason: format!("dimensions must be positive, got {}x{}", width, height),
        });
    }

    // A zero-sized cell would produce empty regions
    if grid.cols > width || grid.rows > height {
        return Err(GridError::InvalidGridSpec {
            rows: grid.rows,
            cols: grid.cols,
            reason: format!("grid is finer than the {}x{} raster", width, height),
        });
    }

    let cell_width = width / grid.cols;
    let cell_height = height / grid.rows;

    let mut regions = Vec::with_capacity(grid.tile_count());
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let left = col * cell_width;
            let top = row * cell_height;
            let mut right = (left + cell_width).min(width);
            let mut bottom = (top + cell_height).min(height);

            if policy == RemainderPolicy::Stretch {
                if col == grid.cols - 1 {
                    right = width;
                }
                if row == grid.rows - 1 {
                    bottom = height;
                }
            }

            regions.push(Region {
                row,
                col,
                left,
                top,
                right,
                bottom,
            });
        }
    }

    Ok(regions)
}

// =============================================================================
// Tests
// =============================================================================
