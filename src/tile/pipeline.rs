//! Grid-cut pipeline.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌──────────────────────────┐
//! │ DynamicImage │ ──▶ │ partition_with() │ ──▶ │ compose() per region     │
//! │  (borrowed)  │     │  (single thread) │     │ (rayon, collect by index)│
//! └──────────────┘     └──────────────────┘     └────────────┬─────────────┘
//!                                                            ▼
//!                                                 Vec<Tile> in row-major order
//! ```
//!
//! Structural errors (bad grid, empty raster) are returned before any tile is
//! cropped. Watermark failures are absorbed per tile.

use image::DynamicImage;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::GridError;
use crate::grid::{partition_with, GridSpec, Region, RemainderPolicy};

use super::compose::{compose, Tile};
use super::watermark::{BitmapRenderer, WatermarkRenderer, WatermarkSpec};

// =============================================================================
// GridCutter
// =============================================================================

/// Cuts rasters into watermarked tiles.
///
/// Holds only configuration, so a single cutter can be shared across threads
/// and reused for any number of images.
///
/// # Example
///
/// ```
/// use gridcut::grid::GridSpec;
/// use gridcut::tile::{GridCutter, WatermarkSpec};
/// use image::{DynamicImage, RgbImage};
///
/// let raster = DynamicImage::ImageRgb8(RgbImage::new(1200, 900));
/// let cutter = GridCutter::new();
///
/// let tiles = cutter
///     .cut_and_stamp(&raster, GridSpec::new(3, 4), &WatermarkSpec::default())
///     .unwrap();
///
/// assert_eq!(tiles.len(), 12);
/// assert_eq!(tiles[11].label, "3-4");
/// ```
#[derive(Debug, Clone)]
pub struct GridCutter<R = BitmapRenderer> {
    renderer: R,
    policy: RemainderPolicy,
    parallel: bool,
}

impl GridCutter<BitmapRenderer> {
    /// Create a cutter with the bitmap renderer, dropped remainders and
    /// parallel composition.
    pub fn new() -> Self {
        Self {
            renderer: BitmapRenderer::new(),
            policy: RemainderPolicy::Drop,
            parallel: true,
        }
    }
}

impl Default for GridCutter<BitmapRenderer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: WatermarkRenderer> GridCutter<R> {
    /// Swap the watermark renderer.
    pub fn with_renderer<T: WatermarkRenderer>(self, renderer: T) -> GridCutter<T> {
        GridCutter {
            renderer,
            policy: self.policy,
            parallel: self.parallel,
        }
    }

    pub fn with_remainder_policy(mut self, policy: RemainderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enable or disable composing tiles on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn remainder_policy(&self) -> RemainderPolicy {
        self.policy
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Regions this cutter would produce for a `width × height` raster.
    pub fn plan(&self, width: u32, height: u32, grid: GridSpec) -> Result<Vec<Region>, GridError> {
        partition_with(width, height, grid, self.policy)
    }

    /// Cut `raster` into `grid.rows * grid.cols` stamped tiles.
    ///
    /// Tiles are returned in row-major order whether or not they were composed
    /// in parallel.
    ///
    /// # Errors
    ///
    /// - [`GridError::InvalidGridSpec`] / [`GridError::InvalidRaster`] from
    ///   partitioning; no tile work is done in that case
    /// - [`GridError::InvalidRegion`] if a region escapes the raster, which
    ///   indicates a partitioning bug
    pub fn cut_and_stamp(
        &self,
        raster: &DynamicImage,
        grid: GridSpec,
        watermark: &WatermarkSpec,
    ) -> Result<Vec<Tile>, GridError> {
        let regions = self.plan(raster.width(), raster.height(), grid)?;

        debug!(
            width = raster.width(),
            height = raster.height(),
            grid = %grid,
            policy = self.policy.name(),
            parallel = self.parallel,
            "Cutting raster"
        );

        let stamp = |region: &Region| compose(raster, region, grid, watermark, &self.renderer);

        let tiles: Vec<Tile> = if self.parallel {
            regions.par_iter().map(stamp).collect::<Result<_, _>>()?
        } else {
            regions.iter().map(stamp).collect::<Result<_, _>>()?
        };

        let skipped = tiles.iter().filter(|t| !t.watermark.is_applied()).count();
        info!(
            grid = %grid,
            tiles = tiles.len(),
            skipped,
            "Cut {}x{} raster",
            raster.width(),
            raster.height()
        );

        Ok(tiles)
    }

    /// Crop and stamp only the tile at row-major `index`.
    ///
    /// # Errors
    ///
    /// Same as [`GridCutter::cut_and_stamp`], plus
    /// [`GridError::TileIndexOutOfRange`] when `index >= rows * cols`.
    pub fn cut_tile(
        &self,
        raster: &DynamicImage,
        grid: GridSpec,
        watermark: &WatermarkSpec,
        index: usize,
    ) -> Result<Tile, GridError> {
        let regions = self.plan(raster.width(), raster.height(), grid)?;
        let count = regions.len();

        let region = regions
            .get(index)
            .ok_or(GridError::TileIndexOutOfRange { index, count })?;

        compose(raster, region, grid, watermark, &self.renderer)
    }
}

/// Cut `raster` with the default [`GridCutter`].
pub fn cut_and_stamp(
    raster: &DynamicImage,
    grid: GridSpec,
    watermark: &WatermarkSpec,
) -> Result<Vec<Tile>, GridError> {
    GridCutter::new().cut_and_stamp(raster, grid, watermark)
}

// =============================================================================
// Tests
// =============================================================================
