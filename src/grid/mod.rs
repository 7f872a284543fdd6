//! Grid geometry.
//!
//! Divides an image of `width × height` pixels into `rows × cols` rectangular
//! regions using floor division:
//!
//! ```text
//!   cell_width  = width  / cols        cell_height = height / rows
//!
//!   ┌────────┬────────┬────────┬────────┐
//!   │ (0, 0) │ (0, 1) │ (0, 2) │ (0, 3) │   regions are produced
//!   ├────────┼────────┼────────┼────────┤   in row-major order:
//!   │ (1, 0) │ (1, 1) │ (1, 2) │ (1, 3) │   (0,0) (0,1) ... (2,3)
//!   ├────────┼────────┼────────┼────────┤
//!   │ (2, 0) │ (2, 1) │ (2, 2) │ (2, 3) │
//!   └────────┴────────┴────────┴────────┘
//! ```
//!
//! When a dimension is not evenly divisible, the [`RemainderPolicy`] decides
//! what happens to the trailing pixels. The default, [`RemainderPolicy::Drop`],
//! leaves up to `cols - 1` columns and `rows - 1` rows of pixels outside every
//! tile.
//!
//! # Example
//!
//! ```
//! use gridcut::grid::{partition, GridSpec};
//!
//! let regions = partition(1200, 900, GridSpec::new(3, 4)).unwrap();
//! assert_eq!(regions.len(), 12);
//! assert_eq!((regions[11].left, regions[11].top), (900, 600));
//! ```

mod partition;

pub use partition::{
    partition, partition_with, GridSpec, Region, RemainderPolicy, DEFAULT_COLS, DEFAULT_ROWS,
};
