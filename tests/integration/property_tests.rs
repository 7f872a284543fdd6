//! Property tests for grid partitioning.

use proptest::prelude::*;

use gridcut::{partition_with, GridError, GridSpec, Region, RemainderPolicy};

fn policy() -> impl Strategy<Value = RemainderPolicy> {
    prop_oneof![Just(RemainderPolicy::Drop), Just(RemainderPolicy::Stretch)]
}

/// Raster dimensions together with a grid no finer than the raster.
fn raster_and_grid() -> impl Strategy<Value = (u32, u32, GridSpec)> {
    (1u32..=800, 1u32..=800).prop_flat_map(|(width, height)| {
        (
            Just(width),
            Just(height),
            (1..=height.min(16), 1..=width.min(16))
                .prop_map(|(rows, cols)| GridSpec::new(rows, cols)),
        )
    })
}

fn covered_area(regions: &[Region]) -> u64 {
    regions
        .iter()
        .map(|r| u64::from(r.width()) * u64::from(r.height()))
        .sum()
}

proptest! {
    #[test]
    fn prop_region_count_and_row_major_order(
        (width, height, grid) in raster_and_grid(),
        policy in policy(),
    ) {
        let regions = partition_with(width, height, grid, policy).unwrap();

        prop_assert_eq!(regions.len(), grid.tile_count());
        for (index, region) in regions.iter().enumerate() {
            prop_assert_eq!(region.index(grid.cols), index);
            prop_assert_eq!(grid.position(index), Some((region.row, region.col)));
        }
    }

    #[test]
    fn prop_regions_are_non_empty_and_in_bounds(
        (width, height, grid) in raster_and_grid(),
        policy in policy(),
    ) {
        for region in partition_with(width, height, grid, policy).unwrap() {
            prop_assert!(region.left < region.right);
            prop_assert!(region.top < region.bottom);
            prop_assert!(region.right <= width);
            prop_assert!(region.bottom <= height);
            prop_assert!(region.fits_within(width, height));
        }
    }

    #[test]
    fn prop_regions_never_overlap(
        (width, height, grid) in raster_and_grid(),
        policy in policy(),
    ) {
        let regions = partition_with(width, height, grid, policy).unwrap();

        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                prop_assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn prop_drop_leaves_less_than_one_cell_uncovered(
        (width, height, grid) in raster_and_grid(),
    ) {
        let regions = partition_with(width, height, grid, RemainderPolicy::Drop).unwrap();

        let cell_width = width / grid.cols;
        let cell_height = height / grid.rows;
        for region in &regions {
            prop_assert_eq!(region.width(), cell_width);
            prop_assert_eq!(region.height(), cell_height);
        }

        let last = regions.last().unwrap();
        prop_assert_eq!(last.right, cell_width * grid.cols);
        prop_assert_eq!(last.bottom, cell_height * grid.rows);
        prop_assert!(width - last.right < grid.cols);
        prop_assert!(height - last.bottom < grid.rows);
    }

    #[test]
    fn prop_stretch_covers_every_pixel(
        (width, height, grid) in raster_and_grid(),
    ) {
        let regions = partition_with(width, height, grid, RemainderPolicy::Stretch).unwrap();

        // Non-overlapping regions whose areas sum to the raster tile it exactly
        prop_assert_eq!(covered_area(&regions), u64::from(width) * u64::from(height));

        let last = regions.last().unwrap();
        prop_assert_eq!((last.right, last.bottom), (width, height));
    }

    #[test]
    fn prop_zero_grid_dimension_rejected(
        width in 1u32..=500,
        height in 1u32..=500,
        other in 0u32..=8,
        zero_rows in any::<bool>(),
    ) {
        let grid = if zero_rows {
            GridSpec::new(0, other)
        } else {
            GridSpec::new(other, 0)
        };

        let result = partition_with(width, height, grid, RemainderPolicy::Drop);
        prop_assert!(
            matches!(result, Err(GridError::InvalidGridSpec { .. })),
            "expected InvalidGridSpec, got {:?}",
            result
        );
    }
}
