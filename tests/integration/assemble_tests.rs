//! Acquisition assembly integration tests.
//!
//! Tests verify:
//! - Axis lengths and coordinates follow the discovered tags
//! - Missing and unreadable tiles become missing planes
//! - Gap filling along time, then field
//! - Format dispatch and selection iteration

use rand::rngs::StdRng;
use rand::SeedableRng;

use plate_assembler::acquisition::{
    assemble, assemble_with, load_experiment, load_experiment_with, AssembleOptions,
    ExperimentType, ACQUISITION_DIMS,
};
use plate_assembler::{AcquisitionError, CoordLabel, CoordValues, Dim};

use super::test_utils::{is_constant, is_missing, AcquisitionBuilder};

const SIZE: u32 = 4;

fn options(fill_missing: bool) -> AssembleOptions {
    AssembleOptions {
        fill_missing,
        tile_shape: (SIZE as usize, SIZE as usize),
        reshape: true,
    }
}

fn strs(values: &[&str]) -> CoordValues {
    CoordValues::Str(values.iter().map(|s| s.to_string()).collect())
}

// =============================================================================
// Shape and Coordinates
// =============================================================================

#[test]
fn test_synthetic_acquisition_round_trip() {
    let acquisition = AcquisitionBuilder::new(SIZE).grid(
        &[0, 1],
        &["well_R1"],
        &["mosaic_F1", "mosaic_F2"],
        &["A_1", "B_2"],
        |_, _, _, _| 1,
    );

    let plate = assemble_with(acquisition.path(), &options(false)).unwrap();
    assert_eq!(plate.dims(), &ACQUISITION_DIMS);
    assert_eq!(plate.shape(), &[2, 2, 1, 2, 4, 4]);
    assert_eq!(plate.coords(Dim::Channel), Some(&strs(&["A", "B"])));
    assert_eq!(plate.coords(Dim::Time), Some(&CoordValues::Int(vec![0, 1])));
    assert_eq!(plate.coords(Dim::Region), Some(&strs(&["R1"])));
    assert_eq!(plate.coords(Dim::Field), Some(&strs(&["F1", "F2"])));
    assert_eq!(plate.coords(Dim::Y), None);

    let data = plate.compute().unwrap();
    assert_eq!(data.shape(), &[2, 2, 1, 2, 4, 4]);
    assert!(data.iter().all(|&v| v == 1.0));
}

#[test]
fn test_axis_lengths_equal_distinct_tags() {
    let acquisition = AcquisitionBuilder::new(SIZE)
        .tile(0, "well_A1", "mosaic_0", "DAPI_100", 1)
        .tile(3, "well_B2", "mosaic_0", "DAPI_100", 1)
        .tile(3, "well_A1", "mosaic_1", "GFP_50", 1)
        .tile(10, "well_C3", "mosaic_2", "RFP_10", 1);

    let plate = assemble_with(acquisition.path(), &options(false)).unwrap();
    assert_eq!(plate.shape(), &[3, 3, 3, 3, 4, 4]);
    // Numeric, not lexicographic, time order.
    assert_eq!(plate.coords(Dim::Time), Some(&CoordValues::Int(vec![0, 3, 10])));
    assert_eq!(plate.coords(Dim::Channel), Some(&strs(&["DAPI", "GFP", "RFP"])));
}

#[test]
fn test_values_land_at_their_labels() {
    let acquisition = AcquisitionBuilder::new(SIZE).grid(
        &[0, 1, 2],
        &["well_A", "well_B"],
        &["mosaic_0", "mosaic_1"],
        &["DAPI_1", "GFP_1"],
        |t, r, f, e| (1000 * e + 100 * t + 10 * r + f) as u16,
    );
    let plate = assemble(acquisition.path(), false).unwrap();

    let selected = plate
        .sel(&[
            (Dim::Channel, CoordLabel::from("GFP")),
            (Dim::Time, CoordLabel::Int(2)),
            (Dim::Region, CoordLabel::from("B")),
            (Dim::Field, CoordLabel::from("1")),
        ])
        .unwrap();
    assert_eq!(selected.dims(), &[Dim::Y, Dim::X]);
    let plane = selected.data().compute_plane(&[]).unwrap();
    assert_eq!(plane.dim(), (2048, 2048));
    assert!(is_constant(&plane, 1211.0));
}

#[test]
fn test_empty_directory_gives_zero_length_axes() {
    let acquisition = AcquisitionBuilder::new(SIZE);
    let plate = assemble_with(acquisition.path(), &options(true)).unwrap();
    assert_eq!(plate.shape(), &[0, 0, 0, 0, 4, 4]);
    assert_eq!(plate.compute().unwrap().len(), 0);
    assert!(plate.missing_planes().unwrap().is_empty());
}

#[test]
fn test_timepoint_directory_without_tiles() {
    let acquisition = AcquisitionBuilder::new(SIZE).timepoint(0).timepoint(1);
    let plate = assemble_with(acquisition.path(), &options(false)).unwrap();
    assert_eq!(plate.shape(), &[0, 2, 0, 0, 4, 4]);
    assert_eq!(plate.coords(Dim::Time), Some(&CoordValues::Int(vec![0, 1])));
}

// =============================================================================
// Missing Tiles
// =============================================================================

#[test]
fn test_missing_leaf_becomes_missing_plane() {
    let acquisition = AcquisitionBuilder::new(SIZE)
        .grid(&[0, 1], &["well_A"], &["mosaic_0", "mosaic_1"], &["DAPI_1"], |_, _, _, _| 7);
    std::fs::remove_file(acquisition.leaf(1, "well_A", "mosaic_1", "DAPI_1")).unwrap();

    let plate = assemble_with(acquisition.path(), &options(false)).unwrap();
    assert_eq!(plate.shape(), &[1, 2, 1, 2, 4, 4]);

    let missing = plate.missing_planes().unwrap();
    assert_eq!(
        missing,
        vec![vec![
            (Dim::Channel, CoordLabel::from("DAPI")),
            (Dim::Time, CoordLabel::Int(1)),
            (Dim::Region, CoordLabel::from("A")),
            (Dim::Field, CoordLabel::from("1")),
        ]]
    );
    assert!(is_constant(&plate.data().compute_plane(&[0, 1, 0, 0]).unwrap(), 7.0));
}

#[test]
fn test_corrupt_tile_becomes_missing_plane() {
    let acquisition = AcquisitionBuilder::new(SIZE)
        .tile(0, "well_A", "mosaic_0", "DAPI_1", 5)
        .corrupt_tile(0, "well_A", "mosaic_1", "DAPI_1");

    let plate = assemble_with(acquisition.path(), &options(false)).unwrap();
    assert_eq!(plate.shape(), &[1, 1, 1, 2, 4, 4]);
    assert!(is_missing(&plate.data().compute_plane(&[0, 0, 0, 1]).unwrap()));
}

#[test]
fn test_mismatched_tile_without_reshape_is_missing() {
    let acquisition = AcquisitionBuilder::new(SIZE)
        .tile(0, "well_A", "mosaic_0", "DAPI_1", 5)
        .tile_sized(0, "well_A", "mosaic_1", "DAPI_1", 8, 5);

    let strict = AssembleOptions {
        reshape: false,
        ..options(false)
    };
    let plate = assemble_with(acquisition.path(), &strict).unwrap();
    assert!(is_constant(&plate.data().compute_plane(&[0, 0, 0, 0]).unwrap(), 5.0));
    assert!(is_missing(&plate.data().compute_plane(&[0, 0, 0, 1]).unwrap()));

    let resized = assemble_with(acquisition.path(), &options(false)).unwrap();
    let plane = resized.data().compute_plane(&[0, 0, 0, 1]).unwrap();
    assert_eq!(plane.dim(), (4, 4));
    assert!(plane.iter().all(|&v| (v - 5.0).abs() < 1e-3));
}

// =============================================================================
// Gap Filling
// =============================================================================

#[test]
fn test_fill_takes_nearest_earlier_timepoint() {
    let acquisition = AcquisitionBuilder::new(SIZE)
        .tile(0, "well_A", "mosaic_0", "DAPI_1", 1)
        .tile(1, "well_A", "mosaic_0", "DAPI_1", 2)
        .tile(3, "well_A", "mosaic_0", "DAPI_1", 4)
        .timepoint(2);

    let plate = assemble_with(acquisition.path(), &options(true)).unwrap();
    let values: Vec<f32> = (0..4)
        .map(|t| plate.data().compute_plane(&[0, t, 0, 0]).unwrap()[[0, 0]])
        .collect();
    assert_eq!(values, vec![1.0, 2.0, 2.0, 4.0]);
}

#[test]
fn test_fill_takes_later_timepoint_at_start() {
    let acquisition = AcquisitionBuilder::new(SIZE)
        .timepoint(0)
        .timepoint(1)
        .tile(2, "well_A", "mosaic_0", "DAPI_1", 9);

    let plate = assemble_with(acquisition.path(), &options(true)).unwrap();
    for t in 0..3 {
        assert!(is_constant(&plate.data().compute_plane(&[0, t, 0, 0]).unwrap(), 9.0));
    }
}

#[test]
fn test_fill_falls_back_to_field() {
    let acquisition = AcquisitionBuilder::new(SIZE)
        .tile(0, "well_A", "mosaic_0", "DAPI_1", 3)
        .tile(1, "well_A", "mosaic_0", "DAPI_1", 6)
        .tile(0, "well_B", "mosaic_1", "DAPI_1", 1);

    let plate = assemble_with(acquisition.path(), &options(true)).unwrap();
    // (well_A, mosaic_1) never exists: takes mosaic_0 at the same time.
    assert!(is_constant(&plate.data().compute_plane(&[0, 0, 0, 1]).unwrap(), 3.0));
    assert!(is_constant(&plate.data().compute_plane(&[0, 1, 0, 1]).unwrap(), 6.0));
    assert!(plate.missing_planes().unwrap().is_empty());
}

#[test]
fn test_fill_order_is_time_then_field() {
    let acquisition = AcquisitionBuilder::new(SIZE)
        .tile(0, "well_A", "mosaic_0", "DAPI_1", 1)
        .tile(1, "well_A", "mosaic_1", "DAPI_1", 2);

    let plate = assemble_with(acquisition.path(), &options(true)).unwrap();
    let filled = plate.compute().unwrap();
    // Each field takes its own value from the other timepoint.
    assert_eq!(filled[[0, 1, 0, 0, 0, 0]], 1.0);
    assert_eq!(filled[[0, 0, 0, 1, 0, 0]], 2.0);
    assert!(plate.missing_planes().unwrap().is_empty());
}

#[test]
fn test_fill_leaves_unrecoverable_planes_missing() {
    let acquisition = AcquisitionBuilder::new(SIZE)
        .tile(0, "well_A", "mosaic_0", "DAPI_1", 3)
        .tile(0, "well_B", "mosaic_0", "GFP_1", 1);

    let plate = assemble_with(acquisition.path(), &options(true)).unwrap();
    let missing = plate.missing_planes().unwrap();
    assert_eq!(missing.len(), 2);
    assert!(missing.contains(&vec![
        (Dim::Channel, CoordLabel::from("DAPI")),
        (Dim::Time, CoordLabel::Int(0)),
        (Dim::Region, CoordLabel::from("B")),
        (Dim::Field, CoordLabel::from("0")),
    ]));
}

#[test]
fn test_fill_is_elementwise() {
    let acquisition = AcquisitionBuilder::new(2).timepoint(1);
    let nan_corner = [f32::NAN, 2.0, 3.0, 4.0];
    super::test_utils::write_gray32f(
        &acquisition.leaf(0, "well_A", "mosaic_0", "DAPI_1"),
        2,
        2,
        &nan_corner,
    );
    super::test_utils::write_gray32f(
        &acquisition.leaf(1, "well_A", "mosaic_0", "DAPI_1"),
        2,
        2,
        &[10.0, f32::NAN, 30.0, 40.0],
    );

    let fill = AssembleOptions {
        fill_missing: true,
        tile_shape: (2, 2),
        reshape: false,
    };
    let plate = assemble_with(acquisition.path(), &fill).unwrap();
    let later = plate.data().compute_plane(&[0, 1, 0, 0]).unwrap();
    assert_eq!(later.iter().copied().collect::<Vec<_>>(), vec![10.0, 2.0, 30.0, 40.0]);
    let earlier = plate.data().compute_plane(&[0, 0, 0, 0]).unwrap();
    assert_eq!(earlier.iter().copied().collect::<Vec<_>>(), vec![10.0, 2.0, 3.0, 4.0]);
}

// =============================================================================
// Dispatch and Iteration
// =============================================================================

#[test]
fn test_load_experiment_lux() {
    let acquisition = AcquisitionBuilder::new(SIZE).tile(0, "well_A", "mosaic_0", "DAPI_1", 1);
    let plate =
        load_experiment_with(acquisition.path(), ExperimentType::Lux, &options(false)).unwrap();
    assert_eq!(plate.shape(), &[1, 1, 1, 1, 4, 4]);
}

#[test]
fn test_load_experiment_unsupported() {
    let acquisition = AcquisitionBuilder::new(SIZE).tile(0, "well_A", "mosaic_0", "DAPI_1", 1);
    let result = load_experiment(acquisition.path(), ExperimentType::Nd2, true);
    assert!(matches!(result, Err(AcquisitionError::UnsupportedFormat(ref s)) if s == "nd2"));
}

#[test]
fn test_iter_selections_visits_every_position() {
    let acquisition = AcquisitionBuilder::new(SIZE).grid(
        &[0, 1],
        &["well_A", "well_B"],
        &["mosaic_0"],
        &["DAPI_1", "GFP_1"],
        |t, r, _, _| (10 * t + r) as u16,
    );
    let plate = assemble_with(acquisition.path(), &options(false)).unwrap();

    let ordered: Vec<_> = plate
        .iter_selections(&[Dim::Channel], None)
        .unwrap()
        .collect();
    assert_eq!(ordered.len(), 4);
    for selection in &ordered {
        assert_eq!(selection.array.dims(), &[Dim::Channel, Dim::Y, Dim::X]);
    }
    assert_eq!(
        ordered[0].labels,
        vec![
            (Dim::Time, CoordLabel::Int(0)),
            (Dim::Region, CoordLabel::from("A")),
            (Dim::Field, CoordLabel::from("0")),
        ]
    );

    let mut rng = StdRng::seed_from_u64(7);
    let mut shuffled: Vec<_> = plate
        .iter_selections(&[Dim::Channel], Some(&mut rng))
        .unwrap()
        .map(|s| s.labels)
        .collect();
    let mut expected: Vec<_> = ordered.into_iter().map(|s| s.labels).collect();
    shuffled.sort_by_key(|labels| format!("{:?}", labels));
    expected.sort_by_key(|labels| format!("{:?}", labels));
    assert_eq!(shuffled, expected);
}
