//! Composite rendering integration tests.
//!
//! Tests verify:
//! - A position of an assembled acquisition renders to a tinted PNG
//! - Unknown channel names and absent labels are reported

use image::{ImageFormat, Rgb};

use plate_assembler::acquisition::{assemble_with, AssembleOptions};
use plate_assembler::render::{encode_png, write_png, CompositeRenderer};
use plate_assembler::{ColorError, CoordLabel, Dim, RenderError};

use super::test_utils::AcquisitionBuilder;

fn options() -> AssembleOptions {
    AssembleOptions {
        fill_missing: false,
        tile_shape: (4, 4),
        reshape: false,
    }
}

fn position(time: i64, region: &str, field: &str) -> [(Dim, CoordLabel); 3] {
    [
        (Dim::Time, CoordLabel::Int(time)),
        (Dim::Region, CoordLabel::from(region)),
        (Dim::Field, CoordLabel::from(field)),
    ]
}

#[test]
fn test_render_assembled_position() {
    let acquisition = AcquisitionBuilder::new(4)
        .tile(0, "well_A1", "mosaic_0", "GFP_100", 50)
        .tile(0, "well_A1", "mosaic_0", "Cy5_100", 50);
    // Give each channel some contrast.
    super::test_utils::write_gray16_data(
        &acquisition.leaf(0, "well_A1", "mosaic_0", "GFP_100"),
        4,
        4,
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 100],
    );

    let plate = assemble_with(acquisition.path(), &options()).unwrap();
    let image = CompositeRenderer::default()
        .render_at(&plate, &position(0, "A1", "0"))
        .unwrap();

    assert_eq!(image.dimensions(), (4, 4));
    // Cy5 is constant and normalises to zero; GFP peaks in the last pixel.
    assert_eq!(image.get_pixel(3, 3), &Rgb([0, 255, 0]));
    assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 0]));

    let bytes = encode_png(&image).unwrap();
    let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .unwrap()
        .to_rgb8();
    assert_eq!(decoded, image);
}

#[test]
fn test_render_unknown_channel() {
    let acquisition = AcquisitionBuilder::new(4).tile(0, "well_A1", "mosaic_0", "mCherry_5", 1);
    let plate = assemble_with(acquisition.path(), &options()).unwrap();

    let result = CompositeRenderer::default().render_at(&plate, &position(0, "A1", "0"));
    assert!(matches!(
        result,
        Err(RenderError::Color(ColorError::UnknownChannel(ref name))) if name == "mCherry"
    ));
}

#[test]
fn test_render_absent_label() {
    let acquisition = AcquisitionBuilder::new(4).tile(0, "well_A1", "mosaic_0", "DAPI_5", 1);
    let plate = assemble_with(acquisition.path(), &options()).unwrap();

    let result = CompositeRenderer::default().render_at(&plate, &position(0, "Z9", "0"));
    assert!(matches!(result, Err(RenderError::Array(_))));
}

#[test]
fn test_write_png_file() {
    let acquisition = AcquisitionBuilder::new(4).tile(2, "well_B2", "mosaic_1", "DAPI_5", 1);
    let plate = assemble_with(acquisition.path(), &options()).unwrap();
    let image = CompositeRenderer::default()
        .render_at(&plate, &position(2, "B2", "1"))
        .unwrap();

    let output = acquisition.path().join("preview.png");
    write_png(&image, &output).unwrap();
    let reread = image::open(&output).unwrap().to_rgb8();
    assert_eq!(reread.dimensions(), (4, 4));
}
