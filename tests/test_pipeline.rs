//! Integration tests for the composable pipeline and the
//! "morphology on one labeled object" chain.

mod common;

use image::{ImageBuffer, Luma};
use labelmorph::morphology::MAX_RADIUS;
use labelmorph::steps::{LabelImageConversionStep, REST, SELECTED, SELECTION_KEY};
use labelmorph::{build_closing_pipeline, read_label_image};
use std::sync::Arc;

use common::*;

#[test]
fn test_closing_pipeline_fills_selected_object() -> anyhow::Result<()> {
    let input = block_with_hole();
    let pipeline = build_closing_pipeline(&ClosingOptions::new(1, 1))?;

    assert_eq!(pipeline.len(), 6);
    assert_eq!(pipeline.step_names()[0], "Label Map Conversion");

    let results = pipeline.run(input)?;
    assert_eq!(results.len(), 1);

    let output = results.into_iter().next().unwrap().into_image()?;
    assert_eq!(output.dimensions(), (20, 12));
    assert_eq!(output.get_pixel(5, 5)[0], 1);
    assert_eq!(count_value(&output, 1), 56);
    assert_eq!(count_value(&output, 2), 30);
    Ok(())
}

#[test]
fn test_unselected_objects_are_untouched() -> anyhow::Result<()> {
    let input = block_with_hole();
    let pipeline = build_closing_pipeline(&ClosingOptions::new(2, 1))?;

    let output = pipeline.run(input.clone())?.remove(0).into_image()?;

    // label 2 has nothing to close, label 1 keeps its hole
    assert_eq!(output, input);
    Ok(())
}

#[test]
fn test_exclude_selects_everything_else() -> anyhow::Result<()> {
    let mut options = ClosingOptions::new(2, 1);
    options.exclude = true;
    let pipeline = build_closing_pipeline(&options)?;

    let output = pipeline.run(block_with_hole())?.remove(0).into_image()?;

    assert_eq!(output.get_pixel(5, 5)[0], 1);
    Ok(())
}

#[test]
fn test_overlap_goes_to_highest_label() -> anyhow::Result<()> {
    let input = block_with_core();

    // closing label 1 covers the core, but label 2 keeps it
    let output = build_closing_pipeline(&ClosingOptions::new(1, 1))?
        .run(input.clone())?
        .remove(0)
        .into_image()?;
    assert_eq!(output, input);

    let mut options = ClosingOptions::new(1, 1);
    options.reverse_ordering = true;
    let output = build_closing_pipeline(&options)?
        .run(input)?
        .remove(0)
        .into_image()?;
    assert_eq!(output.get_pixel(5, 5)[0], 1);
    assert_eq!(count_value(&output, 2), 0);
    Ok(())
}

#[test]
fn test_partial_run_tags_selection() -> anyhow::Result<()> {
    let pipeline = build_closing_pipeline(&ClosingOptions::new(1, 1))?;

    let items = pipeline.run_partial(block_with_hole(), 2)?;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].get_string(SELECTION_KEY), Some(SELECTED));
    assert_eq!(items[0].get_int("object_count"), Some(1));
    assert_eq!(items[0].label_map()?.labels(), vec![1]);
    assert_eq!(items[1].get_string(SELECTION_KEY), Some(REST));
    assert_eq!(items[1].label_map()?.labels(), vec![2]);
    Ok(())
}

#[test]
fn test_missing_label_leaves_image_unchanged() -> anyhow::Result<()> {
    let input = block_with_hole();
    let output = build_closing_pipeline(&ClosingOptions::new(42, 2))?
        .run(input.clone())?
        .remove(0)
        .into_image()?;

    assert_eq!(output, input);
    Ok(())
}

#[test]
fn test_closing_fills_notch_on_edge() -> anyhow::Result<()> {
    let output = build_closing_pipeline(&ClosingOptions::new(1, 1))?
        .run(block_with_notch())?
        .remove(0)
        .into_image()?;

    assert_eq!(output.get_pixel(5, 3)[0], 1);
    assert_eq!(count_value(&output, 1), 54);
    Ok(())
}

#[test]
fn test_closing_does_not_grow_toward_image_edge() -> anyhow::Result<()> {
    let input = block_near_edges();
    let output = build_closing_pipeline(&ClosingOptions::new(1, 1))?
        .run(input.clone())?
        .remove(0)
        .into_image()?;

    assert_eq!(count_value(&output, 1), 9);
    assert_eq!(output.get_pixel(5, 0)[0], 0);
    assert_eq!(output.get_pixel(5, 4)[0], 0);
    assert_eq!(output, input);
    Ok(())
}

#[test]
fn test_zero_radius_leaves_image_unchanged() -> anyhow::Result<()> {
    let input = block_with_hole();
    let output = build_closing_pipeline(&ClosingOptions::new(1, 0))?
        .run(input.clone())?
        .remove(0)
        .into_image()?;

    assert_eq!(output, input);
    Ok(())
}

#[test]
fn test_oversized_radius_is_rejected() {
    assert!(build_closing_pipeline(&ClosingOptions::new(1, MAX_RADIUS + 1)).is_err());
}

#[test]
fn test_read_16_bit_label_image() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("labels16.png");
    let mut wide: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(4, 4);
    wide.put_pixel(1, 1, Luma([1]));
    wide.put_pixel(2, 2, Luma([2]));
    wide.save(&path)?;

    let labels = read_label_image(&path)?;

    assert_eq!(labels.get_pixel(1, 1)[0], 1);
    assert_eq!(labels.get_pixel(2, 2)[0], 2);
    assert_eq!(count_value(&labels, 0), 14);

    wide.put_pixel(3, 3, Luma([300]));
    wide.save(&path)?;
    assert!(read_label_image(&path).is_err());
    Ok(())
}

#[test]
fn test_wrong_payload_is_an_error() {
    let pipeline = Pipeline::new().add_step(Arc::new(LabelImageConversionStep));
    assert!(pipeline.run(block_with_hole()).is_err());
}

#[test]
fn test_debug_mode_saves_every_stage() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let debug_dir = dir.path().join("debug");

    let pipeline = build_closing_pipeline(&ClosingOptions::new(1, 1))?.with_debug(debug_dir.clone())?;
    pipeline.run(block_with_hole())?;

    for file in [
        "00_input/01.png",
        "01_label_map_conversion/01.png",
        "02_label_selection/01.png",
        "02_label_selection/02.png",
        "03_object_by_object/01.png",
        "04_merge/01.png",
        "05_label_unique/01.png",
        "06_label_image_conversion/01.png",
    ] {
        assert!(debug_dir.join(file).exists(), "missing debug output {}", file);
    }

    // the debug directory must be empty
    assert!(Pipeline::new().with_debug(debug_dir).is_err());
    Ok(())
}

#[test]
fn test_pipeline_data_metadata() {
    let data = PipelineData::from_label_map(LabelMap::new(3, 3, 0))
        .with_metadata("object_count", labelmorph::MetadataValue::Int(0))
        .with_metadata("note", labelmorph::MetadataValue::String("empty".to_string()));

    assert_eq!(data.get_int("object_count"), Some(0));
    assert_eq!(data.get_string("note"), Some("empty"));
    assert_eq!(data.get_bool("note"), None);
    assert!(data.image().is_err());
    assert_eq!(data.render().dimensions(), (3, 3));
}
