use image::{GrayImage, Luma};
use std::collections::BTreeMap;

use super::LabelMap;
use crate::models::{Label, LabelObject, Run};

/// Build a label map from a label image.
/// Every pixel that is not `background` belongs to the object named by its value.
pub fn label_image_to_label_map(image: &GrayImage, background: Label) -> LabelMap {
    let (width, height) = image.dimensions();
    let mut objects: BTreeMap<Label, LabelObject> = BTreeMap::new();

    for y in 0..height {
        let mut x = 0;
        while x < width {
            let label = image.get_pixel(x, y)[0];
            let start = x;
            while x < width && image.get_pixel(x, y)[0] == label {
                x += 1;
            }
            if label == background {
                continue;
            }
            objects
                .entry(label)
                .or_insert_with(|| LabelObject::new(label))
                .add_run(Run::new(start, y, x - start));
        }
    }

    let mut map = LabelMap::new(width, height, background);
    map.objects = objects;
    map
}

/// Paint a label map back into a dense label image.
/// Objects are painted in ascending label order, so higher labels win where they overlap.
pub fn label_map_to_label_image(map: &LabelMap) -> GrayImage {
    let mut image = GrayImage::from_pixel(map.width(), map.height(), Luma([map.background()]));
    if map.width() == 0 {
        return image;
    }

    for object in map.objects() {
        for run in object.runs() {
            if run.y >= map.height() {
                continue;
            }
            let end = run.end_x().min(map.width() - 1);
            for x in run.x..=end {
                image.put_pixel(x, run.y, Luma([object.label]));
            }
        }
    }

    image
}
