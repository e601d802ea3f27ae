use anyhow::{Result, anyhow};
use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};
use std::collections::{BTreeSet, HashMap};

use super::LabelMap;
use crate::models::{Label, LabelObject};
use crate::morphology::BinaryMorphology;

/// Runs a binary filter on every object of a label map, one object at a time.
///
/// Each object is cropped to its bounding box plus `pad` pixels (clipped to
/// the map region), painted as a binary image, filtered, and split back into
/// connected components. The filter itself treats the world beyond the crop
/// as background, so clipping at the map edge does not grow objects there.
#[derive(Debug, Clone)]
pub struct ObjectByObject {
    pub filter: BinaryMorphology,
    /// Padding around each object; defaults to what the filter needs
    pub pad: Option<u32>,
    /// First component keeps the object's label, others get fresh labels
    pub keep_labels: bool,
    pub connectivity: Connectivity,
}

impl ObjectByObject {
    pub fn new(filter: BinaryMorphology) -> Self {
        Self {
            filter,
            pad: None,
            keep_labels: true,
            connectivity: Connectivity::Four,
        }
    }

    pub fn with_pad(mut self, pad: u32) -> Self {
        self.pad = Some(pad);
        self
    }

    pub fn with_keep_labels(mut self, keep_labels: bool) -> Self {
        self.keep_labels = keep_labels;
        self
    }

    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn padding(&self) -> u32 {
        self.pad.unwrap_or_else(|| self.filter.required_padding())
    }

    pub fn apply(&self, map: &LabelMap) -> Result<LabelMap> {
        self.apply_reserving(map, &BTreeSet::new())
    }

    /// Like `apply`, but fresh labels never collide with `reserved`
    /// (e.g. the labels of objects that will be merged back in later).
    pub fn apply_reserving(&self, map: &LabelMap, reserved: &BTreeSet<Label>) -> Result<LabelMap> {
        let mut output = map.empty_like();
        let mut extra = Vec::new();

        for object in map.objects() {
            let mut components = self.filter_object(object, map.dimensions())?;
            if components.is_empty() {
                continue;
            }
            if self.keep_labels {
                let first = components.remove(0);
                output.objects.insert(first.label, first);
            }
            extra.extend(components);
        }

        for mut object in extra {
            let label = (Label::MIN..=Label::MAX)
                .find(|l| {
                    *l != output.background
                        && !output.objects.contains_key(l)
                        && !reserved.contains(l)
                })
                .ok_or_else(|| {
                    anyhow!(
                        "No free label left for a component split off object {}",
                        object.label
                    )
                })?;
            object.label = label;
            output.objects.insert(label, object);
        }

        Ok(output)
    }

    /// Filter a single object and return its connected components in raster order
    fn filter_object(&self, object: &LabelObject, (width, height): (u32, u32)) -> Result<Vec<LabelObject>> {
        let bbox = match object.bounding_box() {
            Some(bbox) => bbox,
            None => return Ok(Vec::new()),
        };
        if width == 0 || height == 0 || bbox.x >= width || bbox.y >= height {
            return Ok(Vec::new());
        }

        let pad = self.padding();
        let x0 = bbox.x.saturating_sub(pad);
        let y0 = bbox.y.saturating_sub(pad);
        let x1 = (bbox.x + bbox.width - 1).saturating_add(pad).min(width - 1);
        let y1 = (bbox.y + bbox.height - 1).saturating_add(pad).min(height - 1);

        let mut binary = GrayImage::new(x1 - x0 + 1, y1 - y0 + 1);
        for (x, y) in object.pixels() {
            if x >= x0 && x <= x1 && y >= y0 && y <= y1 {
                binary.put_pixel(x - x0, y - y0, Luma([255]));
            }
        }

        let filtered = self.filter.apply(&binary)?;
        let components = connected_components(&filtered, self.connectivity, Luma([0u8]));

        let mut order = Vec::new();
        let mut found: HashMap<u32, LabelObject> = HashMap::new();
        for (x, y, component) in components.enumerate_pixels() {
            let id = component[0];
            if id == 0 {
                continue;
            }
            found
                .entry(id)
                .or_insert_with(|| {
                    order.push(id);
                    LabelObject::new(object.label)
                })
                .add_pixel(x + x0, y + y0);
        }

        Ok(order
            .into_iter()
            .filter_map(|id| found.remove(&id))
            .collect())
    }
}
