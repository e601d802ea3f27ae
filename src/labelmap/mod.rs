pub mod convert;
pub mod select;
pub mod object_by_object;
pub mod merge;
pub mod unique;

use anyhow::{Result, anyhow};
use std::collections::BTreeMap;

use crate::models::{Label, LabelObject};

pub use convert::{label_image_to_label_map, label_map_to_label_image};
pub use merge::{MergeMethod, merge};
pub use object_by_object::ObjectByObject;
pub use select::LabelSelection;
pub use unique::make_unique;

/// Sparse label image: a set of label objects over a fixed 2D region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    width: u32,
    height: u32,
    background: Label,
    objects: BTreeMap<Label, LabelObject>,
}

impl LabelMap {
    pub fn new(width: u32, height: u32, background: Label) -> Self {
        Self {
            width,
            height,
            background,
            objects: BTreeMap::new(),
        }
    }

    /// Same region and background, no objects
    pub fn empty_like(&self) -> Self {
        Self::new(self.width, self.height, self.background)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn background(&self) -> Label {
        self.background
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn labels(&self) -> Vec<Label> {
        self.objects.keys().copied().collect()
    }

    pub fn contains_label(&self, label: Label) -> bool {
        self.objects.contains_key(&label)
    }

    pub fn get(&self, label: Label) -> Option<&LabelObject> {
        self.objects.get(&label)
    }

    pub fn get_mut(&mut self, label: Label) -> Option<&mut LabelObject> {
        self.objects.get_mut(&label)
    }

    /// Objects in ascending label order
    pub fn objects(&self) -> impl Iterator<Item = &LabelObject> {
        self.objects.values()
    }

    pub fn into_objects(self) -> impl Iterator<Item = LabelObject> {
        self.objects.into_values()
    }

    /// Insert an object under its own label.
    /// Fails for the background label or a label that is already used.
    pub fn insert(&mut self, object: LabelObject) -> Result<()> {
        if object.label == self.background {
            return Err(anyhow!(
                "Label {} is the background value and cannot hold an object",
                object.label
            ));
        }
        if self.objects.contains_key(&object.label) {
            return Err(anyhow!("Label {} is already used in the label map", object.label));
        }
        self.objects.insert(object.label, object);
        Ok(())
    }

    /// Insert an object, replacing any object with the same label
    pub fn replace(&mut self, object: LabelObject) -> Result<Option<LabelObject>> {
        if object.label == self.background {
            return Err(anyhow!(
                "Label {} is the background value and cannot hold an object",
                object.label
            ));
        }
        Ok(self.objects.insert(object.label, object))
    }

    pub fn remove(&mut self, label: Label) -> Option<LabelObject> {
        self.objects.remove(&label)
    }

    /// Lowest label that is neither the background nor in use
    pub fn first_unused_label(&self) -> Option<Label> {
        (Label::MIN..=Label::MAX)
            .find(|l| *l != self.background && !self.objects.contains_key(l))
    }

    /// Insert an object under the first unused label, returning that label
    pub fn push(&mut self, mut object: LabelObject) -> Result<Label> {
        let label = self
            .first_unused_label()
            .ok_or_else(|| anyhow!("No free label left in the label map ({} objects)", self.len()))?;
        object.label = label;
        self.objects.insert(label, object);
        Ok(label)
    }
}
