use std::collections::BTreeSet;

use super::LabelMap;
use crate::models::Label;

/// Split a label map into the objects with the requested labels and the rest
#[derive(Debug, Clone, Default)]
pub struct LabelSelection {
    pub labels: BTreeSet<Label>,
    /// Select every object except the listed ones
    pub exclude: bool,
}

impl LabelSelection {
    pub fn single(label: Label) -> Self {
        Self {
            labels: BTreeSet::from([label]),
            exclude: false,
        }
    }

    pub fn with_exclude(mut self, exclude: bool) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn is_selected(&self, label: Label) -> bool {
        self.labels.contains(&label) != self.exclude
    }

    /// Returns `(selected, rest)`. Both keep the region and background of `map`.
    /// Requested labels that are not in the map are ignored.
    pub fn apply(&self, map: LabelMap) -> (LabelMap, LabelMap) {
        let mut selected = map.empty_like();
        let mut rest = map.empty_like();

        for object in map.into_objects() {
            let target = if self.is_selected(object.label) {
                &mut selected
            } else {
                &mut rest
            };
            target.objects.insert(object.label, object);
        }

        (selected, rest)
    }

    /// Labels that were asked for but are not present in `map`
    pub fn missing_labels(&self, map: &LabelMap) -> Vec<Label> {
        self.labels
            .iter()
            .copied()
            .filter(|l| !map.contains_label(*l))
            .collect()
    }
}
