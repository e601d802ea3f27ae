use anyhow::Result;
use imageproc::region_labelling::Connectivity;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::labelmap::{
    LabelSelection, MergeMethod, ObjectByObject, label_image_to_label_map,
    label_map_to_label_image, make_unique, merge,
};
use crate::models::Label;
use crate::morphology::{BinaryMorphology, StructuringElement};
use crate::pipeline::{MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep};

/// Metadata key set by `LabelSelectionStep`
pub const SELECTION_KEY: &str = "selection";
pub const SELECTED: &str = "selected";
pub const REST: &str = "rest";

fn with_object_count(data: PipelineData, count: usize) -> PipelineData {
    data.with_metadata("object_count", MetadataValue::Int(count as i32))
}

/// Convert a dense label image into a label map
pub struct LabelMapConversionStep {
    pub background: Label,
}

impl PipelineStep for LabelMapConversionStep {
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let map = label_image_to_label_map(item.image()?, self.background);
            if context.verbose {
                println!("  Found {} objects (labels {:?})", map.len(), map.labels());
            }
            let count = map.len();
            let mut new_item = PipelineData::from_label_map(map);
            new_item.metadata = item.metadata;
            result.push(with_object_count(new_item, count));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Label Map Conversion"
    }
}

/// Split each label map into the selected objects and the rest
pub struct LabelSelectionStep {
    pub selection: LabelSelection,
}

impl PipelineStep for LabelSelectionStep {
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let map = item.into_label_map()?;

            if context.verbose {
                for label in self.selection.missing_labels(&map) {
                    println!("  Warning: label {} is not present in the label map", label);
                }
            }

            let (selected, rest) = self.selection.apply(map);
            let (n_selected, n_rest) = (selected.len(), rest.len());
            result.push(with_object_count(
                PipelineData::from_label_map(selected)
                    .with_metadata(SELECTION_KEY, MetadataValue::String(SELECTED.to_string())),
                n_selected,
            ));
            result.push(with_object_count(
                PipelineData::from_label_map(rest)
                    .with_metadata(SELECTION_KEY, MetadataValue::String(REST.to_string())),
                n_rest,
            ));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Label Selection"
    }
}

/// Apply a binary filter to every object of the selected label maps.
/// Items tagged as the unselected rest pass through untouched; when no item
/// carries a selection tag, every label map is filtered.
pub struct ObjectByObjectStep {
    pub filter: ObjectByObject,
}

impl PipelineStep for ObjectByObjectStep {
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let tagged = data.iter().any(|item| item.get_string(SELECTION_KEY).is_some());
        let is_target = |item: &PipelineData| {
            !tagged || item.get_string(SELECTION_KEY) == Some(SELECTED)
        };

        // labels of objects that are not filtered here stay reserved
        let mut reserved = BTreeSet::new();
        for item in data.iter().filter(|item| !is_target(*item)) {
            reserved.extend(item.label_map()?.labels());
        }

        let mut result = Vec::new();
        for item in data {
            if !is_target(&item) {
                result.push(item);
                continue;
            }

            let map = item.label_map()?;
            let filtered = self.filter.apply_reserving(map, &reserved)?;
            if context.verbose {
                println!("  Applied {} (radius {}) to {} objects → {} objects",
                        self.filter.filter.name(),
                        self.filter.filter.element().radius(),
                        map.len(),
                        filtered.len());
            }

            let count = filtered.len();
            let mut new_item = PipelineData::from_label_map(filtered);
            new_item.metadata = item.metadata;
            result.push(with_object_count(new_item, count));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Object By Object"
    }
}

/// Merge all label maps into one
pub struct MergeStep {
    pub method: MergeMethod,
}

impl PipelineStep for MergeStep {
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let maps = data
            .into_iter()
            .map(PipelineData::into_label_map)
            .collect::<Result<Vec<_>>>()?;
        let inputs = maps.len();

        let merged = merge(maps, self.method)?;
        if context.verbose {
            println!("  Merged {} label maps ({:?}) → {} objects", inputs, self.method, merged.len());
        }

        let count = merged.len();
        Ok(vec![with_object_count(PipelineData::from_label_map(merged), count)])
    }

    fn name(&self) -> &str {
        "Merge"
    }
}

/// Make sure no pixel belongs to two objects
pub struct UniqueStep {
    pub reverse_ordering: bool,
}

impl PipelineStep for UniqueStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let metadata = item.metadata.clone();
            let unique = make_unique(item.into_label_map()?, self.reverse_ordering);
            let count = unique.len();
            let mut new_item = PipelineData::from_label_map(unique);
            new_item.metadata = metadata;
            result.push(with_object_count(new_item, count));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Label Unique"
    }
}

/// Paint label maps back into dense label images
pub struct LabelImageConversionStep;

impl PipelineStep for LabelImageConversionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let image = label_map_to_label_image(item.label_map()?);
            let mut new_item = PipelineData::from_image(image);
            new_item.metadata = item.metadata;
            result.push(new_item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Label Image Conversion"
    }
}

/// Settings of the "morphology on one labeled object" pipeline
#[derive(Debug, Clone)]
pub struct ClosingOptions {
    pub labels: BTreeSet<Label>,
    pub exclude: bool,
    pub operation: BinaryMorphology,
    pub background: Label,
    pub merge_method: MergeMethod,
    pub reverse_ordering: bool,
    pub connectivity: Connectivity,
    pub verbose: bool,
}

impl ClosingOptions {
    /// Binary closing with a ball of `radius` on the object `label`
    pub fn new(label: Label, radius: u32) -> Self {
        Self {
            labels: BTreeSet::from([label]),
            exclude: false,
            operation: BinaryMorphology::Closing(StructuringElement::ball(radius)),
            background: 0,
            merge_method: MergeMethod::Keep,
            reverse_ordering: false,
            connectivity: Connectivity::Four,
            verbose: false,
        }
    }
}

/// read → convert → select → per-object filter → merge → unique → convert back
pub fn build_closing_pipeline(options: &ClosingOptions) -> Result<Pipeline> {
    options.operation.element().validate()?;

    let filter = ObjectByObject::new(options.operation).with_connectivity(options.connectivity);

    Ok(Pipeline::new()
        .with_verbose(options.verbose)
        .add_step(Arc::new(LabelMapConversionStep {
            background: options.background,
        }))
        .add_step(Arc::new(LabelSelectionStep {
            selection: LabelSelection {
                labels: options.labels.clone(),
                exclude: options.exclude,
            },
        }))
        .add_step(Arc::new(ObjectByObjectStep { filter }))
        .add_step(Arc::new(MergeStep {
            method: options.merge_method,
        }))
        .add_step(Arc::new(UniqueStep {
            reverse_ordering: options.reverse_ordering,
        }))
        .add_step(Arc::new(LabelImageConversionStep)))
}
