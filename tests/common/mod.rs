mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from labelmorph for tests
pub use labelmorph::{
    BinaryMorphology, ClosingOptions, ElementShape, Label, LabelMap, LabelObject, LabelSelection,
    MergeMethod, ObjectByObject, Operation, Pipeline, PipelineData, Run, StructuringElement,
};
