pub mod concept;
pub mod labelmap;
pub mod models;
pub mod morphology;
pub mod pipeline;
pub mod steps;

pub use labelmap::{LabelMap, LabelSelection, MergeMethod, ObjectByObject};
pub use models::{Label, LabelObject, Run};
pub use morphology::{BinaryMorphology, ElementShape, Operation, StructuringElement};
pub use pipeline::{
    BoundingBox, DebugConfig, MetadataValue, Payload, Pipeline, PipelineContext, PipelineData,
    PipelineStep, read_label_image, write_label_image,
};
pub use steps::{ClosingOptions, build_closing_pipeline};
