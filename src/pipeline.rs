use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Result;

use crate::labelmap::{LabelMap, label_map_to_label_image};

/// Bounding box in the image region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// What a pipeline item carries
#[derive(Debug, Clone)]
pub enum Payload {
    /// Dense label image
    Image(GrayImage),
    /// Sparse label map
    LabelMap(LabelMap),
}

/// Data that flows through the pipeline
#[derive(Debug, Clone)]
pub struct PipelineData {
    pub payload: Payload,

    /// Metadata for routing and reporting (e.g., "selection", "object_count")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Bool(bool),
    Float(f32),
    String(String),
    Int(i32),
}

impl PipelineData {
    pub fn from_image(image: GrayImage) -> Self {
        Self {
            payload: Payload::Image(image),
            metadata: HashMap::new(),
        }
    }

    pub fn from_label_map(map: LabelMap) -> Self {
        Self {
            payload: Payload::LabelMap(map),
            metadata: HashMap::new(),
        }
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn image(&self) -> Result<&GrayImage> {
        match &self.payload {
            Payload::Image(image) => Ok(image),
            Payload::LabelMap(_) => Err(anyhow::anyhow!("Expected a label image, got a label map")),
        }
    }

    pub fn label_map(&self) -> Result<&LabelMap> {
        match &self.payload {
            Payload::LabelMap(map) => Ok(map),
            Payload::Image(_) => Err(anyhow::anyhow!("Expected a label map, got a label image")),
        }
    }

    pub fn into_image(self) -> Result<GrayImage> {
        match self.payload {
            Payload::Image(image) => Ok(image),
            Payload::LabelMap(_) => Err(anyhow::anyhow!("Expected a label image, got a label map")),
        }
    }

    pub fn into_label_map(self) -> Result<LabelMap> {
        match self.payload {
            Payload::LabelMap(map) => Ok(map),
            Payload::Image(_) => Err(anyhow::anyhow!("Expected a label map, got a label image")),
        }
    }

    /// Render the payload as a label image (label maps are painted)
    pub fn render(&self) -> GrayImage {
        match &self.payload {
            Payload::Image(image) => image.clone(),
            Payload::LabelMap(map) => label_map_to_label_image(map),
        }
    }

    /// Get metadata as bool
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.metadata.get(key) {
            Some(MetadataValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get metadata as float
    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get metadata as int
    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get metadata as string
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.metadata.get(key) {
            Some(MetadataValue::String(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled
    pub enabled: bool,
}

impl DebugConfig {
    /// Write every item of a stage as `<dir>/<stage_dir>/<NN>.png`
    fn save_stage(&self, stage_dir: &str, data: &[PipelineData], verbose: bool) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let dir = self.output_dir.join(stage_dir);
        std::fs::create_dir_all(&dir)?;

        for (idx, item) in data.iter().enumerate() {
            let output_path = dir.join(format!("{:02}.png", idx + 1));
            item.render()
                .save(&output_path)
                .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
        }

        if verbose {
            println!("  Debug: saved {} images to {}/", data.len(), stage_dir);
        }
        Ok(())
    }
}

/// Context available to all pipeline steps
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Process data and return transformed data
    /// Steps can split data (1 → many), transform (many → many), or join (many → 1)
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>>;

    /// Human-readable name for this step (used in verbose output)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig {
            output_dir,
            enabled: true,
        });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Run every step in order on an input label image
    pub fn run(&self, input: GrayImage) -> Result<Vec<PipelineData>> {
        self.run_partial(input, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: GrayImage, num_steps: usize) -> Result<Vec<PipelineData>> {
        let mut data = vec![PipelineData::from_image(input)];

        if let Some(debug_config) = &self.context.debug {
            debug_config.save_stage("00_input", &data, self.context.verbose)?;
        }

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            if self.context.verbose {
                println!("Running step: {} (processing {} items)", step.name(), data.len());
            }

            data = step.process(data, &self.context)?;

            if let Some(debug_config) = &self.context.debug {
                let stage_dir = format!("{:02}_{}", step_idx + 1,
                    step.name().to_lowercase().replace(' ', "_"));
                debug_config.save_stage(&stage_dir, &data, self.context.verbose)?;
            }

            if self.context.verbose {
                println!("  → {} items", data.len());
            }
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Read an image file as an 8-bit label image
pub fn read_label_image(path: &Path) -> Result<GrayImage> {
    let image = image::ImageReader::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", path.display(), e))?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image {}: {}", path.display(), e))?;
    match image {
        DynamicImage::ImageLuma8(gray) => Ok(gray),
        DynamicImage::ImageLuma16(wide) => narrow_labels(&wide, path),
        other => Ok(other.to_luma8()),
    }
}

/// Keep 16-bit label values as they are; values above 255 cannot be represented
fn narrow_labels(wide: &ImageBuffer<Luma<u16>, Vec<u16>>, path: &Path) -> Result<GrayImage> {
    let mut gray = GrayImage::new(wide.width(), wide.height());
    for (x, y, pixel) in wide.enumerate_pixels() {
        let label = u8::try_from(pixel[0]).map_err(|_| {
            anyhow::anyhow!(
                "Label {} at ({}, {}) in {} does not fit in 8 bits",
                pixel[0],
                x,
                y,
                path.display()
            )
        })?;
        gray.put_pixel(x, y, Luma([label]));
    }
    Ok(gray)
}

/// Write a label image; the format follows the file extension
pub fn write_label_image(image: &GrayImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))
}
