use clap::Parser;
use imageproc::region_labelling::Connectivity;
use std::path::PathBuf;

use labelmorph::{
    BinaryMorphology, ClosingOptions, ElementShape, MergeMethod, Operation, StructuringElement,
    build_closing_pipeline, read_label_image, write_label_image,
};

#[derive(Parser)]
#[command(name = "labelmorph")]
#[command(about = "Apply a morphological operation to selected objects of a label image")]
struct Cli {
    /// Path to input label image
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Path to output label image (format from extension)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Label of the object to process
    #[arg(value_name = "LABEL")]
    label: u8,

    /// Structuring element radius
    #[arg(value_name = "RADIUS")]
    radius: u32,

    /// Additional labels to process
    #[arg(long = "add-label", value_name = "LABEL")]
    extra_labels: Vec<u8>,

    /// Process every object except the given labels
    #[arg(long)]
    exclude: bool,

    /// Morphological operation
    #[arg(long, value_enum, default_value_t = Operation::Closing)]
    operation: Operation,

    /// Structuring element shape
    #[arg(long, value_enum, default_value_t = ElementShape::Ball)]
    element: ElementShape,

    /// Background value of the label image
    #[arg(long, default_value_t = 0)]
    background: u8,

    /// How label conflicts are resolved
    #[arg(long, value_enum, default_value_t = MergeMethod::Keep)]
    merge: MergeMethod,

    /// Lower labels win where objects overlap
    #[arg(long)]
    reverse_ordering: bool,

    /// Use 8-connectivity when splitting filtered objects
    #[arg(long)]
    fully_connected: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::try_parse().unwrap_or_else(|e| {
        if e.use_stderr() {
            let _ = e.print();
            std::process::exit(1);
        }
        e.exit()
    });

    let element = StructuringElement::new(args.element, args.radius);
    let mut options = ClosingOptions::new(args.label, args.radius);
    options.labels.extend(args.extra_labels.iter().copied());
    options.exclude = args.exclude;
    options.operation = BinaryMorphology::new(args.operation, element);
    options.background = args.background;
    options.merge_method = args.merge;
    options.reverse_ordering = args.reverse_ordering;
    options.connectivity = if args.fully_connected {
        Connectivity::Eight
    } else {
        Connectivity::Four
    };
    options.verbose = args.verbose;

    if args.verbose {
        println!("Loading label image: {:?}", args.input);
    }
    let input = read_label_image(&args.input)?;
    if args.verbose {
        println!("Image loaded: {}x{}\n", input.width(), input.height());
    }

    let mut pipeline = build_closing_pipeline(&options)?;
    if let Some(debug_dir) = args.debug_out {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    if args.verbose {
        println!("Running pipeline...\n");
    }
    let results = pipeline.run(input)?;

    let output = results
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Pipeline produced no output"))?
        .into_image()?;
    write_label_image(&output, &args.output)?;

    if args.verbose {
        println!("\nWrote {:?}", args.output);
    }

    Ok(())
}
