use labelmorph::{ClosingOptions, build_closing_pipeline, read_label_image, write_label_image};
use std::env;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 5 {
        eprintln!("Usage: ");
        eprintln!("{} <InputFileName> <OutputFileName> <label> <radius>", args[0]);
        std::process::exit(1);
    }

    let input_file_name = Path::new(&args[1]);
    let output_file_name = Path::new(&args[2]);
    let label: u8 = args[3].parse()?;
    let radius: u32 = args[4].parse()?;

    let input = read_label_image(input_file_name)?;
    let pipeline = build_closing_pipeline(&ClosingOptions::new(label, radius))?;

    let output = pipeline
        .run(input)?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Pipeline produced no output"))?
        .into_image()?;
    write_label_image(&output, output_file_name)?;

    Ok(())
}
