use anyhow::{ensure, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use pinmux_gen::{emit_header, emit_xml, parser};

#[derive(Debug, clap::Parser)]
#[clap(
    name = "pinmux-gen",
    about = "Generates pin-mapping headers and an XML description from an MCU family pin-mux table."
)]
struct Options {
    /// A family .csv file or a directory searched for .csv files.
    input: PathBuf,

    /// Output directory for the generated files.
    output_dir: PathBuf,

    /// Generate only the XML family description.
    #[clap(long)]
    xml: bool,

    /// Generate only the C++ headers/sources.
    #[clap(long)]
    headers: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let options = Options::parse();

    ensure!(
        options.input.exists(),
        "No such file or directory: {}",
        options.input.display()
    );

    if !options.output_dir.exists() {
        fs::create_dir_all(&options.output_dir).with_context(|| {
            format!(
                "Failed to create output directory '{}'",
                options.output_dir.display()
            )
        })?;
    }

    let mut inputs = Vec::new();
    if options.input.is_file() {
        inputs.push(options.input.clone());
    } else {
        visit_dirs(&options.input, &mut inputs)
            .with_context(|| format!("Failed to scan {}", options.input.display()))?;
        ensure!(
            !inputs.is_empty(),
            "Unable to find any .csv files in the provided input directory."
        );
    }

    // Neither flag selects everything; a single flag narrows the output.
    let want_xml = options.xml || !options.headers;
    let want_headers = options.headers || !options.xml;

    let mut generated_files = Vec::new();
    for input in &inputs {
        // Each file describes an independent family; models are never shared.
        let model = parser::process_file(input)?;

        if want_xml {
            let path = options.output_dir.join(format!("{}.xml", model.name()));
            fs::write(&path, emit_xml::write_family_xml(&model))
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            generated_files.push(path);
        }
        if want_headers {
            for file in emit_header::write_device_files(&model)? {
                let path = options.output_dir.join(&file.name);
                fs::write(&path, &file.contents)
                    .with_context(|| format!("Failed to write '{}'", path.display()))?;
                generated_files.push(path);
            }
        }
    }

    println!("Generated {} file(s):", generated_files.len());
    for file in generated_files {
        println!("\t{}", file.display());
    }

    Ok(())
}

/// Collects every .csv file below `path`.
fn visit_dirs(path: &Path, inputs: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            visit_dirs(&entry_path, inputs)?;
        } else if entry_path.extension().is_some_and(|ext| ext == "csv") {
            tracing::info!("Found .csv file: {}", entry_path.display());
            inputs.push(entry_path);
        }
    }
    Ok(())
}
