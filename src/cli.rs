use crate::manifest::Manifest;
use crate::parser::{AstParser, ParsedFile};
use crate::scanner::FileScanner;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::type_resolver::TypeResolver;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// routedoc - generate an OpenAPI 3.0 document from a route manifest and the
/// Rust models it references
#[derive(Parser, Debug)]
#[command(name = "routedoc")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Rust source file or directory holding the model definitions
    #[arg(value_name = "MODELS_PATH")]
    pub models_path: PathBuf,

    /// Route manifest (YAML or JSON)
    #[arg(value_name = "MANIFEST")]
    pub manifest_path: PathBuf,

    /// Output format; inferred from the output file extension when omitted
    #[arg(short = 'f', long = "format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl CliArgs {
    /// The explicit format, else JSON for `.json` outputs and YAML otherwise.
    pub fn format(&self) -> OutputFormat {
        if let Some(format) = self.output_format {
            return format;
        }
        match &self.output_path {
            Some(path) if has_json_extension(path) => OutputFormat::Json,
            _ => OutputFormat::Yaml,
        }
    }
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.models_path.exists() {
        anyhow::bail!("Models path does not exist: {}", args.models_path.display());
    }
    if !args.manifest_path.is_file() {
        anyhow::bail!("Manifest is not a file: {}", args.manifest_path.display());
    }

    info!("Models path: {}", args.models_path.display());
    info!("Manifest: {}", args.manifest_path.display());
    info!("Output format: {:?}", args.format());
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }

    Ok(args)
}

/// Build the document described by the arguments and return it serialized.
pub fn generate(args: &CliArgs) -> Result<String> {
    info!("Scanning models...");
    let scan_result = FileScanner::new(args.models_path.clone()).scan()?;
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }
    info!("Found {} Rust files", scan_result.rust_files.len());

    let parsed_files: Vec<ParsedFile> = AstParser::parse_files(&scan_result.rust_files)
        .into_iter()
        .filter_map(|r| match r {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping file due to parse error: {}", e);
                None
            }
        })
        .collect();
    info!("Successfully parsed {} files", parsed_files.len());

    let manifest = Manifest::load(&args.manifest_path)
        .with_context(|| format!("Failed to load manifest {}", args.manifest_path.display()))?;

    let mut resolver = TypeResolver::new(parsed_files);
    let table = manifest.route_table(&mut resolver)?;
    if table.is_empty() {
        warn!("The manifest declares no routes");
    }

    info!("Building OpenAPI document...");
    let document = manifest.builder().build_from_table(&table)?;

    let format = args.format();
    info!("Serializing to {:?} format...", format);
    match format {
        OutputFormat::Yaml => serialize_yaml(&document),
        OutputFormat::Json => serialize_json(&document),
    }
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    let content = generate(&args)?;

    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}
