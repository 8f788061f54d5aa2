//! CLI tool for rendering documents as Markdown records.

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use docmark_parser::{
    FileTypeParser, LocalStreamReader, OutputRecord, RemoteFile, StreamConfig, UnstructuredParser,
};
use std::fs::File;
use std::io::Write;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Render PDF, DOCX, PPTX and Markdown files as Markdown records.
#[derive(Parser, Debug)]
#[command(name = "docmark")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the schema of the records produced for the input files
    Schema {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Parse the input files, printing one JSON record per line
    Parse {
        #[command(flatten)]
        source: SourceArgs,

        /// Write each parsed document to <OUTPUT>/<path>.md instead of printing records
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ClapArgs, Debug)]
struct SourceArgs {
    /// Input file(s), relative to the root directory
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Root directory the file URIs are relative to
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Stream configuration as a JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stream name used when no configuration file is given
    #[arg(long, default_value = "documents")]
    stream: String,

    /// Fail on the first file that cannot be parsed instead of emitting an error record
    #[arg(long, conflicts_with = "config")]
    fail_on_unprocessable: bool,

    /// MIME type reported for every input file
    #[arg(short, long)]
    mime_type: Option<String>,
}

impl SourceArgs {
    fn stream_config(&self) -> Result<StreamConfig> {
        match &self.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                serde_json::from_reader(file)
                    .with_context(|| format!("Invalid stream configuration in {}", path.display()))
            }
            None => Ok(StreamConfig::unstructured(
                &self.stream,
                !self.fail_on_unprocessable,
            )),
        }
    }

    fn remote_files(&self, reader: &LocalStreamReader) -> Result<Vec<RemoteFile>> {
        self.input
            .iter()
            .map(|path| {
                let file = reader
                    .remote_file(path)
                    .with_context(|| format!("Failed to stat {}", path.display()))?;
                Ok(match &self.mime_type {
                    Some(mime_type) => file.with_mime_type(mime_type),
                    None => file,
                })
            })
            .collect()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let parser = UnstructuredParser::new();

    match &args.command {
        Command::Schema { source } => print_schema(&parser, source),
        Command::Parse { source, output } => {
            parse_files(&parser, source, output.as_deref(), args.verbose)
        }
    }
}

/// Infer the schema from as many files as the parser asks for.
fn print_schema(parser: &UnstructuredParser, source: &SourceArgs) -> Result<()> {
    let config = source.stream_config()?;
    let reader = LocalStreamReader::new(&source.root);
    let files = source.remote_files(&reader)?;

    let limit = parser
        .parser_max_n_files_for_schema_inference()
        .unwrap_or(files.len());

    let mut schema = None;
    for file in files.iter().take(limit) {
        log::debug!("Inferring schema from {}", file.uri);
        let inferred = futures::executor::block_on(parser.infer_schema(&config, file, &reader))
            .with_context(|| format!("Failed to infer schema from {}", file.uri))?;
        schema = Some(inferred);
    }

    let schema = schema.context("No input file to infer the schema from")?;
    println!("{}", serde_json::to_string_pretty(&schema)?);

    Ok(())
}

/// Parse every file, stopping at the first error the parser does not turn
/// into a record.
fn parse_files(
    parser: &UnstructuredParser,
    source: &SourceArgs,
    output_dir: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let config = source.stream_config()?;
    let reader = LocalStreamReader::new(&source.root);
    let files = source.remote_files(&reader)?;

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    let mut degraded = 0;
    let mut written = HashSet::new();

    for file in &files {
        if verbose {
            eprintln!("Processing: {}", file.uri);
        }

        for record in parser.parse_records(&config, file, &reader) {
            let record = record.with_context(|| format!("Failed to parse {}", file.uri))?;
            if record.is_degraded() {
                degraded += 1;
            }

            match output_dir {
                Some(dir) => write_markdown(dir, &record, &mut written)?,
                None => {
                    serde_json::to_writer(&mut stdout, &record)?;
                    writeln!(stdout)?;
                }
            }
        }
    }

    if degraded > 0 {
        log::warn!("{} of {} files could not be parsed", degraded, files.len());
    }

    Ok(())
}

/// Write a parsed record's Markdown under `dir`.
fn write_markdown(dir: &Path, record: &OutputRecord, written: &mut HashSet<PathBuf>) -> Result<()> {
    let Some(content) = &record.content else {
        eprintln!(
            "Skipped {}: {}",
            record.document_key,
            record.parse_error.as_deref().unwrap_or_default()
        );
        return Ok(());
    };

    let output_path = get_output_path(dir, &record.document_key);
    if !written.insert(output_path.clone()) {
        log::warn!(
            "{} overwrites output of an earlier document at {}",
            record.document_key,
            output_path.display()
        );
    }
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let mut file = File::create(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", output_path.display()))?;

    log::debug!("Written to: {}", output_path.display());

    Ok(())
}

/// Determine the output path for a document, keeping its directories
/// relative to the root. Components that would leave `dir` are dropped.
fn get_output_path(dir: &Path, document_key: &str) -> PathBuf {
    let relative: PathBuf = Path::new(document_key)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    if relative.file_stem().is_none() {
        return dir.join("output.md");
    }

    dir.join(relative.with_extension("md"))
}
