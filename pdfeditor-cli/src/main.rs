use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdfeditor::{
    CompressRequest, ConvertRequest, EditorError, EngineConfig, LopdfEngine, OutputArtifact,
    PdfEditor, SplitRequest, Upload, Workspace,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "pdfeditor",
    about = "Split, merge and convert PDF documents",
    version,
    author
)]
struct Cli {
    /// Directory receiving produced files
    #[arg(long, global = true, default_value = "./output")]
    output_dir: PathBuf,

    /// Directory holding the pdfium library (with the `pdfium` feature)
    #[arg(long, global = true)]
    pdfium_lib: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge PDFs into one, in the given order
    Merge {
        /// Input PDF files
        #[arg(required = true, num_args = 2..)]
        files: Vec<PathBuf>,

        /// Output file name
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Split a PDF by page ranges or at boundary pages
    Split {
        /// Input PDF file
        input: PathBuf,

        /// Split mode: ranges or pages
        #[arg(short, long, default_value = "ranges")]
        mode: String,

        /// Ranges ("1-3,4-10") or boundary pages ("4,7")
        #[arg(short, long, value_delimiter = ',', required = true)]
        points: Vec<String>,

        /// Base name of the produced files
        #[arg(short, long)]
        base: Option<String>,
    },

    /// Render pages to images
    Convert {
        /// Input PDF file
        input: PathBuf,

        /// Image format: png, jpeg or tiff
        #[arg(short, long, default_value = "png")]
        format: String,

        /// Resolution in dots per inch
        #[arg(short, long, default_value_t = 150)]
        dpi: u32,

        /// Pages to render (e.g., "1,3,5-7"); all when omitted
        #[arg(short, long)]
        pages: Option<String>,

        /// Base name of the produced files
        #[arg(short, long)]
        base: Option<String>,
    },

    /// Reduce the size of a PDF
    Compress {
        /// Input PDF file
        input: PathBuf,

        /// Compression profile: web, print or custom
        #[arg(short, long, default_value = "web")]
        profile: String,

        /// Image quality for the custom profile (1-100)
        #[arg(short, long)]
        quality: Option<u8>,

        /// Output file name
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Extract text from a PDF file
    ExtractText {
        /// Input PDF file
        input: PathBuf,

        /// Pages to extract (e.g., "1,3,5-7"); all when omitted
        #[arg(short, long)]
        pages: Option<String>,

        /// Output text file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Get information about a PDF file
    Info {
        /// Input PDF file
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the PDF/A conformance a file declares
    ValidatePdfa {
        /// Input PDF file
        input: PathBuf,

        /// Expected conformance level (e.g., "2b")
        #[arg(short, long)]
        level: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let engine = LopdfEngine::initialize(&EngineConfig {
        native_lib_path: cli.pdfium_lib.clone(),
    })
    .context("Failed to initialize the PDF engine")?;

    // Uploads are staged in a private directory that goes away on exit
    let staging = TempDir::new().context("Failed to create staging directory")?;
    let workspace = Workspace::new(staging.path(), &cli.output_dir)
        .with_context(|| format!("Failed to prepare {}", cli.output_dir.display()))?;
    let editor = PdfEditor::new(Arc::new(engine), workspace);

    match cli.command {
        Commands::Merge { files, output } => {
            let uploads = files
                .iter()
                .map(|path| read_upload(path))
                .collect::<Result<Vec<_>>>()?;
            let artifact = editor.merge(&uploads, output.as_deref())?;
            println!("✓ Merged {} files", uploads.len());
            print_artifact(&artifact);
        }

        Commands::Split {
            input,
            mode,
            points,
            base,
        } => {
            let upload = read_upload(&input)?;
            let request = SplitRequest {
                mode,
                points,
                output_base: base,
            };
            let artifacts = editor
                .split(&upload, &request)
                .inspect_err(print_partial)?;
            println!("✓ Split {} into {} files", input.display(), artifacts.len());
            artifacts.iter().for_each(print_artifact);
        }

        Commands::Convert {
            input,
            format,
            dpi,
            pages,
            base,
        } => {
            let upload = read_upload(&input)?;
            let request = ConvertRequest {
                image_format: Some(format),
                dpi: Some(dpi),
                pages,
                output_base: base,
            };
            let artifacts = editor
                .convert_to_images(&upload, &request)
                .inspect_err(print_partial)?;
            println!("✓ Rendered {} pages", artifacts.len());
            artifacts.iter().for_each(print_artifact);
        }

        Commands::Compress {
            input,
            profile,
            quality,
            output,
        } => {
            let upload = read_upload(&input)?;
            let request = CompressRequest {
                profile: Some(profile),
                image_quality: quality,
                output_file_name: output,
            };
            let artifact = editor.compress(&upload, &request)?;
            print_artifact(&artifact);
            if let (Some(original), Some(ratio)) =
                (artifact.original_size, artifact.compression_ratio)
            {
                println!(
                    "✓ {} -> {} bytes ({:.1}% smaller)",
                    original, artifact.file_size, ratio
                );
            }
        }

        Commands::ExtractText {
            input,
            pages,
            output,
        } => {
            let upload = read_upload(&input)?;
            let report = editor.extract_data(&upload, pages.as_deref())?;

            if let Some(output_path) = output {
                fs::write(&output_path, &report.text_content)
                    .with_context(|| format!("Failed to write {}", output_path.display()))?;
                println!(
                    "✓ Text of {} pages ({} words) extracted to: {}",
                    report.pages.len(),
                    report.word_count,
                    output_path.display()
                );
            } else {
                println!("{}", report.text_content);
            }
        }

        Commands::Info { input, json } => {
            let upload = read_upload(&input)?;
            let info = editor.read_metadata(&upload)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("PDF Information for: {}", input.display());
                println!("==========================================");
                println!("PDF Version: {}", info.pdf_version);
                println!("Pages: {}", info.page_count);
                println!("File size: {} bytes", info.file_size);
                let fields = [
                    ("Title", &info.title),
                    ("Author", &info.author),
                    ("Subject", &info.subject),
                    ("Keywords", &info.keywords),
                    ("Creator", &info.creator),
                    ("Producer", &info.producer),
                ];
                for (label, value) in fields {
                    if let Some(value) = value {
                        println!("{label}: {value}");
                    }
                }
                if let Some(created) = info.creation_date {
                    println!("Created: {}", created.to_rfc3339());
                }
                if let Some(modified) = info.modification_date {
                    println!("Modified: {}", modified.to_rfc3339());
                }
                println!("Encrypted: {}", yes_no(info.encrypted));
                println!("Linearized: {}", yes_no(info.linearized));
                println!("Has forms: {}", yes_no(info.has_forms));
                println!("Tagged: {}", yes_no(info.tagged));
                if let Some(conformance) = &info.pdfa_conformance {
                    println!("PDF/A: {conformance}");
                }
            }
        }

        Commands::ValidatePdfa { input, level, json } => {
            let upload = read_upload(&input)?;
            let report = editor.validate_pdfa(&upload, level.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let mark = if report.is_compliant { "✓" } else { "✗" };
                println!("{} {}", mark, report.summary);
                for issue in report.errors.iter().chain(&report.warnings) {
                    println!("  [{:?}] {}: {}", issue.severity, issue.code, issue.message);
                }
            }
            if !report.is_compliant {
                anyhow::bail!("{} is not PDF/A compliant", input.display());
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "pdfeditor=debug" } else { "pdfeditor=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn read_upload(path: &Path) -> Result<Upload> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input.pdf".to_string());
    debug!("Read {} ({} bytes)", path.display(), bytes.len());
    Ok(Upload::new(file_name, bytes))
}

fn print_artifact(artifact: &OutputArtifact) {
    println!(
        "  {} ({} bytes)",
        artifact.file_path.display(),
        artifact.file_size
    );
}

fn print_partial(error: &EditorError) {
    let produced = error.partial_artifacts();
    if !produced.is_empty() {
        eprintln!("Files written before the failure:");
        for artifact in produced {
            eprintln!("  {}", artifact.file_path.display());
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}
