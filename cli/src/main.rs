//! undeck CLI - PowerPoint and PDF to Markdown conversion tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use undeck::{
    detect_format_from_path, extract_pdf_hyperlinks, extract_pptx_hyperlinks,
    format_hyperlinks_section, ConvertOptions, ConverterRegistry, DocumentFormat, MetadataStyle,
    OutputFormat, PageSelection, RenderOptions,
};

#[derive(Parser)]
#[command(name = "undeck")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert PowerPoint and PDF documents to Markdown with their hyperlinks", long_about = None)]
struct Cli {
    /// Input PPTX or PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (defaults to the input name with a .md extension)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input PPTX or PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Ignore accessibility order and read shapes by position
        #[arg(long, env = "UNDECK_SPATIAL")]
        spatial: bool,

        /// Omit the trailing hyperlink section
        #[arg(long)]
        no_links: bool,

        /// Omit slide and page markers
        #[arg(long)]
        no_markers: bool,

        /// Where to write document metadata
        #[arg(long, value_enum, default_value = "none", env = "UNDECK_METADATA")]
        metadata: MetadataMode,

        /// Slide or page selection (e.g., "1-10", "1,3,5")
        #[arg(long, value_name = "SEL")]
        slides: Option<String>,

        /// Keep short unpunctuated paragraphs as plain text instead of headings
        #[arg(long)]
        no_headings: bool,
    },

    /// List the hyperlinks of a document
    Links {
        /// Input PPTX or PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a document to structured JSON
    Json {
        /// Input PPTX or PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Convert several documents to Markdown files
    Convert {
        /// Input PPTX or PDF files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Ignore accessibility order and read shapes by position
        #[arg(long, env = "UNDECK_SPATIAL")]
        spatial: bool,
    },

    /// Show document information
    Info {
        /// Input PPTX or PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum MetadataMode {
    /// No metadata
    None,
    /// HTML comment block
    Comment,
    /// YAML frontmatter
    Frontmatter,
}

impl From<MetadataMode> for MetadataStyle {
    fn from(mode: MetadataMode) -> Self {
        match mode {
            MetadataMode::None => MetadataStyle::None,
            MetadataMode::Comment => MetadataStyle::Comment,
            MetadataMode::Frontmatter => MetadataStyle::Frontmatter,
        }
    }
}

struct MarkdownArgs {
    spatial: bool,
    no_links: bool,
    no_markers: bool,
    metadata: MetadataMode,
    slides: Option<String>,
    no_headings: bool,
}

impl MarkdownArgs {
    fn to_options(&self) -> Result<ConvertOptions, Box<dyn std::error::Error>> {
        let pages = match &self.slides {
            Some(sel) => sel.parse::<PageSelection>()?,
            None => PageSelection::All,
        };

        let render = RenderOptions::new()
            .with_slide_markers(!self.no_markers)
            .with_hyperlink_section(!self.no_links)
            .with_metadata(self.metadata.into())
            .with_heading_promotion(!self.no_headings)
            .with_pages(pages);

        Ok(ConvertOptions::new()
            .with_render_options(render)
            .with_accessibility_order(!self.spatial))
    }
}

impl Default for MarkdownArgs {
    fn default() -> Self {
        Self {
            spatial: false,
            no_links: false,
            no_markers: false,
            metadata: MetadataMode::None,
            slides: None,
            no_headings: false,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Markdown {
            input,
            output,
            spatial,
            no_links,
            no_markers,
            metadata,
            slides,
            no_headings,
        }) => {
            let args = MarkdownArgs {
                spatial,
                no_links,
                no_markers,
                metadata,
                slides,
                no_headings,
            };
            cmd_markdown(&input, output.as_deref(), &args)
        }
        Some(Commands::Links { input, json }) => cmd_links(&input, json),
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact),
        Some(Commands::Convert {
            inputs,
            output,
            spatial,
        }) => cmd_convert(&inputs, output.as_deref(), spatial),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert to a Markdown file next to the input
            if let Some(input) = cli.input {
                let output = cli
                    .output
                    .unwrap_or_else(|| input.with_extension("md"));
                cmd_markdown(&input, Some(&output), &MarkdownArgs::default())
            } else {
                println!("{}", "Usage: undeck <FILE> [OUTPUT]".yellow());
                println!("       undeck --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        log::debug!("Exiting after error: {:?}", e);
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn write_or_print(content: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn report_diagnostics(diagnostics: &[undeck::Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{} {}", "Skipped".yellow(), diagnostic);
    }
}

fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    args: &MarkdownArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.to_options()?;
    let result = ConverterRegistry::with_defaults().convert(input, &options)?;
    log::debug!(
        "Converted {} to {} bytes of Markdown",
        input.display(),
        result.content_len()
    );
    report_diagnostics(&result.diagnostics);
    write_or_print(&result.content, output)
}

fn cmd_links(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (links, container) = match detect_format_from_path(input)? {
        DocumentFormat::Pptx => (extract_pptx_hyperlinks(input), "Presentation"),
        DocumentFormat::Pdf { .. } => (extract_pdf_hyperlinks(input), "Document"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&links)?);
    } else if links.is_empty() {
        println!("{}", "No hyperlinks found".dimmed());
    } else {
        println!("{}", format_hyperlinks_section(&links, container));
    }

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = ConvertOptions::new().with_format(OutputFormat::Json);
    let result = ConverterRegistry::with_defaults().convert(input, &options)?;
    report_diagnostics(&result.diagnostics);

    let content = if compact {
        let value: serde_json::Value = serde_json::from_str(&result.content)?;
        serde_json::to_string(&value)?
    } else {
        result.content
    };

    write_or_print(&content, output)
}

fn cmd_convert(
    inputs: &[PathBuf],
    output: Option<&Path>,
    spatial: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Converting...");

    let options = ConvertOptions::new().with_accessibility_order(!spatial);
    let results = ConverterRegistry::with_defaults().convert_many(inputs, &options);

    let mut converted = Vec::new();
    let mut failed = Vec::new();
    for (input, result) in results {
        pb.set_message(input.display().to_string());
        match result {
            Ok(result) => {
                let stem = input.file_stem().unwrap_or_default().to_string_lossy();
                let name = format!("{}.md", stem);
                fs::write(output_dir.join(&name), &result.content)?;
                converted.push(name);
            }
            Err(e) => {
                log::warn!("Conversion of {} failed: {}", input.display(), e);
                failed.push((input, e));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    if !converted.is_empty() {
        println!("\n{}", "Output files:".green().bold());
        for (i, name) in converted.iter().enumerate() {
            let branch = if i + 1 == converted.len() { "└─" } else { "├─" };
            println!("  {} {}", branch.dimmed(), name);
        }
    }

    for (input, e) in &failed {
        eprintln!("{} {}: {}", "Failed".red().bold(), input.display(), e);
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(format!("{} of {} files failed", failed.len(), inputs.len()).into())
    }
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let format = detect_format_from_path(input)?;
    let options = ConvertOptions::new().with_stats(true);
    let result = ConverterRegistry::with_defaults().convert(input, &options)?;
    let metadata = &result.metadata;
    let count_label = match format {
        DocumentFormat::Pptx => "Slides",
        DocumentFormat::Pdf { .. } => "Pages",
    };

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!("{}: {}", count_label.bold(), metadata.page_count);

    if let Some(ref title) = metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref subject) = metadata.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref creator) = metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref created) = metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    if let Some(stats) = result.stats {
        println!();
        println!("{}", "Content Statistics".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());

        println!("{}: {}", "Blocks".bold(), stats.block_count);
        println!("{}: {}", "Tables".bold(), stats.table_count);
        println!("{}: {}", "Images".bold(), stats.image_count);
        println!("{}: {}", "Hyperlinks".bold(), stats.link_count);
        println!("{}: {}", "Words".bold(), stats.word_count);
    }

    if !result.diagnostics.is_empty() {
        println!("{}: {}", "Skipped".bold(), result.diagnostics.len());
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "undeck".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PowerPoint and PDF to Markdown conversion tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/undeck".dimmed());
    println!("License: MIT");
}
