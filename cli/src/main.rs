//! protolayout CLI - protocol document layout tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use protolayout::grid::{resolve_table, Slot};
use protolayout::model::Document;
use protolayout::paginate::{paginate, EstimatedHeight, PageBudget, PageMargins};
use protolayout::render::{table_to_text, to_json, to_text, JsonFormat};
use protolayout::{CanonicalOptions, Canonicalizer, Diagnostic, PatternConfig, Protolayout};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "protolayout")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Canonicalize tables and paginate protocol documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Canonicalize every table and print the document as JSON
    Canonicalize {
        /// Input document (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        canon: CanonArgs,
    },

    /// Print the logical grid of one table
    Grid {
        /// Input document (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Table section id
        #[arg(value_name = "TABLE")]
        table: String,

        /// Resolve the table as loaded, without canonicalizing it
        #[arg(long)]
        raw: bool,

        #[command(flatten)]
        canon: CanonArgs,
    },

    /// Assign sections to pages using estimated heights
    Paginate {
        /// Input document (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the page assignment as JSON
        #[arg(long)]
        json: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        page: PageArgs,

        #[command(flatten)]
        canon: CanonArgs,
    },

    /// Render a paginated plain-text preview
    Text {
        /// Input document (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        page: PageArgs,

        #[command(flatten)]
        canon: CanonArgs,
    },

    /// Show section statistics and table families
    Info {
        /// Input document (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        canon: CanonArgs,
    },

    /// Run the full pipeline and write all outputs to a directory
    Layout {
        /// Input document (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        page: PageArgs,

        #[command(flatten)]
        canon: CanonArgs,
    },

    /// Show version information
    Version,
}

/// Page geometry flags, in millimetres.
#[derive(Args)]
struct PageArgs {
    /// Page height
    #[arg(long, default_value = "297")]
    page_height: f32,

    /// Top margin
    #[arg(long, default_value = "3")]
    margin_top: f32,

    /// Bottom margin
    #[arg(long, default_value = "3")]
    margin_bottom: f32,

    /// Space reserved for the running header
    #[arg(long, default_value = "0")]
    header: f32,

    /// Space reserved for the running footer
    #[arg(long, default_value = "0")]
    footer: f32,

    /// Useful height; overrides the page geometry
    #[arg(long, env = "PROTOLAYOUT_USEFUL_HEIGHT")]
    useful_height: Option<f32>,
}

impl PageArgs {
    fn budget(&self) -> protolayout::Result<PageBudget> {
        match self.useful_height {
            Some(height) => PageBudget::new(height),
            None => PageBudget::from_page(
                self.page_height,
                PageMargins::new()
                    .with_margins(self.margin_top, self.margin_bottom)
                    .with_header(self.header)
                    .with_footer(self.footer),
            ),
        }
    }
}

/// Canonicalization flags.
#[derive(Args)]
struct CanonArgs {
    /// Pattern configuration file (JSON)
    #[arg(long, value_name = "FILE", env = "PROTOLAYOUT_PATTERNS")]
    patterns: Option<PathBuf>,

    /// Canonicalize tables on one thread
    #[arg(long)]
    sequential: bool,

    /// Insert the standard footnotes after descriptive tables
    #[arg(long)]
    footnotes: bool,
}

impl CanonArgs {
    fn options(&self) -> CanonicalOptions {
        let mut options = CanonicalOptions::new();
        if self.footnotes {
            options = options.with_default_footnotes();
        }
        if self.sequential {
            options = options.sequential();
        }
        options
    }

    fn canonicalizer(&self) -> protolayout::Result<Canonicalizer> {
        let mut canonicalizer = Canonicalizer::new().with_options(self.options());
        if let Some(path) = &self.patterns {
            log::info!("loading patterns from {}", path.display());
            canonicalizer = canonicalizer.with_patterns(PatternConfig::from_file(path)?.compile()?);
        }
        Ok(canonicalizer)
    }

    fn pipeline(&self, budget: PageBudget) -> protolayout::Result<Protolayout> {
        let mut pipeline = Protolayout::new()
            .with_options(self.options())
            .with_budget(budget);
        if let Some(path) = &self.patterns {
            pipeline = pipeline.with_patterns(PatternConfig::from_file(path)?.compile()?);
        }
        Ok(pipeline)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Canonicalize {
            input,
            output,
            compact,
            canon,
        } => cmd_canonicalize(&input, output.as_deref(), compact, &canon),
        Commands::Grid {
            input,
            table,
            raw,
            canon,
        } => cmd_grid(&input, &table, raw, &canon),
        Commands::Paginate {
            input,
            json,
            compact,
            page,
            canon,
        } => cmd_paginate(&input, json, compact, &page, &canon),
        Commands::Text {
            input,
            output,
            page,
            canon,
        } => cmd_text(&input, output.as_deref(), &page, &canon),
        Commands::Info { input, canon } => cmd_info(&input, &canon),
        Commands::Layout {
            input,
            output,
            compact,
            page,
            canon,
        } => cmd_layout(&input, output.as_deref(), compact, &page, &canon),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    eprintln!("{}", "Diagnostics".yellow().bold());
    for diagnostic in diagnostics {
        eprintln!("  {} {}", "!".yellow(), diagnostic);
    }
}

fn cmd_canonicalize(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    canon: &CanonArgs,
) -> CliResult {
    let doc = protolayout::parse_file(input)?;
    let canonical = canon.canonicalizer()?.canonicalize_document(&doc);
    let json = to_json(&canonical, json_format(compact))?;
    write_or_print(output, &json)
}

fn cmd_grid(input: &Path, table_id: &str, raw: bool, canon: &CanonArgs) -> CliResult {
    let doc = protolayout::parse_file(input)?;
    let table = doc
        .section(table_id)
        .and_then(|s| s.as_table())
        .ok_or_else(|| format!("No table section with id `{}`", table_id))?;
    let table = if raw {
        table.clone()
    } else {
        canon.canonicalizer()?.canonicalize(table)
    };

    let grid = resolve_table(&table);
    println!(
        "{} {} ({} rows x {} cols)",
        "Table".cyan().bold(),
        table.id,
        grid.row_count(),
        grid.total_cols()
    );
    println!("{}", "─".repeat(40).dimmed());

    for (r, row) in table.rows.iter().enumerate() {
        let slots: Vec<String> = grid
            .row_slots(r)
            .iter()
            .map(|slot| match *slot {
                Slot::Empty => ".".dimmed().to_string(),
                Slot::Occupied {
                    cell,
                    top_left: true,
                } => cell.cell.to_string().green().to_string(),
                Slot::Occupied { .. } => "<".to_string(),
                Slot::Covered { by } => format!("^{}", by.row).blue().to_string(),
            })
            .collect();
        println!("{:>4} {:<24} {}", r, row.id, slots.join(" "));
    }

    println!();
    println!("{}", table_to_text(&table));
    print_diagnostics(grid.diagnostics());
    Ok(())
}

fn cmd_paginate(
    input: &Path,
    json: bool,
    compact: bool,
    page: &PageArgs,
    canon: &CanonArgs,
) -> CliResult {
    let doc = protolayout::parse_file(input)?;
    let budget = page.budget()?;
    let canonical = canon.canonicalizer()?.canonicalize_document(&doc);
    let pagination = paginate(&canonical.sections, &EstimatedHeight::new(), &budget);

    if json {
        println!("{}", to_json(&pagination, json_format(compact))?);
        return Ok(());
    }

    println!(
        "{} {:.1}mm useful height",
        "Budget".cyan().bold(),
        budget.useful_height()
    );
    println!("{}", "─".repeat(40).dimmed());
    for p in &pagination.pages {
        let marker = if p.overflow {
            " overflow".red().to_string()
        } else {
            String::new()
        };
        println!("{} {} ({:.1}mm){}", "Page".bold(), p.number, p.height, marker);
        for &index in &p.sections {
            let section = &canonical.sections[index];
            println!(
                "  {} {:>3} {:<10} {}",
                "├─".dimmed(),
                index,
                section.kind_name(),
                section.id()
            );
        }
    }
    print_diagnostics(&pagination.diagnostics);
    Ok(())
}

fn cmd_text(input: &Path, output: Option<&Path>, page: &PageArgs, canon: &CanonArgs) -> CliResult {
    let doc = protolayout::parse_file(input)?;
    let result = canon
        .pipeline(page.budget()?)?
        .run(&doc, &EstimatedHeight::new());
    print_diagnostics(&result.diagnostics);
    write_or_print(output, &result.preview())
}

fn cmd_info(input: &Path, canon: &CanonArgs) -> CliResult {
    let doc = protolayout::parse_file(input)?;
    let canonicalizer = canon.canonicalizer()?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Id".bold(), doc.id);
    println!("{}: {}", "Name".bold(), doc.name);
    if let Some(ref version) = doc.version {
        println!("{}: {}", "Version".bold(), version);
    }

    println!();
    println!("{}", "Section Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    print_section_counts(&doc);

    println!();
    println!("{}", "Tables".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for table in doc.tables() {
        let family = canonicalizer
            .classify_table(table)
            .map_or_else(|| "-".dimmed().to_string(), |f| f.to_string().green().to_string());
        let grid = resolve_table(table);
        println!(
            "{:<24} {:>4} rows {:>3} cols  {}{}",
            table.id,
            table.row_count(),
            grid.total_cols(),
            family,
            if table.has_merged_cells() { "  merged" } else { "" }
        );
    }

    Ok(())
}

fn print_section_counts(doc: &Document) {
    for kind in ["text", "checklist", "table", "signatures"] {
        let count = doc.sections.iter().filter(|s| s.kind_name() == kind).count();
        println!("{}: {}", kind.bold(), count);
    }
    let breaks = doc.sections.iter().filter(|s| s.page_break_before()).count();
    println!("{}: {}", "page breaks".bold(), breaks);
}

fn cmd_layout(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    page: &PageArgs,
    canon: &CanonArgs,
) -> CliResult {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_layout", stem))
    });

    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(4);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Loading document...");
    let doc = protolayout::parse_file(input)?;
    let pipeline = canon.pipeline(page.budget()?)?;
    pb.inc(1);

    pb.set_message("Canonicalizing and paginating...");
    let result = pipeline.run(&doc, &EstimatedHeight::new());
    pb.inc(1);

    pb.set_message("Writing JSON...");
    let format = json_format(compact);
    fs::write(output_dir.join("canonical.json"), to_json(&result.document, format)?)?;
    fs::write(output_dir.join("pages.json"), to_json(&result.pages, format)?)?;
    pb.inc(1);

    pb.set_message("Writing preview...");
    fs::write(
        output_dir.join("preview.txt"),
        to_text(&result.document, &result.pages),
    )?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    println!(
        "\n{} {} sections on {} pages",
        "Layout:".green().bold(),
        result.document.section_count(),
        result.page_count()
    );
    println!("\n{}", "Output files:".green().bold());
    println!("  {} canonical.json", "├─".dimmed());
    println!("  {} pages.json", "├─".dimmed());
    println!("  {} preview.txt", "└─".dimmed());

    print_diagnostics(&result.diagnostics);
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "protolayout".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Table canonicalization and atomic pagination for protocol documents");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/protolayout".dimmed());
    println!("License: MIT");
}
