//! Cellgrid - a cell-grid spreadsheet with a small formula language

use anyhow::{Context, Result, bail};
use cellgrid_core::{CellRef, Document, SheetConfig};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cellgrid")]
#[command(author, version, about = "Evaluate and edit cell-grid spreadsheets (.grd)")]
struct Cli {
    /// Sheet config file (default: config.toml in the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Number of columns, overriding the config file
    #[arg(long, global = true)]
    columns: Option<usize>,

    /// Number of rows, overriding the config file
    #[arg(long, global = true)]
    rows: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the evaluated sheet as a markdown table
    Show {
        /// Sheet file (.grd)
        file: PathBuf,

        /// Write the markdown to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the display text of one or more cells
    Get {
        /// Sheet file (.grd)
        file: PathBuf,

        /// Cells in A1 notation
        #[arg(required = true)]
        cells: Vec<String>,
    },

    /// Evaluate a formula without storing it
    Eval {
        /// Formula, with or without the leading '='
        #[arg(allow_hyphen_values = true)]
        formula: String,

        /// Sheet the formula's references read from
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Cell the formula is evaluated as though entered at
        #[arg(long, default_value = "A1")]
        at: String,
    },

    /// Store raw input in a cell and save the file
    Set {
        /// Sheet file (.grd), created if missing
        file: PathBuf,

        /// Cell in A1 notation
        cell: String,

        /// Raw input: a number, text, or a formula starting with '='
        #[arg(allow_hyphen_values = true)]
        input: String,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Show { file, output } => show(&file, output.as_deref(), &config),
        Commands::Get { file, cells } => get(&file, &cells, &config),
        Commands::Eval { formula, file, at } => eval(&formula, file, &at, &config),
        Commands::Set { file, cell, input } => set(&file, &cell, &input, &config),
    }
}

/// Log to stderr, filtered by `CELLGRID_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("CELLGRID_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellgrid")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

fn load_config(cli: &Cli) -> Result<SheetConfig> {
    let mut config = match &cli.config {
        Some(path) => SheetConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => match user_config_path().filter(|p| p.exists()) {
            Some(path) => SheetConfig::load(&path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))?,
            None => SheetConfig::default(),
        },
    };

    if let Some(columns) = cli.columns {
        config.columns = columns;
    }
    if let Some(rows) = cli.rows {
        config.rows = rows;
    }
    config.validate().context("Invalid sheet size")?;
    tracing::debug!(?config, "sheet config");
    Ok(config)
}

fn open(file: &Path, config: &SheetConfig) -> Result<Document> {
    Document::with_file(Some(file.to_path_buf()), config)
        .with_context(|| format!("Failed to open '{}'", file.display()))
}

fn parse_cell(name: &str) -> Result<CellRef> {
    match CellRef::from_str(name) {
        Some(cell) => Ok(cell),
        None => bail!("Invalid cell reference: {}", name),
    }
}

fn show(file: &Path, output: Option<&Path>, config: &SheetConfig) -> Result<()> {
    let doc = open(file, config)?;
    match output {
        Some(path) => {
            cellgrid_core::storage::write_markdown(path, &doc)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(cellgrid_core::storage::markdown_content(&doc).as_bytes())?;
        }
    }
    Ok(())
}

fn get(file: &Path, cells: &[String], config: &SheetConfig) -> Result<()> {
    let doc = open(file, config)?;
    for name in cells {
        let cell = parse_cell(name)?;
        let display = doc.get_cell_display(&cell);
        if cells.len() == 1 {
            println!("{}", display);
        } else {
            println!("{}: {}", cell, display);
        }
    }
    Ok(())
}

fn eval(formula: &str, file: Option<PathBuf>, at: &str, config: &SheetConfig) -> Result<()> {
    let doc = match file {
        Some(file) => open(&file, config)?,
        None => Document::with_config(config),
    };
    let cell = parse_cell(at)?;
    let display = doc
        .display_formula_at(formula, &cell)
        .with_context(|| format!("Cannot evaluate at {}", cell))?;
    println!("{}", display);
    Ok(())
}

fn set(file: &Path, name: &str, input: &str, config: &SheetConfig) -> Result<()> {
    let mut doc = if file.exists() {
        open(file, config)?
    } else {
        let mut doc = Document::with_config(config);
        doc.file_path = Some(file.to_path_buf());
        doc
    };
    let cell = parse_cell(name)?;
    doc.set_cell_from_input(cell, input)
        .with_context(|| format!("Cannot set {}", cell))?;
    doc.save_file()
        .with_context(|| format!("Failed to save '{}'", file.display()))?;
    println!("{}", doc.get_cell_display(&cell));
    Ok(())
}
