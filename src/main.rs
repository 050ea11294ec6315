use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use versebook::export::{ExportRegistry, Format};
use versebook::model::Coordinates;
use versebook::query::{self, Outcome};
use versebook::{Collection, config, load, output, parse};

/// Environment variable holding the log filter, e.g. `VERSEBOOK_LOG=debug`.
const LOG_ENV: &str = "VERSEBOOK_LOG";

#[derive(Parser)]
#[command(name = "versebook")]
#[command(about = "Parse, query, and export scripture collections")]
#[command(long_about = "\
Parse, query, and export scripture collections

A collection is built from three delimited tables:

  verses.csv          id, book_id, chapter_id, verse_id, text
  books.csv           id, title[, column_info, genre_id]
  abbreviations.csv   id, local_name, book_id, is_standard

Inline translator notes in verse text ({...}) are stripped while parsing.
Exported JSON can be loaded back with 'read', 'quote', and 'books'.

Logging goes to stderr; set VERSEBOOK_LOG (e.g. info, debug) to change the
level. Run 'versebook gen-config' to generate a documented versebook.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing versebook.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Shared flag for commands that read an exported collection.
#[derive(clap::Args, Clone)]
struct InputArgs {
    /// Exported JSON collection
    #[arg(short, long)]
    input: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Parse raw tables and export the collection
    Parse {
        /// Verses table
        #[arg(long)]
        verses: PathBuf,
        /// Books table
        #[arg(long)]
        books: PathBuf,
        /// Abbreviations table (required to assign short names)
        #[arg(long)]
        abbreviations: Option<PathBuf>,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Export format: json, yaml or txt (default from config)
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Interactive reader over an exported collection
    Read(InputArgs),
    /// Print a book, chapter, or verse
    Quote {
        #[command(flatten)]
        input: InputArgs,
        /// Book short name, e.g. Gen
        book: String,
        chapter: Option<String>,
        verse: Option<String>,
    },
    /// List the books of an exported collection
    Books(InputArgs),
    /// Print a stock versebook.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();
    let config_dir = cli.config;

    match cli.command {
        Command::Parse {
            verses,
            books,
            abbreviations,
            output: output_path,
            format,
        } => {
            let config = config::load_config(&config_dir)?;
            let collection =
                parse::parse_files(&verses, &books, abbreviations.as_deref(), &config)?;
            let format: Format = format
                .as_deref()
                .unwrap_or(config.export.format.as_str())
                .parse()?;
            let registry = ExportRegistry::with_defaults(config.export.indent);
            match &output_path {
                Some(path) => {
                    let mut buf = Vec::new();
                    registry.export(&collection, &mut buf, format)?;
                    std::fs::write(path, &buf)?;
                    println!("==> Wrote {}", path.display());
                    output::print_summary(&collection.summary());
                }
                None => registry.export(&collection, &mut io::stdout().lock(), format)?,
            }
        }
        Command::Read(input) => {
            let collection = open(&input.input, &config_dir)?;
            output::print_summary(&collection.summary());
            run_reader(&collection)?;
        }
        Command::Quote {
            input,
            book,
            chapter,
            verse,
        } => {
            let collection = open(&input.input, &config_dir)?;
            let coords = Coordinates {
                book,
                chapter,
                verse,
            };
            let passage = collection.lookup(&coords)?;
            for line in output::format_passage(&passage) {
                println!("{}", line);
            }
        }
        Command::Books(input) => {
            let collection = open(&input.input, &config_dir)?;
            output::print_book_table(&collection);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr subscriber. The filter comes from `VERSEBOOK_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Load an exported collection with the configured duplicate key policy.
fn open(path: &Path, config_dir: &Path) -> Result<Collection, Box<dyn std::error::Error>> {
    let config = config::load_config(config_dir)?;
    Ok(load::load_from_json_file(path, config.keys)?)
}

/// Prompt, answer, repeat until `quit` or end of input.
fn run_reader(collection: &Collection) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();
    loop {
        write!(stdout, "Query (? or help): ")?;
        stdout.flush()?;
        let Some(line) = lines.next().transpose()? else {
            writeln!(stdout)?;
            return Ok(());
        };
        let outcome = query::process(collection, &line);
        for line in outcome.lines() {
            writeln!(stdout, "{}", line)?;
        }
        if let Outcome::Quit(_) = outcome {
            return Ok(());
        }
    }
}
