//! skos-forest CLI: turn a SKOS thesaurus into a browse forest.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use oxigraph::io::RdfFormat;

use skos_forest::config::{NotationFormat, SortAxis, TransformConfig};
use skos_forest::engine::ThesaurusEngine;
use skos_forest::graph::rdf;

#[derive(Parser)]
#[command(name = "skos-forest", version, about = "SKOS thesaurus-to-tree transform")]
struct Cli {
    /// TOML file with the transform configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the browse forest and print it as JSON.
    Build {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        flags: FlagArgs,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Print hierarchy statistics and cycles as JSON.
    Stats {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        flags: FlagArgs,
    },

    /// Print the effective configuration as TOML.
    Config {
        #[command(flatten)]
        flags: FlagArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// RDF file to read.
    #[arg(long)]
    input: PathBuf,

    /// RDF syntax. Guessed from the file extension when omitted.
    #[arg(long, value_enum)]
    format: Option<Syntax>,
}

#[derive(Args)]
struct FlagArgs {
    /// Consider concept schemes.
    #[arg(long)]
    schemes: bool,

    /// Consider collections.
    #[arg(long)]
    collections: bool,

    /// Add normalized URL forms of IRIs.
    #[arg(long)]
    resolve_urls: bool,

    /// Offer notation sorting with the given notation format.
    #[arg(long, value_enum)]
    notation: Option<NotationArg>,

    /// Make notation the default sibling order (requires --notation).
    #[arg(long, requires = "notation")]
    sort_by_notation: bool,

    /// Primary vocabulary language.
    #[arg(long)]
    language: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Syntax {
    Turtle,
    Ntriples,
    Nquads,
    Trig,
    N3,
    Rdfxml,
}

impl From<Syntax> for RdfFormat {
    fn from(syntax: Syntax) -> Self {
        match syntax {
            Syntax::Turtle => RdfFormat::Turtle,
            Syntax::Ntriples => RdfFormat::NTriples,
            Syntax::Nquads => RdfFormat::NQuads,
            Syntax::Trig => RdfFormat::TriG,
            Syntax::N3 => RdfFormat::N3,
            Syntax::Rdfxml => RdfFormat::RdfXml,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum NotationArg {
    Alpha,
    Dotted,
    Float,
}

impl From<NotationArg> for NotationFormat {
    fn from(arg: NotationArg) -> Self {
        match arg {
            NotationArg::Alpha => NotationFormat::Alpha,
            NotationArg::Dotted => NotationFormat::Dotted,
            NotationArg::Float => NotationFormat::Float,
        }
    }
}

/// Configuration file (or defaults) with command-line flags layered on top.
fn effective_config(path: Option<&Path>, flags: &FlagArgs) -> Result<TransformConfig> {
    let mut config = match path {
        Some(path) => TransformConfig::load(path)?,
        None => TransformConfig::default(),
    };
    config.concept_schemes |= flags.schemes;
    config.collections |= flags.collections;
    config.resolve_urls |= flags.resolve_urls;
    if let Some(language) = &flags.language {
        config.primary_language = language.clone();
    }
    if let Some(format) = flags.notation {
        let axis = if flags.sort_by_notation {
            SortAxis::Notation
        } else {
            SortAxis::Label
        };
        config = config.with_notation(format.into(), axis);
    }
    config.validate()?;
    Ok(config)
}

fn load_engine(config: TransformConfig, input: &InputArgs) -> Result<ThesaurusEngine> {
    let triples = rdf::load_file(&input.input, input.format.map(RdfFormat::from))?;
    let mut engine = ThesaurusEngine::new(config)?;
    let count = engine.ingest_all(&triples)?;
    tracing::info!(triples = count, "ingested input");
    Ok(engine)
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            flags,
            pretty,
        } => {
            let config = effective_config(cli.config.as_deref(), &flags)?;
            let output = load_engine(config, &input)?.build()?;
            let json = if pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }
            .into_diagnostic()?;
            println!("{json}");
        }

        Commands::Stats { input, flags } => {
            let config = effective_config(cli.config.as_deref(), &flags)?;
            let stats = load_engine(config, &input)?.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats).into_diagnostic()?);
        }

        Commands::Config { flags } => {
            let config = effective_config(cli.config.as_deref(), &flags)?;
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
