//! meshbake CLI
//!
//! Command-line interface for listing COLLADA scene pieces and baking them
//! into C or Rust source.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing::info;

use meshbake_export::{BakeJob, BakeOptions, BakeReport, Baker, Dialect, EmitOptions, NodeSelector};
use meshbake_parsers::logging::{init_with_config, TracingConfig};
use meshbake_parsers::ParseOptions;

/// meshbake - bake COLLADA geometry into compiled-in vertex arrays
#[derive(Parser)]
#[command(name = "meshbake")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the geometry nodes of a scene
    List(ListArgs),

    /// Bake one scene into C or Rust source
    Convert(ConvertArgs),

    /// Bake several scenes into Rust files sharing one common module
    Batch(BatchArgs),
}

#[derive(Args)]
struct ParseArgs {
    /// Reject geometry nodes with extra instance children
    #[arg(long)]
    strict: bool,

    /// Node name suffix marking a joint
    #[arg(long, default_value = "_bone")]
    bone_suffix: String,
}

impl ParseArgs {
    fn options(&self) -> ParseOptions {
        ParseOptions {
            strict_validation: self.strict,
            bone_suffix: self.bone_suffix.clone(),
        }
    }
}

#[derive(Args)]
struct ListArgs {
    /// Path to the COLLADA document
    #[arg(short, long)]
    input: PathBuf,

    /// Also list joint nodes
    #[arg(long)]
    joints: bool,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    #[command(flatten)]
    parse: ParseArgs,
}

#[derive(Args)]
#[command(group(ArgGroup::new("selection").required(true).args(["all", "pieces"])))]
struct ConvertArgs {
    /// Path to the COLLADA document
    #[arg(short, long)]
    input: PathBuf,

    /// Output dialect: c, rust
    #[arg(short, long)]
    dialect: Dialect,

    /// Bake every geometry node
    #[arg(long)]
    all: bool,

    /// Bake only this geometry node (can be repeated)
    #[arg(short = 'p', long = "piece")]
    pieces: Vec<String>,

    /// Output file (stdout when absent)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Import `Vertex` from this module instead of defining it (rust only)
    #[arg(long)]
    common_module: Option<String>,

    #[command(flatten)]
    parse: ParseArgs,
}

#[derive(Args)]
struct BatchArgs {
    /// Input and output files as INPUT:OUTPUT (can be repeated). A drive
    /// prefix such as C:\ on INPUT is part of the path.
    #[arg(short = 'm', long = "mesh", required = true)]
    meshes: Vec<BakeJob>,

    /// File receiving the shared `Vertex` definition
    #[arg(short, long)]
    common: PathBuf,

    #[command(flatten)]
    parse: ParseArgs,
}

fn setup_logging(verbosity: u8) {
    init_with_config(&TracingConfig::from_verbosity(verbosity));
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::List(args) => cmd_list(args),
        Commands::Convert(args) => cmd_convert(args),
        Commands::Batch(args) => cmd_batch(args),
    }
}

fn cmd_list(args: ListArgs) -> Result<()> {
    info!("Opening scene: {:?}", args.input);

    let baker = Baker::new(BakeOptions {
        parse: args.parse.options(),
        ..BakeOptions::default()
    });
    let document = baker
        .load(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    let pieces = document.piece_summaries();
    let joints = if args.joints { document.joint_names() } else { Vec::new() };

    match args.format {
        OutputFormat::Json => {
            let mut listing = serde_json::json!({ "pieces": pieces });
            if args.joints {
                listing["joints"] = serde_json::json!(joints);
            }
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::Text => {
            println!("{:<24} {:<24} {}", "Piece", "Geometry", "Triangles");
            println!("{:-<24} {:-<24} {:-<9}", "", "", "");
            for piece in &pieces {
                println!("{:<24} {:<24} {}", piece.name, piece.geometry, piece.triangles);
            }
            println!("\nTotal: {} pieces", pieces.len());

            if args.joints {
                println!("\nJoints:");
                for joint in &joints {
                    println!("  {}", joint);
                }
                println!("\nTotal: {} joints", joints.len());
            }
        }
    }

    Ok(())
}

fn cmd_convert(args: ConvertArgs) -> Result<()> {
    let selector = if args.all {
        NodeSelector::All
    } else {
        NodeSelector::named(args.pieces)
    };

    let mut emit = EmitOptions::new(args.dialect);
    emit.common_module = args.common_module;

    let baker = Baker::new(BakeOptions {
        emit,
        parse: args.parse.options(),
        selector,
    });

    let report = match args.output {
        Some(ref output) => baker
            .bake_to_path(&args.input, output)
            .with_context(|| format!("Failed to bake {} into {}", args.input.display(), output.display()))?,
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            baker
                .bake_to_writer(&args.input, &mut out)
                .with_context(|| format!("Failed to bake {}", args.input.display()))?
        }
    };

    log_report(&report);
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> Result<()> {
    let baker = Baker::new(BakeOptions {
        parse: args.parse.options(),
        ..BakeOptions::new(Dialect::Rust, NodeSelector::All)
    });

    let reports = baker
        .bake_batch(&args.meshes, &args.common)
        .with_context(|| format!("Batch with common file {} failed", args.common.display()))?;

    for report in &reports {
        log_report(report);
    }
    Ok(())
}

fn log_report(report: &BakeReport) {
    let target = report
        .output
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    info!(
        "{} -> {}: {} pieces, {} joints, {} vertices",
        report.input.display(),
        target,
        report.pieces,
        report.joints,
        report.vertices
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_requires_a_selection() {
        let parsed = Cli::try_parse_from(["meshbake", "convert", "-i", "steve.dae", "-d", "rust"]);
        assert!(parsed.is_err());

        let parsed = Cli::try_parse_from(["meshbake", "convert", "-i", "steve.dae", "-d", "c", "--all", "-p", "head"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_unknown_dialect_is_rejected_before_loading() {
        let parsed = Cli::try_parse_from(["meshbake", "convert", "-i", "missing.dae", "-d", "cobol", "--all"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_batch_pairs() {
        let cli = Cli::try_parse_from([
            "meshbake", "batch", "-m", "steve.dae:steve.rs", "-m", "alex.dae:alex.rs", "-c", "common.rs",
        ])
        .unwrap();
        match cli.command {
            Commands::Batch(args) => {
                assert_eq!(args.meshes.len(), 2);
                assert_eq!(args.meshes[1], BakeJob::new("alex.dae", "alex.rs"));
            }
            _ => panic!("expected batch"),
        }
    }

    #[test]
    fn test_batch_pair_with_drive_letter() {
        let cli = Cli::try_parse_from(["meshbake", "batch", "-m", r"C:\models\steve.dae:steve.rs", "-c", "common.rs"])
            .unwrap();
        match cli.command {
            Commands::Batch(args) => {
                assert_eq!(args.meshes[0], BakeJob::new(r"C:\models\steve.dae", "steve.rs"));
            }
            _ => panic!("expected batch"),
        }
    }

    #[test]
    fn test_verbosity_is_global() {
        let cli = Cli::try_parse_from(["meshbake", "list", "-i", "steve.dae", "-vv", "--format", "json"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
