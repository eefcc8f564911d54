use anyhow::Result;
use clap::{Parser, Subcommand};
use firmware_classifier::commands::{classify_command, extract_command, features_command};
use firmware_classifier::init_logging;

/// Firmware birthmark classifier CLI.
///
/// This CLI is a thin wrapper around `birthmark-core` (exposed in code as `birthmark_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "firmware-classifier",
    version,
    about = "Classify disassembled firmware by project-unique structural features",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract per-project unique features from a firmware corpus.
    ///
    /// The corpus is a directory (or .zip archive) laid out as
    /// `project/version/[subdir/]listing.asm`. This will write:
    /// - `firmware_database.json` (project -> version -> opcode -> digest).
    /// - `unique_features.csv` and `unique_features.json`.
    Extract {
        /// Corpus root directory or .zip archive.
        corpus_root: String,

        /// Output directory. Defaults to the current working directory.
        #[arg(short, long, default_value = ".")]
        output: String,

        /// Optional YAML/JSON config file.
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Classify an unknown firmware listing against a unique-feature table.
    Classify {
        /// Disassembly listing to classify.
        firmware_file: String,

        /// Unique-feature table (.csv, or .json for the JSON form).
        #[arg(short, long, default_value = "./unique_features.csv")]
        features: String,

        /// Optional YAML/JSON config file.
        #[arg(short, long)]
        config: Option<String>,

        /// Number of ranked projects to show (defaults to the config's report_limit).
        #[arg(long)]
        top: Option<usize>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show the parsed features and digests of one listing.
    Features {
        /// Disassembly listing to inspect.
        firmware_file: String,

        /// Optional YAML/JSON config file.
        #[arg(short, long)]
        config: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Extract { corpus_root, output, config } => {
            extract_command(&corpus_root, &output, config.as_deref())?
        }
        Command::Classify { firmware_file, features, config, top, json } => {
            classify_command(&firmware_file, &features, config.as_deref(), top, json)?
        }
        Command::Features { firmware_file, config, json } => {
            features_command(&firmware_file, config.as_deref(), json)?
        }
    }

    Ok(())
}
