use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jacov::cli;
use jacov::convert::ConvertOptions;
use jacov::resolve::DEFAULT_DELIMITER;

/// jacov — Convert JaCoCo coverage into LCOV, mapping classes to source paths.
#[derive(Parser)]
#[command(name = "jacov", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an analyzer report into an LCOV tracefile.
    Convert {
        /// Path to the coverage report (JaCoCo XML or JSON bundle).
        report: PathBuf,

        /// File listing known source paths, one per line.
        #[arg(long)]
        paths: PathBuf,

        /// Write LCOV here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Override format detection (jacoco, json).
        #[arg(long)]
        format: Option<String>,

        /// Separator between original and execution path in mapped entries.
        #[arg(long, default_value = DEFAULT_DELIMITER)]
        delimiter: String,

        /// Test name written as a TN: record.
        #[arg(long)]
        test_name: Option<String>,
    },

    /// Show which declared path a package and source file resolve to.
    Resolve {
        /// Slash-separated package name, e.g. com/example.
        package: String,

        /// Bare source file name, e.g. Foo.java.
        source_file: String,

        /// File listing known source paths, one per line.
        #[arg(long)]
        paths: PathBuf,

        /// Separator between original and execution path in mapped entries.
        #[arg(long, default_value = DEFAULT_DELIMITER)]
        delimiter: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            report,
            paths,
            output,
            format,
            delimiter,
            test_name,
        } => {
            let options = ConvertOptions {
                delimiter,
                test_name,
            };
            let mut out: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(File::create(path).with_context(
                    || format!("Failed to create {}", path.display()),
                )?)),
                None => Box::new(BufWriter::new(io::stdout().lock())),
            };
            let msg = cli::cmd_convert(&report, format.as_deref(), &paths, &options, &mut out)?;
            eprint!("{msg}");
        }
        Commands::Resolve {
            package,
            source_file,
            paths,
            delimiter,
        } => {
            print!(
                "{}",
                cli::cmd_resolve(&package, &source_file, &paths, &delimiter)?
            );
        }
    }
    Ok(())
}
