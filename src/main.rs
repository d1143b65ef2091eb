use anyhow::{Context, Result};
use clap::Parser;
use graphlog::app::{handle_fatal_error, init_logging, AppConfig};
use graphlog::config::{self, Config};
use graphlog::graph::parse_all;
use graphlog::output::{write_rows, OutputFormat};
use graphlog::subprocess::{LogStream, Started};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Stream a jj log graph as decoded revision rows
#[derive(Parser, Debug)]
#[command(name = "graphlog", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Revisions to show (defaults to the executable's own default)
    #[arg(short = 'r', long)]
    revset: Option<String>,

    /// Template to render revisions with; must emit the identity marker
    #[arg(short = 'T', long)]
    template: Option<String>,

    /// Repository to read
    #[arg(short = 'R', long)]
    repository: Option<PathBuf>,

    /// Rows decoded per batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Decode log output read from stdin instead of running the executable
    #[arg(long)]
    stdin: bool,

    /// Print only `change_id commit_id` per row
    #[arg(long, conflicts_with = "json")]
    ids: bool,

    /// Print one JSON object per row
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::JsonLines
        } else if self.ids {
            OutputFormat::Ids
        } else {
            OutputFormat::PlainText
        }
    }

    /// Command-line values win over configuration
    fn apply_to(&self, config: &mut Config) {
        if let Some(revset) = &self.revset {
            config.revset = Some(revset.clone());
        }
        if let Some(template) = &self.template {
            config.template = Some(template.clone());
        }
        if let Some(repository) = &self.repository {
            config.repository = Some(repository.clone());
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match config::load(cli.repository.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            init_logging(&AppConfig::new(cli.verbose));
            handle_fatal_error(e, cli.verbose);
        }
    };
    cli.apply_to(&mut config);

    let app_config = AppConfig::new(cli.verbose).with_log_level(config.log_level.clone());
    init_logging(&app_config);
    debug!("Effective configuration: {:?}", config);

    if let Err(e) = run(&cli, &config).await {
        handle_fatal_error(e, cli.verbose);
    }
}

async fn run(cli: &Cli, config: &Config) -> Result<()> {
    let format = cli.output_format();

    if cli.stdin {
        let rows = parse_all(tokio::io::stdin()).await;
        debug!("Decoded {} rows from stdin", rows.len());
        return ignore_broken_pipe(print_rows(&rows, format));
    }

    let Started {
        mut stream,
        warning,
    } = LogStream::start(&config.log_command(), config.batch_size).await?;

    if let Some(warning) = warning {
        eprintln!("warning: {warning}");
    }

    let result = stream_rows(&mut stream, format).await;
    stream.close().await;
    ignore_broken_pipe(result)
}

async fn stream_rows(stream: &mut LogStream, format: OutputFormat) -> Result<()> {
    let mut total = 0;
    loop {
        let batch = stream.request_more().await;
        total += batch.rows.len();
        print_rows(&batch.rows, format)?;
        if !batch.has_more {
            break;
        }
    }
    debug!("Printed {} rows from '{}'", total, stream.command());
    Ok(())
}

fn print_rows(rows: &[graphlog::graph::Row], format: OutputFormat) -> Result<()> {
    let mut out = std::io::stdout().lock();
    write_rows(&mut out, rows, format)?;
    out.flush().context("Failed to flush stdout")
}

/// A closed stdout (e.g. piping into `head`) ends output quietly
fn ignore_broken_pipe(result: Result<()>) -> Result<()> {
    match result {
        Err(e)
            if e.chain().any(|cause| {
                cause
                    .downcast_ref::<std::io::Error>()
                    .is_some_and(|io| io.kind() == std::io::ErrorKind::BrokenPipe)
            }) =>
        {
            debug!("stdout closed early");
            Ok(())
        }
        other => other,
    }
}
