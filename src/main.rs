use anyhow::{Context, Result};
use bulk::config::InputOrigin;
use bulk::logging::init_tracing;
use bulk::{BulkSink, Config, Interpreter, Overrides, Settings};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "bulk")]
#[command(about = "Group console commands into blocks and log each block")]
struct Cli {
    /// Commands per static block (default 3, values below 1 become 1)
    #[arg(allow_negative_numbers = true)]
    batch_size: Option<i64>,

    /// Read commands from a file instead of stdin
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Directory for bulk<timestamp>.log files
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Increase diagnostic output on stderr (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring config file");
        Config::default()
    });

    let settings = Settings::resolve(
        config,
        Overrides {
            batch_size: cli.batch_size,
            log_dir: cli.log_dir,
            input: cli.file,
        },
    );
    debug!(?settings, "starting");
    if let (InputOrigin::ConfigFile, Some(path)) = (settings.input_origin, &settings.input) {
        info!(path = %path.display(), "input file set by config file, not reading stdin");
    }

    let mut sink = BulkSink::stdout(&settings.log_dir);
    debug!(log_dir = %sink.log_dir().display(), "appending block logs");
    let summary = Interpreter::new(&settings)
        .execute(&mut sink)
        .context("bulk run failed")?;
    debug!(
        blocks = summary.blocks_emitted,
        aborted = summary.aborted,
        "done"
    );

    Ok(())
}
