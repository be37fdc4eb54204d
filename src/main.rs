use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::bounded;

use vfrfuse::config::FuseConfig;
use vfrfuse::runtime;

#[derive(Parser, Debug)]
#[command(name = "vfrfuse")]
#[command(about = "Fuse traffic and sensor feeds into a FLARM/NMEA stream", long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short = 'c', long)]
    config: PathBuf,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Port subscribers connect to
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Suppress targets farther away than this many meters
    #[arg(long)]
    max_distance: Option<i32>,

    /// Drop reports above this altitude in meters
    #[arg(long)]
    max_height: Option<i32>,

    /// Lock the own position after the first good GPS fix
    #[arg(short = 'g', long)]
    ground_mode: bool,

    /// Stop after this many seconds instead of running forever
    #[arg(long)]
    run_for: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = FuseConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(port) = args.port {
        config.general.server_port = port;
    }
    if let Some(max_distance) = args.max_distance {
        config.filter.max_distance = max_distance;
    }
    if let Some(max_height) = args.max_height {
        config.filter.max_height = max_height;
    }
    config.general.ground_mode |= args.ground_mode;
    config.validate().context("invalid configuration")?;

    log::info!(
        "vfrfuse {} serving on port {} with {} feeds",
        env!("CARGO_PKG_VERSION"),
        config.general.server_port,
        config.feeds.len()
    );

    let (stop_tx, stop_rx) = bounded(1);
    if let Some(seconds) = args.run_for {
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(seconds));
            let _ = stop_tx.send(());
        });
        runtime::run(&config, &stop_rx).context("service failed")?;
    } else {
        // Keep the sender alive so the loop only ends with the process
        let _stop_tx = stop_tx;
        runtime::run(&config, &stop_rx).context("service failed")?;
    }

    Ok(())
}
