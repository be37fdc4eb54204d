use std::io::Write;

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Parser;

use vfrfuse::config::{FeedProtocol, FuseConfig};
use vfrfuse::feed::{self, Parser as _};
use vfrfuse::simulation::{TrafficConfig, TrafficSimulator};
use vfrfuse::store::Store;

#[derive(Parser, Debug)]
#[command(name = "simulate_traffic")]
#[command(about = "Run the fusion pipeline against synthetic traffic", long_about = None)]
struct Args {
    /// Number of ticks to simulate
    #[arg(short = 'n', long, default_value = "10")]
    ticks: u32,

    /// Random seed for reproducible traffic
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// Aircraft reported over APRS only
    #[arg(long, default_value = "3")]
    flarm: usize,

    /// Aircraft reported over SBS only
    #[arg(long, default_value = "2")]
    transponder: usize,

    /// Aircraft reported by both feeds
    #[arg(long, default_value = "1")]
    dual: usize,

    /// Suppress targets farther away than this many meters
    #[arg(long)]
    max_distance: Option<i32>,

    /// Print the generated feed lines as well
    #[arg(long)]
    show_input: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
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

    let traffic = TrafficConfig {
        seed: args.seed,
        flarm_count: args.flarm,
        transponder_count: args.transponder,
        dual_count: args.dual,
        ..TrafficConfig::default()
    };

    let mut config = FuseConfig::default();
    let center = traffic.center();
    config.fallback.latitude = center.latitude;
    config.fallback.longitude = center.longitude;
    if let Some(max_distance) = args.max_distance {
        config.filter.max_distance = max_distance;
    }

    let store = Store::from_config(&config);
    let aprs = feed::create_parser(FeedProtocol::Aprs, &config);
    let sbs = feed::create_parser(FeedProtocol::Sbs, &config);
    let mut simulator = TrafficSimulator::new(&traffic).context("invalid traffic configuration")?;

    let start = Utc::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for tick in 0..args.ticks {
        let now = start + Duration::seconds(i64::from(tick));
        let mut accepted = 0;
        for line in simulator.step(1.0, now) {
            if args.show_input {
                writeln!(out, "> {}", line.line)?;
            }
            let (parser, priority) = match line.protocol {
                FeedProtocol::Aprs => (&aprs, 1),
                _ => (&sbs, 0),
            };
            match parser.unpack_at(&line.line, priority, now) {
                Ok(update) => {
                    if store.update(update.key, update.candidate) {
                        accepted += 1;
                    }
                }
                Err(e) => log::warn!("simulated line rejected: {}", e),
            }
        }

        let mut failed_write = None;
        let summary = store.tick(|bytes| {
            if let Err(e) = out.write_all(bytes) {
                failed_write.get_or_insert(e);
            }
        });
        if let Some(e) = failed_write {
            return Err(e).context("writing output");
        }
        log::info!(
            "tick {}: {} updates accepted, {} groups rendered",
            tick,
            accepted,
            summary.rendered
        );
    }

    Ok(())
}
