use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use dotenvy::dotenv;
use kafka_bridge::config::BridgeConfig;
use kafka_bridge::report::run_cycle;
use kafka_client::KafkaTopicReader;
use log::{error, info};
use tokio::time::MissedTickBehavior;

#[derive(Parser, Debug)]
#[command(
    name = "click-report",
    about = "Periodic interest report over every topic the bridge feeds"
)]
struct Args {
    /// Seconds between two reports
    #[arg(long, env = "REPORT_INTERVAL_SECS", default_value_t = 60)]
    interval: u64,

    /// Seconds spent reading topics for one report
    #[arg(long, env = "REPORT_WINDOW_SECS", default_value_t = 10)]
    window: u64,

    /// File the latest report is written to
    #[arg(long, env = "REPORT_OUTPUT", default_value = "raport.txt")]
    output: PathBuf,

    /// Produce a single report and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    if args.interval == 0 {
        anyhow::bail!("interval must be > 0");
    }
    let config = BridgeConfig::from_env();

    info!(
        "Starting click report: brokers={}, interval={}s, window={}s, output={}",
        config.brokers,
        args.interval,
        args.window,
        args.output.display()
    );

    let reader = KafkaTopicReader::new(
        config.client_config(),
        config.metadata_timeout,
        Duration::from_secs(args.window),
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, shutting down");
                break;
            }
        }

        match run_cycle(&reader).await {
            Ok(Some(report)) => {
                let text = report.render();
                info!("{text}");
                if let Err(e) = tokio::fs::write(&args.output, &text).await {
                    error!("Failed to write report to {}: {e}", args.output.display());
                } else {
                    info!("Report saved as {}", args.output.display());
                }
            }
            Ok(None) => {}
            Err(e) => error!("Failed to read topics: {e}"),
        }

        if args.once {
            break;
        }
    }

    Ok(())
}
