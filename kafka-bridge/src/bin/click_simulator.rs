use std::time::Duration;

use clap::Parser;
use dotenvy::dotenv;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

const CITIES: &[&str] = &["Warszawa", "Kraków", "Gdańsk", "Wrocław", "Poznań", "Łódź"];
const GENDERS: &[&str] = &["F", "M"];

/// Feeds the bridge with page views from random visitors.
#[derive(Parser, Debug)]
#[command(name = "click-simulator")]
struct Args {
    #[arg(long, env = "BRIDGE_ENDPOINT", default_value = "http://localhost:3000")]
    endpoint: String,

    /// Services to spread the views over
    #[arg(long, value_delimiter = ',', default_value = "promo,news,shop")]
    services: Vec<String>,

    /// Views per second
    #[arg(long, default_value_t = 5.0)]
    rate: f64,

    /// Stop after this many views
    #[arg(long)]
    views: Option<u64>,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    anyhow::ensure!(args.rate > 0.0, "rate must be > 0");
    anyhow::ensure!(!args.services.is_empty(), "at least one service is needed");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let url = format!("{}/sendToKafka", args.endpoint.trim_end_matches('/'));
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / args.rate));

    let mut sent = 0u64;
    while args.views.is_none_or(|limit| sent < limit) {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        let age = rng.gen_range(16..=80u32).to_string();
        let id = Uuid::new_v4().to_string();
        let params = [
            ("age", age.as_str()),
            ("city", CITIES.choose(&mut rng).copied().unwrap_or_default()),
            ("gender", GENDERS.choose(&mut rng).copied().unwrap_or_default()),
            ("topic", args.services.choose(&mut rng).map(String::as_str).unwrap_or_default()),
            ("id", id.as_str()),
        ];

        match client.get(&url).query(&params).send().await {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => warn!("bridge answered {}", resp.status()),
            Err(e) => warn!("request failed: {e}"),
        }

        sent += 1;
        if sent % 100 == 0 {
            info!("sent {sent} views");
        }
    }

    info!("click simulator done after {sent} views");
    Ok(())
}
