//! BabyMonitor demo binary.
//!
//! Wires the poller, event bus and advisor together, logs monitor events,
//! and serves recommendations on demand from stdin.

use anyhow::Result;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use babymonitor::advisor::{Advisor, OpenAiCompatProvider};
use babymonitor::config::ConfigStore;
use babymonitor::monitor::{MonitorBus, MonitorEvent, PollerConfig, SensorKind, SensorPoller};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let mut config = ConfigStore::new("babymonitor.json").load().await?;
    config.apply_env();
    if config.api_key.is_none() {
        warn!("no completion API key in the environment; recommendations will fail politely");
    }

    let bus = Arc::new(MonitorBus::new());
    let poller = SensorPoller::new(PollerConfig::from(&config), bus.clone());
    poller.start();

    let provider = Arc::new(OpenAiCompatProvider::new(
        config.completion_url.clone(),
        config.api_key.clone(),
    ));
    let advisor = Advisor::new(provider, config.model.clone(), config.baby_name.clone());

    // Log everything the poller publishes.
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(MonitorEvent::LiveUpdated(snapshot)) => {
                    info!(
                        temperature = snapshot.temperature.value,
                        humidity = snapshot.humidity.value,
                        gas = snapshot.gas.value,
                        "live readings"
                    );
                }
                Ok(MonitorEvent::HistoryUpdated(history)) => {
                    info!(
                        days = history.available_days().len(),
                        points = history.series(SensorKind::Temperature).len(),
                        "history updated"
                    );
                }
                Ok(MonitorEvent::ConnectionLost) => warn!("monitor disconnected"),
                Ok(MonitorEvent::ConnectionRestored) => info!("monitor connection restored"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event subscriber lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("Monitoring {}. Press Enter for a recommendation, q to quit.", config.baby_name);

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "q" {
            break;
        }
        let live = poller.live().await;
        let history = poller.history().await;
        println!("\n{}\n", advisor.recommendation(&live, &history).await);
    }

    poller.stop();
    Ok(())
}
