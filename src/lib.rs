pub mod collectors;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod utils;

use crate::collectors::SensorCollector;
use crate::config::AppConfig;
use crate::models::SensorSnapshot;
use anyhow::Context;
use log::{debug, error, info};
use std::sync::Arc;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting application");

    match main_loop(config).await {
        Ok(_) => info!("Application completed successfully"),
        Err(e) => {
            error!("Application error: {e:#}");
            // Print chain of error causes
            let mut source = e.source();
            while let Some(e) = source {
                error!("Caused by: {e}");
                source = e.source();
            }
            return Err(e).context("Application failed to run");
        }
    }

    Ok(())
}

async fn main_loop(config: AppConfig) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(config.interval());
    let collector = Arc::new(SensorCollector::new(&config.sensors));
    info!(
        "Collecting every {}s, generic sensors: {:?} in {}",
        config.interval().as_secs(),
        collector.generic_sensor_names(),
        config.sensors.generic_dir.display()
    );

    loop {
        interval.tick().await; // Wait for the next tick

        let Some(snapshot) = collect_cycle(&collector).await else {
            continue;
        };

        match serde_json::to_string(&snapshot) {
            Ok(json) => info!("{}", json),
            Err(e) => error!("Failed to serialize snapshot: {}", e),
        }
    }
}

/// Runs one cycle on the blocking pool. A failed cycle is logged and yields
/// nothing, the agent keeps running.
async fn collect_cycle(collector: &Arc<SensorCollector>) -> Option<SensorSnapshot> {
    debug!("Collecting sensors");
    let cycle = Arc::clone(collector);
    match tokio::task::spawn_blocking(move || cycle.collect()).await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            error!("Collection cycle failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::TemperatureSource;
    use crate::config::SensorsConfig;
    use crate::error::SourceError;
    use crate::models::RawTemperature;

    struct PanickingSource;

    impl TemperatureSource for PanickingSource {
        fn temperatures(&self) -> Result<Vec<RawTemperature>, SourceError> {
            panic!("sensor enumeration crashed");
        }
    }

    #[tokio::test]
    async fn test_panicking_source_does_not_end_the_cycle() {
        let config = SensorsConfig::default();
        let collector = Arc::new(SensorCollector::with_source(
            &config,
            Box::new(PanickingSource),
        ));

        let snapshot = collect_cycle(&collector).await.unwrap();
        assert_eq!(snapshot.temperatures, None);
        assert_eq!(snapshot.dashboard_temperature, 0.0);
    }
}
