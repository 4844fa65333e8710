use crate::collectors::generic::GenericSensorCollector;
use crate::collectors::source::{SysinfoSource, TemperatureSource};
use crate::collectors::temperature::TemperatureCollector;
use crate::config::SensorsConfig;
use crate::filter::FilterSpec;
use crate::models::SensorSnapshot;
use crate::utils::hwmon::HwmonSource;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

/// Runs one collection cycle over temperatures and generic sensors.
///
/// The filter spec is parsed once here and shared by both collectors.
pub struct SensorCollector {
    spec: Arc<FilterSpec>,
    temperatures: TemperatureCollector,
    generic: GenericSensorCollector,
}

impl SensorCollector {
    /// Reads hwmon below `sys_root` when one is configured, otherwise uses sysinfo.
    pub fn new(config: &SensorsConfig) -> Self {
        let source: Box<dyn TemperatureSource> = match &config.sys_root {
            Some(root) => {
                info!("Reading hardware sensors below {}", root.display());
                Box::new(HwmonSource::new(root))
            }
            None => Box::new(SysinfoSource),
        };
        Self::with_source(config, source)
    }

    pub fn with_source(config: &SensorsConfig, source: Box<dyn TemperatureSource>) -> Self {
        let spec = Arc::new(FilterSpec::parse(
            config.filter.as_deref(),
            config.primary.as_deref(),
        ));
        Self {
            temperatures: TemperatureCollector::new(source, Arc::clone(&spec)),
            generic: GenericSensorCollector::new(
                &config.generic_dir,
                config.script_timeout(),
                Arc::clone(&spec),
            ),
            spec,
        }
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// Names of all configured generic sensors, in configuration order.
    pub fn generic_sensor_names(&self) -> Vec<&str> {
        self.spec.generic_sensors().keys().map(String::as_str).collect()
    }

    /// Collects into a fresh snapshot.
    pub fn collect(&self) -> SensorSnapshot {
        let mut snapshot = SensorSnapshot::new();
        self.collect_into(&mut snapshot);
        snapshot
    }

    /// Collects into an existing snapshot, which keeps its temperatures when
    /// collection is skipped or the source reports nothing.
    pub fn collect_into(&self, snapshot: &mut SensorSnapshot) {
        let start = Instant::now();
        self.temperatures.collect(snapshot);
        self.generic.collect(snapshot);
        debug!("collect_sensors took: {} ms", start.elapsed().as_millis());
    }
}
