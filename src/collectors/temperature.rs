use crate::collectors::source::{guarded, retry_once, TemperatureSource};
use crate::filter::FilterSpec;
use crate::models::SensorSnapshot;
use crate::utils::two_decimals;
use indexmap::IndexMap;
use log::{debug, warn};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

/// Anything at or above this is not a real temperature.
const MAX_PLAUSIBLE_CELSIUS: f64 = 200.0;

/// Collects temperature sensors from a [`TemperatureSource`].
pub struct TemperatureCollector {
    source: Box<dyn TemperatureSource>,
    spec: Arc<FilterSpec>,
    drop_invalid_keys: bool,
}

impl TemperatureCollector {
    pub fn new(source: Box<dyn TemperatureSource>, spec: Arc<FilterSpec>) -> Self {
        Self {
            source,
            spec,
            // macOS SMC enumeration hands back garbage bytes in some keys.
            drop_invalid_keys: cfg!(target_os = "macos"),
        }
    }

    /// Drops readings whose key is not valid UTF-8 instead of decoding them lossily.
    pub fn with_drop_invalid_keys(mut self, drop: bool) -> Self {
        self.drop_invalid_keys = drop;
        self
    }

    /// Fills `snapshot.temperatures` and `snapshot.dashboard_temperature`.
    ///
    /// Duplicate keys get `_<index>` appended, where the index is the reading's
    /// position in the source output. Those names are only stable across
    /// cycles if the source enumerates sensors in a stable order.
    pub fn collect(&self, snapshot: &mut SensorSnapshot) {
        if self.spec.skip_collection() {
            debug!("Skipping temperature collection");
            return;
        }

        let start = Instant::now();
        snapshot.dashboard_temperature = 0.0;

        let readings = match retry_once(|| guarded(self.source.as_ref())) {
            Ok(readings) => readings,
            Err(e) => {
                warn!("Error updating temperatures: {}", e);
                if let Some(temperatures) = snapshot.temperatures.as_mut() {
                    temperatures.clear();
                }
                return;
            }
        };
        debug!("Temperature sensors: {:?}", readings);

        if readings.is_empty() {
            return;
        }

        let mut temperatures = IndexMap::with_capacity(readings.len());
        for (i, reading) in readings.iter().enumerate() {
            let key = match std::str::from_utf8(&reading.key) {
                Ok(key) => Cow::Borrowed(key),
                Err(_) if self.drop_invalid_keys => continue,
                Err(_) => String::from_utf8_lossy(&reading.key),
            };

            let mut temperature = reading.temperature;
            if temperature != 0.0 && temperature < 1.0 {
                temperature = scale_temperature(temperature);
            }
            if !temperature.is_finite()
                || temperature <= 0.0
                || temperature >= MAX_PLAUSIBLE_CELSIUS
            {
                continue;
            }

            let name = if temperatures.contains_key(&*key) {
                format!("{}_{}", key, i)
            } else {
                key.into_owned()
            };
            if !self.spec.accepts(&name) {
                continue;
            }

            match self.spec.primary_sensor() {
                None => {
                    snapshot.dashboard_temperature = snapshot.dashboard_temperature.max(temperature)
                }
                Some(primary) if primary == name => snapshot.dashboard_temperature = temperature,
                Some(_) => {}
            }
            temperatures.insert(name, two_decimals(temperature));
        }

        snapshot.temperatures = Some(temperatures);
        debug!(
            "collect_temperatures took: {} ms",
            start.elapsed().as_millis()
        );
    }
}

/// Scales a fractional reading into a plausible Celsius value.
///
/// Some sources report temperatures as a fraction of 100 or 1000 degrees.
/// Prefers whichever factor lands in 15..=95, falling back to x100.
pub fn scale_temperature(temperature: f64) -> f64 {
    if temperature > 1.0 {
        return temperature;
    }
    let scaled100 = temperature * 100.0;
    let scaled1000 = temperature * 1000.0;

    if (15.0..=95.0).contains(&scaled100) {
        scaled100
    } else if (15.0..=95.0).contains(&scaled1000) {
        scaled1000
    } else {
        scaled100
    }
}
