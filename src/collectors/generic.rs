use crate::error::GenericSensorError;
use crate::filter::FilterSpec;
use crate::models::{GenericReading, SensorSnapshot};
use crate::utils::{command, file, two_decimals};
use indexmap::IndexMap;
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_GENERIC_SENSORS_DIR: &str = "/generic-sensors";
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(5);

/// How a generic sensor entry produces its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SensorEntry {
    /// Regular file or symlink, the first line holds the value.
    File,
    /// Executable, stdout holds the value.
    Executable,
}

impl SensorEntry {
    fn resolve(path: &Path) -> Result<Self, GenericSensorError> {
        match fs::metadata(path) {
            Ok(metadata) if file::is_executable(&metadata) => Ok(Self::Executable),
            Ok(_) => Ok(Self::File),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(GenericSensorError::NotFound(path.to_path_buf()))
            }
            Err(e) => Err(GenericSensorError::Read {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

/// Collects the generic sensors configured in the filter spec.
///
/// Each sensor is an entry named after it in `dir`: a plain file, a symlink
/// to a live value (e.g. a sysfs attribute) or an executable.
pub struct GenericSensorCollector {
    dir: PathBuf,
    script_timeout: Duration,
    spec: Arc<FilterSpec>,
}

impl GenericSensorCollector {
    pub fn new(dir: impl Into<PathBuf>, script_timeout: Duration, spec: Arc<FilterSpec>) -> Self {
        Self {
            dir: dir.into(),
            script_timeout,
            spec,
        }
    }

    /// Reads the current value of the sensor called `name`.
    pub fn read_value(&self, name: &str) -> Result<f64, GenericSensorError> {
        let path = self.dir.join(name);
        let raw = match SensorEntry::resolve(&path)? {
            SensorEntry::Executable => command::run_with_timeout(&path, self.script_timeout)?,
            SensorEntry::File => {
                file::read_first_line(&path).map_err(|source| GenericSensorError::Read {
                    path: path.clone(),
                    source,
                })?
            }
        };

        raw.parse().map_err(|_| GenericSensorError::Parse {
            value: raw,
            path,
        })
    }

    /// Fills `snapshot.generic_sensors`. Sensors that cannot be read or are
    /// out of range are logged and left out for this cycle.
    pub fn collect(&self, snapshot: &mut SensorSnapshot) {
        let sensors = self.spec.generic_sensors();
        if sensors.is_empty() {
            return;
        }

        let start = Instant::now();
        let readings = snapshot.generic_sensors.get_or_insert_with(IndexMap::new);
        for (name, def) in sensors {
            let value = match self.read_value(name) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Failed to collect generic sensor data {}: {}", name, e);
                    continue;
                }
            };

            if !def.contains(value) {
                warn!(
                    "Generic sensor value out of range {}: value={} min={} max={}",
                    name, value, def.minimum, def.maximum
                );
                continue;
            }

            readings.insert(
                name.clone(),
                GenericReading {
                    value: two_decimals(value),
                    unit: def.unit.clone(),
                    min: def.minimum,
                    max: def.maximum,
                },
            );
        }
        debug!(
            "collect_generic_sensors took: {} ms",
            start.elapsed().as_millis()
        );
    }
}
