use crate::collectors::source::TemperatureSource;
use crate::error::SourceError;
use crate::models::RawTemperature;
use log::debug;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Temperature source reading `hwmon` sysfs entries below an arbitrary root.
///
/// The root replaces `/sys`, so `HwmonSource::new("/host/sys")` reads
/// `/host/sys/class/hwmon/*/temp*_input`. This lets a containerised agent
/// look at the host's sensors, and lets tests point at a temporary tree.
#[derive(Debug, Clone)]
pub struct HwmonSource {
    root: PathBuf,
}

impl HwmonSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemperatureSource for HwmonSource {
    fn temperatures(&self) -> Result<Vec<RawTemperature>, SourceError> {
        let class_dir = self.root.join("class/hwmon");
        if !class_dir.is_dir() {
            debug!("No hwmon directory at {}", class_dir.display());
            return Ok(Vec::new());
        }

        let mut readings = Vec::new();
        let chips = WalkDir::new(&class_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        for entry in chips {
            let entry = match entry {
                Ok(entry) => entry,
                // The class directory itself could not be read.
                Err(e) if e.depth() == 0 => {
                    return Err(SourceError::Io {
                        path: class_dir,
                        source: io::Error::from(e),
                    })
                }
                Err(e) => {
                    debug!("Skipping hwmon entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                from_hwmon(&mut readings, entry.path());
            }
        }

        Ok(readings)
    }
}

/// Read out `hwmon` info (hardware monitor) from `folder` and push one
/// reading per `tempN_input` file into `readings`.
///
/// ## What is read:
///
/// - Mandatory: `tempN_input`, in milli-celsius. Unreadable inputs are skipped.
/// - Optional: `name` the name of the `hwmon`.
/// - Optional: sensor label, content of `tempN_label`.
///
/// The key is `<name>_<label>`, or just `<name>` when there is no label,
/// lower-cased with spaces replaced by `_`. Chips without labels therefore
/// produce repeated keys, which the collector disambiguates.
///
/// ## Doc to Linux kernel API.
///
/// Kernel hwmon API: https://www.kernel.org/doc/html/latest/hwmon/hwmon-kernel-api.html
fn from_hwmon(readings: &mut Vec<RawTemperature>, folder: &Path) {
    let name = get_file_line(&folder.join("name"), 16).unwrap_or_default();

    let inputs = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .flatten();
    for entry in inputs {
        if entry.file_type().is_dir() {
            continue;
        }

        let filename = entry.file_name().to_str().unwrap_or("");
        let Some(id) = filename
            .strip_prefix("temp")
            .and_then(|f| f.strip_suffix("_input"))
            .filter(|id| id.parse::<u32>().is_ok())
        else {
            continue;
        };

        let Some(temperature) = get_temperature_from_file(entry.path()) else {
            debug!("Skipping unreadable sensor {}", entry.path().display());
            continue;
        };

        let label = get_file_line(&folder.join(format!("temp{id}_label")), 32);
        let key = match label {
            Some(label) if !label.is_empty() => sensor_key(&name, &label),
            _ => sensor_key(&name, b""),
        };
        readings.push(RawTemperature::new(key, temperature));
    }
}

fn sensor_key(name: &[u8], label: &[u8]) -> Vec<u8> {
    let mut key = name.to_vec();
    if !label.is_empty() {
        key.push(b'_');
        key.extend_from_slice(label);
    }
    for byte in key.iter_mut() {
        if *byte == b' ' {
            *byte = b'_';
        }
    }
    key.make_ascii_lowercase();
    key
}

// Read arbitrary data, possibly not UTF-8.
fn get_file_line(file: &Path, capacity: usize) -> Option<Vec<u8>> {
    let mut reader = Vec::with_capacity(capacity);
    let mut f = File::open(file).ok()?;
    f.read_to_end(&mut reader).ok()?;
    Some(reader.trim_ascii().to_vec())
}

/// Designed at first for reading an `i32` or `u32` aka `c_long`
/// from a `/sys/class/hwmon` sysfs file.
fn read_number_from_file<N>(file: &Path) -> Option<N>
where
    N: std::str::FromStr,
{
    let mut reader = [0u8; 32];
    let mut f = File::open(file).ok()?;
    let n = f.read(&mut reader).ok()?;
    // parse and trim would complain about `\0`.
    let number = std::str::from_utf8(&reader[..n]).ok()?;
    number.trim_matches(|c: char| c.is_whitespace() || c == '\0').parse().ok()
}

// Read a temperature from a `tempN_input` sensor in the sysfs.
#[inline]
fn get_temperature_from_file(file: &Path) -> Option<f64> {
    read_number_from_file::<i64>(file).map(|n| n as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_chip(root: &Path, chip: &str, name: &str, sensors: &[(u32, &str, Option<&str>)]) {
        let dir = root.join("class/hwmon").join(chip);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("name"), format!("{name}\n")).unwrap();
        for (id, input, label) in sensors {
            fs::write(dir.join(format!("temp{id}_input")), format!("{input}\n")).unwrap();
            if let Some(label) = label {
                fs::write(dir.join(format!("temp{id}_label")), label).unwrap();
            }
        }
    }

    #[test]
    fn test_missing_hwmon_dir_yields_nothing() {
        let root = TempDir::new().unwrap();
        let source = HwmonSource::new(root.path());
        assert!(source.temperatures().unwrap().is_empty());
    }

    #[test]
    fn test_reads_labelled_and_unlabelled_inputs() {
        let root = TempDir::new().unwrap();
        write_chip(
            root.path(),
            "hwmon0",
            "coretemp",
            &[(1, "45000", Some("Package id 0")), (2, "43500", Some("Core 0"))],
        );
        write_chip(root.path(), "hwmon1", "nvme", &[(1, "38850", None), (2, "41850", None)]);

        let readings = HwmonSource::new(root.path()).temperatures().unwrap();
        assert_eq!(
            readings,
            vec![
                RawTemperature::new("coretemp_package_id_0", 45.0),
                RawTemperature::new("coretemp_core_0", 43.5),
                RawTemperature::new("nvme", 38.85),
                RawTemperature::new("nvme", 41.85),
            ]
        );
    }

    #[test]
    fn test_skips_unparsable_input_and_other_files() {
        let root = TempDir::new().unwrap();
        write_chip(root.path(), "hwmon0", "acpitz", &[(1, "garbage", None), (2, "27800", None)]);
        let dir = root.path().join("class/hwmon/hwmon0");
        fs::write(dir.join("temp2_max"), "105000").unwrap();
        fs::write(dir.join("in0_input"), "1200").unwrap();

        let readings = HwmonSource::new(root.path()).temperatures().unwrap();
        assert_eq!(readings, vec![RawTemperature::new("acpitz", 27.8)]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_chip_link_is_skipped() {
        let root = TempDir::new().unwrap();
        write_chip(root.path(), "hwmon0", "coretemp", &[(1, "45000", None)]);
        let class_dir = root.path().join("class/hwmon");
        std::os::unix::fs::symlink(root.path().join("gone"), class_dir.join("hwmon9")).unwrap();

        let readings = HwmonSource::new(root.path()).temperatures().unwrap();
        assert_eq!(readings, vec![RawTemperature::new("coretemp", 45.0)]);
    }

    #[test]
    fn test_keeps_non_utf8_labels() {
        let root = TempDir::new().unwrap();
        write_chip(root.path(), "hwmon0", "smc", &[(1, "50000", None)]);
        let dir = root.path().join("class/hwmon/hwmon0");
        fs::write(dir.join("temp1_label"), b"T\xffA").unwrap();

        let readings = HwmonSource::new(root.path()).temperatures().unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].key, b"smc_t\xffa".to_vec());
    }
}
