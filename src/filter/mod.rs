//! Sensor name filtering built from the `SENSORS` configuration string.

use crate::models::GenericSensorDef;
use indexmap::{IndexMap, IndexSet};

mod glob;
mod parser;

pub use glob::GlobPattern;

/// Whether the configured temperature patterns are an allow-list or a deny-list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Polarity {
    #[default]
    Whitelist,
    Blacklist,
}

/// Immutable filter specification, built once and shared by every cycle.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    patterns: IndexSet<String>,
    wildcards: Vec<GlobPattern>,
    polarity: Polarity,
    generic_sensors: IndexMap<String, GenericSensorDef>,
    primary_sensor: Option<String>,
    skip_collection: bool,
}

impl FilterSpec {
    /// Builds a filter from the raw configuration value.
    ///
    /// `None` means the value was never set (collect and accept everything),
    /// `Some("")` means it was explicitly cleared and temperature collection
    /// is skipped. Malformed tokens are logged and dropped; this never fails.
    pub fn parse(raw: Option<&str>, primary_sensor: Option<&str>) -> Self {
        let mut spec = parser::parse(raw.unwrap_or(""));
        spec.skip_collection = raw == Some("");
        spec.primary_sensor = primary_sensor
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        spec
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn temperature_patterns(&self) -> &IndexSet<String> {
        &self.patterns
    }

    pub fn has_wildcards(&self) -> bool {
        !self.wildcards.is_empty()
    }

    pub fn generic_sensors(&self) -> &IndexMap<String, GenericSensorDef> {
        &self.generic_sensors
    }

    pub fn primary_sensor(&self) -> Option<&str> {
        self.primary_sensor.as_deref()
    }

    pub fn skip_collection(&self) -> bool {
        self.skip_collection
    }

    /// Decides whether a sensor named `name` belongs in the snapshot.
    pub fn accepts(&self, name: &str) -> bool {
        if self.generic_sensors.contains_key(name) {
            return true;
        }

        if self.patterns.is_empty() {
            return true;
        }

        let whitelist = self.polarity == Polarity::Whitelist;
        if self.patterns.contains(name) {
            return whitelist;
        }

        if !self.has_wildcards() {
            return !whitelist;
        }

        if self.wildcards.iter().any(|pattern| pattern.matches(name)) {
            return whitelist;
        }

        !whitelist
    }
}
