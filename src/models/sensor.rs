/// One reading as reported by a temperature source, before any normalization.
///
/// The key is kept as raw bytes: some platforms hand back labels that are not
/// valid UTF-8 and the collector decides what to do with them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTemperature {
    pub key: Vec<u8>,
    pub temperature: f64,
}

impl RawTemperature {
    pub fn new(key: impl Into<Vec<u8>>, temperature: f64) -> Self {
        Self {
            key: key.into(),
            temperature,
        }
    }
}

/// A configured non-temperature sensor: `(name,unit,maximum,minimum)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericSensorDef {
    pub name: String,
    pub unit: String,
    pub minimum: f64,
    pub maximum: f64,
}

impl GenericSensorDef {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.minimum && value <= self.maximum
    }
}
