use indexmap::IndexMap;
use serde::Serialize;

/// A generic sensor value as handed to the transmission layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericReading {
    #[serde(rename = "v")]
    pub value: f64,
    #[serde(rename = "u")]
    pub unit: String,
    pub min: f64,
    pub max: f64,
}

/// Everything collected in one cycle.
///
/// `temperatures` stays `None` when the source reported nothing, which is
/// different from `Some` of an empty map (the source failed after having
/// reported data before). `generic_sensors` is only allocated when at least
/// one generic sensor is configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensorSnapshot {
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub temperatures: Option<IndexMap<String, f64>>,
    #[serde(rename = "gs", skip_serializing_if = "Option::is_none")]
    pub generic_sensors: Option<IndexMap<String, GenericReading>>,
    #[serde(rename = "dt")]
    pub dashboard_temperature: f64,
}

impl SensorSnapshot {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_omits_unset_maps() {
        let snapshot = SensorSnapshot::new();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json, serde_json::json!({ "dt": 0.0 }));
    }

    #[test]
    fn test_generic_reading_uses_short_field_names() {
        let mut generic = IndexMap::new();
        generic.insert(
            "voltage".to_string(),
            GenericReading {
                value: 11.8,
                unit: "V".to_string(),
                min: 0.5,
                max: 12.5,
            },
        );
        let snapshot = SensorSnapshot {
            temperatures: Some(IndexMap::from([("cpu".to_string(), 45.5)])),
            generic_sensors: Some(generic),
            dashboard_temperature: 45.5,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["t"]["cpu"], 45.5);
        assert_eq!(
            json["gs"]["voltage"],
            serde_json::json!({ "v": 11.8, "u": "V", "min": 0.5, "max": 12.5 })
        );
        assert_eq!(json["dt"], 45.5);
    }
}
