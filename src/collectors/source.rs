//! Temperature sources and the fault boundary around them.

use crate::error::SourceError;
use crate::models::RawTemperature;
use log::debug;
use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use sysinfo::Components;

/// Something that can enumerate temperature sensors.
///
/// Implementations are allowed to panic; callers go through [`guarded`].
pub trait TemperatureSource: Send + Sync {
    fn temperatures(&self) -> Result<Vec<RawTemperature>, SourceError>;
}

/// Reads temperatures through `sysinfo` components.
#[derive(Debug, Default)]
pub struct SysinfoSource;

impl TemperatureSource for SysinfoSource {
    fn temperatures(&self) -> Result<Vec<RawTemperature>, SourceError> {
        let components = Components::new_with_refreshed_list();
        let readings = components
            .list()
            .iter()
            .filter_map(|component| {
                component
                    .temperature()
                    .map(|t| RawTemperature::new(component.label(), t as f64))
            })
            .collect();
        Ok(readings)
    }
}

/// Calls the source, turning a panic into a [`SourceError::Panic`].
pub fn guarded<S>(source: &S) -> Result<Vec<RawTemperature>, SourceError>
where
    S: TemperatureSource + ?Sized,
{
    panic::catch_unwind(AssertUnwindSafe(|| source.temperatures()))
        .unwrap_or_else(|payload| Err(SourceError::Panic(panic_message(payload.as_ref()))))
}

/// Runs `attempt`, and once more if it fails. The second error is returned as is.
pub fn retry_once<T, E, F>(mut attempt: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    attempt().or_else(|e| {
        debug!("Retrying after error: {}", e);
        attempt()
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
