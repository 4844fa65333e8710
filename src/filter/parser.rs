use super::{FilterSpec, GlobPattern, Polarity};
use crate::error::ConfigError;
use crate::models::GenericSensorDef;
use log::{info, warn};

/// Parses the sensor filter grammar:
///
/// ```text
/// [-]token(,token)*
/// token := (name,unit,maximum,minimum) | temperature pattern
/// ```
///
/// Commas inside parentheses belong to the generic sensor definition. An
/// unclosed `(` does not capture the rest of the string: the unclosed segment
/// is split on every comma instead.
pub(super) fn parse(raw: &str) -> FilterSpec {
    let mut spec = FilterSpec::default();

    let raw = match raw.strip_prefix('-') {
        Some(rest) => {
            spec.polarity = Polarity::Blacklist;
            rest
        }
        None => raw,
    };

    for token in split_tokens(raw) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if token.starts_with('(') && token.ends_with(')') {
            match parse_generic_sensor(token) {
                Ok(def) => {
                    info!(
                        "Configured generic sensor {} unit={} min={} max={}",
                        def.name, def.unit, def.minimum, def.maximum
                    );
                    spec.generic_sensors.insert(def.name.clone(), def);
                }
                Err(e) => warn!("Invalid generic sensor format {}: {}", token, e),
            }
            continue;
        }

        if !spec.patterns.insert(token.to_string()) {
            continue;
        }
        if token.contains('*') {
            let pattern = GlobPattern::new(token);
            if !pattern.is_valid() {
                warn!("Sensor pattern {} is not a valid glob, using exact match only", token);
            }
            spec.wildcards.push(pattern);
        }
    }

    spec
}

fn split_tokens(raw: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in raw.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                tokens.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    let rest = &raw[start..];
    if depth > 0 {
        warn!("Unbalanced parenthesis in sensor config near {}", rest);
        tokens.extend(rest.split(','));
    } else {
        tokens.push(rest);
    }

    tokens
}

/// Parses `(name,unit,maximum,minimum)`; `token` must include the parentheses.
fn parse_generic_sensor(token: &str) -> Result<GenericSensorDef, ConfigError> {
    let content = &token[1..token.len() - 1];
    let parts: Vec<&str> = content.split(',').map(str::trim).collect();
    let [name, unit, maximum, minimum] = parts[..] else {
        return Err(ConfigError::FieldCount(parts.len()));
    };

    if name.is_empty() {
        return Err(ConfigError::EmptyName);
    }
    if unit.is_empty() {
        return Err(ConfigError::EmptyUnit);
    }

    let maximum: f64 = maximum
        .parse()
        .map_err(|_| ConfigError::InvalidMaximum(maximum.to_string()))?;
    let minimum: f64 = minimum
        .parse()
        .map_err(|_| ConfigError::InvalidMinimum(minimum.to_string()))?;

    // Also rejects NaN bounds.
    if !(minimum < maximum) {
        return Err(ConfigError::InvertedRange { minimum, maximum });
    }

    Ok(GenericSensorDef {
        name: name.to_string(),
        unit: unit.to_string(),
        minimum,
        maximum,
    })
}
