pub mod command;
pub mod file;
pub mod hwmon;

/// Rounds to two decimal places, the precision every reported value uses.
pub fn two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_decimals() {
        assert_eq!(two_decimals(45.678), 45.68);
        assert_eq!(two_decimals(11.8), 11.8);
        assert_eq!(two_decimals(-3.14159), -3.14);
    }
}
