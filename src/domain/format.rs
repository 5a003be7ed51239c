//! Display helpers for log lines

use std::time::Duration;

const SI_SUFFIXES: [&str; 7] = ["", "k", "M", "B", "T", "P", "E"];

/// Compact USD-style number: 1_530_000 -> "1.5M", 250_000 -> "250k", 999 -> "999".
/// Values are floored to one decimal, a trailing ".0" is dropped.
pub fn shorten_number(number: f64) -> String {
    if number.is_nan() {
        return "NaN".to_string();
    }
    if number > 9e20 {
        return "∞".to_string();
    }
    if number < -9e20 {
        return "-∞".to_string();
    }

    let sign = if number < 0.0 { "-" } else { "" };
    let abs = number.abs();
    if abs < 1000.0 {
        return format!("{}", number);
    }

    let tier = ((abs.log10() / 3.0).floor() as usize).min(SI_SUFFIXES.len() - 1);
    let scaled = abs / 10f64.powi((tier * 3) as i32);
    let floored = (scaled * 10.0).floor() / 10.0;

    let mut digits = format!("{:.1}", floored);
    if digits.ends_with(".0") {
        digits.truncate(digits.len() - 2);
    }

    format!("{}{}{}", sign, digits, SI_SUFFIXES[tier])
}

/// "Xh Ym Zs" for a loop's running time
pub fn elapsed_string(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}h {}m {}s", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_small_numbers() {
        assert_eq!(shorten_number(0.0), "0");
        assert_eq!(shorten_number(999.0), "999");
        assert_eq!(shorten_number(12.5), "12.5");
        assert_eq!(shorten_number(0.00042), "0.00042");
    }

    #[test]
    fn test_shorten_with_suffix() {
        assert_eq!(shorten_number(1_000.0), "1k");
        assert_eq!(shorten_number(250_000.0), "250k");
        assert_eq!(shorten_number(1_530_000.0), "1.5M");
        assert_eq!(shorten_number(1_599_999.0), "1.5M");
        assert_eq!(shorten_number(2_000_000.0), "2M");
        assert_eq!(shorten_number(7_250_000_000.0), "7.2B");
    }

    #[test]
    fn test_shorten_negative_and_extremes() {
        assert_eq!(shorten_number(-1_500.0), "-1.5k");
        assert_eq!(shorten_number(1e21), "∞");
        assert_eq!(shorten_number(-1e21), "-∞");
    }

    #[test]
    fn test_elapsed_string() {
        assert_eq!(elapsed_string(Duration::from_secs(0)), "0h 0m 0s");
        assert_eq!(elapsed_string(Duration::from_secs(3_725)), "1h 2m 5s");
        assert_eq!(elapsed_string(Duration::from_secs(90_061)), "25h 1m 1s");
    }
}
