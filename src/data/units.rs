//! Parsing and formatting of runtime-reported quantities.

use anyhow::{bail, Result};

/// Suffix to byte multiplier, after the trailing `B` (and optional `i`) is removed.
const UNITS: &[(char, f64)] = &[
    ('k', 1024.0),
    ('K', 1024.0),
    ('M', 1024.0 * 1024.0),
    ('G', 1024.0 * 1024.0 * 1024.0),
    ('T', 1024.0 * 1024.0 * 1024.0 * 1024.0),
];

/// Parse a percentage like `"12.34%"` into `12.34`.
pub fn parse_percent(s: &str) -> Result<f64> {
    let s = s.trim();
    let value = s.strip_suffix('%').unwrap_or(s).trim();
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => bail!("Invalid percentage: {:?}", s),
    }
}

/// Parse a size like `"1.2kB"`, `"3.4MB"` or `"512MiB"` into bytes.
///
/// Malformed input yields `0.0`.
pub fn parse_bytes(s: &str) -> f64 {
    try_parse_bytes(s).unwrap_or(0.0)
}

fn try_parse_bytes(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = s.strip_suffix('B').unwrap_or(s);
    let s = s.strip_suffix('i').unwrap_or(s);

    let (number, multiplier) = match s.chars().last() {
        Some(last) => match UNITS.iter().find(|(suffix, _)| *suffix == last) {
            Some((_, multiplier)) => (&s[..s.len() - last.len_utf8()], *multiplier),
            None => (s, 1.0),
        },
        None => return None,
    };

    let value: f64 = number.trim().parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value * multiplier)
    } else {
        None
    }
}

/// Parse a network I/O column like `"1.2kB / 3.4MB"` into `(rx, tx)` bytes.
///
/// Anything other than exactly two `/`-separated parts yields `(0.0, 0.0)`.
pub fn parse_network_io(s: &str) -> (f64, f64) {
    let parts: Vec<&str> = s.split('/').collect();
    match parts.as_slice() {
        [rx, tx] => (parse_bytes(rx), parse_bytes(tx)),
        _ => (0.0, 0.0),
    }
}

/// Format a byte count for display (e.g., 0 -> "0 B", 1536 -> "1.5 KB").
pub fn format_bytes(bytes: f64) -> String {
    const LABELS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0.0 {
        return "0 B".to_string();
    }

    let mut value = bytes;
    let mut index = 0;
    while value >= 1024.0 && index < LABELS.len() - 1 {
        value /= 1024.0;
        index += 1;
    }

    if index == 0 {
        format!("{} {}", value as i64, LABELS[index])
    } else {
        format!("{:.1} {}", value, LABELS[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_parse_kilobytes() {
        assert!(approx(parse_bytes("1.2kB"), 1228.8));
    }

    #[test]
    fn test_parse_megabytes() {
        assert!(approx(parse_bytes("3.4MB"), 3_565_158.4));
    }

    #[test]
    fn test_parse_zero_and_plain_bytes() {
        assert_eq!(parse_bytes("0B"), 0.0);
        assert_eq!(parse_bytes("648B"), 648.0);
    }

    #[test]
    fn test_parse_binary_units() {
        assert!(approx(parse_bytes("1.5GiB"), 1.5 * 1024.0 * 1024.0 * 1024.0));
        assert!(approx(parse_bytes("2TB"), 2.0 * 1024f64.powi(4)));
    }

    #[test]
    fn test_parse_malformed_is_zero() {
        assert_eq!(parse_bytes(""), 0.0);
        assert_eq!(parse_bytes("--"), 0.0);
        assert_eq!(parse_bytes("kB"), 0.0);
        assert_eq!(parse_bytes("12XB"), 0.0);
        assert_eq!(parse_bytes("NaNkB"), 0.0);
    }

    #[test]
    fn test_parse_network_io() {
        let (rx, tx) = parse_network_io("1.2kB / 3.4MB");
        assert!(approx(rx, 1228.8));
        assert!(approx(tx, 3_565_158.4));
    }

    #[test]
    fn test_parse_network_io_malformed() {
        assert_eq!(parse_network_io("1.2kB"), (0.0, 0.0));
        assert_eq!(parse_network_io("a / b / c"), (0.0, 0.0));
        assert_eq!(parse_network_io("junk / 1kB"), (0.0, 1024.0));
    }

    #[test]
    fn test_parse_percent() {
        assert!(approx(parse_percent("12.34%").unwrap(), 12.34));
        assert!(approx(parse_percent(" 0.00% ").unwrap(), 0.0));
        assert!(approx(parse_percent("7").unwrap(), 7.0));
        assert!(parse_percent("--").is_err());
        assert!(parse_percent("").is_err());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0.0), "0 B");
        assert_eq!(format_bytes(512.0), "512 B");
        assert_eq!(format_bytes(1536.0), "1.5 KB");
        assert_eq!(format_bytes(3_565_158.4), "3.4 MB");
        assert_eq!(format_bytes(5.0 * 1024f64.powi(5)), "5120.0 TB");
    }
}
