//! Compact number formatting for the statistics table

const SUFFIXES: [&str; 6] = ["", "k", "M", "G", "T", "P"];

/// Format a value with a metric suffix (k, M, G, T, P)
///
/// Precision shrinks as the mantissa grows: 2 decimals below 10, 1 below 100,
/// none from 100 up. Zero is rendered as a bare `0`.
pub fn format_number_with_suffix(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let mut value = value;
    let mut index = 0;
    while value >= 1000.0 && index < SUFFIXES.len() - 1 {
        value /= 1000.0;
        index += 1;
    }

    let suffix = SUFFIXES[index];
    if value >= 100.0 {
        format!("{:.0}{}", value, suffix)
    } else if value >= 10.0 {
        format!("{:.1}{}", value, suffix)
    } else {
        format!("{:.2}{}", value, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_with_suffix() {
        let cases = [
            (0.0, "0"),
            (0.5, "0.50"),
            (5.0, "5.00"),
            (50.0, "50.0"),
            (500.0, "500"),
            (1000.0, "1.00k"),
            (5000.0, "5.00k"),
            (50000.0, "50.0k"),
            (500000.0, "500k"),
            (1000000.0, "1.00M"),
            (500000000.0, "500M"),
            (1000000000.0, "1.00G"),
            (500000000000.0, "500G"),
        ];

        for (value, expected) in cases {
            assert_eq!(format_number_with_suffix(value), expected, "value {}", value);
        }
    }

    #[test]
    fn test_suffix_stops_at_peta() {
        assert_eq!(format_number_with_suffix(2.0e18), "2000P");
    }
}
