//! Small text helpers shared by the line and XML parsers

/// Keep at most `max` characters of `s`
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Parse the leading integer of `s` the way C `atoi` does: optional
/// whitespace and sign, then digits. Returns 0 when there are no digits.
pub fn leading_int(s: &str) -> i32 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        value = (value * 10 + i64::from(digit - b'0')).min(i64::from(i32::MAX) + 1);
    }

    let value = if negative { -value } else { value };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Parse the leading decimal number of `s` (`atof` without exponents).
/// Returns 0.0 when `s` does not start with a number.
pub fn leading_float(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut seen_dot = false;

    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => {}
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    s[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("VERYLONGCALLSIGN", 11), "VERYLONGCAL");
        assert_eq!(truncate_chars("K1ABC", 11), "K1ABC");
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int(" 150"), 150);
        assert_eq!(leading_int("-3 "), -3);
        assert_eq!(leading_int("7x"), 7);
        assert_eq!(leading_int("n/a"), 0);
        assert_eq!(leading_int(""), 0);
        assert_eq!(leading_int("99999999999"), i32::MAX);
    }

    #[test]
    fn test_leading_float() {
        assert_eq!(leading_float("14074.0"), 14074.0);
        assert_eq!(leading_float("7100"), 7100.0);
        assert_eq!(leading_float("3573.5kHz"), 3573.5);
        assert_eq!(leading_float("abc"), 0.0);
        assert_eq!(leading_float("."), 0.0);
    }
}
