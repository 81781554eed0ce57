//! Decodes `DX de` announcements from the telnet feed

use crate::models::{Spot, SpotMode};
use regex::Regex;

/// A frequency range where a spot without a mode keyword is assumed to be SSB
#[derive(Debug, Clone, Copy)]
pub struct BandSegment {
    pub name: &'static str,
    pub low_khz: f64,
    pub high_khz: f64,
}

impl BandSegment {
    pub fn contains(&self, frequency_khz: f64) -> bool {
        frequency_khz >= self.low_khz && frequency_khz <= self.high_khz
    }
}

/// Phone segment of the band plan containing `frequency_khz`
pub fn ssb_segment(frequency_khz: f64) -> Option<&'static BandSegment> {
    SSB_BAND_PLAN.iter().find(|seg| seg.contains(frequency_khz))
}

/// Phone sub-bands, 160m through 6m (inclusive bounds)
pub const SSB_BAND_PLAN: [BandSegment; 10] = [
    BandSegment { name: "160m", low_khz: 1840.0, high_khz: 2000.0 },
    BandSegment { name: "80m", low_khz: 3600.0, high_khz: 3800.0 },
    BandSegment { name: "60m", low_khz: 5330.0, high_khz: 5410.0 },
    BandSegment { name: "40m", low_khz: 7050.0, high_khz: 7200.0 },
    BandSegment { name: "20m", low_khz: 14100.0, high_khz: 14350.0 },
    BandSegment { name: "17m", low_khz: 18110.0, high_khz: 18168.0 },
    BandSegment { name: "15m", low_khz: 21150.0, high_khz: 21450.0 },
    BandSegment { name: "12m", low_khz: 24920.0, high_khz: 24990.0 },
    BandSegment { name: "10m", low_khz: 28300.0, high_khz: 29000.0 },
    BandSegment { name: "6m", low_khz: 50100.0, high_khz: 51000.0 },
];

/// Parser for `DX de <SPOTTER>:  <FREQ>  <CALL>  <comment>  <HHMM>Z` lines
pub struct SpotParser {
    line_regex: Regex,
}

impl SpotParser {
    pub fn new() -> Self {
        // spotter runs to the first colon; frequency and call are each
        // terminated by a space, so a call must be followed by more text
        let line_regex =
            Regex::new(r"DX de ([^:]*):\s*([^ ]+) \s*([^ ]+) ").expect("Invalid regex");
        Self { line_regex }
    }

    /// Decode one trimmed line. Returns `None` when any required part is
    /// missing or the timestamp is not a valid HHMM.
    pub fn parse(&self, line: &str) -> Option<Spot> {
        let caps = self.line_regex.captures(line)?;
        let spotter = caps.get(1)?.as_str();
        let frequency = caps.get(2)?.as_str();
        let callsign = caps.get(3)?.as_str();

        let (hour, minute) = parse_timestamp(line)?;

        let spot = Spot::new(spotter, frequency, callsign, hour, minute, SpotMode::Unknown);
        let mode = classify_mode(line, spot.frequency_khz);
        Some(Spot { mode, ..spot })
    }
}

impl Default for SpotParser {
    fn default() -> Self {
        Self::new()
    }
}

/// HHMM from the last space-separated token, e.g. "1234Z" -> (12, 34)
fn parse_timestamp(line: &str) -> Option<(u8, u8)> {
    let token = &line[line.rfind(' ')? + 1..];
    let digits = token.as_bytes().get(..4)?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }

    let hour = (digits[0] - b'0') * 10 + (digits[1] - b'0');
    let minute = (digits[2] - b'0') * 10 + (digits[3] - b'0');
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Infer the mode from keywords in the line, falling back to the SSB band plan
pub fn classify_mode(line: &str, frequency_khz: f64) -> SpotMode {
    let upper = line.to_ascii_uppercase();
    let has = |keyword: &str| upper.contains(keyword);

    if has("FT8") {
        SpotMode::Ft8
    } else if has("FT4") {
        SpotMode::Ft4
    } else if has("SSB") || has("USB") || has("LSB") {
        SpotMode::Ssb
    } else if has("CW") || has("WPM") {
        SpotMode::Cw
    } else if let Some(seg) = ssb_segment(frequency_khz) {
        tracing::trace!("{} kHz is in the {} phone segment", frequency_khz, seg.name);
        SpotMode::Ssb
    } else {
        SpotMode::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_line() {
        let parser = SpotParser::new();
        let spot = parser
            .parse("DX de SP7ABC:  14074.0  K1ABC  FT8 -10dB  1234Z")
            .unwrap();
        assert_eq!(spot.spotter, "SP7ABC");
        assert_eq!(spot.frequency, "14074.0");
        assert_eq!(spot.frequency_khz, 14074.0);
        assert_eq!(spot.callsign, "K1ABC");
        assert_eq!(spot.hour, 12);
        assert_eq!(spot.minute, 34);
        assert_eq!(spot.mode, SpotMode::Ft8);
    }

    #[test]
    fn test_parse_hamalert_spacing() {
        let parser = SpotParser::new();
        let spot = parser
            .parse("DX de DL1ABC-#:   7023.5 OH2XYZ       CW 18 dB 25 WPM CQ      0907Z")
            .unwrap();
        assert_eq!(spot.spotter, "DL1ABC-#");
        assert_eq!(spot.frequency, "7023.5");
        assert_eq!(spot.callsign, "OH2XYZ");
        assert_eq!((spot.hour, spot.minute), (9, 7));
        assert_eq!(spot.mode, SpotMode::Cw);
    }

    #[test]
    fn test_ssb_segment_lookup() {
        assert_eq!(ssb_segment(14200.0).map(|seg| seg.name), Some("20m"));
        assert_eq!(ssb_segment(50100.0).map(|seg| seg.name), Some("6m"));
        assert!(ssb_segment(14074.0).is_none());
    }

    #[test]
    fn test_mode_keyword_priority() {
        assert_eq!(classify_mode("ft4 and ft8", 0.0), SpotMode::Ft8);
        assert_eq!(classify_mode("FT4 tnx", 0.0), SpotMode::Ft4);
        assert_eq!(classify_mode("usb cw", 0.0), SpotMode::Ssb);
        assert_eq!(classify_mode("lsb", 0.0), SpotMode::Ssb);
        assert_eq!(classify_mode("22 wpm", 0.0), SpotMode::Cw);
    }

    #[test]
    fn test_band_plan_fallback() {
        assert_eq!(classify_mode("nothing here", 7100.0), SpotMode::Ssb);
        assert_eq!(classify_mode("nothing here", 1840.0), SpotMode::Ssb);
        assert_eq!(classify_mode("nothing here", 51000.0), SpotMode::Ssb);
        assert_eq!(classify_mode("nothing here", 14000.0), SpotMode::Unknown);
        assert_eq!(classify_mode("nothing here", 0.0), SpotMode::Unknown);
    }

    #[test]
    fn test_rejects_malformed_lines() {
        let parser = SpotParser::new();
        assert!(parser.parse("SP7ABC:  14074.0  K1ABC  FT8  1234Z").is_none());
        assert!(parser.parse("DX de SP7ABC  14074.0  K1ABC  FT8  1234Z").is_none());
        assert!(parser.parse("DX de SP7ABC:  14074.0  K1ABC  FT8  123").is_none());
        assert!(parser.parse("DX de SP7ABC:  14074.0").is_none());
        assert!(parser.parse("DX de SP7ABC:  14074.0 K1ABC").is_none());
    }

    #[test]
    fn test_rejects_out_of_range_timestamp() {
        let parser = SpotParser::new();
        assert!(parser.parse("DX de SP7ABC:  14074.0  K1ABC  FT8  2460Z").is_none());
        assert!(parser.parse("DX de SP7ABC:  14074.0  K1ABC  FT8  1299Z").is_none());
        assert!(parser.parse("DX de SP7ABC:  14074.0  K1ABC  FT8  12a4Z").is_none());
        assert!(parser.parse("DX de SP7ABC:  14074.0  K1ABC  FT8  2359Z").is_some());
    }
}
