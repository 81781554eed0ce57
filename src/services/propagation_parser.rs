//! Single-pass reader for the solar/VHF propagation XML feed
//!
//! Only two tag shapes are understood: plain `<name>value</name>` tags for
//! the solar indices, and `<band ..>` / `<phenomenon ..>` tags whose
//! attributes pick the destination slot. Everything else is skipped. The
//! scan only moves forward and stops at the end of the input, so truncated
//! payloads yield a partially filled snapshot rather than an error.

use crate::models::{BandCondition, HfBand, PropagationSnapshot, TimeOfDay};
use crate::text::{leading_int, truncate_chars};

const CONTENT_MAX_LEN: usize = 63;
const BAND_CONTENT_MAX_LEN: usize = 15;
const PHENOMENON_CONTENT_MAX_LEN: usize = 31;

const XRAY_MAX_LEN: usize = 7;
const GEOMAGNETIC_FIELD_MAX_LEN: usize = 15;
const SIGNAL_NOISE_MAX_LEN: usize = 7;
const VHF_MAX_LEN: usize = 15;

/// Parse a feed payload into a fresh snapshot
pub fn parse_propagation(xml: &str) -> PropagationSnapshot {
    let mut snapshot = PropagationSnapshot::default();
    let bytes = xml.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'<' && bytes.get(pos + 1) != Some(&b'/') {
            pos = parse_tag(xml, pos + 1, &mut snapshot);
        } else {
            pos += 1;
        }
    }

    snapshot
}

/// `start` points just past `<`. Returns the position to resume scanning from.
fn parse_tag(xml: &str, start: usize, snapshot: &mut PropagationSnapshot) -> usize {
    let rest = &xml[start..];
    let name_len = rest
        .find(|c: char| c == '>' || c.is_ascii_whitespace())
        .unwrap_or(rest.len());
    let name = &rest[..name_len];
    let after_name = start + name_len;

    match name {
        "band" => return parse_band(xml, after_name, snapshot),
        "phenomenon" => return parse_phenomenon(xml, after_name, snapshot),
        _ => {}
    }

    let Some(tag_len) = xml[after_name..].find('>') else {
        return xml.len();
    };
    let (raw, next) = read_content(xml, after_name + tag_len + 1);
    let content = truncate_chars(raw, CONTENT_MAX_LEN);
    let value = content.trim();

    match name {
        "solarflux" => snapshot.solar_flux = leading_int(value),
        "aindex" => snapshot.a_index = leading_int(value),
        "kindex" => snapshot.k_index = leading_int(value),
        "sunspots" => snapshot.sunspots = leading_int(value),
        "xray" => snapshot.xray = truncate_chars(value, XRAY_MAX_LEN),
        "geomagfield" => snapshot.geomagnetic_field = truncate_chars(value, GEOMAGNETIC_FIELD_MAX_LEN),
        "signalnoise" => snapshot.signal_noise = truncate_chars(value, SIGNAL_NOISE_MAX_LEN),
        _ => {}
    }

    next
}

/// `<band name="80m-40m" time="day">Good</band>`
fn parse_band(xml: &str, pos: usize, snapshot: &mut PropagationSnapshot) -> usize {
    let Some(tag_len) = xml[pos..].find('>') else {
        return pos;
    };
    let attributes = &xml[pos..pos + tag_len];
    let (raw, next) = read_content(xml, pos + tag_len + 1);
    let condition = BandCondition::from_text(&truncate_chars(raw, BAND_CONTENT_MAX_LEN));

    let band = attribute(attributes, "name").and_then(HfBand::from_feed_name);
    let time = attribute(attributes, "time").and_then(TimeOfDay::from_feed_name);
    if let (Some(band), Some(time)) = (band, time) {
        snapshot.set_condition(band, time, condition);
    }

    next
}

/// `<phenomenon name="E-Skip" location="europe_6m">Band Closed</phenomenon>`
fn parse_phenomenon(xml: &str, pos: usize, snapshot: &mut PropagationSnapshot) -> usize {
    let Some(tag_len) = xml[pos..].find('>') else {
        return pos;
    };
    let attributes = &xml[pos..pos + tag_len];
    let (raw, next) = read_content(xml, pos + tag_len + 1);
    let content = truncate_chars(raw, PHENOMENON_CONTENT_MAX_LEN);
    let value = truncate_chars(content.trim(), VHF_MAX_LEN);

    let vhf = &mut snapshot.vhf;
    match (attribute(attributes, "name"), attribute(attributes, "location")) {
        (Some("vhf-aurora"), _) => vhf.aurora = value,
        (Some("E-Skip"), Some("europe")) => vhf.e_skip_europe_2m = value,
        (Some("E-Skip"), Some("europe_4m")) => vhf.e_skip_europe_4m = value,
        (Some("E-Skip"), Some("europe_6m")) => vhf.e_skip_europe_6m = value,
        _ => {}
    }

    next
}

/// Text from `from` up to the next `<` (or the end of input)
fn read_content(xml: &str, from: usize) -> (&str, usize) {
    let len = xml[from..].find('<').unwrap_or(xml.len() - from);
    (&xml[from..from + len], from + len)
}

/// Value of `key="..."` inside a tag's attribute text
fn attribute<'a>(tag: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("{key}=\"");
    let mut from = 0;

    while let Some(found) = tag[from..].find(&needle) {
        let at = from + found;
        let at_word_start = at == 0 || tag.as_bytes()[at - 1].is_ascii_whitespace();
        if at_word_start {
            let value_start = at + needle.len();
            let value_len = tag[value_start..].find('"').unwrap_or(tag.len() - value_start);
            return Some(&tag[value_start..value_start + value_len]);
        }
        from = at + needle.len();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<solar>
  <solardata>
    <source url="http://www.hamqsl.com/solar.html">N0NBH</source>
    <updated> 19 Oct 2026 1200 GMT</updated>
    <solarflux> 152</solarflux>
    <aindex> 8</aindex>
    <kindex> 2</kindex>
    <xray>C1.4</xray>
    <sunspots>118</sunspots>
    <geomagfield>QUIET</geomagfield>
    <signalnoise>S1-S2</signalnoise>
    <calculatedconditions>
      <band name="80m-40m" time="day">Fair</band>
      <band name="30m-20m" time="day">Good</band>
      <band name="17m-15m" time="day">Good</band>
      <band name="12m-10m" time="day">Fair</band>
      <band name="80m-40m" time="night">Good</band>
      <band name="30m-20m" time="night">Good</band>
      <band name="17m-15m" time="night">Fair</band>
      <band name="12m-10m" time="night">Poor</band>
    </calculatedconditions>
    <calculatedvhfconditions>
      <phenomenon name="vhf-aurora" location="northern_hemi">Band Closed</phenomenon>
      <phenomenon name="E-Skip" location="europe">Band Closed</phenomenon>
      <phenomenon name="E-Skip" location="north_america">Band Closed</phenomenon>
      <phenomenon name="E-Skip" location="europe_6m">50MHz ES</phenomenon>
      <phenomenon name="E-Skip" location="europe_4m">Band Closed</phenomenon>
    </calculatedvhfconditions>
  </solardata>
</solar>"#;

    #[test]
    fn test_parse_full_feed() {
        let snapshot = parse_propagation(SAMPLE);
        assert_eq!(snapshot.solar_flux, 152);
        assert_eq!(snapshot.a_index, 8);
        assert_eq!(snapshot.k_index, 2);
        assert_eq!(snapshot.sunspots, 118);
        assert_eq!(snapshot.xray, "C1.4");
        assert_eq!(snapshot.geomagnetic_field, "QUIET");
        assert_eq!(snapshot.signal_noise, "S1-S2");
        assert_eq!(
            snapshot.conditions,
            [
                BandCondition::Fair,
                BandCondition::Good,
                BandCondition::Good,
                BandCondition::Fair,
                BandCondition::Good,
                BandCondition::Good,
                BandCondition::Fair,
                BandCondition::Poor,
            ]
        );
        assert_eq!(snapshot.vhf.aurora, "Band Closed");
        assert_eq!(snapshot.vhf.e_skip_europe_2m, "Band Closed");
        assert_eq!(snapshot.vhf.e_skip_europe_4m, "Band Closed");
        assert_eq!(snapshot.vhf.e_skip_europe_6m, "50MHz ES");
    }

    #[test]
    fn test_band_condition_case_variants() {
        for text in ["Good", "GOOD", "good"] {
            let xml = format!(r#"<band name="80m-40m" time="day">{text}</band>"#);
            let snapshot = parse_propagation(&xml);
            assert_eq!(
                snapshot.condition(HfBand::M80To40, TimeOfDay::Day),
                BandCondition::Good
            );
        }
    }

    #[test]
    fn test_unknown_band_or_time_is_ignored() {
        let snapshot = parse_propagation(
            r#"<band name="160m" time="day">Good</band><band name="30m-20m" time="dusk">Good</band>"#,
        );
        assert_eq!(snapshot.conditions, [BandCondition::Unknown; 8]);
    }

    #[test]
    fn test_attribute_lookup_stays_inside_tag() {
        // "time" only appears in the following tag
        let snapshot = parse_propagation(
            r#"<band name="80m-40m">Good</band><band name="x" time="night">Poor</band>"#,
        );
        assert_eq!(snapshot.conditions, [BandCondition::Unknown; 8]);
    }

    #[test]
    fn test_truncated_payload_stops_cleanly() {
        let snapshot = parse_propagation("<solarflux> 99</solarflux><kindex>4");
        assert_eq!(snapshot.solar_flux, 99);
        assert_eq!(snapshot.k_index, 4);

        let snapshot = parse_propagation(r#"<band name="80m-40m" time="da"#);
        assert_eq!(snapshot, PropagationSnapshot::default());

        let snapshot = parse_propagation("<xray");
        assert_eq!(snapshot.xray, "");
    }

    #[test]
    fn test_long_text_is_truncated() {
        let snapshot = parse_propagation("<xray>M1.2-very-long</xray><geomagfield>MINOR STORM TODAY</geomagfield>");
        assert_eq!(snapshot.xray, "M1.2-ve");
        assert_eq!(snapshot.geomagnetic_field, "MINOR STORM TOD");
    }

    #[test]
    fn test_garbage_input() {
        let snapshot = parse_propagation("<<<>>> </ <band> <phenomenon <>");
        assert_eq!(snapshot, PropagationSnapshot::default());
    }
}
