//! Telnet bytes through decoder, parser and ring buffer

use dx_companion::models::SpotMode;
use dx_companion::services::{LineDecoder, SpotParser, SpotStore, SPOT_CAPACITY};

fn spot_line(n: usize) -> String {
    format!("DX de SP7ABC:  14074.0  K{}ABC  FT8 -10dB  12{:02}Z\r\n", n, n % 60)
}

fn ingest(decoder: &mut LineDecoder, parser: &SpotParser, store: &mut SpotStore, bytes: &[u8]) -> usize {
    decoder.feed(bytes, |line| match parser.parse(line) {
        Some(spot) => {
            store.add_spot(spot);
            true
        }
        None => false,
    })
}

#[test]
fn test_count_and_order_for_any_number_of_spots() {
    let parser = SpotParser::new();

    for total in 0..=14 {
        let mut decoder = LineDecoder::new();
        let mut store = SpotStore::new();
        let stream: String = (0..total).map(spot_line).collect();

        let added = ingest(&mut decoder, &parser, &mut store, stream.as_bytes());
        assert_eq!(added, total);
        assert_eq!(store.count(), total.min(SPOT_CAPACITY));

        let calls: Vec<String> = store
            .get_spots_by_recency()
            .map(|s| s.callsign.clone())
            .collect();
        let expected: Vec<String> = (0..total)
            .rev()
            .take(SPOT_CAPACITY)
            .map(|n| format!("K{}ABC", n))
            .collect();
        assert_eq!(calls, expected, "after {} spots", total);
    }
}

#[test]
fn test_byte_at_a_time_delivery() {
    let parser = SpotParser::new();
    let mut decoder = LineDecoder::new();
    let mut store = SpotStore::new();

    let stream = format!("{}{}", spot_line(1), spot_line(2));
    let mut added = 0;
    for byte in stream.as_bytes() {
        added += ingest(&mut decoder, &parser, &mut store, std::slice::from_ref(byte));
    }

    assert_eq!(added, 2);
    assert_eq!(store.latest().map(|s| s.callsign.as_str()), Some("K2ABC"));
}

#[test]
fn test_noise_lines_are_skipped() {
    let parser = SpotParser::new();
    let mut decoder = LineDecoder::new();
    let mut store = SpotStore::new();

    let stream = b"Hello N0CALL, this is HamAlert\r\n\r\n\
        DX de SP7ABC:  14250.0  K1ABC  USB  1234Z\r\n\
        DX de SP7ABC  14074.0  K1ABC  FT8  1234Z\r\n\
        DX de SP7ABC:  14074.0  K1ABC  FT8  12\r\n";
    assert_eq!(ingest(&mut decoder, &parser, &mut store, stream), 1);

    let spot = store.latest().unwrap();
    assert_eq!(spot.mode, SpotMode::Ssb);
    assert_eq!(spot.frequency_khz, 14250.0);
}

#[test]
fn test_band_plan_modes() {
    let parser = SpotParser::new();
    let forty = parser.parse("DX de SP7ABC:  7100.0  K1ABC  cq  0101Z").unwrap();
    assert_eq!(forty.mode, SpotMode::Ssb);

    let twenty = parser.parse("DX de SP7ABC:  14000.0  K1ABC  cq  0101Z").unwrap();
    assert_eq!(twenty.mode, SpotMode::Unknown);
    assert_eq!(twenty.mode.as_str(), "-");
}

#[test]
fn test_overlong_line_is_truncated_not_split() {
    let parser = SpotParser::new();
    let mut decoder = LineDecoder::new();
    let mut store = SpotStore::new();

    let long = format!("DX de SP7ABC:  14074.0  K1ABC  {}  1234Z\r\n", "x".repeat(400));
    // the timestamp is cut off, so nothing decodes
    assert_eq!(ingest(&mut decoder, &parser, &mut store, long.as_bytes()), 0);
    // and the next line starts clean
    assert_eq!(ingest(&mut decoder, &parser, &mut store, spot_line(3).as_bytes()), 1);
}
