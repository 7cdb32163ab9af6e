use std::path::PathBuf;

use muteme::{GestureDelays, GestureEvent};
use touch_replay::{matches_expected, parse_expected_kinds, parse_trace, replay, ReplayedEvent};

const TAIL_TICKS: u64 = 32;

const FIXTURES: &[&str] = &[
    "single_tap",
    "double_tap",
    "triple_tap_decimal",
    "long_tap_with_dropouts",
    "tap_then_hold",
];

fn fixture(name: &str, ext: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(format!("{name}.{ext}"))
}

fn replay_fixture(name: &str) -> Vec<ReplayedEvent> {
    let samples = parse_trace(&fixture(name, "csv")).unwrap();
    replay(&samples, GestureDelays::default(), TAIL_TICKS)
}

#[test]
fn fixtures_match_expectations() {
    for name in FIXTURES {
        let events = replay_fixture(name);
        let expected = parse_expected_kinds(&fixture(name, "expected")).unwrap();
        assert!(
            matches_expected(&events, &expected),
            "{name}: got {events:?}, expected {expected:?}"
        );
    }
}

#[test]
fn single_tap_fires_when_window_closes() {
    let events = replay_fixture("single_tap");
    assert_eq!(
        events,
        vec![ReplayedEvent {
            tick: 15,
            event: GestureEvent::Tap
        }]
    );
}

#[test]
fn dropped_reads_do_not_shorten_the_hold() {
    let ticks: Vec<(u64, GestureEvent)> = replay_fixture("long_tap_with_dropouts")
        .into_iter()
        .map(|e| (e.tick, e.event))
        .collect();
    assert_eq!(
        ticks,
        vec![
            (25, GestureEvent::LongTapStart),
            (26, GestureEvent::LongTapEnd)
        ]
    );
}

#[test]
fn earlier_tap_is_flushed_when_hold_begins() {
    let ticks: Vec<(u64, GestureEvent)> = replay_fixture("tap_then_hold")
        .into_iter()
        .map(|e| (e.tick, e.event))
        .collect();
    assert_eq!(
        ticks,
        vec![
            (20, GestureEvent::Tap),
            (20, GestureEvent::LongTapStart),
            (21, GestureEvent::LongTapEnd)
        ]
    );
}

#[test]
fn shorter_multi_tap_window_splits_taps() {
    let samples = parse_trace(&fixture("double_tap", "csv")).unwrap();
    let delays = GestureDelays {
        multi_tap_ticks: 2,
        ..GestureDelays::default()
    };
    let events: Vec<GestureEvent> = replay(&samples, delays, TAIL_TICKS)
        .into_iter()
        .map(|e| e.event)
        .collect();
    assert_eq!(events, vec![GestureEvent::Tap, GestureEvent::Tap]);
}
