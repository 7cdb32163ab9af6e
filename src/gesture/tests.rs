use super::*;

use RawTouchSample::{Clear, EndTouch, StartTouch, Touching};

fn delays(long_tap_ticks: u16, multi_tap_ticks: u16) -> GestureDelays {
    GestureDelays {
        long_tap_ticks,
        multi_tap_ticks,
    }
}

fn feed(engine: &mut GestureEngine, input: Option<RawTouchSample>, out: &mut Vec<GestureEvent>) {
    out.extend(engine.step(input).iter());
}

fn idle_ticks(engine: &mut GestureEngine, ticks: u16, out: &mut Vec<GestureEvent>) {
    for _ in 0..ticks {
        feed(engine, None, out);
    }
}

fn short_touch(engine: &mut GestureEngine, out: &mut Vec<GestureEvent>) {
    feed(engine, Some(StartTouch), out);
    feed(engine, Some(Touching), out);
    feed(engine, Some(EndTouch), out);
}

#[test]
fn single_tap_fires_after_window_expires() {
    let mut engine = GestureEngine::default();
    let mut events = Vec::new();
    let window = engine.delays().multi_tap_ticks;

    feed(&mut engine, Some(StartTouch), &mut events);
    feed(&mut engine, Some(EndTouch), &mut events);
    idle_ticks(&mut engine, window - 1, &mut events);
    assert!(events.is_empty(), "tap reported before the window closed");
    assert_eq!(engine.state(), GestureStateId::MultiTapWindow);

    idle_ticks(&mut engine, 1, &mut events);
    assert_eq!(events, vec![GestureEvent::Tap]);
    assert_eq!(engine.state(), GestureStateId::Idle);
}

#[test]
fn double_tap_reports_one_multi_tap() {
    let mut engine = GestureEngine::default();
    let mut events = Vec::new();
    let window = engine.delays().multi_tap_ticks;

    feed(&mut engine, Some(StartTouch), &mut events);
    feed(&mut engine, Some(EndTouch), &mut events);
    idle_ticks(&mut engine, 3, &mut events);
    feed(&mut engine, Some(StartTouch), &mut events);
    feed(&mut engine, Some(EndTouch), &mut events);
    idle_ticks(&mut engine, window, &mut events);

    assert_eq!(events, vec![GestureEvent::MultiTap(2)]);
    assert_eq!(engine.state(), GestureStateId::Idle);
}

#[test]
fn triple_tap_counts_every_touch_down() {
    let mut engine = GestureEngine::default();
    let mut events = Vec::new();
    let window = engine.delays().multi_tap_ticks;

    for _ in 0..3 {
        short_touch(&mut engine, &mut events);
        idle_ticks(&mut engine, window - 1, &mut events);
    }
    assert!(events.is_empty());
    assert_eq!(engine.pending_touch_count(), 3);

    idle_ticks(&mut engine, 1, &mut events);
    assert_eq!(events, vec![GestureEvent::MultiTap(3)]);
    assert_eq!(engine.pending_touch_count(), 0);
}

#[test]
fn long_tap_emits_start_then_end() {
    let mut engine = GestureEngine::default();
    let mut events = Vec::new();
    let threshold = engine.delays().long_tap_ticks;

    feed(&mut engine, Some(StartTouch), &mut events);
    for _ in 0..threshold {
        feed(&mut engine, Some(Touching), &mut events);
    }
    assert!(events.is_empty(), "long tap started before the threshold");
    assert_eq!(engine.state(), GestureStateId::StartTouch);

    feed(&mut engine, Some(Touching), &mut events);
    assert_eq!(events, vec![GestureEvent::LongTapStart]);
    assert_eq!(engine.state(), GestureStateId::LongTap);

    for _ in 0..20 {
        feed(&mut engine, Some(Touching), &mut events);
    }
    assert_eq!(events, vec![GestureEvent::LongTapStart]);

    feed(&mut engine, Some(EndTouch), &mut events);
    assert_eq!(
        events,
        vec![GestureEvent::LongTapStart, GestureEvent::LongTapEnd]
    );
    assert_eq!(engine.state(), GestureStateId::Idle);
}

#[test]
fn long_tap_never_also_reports_a_tap() {
    let mut engine = GestureEngine::default();
    let mut events = Vec::new();
    let threshold = engine.delays().long_tap_ticks;

    feed(&mut engine, Some(StartTouch), &mut events);
    for _ in 0..=threshold {
        feed(&mut engine, Some(Touching), &mut events);
    }
    feed(&mut engine, Some(EndTouch), &mut events);
    idle_ticks(&mut engine, 100, &mut events);

    assert!(!events
        .iter()
        .any(|e| matches!(e, GestureEvent::Tap | GestureEvent::MultiTap(_))));
    assert_eq!(
        events,
        vec![GestureEvent::LongTapStart, GestureEvent::LongTapEnd]
    );
}

#[test]
fn idle_ignores_everything_but_touch_start() {
    let mut engine = GestureEngine::default();
    let mut events = Vec::new();

    for input in [
        Some(Touching),
        Some(EndTouch),
        Some(Clear),
        None,
        Some(RawTouchSample::Unknown(0x7f)),
        None,
        Some(Touching),
    ] {
        feed(&mut engine, input, &mut events);
        assert_eq!(engine.state(), GestureStateId::Idle);
    }
    assert!(events.is_empty());
}

#[test]
fn zero_long_tap_delay_triggers_on_first_sample_after_touch_down() {
    let mut engine = GestureEngine::new(delays(0, 13));
    let mut events = Vec::new();

    feed(&mut engine, Some(StartTouch), &mut events);
    assert!(events.is_empty());

    feed(&mut engine, Some(Touching), &mut events);
    assert_eq!(events, vec![GestureEvent::LongTapStart]);
}

#[test]
fn zero_multi_tap_delay_reports_on_first_idle_tick() {
    let mut engine = GestureEngine::new(delays(15, 0));
    let mut events = Vec::new();

    feed(&mut engine, Some(StartTouch), &mut events);
    feed(&mut engine, Some(EndTouch), &mut events);
    feed(&mut engine, None, &mut events);

    assert_eq!(events, vec![GestureEvent::Tap]);
}

#[test]
fn window_ignores_data_other_than_touch_start() {
    let mut engine = GestureEngine::new(delays(15, 4));
    let mut events = Vec::new();

    feed(&mut engine, Some(StartTouch), &mut events);
    feed(&mut engine, Some(EndTouch), &mut events);
    for sample in [Clear, Touching, EndTouch, RawTouchSample::Unknown(0x09)] {
        feed(&mut engine, Some(sample), &mut events);
    }
    assert_eq!(engine.state(), GestureStateId::MultiTapWindow);
    assert!(events.is_empty());

    idle_ticks(&mut engine, 4, &mut events);
    assert_eq!(events, vec![GestureEvent::Tap]);
}

#[test]
fn idle_ticks_while_pressed_do_not_advance_long_tap_timer() {
    let mut engine = GestureEngine::new(delays(2, 13));
    let mut events = Vec::new();

    feed(&mut engine, Some(StartTouch), &mut events);
    idle_ticks(&mut engine, 50, &mut events);
    assert_eq!(engine.state(), GestureStateId::StartTouch);
    assert!(events.is_empty());
}

#[test]
fn unknown_samples_do_not_advance_long_tap_timer() {
    let mut engine = GestureEngine::new(delays(2, 13));
    let mut events = Vec::new();

    feed(&mut engine, Some(StartTouch), &mut events);
    for _ in 0..10 {
        feed(&mut engine, Some(RawTouchSample::Unknown(0xff)), &mut events);
    }
    assert_eq!(engine.state(), GestureStateId::StartTouch);

    feed(&mut engine, Some(Touching), &mut events);
    feed(&mut engine, Some(Touching), &mut events);
    assert!(events.is_empty());
    feed(&mut engine, Some(Touching), &mut events);
    assert_eq!(events, vec![GestureEvent::LongTapStart]);
}

#[test]
fn tap_followed_by_long_press_reports_both_separately() {
    let mut engine = GestureEngine::new(delays(3, 10));
    let mut events = Vec::new();

    short_touch(&mut engine, &mut events);
    idle_ticks(&mut engine, 2, &mut events);
    feed(&mut engine, Some(StartTouch), &mut events);
    for _ in 0..4 {
        feed(&mut engine, Some(Touching), &mut events);
    }
    feed(&mut engine, Some(EndTouch), &mut events);
    idle_ticks(&mut engine, 20, &mut events);

    assert_eq!(
        events,
        vec![
            GestureEvent::Tap,
            GestureEvent::LongTapStart,
            GestureEvent::LongTapEnd
        ]
    );
}

#[test]
fn long_tap_ignores_idle_ticks_and_stray_samples() {
    let mut engine = GestureEngine::new(delays(0, 10));
    let mut events = Vec::new();

    feed(&mut engine, Some(StartTouch), &mut events);
    feed(&mut engine, Some(Touching), &mut events);
    idle_ticks(&mut engine, 5, &mut events);
    feed(&mut engine, Some(StartTouch), &mut events);
    feed(&mut engine, Some(Clear), &mut events);

    assert_eq!(engine.state(), GestureStateId::LongTap);
    assert_eq!(events, vec![GestureEvent::LongTapStart]);
}

#[test]
fn sink_api_forwards_events_in_order() {
    let mut engine = GestureEngine::new(delays(15, 1));
    let mut seen: Vec<(GestureKind, u8)> = Vec::new();
    let mut sink = |event: GestureEvent| seen.push((event.kind(), event.count()));

    engine.on_data(&mut sink, StartTouch);
    engine.on_data(&mut sink, EndTouch);
    engine.on_data(&mut sink, StartTouch);
    engine.on_data(&mut sink, EndTouch);
    engine.on_tick(&mut sink);

    assert_eq!(seen, vec![(GestureKind::MultiTap, 2)]);
}

#[test]
fn reset_discards_pending_interaction() {
    let mut engine = GestureEngine::new(delays(15, 5));
    let mut events = Vec::new();

    short_touch(&mut engine, &mut events);
    feed(&mut engine, Some(StartTouch), &mut events);
    assert_eq!(engine.pending_touch_count(), 2);

    engine.reset();
    assert_eq!(engine.state(), GestureStateId::Idle);
    assert_eq!(engine.pending_touch_count(), 0);
    assert_eq!(engine.delays(), delays(15, 5));

    idle_ticks(&mut engine, 20, &mut events);
    assert!(events.is_empty());
}

#[test]
fn report_decoding_reads_fourth_byte() {
    assert_eq!(
        RawTouchSample::from_report(&[0, 0, 0, 0x04, 0, 0, 0, 0]),
        Some(StartTouch)
    );
    assert_eq!(
        RawTouchSample::from_report(&[0, 0, 0, 0x02, 0, 0, 0, 0]),
        Some(EndTouch)
    );
    assert_eq!(
        RawTouchSample::from_report(&[0, 0, 0, 0x33, 0, 0, 0, 0]),
        Some(RawTouchSample::Unknown(0x33))
    );
    assert_eq!(RawTouchSample::from_report(&[]), None);
    assert_eq!(RawTouchSample::from_report(&[0, 0, 0]), None);
}
