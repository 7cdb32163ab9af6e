//! Offline replay of captured touch traces through [`GestureEngine`].
//!
//! Traces are CSV lines `touch_trace,<tick>,<raw>` where `raw` is the touch
//! byte in decimal or `0x` hex, and an empty value or `-` means the read
//! returned nothing on that tick.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use muteme::{GestureDelays, GestureEngine, GestureEvent, GestureKind, RawTouchSample};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceSample {
    pub tick: u64,
    pub input: Option<RawTouchSample>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayedEvent {
    pub tick: u64,
    pub event: GestureEvent,
}

/// One line of an expectation file. A bare `multi_tap` accepts any count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpectedEvent {
    pub kind: GestureKind,
    pub count: Option<u8>,
}

impl ExpectedEvent {
    pub fn matches(&self, event: GestureEvent) -> bool {
        event.kind() == self.kind && self.count.is_none_or(|count| count == event.count())
    }

    fn parse(token: &str) -> Option<Self> {
        let (name, count) = match token.split_once(':') {
            Some((name, count)) => (name, Some(count.trim().parse::<u8>().ok()?)),
            None => (token, None),
        };
        let name = name.trim().to_ascii_lowercase();
        let kind = GestureKind::ALL
            .into_iter()
            .find(|kind| kind.label() == name)?;
        if count.is_some() && kind != GestureKind::MultiTap {
            return None;
        }
        Some(Self { kind, count })
    }
}

pub fn parse_trace(path: &Path) -> Result<Vec<TraceSample>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_trace_str(&raw).with_context(|| format!("invalid trace {}", path.display()))
}

pub fn parse_trace_str(raw: &str) -> Result<Vec<TraceSample>> {
    let mut out: Vec<TraceSample> = Vec::new();
    for (line_no, line) in raw.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts[0] != "touch_trace" {
            continue;
        }
        if parts.len() < 2 {
            bail!("line {line_no}: expected `touch_trace,<tick>,<raw>`");
        }
        if parts[1] == "tick" {
            continue;
        }

        let tick = parts[1]
            .parse::<u64>()
            .with_context(|| format!("line {line_no}: invalid tick `{}`", parts[1]))?;
        if let Some(prev) = out.last() {
            if tick <= prev.tick {
                bail!(
                    "line {line_no}: tick {tick} does not follow tick {}",
                    prev.tick
                );
            }
        }

        let input = parse_raw(parts.get(2).copied().unwrap_or(""))
            .with_context(|| format!("line {line_no}: invalid raw value"))?;
        out.push(TraceSample { tick, input });
    }
    Ok(out)
}

fn parse_raw(raw: &str) -> Result<Option<RawTouchSample>> {
    if raw.is_empty() || raw == "-" {
        return Ok(None);
    }
    let byte = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => raw.parse::<u8>(),
    }
    .with_context(|| format!("`{raw}` is not a byte"))?;
    Ok(Some(RawTouchSample::from_byte(byte)))
}

pub fn parse_expected_kinds(path: &Path) -> Result<Vec<ExpectedEvent>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let mut expected = Vec::new();
    for (line_no, line) in raw.lines().enumerate() {
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        let Some(event) = ExpectedEvent::parse(token) else {
            bail!(
                "{}:{} invalid expected event kind: {token}",
                path.display(),
                line_no + 1
            );
        };
        expected.push(event);
    }
    Ok(expected)
}

/// Feeds the trace tick by tick. Ticks missing between samples are replayed
/// as empty reads, then `tail_ticks` more empty reads flush pending gestures.
pub fn replay(samples: &[TraceSample], delays: GestureDelays, tail_ticks: u64) -> Vec<ReplayedEvent> {
    let mut engine = GestureEngine::new(delays);
    let mut events = Vec::new();
    let mut tick = samples.first().map_or(0, |s| s.tick);

    let mut step = |tick: u64, input: Option<RawTouchSample>| {
        let output = engine.step(input);
        events.extend(output.iter().map(|event| ReplayedEvent { tick, event }));
    };

    for sample in samples {
        while tick < sample.tick {
            step(tick, None);
            tick += 1;
        }
        step(tick, sample.input);
        tick += 1;
    }
    for _ in 0..tail_ticks {
        step(tick, None);
        tick += 1;
    }
    events
}

pub fn matches_expected(events: &[ReplayedEvent], expected: &[ExpectedEvent]) -> bool {
    events.len() == expected.len()
        && events
            .iter()
            .zip(expected)
            .all(|(actual, want)| want.matches(actual.event))
}
