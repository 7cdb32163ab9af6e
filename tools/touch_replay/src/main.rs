use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use muteme::{
    gesture::{DEFAULT_LONG_TAP_DELAY_TICKS, DEFAULT_MULTI_TAP_DELAY_TICKS},
    GestureDelays,
};
use touch_replay::{matches_expected, parse_expected_kinds, parse_trace, replay};

#[derive(Debug, Parser)]
#[command(name = "touch_replay")]
#[command(about = "Replay a captured touch trace through the gesture decoder")]
struct Cli {
    trace: PathBuf,
    /// File with one expected gesture per line.
    #[arg(long)]
    expect: Option<PathBuf>,
    #[arg(long = "long-tap-delay", default_value_t = DEFAULT_LONG_TAP_DELAY_TICKS)]
    long_tap_delay: u16,
    #[arg(long = "multi-tap-delay", default_value_t = DEFAULT_MULTI_TAP_DELAY_TICKS)]
    multi_tap_delay: u16,
    /// Empty ticks appended after the trace; defaults to enough to close any window.
    #[arg(long = "tail-ticks")]
    tail_ticks: Option<u64>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let delays = GestureDelays {
        long_tap_ticks: cli.long_tap_delay,
        multi_tap_ticks: cli.multi_tap_delay,
    };
    let tail_ticks = cli
        .tail_ticks
        .unwrap_or(u64::from(delays.long_tap_ticks.max(delays.multi_tap_ticks)) + 1);

    let samples = parse_trace(&cli.trace)?;
    let events = replay(&samples, delays, tail_ticks);

    println!("event,tick,kind,count");
    for replayed in &events {
        println!(
            "event,{},{},{}",
            replayed.tick,
            replayed.event.kind().label(),
            replayed.event.count()
        );
    }

    if let Some(expect_path) = cli.expect {
        let expected = parse_expected_kinds(&expect_path)?;
        if !matches_expected(&events, &expected) {
            let actual: Vec<String> = events
                .iter()
                .map(|e| format!("{:?}", e.event))
                .collect();
            let wanted: Vec<String> = expected.iter().map(|e| format!("{e:?}")).collect();
            eprintln!("expected: {}", wanted.join(","));
            eprintln!("actual:   {}", actual.join(","));
            bail!("event sequence mismatch");
        }
    }

    Ok(())
}
