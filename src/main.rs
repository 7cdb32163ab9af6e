use std::{
    ffi::CString,
    path::{Path, PathBuf},
    sync::{atomic::AtomicBool, Arc},
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Builder as LogBuilder;
use hidapi::HidApi;
use log::LevelFilter;
use muteme::{
    config::{load_config, validate_config, ButtonConfig},
    device::{list_connected, HidTouchDevice},
    recorder::EventRecorder,
    status_light, Button, Color, DisplayState, Effect, TouchDevice,
};

const DEFAULT_CONFIG_PATH: &str = "config/muteme.toml";

#[derive(Debug, Parser)]
#[command(name = "muteme")]
#[command(about = "MuteMe touch button driver")]
struct Cli {
    /// Overrides RUST_LOG.
    #[arg(long = "log-level", global = true)]
    log_level: Option<LevelFilter>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Run(RunArgs),
    List,
    SetLight(SetLightArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long = "long-tap-delay")]
    long_tap_delay: Option<u16>,
    #[arg(long = "multi-tap-delay")]
    multi_tap_delay: Option<u16>,
    #[arg(long = "tick-ms")]
    tick_ms: Option<u64>,
    #[arg(long = "events-json")]
    events_json: Option<PathBuf>,
    #[arg(long, default_value = "green")]
    color: Color,
    /// hidraw path, as printed by `muteme list`.
    #[arg(long)]
    path: Option<String>,
}

#[derive(Debug, Args)]
struct SetLightArgs {
    #[arg(long)]
    color: Color,
    #[arg(long, default_value = "none")]
    effect: Effect,
    #[arg(long)]
    path: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);
    if let Err(err) = run(cli) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn init_logging(level: Option<LevelFilter>) {
    let mut builder = LogBuilder::from_default_env();
    if let Some(level) = level {
        builder.filter_level(level);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Info);
    }
    builder.init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run_button(args),
        Commands::List => list_devices(),
        Commands::SetLight(args) => set_light(args),
    }
}

fn run_button(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let api = HidApi::new().context("failed to initialise hidapi")?;
    let device = open_device(&api, &config, args.path.as_deref())?;

    let mut button = Button::new(device, &config);
    if let Some(path) = &args.events_json {
        let recorder = EventRecorder::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        button = button.with_recorder(recorder);
    }
    status_light::install(&mut button, args.color).context("failed to set initial colour")?;

    let stop = install_stop_flag()?;
    let result = button.run(&stop);
    log::warn!("shutting down");
    let closed = button.close();

    result.context("button loop failed")?;
    closed.context("failed to turn the light off")?;
    Ok(())
}

fn resolve_config(args: &RunArgs) -> Result<ButtonConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_config(Path::new(DEFAULT_CONFIG_PATH))?
        }
        None => ButtonConfig::default(),
    };

    if let Some(ticks) = args.long_tap_delay {
        config.gesture.long_tap_delay_ticks = ticks;
    }
    if let Some(ticks) = args.multi_tap_delay {
        config.gesture.multi_tap_delay_ticks = ticks;
    }
    if let Some(ms) = args.tick_ms {
        config.polling.tick_interval_ms = ms;
    }
    validate_config(&config).context("invalid command line override")?;
    Ok(config)
}

fn open_device(api: &HidApi, config: &ButtonConfig, path: Option<&str>) -> Result<HidTouchDevice> {
    match path {
        Some(path) => {
            let c_path = CString::new(path).context("device path contains a NUL byte")?;
            HidTouchDevice::open_path(api, &c_path)
                .with_context(|| format!("failed to open {path}"))
        }
        None => HidTouchDevice::open(api, &config.device_candidates())
            .context("failed to open a MuteMe device"),
    }
}

#[cfg(unix)]
fn install_stop_flag() -> Result<Arc<AtomicBool>> {
    use signal_hook::consts::{SIGINT, SIGTERM};

    let stop = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&stop))
            .with_context(|| format!("failed to register handler for signal {signal}"))?;
    }
    Ok(stop)
}

#[cfg(not(unix))]
fn install_stop_flag() -> Result<Arc<AtomicBool>> {
    Ok(Arc::new(AtomicBool::new(false)))
}

fn list_devices() -> Result<()> {
    let api = HidApi::new().context("failed to initialise hidapi")?;
    let devices = list_connected(&api);
    if devices.is_empty() {
        println!("no MuteMe devices found");
        return Ok(());
    }
    for device in devices {
        println!(
            "{}\t{:04x}:{:04x}\t{}\t{}",
            device.model.name,
            device.model.vendor_id,
            device.model.product_id,
            device.path,
            device.serial_number.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

fn set_light(args: SetLightArgs) -> Result<()> {
    let api = HidApi::new().context("failed to initialise hidapi")?;
    let mut device = open_device(&api, &ButtonConfig::default(), args.path.as_deref())?;
    let display = DisplayState::new(args.color, args.effect);
    device
        .set_display(display)
        .with_context(|| format!("failed to set light to {} / {}", args.color, args.effect))?;
    println!("light set to {} / {}", args.color, args.effect);
    device.detach();
    Ok(())
}
