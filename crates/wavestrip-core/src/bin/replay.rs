//! wavestrip-replay - run a scripted input sequence headlessly
//!
//! Usage:
//!   wavestrip-replay <script.yaml> [--config <config.yaml>]
//!
//! `--config` overrides the script's inline configuration. Set
//! `RUST_LOG=debug` to see every viewport notification.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use wavestrip_core::config::{load_config, EngineConfig};
use wavestrip_core::replay::{load_script, run};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut script_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().context("--config needs a path")?;
                config_path = Some(PathBuf::from(value));
            }
            "-h" | "--help" => {
                println!("Usage: wavestrip-replay <script.yaml> [--config <config.yaml>]");
                return Ok(());
            }
            other if script_path.is_none() => script_path = Some(PathBuf::from(other)),
            other => bail!("Unexpected argument: {}", other),
        }
    }

    let Some(script_path) = script_path else {
        bail!("Usage: wavestrip-replay <script.yaml> [--config <config.yaml>]");
    };

    let mut script = load_script(&script_path)
        .with_context(|| format!("Failed to load replay script {:?}", script_path))?;

    if let Some(path) = config_path {
        let config: EngineConfig = load_config(&path);
        script.config = Some(config);
    }

    let report = run(&script);
    log::info!(
        "Replay finished: {} notifications, {} settled",
        report.notifications,
        report.settled
    );

    let yaml = serde_yaml::to_string(&report).context("Failed to serialize replay report")?;
    print!("{}", yaml);
    Ok(())
}
