use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use clap::Parser;

use huelight::args::ShellArgs;
use huelight::config::{BridgeConfig, Config, ModeConfig};
use huelight::discovery::{self, FixtureDirectory};
use huelight::sim::SimulatedBridge;
use huelight::{Bridge, BrightnessSwitch, Channel, ChannelSwitch, FixtureId, Mode, Switch};

macro_rules! skip_fail {
    ($res:expr) => {
        match $res {
            Ok(val) => val,
            Err(e) => {
                println!("Invalid value: {}", e);
                continue;
            }
        }
    };
}

const HELP: &str = "Valid commands are: mode=NUM|NAME, brightness:ID=0-100, red:ID=0-255, \
green:ID=0-255, blue:ID=0-255, status=ID, plan=all";

fn default_mode_config(bridge: &SimulatedBridge, username: &str) -> anyhow::Result<ModeConfig> {
    let ids: Vec<FixtureId> = bridge.fixtures()?.iter().map(|f| f.id).collect();
    let mut cycle = BTreeMap::new();
    cycle.insert("all".to_string(), ids.clone());
    return Ok(ModeConfig {
        bridge: BridgeConfig {
            bridge_host: None,
            username: username.to_string(),
        },
        cycle,
        daylight: ids.clone(),
        warm: ids,
    });
}

fn parse_mode(value: &str) -> huelight::Result<Mode> {
    return match value.parse::<u32>() {
        Ok(position) => Mode::from_position(position),
        Err(_) => Mode::from_string(value),
    };
}

fn print_status(bridge: &Arc<SimulatedBridge>, id: FixtureId) -> anyhow::Result<()> {
    let state = bridge.fixture(id)?;
    println!("{}", serde_json::to_string(&state)?);
    let mut rgb = Vec::new();
    for channel in Channel::ALL {
        let position = ChannelSwitch::new(bridge.clone(), id, channel).position()?;
        rgb.push(format!("{}={}", channel, position));
    }
    println!("{}", rgb.join(" "));
    return Ok(());
}

/// A shell for interactive debugging against simulated lights.
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = ShellArgs::parse();
    let json = std::fs::read_to_string(&args.fixtures)?;
    let bridge = Arc::new(SimulatedBridge::from_json(&json)?);
    let mode_config = match &args.mode_config {
        Some(path) => ModeConfig::from_file(path)?,
        None => default_mode_config(&bridge, &args.username)?,
    };
    let modes = mode_config.build(bridge.clone())?;
    // Kept across commands so position 1 remembers the last level.
    let mut dimmers: BTreeMap<FixtureId, BrightnessSwitch<SimulatedBridge>> = BTreeMap::new();

    let mut input = String::new();
    loop {
        print!("hue> ");
        std::io::stdout().flush()?;
        input.clear();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = match line.split_once('=') {
            Some(kv) => kv,
            None => {
                println!("expected input in the form of key=value");
                continue;
            }
        };
        let (command, target) = match key.split_once(':') {
            Some((command, target)) => (command, Some(target)),
            None => (key, None),
        };

        let result = match (command, target) {
            ("help", _) => {
                println!("{}", HELP);
                Ok(())
            }
            ("mode", None) => {
                let mode = skip_fail!(parse_mode(value));
                modes.set_mode(mode).map_err(|e| anyhow::anyhow!(e.report()))
            }
            ("brightness", Some(id)) => {
                let id = skip_fail!(id.parse::<FixtureId>());
                let position = skip_fail!(value.parse::<u32>());
                if !dimmers.contains_key(&id) {
                    let switch = skip_fail!(BrightnessSwitch::new(bridge.clone(), id));
                    dimmers.insert(id, switch);
                }
                match dimmers.get(&id) {
                    Some(switch) => switch
                        .set_position(position)
                        .map_err(|e| anyhow::anyhow!(e.report())),
                    None => Ok(()),
                }
            }
            ("red", Some(id)) | ("green", Some(id)) | ("blue", Some(id)) => {
                let channel = skip_fail!(Channel::from_string(command));
                let id = skip_fail!(id.parse::<FixtureId>());
                let position = skip_fail!(value.parse::<u32>());
                ChannelSwitch::new(bridge.clone(), id, channel)
                    .set_position(position)
                    .map_err(|e| anyhow::anyhow!(e.report()))
            }
            ("status", None) => {
                let id = skip_fail!(value.parse::<FixtureId>());
                println!("mode: {}", skip_fail!(modes.mode()));
                print_status(&bridge, id)
            }
            ("plan", None) => {
                let bridge_config = BridgeConfig {
                    bridge_host: None,
                    username: args.username.clone(),
                };
                let configs = skip_fail!(discovery::discover(&bridge_config, &*bridge));
                println!("{}", serde_json::to_string_pretty(&configs)?);
                Ok(())
            }
            _ => {
                println!("unknown key {}", key);
                continue;
            }
        };
        if let Err(e) = result {
            println!("error: {:#}", e);
        }
    }
    return Ok(());
}
