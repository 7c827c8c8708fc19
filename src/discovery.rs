//! Turns the bridge's list of lights into switch configurations.
//!
//! Every light gets a brightness switch. Color-capable lights also get one
//! switch per RGB channel, and a single mode switch covers all of them.

use serde::Serialize;

use crate::channel::Channel;
use crate::config::{BridgeConfig, ColorConfig, LightConfig, ModeConfig};
use crate::fixture::{ColorMode, FixtureId};

pub const MODE_SWITCH_NAME: &str = "hue-mode";

#[derive(Clone, Debug, PartialEq)]
pub struct FixtureInfo {
    pub id: FixtureId,
    pub name: String,
    pub color_mode: Option<ColorMode>,
}

/// Anything that can list the lights paired with a bridge.
pub trait FixtureDirectory {
    fn fixtures(&self) -> anyhow::Result<Vec<FixtureInfo>>;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "kebab-case")]
pub enum SwitchConfig {
    LightBrightness { name: String, attributes: LightConfig },
    LightColor { name: String, attributes: ColorConfig },
    LightsMode { name: String, attributes: ModeConfig },
}

impl SwitchConfig {
    pub fn name(&self) -> &str {
        match self {
            SwitchConfig::LightBrightness { name, .. } => name,
            SwitchConfig::LightColor { name, .. } => name,
            SwitchConfig::LightsMode { name, .. } => name,
        }
    }
}

/// Replaces each run of characters outside `[A-Za-z0-9_-]` with one '-',
/// collapses repeated '-' and trims them from both ends.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            c
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    return out.trim_matches('-').to_string();
}

pub fn plan(bridge: &BridgeConfig, fixtures: &[FixtureInfo]) -> Vec<SwitchConfig> {
    let mut configs = Vec::new();
    let mut color_ids = Vec::new();

    for fixture in fixtures {
        log::debug!(
            "discovered light {} {:?} colormode {:?}",
            fixture.id,
            fixture.name,
            fixture.color_mode
        );
        let name = sanitize_name(&fixture.name);
        let light = LightConfig {
            bridge: bridge.clone(),
            light_id: fixture.id,
        };

        configs.push(SwitchConfig::LightBrightness {
            name: name.clone(),
            attributes: light.clone(),
        });

        let supports_color = fixture.color_mode.map_or(false, |m| m.supports_color());
        if !supports_color {
            continue;
        }
        color_ids.push(fixture.id);
        for channel in Channel::ALL {
            configs.push(SwitchConfig::LightColor {
                name: format!("{}-{}", name, channel),
                attributes: ColorConfig {
                    light: light.clone(),
                    channel: channel.to_string(),
                },
            });
        }
    }

    if !color_ids.is_empty() {
        let mut mode = ModeConfig {
            bridge: bridge.clone(),
            ..ModeConfig::default()
        };
        mode.cycle.insert("all".to_string(), color_ids);
        configs.push(SwitchConfig::LightsMode {
            name: MODE_SWITCH_NAME.to_string(),
            attributes: mode,
        });
    }

    return configs;
}

pub fn discover<D: FixtureDirectory + ?Sized>(
    bridge: &BridgeConfig,
    directory: &D,
) -> anyhow::Result<Vec<SwitchConfig>> {
    let fixtures = directory.fixtures()?;
    return Ok(plan(bridge, &fixtures));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(id: FixtureId, name: &str, color_mode: Option<ColorMode>) -> FixtureInfo {
        return FixtureInfo {
            id,
            name: name.to_string(),
            color_mode,
        };
    }

    fn bridge() -> BridgeConfig {
        return BridgeConfig {
            bridge_host: Some("192.168.1.20".to_string()),
            username: "key".to_string(),
        };
    }

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_name("Living room lamp"), "Living-room-lamp");
        assert_eq!(sanitize_name("  Hue (go) #2 "), "Hue-go-2");
        assert_eq!(sanitize_name("desk--lamp_1"), "desk-lamp_1");
        assert_eq!(sanitize_name("Küche"), "K-che");
        assert_eq!(sanitize_name("***"), "");
    }

    #[test]
    fn white_lights_only_get_brightness() {
        let configs = plan(&bridge(), &[info(4, "Hall", Some(ColorMode::ColorTemperature))]);
        assert_eq!(configs.len(), 1);
        assert!(matches!(
            &configs[0],
            SwitchConfig::LightBrightness { attributes, .. } if attributes.light_id == 4
        ));
    }

    #[test]
    fn color_lights_get_channels_and_mode() {
        let fixtures = [
            info(1, "Desk lamp", Some(ColorMode::Chromaticity)),
            info(2, "Hall", None),
            info(3, "Strip", Some(ColorMode::HueSaturation)),
        ];
        let configs = plan(&bridge(), &fixtures);
        let names: Vec<&str> = configs.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "Desk-lamp",
                "Desk-lamp-red",
                "Desk-lamp-green",
                "Desk-lamp-blue",
                "Hall",
                "Strip",
                "Strip-red",
                "Strip-green",
                "Strip-blue",
                "hue-mode",
            ]
        );
        match configs.last().unwrap() {
            SwitchConfig::LightsMode { attributes, .. } => {
                assert_eq!(attributes.cycle["all"], vec![1, 3]);
                assert_eq!(attributes.bridge, bridge());
            }
            other => panic!("expected mode switch, got {:?}", other),
        }
    }

    #[test]
    fn plan_serializes_with_model_tag() {
        let configs = plan(&bridge(), &[info(9, "Lamp", Some(ColorMode::Chromaticity))]);
        let json = serde_json::to_value(&configs[1]).unwrap();
        assert_eq!(json["model"], "light-color");
        assert_eq!(json["attributes"]["channel"], "red");
        assert_eq!(json["attributes"]["light_id"], 9);
        assert_eq!(json["attributes"]["username"], "key");
    }
}
