use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque handle the bridge assigns to each light.
pub type FixtureId = u32;

/// Highest brightness code a fixture accepts.
pub const MAX_BRIGHTNESS: u8 = 254;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    None,
    ColorLoop,
}

impl Default for Effect {
    fn default() -> Effect {
        return Effect::None;
    }
}

impl Effect {
    pub fn from_string(s: &str) -> Result<Effect> {
        match s {
            "none" => Ok(Effect::None),
            "colorloop" => Ok(Effect::ColorLoop),
            _ => Err(Error::UnknownEffect(s.to_string())),
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Effect::None => write!(f, "none"),
            Effect::ColorLoop => write!(f, "colorloop"),
        }
    }
}

/// Which of the color fields the fixture is currently honoring.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    #[serde(rename = "ct")]
    ColorTemperature,
    #[serde(rename = "xy")]
    Chromaticity,
    #[serde(rename = "hs")]
    HueSaturation,
}

impl ColorMode {
    /// Modes in which the fixture accepts colored (non-white) output.
    pub fn supports_color(&self) -> bool {
        return matches!(self, ColorMode::Chromaticity | ColorMode::HueSaturation);
    }
}

/// Full state of one fixture as reported by the bridge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureState {
    pub on: bool,
    #[serde(rename = "bri", default)]
    pub brightness: u8,
    #[serde(default)]
    pub hue: u16,
    #[serde(rename = "sat", default)]
    pub saturation: u8,
    #[serde(default)]
    pub xy: Option<[f64; 2]>,
    #[serde(rename = "ct", default)]
    pub mireds: u16,
    #[serde(default)]
    pub effect: Effect,
    #[serde(rename = "colormode", default)]
    pub color_mode: Option<ColorMode>,
}

/// A sparse write. Fields left as `None` are not touched on the device.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(rename = "bri", skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xy: Option<[f64; 2]>,
    #[serde(rename = "ct", skip_serializing_if = "Option::is_none")]
    pub mireds: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,
    #[serde(rename = "sat", skip_serializing_if = "Option::is_none")]
    pub saturation: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
    /// In multiples of 100ms.
    #[serde(rename = "transitiontime", skip_serializing_if = "Option::is_none")]
    pub transition_time: Option<u16>,
}

// Convenience functions to build up a write.
impl PartialState {
    pub fn power(mut self, on: bool) -> PartialState {
        self.on = Some(on);
        return self;
    }

    pub fn brightness(mut self, brightness: u8) -> PartialState {
        self.brightness = Some(brightness);
        return self;
    }

    pub fn xy(mut self, x: f64, y: f64) -> PartialState {
        self.xy = Some([x, y]);
        return self;
    }

    pub fn mireds(mut self, mireds: u16) -> PartialState {
        self.mireds = Some(mireds);
        return self;
    }

    pub fn hue(mut self, hue: u16) -> PartialState {
        self.hue = Some(hue);
        return self;
    }

    pub fn saturation(mut self, saturation: u8) -> PartialState {
        self.saturation = Some(saturation);
        return self;
    }

    pub fn effect(mut self, effect: Effect) -> PartialState {
        self.effect = Some(effect);
        return self;
    }

    pub fn transition_time(mut self, deciseconds: u16) -> PartialState {
        self.transition_time = Some(deciseconds);
        return self;
    }
}

/// Read/write access to the lights paired with one bridge.
/// Transport (HTTP, auth, discovery) lives behind this trait.
pub trait Bridge: Send + Sync {
    fn fixture(&self, id: FixtureId) -> anyhow::Result<FixtureState>;

    fn set_fixture_state(&self, id: FixtureId, state: &PartialState) -> anyhow::Result<()>;
}

/// The capability exposed to the host: a multi-position switch.
pub trait Switch {
    fn set_position(&self, position: u32) -> Result<()>;

    fn position(&self) -> Result<u32>;

    /// Number of positions and, where positions have names, their labels.
    fn number_of_positions(&self) -> (u32, Vec<&'static str>);
}

pub(crate) fn read_fixture<B: Bridge + ?Sized>(bridge: &B, id: FixtureId) -> Result<FixtureState> {
    return bridge
        .fixture(id)
        .map_err(|e| Error::device(id, "get state of", e));
}

pub(crate) fn write_fixture<B: Bridge + ?Sized>(
    bridge: &B,
    id: FixtureId,
    state: &PartialState,
    action: &'static str,
) -> Result<()> {
    log::debug!("light {}: {} {:?}", id, action, state);
    return bridge
        .set_fixture_state(id, state)
        .map_err(|e| Error::device(id, action, e));
}
