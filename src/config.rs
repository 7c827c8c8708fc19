use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::brightness::BrightnessSwitch;
use crate::channel::{Channel, ChannelSwitch};
use crate::error::{Error, Result};
use crate::fixture::{Bridge, FixtureId};
use crate::mode::ModeController;

/// Shared by every switch config: where the bridge is and how to authenticate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Discovered on the network when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_host: Option<String>,
    pub username: String,
}

/// A brightness switch for one light.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    #[serde(flatten)]
    pub bridge: BridgeConfig,
    pub light_id: FixtureId,
}

/// One RGB channel of one light.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorConfig {
    #[serde(flatten)]
    pub light: LightConfig,
    /// "red", "green", or "blue".
    pub channel: String,
}

/// The mode switch. Lights in one cycle group stay in sync with each other.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeConfig {
    #[serde(flatten)]
    pub bridge: BridgeConfig,
    #[serde(default, alias = "dance", skip_serializing_if = "BTreeMap::is_empty")]
    pub cycle: BTreeMap<String, Vec<FixtureId>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub daylight: Vec<FixtureId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warm: Vec<FixtureId>,
}

pub trait Config: DeserializeOwned {
    fn validate(&self) -> Result<()>;

    /// Parses and validates.
    fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        return Ok(config);
    }

    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("cannot read {}: {}", path.display(), e)))?;
        return Self::from_json(&json);
    }
}

impl Config for BridgeConfig {
    fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(Error::InvalidConfig(
                "need a username (API key) for the Hue bridge".to_string(),
            ));
        }
        return Ok(());
    }
}

impl Config for LightConfig {
    fn validate(&self) -> Result<()> {
        self.bridge.validate()?;
        if self.light_id == 0 {
            return Err(Error::InvalidConfig("need a light_id".to_string()));
        }
        return Ok(());
    }
}

impl Config for ColorConfig {
    fn validate(&self) -> Result<()> {
        self.light.validate()?;
        Channel::from_string(&self.channel)?;
        return Ok(());
    }
}

impl Config for ModeConfig {
    fn validate(&self) -> Result<()> {
        self.bridge.validate()?;
        let ids = self
            .cycle
            .values()
            .flatten()
            .chain(self.daylight.iter())
            .chain(self.warm.iter());
        for id in ids {
            if *id == 0 {
                return Err(Error::InvalidConfig("light ids must be positive".to_string()));
            }
        }
        return Ok(());
    }
}

impl LightConfig {
    pub fn build<B: Bridge>(&self, bridge: Arc<B>) -> Result<BrightnessSwitch<B>> {
        self.validate()?;
        return BrightnessSwitch::new(bridge, self.light_id);
    }
}

impl ColorConfig {
    pub fn build<B: Bridge>(&self, bridge: Arc<B>) -> Result<ChannelSwitch<B>> {
        self.validate()?;
        let channel = Channel::from_string(&self.channel)?;
        return Ok(ChannelSwitch::new(bridge, self.light.light_id, channel));
    }
}

impl ModeConfig {
    pub fn build<B: Bridge>(&self, bridge: Arc<B>) -> Result<ModeController<B>> {
        self.validate()?;
        return Ok(ModeController::new(
            bridge,
            self.cycle.clone(),
            self.daylight.clone(),
            self.warm.clone(),
        ));
    }
}
