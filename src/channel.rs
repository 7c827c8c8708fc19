use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::{self, Rgb};
use crate::error::{Error, Result};
use crate::fixture::{
    read_fixture, write_fixture, Bridge, FixtureId, PartialState, Switch, MAX_BRIGHTNESS,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    pub fn from_string(s: &str) -> Result<Channel> {
        match s {
            "red" => Ok(Channel::Red),
            "green" => Ok(Channel::Green),
            "blue" => Ok(Channel::Blue),
            _ => Err(Error::UnknownChannel(s.to_string())),
        }
    }

    pub fn get(&self, rgb: Rgb) -> u8 {
        match self {
            Channel::Red => rgb.red,
            Channel::Green => rgb.green,
            Channel::Blue => rgb.blue,
        }
    }

    pub fn set(&self, rgb: &mut Rgb, value: u8) {
        match self {
            Channel::Red => rgb.red = value,
            Channel::Green => rgb.green = value,
            Channel::Blue => rgb.blue = value,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Channel::Red => write!(f, "red"),
            Channel::Green => write!(f, "green"),
            Channel::Blue => write!(f, "blue"),
        }
    }
}

/// One RGB channel of one fixture, as a 0-255 switch.
///
/// Every call reads the fixture's live color, so changes made elsewhere are
/// picked up. Two switches on different channels of the same fixture each do
/// an unsynchronized read-modify-write; callers driving them concurrently must
/// serialize per fixture or one update can be lost.
pub struct ChannelSwitch<B> {
    bridge: Arc<B>,
    id: FixtureId,
    channel: Channel,
}

impl<B: Bridge> ChannelSwitch<B> {
    pub fn new(bridge: Arc<B>, id: FixtureId, channel: Channel) -> ChannelSwitch<B> {
        return ChannelSwitch {
            bridge,
            id,
            channel,
        };
    }

    pub fn channel(&self) -> Channel {
        return self.channel;
    }

    /// The fixture's current color. A fixture that is off reads as black.
    fn current_color(&self) -> Result<Rgb> {
        let state = read_fixture(&*self.bridge, self.id)?;
        if !state.on {
            return Ok(Rgb::BLACK);
        }
        return Ok(color::from_device_state(state.xy, state.brightness));
    }
}

impl<B: Bridge> Switch for ChannelSwitch<B> {
    fn set_position(&self, position: u32) -> Result<()> {
        if position > 255 {
            return Err(Error::InvalidPosition { position, max: 255 });
        }

        let mut rgb = self.current_color()?;
        self.channel.set(&mut rgb, position as u8);

        if rgb.is_black() {
            return write_fixture(
                &*self.bridge,
                self.id,
                &PartialState::default().power(false),
                "turn off",
            );
        }
        let device = color::to_device_state(rgb);
        let write = PartialState::default()
            .power(true)
            .xy(device.xy[0], device.xy[1])
            .brightness(device.brightness.min(MAX_BRIGHTNESS));
        return write_fixture(&*self.bridge, self.id, &write, "set color of");
    }

    fn position(&self) -> Result<u32> {
        let rgb = self.current_color()?;
        return Ok(u32::from(self.channel.get(rgb)));
    }

    fn number_of_positions(&self) -> (u32, Vec<&'static str>) {
        return (256, Vec::new());
    }
}
