use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::fixture::{
    read_fixture, write_fixture, Bridge, FixtureId, PartialState, Switch, MAX_BRIGHTNESS,
};

const MAX_POSITION: u32 = 100;

/// On/off and brightness of one fixture.
///
/// Position 0 is off, 1 is on at the last brightness set through this switch,
/// and 2-100 map linearly onto brightness codes 1-254.
pub struct BrightnessSwitch<B> {
    bridge: Arc<B>,
    id: FixtureId,

    // Remember the last brightness picked through positions 2-100
    // so position 1 can turn the light back on at that level.
    last_brightness: Mutex<u8>,
}

impl<B: Bridge> BrightnessSwitch<B> {
    /// Reads the fixture once to seed the remembered brightness.
    pub fn new(bridge: Arc<B>, id: FixtureId) -> Result<BrightnessSwitch<B>> {
        let state = read_fixture(&*bridge, id)?;
        let last = if state.brightness == 0 {
            MAX_BRIGHTNESS
        } else {
            state.brightness
        };
        return Ok(BrightnessSwitch {
            bridge,
            id,
            last_brightness: Mutex::new(last),
        });
    }

    pub fn last_brightness(&self) -> Result<u8> {
        let last = self.last_brightness.lock().map_err(|_| Error::Poisoned)?;
        return Ok(*last);
    }
}

fn position_to_brightness(position: u32) -> u8 {
    let scaled = (f64::from(position - 2) / 98.0 * 253.0).round() as u8;
    return scaled.max(1);
}

fn brightness_to_position(brightness: u8) -> u32 {
    let position = (f64::from(brightness) / 253.0 * 98.0).round() as u32 + 2;
    return position.min(MAX_POSITION);
}

impl<B: Bridge> Switch for BrightnessSwitch<B> {
    fn set_position(&self, position: u32) -> Result<()> {
        if position > MAX_POSITION {
            return Err(Error::InvalidPosition {
                position,
                max: MAX_POSITION,
            });
        }

        let write = match position {
            0 => PartialState::default().power(false),
            1 => PartialState::default()
                .power(true)
                .brightness(self.last_brightness()?),
            _ => {
                let brightness = position_to_brightness(position);
                let mut last = self.last_brightness.lock().map_err(|_| Error::Poisoned)?;
                *last = brightness;
                PartialState::default().power(true).brightness(brightness)
            }
        };
        return write_fixture(&*self.bridge, self.id, &write, "set brightness of");
    }

    fn position(&self) -> Result<u32> {
        let state = read_fixture(&*self.bridge, self.id)?;
        if !state.on {
            return Ok(0);
        }
        if state.brightness >= MAX_BRIGHTNESS {
            return Ok(1);
        }
        return Ok(brightness_to_position(state.brightness));
    }

    fn number_of_positions(&self) -> (u32, Vec<&'static str>) {
        return (MAX_POSITION + 1, Vec::new());
    }
}
