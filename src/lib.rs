// High-level overview:
//
// Protocol:                  http/json (external)          Switch trait
// Library Concept:   fixture <--------------------> bridge <------------> switches <------------> host / user
//
// Implementing Module:                         fixture::Bridge          channel, brightness,    hue-shell
//                                              sim (for testing)        mode

pub mod args;
pub mod brightness;
pub mod channel;
pub mod color;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fixture;
pub mod mode;
pub mod offset;
pub mod sim;

pub use brightness::BrightnessSwitch;
pub use channel::{Channel, ChannelSwitch};
pub use error::{Error, Result};
pub use fixture::*;
pub use mode::{Mode, ModeController};
