use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::fixture::{
    read_fixture, write_fixture, Bridge, ColorMode, Effect, FixtureId, FixtureState, PartialState,
    Switch, MAX_BRIGHTNESS,
};
use crate::offset::{self, MIN_HUE};

const CYCLE_SATURATION: u8 = 254;

// 400ms, so preset changes fade instead of jumping.
const PRESET_TRANSITION: u16 = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    None,
    Cycle,
    Daylight,
    Warm,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::None, Mode::Cycle, Mode::Daylight, Mode::Warm];

    pub fn from_position(position: u32) -> Result<Mode> {
        return Mode::ALL
            .get(position as usize)
            .copied()
            .ok_or(Error::InvalidPosition {
                position,
                max: Mode::ALL.len() as u32 - 1,
            });
    }

    pub fn from_string(s: &str) -> Result<Mode> {
        match s {
            "none" => Ok(Mode::None),
            "cycle" | "dance" => Ok(Mode::Cycle),
            "daylight" => Ok(Mode::Daylight),
            "warm" => Ok(Mode::Warm),
            _ => Err(Error::UnknownMode(s.to_string())),
        }
    }

    pub fn position(&self) -> u32 {
        match self {
            Mode::None => 0,
            Mode::Cycle => 1,
            Mode::Daylight => 2,
            Mode::Warm => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::None => "none",
            Mode::Cycle => "cycle",
            Mode::Daylight => "daylight",
            Mode::Warm => "warm",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A fixed white preset.
struct Preset {
    brightness: u8,
    mireds: u16,
}

// ~6500K
const DAYLIGHT: Preset = Preset {
    brightness: MAX_BRIGHTNESS,
    mireds: 153,
};

// ~2700K
const WARM: Preset = Preset {
    brightness: 200,
    mireds: 370,
};

/// The color fields that were in effect when a fixture was saved.
#[derive(Clone, Debug, PartialEq)]
pub enum SavedColor {
    Temperature { mireds: u16 },
    Chromaticity { xy: [f64; 2] },
    HueSaturation { hue: u16, saturation: u8 },
    /// The bridge reported no color mode; only power and brightness are restored.
    Unknown,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SavedState {
    pub on: bool,
    pub brightness: u8,
    pub color: SavedColor,
}

impl From<&FixtureState> for SavedState {
    fn from(state: &FixtureState) -> SavedState {
        let color = match (state.color_mode, state.xy) {
            (Some(ColorMode::ColorTemperature), _) => SavedColor::Temperature {
                mireds: state.mireds,
            },
            (Some(ColorMode::Chromaticity), Some(xy)) => SavedColor::Chromaticity { xy },
            (Some(ColorMode::HueSaturation), _) => SavedColor::HueSaturation {
                hue: state.hue,
                saturation: state.saturation,
            },
            _ => SavedColor::Unknown,
        };
        return SavedState {
            on: state.on,
            brightness: state.brightness,
            color,
        };
    }
}

impl SavedState {
    /// The write that puts a fixture back into this state once its effect is stopped.
    ///
    /// Zero brightness, hue or saturation would be dropped on the wire and leave
    /// the mode's value in place, so they are sent as 1 instead.
    pub fn restore_write(&self) -> PartialState {
        let write = PartialState::default()
            .power(self.on)
            .brightness(self.brightness.max(1));
        match self.color {
            SavedColor::Temperature { mireds } => write.mireds(mireds),
            SavedColor::Chromaticity { xy } => write.xy(xy[0], xy[1]),
            SavedColor::HueSaturation { hue, saturation } => {
                write.hue(hue.max(MIN_HUE)).saturation(saturation.max(1))
            }
            SavedColor::Unknown => write,
        }
    }
}

/// Pre-mode state of every fixture a mode touched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    states: BTreeMap<FixtureId, SavedState>,
}

impl Snapshot {
    /// Reads each fixture from the bridge. Fails on the first unreadable fixture.
    pub fn capture<B: Bridge + ?Sized>(bridge: &B, ids: &[FixtureId]) -> Result<Snapshot> {
        let mut states = BTreeMap::new();
        for id in ids {
            let state = read_fixture(bridge, *id)?;
            states.insert(*id, SavedState::from(&state));
        }
        return Ok(Snapshot { states });
    }

    pub fn get(&self, id: FixtureId) -> Option<&SavedState> {
        return self.states.get(&id);
    }

    pub fn ids(&self) -> Vec<FixtureId> {
        return self.states.keys().copied().collect();
    }

    pub fn len(&self) -> usize {
        return self.states.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.states.is_empty();
    }
}

struct ModeState {
    mode: Mode,
    snapshot: Snapshot,
}

/// Switches a set of fixtures between synchronized modes.
///
/// Entering a mode saves the state of every fixture it touches; returning to
/// `Mode::None` puts them all back. Only the most recent save is kept.
pub struct ModeController<B> {
    bridge: Arc<B>,
    cycle_groups: BTreeMap<String, Vec<FixtureId>>,
    daylight: Vec<FixtureId>,
    warm: Vec<FixtureId>,

    // Held for the whole of a transition, so two callers cannot interleave
    // their snapshot and activation writes.
    state: Mutex<ModeState>,
}

impl<B: Bridge> ModeController<B> {
    pub fn new(
        bridge: Arc<B>,
        cycle_groups: BTreeMap<String, Vec<FixtureId>>,
        daylight: Vec<FixtureId>,
        warm: Vec<FixtureId>,
    ) -> ModeController<B> {
        return ModeController {
            bridge,
            cycle_groups,
            daylight,
            warm,
            state: Mutex::new(ModeState {
                mode: Mode::None,
                snapshot: Snapshot::default(),
            }),
        };
    }

    pub fn mode(&self) -> Result<Mode> {
        let state = self.state.lock().map_err(|_| Error::Poisoned)?;
        return Ok(state.mode);
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        let state = self.state.lock().map_err(|_| Error::Poisoned)?;
        return Ok(state.snapshot.clone());
    }

    pub fn set_mode(&self, mode: Mode) -> Result<()> {
        let mut state = self.state.lock().map_err(|_| Error::Poisoned)?;

        if mode == Mode::None {
            let result = self.restore(&state.snapshot);
            state.snapshot = Snapshot::default();
            state.mode = Mode::None;
            log::info!("lights restored, mode is now none");
            return result;
        }

        state.snapshot = Snapshot::capture(&*self.bridge, &self.fixtures_for(mode))?;
        match mode {
            Mode::None => (),
            Mode::Cycle => self.activate_cycle()?,
            Mode::Daylight => self.activate_preset(&self.daylight, &DAYLIGHT)?,
            Mode::Warm => self.activate_preset(&self.warm, &WARM)?,
        }
        state.mode = mode;
        log::info!("mode is now {} ({} lights saved)", mode, state.snapshot.len());
        return Ok(());
    }

    /// The fixtures a mode touches. Cycle groups are flattened in name order.
    fn fixtures_for(&self, mode: Mode) -> Vec<FixtureId> {
        match mode {
            Mode::None => Vec::new(),
            Mode::Cycle => self.cycle_groups.values().flatten().copied().collect(),
            Mode::Daylight => self.daylight.clone(),
            Mode::Warm => self.warm.clone(),
        }
    }

    // The seed and the effect start must be separate writes: when sent
    // together the bridge may start the loop before taking the hue, and every
    // group ends up starting from the same color.
    fn activate_cycle(&self) -> Result<()> {
        let offsets = offset::group_offsets(self.cycle_groups.keys().map(String::as_str));
        for (name, hue) in offsets {
            log::debug!("cycle group {:?} starts at hue {}", name, hue);
            for id in &self.cycle_groups[name] {
                let seed = PartialState::default()
                    .power(true)
                    .hue(hue)
                    .saturation(CYCLE_SATURATION)
                    .effect(Effect::None);
                write_fixture(&*self.bridge, *id, &seed, "seed hue on")?;

                let start = PartialState::default().power(true).effect(Effect::ColorLoop);
                write_fixture(&*self.bridge, *id, &start, "start color loop on")?;
            }
        }
        return Ok(());
    }

    fn activate_preset(&self, ids: &[FixtureId], preset: &Preset) -> Result<()> {
        let write = PartialState::default()
            .power(true)
            .brightness(preset.brightness)
            .mireds(preset.mireds)
            .effect(Effect::None)
            .transition_time(PRESET_TRANSITION);
        for id in ids {
            write_fixture(&*self.bridge, *id, &write, "set white preset on")?;
        }
        return Ok(());
    }

    /// Best effort: every saved fixture is attempted, the first failure is returned.
    fn restore(&self, snapshot: &Snapshot) -> Result<()> {
        let mut failed = Vec::new();
        let mut first_error = None;
        for (id, saved) in &snapshot.states {
            if let Err(e) = self.restore_fixture(*id, saved) {
                log::warn!("{}", e.report());
                failed.push(*id);
                first_error.get_or_insert(e);
            }
        }
        return match first_error {
            Some(source) => Err(Error::PartialRestore {
                failed,
                source: Box::new(source),
            }),
            None => Ok(()),
        };
    }

    fn restore_fixture(&self, id: FixtureId, saved: &SavedState) -> Result<()> {
        // The bridge refuses effect changes on lights that are off, so the light
        // is turned on here and the real on/off comes back with the saved fields.
        let stop = PartialState::default().power(true).effect(Effect::None);
        write_fixture(&*self.bridge, id, &stop, "stop effect on")?;
        return write_fixture(&*self.bridge, id, &saved.restore_write(), "restore");
    }
}

impl<B: Bridge> Switch for ModeController<B> {
    fn set_position(&self, position: u32) -> Result<()> {
        return self.set_mode(Mode::from_position(position)?);
    }

    fn position(&self) -> Result<u32> {
        return Ok(self.mode()?.position());
    }

    fn number_of_positions(&self) -> (u32, Vec<&'static str>) {
        let names: Vec<&'static str> = Mode::ALL.iter().map(|m| m.name()).collect();
        return (names.len() as u32, names);
    }
}
