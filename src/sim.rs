use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, bail};
use serde::Deserialize;

use crate::discovery::{FixtureDirectory, FixtureInfo};
use crate::fixture::{Bridge, ColorMode, FixtureId, FixtureState, PartialState};

// The bridge's JSON encoding leaves these out when they are zero.
const ZERO_OMITTED: [&str; 3] = ["bri", "hue", "sat"];

#[derive(Debug, Default)]
struct SimFixture {
    name: String,
    state: FixtureState,
    fail_reads: bool,
    fail_writes: bool,
    // Number of writes still accepted before the fixture starts failing.
    writes_left: Option<usize>,
}

#[derive(Debug, Default)]
struct Inner {
    fixtures: BTreeMap<FixtureId, SimFixture>,
    writes: Vec<(FixtureId, PartialState)>,
}

#[derive(Deserialize)]
struct FixtureSpec {
    #[serde(default)]
    name: Option<String>,
    state: FixtureState,
}

/// An in-memory bridge that only pretends to talk to lights.
///
/// Writes go through the same JSON encoding the real bridge sees, so zero
/// brightness/hue/saturation values are dropped on the way in. Effect changes
/// on a light that is off are rejected unless the write also turns it on.
///
/// The test helpers (`insert`, `clear_writes`, the `fail_*` switches and `heal`)
/// do nothing once the state lock is poisoned, and `writes` then reports no
/// writes. The `Bridge` methods fail with an error instead.
#[derive(Debug, Default)]
pub struct SimulatedBridge {
    inner: Mutex<Inner>,
}

impl SimulatedBridge {
    pub fn new() -> SimulatedBridge {
        return SimulatedBridge::default();
    }

    /// Loads fixtures from a JSON object keyed by fixture id, e.g.
    /// `{"1": {"name": "Desk", "state": {"on": true, "bri": 200, "colormode": "ct", "ct": 366}}}`.
    pub fn from_json(json: &str) -> anyhow::Result<SimulatedBridge> {
        let specs: BTreeMap<FixtureId, FixtureSpec> = serde_json::from_str(json)?;
        let bridge = SimulatedBridge::new();
        for (id, spec) in specs {
            let name = spec.name.unwrap_or_else(|| format!("light {}", id));
            bridge.insert_named(id, &name, spec.state);
        }
        return Ok(bridge);
    }

    pub fn insert(&self, id: FixtureId, state: FixtureState) {
        self.insert_named(id, &format!("light {}", id), state);
    }

    pub fn insert_named(&self, id: FixtureId, name: &str, state: FixtureState) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fixtures.insert(
                id,
                SimFixture {
                    name: name.to_string(),
                    state,
                    ..SimFixture::default()
                },
            );
        }
    }

    /// Every write that reached a fixture, in arrival order, as decoded from the wire.
    /// Empty if the state lock is poisoned.
    pub fn writes(&self) -> Vec<(FixtureId, PartialState)> {
        return match self.inner.lock() {
            Ok(inner) => inner.writes.clone(),
            Err(_) => Vec::new(),
        };
    }

    pub fn writes_to(&self, id: FixtureId) -> Vec<PartialState> {
        return self
            .writes()
            .into_iter()
            .filter(|(target, _)| *target == id)
            .map(|(_, write)| write)
            .collect();
    }

    pub fn clear_writes(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.writes.clear();
        }
    }

    pub fn fail_reads(&self, id: FixtureId) {
        self.with_fixture(id, |f| f.fail_reads = true);
    }

    pub fn fail_writes(&self, id: FixtureId) {
        self.with_fixture(id, |f| f.fail_writes = true);
    }

    /// Accept `count` more writes to the fixture, then fail the rest.
    pub fn fail_after_writes(&self, id: FixtureId, count: usize) {
        self.with_fixture(id, |f| f.writes_left = Some(count));
    }

    pub fn heal(&self, id: FixtureId) {
        self.with_fixture(id, |f| {
            f.fail_reads = false;
            f.fail_writes = false;
            f.writes_left = None;
        });
    }

    // No-op when the lock is poisoned or the fixture is unknown.
    fn with_fixture<F: FnOnce(&mut SimFixture)>(&self, id: FixtureId, f: F) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(fixture) = inner.fixtures.get_mut(&id) {
                f(fixture);
            }
        }
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Inner>> {
        return self
            .inner
            .lock()
            .map_err(|_| anyhow!("simulated bridge state is poisoned"));
    }
}

/// Round-trips a write through the bridge's JSON encoding.
fn wire_encode(state: &PartialState) -> anyhow::Result<PartialState> {
    let mut value = serde_json::to_value(state)?;
    if let Some(fields) = value.as_object_mut() {
        for key in ZERO_OMITTED {
            if fields.get(key).and_then(|v| v.as_u64()) == Some(0) {
                fields.remove(key);
            }
        }
    }
    return Ok(serde_json::from_value(value)?);
}

fn apply(id: FixtureId, state: &mut FixtureState, write: &PartialState) -> anyhow::Result<()> {
    if write.effect.is_some() && !state.on && write.on != Some(true) {
        bail!("light {} is off, effect cannot be changed", id);
    }
    if let Some(on) = write.on {
        state.on = on;
    }
    if let Some(brightness) = write.brightness {
        state.brightness = brightness;
    }
    if let Some(xy) = write.xy {
        state.xy = Some(xy);
        state.color_mode = Some(ColorMode::Chromaticity);
    }
    if let Some(mireds) = write.mireds {
        state.mireds = mireds;
        state.color_mode = Some(ColorMode::ColorTemperature);
    }
    if let Some(hue) = write.hue {
        state.hue = hue;
        state.color_mode = Some(ColorMode::HueSaturation);
    }
    if let Some(saturation) = write.saturation {
        state.saturation = saturation;
        state.color_mode = Some(ColorMode::HueSaturation);
    }
    if let Some(effect) = write.effect {
        state.effect = effect;
    }
    return Ok(());
}

impl Bridge for SimulatedBridge {
    fn fixture(&self, id: FixtureId) -> anyhow::Result<FixtureState> {
        let inner = self.lock()?;
        let fixture = inner
            .fixtures
            .get(&id)
            .ok_or_else(|| anyhow!("no light with id {}", id))?;
        if fixture.fail_reads {
            bail!("light {} did not respond", id);
        }
        return Ok(fixture.state.clone());
    }

    fn set_fixture_state(&self, id: FixtureId, state: &PartialState) -> anyhow::Result<()> {
        let write = wire_encode(state)?;
        let mut inner = self.lock()?;
        let fixture = inner
            .fixtures
            .get_mut(&id)
            .ok_or_else(|| anyhow!("no light with id {}", id))?;
        if fixture.fail_writes {
            bail!("light {} did not respond", id);
        }
        match fixture.writes_left {
            Some(0) => bail!("light {} did not respond", id),
            Some(n) => fixture.writes_left = Some(n - 1),
            None => (),
        }
        apply(id, &mut fixture.state, &write)?;
        inner.writes.push((id, write));
        return Ok(());
    }
}

impl FixtureDirectory for SimulatedBridge {
    fn fixtures(&self) -> anyhow::Result<Vec<FixtureInfo>> {
        let inner = self.lock()?;
        return Ok(inner
            .fixtures
            .iter()
            .map(|(id, f)| FixtureInfo {
                id: *id,
                name: f.name.clone(),
                color_mode: f.state.color_mode,
            })
            .collect());
    }
}
