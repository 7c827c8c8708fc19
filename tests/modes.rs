use std::collections::BTreeMap;
use std::sync::Arc;

use huelight::mode::{SavedColor, Snapshot};
use huelight::sim::SimulatedBridge;
use huelight::{
    Bridge, ColorMode, Effect, Error, FixtureId, FixtureState, Mode, ModeController, PartialState,
    Switch,
};

fn ct(on: bool, brightness: u8, mireds: u16) -> FixtureState {
    return FixtureState {
        on,
        brightness,
        mireds,
        color_mode: Some(ColorMode::ColorTemperature),
        ..FixtureState::default()
    };
}

fn xy(brightness: u8, x: f64, y: f64) -> FixtureState {
    return FixtureState {
        on: true,
        brightness,
        xy: Some([x, y]),
        color_mode: Some(ColorMode::Chromaticity),
        ..FixtureState::default()
    };
}

fn hs(brightness: u8, hue: u16, saturation: u8) -> FixtureState {
    return FixtureState {
        on: true,
        brightness,
        hue,
        saturation,
        color_mode: Some(ColorMode::HueSaturation),
        ..FixtureState::default()
    };
}

/// Five lights in three cycle groups, with mixed color modes.
fn setup() -> (Arc<SimulatedBridge>, ModeController<SimulatedBridge>) {
    let bridge = Arc::new(SimulatedBridge::new());
    bridge.insert(1, ct(true, 180, 366));
    bridge.insert(2, xy(90, 0.45, 0.41));
    bridge.insert(3, hs(120, 0, 0));
    bridge.insert(4, ct(false, 0, 250));
    bridge.insert(5, hs(254, 30000, 200));

    let mut groups = BTreeMap::new();
    groups.insert("left".to_string(), vec![1, 2]);
    groups.insert("center".to_string(), vec![3, 4]);
    groups.insert("right".to_string(), vec![5]);
    let controller = ModeController::new(bridge.clone(), groups, vec![1, 2, 3], vec![4, 5]);
    return (bridge, controller);
}

fn states(bridge: &SimulatedBridge, ids: &[FixtureId]) -> Vec<FixtureState> {
    return ids.iter().map(|id| bridge.fixture(*id).unwrap()).collect();
}

#[test]
fn cycle_staggers_groups_in_name_order() {
    let (bridge, controller) = setup();
    controller.set_position(1).unwrap();
    assert_eq!(controller.position().unwrap(), 1);

    let order: Vec<FixtureId> = bridge.writes().iter().map(|(id, _)| *id).collect();
    assert_eq!(order, vec![3, 3, 4, 4, 1, 1, 2, 2, 5, 5]);

    let expected_hue = [(3, 1), (4, 1), (1, 21845), (2, 21845), (5, 43690)];
    for (id, hue) in expected_hue {
        let writes = bridge.writes_to(id);
        assert_eq!(
            writes,
            vec![
                PartialState::default()
                    .power(true)
                    .hue(hue)
                    .saturation(254)
                    .effect(Effect::None),
                PartialState::default().power(true).effect(Effect::ColorLoop),
            ],
            "light {}",
            id
        );
        let state = bridge.fixture(id).unwrap();
        assert!(state.on);
        assert_eq!(state.effect, Effect::ColorLoop);
    }
}

#[test]
fn restore_after_cycle_puts_lights_back() {
    let (bridge, controller) = setup();
    let ids = [1, 2, 3, 4, 5];
    let before = states(&bridge, &ids);

    controller.set_position(1).unwrap();
    let saved = controller.snapshot().unwrap();
    assert_eq!(saved.ids(), ids.to_vec());
    let light_two = saved.get(2).unwrap();
    assert_eq!(light_two.brightness, 90);
    assert_eq!(light_two.color, SavedColor::Chromaticity { xy: [0.45, 0.41] });
    assert!(saved.get(6).is_none());
    bridge.clear_writes();
    controller.set_position(0).unwrap();
    assert_eq!(controller.position().unwrap(), 0);
    assert!(controller.snapshot().unwrap().is_empty());

    let after = states(&bridge, &ids);
    for (old, new) in before.iter().zip(after.iter()) {
        assert_eq!(new.on, old.on);
        assert_eq!(new.effect, Effect::None);
        assert_eq!(new.color_mode, old.color_mode);
        assert_eq!(new.brightness, old.brightness.max(1));
        match old.color_mode {
            Some(ColorMode::ColorTemperature) => assert_eq!(new.mireds, old.mireds),
            Some(ColorMode::Chromaticity) => assert_eq!(new.xy, old.xy),
            Some(ColorMode::HueSaturation) => {
                assert_eq!(new.hue, old.hue.max(1));
                assert_eq!(new.saturation, old.saturation.max(1));
            }
            None => (),
        }
    }

    // Light 3 was white in hs mode: the loop's saturation must not survive.
    assert_eq!(bridge.fixture(3).unwrap().saturation, 1);

    // Every light gets the two-step restore.
    for id in ids {
        let writes = bridge.writes_to(id);
        assert_eq!(writes.len(), 2, "light {}", id);
        assert_eq!(writes[0], PartialState::default().power(true).effect(Effect::None));
    }
}

#[test]
fn restore_turns_saved_off_lights_back_off() {
    let (bridge, controller) = setup();
    controller.set_position(1).unwrap();
    assert!(bridge.fixture(4).unwrap().on);

    controller.set_position(0).unwrap();
    let light = bridge.fixture(4).unwrap();
    assert!(!light.on);
    assert_eq!(light.mireds, 250);
}

#[test]
fn daylight_and_warm_presets() {
    let (bridge, controller) = setup();
    controller.set_position(2).unwrap();
    assert_eq!(controller.position().unwrap(), 2);
    for id in [1, 2, 3] {
        assert_eq!(
            bridge.writes_to(id),
            vec![PartialState::default()
                .power(true)
                .brightness(254)
                .mireds(153)
                .effect(Effect::None)
                .transition_time(4)]
        );
    }
    assert!(bridge.writes_to(4).is_empty());

    controller.set_position(3).unwrap();
    assert_eq!(controller.position().unwrap(), 3);
    let warm = bridge.fixture(5).unwrap();
    assert_eq!(warm.brightness, 200);
    assert_eq!(warm.mireds, 370);
    assert_eq!(warm.color_mode, Some(ColorMode::ColorTemperature));
}

#[test]
fn only_the_latest_snapshot_is_kept() {
    let bridge = Arc::new(SimulatedBridge::new());
    bridge.insert(1, hs(100, 5000, 100));
    let controller = ModeController::new(bridge.clone(), BTreeMap::new(), vec![1], vec![1]);

    controller.set_mode(Mode::Daylight).unwrap();
    controller.set_mode(Mode::Warm).unwrap();
    controller.set_mode(Mode::None).unwrap();

    // Back to daylight, not to the original color.
    let light = bridge.fixture(1).unwrap();
    assert_eq!(light.brightness, 254);
    assert_eq!(light.mireds, 153);
    assert_eq!(light.color_mode, Some(ColorMode::ColorTemperature));
}

#[test]
fn invalid_mode_is_rejected_before_bridge_access() {
    let (bridge, controller) = setup();
    for id in 1..=5 {
        bridge.fail_reads(id);
        bridge.fail_writes(id);
    }
    let err = controller.set_position(4).unwrap_err();
    assert!(matches!(err, Error::InvalidPosition { position: 4, max: 3 }));
    assert!(err.is_invalid_input());
    assert_eq!(controller.position().unwrap(), 0);
    assert!(bridge.writes().is_empty());
}

#[test]
fn failed_activation_stops_and_keeps_mode() {
    let (bridge, controller) = setup();
    bridge.fail_after_writes(4, 1);

    let err = controller.set_position(1).unwrap_err();
    assert!(matches!(err, Error::Device { id: 4, .. }), "{:?}", err);
    assert_eq!(controller.position().unwrap(), 0);

    // Light 3 was already looping; nothing after light 4 was touched.
    let order: Vec<FixtureId> = bridge.writes().iter().map(|(id, _)| *id).collect();
    assert_eq!(order, vec![3, 3, 4]);

    bridge.heal(4);
    controller.set_position(1).unwrap();
    assert_eq!(controller.position().unwrap(), 1);
}

#[test]
fn failed_snapshot_keeps_previous_save() {
    let (bridge, controller) = setup();
    controller.set_position(2).unwrap();
    let saved = controller.snapshot().unwrap();

    bridge.fail_reads(5);
    let err = controller.set_position(3).unwrap_err();
    assert!(matches!(err, Error::Device { id: 5, .. }));
    assert_eq!(controller.position().unwrap(), 2);
    assert_eq!(controller.snapshot().unwrap(), saved);
}

#[test]
fn restore_is_best_effort() {
    let (bridge, controller) = setup();
    controller.set_position(1).unwrap();
    bridge.fail_writes(2);

    let err = controller.set_position(0).unwrap_err();
    match &err {
        Error::PartialRestore { failed, source } => {
            assert_eq!(failed, &vec![2]);
            assert!(matches!(**source, Error::Device { id: 2, .. }));
        }
        other => panic!("expected partial restore, got {:?}", other),
    }
    assert!(err.report().contains("did not respond"), "{}", err.report());

    // Everything else is back and the controller is reset.
    assert_eq!(controller.position().unwrap(), 0);
    assert!(controller.snapshot().unwrap().is_empty());
    assert_eq!(bridge.fixture(1).unwrap().effect, Effect::None);
    assert_eq!(bridge.fixture(5).unwrap().hue, 30000);
    assert_eq!(bridge.fixture(2).unwrap().effect, Effect::ColorLoop);

    // Nothing left to restore.
    bridge.clear_writes();
    controller.set_position(0).unwrap();
    assert!(bridge.writes().is_empty());
}

#[test]
fn status_queries_do_not_touch_the_bridge() {
    let (bridge, controller) = setup();
    for id in 1..=5 {
        bridge.fail_reads(id);
    }
    assert_eq!(controller.position().unwrap(), 0);
    assert_eq!(
        controller.number_of_positions(),
        (4, vec!["none", "cycle", "daylight", "warm"])
    );
}

#[test]
fn empty_cycle_config_still_switches_mode() {
    let bridge = Arc::new(SimulatedBridge::new());
    let controller = ModeController::new(bridge.clone(), BTreeMap::new(), Vec::new(), Vec::new());
    controller.set_mode(Mode::Cycle).unwrap();
    assert_eq!(controller.mode().unwrap(), Mode::Cycle);
    assert_eq!(controller.snapshot().unwrap(), Snapshot::default());
    assert!(bridge.writes().is_empty());
}

#[test]
fn controller_is_shareable_across_threads() {
    let (bridge, controller) = setup();
    let controller = Arc::new(controller);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let controller = controller.clone();
            std::thread::spawn(move || controller.set_mode(Mode::Daylight))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    // Each transition wrote its three lights without interleaving.
    let writes = bridge.writes();
    assert_eq!(writes.len(), 12);
    for chunk in writes.chunks(3) {
        let ids: Vec<FixtureId> = chunk.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
