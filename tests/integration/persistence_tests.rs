//! Config dirty-flag saves and pet record persistence.

use eyepal::adapters::nvs::NvsAdapter;
use eyepal::app::commands::AppCommand;
use eyepal::app::ports::{ConfigError, ConfigPort, PetStorePort};
use eyepal::app::service::CompanionService;
use eyepal::care::{CareReading, Stat};
use eyepal::config::EngineConfig;
use eyepal::drivers::gesture::TouchSample;
use eyepal::pet::{PetSnapshot, PetState};
use eyepal::random::Mulberry32;

use crate::mock_hw::{CENTRE, Harness, MockConfigStore, MockHardware, RecordingSink, TOP};

fn tuned() -> EngineConfig {
    EngineConfig {
        long_press_ms: 600,
        screensaver_timeout_ms: 120_000,
        ..EngineConfig::default()
    }
}

#[test]
fn config_update_is_saved_once_after_it_settles() {
    let mut h = Harness::new();
    let store = MockConfigStore::default();
    let (now, pet, sink) = (h.now, &mut h.pet, &mut h.sink);
    h.app.handle_command(AppCommand::UpdateConfig(tuned()), now, pet, sink);
    assert!(h.app.is_config_dirty());

    h.run_for(4_000);
    assert!(!h.app.auto_save_if_needed(h.now, &store));

    h.run_for(1_100);
    assert!(h.app.auto_save_if_needed(h.now, &store));
    assert!(!h.app.auto_save_if_needed(h.now, &store));
    assert_eq!(store.saved.borrow().as_slice(), &[tuned()]);
}

#[test]
fn explicit_save_skips_the_delay() {
    let mut h = Harness::new();
    let store = MockConfigStore::default();
    let (now, pet, sink) = (h.now, &mut h.pet, &mut h.sink);
    h.app.handle_command(AppCommand::SaveConfig, now, pet, sink);
    assert!(h.app.auto_save_if_needed(h.now, &store));
    assert_eq!(store.saved.borrow().len(), 1);
}

#[test]
fn force_save_flushes_pending_changes() {
    let mut h = Harness::new();
    let store = MockConfigStore::default();
    h.app.force_save_if_dirty(&store);
    assert!(store.saved.borrow().is_empty());

    h.app.mark_config_dirty(h.now);
    h.app.force_save_if_dirty(&store);
    assert!(!h.app.is_config_dirty());
    assert_eq!(store.load().unwrap(), EngineConfig::default());
}

#[test]
fn invalid_config_stays_dirty_in_nvs() {
    let mut h = Harness::new();
    let nvs = NvsAdapter::new().unwrap();
    let bad = EngineConfig {
        tap_max_drift_px: 80,
        ..EngineConfig::default()
    };
    assert!(matches!(nvs.save(&bad), Err(ConfigError::ValidationFailed(_))));

    let (now, pet, sink) = (h.now, &mut h.pet, &mut h.sink);
    h.app.handle_command(AppCommand::UpdateConfig(bad), now, pet, sink);
    h.run_for(5_100);
    assert!(!h.app.auto_save_if_needed(h.now, &nvs));
    assert!(h.app.is_config_dirty());
    assert_eq!(nvs.load().unwrap(), EngineConfig::default());
}

#[test]
fn saved_config_boots_the_next_service() {
    let nvs = NvsAdapter::new().unwrap();
    nvs.save(&tuned()).unwrap();
    let app = CompanionService::new(nvs.load().unwrap(), Mulberry32::new(1));
    assert_eq!(app.current_config().long_press_ms, 600);
}

#[test]
fn pet_record_survives_a_reboot() {
    let cfg = EngineConfig::default();
    let mut nvs = NvsAdapter::new().unwrap();
    assert_eq!(nvs.load_pet().unwrap(), None);

    let snap = PetSnapshot {
        stats: CareReading::uniform(55),
        level: 2,
        xp: 4,
        hatched: true,
    };
    let mut pet = PetState::from_snapshot(&cfg, &snap);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::default();
    let mut app = CompanionService::new(cfg.clone(), Mulberry32::new(7));
    app.start(0, &mut pet, &mut sink);
    assert!(!app.is_hatching());

    // Open the menu and feed.
    let mut now = 0;
    let mut step = |app: &mut CompanionService, hw: &mut MockHardware, pet: &mut PetState| {
        app.tick(now, hw, pet, &mut sink);
        now += 16;
    };
    for p in [TOP, CENTRE] {
        hw.queue([TouchSample::Contact(p); 4]);
        hw.queue([TouchSample::Released]);
        for _ in 0..8 {
            step(&mut app, &mut hw, &mut pet);
        }
    }
    assert!(app.is_feeding());
    for _ in 0..400 {
        step(&mut app, &mut hw, &mut pet);
    }
    assert!(!app.is_feeding());

    let before = pet.snapshot();
    assert!(before.stats.get(Stat::Hunger) > 55);
    nvs.save_pet(&before).unwrap();

    let restored = PetState::from_snapshot(&cfg, &nvs.load_pet().unwrap().unwrap());
    assert_eq!(restored.snapshot(), before);
}
