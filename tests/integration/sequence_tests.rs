//! Timed sequences: feed, sleep, clean, hatch and the idle clock.

use eyepal::app::commands::AppCommand;
use eyepal::app::events::{AppEvent, Sequence};
use eyepal::behavior::sequences::HATCH_TOTAL_MS;
use eyepal::care::Stat;
use eyepal::fsm::LayerId;
use eyepal::mood::Emotion;

use crate::mock_hw::{CENTRE, Harness, LEFT_EYE, MockPet, TOP};

#[test]
fn feeding_runs_five_seconds_then_returns_to_menu() {
    let mut h = Harness::new();
    h.open_menu_at(0);
    h.tap(CENTRE);
    assert!(h.app.is_feeding());
    assert!(h.sink.contains(&AppEvent::SequenceStarted(Sequence::Feed)));

    // Touches are swallowed while the bowl is out.
    h.long_press(TOP);
    assert!(h.app.is_feeding());

    h.run_for(5000);
    assert_eq!(h.layer(), LayerId::Open);
    assert_eq!(h.pet.stats[Stat::Hunger.index()], 70);
    assert!(h.sink.contains(&AppEvent::SequenceFinished(Sequence::Feed)));
}

#[test]
fn sleep_from_menu_then_tap_wakes_with_energy() {
    let mut h = Harness::new();
    h.open_menu_at(3);
    h.tap(CENTRE);
    assert!(h.app.is_asleep());
    assert_eq!(h.layer(), LayerId::Closed);
    assert_eq!(h.app.current_emotion(), Emotion::Idle);

    h.run_for(2000);
    assert_eq!(h.app.frame().top_offset, 70);

    // Swipes do not wake.
    h.swipe_down();
    assert!(h.app.is_asleep());

    h.tap(TOP);
    assert!(!h.app.is_asleep());
    assert_eq!(h.pet.stats[Stat::Energy.index()], 70);
    assert_eq!(h.layer(), LayerId::Closed, "wake tap must not open the menu");
    assert!(h.sink.contains(&AppEvent::SequenceFinished(Sequence::Sleep)));
}

#[test]
fn clean_from_stats_returns_to_cleanliness() {
    let mut h = Harness::new();
    h.open_menu_at(7);
    h.tap(CENTRE);
    for _ in 0..3 {
        h.swipe_down();
    }
    assert_eq!(h.app.layer_context().stat, Stat::Cleanliness);

    h.tap(CENTRE);
    assert!(h.app.is_cleaning());
    assert_eq!(h.layer(), LayerId::Closed);

    h.tap(TOP);
    assert_eq!(h.layer(), LayerId::Closed, "touches ignored while cleaning");

    h.run_for(5000);
    assert!(!h.app.is_cleaning());
    assert_eq!(h.pet.stats[Stat::Cleanliness.index()], 90);
    assert_eq!(h.layer(), LayerId::Stats);
    assert_eq!(h.app.layer_context().stat, Stat::Cleanliness);
}

#[test]
fn tap_outside_title_opens_options_for_cleanliness() {
    let mut h = Harness::new();
    h.open_menu_at(7);
    h.tap(CENTRE);
    h.swipe_up();
    h.tap(TOP);
    assert_eq!(h.layer(), LayerId::Options);
    assert!(!h.app.is_cleaning());
}

#[test]
fn new_pet_hatches_after_five_minutes() {
    let mut h = Harness::with_pet(MockPet::egg());
    assert!(h.app.is_hatching());
    assert!(h.pet.decay_suspended);

    // Menu stays shut and taps feed the egg.
    h.tap(TOP);
    assert_eq!(h.layer(), LayerId::Closed);

    h.run_for(HATCH_TOTAL_MS);
    assert!(!h.app.is_hatching());
    assert!(h.pet.hatched);
    assert!(!h.pet.decay_suspended);
    for phase in 2..=4 {
        assert!(h.sink.contains(&AppEvent::HatchPhase(phase)), "phase {}", phase);
    }
    assert!(h.sink.contains(&AppEvent::SequenceFinished(Sequence::Hatch)));

    h.tap(TOP);
    assert_eq!(h.layer(), LayerId::Open);
}

#[test]
fn hatch_command_closes_menu_and_cancels_sleep() {
    let mut h = Harness::new();
    h.open_menu_at(0);
    let (now, pet, sink) = (h.now, &mut h.pet, &mut h.sink);
    h.app.handle_command(AppCommand::StartHatch, now, pet, sink);
    assert!(h.app.is_hatching());
    assert_eq!(h.layer(), LayerId::Closed);
}

#[test]
fn clock_appears_after_ten_idle_minutes_and_first_touch_only_dismisses() {
    let mut h = Harness::new();
    h.run_for(600_000 + 32);
    assert!(h.app.is_clock_visible());
    assert!(h.sink.contains(&AppEvent::ClockShown));

    h.tap(TOP);
    assert!(!h.app.is_clock_visible());
    assert_eq!(h.layer(), LayerId::Closed, "dismissing tap is consumed");

    h.tap(TOP);
    assert_eq!(h.layer(), LayerId::Open);
}

#[test]
fn clock_never_shows_over_menu() {
    let mut h = Harness::new();
    h.open_menu_at(0);
    h.run_for(700_000);
    assert!(!h.app.is_clock_visible());
    assert_eq!(h.layer(), LayerId::Open);
}

#[test]
fn eye_tap_during_sleep_wakes_without_emotion() {
    let mut h = Harness::new();
    let (now, pet, sink) = (h.now, &mut h.pet, &mut h.sink);
    h.app.handle_command(AppCommand::StartSleep, now, pet, sink);
    h.tap(LEFT_EYE);
    assert!(!h.app.is_asleep());
    assert_eq!(h.app.current_emotion(), Emotion::Idle);
}
