//! Layer navigation through real gesture streams.

use eyepal::app::commands::AppCommand;
use eyepal::app::events::{AppEvent, Sequence};
use eyepal::care::Stat;
use eyepal::fsm::LayerId;
use eyepal::fsm::context::MenuItem;
use eyepal::mood::Emotion;

use crate::mock_hw::{CENTRE, Harness, LEFT_EYE, TOP};

#[test]
fn tap_off_eyes_opens_menu_on_feed() {
    let mut h = Harness::new();
    h.tap(TOP);
    assert_eq!(h.layer(), LayerId::Open);
    assert_eq!(h.app.layer_context().menu_item, MenuItem::Feed);
    assert!(h.sink.contains(&AppEvent::LayerChanged {
        from: LayerId::Closed,
        to: LayerId::Open,
    }));
}

#[test]
fn tap_on_eye_triggers_emotion_instead_of_menu() {
    let mut h = Harness::new();
    let (now, pet, sink) = (h.now, &mut h.pet, &mut h.sink);
    for e in [Emotion::Idle, Emotion::Tired, Emotion::Happy2] {
        h.app.handle_command(AppCommand::SetEmotionWeight(e, 0), now, pet, sink);
    }
    // Let the boot-time pick play out and fall back to Idle.
    h.run_for(3000);
    assert_eq!(h.app.current_emotion(), Emotion::Idle);

    h.tap(LEFT_EYE);
    assert_eq!(h.layer(), LayerId::Closed);
    assert_eq!(h.app.current_emotion(), Emotion::Happy1);
    assert!(h.sink.contains(&AppEvent::EmotionChanged {
        from: Emotion::Idle,
        to: Emotion::Happy1,
    }));
}

#[test]
fn long_press_closes_menu() {
    let mut h = Harness::new();
    h.open_menu_at(0);
    h.long_press(TOP);
    assert_eq!(h.layer(), LayerId::Closed);
}

#[test]
fn swipes_move_selection_without_blocking() {
    let mut h = Harness::new();
    h.open_menu_at(2);
    assert_eq!(h.app.layer_context().menu_item, MenuItem::Clean);
    h.swipe_up();
    assert_eq!(h.app.layer_context().menu_item, MenuItem::Play);
    assert!(!h.app.layer_context().block_until_lift);
}

/// The same centre tap means something different on every layer.
#[test]
fn centre_tap_is_reinterpreted_per_layer() {
    let mut h = Harness::new();

    h.tap(TOP);
    assert_eq!(h.layer(), LayerId::Open);

    for _ in 0..7 {
        h.swipe_down();
    }
    assert_eq!(h.app.layer_context().menu_item, MenuItem::Stats);
    h.tap(CENTRE);
    assert_eq!(h.layer(), LayerId::Stats);
    assert_eq!(h.app.layer_context().stat, Stat::Hunger);

    h.tap(CENTRE);
    assert_eq!(h.layer(), LayerId::Options);

    h.tap(CENTRE);
    assert_eq!(h.layer(), LayerId::Stats);
    assert_eq!(h.pet.stats[Stat::Hunger.index()], 70);

    h.swipe_down();
    assert_eq!(h.app.layer_context().stat, Stat::Mood);
    h.tap(CENTRE);
    assert_eq!(h.layer(), LayerId::Games);

    h.long_press(TOP);
    assert_eq!(h.layer(), LayerId::Stats);

    h.long_press(TOP);
    assert_eq!(h.layer(), LayerId::Open);
    assert_eq!(h.app.layer_context().menu_item, MenuItem::Stats);
}

#[test]
fn stats_swipes_wrap_around() {
    let mut h = Harness::new();
    h.open_menu_at(7);
    h.tap(CENTRE);
    h.swipe_up();
    assert_eq!(h.app.layer_context().stat, Stat::Cleanliness);
    h.swipe_down();
    assert_eq!(h.app.layer_context().stat, Stat::Hunger);
}

#[test]
fn info_panels_return_to_their_menu_item() {
    let mut h = Harness::new();
    h.open_menu_at(6);
    h.tap(CENTRE);
    assert_eq!(h.layer(), LayerId::Battery);
    h.tap(CENTRE);
    assert_eq!(h.layer(), LayerId::Open);
    assert_eq!(h.app.layer_context().menu_item, MenuItem::Battery);

    h.swipe_up();
    h.tap(CENTRE);
    assert_eq!(h.layer(), LayerId::Message);
    h.tap(CENTRE);
    assert_eq!(h.layer(), LayerId::Message, "message ignores taps");
    h.long_press(TOP);
    assert_eq!(h.layer(), LayerId::Open);
}

#[test]
fn connect_switch_toggles_request() {
    let mut h = Harness::new();
    h.open_menu_at(4);
    h.tap(CENTRE);
    assert_eq!(h.layer(), LayerId::Connect);
    h.tap(CENTRE);
    assert!(h.app.layer_context().connect_requested);
    h.tap(CENTRE);
    assert!(!h.app.layer_context().connect_requested);
    h.tap(TOP);
    assert_eq!(h.layer(), LayerId::Connect);
}

#[test]
fn clean_menu_item_does_nothing() {
    let mut h = Harness::new();
    h.open_menu_at(2);
    h.tap(CENTRE);
    assert_eq!(h.layer(), LayerId::Open);
    assert!(!h.app.is_cleaning());
}

#[test]
fn held_finger_cannot_retrigger_new_layer() {
    let mut h = Harness::new();
    h.open_menu_at(7);
    // Long press on the menu closes it; the same contact keeps going.
    h.long_press(TOP);
    assert_eq!(h.layer(), LayerId::Closed);
    h.step();
    assert!(!h.app.layer_context().block_until_lift);
}

#[test]
fn menu_commands_follow_layer_guards() {
    let mut h = Harness::new();
    let (now, pet, sink) = (h.now, &mut h.pet, &mut h.sink);
    h.app.handle_command(AppCommand::SelectNext, now, pet, sink);
    assert_eq!(h.app.layer_context().menu_item, MenuItem::Feed);

    h.app.handle_command(AppCommand::OpenMenu, now, pet, sink);
    h.app.handle_command(AppCommand::SelectNext, now, pet, sink);
    h.app.handle_command(AppCommand::SelectNext, now, pet, sink);
    h.app.handle_command(AppCommand::SelectNext, now, pet, sink);
    assert_eq!(h.app.layer_context().menu_item, MenuItem::Sleep);
    h.app.handle_command(AppCommand::ActivateSelected, now, pet, sink);
    assert!(h.app.is_asleep());
    assert_eq!(h.app.current_layer(), LayerId::Closed);

    h.app.handle_command(AppCommand::CloseMenu, now, pet, sink);
    assert_eq!(h.app.current_layer(), LayerId::Closed);
}

#[test]
fn closing_mid_feed_drops_the_bounce() {
    let mut h = Harness::new();
    h.open_menu_at(0);
    h.tap(CENTRE);
    assert!(h.app.is_feeding());
    h.run_for(500);
    assert!(h.app.idle().is_busy());

    let (now, pet, sink) = (h.now, &mut h.pet, &mut h.sink);
    h.app.handle_command(AppCommand::CloseMenu, now, pet, sink);
    assert_eq!(h.layer(), LayerId::Closed);
    assert!(!h.app.is_feeding());
    assert!(!h.app.idle().is_busy());
    assert!(h.app.motion().is_neutral());
    assert!(!h.sink.contains(&AppEvent::SequenceFinished(Sequence::Feed)));
}
