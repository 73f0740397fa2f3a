//! Tap-the-Greens played through the full touch path.

use eyepal::app::commands::AppCommand;
use eyepal::app::events::AppEvent;
use eyepal::care::Stat;
use eyepal::fsm::LayerId;
use eyepal::fsm::context::{GameStatus, MenuItem};
use eyepal::game::GameOutcome;
use eyepal::motion::Rgb;

use crate::mock_hw::{CENTRE, Harness, LEFT_EYE, RIGHT_EYE, TOP};

const GREEN: Rgb = Rgb::new(0, 255, 0);

fn start_game() -> Harness {
    let mut h = Harness::new();
    h.open_menu_at(1);
    h.tap(CENTRE);
    assert_eq!(h.layer(), LayerId::GameActive);
    h
}

/// Step until the eye colours change, then return them.  A fresh round
/// leaves at least a second before the next change.
fn next_round(h: &mut Harness) -> [Rgb; 2] {
    let before = h.app.game_colors().expect("game running");
    for _ in 0..500 {
        h.step();
        match h.app.game_colors() {
            Some(now) if now != before => return now,
            Some(_) => {}
            None => panic!("game ended while waiting for a round"),
        }
    }
    panic!("colours never changed");
}

fn finished(h: &Harness) -> Vec<GameOutcome> {
    h.sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::GameFinished(r) => Some(r.outcome),
            _ => None,
        })
        .collect()
}

#[test]
fn play_menu_item_starts_game_immediately() {
    let h = start_game();
    assert!(h.app.is_game_active());
    assert!(h.app.game_colors().is_some());
    assert_eq!(h.app.layer_context().game_status, GameStatus::Playing);
}

#[test]
fn tapping_a_non_green_eye_ends_with_penalty() {
    let mut h = start_game();
    let colors = loop {
        let c = next_round(&mut h);
        if c.iter().any(|&rgb| rgb != GREEN) {
            break c;
        }
    };
    let target = if colors[0] != GREEN { LEFT_EYE } else { RIGHT_EYE };
    h.tap(target);

    assert_eq!(finished(&h), vec![GameOutcome::WrongTap]);
    assert_eq!(h.layer(), LayerId::Games);
    assert!(matches!(h.app.layer_context().game_status, GameStatus::WrongTap { hits: 0, .. }));
    assert_eq!(h.pet.stats[Stat::Mood.index()], 50);
    assert_eq!(h.pet.stats[Stat::Energy.index()], 55);
}

#[test]
fn green_hit_scores_and_stop_pays_reward() {
    let mut h = start_game();
    let colors = loop {
        let c = next_round(&mut h);
        if c.contains(&GREEN) {
            break c;
        }
    };
    let target = if colors[0] == GREEN { LEFT_EYE } else { RIGHT_EYE };
    h.tap(target);
    assert!(h.app.is_game_active(), "a hit keeps the game going");
    assert!(finished(&h).is_empty());

    h.long_press(TOP);
    assert_eq!(finished(&h), vec![GameOutcome::Normal]);
    assert_eq!(h.layer(), LayerId::Games);
    assert_eq!(h.pet.stats[Stat::Mood.index()], 65);
    assert_eq!(h.pet.stats[Stat::Energy.index()], 60);
}

#[test]
fn long_press_on_an_eye_does_not_stop_the_game() {
    let mut h = start_game();
    h.long_press(LEFT_EYE);
    assert!(finished(&h).is_empty());
    assert_eq!(h.layer(), LayerId::GameActive);
}

#[test]
fn games_panel_returns_to_play_item() {
    let mut h = start_game();
    h.long_press(TOP);
    assert_eq!(h.layer(), LayerId::Games);

    h.long_press(TOP);
    assert_eq!(h.layer(), LayerId::Open);
    assert_eq!(h.app.layer_context().menu_item, MenuItem::Play);
}

#[test]
fn games_panel_tap_starts_a_new_game() {
    let mut h = start_game();
    h.long_press(TOP);
    h.tap(TOP);
    assert_eq!(h.layer(), LayerId::GameActive);
    assert_eq!(h.app.layer_context().game_status, GameStatus::Playing);
}

#[test]
fn game_reached_from_mood_stats_returns_to_stats() {
    let mut h = Harness::new();
    h.open_menu_at(7);
    h.tap(CENTRE);
    h.swipe_down();
    assert_eq!(h.app.layer_context().stat, Stat::Mood);
    h.tap(CENTRE);
    assert_eq!(h.layer(), LayerId::Games);

    h.long_press(TOP);
    assert_eq!(h.layer(), LayerId::Stats);
}

#[test]
fn closing_the_menu_mid_game_ends_the_round() {
    let mut h = start_game();
    h.run_for(200);
    assert!(h.app.is_game_active());

    let (now, pet, sink) = (h.now, &mut h.pet, &mut h.sink);
    h.app.handle_command(AppCommand::CloseMenu, now, pet, sink);
    assert_eq!(h.layer(), LayerId::Closed);
    assert!(!h.app.is_game_active());
    assert!(h.app.game_colors().is_none());
    assert_eq!(finished(&h), vec![GameOutcome::Normal]);

    // The board stays dark on later frames.
    h.run_for(2000);
    assert!(h.app.game_colors().is_none());
    assert_eq!(finished(&h).len(), 1);
}

#[test]
fn hatching_over_a_running_game_stops_it() {
    let mut h = start_game();
    let (now, pet, sink) = (h.now, &mut h.pet, &mut h.sink);
    h.app.handle_command(AppCommand::StartHatch, now, pet, sink);
    assert!(h.app.is_hatching());
    assert_eq!(h.layer(), LayerId::Closed);
    assert!(!h.app.is_game_active());
    assert_eq!(finished(&h), vec![GameOutcome::Normal]);
}
