//! Mood sub-states observed through the running service.

use eyepal::app::commands::AppCommand;
use eyepal::app::events::AppEvent;
use eyepal::care::Stat;
use eyepal::mood::{Emotion, SubState};

use crate::mock_hw::{Harness, LEFT_EYE, MockPet};

fn pet_with(stat: Stat, value: u8) -> MockPet {
    let mut pet = MockPet::new(60);
    pet.stats[stat.index()] = value;
    pet
}

fn activated(h: &Harness, which: SubState) -> bool {
    h.sink.contains(&AppEvent::SubStateChanged { which, active: true })
}

#[test]
fn low_energy_turns_sluggish_after_twenty_seconds() {
    let mut h = Harness::with_pet(pet_with(Stat::Energy, 20));
    h.run_for(19_000);
    assert!(!activated(&h, SubState::Sluggish));

    h.run_for(1_500);
    assert!(activated(&h, SubState::Sluggish));
    assert!(!activated(&h, SubState::Depressed));

    let snap = h.app.mood_snapshot();
    assert!(snap.sub.sluggish);
    assert!(snap.suppress_fast && snap.suppress_normal);
    assert!(snap.is_suppressed(Emotion::Excited));
}

#[test]
fn sluggish_pet_forces_tired_on_eye_tap() {
    let mut h = Harness::with_pet(pet_with(Stat::Energy, 20));
    h.run_for(21_000);
    assert!(h.app.mood_snapshot().sub.sluggish);

    h.tap(LEFT_EYE);
    assert_eq!(h.app.current_emotion(), Emotion::Tired);
}

#[test]
fn two_low_stats_make_the_pet_depressed() {
    let mut pet = pet_with(Stat::Hunger, 10);
    pet.stats[Stat::Mood.index()] = 10;
    let mut h = Harness::with_pet(pet);
    h.run_for(20_500);

    assert!(activated(&h, SubState::Irritable));
    assert!(activated(&h, SubState::Withdrawn));
    assert!(activated(&h, SubState::Depressed));
    let snap = h.app.mood_snapshot();
    assert!(snap.is_suppressed(Emotion::Happy1));
    assert_eq!(snap.forced.first(), Some(&Emotion::Sad1));
}

#[test]
fn one_stat_low_for_a_minute_also_depresses() {
    let mut h = Harness::with_pet(pet_with(Stat::Cleanliness, 10));
    h.run_for(30_000);
    assert!(activated(&h, SubState::Uncomfortable));
    assert!(!activated(&h, SubState::Depressed));

    h.run_for(31_000);
    assert!(activated(&h, SubState::Depressed));
}

#[test]
fn recovering_the_stat_clears_its_sub_state() {
    let mut h = Harness::with_pet(pet_with(Stat::Energy, 20));
    h.run_for(21_000);
    assert!(h.app.mood_snapshot().sub.sluggish);

    h.pet.stats[Stat::Energy.index()] = 85;
    h.run_for(100);
    assert!(h.sink.contains(&AppEvent::SubStateChanged {
        which: SubState::Sluggish,
        active: false
    }));
    assert!(!h.app.mood_snapshot().sub.any());
}

#[test]
fn healthy_pet_never_shows_negative_emotions() {
    let mut h = Harness::with_pet(MockPet::new(90));
    for _ in 0..5 {
        let (now, pet, sink) = (h.now, &mut h.pet, &mut h.sink);
        h.app.handle_command(AppCommand::TriggerEmotion, now, pet, sink);
        assert!(!h.app.current_emotion().is_negative(), "{:?}", h.app.current_emotion());
        h.run_for(100);
    }
    assert_eq!(h.sink.count(|e| matches!(e, AppEvent::SubStateChanged { .. })), 0);
}
