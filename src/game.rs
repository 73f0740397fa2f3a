//! Tap-the-Greens reaction game.
//!
//! Both eyes change colour every 1–2 s.  Tapping a green eye scores and
//! re-rolls both colours; tapping any other colour ends the game with a
//! penalty.  Every colour change (start and hits included) uses up one
//! round.
//!
//! The game never touches the care statistics itself.  Finishing returns
//! a [`GameResult`] which the caller applies through
//! [`CareStats`](crate::app::ports::CareStats).

use log::info;

use crate::app::ports::CareStats;
use crate::config::EngineConfig;
use crate::motion::{Rgb, SCREEN_SIZE};
use crate::random::{RandomSource, weighted_pick};
use crate::timing::reached;

const WRONG_TAP_MOOD: i16 = -10;
const WRONG_TAP_ENERGY: i16 = -5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeColor {
    Green,
    Red,
    Blue,
    Purple,
    Yellow,
    Cyan,
}

/// Green comes up a quarter of the time.
const COLOR_WEIGHTS: [(EyeColor, u16); 6] = [
    (EyeColor::Green, 5),
    (EyeColor::Red, 3),
    (EyeColor::Blue, 3),
    (EyeColor::Purple, 3),
    (EyeColor::Yellow, 3),
    (EyeColor::Cyan, 3),
];

impl EyeColor {
    pub fn rgb(self) -> Rgb {
        match self {
            Self::Green => Rgb::new(0, 255, 0),
            Self::Red => Rgb::new(255, 0, 0),
            Self::Blue => Rgb::new(0, 0, 255),
            Self::Purple => Rgb::new(128, 0, 255),
            Self::Yellow => Rgb::new(255, 255, 0),
            Self::Cyan => Rgb::new(0, 255, 255),
        }
    }

    fn random(rng: &mut impl RandomSource) -> Self {
        weighted_pick(&COLOR_WEIGHTS, |_| false, rng).unwrap_or(Self::Red)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// Rounds exhausted or stopped by the player.
    Normal,
    WrongTap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub outcome: GameOutcome,
    pub hits: u8,
    pub mood_delta: i16,
    pub energy_delta: i16,
}

impl GameResult {
    /// Reward first, then any penalty, each clamped by the stats.
    pub fn apply(&self, stats: &mut impl CareStats, reward_per_hit: u8) {
        let reward = i16::from(self.hits) * i16::from(reward_per_hit);
        if reward != 0 {
            stats.add_mood(reward);
        }
        if self.outcome == GameOutcome::WrongTap {
            stats.add_mood(WRONG_TAP_MOOD);
            stats.add_energy(WRONG_TAP_ENERGY);
        }
    }
}

pub struct TapTheGreens {
    running: bool,
    colors: [EyeColor; 2],
    next_change_at: u32,
    rounds: u8,
    hits: u8,
    max_rounds: u8,
    reward_per_hit: u8,
    interval_ms: (u32, u32),
    last_result: Option<GameResult>,
}

impl TapTheGreens {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            running: false,
            colors: [EyeColor::Red, EyeColor::Blue],
            next_change_at: 0,
            rounds: 0,
            hits: 0,
            max_rounds: config.game_max_rounds,
            reward_per_hit: config.game_reward_per_hit,
            interval_ms: (config.game_color_min_ms, config.game_color_max_ms),
            last_result: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn hits(&self) -> u8 {
        self.hits
    }

    pub fn rounds(&self) -> u8 {
        self.rounds
    }

    pub fn reward_per_hit(&self) -> u8 {
        self.reward_per_hit
    }

    /// Current colours, left then right.
    pub fn colors(&self) -> [EyeColor; 2] {
        self.colors
    }

    pub fn last_result(&self) -> Option<GameResult> {
        self.last_result
    }

    pub fn start(&mut self, now_ms: u32, rng: &mut impl RandomSource) {
        self.running = true;
        self.rounds = 0;
        self.hits = 0;
        self.last_result = None;
        info!("GAME: Tap-the-Greens started");
        // A one-round game ends here; callers see it via `last_result`.
        let _ = self.next_round(now_ms, rng);
    }

    /// Advance the colour timer.  Returns the result on the tick the game
    /// ends by running out of rounds.
    pub fn update(&mut self, now_ms: u32, rng: &mut impl RandomSource) -> Option<GameResult> {
        if !self.running {
            return None;
        }
        if reached(now_ms, self.next_change_at) {
            return self.next_round(now_ms, rng);
        }
        None
    }

    /// Tap at screen x.  The left half targets the left eye.
    pub fn handle_tap(&mut self, x: u16, now_ms: u32, rng: &mut impl RandomSource) -> Option<GameResult> {
        if !self.running {
            return None;
        }
        let eye = usize::from(x >= (SCREEN_SIZE / 2) as u16);
        if self.colors[eye] == EyeColor::Green {
            self.hits = self.hits.saturating_add(1);
            return self.next_round(now_ms, rng);
        }
        Some(self.finish(GameOutcome::WrongTap))
    }

    /// Stop by hand; the normal reward applies.
    pub fn stop(&mut self) -> Option<GameResult> {
        if !self.running {
            return None;
        }
        Some(self.finish(GameOutcome::Normal))
    }

    fn next_round(&mut self, now_ms: u32, rng: &mut impl RandomSource) -> Option<GameResult> {
        let (lo, hi) = self.interval_ms;
        self.next_change_at = now_ms.wrapping_add(rng.range_u32(lo, hi));
        self.colors = [EyeColor::random(rng), EyeColor::random(rng)];
        self.rounds = self.rounds.saturating_add(1);
        if self.rounds >= self.max_rounds {
            return Some(self.finish(GameOutcome::Normal));
        }
        None
    }

    fn finish(&mut self, outcome: GameOutcome) -> GameResult {
        self.running = false;
        let reward = i16::from(self.hits) * i16::from(self.reward_per_hit);
        let result = match outcome {
            GameOutcome::Normal => GameResult {
                outcome,
                hits: self.hits,
                mood_delta: reward,
                energy_delta: 0,
            },
            GameOutcome::WrongTap => GameResult {
                outcome,
                hits: self.hits,
                mood_delta: reward + WRONG_TAP_MOOD,
                energy_delta: WRONG_TAP_ENERGY,
            },
        };
        info!(
            "GAME: finished {:?} hits={} mood{:+} energy{:+}",
            outcome, result.hits, result.mood_delta, result.energy_delta
        );
        self.last_result = Some(result);
        result
    }
}
