//! Ten-frame score card
//!
//! A pure state machine: it is fed one knocked-pin snapshot per roll and
//! never looks at the simulation directly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::consts::{FRAME_COUNT, PIN_COUNT};

const LAST_FRAME: usize = FRAME_COUNT - 1;
const ALL_PINS: u8 = PIN_COUNT as u8;
/// Strikes in a row needed for a 300 game
const PERFECT_STRIKES: u32 = 12;

/// Pins touching each pin in the rack, by pin number
const ADJACENT: [&[usize]; PIN_COUNT] = [
    &[2, 3],
    &[1, 3, 4, 5],
    &[1, 2, 5, 6],
    &[2, 5, 7, 8],
    &[2, 3, 4, 6, 8, 9],
    &[3, 5, 9, 10],
    &[4, 8],
    &[4, 5, 7, 9],
    &[5, 6, 8, 10],
    &[6, 9],
];

/// Whether two pins (by pin number) touch in the rack
fn adjacent(a: usize, b: usize) -> bool {
    ADJACENT[a - 1].contains(&b)
}

/// Head pin down and some pair of standing pins that do not touch
pub fn is_split(standing: &[bool; PIN_COUNT]) -> bool {
    if standing[0] {
        return false;
    }
    let up: Vec<usize> = (1..=PIN_COUNT).filter(|&n| standing[n - 1]).collect();
    up.iter()
        .enumerate()
        .any(|(i, &a)| up[i + 1..].iter().any(|&b| !adjacent(a, b)))
}

/// Call-out for a noteworthy roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusMessage {
    Strike,
    Double,
    Turkey,
    FourBagger,
    FiveBagger,
    OnFire,
    Spare,
    PerfectGame,
}

impl BonusMessage {
    /// Call-out for the nth strike in a row
    pub fn for_streak(streak: u32) -> Self {
        match streak {
            0 | 1 => BonusMessage::Strike,
            2 => BonusMessage::Double,
            3 => BonusMessage::Turkey,
            4 => BonusMessage::FourBagger,
            5 => BonusMessage::FiveBagger,
            _ => BonusMessage::OnFire,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BonusMessage::Strike => "STRIKE!",
            BonusMessage::Double => "DOUBLE!",
            BonusMessage::Turkey => "TURKEY!",
            BonusMessage::FourBagger => "FOUR-BAGGER!",
            BonusMessage::FiveBagger => "FIVE-BAGGER!",
            BonusMessage::OnFire => "ON FIRE!",
            BonusMessage::Spare => "SPARE!",
            BonusMessage::PerfectGame => "PERFECT GAME!",
        }
    }
}

impl fmt::Display for BonusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One box on the score card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub roll1: Option<u8>,
    pub roll2: Option<u8>,
    /// Only ever set in the 10th frame
    pub roll3: Option<u8>,
    pub is_strike: bool,
    pub is_spare: bool,
    /// Running total through this frame, once every bonus roll is known
    pub cumulative_score: Option<u32>,
}

impl Frame {
    /// Rolls bowled so far, in order
    pub fn rolls(&self) -> impl Iterator<Item = u8> + '_ {
        [self.roll1, self.roll2, self.roll3].into_iter().flatten()
    }

    /// Pins knocked down by this frame's own rolls
    pub fn pins(&self) -> u32 {
        self.rolls().map(u32::from).sum()
    }

    /// Score-card marks: `X` strike, `/` spare, `-` miss, digits otherwise
    pub fn notation(&self) -> String {
        let mut marks = String::new();
        let mut fresh_rack = true;
        let mut first = 0;
        for roll in self.rolls() {
            if fresh_rack && roll == ALL_PINS {
                marks.push('X');
            } else if !fresh_rack && first + roll == ALL_PINS {
                marks.push('/');
                fresh_rack = true;
            } else {
                marks.push(mark(roll));
                if fresh_rack {
                    first = roll;
                }
                fresh_rack = !fresh_rack;
            }
        }
        marks
    }
}

fn mark(pins: u8) -> char {
    match pins {
        0 => '-',
        n => char::from_digit(u32::from(n), 10).unwrap_or('?'),
    }
}

/// What a single roll did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreResult {
    pub pins_knocked: u8,
    pub is_strike: bool,
    pub is_spare: bool,
    pub is_split: bool,
    pub is_gutter: bool,
    pub frame_complete: bool,
    pub game_complete: bool,
    pub bonus_message: Option<BonusMessage>,
}

/// Ten-frame score card and roll bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSystem {
    frames: [Frame; FRAME_COUNT],
    current_frame: usize,
    current_roll: usize,
    standing_pins: [bool; PIN_COUNT],
    consecutive_strikes: u32,
    clean_frames: u32,
    game_complete: bool,
}

impl Default for ScoreSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreSystem {
    pub fn new() -> Self {
        Self {
            frames: [Frame::default(); FRAME_COUNT],
            current_frame: 0,
            current_roll: 0,
            standing_pins: [true; PIN_COUNT],
            consecutive_strikes: 0,
            clean_frames: 0,
            game_complete: false,
        }
    }

    /// Start a fresh card
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Record one roll.
    ///
    /// `knocked[i]` is true when pin `i + 1` is down after the roll, counting
    /// pins already cleared earlier in the frame.
    pub fn record_roll(&mut self, knocked: &[bool; PIN_COUNT]) -> ScoreResult {
        if self.game_complete {
            log::warn!("Roll recorded after the game ended, ignoring");
            return ScoreResult {
                game_complete: true,
                ..Default::default()
            };
        }

        let standing_before = count(&self.standing_pins);
        let down_now = knocked.iter().filter(|&&k| k).count();
        let pins = standing_before.saturating_sub(PIN_COUNT - down_now) as u8;
        for (up, &down) in self.standing_pins.iter_mut().zip(knocked) {
            *up = *up && !down;
        }

        let fresh_rack = standing_before == PIN_COUNT;
        let cleared = count(&self.standing_pins) == 0;
        let mut result = ScoreResult {
            pins_knocked: pins,
            is_strike: fresh_rack && cleared,
            is_spare: !fresh_rack && cleared,
            is_split: fresh_rack && !cleared && is_split(&self.standing_pins),
            is_gutter: pins == 0,
            ..Default::default()
        };

        let tenth = self.current_frame == LAST_FRAME;
        let frame = &mut self.frames[self.current_frame];
        match self.current_roll {
            0 => {
                frame.roll1 = Some(pins);
                frame.is_strike = result.is_strike;
                if result.is_strike && !tenth {
                    result.frame_complete = true;
                } else {
                    self.current_roll = 1;
                }
            }
            1 => {
                frame.roll2 = Some(pins);
                frame.is_spare = result.is_spare;
                if !tenth || !(frame.is_strike || frame.is_spare) {
                    result.frame_complete = true;
                } else {
                    self.current_roll = 2;
                }
            }
            _ => {
                frame.roll3 = Some(pins);
                result.frame_complete = true;
            }
        }

        if cleared && tenth && !result.frame_complete {
            self.standing_pins = [true; PIN_COUNT];
        }

        if result.is_strike {
            self.consecutive_strikes += 1;
        } else {
            self.consecutive_strikes = 0;
        }

        if result.frame_complete {
            let frame = &self.frames[self.current_frame];
            if frame.is_strike || frame.is_spare {
                self.clean_frames += 1;
            }
            if tenth {
                result.game_complete = true;
                self.game_complete = true;
            } else {
                self.current_frame += 1;
                self.current_roll = 0;
                self.standing_pins = [true; PIN_COUNT];
            }
        }

        result.bonus_message = if result.game_complete && self.consecutive_strikes == PERFECT_STRIKES {
            Some(BonusMessage::PerfectGame)
        } else if result.is_strike {
            Some(BonusMessage::for_streak(self.consecutive_strikes))
        } else if result.is_spare {
            Some(BonusMessage::Spare)
        } else {
            None
        };

        self.calculate_scores();

        log::info!(
            "Roll: {} pins{}{} (total {})",
            pins,
            if result.is_split { ", split" } else { "" },
            result
                .bonus_message
                .map(|m| format!(", {m}"))
                .unwrap_or_default(),
            self.total_score()
        );
        if result.game_complete {
            log::info!("Game complete: {}", self.total_score());
        }

        result
    }

    /// Refresh every frame's running total.
    ///
    /// A strike waits for the next two rolls, a spare for the next one, and
    /// the 10th frame for all of its own rolls. Once a frame is unresolved
    /// every later frame is too.
    fn calculate_scores(&mut self) {
        let rolls: Vec<u32> = self
            .frames
            .iter()
            .flat_map(Frame::rolls)
            .map(u32::from)
            .collect();

        let mut cursor = 0;
        let mut running = Some(0u32);
        for frame in self.frames.iter_mut() {
            let (span, consumed) = if frame.is_strike {
                (3, 1)
            } else if frame.is_spare {
                (3, 2)
            } else {
                (2, 2)
            };
            let own_rolls_done = frame.roll1.is_some() && (frame.is_strike || frame.roll2.is_some());
            let score = own_rolls_done
                .then(|| rolls.get(cursor..cursor + span))
                .flatten()
                .map(|window| window.iter().sum::<u32>());

            running = running.zip(score).map(|(total, s)| total + s);
            frame.cumulative_score = running;
            cursor += consumed;
        }
    }

    pub fn frames(&self) -> &[Frame; FRAME_COUNT] {
        &self.frames
    }

    /// Running total through the last resolved frame
    pub fn total_score(&self) -> u32 {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.cumulative_score)
            .unwrap_or(0)
    }

    pub fn is_game_complete(&self) -> bool {
        self.game_complete
    }

    /// Pins the score card expects to still be standing
    pub fn standing_pins(&self) -> &[bool; PIN_COUNT] {
        &self.standing_pins
    }

    /// Zero-based frame index
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Zero-based roll index within the current frame
    pub fn current_roll(&self) -> usize {
        self.current_roll
    }

    /// Frames finished with a strike or spare
    pub fn clean_frames(&self) -> u32 {
        self.clean_frames
    }

    pub fn consecutive_strikes(&self) -> u32 {
        self.consecutive_strikes
    }
}

fn count(pins: &[bool; PIN_COUNT]) -> usize {
    pins.iter().filter(|&&p| p).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Knock down the first `n` pins still standing on the card
    fn bowl(score: &mut ScoreSystem, n: usize) -> ScoreResult {
        let mut knocked = score.standing_pins().map(|up| !up);
        for slot in knocked.iter_mut().filter(|k| !**k).take(n) {
            *slot = true;
        }
        score.record_roll(&knocked)
    }

    fn standing(pins: &[usize]) -> [bool; PIN_COUNT] {
        std::array::from_fn(|i| pins.contains(&(i + 1)))
    }

    #[test]
    fn test_perfect_game() {
        let mut score = ScoreSystem::new();
        let mut last = ScoreResult::default();
        for _ in 0..12 {
            last = bowl(&mut score, 10);
            assert!(last.is_strike);
        }
        assert!(last.game_complete);
        assert_eq!(last.bonus_message, Some(BonusMessage::PerfectGame));
        assert_eq!(score.total_score(), 300);
        assert_eq!(score.clean_frames(), 10);
        assert_eq!(score.frames()[9].notation(), "XXX");
        let totals: Vec<_> = score.frames().iter().map(|f| f.cumulative_score).collect();
        assert_eq!(totals[0], Some(30));
        assert_eq!(totals[9], Some(300));
    }

    #[test]
    fn test_spare_waits_for_next_roll() {
        let mut score = ScoreSystem::new();
        bowl(&mut score, 7);
        let spare = bowl(&mut score, 3);
        assert!(spare.is_spare && spare.frame_complete);
        assert_eq!(spare.bonus_message, Some(BonusMessage::Spare));
        assert_eq!(score.frames()[0].cumulative_score, None);

        bowl(&mut score, 4);
        assert_eq!(score.frames()[0].cumulative_score, Some(14));
        assert_eq!(score.frames()[0].notation(), "7/");
        assert_eq!(score.frames()[1].cumulative_score, None);
    }

    #[test]
    fn test_strike_strike_five() {
        let mut score = ScoreSystem::new();
        bowl(&mut score, 10);
        let double = bowl(&mut score, 10);
        assert_eq!(double.bonus_message, Some(BonusMessage::Double));
        assert_eq!(score.frames()[0].cumulative_score, None);

        let five = bowl(&mut score, 5);
        assert_eq!(five.bonus_message, None);
        assert_eq!(score.frames()[0].cumulative_score, Some(25));
        assert_eq!(score.frames()[1].cumulative_score, None);
        assert_eq!(score.consecutive_strikes(), 0);
    }

    #[test]
    fn test_strike_streak_messages() {
        let mut score = ScoreSystem::new();
        let messages: Vec<_> = (0..6).map(|_| bowl(&mut score, 10).bonus_message).collect();
        assert_eq!(
            messages,
            vec![
                Some(BonusMessage::Strike),
                Some(BonusMessage::Double),
                Some(BonusMessage::Turkey),
                Some(BonusMessage::FourBagger),
                Some(BonusMessage::FiveBagger),
                Some(BonusMessage::OnFire),
            ]
        );
    }

    #[test]
    fn test_open_tenth_ends_game() {
        let mut score = ScoreSystem::new();
        for _ in 0..9 {
            bowl(&mut score, 0);
            bowl(&mut score, 0);
        }
        assert_eq!(score.current_frame(), 9);
        bowl(&mut score, 4);
        let last = bowl(&mut score, 3);
        assert!(last.frame_complete && last.game_complete);
        assert!(score.is_game_complete());
        assert_eq!(score.frames()[9].roll3, None);
        assert_eq!(score.total_score(), 7);
        assert_eq!(score.frames()[0].notation(), "--");

        // Further rolls are ignored
        let extra = bowl(&mut score, 5);
        assert!(extra.game_complete);
        assert_eq!(extra.pins_knocked, 0);
        assert_eq!(score.total_score(), 7);
    }

    #[test]
    fn test_tenth_frame_spare_gets_bonus_ball() {
        let mut score = ScoreSystem::new();
        for _ in 0..18 {
            bowl(&mut score, 0);
        }
        bowl(&mut score, 6);
        let spare = bowl(&mut score, 4);
        assert!(spare.is_spare && !spare.frame_complete);
        assert_eq!(score.standing_pins(), &[true; PIN_COUNT]);

        let bonus = bowl(&mut score, 10);
        assert!(bonus.is_strike && bonus.game_complete);
        assert_eq!(score.total_score(), 20);
        assert_eq!(score.frames()[9].notation(), "6/X");
    }

    #[test]
    fn test_tenth_frame_strike_then_spare() {
        let mut score = ScoreSystem::new();
        for _ in 0..18 {
            bowl(&mut score, 0);
        }
        bowl(&mut score, 10);
        let second = bowl(&mut score, 8);
        assert!(!second.frame_complete);
        assert_eq!(score.current_roll(), 2);
        let third = bowl(&mut score, 2);
        assert!(third.is_spare && third.game_complete);
        assert_eq!(score.frames()[9].notation(), "X8/");
        assert_eq!(score.total_score(), 20);
    }

    #[test]
    fn test_cumulative_knocked_array() {
        // Pins already down stay down in the snapshot; only new ones count
        let mut score = ScoreSystem::new();
        let mut knocked = [false; PIN_COUNT];
        knocked[0] = true;
        knocked[1] = true;
        assert_eq!(score.record_roll(&knocked).pins_knocked, 2);
        knocked[2] = true;
        assert_eq!(score.record_roll(&knocked).pins_knocked, 1);
        assert_eq!(score.frames()[0].cumulative_score, Some(3));
    }

    #[test]
    fn test_split_detection() {
        assert!(is_split(&standing(&[2, 7])));
        assert!(!is_split(&standing(&[2, 3])));
        assert!(is_split(&standing(&[7, 10])));
        // Head pin standing is never a split
        assert!(!is_split(&standing(&[1, 7, 10])));
        assert!(!is_split(&standing(&[5])));
    }

    #[test]
    fn test_split_reported_on_first_ball() {
        let mut score = ScoreSystem::new();
        let result = score.record_roll(&standing(&[7, 10]).map(|up| !up));
        assert!(result.is_split);
        assert_eq!(result.pins_knocked, 8);
        // Converting the split is a spare, not a split
        let second = score.record_roll(&[true; PIN_COUNT]);
        assert!(!second.is_split && second.is_spare);
    }

    #[test]
    fn test_reset() {
        let mut score = ScoreSystem::new();
        bowl(&mut score, 10);
        score.reset();
        assert_eq!(score, ScoreSystem::new());
        assert_eq!(score.total_score(), 0);
    }

    #[test]
    fn test_bonus_message_display() {
        assert_eq!(BonusMessage::Turkey.to_string(), "TURKEY!");
        assert_eq!(BonusMessage::PerfectGame.to_string(), "PERFECT GAME!");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_game_scores_within_bounds(picks in prop::collection::vec(0usize..=10, 21)) {
                let mut score = ScoreSystem::new();
                let mut rolls = 0;
                for pick in picks {
                    if score.is_game_complete() {
                        break;
                    }
                    let up = count(score.standing_pins());
                    bowl(&mut score, pick % (up + 1));
                    rolls += 1;
                }

                prop_assert!(score.is_game_complete());
                prop_assert!((11..=21).contains(&rolls));
                prop_assert!(score.total_score() <= 300);

                let totals: Vec<u32> = score.frames().iter().map(|f| f.cumulative_score.unwrap_or(0)).collect();
                prop_assert!(totals.windows(2).all(|w| w[0] <= w[1]));
                prop_assert!(score.frames().iter().all(|f| f.cumulative_score.is_some()));
                prop_assert!(score.frames().iter().all(|f| f.pins() <= 30));
            }
        }
    }
}
