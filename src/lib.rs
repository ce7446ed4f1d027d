//! Tenpin - bowling lane physics and ten-frame scoring
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lane, ball, pins, collisions)
//! - `scoring`: Ten-frame score card state machine
//! - `game`: Roll-by-roll session driving the simulation and score card
//! - `settings`: Data-driven lane and collision tuning

pub mod game;
pub mod scoring;
pub mod settings;
pub mod sim;

pub use game::{BowlingGame, RollPhase, TickOutcome};
pub use scoring::{BonusMessage, Frame, ScoreResult, ScoreSystem};
pub use settings::{OilPatternPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz render tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Pins in a full rack
    pub const PIN_COUNT: usize = 10;
    /// Frames in a game
    pub const FRAME_COUNT: usize = 10;

    /// Lane dimensions (bowler at the bottom, pins at the top)
    pub const LANE_WIDTH: f32 = 300.0;
    pub const LANE_HEIGHT: f32 = 1000.0;
    pub const GUTTER_WIDTH: f32 = 30.0;
    /// Pit edge behind the last row of pins
    pub const PIN_DECK_BACK_Y: f32 = 40.0;
    /// Front edge of the pin deck
    pub const PIN_DECK_FRONT_Y: f32 = 240.0;
    /// Pins can slide back onto the lane this far past the deck front
    pub const PIN_DECK_FRONT_SLACK: f32 = 120.0;
    pub const HEAD_PIN_Y: f32 = 200.0;
    /// Center-to-center distance between neighbouring pins
    pub const PIN_SPACING: f32 = 44.0;
    pub const BALL_START_Y: f32 = 900.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 16.0;
    pub const BALL_MASS: f32 = 7.0;
    /// Fastest legal launch
    pub const BALL_MAX_LAUNCH_SPEED: f32 = 900.0;
    /// Slowest legal launch; slower throws are raised to this
    pub const BALL_MIN_LAUNCH_SPEED: f32 = 200.0;
    /// Below this speed the ball counts as stopped
    pub const BALL_STOP_SPEED: f32 = 2.0;
    /// Friction deceleration scale K: decel = (1 - friction) * K per second
    pub const BALL_FRICTION_DECEL: f32 = 500.0;
    /// Speed floor at the foul line, as a fraction of launch speed
    pub const BALL_MIN_SPEED_FRACTION: f32 = 0.05;
    /// Speed floor at the pins
    pub const BALL_MIN_SPEED_FLOOR: f32 = 2.0;
    /// Hook needs at least this much speed to bite
    pub const HOOK_MIN_SPEED: f32 = 15.0;
    pub const HOOK_REFERENCE_SPEED: f32 = 500.0;
    pub const HOOK_SPEED_FACTOR_FLOOR: f32 = 0.5;
    pub const HOOK_MULTIPLIER: f32 = 120.0;
    /// Spin retained per hook application
    pub const SPIN_DECAY: f32 = 0.998;
    /// Share of a pin's reaction impulse the ball absorbs
    pub const BALL_IMPULSE_ABSORPTION: f32 = 0.01;
    /// Ball speed below which the rack may be called "mostly settled"
    pub const BALL_SLOW_SPEED: f32 = 20.0;

    /// Pin defaults
    pub const PIN_RADIUS: f32 = 9.0;
    pub const PIN_MASS: f32 = 1.5;
    pub const PIN_INERTIA: f32 = 0.6;
    pub const PIN_MAX_SPEED: f32 = 650.0;
    /// Scale applied to the `ix*vy - iy*vx` angular impulse term
    pub const PIN_ANGULAR_IMPULSE_SCALE: f32 = 0.00002;
    /// Displacement (in radii) that topples a pin
    pub const PIN_FALL_DISPLACEMENT: f32 = 0.85;
    /// Displacement (in radii) that starts a wobble
    pub const PIN_WOBBLE_DISPLACEMENT: f32 = 0.25;
    /// Wobble amount lost per second
    pub const PIN_WOBBLE_DECAY: f32 = 1.5;
    pub const PIN_WOBBLE_FREQUENCY: f32 = 18.0;
    /// Pop-up window after a hard hit (seconds)
    pub const PIN_AIR_DURATION: f32 = 0.4;
    /// Impact speed above which a falling pin leaves the deck
    pub const PIN_AIR_SPEED_THRESHOLD: f32 = 30.0;
    pub const PIN_AIR_HEIGHT_SCALE: f32 = 0.04;
    pub const PIN_MAX_AIR_HEIGHT: f32 = 18.0;
    /// Fall animation rate (progress per second, eased)
    pub const PIN_FALL_RATE: f32 = 5.0;
    pub const PIN_FALL_BASE_SPIN: f32 = 3.0;
    pub const PIN_FALL_SPIN_PER_SPEED: f32 = 0.02;
    pub const PIN_FALL_SPIN_JITTER: f32 = 0.2;
    /// Angular damping per second
    pub const PIN_ANGULAR_DAMPING: f32 = 3.0;
    /// Sliding friction for fallen pins (proportional per second, then constant)
    pub const PIN_SLIDE_DAMPING: f32 = 2.5;
    pub const PIN_SLIDE_DECEL: f32 = 20.0;
    /// Sliding friction for standing pins (they grip the deck)
    pub const PIN_STANDING_DAMPING: f32 = 8.0;
    pub const PIN_STANDING_DECEL: f32 = 40.0;
    pub const PIN_WALL_RESTITUTION: f32 = 0.5;
    /// Max random lateral kick on a back-wall hit
    pub const PIN_BACK_WALL_DEFLECTION: f32 = 20.0;
    pub const PIN_STANDING_STOP_SPEED: f32 = 1.0;
    pub const PIN_SETTLE_SPEED: f32 = 3.0;
    pub const PIN_SETTLE_ANGULAR_SPEED: f32 = 0.3;
    /// Fall progress needed before a pin may freeze
    pub const PIN_SETTLE_FALL_PROGRESS: f32 = 0.9;
    /// Fall progress needed before a fallen pin counts as stopped
    pub const PIN_STOPPED_FALL_PROGRESS: f32 = 0.95;
    /// Time a fallen pin must rest before the roll can be scored
    pub const PIN_SETTLE_DURATION: f32 = 2.0;

    /// Substep scaling by ball speed
    pub const MIN_SUBSTEPS: u32 = 2;
    pub const MAX_SUBSTEPS: u32 = 8;
    pub const SUBSTEP_LOW_SPEED: f32 = 150.0;
    pub const SUBSTEP_HIGH_SPEED: f32 = 500.0;

    /// Pins still moving that a "mostly settled" rack tolerates
    pub const MOSTLY_SETTLED_MAX_MOVING: usize = 2;
    /// How long a mostly settled rack may linger before the roll is called
    pub const MOSTLY_SETTLED_GRACE: f32 = 1.5;
    /// Hard cap on a single roll, counted once the ball reaches the pins or a gutter (seconds)
    pub const MAX_ROLL_TIME: f32 = 15.0;
}
