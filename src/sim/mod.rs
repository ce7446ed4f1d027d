//! Deterministic simulation module
//!
//! All lane physics lives here. Given the same timestep sequence, launch
//! parameters, and seed, a throw always plays out identically:
//! - Caller-driven timestep, split into speed-scaled substeps
//! - Seeded RNG only, owned by the `PhysicsSystem`
//! - Stable iteration order (by pin number)
//! - No rendering, audio, or platform dependencies

pub mod ball;
pub mod collision;
pub mod lane;
pub mod physics;
pub mod pin;

pub use ball::{Ball, BallPhase};
pub use collision::{CollisionEvent, CollisionTuning, Contact, circle_contact, reflect_velocity};
pub use lane::{DeckBounds, GutterSide, Lane, LaneGeometry, OilPattern};
pub use physics::{PhysicsSystem, knocked_mask, substeps_for_speed};
pub use pin::{Pin, PinState};
