//! Bowling pins
//!
//! A pin is in exactly one of four states: standing still, standing but
//! wobbling from a near miss, falling, or fallen and settled. Knocked pins
//! keep sliding and spinning until they come to rest on the deck.
//!
//! Every random choice (fall direction tie-break, spin jitter, back-wall
//! deflection) goes through the `Rng` handed in by the caller.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::lane::DeckBounds;
use crate::consts::*;

/// Observable pin state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinState {
    Standing,
    Wobbling,
    Falling,
    Fallen,
}

/// A pin entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Spot on the deck the pin was racked at
    pub rest_pos: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub inertia: f32,
    pub standing: bool,
    pub knocked: bool,
    /// Swept off the deck between rolls; takes no further part in the roll
    pub cleared: bool,

    /// Fall animation, 0 = upright, 1 = flat on the deck
    pub fall_progress: f32,
    /// Direction the pin topples toward (radians)
    pub fall_direction: f32,
    pub rotation: f32,
    pub rotation_vel: f32,

    pub is_wobbling: bool,
    /// Wobble intensity, 0-1, decays over time
    pub wobble_amount: f32,
    pub wobble_phase: f32,
    /// Largest displacement that has started a wobble since the pin was spotted
    pub wobble_peak: f32,

    /// Time since the pin popped off the deck
    pub air_time: f32,
    pub air_height: f32,
    pub peak_air_height: f32,

    /// Time spent at rest after falling
    pub settle_timer: f32,
}

impl Pin {
    pub fn new(rest_pos: Vec2) -> Self {
        Self {
            pos: rest_pos,
            vel: Vec2::ZERO,
            rest_pos,
            radius: PIN_RADIUS,
            mass: PIN_MASS,
            inertia: PIN_INERTIA,
            standing: true,
            knocked: false,
            cleared: false,
            fall_progress: 0.0,
            fall_direction: 0.0,
            rotation: 0.0,
            rotation_vel: 0.0,
            is_wobbling: false,
            wobble_amount: 0.0,
            wobble_phase: 0.0,
            wobble_peak: 0.0,
            air_time: PIN_AIR_DURATION,
            air_height: 0.0,
            peak_air_height: 0.0,
            settle_timer: 0.0,
        }
    }

    /// Re-rack the pin on its spot
    pub fn reset(&mut self) {
        *self = Self::new(self.rest_pos);
    }

    /// Deadwood removal: the pin leaves the deck and stays knocked
    pub fn sweep(&mut self) {
        self.standing = false;
        self.knocked = true;
        self.cleared = true;
        self.vel = Vec2::ZERO;
        self.rotation_vel = 0.0;
        self.fall_progress = 1.0;
        self.is_wobbling = false;
        self.wobble_amount = 0.0;
        self.air_height = 0.0;
        self.air_time = PIN_AIR_DURATION;
    }

    /// Leave a standing pin where it is but clear its motion.
    ///
    /// Its current spot becomes the new rest position for fall detection.
    pub fn respot(&mut self) {
        if !self.standing {
            return;
        }
        self.vel = Vec2::ZERO;
        self.rotation_vel = 0.0;
        self.is_wobbling = false;
        self.wobble_amount = 0.0;
        self.wobble_peak = 0.0;
        self.rest_pos = self.pos;
    }

    /// Active pins take part in collisions
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.cleared
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    #[inline]
    pub fn is_airborne(&self) -> bool {
        self.peak_air_height > 0.0 && self.air_time < PIN_AIR_DURATION
    }

    pub fn state(&self) -> PinState {
        if self.standing {
            if self.is_wobbling {
                PinState::Wobbling
            } else {
                PinState::Standing
            }
        } else if self.is_stopped() {
            PinState::Fallen
        } else {
            PinState::Falling
        }
    }

    /// Displacement from the rack spot
    #[inline]
    pub fn displacement(&self) -> Vec2 {
        self.pos - self.rest_pos
    }

    /// Advance one substep. Returns the impact speed if the pin hit a deck wall.
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, deck: &DeckBounds, rng: &mut R) -> Option<f32> {
        if self.cleared {
            return None;
        }

        // Wobble
        if self.is_wobbling {
            self.wobble_phase += PIN_WOBBLE_FREQUENCY * dt;
            self.wobble_amount -= PIN_WOBBLE_DECAY * dt;
            if self.wobble_amount <= 0.01 {
                self.is_wobbling = false;
                self.wobble_amount = 0.0;
            }
        }

        // Pop: parabola over the air window
        if self.is_airborne() {
            self.air_time = (self.air_time + dt).min(PIN_AIR_DURATION);
            let t = self.air_time / PIN_AIR_DURATION;
            self.air_height = self.peak_air_height * 4.0 * t * (1.0 - t);
            if t >= 1.0 {
                self.air_height = 0.0;
            }
        }

        // Fall animation, easing out
        if !self.standing && self.fall_progress < 1.0 {
            let step = PIN_FALL_RATE * (1.2 - self.fall_progress) * dt;
            self.fall_progress = (self.fall_progress + step).min(1.0);
        }

        // Rotation
        self.rotation += self.rotation_vel * dt;
        self.rotation_vel *= (1.0 - PIN_ANGULAR_DAMPING * dt).max(0.0);

        // Sliding
        self.pos += self.vel * dt;
        let (damping, decel) = if self.standing {
            (PIN_STANDING_DAMPING, PIN_STANDING_DECEL)
        } else {
            (PIN_SLIDE_DAMPING, PIN_SLIDE_DECEL)
        };
        self.vel *= (1.0 - damping * dt).max(0.0);
        let speed = self.speed();
        if speed > 0.0 {
            let slowed = (speed - decel * dt).max(0.0);
            self.vel *= slowed / speed;
        }

        let wall_hit = self.bounce_off_deck(deck, rng);

        // Settle
        if self.standing {
            if self.speed() < PIN_STANDING_STOP_SPEED {
                self.vel = Vec2::ZERO;
            }
        } else if self.speed() < PIN_SETTLE_SPEED
            && self.rotation_vel.abs() < PIN_SETTLE_ANGULAR_SPEED
            && self.fall_progress >= PIN_SETTLE_FALL_PROGRESS
            && !self.is_airborne()
        {
            self.vel = Vec2::ZERO;
            self.rotation_vel = 0.0;
            self.settle_timer += dt;
        } else {
            self.settle_timer = 0.0;
        }

        wall_hit
    }

    fn bounce_off_deck<R: Rng + ?Sized>(&mut self, deck: &DeckBounds, rng: &mut R) -> Option<f32> {
        let r = self.radius;
        let mut impact: Option<f32> = None;
        let mut record = |speed: f32| {
            let speed = speed.abs();
            impact = Some(impact.map_or(speed, |s: f32| s.max(speed)));
        };

        if self.pos.x - r < deck.left {
            self.pos.x = deck.left + r;
            if self.vel.x < 0.0 {
                record(self.vel.x);
                self.vel.x = -self.vel.x * PIN_WALL_RESTITUTION;
            }
        } else if self.pos.x + r > deck.right {
            self.pos.x = deck.right - r;
            if self.vel.x > 0.0 {
                record(self.vel.x);
                self.vel.x = -self.vel.x * PIN_WALL_RESTITUTION;
            }
        }

        if self.pos.y - r < deck.back {
            self.pos.y = deck.back + r;
            if self.vel.y < 0.0 {
                record(self.vel.y);
                self.vel.y = -self.vel.y * PIN_WALL_RESTITUTION;
                self.vel.x += rng.random_range(-1.0..=1.0) * PIN_BACK_WALL_DEFLECTION;
            }
        } else if self.pos.y + r > deck.front {
            self.pos.y = deck.front - r;
            if self.vel.y > 0.0 {
                record(self.vel.y);
                self.vel.y = -self.vel.y * PIN_WALL_RESTITUTION;
            }
        }

        impact
    }

    /// Topple or wobble depending on how far the pin was pushed off its spot.
    ///
    /// A wobble starts only when the push is larger than any seen before, so
    /// a pin left resting off its spot rocks once and then stills.
    pub fn check_fall<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.standing || self.cleared {
            return;
        }
        let d = self.displacement();
        let dist = d.length();
        if dist > PIN_FALL_DISPLACEMENT * self.radius {
            self.knock_down(d.x, d.y, rng);
        } else if dist > PIN_WOBBLE_DISPLACEMENT * self.radius && dist > self.wobble_peak {
            self.wobble_peak = dist;
            let span = PIN_FALL_DISPLACEMENT - PIN_WOBBLE_DISPLACEMENT;
            let amount = ((dist / self.radius - PIN_WOBBLE_DISPLACEMENT) / span).clamp(0.0, 1.0);
            self.is_wobbling = true;
            self.wobble_amount = self.wobble_amount.max(amount);
        }
    }

    /// Start the pin falling. No-op if it is already down.
    ///
    /// Fall direction follows the pin's velocity, then the push `(dx, dy)`,
    /// and only when both are negligible a random heading.
    pub fn knock_down<R: Rng + ?Sized>(&mut self, dx: f32, dy: f32, rng: &mut R) {
        if !self.standing {
            return;
        }
        self.standing = false;
        self.knocked = true;
        self.is_wobbling = false;
        self.wobble_amount = 0.0;
        self.settle_timer = 0.0;

        let speed = self.speed();
        let push = Vec2::new(dx, dy);
        self.fall_direction = if speed > 0.5 {
            self.vel.y.atan2(self.vel.x)
        } else if push.length_squared() > 0.01 {
            push.y.atan2(push.x)
        } else {
            rng.random_range(0.0..TAU)
        };

        let jitter = 1.0 + rng.random_range(-PIN_FALL_SPIN_JITTER..=PIN_FALL_SPIN_JITTER);
        let sign = if self.fall_direction.cos() >= 0.0 { 1.0 } else { -1.0 };
        self.rotation_vel += sign * (PIN_FALL_BASE_SPIN + speed * PIN_FALL_SPIN_PER_SPEED) * jitter;

        if speed > PIN_AIR_SPEED_THRESHOLD {
            self.air_time = 0.0;
            self.air_height = 0.0;
            self.peak_air_height =
                ((speed - PIN_AIR_SPEED_THRESHOLD) * PIN_AIR_HEIGHT_SCALE).min(PIN_MAX_AIR_HEIGHT);
        }
    }

    /// Apply a linear impulse; speed is capped at `PIN_MAX_SPEED`.
    ///
    /// The angular kick uses the velocity before the impulse.
    pub fn apply_impulse(&mut self, impulse_x: f32, impulse_y: f32) {
        let before = self.vel;
        self.vel += Vec2::new(impulse_x, impulse_y) / self.mass;
        self.clamp_speed();

        let torque = impulse_x * before.y - impulse_y * before.x;
        self.rotation_vel += torque * PIN_ANGULAR_IMPULSE_SCALE / self.inertia;
    }

    /// Keep the pin under `PIN_MAX_SPEED`
    pub fn clamp_speed(&mut self) {
        self.vel = self.vel.clamp_length_max(PIN_MAX_SPEED);
    }

    pub fn is_stopped(&self) -> bool {
        if self.cleared {
            return true;
        }
        if self.standing {
            self.speed() < PIN_STANDING_STOP_SPEED
        } else {
            self.speed() < PIN_SETTLE_SPEED
                && self.rotation_vel.abs() < PIN_SETTLE_ANGULAR_SPEED
                && self.fall_progress >= PIN_STOPPED_FALL_PROGRESS
        }
    }

    /// Safe to score: stopped, and fallen pins have rested long enough
    pub fn is_fully_settled(&self) -> bool {
        if self.cleared {
            return true;
        }
        if !self.is_stopped() {
            return false;
        }
        self.standing || (self.settle_timer > PIN_SETTLE_DURATION / 2.0 && !self.is_airborne())
    }
}
