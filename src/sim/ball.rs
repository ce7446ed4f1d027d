//! The bowling ball
//!
//! The ball only knows its own motion. Lane friction and hook strength are
//! looked up by the caller and handed in, so the ball never touches the lane.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Where the ball is in its throw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallPhase {
    /// At rest on the approach, waiting for `launch`
    Ready,
    /// Rolling on the lane surface or the pin deck
    Rolling,
    /// Rolling down a gutter
    Gutter,
    /// Done for this throw
    Stopped,
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Negative hooks left, positive hooks right
    pub spin: f32,
    pub radius: f32,
    pub mass: f32,
    pub in_gutter: bool,
    pub reached_pins: bool,
    pub stopped: bool,
    /// Speed at launch, used for the minimum speed floor
    pub initial_speed: f32,
    launched: bool,
}

impl Ball {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            spin: 0.0,
            radius: BALL_RADIUS,
            mass: BALL_MASS,
            in_gutter: false,
            reached_pins: false,
            stopped: false,
            initial_speed: 0.0,
            launched: false,
        }
    }

    /// Put the ball back on the approach, ready for a new throw
    pub fn reset(&mut self, pos: Vec2) {
        *self = Self::new(pos);
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    pub fn phase(&self) -> BallPhase {
        if !self.launched {
            BallPhase::Ready
        } else if self.is_stopped() {
            BallPhase::Stopped
        } else if self.in_gutter {
            BallPhase::Gutter
        } else {
            BallPhase::Rolling
        }
    }

    /// Release the ball. Ignored unless the ball is ready on the approach.
    pub fn launch(&mut self, vx: f32, vy: f32, spin: f32) {
        if self.launched {
            log::warn!("launch ignored: ball already thrown, reset it first");
            return;
        }
        self.vel = Vec2::new(vx, vy);
        self.spin = spin;
        self.stopped = false;
        self.launched = true;
        self.initial_speed = self.speed();
    }

    /// Minimum speed the ball keeps while it has not reached the pins.
    ///
    /// Decays from a fraction of the launch speed at the foul line to
    /// `BALL_MIN_SPEED_FLOOR` at the head pin.
    pub fn min_speed_floor(&self, approach_remaining: f32) -> f32 {
        if self.reached_pins {
            return 0.0;
        }
        let start = self.initial_speed * BALL_MIN_SPEED_FRACTION;
        let t = approach_remaining.clamp(0.0, 1.0);
        (BALL_MIN_SPEED_FLOOR + (start - BALL_MIN_SPEED_FLOOR) * t).max(BALL_MIN_SPEED_FLOOR)
    }

    /// Decelerate along the current heading.
    ///
    /// `friction` is the lane coefficient at the ball's position; higher
    /// means slicker. The floor never speeds up a ball already below it.
    pub fn apply_friction(&mut self, friction: f32, approach_remaining: f32, dt: f32) {
        let speed = self.speed();
        if speed <= 0.0 {
            return;
        }
        let decel = (1.0 - friction) * BALL_FRICTION_DECEL * dt;
        let floor = self.min_speed_floor(approach_remaining).min(speed);
        let new_speed = (speed - decel).max(floor);
        self.vel *= new_speed / speed;
    }

    /// Bend the path perpendicular to the heading, proportional to spin.
    ///
    /// Speed magnitude is preserved. Spin bleeds off on every call.
    pub fn apply_hook(&mut self, hook_strength: f32, dt: f32) {
        let speed = self.speed();
        if hook_strength != 0.0 && self.spin != 0.0 && speed > HOOK_MIN_SPEED {
            let speed_factor = (speed / HOOK_REFERENCE_SPEED).max(HOOK_SPEED_FACTOR_FLOOR);
            let perp = self.vel.perp() / speed;
            let push = perp * hook_strength * self.spin * speed_factor * HOOK_MULTIPLIER * dt;
            self.vel = (self.vel + push).normalize_or_zero() * speed;
        }
        self.spin *= SPIN_DECAY;
    }

    /// Take the reaction impulse from a pin hit.
    ///
    /// Pins are far lighter than the ball in arcade terms, so the ball keeps
    /// almost all of its momentum: only `BALL_IMPULSE_ABSORPTION` of the
    /// impulse is applied.
    pub fn handle_pin_collision(&mut self, impulse_x: f32, impulse_y: f32) {
        let impulse = Vec2::new(impulse_x, impulse_y);
        self.vel += impulse * BALL_IMPULSE_ABSORPTION / self.mass;
    }

    /// Drop into a gutter: lock to its centerline and kill lateral motion
    pub fn enter_gutter(&mut self, centerline_x: f32) {
        self.in_gutter = true;
        self.spin = 0.0;
        self.vel.x = 0.0;
        self.pos.x = centerline_x;
    }

    pub fn stop(&mut self) {
        self.stopped = true;
        self.vel = Vec2::ZERO;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped || self.speed() < BALL_STOP_SPEED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launched(vx: f32, vy: f32, spin: f32) -> Ball {
        let mut ball = Ball::new(Vec2::new(150.0, BALL_START_Y));
        ball.launch(vx, vy, spin);
        ball
    }

    #[test]
    fn test_launch_records_initial_speed() {
        let ball = launched(30.0, -400.0, 0.2);
        assert!((ball.initial_speed - Vec2::new(30.0, -400.0).length()).abs() < 1e-4);
        assert_eq!(ball.phase(), BallPhase::Rolling);
        assert!(!ball.is_stopped());
    }

    #[test]
    fn test_second_launch_ignored() {
        let mut ball = launched(0.0, -400.0, 0.0);
        ball.launch(0.0, -900.0, 1.0);
        assert_eq!(ball.vel, Vec2::new(0.0, -400.0));
        assert_eq!(ball.spin, 0.0);

        ball.reset(Vec2::new(150.0, BALL_START_Y));
        assert_eq!(ball.phase(), BallPhase::Ready);
        ball.launch(0.0, -900.0, 1.0);
        assert_eq!(ball.vel, Vec2::new(0.0, -900.0));
    }

    #[test]
    fn test_friction_slows_along_heading() {
        let mut ball = launched(0.0, -400.0, 0.0);
        ball.apply_friction(0.96, 1.0, 0.1);
        // (1 - 0.96) * 500 * 0.1 = 2
        assert!((ball.speed() - 398.0).abs() < 1e-3);
        assert_eq!(ball.vel.x, 0.0);
        assert!(ball.vel.y < 0.0);
    }

    #[test]
    fn test_friction_respects_speed_floor() {
        let mut ball = launched(0.0, -400.0, 0.0);
        // Massive friction for a long time: the floor holds
        for _ in 0..1000 {
            ball.apply_friction(0.0, 1.0, 0.1);
        }
        assert!((ball.speed() - 400.0 * BALL_MIN_SPEED_FRACTION).abs() < 1e-3);
        assert!(ball.speed() > 0.0);

        // Floor decays toward the minimum near the pins
        for _ in 0..1000 {
            ball.apply_friction(0.0, 0.0, 0.1);
        }
        assert!((ball.speed() - BALL_MIN_SPEED_FLOOR).abs() < 1e-3);
    }

    #[test]
    fn test_friction_without_floor_after_pins() {
        let mut ball = launched(0.0, -50.0, 0.0);
        ball.reached_pins = true;
        for _ in 0..100 {
            ball.apply_friction(0.0, 0.0, 0.1);
        }
        assert_eq!(ball.speed(), 0.0);
        assert!(ball.is_stopped());
    }

    #[test]
    fn test_floor_does_not_accelerate() {
        let mut ball = launched(0.0, -400.0, 0.0);
        ball.vel = Vec2::new(0.0, -5.0);
        ball.apply_friction(0.99, 1.0, 0.01);
        assert!(ball.speed() <= 5.0);
    }

    #[test]
    fn test_hook_direction_and_speed() {
        let mut right = launched(0.0, -400.0, 1.0);
        right.apply_hook(1.0, 0.1);
        assert!(right.vel.x > 0.0, "positive spin hooks right");
        assert!((right.speed() - 400.0).abs() < 1e-2);

        let mut left = launched(0.0, -400.0, -1.0);
        left.apply_hook(1.0, 0.1);
        assert!(left.vel.x < 0.0, "negative spin hooks left");
    }

    #[test]
    fn test_hook_inactive_on_oil_or_slow() {
        let mut ball = launched(0.0, -400.0, 1.0);
        ball.apply_hook(0.0, 0.1);
        assert_eq!(ball.vel.x, 0.0);
        assert!((ball.spin - SPIN_DECAY).abs() < 1e-6);

        let mut slow = launched(0.0, -10.0, 1.0);
        slow.apply_hook(1.0, 0.1);
        assert_eq!(slow.vel.x, 0.0);
    }

    #[test]
    fn test_pin_collision_barely_moves_ball() {
        let mut ball = launched(0.0, -500.0, 0.0);
        ball.handle_pin_collision(0.0, 700.0);
        // 700 * 0.01 / 7 = 1
        assert!((ball.vel.y - (-499.0)).abs() < 1e-3);
    }

    #[test]
    fn test_gutter_entry() {
        let mut ball = launched(-80.0, -400.0, 0.7);
        ball.enter_gutter(15.0);
        assert!(ball.in_gutter);
        assert_eq!(ball.vel.x, 0.0);
        assert_eq!(ball.pos.x, 15.0);
        assert_eq!(ball.spin, 0.0);
        assert_eq!(ball.phase(), BallPhase::Gutter);

        ball.stop();
        assert_eq!(ball.phase(), BallPhase::Stopped);
    }
}
