//! Collision geometry, events, and tuning
//!
//! Events are observational only: the simulation appends them and the caller
//! forwards them to audio, particles, or screen shake.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::lane::GutterSide;
use crate::consts::*;

/// Something worth reacting to happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CollisionEvent {
    /// Ball struck a standing pin
    BallPin { pin: usize, pos: Vec2, intensity: f32 },
    /// Two pins collided
    PinPin { a: usize, b: usize, pos: Vec2, intensity: f32 },
    /// Ball dropped into a gutter (once per throw)
    Gutter { side: GutterSide, pos: Vec2, intensity: f32 },
    /// Ball or pin bounced off a deck wall
    Wall { pos: Vec2, intensity: f32 },
}

impl CollisionEvent {
    pub fn pos(&self) -> Vec2 {
        match *self {
            CollisionEvent::BallPin { pos, .. }
            | CollisionEvent::PinPin { pos, .. }
            | CollisionEvent::Gutter { pos, .. }
            | CollisionEvent::Wall { pos, .. } => pos,
        }
    }

    /// Normalized strength, 0-1
    pub fn intensity(&self) -> f32 {
        match *self {
            CollisionEvent::BallPin { intensity, .. }
            | CollisionEvent::PinPin { intensity, .. }
            | CollisionEvent::Gutter { intensity, .. }
            | CollisionEvent::Wall { intensity, .. } => intensity,
        }
    }
}

/// Map an impact speed onto 0-1 against a reference speed
#[inline]
pub fn intensity(speed: f32, reference: f32) -> f32 {
    if reference <= 0.0 {
        return 0.0;
    }
    (speed / reference).clamp(0.0, 1.0)
}

/// Overlap between two circles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the first circle toward the second
    pub normal: Vec2,
    /// Contact point on the first circle's surface
    pub point: Vec2,
    pub penetration: f32,
}

/// Check two circles for overlap.
///
/// Centers closer than 0.1 units are treated as degenerate and skipped: the
/// normal is undefined, and the pair gets resolved once they drift apart.
pub fn circle_contact(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> Option<Contact> {
    let delta = b_pos - a_pos;
    let dist_sq = delta.length_squared();
    let min_dist = a_radius + b_radius;
    if dist_sq >= min_dist * min_dist || dist_sq <= 0.01 {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = delta / dist;
    Some(Contact {
        normal,
        point: a_pos + normal * a_radius,
        penetration: min_dist - dist,
    })
}

/// Reflect velocity off a surface with restitution.
///
/// `restitution = 1` is a perfect mirror: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    velocity - (1.0 + restitution) * velocity.dot(normal) * normal
}

/// Collision response constants.
///
/// One canonical set. Ball dominance over pins is exaggerated on purpose
/// for arcade feel; these are tuning values, not physical constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    /// Share of a ball-pin overlap resolved by moving the ball
    pub ball_overlap_share: f32,
    /// Share of a ball-pin overlap resolved by moving the pin
    pub pin_overlap_share: f32,
    /// Outward-normal pin speed per unit of ball speed
    pub normal_impulse_scale: f32,
    /// Share of ball velocity handed straight to the pin
    pub momentum_transfer: f32,
    /// Sideways pin speed per unit of ball spin
    pub spin_velocity_transfer: f32,
    /// Pin angular velocity per unit of ball spin
    pub spin_angular_transfer: f32,
    pub pin_restitution: f32,
    /// Extra push from the faster pin onto the slower one
    pub push_boost: f32,
    /// Impact speed that topples a standing pin hit by a moving one
    pub knock_threshold: f32,
    /// Impact speed that topples two standing pins pressed together
    pub standing_pair_knock_threshold: f32,
    /// Pin-pin impacts below this emit no event
    pub event_min_impact: f32,
    /// Reference speed for pin-pin event intensity
    pub event_reference_speed: f32,
    /// Ball bounce off the deck side walls
    pub wall_restitution: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            ball_overlap_share: 0.05,
            pin_overlap_share: 1.0,
            normal_impulse_scale: 0.9,
            momentum_transfer: 0.35,
            spin_velocity_transfer: 60.0,
            spin_angular_transfer: 8.0,
            pin_restitution: 0.6,
            push_boost: 0.15,
            knock_threshold: 25.0,
            standing_pair_knock_threshold: 120.0,
            event_min_impact: 10.0,
            event_reference_speed: PIN_MAX_SPEED / 2.0,
            wall_restitution: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_contact_overlap() {
        let contact = circle_contact(Vec2::ZERO, 16.0, Vec2::new(20.0, 0.0), 9.0)
            .expect("circles overlap");
        assert_eq!(contact.normal, Vec2::X);
        assert!((contact.penetration - 5.0).abs() < 1e-5);
        assert_eq!(contact.point, Vec2::new(16.0, 0.0));
    }

    #[test]
    fn test_circle_contact_miss_and_degenerate() {
        assert!(circle_contact(Vec2::ZERO, 16.0, Vec2::new(30.0, 0.0), 9.0).is_none());
        // Touching exactly is not an overlap
        assert!(circle_contact(Vec2::ZERO, 16.0, Vec2::new(25.0, 0.0), 9.0).is_none());
        // Coincident centers are skipped rather than dividing by zero
        assert!(circle_contact(Vec2::ONE, 16.0, Vec2::ONE, 9.0).is_none());
    }

    #[test]
    fn test_reflect_velocity() {
        let v = Vec2::new(100.0, -50.0);
        let mirrored = reflect_velocity(v, Vec2::new(-1.0, 0.0), 1.0);
        assert!((mirrored.x - (-100.0)).abs() < 1e-4);
        assert!((mirrored.y - (-50.0)).abs() < 1e-4);

        let damped = reflect_velocity(v, Vec2::new(-1.0, 0.0), 0.3);
        assert!((damped.x - (-30.0)).abs() < 1e-4);
        assert!((damped.y - (-50.0)).abs() < 1e-4);
    }

    #[test]
    fn test_event_accessors() {
        let event = CollisionEvent::Wall {
            pos: Vec2::new(1.0, 2.0),
            intensity: 0.5,
        };
        assert_eq!(event.pos(), Vec2::new(1.0, 2.0));
        assert_eq!(event.intensity(), 0.5);
        assert_eq!(intensity(900.0, 450.0), 1.0);
        assert_eq!(intensity(-5.0, 450.0), 0.0);
    }
}
