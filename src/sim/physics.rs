//! Simulation tick
//!
//! Advances the ball and the rack by one render frame, split into substeps
//! whose count scales with ball speed so a fast ball cannot skip past a pin.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::ball::Ball;
use super::collision::{CollisionEvent, CollisionTuning, circle_contact, intensity, reflect_velocity};
use super::lane::Lane;
use super::pin::Pin;
use crate::consts::*;

/// Number of substeps for a tick at the given ball speed.
///
/// `MIN_SUBSTEPS` up to `SUBSTEP_LOW_SPEED`, `MAX_SUBSTEPS` from
/// `SUBSTEP_HIGH_SPEED`, linear in between.
pub fn substeps_for_speed(speed: f32) -> u32 {
    if speed <= SUBSTEP_LOW_SPEED {
        return MIN_SUBSTEPS;
    }
    if speed >= SUBSTEP_HIGH_SPEED {
        return MAX_SUBSTEPS;
    }
    let t = (speed - SUBSTEP_LOW_SPEED) / (SUBSTEP_HIGH_SPEED - SUBSTEP_LOW_SPEED);
    let extra = (t * (MAX_SUBSTEPS - MIN_SUBSTEPS) as f32).ceil() as u32;
    (MIN_SUBSTEPS + extra).clamp(MIN_SUBSTEPS, MAX_SUBSTEPS)
}

/// Which pins are down, in pin-number order
pub fn knocked_mask(pins: &[Pin; PIN_COUNT]) -> [bool; PIN_COUNT] {
    std::array::from_fn(|i| !pins[i].standing)
}

/// Orchestrates ball, pins, and lane for one tick at a time.
///
/// Holds no reference to the bodies it moves: the caller owns them and
/// passes them in on every call.
#[derive(Debug, Clone)]
pub struct PhysicsSystem {
    pub lane: Lane,
    pub tuning: CollisionTuning,
    seed: u64,
    rng: Pcg32,
}

impl PhysicsSystem {
    pub fn new(lane: Lane, tuning: CollisionTuning, seed: u64) -> Self {
        Self {
            lane,
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Rewind the random source so the next game replays identically
    pub fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// A full rack of standing pins on this lane
    pub fn rack(&self) -> [Pin; PIN_COUNT] {
        self.lane.pin_positions().map(Pin::new)
    }

    /// A ball waiting on the approach
    pub fn new_ball(&self) -> Ball {
        Ball::new(self.lane.ball_start_position())
    }

    /// Advance the simulation by `dt` seconds and report what collided
    pub fn update(&mut self, ball: &mut Ball, pins: &mut [Pin], dt: f32) -> Vec<CollisionEvent> {
        let mut events = Vec::new();
        if !(dt > 0.0) {
            return events;
        }

        let substeps = substeps_for_speed(ball.speed());
        let step_dt = dt / substeps as f32;
        let deck = self.lane.deck_bounds();

        for _ in 0..substeps {
            self.step_ball(ball, step_dt, &mut events);
            self.collide_ball_pins(ball, pins, &mut events);
            self.collide_pins(pins, &mut events);

            for pin in pins.iter_mut() {
                if let Some(impact) = pin.update(step_dt, &deck, &mut self.rng)
                    && impact > self.tuning.event_min_impact
                {
                    events.push(CollisionEvent::Wall {
                        pos: pin.pos,
                        intensity: intensity(impact, self.tuning.event_reference_speed),
                    });
                }
                pin.check_fall(&mut self.rng);
            }
        }

        events
    }

    fn step_ball(&mut self, ball: &mut Ball, dt: f32, events: &mut Vec<CollisionEvent>) {
        if !ball.is_launched() || ball.stopped {
            return;
        }

        ball.pos += ball.vel * dt;
        let y = ball.pos.y;
        let remaining = self.lane.approach_remaining(y);

        if ball.in_gutter {
            if let Some(side) = self.lane.gutter_at(ball.pos.x) {
                ball.pos.x = self.lane.gutter_centerline(side);
            }
            ball.vel.x = 0.0;
            ball.apply_friction(self.lane.pattern.dry_friction, remaining, dt);
        } else {
            ball.apply_friction(self.lane.friction_at(y), remaining, dt);
            ball.apply_hook(self.lane.hook_strength_at(y), dt);

            if !ball.reached_pins && self.lane.has_reached_pins(y) {
                ball.reached_pins = true;
            }

            if self.lane.is_on_deck(y) {
                self.bounce_ball_off_walls(ball, events);
            } else if let Some(side) = self.lane.gutter_at(ball.pos.x) {
                let speed = ball.speed();
                ball.enter_gutter(self.lane.gutter_centerline(side));
                events.push(CollisionEvent::Gutter {
                    side,
                    pos: ball.pos,
                    intensity: intensity(speed, BALL_MAX_LAUNCH_SPEED),
                });
            }
        }

        // Rolled off the back of the deck into the pit
        if self.lane.is_past_deck(ball.pos.y) {
            ball.stop();
        }
    }

    /// The deck sides are walls; the ball bounces off them weakly
    fn bounce_ball_off_walls(&self, ball: &mut Ball, events: &mut Vec<CollisionEvent>) {
        let left = self.lane.surface_left();
        let right = self.lane.surface_right();

        let (wall_x, normal) = if ball.pos.x - ball.radius < left && ball.vel.x < 0.0 {
            (left, Vec2::X)
        } else if ball.pos.x + ball.radius > right && ball.vel.x > 0.0 {
            (right, Vec2::NEG_X)
        } else {
            return;
        };

        let impact = ball.vel.x.abs();
        ball.pos.x = wall_x + normal.x * ball.radius;
        ball.vel = reflect_velocity(ball.vel, normal, self.tuning.wall_restitution);
        events.push(CollisionEvent::Wall {
            pos: Vec2::new(wall_x, ball.pos.y),
            intensity: intensity(impact, BALL_MAX_LAUNCH_SPEED),
        });
    }

    /// Ball against every standing pin.
    ///
    /// The ball plows through: it gives up only a sliver of the overlap while
    /// the pin is thrown clear and knocked down on contact.
    fn collide_ball_pins(&mut self, ball: &mut Ball, pins: &mut [Pin], events: &mut Vec<CollisionEvent>) {
        if !ball.is_launched() || ball.in_gutter || ball.stopped {
            return;
        }
        let t = self.tuning;

        for (index, pin) in pins.iter_mut().enumerate() {
            if !pin.standing || !pin.is_active() {
                continue;
            }
            let Some(contact) = circle_contact(ball.pos, ball.radius, pin.pos, pin.radius) else {
                continue;
            };
            let n = contact.normal;
            ball.pos -= n * contact.penetration * t.ball_overlap_share;
            pin.pos += n * contact.penetration * t.pin_overlap_share;

            let ball_speed = ball.speed();
            let heading = ball.vel.normalize_or_zero();
            let before = pin.vel;
            pin.vel = n * ball_speed * t.normal_impulse_scale
                + ball.vel * t.momentum_transfer
                + heading.perp() * ball.spin * t.spin_velocity_transfer;
            pin.clamp_speed();
            pin.rotation_vel += ball.spin * t.spin_angular_transfer;

            let reaction = (pin.vel - before) * pin.mass;
            ball.handle_pin_collision(-reaction.x, -reaction.y);

            let push = pin.displacement();
            pin.knock_down(push.x, push.y, &mut self.rng);

            events.push(CollisionEvent::BallPin {
                pin: index,
                pos: contact.point,
                intensity: intensity(ball_speed, BALL_MAX_LAUNCH_SPEED),
            });
        }
    }

    /// Pin against pin: impulse exchange along the contact normal.
    ///
    /// A pair is skipped only when both pins are upright and at rest.
    fn collide_pins(&mut self, pins: &mut [Pin], events: &mut Vec<CollisionEvent>) {
        let t = self.tuning;

        for j in 1..pins.len() {
            let (head, tail) = pins.split_at_mut(j);
            let b = &mut tail[0];
            for (i, a) in head.iter_mut().enumerate() {
                if !a.is_active() || !b.is_active() {
                    continue;
                }
                if a.standing && b.standing && a.is_stopped() && b.is_stopped() {
                    continue;
                }
                let Some(contact) = circle_contact(a.pos, a.radius, b.pos, b.radius) else {
                    continue;
                };
                let n = contact.normal;
                let total_mass = a.mass + b.mass;
                a.pos -= n * contact.penetration * (b.mass / total_mass);
                b.pos += n * contact.penetration * (a.mass / total_mass);

                let closing = (a.vel - b.vel).dot(n);
                if closing <= 0.0 {
                    continue;
                }

                let speed_a = a.speed();
                let speed_b = b.speed();
                let j_mag = (1.0 + t.pin_restitution) * closing / (1.0 / a.mass + 1.0 / b.mass);
                a.apply_impulse(-n.x * j_mag, -n.y * j_mag);
                b.apply_impulse(n.x * j_mag, n.y * j_mag);

                // Faster pin shoves the slower one harder
                let boost = (speed_a - speed_b).abs() * t.push_boost;
                if speed_a > speed_b {
                    b.apply_impulse(n.x * boost * b.mass, n.y * boost * b.mass);
                } else if speed_b > speed_a {
                    a.apply_impulse(-n.x * boost * a.mass, -n.y * boost * a.mass);
                }

                let threshold = if a.standing && b.standing {
                    t.standing_pair_knock_threshold
                } else {
                    t.knock_threshold
                };
                if closing > threshold {
                    for pin in [&mut *a, &mut *b] {
                        let push = pin.displacement();
                        pin.knock_down(push.x, push.y, &mut self.rng);
                    }
                }

                if closing > t.event_min_impact {
                    events.push(CollisionEvent::PinPin {
                        a: i,
                        b: j,
                        pos: contact.point,
                        intensity: intensity(closing, t.event_reference_speed),
                    });
                }
            }
        }
    }

    /// Ball done (stopped or in the pit) and every pin at rest
    pub fn is_settled(&self, ball: &Ball, pins: &[Pin]) -> bool {
        self.ball_done(ball) && pins.iter().all(Pin::is_stopped)
    }

    /// Ball slow and at most a couple of pins still rocking
    pub fn is_mostly_settled(&self, ball: &Ball, pins: &[Pin]) -> bool {
        let ball_slow =
            self.ball_done(ball) || (ball.reached_pins && ball.speed() < BALL_SLOW_SPEED);
        let moving = pins.iter().filter(|p| !p.is_stopped()).count();
        ball_slow && moving <= MOSTLY_SETTLED_MAX_MOVING
    }

    /// Settled, and fallen pins have rested long enough to score the roll
    pub fn is_fully_settled(&self, ball: &Ball, pins: &[Pin]) -> bool {
        self.is_settled(ball, pins) && pins.iter().all(Pin::is_fully_settled)
    }

    fn ball_done(&self, ball: &Ball) -> bool {
        ball.is_stopped() || self.lane.is_past_deck(ball.pos.y)
    }
}
