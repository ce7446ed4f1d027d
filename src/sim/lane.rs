//! Lane geometry and oil pattern lookup
//!
//! The lane runs top to bottom: pins sit near `y = 0`, the bowler near
//! `y = height`. A ball rolls toward decreasing `y`. Friction and hook are
//! piecewise-constant in `y` with a single breakpoint at `oil_end_y`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Which gutter a ball dropped into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GutterSide {
    Left,
    Right,
}

/// Friction profile of a lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OilPattern {
    /// Friction coefficient in the oiled zone (`y < oil_end_y`)
    pub oil_friction: f32,
    /// Friction coefficient in the dry zone
    pub dry_friction: f32,
    /// Hook strength in the dry zone (always zero on oil)
    pub hook_strength: f32,
    /// Boundary between the dry zone and the oiled zone
    pub oil_end_y: f32,
}

impl Default for OilPattern {
    fn default() -> Self {
        Self {
            oil_friction: 0.985,
            dry_friction: 0.96,
            hook_strength: 1.0,
            oil_end_y: 560.0,
        }
    }
}

/// Static lane bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneGeometry {
    pub width: f32,
    pub height: f32,
    pub gutter_width: f32,
    pub pin_deck_back_y: f32,
    pub pin_deck_front_y: f32,
    pub head_pin_y: f32,
    pub pin_spacing: f32,
    pub ball_start_y: f32,
}

impl Default for LaneGeometry {
    fn default() -> Self {
        Self {
            width: LANE_WIDTH,
            height: LANE_HEIGHT,
            gutter_width: GUTTER_WIDTH,
            pin_deck_back_y: PIN_DECK_BACK_Y,
            pin_deck_front_y: PIN_DECK_FRONT_Y,
            head_pin_y: HEAD_PIN_Y,
            pin_spacing: PIN_SPACING,
            ball_start_y: BALL_START_Y,
        }
    }
}

/// Walls a pin bounces off
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeckBounds {
    pub left: f32,
    pub right: f32,
    /// Back wall (pit side, smallest y)
    pub back: f32,
    /// Front limit (bowler side, largest y)
    pub front: f32,
}

/// A lane: geometry plus the selected oil pattern
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lane {
    pub geometry: LaneGeometry,
    pub pattern: OilPattern,
}

impl Lane {
    pub fn new(geometry: LaneGeometry, pattern: OilPattern) -> Self {
        Self { geometry, pattern }
    }

    /// Oil friction before the breakpoint, dry friction after
    #[inline]
    pub fn friction_at(&self, y: f32) -> f32 {
        if y < self.pattern.oil_end_y {
            self.pattern.oil_friction
        } else {
            self.pattern.dry_friction
        }
    }

    /// Zero on oil, the pattern's hook strength on the dry boards
    #[inline]
    pub fn hook_strength_at(&self, y: f32) -> f32 {
        if y < self.pattern.oil_end_y {
            0.0
        } else {
            self.pattern.hook_strength
        }
    }

    /// Left edge of the playable lane surface
    #[inline]
    pub fn surface_left(&self) -> f32 {
        self.geometry.gutter_width
    }

    /// Right edge of the playable lane surface
    #[inline]
    pub fn surface_right(&self) -> f32 {
        self.geometry.width - self.geometry.gutter_width
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.geometry.width / 2.0
    }

    /// Gutter the x coordinate falls into, if any
    pub fn gutter_at(&self, x: f32) -> Option<GutterSide> {
        if x < self.surface_left() {
            Some(GutterSide::Left)
        } else if x > self.surface_right() {
            Some(GutterSide::Right)
        } else {
            None
        }
    }

    pub fn is_in_gutter(&self, x: f32) -> bool {
        self.gutter_at(x).is_some()
    }

    pub fn is_on_lane_surface(&self, x: f32, y: f32) -> bool {
        !self.is_in_gutter(x) && y >= self.geometry.pin_deck_back_y && y <= self.geometry.height
    }

    /// X coordinate a gutter ball is locked to
    pub fn gutter_centerline(&self, side: GutterSide) -> f32 {
        let half = self.geometry.gutter_width / 2.0;
        match side {
            GutterSide::Left => half,
            GutterSide::Right => self.geometry.width - half,
        }
    }

    pub fn ball_start_position(&self) -> Vec2 {
        Vec2::new(self.center_x(), self.geometry.ball_start_y)
    }

    /// Canonical rack, indexed by pin number - 1.
    ///
    /// Pin 1 (head pin) is nearest the bowler; pins 7-10 form the back row,
    /// numbered left to right from the bowler's view.
    pub fn pin_positions(&self) -> [Vec2; PIN_COUNT] {
        let s = self.geometry.pin_spacing;
        let row_gap = s * 3f32.sqrt() / 2.0;
        let cx = self.center_x();
        let y0 = self.geometry.head_pin_y;
        let row = |n: f32| y0 - row_gap * n;
        [
            Vec2::new(cx, row(0.0)),
            Vec2::new(cx - s * 0.5, row(1.0)),
            Vec2::new(cx + s * 0.5, row(1.0)),
            Vec2::new(cx - s, row(2.0)),
            Vec2::new(cx, row(2.0)),
            Vec2::new(cx + s, row(2.0)),
            Vec2::new(cx - s * 1.5, row(3.0)),
            Vec2::new(cx - s * 0.5, row(3.0)),
            Vec2::new(cx + s * 0.5, row(3.0)),
            Vec2::new(cx + s * 1.5, row(3.0)),
        ]
    }

    pub fn deck_bounds(&self) -> DeckBounds {
        DeckBounds {
            left: self.surface_left(),
            right: self.surface_right(),
            back: self.geometry.pin_deck_back_y,
            front: self.geometry.pin_deck_front_y + PIN_DECK_FRONT_SLACK,
        }
    }

    /// Fraction of the approach still ahead of the ball: 1 at the start
    /// position, 0 at the head pin.
    pub fn approach_remaining(&self, y: f32) -> f32 {
        let span = self.geometry.ball_start_y - self.geometry.head_pin_y;
        if span <= 0.0 {
            return 0.0;
        }
        ((y - self.geometry.head_pin_y) / span).clamp(0.0, 1.0)
    }

    /// Whether a ball centered at `y` has come level with the head pin
    #[inline]
    pub fn has_reached_pins(&self, y: f32) -> bool {
        y <= self.geometry.head_pin_y
    }

    /// Whether a y coordinate is at or beyond the front of the pin deck
    #[inline]
    pub fn is_on_deck(&self, y: f32) -> bool {
        y <= self.geometry.pin_deck_front_y
    }

    /// Whether a y coordinate lies behind the pin deck, in the pit
    #[inline]
    pub fn is_past_deck(&self, y: f32) -> bool {
        y < self.geometry.pin_deck_back_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friction_and_hook_are_piecewise() {
        let lane = Lane::default();
        let oil_end = lane.pattern.oil_end_y;

        assert_eq!(lane.friction_at(oil_end - 1.0), lane.pattern.oil_friction);
        assert_eq!(lane.friction_at(oil_end + 1.0), lane.pattern.dry_friction);
        // Breakpoint itself belongs to the dry zone
        assert_eq!(lane.friction_at(oil_end), lane.pattern.dry_friction);

        assert_eq!(lane.hook_strength_at(oil_end - 1.0), 0.0);
        assert_eq!(lane.hook_strength_at(oil_end + 1.0), lane.pattern.hook_strength);
    }

    #[test]
    fn test_gutters() {
        let lane = Lane::default();
        assert_eq!(lane.gutter_at(5.0), Some(GutterSide::Left));
        assert_eq!(lane.gutter_at(LANE_WIDTH - 5.0), Some(GutterSide::Right));
        assert_eq!(lane.gutter_at(lane.center_x()), None);
        assert!(!lane.is_on_lane_surface(5.0, 500.0));
        assert!(lane.is_on_lane_surface(lane.center_x(), 500.0));
        assert_eq!(lane.gutter_centerline(GutterSide::Left), GUTTER_WIDTH / 2.0);
    }

    #[test]
    fn test_pin_positions_triangle() {
        let lane = Lane::default();
        let pins = lane.pin_positions();

        // Head pin is nearest the bowler
        let head_y = pins[0].y;
        assert!(pins.iter().skip(1).all(|p| p.y < head_y));

        // Back row is 7-8-9-10 left to right
        assert!(pins[6].x < pins[7].x && pins[7].x < pins[8].x && pins[8].x < pins[9].x);
        assert!((pins[6].y - pins[9].y).abs() < 1e-4);

        // Neighbours are one spacing apart
        assert!((pins[0].distance(pins[1]) - PIN_SPACING).abs() < 1e-3);
        assert!((pins[4].distance(pins[8]) - PIN_SPACING).abs() < 1e-3);

        // Whole rack fits on the deck
        let deck = lane.deck_bounds();
        for p in pins {
            assert!(p.x - PIN_RADIUS > deck.left && p.x + PIN_RADIUS < deck.right);
            assert!(p.y - PIN_RADIUS > deck.back);
        }
    }

    #[test]
    fn test_approach_remaining() {
        let lane = Lane::default();
        assert_eq!(lane.approach_remaining(BALL_START_Y), 1.0);
        assert_eq!(lane.approach_remaining(HEAD_PIN_Y), 0.0);
        assert_eq!(lane.approach_remaining(0.0), 0.0);
        let mid = (BALL_START_Y + HEAD_PIN_Y) / 2.0;
        assert!((lane.approach_remaining(mid) - 0.5).abs() < 1e-5);
    }
}
