//! Presence sensing geometry and state

use serde::{Deserialize, Serialize};

/// Extra margin around the window in which the pointer still counts as near
pub const DETECTION_RADIUS: i32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Window bounding box: top-left corner plus size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Whether `point` lies within this box grown by `radius` on every side.
    /// Edges are inclusive.
    pub fn contains_within(&self, point: Point, radius: i32) -> bool {
        point.x >= self.x - radius
            && point.x <= self.x + self.width + radius
            && point.y >= self.y - radius
            && point.y <= self.y + self.height + radius
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2,
            y: self.y + self.height / 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opacity {
    Visible,
    Hidden,
}

impl Opacity {
    pub fn alpha(self) -> f32 {
        match self {
            Opacity::Visible => 1.0,
            Opacity::Hidden => 0.0,
        }
    }
}

/// Presence sensor bookkeeping owned by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceState {
    pub sensing_enabled: bool,
    pub detection_radius: i32,
    pub opacity: Opacity,
}

impl PresenceState {
    pub fn new() -> Self {
        Self {
            sensing_enabled: false,
            detection_radius: DETECTION_RADIUS,
            opacity: Opacity::Visible,
        }
    }

    /// Opacity the window should have for this pointer/bounds pair
    pub fn evaluate(&self, pointer: Point, bounds: Rect) -> Opacity {
        if bounds.contains_within(pointer, self.detection_radius) {
            Opacity::Visible
        } else {
            Opacity::Hidden
        }
    }
}

impl Default for PresenceState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Rect = Rect { x: 1000, y: 500, width: 380, height: 240 };

    #[test]
    fn radius_edge_is_inclusive() {
        let presence = PresenceState::new();
        let y = BOUNDS.y + 10;

        assert_eq!(presence.evaluate(Point { x: BOUNDS.x - 200, y }, BOUNDS), Opacity::Visible);
        assert_eq!(presence.evaluate(Point { x: BOUNDS.x - 201, y }, BOUNDS), Opacity::Hidden);

        let right = BOUNDS.x + BOUNDS.width;
        assert_eq!(presence.evaluate(Point { x: right + 200, y }, BOUNDS), Opacity::Visible);
        assert_eq!(presence.evaluate(Point { x: right + 201, y }, BOUNDS), Opacity::Hidden);
    }

    #[test]
    fn vertical_margin_applies_too() {
        let presence = PresenceState::new();
        let x = BOUNDS.x;
        let bottom = BOUNDS.y + BOUNDS.height;

        assert_eq!(presence.evaluate(Point { x, y: BOUNDS.y - 200 }, BOUNDS), Opacity::Visible);
        assert_eq!(presence.evaluate(Point { x, y: BOUNDS.y - 201 }, BOUNDS), Opacity::Hidden);
        assert_eq!(presence.evaluate(Point { x, y: bottom + 200 }, BOUNDS), Opacity::Visible);
        assert_eq!(presence.evaluate(Point { x, y: bottom + 201 }, BOUNDS), Opacity::Hidden);
    }

    #[test]
    fn pointer_inside_window_is_visible() {
        let presence = PresenceState::new();
        assert_eq!(presence.evaluate(BOUNDS.center(), BOUNDS), Opacity::Visible);
    }
}
