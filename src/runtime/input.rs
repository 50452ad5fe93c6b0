//! Raw input events and the per-frame input state the engine
//! interprets through the description's control scheme.

use crate::schema::entity::Vec2;
use rustc_hash::FxHashSet;

/// Maximum drag length in world units; longer pulls clamp here so the
/// launch impulse is bounded.
pub const MAX_DRAG: f32 = 160.0;
/// World units of launch velocity per unit of drag length.
pub const DRAG_IMPULSE_SCALE: f32 = 3.0;
/// A drag may only begin this close to the player.
pub const GRAB_RADIUS: f32 = 48.0;
/// Player speed below which it counts as at rest for a new drag.
pub const REST_SPEED: f32 = 5.0;
/// Keyboard acceleration, world units per second squared.
pub const KEYBOARD_ACCEL: f32 = 900.0;
/// Launch speed of spawned projectiles.
pub const PROJECTILE_SPEED: f32 = 420.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }
}

/// A raw input event in world coordinates. The engine translates these
/// through the active control scheme; events the scheme has no use for
/// are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Direction),
    KeyUp(Direction),
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp(Vec2),
}

/// An in-progress slingshot gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    pub origin: Vec2,
    pub current: Vec2,
}

impl DragGesture {
    /// Launch velocity for the gesture: pull back and release, so the
    /// impulse points from the current pointer toward the origin,
    /// scaled by drag length with the length clamped at `MAX_DRAG`.
    pub fn launch_velocity(&self) -> Vec2 {
        let dx = self.origin.x - self.current.x;
        let dy = self.origin.y - self.current.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len < f32::EPSILON {
            return Vec2::default();
        }
        let clamped = len.min(MAX_DRAG);
        Vec2::new(
            dx / len * clamped * DRAG_IMPULSE_SCALE,
            dy / len * clamped * DRAG_IMPULSE_SCALE,
        )
    }
}

/// Accumulated raw input: held keys and the last known pointer.
#[derive(Debug, Default)]
pub struct InputState {
    held: FxHashSet<Direction>,
    pub pointer: Vec2,
    pub pointer_down: bool,
}

impl InputState {
    /// Fold one event into the state. Returns the event back so the
    /// caller can branch on it after bookkeeping.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(dir) => {
                self.held.insert(dir);
            }
            InputEvent::KeyUp(dir) => {
                self.held.remove(&dir);
            }
            InputEvent::PointerDown(at) => {
                self.pointer = at;
                self.pointer_down = true;
            }
            InputEvent::PointerMove(at) => {
                self.pointer = at;
            }
            InputEvent::PointerUp(at) => {
                self.pointer = at;
                self.pointer_down = false;
            }
        }
    }

    pub fn is_held(&self, dir: Direction) -> bool {
        self.held.contains(&dir)
    }

    /// Sum of held directions, unnormalized (diagonals are faster, the
    /// velocity clamp catches the excess).
    pub fn move_vector(&self) -> Vec2 {
        let mut v = Vec2::default();
        for dir in self.held.iter() {
            let unit = dir.unit();
            v.x += unit.x;
            v.y += unit.y;
        }
        v
    }

    pub fn clear(&mut self) {
        self.held.clear();
        self.pointer_down = false;
    }
}
