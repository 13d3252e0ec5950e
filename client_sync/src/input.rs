//! Keyboard input handling

use game_core::Direction;
use std::collections::BTreeSet;

fn key_direction(key: &str) -> Option<Direction> {
    match key {
        "ArrowUp" | "ArrowLeft" | "w" | "W" | "a" | "A" => Some(Direction::Decrease),
        "ArrowDown" | "ArrowRight" | "s" | "S" | "d" | "D" => Some(Direction::Increase),
        _ => None,
    }
}

/// Tracks held keys and derives the paddle direction from them
#[derive(Debug, Default)]
pub struct KeyTracker {
    held: BTreeSet<String>,
    direction: Direction,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the new direction when it changed
    pub fn key_down(&mut self, key: &str) -> Option<Direction> {
        key_direction(key)?;
        self.held.insert(key.to_string());
        self.refresh()
    }

    pub fn key_up(&mut self, key: &str) -> Option<Direction> {
        key_direction(key)?;
        self.held.remove(key);
        self.refresh()
    }

    /// Drop every held key, e.g. when the window loses focus
    pub fn release_all(&mut self) -> Option<Direction> {
        self.held.clear();
        self.refresh()
    }

    fn refresh(&mut self) -> Option<Direction> {
        let pressed = |dir| self.held.iter().any(|k| key_direction(k) == Some(dir));
        let next = match (pressed(Direction::Decrease), pressed(Direction::Increase)) {
            (true, false) => Direction::Decrease,
            (false, true) => Direction::Increase,
            _ => Direction::Stop,
        };
        if next == self.direction {
            return None;
        }
        self.direction = next;
        Some(next)
    }
}
