use crate::{Config, Paddle, Side};
use glam::DVec2;

/// Square, resolution-independent playfield
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
    pub goal_line_inset: f64,
}

impl Arena {
    pub fn new(config: &Config) -> Self {
        Self {
            width: config.arena_size,
            height: config.arena_size,
            goal_line_inset: config.goal_line_inset,
        }
    }

    pub fn extent(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    pub fn center(&self) -> DVec2 {
        self.extent() * 0.5
    }

    pub fn ball_spawn(&self) -> DVec2 {
        self.center()
    }

    /// Length of the axis a paddle on `side` slides along
    pub fn axis_extent(&self, side: Side) -> f64 {
        if side.moves_vertically() {
            self.height
        } else {
            self.width
        }
    }

    /// Starting offset of a paddle along its axis
    pub fn paddle_spawn(&self, side: Side) -> f64 {
        self.axis_extent(side) / 2.0
    }

    /// Fixed coordinate of a paddle's center on the axis normal to its wall
    pub fn paddle_anchor(&self, side: Side, thickness: f64) -> f64 {
        let inset = self.goal_line_inset + thickness / 2.0;
        match side {
            Side::Left => inset,
            Side::Right => self.width - inset,
            Side::Top => inset,
            Side::Bottom => self.height - inset,
        }
    }

    /// Paddle center in arena coordinates
    pub fn paddle_center(&self, paddle: &Paddle) -> DVec2 {
        let anchor = self.paddle_anchor(paddle.side, paddle.thickness);
        if paddle.side.moves_vertically() {
            DVec2::new(anchor, paddle.position)
        } else {
            DVec2::new(paddle.position, anchor)
        }
    }

    /// Allowed range for a paddle's position along its axis
    pub fn paddle_bounds(&self, side: Side, length: f64) -> (f64, f64) {
        let half = length / 2.0;
        (half, self.axis_extent(side) - half)
    }

    /// Walls the point lies beyond. x and y are checked independently so a
    /// corner exit reports two sides.
    pub fn crossed_sides(&self, pos: DVec2) -> Vec<Side> {
        let mut crossed = Vec::with_capacity(2);
        if pos.x < 0.0 {
            crossed.push(Side::Left);
        } else if pos.x > self.width {
            crossed.push(Side::Right);
        }
        if pos.y < 0.0 {
            crossed.push(Side::Top);
        } else if pos.y > self.height {
            crossed.push(Side::Bottom);
        }
        crossed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paddle_anchors() {
        let config = Config::four_player();
        let arena = Arena::new(&config);
        let t = config.paddle_thickness;
        assert_eq!(arena.paddle_anchor(Side::Left, t), 6.0);
        assert_eq!(arena.paddle_anchor(Side::Right, t), 94.0);
        assert_eq!(arena.paddle_anchor(Side::Top, t), 6.0);
        assert_eq!(arena.paddle_anchor(Side::Bottom, t), 94.0);
    }

    #[test]
    fn test_paddle_center_per_axis() {
        let config = Config::four_player();
        let arena = Arena::new(&config);
        let left = Paddle::new(Side::Left, 30.0, &config);
        let top = Paddle::new(Side::Top, 30.0, &config);
        assert_eq!(arena.paddle_center(&left), DVec2::new(6.0, 30.0));
        assert_eq!(arena.paddle_center(&top), DVec2::new(30.0, 6.0));
    }

    #[test]
    fn test_paddle_bounds() {
        let config = Config::two_player();
        let arena = Arena::new(&config);
        assert_eq!(
            arena.paddle_bounds(Side::Left, config.paddle_length),
            (10.5, 89.5)
        );
    }

    #[test]
    fn test_crossed_sides_corner() {
        let arena = Arena::new(&Config::four_player());
        assert!(arena.crossed_sides(DVec2::splat(50.0)).is_empty());
        assert_eq!(arena.crossed_sides(DVec2::new(-0.1, 50.0)), vec![Side::Left]);
        assert_eq!(
            arena.crossed_sides(DVec2::new(100.5, 100.5)),
            vec![Side::Right, Side::Bottom]
        );
    }
}
