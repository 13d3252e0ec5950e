use glam::DVec2;
use serde::{Deserialize, Serialize};

/// One of the four arena walls; also names the paddle guarding it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Join order used when assigning sides to players
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
            Side::Top => 2,
            Side::Bottom => 3,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }

    /// Left/right paddles slide along y, top/bottom along x
    pub fn moves_vertically(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    /// Unit normal pointing from this wall into the arena
    pub fn inward(self) -> DVec2 {
        match self {
            Side::Left => DVec2::X,
            Side::Right => DVec2::NEG_X,
            Side::Top => DVec2::Y,
            Side::Bottom => DVec2::NEG_Y,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Top => "top",
            Side::Bottom => "bottom",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Side {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            "top" => Ok(Side::Top),
            "bottom" => Ok(Side::Bottom),
            _ => Err(()),
        }
    }
}

/// Validated paddle direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Decrease,
    #[default]
    Stop,
    Increase,
}

impl Direction {
    pub fn as_i8(self) -> i8 {
        match self {
            Direction::Decrease => -1,
            Direction::Stop => 0,
            Direction::Increase => 1,
        }
    }
}

impl TryFrom<i8> for Direction {
    type Error = i8;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Direction::Decrease),
            0 => Ok(Direction::Stop),
            1 => Ok(Direction::Increase),
            other => Err(other),
        }
    }
}

/// Paddle component
#[derive(Debug, Clone, Copy)]
pub struct Paddle {
    pub side: Side,
    pub position: f64, // offset along the movement axis
    pub length: f64,
    pub thickness: f64,
    pub speed: f64, // units per ms
}

impl Paddle {
    pub fn new(side: Side, position: f64, config: &crate::Config) -> Self {
        Self {
            side,
            position,
            length: config.paddle_length,
            thickness: config.paddle_thickness,
            speed: config.paddle_speed,
        }
    }

    /// Move along the axis, but only if the new position stays strictly
    /// inside `(min, max)`. A paddle at the edge stops dead instead of being
    /// clamped. Returns whether the paddle moved.
    pub fn move_by(&mut self, dir: i8, dt_ms: f64, (min, max): (f64, f64)) -> bool {
        if dir == 0 {
            return false;
        }
        let new_pos = self.position + dir as f64 * self.speed * dt_ms;
        if new_pos > min && new_pos < max {
            self.position = new_pos;
            true
        } else {
            false
        }
    }
}

/// Movement intent for paddle
#[derive(Debug, Clone, Copy, Default)]
pub struct PaddleIntent {
    pub dir: i8, // -1 = toward lower coordinate, 0 = stop, 1 = toward higher
}

impl PaddleIntent {
    pub fn new() -> Self {
        Self::default()
    }
}

/// What drives a paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// Local keyboard, fed through the input queue
    Human,
    /// Computer opponent steered by the AI system
    LocalAi,
    /// Direction updates arriving over the network
    Remote,
}

/// Planning state of an AI-driven paddle
#[derive(Debug, Clone, Copy, Default)]
pub struct AiBrain {
    pub objective: Option<f64>,
    pub next_plan_ms: u64,
}

/// Ball component - the pong ball
#[derive(Debug, Clone, Copy)]
pub struct Ball {
    pub pos: DVec2,
    pub dir: DVec2,   // each component in [-1, 1]
    pub speed: DVec2, // per-axis speed, units per ms
    pub radius: f64,
    pub speed_increment: f64,
    pub last_move_ms: Option<u64>,
}

impl Ball {
    pub fn new(pos: DVec2, dir: DVec2, speed: DVec2, config: &crate::Config) -> Self {
        Self {
            pos,
            dir,
            speed,
            radius: config.ball_radius,
            speed_increment: config.ball_speed_increment,
            last_move_ms: None,
        }
    }

    /// Integrate one step. Deltas outside the accepted band are a stall
    /// (backgrounded tab, scheduler hiccup) and the step is dropped.
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        if !(crate::Params::MIN_DT_MS..=crate::Params::MAX_DT_MS).contains(&dt_ms) {
            return false;
        }
        self.pos += self.dir * self.speed * dt_ms;
        true
    }

    pub fn speed_up(&mut self) {
        self.speed += DVec2::splat(self.speed_increment);
    }

    /// Reset to `center` at base speed, heading into a random quadrant
    pub fn kickoff(&mut self, center: DVec2, base_speed: DVec2, rng: &mut crate::GameRng) {
        use rand::Rng;
        let quadrant: u8 = rng.0.gen_range(0..4);
        self.dir = match quadrant {
            0 => DVec2::new(1.0, 1.0),
            1 => DVec2::new(1.0, -1.0),
            2 => DVec2::new(-1.0, 1.0),
            _ => DVec2::new(-1.0, -1.0),
        };
        self.pos = center;
        self.speed = base_speed;
        self.last_move_ms = None;
    }
}
