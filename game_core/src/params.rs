/// Game tuning parameters, expressed in normalized arena units (0..100)
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Arena
    pub const ARENA_SIZE: f64 = 100.0;
    pub const GOAL_LINE_INSET: f64 = 5.0; // 10px of a 200px arena

    // Paddle
    pub const PADDLE_LENGTH: f64 = 21.0; // 42px of a 200px arena
    pub const PADDLE_THICKNESS: f64 = 2.0; // 6px of a 300px arena
    pub const PADDLE_SPEED: f64 = 2.5 / 16.0; // units per ms

    // Ball
    pub const BALL_RADIUS: f64 = 1.0;
    pub const BALL_SPEED_X: f64 = (2.0 / 12.0) / 300.0 * 100.0; // units per ms
    pub const BALL_SPEED_Y: f64 = (2.0 / 12.0) / 200.0 * 100.0; // units per ms
    pub const BALL_SPEED_INCREMENT: f64 = (1.0 / 64.0) / 200.0 * 100.0;

    // Walls (2-player mode only)
    pub const WALL_BOUNCE: f64 = 1.1;
    pub const WALL_MAX_VY: f64 = 1.1;
    pub const WALL_PUSH_MAX_STEPS: u32 = 256;
    pub const WALL_CLEARANCE: f64 = 1e-6;

    // Score
    pub const SCORE_LIMIT_TWO_PLAYER: u32 = 11;
    pub const SCORE_LIMIT_FOUR_PLAYER: u32 = 10;

    // Goal animation windows, ms after the goal
    pub const GOAL_ANIMATION_MS: [u64; 3] = [500, 1000, 1500];

    // Frame delta band accepted by the ball integrator, ms
    pub const MIN_DT_MS: f64 = 3.0;
    pub const MAX_DT_MS: f64 = 100.0;

    // Local AI
    pub const AI_REFRESH_MS: u64 = 1000;
    pub const AI_DEAD_ZONE: f64 = 1.5;
}
