use client_sync::{ClientRuntime, FsmState};
use game_core::{AnimationStage, Config, Direction, InputSource, Match, MatchPhase, Side, Viewport};
use glam::DVec2;
use proto::{Codec, ErrorCode, GameSnapshot, PlayerRole, C2S, S2C};

const TICK_MS: u64 = 16;

fn runtime() -> ClientRuntime {
    ClientRuntime::new(
        PlayerRole::Player1,
        "ada",
        "duel",
        Config::two_player(),
        Codec::Json,
    )
}

/// Authoritative match with the client on the left and a remote opponent
fn server_match() -> Match {
    let mut game = Match::new(Config::two_player(), 11);
    game.join(InputSource::Remote);
    game.join(InputSource::Remote);
    game.set_ready(Side::Left);
    game.set_ready(Side::Right);
    game
}

fn seat(client: &mut ClientRuntime) {
    assert!(matches!(client.start(), Some(C2S::Register { .. })));
    client.handle_message(
        S2C::MyPaddle {
            side: Side::Left,
            receiver: "player1".into(),
        },
        0,
    );
    assert_eq!(client.lifecycle(), FsmState::Waiting);
}

#[test]
fn test_mirror_tracks_server() {
    let mut client = runtime();
    seat(&mut client);
    let mut game = server_match();

    game.tick(0);
    client.handle_message(S2C::LaunchGame {}, 0);
    assert_eq!(client.lifecycle(), FsmState::Playing);

    for i in 1..=10 {
        game.tick(i * TICK_MS);
        client.handle_message(S2C::UpdateGameData(GameSnapshot::capture(&game)), i * TICK_MS);
        client.frame(TICK_MS as f64);
    }

    let snap = GameSnapshot::capture(&game);
    client.frame(100.0);
    let ball = client.mirror().ball_position().unwrap();
    assert!(ball.distance(DVec2::new(snap.ball.x, snap.ball.y)) < 1e-9);

    let viewport = Viewport::new(DVec2::ZERO, DVec2::splat(400.0));
    let pixels = client.ball_pixels(&viewport).unwrap();
    assert!((pixels.x - snap.ball.x * 4.0).abs() < 1e-9);
}

#[test]
fn test_own_paddle_predicted_ahead_of_server() {
    let mut client = runtime();
    seat(&mut client);
    let mut game = server_match();
    game.tick(0);
    client.handle_message(S2C::LaunchGame {}, 0);
    client.handle_message(S2C::UpdateGameData(GameSnapshot::capture(&game)), 0);

    let msg = client.key_down("ArrowDown").unwrap();
    assert_eq!(
        msg,
        C2S::PlayerDirection {
            side: Side::Left,
            dir: 1
        }
    );
    client.frame(TICK_MS as f64);

    // Predicted paddle moved before the server heard anything
    let predicted = client.paddle_position(Side::Left).unwrap();
    assert!((predicted.y - 52.5).abs() < 1e-9);
    assert_eq!(client.mirror().paddle_position(Side::Left).unwrap().y, 50.0);

    // Server applies the same input; prediction stays consistent
    game.push_input(Side::Left, Direction::Increase);
    game.tick(TICK_MS);
    client.handle_message(S2C::UpdateGameData(GameSnapshot::capture(&game)), TICK_MS);
    let server_y = game.paddle(Side::Left).unwrap().position;
    assert!((client.paddle_position(Side::Left).unwrap().y - server_y).abs() < 1e-9);
}

#[test]
fn test_stale_snapshots_do_not_rewind() {
    let mut client = runtime();
    seat(&mut client);
    let mut game = server_match();

    game.tick(0);
    let early = GameSnapshot::capture(&game);
    game.tick(TICK_MS);
    game.tick(2 * TICK_MS);
    let late = GameSnapshot::capture(&game);

    client.handle_message(S2C::UpdateGameData(late.clone()), 0);
    client.handle_message(S2C::UpdateGameData(early), 0);
    client.handle_message(S2C::UpdateGameData(late.clone()), 0);

    assert_eq!(client.mirror().last_tick(), Some(late.tick));
    assert_eq!(client.mirror().current(), Some(&late));
}

/// Aim the ball at the right goal and tick until it goes in. Returns the
/// server clock at the goal.
fn drive_to_goal(game: &mut Match) -> u64 {
    game.tick(0);
    {
        let mut ball = game.ball_mut().unwrap();
        ball.pos = DVec2::new(50.0, 50.0);
        ball.dir = DVec2::new(1.0, 0.0);
        ball.speed = DVec2::new(1.0 / TICK_MS as f64, 0.0);
    }
    game.paddle_mut(Side::Right).unwrap().position = 89.0;

    let mut now = 0;
    while game.phase() != MatchPhase::GoalAnimation {
        now += TICK_MS;
        game.tick(now);
    }
    now
}

#[test]
fn test_goal_animation_on_client() {
    let mut client = runtime();
    seat(&mut client);
    let mut game = server_match();
    let now = drive_to_goal(&mut game);

    // Client clock runs 5 s ahead of the server
    let local = now + 5_000;
    client.handle_message(S2C::UpdateGameData(GameSnapshot::capture(&game)), local);

    assert_eq!(client.animation_stage(local), AnimationStage::Goal);
    assert_eq!(client.displayed_goals(local + 600).left, 0);
    assert_eq!(client.animation_stage(local + 1_200), AnimationStage::NewScore);
    assert_eq!(client.displayed_goals(local + 1_200).left, 1);
}

#[test]
fn test_stale_snapshot_keeps_goal_animation() {
    let mut client = runtime();
    seat(&mut client);
    let mut game = server_match();
    game.tick(0);
    let before_goal = GameSnapshot::capture(&game);
    let now = drive_to_goal(&mut game);
    let local = now + 5_000;

    client.handle_message(S2C::UpdateGameData(GameSnapshot::capture(&game)), local);
    assert_eq!(client.animation_stage(local + 600), AnimationStage::OldScore);

    // A late packet from before the goal must not cancel the animation
    assert!(!before_goal.goal);
    client.handle_message(S2C::UpdateGameData(before_goal), local + 100);

    assert_eq!(client.animation_stage(local + 600), AnimationStage::OldScore);
    assert_eq!(client.displayed_goals(local + 600).left, 0);
    assert_eq!(client.animation_stage(local + 1_200), AnimationStage::NewScore);
    assert_eq!(client.displayed_goals(local + 1_200).left, 1);
}

#[test]
fn test_goal_animation_uses_configured_offsets() {
    let config = Config {
        goal_animation_ms: [200, 400, 600],
        ..Config::two_player()
    };
    let mut client = ClientRuntime::new(
        PlayerRole::Player1,
        "ada",
        "duel",
        config.clone(),
        Codec::Json,
    );
    seat(&mut client);
    let mut game = Match::new(config, 11);
    game.join(InputSource::Remote);
    game.join(InputSource::Remote);
    game.set_ready(Side::Left);
    game.set_ready(Side::Right);
    let now = drive_to_goal(&mut game);

    let local = now + 5_000;
    client.handle_message(S2C::UpdateGameData(GameSnapshot::capture(&game)), local);

    assert_eq!(client.animation_stage(local + 100), AnimationStage::Goal);
    assert_eq!(client.animation_stage(local + 300), AnimationStage::OldScore);
    assert_eq!(client.displayed_goals(local + 300).left, 0);
    assert_eq!(client.animation_stage(local + 500), AnimationStage::NewScore);
    assert_eq!(client.displayed_goals(local + 500).left, 1);
    assert_eq!(client.animation_stage(local + 700), AnimationStage::Done);
}

#[test]
fn test_rejection_and_abort() {
    let mut client = runtime();
    client.start();
    client.handle_message(S2C::error(ErrorCode::RoleTaken, "role player1 is already taken"), 0);
    assert_eq!(client.lifecycle(), FsmState::Idle);

    seat(&mut client);
    client.handle_message(S2C::LaunchGame {}, 0);
    client.handle_message(S2C::PlayerDisconnection {}, 0);
    assert_eq!(client.lifecycle(), FsmState::Disconnected);
    assert_eq!(client.stop(), Some(C2S::CloseSocket {}));
    assert_eq!(client.lifecycle(), FsmState::Idle);
    assert_eq!(client.stop(), None);
}

#[test]
fn test_handle_bytes_and_pong() {
    let mut client = runtime();
    seat(&mut client);
    let bytes = Codec::Json.encode(&S2C::Pong { t_ms: 100 }).unwrap();
    client.handle_bytes(&bytes, 140).unwrap();
    assert_eq!(client.last_rtt_ms(), Some(40));
    assert!(client.handle_bytes(b"garbage", 0).is_err());
}

#[test]
fn test_direction_only_sent_while_playing() {
    let mut client = runtime();
    seat(&mut client);
    assert_eq!(client.key_down("w"), None);
    client.handle_message(S2C::LaunchGame {}, 0);
    // Key still held from before launch, release is the next change
    assert_eq!(
        client.key_up("w"),
        Some(C2S::PlayerDirection {
            side: Side::Left,
            dir: 0
        })
    );
}
