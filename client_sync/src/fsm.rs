//! Client lifecycle state machine

/// Client states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FsmState {
    #[default]
    Idle,
    /// Register sent, waiting for a seat
    Connecting,
    /// Seated, waiting for the match to launch
    Waiting,
    Playing,
    GameOver,
    /// The match was aborted or the connection dropped mid-game
    Disconnected,
}

/// Actions that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAction {
    Connect,
    Registered,
    Rejected,
    Launched,
    GameOver,
    OpponentLeft,
    ConnectionLost,
    Leave,
}

/// Result of a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionResult {
    pub success: bool,
    pub from_state: FsmState,
    pub to_state: FsmState,
    pub action: ClientAction,
}

#[derive(Debug, Default)]
pub struct ClientFsm {
    state: FsmState,
}

impl ClientFsm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FsmState {
        self.state
    }

    pub fn can_transition(&self, action: ClientAction) -> bool {
        self.next_state(action).is_some()
    }

    /// Attempt a transition; invalid ones leave the state untouched
    pub fn transition(&mut self, action: ClientAction) -> TransitionResult {
        let from_state = self.state;
        let next = self.next_state(action);
        if let Some(next) = next {
            self.state = next;
        }
        TransitionResult {
            success: next.is_some(),
            from_state,
            to_state: self.state,
            action,
        }
    }

    fn next_state(&self, action: ClientAction) -> Option<FsmState> {
        use ClientAction as A;
        use FsmState as S;
        match (self.state, action) {
            (S::Idle, A::Connect) => Some(S::Connecting),

            (S::Connecting, A::Registered) => Some(S::Waiting),
            (S::Connecting, A::Rejected | A::ConnectionLost | A::Leave) => Some(S::Idle),

            (S::Waiting, A::Launched) => Some(S::Playing),
            (S::Waiting, A::ConnectionLost | A::Leave) => Some(S::Idle),

            (S::Playing, A::GameOver) => Some(S::GameOver),
            (S::Playing, A::OpponentLeft | A::ConnectionLost) => Some(S::Disconnected),
            (S::Playing, A::Leave) => Some(S::Idle),

            // The server hangs up right after the final result
            (S::GameOver, A::ConnectionLost) => Some(S::GameOver),
            (S::GameOver, A::Leave) => Some(S::Idle),

            (S::Disconnected, A::ConnectionLost) => Some(S::Disconnected),
            (S::Disconnected, A::Leave) => Some(S::Idle),

            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = FsmState::Idle;
    }

    pub fn is_playing(&self) -> bool {
        self.state == FsmState::Playing
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.state, FsmState::GameOver | FsmState::Disconnected)
    }
}
