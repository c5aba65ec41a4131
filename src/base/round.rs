use super::{
    board::{Board, Line, Position, Symbol},
    player::{Player, PlayerKind},
};
use log::{debug, info, trace, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    InProgress,
    Won {
        winner: PlayerKind,
        line: Line,
    },
    Tie,
}

/// Something the round wants the remote peer to know about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundEvent {
    StartGame(Player),
    NextLevelGame(Player),
    NewPlay { position: Position, symbol: Symbol },
}

/// Turn state of a single game between the local player and the remote peer.
///
/// The local player can only mark a cell while the round is running and it is not blocked,
/// i.e. while the remote peer is not expected to move.
#[derive(Clone, Debug)]
pub struct Round {
    board: Board,
    personal: Player,
    computer: Player,
    current: PlayerKind,
    running: bool,
    blocked: bool,
    outcome: Outcome,
    level: u32,
    message: String,
    result: String,
}

impl Round {
    pub fn new(personal: Player, computer: Player) -> Self {
        Self {
            board: Board::new(),
            personal,
            computer,
            current: PlayerKind::Personal,
            running: false,
            blocked: false,
            outcome: Outcome::InProgress,
            level: 1,
            message: String::new(),
            result: String::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self, kind: PlayerKind) -> &Player {
        match kind {
            PlayerKind::Personal => &self.personal,
            PlayerKind::Computer => &self.computer,
        }
    }

    pub fn current_player(&self) -> &Player {
        self.player(self.current)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn set_level(&mut self, level: u32) {
        debug!("Level updated from {} to {}", self.level, level);
        self.level = level;
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    /// The local player won the last finished round.
    pub fn is_winner(&self) -> bool {
        matches!(
            self.outcome,
            Outcome::Won {
                winner: PlayerKind::Personal,
                ..
            }
        )
    }

    /// Start a new round. A next-level round is opened by the remote peer.
    pub fn start(&mut self, next_level: bool) -> RoundEvent {
        self.board.clear();
        self.outcome = Outcome::InProgress;
        self.result.clear();
        self.message = "Game started".to_string();
        self.running = true;
        if next_level {
            info!("Starting next level round, level {}", self.level);
            self.current = PlayerKind::Computer;
            self.blocked = true;
            RoundEvent::NextLevelGame(self.computer.clone())
        } else {
            info!("Starting new round, level {}", self.level);
            self.current = PlayerKind::Personal;
            self.blocked = false;
            RoundEvent::StartGame(self.personal.clone())
        }
    }

    pub fn can_play(&self) -> bool {
        self.running && !self.blocked
    }

    /// The local player marks `position`. Returns the move to relay, or `None` when the click
    /// is ignored.
    pub fn play(&mut self, position: Position) -> Option<RoundEvent> {
        if !self.can_play() {
            trace!(
                "Ignoring click at {:?}: running = {}, blocked = {}",
                position, self.running, self.blocked
            );
            return None;
        }
        if !self.board.is_empty(position) {
            trace!("Ignoring click at {:?}: cell is not empty", position);
            return None;
        }
        let symbol = self.personal.symbol;
        self.mark(position, symbol);
        self.change_player();
        Some(RoundEvent::NewPlay { position, symbol })
    }

    /// The remote peer marks `position`. Returns whether the move was applied.
    pub fn play_remote(&mut self, position: Position) -> bool {
        if !self.running {
            debug!("Ignoring remote play at {:?}: round is not running", position);
            return false;
        }
        if !self.current_player().is_computer() {
            warn!("Ignoring remote play at {:?}: it is not the remote player's turn", position);
            return false;
        }
        if !self.board.is_empty(position) {
            warn!("Ignoring remote play at {:?}: cell is occupied or off the board", position);
            return false;
        }
        let symbol = self.computer.symbol;
        self.mark(position, symbol);
        self.change_player();
        true
    }

    pub fn change_player(&mut self) {
        if self.current_player().is_computer() {
            self.current = PlayerKind::Personal;
            self.blocked = false;
        } else {
            self.current = PlayerKind::Computer;
            self.blocked = true;
        }
        trace!("Current player is now {:?}", self.current);
    }

    fn mark(&mut self, position: Position, symbol: Symbol) {
        debug!("{} marked at {:?}", symbol, position);
        self.board.set(position, symbol);
        self.update_outcome();
    }

    fn update_outcome(&mut self) {
        if let Some(line) = self.board.winning_line() {
            let winner = self.current;
            let name = &self.player(winner).name;
            info!("{} won the round", name);
            self.result = format!("{name} wins!");
            self.outcome = Outcome::Won { winner, line };
            self.running = false;
        } else if self.board.is_tie() {
            info!("Round ended in a tie");
            self.result = "Tie!".to_string();
            self.outcome = Outcome::Tie;
            self.running = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round() -> Round {
        Round::new(Player::personal("You", 0x33b4d6), Player::computer("Computer", 0x2ce0b7))
    }

    #[test]
    fn test_new_round_is_idle() {
        let round = round();
        assert!(!round.is_running());
        assert!(!round.can_play());
        assert_eq!(round.level(), 1);
        assert_eq!(round.clone().play(Position::new(0, 0)), None);
    }

    #[test]
    fn test_start_game() {
        let mut round = round();
        let event = round.start(false);
        assert_eq!(event, RoundEvent::StartGame(round.player(PlayerKind::Personal).clone()));
        assert!(round.is_running());
        assert!(round.can_play());
        assert_eq!(round.current_player().kind, PlayerKind::Personal);
        assert_eq!(round.message(), "Game started");
        assert_eq!(round.result(), "");
    }

    #[test]
    fn test_start_next_level_blocks_local_player() {
        let mut round = round();
        let event = round.start(true);
        assert_eq!(event, RoundEvent::NextLevelGame(round.player(PlayerKind::Computer).clone()));
        assert_eq!(round.current_player().kind, PlayerKind::Computer);
        assert!(round.is_blocked());
        assert_eq!(round.play(Position::new(1, 1)), None);
        assert!(round.play_remote(Position::new(1, 1)));
        assert!(round.can_play());
    }

    #[test]
    fn test_play_switches_turn() {
        let mut round = round();
        round.start(false);
        let event = round.play(Position::new(0, 2));
        assert_eq!(
            event,
            Some(RoundEvent::NewPlay {
                position: Position::new(0, 2),
                symbol: Symbol::X,
            })
        );
        assert!(round.is_blocked());
        assert_eq!(round.current_player().kind, PlayerKind::Computer);

        // Blocked until the remote peer answers.
        assert_eq!(round.play(Position::new(1, 1)), None);

        assert!(round.play_remote(Position::new(1, 1)));
        assert!(!round.is_blocked());
        assert_eq!(round.current_player().kind, PlayerKind::Personal);
        assert_eq!(
            round.board().cell(Position::new(1, 1)).and_then(|c| c.symbol()),
            Some(Symbol::O)
        );
    }

    #[test]
    fn test_occupied_cell_is_ignored() {
        let mut round = round();
        round.start(false);
        round.play(Position::new(0, 0));
        assert!(!round.play_remote(Position::new(0, 0)));
        assert!(round.play_remote(Position::new(2, 2)));
        assert_eq!(round.play(Position::new(2, 2)), None);
        assert!(round.can_play());
    }

    #[test]
    fn test_remote_play_out_of_turn_is_ignored() {
        let mut round = round();
        round.start(false);
        assert!(!round.play_remote(Position::new(0, 0)));
        assert!(round.board().is_empty(Position::new(0, 0)));
    }

    #[test]
    fn test_remote_play_off_board_is_ignored() {
        let mut round = round();
        round.start(false);
        round.play(Position::new(0, 0));
        assert!(!round.play_remote(Position::new(3, 1)));
        assert!(round.is_blocked());
    }

    #[test]
    fn test_local_win() {
        let mut round = round();
        round.start(false);
        round.play(Position::new(0, 0));
        round.play_remote(Position::new(1, 0));
        round.play(Position::new(0, 1));
        round.play_remote(Position::new(1, 1));
        round.play(Position::new(0, 2));

        assert!(!round.is_running());
        assert!(round.is_winner());
        assert_eq!(round.result(), "You wins!");
        match round.outcome() {
            Outcome::Won { winner, line } => {
                assert_eq!(winner, PlayerKind::Personal);
                assert_eq!(line, [Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)]);
            },
            other => panic!("Expected Won, got {:?}", other),
        }

        // The round is over, further input is ignored.
        assert_eq!(round.play(Position::new(2, 2)), None);
        assert!(!round.play_remote(Position::new(2, 2)));
    }

    #[test]
    fn test_remote_win() {
        let mut round = round();
        round.start(false);
        round.play(Position::new(0, 0));
        round.play_remote(Position::new(0, 2));
        round.play(Position::new(1, 0));
        round.play_remote(Position::new(1, 1));
        round.play(Position::new(2, 2));
        round.play_remote(Position::new(2, 0));

        assert!(!round.is_running());
        assert!(!round.is_winner());
        assert_eq!(round.result(), "Computer wins!");
        assert!(matches!(
            round.outcome(),
            Outcome::Won {
                winner: PlayerKind::Computer,
                ..
            }
        ));
    }

    #[test]
    fn test_tie() {
        // X O X
        // X O O
        // O X X
        let mut round = round();
        round.start(false);
        round.play(Position::new(0, 0));
        round.play_remote(Position::new(0, 1));
        round.play(Position::new(0, 2));
        round.play_remote(Position::new(1, 1));
        round.play(Position::new(1, 0));
        round.play_remote(Position::new(2, 0));
        round.play(Position::new(2, 1));
        round.play_remote(Position::new(1, 2));
        round.play(Position::new(2, 2));

        assert!(!round.is_running());
        assert!(!round.is_winner());
        assert_eq!(round.outcome(), Outcome::Tie);
        assert_eq!(round.result(), "Tie!");
    }

    #[test]
    fn test_restart_clears_state() {
        let mut round = round();
        round.start(false);
        round.play(Position::new(0, 0));
        round.set_level(4);
        round.start(false);
        assert!(round.board().is_empty(Position::new(0, 0)));
        assert_eq!(round.outcome(), Outcome::InProgress);
        assert_eq!(round.level(), 4);
    }

    #[test]
    fn test_change_player_toggles() {
        let mut round = round();
        round.start(false);
        round.change_player();
        assert!(round.is_blocked());
        round.change_player();
        assert!(!round.is_blocked());
        assert_eq!(round.current_player().kind, PlayerKind::Personal);
    }
}
