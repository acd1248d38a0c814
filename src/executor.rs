use tracing::{debug, info, warn};

use crate::board::{Board, CastleSide, ColoredPiece, Piece};
use crate::coords::Square;
use crate::error::BoardResult;
use crate::movegen::{Move, MoveGenerator};
use crate::projection::{compact, PlacementDelta, Projection};
use crate::render::Renderer;

/// Lifecycle of a single move attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Idle,
    PendingValidate,
    Applied,
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The move was played; `deltas` lists every square whose displayed occupant changed.
    Applied { mv: Move, deltas: Vec<PlacementDelta> },
    /// Illegal, out of turn or without an origin. Nothing changed.
    Rejected,
}

impl MoveOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MoveOutcome::Applied { .. })
    }
}

/// Owns the position and its projection; the only place either is mutated.
#[derive(Debug)]
pub struct MoveExecutor<H> {
    board: Board,
    move_generator: MoveGenerator,
    projection: Projection<H>,
    state: AttemptState,
}

impl<H> MoveExecutor<H> {
    /// Takes ownership of `board` and draws all of its pieces.
    pub fn new<R>(renderer: &mut R, board: Board) -> Self
    where
        R: Renderer<Handle = H>,
    {
        let mut executor = Self {
            board,
            move_generator: MoveGenerator::new(),
            projection: Projection::new(),
            state: AttemptState::Idle,
        };
        executor.projection.redraw(renderer, &executor.board);
        executor
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn move_generator(&self) -> &MoveGenerator {
        &self.move_generator
    }

    pub fn projection(&self) -> &Projection<H> {
        &self.projection
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn attempt_move<R>(&mut self, renderer: &mut R, from: Option<Square>, to: Square) -> MoveOutcome
    where
        R: Renderer<Handle = H>,
    {
        self.state = AttemptState::PendingValidate;

        let Some(from) = from else {
            debug!(%to, "move attempt without an origin");
            return self.reject();
        };
        let Some(mv) = self.move_generator.find_legal_move(&self.board, from, to) else {
            debug!(%from, %to, side = %self.board.side_to_move(), "illegal move rejected");
            return self.reject();
        };

        let is_castle = mv.is_castling;
        let mover = ColoredPiece::new(mv.piece, self.board.side_to_move());

        // Position first: if it refuses the move the projection is still untouched
        if let Err(err) = self.board.apply_move(from, to, is_castle) {
            warn!(%from, %to, %err, "validated move could not be applied");
            return self.reject();
        }

        let log = if is_castle {
            self.project_castle(renderer, &mv, mover)
        } else {
            self.project_ordinary(renderer, &mv)
        };
        debug_assert!(self.projection.is_synced_with(&self.board));

        info!(%from, %to, castle = is_castle, capture = ?mv.captured_piece, "move applied");
        self.state = AttemptState::Applied;
        MoveOutcome::Applied {
            mv,
            deltas: compact(log),
        }
    }

    pub fn attempt_move_notation<R>(&mut self, renderer: &mut R, from: &str, to: &str) -> BoardResult<MoveOutcome>
    where
        R: Renderer<Handle = H>,
    {
        let from = Square::from_algebraic(from)?;
        let to = Square::from_algebraic(to)?;
        Ok(self.attempt_move(renderer, Some(from), to))
    }

    /// Replaces the position from a placement string and redraws every square.
    pub fn load_placement<R>(&mut self, renderer: &mut R, placement: &str) -> BoardResult<Vec<PlacementDelta>>
    where
        R: Renderer<Handle = H>,
    {
        let board = Board::from_placement(placement)?;
        Ok(self.replace_board(renderer, board))
    }

    pub fn load_fen<R>(&mut self, renderer: &mut R, fen: &str) -> BoardResult<Vec<PlacementDelta>>
    where
        R: Renderer<Handle = H>,
    {
        let board = Board::from_fen(fen)?;
        Ok(self.replace_board(renderer, board))
    }

    pub fn reset<R>(&mut self, renderer: &mut R) -> Vec<PlacementDelta>
    where
        R: Renderer<Handle = H>,
    {
        self.replace_board(renderer, Board::initial())
    }

    fn replace_board<R>(&mut self, renderer: &mut R, board: Board) -> Vec<PlacementDelta>
    where
        R: Renderer<Handle = H>,
    {
        self.board = board;
        self.state = AttemptState::Idle;
        info!(fen = %self.board.to_fen(), "position loaded");
        self.projection.redraw(renderer, &self.board)
    }

    fn reject(&mut self) -> MoveOutcome {
        self.state = AttemptState::Rejected;
        MoveOutcome::Rejected
    }

    /// King and rook both leave their squares, then both are drawn on the castled squares.
    fn project_castle<R>(&mut self, renderer: &mut R, mv: &Move, king: ColoredPiece) -> Vec<PlacementDelta>
    where
        R: Renderer<Handle = H>,
    {
        let color = king.color;
        let side = CastleSide::from_king_move(mv.from, mv.to);
        let rook_from = side.rook_origin(color);
        let rook_to = side.rook_destination(color);

        let mut log = Vec::new();
        self.projection.remove(renderer, mv.from, &mut log);
        self.projection.remove(renderer, rook_from, &mut log);
        self.projection.insert(renderer, mv.to, king, &mut log);
        self.projection
            .insert(renderer, rook_to, ColoredPiece::new(Piece::Rook, color), &mut log);
        log
    }

    /// Captured image goes first, then the mover is redrawn on its destination
    /// as whatever the position now holds there (a queen after promotion).
    fn project_ordinary<R>(&mut self, renderer: &mut R, mv: &Move) -> Vec<PlacementDelta>
    where
        R: Renderer<Handle = H>,
    {
        let mut log = Vec::new();
        self.projection.remove(renderer, mv.captured_square(), &mut log);
        self.projection.remove(renderer, mv.from, &mut log);
        if let Some(placed) = self.board.piece_at(mv.to) {
            self.projection.insert(renderer, mv.to, placed, &mut log);
        }
        log
    }
}
