use std::collections::BTreeSet;

use tracing::debug;

use crate::board::Board;
use crate::config::BoardConfig;
use crate::coords::{pixel_to_matrix, Square};
use crate::error::BoardResult;
use crate::executor::{MoveExecutor, MoveOutcome};
use crate::movegen::Move;
use crate::projection::PlacementDelta;
use crate::render::Renderer;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    NoSelection,
    PieceSelected {
        square: Square,
        destinations: BTreeSet<Square>,
    },
}

impl SelectionState {
    pub fn selected_square(&self) -> Option<Square> {
        match self {
            SelectionState::NoSelection => None,
            SelectionState::PieceSelected { square, .. } => Some(*square),
        }
    }
}

/// What a click did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Inactive board or a click outside the grid.
    Ignored,
    Selected(Square),
    /// Highlights cleared, nothing selected.
    Cleared,
    Moved { mv: Move, deltas: Vec<PlacementDelta> },
}

/// Drives a [`Renderer`] from raw clicks. Owns the renderer, the position
/// (through the executor) and the selection.
pub struct BoardController<R: Renderer> {
    config: BoardConfig,
    renderer: R,
    executor: MoveExecutor<R::Handle>,
    selection: SelectionState,
}

impl<R: Renderer> BoardController<R> {
    pub fn new(config: BoardConfig, mut renderer: R) -> BoardResult<Self> {
        config.validate()?;
        let board = config.start.to_board()?;
        let executor = MoveExecutor::new(&mut renderer, board);
        Ok(Self {
            config,
            renderer,
            executor,
            selection: SelectionState::NoSelection,
        })
    }

    pub fn board(&self) -> &Board {
        self.executor.board()
    }

    pub fn executor(&self) -> &MoveExecutor<R::Handle> {
        &self.executor
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.config.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.config.active = active;
    }

    /// Handles a click at pixel `(x, y)` relative to the board's top-left corner.
    pub fn click(&mut self, x: i32, y: i32) -> ClickOutcome {
        if !self.config.active {
            return ClickOutcome::Ignored;
        }
        match pixel_to_matrix(x, y, self.config.size_px) {
            Ok(square) => self.click_square(square),
            Err(err) => {
                debug!(%err, "click outside the board");
                ClickOutcome::Ignored
            }
        }
    }

    pub fn click_square(&mut self, square: Square) -> ClickOutcome {
        if !self.config.active {
            return ClickOutcome::Ignored;
        }
        debug!(%square, "clicked square");

        if let SelectionState::PieceSelected { square: from, destinations } = &self.selection {
            if destinations.contains(&square) {
                let from = *from;
                let outcome = self.executor.attempt_move(&mut self.renderer, Some(from), square);
                self.clear_selection();
                return match outcome {
                    MoveOutcome::Applied { mv, deltas } => ClickOutcome::Moved { mv, deltas },
                    MoveOutcome::Rejected => ClickOutcome::Cleared,
                };
            }
        }

        self.select_or_clear(square)
    }

    /// Replaces the position; selection and highlights are dropped.
    pub fn load_placement(&mut self, placement: &str) -> BoardResult<Vec<PlacementDelta>> {
        let deltas = self.executor.load_placement(&mut self.renderer, placement)?;
        self.clear_selection();
        Ok(deltas)
    }

    pub fn load_fen(&mut self, fen: &str) -> BoardResult<Vec<PlacementDelta>> {
        let deltas = self.executor.load_fen(&mut self.renderer, fen)?;
        self.clear_selection();
        Ok(deltas)
    }

    pub fn reset(&mut self) -> Vec<PlacementDelta> {
        let deltas = self.executor.reset(&mut self.renderer);
        self.clear_selection();
        deltas
    }

    /// Treats `square` as a first click: select it if it holds a piece of the
    /// side to move, otherwise drop any selection.
    fn select_or_clear(&mut self, square: Square) -> ClickOutcome {
        let board = self.executor.board();
        let own_piece = board
            .piece_at(square)
            .map_or(false, |piece| piece.color == board.side_to_move());
        if !own_piece {
            self.clear_selection();
            return ClickOutcome::Cleared;
        }

        let destinations = self.executor.move_generator().legal_destinations(board, square);
        let shown: Vec<Square> = destinations.iter().copied().collect();
        self.renderer.clear_highlights();
        self.renderer.highlight_selected(&[square]);
        self.renderer.highlight_destinations(&shown);
        debug!(%square, destinations = shown.len(), "piece selected");

        self.selection = SelectionState::PieceSelected {
            square,
            destinations,
        };
        ClickOutcome::Selected(square)
    }

    fn clear_selection(&mut self) {
        self.selection = SelectionState::NoSelection;
        self.renderer.clear_highlights();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Color, ColoredPiece, Piece};
    use crate::render::TextRenderer;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn controller() -> BoardController<TextRenderer> {
        BoardController::new(BoardConfig::default(), TextRenderer::new()).unwrap()
    }

    #[test]
    fn test_select_highlights_destinations() {
        let mut controller = controller();
        assert_eq!(controller.click_square(sq("e2")), ClickOutcome::Selected(sq("e2")));
        assert_eq!(controller.selection().selected_square(), Some(sq("e2")));

        let renderer = controller.renderer();
        assert_eq!(renderer.selected().iter().copied().collect::<Vec<_>>(), vec![sq("e2")]);
        assert_eq!(
            renderer.destinations().iter().copied().collect::<Vec<_>>(),
            vec![sq("e3"), sq("e4")]
        );
    }

    #[test]
    fn test_second_click_moves() {
        let mut controller = controller();
        controller.click_square(sq("e2"));
        let outcome = controller.click_square(sq("e4"));
        assert!(matches!(outcome, ClickOutcome::Moved { .. }));
        assert_eq!(controller.selection(), &SelectionState::NoSelection);
        assert!(controller.renderer().selected().is_empty());
        assert!(controller.renderer().destinations().is_empty());
        assert_eq!(
            controller.board().piece_at(sq("e4")),
            Some(ColoredPiece::new(Piece::Pawn, Color::White))
        );
        assert_eq!(controller.board().side_to_move(), Color::Black);
    }

    #[test]
    fn test_reselect_other_own_piece() {
        let mut controller = controller();
        controller.click_square(sq("e2"));
        assert_eq!(controller.click_square(sq("g1")), ClickOutcome::Selected(sq("g1")));
        assert_eq!(
            controller.renderer().destinations().iter().copied().collect::<Vec<_>>(),
            vec![sq("f3"), sq("h3")]
        );
    }

    #[test]
    fn test_empty_or_illegal_click_clears() {
        let mut controller = controller();
        controller.click_square(sq("e2"));
        assert_eq!(controller.click_square(sq("e5")), ClickOutcome::Cleared);
        assert_eq!(controller.selection(), &SelectionState::NoSelection);
        assert!(controller.renderer().selected().is_empty());
        assert_eq!(controller.board(), &Board::new());
    }

    #[test]
    fn test_opponent_piece_not_selectable() {
        let mut controller = controller();
        let before = controller.board().clone();
        assert_eq!(controller.click_square(sq("e7")), ClickOutcome::Cleared);
        assert_eq!(controller.click_square(sq("e5")), ClickOutcome::Cleared);
        assert_eq!(controller.selection(), &SelectionState::NoSelection);
        assert_eq!(controller.board(), &before);
    }

    #[test]
    fn test_pixel_clicks() {
        let mut controller = controller();
        // 62px squares: e2 is file 4, row 6
        assert_eq!(controller.click(4 * 62 + 5, 6 * 62 + 5), ClickOutcome::Selected(sq("e2")));
        assert!(matches!(controller.click(4 * 62 + 5, 4 * 62 + 5), ClickOutcome::Moved { .. }));
        assert_eq!(controller.click(600, 10), ClickOutcome::Ignored);
        assert_eq!(controller.click(-4, 10), ClickOutcome::Ignored);
    }

    #[test]
    fn test_inactive_board_ignores_clicks() {
        let mut controller = controller();
        controller.set_active(false);
        assert_eq!(controller.click_square(sq("e2")), ClickOutcome::Ignored);
        assert_eq!(controller.click(10, 10), ClickOutcome::Ignored);
        controller.set_active(true);
        assert_eq!(controller.click_square(sq("e2")), ClickOutcome::Selected(sq("e2")));
    }

    #[test]
    fn test_load_drops_selection() {
        let mut controller = controller();
        controller.click_square(sq("e2"));
        let deltas = controller.load_placement("4k3/8/8/8/8/8/8/4K3").unwrap();
        assert_eq!(deltas.len(), 34);
        assert_eq!(controller.selection(), &SelectionState::NoSelection);
        assert!(controller.renderer().selected().is_empty());
        assert_eq!(controller.renderer().sprite_count(), 2);
    }
}
