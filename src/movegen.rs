use std::collections::BTreeSet;

use crate::board::{Board, CastleSide, Color, ColoredPiece, Piece};
use crate::coords::Square;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2), (-1, 2), (1, -2), (-1, -2),
    (2, 1), (2, -1), (-2, 1), (-2, -1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured_piece: Option<Piece>,
    pub promotion: Option<Piece>,
    pub is_en_passant: bool,
    pub is_castling: bool,
    pub castling_rook_from: Option<Square>,
    pub castling_rook_to: Option<Square>,
}

impl Move {
    pub fn new(from: Square, to: Square, piece: Piece) -> Self {
        Self {
            from,
            to,
            piece,
            captured_piece: None,
            promotion: None,
            is_en_passant: false,
            is_castling: false,
            castling_rook_from: None,
            castling_rook_to: None,
        }
    }

    pub fn new_en_passant(from: Square, to: Square, piece: Piece) -> Self {
        Self {
            captured_piece: Some(Piece::Pawn),
            is_en_passant: true,
            ..Self::new(from, to, piece)
        }
    }

    pub fn new_castling(from: Square, to: Square, rook_from: Square, rook_to: Square) -> Self {
        Self {
            is_castling: true,
            castling_rook_from: Some(rook_from),
            castling_rook_to: Some(rook_to),
            ..Self::new(from, to, Piece::King)
        }
    }

    /// Square the captured piece stood on; differs from `to` only en passant.
    pub fn captured_square(&self) -> Square {
        if self.is_en_passant {
            Square::at(self.to.file(), self.from.rank())
        } else {
            self.to
        }
    }
}

/// Legal move enumeration: pseudo-legal targets per piece, filtered by king safety.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn is_square_under_attack(&self, board: &Board, square: Square, attacker_color: Color) -> bool {
        let attacker_pieces = board.pieces(attacker_color);
        let occupied = board.occupied();
        let attacked_by = |piece: Piece, from: Option<Square>| {
            from.map_or(false, |from| attacker_pieces[piece.index()] & from.mask() != 0)
        };

        // Check pawn attacks: a pawn one rank behind (from its own point of view) on an adjacent file
        let behind = -attacker_color.pawn_direction();
        if attacked_by(Piece::Pawn, square.offset(-1, behind))
            || attacked_by(Piece::Pawn, square.offset(1, behind))
        {
            return true;
        }

        // Check knight attacks
        if KNIGHT_OFFSETS
            .iter()
            .any(|&(df, dr)| attacked_by(Piece::Knight, square.offset(df, dr)))
        {
            return true;
        }

        // Check king attacks
        if KING_OFFSETS
            .iter()
            .any(|&(df, dr)| attacked_by(Piece::King, square.offset(df, dr)))
        {
            return true;
        }

        // Check bishop/queen attacks (diagonals) and rook/queen attacks (orthogonals)
        for (directions, slider) in [(DIAGONALS, Piece::Bishop), (ORTHOGONALS, Piece::Rook)] {
            let sliders = attacker_pieces[slider.index()] | attacker_pieces[Piece::Queen.index()];
            for &(df, dr) in &directions {
                let mut current = square.offset(df, dr);
                while let Some(target) = current {
                    if sliders & target.mask() != 0 {
                        return true;
                    }
                    // Any other piece blocks the ray
                    if occupied & target.mask() != 0 {
                        break;
                    }
                    current = target.offset(df, dr);
                }
            }
        }

        false
    }

    pub fn is_king_in_check(&self, board: &Board, color: Color) -> bool {
        match board.king_square(color) {
            Some(king_square) => self.is_square_under_attack(board, king_square, color.opposite()),
            None => false, // No king found (shouldn't happen in a valid position)
        }
    }

    /// Legal moves of the piece on `from`, for that piece's own color regardless
    /// of whose turn it is. En passant only applies to the side to move.
    pub fn moves_from(&self, board: &Board, from: Square) -> Vec<Move> {
        let Some(mover) = board.piece_at(from) else {
            return Vec::new();
        };
        let en_passant = if mover.color == board.side_to_move() {
            board.en_passant_square()
        } else {
            None
        };

        let mut targets = Vec::new();
        match mover.piece {
            Piece::Pawn => self.pawn_targets(board, from, mover.color, en_passant, &mut targets),
            Piece::Knight => self.step_targets(board, from, mover.color, &KNIGHT_OFFSETS, &mut targets),
            Piece::Bishop => self.slide_targets(board, from, mover.color, &DIAGONALS, &mut targets),
            Piece::Rook => self.slide_targets(board, from, mover.color, &ORTHOGONALS, &mut targets),
            Piece::Queen => {
                self.slide_targets(board, from, mover.color, &DIAGONALS, &mut targets);
                self.slide_targets(board, from, mover.color, &ORTHOGONALS, &mut targets);
            }
            Piece::King => {
                self.step_targets(board, from, mover.color, &KING_OFFSETS, &mut targets);
                self.castle_targets(board, from, mover.color, &mut targets);
            }
        }

        targets
            .into_iter()
            .map(|(to, is_castle)| board.describe_move(from, to, mover, is_castle))
            .filter(|mv| self.leaves_king_safe(board, mv, mover.color))
            .collect()
    }

    /// All legal moves for the side to move.
    pub fn generate_moves(&self, board: &Board) -> Vec<Move> {
        let color = board.side_to_move();
        Square::all()
            .filter(|&square| board.occupancy(color) & square.mask() != 0)
            .flat_map(|square| self.moves_from(board, square))
            .collect()
    }

    /// Destinations shown when the piece on `square` is selected. Evaluated for
    /// the piece's own color even when it is not that color's turn.
    pub fn legal_destinations(&self, board: &Board, square: Square) -> BTreeSet<Square> {
        self.moves_from(board, square).into_iter().map(|mv| mv.to).collect()
    }

    /// Destinations the piece on `square` may actually move to now; empty when
    /// it is not that piece's turn.
    pub fn legal_destinations_for_execution(&self, board: &Board, square: Square) -> BTreeSet<Square> {
        if !self.is_own_turn(board, square) {
            return BTreeSet::new();
        }
        self.legal_destinations(board, square)
    }

    pub fn is_legal_for_display(&self, board: &Board, from: Square, to: Square) -> bool {
        self.moves_from(board, from).iter().any(|mv| mv.to == to)
    }

    pub fn is_legal_for_execution(&self, board: &Board, from: Square, to: Square) -> bool {
        self.find_legal_move(board, from, to).is_some()
    }

    pub fn is_legal_move(&self, board: &Board, from: Square, to: Square) -> bool {
        self.is_legal_for_execution(board, from, to)
    }

    /// The executable move from `from` to `to`, if the side to move may play it.
    pub fn find_legal_move(&self, board: &Board, from: Square, to: Square) -> Option<Move> {
        if !self.is_own_turn(board, from) {
            return None;
        }
        self.moves_from(board, from).into_iter().find(|mv| mv.to == to)
    }

    /// Structural test only: a king travelling two or more files.
    pub fn is_castle_attempt(&self, board: &Board, from: Square, to: Square) -> bool {
        board.piece_at(from).map_or(false, |mover| mover.piece == Piece::King)
            && from.file().abs_diff(to.file()) >= 2
    }

    fn is_own_turn(&self, board: &Board, square: Square) -> bool {
        board
            .piece_at(square)
            .map_or(false, |piece| piece.color == board.side_to_move())
    }

    fn leaves_king_safe(&self, board: &Board, mv: &Move, color: Color) -> bool {
        // Make the move and check if the king is in check
        let mut board_copy = board.clone();
        board_copy.make_move(*mv);
        !self.is_king_in_check(&board_copy, color)
    }

    fn is_enemy(&self, board: &Board, square: Square, color: Color) -> bool {
        board.occupancy(color.opposite()) & square.mask() != 0
    }

    fn is_empty(&self, board: &Board, square: Square) -> bool {
        board.occupied() & square.mask() == 0
    }

    fn pawn_targets(
        &self,
        board: &Board,
        from: Square,
        color: Color,
        en_passant: Option<Square>,
        targets: &mut Vec<(Square, bool)>,
    ) {
        let forward = color.pawn_direction();

        // Single push, then double push from the starting rank
        if let Some(one) = from.offset(0, forward).filter(|&to| self.is_empty(board, to)) {
            targets.push((one, false));
            if from.rank() == color.pawn_start_rank() {
                if let Some(two) = one.offset(0, forward).filter(|&to| self.is_empty(board, to)) {
                    targets.push((two, false));
                }
            }
        }

        // Captures, diagonal moves are only legal onto an enemy or the en passant target
        for df in [-1, 1] {
            if let Some(to) = from.offset(df, forward) {
                if self.is_enemy(board, to, color) || en_passant == Some(to) {
                    targets.push((to, false));
                }
            }
        }
    }

    fn step_targets(
        &self,
        board: &Board,
        from: Square,
        color: Color,
        offsets: &[(i8, i8)],
        targets: &mut Vec<(Square, bool)>,
    ) {
        for &(df, dr) in offsets {
            if let Some(to) = from.offset(df, dr) {
                if board.occupancy(color) & to.mask() == 0 {
                    targets.push((to, false));
                }
            }
        }
    }

    fn slide_targets(
        &self,
        board: &Board,
        from: Square,
        color: Color,
        directions: &[(i8, i8)],
        targets: &mut Vec<(Square, bool)>,
    ) {
        for &(df, dr) in directions {
            let mut current = from.offset(df, dr);
            while let Some(to) = current {
                if self.is_empty(board, to) {
                    targets.push((to, false));
                } else {
                    if self.is_enemy(board, to, color) {
                        targets.push((to, false));
                    }
                    break;
                }
                current = to.offset(df, dr);
            }
        }
    }

    fn castle_targets(&self, board: &Board, from: Square, color: Color, targets: &mut Vec<(Square, bool)>) {
        if from != color.king_home() || self.is_king_in_check(board, color) {
            return;
        }
        let rank = color.back_rank();
        let rook = ColoredPiece::new(Piece::Rook, color);

        for side in CastleSide::BOTH {
            if !board.castling_rights().has(color, side)
                || board.piece_at(side.rook_origin(color)) != Some(rook)
            {
                continue;
            }
            // Check if the path is clear
            if side
                .between_files()
                .iter()
                .any(|&file| !self.is_empty(board, Square::at(file, rank)))
            {
                continue;
            }
            // Check if any of the squares the king moves through are under attack
            if side
                .king_path_files()
                .iter()
                .any(|&file| self.is_square_under_attack(board, Square::at(file, rank), color.opposite()))
            {
                continue;
            }
            targets.push((side.king_destination(color), true));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn squares(list: &[&str]) -> BTreeSet<Square> {
        list.iter().map(|s| sq(s)).collect()
    }

    #[test]
    fn test_initial_destinations() {
        let board = Board::new();
        let generator = MoveGenerator::new();
        assert_eq!(generator.legal_destinations(&board, sq("e2")), squares(&["e3", "e4"]));
        assert_eq!(generator.legal_destinations(&board, sq("b1")), squares(&["a3", "c3"]));
        assert!(generator.legal_destinations(&board, sq("e4")).is_empty());
        assert!(generator.legal_destinations(&board, sq("a1")).is_empty());
        assert_eq!(generator.generate_moves(&board).len(), 20);
    }

    #[test]
    fn test_display_and_execution_predicates_differ() {
        let board = Board::new();
        let generator = MoveGenerator::new();

        // Black's pawn has moves to show, but it is white's turn
        assert_eq!(generator.legal_destinations(&board, sq("e7")), squares(&["e6", "e5"]));
        assert!(generator.legal_destinations_for_execution(&board, sq("e7")).is_empty());
        assert!(generator.is_legal_for_display(&board, sq("e7"), sq("e5")));
        assert!(!generator.is_legal_for_execution(&board, sq("e7"), sq("e5")));
        assert!(!generator.is_legal_move(&board, sq("e7"), sq("e5")));
        assert!(generator.is_legal_move(&board, sq("e2"), sq("e4")));
    }

    #[test]
    fn test_pawn_diagonal_needs_a_capture() {
        let board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let generator = MoveGenerator::new();
        assert_eq!(generator.legal_destinations(&board, sq("e4")), squares(&["e5", "d5"]));
        assert!(!generator.is_legal_move(&board, sq("e4"), sq("f5")));
    }

    #[test]
    fn test_blocked_pawn() {
        let mut board = Board::new();
        let generator = MoveGenerator::new();
        board.apply_move_notation("e2", "e4", false).unwrap();
        board.apply_move_notation("e7", "e5", false).unwrap();
        assert!(generator.legal_destinations(&board, sq("e4")).is_empty());
        assert!(!generator.is_legal_move(&board, sq("e4"), sq("e5")));
    }

    #[test]
    fn test_en_passant() {
        let mut board = Board::new();
        let generator = MoveGenerator::new();
        for (from, to) in [("e2", "e4"), ("d7", "d5"), ("e4", "e5"), ("f7", "f5")] {
            board.apply_move_notation(from, to, false).unwrap();
        }
        let mv = generator.find_legal_move(&board, sq("e5"), sq("f6")).unwrap();
        assert!(mv.is_en_passant);
        assert_eq!(mv.captured_square(), sq("f5"));
        // The d-pawn double step was two plies ago, too late to take it
        assert!(!generator.is_legal_move(&board, sq("e5"), sq("d6")));
    }

    #[test]
    fn test_en_passant_shown_only_for_side_to_move() {
        // d6 is the en passant target for white; black's c7 pawn also touches it diagonally
        let board = Board::from_fen("4k3/2p5/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let generator = MoveGenerator::new();
        assert_eq!(generator.legal_destinations(&board, sq("e5")), squares(&["e6", "d6"]));
        assert_eq!(generator.legal_destinations(&board, sq("c7")), squares(&["c6", "c5"]));
        assert!(!generator.is_legal_for_display(&board, sq("c7"), sq("d6")));
    }

    #[test]
    fn test_promotion_is_one_queen_move() {
        let board = Board::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let generator = MoveGenerator::new();
        let moves = generator.moves_from(&board, sq("a7"));
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].promotion, Some(Piece::Queen));
    }

    #[test]
    fn test_pinned_piece_cannot_leave_the_line() {
        // Knight on e2 pinned by the rook on e8
        let board = Board::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let generator = MoveGenerator::new();
        assert!(generator.legal_destinations(&board, sq("e2")).is_empty());
    }

    #[test]
    fn test_king_cannot_step_into_check() {
        let board = Board::from_fen("4k3/8/8/8/8/8/r7/4K3 w - - 0 1").unwrap();
        let generator = MoveGenerator::new();
        assert_eq!(generator.legal_destinations(&board, sq("e1")), squares(&["d1", "f1"]));
    }

    #[test]
    fn test_check_must_be_answered() {
        let board = Board::from_fen("4k3/8/8/8/8/8/3P4/r3K2R w K - 0 1").unwrap();
        let generator = MoveGenerator::new();
        assert!(generator.is_king_in_check(&board, Color::White));
        // Pawn push does nothing about the check, castling out of check is not allowed
        assert!(generator.legal_destinations(&board, sq("d2")).is_empty());
        assert!(!generator.is_legal_move(&board, sq("e1"), sq("g1")));
        assert_eq!(generator.legal_destinations(&board, sq("e1")), squares(&["e2", "f2"]));
    }

    #[test]
    fn test_castling_both_sides() {
        let board = Board::from_placement("r3k2r/8/8/8/8/8/8/R3K2R").unwrap();
        let generator = MoveGenerator::new();
        let destinations = generator.legal_destinations(&board, sq("e1"));
        assert!(destinations.contains(&sq("g1")));
        assert!(destinations.contains(&sq("c1")));
        assert!(generator.is_castle_attempt(&board, sq("e1"), sq("g1")));
        assert!(!generator.is_castle_attempt(&board, sq("e1"), sq("f1")));
        assert!(!generator.is_castle_attempt(&board, sq("a1"), sq("d1")));
    }

    #[test]
    fn test_no_castling_through_attacked_square() {
        // Black rook on f8 covers f1
        let board = Board::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let generator = MoveGenerator::new();
        assert!(!generator.is_legal_move(&board, sq("e1"), sq("g1")));
        assert!(generator.is_legal_move(&board, sq("e1"), sq("c1")));
    }

    #[test]
    fn test_no_castling_when_blocked_or_revoked() {
        let generator = MoveGenerator::new();
        let blocked = Board::from_fen("4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1").unwrap();
        assert!(!generator.is_legal_move(&blocked, sq("e1"), sq("c1")));
        assert!(generator.is_legal_move(&blocked, sq("e1"), sq("g1")));

        let revoked = Board::from_fen("4k3/8/8/8/8/8/8/R3K2R w Q - 0 1").unwrap();
        assert!(!generator.is_legal_move(&revoked, sq("e1"), sq("g1")));
        assert!(generator.is_legal_move(&revoked, sq("e1"), sq("c1")));
    }

    #[test]
    fn test_square_attacks() {
        let board = Board::new();
        let generator = MoveGenerator::new();
        assert!(generator.is_square_under_attack(&board, sq("f3"), Color::White));
        assert!(generator.is_square_under_attack(&board, sq("d6"), Color::Black));
        assert!(!generator.is_square_under_attack(&board, sq("e4"), Color::White));
        assert!(!generator.is_king_in_check(&board, Color::White));
    }
}
