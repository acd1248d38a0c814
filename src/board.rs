use std::fmt;

use crate::coords::Square;
use crate::error::{BoardError, BoardResult};
use crate::movegen::{Move, MoveGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Bitboard slot of this piece kind.
    pub fn index(self) -> usize {
        self as usize
    }

    fn letter(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }

    fn from_letter(c: char) -> Option<Piece> {
        match c.to_ascii_lowercase() {
            'p' => Some(Piece::Pawn),
            'n' => Some(Piece::Knight),
            'b' => Some(Piece::Bishop),
            'r' => Some(Piece::Rook),
            'q' => Some(Piece::Queen),
            'k' => Some(Piece::King),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// 0-based rank the pieces of this color start on.
    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn pawn_direction(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn pawn_start_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    pub fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn king_home(self) -> Square {
        Square::at(4, self.back_rank())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// A piece together with its owner. Serialized as a single FEN letter:
/// uppercase for white, lowercase for black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColoredPiece {
    pub piece: Piece,
    pub color: Color,
}

impl ColoredPiece {
    pub fn new(piece: Piece, color: Color) -> Self {
        Self { piece, color }
    }

    pub fn symbol(self) -> char {
        match self.color {
            Color::White => self.piece.letter().to_ascii_uppercase(),
            Color::Black => self.piece.letter(),
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        let piece = Piece::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Self::new(piece, color))
    }
}

impl fmt::Display for ColoredPiece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::KingSide, CastleSide::QueenSide];

    /// Side implied by which way the king travels.
    pub fn from_king_move(from: Square, to: Square) -> Self {
        if to.file() > from.file() {
            CastleSide::KingSide
        } else {
            CastleSide::QueenSide
        }
    }

    pub fn king_destination(self, color: Color) -> Square {
        match self {
            CastleSide::KingSide => Square::at(6, color.back_rank()),
            CastleSide::QueenSide => Square::at(2, color.back_rank()),
        }
    }

    pub fn rook_origin(self, color: Color) -> Square {
        match self {
            CastleSide::KingSide => Square::at(7, color.back_rank()),
            CastleSide::QueenSide => Square::at(0, color.back_rank()),
        }
    }

    pub fn rook_destination(self, color: Color) -> Square {
        match self {
            CastleSide::KingSide => Square::at(5, color.back_rank()),
            CastleSide::QueenSide => Square::at(3, color.back_rank()),
        }
    }

    /// Files that must be empty between king and rook.
    pub(crate) fn between_files(self) -> &'static [u8] {
        match self {
            CastleSide::KingSide => &[5, 6],
            CastleSide::QueenSide => &[1, 2, 3],
        }
    }

    /// Files the king crosses and lands on; none of them may be attacked.
    pub(crate) fn king_path_files(self) -> [u8; 2] {
        match self {
            CastleSide::KingSide => [5, 6],
            CastleSide::QueenSide => [3, 2],
        }
    }
}

/// Castling availability, 4 bits: KQkq. Rights are only ever removed by moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    fn bit(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => 0b0001,
            (Color::White, CastleSide::QueenSide) => 0b0010,
            (Color::Black, CastleSide::KingSide) => 0b0100,
            (Color::Black, CastleSide::QueenSide) => 0b1000,
        }
    }

    pub fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::bit(color, side) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        self.0 &= !Self::bit(color, side);
    }

    pub fn revoke_color(&mut self, color: Color) {
        for side in CastleSide::BOTH {
            self.revoke(color, side);
        }
    }

    fn grant(&mut self, color: Color, side: CastleSide) {
        self.0 |= Self::bit(color, side);
    }

    /// Anything leaving or landing on a rook's home corner ends that corner's right.
    fn revoke_corner(&mut self, square: Square) {
        for color in [Color::White, Color::Black] {
            for side in CastleSide::BOTH {
                if side.rook_origin(color) == square {
                    self.revoke(color, side);
                }
            }
        }
    }

    fn intersect(self, other: CastlingRights) -> CastlingRights {
        CastlingRights(self.0 & other.0)
    }

    fn parse(field: &str) -> Option<CastlingRights> {
        if field == "-" {
            return Some(CastlingRights::NONE);
        }
        let mut rights = CastlingRights::NONE;
        for c in field.chars() {
            match c {
                'K' => rights.grant(Color::White, CastleSide::KingSide),
                'Q' => rights.grant(Color::White, CastleSide::QueenSide),
                'k' => rights.grant(Color::Black, CastleSide::KingSide),
                'q' => rights.grant(Color::Black, CastleSide::QueenSide),
                _ => return None,
            }
        }
        Some(rights)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for (color, side, c) in [
            (Color::White, CastleSide::KingSide, 'K'),
            (Color::White, CastleSide::QueenSide, 'Q'),
            (Color::Black, CastleSide::KingSide, 'k'),
            (Color::Black, CastleSide::QueenSide, 'q'),
        ] {
            if self.has(color, side) {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// The authoritative game position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    white_pieces: [u64; 6], // Pawn, Knight, Bishop, Rook, Queen, King
    black_pieces: [u64; 6], // Pawn, Knight, Bishop, Rook, Queen, King
    side_to_move: Color,
    castling_rights: CastlingRights,
    en_passant_square: Option<Square>,
    halfmove_clock: u16,
    fullmove_number: u16,
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl Board {
    /// The standard starting position.
    pub fn new() -> Self {
        Self {
            white_pieces: [
                0x000000000000FF00, // Pawns
                0x0000000000000042, // Knights
                0x0000000000000024, // Bishops
                0x0000000000000081, // Rooks
                0x0000000000000008, // Queen
                0x0000000000000010, // King
            ],
            black_pieces: [
                0x00FF000000000000, // Pawns
                0x4200000000000000, // Knights
                0x2400000000000000, // Bishops
                0x8100000000000000, // Rooks
                0x0800000000000000, // Queen
                0x1000000000000000, // King
            ],
            side_to_move: Color::White,
            castling_rights: CastlingRights::ALL,
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn initial() -> Self {
        Board::new()
    }

    fn empty() -> Self {
        Self {
            white_pieces: [0; 6],
            black_pieces: [0; 6],
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Parses the simplified placement string: rank-major from rank 8, letters
    /// for pieces, digits for runs of empty squares, '/' ignored and a space
    /// ending the placement. Side to move resets to white and castling rights
    /// are granted wherever king and rook still stand on their home squares.
    pub fn from_placement(placement: &str) -> BoardResult<Self> {
        let board = Board::parse_placement(placement)?;
        if board.waiting_side_in_check() {
            return Err(BoardError::InvalidPlacement(
                "black is in check with white to move".to_string(),
            ));
        }
        Ok(board)
    }

    fn parse_placement(placement: &str) -> BoardResult<Self> {
        let mut board = Board::empty();
        let mut cursor = 0usize;

        for c in placement.chars() {
            match c {
                ' ' => break,
                '/' => continue,
                '1'..='8' => cursor += c as usize - '0' as usize,
                _ => {
                    let piece = ColoredPiece::from_symbol(c).ok_or_else(|| {
                        BoardError::InvalidPlacement(format!("unexpected character '{c}'"))
                    })?;
                    if cursor >= 64 {
                        return Err(BoardError::InvalidPlacement(
                            "more than 64 squares described".to_string(),
                        ));
                    }
                    let square = Square::from_matrix((cursor % 8) as u8, (cursor / 8) as u8)?;
                    board.put(square, piece);
                    cursor += 1;
                }
            }
            if cursor > 64 {
                return Err(BoardError::InvalidPlacement(
                    "more than 64 squares described".to_string(),
                ));
            }
        }

        if cursor != 64 {
            return Err(BoardError::InvalidPlacement(format!(
                "{cursor} squares described, expected 64"
            )));
        }
        for color in [Color::White, Color::Black] {
            let kings = board.pieces(color)[Piece::King.index()].count_ones();
            if kings != 1 {
                return Err(BoardError::InvalidPlacement(format!(
                    "{color} has {kings} kings"
                )));
            }
        }

        board.castling_rights = board.home_castling_rights();
        Ok(board)
    }

    /// Replaces the whole position with `placement`. The current position is
    /// kept if the string does not parse.
    pub fn load_placement(&mut self, placement: &str) -> BoardResult<()> {
        *self = Board::from_placement(placement)?;
        Ok(())
    }

    pub fn from_fen(fen: &str) -> BoardResult<Self> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(BoardError::InvalidFen(format!(
                "expected 4 to 6 fields, found {}",
                fields.len()
            )));
        }

        let mut board = Board::parse_placement(fields[0])
            .map_err(|err| BoardError::InvalidFen(err.to_string()))?;
        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(BoardError::InvalidFen(format!("side to move '{other}'"))),
        };
        if board.waiting_side_in_check() {
            return Err(BoardError::InvalidFen(format!(
                "{} is in check with {} to move",
                board.side_to_move.opposite(),
                board.side_to_move
            )));
        }
        let rights = CastlingRights::parse(fields[2])
            .ok_or_else(|| BoardError::InvalidFen(format!("castling field '{}'", fields[2])))?;
        board.castling_rights = rights.intersect(board.castling_rights);
        board.en_passant_square = match fields[3] {
            "-" => None,
            square => {
                let target = Square::from_algebraic(square)
                    .map_err(|err| BoardError::InvalidFen(err.to_string()))?;
                if !board.is_en_passant_target(target) {
                    return Err(BoardError::InvalidFen(format!(
                        "no pawn can be taken en passant on {target}"
                    )));
                }
                Some(target)
            }
        };
        if let Some(clock) = fields.get(4) {
            board.halfmove_clock = clock
                .parse()
                .map_err(|_| BoardError::InvalidFen(format!("halfmove clock '{clock}'")))?;
        }
        if let Some(number) = fields.get(5) {
            board.fullmove_number = number
                .parse()
                .map_err(|_| BoardError::InvalidFen(format!("fullmove number '{number}'")))?;
        }
        Ok(board)
    }

    pub fn to_fen(&self) -> String {
        let en_passant = self
            .en_passant_square
            .map_or_else(|| "-".to_string(), |square| square.to_algebraic());
        let side = match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };
        format!(
            "{} {} {} {} {} {}",
            self.placement_with(Some('/')),
            side,
            self.castling_rights,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// The '/'-free placement string accepted by [`Board::from_placement`].
    pub fn placement_string(&self) -> String {
        self.placement_with(None)
    }

    fn placement_with(&self, separator: Option<char>) -> String {
        let mut result = String::new();
        for row in 0..8u8 {
            if let Some(separator) = separator.filter(|_| row > 0) {
                result.push(separator);
            }
            let mut empty = 0u8;
            for file in 0..8u8 {
                match self.piece_at(Square::at(file, 7 - row)) {
                    Some(piece) => {
                        if empty > 0 {
                            result.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        result.push(piece.symbol());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                result.push(char::from(b'0' + empty));
            }
        }
        result
    }

    /// The side that just moved may never be left in check.
    fn waiting_side_in_check(&self) -> bool {
        MoveGenerator::new().is_king_in_check(self, self.side_to_move.opposite())
    }

    /// An en passant target is the empty square a pawn of the waiting side
    /// skipped over with its double step, and that pawn is still in front of it.
    fn is_en_passant_target(&self, target: Square) -> bool {
        let victim = self.side_to_move.opposite();
        let skipped = Square::at(target.file(), victim.pawn_start_rank())
            .offset(0, victim.pawn_direction());
        let pawn_square = target.offset(0, victim.pawn_direction());
        skipped == Some(target)
            && self.piece_at(target).is_none()
            && pawn_square.and_then(|square| self.piece_at(square))
                == Some(ColoredPiece::new(Piece::Pawn, victim))
    }

    fn home_castling_rights(&self) -> CastlingRights {
        let mut rights = CastlingRights::NONE;
        for color in [Color::White, Color::Black] {
            if self.piece_at(color.king_home()) != Some(ColoredPiece::new(Piece::King, color)) {
                continue;
            }
            for side in CastleSide::BOTH {
                if self.piece_at(side.rook_origin(color))
                    == Some(ColoredPiece::new(Piece::Rook, color))
                {
                    rights.grant(color, side);
                }
            }
        }
        rights
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    pub(crate) fn pieces(&self, color: Color) -> &[u64; 6] {
        match color {
            Color::White => &self.white_pieces,
            Color::Black => &self.black_pieces,
        }
    }

    fn pieces_mut(&mut self, color: Color) -> &mut [u64; 6] {
        match color {
            Color::White => &mut self.white_pieces,
            Color::Black => &mut self.black_pieces,
        }
    }

    pub(crate) fn occupancy(&self, color: Color) -> u64 {
        self.pieces(color).iter().fold(0u64, |acc, &bb| acc | bb)
    }

    pub(crate) fn occupied(&self) -> u64 {
        self.occupancy(Color::White) | self.occupancy(Color::Black)
    }

    fn put(&mut self, square: Square, piece: ColoredPiece) {
        self.pieces_mut(piece.color)[piece.piece.index()] |= square.mask();
    }

    pub fn piece_at(&self, square: Square) -> Option<ColoredPiece> {
        let mask = square.mask();
        for color in [Color::White, Color::Black] {
            for piece in Piece::ALL {
                if self.pieces(color)[piece.index()] & mask != 0 {
                    return Some(ColoredPiece::new(piece, color));
                }
            }
        }
        None
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        let kings = self.pieces(color)[Piece::King.index()];
        if kings == 0 {
            return None;
        }
        Square::from_index(kings.trailing_zeros() as u8).ok()
    }

    /// Every occupied square with its piece, a1 first.
    pub fn occupants(&self) -> impl Iterator<Item = (Square, ColoredPiece)> + '_ {
        Square::all().filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// Builds the full description of moving `mover` from `from` to `to`:
    /// capture, en passant, automatic queen promotion and the rook leg of a castle.
    pub(crate) fn describe_move(
        &self,
        from: Square,
        to: Square,
        mover: ColoredPiece,
        is_castle: bool,
    ) -> Move {
        let color = mover.color;
        if is_castle && mover.piece == Piece::King {
            let side = CastleSide::from_king_move(from, to);
            return Move::new_castling(from, to, side.rook_origin(color), side.rook_destination(color));
        }

        let mut mv = Move::new(from, to, mover.piece);
        mv.captured_piece = self
            .piece_at(to)
            .filter(|target| target.color != color)
            .map(|target| target.piece);

        if mover.piece == Piece::Pawn {
            if from.file() != to.file()
                && mv.captured_piece.is_none()
                && self.en_passant_square == Some(to)
            {
                mv = Move::new_en_passant(from, to, Piece::Pawn);
            }
            if to.rank() == color.promotion_rank() {
                mv.promotion = Some(Piece::Queen);
            }
        }
        mv
    }

    /// Applies a move without checking legality; callers validate first.
    /// Fails before touching the position if `from` is empty.
    pub fn apply_move(&mut self, from: Square, to: Square, is_castle: bool) -> BoardResult<()> {
        let mover = self.piece_at(from).ok_or_else(|| BoardError::IllegalMove {
            from: from.to_algebraic(),
            to: to.to_algebraic(),
        })?;
        let mv = self.describe_move(from, to, mover, is_castle);
        self.make_move(mv);
        Ok(())
    }

    pub fn apply_move_notation(&mut self, from: &str, to: &str, is_castle: bool) -> BoardResult<()> {
        let from = Square::from_algebraic(from)?;
        let to = Square::from_algebraic(to)?;
        self.apply_move(from, to, is_castle)
    }

    pub(crate) fn make_move(&mut self, mv: Move) {
        let Some(mover) = self.piece_at(mv.from) else {
            return;
        };
        let color = mover.color;

        // Remove piece from source square
        self.pieces_mut(color)[mover.piece.index()] &= !mv.from.mask();

        // Handle captures, including the pawn taken en passant
        let captured_mask = mv.captured_square().mask() | mv.to.mask();
        for bb in self.pieces_mut(color.opposite()).iter_mut() {
            *bb &= !captured_mask;
        }

        // Place piece on target square
        let placed = mv.promotion.unwrap_or(mover.piece);
        self.pieces_mut(color)[placed.index()] |= mv.to.mask();

        // Handle castling
        if mv.is_castling {
            if let (Some(rook_from), Some(rook_to)) = (mv.castling_rook_from, mv.castling_rook_to) {
                let rooks = &mut self.pieces_mut(color)[Piece::Rook.index()];
                *rooks = (*rooks & !rook_from.mask()) | rook_to.mask();
            }
        }

        // Update castling rights
        if mover.piece == Piece::King {
            self.castling_rights.revoke_color(color);
        }
        self.castling_rights.revoke_corner(mv.from);
        self.castling_rights.revoke_corner(mv.to);

        // Update en passant square
        self.en_passant_square =
            if mover.piece == Piece::Pawn && mv.from.rank().abs_diff(mv.to.rank()) == 2 {
                Some(Square::at(mv.from.file(), (mv.from.rank() + mv.to.rank()) / 2))
            } else {
                None
            };

        // Update move counters
        if mover.piece == Piece::Pawn || mv.captured_piece.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if color == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        // Switch side to move
        self.side_to_move = self.side_to_move.opposite();
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = String::new();
        for rank in (0..8).rev() {
            for file in 0..8 {
                match self.piece_at(Square::at(file, rank)) {
                    Some(piece) => result.push(piece.symbol()),
                    None => result.push('.'),
                }
                if file < 7 {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
        write!(f, "{}", result)
    }
}
