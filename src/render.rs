use std::collections::{BTreeSet, HashMap};

use crate::board::ColoredPiece;
use crate::coords::Square;

pub trait Renderer {
    /// Opaque reference to one drawn piece image.
    type Handle;

    fn draw_piece(&mut self, square: Square, piece: ColoredPiece) -> Self::Handle;
    fn erase_piece(&mut self, handle: Self::Handle);
    fn highlight_selected(&mut self, squares: &[Square]);
    fn highlight_destinations(&mut self, squares: &[Square]);
    fn clear_highlights(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId(u32);

/// Draws the board as an ASCII grid. Selected squares are marked with `>`,
/// legal destinations with `*`.
#[derive(Debug, Default)]
pub struct TextRenderer {
    next_id: u32,
    sprites: HashMap<SpriteId, (Square, ColoredPiece)>,
    selected: BTreeSet<Square>,
    destinations: BTreeSet<Square>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn selected(&self) -> &BTreeSet<Square> {
        &self.selected
    }

    pub fn destinations(&self) -> &BTreeSet<Square> {
        &self.destinations
    }

    fn sprite_at(&self, square: Square) -> Option<ColoredPiece> {
        self.sprites
            .values()
            .find(|(at, _)| *at == square)
            .map(|(_, piece)| *piece)
    }

    pub fn render(&self) -> String {
        let mut result = String::new();
        for row in 0..8u8 {
            result.push_str(&format!("{} ", 8 - row));
            for file in 0..8u8 {
                let Ok(square) = Square::from_matrix(file, row) else {
                    continue;
                };
                let marker = if self.selected.contains(&square) {
                    '>'
                } else if self.destinations.contains(&square) {
                    '*'
                } else {
                    ' '
                };
                let symbol = self.sprite_at(square).map_or('.', ColoredPiece::symbol);
                result.push(marker);
                result.push(symbol);
            }
            result.push('\n');
        }
        result.push_str("   a b c d e f g h\n");
        result
    }
}

impl Renderer for TextRenderer {
    type Handle = SpriteId;

    fn draw_piece(&mut self, square: Square, piece: ColoredPiece) -> SpriteId {
        let id = SpriteId(self.next_id);
        self.next_id += 1;
        self.sprites.insert(id, (square, piece));
        id
    }

    fn erase_piece(&mut self, handle: SpriteId) {
        self.sprites.remove(&handle);
    }

    fn highlight_selected(&mut self, squares: &[Square]) {
        self.selected.extend(squares.iter().copied());
    }

    fn highlight_destinations(&mut self, squares: &[Square]) {
        self.destinations.extend(squares.iter().copied());
    }

    fn clear_highlights(&mut self) {
        self.selected.clear();
        self.destinations.clear();
    }
}
