use std::collections::HashMap;

use crate::board::{Board, ColoredPiece};
use crate::coords::Square;
use crate::render::Renderer;

/// A square whose displayed occupant changed; `None` means it is now empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementDelta {
    pub square: Square,
    pub piece: Option<ColoredPiece>,
}

#[derive(Debug)]
pub struct Projection<H> {
    entries: HashMap<Square, (ColoredPiece, H)>,
}

impl<H> Default for Projection<H> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<H> Projection<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn handle(&self, square: Square) -> Option<&H> {
        self.entries.get(&square).map(|(_, handle)| handle)
    }

    pub fn occupant(&self, square: Square) -> Option<ColoredPiece> {
        self.entries.get(&square).map(|(piece, _)| *piece)
    }

    /// True when every square shows exactly what the position holds.
    pub fn is_synced_with(&self, board: &Board) -> bool {
        Square::all().all(|square| self.occupant(square) == board.piece_at(square))
    }

    pub(crate) fn remove<R>(&mut self, renderer: &mut R, square: Square, log: &mut Vec<PlacementDelta>)
    where
        R: Renderer<Handle = H>,
    {
        if let Some((_, handle)) = self.entries.remove(&square) {
            renderer.erase_piece(handle);
            log.push(PlacementDelta { square, piece: None });
        }
    }

    pub(crate) fn insert<R>(
        &mut self,
        renderer: &mut R,
        square: Square,
        piece: ColoredPiece,
        log: &mut Vec<PlacementDelta>,
    ) where
        R: Renderer<Handle = H>,
    {
        self.remove(renderer, square, log);
        let handle = renderer.draw_piece(square, piece);
        self.entries.insert(square, (piece, handle));
        log.push(PlacementDelta {
            square,
            piece: Some(piece),
        });
    }

    /// Erases everything and draws every occupied square of `board` afresh.
    pub(crate) fn redraw<R>(&mut self, renderer: &mut R, board: &Board) -> Vec<PlacementDelta>
    where
        R: Renderer<Handle = H>,
    {
        let mut log = Vec::new();
        let mut squares: Vec<Square> = self.entries.keys().copied().collect();
        squares.sort();
        for square in squares {
            self.remove(renderer, square, &mut log);
        }
        for (square, piece) in board.occupants() {
            self.insert(renderer, square, piece, &mut log);
        }
        log
    }
}

/// Collapses a raw operation log to one delta per square, holding the final
/// occupant, in the order squares were first touched.
pub(crate) fn compact(log: Vec<PlacementDelta>) -> Vec<PlacementDelta> {
    let mut result: Vec<PlacementDelta> = Vec::new();
    for delta in log {
        match result.iter_mut().find(|seen| seen.square == delta.square) {
            Some(seen) => seen.piece = delta.piece,
            None => result.push(delta),
        }
    }
    result
}
