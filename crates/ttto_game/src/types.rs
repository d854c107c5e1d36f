//! Core domain types for grid tic-tac-toe.

use crate::action::MoveError;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Symbol a participant plays.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
pub enum Symbol {
    /// X always moves first.
    #[display("X")]
    X,
    /// O moves second.
    #[display("O")]
    O,
}

impl Symbol {
    /// Returns the opposing symbol.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

/// A square on the board.
///
/// Serialized as `null` when empty and as the occupying symbol otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Symbol>", into = "Option<Symbol>")]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a symbol.
    Occupied(Symbol),
}

impl From<Option<Symbol>> for Square {
    fn from(value: Option<Symbol>) -> Self {
        value.map_or(Square::Empty, Square::Occupied)
    }
}

impl From<Square> for Option<Symbol> {
    fn from(value: Square) -> Self {
        match value {
            Square::Empty => None,
            Square::Occupied(symbol) => Some(symbol),
        }
    }
}

/// Side length of a square board.
///
/// Only sizes in [`GridSize::MIN`]`..=`[`GridSize::MAX`] can be constructed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(try_from = "usize", into = "usize")]
pub struct GridSize(usize);

impl GridSize {
    /// Smallest playable board.
    pub const MIN: usize = 3;
    /// Largest playable board.
    pub const MAX: usize = 5;

    /// Validates a requested side length.
    pub fn new(size: usize) -> Result<Self, InvalidGridSize> {
        if (Self::MIN..=Self::MAX).contains(&size) {
            Ok(Self(size))
        } else {
            Err(InvalidGridSize(size))
        }
    }

    /// Side length.
    pub fn get(self) -> usize {
        self.0
    }

    /// Number of cells on a board of this size.
    pub fn cells(self) -> usize {
        self.0 * self.0
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<usize> for GridSize {
    type Error = InvalidGridSize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GridSize> for usize {
    fn from(value: GridSize) -> Self {
        value.0
    }
}

/// A grid size outside the playable range was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("Grid size {_0} is outside 3..=5")]
pub struct InvalidGridSize(pub usize);

impl std::error::Error for InvalidGridSize {}

/// Error parsing a textual board layout.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ParseBoardError {
    /// The layout does not hold exactly `size²` squares.
    #[display("Expected {expected} squares, found {found}")]
    WrongLength {
        /// Squares required by the grid size.
        expected: usize,
        /// Squares present in the layout.
        found: usize,
    },
    /// A character other than `X`, `O`, `.` or `_` appeared.
    #[display("Unexpected square character {_0:?}")]
    BadSquare(char),
}

impl std::error::Error for ParseBoardError {}

/// N×N board stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    size: GridSize,
    squares: Vec<Square>,
}

impl Board {
    /// Creates an empty board of the given size.
    #[instrument]
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            squares: vec![Square::Empty; size.cells()],
        }
    }

    /// Builds a board from a layout such as `"XX. ... ..."`.
    ///
    /// `X` and `O` are marks, `.` or `_` an empty square; whitespace is ignored.
    pub fn parse(size: GridSize, layout: &str) -> Result<Self, ParseBoardError> {
        let squares = layout
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                'X' | 'x' => Ok(Square::Occupied(Symbol::X)),
                'O' | 'o' => Ok(Square::Occupied(Symbol::O)),
                '.' | '_' => Ok(Square::Empty),
                other => Err(ParseBoardError::BadSquare(other)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        if squares.len() != size.cells() {
            return Err(ParseBoardError::WrongLength {
                expected: size.cells(),
                found: squares.len(),
            });
        }

        Ok(Self { size, squares })
    }

    /// Side length of the board.
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Number of squares.
    pub fn len(&self) -> usize {
        self.squares.len()
    }

    /// Always false: a board has at least `GridSize::MIN²` squares.
    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    /// Gets the square at the given index.
    pub fn get(&self, index: usize) -> Option<Square> {
        self.squares.get(index).copied()
    }

    /// Checks if the square at `index` exists and is empty.
    pub fn is_vacant(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Square::Empty))
    }

    /// Returns all squares.
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    /// Places `symbol` at `index`.
    ///
    /// # Errors
    ///
    /// [`MoveError::OutOfRange`] if the index is past the last square,
    /// [`MoveError::SquareOccupied`] if the square holds a mark. The board is
    /// untouched on error.
    #[instrument(skip(self), fields(size = %self.size))]
    pub fn apply_move(&mut self, index: usize, symbol: Symbol) -> Result<(), MoveError> {
        match self.squares.get_mut(index) {
            None => Err(MoveError::OutOfRange {
                index,
                cells: self.size.cells(),
            }),
            Some(Square::Occupied(_)) => Err(MoveError::SquareOccupied(index)),
            Some(square) => {
                *square = Square::Occupied(symbol);
                Ok(())
            }
        }
    }

    /// Clears a square. Used by the AI to undo trial placements.
    pub(crate) fn clear(&mut self, index: usize) {
        if let Some(square) = self.squares.get_mut(index) {
            *square = Square::Empty;
        }
    }

    /// Indices of all empty squares, ascending.
    pub fn empty_cells(&self) -> Vec<usize> {
        self.squares
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == Square::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    /// Checks if every square is occupied.
    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|s| *s != Square::Empty)
    }

    /// Number of occupied squares.
    pub fn occupied(&self) -> usize {
        self.squares.iter().filter(|s| **s != Square::Empty).count()
    }

    /// Index of the centre square, `floor(N²/2)`.
    pub fn center(&self) -> usize {
        self.size.cells() / 2
    }

    /// Indices of the four corners, clockwise from top-left.
    pub fn corners(&self) -> [usize; 4] {
        let n = self.size.get();
        [0, n - 1, n * n - 1, n * (n - 1)]
    }

    /// Checks if `index` lies on the border without being a corner.
    pub fn is_edge(&self, index: usize) -> bool {
        let n = self.size.get();
        if index >= n * n || self.corners().contains(&index) {
            return false;
        }
        let (row, col) = (index / n, index % n);
        row == 0 || row == n - 1 || col == 0 || col == n - 1
    }

    /// Formats the board as a human-readable grid.
    ///
    /// Empty squares show their index so the text doubles as a move prompt.
    pub fn display(&self) -> String {
        let n = self.size.get();
        let width = (n * n - 1).to_string().len();
        let mut result = String::new();
        for row in 0..n {
            for col in 0..n {
                let pos = row * n + col;
                let symbol = match self.squares[pos] {
                    Square::Empty => pos.to_string(),
                    Square::Occupied(symbol) => symbol.to_string(),
                };
                result.push_str(&format!("{symbol:>width$}"));
                if col < n - 1 {
                    result.push('|');
                }
            }
            if row < n - 1 {
                result.push('\n');
                result.push_str(&vec!["-".repeat(width); n].join("+"));
                result.push('\n');
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(GridSize::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> GridSize {
        GridSize::new(n).unwrap()
    }

    #[test]
    fn test_grid_size_bounds() {
        assert!(GridSize::new(2).is_err());
        assert!(GridSize::new(3).is_ok());
        assert!(GridSize::new(5).is_ok());
        assert_eq!(GridSize::new(6), Err(InvalidGridSize(6)));
        assert_eq!(size(4).cells(), 16);
    }

    #[test]
    fn test_apply_move_rejects_occupied_and_out_of_range() {
        let mut board = Board::new(size(3));
        board.apply_move(4, Symbol::X).unwrap();
        assert_eq!(board.apply_move(4, Symbol::O), Err(MoveError::SquareOccupied(4)));
        assert_eq!(
            board.apply_move(9, Symbol::O),
            Err(MoveError::OutOfRange { index: 9, cells: 9 })
        );
        assert_eq!(board.get(4), Some(Square::Occupied(Symbol::X)));
        assert_eq!(board.occupied(), 1);
    }

    #[test]
    fn test_parse_layout() {
        let board = Board::parse(size(3), "XX. ... ..O").unwrap();
        assert_eq!(board.get(1), Some(Square::Occupied(Symbol::X)));
        assert_eq!(board.get(8), Some(Square::Occupied(Symbol::O)));
        assert_eq!(board.empty_cells(), vec![2, 3, 4, 5, 6, 7]);
        assert!(matches!(
            Board::parse(size(3), "XX."),
            Err(ParseBoardError::WrongLength { expected: 9, found: 3 })
        ));
    }

    #[test]
    fn test_geometry_on_four_by_four() {
        let board = Board::new(size(4));
        assert_eq!(board.center(), 8);
        assert_eq!(board.corners(), [0, 3, 15, 12]);
        assert!(board.is_edge(1));
        assert!(board.is_edge(4));
        assert!(!board.is_edge(5));
        assert!(!board.is_edge(0));
    }

    #[test]
    fn test_square_serializes_as_symbol_or_null() {
        let board = Board::parse(size(3), "X.. ... ...").unwrap();
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["squares"][0], "X");
        assert!(json["squares"][1].is_null());
        assert_eq!(json["size"], 3);
    }

    #[test]
    fn test_display_shows_indices_for_empty_squares() {
        let board = Board::parse(size(3), "X.. .O. ...").unwrap();
        assert_eq!(board.display(), "X|1|2\n-+-+-\n3|O|5\n-+-+-\n6|7|8");
    }
}
