//! Grid types: the wire form of one record value.
//!
//! - [`FormatGrid`]: the key matrix telling the decoder which column holds which field
//! - [`Cell`]: one typed scalar produced by the encoder
//! - [`Grid`]: the encoder's output, a rectangular matrix of [`Cell`]s
//! - [`Header`]: the header projector's output, a [`FormatGrid`] plus optional titles
//!
//! Out-of-bounds coordinates read as empty everywhere, never as errors.

use std::fmt;

/// Rectangular matrix of field keys.
///
/// Rows shorter than the widest row are padded with empty keys.
///
/// # Examples
///
/// ```rust
/// use serde_sheet::FormatGrid;
///
/// let format = FormatGrid::new(vec![
///     vec!["ID".to_string(), "Sub".to_string(), String::new()],
///     vec![String::new(), "Code".to_string()],
/// ]);
/// assert_eq!(format.width(), 3);
/// assert_eq!(format.get(1, 2), "");
/// assert_eq!(format.get(7, 7), "");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatGrid {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl FormatGrid {
    /// Builds a grid, padding every row to the widest one.
    #[must_use]
    pub fn new(mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        FormatGrid { rows, width }
    }

    /// Builds a grid from borrowed rows.
    #[must_use]
    pub fn from_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|s| s.as_ref().to_string()).collect())
                .collect(),
        )
    }

    /// Key at `(row, column)`, or `""` outside the grid.
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map_or("", String::as_str)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

/// One typed scalar cell of an encoded grid.
///
/// Cells keep their native type until an external formatter renders them;
/// [`Cell::Empty`] is the absent cell.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
}

impl Cell {
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Uint(u) => write!(f, "{}", u),
            Cell::Float(fl) => write!(f, "{}", fl),
            Cell::String(s) => f.write_str(s),
        }
    }
}

/// The encoder's output, sized to the furthest row and column written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Builds a grid from `(row, column, cell)` placements.
    pub(crate) fn from_placements<'a, I>(height: usize, width: usize, placements: I) -> Self
    where
        I: IntoIterator<Item = &'a CellEntry>,
    {
        let mut rows = vec![vec![Cell::Empty; width]; height];
        for entry in placements {
            rows[entry.row][entry.column] = entry.cell.clone();
        }
        Grid { rows }
    }

    /// Cell at `(row, column)`, or [`Cell::Empty`] outside the grid.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.rows.get(row).and_then(|r| r.get(column)).unwrap_or(EMPTY)
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Renders every cell to text, the form the decoder consumes.
    #[must_use]
    pub fn to_text_grid(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(Cell::to_string).collect())
            .collect()
    }
}

/// A cell placed by the encoder.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CellEntry {
    pub(crate) row: usize,
    pub(crate) column: usize,
    pub(crate) cell: Cell,
}

/// The header projector's output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// Key rows, directly usable as the decoder's format.
    pub format: FormatGrid,
    /// Title row, present when titles were requested.
    pub titles: Option<Vec<String>>,
}

impl Header {
    /// Key rows followed by the title row, if any.
    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<String>> {
        let mut rows = self.format.into_rows();
        if let Some(titles) = self.titles {
            rows.push(titles);
        }
        rows
    }
}
