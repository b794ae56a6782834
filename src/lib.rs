//! # serde_sheet
//!
//! A Serde-compatible codec between nested records and spreadsheet-style grids.
//!
//! ## What is a sheet layout?
//!
//! A record is laid out as a rectangle of cells. Each field claims a span of
//! columns in declaration order; nested records share their parent's row and
//! spread over several columns, while repeated elements reuse one column span
//! and advance downwards, one row per element. A matching set of *format rows*
//! names the field behind each column, so the same grid can be read back.
//!
//! ## Key Features
//!
//! - **Symmetric**: [`to_grid`], [`header`] and [`from_grid`] share one layout model
//! - **Typed cells**: encoding yields native scalars ([`Cell`]), not pre-rendered text
//! - **Serde Compatible**: records are plain `Serialize`/`Deserialize` structs
//!   declared through [`sheet_record!`]
//! - **Forgiving**: empty cells decode to zero values and never raise errors
//! - **No Unsafe Code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! serde_sheet = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Encoding and decoding
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_sheet::{from_grid, header, sheet_record, to_grid, Cell};
//!
//! sheet_record! {
//!     #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
//!     pub struct Line {
//!         pub code: String => "Code",
//!         pub qty: u32 => "Qty",
//!     }
//!
//!     #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
//!     pub struct Order {
//!         pub id: String => "ID",
//!         pub lines: Vec<Line> => "Lines",
//!         pub tags: Vec<String> => "csv",
//!     }
//! }
//!
//! let order = Order {
//!     id: "o-1".to_string(),
//!     lines: vec![
//!         Line { code: "a".to_string(), qty: 2 },
//!         Line { code: "b".to_string(), qty: 5 },
//!     ],
//!     tags: vec!["new".to_string(), "paid".to_string()],
//! };
//!
//! let grid = to_grid(&order).unwrap();
//! assert_eq!(grid.get(1, 1), &Cell::Int(2)); // 1-based index of the second line
//! assert_eq!(grid.get(1, 3), &Cell::Uint(5));
//!
//! let format = header::<Order>(false).unwrap().format;
//! assert_eq!(format.rows()[0], vec!["ID", "Lines", "", "", "tags"]);
//! assert_eq!(format.rows()[1], vec!["", "_index", "Code", "Qty", ""]);
//!
//! let back: Order = from_grid(format.rows(), &grid.to_text_grid()).unwrap();
//! assert_eq!(back, order);
//! ```
//!
//! ## Field tags
//!
//! | Token          | Effect |
//! |----------------|--------|
//! | `-`            | field is excluded from the grid |
//! | `csv`          | list of scalars packed into one comma-joined cell |
//! | `datetime`     | integer epochs and instants rendered as local `YYYY-MM-DD hh:mm:ss` text |
//! | `title=<text>` | title used by the header's title row |
//! | leading token  | renames the field's grid key |
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Out-of-bounds grid reads are empty cells, never panics
//! - Proper error propagation with `Result` types
//!
//! ## Logging
//!
//! Engines report through the `log` facade: `debug` per call, `trace` per
//! field visit. No logger is installed by the library.

pub mod datetime;
pub mod de;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod grid;
pub mod header;
pub mod macros;
pub mod map;
pub mod options;
pub mod pool;
pub mod schema;
pub mod ser;
pub mod value;

pub use datetime::DEFAULT_DATETIME_FORMAT;
pub use de::{from_value, ValueDeserializer};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use grid::{Cell, FormatGrid, Grid, Header};
pub use header::project_header;
pub use map::RecordMap;
pub use options::{FieldOption, SheetOptions, INDEX_KEY};
pub use pool::{Pooled, Reusable, ScratchPool};
pub use schema::{schema_of, FieldKind, FieldSpec, ScalarKind, Sheet};
pub use ser::{to_value, ValueSerializer};
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode a record into a grid of typed cells.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_sheet::{sheet_record, to_grid, Cell};
///
/// sheet_record! {
///     #[derive(Serialize)]
///     struct Point { x: i32, y: Option<i32> }
/// }
///
/// let grid = to_grid(&Point { x: 1, y: None }).unwrap();
/// assert_eq!(grid.get(0, 0), &Cell::Int(1));
/// assert!(grid.get(0, 1).is_empty());
/// ```
///
/// # Errors
///
/// Returns an error if `T` is not a record or a stored instant cannot be rendered.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_grid<T>(value: &T) -> Result<Grid>
where
    T: Sheet + Serialize + 'static,
{
    to_grid_with_options(value, SheetOptions::default())
}

/// Encode a record with custom options.
///
/// # Errors
///
/// See [`to_grid`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_grid_with_options<T>(value: &T, options: SheetOptions) -> Result<Grid>
where
    T: Sheet + Serialize + 'static,
{
    Encoder::new().with_options(options).encode(value)
}

/// Decode a record from format rows and a text grid.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_sheet::{from_grid, sheet_record};
///
/// sheet_record! {
///     #[derive(Deserialize, Debug, PartialEq)]
///     struct Point { x: i32, y: Option<i32> }
/// }
///
/// let point: Point = from_grid(&[vec!["x", "y"]], &[vec!["4", ""]]).unwrap();
/// assert_eq!(point, Point { x: 4, y: None });
/// ```
///
/// # Errors
///
/// Returns an error if `T` is not a record, or a non-empty cell cannot be
/// parsed as its field's type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_grid<T, F, S>(format: &[Vec<F>], values: &[Vec<S>]) -> Result<T>
where
    T: Sheet + DeserializeOwned + 'static,
    F: AsRef<str>,
    S: AsRef<str>,
{
    from_grid_with_options(format, values, SheetOptions::default())
}

/// Decode a record with custom options.
///
/// # Errors
///
/// See [`from_grid`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_grid_with_options<T, F, S>(
    format: &[Vec<F>],
    values: &[Vec<S>],
    options: SheetOptions,
) -> Result<T>
where
    T: Sheet + DeserializeOwned + 'static,
    F: AsRef<str>,
    S: AsRef<str>,
{
    Decoder::new(format).with_options(options).decode(values)
}

/// Decode a text grid into an existing record.
///
/// Decoding is not transactional: on error, fields decoded before the failing
/// one are still written to `out`.
///
/// # Errors
///
/// See [`from_grid`].
pub fn from_grid_into<T, F, S>(format: &[Vec<F>], values: &[Vec<S>], out: &mut T) -> Result<()>
where
    T: Sheet + Serialize + DeserializeOwned + 'static,
    F: AsRef<str>,
    S: AsRef<str>,
{
    Decoder::new(format).decode_into(values, out)
}

/// Project the format rows (and optionally the title row) of a record type.
///
/// # Errors
///
/// Returns an error if `T` is not a record type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn header<T>(include_titles: bool) -> Result<Header>
where
    T: Sheet + 'static,
{
    project_header(&schema_of::<T>(), include_titles)
}

/// Project a header, taking the title switch from `options`.
///
/// # Errors
///
/// See [`header`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn header_with_options<T>(options: &SheetOptions) -> Result<Header>
where
    T: Sheet + 'static,
{
    header::<T>(options.titles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet_record;
    use serde::Deserialize;

    sheet_record! {
        #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
        struct Point {
            x: i32,
            y: i32,
        }

        #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
        struct User {
            id: u32 => "ID",
            name: String => "Name,title=User Name",
            active: bool,
            tags: Vec<String> => "csv",
            home: Option<Point>,
        }
    }

    fn user() -> User {
        User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
            home: Some(Point { x: 3, y: -4 }),
        }
    }

    #[test]
    fn test_round_trip_point() {
        let point = Point { x: 1, y: 2 };
        let grid = to_grid(&point).unwrap();
        let format = header::<Point>(false).unwrap().format;
        let back: Point = from_grid(format.rows(), &grid.to_text_grid()).unwrap();
        assert_eq!(point, back);
    }

    #[test]
    fn test_round_trip_user() {
        let grid = to_grid(&user()).unwrap();
        let format = header::<User>(false).unwrap().format;
        let back: User = from_grid(format.rows(), &grid.to_text_grid()).unwrap();
        assert_eq!(user(), back);
    }

    #[test]
    fn test_header_with_titles() {
        let options = SheetOptions::new().with_titles(true);
        let header = header_with_options::<User>(&options).unwrap();
        assert_eq!(
            header.titles.as_deref(),
            Some(&["ID", "User Name", "active", "tags", "x", "y"].map(String::from)[..])
        );
        assert_eq!(header.into_rows().len(), 3);
    }

    #[test]
    fn test_custom_options() {
        let options = SheetOptions::new().with_csv_separator(';');
        let grid = to_grid_with_options(&user(), options.clone()).unwrap();
        assert_eq!(grid.get(0, 3), &Cell::String("admin;user".to_string()));

        let format = header::<User>(false).unwrap().format;
        let back: User =
            from_grid_with_options(format.rows(), &grid.to_text_grid(), options).unwrap();
        assert_eq!(back.tags, user().tags);
    }

    #[test]
    fn test_from_grid_into_keeps_untouched_fields() {
        let mut target = user();
        from_grid_into(&[vec!["Name"]], &[vec!["Bob"]], &mut target).unwrap();
        assert_eq!(target.name, "Bob");
        assert_eq!(target.id, 123);
        assert_eq!(target.home, Some(Point { x: 3, y: -4 }));
    }
}
