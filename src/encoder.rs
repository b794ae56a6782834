//! Grid encoding.
//!
//! The [`Encoder`] lays a record out as a [`Grid`] of typed cells. Every field
//! visit returns the number of columns it consumed so the enclosing record can
//! place the next field right after it.
//!
//! - Absent optionals write explicit empty cells, never zero values
//! - Repeated records write a 1-based index cell, then the element one column to the right
//! - Scalar lists write one row per element, or a single joined cell under `csv`
//! - `datetime` fields render epochs and instants as local display text; zero
//!   epochs and zero instants are empty
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_sheet::{sheet_record, Cell, Encoder};
//!
//! sheet_record! {
//!     #[derive(Serialize, Deserialize)]
//!     struct Row {
//!         id: String,
//!         score: Option<u32>,
//!     }
//! }
//!
//! let grid = Encoder::new()
//!     .encode(&Row { id: "a".to_string(), score: None })
//!     .unwrap();
//! assert_eq!(grid.get(0, 0), &Cell::String("a".to_string()));
//! assert!(grid.get(0, 1).is_empty());
//! ```

use serde::Serialize;

use crate::datetime::{format_epoch, instant_text, is_zero_instant, parse_instant, render};
use crate::grid::CellEntry;
use crate::{
    schema_of, to_value, Cell, Error, FieldKind, FieldOption, FieldSpec, Grid, Result, ScalarKind,
    ScratchPool, Sheet, SheetOptions, Value,
};

const NULL: &Value = &Value::Null;

/// Lays records out as grids of typed cells.
#[derive(Clone, Debug, Default)]
pub struct Encoder {
    options: SheetOptions,
    pool: ScratchPool,
}

impl Encoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(mut self, options: SheetOptions) -> Self {
        self.options = options;
        self
    }

    /// Shares a scratch pool with other engines.
    #[must_use]
    pub fn with_pool(mut self, pool: ScratchPool) -> Self {
        self.pool = pool;
        self
    }

    /// Encodes a record.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTarget`] if `T` is not a record type
    /// - [`Error::DatetimeParse`] if a stored instant cannot be read or rendered
    /// - [`Error::UnsupportedShape`] if the serialized value does not match the schema
    pub fn encode<T>(&self, value: &T) -> Result<Grid>
    where
        T: Sheet + Serialize + 'static,
    {
        let kind = schema_of::<T>();
        let value = to_value(value)?;
        self.encode_value(&kind, &value)
    }

    /// Encodes a dynamic record value shaped by `kind`.
    ///
    /// # Errors
    ///
    /// See [`Encoder::encode`].
    pub fn encode_value(&self, kind: &FieldKind, value: &Value) -> Result<Grid> {
        let FieldKind::Record(fields) = kind else {
            return Err(Error::invalid_target("encode source must be a record type"));
        };
        kind.validate()?;

        let mut cells = self.pool.acquire_cells();
        let mut emit = Emit {
            options: &self.options,
            cells: &mut *cells,
            height: 0,
            width: 0,
        };
        let used = emit.record(fields, value, 0, 0)?;
        let (height, width) = (emit.height, emit.width);
        log::debug!(
            "encoded {} cells into a {}x{} grid ({} columns consumed)",
            cells.len(),
            height,
            width,
            used
        );
        Ok(Grid::from_placements(height, width, cells.iter()))
    }
}

struct Emit<'a> {
    options: &'a SheetOptions,
    cells: &'a mut Vec<CellEntry>,
    height: usize,
    width: usize,
}

impl Emit<'_> {
    fn put(&mut self, row: usize, column: usize, cell: Cell) {
        self.height = self.height.max(row + 1);
        self.width = self.width.max(column + 1);
        self.cells.push(CellEntry { row, column, cell });
    }

    fn record(
        &mut self,
        fields: &[FieldSpec],
        value: &Value,
        row: usize,
        column: usize,
    ) -> Result<usize> {
        let record = match value {
            Value::Null => None,
            Value::Record(map) => Some(map),
            other => return Err(shape_mismatch("record", other)),
        };
        let mut width = 0;
        for field in fields.iter().filter(|f| f.is_visible()) {
            let item = record
                .and_then(|map| map.get(field.name()))
                .unwrap_or(NULL);
            log::trace!("field `{}` at ({}, {})", field.name(), row, column + width);
            width += self
                .visit(field, field.kind(), item, row, column + width)?
                .max(1);
        }
        Ok(width)
    }

    fn visit(
        &mut self,
        field: &FieldSpec,
        kind: &FieldKind,
        value: &Value,
        row: usize,
        column: usize,
    ) -> Result<usize> {
        match kind {
            FieldKind::Scalar(scalar) => {
                let cell = self.scalar_cell(field.name(), *scalar, field.option(), value)?;
                self.put(row, column, cell);
                Ok(1)
            }
            FieldKind::Optional(inner) => self.visit(field, inner, value, row, column),
            FieldKind::Record(fields) => self.record(fields, value, row, column),
            FieldKind::FixedArray(_, elem) | FieldKind::List(elem) => {
                let items: &[Value] = match value {
                    Value::Null => &[],
                    Value::List(items) => items,
                    other => return Err(shape_mismatch("list", other)),
                };
                if elem.record_fields().is_some() {
                    self.records(field, elem, items, row, column)
                } else if field.option().csv && matches!(kind, FieldKind::List(_)) {
                    self.packed(field, elem, items, row, column)
                } else {
                    self.rows(field, elem, items, row, column)
                }
            }
        }
    }

    fn records(
        &mut self,
        field: &FieldSpec,
        elem: &FieldKind,
        items: &[Value],
        row: usize,
        column: usize,
    ) -> Result<usize> {
        if items.is_empty() {
            // no index cell: the body alone fixes the span's width
            return Ok(1 + self.visit(field, elem, NULL, row, column + 1)?);
        }
        let mut width = 0;
        for (i, item) in items.iter().enumerate() {
            self.put(row + i, column, Cell::Int(i as i64 + 1));
            width = width.max(self.visit(field, elem, item, row + i, column + 1)?);
        }
        Ok(1 + width)
    }

    fn packed(
        &mut self,
        field: &FieldSpec,
        elem: &FieldKind,
        items: &[Value],
        row: usize,
        column: usize,
    ) -> Result<usize> {
        let scalar = elem
            .scalar_kind()
            .ok_or_else(|| Error::unsupported_shape("csv lists must hold scalars"))?;
        if items.is_empty() {
            self.put(row, column, Cell::Empty);
            return Ok(1);
        }
        let mut text = String::new();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                text.push(self.options.csv_separator);
            }
            let cell = self.scalar_cell(field.name(), scalar, field.option(), item)?;
            text.push_str(&cell.to_string());
        }
        self.put(row, column, Cell::String(text));
        Ok(1)
    }

    fn rows(
        &mut self,
        field: &FieldSpec,
        elem: &FieldKind,
        items: &[Value],
        row: usize,
        column: usize,
    ) -> Result<usize> {
        if items.is_empty() {
            self.put(row, column, Cell::Empty);
        }
        for (i, item) in items.iter().enumerate() {
            self.visit(field, elem, item, row + i, column)?;
        }
        Ok(1)
    }

    fn scalar_cell(
        &self,
        name: &str,
        scalar: ScalarKind,
        option: &FieldOption,
        value: &Value,
    ) -> Result<Cell> {
        if option.datetime {
            if let Some(cell) = self.datetime_cell(name, scalar, value)? {
                return Ok(cell);
            }
        }
        match value {
            Value::Null => Ok(Cell::Empty),
            Value::Bool(b) => Ok(Cell::Bool(*b)),
            Value::Int(i) => Ok(Cell::Int(*i)),
            Value::Uint(u) => Ok(Cell::Uint(*u)),
            Value::Float(f) => Ok(Cell::Float(*f)),
            Value::String(text) if scalar == ScalarKind::Instant => parse_instant(text)
                .map(|instant| Cell::String(instant_text(&instant)))
                .map_err(|reason| Error::datetime_parse(name, text, reason)),
            Value::String(text) => Ok(Cell::String(text.clone())),
            other => Err(shape_mismatch(scalar.name(), other)),
        }
    }

    /// Display-text cell for a `datetime` field, or `None` when the value is not a timestamp.
    fn datetime_cell(&self, name: &str, scalar: ScalarKind, value: &Value) -> Result<Option<Cell>> {
        let format = &self.options.datetime_format;
        if let (ScalarKind::Instant, Some(text)) = (scalar, value.as_str()) {
            let instant =
                parse_instant(text).map_err(|reason| Error::datetime_parse(name, text, reason))?;
            if is_zero_instant(&instant) {
                return Ok(Some(Cell::Empty));
            }
            return render(&instant, format)
                .map(|text| Some(Cell::String(text)))
                .map_err(|reason| Error::datetime_parse(name, text, reason));
        }
        let epoch = match value {
            Value::Int(_) | Value::Uint(_) => value.as_i64().ok_or_else(|| {
                Error::datetime_parse(name, &value.to_string(), "epoch out of range")
            })?,
            _ => return Ok(None),
        };
        let text = format_epoch(epoch, format)
            .map_err(|reason| Error::datetime_parse(name, &epoch.to_string(), reason))?;
        Ok(Some(text.map_or(Cell::Empty, Cell::String)))
    }
}

fn shape_mismatch(expected: &str, found: &Value) -> Error {
    Error::unsupported_shape(&format!(
        "expected {} value, found {}",
        expected,
        found.type_name()
    ))
}
