//! Grid decoding.
//!
//! This module provides the [`Decoder`], which reads a text grid back into a
//! record using a [`FormatGrid`] to locate each field.
//!
//! ## Overview
//!
//! - **Format-driven**: only columns named by the format are read; unknown keys are ignored
//! - **Schema-complete**: decoding starts from the type's zero value, so every
//!   field the grid does not mention keeps its zero value
//! - **Empty-cell tolerant**: an empty cell never raises an error
//! - **Not transactional**: [`Decoder::decode_into`] keeps the fields decoded before a failure
//!
//! ## Layout rules
//!
//! | Field kind                    | Cells read |
//! |-------------------------------|------------|
//! | scalar                        | `(row, column)` |
//! | optional                      | as the inner kind, only when a value is present |
//! | record                        | sub-keys on the next format row across the block's span |
//! | list/array of records         | one element per target row, same column span |
//! | list of scalars (`csv`)       | one cell split on the separator |
//! | list of scalars               | rows `0..=last present row`, gaps become zero values |
//! | array of scalars              | rows `0..N`, empty rows keep zero values |
//!
//! A block's span starts at its key and runs right across the empty keys that
//! follow it on the same format row.
//!
//! ## Usage
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_sheet::{sheet_record, Decoder};
//!
//! sheet_record! {
//!     #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
//!     struct Row {
//!         id: String => "ID",
//!         tags: Vec<String>,
//!     }
//! }
//!
//! let decoder = Decoder::new(&[vec!["ID", "tags"]]);
//! let row: Row = decoder
//!     .decode(&[vec!["a-1", "x"], vec!["", ""], vec!["", "z"]])
//!     .unwrap();
//! assert_eq!(row.id, "a-1");
//! assert_eq!(row.tags, vec!["x", "", "z"]);
//! ```

use std::mem;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::datetime::{instant_text, parse_instant, parse_local};
use crate::options::split_key;
use crate::schema::{find_field, zero_record};
use crate::{
    from_value, schema_of, to_value, Error, FieldKind, FieldOption, FieldSpec, FormatGrid,
    RecordMap, Result, ScalarKind, ScratchPool, Sheet, SheetOptions, Value, INDEX_KEY,
};

/// Reads text grids into records according to a fixed format.
#[derive(Clone, Debug)]
pub struct Decoder {
    format: FormatGrid,
    options: SheetOptions,
    pool: ScratchPool,
}

impl Decoder {
    /// Creates a decoder for the given format rows, padding them to the widest row.
    #[must_use]
    pub fn new<S: AsRef<str>>(format: &[Vec<S>]) -> Self {
        Self::from_format(FormatGrid::from_rows(format))
    }

    #[must_use]
    pub fn from_format(format: FormatGrid) -> Self {
        Decoder {
            format,
            options: SheetOptions::default(),
            pool: ScratchPool::new(),
        }
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

    #[must_use]
    pub fn format(&self) -> &FormatGrid {
        &self.format
    }

    /// Decodes a fresh `T` from a text grid.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTarget`] if `T` is not a record type
    /// - [`Error::FieldTypeMismatch`] for a non-empty cell that does not parse
    /// - [`Error::DatetimeParse`] for timestamp text that does not match its pattern
    /// - [`Error::UnsupportedShape`] for shapes without a layout
    pub fn decode<T, S>(&self, values: &[Vec<S>]) -> Result<T>
    where
        T: Sheet + DeserializeOwned + 'static,
        S: AsRef<str>,
    {
        let kind = schema_of::<T>();
        let mut value = kind.zero_value();
        self.decode_value(&kind, values, &mut value)?;
        from_value(value)
    }

    /// Decodes a text grid into an existing value.
    ///
    /// Fields the grid leaves empty keep their current values. On error, fields
    /// decoded before the failing one are still written to `out`.
    ///
    /// # Errors
    ///
    /// See [`Decoder::decode`].
    pub fn decode_into<T, S>(&self, values: &[Vec<S>], out: &mut T) -> Result<()>
    where
        T: Sheet + Serialize + DeserializeOwned + 'static,
        S: AsRef<str>,
    {
        let kind = schema_of::<T>();
        let mut value = to_value(out)?;
        let outcome = self.decode_value(&kind, values, &mut value);
        match from_value(value) {
            Ok(decoded) => {
                *out = decoded;
                outcome
            }
            Err(err) => outcome.and(Err(err)),
        }
    }

    /// Decodes a text grid into a dynamic record value shaped by `kind`.
    ///
    /// # Errors
    ///
    /// See [`Decoder::decode`].
    pub fn decode_value<S: AsRef<str>>(
        &self,
        kind: &FieldKind,
        values: &[Vec<S>],
        out: &mut Value,
    ) -> Result<()> {
        let FieldKind::Record(fields) = kind else {
            return Err(Error::invalid_target("decode target must be a record type"));
        };
        kind.validate()?;
        log::debug!(
            "decoding {} value rows against a {}x{} format",
            values.len(),
            self.format.height(),
            self.format.width()
        );

        let walk = Walk {
            format: &self.format,
            values,
            options: &self.options,
            pool: &self.pool,
        };
        let mut map = match mem::take(out) {
            Value::Record(map) => map,
            _ => zero_record(fields),
        };
        let limit = self.format.width();
        let outcome = (0..limit).try_for_each(|column| {
            let at = Cursor {
                row: 0,
                column,
                depth: 0,
                limit,
            };
            walk.visit_key(fields, self.format.get(0, column), &mut map, at)
        });
        *out = Value::Record(map);
        log::debug!("decode finished: {}", if outcome.is_ok() { "ok" } else { "failed" });
        outcome
    }
}

/// Position of a field visit.
///
/// `depth` is the format row holding the field's own key; `limit` is the end of
/// the enclosing block's span.
#[derive(Clone, Copy, Debug)]
struct Cursor {
    row: usize,
    column: usize,
    depth: usize,
    limit: usize,
}

impl Cursor {
    fn down(self, offset: usize) -> Self {
        Cursor {
            row: self.row + offset,
            ..self
        }
    }
}

struct Walk<'a, S> {
    format: &'a FormatGrid,
    values: &'a [Vec<S>],
    options: &'a SheetOptions,
    pool: &'a ScratchPool,
}

impl<S: AsRef<str>> Walk<'_, S> {
    fn cell(&self, row: usize, column: usize) -> &str {
        self.values
            .get(row)
            .and_then(|r| r.get(column))
            .map_or("", |cell| cell.as_ref())
    }

    fn visit_key(
        &self,
        fields: &[FieldSpec],
        raw: &str,
        out: &mut RecordMap,
        at: Cursor,
    ) -> Result<()> {
        let (key, suffix) = split_key(raw);
        if key.is_empty() || key == INDEX_KEY {
            return Ok(());
        }
        let Some(field) = find_field(fields, key) else {
            log::trace!("no field for key {:?} at column {}", key, at.column);
            return Ok(());
        };
        let mut option = self.pool.acquire_option();
        option.resolve(suffix);
        option.absorb(field.option());
        log::trace!(
            "field `{}` at ({}, {}) depth {}",
            field.name(),
            at.row,
            at.column,
            at.depth
        );
        let slot = out.get_or_insert_with(field.name(), || field.kind().zero_value());
        self.visit(field, field.kind(), &option, slot, at)
    }

    fn visit(
        &self,
        field: &FieldSpec,
        kind: &FieldKind,
        option: &FieldOption,
        slot: &mut Value,
        at: Cursor,
    ) -> Result<()> {
        match kind {
            FieldKind::Scalar(_) => {
                self.parse_text(field, kind, option, self.cell(at.row, at.column), slot)
            }
            FieldKind::Optional(inner) => {
                if !self.is_present(inner, option, at) {
                    return Ok(());
                }
                if slot.is_null() {
                    *slot = inner.zero_value();
                }
                self.visit(field, inner, option, slot, at)
            }
            FieldKind::Record(fields) => {
                let mut map = match mem::take(slot) {
                    Value::Record(map) => map,
                    _ => zero_record(fields),
                };
                let outcome = self.decode_record(fields, &mut map, at);
                *slot = Value::Record(map);
                outcome
            }
            FieldKind::FixedArray(len, elem) => match elem.record_fields() {
                Some(fields) => self.decode_record_array(*len, elem, fields, slot, at),
                None => self.decode_scalar_array(field, *len, elem, option, slot, at),
            },
            FieldKind::List(elem) => match elem.record_fields() {
                Some(fields) => self.decode_record_list(elem, fields, slot, at),
                None if option.csv => self.decode_packed_list(field, elem, option, slot, at),
                None => self.decode_scalar_list(field, elem, option, slot, at),
            },
        }
    }

    fn decode_record(&self, fields: &[FieldSpec], out: &mut RecordMap, at: Cursor) -> Result<()> {
        let limit = at.column + self.block_width(at);
        for column in at.column..limit {
            let inner = Cursor {
                row: at.row,
                column,
                depth: at.depth + 1,
                limit,
            };
            self.visit_key(fields, self.format.get(at.depth + 1, column), out, inner)?;
        }
        Ok(())
    }

    fn decode_record_list(
        &self,
        elem: &FieldKind,
        fields: &[FieldSpec],
        slot: &mut Value,
        at: Cursor,
    ) -> Result<()> {
        let mut rows = self.pool.acquire_rows();
        self.record_rows(at, &mut rows);
        if rows.is_empty() {
            return Ok(());
        }
        let width = self.block_width(at);
        let mut items = Vec::with_capacity(rows.len());
        let outcome = rows.iter().try_for_each(|&offset| {
            let mut item = Value::Null;
            let decoded = self.decode_element(elem, fields, at.down(offset), width, &mut item);
            items.push(item);
            decoded
        });
        *slot = Value::List(items);
        outcome
    }

    fn decode_record_array(
        &self,
        len: usize,
        elem: &FieldKind,
        fields: &[FieldSpec],
        slot: &mut Value,
        at: Cursor,
    ) -> Result<()> {
        let mut rows = self.pool.acquire_rows();
        self.record_rows(at, &mut rows);
        let width = self.block_width(at);
        let mut items = take_list(slot);
        items.resize_with(len, || elem.zero_value());
        // element index follows the row offset; rows past the array are dropped
        let outcome = rows
            .iter()
            .filter(|&&offset| offset < len)
            .try_for_each(|&offset| {
                self.decode_element(elem, fields, at.down(offset), width, &mut items[offset])
            });
        *slot = Value::List(items);
        outcome
    }

    /// Decodes one repeated record; a row carrying only its index marker becomes
    /// the element's zero value.
    fn decode_element(
        &self,
        elem: &FieldKind,
        fields: &[FieldSpec],
        at: Cursor,
        width: usize,
        item: &mut Value,
    ) -> Result<()> {
        if !self.span_has_data(at, width) {
            *item = elem.zero_value();
            return Ok(());
        }
        let mut map = match mem::take(item) {
            Value::Record(map) => map,
            _ => zero_record(fields),
        };
        let outcome = self.decode_record(fields, &mut map, at);
        *item = Value::Record(map);
        outcome
    }

    fn decode_scalar_array(
        &self,
        field: &FieldSpec,
        len: usize,
        elem: &FieldKind,
        option: &FieldOption,
        slot: &mut Value,
        at: Cursor,
    ) -> Result<()> {
        let mut rows = self.pool.acquire_rows();
        self.scalar_rows(at, &mut rows);
        if let Some(&extra) = rows.iter().find(|&&offset| offset >= len) {
            return Err(Error::unsupported_shape(&format!(
                "field `{}` holds {} elements but row {} has a value",
                field.name(),
                len,
                at.row + extra
            )));
        }
        let mut items = take_list(slot);
        items.resize_with(len, || elem.zero_value());
        let outcome = rows.iter().try_for_each(|&offset| {
            self.visit(field, elem, option, &mut items[offset], at.down(offset))
        });
        *slot = Value::List(items);
        outcome
    }

    fn decode_scalar_list(
        &self,
        field: &FieldSpec,
        elem: &FieldKind,
        option: &FieldOption,
        slot: &mut Value,
        at: Cursor,
    ) -> Result<()> {
        let mut rows = self.pool.acquire_rows();
        self.scalar_rows(at, &mut rows);
        let Some(&last) = rows.last() else {
            return Ok(());
        };
        let mut items: Vec<Value> = (0..=last).map(|_| elem.zero_value()).collect();
        let outcome = rows.iter().try_for_each(|&offset| {
            self.visit(field, elem, option, &mut items[offset], at.down(offset))
        });
        *slot = Value::List(items);
        outcome
    }

    fn decode_packed_list(
        &self,
        field: &FieldSpec,
        elem: &FieldKind,
        option: &FieldOption,
        slot: &mut Value,
        at: Cursor,
    ) -> Result<()> {
        let text = self.cell(at.row, at.column);
        if text.is_empty() {
            return Ok(());
        }
        let mut items = Vec::new();
        for piece in text.split(self.options.csv_separator) {
            let mut item = elem.zero_value();
            self.parse_text(field, elem, option, piece, &mut item)?;
            items.push(item);
        }
        *slot = Value::List(items);
        Ok(())
    }

    /// Parses one cell's text into a scalar or optional-scalar slot.
    fn parse_text(
        &self,
        field: &FieldSpec,
        kind: &FieldKind,
        option: &FieldOption,
        text: &str,
        slot: &mut Value,
    ) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        match kind {
            FieldKind::Scalar(scalar) => {
                *slot = self.parse_scalar(field.name(), *scalar, option, text)?;
                Ok(())
            }
            FieldKind::Optional(inner) => self.parse_text(field, inner, option, text, slot),
            _ => Err(Error::unsupported_shape(&format!(
                "field `{}` cannot be read from a single cell",
                field.name()
            ))),
        }
    }

    fn parse_scalar(
        &self,
        name: &str,
        scalar: ScalarKind,
        option: &FieldOption,
        text: &str,
    ) -> Result<Value> {
        let mismatch = || Error::field_type_mismatch(name, text, scalar.name());
        match scalar {
            ScalarKind::Bool => match text {
                "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(Value::Bool(true)),
                "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(Value::Bool(false)),
                _ => Err(mismatch()),
            },
            ScalarKind::Int(_) => {
                let value = if option.datetime {
                    self.epoch(name, text)?
                } else {
                    text.parse().map_err(|_| mismatch())?
                };
                if !scalar.admits_int(value) {
                    return Err(mismatch());
                }
                Ok(Value::Int(value))
            }
            ScalarKind::Uint(_) => {
                let value = if option.datetime {
                    u64::try_from(self.epoch(name, text)?).map_err(|_| mismatch())?
                } else {
                    text.parse().map_err(|_| mismatch())?
                };
                if !scalar.admits_uint(value) {
                    return Err(mismatch());
                }
                Ok(Value::Uint(value))
            }
            ScalarKind::Float => text.parse().map(Value::Float).map_err(|_| mismatch()),
            ScalarKind::String => Ok(Value::String(text.to_string())),
            ScalarKind::Char => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(_), None) => Ok(Value::String(text.to_string())),
                    _ => Err(mismatch()),
                }
            }
            ScalarKind::Instant if option.datetime => parse_local(text, &self.options.datetime_format)
                .map(|dt| Value::String(instant_text(&dt)))
                .map_err(|reason| Error::datetime_parse(name, text, reason)),
            ScalarKind::Instant => parse_instant(text)
                .map(|dt| Value::String(instant_text(&dt)))
                .map_err(|reason| Error::datetime_parse(name, text, reason)),
        }
    }

    fn epoch(&self, name: &str, text: &str) -> Result<i64> {
        parse_local(text, &self.options.datetime_format)
            .map(|dt| dt.timestamp())
            .map_err(|reason| Error::datetime_parse(name, text, reason))
    }

    fn is_present(&self, kind: &FieldKind, option: &FieldOption, at: Cursor) -> bool {
        match kind {
            FieldKind::Scalar(_) => !self.cell(at.row, at.column).is_empty(),
            FieldKind::Optional(inner) => self.is_present(inner, option, at),
            FieldKind::Record(_) => self.span_has_data(at, self.block_width(at)),
            FieldKind::List(elem) if option.csv && elem.record_fields().is_none() => {
                !self.cell(at.row, at.column).is_empty()
            }
            FieldKind::List(elem) | FieldKind::FixedArray(_, elem) => {
                let mut rows = self.pool.acquire_rows();
                if elem.record_fields().is_some() {
                    self.record_rows(at, &mut rows);
                } else {
                    self.scalar_rows(at, &mut rows);
                }
                !rows.is_empty()
            }
        }
    }

    /// Width of the block whose key sits at `(at.depth, at.column)`.
    fn block_width(&self, at: Cursor) -> usize {
        let mut width = 1;
        while at.column + width < at.limit && self.format.get(at.depth, at.column + width).is_empty()
        {
            width += 1;
        }
        width
    }

    /// Whether any non-index cell of the block is non-empty at `at.row`.
    fn span_has_data(&self, at: Cursor, width: usize) -> bool {
        (at.column..at.column + width)
            .filter(|&column| self.format.get(at.depth + 1, column) != INDEX_KEY)
            .any(|column| !self.cell(at.row, column).is_empty())
    }

    /// Row offsets at which a repeated record has any non-empty cell, index marker included.
    ///
    /// Counting the index column is deliberate: a row holding only its index is
    /// an absent `Option` element, and dropping it would shift later elements.
    fn record_rows(&self, at: Cursor, rows: &mut Vec<usize>) {
        let width = self.block_width(at);
        let span = at.column..at.column + width;
        rows.extend(
            (0..self.values.len().saturating_sub(at.row)).filter(|&offset| {
                span.clone()
                    .any(|column| !self.cell(at.row + offset, column).is_empty())
            }),
        );
        log::trace!("target rows at ({}, {}): {:?}", at.row, at.column, rows);
    }

    /// Row offsets at which a single-column field has a non-empty cell.
    fn scalar_rows(&self, at: Cursor, rows: &mut Vec<usize>) {
        rows.extend(
            (0..self.values.len().saturating_sub(at.row))
                .filter(|&offset| !self.cell(at.row + offset, at.column).is_empty()),
        );
        log::trace!("target rows at ({}, {}): {:?}", at.row, at.column, rows);
    }
}

fn take_list(slot: &mut Value) -> Vec<Value> {
    match mem::take(slot) {
        Value::List(items) => items,
        _ => Vec::new(),
    }
}
