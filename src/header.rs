//! Header projection.
//!
//! Derives the format rows for a record type by walking its schema the same
//! way the [`Encoder`](crate::Encoder) walks a value, writing keys instead of
//! cells. The result feeds straight into a [`Decoder`](crate::Decoder).
//!
//! A field's key goes on the format row matching its nesting depth. Nested
//! records put their keys one row lower, starting at the record's own column;
//! repeated records reserve their first column for [`INDEX_KEY`]. Keys of
//! `datetime` fields carry a `:datetime` suffix.
//!
//! ```rust
//! use serde_sheet::{header, sheet_record};
//!
//! sheet_record! {
//!     struct Sub {
//!         code: String => "Code",
//!         num: i32 => "Num",
//!     }
//!
//!     struct Sample {
//!         id: String => "ID",
//!         sub: Sub => "Sub",
//!         list: Vec<Sub> => "SList",
//!         updated_at: i64 => "datetime",
//!     }
//! }
//!
//! let rows = header::<Sample>(false).unwrap().into_rows();
//! assert_eq!(
//!     rows,
//!     vec![
//!         vec!["ID", "Sub", "", "SList", "", "", "updated_at:datetime"],
//!         vec!["", "Code", "Num", "_index", "Code", "Num", ""],
//!     ]
//! );
//! ```

use crate::{Error, FieldKind, FieldSpec, FormatGrid, Header, Result, INDEX_KEY};

const DATETIME_SUFFIX: &str = ":datetime";

/// Projects the header of a record kind.
///
/// When `include_titles` is set, the title row holds, per column, the title of
/// the most deeply nested field starting there (its `title=` option, or its
/// key); index columns have no title.
///
/// # Errors
///
/// - [`Error::InvalidTarget`] if `kind` is not a record
/// - [`Error::UnsupportedShape`] for shapes without a layout
pub fn project_header(kind: &FieldKind, include_titles: bool) -> Result<Header> {
    let FieldKind::Record(fields) = kind else {
        return Err(Error::invalid_target("header source must be a record type"));
    };
    kind.validate()?;

    let mut projection = Projection::default();
    let width = projection.record(fields, 0, 0);
    let height = projection.keys.iter().map(|k| k.depth + 1).max().unwrap_or(0);

    let mut rows = vec![vec![String::new(); width]; height];
    let mut titles: Vec<Option<(usize, String)>> = vec![None; width];
    for key in projection.keys {
        rows[key.depth][key.column] = key.text;
        let slot = &mut titles[key.column];
        if slot.as_ref().map_or(true, |(depth, _)| key.depth >= *depth) {
            *slot = Some((key.depth, key.title));
        }
    }
    log::debug!("projected a {}x{} header", height, width);

    Ok(Header {
        format: FormatGrid::new(rows),
        titles: include_titles.then(|| {
            titles
                .into_iter()
                .map(|title| title.map(|(_, text)| text).unwrap_or_default())
                .collect()
        }),
    })
}

struct Key {
    depth: usize,
    column: usize,
    text: String,
    title: String,
}

#[derive(Default)]
struct Projection {
    keys: Vec<Key>,
}

impl Projection {
    fn record(&mut self, fields: &[FieldSpec], depth: usize, column: usize) -> usize {
        let mut width = 0;
        for field in fields.iter().filter(|f| f.is_visible()) {
            width += self.field(field, depth, column + width).max(1);
        }
        width
    }

    fn field(&mut self, field: &FieldSpec, depth: usize, column: usize) -> usize {
        let option = field.option();
        let mut text = field.key().to_string();
        if option.datetime {
            text.push_str(DATETIME_SUFFIX);
        }
        let title = if option.title.is_empty() {
            field.key().to_string()
        } else {
            option.title.clone()
        };
        self.keys.push(Key {
            depth,
            column,
            text,
            title,
        });
        self.body(field.kind(), depth, column)
    }

    fn body(&mut self, kind: &FieldKind, depth: usize, column: usize) -> usize {
        match kind {
            FieldKind::Scalar(_) => 1,
            FieldKind::Optional(inner) => self.body(inner, depth, column),
            FieldKind::Record(fields) => self.record(fields, depth + 1, column),
            FieldKind::FixedArray(_, elem) | FieldKind::List(elem) => match elem.record_fields() {
                Some(fields) => {
                    self.keys.push(Key {
                        depth: depth + 1,
                        column,
                        text: INDEX_KEY.to_string(),
                        title: String::new(),
                    });
                    1 + self.record(fields, depth + 1, column + 1)
                }
                None => 1,
            },
        }
    }
}
