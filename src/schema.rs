//! Record shapes.
//!
//! Every type that can appear in a grid describes itself through [`Sheet`] as a
//! [`FieldKind`] tree. The engines dispatch on this closed set of kinds instead
//! of inspecting values at runtime:
//!
//! | Kind                  | Rust types |
//! |-----------------------|------------|
//! | `Scalar(Bool)`        | `bool` |
//! | `Scalar(Int(bits))`   | `i8`..`i64`, `isize` |
//! | `Scalar(Uint(bits))`  | `u8`..`u64`, `usize` |
//! | `Scalar(Float)`       | `f32`, `f64` |
//! | `Scalar(String)`      | `String`, unit-only enums (manual impl) |
//! | `Scalar(Char)`        | `char` |
//! | `Scalar(Instant)`     | `chrono::DateTime<Utc \| Local \| FixedOffset>` |
//! | `Optional(X)`         | `Option<X>`, `Box<X>` is transparent |
//! | `Record(fields)`      | structs declared with [`crate::sheet_record!`] |
//! | `FixedArray(N, X)`    | `[X; N]` |
//! | `List(X)`             | `Vec<X>` |
//!
//! Instants are leaves: a point-in-time value always occupies a single cell.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, FixedOffset, Local, Utc};
use parking_lot::RwLock;

use crate::datetime::zero_instant_text;
use crate::{Error, FieldOption, RecordMap, Result, Value};

/// Primitive cell types.
///
/// Integer kinds carry their bit width so the decoder can reject cells that do
/// not fit the target type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int(u32),
    Uint(u32),
    Float,
    String,
    Char,
    /// A point in time, carried as RFC 3339 text inside [`Value`].
    Instant,
}

impl ScalarKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int(8) => "i8",
            ScalarKind::Int(16) => "i16",
            ScalarKind::Int(32) => "i32",
            ScalarKind::Int(64) => "i64",
            ScalarKind::Int(_) => "integer",
            ScalarKind::Uint(8) => "u8",
            ScalarKind::Uint(16) => "u16",
            ScalarKind::Uint(32) => "u32",
            ScalarKind::Uint(64) => "u64",
            ScalarKind::Uint(_) => "unsigned integer",
            ScalarKind::Float => "float",
            ScalarKind::String => "string",
            ScalarKind::Char => "char",
            ScalarKind::Instant => "instant",
        }
    }

    /// The value a field of this kind holds when its cell is empty.
    #[must_use]
    pub fn zero_value(self) -> Value {
        match self {
            ScalarKind::Bool => Value::Bool(false),
            ScalarKind::Int(_) => Value::Int(0),
            ScalarKind::Uint(_) => Value::Uint(0),
            ScalarKind::Float => Value::Float(0.0),
            ScalarKind::String => Value::String(String::new()),
            ScalarKind::Char => Value::String('\0'.to_string()),
            ScalarKind::Instant => Value::String(zero_instant_text()),
        }
    }

    /// Whether `value` is representable by this kind; non-integer kinds admit everything.
    #[must_use]
    pub fn admits_int(self, value: i64) -> bool {
        match self {
            ScalarKind::Int(bits) if (1..64).contains(&bits) => {
                let max = (1i64 << (bits - 1)) - 1;
                (-max - 1..=max).contains(&value)
            }
            ScalarKind::Uint(_) => u64::try_from(value).map_or(false, |value| self.admits_uint(value)),
            _ => true,
        }
    }

    /// Unsigned counterpart of [`ScalarKind::admits_int`].
    #[must_use]
    pub fn admits_uint(self, value: u64) -> bool {
        match self {
            ScalarKind::Int(_) => i64::try_from(value).map_or(false, |value| self.admits_int(value)),
            ScalarKind::Uint(bits) if bits < 64 => value < (1u64 << bits),
            _ => true,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The shape of one field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    Optional(Box<FieldKind>),
    Record(Vec<FieldSpec>),
    FixedArray(usize, Box<FieldKind>),
    List(Box<FieldKind>),
}

impl FieldKind {
    /// Schema-complete zero value: records carry every field, fixed arrays every slot.
    #[must_use]
    pub fn zero_value(&self) -> Value {
        match self {
            FieldKind::Scalar(scalar) => scalar.zero_value(),
            FieldKind::Optional(_) => Value::Null,
            FieldKind::Record(fields) => Value::Record(
                fields
                    .iter()
                    .map(|f| (f.name.clone(), f.kind.zero_value()))
                    .collect(),
            ),
            FieldKind::FixedArray(len, elem) => {
                Value::List((0..*len).map(|_| elem.zero_value()).collect())
            }
            FieldKind::List(_) => Value::List(Vec::new()),
        }
    }

    /// Number of grid columns this kind occupies.
    ///
    /// Repeated records carry one extra leading column for the repetition index.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_sheet::{FieldKind, FieldSpec, ScalarKind};
    ///
    /// let record = FieldKind::Record(vec![
    ///     FieldSpec::new::<String>("code", ""),
    ///     FieldSpec::new::<i32>("num", ""),
    /// ]);
    /// assert_eq!(record.width(), 2);
    /// assert_eq!(FieldKind::List(Box::new(record)).width(), 3);
    /// assert_eq!(FieldKind::Scalar(ScalarKind::Int(32)).width(), 1);
    /// ```
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            FieldKind::Scalar(_) => 1,
            FieldKind::Optional(inner) => inner.width(),
            FieldKind::Record(fields) => fields
                .iter()
                .filter(|f| f.is_visible())
                .map(|f| f.kind.width().max(1))
                .sum(),
            FieldKind::FixedArray(_, elem) | FieldKind::List(elem) => match elem.record_fields() {
                Some(_) => 1 + elem.width(),
                None => 1,
            },
        }
    }

    /// Fields of a record or of an optional record.
    #[must_use]
    pub fn record_fields(&self) -> Option<&[FieldSpec]> {
        match self {
            FieldKind::Record(fields) => Some(fields),
            FieldKind::Optional(inner) => match inner.as_ref() {
                FieldKind::Record(fields) => Some(fields),
                _ => None,
            },
            _ => None,
        }
    }

    /// Scalar kind of a scalar or of an optional scalar.
    #[must_use]
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            FieldKind::Scalar(scalar) => Some(*scalar),
            FieldKind::Optional(inner) => match inner.as_ref() {
                FieldKind::Scalar(scalar) => Some(*scalar),
                _ => None,
            },
            _ => None,
        }
    }

    /// Rejects shapes the layout model does not define.
    ///
    /// Repeated elements must be scalars or records (optionally wrapped in
    /// `Option`); a list of lists has no column layout. Elements of a repeated
    /// record own exactly one row each, so none of their fields may repeat,
    /// except as a `csv` list packed into one cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedShape`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        self.validate_at("<root>")
    }

    /// Whether a field of this kind always fits on a single row.
    fn is_single_row(&self, option: &FieldOption) -> bool {
        match self {
            FieldKind::Scalar(_) => true,
            FieldKind::Optional(inner) => inner.is_single_row(option),
            FieldKind::Record(fields) => fields
                .iter()
                .filter(|f| f.is_visible())
                .all(|f| f.kind.is_single_row(&f.option)),
            FieldKind::List(elem) => option.csv && elem.scalar_kind().is_some(),
            FieldKind::FixedArray(..) => false,
        }
    }

    fn validate_at(&self, field: &str) -> Result<()> {
        match self {
            FieldKind::Scalar(_) => Ok(()),
            FieldKind::Optional(inner) => inner.validate_at(field),
            FieldKind::Record(fields) => fields
                .iter()
                .filter(|f| f.is_visible())
                .try_for_each(|f| f.kind.validate_at(&f.name)),
            FieldKind::FixedArray(_, elem) | FieldKind::List(elem) => {
                if let Some(fields) = elem.record_fields() {
                    fields
                        .iter()
                        .filter(|f| f.is_visible())
                        .try_for_each(|f| f.kind.validate_at(&f.name))?;
                    return match fields
                        .iter()
                        .find(|f| f.is_visible() && !f.kind.is_single_row(&f.option))
                    {
                        Some(inner) => Err(Error::unsupported_shape(&format!(
                            "field `{}` repeats records whose field `{}` spans several rows",
                            field, inner.name
                        ))),
                        None => Ok(()),
                    };
                }
                if elem.scalar_kind().is_some() {
                    return Ok(());
                }
                Err(Error::unsupported_shape(&format!(
                    "field `{}` repeats a repeated or nested-optional element",
                    field
                )))
            }
        }
    }
}

/// One field of a record type.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    name: String,
    key: String,
    kind: FieldKind,
    option: FieldOption,
}

impl FieldSpec {
    /// Declares field `name` of type `T` with the given tag.
    ///
    /// `name` must match the serde field name; the grid key is the tag's leading
    /// rename token when present.
    #[must_use]
    pub fn new<T: Sheet>(name: &str, tag: &str) -> Self {
        Self::with_kind(name, tag, T::field_kind())
    }

    /// Declares a field with an explicit kind.
    #[must_use]
    pub fn with_kind(name: &str, tag: &str, kind: FieldKind) -> Self {
        let option = FieldOption::parse(tag);
        let key = if option.skip {
            String::new()
        } else {
            option.rename().unwrap_or(name).to_string()
        };
        FieldSpec {
            name: name.to_string(),
            key,
            kind,
            option,
        }
    }

    /// Serde name of the field.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid key of the field; empty for skipped fields.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    #[must_use]
    pub fn option(&self) -> &FieldOption {
        &self.option
    }

    /// Whether the field takes part in the layout.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.key.is_empty()
    }

    /// Whether a grid key addresses this field.
    pub(crate) fn matches(&self, key: &str) -> bool {
        self.is_visible() && (self.key == key || self.name == key)
    }
}

/// Finds the visible field addressed by a grid key.
pub(crate) fn find_field<'a>(fields: &'a [FieldSpec], key: &str) -> Option<&'a FieldSpec> {
    fields
        .iter()
        .find(|f| f.is_visible() && f.key == key)
        .or_else(|| fields.iter().find(|f| f.matches(key)))
}

/// Types with a grid layout.
///
/// Implemented for primitives, chrono instants, `Option`, `Vec` and arrays;
/// record types implement it through [`crate::sheet_record!`] or by hand:
///
/// ```rust
/// use serde_sheet::{FieldKind, FieldSpec, Sheet};
///
/// struct Sub {
///     code: String,
///     tags: Vec<String>,
/// }
///
/// impl Sheet for Sub {
///     fn field_kind() -> FieldKind {
///         FieldKind::Record(vec![
///             FieldSpec::new::<String>("code", ""),
///             FieldSpec::new::<Vec<String>>("tags", "csv"),
///         ])
///     }
/// }
///
/// assert_eq!(Sub::field_kind().width(), 2);
/// ```
pub trait Sheet {
    fn field_kind() -> FieldKind;
}

macro_rules! scalar_sheet {
    ($kind:ident(BITS) => $($ty:ty),* $(,)?) => {
        $(
            impl Sheet for $ty {
                fn field_kind() -> FieldKind {
                    FieldKind::Scalar(ScalarKind::$kind(<$ty>::BITS))
                }
            }
        )*
    };
    ($kind:ident => $($ty:ty),* $(,)?) => {
        $(
            impl Sheet for $ty {
                fn field_kind() -> FieldKind {
                    FieldKind::Scalar(ScalarKind::$kind)
                }
            }
        )*
    };
}

scalar_sheet!(Bool => bool);
scalar_sheet!(Int(BITS) => i8, i16, i32, i64, isize);
scalar_sheet!(Uint(BITS) => u8, u16, u32, u64, usize);
scalar_sheet!(Float => f32, f64);
scalar_sheet!(String => String);
scalar_sheet!(Char => char);
scalar_sheet!(Instant => DateTime<Utc>, DateTime<Local>, DateTime<FixedOffset>);

impl<T: Sheet> Sheet for Option<T> {
    fn field_kind() -> FieldKind {
        FieldKind::Optional(Box::new(T::field_kind()))
    }
}

impl<T: Sheet> Sheet for Box<T> {
    fn field_kind() -> FieldKind {
        T::field_kind()
    }
}

impl<T: Sheet> Sheet for Vec<T> {
    fn field_kind() -> FieldKind {
        FieldKind::List(Box::new(T::field_kind()))
    }
}

impl<T: Sheet, const N: usize> Sheet for [T; N] {
    fn field_kind() -> FieldKind {
        FieldKind::FixedArray(N, Box::new(T::field_kind()))
    }
}

type SchemaCache = RwLock<HashMap<TypeId, Arc<FieldKind>>>;

static SCHEMAS: OnceLock<SchemaCache> = OnceLock::new();

/// The [`FieldKind`] of `T`, built on first use and cached for the process.
pub fn schema_of<T: Sheet + 'static>() -> Arc<FieldKind> {
    let cache = SCHEMAS.get_or_init(SchemaCache::default);
    let id = TypeId::of::<T>();
    if let Some(kind) = cache.read().get(&id) {
        return Arc::clone(kind);
    }
    let kind = Arc::new(T::field_kind());
    log::trace!("built schema for {}", std::any::type_name::<T>());
    Arc::clone(cache.write().entry(id).or_insert(kind))
}

/// Zero record for a field list, used when a value slot holds something else.
pub(crate) fn zero_record(fields: &[FieldSpec]) -> RecordMap {
    fields
        .iter()
        .map(|f| (f.name.clone(), f.kind.zero_value()))
        .collect()
}
