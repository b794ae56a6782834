//! Per-field tag options and crate-wide configuration.
//!
//! - [`FieldOption`]: the resolved form of a field tag such as `"csv"` or `"code,title=Code"`
//! - [`SheetOptions`]: datetime pattern, CSV separator and header title settings
//!
//! ## Tag grammar
//!
//! A tag is a comma-separated token list:
//!
//! | Token          | Effect |
//! |----------------|--------|
//! | `-`            | exclude the field from the grid entirely |
//! | `csv`          | pack a list of scalars into one comma-joined cell |
//! | `datetime`     | render/parse the value as `YYYY-MM-DD hh:mm:ss` local time |
//! | `title=<text>` | display title used by the header title row |
//! | anything else  | in leading position, renames the grid key; otherwise ignored |
//!
//! ## Examples
//!
//! ```rust
//! use serde_sheet::FieldOption;
//!
//! let opt = FieldOption::parse("created,datetime,title=Created At");
//! assert_eq!(opt.rename(), Some("created"));
//! assert!(opt.datetime);
//! assert_eq!(opt.title, "Created At");
//! ```

use crate::datetime::DEFAULT_DATETIME_FORMAT;

/// Grid key marking a column that only carries a 1-based repetition index.
pub const INDEX_KEY: &str = "_index";

const SKIP_TOKEN: &str = "-";
const CSV_TOKEN: &str = "csv";
const DATETIME_TOKEN: &str = "datetime";
const TITLE_PREFIX: &str = "title=";

/// Resolved configuration of one field.
///
/// Instances are reused through [`crate::ScratchPool`], so every parse path goes
/// through [`FieldOption::reset`] before the option is handed to another field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldOption {
    /// Field is excluded from the grid.
    pub skip: bool,
    /// List of scalars is packed into a single comma-joined cell.
    pub csv: bool,
    /// Value is rendered and parsed with the datetime pattern.
    pub datetime: bool,
    /// Human-readable title for the header title row.
    pub title: String,
    rename: String,
}

impl FieldOption {
    /// Parses a tag into a fresh option.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        let mut opt = FieldOption::default();
        opt.resolve(tag);
        opt
    }

    /// Parses `tag` into this option, overwriting every field.
    pub fn resolve(&mut self, tag: &str) {
        self.reset();
        if tag.is_empty() {
            return;
        }
        for (i, token) in tag.split(',').enumerate() {
            match token {
                SKIP_TOKEN if i == 0 => self.skip = true,
                CSV_TOKEN => self.csv = true,
                DATETIME_TOKEN => self.datetime = true,
                _ if token.starts_with(TITLE_PREFIX) => {
                    // keep everything after the first '='
                    if let Some((_, title)) = token.split_once('=') {
                        self.title.push_str(title);
                    }
                }
                _ if i == 0 && !token.is_empty() => self.rename.push_str(token),
                _ => {}
            }
        }
    }

    /// Restores every field to its default, keeping allocated capacity.
    pub fn reset(&mut self) {
        self.skip = false;
        self.csv = false;
        self.datetime = false;
        self.title.clear();
        self.rename.clear();
    }

    /// Folds the flags of `other` into this option.
    ///
    /// Used when a format key carries its own `:option` suffix on top of the
    /// field's declared tag.
    pub fn absorb(&mut self, other: &FieldOption) {
        self.skip |= other.skip;
        self.csv |= other.csv;
        self.datetime |= other.datetime;
        if self.title.is_empty() {
            self.title.push_str(&other.title);
        }
    }

    /// The leading rename token, if any.
    #[must_use]
    pub fn rename(&self) -> Option<&str> {
        if self.rename.is_empty() {
            None
        } else {
            Some(&self.rename)
        }
    }
}

/// Splits a format key such as `"Now:datetime"` into the key and its option suffix.
#[must_use]
pub fn split_key(raw: &str) -> (&str, &str) {
    raw.split_once(':').unwrap_or((raw, ""))
}

/// Configuration options shared by the encoder, decoder and header projector.
///
/// # Examples
///
/// ```rust
/// use serde_sheet::SheetOptions;
///
/// let options = SheetOptions::new()
///     .with_datetime_format("%Y/%m/%d %H:%M")
///     .with_csv_separator(';')
///     .with_titles(true);
/// assert_eq!(options.csv_separator, ';');
/// assert!(options.titles);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SheetOptions {
    /// chrono format pattern used for `datetime` fields, interpreted in local time.
    pub datetime_format: String,
    /// Separator for `csv` packed lists.
    pub csv_separator: char,
    /// Whether the header projector appends a title row.
    pub titles: bool,
}

impl Default for SheetOptions {
    fn default() -> Self {
        SheetOptions {
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            csv_separator: ',',
            titles: false,
        }
    }
}

impl SheetOptions {
    /// Creates default options (`YYYY-MM-DD hh:mm:ss`, comma separator, no titles).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chrono pattern used for `datetime` fields.
    #[must_use]
    pub fn with_datetime_format(mut self, format: &str) -> Self {
        self.datetime_format = format.to_string();
        self
    }

    /// Sets the separator used for `csv` packed lists.
    #[must_use]
    pub fn with_csv_separator(mut self, separator: char) -> Self {
        self.csv_separator = separator;
        self
    }

    /// Enables or disables the header title row.
    #[must_use]
    pub fn with_titles(mut self, titles: bool) -> Self {
        self.titles = titles;
        self
    }
}
