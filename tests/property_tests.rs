//! Property-based tests - encode, render to text, decode against the projected header
//!
//! Generated strings are non-empty because an empty string and an absent cell
//! share the same text form.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_sheet::{from_grid, header, sheet_record, to_grid, Sheet};

fn roundtrip<T>(value: &T) -> bool
where
    T: Sheet + Serialize + DeserializeOwned + PartialEq + std::fmt::Debug + 'static,
{
    let grid = match to_grid(value) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Encode failed: {}", e);
            return false;
        }
    };
    let format = match header::<T>(false) {
        Ok(header) => header.format,
        Err(e) => {
            eprintln!("Header failed: {}", e);
            return false;
        }
    };
    let text = grid.to_text_grid();
    match from_grid::<T, _, _>(format.rows(), &text) {
        Ok(decoded) if decoded == *value => true,
        Ok(decoded) => {
            eprintln!("Decoded {:?}", decoded);
            eprintln!("Grid was: {:?}", text);
            false
        }
        Err(e) => {
            eprintln!("Decode failed: {}", e);
            eprintln!("Grid was: {:?}", text);
            false
        }
    }
}

sheet_record! {
    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    struct Scalars {
        int: i64,
        uint: u32,
        flag: bool,
        ratio: f64,
        text: String,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    struct Line {
        code: String,
        qty: u16,
        note: Option<String>,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    struct Document {
        id: String => "ID",
        head: Scalars,
        lines: Vec<Line>,
        tags: Vec<String> => "csv",
        notes: Vec<String>,
        maybe: Option<i32>,
        pair: [Line; 2],
    }
}

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn scalars() -> impl Strategy<Value = Scalars> {
    (
        any::<i64>(),
        any::<u32>(),
        any::<bool>(),
        -1.0e9f64..1.0e9,
        word(),
    )
        .prop_map(|(int, uint, flag, ratio, text)| Scalars {
            int,
            uint,
            flag,
            ratio,
            text,
        })
}

fn line() -> impl Strategy<Value = Line> {
    (word(), any::<u16>(), proptest::option::of(word())).prop_map(|(code, qty, note)| Line {
        code,
        qty,
        note,
    })
}

fn document() -> impl Strategy<Value = Document> {
    (
        word(),
        scalars(),
        prop::collection::vec(line(), 0..5),
        prop::collection::vec(word(), 0..4),
        prop::collection::vec(word(), 0..4),
        proptest::option::of(any::<i32>()),
        (line(), line()),
    )
        .prop_map(|(id, head, lines, tags, notes, maybe, (a, b))| Document {
            id,
            head,
            lines,
            tags,
            notes,
            maybe,
            pair: [a, b],
        })
}

proptest! {
    #[test]
    fn prop_scalars(value in scalars()) {
        prop_assert!(roundtrip(&value));
    }

    #[test]
    fn prop_line(value in line()) {
        prop_assert!(roundtrip(&value));
    }

    #[test]
    fn prop_document(value in document()) {
        prop_assert!(roundtrip(&value));
    }

    #[test]
    fn prop_empty_cells_never_fail(width in 1usize..12, height in 1usize..6) {
        let format = header::<Document>(false).unwrap().format;
        let values = vec![vec![String::new(); width]; height];
        prop_assert!(from_grid::<Document, _, _>(format.rows(), &values).is_ok());
    }
}
