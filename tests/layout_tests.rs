//! Header, encoder and decoder agree on one layout.

use serde::{Deserialize, Serialize};
use serde_sheet::{
    from_grid, header, project_header, sheet_record, to_grid, Cell, Decoder, Encoder, Error,
    FieldKind, FieldSpec, RecordMap, Sheet, Value,
};

sheet_record! {
    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    struct Code {
        code: String => "Code",
        num: i32 => "Num",
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    struct Sample {
        id: String => "ID",
        sub: Code => "Sub",
        num: i32 => "Num",
        pid: Option<String> => "PID",
        list: Vec<Option<String>> => "List",
        slist: Vec<Code> => "SList",
        now: i64 => "Now,datetime",
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    struct Deep {
        outer: Option<Wrapper>,
        after: u8,
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    struct Wrapper {
        inner: Code,
        label: String,
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    struct Pair {
        pair: [Code; 2],
        rest: Vec<Option<Code>>,
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    struct Tagged {
        code: String,
        tags: Vec<String>,
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    struct Holder {
        items: Vec<Tagged>,
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    struct Bin {
        label: String,
        codes: Vec<Code>,
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    struct Shelf {
        bins: [Option<Bin>; 2],
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    struct Entry {
        code: String,
        tags: Vec<String> => "csv",
        sub: Option<Code>,
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    struct Batch {
        entries: Vec<Entry>,
        notes: Vec<String>,
    }
}

#[test]
fn test_projected_header_matches_hand_written_format() {
    let rows = header::<Sample>(false).unwrap().into_rows();
    assert_eq!(
        rows,
        vec![
            vec!["ID", "Sub", "", "Num", "PID", "List", "SList", "", "", "Now:datetime"],
            vec!["", "Code", "Num", "", "", "", "_index", "Code", "Num", ""],
        ]
    );
}

#[test]
fn test_hand_written_format_decodes() {
    let format = vec![
        vec!["ID", "Sub", "", "Num", "PID", "List", "SList", "", "", "Now:datetime"],
        vec!["", "Code", "Num", "", "", "", "_index", "Code", "Num"],
    ];
    let values = vec![
        vec!["id_01", "aaa", "123456789", "123", "", "AA", "1", "", "", ""],
        vec!["", "", "", "", "", "", "2", "code_1_02", "12"],
        vec!["", "", "", "", "", "CC", "3", "code_1_03", "13"],
    ];
    let sample: Sample = Decoder::new(&format).decode(&values).unwrap();
    assert_eq!(sample.sub.num, 123456789);
    assert_eq!(
        sample.list,
        vec![Some("AA".to_string()), None, Some("CC".to_string())]
    );
    assert_eq!(sample.slist.len(), 3);
    assert_eq!(sample.slist[0], Code::default());
    assert_eq!(sample.now, 0);
}

#[test]
fn test_encoder_width_matches_header_width() {
    let sample = Sample {
        id: "x".to_string(),
        slist: vec![Code::default(); 3],
        ..Sample::default()
    };
    let grid = to_grid(&sample).unwrap();
    let header = header::<Sample>(false).unwrap();
    assert_eq!(grid.width(), header.format.width());
    assert_eq!(grid.height(), 3);
    assert_eq!(grid.get(2, 6), &Cell::Int(3));
}

#[test]
fn test_deep_nesting_round_trip() {
    let rows = header::<Deep>(false).unwrap().into_rows();
    assert_eq!(
        rows,
        vec![
            vec!["outer", "", "", "after"],
            vec!["inner", "", "label", ""],
            vec!["Code", "Num", "", ""],
        ]
    );

    let deep = Deep {
        outer: Some(Wrapper {
            inner: Code {
                code: "c".to_string(),
                num: 5,
            },
            label: "l".to_string(),
        }),
        after: 9,
    };
    let grid = to_grid(&deep).unwrap();
    let text = grid.to_text_grid();
    assert_eq!(text, vec![vec!["c", "5", "l", "9"]]);
    let back: Deep = from_grid(&rows, &text).unwrap();
    assert_eq!(back, deep);
}

#[test]
fn test_absent_optional_record_stays_absent() {
    let deep = Deep {
        outer: None,
        after: 1,
    };
    let text = to_grid(&deep).unwrap().to_text_grid();
    assert_eq!(text, vec![vec!["", "", "", "1"]]);
    let format = header::<Deep>(false).unwrap().format;
    let back: Deep = from_grid(format.rows(), &text).unwrap();
    assert_eq!(back, deep);
}

#[test]
fn test_fixed_array_truncation() {
    let format = header::<Pair>(false).unwrap().format;
    assert_eq!(format.rows()[1], vec!["_index", "Code", "Num", "_index", "Code", "Num"]);
    let values = vec![
        vec!["1", "a", "1"],
        vec!["2", "b", "2"],
        vec!["3", "c", "3"],
    ];
    let pair: Pair = from_grid(format.rows(), &values).unwrap();
    assert_eq!(pair.pair[0].code, "a");
    assert_eq!(pair.pair[1].code, "b");
    assert!(pair.rest.is_empty());
}

#[test]
fn test_optional_elements_keep_index_alignment() {
    let pair = Pair {
        pair: Default::default(),
        rest: vec![
            None,
            Some(Code {
                code: "x".to_string(),
                num: 1,
            }),
        ],
    };
    let grid = to_grid(&pair).unwrap();
    assert_eq!(grid.get(0, 3), &Cell::Int(1));
    assert!(grid.get(0, 4).is_empty());
    let format = header::<Pair>(false).unwrap().format;
    let back: Pair = from_grid(format.rows(), &grid.to_text_grid()).unwrap();
    assert_eq!(back.rest, pair.rest);
}

#[test]
fn test_title_row() {
    let header = header::<Sample>(true).unwrap();
    assert_eq!(
        header.titles.unwrap(),
        vec!["ID", "Code", "Num", "Num", "PID", "List", "", "Code", "Num", "Now"]
    );
}

#[test]
fn test_dynamic_values() {
    let kind = FieldKind::Record(vec![
        FieldSpec::new::<String>("name", "Name"),
        FieldSpec::new::<Vec<u8>>("bytes", "csv"),
    ]);
    let mut record = RecordMap::new();
    record.insert("name".to_string(), Value::from("blob"));
    record.insert(
        "bytes".to_string(),
        Value::List(vec![Value::Uint(1), Value::Uint(2)]),
    );
    let grid = Encoder::new()
        .encode_value(&kind, &Value::Record(record.clone()))
        .unwrap();
    let format = project_header(&kind, false).unwrap().format;
    assert_eq!(format.rows(), &[vec!["Name", "bytes"]]);

    let mut decoded = Value::Null;
    Decoder::from_format(format)
        .decode_value(&kind, &grid.to_text_grid(), &mut decoded)
        .unwrap();
    assert_eq!(decoded, Value::Record(record));
}

#[test]
fn test_nested_lists_are_unsupported() {
    let kind = FieldKind::Record(vec![FieldSpec::new::<Vec<Vec<String>>>("grid", "")]);
    assert!(matches!(
        project_header(&kind, false),
        Err(Error::UnsupportedShape(_))
    ));
    assert!(matches!(
        Encoder::new().encode_value(&kind, &Value::Null),
        Err(Error::UnsupportedShape(_))
    ));
    assert!(<Vec<Vec<String>>>::field_kind().validate().is_err());
}

#[test]
fn test_repeated_records_with_multi_row_fields_are_unsupported() {
    let holder = Holder {
        items: vec![
            Tagged {
                code: "a".to_string(),
                tags: vec!["x".to_string(), "y".to_string()],
            },
            Tagged {
                code: "b".to_string(),
                tags: vec!["z".to_string()],
            },
        ],
    };
    assert!(matches!(to_grid(&holder), Err(Error::UnsupportedShape(_))));
    assert!(matches!(
        header::<Holder>(false),
        Err(Error::UnsupportedShape(_))
    ));

    let format = [vec!["items", "", ""], vec!["_index", "code", "tags"]];
    let values = [vec!["1", "a", "x"], vec!["2", "b", "z"]];
    let decoded = Decoder::new(&format).decode::<Holder, _>(&values);
    assert!(matches!(decoded, Err(Error::UnsupportedShape(_))));

    assert!(matches!(
        header::<Shelf>(false),
        Err(Error::UnsupportedShape(_))
    ));
    assert!(matches!(
        to_grid(&Shelf::default()),
        Err(Error::UnsupportedShape(_))
    ));
}

#[test]
fn test_repeated_records_with_single_row_fields_round_trip() {
    let batch = Batch {
        entries: vec![
            Entry {
                code: "a".to_string(),
                tags: vec!["x".to_string(), "y".to_string()],
                sub: Some(Code {
                    code: "c".to_string(),
                    num: 1,
                }),
            },
            Entry {
                code: "b".to_string(),
                tags: vec!["z".to_string()],
                sub: None,
            },
        ],
        notes: vec!["n1".to_string(), "n2".to_string(), "n3".to_string()],
    };
    let grid = to_grid(&batch).unwrap();
    assert_eq!(grid.get(0, 2), &Cell::String("x,y".to_string()));
    assert_eq!(grid.get(1, 2), &Cell::String("z".to_string()));
    assert_eq!(grid.get(2, 5), &Cell::String("n3".to_string()));

    let format = header::<Batch>(false).unwrap().format;
    assert_eq!(
        format.rows(),
        &[
            vec!["entries", "", "", "", "", "notes"],
            vec!["_index", "code", "tags", "sub", "", ""],
            vec!["", "", "", "Code", "Num", ""],
        ]
    );
    let back: Batch = from_grid(format.rows(), &grid.to_text_grid()).unwrap();
    assert_eq!(back, batch);
}
