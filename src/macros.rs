/// Declares one or more record structs and implements [`Sheet`](crate::Sheet) for them.
///
/// Each field may carry a tag after `=>`; see [`FieldOption`](crate::FieldOption)
/// for the token grammar. Field names must match their serde names, so avoid
/// `#[serde(rename)]` on record fields and use a rename token instead.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_sheet::{sheet_record, FieldKind, Sheet};
///
/// sheet_record! {
///     #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
///     pub struct Sub {
///         pub code: String => "Code",
///         pub num: i32,
///     }
///
///     #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
///     pub struct Order {
///         pub id: String => "ID,title=Order",
///         pub sub: Option<Sub>,
///         pub tags: Vec<String> => "csv",
///         pub note: String => "-",
///     }
/// }
///
/// match Order::field_kind() {
///     FieldKind::Record(fields) => {
///         assert_eq!(fields[0].key(), "ID");
///         assert_eq!(fields[0].option().title, "Order");
///         assert!(!fields[3].is_visible());
///     }
///     _ => unreachable!(),
/// }
/// ```
#[macro_export]
macro_rules! sheet_record {
    ($(
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty $(=> $tag:literal)?
            ),* $(,)?
        }
    )*) => {
        $(
            $(#[$meta])*
            $vis struct $name {
                $(
                    $(#[$fmeta])*
                    $fvis $field: $fty,
                )*
            }

            impl $crate::Sheet for $name {
                fn field_kind() -> $crate::FieldKind {
                    $crate::FieldKind::Record(vec![
                        $(
                            $crate::FieldSpec::new::<$fty>(
                                stringify!($field),
                                concat!("" $(, $tag)?),
                            ),
                        )*
                    ])
                }
            }
        )*
    };
}
