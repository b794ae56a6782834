//! Conversion of [`Value`] trees into `Deserialize` types.
//!
//! The decoder populates a schema-shaped `Value` from the grid and hands it to
//! [`from_value`], which drives the target type's `Deserialize` impl.
//!
//! ```rust
//! use serde_sheet::{from_value, RecordMap, Value};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Point { x: i32, y: Option<i32> }
//!
//! let mut record = RecordMap::new();
//! record.insert("x".to_string(), Value::Int(1));
//! record.insert("y".to_string(), Value::Null);
//! let point: Point = from_value(Value::Record(record)).unwrap();
//! assert_eq!(point, Point { x: 1, y: None });
//! ```

use serde::de::{self, DeserializeOwned, IntoDeserializer};
use serde::forward_to_deserialize_any;

use crate::{Error, RecordMap, Result, Value};

/// Deserializer reading from an owned [`Value`].
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    #[must_use]
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Int(i) => visitor.visit_i64(i),
            Value::Uint(u) => visitor.visit_u64(u),
            Value::Float(f) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::List(list) => visitor.visit_seq(SeqDeserializer::new(list)),
            Value::Record(record) => visitor.visit_map(MapDeserializer::new(record)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            value => visitor.visit_some(ValueDeserializer::new(value)),
        }
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            // only unit variants survive a round trip through a single cell
            Value::String(variant) => visitor.visit_enum(variant.into_deserializer()),
            other => Err(Error::custom(format!(
                "expected unit variant name, found {}",
                other.type_name()
            ))),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: RecordMap) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(Value::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

/// Deserialize an instance of type `T` from a [`Value`].
///
/// # Errors
///
/// Returns an error if the value's shape does not match what `T` expects.
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(ValueDeserializer::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    enum Color {
        Red,
        Blue,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Sample {
        small: u8,
        ratio: f32,
        color: Color,
        pair: [u16; 2],
        list: Vec<Option<String>>,
    }

    #[test]
    fn test_record_into_struct() {
        let mut record = RecordMap::new();
        record.insert("small".to_string(), Value::Int(7));
        record.insert("ratio".to_string(), Value::Float(0.5));
        record.insert("color".to_string(), Value::from("Blue"));
        record.insert(
            "pair".to_string(),
            Value::List(vec![Value::Uint(1), Value::Uint(2)]),
        );
        record.insert(
            "list".to_string(),
            Value::List(vec![Value::from("a"), Value::Null]),
        );

        let sample: Sample = from_value(Value::Record(record)).unwrap();
        assert_eq!(
            sample,
            Sample {
                small: 7,
                ratio: 0.5,
                color: Color::Blue,
                pair: [1, 2],
                list: vec![Some("a".to_string()), None],
            }
        );
        assert_ne!(sample.color, Color::Red);
    }

    #[test]
    fn test_out_of_range_integer_is_error() {
        assert!(from_value::<u8>(Value::Int(300)).is_err());
    }
}
