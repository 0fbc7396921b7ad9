use std::sync::Arc;

use clap::ValueEnum;

use crate::{data_type::DataType, value::Value};

/// The primary-key representation shared by every table of a database.
/// Chosen once when the database is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyType {
    Int,
    Text,
}

impl KeyType {
    /// The column type a key column of this kind is declared with.
    pub fn data_type(self) -> DataType {
        match self {
            Self::Int => DataType::Int,
            Self::Text => DataType::Text,
        }
    }
}

/// A primary-key value, used to look records up inside a table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Int(i64),
    Text(Arc<str>),
}

impl Key {
    /// Builds a key of kind `key_type` from `value`.
    ///
    /// Returns `None` when the value's type does not match the key type.
    pub fn from_value(value: &Value, key_type: KeyType) -> Option<Self> {
        match (key_type, value) {
            (KeyType::Int, Value::Int(i)) => Some(Self::Int(*i)),
            (KeyType::Text, Value::Text(s)) => Some(Self::Text(Arc::clone(s))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_matching_value() {
        assert_eq!(Key::from_value(&Value::Int(7), KeyType::Int), Some(Key::Int(7)));
        assert_eq!(
            Key::from_value(&Value::Text("a".into()), KeyType::Text),
            Some(Key::Text("a".into()))
        );
    }

    #[test]
    fn test_key_from_mismatched_value() {
        assert_eq!(Key::from_value(&Value::Text("7".into()), KeyType::Int), None);
        assert_eq!(Key::from_value(&Value::Int(7), KeyType::Text), None);
        assert_eq!(Key::from_value(&Value::Float(7.0), KeyType::Int), None);
    }
}
