// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Deterministic binary container codec used on every evaluator wire surface.
//!
//! The container is a small value algebra (null, bool, integer, byte string,
//! text, list, dictionary) with a canonical encoding: integers are framed as
//! `i<decimal>e`, byte strings as `<len>:<bytes>`, text as `u<len>:<utf8>`,
//! lists as `l...e` and dictionaries as `d...e` with keys emitted in a fixed
//! order (byte-string keys first, then text keys, each lexicographic), so the
//! same value always encodes to the same bytes.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

mod decode;
mod encode;

pub use decode::decode;
pub use encode::encode;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEof(usize),
    #[error("unexpected byte 0x{byte:02x} at offset {offset}")]
    UnexpectedByte { byte: u8, offset: usize },
    #[error("malformed integer literal at offset {0}")]
    InvalidInteger(usize),
    #[error("malformed length prefix at offset {0}")]
    InvalidLength(usize),
    #[error("text payload at offset {0} is not valid utf-8")]
    InvalidUtf8(usize),
    #[error("{0} trailing byte(s) after a complete value")]
    TrailingBytes(usize),
    #[error("container nesting at offset {0} exceeds the decoder depth limit")]
    NestingTooDeep(usize),
    #[error("required key {0:?} is missing")]
    MissingKey(String),
    #[error("expected {expected} but found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },
}

/// Dictionary key. Byte-string keys order before text keys, both
/// lexicographically within their kind, which fixes the canonical
/// dictionary encoding order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Binary(Vec<u8>),
    Text(String),
}

impl Key {
    pub fn text(s: impl Into<String>) -> Self {
        Key::Text(s.into())
    }

    pub fn binary(b: impl Into<Vec<u8>>) -> Self {
        Key::Binary(b.into())
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i128),
    Binary(Vec<u8>),
    Text(String),
    List(Vec<Value>),
    Dict(BTreeMap<Key, Value>),
}

impl Value {
    pub fn dict(entries: impl IntoIterator<Item = (Key, Value)>) -> Self {
        Value::Dict(entries.into_iter().collect())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn binary(b: impl Into<Vec<u8>>) -> Self {
        Value::Binary(b.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Binary(_) => "binary",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn shape_error(&self, expected: &'static str) -> DecodeError {
        DecodeError::UnexpectedShape {
            expected,
            found: self.kind(),
        }
    }

    pub fn as_integer(&self) -> Result<i128, DecodeError> {
        match self {
            Value::Integer(i) => Ok(*i),
            other => Err(other.shape_error("integer")),
        }
    }

    pub fn as_bool(&self) -> Result<bool, DecodeError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.shape_error("bool")),
        }
    }

    pub fn as_binary(&self) -> Result<&[u8], DecodeError> {
        match self {
            Value::Binary(b) => Ok(b),
            other => Err(other.shape_error("binary")),
        }
    }

    pub fn as_text(&self) -> Result<&str, DecodeError> {
        match self {
            Value::Text(t) => Ok(t),
            other => Err(other.shape_error("text")),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], DecodeError> {
        match self {
            Value::List(l) => Ok(l),
            other => Err(other.shape_error("list")),
        }
    }

    pub fn as_dict(&self) -> Result<&BTreeMap<Key, Value>, DecodeError> {
        match self {
            Value::Dict(d) => Ok(d),
            other => Err(other.shape_error("dict")),
        }
    }

    /// Look up a required dictionary field by key.
    pub fn field(&self, key: &Key) -> Result<&Value, DecodeError> {
        self.as_dict()?
            .get(key)
            .ok_or_else(|| DecodeError::MissingKey(format!("{:?}", key)))
    }

    /// Look up an optional dictionary field by key. Shape errors on
    /// non-dictionaries still surface.
    pub fn field_opt(&self, key: &Key) -> Result<Option<&Value>, DecodeError> {
        Ok(self.as_dict()?.get(key))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Binary(b) => {
                write!(f, "b\"")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, "\"")
            }
            Value::Text(t) => write!(f, "{:?}", t),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, item) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Dict(d) => {
                write!(f, "{{")?;
                for (i, (k, v)) in d.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: Value) -> Value {
        decode(&encode(&value)).unwrap()
    }

    #[test]
    fn test_scalar_roundtrip() {
        for value in [
            Value::Null,
            Value::Bool(true),
            Value::Bool(false),
            Value::Integer(0),
            Value::Integer(-1),
            Value::Integer(i128::from(i64::MAX)),
            Value::binary(vec![]),
            Value::binary(vec![0xde, 0xad, 0xbe, 0xef]),
            Value::text(""),
            Value::text("hello, 九"),
        ] {
            assert_eq!(value.clone(), roundtrip(value));
        }
    }

    #[test]
    fn test_container_roundtrip() {
        let value = Value::dict([
            (Key::text("list"), Value::list([Value::Integer(1), Value::Null])),
            (
                Key::binary(vec![0x01]),
                Value::dict([(Key::text("inner"), Value::text("x"))]),
            ),
        ]);
        assert_eq!(value.clone(), roundtrip(value));
    }

    #[test]
    fn test_scalar_framing() {
        assert_eq!(encode(&Value::Null), b"n");
        assert_eq!(encode(&Value::Bool(true)), b"t");
        assert_eq!(encode(&Value::Bool(false)), b"f");
        assert_eq!(encode(&Value::Integer(-42)), b"i-42e");
        assert_eq!(encode(&Value::binary(*b"ab")), b"2:ab");
        assert_eq!(encode(&Value::text("ab")), b"u2:ab");
        assert_eq!(
            encode(&Value::list([Value::Integer(1), Value::text("a")])),
            b"li1eu1:ae"
        );
    }

    #[test]
    fn test_dict_key_order_is_canonical() {
        // Binary keys first, then text keys, insertion order irrelevant.
        let a = Value::dict([
            (Key::text("z"), Value::Integer(1)),
            (Key::binary(vec![0xff]), Value::Integer(2)),
            (Key::text("a"), Value::Integer(3)),
            (Key::binary(vec![0x00]), Value::Integer(4)),
        ]);
        let b = Value::dict([
            (Key::binary(vec![0x00]), Value::Integer(4)),
            (Key::text("a"), Value::Integer(3)),
            (Key::binary(vec![0xff]), Value::Integer(2)),
            (Key::text("z"), Value::Integer(1)),
        ]);
        let encoded = encode(&a);
        assert_eq!(encoded, encode(&b));
        let expected: &[u8] = b"d1:\x00i4e1:\xffi2eu1:ai3eu1:zi1ee";
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode(b"x"),
            Err(DecodeError::UnexpectedByte { byte: b'x', offset: 0 })
        ));
        assert!(matches!(decode(b""), Err(DecodeError::UnexpectedEof(0))));
        assert!(matches!(decode(b"i12"), Err(DecodeError::UnexpectedEof(_))));
        assert!(matches!(decode(b"ie"), Err(DecodeError::InvalidInteger(_))));
        assert!(matches!(decode(b"i01e"), Err(DecodeError::InvalidInteger(_))));
        assert!(matches!(decode(b"i-0e"), Err(DecodeError::InvalidInteger(_))));
        assert!(matches!(decode(b"5:ab"), Err(DecodeError::UnexpectedEof(_))));
        assert!(matches!(decode(b"u1:\xff"), Err(DecodeError::InvalidUtf8(_))));
        assert!(matches!(decode(b"ne"), Err(DecodeError::TrailingBytes(1))));
        assert!(matches!(decode(b"l"), Err(DecodeError::UnexpectedEof(_))));
        assert!(matches!(decode(b"d1:a"), Err(DecodeError::UnexpectedEof(_))));
    }

    #[test]
    fn test_decode_bounds_container_nesting() {
        let nested = |depth: usize| {
            let mut bytes = vec![b'l'; depth];
            bytes.extend(std::iter::repeat(b'e').take(depth));
            bytes
        };
        assert!(decode(&nested(64)).is_ok());
        assert!(matches!(
            decode(&nested(4096)),
            Err(DecodeError::NestingTooDeep(_))
        ));
        // Dicts hit the same bound.
        let dicts = b"du1:k".repeat(4096);
        assert!(matches!(
            decode(&dicts),
            Err(DecodeError::NestingTooDeep(_))
        ));
    }

    #[test]
    fn test_shape_accessors() {
        let dict = Value::dict([(Key::text("n"), Value::Integer(7))]);
        assert_eq!(dict.field(&Key::text("n")).unwrap().as_integer(), Ok(7));
        assert_eq!(
            dict.field(&Key::text("missing")),
            Err(DecodeError::MissingKey("Text(\"missing\")".to_string()))
        );
        assert_eq!(
            Value::Integer(1).as_text(),
            Err(DecodeError::UnexpectedShape {
                expected: "text",
                found: "integer"
            })
        );
        assert!(dict.field_opt(&Key::text("missing")).unwrap().is_none());
    }
}
