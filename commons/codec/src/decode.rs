// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{DecodeError, Key, Value};
use std::collections::BTreeMap;

/// Containers nested deeper than this are rejected rather than decoded
/// recursively; the wire surfaces of this codec never come close.
const MAX_DEPTH: usize = 128;

/// Decode a single value; trailing bytes are an error.
pub fn decode(input: &[u8]) -> Result<Value, DecodeError> {
    let mut reader = Reader { input, pos: 0 };
    let value = reader.read_value(0)?;
    if reader.pos != input.len() {
        return Err(DecodeError::TrailingBytes(input.len() - reader.pos));
    }
    Ok(value)
}

struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn peek(&self) -> Result<u8, DecodeError> {
        self.input
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEof(self.pos))
    }

    fn bump(&mut self) -> Result<u8, DecodeError> {
        let byte = self.peek()?;
        self.pos += 1;
        Ok(byte)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .ok_or(DecodeError::InvalidLength(self.pos))?;
        if end > self.input.len() {
            return Err(DecodeError::UnexpectedEof(self.input.len()));
        }
        let slice = &self.input[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_value(&mut self, depth: usize) -> Result<Value, DecodeError> {
        match self.peek()? {
            b'n' => {
                self.pos += 1;
                Ok(Value::Null)
            }
            b't' => {
                self.pos += 1;
                Ok(Value::Bool(true))
            }
            b'f' => {
                self.pos += 1;
                Ok(Value::Bool(false))
            }
            b'i' => {
                self.pos += 1;
                self.read_integer().map(Value::Integer)
            }
            b'u' => {
                self.pos += 1;
                self.read_text().map(Value::Text)
            }
            b'0'..=b'9' => self.read_byte_string().map(Value::Binary),
            b'l' => {
                if depth >= MAX_DEPTH {
                    return Err(DecodeError::NestingTooDeep(self.pos));
                }
                self.pos += 1;
                let mut items = Vec::new();
                while self.peek()? != b'e' {
                    items.push(self.read_value(depth + 1)?);
                }
                self.pos += 1;
                Ok(Value::List(items))
            }
            b'd' => {
                if depth >= MAX_DEPTH {
                    return Err(DecodeError::NestingTooDeep(self.pos));
                }
                self.pos += 1;
                let mut entries = BTreeMap::new();
                while self.peek()? != b'e' {
                    let key = self.read_key()?;
                    let value = self.read_value(depth + 1)?;
                    entries.insert(key, value);
                }
                self.pos += 1;
                Ok(Value::Dict(entries))
            }
            byte => Err(DecodeError::UnexpectedByte {
                byte,
                offset: self.pos,
            }),
        }
    }

    fn read_key(&mut self) -> Result<Key, DecodeError> {
        match self.peek()? {
            b'u' => {
                self.pos += 1;
                self.read_text().map(Key::Text)
            }
            b'0'..=b'9' => self.read_byte_string().map(Key::Binary),
            byte => Err(DecodeError::UnexpectedByte {
                byte,
                offset: self.pos,
            }),
        }
    }

    // `i<decimal>e`; leading zeros and negative zero are non-canonical.
    fn read_integer(&mut self) -> Result<i128, DecodeError> {
        let start = self.pos;
        let negative = self.peek()? == b'-';
        if negative {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while self.peek()?.is_ascii_digit() {
            self.pos += 1;
        }
        let digits = &self.input[digits_start..self.pos];
        if self.bump()? != b'e' {
            return Err(DecodeError::InvalidInteger(start.saturating_sub(1)));
        }
        if digits.is_empty()
            || (digits.len() > 1 && digits[0] == b'0')
            || (negative && digits == b"0")
        {
            return Err(DecodeError::InvalidInteger(start.saturating_sub(1)));
        }
        let literal = std::str::from_utf8(&self.input[start..self.pos - 1])
            .map_err(|_| DecodeError::InvalidInteger(start))?;
        literal
            .parse::<i128>()
            .map_err(|_| DecodeError::InvalidInteger(start.saturating_sub(1)))
    }

    fn read_byte_string(&mut self) -> Result<Vec<u8>, DecodeError> {
        let start = self.pos;
        while self.peek()?.is_ascii_digit() {
            self.pos += 1;
        }
        let digits = &self.input[start..self.pos];
        if self.bump()? != b':' {
            return Err(DecodeError::InvalidLength(start));
        }
        if digits.is_empty() || (digits.len() > 1 && digits[0] == b'0') {
            return Err(DecodeError::InvalidLength(start));
        }
        let len = std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or(DecodeError::InvalidLength(start))?;
        Ok(self.take(len)?.to_vec())
    }

    fn read_text(&mut self) -> Result<String, DecodeError> {
        let start = self.pos;
        let bytes = self.read_byte_string()?;
        String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8(start))
    }
}
