// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{Key, Value};

/// Encode a value to its canonical byte representation.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.push(b'n'),
        Value::Bool(true) => out.push(b't'),
        Value::Bool(false) => out.push(b'f'),
        Value::Integer(i) => {
            out.push(b'i');
            out.extend_from_slice(i.to_string().as_bytes());
            out.push(b'e');
        }
        Value::Binary(b) => write_bytes(b, out),
        Value::Text(t) => {
            out.push(b'u');
            write_bytes(t.as_bytes(), out);
        }
        Value::List(items) => {
            out.push(b'l');
            for item in items {
                write_value(item, out);
            }
            out.push(b'e');
        }
        Value::Dict(entries) => {
            out.push(b'd');
            // BTreeMap iteration already follows the canonical key order.
            for (key, item) in entries {
                match key {
                    Key::Binary(b) => write_bytes(b, out),
                    Key::Text(t) => {
                        out.push(b'u');
                        write_bytes(t.as_bytes(), out);
                    }
                }
                write_value(item, out);
            }
            out.push(b'e');
        }
    }
}

fn write_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(bytes);
}
