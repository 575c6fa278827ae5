// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::evaluation::ActionEvaluation;
use crate::marshal::{context, delta};
use anyhow::Result;
use arcadia_codec::{decode, encode, DecodeError, Key, Value};

const ACTION: &str = "action";
const INPUT_CONTEXT: &str = "input_context";
const OUTPUT_STATES: &str = "output_states";
const EXCEPTION: &str = "exception";
const LOGS: &str = "logs";

pub fn marshal(evaluation: &ActionEvaluation) -> Result<Value> {
    let mut entries = vec![
        (Key::text(ACTION), evaluation.action.clone()),
        (
            Key::text(INPUT_CONTEXT),
            context::marshal(&evaluation.input_context)?,
        ),
        (
            Key::text(OUTPUT_STATES),
            delta::marshal(&evaluation.output_states)?,
        ),
        (
            Key::text(LOGS),
            Value::list(evaluation.logs.iter().map(Value::text)),
        ),
    ];
    if let Some(exception) = &evaluation.exception {
        entries.push((Key::text(EXCEPTION), Value::text(exception.clone())));
    }
    Ok(Value::dict(entries))
}

pub fn unmarshal(value: &Value) -> Result<ActionEvaluation, DecodeError> {
    Ok(ActionEvaluation {
        action: value.field(&Key::text(ACTION))?.clone(),
        input_context: context::unmarshal(value.field(&Key::text(INPUT_CONTEXT))?)?,
        output_states: delta::unmarshal(value.field(&Key::text(OUTPUT_STATES))?)?,
        exception: value
            .field_opt(&Key::text(EXCEPTION))?
            .map(|v| v.as_text().map(str::to_string))
            .transpose()?,
        logs: value
            .field(&Key::text(LOGS))?
            .as_list()?
            .iter()
            .map(|v| v.as_text().map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?,
    })
}

pub fn serialize(evaluation: &ActionEvaluation) -> Result<Vec<u8>> {
    Ok(encode(&marshal(evaluation)?))
}

pub fn deserialize(bytes: &[u8]) -> Result<ActionEvaluation, DecodeError> {
    unmarshal(&decode(bytes)?)
}
