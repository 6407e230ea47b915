// Author: Dustin Pilgrim
// License: MIT

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::SdclError;
use crate::literal::CountryCode;
use crate::value::Value;

fn type_error(expected: &str, value: &Value, hint: &str, code: u32) -> SdclError {
    SdclError::TypeError {
        message: format!("Expected {}, got {} {}", expected, value.type_name(), value),
        line: 0,
        column: 0,
        hint: Some(hint.into()),
        code: Some(code),
    }
}

fn out_of_range(n: impl std::fmt::Display, target: &str, hint: &str) -> SdclError {
    SdclError::TypeError {
        message: format!("Number {} out of range for {}", n, target),
        line: 0,
        column: 0,
        hint: Some(hint.into()),
        code: Some(409),
    }
}

fn unshare(value: Arc<Value>) -> Value {
    Arc::unwrap_or_clone(value)
}

impl TryFrom<Value> for String {
    type Error = SdclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(type_error("string", &value, "Use a quoted string in your config", 401)),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = SdclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Integer(n) => Ok(n),
            _ => Err(type_error("integer", &value, "Use an integer value in your config", 402)),
        }
    }
}

/// Integer conversions with a range check.
macro_rules! integer_conversion {
    ($($target:ty => $hint:expr),* $(,)?) => {
        $(
            impl TryFrom<Value> for $target {
                type Error = SdclError;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    let n = i64::try_from(value)?;
                    <$target>::try_from(n).map_err(|_| out_of_range(n, stringify!($target), $hint))
                }
            }
        )*
    };
}

integer_conversion! {
    i32 => "Use a number between -2147483648 and 2147483647",
    u16 => "Use a number between 0 and 65535",
    u32 => "Use a number between 0 and 4294967295",
    u64 => "Use a non-negative integer",
    usize => "Use a non-negative integer",
}

impl TryFrom<Value> for f64 {
    type Error = SdclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(n) => Ok(n),
            Value::Integer(n) => Ok(n as f64),
            _ => Err(type_error("number", &value, "Use a number value in your config", 403)),
        }
    }
}

impl TryFrom<Value> for f32 {
    type Error = SdclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        f64::try_from(value).map(|n| n as f32)
    }
}

impl TryFrom<Value> for bool {
    type Error = SdclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Boolean(b) => Ok(b),
            Value::String(ref s) if matches!(s.to_lowercase().as_str(), "true" | "false") => Err(SdclError::TypeError {
                message: format!("Expected boolean, got string \"{}\"", s),
                line: 0,
                column: 0,
                hint: Some(format!("Drop the quotes: {}", s.to_lowercase())),
                code: Some(404),
            }),
            _ => Err(type_error("boolean", &value, "Use true or false", 404)),
        }
    }
}

impl TryFrom<Value> for NaiveDate {
    type Error = SdclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Date(d) => Ok(d),
            _ => Err(type_error("date", &value, "Write the value as date \"YYYY-MM-DD\"", 407)),
        }
    }
}

impl TryFrom<Value> for NaiveTime {
    type Error = SdclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Time(t) => Ok(t),
            _ => Err(type_error("time", &value, "Write the value as time \"HH:MM:SS\"", 407)),
        }
    }
}

impl TryFrom<Value> for NaiveDateTime {
    type Error = SdclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            Value::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            _ => Err(type_error(
                "datetime",
                &value,
                "Write the value as datetime \"YYYY-MM-DDTHH:MM:SS\"",
                407,
            )),
        }
    }
}

impl TryFrom<Value> for CountryCode {
    type Error = SdclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Country(c) => Ok(c),
            _ => Err(type_error("country", &value, "Write the value as country \"XX\"", 408)),
        }
    }
}

impl<T> TryFrom<Value> for Vec<T>
where
    T: TryFrom<Value, Error = SdclError>,
{
    type Error = SdclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => items.into_iter().map(|item| T::try_from(unshare(item))).collect(),
            _ => Err(type_error("array", &value, "Use an array [...] in your config", 405)),
        }
    }
}

impl<T> TryFrom<Value> for Option<T>
where
    T: TryFrom<Value, Error = SdclError>,
{
    type Error = SdclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(None),
            v => Ok(Some(T::try_from(v)?)),
        }
    }
}

impl<T> TryFrom<Value> for HashMap<String, T>
where
    T: TryFrom<Value, Error = SdclError>,
{
    type Error = SdclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(items) => items
                .into_iter()
                .map(|(key, item)| T::try_from(unshare(item)).map(|v| (key, v)))
                .collect(),
            _ => Err(type_error("object", &value, "Use an object { ... } in your config", 406)),
        }
    }
}
