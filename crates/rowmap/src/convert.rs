//! Scalar conversion between column values and field values, shared by
//! hydration and snapshotting.

use crate::FieldValue;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rowmap_core::{
    schema::{EnumTy, Field, FieldTy},
    stmt::{Number, Value},
    Error, Result,
};

use std::collections::HashMap;

/// Parsed timestamps memoized by their raw string within one hydration
/// batch.
#[derive(Debug, Default)]
pub struct DateCache {
    parsed: HashMap<String, NaiveDateTime>,
}

impl DateCache {
    pub fn new() -> DateCache {
        DateCache::default()
    }

    pub fn len(&self) -> usize {
        self.parsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsed.is_empty()
    }

    fn parse(&mut self, raw: &str) -> Result<NaiveDateTime> {
        if let Some(parsed) = self.parsed.get(raw) {
            return Ok(*parsed);
        }

        let parsed = parse_timestamp(raw)?;
        self.parsed.insert(raw.to_string(), parsed);
        Ok(parsed)
    }
}

/// Column value -> field value.
pub fn hydrate(field: &Field, value: Value, cache: &mut DateCache) -> Result<FieldValue> {
    if value.is_null() {
        return Ok(FieldValue::Null);
    }

    Ok(match &field.ty {
        FieldTy::Raw => FieldValue::from_value(value),
        FieldTy::Int => match value.to_number() {
            Some(number) => FieldValue::I64(number.to_i64()),
            None => FieldValue::Null,
        },
        FieldTy::Float => match value.to_number() {
            Some(number) => FieldValue::F64(number.to_f64()),
            None => FieldValue::Null,
        },
        FieldTy::Bool => FieldValue::Bool(is_truthy(&value)),
        FieldTy::Date | FieldTy::DateTime => {
            let Value::String(raw) = &value else {
                return Err(Error::mapping(format!(
                    "`{}` expects a date string, found {}",
                    field.name,
                    value.kind_name()
                )));
            };

            let parsed = cache.parse(raw).map_err(|err| err.context(format!("`{}`", field.name)))?;

            if field.ty == FieldTy::Date {
                FieldValue::Date(parsed.date())
            } else {
                FieldValue::DateTime(parsed)
            }
        }
        FieldTy::Enum(ty) => FieldValue::Enum(enum_variant(field, ty, &value)?),
    })
}

/// Field value -> column value.
///
/// Bool columns are always written as `1` or `0`; null included.
pub fn dump(field: &Field, value: FieldValue) -> Result<Value> {
    if value.is_null() && field.ty != FieldTy::Bool {
        return Ok(Value::Null);
    }

    Ok(match &field.ty {
        FieldTy::Raw => match value {
            FieldValue::Date(date) => Value::String(format_date(&FieldTy::Date, date.and_time(NaiveTime::MIN))),
            FieldValue::DateTime(at) => Value::String(format_date(&FieldTy::DateTime, at)),
            other => Value::try_from(other)?,
        },
        FieldTy::Int => match number(value) {
            Some(number) => Value::I64(number.to_i64()),
            None => Value::Null,
        },
        FieldTy::Float => match number(value) {
            Some(number) => Value::F64(number.to_f64()),
            None => Value::Null,
        },
        FieldTy::Bool => {
            let truthy = match value {
                FieldValue::Bool(b) => b,
                other => Value::try_from(other).map(|v| is_truthy(&v)).unwrap_or(false),
            };
            Value::I64(truthy as i64)
        }
        ty @ (FieldTy::Date | FieldTy::DateTime) => match value {
            FieldValue::Date(date) => Value::String(format_date(ty, date.and_time(NaiveTime::MIN))),
            FieldValue::DateTime(at) => Value::String(format_date(ty, at)),
            _ => Value::Null,
        },
        FieldTy::Enum(ty) => {
            let value = Value::try_from(value)?;
            enum_variant(field, ty, &value)?
        }
    })
}

/// Accepted timestamp layouts, most specific first.
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| Error::from(err).context(format!("cannot parse `{raw}` as a date")))?;
    Ok(date.and_time(NaiveTime::MIN))
}

fn format_date(ty: &FieldTy, at: NaiveDateTime) -> String {
    match ty.date_format() {
        Some(format) => at.format(format).to_string(),
        None => at.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::I64(v) => *v != 0,
        Value::F64(v) => *v != 0.0,
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "t" | "yes" | "on"
        ),
        Value::Bytes(_) | Value::Null => false,
    }
}

fn number(value: FieldValue) -> Option<Number> {
    match value {
        FieldValue::Bool(b) => Some(Number::Int(b as i64)),
        other => Value::try_from(other).ok()?.to_number(),
    }
}

/// The declared variant equal to `value`. Numeric strings match numeric
/// variants, since drivers may report either.
fn enum_variant(field: &Field, ty: &EnumTy, value: &Value) -> Result<Value> {
    if ty.contains(value) {
        return Ok(value.clone());
    }

    let loose = ty.variants.iter().find(|variant| {
        match (variant.to_number(), value.to_number()) {
            (Some(a), Some(b)) => a.to_f64() == b.to_f64(),
            _ => false,
        }
    });

    match loose {
        Some(variant) => Ok(variant.clone()),
        None => Err(Error::mapping(format!(
            "{value} is not a declared variant of `{}` for `{}`",
            ty.name, field.name
        ))),
    }
}
