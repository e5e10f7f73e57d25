// Type-tolerant field deserializers.
//
// The daemon omits fields freely and occasionally changes a field's JSON
// type between versions. A field of the wrong type reads as its default
// instead of failing the whole response. Pair each helper with
// `#[serde(default)]` so absent fields behave the same way.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

pub(crate) fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

pub(crate) fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

pub(crate) fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(d)?, Value::Bool(true)))
}

pub(crate) fn float<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        _ => 0.0,
    })
}

/// Non-negative integer; floats are truncated, negatives read as zero.
pub(crate) fn unsigned<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => number_to_u64(&n),
        _ => 0,
    })
}

/// Like [`unsigned`], but `None` when the field is not a number, so two
/// spellings of one field can be merged.
pub(crate) fn opt_unsigned<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => Some(number_to_u64(&n)),
        _ => None,
    })
}

pub(crate) fn unsigned32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    unsigned(d).map(saturate_u32)
}

pub(crate) fn signed<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_i64().unwrap_or_default(),
        _ => 0,
    })
}

/// Integer carried as a decimal string (`"128000"`), as ffprobe reports it.
/// A plain JSON number is accepted too.
pub(crate) fn numeric_string<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => parse_leading_u64(&s),
        Value::Number(n) => number_to_u64(&n),
        _ => 0,
    })
}

pub(crate) fn numeric_string32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    numeric_string(d).map(saturate_u32)
}

/// Seconds as a decimal string (`"12.5"`) converted to microseconds.
pub(crate) fn seconds_as_micros<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let seconds = match Value::deserialize(d)? {
        Value::String(s) => s.trim().parse::<f64>().unwrap_or_default(),
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        _ => 0.0,
    };
    Ok(secs_to_micros(seconds))
}

/// Array of `T`; non-arrays read as empty and elements that do not
/// deserialize are skipped.
pub(crate) fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Like [`list`], but `None` when the field is not an array.
pub(crate) fn opt_list<'de, D, T>(d: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// Nested object; anything that is not an object (or does not
/// deserialize) reads as `T::default()`.
pub(crate) fn object<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    Ok(nested(Some(Value::deserialize(d)?)))
}

/// [`object`] for a value that was captured as raw JSON.
pub(crate) fn nested<T: Default + DeserializeOwned>(value: Option<Value>) -> T {
    value
        .filter(Value::is_object)
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

/// Array of strings; non-string elements are skipped.
pub(crate) fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

// ── Plain helpers ────────────────────────────────────────────────────

/// Parse an ffmpeg rational such as `"30000/1001"`.
///
/// Returns `(0, 0)` for anything that is not two integers around a slash.
pub(crate) fn frame_rate(raw: &str) -> (u32, u32) {
    raw.split_once('/')
        .and_then(|(num, den)| Some((num.trim().parse().ok()?, den.trim().parse().ok()?)))
        .unwrap_or((0, 0))
}

fn number_to_u64(n: &Number) -> u64 {
    if let Some(v) = n.as_u64() {
        return v;
    }
    n.as_f64()
        .filter(|f| f.is_finite() && *f > 0.0)
        .map_or(0, float_to_u64)
}

fn parse_leading_u64(raw: &str) -> u64 {
    let digits: &str = raw
        .trim()
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or_default();
    digits.parse().unwrap_or_default()
}

fn saturate_u32(v: u64) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn float_to_u64(f: f64) -> u64 {
    f as u64
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn secs_to_micros(seconds: f64) -> i64 {
    if seconds.is_finite() {
        (seconds * 1_000_000.0) as i64
    } else {
        0
    }
}
