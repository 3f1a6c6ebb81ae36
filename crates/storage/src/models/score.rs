use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

/// Positional score vector aligned with a WOD's metric list.
pub type Scores = Vec<Option<ScoreValue>>;

/// How the raw values of a metric slot are read and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Elapsed time, stored in seconds. Labels like `12:34` are accepted on input.
    Time,
    #[default]
    Number,
    Text,
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time" => Ok(Self::Time),
            "number" | "reps" | "weight" => Ok(Self::Number),
            "text" => Ok(Self::Text),
            other => Err(format!("unknown metric type '{}'", other)),
        }
    }
}

/// Which end of a metric slot wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Lower is better (e.g. time).
    Asc,
    /// Higher is better (e.g. reps, weight).
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

/// One scored dimension of a WOD.
///
/// `order` is `None` when the stored configuration has no usable direction;
/// such a slot never separates two scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MetricConfig {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: MetricKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}

impl MetricConfig {
    pub fn new(label: impl Into<String>, kind: MetricKind, order: SortOrder) -> Self {
        Self {
            label: label.into(),
            kind,
            order: Some(order),
        }
    }

    pub fn lower_is_better(label: impl Into<String>, kind: MetricKind) -> Self {
        Self::new(label, kind, SortOrder::Asc)
    }

    pub fn higher_is_better(label: impl Into<String>, kind: MetricKind) -> Self {
        Self::new(label, kind, SortOrder::Desc)
    }
}

#[derive(Deserialize)]
struct RawMetricConfig {
    #[serde(default)]
    label: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    order: Option<String>,
}

// Stored configs are edited by hand in forms, so unknown kinds and orders
// degrade instead of failing the whole WOD.
impl<'de> Deserialize<'de> for MetricConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawMetricConfig::deserialize(deserializer)?;

        Ok(Self {
            label: raw.label,
            kind: raw
                .kind
                .and_then(|kind| kind.parse().ok())
                .unwrap_or_default(),
            order: raw.order.and_then(|order| order.parse().ok()),
        })
    }
}

/// A single raw metric value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreValue {
    Number(Decimal),
    Text(String),
}

impl ScoreValue {
    /// Numeric reading of the value, used by time and number slots.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(label) => parse_numeric_label(label),
        }
    }

    /// Text reading of the value, used by text slots.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Number(value) => Cow::Owned(value.normalize().to_string()),
            Self::Text(label) => Cow::Borrowed(label.as_str()),
        }
    }

    /// Coerces the value into the canonical representation for `kind`.
    ///
    /// Blank text becomes an absent slot.
    pub fn normalize(self, kind: MetricKind) -> Result<Option<Self>, String> {
        if let Self::Text(label) = &self
            && label.trim().is_empty()
        {
            return Ok(None);
        }

        match kind {
            MetricKind::Time | MetricKind::Number => self
                .as_number()
                .map(|value| Some(Self::Number(value)))
                .ok_or_else(|| format!("'{}' is not a valid {:?} value", self, kind)),
            MetricKind::Text => Ok(Some(Self::Text(self.as_text().trim().to_string()))),
        }
    }
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<i64> for ScoreValue {
    fn from(value: i64) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl From<Decimal> for ScoreValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ScoreValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl Serialize for ScoreValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Number(value) if value.fract().is_zero() => match value.to_i64() {
                Some(int) => serializer.serialize_i64(int),
                None => serializer.serialize_str(&value.to_string()),
            },
            // Fractions go out as decimal text; an f64 would round them
            Self::Number(value) => serializer.serialize_str(&value.normalize().to_string()),
            Self::Text(label) => serializer.serialize_str(label),
        }
    }
}

struct ScoreValueVisitor;

impl<'de> Visitor<'de> for ScoreValueVisitor {
    type Value = ScoreValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number or a string")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(ScoreValue::Number(Decimal::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(ScoreValue::Number(Decimal::from(value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Decimal::from_f64(value)
            .map(ScoreValue::Number)
            .ok_or_else(|| E::custom(format!("score {} is out of range", value)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(fractional_text(value).unwrap_or_else(|| ScoreValue::Text(value.to_string())))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(fractional_text(&value).unwrap_or(ScoreValue::Text(value)))
    }
}

/// Reads back the text form `Serialize` writes for fractional numbers.
///
/// Only the exact canonical spelling qualifies, so labels such as `007` or
/// `4.50` stay text.
fn fractional_text(value: &str) -> Option<ScoreValue> {
    if !value.contains('.') {
        return None;
    }

    let number = Decimal::from_str(value).ok()?;
    (number.normalize().to_string() == value).then_some(ScoreValue::Number(number))
}

impl<'de> Deserialize<'de> for ScoreValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ScoreValueVisitor)
    }
}

/// Parses `ss`, `mm:ss` or `hh:mm:ss` (fractional seconds allowed) into seconds.
pub fn parse_time_label(label: &str) -> Option<Decimal> {
    let parts: Vec<&str> = label.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let sixty = Decimal::from(60);
    let last = parts.len() - 1;
    let mut total = Decimal::ZERO;

    for (index, part) in parts.iter().enumerate() {
        let part = part.trim();
        if part.is_empty() {
            return None;
        }

        let value = if index == last {
            Decimal::from_str(part).ok()?
        } else {
            Decimal::from(part.parse::<u32>().ok()?)
        };

        if value.is_sign_negative() || (index > 0 && value >= sixty) {
            return None;
        }

        total = total * sixty + value;
    }

    Some(total)
}

/// Reads a free-text label as a number, accepting time labels.
pub fn parse_numeric_label(label: &str) -> Option<Decimal> {
    let label = label.trim();
    if label.contains(':') {
        parse_time_label(label)
    } else {
        Decimal::from_str(label).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_parse_time_label() {
        assert_eq!(parse_time_label("4:05"), Some(Decimal::from(245)));
        assert_eq!(parse_time_label("1:00:01"), Some(Decimal::from(3601)));
        assert_eq!(parse_time_label("59"), Some(Decimal::from(59)));
        assert_eq!(
            parse_time_label("0:12.5"),
            Some(Decimal::from_str("12.5").unwrap())
        );
    }

    #[test]
    fn test_parse_time_label_rejects_garbage() {
        assert_eq!(parse_time_label("4:75"), None);
        assert_eq!(parse_time_label("a:10"), None);
        assert_eq!(parse_time_label("1::2"), None);
        assert_eq!(parse_time_label("1:2:3:4"), None);
    }

    #[test]
    fn test_metric_config_reads_form_values() {
        let metric: MetricConfig =
            serde_json::from_str(r#"{"label":"Reps","type":"number","order":"desc"}"#).unwrap();
        assert_eq!(
            metric,
            MetricConfig::higher_is_better("Reps", MetricKind::Number)
        );
    }

    #[test]
    fn test_metric_config_tolerates_bad_order() {
        let metric: MetricConfig =
            serde_json::from_str(r#"{"label":"Time","type":"time","order":"sideways"}"#).unwrap();
        assert_eq!(metric.kind, MetricKind::Time);
        assert_eq!(metric.order, None);

        let metric: MetricConfig = serde_json::from_str(r#"{"label":"Tiebreak"}"#).unwrap();
        assert_eq!(metric.kind, MetricKind::Number);
        assert_eq!(metric.order, None);
    }

    #[test]
    fn test_score_value_json_shape() {
        let scores: Scores = serde_json::from_str(r#"[100, "4:05", null, 102.5]"#).unwrap();
        assert_eq!(
            scores,
            vec![
                Some(ScoreValue::from(100)),
                Some(ScoreValue::from("4:05")),
                None,
                Some(ScoreValue::Number(Decimal::from_str("102.5").unwrap())),
            ]
        );

        let json = serde_json::to_string(&scores).unwrap();
        assert_eq!(json, r#"[100,"4:05",null,"102.5"]"#);

        let stored: Scores = serde_json::from_str(&json).unwrap();
        assert_eq!(stored, scores);
    }

    #[test]
    fn test_fractional_scores_survive_storage_exactly() {
        let close = Decimal::from_str("1234567890123.123456789").unwrap();
        let closer = Decimal::from_str("1234567890123.123456788").unwrap();
        let tiny = Decimal::from_str("100.000000000000000001").unwrap();

        let scores: Scores = vec![
            Some(ScoreValue::Number(close)),
            Some(ScoreValue::Number(closer)),
            Some(ScoreValue::Number(tiny)),
        ];

        let json = serde_json::to_string(&scores).unwrap();
        let stored: Scores = serde_json::from_str(&json).unwrap();

        assert_eq!(stored, scores);
        assert_ne!(stored[0], stored[1]);
        assert_eq!(
            stored[2].as_ref().and_then(ScoreValue::as_number),
            Some(tiny)
        );
    }

    #[test]
    fn test_non_canonical_numeric_labels_stay_text() {
        let scores: Scores = serde_json::from_str(r#"["007", "4.50", "12:31.5"]"#).unwrap();

        assert_eq!(
            scores,
            vec![
                Some(ScoreValue::from("007")),
                Some(ScoreValue::from("4.50")),
                Some(ScoreValue::from("12:31.5")),
            ]
        );
    }

    #[test]
    fn test_normalize_converts_time_labels() {
        let value = ScoreValue::from("12:34").normalize(MetricKind::Time).unwrap();
        assert_eq!(value, Some(ScoreValue::from(754)));

        let blank = ScoreValue::from("  ").normalize(MetricKind::Time).unwrap();
        assert_eq!(blank, None);

        assert!(ScoreValue::from("DNF").normalize(MetricKind::Number).is_err());
        assert_eq!(
            ScoreValue::from(7).normalize(MetricKind::Text).unwrap(),
            Some(ScoreValue::from("7"))
        );
    }
}
