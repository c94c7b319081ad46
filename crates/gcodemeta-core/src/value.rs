//! Typed attribute values and their semantic kinds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::units::{format_duration, Unit};

/// Semantic type of an attribute as declared in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Free-form text
    Text,
    /// Elapsed time
    Duration,
    /// Number with a fixed unit
    Quantity(Unit),
    /// One member of a closed vocabulary
    Choice(&'static [&'static str]),
    /// Boolean switch
    Flag,
    /// One number per tool, all in the same unit
    PerTool(Unit),
    /// One text per tool
    TextList,
}

impl ValueKind {
    /// Unit carried by numeric kinds
    pub fn unit(&self) -> Option<Unit> {
        match self {
            Self::Quantity(unit) | Self::PerTool(unit) => Some(*unit),
            _ => None,
        }
    }

    /// Short name of the kind, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Duration => "duration",
            Self::Quantity(_) => "quantity",
            Self::Choice(_) => "choice",
            Self::Flag => "flag",
            Self::PerTool(_) => "per_tool",
            Self::TextList => "text_list",
        }
    }
}

/// A normalized attribute value
///
/// Matchers produce these from raw slicer text; nothing downstream of a
/// matcher ever sees the slicer's original formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    /// Free-form text
    Text(String),
    /// Elapsed time, serialized as whole seconds
    Duration(#[serde(with = "seconds")] Duration),
    /// Number with unit
    Quantity { value: f64, unit: Unit },
    /// Vocabulary member
    Choice(String),
    /// Boolean switch
    Flag(bool),
    /// Per-tool numbers
    PerTool { values: Vec<f64>, unit: Unit },
    /// Per-tool texts
    TextList(Vec<String>),
}

impl AttributeValue {
    /// Build a quantity value
    pub fn quantity(value: f64, unit: Unit) -> Self {
        Self::Quantity { value, unit }
    }

    /// Build a duration value from whole seconds
    pub fn seconds(secs: u64) -> Self {
        Self::Duration(Duration::from_secs(secs))
    }

    /// Check whether this value is acceptable for an attribute of `kind`
    pub fn conforms_to(&self, kind: &ValueKind) -> bool {
        match (self, kind) {
            (Self::Text(_), ValueKind::Text) => true,
            (Self::Duration(_), ValueKind::Duration) => true,
            (Self::Quantity { value, unit }, ValueKind::Quantity(expected)) => {
                unit == expected && value.is_finite()
            }
            (Self::Choice(choice), ValueKind::Choice(vocabulary)) => {
                vocabulary.iter().any(|member| member == choice)
            }
            (Self::Flag(_), ValueKind::Flag) => true,
            (Self::PerTool { values, unit }, ValueKind::PerTool(expected)) => {
                unit == expected && !values.is_empty() && values.iter().all(|v| v.is_finite())
            }
            (Self::TextList(items), ValueKind::TextList) => !items.is_empty(),
            _ => false,
        }
    }

    /// Duration payload, if this is a duration
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Numeric payload, if this is a quantity
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Quantity { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Text payload for text and choice values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Choice(s) => Some(s),
            _ => None,
        }
    }
}

fn format_number(value: f64) -> String {
    let mut text = format!("{:.4}", value);
    while text.contains('.') && (text.ends_with('0') || text.ends_with('.')) {
        text.pop();
    }
    text
}

fn with_label(value: f64, unit: Unit) -> String {
    let label = unit.label();
    if label.is_empty() {
        format_number(value)
    } else {
        format!("{} {}", format_number(value), label)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Choice(s) => write!(f, "{}", s),
            Self::Duration(d) => write!(f, "{}", format_duration(*d)),
            Self::Quantity { value, unit } => write!(f, "{}", with_label(*value, *unit)),
            Self::Flag(b) => write!(f, "{}", b),
            Self::PerTool { values, unit } => {
                let parts: Vec<String> = values.iter().map(|v| with_label(*v, *unit)).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::TextList(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

mod seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
