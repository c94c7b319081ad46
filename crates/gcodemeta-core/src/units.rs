//! Unit normalization utilities
//!
//! Slicers print the same quantity in different shapes: `2h 3m 45s`,
//! `7425`, `1 hours 2 minutes`, `1.23m`, `20%`. The helpers here turn that
//! text into canonical values. All of them return `None` rather than an
//! error so a bad capture only costs the one attribute.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

/// Physical unit attached to a numeric quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Millimeters
    Millimeter,
    /// Grams
    Gram,
    /// Cubic centimeters
    CubicCentimeter,
    /// Degrees Celsius
    Celsius,
    /// Percentage (0-100)
    Percent,
    /// Plain count (layers, tools)
    Count,
    /// Slicer-configured currency, unitless
    Currency,
}

impl Unit {
    /// Short label used when displaying a value, empty for unitless kinds
    pub fn label(&self) -> &'static str {
        match self {
            Self::Millimeter => "mm",
            Self::Gram => "g",
            Self::CubicCentimeter => "cm3",
            Self::Celsius => "°C",
            Self::Percent => "%",
            Self::Count | Self::Currency => "",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millimeter => write!(f, "millimeter"),
            Self::Gram => write!(f, "gram"),
            Self::CubicCentimeter => write!(f, "cubic centimeter"),
            Self::Celsius => write!(f, "celsius"),
            Self::Percent => write!(f, "percent"),
            Self::Count => write!(f, "count"),
            Self::Currency => write!(f, "currency"),
        }
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "millimeter" => Ok(Self::Millimeter),
            "g" | "gram" => Ok(Self::Gram),
            "cm3" | "cubic centimeter" => Ok(Self::CubicCentimeter),
            "c" | "°c" | "celsius" => Ok(Self::Celsius),
            "%" | "percent" => Ok(Self::Percent),
            "count" => Ok(Self::Count),
            "currency" => Ok(Self::Currency),
            _ => Err(format!("Unknown unit: {}", s)),
        }
    }
}

/// Upper bound for plain-seconds captures (about 31 years)
const MAX_SECONDS: f64 = 1.0e9;

fn duration_token_regex() -> &'static Regex {
    static DURATION_TOKEN: OnceLock<Regex> = OnceLock::new();
    DURATION_TOKEN.get_or_init(|| {
        Regex::new(r"(\d+)\s*([a-z]+)").expect("invalid duration token pattern")
    })
}

fn unit_seconds(unit: &str) -> Option<u64> {
    match unit {
        "d" | "day" | "days" => Some(24 * 60 * 60),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(60 * 60),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(60),
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1),
        _ => None,
    }
}

/// Parse a duration written as unit-tagged components
///
/// Accepts the compact form (`2h 3m 45s`, `1d2h`, `120min`, `2M`) and the
/// verbose form (`1 hours 2 minutes`). Components may be separated by
/// whitespace or commas. Anything else in the string, or a zero total,
/// yields `None`.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let text = input.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    let mut total = 0u64;
    let mut cursor = 0usize;
    for caps in duration_token_regex().captures_iter(&text) {
        let whole = caps.get(0)?;
        if !is_separator(&text[cursor..whole.start()]) {
            return None;
        }
        let amount: u64 = caps[1].parse().ok()?;
        let scale = unit_seconds(&caps[2])?;
        total = total.checked_add(amount.checked_mul(scale)?)?;
        cursor = whole.end();
    }

    if cursor == 0 || !is_separator(&text[cursor..]) || total == 0 {
        return None;
    }
    Some(Duration::from_secs(total))
}

fn is_separator(gap: &str) -> bool {
    gap.chars().all(|c| c.is_whitespace() || c == ',')
}

/// Parse a plain number of seconds (`7425`, `7425.6`)
pub fn parse_seconds(input: &str) -> Option<Duration> {
    let seconds = parse_number(input)?;
    if !(0.0..=MAX_SECONDS).contains(&seconds) {
        return None;
    }
    Some(Duration::from_secs_f64(seconds.round()))
}

/// Parse a finite decimal number
pub fn parse_number(input: &str) -> Option<f64> {
    let value = input.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Parse a percentage, with or without the trailing `%`
pub fn parse_percent(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    parse_number(trimmed.strip_suffix('%').unwrap_or(trimmed))
}

/// Parse a length to millimeters
///
/// A bare number is taken to be in `default_unit_mm` multiples of a
/// millimeter (1.0 for mm, 1000.0 for meters). An explicit `mm`, `cm` or
/// `m` suffix overrides the default.
pub fn parse_length_mm(input: &str, default_unit_mm: f64) -> Option<f64> {
    let trimmed = input.trim();
    let (number, scale) = if let Some(n) = trimmed.strip_suffix("mm") {
        (n, 1.0)
    } else if let Some(n) = trimmed.strip_suffix("cm") {
        (n, 10.0)
    } else if let Some(n) = trimmed.strip_suffix('m') {
        (n, 1000.0)
    } else {
        (trimmed, default_unit_mm)
    };
    parse_number(number).map(|v| v * scale)
}

/// Parse a 0/1 or true/false switch
pub fn parse_flag(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Format a duration the way PrusaSlicer prints it (`1d 2h 3m 4s`)
pub fn format_duration(duration: Duration) -> String {
    let mut secs = duration.as_secs();
    let days = secs / 86_400;
    secs %= 86_400;
    let hours = secs / 3_600;
    secs %= 3_600;
    let minutes = secs / 60;
    secs %= 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if days > 0 || hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    parts.push(format!("{}s", secs));
    parts.join(" ")
}
