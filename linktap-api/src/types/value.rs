use crate::types::Error;
use std::{convert::TryFrom, fmt, str::FromStr};

/// The units a time quantity can be expressed in. The remote service
/// reports watering status in minutes while durations are configured
/// in seconds, so both show up at the host boundary.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
}

impl TimeUnit {
    fn as_secs(&self) -> i64 {
        match self {
            TimeUnit::Second => 1,
            TimeUnit::Minute => 60,
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            TimeUnit::Second => "s",
            TimeUnit::Minute => "min",
        }
    }
}

/// Defines fundamental types that can be associated with a property.
/// Drivers set the type for each property they manage and, for
/// properties that can be commanded, only accept values of the
/// correct type.

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// For properties that return/accept a simple true/false, on/off,
    /// etc., state.
    Bool(bool),

    /// For properties that return/accept a plain integer. When an
    /// integer is given to a property that expects a duration, it is
    /// taken as a number of seconds.
    Int(i64),

    /// For properties that return/accept text, like the watering
    /// mode.
    Str(String),

    /// For properties that return/accept a time quantity.
    Time(i64, TimeUnit),
}

impl Value {
    /// Interprets the value as a duration and returns the number of
    /// seconds it represents. Bare integers are accepted as seconds.
    pub fn as_seconds(&self) -> Result<i64, Error> {
        match self {
            Value::Time(v, unit) => v
                .checked_mul(unit.as_secs())
                .ok_or_else(|| Error::InvArgument("duration overflow".into())),
            Value::Int(v) => Ok(*v),
            _ => Err(Error::TypeError),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "\"{}\"", v),
            Value::Time(v, unit) => write!(f, "{} {}", v, unit.suffix()),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::Bool(v) = value {
            Ok(v)
        } else {
            Err(Error::TypeError)
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::Int(v) = value {
            return Ok(v);
        }
        Err(Error::TypeError)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::Str(v) = value {
            Ok(v)
        } else {
            Err(Error::TypeError)
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}

// Parses the numeric portion of a time quantity. Returns `None` if
// the prefix isn't an integer so the caller can fall back to treating
// the text as a string.

fn parse_time(s: &str, suffix: &str, unit: TimeUnit) -> Option<Value> {
    s.strip_suffix(suffix)
        .and_then(|v| v.trim_end().parse::<i64>().ok())
        .map(|v| Value::Time(v, unit))
}

/// Parses text typed by a user. Booleans may be given as
/// `true`/`false` or `on`/`off`, durations as `90s` or `2min`, and
/// integers as-is. Anything else is kept as a string.

impl FromStr for Value {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.is_empty() {
            return Err(Error::ParseError("empty value".into()));
        }

        match s.to_ascii_lowercase().as_str() {
            "true" | "on" => Ok(Value::Bool(true)),
            "false" | "off" => Ok(Value::Bool(false)),
            lc => {
                if let Ok(v) = lc.parse::<i64>() {
                    Ok(Value::Int(v))
                } else if let Some(v) = parse_time(lc, "min", TimeUnit::Minute)
                    .or_else(|| parse_time(lc, "s", TimeUnit::Second))
                {
                    Ok(v)
                } else {
                    Ok(Value::Str(s.into()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn test_values_to() {
        assert_eq!("false", format!("{}", Value::Bool(false)));
        assert_eq!("true", format!("{}", Value::Bool(true)));

        assert_eq!("0", format!("{}", Value::Int(0)));
        assert_eq!("-1", format!("{}", Value::Int(-1)));

        assert_eq!("\"TAP_MODE_INSTANT\"", format!("{}", Value::from("TAP_MODE_INSTANT")));

        assert_eq!("90 s", format!("{}", Value::Time(90, TimeUnit::Second)));
        assert_eq!("5 min", format!("{}", Value::Time(5, TimeUnit::Minute)));
    }

    #[test]
    fn test_values_tryfrom() {
        assert_eq!(bool::try_from(Value::Bool(true)), Ok(true));
        assert!(bool::try_from(Value::Int(0)).is_err());
        assert!(bool::try_from(Value::Str(String::from("on"))).is_err());

        assert_eq!(i64::try_from(Value::Int(42)), Ok(42));
        assert!(i64::try_from(Value::Bool(true)).is_err());
        assert!(i64::try_from(Value::Time(1, TimeUnit::Second)).is_err());

        assert_eq!(
            String::try_from(Value::from("hello")),
            Ok(String::from("hello"))
        );
        assert!(String::try_from(Value::Int(1)).is_err());
    }

    #[test]
    fn test_as_seconds() {
        assert_eq!(Value::Time(90, TimeUnit::Second).as_seconds(), Ok(90));
        assert_eq!(Value::Time(2, TimeUnit::Minute).as_seconds(), Ok(120));
        assert_eq!(Value::Int(75).as_seconds(), Ok(75));
        assert_eq!(Value::Bool(true).as_seconds(), Err(Error::TypeError));
        assert_eq!(Value::from("10").as_seconds(), Err(Error::TypeError));
        assert!(Value::Time(i64::MAX, TimeUnit::Minute).as_seconds().is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!("on".parse::<Value>(), Ok(Value::Bool(true)));
        assert_eq!("OFF".parse::<Value>(), Ok(Value::Bool(false)));
        assert_eq!("true".parse::<Value>(), Ok(Value::Bool(true)));
        assert_eq!("false".parse::<Value>(), Ok(Value::Bool(false)));

        assert_eq!("90".parse::<Value>(), Ok(Value::Int(90)));
        assert_eq!("-3".parse::<Value>(), Ok(Value::Int(-3)));

        assert_eq!(
            "90s".parse::<Value>(),
            Ok(Value::Time(90, TimeUnit::Second))
        );
        assert_eq!(
            "2min".parse::<Value>(),
            Ok(Value::Time(2, TimeUnit::Minute))
        );
        assert_eq!(
            "2 min".parse::<Value>(),
            Ok(Value::Time(2, TimeUnit::Minute))
        );

        // Text that only looks like a quantity is kept as a string.

        assert_eq!("xs".parse::<Value>(), Ok(Value::from("xs")));
        assert_eq!(
            "TAP_MODE_INSTANT".parse::<Value>(),
            Ok(Value::from("TAP_MODE_INSTANT"))
        );

        assert!("".parse::<Value>().is_err());
        assert!("   ".parse::<Value>().is_err());
    }
}
