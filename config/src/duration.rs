//! Durations given either as bare seconds (`60`, `"60"`) or in humantime
//! notation (`"90s"`, `"5m"`, `"1h 30m"`).

use serde::{
    de::Error as _,
    Deserialize,
    Deserializer,
};
use std::time::Duration;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Seconds(u64),
    Text(String),
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    match RawDuration::deserialize(deserializer)? {
        RawDuration::Seconds(secs) => Ok(Duration::from_secs(secs)),
        RawDuration::Text(text) => parse(&text).map_err(D::Error::custom),
    }
}

pub(crate) fn parse(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    if let Ok(secs) = text.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(text).map_err(|e| format!("invalid duration '{text}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::parse;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn bare_numbers_are_seconds() {
        assert_eq!(parse("60"), Ok(Duration::from_secs(60)));
        assert_eq!(parse(" 5 "), Ok(Duration::from_secs(5)));
    }

    #[test]
    fn humantime_units() {
        assert_eq!(parse("90s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse("5m"), Ok(Duration::from_secs(300)));
        assert_eq!(parse("1h 30m"), Ok(Duration::from_secs(5400)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse("soon").is_err());
        assert!(parse("").is_err());
    }
}
