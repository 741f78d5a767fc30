//! Snippet lifetimes such as "15 minutes" or "7 days"

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

/// Lifetimes offered by the web client
pub const PRESETS: [&str; 4] = ["15 minutes", "1 hour", "24 hours", "7 days"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryUnit {
    Minutes,
    Hours,
    Days,
}

/// How long a snippet stays retrievable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    pub amount: u32,
    pub unit: ExpiryUnit,
}

impl Expiry {
    pub fn minutes(amount: u32) -> Self {
        Self {
            amount,
            unit: ExpiryUnit::Minutes,
        }
    }

    pub fn hours(amount: u32) -> Self {
        Self {
            amount,
            unit: ExpiryUnit::Hours,
        }
    }

    pub fn days(amount: u32) -> Self {
        Self {
            amount,
            unit: ExpiryUnit::Days,
        }
    }

    pub fn duration(&self) -> Duration {
        let amount = i64::from(self.amount);
        match self.unit {
            ExpiryUnit::Minutes => Duration::minutes(amount),
            ExpiryUnit::Hours => Duration::hours(amount),
            ExpiryUnit::Days => Duration::days(amount),
        }
    }

    /// Absolute expiry for a snippet created at `now`
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.duration())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl Default for Expiry {
    fn default() -> Self {
        Self::minutes(15)
    }
}

impl FromStr for Expiry {
    type Err = ClientError;

    /// Parses `"<n> <unit>"`; units may be singular, plural or abbreviated
    /// (`m`, `h`, `d`), and `"15m"` works without the space.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ClientError::InvalidExpiry(format!("missing unit in '{}'", s)))?;
        let (amount, unit) = s.split_at(split);

        let amount: u32 = amount
            .parse()
            .map_err(|_| ClientError::InvalidExpiry(format!("invalid amount in '{}'", s)))?;
        if amount == 0 {
            return Err(ClientError::InvalidExpiry("expiry must be positive".to_string()));
        }

        let unit = match unit.trim() {
            "m" | "min" | "mins" | "minute" | "minutes" => ExpiryUnit::Minutes,
            "h" | "hr" | "hrs" | "hour" | "hours" => ExpiryUnit::Hours,
            "d" | "day" | "days" => ExpiryUnit::Days,
            other => {
                return Err(ClientError::InvalidExpiry(format!("unknown unit '{}'", other)));
            }
        };

        Ok(Self { amount, unit })
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            ExpiryUnit::Minutes => "minute",
            ExpiryUnit::Hours => "hour",
            ExpiryUnit::Days => "day",
        };
        let plural = if self.amount == 1 { "" } else { "s" };
        write!(f, "{} {}{}", self.amount, unit, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_presets_parse_and_display() {
        for preset in PRESETS {
            let expiry: Expiry = preset.parse().unwrap();
            assert_eq!(expiry.to_string(), preset);
        }
    }

    #[test]
    fn test_short_forms() {
        assert_eq!("15m".parse::<Expiry>().unwrap(), Expiry::minutes(15));
        assert_eq!("2 H".parse::<Expiry>().unwrap(), Expiry::hours(2));
        assert_eq!(" 7d ".parse::<Expiry>().unwrap(), Expiry::days(7));
    }

    #[test]
    fn test_invalid_expiry() {
        for input in ["", "15", "minutes", "0 minutes", "3 weeks", "-1 days"] {
            assert!(input.parse::<Expiry>().is_err(), "{:?} should not parse", input);
        }
    }

    #[test]
    fn test_expires_at() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 23, 50, 0).unwrap();
        assert_eq!(
            Expiry::minutes(15).expires_at(now),
            Utc.with_ymd_and_hms(2026, 3, 2, 0, 5, 0).unwrap()
        );
        assert_eq!(
            Expiry::days(7).expires_at(now),
            Utc.with_ymd_and_hms(2026, 3, 8, 23, 50, 0).unwrap()
        );
    }

    #[test]
    fn test_default_matches_web_client() {
        assert_eq!(Expiry::default().to_string(), "15 minutes");
    }
}
