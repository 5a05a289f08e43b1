//! Ratings cross the JSON boundary as plain numbers.
//!
//! Inbound documents (imports especially) carry ratings as either numbers or
//! numeric strings such as `"4.5"`; both decode into [`Rating`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

pub const MAX_RATING: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Rating(f64);

impl Rating {
    pub fn new(value: f64) -> Result<Self, String> {
        if !value.is_finite() || !(0.0..=MAX_RATING).contains(&value) {
            return Err(format!("rating must be between 0 and {MAX_RATING}"));
        }
        Ok(Self(round(value)))
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| format!("rating '{s}' is not a number"))?;
        Self::new(value)
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl From<Rating> for f64 {
    fn from(r: Rating) -> Self {
        r.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rounds to two decimals, the precision ratings are stored at.
#[must_use]
pub fn round(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRating {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawRating::deserialize(deserializer)? {
            RawRating::Number(n) => Rating::new(n),
            RawRating::Text(s) => Rating::parse(&s),
        }
        .map_err(serde::de::Error::custom)
    }
}
