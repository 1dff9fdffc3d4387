//! CPU quantity - a processor allocation expressed in millicores
//!
//! Accepted string forms:
//! - `"250m"`: millicores
//! - `"2"`:    whole cores
//! - `"0.5"`:  fractional cores, at most three decimal places

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use crate::error::DomainError;

/// CPU amount stored as millicores
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CpuQuantity(u64);

impl CpuQuantity {
    /// Millicores in one core
    pub const MILLIS_PER_CORE: u64 = 1000;

    /// Create a quantity from a raw millicore count
    #[inline]
    pub const fn from_millicores(millicores: u64) -> Self {
        Self(millicores)
    }

    /// Create a quantity from whole cores
    #[inline]
    pub const fn from_cores(cores: u64) -> Self {
        Self(cores.saturating_mul(Self::MILLIS_PER_CORE))
    }

    /// Get the millicore count
    #[inline]
    pub const fn millicores(self) -> u64 {
        self.0
    }

    /// Get the amount in (possibly fractional) cores
    #[inline]
    pub fn as_cores(self) -> f64 {
        self.0 as f64 / Self::MILLIS_PER_CORE as f64
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidCpuQuantity(s.to_string());
        let trimmed = s.trim();

        if let Some(millis) = trimmed.strip_suffix('m') {
            return parse_digits(millis).map(Self).ok_or_else(invalid);
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (trimmed, None),
        };

        let cores = parse_digits(whole).ok_or_else(invalid)?;
        let millis = match fraction {
            None => 0,
            Some(fraction) if (1..=3).contains(&fraction.len()) => {
                // "5" -> 500, "25" -> 250, "125" -> 125
                let scale = 10_u64.pow(3 - fraction.len() as u32);
                parse_digits(fraction).ok_or_else(invalid)? * scale
            }
            Some(_) => return Err(invalid()),
        };

        cores
            .checked_mul(Self::MILLIS_PER_CORE)
            .and_then(|m| m.checked_add(millis))
            .map(Self)
            .ok_or_else(invalid)
    }
}

/// Parse a non-empty run of ASCII digits (no sign, no whitespace)
fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for CpuQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % Self::MILLIS_PER_CORE == 0 {
            write!(f, "{}", self.0 / Self::MILLIS_PER_CORE)
        } else {
            write!(f, "{}m", self.0)
        }
    }
}

impl std::str::FromStr for CpuQuantity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CpuQuantity::parse(s)
    }
}

impl Add for CpuQuantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for CpuQuantity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

// Serialize in canonical string form ("2", "250m")
impl Serialize for CpuQuantity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

// Deserialize from a quantity string or a whole number of cores
impl<'de> Deserialize<'de> for CpuQuantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct CpuQuantityVisitor;

        impl<'de> Visitor<'de> for CpuQuantityVisitor {
            type Value = CpuQuantity;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a CPU quantity string or a whole number of cores")
            }

            fn visit_u64<E>(self, value: u64) -> Result<CpuQuantity, E>
            where
                E: de::Error,
            {
                Ok(CpuQuantity::from_cores(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<CpuQuantity, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(CpuQuantity::from_cores)
                    .map_err(|_| de::Error::custom("CPU quantity cannot be negative"))
            }

            fn visit_str<E>(self, value: &str) -> Result<CpuQuantity, E>
            where
                E: de::Error,
            {
                CpuQuantity::parse(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(CpuQuantityVisitor)
    }
}
