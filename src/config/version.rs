//! REST API version definitions.
//!
//! This module provides the [`ApiVersion`] enum sent in the `x-ms-version`
//! header of every request.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// REST API version.
///
/// Versions are dated (`YYYY-MM-DD`). This enum provides variants for the
/// versions this crate knows about plus a `Custom` variant for any other
/// well-formed date.
///
/// # Example
///
/// ```rust
/// use docdb_rest::ApiVersion;
///
/// let version = ApiVersion::latest();
/// assert_eq!(version.to_string(), "2017-02-22");
///
/// let version: ApiVersion = "2018-12-31".parse().unwrap();
/// assert_eq!(version, ApiVersion::V2018_12_31);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// API version 2017-02-22
    V2017_02_22,
    /// API version 2017-11-15
    V2017_11_15,
    /// API version 2018-12-31
    V2018_12_31,
    /// Custom version string for unrecognized versions.
    Custom(String),
}

impl ApiVersion {
    /// Returns the version the wire formats in this crate are written against.
    #[must_use]
    pub const fn latest() -> Self {
        Self::V2017_02_22
    }

    /// Returns `true` if this is one of the known versions.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    const fn ordinal(&self) -> u32 {
        match self {
            Self::V2017_02_22 => 1,
            Self::V2017_11_15 => 2,
            Self::V2018_12_31 => 3,
            Self::Custom(_) => 100,
        }
    }

    fn is_valid_version_format(s: &str) -> bool {
        // Format: YYYY-MM-DD
        let parts: Vec<&str> = s.split('-').collect();
        let [year, month, day] = parts.as_slice() else {
            return false;
        };

        year.len() == 4
            && month.len() == 2
            && day.len() == 2
            && [year, month, day]
                .iter()
                .all(|p| p.chars().all(|c| c.is_ascii_digit()))
            && matches!(month.parse::<u8>(), Ok(1..=12))
            && matches!(day.parse::<u8>(), Ok(1..=31))
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::latest()
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            // Dates compare lexicographically
            (Self::Custom(a), Self::Custom(b)) => a.cmp(b),
            _ => self.ordinal().cmp(&other.ordinal()),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version_str = match self {
            Self::V2017_02_22 => "2017-02-22",
            Self::V2017_11_15 => "2017-11-15",
            Self::V2018_12_31 => "2018-12-31",
            Self::Custom(s) => s,
        };
        f.write_str(version_str)
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        match s {
            "2017-02-22" => Ok(Self::V2017_02_22),
            "2017-11-15" => Ok(Self::V2017_11_15),
            "2018-12-31" => Ok(Self::V2018_12_31),
            _ if Self::is_valid_version_format(s) => Ok(Self::Custom(s.to_string())),
            _ => Err(ConfigError::InvalidApiVersion {
                version: s.to_string(),
            }),
        }
    }
}
