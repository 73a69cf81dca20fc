use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Business area an idea or task belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Domain {
    #[default]
    Entreprise,
    Dev,
    Production,
    Marketing,
    Legal,
    Social,
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::Entreprise,
        Domain::Dev,
        Domain::Production,
        Domain::Marketing,
        Domain::Legal,
        Domain::Social,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Entreprise => "entreprise",
            Domain::Dev => "dev",
            Domain::Production => "production",
            Domain::Marketing => "marketing",
            Domain::Legal => "legal",
            Domain::Social => "social",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ParseDomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let domain = match normalized.as_str() {
            "entreprise" | "enterprise" => Domain::Entreprise,
            "dev" | "development" => Domain::Dev,
            "production" => Domain::Production,
            "marketing" => Domain::Marketing,
            "legal" => Domain::Legal,
            "social" => Domain::Social,
            _ => {
                return Err(ParseDomainError {
                    value: value.to_string(),
                });
            }
        };
        Ok(domain)
    }
}

impl Serialize for Domain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Domain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Domain::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDomainError {
    value: String,
}

impl fmt::Display for ParseDomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid domain '{}': expected one of {}",
            self.value,
            Domain::ALL
                .iter()
                .map(|domain| domain.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl Error for ParseDomainError {}
