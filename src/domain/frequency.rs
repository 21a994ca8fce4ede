// Frequency variants of the virtual test rigs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown frequency variant: {0}")]
pub struct UnknownFrequency(pub String);

/// One of the four fixed rig frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FrequencyVariant {
    #[serde(rename = "2hz")]
    Hz2,
    #[serde(rename = "3hz")]
    Hz3,
    #[serde(rename = "5hz")]
    Hz5,
    #[serde(rename = "7hz")]
    Hz7,
}

impl FrequencyVariant {
    pub const ALL: [FrequencyVariant; 4] = [
        FrequencyVariant::Hz2,
        FrequencyVariant::Hz3,
        FrequencyVariant::Hz5,
        FrequencyVariant::Hz7,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            FrequencyVariant::Hz2 => "2hz",
            FrequencyVariant::Hz3 => "3hz",
            FrequencyVariant::Hz5 => "5hz",
            FrequencyVariant::Hz7 => "7hz",
        }
    }

    /// Sine periods completed per second
    pub fn frequency_value(&self) -> u32 {
        match self {
            FrequencyVariant::Hz2 => 2,
            FrequencyVariant::Hz3 => 3,
            FrequencyVariant::Hz5 => 5,
            FrequencyVariant::Hz7 => 7,
        }
    }

    pub fn amplitude_threshold(&self) -> &'static str {
        match self {
            FrequencyVariant::Hz2 => "R",
            FrequencyVariant::Hz3 => "R/2",
            FrequencyVariant::Hz5 => "R/4",
            FrequencyVariant::Hz7 => "R/6",
        }
    }

    pub fn dimension_range(&self) -> &'static str {
        match self {
            FrequencyVariant::Hz2 => "-50 to +50",
            FrequencyVariant::Hz3 => "-25 to +25",
            FrequencyVariant::Hz5 => "-12.5 to +12.5",
            FrequencyVariant::Hz7 => "-8.3 to +8.3",
        }
    }

    /// Rated movement cycles over the rig's lifetime
    pub fn movement_cycles(&self) -> u64 {
        match self {
            FrequencyVariant::Hz2 => 518_400,
            FrequencyVariant::Hz3 => 1_166_400,
            FrequencyVariant::Hz5 => 3_240_000,
            FrequencyVariant::Hz7 => 6_652_800,
        }
    }

    pub fn label(&self) -> String {
        format!("{} Hz", self.frequency_value())
    }
}

impl fmt::Display for FrequencyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FrequencyVariant {
    type Err = UnknownFrequency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        FrequencyVariant::ALL
            .into_iter()
            .find(|v| v.code() == normalized)
            .ok_or_else(|| UnknownFrequency(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        assert_eq!("2hz".parse::<FrequencyVariant>(), Ok(FrequencyVariant::Hz2));
        assert_eq!(" 7HZ ".parse::<FrequencyVariant>(), Ok(FrequencyVariant::Hz7));
        assert_eq!(
            "4hz".parse::<FrequencyVariant>(),
            Err(UnknownFrequency("4hz".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&FrequencyVariant::Hz5).unwrap();
        assert_eq!(json, "\"5hz\"");
        let parsed: FrequencyVariant = serde_json::from_str("\"3hz\"").unwrap();
        assert_eq!(parsed, FrequencyVariant::Hz3);
    }

    #[test]
    fn test_derived_labels() {
        assert_eq!(FrequencyVariant::Hz5.amplitude_threshold(), "R/4");
        assert_eq!(FrequencyVariant::Hz7.dimension_range(), "-8.3 to +8.3");
        assert_eq!(FrequencyVariant::Hz3.movement_cycles(), 1_166_400);
        assert_eq!(FrequencyVariant::Hz2.label(), "2 Hz");
    }
}
