//! Generation mode value objects

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which strategy answers a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    /// One attempt on the on-device engine
    OnDevice,
    /// One attempt on the cloud engine
    Cloud,
    /// Intent segmentation plus quorum voting on the on-device engine
    #[default]
    Hybrid,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::OnDevice => "on-device",
            GenerationMode::Cloud => "cloud",
            GenerationMode::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "on-device" | "ondevice" | "local" => Ok(GenerationMode::OnDevice),
            "cloud" => Ok(GenerationMode::Cloud),
            "hybrid" => Ok(GenerationMode::Hybrid),
            _ => Err(format!(
                "Unknown mode: {}. Valid: on-device, cloud, hybrid",
                s
            )),
        }
    }
}

/// When a hybrid result is handed to the cloud engine instead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CloudFallback {
    #[default]
    Never,
    /// Some intent missed quorum, or nothing completed
    OnNoQuorum,
    /// The hybrid result has no calls
    OnEmpty,
}

impl CloudFallback {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudFallback::Never => "never",
            CloudFallback::OnNoQuorum => "on_no_quorum",
            CloudFallback::OnEmpty => "on_empty",
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self != CloudFallback::Never
    }
}

impl std::fmt::Display for CloudFallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CloudFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "never" => Ok(CloudFallback::Never),
            "on_no_quorum" => Ok(CloudFallback::OnNoQuorum),
            "on_empty" => Ok(CloudFallback::OnEmpty),
            _ => Err(format!(
                "Unknown cloud fallback: {}. Valid: never, on_no_quorum, on_empty",
                s
            )),
        }
    }
}
