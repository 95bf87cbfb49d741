//! Output format value object

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a dispatch result is rendered
///
/// This is a domain concept shared by the config file and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every outcome with latency, plus the selected answer (default)
    #[default]
    Full,
    /// Only the answer text
    Answer,
    /// The whole result as JSON
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Full => "full",
            OutputFormat::Answer => "answer",
            OutputFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(OutputFormat::Full),
            "answer" | "text" => Ok(OutputFormat::Answer),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_full() {
        assert_eq!(OutputFormat::default(), OutputFormat::Full);
    }

    #[test]
    fn test_serialize_lowercase() {
        let json = serde_json::to_string(&OutputFormat::Answer).unwrap();
        assert_eq!(json, "\"answer\"");
    }

    #[test]
    fn test_deserialize_lowercase() {
        let format: OutputFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn test_from_str_alias() {
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Answer));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
