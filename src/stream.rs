use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VstreamError;

/// Adaptive-streaming output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    /// Dynamic Adaptive Streaming over HTTP
    Dash,
    /// HTTP Live Streaming
    Hls,
}

impl StreamType {
    pub const fn name(self) -> &'static str {
        match self {
            StreamType::Dash => "DASH",
            StreamType::Hls => "HLS",
        }
    }

    /// Manifest file written inside the output directory
    pub const fn manifest_name(self) -> &'static str {
        match self {
            StreamType::Dash => "index.mpd",
            StreamType::Hls => "index.m3u8",
        }
    }

    pub const fn index(self) -> u8 {
        match self {
            StreamType::Dash => 0,
            StreamType::Hls => 1,
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts `dash`/`hls` in any case, or the numeric forms `0`/`1`
impl FromStr for StreamType {
    type Err = VstreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dash" | "0" => Ok(StreamType::Dash),
            "hls" | "1" => Ok(StreamType::Hls),
            _ => Err(VstreamError::InvalidStreamType(s.to_string())),
        }
    }
}

impl TryFrom<u8> for StreamType {
    type Error = VstreamError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StreamType::Dash),
            1 => Ok(StreamType::Hls),
            other => Err(VstreamError::InvalidStreamType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_case_insensitive() {
        assert_eq!("dash".parse::<StreamType>().unwrap(), StreamType::Dash);
        assert_eq!("DASH".parse::<StreamType>().unwrap(), StreamType::Dash);
        assert_eq!("Hls".parse::<StreamType>().unwrap(), StreamType::Hls);
        assert_eq!("0".parse::<StreamType>().unwrap(), StreamType::Dash);
        assert_eq!("1".parse::<StreamType>().unwrap(), StreamType::Hls);
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        for value in ["", "2", "-1", "smooth", "dash-hls"] {
            match value.parse::<StreamType>() {
                Err(VstreamError::InvalidStreamType(v)) => assert_eq!(v, value),
                other => panic!("expected InvalidStreamType for {:?}, got {:?}", value, other),
            }
        }
        assert!(matches!(
            StreamType::try_from(7u8),
            Err(VstreamError::InvalidStreamType(_))
        ));
    }

    #[test]
    fn test_fixed_mappings() {
        assert_eq!(StreamType::Dash.name(), "DASH");
        assert_eq!(StreamType::Hls.name(), "HLS");
        assert_eq!(StreamType::Dash.manifest_name(), "index.mpd");
        assert_eq!(StreamType::Hls.manifest_name(), "index.m3u8");
        assert_eq!(StreamType::try_from(StreamType::Hls.index()).unwrap(), StreamType::Hls);
    }
}
