//! Session description envelope as exchanged with the media engine

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Role of a session description in offer/answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
    /// Provisional answer
    Pranswer,
}

impl SdpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SdpType::Offer => "offer",
            SdpType::Answer => "answer",
            SdpType::Pranswer => "pranswer",
        }
    }
}

impl fmt::Display for SdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SdpType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "offer" => Ok(SdpType::Offer),
            "answer" => Ok(SdpType::Answer),
            "pranswer" => Ok(SdpType::Pranswer),
            _ => Err(Error::InvalidSdpType(s.to_string())),
        }
    }
}

/// An SDP body tagged with its offer/answer role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
    #[serde(rename = "sdp")]
    pub description: String,
}

impl SessionDescription {
    pub fn new(sdp_type: SdpType, description: impl Into<String>) -> Self {
        Self {
            sdp_type,
            description: description.into(),
        }
    }

    pub fn offer(description: impl Into<String>) -> Self {
        Self::new(SdpType::Offer, description)
    }

    pub fn answer(description: impl Into<String>) -> Self {
        Self::new(SdpType::Answer, description)
    }

    pub fn is_offer(&self) -> bool {
        self.sdp_type == SdpType::Offer
    }
}
