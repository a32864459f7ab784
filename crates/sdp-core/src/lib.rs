//! # SDP-Core: Session Description Handling for WebRTC Negotiation
//!
//! This library parses, models and rewrites the SDP text exchanged between
//! peers before it reaches the media engine.
//!
//! ## Features
//!
//! - **Grammar**: typed records for the session lines and the WebRTC attribute set
//!   (rtpmap, fmtp, extmap, ICE candidates, simulcast, BFCP, ...), each with an
//!   inverse writer
//! - **Document model**: session scope plus media sections, with unrecognised
//!   lines preserved verbatim in the scope they appeared in
//! - **Munging**: Opus DTX, RED and VP8 preference on offers, stereo propagation
//!   into answers, both failing open to the unmodified SDP
//! - **Codec discovery**: fmtp parameters, offered codec listing and target
//!   bitrates per resolution
//!
//! ## Usage
//!
//! ```rust
//! use rvoip_sdp_core::{parse_sdp, write_sdp};
//!
//! let doc = parse_sdp("v=0\r\ns=-\r\nt=0 0\r\nm=audio 9 UDP/TLS/RTP/SAVPF 111\r\n\
//!                      a=mid:0\r\na=rtpmap:111 opus/48000/2\r\n")?;
//!
//! let audio = &doc.media[0];
//! assert_eq!(audio.mid(), Some("0"));
//! assert_eq!(audio.fields.rtpmap("111").map(|r| r.codec.as_str()), Some("opus"));
//!
//! let text = write_sdp(&doc);
//! assert_eq!(parse_sdp(&text)?, doc);
//! # Ok::<(), rvoip_sdp_core::Error>(())
//! ```
//!
//! Munging an offer:
//!
//! ```rust
//! use rvoip_sdp_core::{mangle_offer, MungeConfig};
//!
//! let offer = "m=audio 9 RTP/AVP 111\r\na=rtpmap:111 opus/48000/2\r\n\
//!              a=fmtp:111 minptime=10;useinbandfec=1\r\n";
//! let mangled = mangle_offer(offer, &MungeConfig::default());
//! assert!(mangled.contains("useinbandfec=1;usedtx=1"));
//! ```

pub mod codecs;
pub mod config;
pub mod error;
pub mod grammar;
pub mod model;
pub mod munge;
pub mod parser;
pub mod writer;

// Re-export commonly used types and functions
pub use codecs::{available_codecs, optimal_bitrate, parse_fmtp_params, AvailableCodec};
pub use config::{MungeConfig, MungePreset};
pub use error::{Error, Result};
pub use grammar::{OpaqueLine, SdpRecord};
pub use model::{SdpDocument, SdpMediaSection, SdpScope};
pub use munge::{
    enable_stereo, mangle, mangle_offer, negotiate_stereo, try_enable_stereo, try_mangle_offer,
    SdpType, SessionDescription,
};
pub use parser::parse_sdp;
pub use writer::write_sdp;

/// Version information for the SDP library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
