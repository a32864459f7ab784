//! SDP munging applied between the signalling layer and the media engine
//!
//! Munging works on SDP text rather than on a parsed [`SdpDocument`]: every line
//! that is not targeted must come out exactly as it went in, so the passes here
//! walk physical lines and only interpret the few they rewrite.
//!
//! Two transforms are provided:
//!
//! - [`mangle_offer`] tunes a local offer (Opus DTX, RED and VP8 preference)
//! - [`enable_stereo`] carries stereo Opus from a remote offer into the local answer
//!
//! Both follow the same failure policy. The `try_*` core returns a typed
//! [`Error`] when it meets a line it cannot interpret, and the adapter logs the
//! error and hands back the unmodified input.
//!
//! # Example
//!
//! ```
//! use rvoip_sdp_core::munge::{mangle, SessionDescription};
//! use rvoip_sdp_core::MungeConfig;
//!
//! let offer = SessionDescription::offer(
//!     "v=0\r\nm=audio 9 UDP/TLS/RTP/SAVPF 111 63\r\n\
//!      a=rtpmap:111 opus/48000/2\r\na=rtpmap:63 red/48000/2\r\n",
//! );
//! let mangled = mangle(&offer, &MungeConfig::default());
//! assert!(mangled.description.contains("m=audio 9 UDP/TLS/RTP/SAVPF 63 111"));
//! ```
//!
//! [`SdpDocument`]: crate::model::SdpDocument
//! [`Error`]: crate::error::Error

pub mod codec;
pub mod description;
pub mod stereo;

pub use codec::{mangle_offer, try_mangle_offer};
pub use description::{SdpType, SessionDescription};
pub use stereo::{enable_stereo, try_enable_stereo};

use tracing::debug;

use crate::config::MungeConfig;
use crate::error::{Error, Result};
use crate::grammar::{rtp, session, Fmtp, MediaLine, RtpMap};

/// Applies the offer transforms to a session description
///
/// Answers and provisional answers are returned unchanged.
pub fn mangle(desc: &SessionDescription, config: &MungeConfig) -> SessionDescription {
    if desc.sdp_type != SdpType::Offer {
        debug!(sdp_type = %desc.sdp_type, "skipping munging for non-offer");
        return desc.clone();
    }
    SessionDescription::new(SdpType::Offer, mangle_offer(&desc.description, config))
}

/// Applies the stereo patch to a local answer for the given remote offer
///
/// The answer is returned unchanged when stereo is disabled in `config` or when
/// the descriptions are not an offer/answer pair.
pub fn negotiate_stereo(
    offer: &SessionDescription,
    answer: &SessionDescription,
    config: &MungeConfig,
) -> SessionDescription {
    if !config.enable_stereo || offer.sdp_type != SdpType::Offer || answer.sdp_type == SdpType::Offer {
        return answer.clone();
    }
    SessionDescription::new(
        answer.sdp_type,
        enable_stereo(&offer.description, &answer.description),
    )
}

/// One physical line of SDP text with its original terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawLine<'a> {
    pub content: &'a str,
    pub terminator: &'a str,
}

/// Splits text into lines, keeping each line's terminator (`\r\n`, `\n` or none)
pub(crate) fn raw_lines(text: &str) -> Vec<RawLine<'_>> {
    text.split_inclusive('\n')
        .map(|line| {
            let content = line
                .strip_suffix("\r\n")
                .or_else(|| line.strip_suffix('\n'))
                .unwrap_or(line);
            RawLine {
                content,
                terminator: &line[content.len()..],
            }
        })
        .collect()
}

/// Interprets an `a=rtpmap:` line, `Ok(None)` for any other line
pub(crate) fn rtpmap_line(line_number: usize, line: &str) -> Result<Option<RtpMap>> {
    match line.strip_prefix("a=") {
        Some(value) if value.starts_with("rtpmap:") => rtp::rtpmap(value)
            .map(Some)
            .ok_or_else(|| Error::malformed_line(line_number, line)),
        _ => Ok(None),
    }
}

/// Interprets an `a=fmtp:` line, `Ok(None)` for any other line
pub(crate) fn fmtp_line(line_number: usize, line: &str) -> Result<Option<Fmtp>> {
    match line.strip_prefix("a=") {
        Some(value) if value.starts_with("fmtp:") => rtp::fmtp(value)
            .map(Some)
            .ok_or_else(|| Error::malformed_line(line_number, line)),
        _ => Ok(None),
    }
}

/// Interprets an `m=` line
pub(crate) fn media_line(line_number: usize, line: &str) -> Result<MediaLine> {
    line.strip_prefix("m=")
        .and_then(session::media_line)
        .ok_or_else(|| Error::malformed_line(line_number, line))
}

/// Interprets an `a=mid:` line, `Ok(None)` for any other line
pub(crate) fn mid_line(line_number: usize, line: &str) -> Result<Option<String>> {
    match line.strip_prefix("a=mid:") {
        Some("") => Err(Error::missing_field(line_number, "mid")),
        Some(mid) => Ok(Some(mid.trim_end().to_string())),
        None => Ok(None),
    }
}
