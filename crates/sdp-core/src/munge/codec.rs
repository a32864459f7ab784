//! Codec and feature preferences for local offers
//!
//! - DTX: `useinbandfec=1` becomes `useinbandfec=1;usedtx=1`
//! - RED: the red/48000 payload moves ahead of opus/48000 on the audio m-line
//! - VP8: the VP8/90000 payload moves ahead of H264/90000 on the video m-line
//!
//! Only the first matching line of each kind is considered. A transform whose
//! target lines are missing is skipped, and a transform whose m-line cannot be
//! read fails on its own without holding back the others.

use tracing::{debug, trace, warn};

use super::{media_line, raw_lines, rtpmap_line, RawLine};
use crate::config::MungeConfig;
use crate::error::{Error, Result};
use crate::grammar::MediaLine;

const INBAND_FEC: &str = "useinbandfec=1";
const DTX: &str = "usedtx=1";

/// Replacement content for one line
type Rewrite = (usize, String);

/// Line index of the targets in a single offer
#[derive(Debug, Default)]
struct OfferIndex<'a> {
    red: Option<String>,
    opus: Option<String>,
    vp8: Option<String>,
    h264: Option<String>,
    audio: Option<(usize, &'a str)>,
    video: Option<(usize, &'a str)>,
    inband_fec: Option<usize>,
}

impl<'a> OfferIndex<'a> {
    fn build(lines: &[RawLine<'a>]) -> Self {
        let mut index = OfferIndex::default();

        for (i, line) in lines.iter().enumerate() {
            let content = line.content;

            if content.starts_with("a=rtpmap:") {
                // Codecs the grammar cannot read are never targets
                let Ok(Some(rtp)) = rtpmap_line(i + 1, content) else {
                    trace!(line = i + 1, "skipping unreadable rtpmap");
                    continue;
                };
                let slot = if rtp.is("red", 48000) {
                    &mut index.red
                } else if rtp.is("opus", 48000) {
                    &mut index.opus
                } else if rtp.is("VP8", 90000) {
                    &mut index.vp8
                } else if rtp.is("H264", 90000) {
                    &mut index.h264
                } else {
                    continue;
                };
                if slot.is_none() {
                    *slot = Some(rtp.payload);
                }
            } else if content.starts_with("m=audio") && index.audio.is_none() {
                index.audio = Some((i, content));
            } else if content.starts_with("m=video") && index.video.is_none() {
                index.video = Some((i, content));
            } else if index.inband_fec.is_none() && content.contains(INBAND_FEC) {
                index.inband_fec = Some(i);
            }
        }

        index
    }
}

/// Moves `preferred` to the front of `mline`'s payloads if `other` currently
/// precedes it. Returns whether the list changed.
fn prefer_payload(mline: &mut MediaLine, preferred: &str, other: &str) -> bool {
    let position = |token: &str| mline.payloads.iter().position(|p| p == token);
    match (position(preferred), position(other)) {
        (Some(preferred_at), Some(other_at)) if other_at < preferred_at => {
            let token = mline.payloads.remove(preferred_at);
            mline.payloads.insert(0, token);
            true
        }
        _ => false,
    }
}

fn dtx(lines: &[RawLine<'_>], index: &OfferIndex<'_>) -> Option<Rewrite> {
    let i = index.inband_fec?;
    let content = lines[i].content;
    if content.contains(DTX) {
        return None;
    }
    debug!(line = i + 1, "enabling opus DTX");
    let replacement = format!("{};{}", INBAND_FEC, DTX);
    Some((i, content.replacen(INBAND_FEC, &replacement, 1)))
}

/// Reorders the payloads of `target` so `preferred` leads `other`
fn reorder(
    target: Option<(usize, &str)>,
    preferred: Option<&str>,
    other: Option<&str>,
) -> Result<Option<Rewrite>> {
    let (Some((i, content)), Some(preferred), Some(other)) = (target, preferred, other) else {
        return Ok(None);
    };
    let mut mline = media_line(i + 1, content)?;
    if !prefer_payload(&mut mline, preferred, other) {
        return Ok(None);
    }
    debug!(line = i + 1, payload = preferred, "preferring payload over {}", other);
    Ok(Some((i, format!("m={}", mline))))
}

/// Rewrites `sdp`, handing each failed transform to `on_error`
///
/// `on_error` decides between aborting (returning the error) and skipping the
/// transform (returning `Ok`).
fn mangle_with(
    sdp: &str,
    config: &MungeConfig,
    mut on_error: impl FnMut(Error) -> Result<()>,
) -> Result<String> {
    let lines = raw_lines(sdp);
    let index = OfferIndex::build(&lines);

    let mut planned: Vec<Result<Option<Rewrite>>> = Vec::new();
    if config.enable_dtx {
        planned.push(Ok(dtx(&lines, &index)));
    }
    if config.enable_red {
        planned.push(reorder(index.audio, index.red.as_deref(), index.opus.as_deref()));
    }
    if config.enable_vp8 {
        planned.push(reorder(index.video, index.vp8.as_deref(), index.h264.as_deref()));
    }

    let mut rewritten: Vec<Rewrite> = Vec::new();
    for rewrite in planned {
        match rewrite {
            Ok(Some(rewrite)) => rewritten.push(rewrite),
            Ok(None) => {}
            Err(e) => on_error(e)?,
        }
    }

    if rewritten.is_empty() {
        return Ok(sdp.to_string());
    }

    let mut out = String::with_capacity(sdp.len() + 16);
    for (i, line) in lines.iter().enumerate() {
        match rewritten.iter().find(|(at, _)| *at == i) {
            Some((_, content)) => out.push_str(content),
            None => out.push_str(line.content),
        }
        out.push_str(line.terminator);
    }
    Ok(out)
}

/// Rewrites an offer according to `config`
///
/// Lines that are not rewritten are copied unchanged with their original
/// terminators. `a=rtpmap:` lines the grammar cannot read are ignored.
///
/// # Errors
///
/// Returns [`Error::MalformedLine`] when a reorder applies to an audio or
/// video `m=` line that does not follow the grammar.
pub fn try_mangle_offer(sdp: &str, config: &MungeConfig) -> Result<String> {
    mangle_with(sdp, config, Err)
}

/// Rewrites an offer according to `config`
///
/// A transform that cannot be applied is logged and skipped, the others still
/// run. The input is returned unchanged if nothing applies.
pub fn mangle_offer(sdp: &str, config: &MungeConfig) -> String {
    let skip = |e: Error| -> Result<()> {
        warn!(error = %e, "offer transform skipped");
        Ok(())
    };
    match mangle_with(sdp, config, skip) {
        Ok(mangled) => mangled,
        Err(e) => {
            warn!(error = %e, "offer munging failed, using original SDP");
            sdp.to_string()
        }
    }
}
