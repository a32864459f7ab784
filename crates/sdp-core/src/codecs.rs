//! Codec discovery over raw SDP text
//!
//! These helpers answer "what can this peer send or receive" without building
//! a full [`SdpDocument`](crate::model::SdpDocument): they look only at
//! `m=`, `a=rtpmap:` and `a=fmtp:` lines.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grammar::{common::split_lines, rtp};

/// A codec offered on some media line together with its format parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableCodec {
    pub payload: u8,
    pub name: String,
    /// Clock rate in Hz, 0 when the rtpmap omits it
    pub clock_rate: u32,
    pub channels: Option<u8>,
    /// Full `a=fmtp:` line for this payload
    pub fmtp: Option<String>,
    pub params: BTreeMap<String, String>,
}

/// Parses format parameters into a key/value map
///
/// Accepts a full `a=fmtp:` line, its value (`fmtp:111 ...`) or a bare
/// parameter list (`minptime=10;useinbandfec=1`). Keys and values are trimmed,
/// and entries without `=` are skipped.
///
/// ```
/// use rvoip_sdp_core::codecs::parse_fmtp_params;
///
/// let params = parse_fmtp_params("a=fmtp:111 minptime=10;useinbandfec=1");
/// assert_eq!(params.get("useinbandfec").map(String::as_str), Some("1"));
/// ```
pub fn parse_fmtp_params(line: &str) -> BTreeMap<String, String> {
    let line = line.strip_prefix("a=").unwrap_or(line);
    let params = match line.strip_prefix("fmtp:") {
        Some(value) => match value.split_once(' ') {
            Some((_, params)) => params,
            None => return BTreeMap::new(),
        },
        None => line,
    };

    params
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Lists the codecs offered on the `m=` lines of `sdp`
///
/// Payloads are reported in order of first appearance across all media lines.
/// Payloads that are not numeric or have no rtpmap entry are skipped. When a
/// payload has several rtpmap or fmtp lines the last one wins.
pub fn available_codecs(sdp: &str) -> Vec<AvailableCodec> {
    let mut rtpmaps: HashMap<&str, rtp::RtpMap> = HashMap::new();
    let mut fmtps: HashMap<&str, &str> = HashMap::new();
    let mut offered: Vec<&str> = Vec::new();

    for line in split_lines(sdp) {
        if let Some(value) = line.strip_prefix("a=") {
            if let Some(map) = value.strip_prefix("rtpmap:") {
                if let (Some(payload), Some(rtp)) = (map.split(' ').next(), rtp::rtpmap(value)) {
                    rtpmaps.insert(payload, rtp);
                }
            } else if let Some(fmtp) = value.strip_prefix("fmtp:") {
                if let Some((payload, _)) = fmtp.split_once(' ') {
                    fmtps.insert(payload, line);
                }
            }
        } else if line.starts_with("m=") {
            for payload in line.split_whitespace().skip(3) {
                if !offered.contains(&payload) {
                    offered.push(payload);
                }
            }
        }
    }

    offered
        .into_iter()
        .filter_map(|payload| {
            let rtp = rtpmaps.get(payload)?;
            let number = payload.parse::<u8>().ok()?;
            let fmtp = fmtps.get(payload).copied();
            Some(AvailableCodec {
                payload: number,
                name: rtp.codec.clone(),
                clock_rate: rtp.rate.unwrap_or(0),
                channels: rtp.encoding.as_deref().and_then(|c| c.parse().ok()),
                fmtp: fmtp.map(str::to_string),
                params: fmtp.map(parse_fmtp_params).unwrap_or_default(),
            })
        })
        .collect()
}

/// Target bitrates per frame height for one codec
struct BitrateTable {
    codec: &'static str,
    /// `(frame height, bits per second)`, tallest first
    steps: [(u32, u32); 6],
    default: u32,
}

static BITRATE_TABLES: [BitrateTable; 4] = [
    BitrateTable {
        codec: "h264",
        steps: [
            (2160, 5_000_000),
            (1440, 3_000_000),
            (1080, 2_000_000),
            (720, 1_250_000),
            (540, 750_000),
            (360, 400_000),
        ],
        default: 1_250_000,
    },
    BitrateTable {
        codec: "vp8",
        steps: [
            (2160, 5_000_000),
            (1440, 2_750_000),
            (1080, 2_000_000),
            (720, 1_250_000),
            (540, 600_000),
            (360, 350_000),
        ],
        default: 1_250_000,
    },
    BitrateTable {
        codec: "vp9",
        steps: [
            (2160, 3_000_000),
            (1440, 2_000_000),
            (1080, 1_500_000),
            (720, 1_250_000),
            (540, 500_000),
            (360, 275_000),
        ],
        default: 1_250_000,
    },
    BitrateTable {
        codec: "av1",
        steps: [
            (2160, 2_000_000),
            (1440, 1_550_000),
            (1080, 1_000_000),
            (720, 600_000),
            (540, 350_000),
            (360, 200_000),
        ],
        default: 600_000,
    },
];

/// Target video bitrate in bits per second for `codec` at `frame_height`
///
/// An exact height match wins, otherwise the nearest listed height is used
/// (the taller one on a tie). Codec names are case-insensitive.
///
/// # Errors
///
/// Returns [`Error::UnknownCodec`] for codecs other than H264, VP8, VP9 and AV1.
pub fn optimal_bitrate(codec: &str, frame_height: u32) -> Result<u32> {
    let table = BITRATE_TABLES
        .iter()
        .find(|table| table.codec.eq_ignore_ascii_case(codec))
        .ok_or_else(|| Error::UnknownCodec(codec.to_string()))?;

    Ok(table
        .steps
        .iter()
        .min_by_key(|(height, _)| height.abs_diff(frame_height))
        .map(|(_, bitrate)| *bitrate)
        .unwrap_or(table.default))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFER: &str = "v=0\r\n\
        m=video 9 UDP/TLS/RTP/SAVPF 96 97 100\r\n\
        a=rtpmap:96 VP8/90000\r\n\
        a=rtpmap:97 rtx/90000\r\n\
        a=fmtp:97 apt=96\r\n\
        a=rtpmap:100 H264/90000\r\n\
        a=fmtp:100 level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42e01f\r\n\
        m=audio 9 UDP/TLS/RTP/SAVPF 111 96 abc 112\r\n\
        a=rtpmap:111 opus/48000/2\r\n\
        a=fmtp:111 minptime=10;useinbandfec=1\r\n";

    #[test]
    fn test_parse_fmtp_params_forms() {
        let full = parse_fmtp_params("a=fmtp:96 level-asymmetry-allowed=1; packetization-mode = 1");
        assert_eq!(full.get("level-asymmetry-allowed").map(String::as_str), Some("1"));
        assert_eq!(full.get("packetization-mode").map(String::as_str), Some("1"));

        let value = parse_fmtp_params("fmtp:63 111/111");
        assert!(value.is_empty());

        let bare = parse_fmtp_params("minptime=10;stereo=1;flag");
        assert_eq!(bare.len(), 2);
        assert_eq!(bare.get("stereo").map(String::as_str), Some("1"));

        assert!(parse_fmtp_params("a=fmtp:111").is_empty());
    }

    #[test]
    fn test_available_codecs() {
        let codecs = available_codecs(OFFER);
        let names: Vec<&str> = codecs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["VP8", "rtx", "H264", "opus"]);

        let h264 = &codecs[2];
        assert_eq!(h264.payload, 100);
        assert_eq!(h264.clock_rate, 90000);
        assert_eq!(h264.channels, None);
        assert_eq!(h264.params.get("profile-level-id").map(String::as_str), Some("42e01f"));
        assert!(h264.fmtp.as_deref().unwrap_or_default().starts_with("a=fmtp:100 "));

        let opus = &codecs[3];
        assert_eq!(opus.channels, Some(2));
        assert_eq!(opus.params.get("useinbandfec").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_available_codecs_accepts_lf() {
        let codecs = available_codecs(&OFFER.replace("\r\n", "\n"));
        assert_eq!(codecs.len(), 4);
    }

    #[test]
    fn test_optimal_bitrate_exact_and_nearest() {
        assert_eq!(optimal_bitrate("h264", 720), Ok(1_250_000));
        assert_eq!(optimal_bitrate("VP8", 1080), Ok(2_000_000));
        assert_eq!(optimal_bitrate("av1", 360), Ok(200_000));
        // 480 is nearest to 540
        assert_eq!(optimal_bitrate("vp9", 480), Ok(500_000));
        // Equidistant from 1080 and 720
        assert_eq!(optimal_bitrate("h264", 900), Ok(2_000_000));
        assert_eq!(optimal_bitrate("vp8", 4320), Ok(5_000_000));
        assert_eq!(optimal_bitrate("av1", 0), Ok(200_000));
    }

    #[test]
    fn test_optimal_bitrate_unknown_codec() {
        assert_eq!(
            optimal_bitrate("theora", 720),
            Err(Error::UnknownCodec("theora".to_string()))
        );
    }
}
