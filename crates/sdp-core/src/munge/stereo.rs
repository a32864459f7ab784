//! Stereo Opus negotiation
//!
//! Media engines answer stereo Opus offers with mono fmtp parameters. The patch
//! finds the audio sections of the remote offer whose opus fmtp carries
//! `stereo=1` and adds the same parameter to the matching sections of the local
//! answer, correlating sections by `mid`.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::{fmtp_line, mid_line, raw_lines, rtpmap_line, RawLine};
use crate::codecs::parse_fmtp_params;
use crate::error::{Error, Result};
use crate::grammar::Fmtp;

const STEREO: &str = "stereo";

/// What one media section says about opus
#[derive(Debug, Default)]
struct AudioSection {
    mid: Option<String>,
    opus_payloads: HashSet<String>,
    /// `(line index, fmtp)` for every fmtp line of the section
    fmtps: Vec<(usize, Fmtp)>,
    /// First line of the section that could not be interpreted
    error: Option<Error>,
}

impl AudioSection {
    fn opus_fmtps(&self) -> impl Iterator<Item = &(usize, Fmtp)> {
        self.fmtps
            .iter()
            .filter(|(_, fmtp)| self.opus_payloads.contains(&fmtp.payload))
    }

    fn offers_stereo(&self) -> bool {
        self.opus_fmtps().any(|(_, fmtp)| has_stereo(&fmtp.config))
    }

    fn read(&mut self, line_number: usize, content: &str) -> Result<()> {
        if let Some(mid) = mid_line(line_number, content)? {
            self.mid = Some(mid);
        } else if let Some(rtp) = rtpmap_line(line_number, content)? {
            if rtp.codec.eq_ignore_ascii_case("opus") {
                self.opus_payloads.insert(rtp.payload);
            }
        } else if let Some(fmtp) = fmtp_line(line_number, content)? {
            self.fmtps.push((line_number - 1, fmtp));
        }
        Ok(())
    }
}

fn has_stereo(config: &str) -> bool {
    parse_fmtp_params(config)
        .get(STEREO)
        .is_some_and(|value| value == "1")
}

/// Scans the audio sections of an SDP
///
/// A section's fields are only complete at its end, so a `mid` written after
/// the fmtp line still applies. A line that cannot be interpreted marks its
/// own section only.
fn audio_sections(lines: &[RawLine<'_>]) -> Vec<AudioSection> {
    let mut sections = Vec::new();
    let mut current: Option<AudioSection> = None;

    for (i, line) in lines.iter().enumerate() {
        let content = line.content;

        if content.starts_with("m=") {
            sections.extend(current.take());
            if content.starts_with("m=audio") {
                current = Some(AudioSection::default());
            }
            continue;
        }

        let Some(section) = current.as_mut().filter(|s| s.error.is_none()) else {
            continue;
        };
        if let Err(e) = section.read(i + 1, content) {
            section.error = Some(e);
        }
    }

    sections.extend(current);
    sections
}

/// Keeps the readable sections, handing the others to `on_error`
fn readable(
    sections: Vec<AudioSection>,
    on_error: &mut impl FnMut(Error) -> Result<()>,
) -> Result<Vec<AudioSection>> {
    let mut usable = Vec::with_capacity(sections.len());
    for mut section in sections {
        match section.error.take() {
            Some(e) => on_error(e)?,
            None => usable.push(section),
        }
    }
    Ok(usable)
}

fn stereo_with(
    offer: &str,
    answer: &str,
    mut on_error: impl FnMut(Error) -> Result<()>,
) -> Result<String> {
    let stereo_mids: HashSet<String> = readable(audio_sections(&raw_lines(offer)), &mut on_error)?
        .into_iter()
        .filter(AudioSection::offers_stereo)
        .filter_map(|section| section.mid)
        .collect();

    if stereo_mids.is_empty() {
        return Ok(answer.to_string());
    }
    debug!(mids = ?stereo_mids, "offer requests stereo opus");

    let lines = raw_lines(answer);
    let mut rewritten: Vec<(usize, String)> = Vec::new();

    for section in readable(audio_sections(&lines), &mut on_error)? {
        let wanted = section
            .mid
            .as_ref()
            .is_some_and(|mid| stereo_mids.contains(mid));
        if !wanted {
            continue;
        }
        for (i, fmtp) in section.opus_fmtps() {
            if has_stereo(&fmtp.config) {
                continue;
            }
            debug!(payload = %fmtp.payload, mid = ?section.mid, "enabling stereo in answer");
            rewritten.push((*i, format!("a={}", with_stereo(fmtp))));
        }
    }

    let mut out: Vec<&str> = lines.iter().map(|line| line.content).collect();
    for (i, content) in &rewritten {
        out[*i] = content;
    }

    let mut joined = out.join("\r\n");
    if lines.last().is_some_and(|line| !line.terminator.is_empty()) {
        joined.push_str("\r\n");
    }
    Ok(joined)
}

/// Adds `stereo=1` to the answer's opus fmtp lines where the offer asked for it
///
/// The answer is returned byte-identical if no offered audio section carries
/// stereo. Otherwise its lines are rejoined with CRLF, keeping the presence of
/// a trailing terminator.
///
/// Only a `stereo=1` parameter counts as a stereo request, so `sprop-stereo=1`
/// alone does not. An explicit `stereo=0` in the answer is flipped to
/// `stereo=1` in place.
///
/// # Errors
///
/// Returns an error when an `a=mid:`, `a=rtpmap:` or `a=fmtp:` line inside an
/// audio section of either description cannot be interpreted.
pub fn try_enable_stereo(offer: &str, answer: &str) -> Result<String> {
    stereo_with(offer, answer, Err)
}

fn with_stereo(fmtp: &Fmtp) -> Fmtp {
    let config = if fmtp.config.trim().is_empty() {
        format!("{}=1", STEREO)
    } else if parse_fmtp_params(&fmtp.config).contains_key(STEREO) {
        // An explicit mono value is flipped in place
        fmtp.config
            .split(';')
            .map(|param| match param.split_once('=') {
                Some((key, _)) if key.trim() == STEREO => format!("{}=1", key),
                _ => param.to_string(),
            })
            .collect::<Vec<_>>()
            .join(";")
    } else {
        format!("{};{}=1", fmtp.config, STEREO)
    };

    Fmtp {
        payload: fmtp.payload.clone(),
        config,
    }
}

/// Propagates offered stereo into the answer
///
/// Audio sections that cannot be interpreted are logged and left as they are,
/// the remaining sections are still patched.
pub fn enable_stereo(offer: &str, answer: &str) -> String {
    let skip = |e: Error| -> Result<()> {
        warn!(error = %e, "audio section skipped for stereo");
        Ok(())
    };
    match stereo_with(offer, answer, skip) {
        Ok(patched) => patched,
        Err(e) => {
            warn!(error = %e, "stereo negotiation failed, using original answer");
            answer.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFER: &str = "v=0\r\n\
        m=audio 9 UDP/TLS/RTP/SAVPF 111\r\n\
        a=mid:0\r\n\
        a=rtpmap:111 opus/48000/2\r\n\
        a=fmtp:111 minptime=10;stereo=1\r\n";

    const ANSWER: &str = "v=0\r\n\
        m=audio 9 UDP/TLS/RTP/SAVPF 111\r\n\
        a=mid:0\r\n\
        a=rtpmap:111 opus/48000/2\r\n\
        a=fmtp:111 minptime=10\r\n";

    #[test]
    fn test_stereo_is_propagated() {
        let out = try_enable_stereo(OFFER, ANSWER).unwrap();
        assert_eq!(out, ANSWER.replace("minptime=10\r\n", "minptime=10;stereo=1\r\n"));
    }

    #[test]
    fn test_answer_untouched_without_stereo_offer() {
        let mono = OFFER.replace(";stereo=1", "");
        assert_eq!(try_enable_stereo(&mono, ANSWER).unwrap(), ANSWER);

        // LF answers stay byte-identical on the no-op path
        let lf = ANSWER.replace("\r\n", "\n");
        assert_eq!(try_enable_stereo(&mono, &lf).unwrap(), lf);
    }

    #[test]
    fn test_sprop_stereo_does_not_count() {
        let sprop = OFFER.replace(";stereo=1", ";sprop-stereo=1");
        assert_eq!(try_enable_stereo(&sprop, ANSWER).unwrap(), ANSWER);
    }

    #[test]
    fn test_mid_after_fmtp_is_honoured() {
        let offer = "m=audio 9 RTP/AVP 111\r\n\
            a=rtpmap:111 opus/48000/2\r\n\
            a=fmtp:111 stereo=1\r\n\
            a=mid:audio\r\n";
        let answer = "m=audio 9 RTP/AVP 111\r\n\
            a=fmtp:111 minptime=10\r\n\
            a=rtpmap:111 opus/48000/2\r\n\
            a=mid:audio\r\n";
        let out = try_enable_stereo(offer, answer).unwrap();
        assert!(out.contains("a=fmtp:111 minptime=10;stereo=1\r\n"));
    }

    #[test]
    fn test_sections_are_correlated_by_mid() {
        let offer = format!("{}m=audio 9 RTP/AVP 111\r\na=mid:1\r\na=rtpmap:111 opus/48000/2\r\na=fmtp:111 minptime=10\r\n", OFFER);
        let answer = "m=audio 9 RTP/AVP 111\r\na=mid:1\r\na=rtpmap:111 opus/48000/2\r\na=fmtp:111 minptime=10\r\n\
            m=audio 9 RTP/AVP 111\r\na=mid:0\r\na=rtpmap:111 opus/48000/2\r\na=fmtp:111 minptime=10\r\n";
        let out = try_enable_stereo(&offer, answer).unwrap();
        assert_eq!(
            out,
            "m=audio 9 RTP/AVP 111\r\na=mid:1\r\na=rtpmap:111 opus/48000/2\r\na=fmtp:111 minptime=10\r\n\
             m=audio 9 RTP/AVP 111\r\na=mid:0\r\na=rtpmap:111 opus/48000/2\r\na=fmtp:111 minptime=10;stereo=1\r\n"
        );
    }

    #[test]
    fn test_non_opus_fmtp_is_untouched() {
        let answer = format!("{}a=rtpmap:63 red/48000/2\r\na=fmtp:63 111/111\r\n", ANSWER);
        let out = try_enable_stereo(OFFER, &answer).unwrap();
        assert!(out.contains("a=fmtp:63 111/111\r\n"));
        assert!(out.contains("a=fmtp:111 minptime=10;stereo=1\r\n"));
    }

    #[test]
    fn test_existing_stereo_is_not_duplicated() {
        let answer = ANSWER.replace("minptime=10", "minptime=10;stereo=1");
        assert_eq!(try_enable_stereo(OFFER, &answer).unwrap(), answer);

        let mono = ANSWER.replace("minptime=10", "stereo=0;minptime=10");
        let out = try_enable_stereo(OFFER, &mono).unwrap();
        assert!(out.contains("a=fmtp:111 stereo=1;minptime=10\r\n"));
    }

    #[test]
    fn test_output_uses_crlf_and_keeps_missing_terminator() {
        let answer = ANSWER.replace("\r\n", "\n");
        let trimmed = answer.trim_end();
        let out = try_enable_stereo(OFFER, trimmed).unwrap();
        assert!(out.ends_with("a=fmtp:111 minptime=10;stereo=1"));
        assert!(out.contains("a=mid:0\r\n"));
    }

    #[test]
    fn test_failure_falls_back_to_answer() {
        let broken = format!("{}a=mid:\r\n", ANSWER);
        assert_eq!(
            try_enable_stereo(OFFER, &broken),
            Err(Error::missing_field(6, "mid"))
        );
        assert_eq!(enable_stereo(OFFER, &broken), broken);
    }

    #[test]
    fn test_unreadable_section_does_not_block_others() {
        let broken = "m=audio 9 RTP/AVP 120\r\na=mid:1\r\na=rtpmap:120 opus/4800O/2\r\n";
        let answer = format!("{}{}", ANSWER, broken);

        assert_eq!(
            try_enable_stereo(OFFER, &answer),
            Err(Error::malformed_line(8, "a=rtpmap:120 opus/4800O/2"))
        );
        let out = enable_stereo(OFFER, &answer);
        assert!(out.contains("a=fmtp:111 minptime=10;stereo=1\r\n"));
        assert!(out.ends_with(broken));
    }

    #[test]
    fn test_token_codec_names_are_read() {
        let answer = format!(
            "{}m=audio 9 RTP/AVP 120\r\na=mid:1\r\na=rtpmap:120 x+vendor/48000\r\n",
            ANSWER
        );
        let out = try_enable_stereo(OFFER, &answer).unwrap();
        assert!(out.contains("a=fmtp:111 minptime=10;stereo=1\r\n"));
    }
}
