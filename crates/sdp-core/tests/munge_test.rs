//! Offer munging and stereo negotiation over browser-generated descriptions

mod common;

use common::{crlf, init_tracing, RECVONLY_OFFER, SENDONLY_AUDIO_OFFER};
use rvoip_sdp_core::{
    available_codecs, mangle, mangle_offer, negotiate_stereo, parse_sdp, try_enable_stereo,
    try_mangle_offer, MungeConfig, SessionDescription,
};

const AUDIO_MLINE: &str = "m=audio 9 UDP/TLS/RTP/SAVPF 111 63 103 104 9 102 0 8 106 105 13 110 112 113 126";
const VIDEO_MLINE: &str = "m=video 9 UDP/TLS/RTP/SAVPF 97 98 99 35 36 100 101 125 124 127 37 96";

/// Lines of `after` that differ from `before`, which must have as many lines
fn changed_lines<'a>(before: &str, after: &'a str) -> Vec<&'a str> {
    let before: Vec<&str> = before.split("\r\n").collect();
    let after: Vec<&'a str> = after.split("\r\n").collect();
    assert_eq!(before.len(), after.len());
    before
        .iter()
        .zip(after.iter())
        .filter(|(b, a)| b != a)
        .map(|(_, a)| *a)
        .collect()
}

#[test]
fn test_full_munging_of_recvonly_offer() {
    init_tracing();
    let offer = crlf(RECVONLY_OFFER);
    let mangled = mangle_offer(&offer, &MungeConfig::default());

    // Exactly the fmtp line and both media lines are rewritten
    assert_eq!(
        changed_lines(&offer, &mangled),
        vec![
            "m=video 9 UDP/TLS/RTP/SAVPF 96 97 98 99 35 36 100 101 125 124 127 37",
            "m=audio 9 UDP/TLS/RTP/SAVPF 63 111 103 104 9 102 0 8 106 105 13 110 112 113 126",
            "a=fmtp:111 minptime=10;useinbandfec=1;usedtx=1",
        ]
    );
    assert!(mangled.ends_with("telephone-event/8000\r\n"));
}

#[test]
fn test_munged_offer_still_parses_to_the_same_codecs() {
    init_tracing();
    let offer = crlf(RECVONLY_OFFER);
    let mangled = mangle_offer(&offer, &MungeConfig::default());

    let before = parse_sdp(&offer).unwrap();
    let after = parse_sdp(&mangled).unwrap();
    assert_eq!(before.media.len(), after.media.len());
    for (b, a) in before.media.iter().zip(after.media.iter()) {
        assert_eq!(b.fields.rtp, a.fields.rtp);
        let mut b_payloads = b.payloads().to_vec();
        let mut a_payloads = a.payloads().to_vec();
        b_payloads.sort();
        a_payloads.sort();
        assert_eq!(b_payloads, a_payloads);
    }
}

#[test]
fn test_munging_is_idempotent() {
    init_tracing();
    let config = MungeConfig::default();
    let once = mangle_offer(&crlf(SENDONLY_AUDIO_OFFER), &config);
    let twice = mangle_offer(&once, &config);
    assert_eq!(once, twice);
    assert_eq!(once.matches("usedtx=1").count(), 1);
}

#[test]
fn test_config_switches_transforms_off() {
    init_tracing();
    let offer = crlf(RECVONLY_OFFER);

    let audio_only = mangle_offer(&offer, &MungeConfig::audio_only());
    assert!(audio_only.contains(&format!("\r\n{}\r\n", VIDEO_MLINE)));
    assert!(!audio_only.contains(AUDIO_MLINE));

    let no_red = mangle_offer(&offer, &MungeConfig::default().with_red(false));
    assert!(no_red.contains(AUDIO_MLINE));
    assert!(no_red.contains("useinbandfec=1;usedtx=1"));

    assert_eq!(mangle_offer(&offer, &MungeConfig::disabled()), offer);
}

#[test]
fn test_lf_offer_keeps_lf_terminators() {
    init_tracing();
    let mangled = try_mangle_offer(RECVONLY_OFFER, &MungeConfig::default()).unwrap();
    assert!(!mangled.contains('\r'));
    assert_eq!(mangled.lines().count(), RECVONLY_OFFER.lines().count());
}

#[test]
fn test_only_offers_are_mangled() {
    init_tracing();
    let config = MungeConfig::default();

    let answer = SessionDescription::answer(crlf(RECVONLY_OFFER));
    assert_eq!(mangle(&answer, &config), answer);

    let offer = SessionDescription::offer(crlf(RECVONLY_OFFER));
    let mangled = mangle(&offer, &config);
    assert!(mangled.is_offer());
    assert!(mangled.description.contains("useinbandfec=1;usedtx=1"));
}

#[test]
fn test_broken_video_line_only_skips_its_own_transform() {
    init_tracing();
    let broken = VIDEO_MLINE.replace(" 9 ", " nine ");
    let offer = crlf(RECVONLY_OFFER).replace(VIDEO_MLINE, &broken);
    assert!(try_mangle_offer(&offer, &MungeConfig::default()).is_err());

    // The audio transforms still apply, the video line stays as it was
    let mangled = mangle_offer(&offer, &MungeConfig::default());
    assert_eq!(
        changed_lines(&offer, &mangled),
        vec![
            "m=audio 9 UDP/TLS/RTP/SAVPF 63 111 103 104 9 102 0 8 106 105 13 110 112 113 126",
            "a=fmtp:111 minptime=10;useinbandfec=1;usedtx=1",
        ]
    );
    assert!(mangled.contains(&format!("\r\n{}\r\n", broken)));
}

#[test]
fn test_unreadable_rtpmap_does_not_block_munging() {
    init_tracing();
    let offer = crlf(RECVONLY_OFFER).replace("a=rtpmap:96 VP8/90000", "a=rtpmap:96 VP8/90000\r\na=rtpmap:ninety-six VP8");
    let mangled = try_mangle_offer(&offer, &MungeConfig::default()).unwrap();
    assert!(mangled.contains("\r\nm=video 9 UDP/TLS/RTP/SAVPF 96 97 98 99 35 36 100 101 125 124 127 37\r\n"));
    assert!(mangled.contains("\r\na=rtpmap:ninety-six VP8\r\n"));
    assert_eq!(mangle_offer(&offer, &MungeConfig::default()), mangled);
}

#[test]
fn test_stereo_offer_is_carried_into_answer() {
    init_tracing();
    let offer = crlf(SENDONLY_AUDIO_OFFER).replace(
        "a=fmtp:111 minptime=10;useinbandfec=1",
        "a=fmtp:111 minptime=10;useinbandfec=1;stereo=1",
    );
    let answer = crlf(SENDONLY_AUDIO_OFFER).replace("a=sendonly", "a=recvonly");

    let patched = try_enable_stereo(&offer, &answer).unwrap();
    assert_eq!(
        changed_lines(&answer, &patched),
        vec!["a=fmtp:111 minptime=10;useinbandfec=1;stereo=1"]
    );

    // Already stereo, nothing left to do
    assert_eq!(try_enable_stereo(&offer, &patched).unwrap(), patched);
}

#[test]
fn test_mono_offer_leaves_answer_untouched() {
    init_tracing();
    let offer = crlf(SENDONLY_AUDIO_OFFER);
    // LF answer comes back byte-identical
    assert_eq!(try_enable_stereo(&offer, RECVONLY_OFFER).unwrap(), RECVONLY_OFFER);
}

#[test]
fn test_stereo_matches_sections_by_mid() {
    init_tracing();
    // Offer asks for stereo on mid 0, the answer's audio section is mid 1
    let offer = crlf(SENDONLY_AUDIO_OFFER).replace("useinbandfec=1", "useinbandfec=1;stereo=1");
    let answer = crlf(RECVONLY_OFFER);
    assert_eq!(try_enable_stereo(&offer, &answer).unwrap(), answer);

    let answer = answer
        .replace("a=mid:0\r\n", "a=mid:v\r\n")
        .replace("a=mid:1\r\n", "a=mid:0\r\n");
    let patched = try_enable_stereo(&offer, &answer).unwrap();
    assert!(patched.contains("a=fmtp:111 minptime=10;useinbandfec=1;stereo=1\r\n"));
}

#[test]
fn test_negotiate_stereo_respects_config_and_roles() {
    init_tracing();
    let offer = SessionDescription::offer(
        crlf(SENDONLY_AUDIO_OFFER).replace("useinbandfec=1", "useinbandfec=1;stereo=1"),
    );
    let answer = SessionDescription::answer(crlf(SENDONLY_AUDIO_OFFER));

    let patched = negotiate_stereo(&offer, &answer, &MungeConfig::default());
    assert!(!patched.is_offer());
    assert!(patched.description.contains("useinbandfec=1;stereo=1"));

    let disabled = MungeConfig::default().with_stereo(false);
    assert_eq!(negotiate_stereo(&offer, &answer, &disabled), answer);

    // Two offers are not an offer/answer pair
    let other_offer = SessionDescription::offer(answer.description.clone());
    assert_eq!(
        negotiate_stereo(&offer, &other_offer, &MungeConfig::default()),
        other_offer
    );
}

#[test]
fn test_available_codecs_of_recvonly_offer() {
    let codecs = available_codecs(&crlf(RECVONLY_OFFER));
    assert_eq!(codecs.len(), 27);

    let names: Vec<&str> = codecs.iter().take(3).map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["rtx", "VP9", "rtx"]);

    let h264 = codecs.iter().find(|c| c.name == "H264").unwrap();
    assert_eq!(h264.payload, 100);
    assert_eq!(h264.params.get("packetization-mode").map(String::as_str), Some("1"));

    let opus = codecs.iter().find(|c| c.name == "opus").unwrap();
    assert_eq!(opus.clock_rate, 48000);
    assert_eq!(opus.channels, Some(2));
    assert_eq!(opus.fmtp.as_deref(), Some("a=fmtp:111 minptime=10;useinbandfec=1"));
    assert!(codecs.iter().find(|c| c.name == "PCMU").unwrap().params.is_empty());
}
