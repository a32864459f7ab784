//! RTP payload, feedback, header extension and stream attributes

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, one_of, space0, space1},
    combinator::{opt, peek, recognize, rest, verify},
    multi::separated_list1,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::{
    dashed_word0, full, ip_version, is_token_char, is_word_char, non_empty, non_space0, non_space1, number, sp,
    word0, word1,
};
use super::SdpLine;

const ENCRYPT_URI: &str = "urn:ietf:params:rtp-hdrext:encrypt";

value_record!(
    /// Media control URL (`a=control:`)
    Control(String), 'a', "control:"
);
value_record!(
    /// Packet time in milliseconds, may carry decimals
    Ptime(String), 'a', "ptime:"
);
value_record!(MaxPtime(String), 'a', "maxptime:");
value_record!(Framerate(String), 'a', "framerate:");
value_record!(
    /// Draft-03 simulcast form, kept as a single value
    Simulcast03(String), 'a', "simulcast: "
);
flag_record!(
    /// `a=extmap-allow-mixed`
    ExtmapAllowMixed, "extmap-allow-mixed"
);

/// Payload type to codec binding (`a=rtpmap:`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtpMap {
    pub payload: String,
    pub codec: String,
    pub rate: Option<u32>,
    /// Encoding parameters, the channel count for audio
    pub encoding: Option<String>,
}

impl RtpMap {
    /// Whether this entry names `codec` at `rate`, ignoring codec case
    pub fn is(&self, codec: &str, rate: u32) -> bool {
        self.codec.eq_ignore_ascii_case(codec) && self.rate == Some(rate)
    }
}

impl SdpLine for RtpMap {}

impl fmt::Display for RtpMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rtpmap:{} {}", self.payload, self.codec)?;
        if self.rate.is_some() || self.encoding.is_some() {
            f.write_str("/")?;
            if let Some(rate) = self.rate {
                write!(f, "{}", rate)?;
            }
        }
        if let Some(encoding) = &self.encoding {
            write!(f, "/{}", encoding)?;
        }
        Ok(())
    }
}

/// Format parameters for a payload (`a=fmtp:`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fmtp {
    pub payload: String,
    pub config: String,
}

impl SdpLine for Fmtp {}

impl fmt::Display for Fmtp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fmtp:{} {}", self.payload, self.config)
    }
}

/// RTCP port and optional address (`a=rtcp:`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rtcp {
    pub port: u16,
    pub net_type: Option<String>,
    pub ip_version: Option<u8>,
    pub address: Option<String>,
}

impl SdpLine for Rtcp {}

impl fmt::Display for Rtcp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rtcp:{}", self.port)?;
        if let Some(ip_version) = self.ip_version {
            write!(
                f,
                " {} IP{} {}",
                self.net_type.as_deref().unwrap_or_default(),
                ip_version,
                self.address.as_deref().unwrap_or_default()
            )?;
        }
        Ok(())
    }
}

/// Regular RTCP report interval feedback (`a=rtcp-fb:<pt> trr-int <ms>`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtcpFbTrrInt {
    /// Payload type or `*`
    pub payload: String,
    pub value: u64,
}

impl SdpLine for RtcpFbTrrInt {}

impl fmt::Display for RtcpFbTrrInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rtcp-fb:{} trr-int {}", self.payload, self.value)
    }
}

/// RTCP feedback capability (`a=rtcp-fb:`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtcpFb {
    /// Payload type or `*`
    pub payload: String,
    pub fb_type: String,
    pub subtype: Option<String>,
}

impl SdpLine for RtcpFb {}

impl fmt::Display for RtcpFb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rtcp-fb:{} {}", self.payload, self.fb_type)?;
        if let Some(subtype) = &self.subtype {
            write!(f, " {}", subtype)?;
        }
        Ok(())
    }
}

/// RTP header extension mapping (`a=extmap:`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ext {
    pub value: u16,
    pub direction: Option<String>,
    pub encrypt_uri: Option<String>,
    pub uri: String,
    pub config: Option<String>,
}

impl SdpLine for Ext {}

impl fmt::Display for Ext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "extmap:{}", self.value)?;
        if let Some(direction) = &self.direction {
            write!(f, "/{}", direction)?;
        }
        if let Some(encrypt_uri) = &self.encrypt_uri {
            write!(f, " {}", encrypt_uri)?;
        }
        write!(f, " {}", self.uri)?;
        if let Some(config) = &self.config {
            write!(f, " {}", config)?;
        }
        Ok(())
    }
}

/// SDES crypto suite (`a=crypto:`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crypto {
    pub id: u32,
    pub suite: String,
    pub config: String,
    pub session_config: Option<String>,
}

impl SdpLine for Crypto {}

impl fmt::Display for Crypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "crypto:{} {} {}", self.id, self.suite, self.config)?;
        if let Some(session_config) = &self.session_config {
            write!(f, " {}", session_config)?;
        }
        Ok(())
    }
}

/// Media direction attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    SendRecv,
    RecvOnly,
    SendOnly,
    Inactive,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::SendRecv => "sendrecv",
            Direction::RecvOnly => "recvonly",
            Direction::SendOnly => "sendonly",
            Direction::Inactive => "inactive",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "sendrecv" => Some(Direction::SendRecv),
            "recvonly" => Some(Direction::RecvOnly),
            "sendonly" => Some(Direction::SendOnly),
            "inactive" => Some(Direction::Inactive),
            _ => None,
        }
    }
}

impl SdpLine for Direction {}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source attribute (`a=ssrc:<id> <attribute>[:<value>]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ssrc {
    pub id: String,
    pub attribute: Option<String>,
    pub value: Option<String>,
}

impl SdpLine for Ssrc {}

impl fmt::Display for Ssrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ssrc:{}", self.id)?;
        if self.attribute.is_some() || self.value.is_some() {
            write!(f, " {}", self.attribute.as_deref().unwrap_or_default())?;
            if let Some(value) = &self.value {
                write!(f, ":{}", value)?;
            }
        }
        Ok(())
    }
}

/// Source grouping (`a=ssrc-group:FID 1 2`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsrcGroup {
    pub semantics: String,
    pub ssrcs: Vec<String>,
}

impl SdpLine for SsrcGroup {}

impl fmt::Display for SsrcGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ssrc-group:{} {}", self.semantics, self.ssrcs.join(" "))
    }
}

/// RTP stream identifier (`a=rid:`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rid {
    pub id: String,
    pub direction: String,
    pub params: Option<String>,
}

impl SdpLine for Rid {}

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rid:{} {}", self.id, self.direction)?;
        if let Some(params) = &self.params {
            write!(f, " {}", params)?;
        }
        Ok(())
    }
}

/// Image attribute constraints (`a=imageattr:`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttr {
    /// Payload type or `*`
    pub payload: String,
    pub direction1: String,
    pub attrs1: String,
    pub direction2: Option<String>,
    pub attrs2: Option<String>,
}

impl SdpLine for ImageAttr {}

impl fmt::Display for ImageAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "imageattr:{} {} {}",
            self.payload, self.direction1, self.attrs1
        )?;
        if let (Some(direction2), Some(attrs2)) = (&self.direction2, &self.attrs2) {
            write!(f, " {} {}", direction2, attrs2)?;
        }
        Ok(())
    }
}

/// Simulcast stream description (`a=simulcast:send hi;lo recv x`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulcast {
    pub direction1: String,
    pub list1: String,
    pub direction2: Option<String>,
    pub list2: Option<String>,
}

impl SdpLine for Simulcast {}

impl fmt::Display for Simulcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "simulcast:{} {}", self.direction1, self.list1)?;
        if let (Some(direction2), Some(list2)) = (&self.direction2, &self.list2) {
            write!(f, " {} {}", direction2, list2)?;
        }
        Ok(())
    }
}

fn payload_or_star(input: &str) -> IResult<&str, &str> {
    alt((tag("*"), digit0))(input)
}

fn rtpmap_fields(input: &str) -> IResult<&str, RtpMap> {
    let (input, _) = tag("rtpmap:")(input)?;
    let (input, payload) = digit1(input)?;
    let (input, _) = sp(input)?;
    let (input, codec) = take_while(is_token_char)(input)?;
    // A rate that does not fit u32 fails the match instead of being dropped
    let (input, clock) = opt(tuple((
        preceded(pair(space0, char('/')), opt(number::<u32>)),
        opt(preceded(pair(space0, char('/')), non_space0)),
    )))(input)?;

    let (rate, encoding) = match clock {
        Some((rate, encoding)) => (rate, encoding.and_then(non_empty)),
        None => (None, None),
    };

    Ok((
        input,
        RtpMap {
            payload: payload.to_string(),
            codec: codec.to_string(),
            rate,
            encoding,
        },
    ))
}

/// Matches an `rtpmap:` attribute value
pub fn rtpmap(value: &str) -> Option<RtpMap> {
    full(rtpmap_fields, value)
}

fn fmtp_fields(input: &str) -> IResult<&str, Fmtp> {
    let (input, _) = tag("fmtp:")(input)?;
    let (input, payload) = digit1(input)?;
    let (input, _) = sp(input)?;
    let (input, config) = rest(input)?;
    Ok((
        input,
        Fmtp {
            payload: payload.to_string(),
            config: config.to_string(),
        },
    ))
}

/// Matches an `fmtp:` attribute value
pub fn fmtp(value: &str) -> Option<Fmtp> {
    full(fmtp_fields, value)
}

pub(crate) fn control(value: &str) -> Option<Control> {
    value
        .strip_prefix("control:")
        .map(|url| Control(url.to_string()))
}

fn rtcp_fields(input: &str) -> IResult<&str, Rtcp> {
    let (input, _) = tag("rtcp:")(input)?;
    let (input, port) = number(input)?;
    let (input, address) = opt(tuple((
        preceded(sp, non_space0),
        preceded(sp, ip_version),
        preceded(sp, non_space0),
    )))(input)?;

    let (net_type, ip_version, address) = match address {
        Some((net_type, ip_version, address)) => {
            (non_empty(net_type), Some(ip_version), non_empty(address))
        }
        None => (None, None, None),
    };

    Ok((
        input,
        Rtcp {
            port,
            net_type,
            ip_version,
            address,
        },
    ))
}

pub(crate) fn rtcp(value: &str) -> Option<Rtcp> {
    full(rtcp_fields, value)
}

fn rtcp_fb_trr_int_fields(input: &str) -> IResult<&str, RtcpFbTrrInt> {
    let (input, _) = tag("rtcp-fb:")(input)?;
    let (input, payload) = payload_or_star(input)?;
    let (input, _) = tag(" trr-int ")(input)?;
    let (input, value) = number(input)?;
    Ok((
        input,
        RtcpFbTrrInt {
            payload: payload.to_string(),
            value,
        },
    ))
}

pub(crate) fn rtcp_fb_trr_int(value: &str) -> Option<RtcpFbTrrInt> {
    full(rtcp_fb_trr_int_fields, value)
}

fn rtcp_fb_fields(input: &str) -> IResult<&str, RtcpFb> {
    let (input, _) = tag("rtcp-fb:")(input)?;
    let (input, payload) = payload_or_star(input)?;
    let (input, _) = sp(input)?;
    let (input, fb_type) = dashed_word0(input)?;
    let (input, subtype) = opt(preceded(sp, dashed_word0))(input)?;
    Ok((
        input,
        RtcpFb {
            payload: payload.to_string(),
            fb_type: fb_type.to_string(),
            subtype: subtype.and_then(non_empty),
        },
    ))
}

pub(crate) fn rtcp_fb(value: &str) -> Option<RtcpFb> {
    full(rtcp_fb_fields, value)
}

fn extmap_fields(input: &str) -> IResult<&str, Ext> {
    let (input, _) = tag("extmap:")(input)?;
    let (input, value) = number(input)?;
    let (input, direction) = opt(preceded(char('/'), word1))(input)?;
    // The encrypt URI only counts when another URI follows it
    let (input, encrypt_uri) = opt(terminated(preceded(sp, tag(ENCRYPT_URI)), peek(sp)))(input)?;
    let (input, _) = sp(input)?;
    let (input, uri) = non_space0(input)?;
    let (input, config) = opt(preceded(sp, non_space0))(input)?;

    Ok((
        input,
        Ext {
            value,
            direction: direction.map(str::to_string),
            encrypt_uri: encrypt_uri.map(str::to_string),
            uri: uri.to_string(),
            config: config.and_then(non_empty),
        },
    ))
}

/// Matches an `extmap:` attribute value
pub fn extmap(value: &str) -> Option<Ext> {
    full(extmap_fields, value)
}

fn crypto_fields(input: &str) -> IResult<&str, Crypto> {
    let (input, _) = tag("crypto:")(input)?;
    let (input, id) = number(input)?;
    let (input, _) = sp(input)?;
    let (input, suite) = word0(input)?;
    let (input, _) = sp(input)?;
    let (input, config) = non_space0(input)?;
    let (input, session_config) = opt(preceded(sp, non_space0))(input)?;
    Ok((
        input,
        Crypto {
            id,
            suite: suite.to_string(),
            config: config.to_string(),
            session_config: session_config.and_then(non_empty),
        },
    ))
}

pub(crate) fn crypto(value: &str) -> Option<Crypto> {
    full(crypto_fields, value)
}

fn decimal0(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_ascii_digit() || c == '.')(input)
}

pub(crate) fn ptime(value: &str) -> Option<Ptime> {
    full(preceded(tag("ptime:"), decimal0), value).map(|p| Ptime(p.to_string()))
}

pub(crate) fn maxptime(value: &str) -> Option<MaxPtime> {
    full(preceded(tag("maxptime:"), decimal0), value).map(|p| MaxPtime(p.to_string()))
}

fn ssrc_fields(input: &str) -> IResult<&str, Ssrc> {
    let (input, _) = tag("ssrc:")(input)?;
    let (input, id) = digit1(input)?;
    let (input, attribute) = opt(preceded(
        sp,
        pair(dashed_word0, opt(preceded(char(':'), rest))),
    ))(input)?;

    let (attribute, value) = match attribute {
        Some((attribute, value)) => (non_empty(attribute), value.and_then(non_empty)),
        None => (None, None),
    };

    Ok((
        input,
        Ssrc {
            id: id.to_string(),
            attribute,
            value,
        },
    ))
}

/// Matches an `ssrc:` attribute value
pub fn ssrc(value: &str) -> Option<Ssrc> {
    full(ssrc_fields, value)
}

fn ssrc_group_fields(input: &str) -> IResult<&str, SsrcGroup> {
    let (input, _) = tag("ssrc-group:")(input)?;
    let (input, semantics) =
        take_while(|c: char| is_word_char(c) || "!#$%&'*+-.".contains(c))(input)?;
    let (input, _) = sp(input)?;
    let (input, ssrcs) = rest(input)?;
    Ok((
        input,
        SsrcGroup {
            semantics: semantics.to_string(),
            ssrcs: ssrcs.split_whitespace().map(str::to_string).collect(),
        },
    ))
}

pub(crate) fn ssrc_group(value: &str) -> Option<SsrcGroup> {
    full(ssrc_group_fields, value)
}

fn rid_fields(input: &str) -> IResult<&str, Rid> {
    let (input, _) = tag("rid:")(input)?;
    let (input, id) = word1(input)?;
    let (input, _) = sp(input)?;
    let (input, direction) = word1(input)?;
    let (input, params) = opt(preceded(sp, rest))(input)?;
    Ok((
        input,
        Rid {
            id: id.to_string(),
            direction: direction.to_string(),
            params: params.and_then(non_empty),
        },
    ))
}

pub(crate) fn rid(value: &str) -> Option<Rid> {
    full(rid_fields, value)
}

fn send_or_recv(input: &str) -> IResult<&str, &str> {
    alt((tag("send"), tag("recv")))(input)
}

fn image_attr_set(input: &str) -> IResult<&str, &str> {
    let bracketed = verify(non_space1, |token: &str| {
        token.len() >= 2 && token.starts_with('[') && token.ends_with(']')
    });
    alt((tag("*"), recognize(separated_list1(space1, bracketed))))(input)
}

fn imageattr_fields(input: &str) -> IResult<&str, ImageAttr> {
    let (input, _) = tag("imageattr:")(input)?;
    let (input, payload) = alt((digit1, tag("*")))(input)?;
    let (input, _) = space1(input)?;
    let (input, direction1) = send_or_recv(input)?;
    let (input, _) = space1(input)?;
    let (input, attrs1) = image_attr_set(input)?;
    let (input, second) = opt(tuple((
        preceded(space1, send_or_recv),
        preceded(space1, image_attr_set),
    )))(input)?;

    Ok((
        input,
        ImageAttr {
            payload: payload.to_string(),
            direction1: direction1.to_string(),
            attrs1: attrs1.to_string(),
            direction2: second.map(|(direction, _)| direction.to_string()),
            attrs2: second.map(|(_, attrs)| attrs.to_string()),
        },
    ))
}

pub(crate) fn imageattr(value: &str) -> Option<ImageAttr> {
    full(imageattr_fields, value)
}

fn simulcast_list(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || "-_~;,".contains(c))(input)
}

fn simulcast_fields(input: &str) -> IResult<&str, Simulcast> {
    let (input, _) = tag("simulcast:")(input)?;
    let (input, direction1) = send_or_recv(input)?;
    let (input, _) = sp(input)?;
    let (input, list1) = simulcast_list(input)?;
    let (input, second) = opt(tuple((
        preceded(opt(one_of(" \t")), send_or_recv),
        preceded(sp, simulcast_list),
    )))(input)?;

    Ok((
        input,
        Simulcast {
            direction1: direction1.to_string(),
            list1: list1.to_string(),
            direction2: second.map(|(direction, _)| direction.to_string()),
            list2: second.map(|(_, list)| list.to_string()),
        },
    ))
}

pub(crate) fn simulcast(value: &str) -> Option<Simulcast> {
    full(simulcast_fields, value)
}

pub(crate) fn simulcast03(value: &str) -> Option<Simulcast03> {
    let body = value.strip_prefix("simulcast:")?;
    let trimmed = body.trim_start_matches([' ', '\t']);
    if trimmed.len() == body.len() || trimmed.is_empty() {
        return None;
    }
    Some(Simulcast03(trimmed.to_string()))
}

fn framerate_value(input: &str) -> IResult<&str, &str> {
    recognize(pair(digit1, opt(pair(char('.'), digit1))))(input)
}

pub(crate) fn framerate(value: &str) -> Option<Framerate> {
    full(preceded(tag("framerate:"), framerate_value), value).map(|f| Framerate(f.to_string()))
}
