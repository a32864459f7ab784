//! ICE, DTLS, bundling and data channel attributes

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::one_of,
    combinator::{opt, rest},
    sequence::{pair, preceded},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::{full, is_word_char, non_empty, non_space0, number, sp, word0};
use super::SdpLine;

value_record!(
    /// DTLS role (`a=setup:actpass`)
    Setup(String), 'a', "setup:"
);
value_record!(ConnectionType(String), 'a', "connection:");
value_record!(
    /// Media stream identification tag
    Mid(String), 'a', "mid:"
);
value_record!(Msid(String), 'a', "msid:");
value_record!(IceUfrag(String), 'a', "ice-ufrag:");
value_record!(IcePwd(String), 'a', "ice-pwd:");
value_record!(RemoteCandidates(String), 'a', "remote-candidates:");
value_record!(
    /// ICE options, a space separated list such as `trickle renomination`
    IceOptions(String), 'a', "ice-options:"
);
value_record!(XGoogleFlag(String), 'a', "x-google-flag:");
value_record!(Label(String), 'a', "label:");
value_record!(SctpPort(u16), 'a', "sctp-port:");
value_record!(MaxMessageSize(u64), 'a', "max-message-size:");

flag_record!(IceLite, "ice-lite");
flag_record!(EndOfCandidates, "end-of-candidates");
flag_record!(RtcpMux, "rtcp-mux");
flag_record!(RtcpRsize, "rtcp-rsize");
flag_record!(BundleOnly, "bundle-only");

impl IceOptions {
    /// Iterates over the individual option tags
    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }
}

/// DTLS certificate fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub hash_type: String,
    pub hash: String,
}

impl SdpLine for Fingerprint {}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fingerprint:{} {}", self.hash_type, self.hash)
    }
}

/// ICE candidate (`a=candidate:`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub foundation: String,
    pub component: u32,
    pub transport: String,
    pub priority: u64,
    pub ip: String,
    pub port: u16,
    /// host, srflx, prflx or relay
    pub candidate_type: String,
    pub raddr: Option<String>,
    pub rport: Option<u16>,
    pub tcptype: Option<String>,
    pub generation: Option<u32>,
    pub ufrag: Option<String>,
    pub network_id: Option<u32>,
    pub network_cost: Option<u32>,
}

impl SdpLine for Candidate {}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "candidate:{} {} {} {} {} {} typ {}",
            self.foundation,
            self.component,
            self.transport,
            self.priority,
            self.ip,
            self.port,
            self.candidate_type
        )?;
        if let Some(rport) = self.rport {
            write!(
                f,
                " raddr {} rport {}",
                self.raddr.as_deref().unwrap_or_default(),
                rport
            )?;
        }
        if let Some(tcptype) = &self.tcptype {
            write!(f, " tcptype {}", tcptype)?;
        }
        if let Some(generation) = self.generation {
            write!(f, " generation {}", generation)?;
        }
        if let Some(ufrag) = &self.ufrag {
            write!(f, " ufrag {}", ufrag)?;
        }
        if let Some(network_id) = self.network_id {
            write!(f, " network-id {}", network_id)?;
        }
        if let Some(network_cost) = self.network_cost {
            write!(f, " network-cost {}", network_cost)?;
        }
        Ok(())
    }
}

/// WebRTC media stream semantic (`a=msid-semantic: WMS *`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsidSemantic {
    pub semantic: String,
    pub token: Option<String>,
}

impl SdpLine for MsidSemantic {}

impl fmt::Display for MsidSemantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msid-semantic: {}", self.semantic)?;
        if let Some(token) = &self.token {
            write!(f, " {}", token)?;
        }
        Ok(())
    }
}

/// Media grouping (`a=group:BUNDLE 0 1`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub group_type: String,
    pub mids: Vec<String>,
}

impl SdpLine for Group {}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group:{} {}", self.group_type, self.mids.join(" "))
    }
}

/// Legacy SCTP association mapping (`a=sctpmap:5000 webrtc-datachannel 1024`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sctpmap {
    pub number: String,
    pub app: String,
    pub max_message_size: Option<String>,
}

impl SdpLine for Sctpmap {}

impl fmt::Display for Sctpmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sctpmap:{} {}", self.number, self.app)?;
        if let Some(max_message_size) = &self.max_message_size {
            write!(f, " {}", max_message_size)?;
        }
        Ok(())
    }
}

fn prefixed_token<'a>(prefix: &'static str, value: &'a str) -> Option<&'a str> {
    full(preceded(tag(prefix), non_space0), value)
}

pub(crate) fn setup(value: &str) -> Option<Setup> {
    full(preceded(tag("setup:"), word0), value).map(|role| Setup(role.to_string()))
}

pub(crate) fn connection_type(value: &str) -> Option<ConnectionType> {
    full(
        preceded(tag("connection:"), alt((tag("new"), tag("existing")))),
        value,
    )
    .map(|kind| ConnectionType(kind.to_string()))
}

/// Matches a `mid:` attribute value
pub fn mid(value: &str) -> Option<Mid> {
    prefixed_token("mid:", value).map(|mid| Mid(mid.to_string()))
}

pub(crate) fn msid(value: &str) -> Option<Msid> {
    value.strip_prefix("msid:").map(|id| Msid(id.to_string()))
}

pub(crate) fn ice_ufrag(value: &str) -> Option<IceUfrag> {
    prefixed_token("ice-ufrag:", value).map(|ufrag| IceUfrag(ufrag.to_string()))
}

pub(crate) fn ice_pwd(value: &str) -> Option<IcePwd> {
    prefixed_token("ice-pwd:", value).map(|pwd| IcePwd(pwd.to_string()))
}

fn fingerprint_fields(input: &str) -> IResult<&str, Fingerprint> {
    let (input, _) = tag("fingerprint:")(input)?;
    let (input, hash_type) = non_space0(input)?;
    let (input, _) = sp(input)?;
    let (input, hash) = non_space0(input)?;
    Ok((
        input,
        Fingerprint {
            hash_type: hash_type.to_string(),
            hash: hash.to_string(),
        },
    ))
}

pub(crate) fn fingerprint(value: &str) -> Option<Fingerprint> {
    full(fingerprint_fields, value)
}

fn candidate_fields(input: &str) -> IResult<&str, Candidate> {
    let (input, _) = tag("candidate:")(input)?;
    let (input, foundation) = non_space0(input)?;
    let (input, _) = sp(input)?;
    let (input, component) = number(input)?;
    let (input, _) = sp(input)?;
    let (input, transport) = non_space0(input)?;
    let (input, _) = sp(input)?;
    let (input, priority) = number(input)?;
    let (input, _) = sp(input)?;
    let (input, ip) = non_space0(input)?;
    let (input, _) = sp(input)?;
    let (input, port) = number(input)?;
    let (input, _) = tag(" typ ")(input)?;
    let (input, candidate_type) = non_space0(input)?;
    let (input, related) = opt(pair(
        preceded(tag(" raddr "), non_space0),
        preceded(tag(" rport "), number),
    ))(input)?;
    let (input, tcptype) = opt(preceded(tag(" tcptype "), non_space0))(input)?;
    let (input, generation) = opt(preceded(tag(" generation "), number))(input)?;
    let (input, ufrag) = opt(preceded(tag(" ufrag "), non_space0))(input)?;
    let (input, network_id) = opt(preceded(tag(" network-id "), number))(input)?;
    let (input, network_cost) = opt(preceded(tag(" network-cost "), number))(input)?;

    Ok((
        input,
        Candidate {
            foundation: foundation.to_string(),
            component,
            transport: transport.to_string(),
            priority,
            ip: ip.to_string(),
            port,
            candidate_type: candidate_type.to_string(),
            raddr: related.and_then(|(raddr, _)| non_empty(raddr)),
            rport: related.map(|(_, rport)| rport),
            tcptype: tcptype.and_then(non_empty),
            generation,
            ufrag: ufrag.and_then(non_empty),
            network_id,
            network_cost,
        },
    ))
}

/// Matches a `candidate:` attribute value
pub fn candidate(value: &str) -> Option<Candidate> {
    full(candidate_fields, value)
}

pub(crate) fn remote_candidates(value: &str) -> Option<RemoteCandidates> {
    value
        .strip_prefix("remote-candidates:")
        .map(|list| RemoteCandidates(list.to_string()))
}

pub(crate) fn ice_options(value: &str) -> Option<IceOptions> {
    value
        .strip_prefix("ice-options:")
        .map(|options| IceOptions(options.to_string()))
}

fn msid_semantic_fields(input: &str) -> IResult<&str, MsidSemantic> {
    let (input, _) = tag("msid-semantic:")(input)?;
    let (input, _) = opt(one_of(" \t"))(input)?;
    let (input, semantic) = word0(input)?;
    let (input, token) = opt(preceded(sp, non_space0))(input)?;
    Ok((
        input,
        MsidSemantic {
            semantic: semantic.to_string(),
            token: token.and_then(non_empty),
        },
    ))
}

pub(crate) fn msid_semantic(value: &str) -> Option<MsidSemantic> {
    full(msid_semantic_fields, value)
}

fn group_fields(input: &str) -> IResult<&str, Group> {
    let (input, _) = tag("group:")(input)?;
    let (input, group_type) = word0(input)?;
    let (input, _) = sp(input)?;
    let (input, mids) = rest(input)?;
    Ok((
        input,
        Group {
            group_type: group_type.to_string(),
            mids: mids.split_whitespace().map(str::to_string).collect(),
        },
    ))
}

pub(crate) fn group(value: &str) -> Option<Group> {
    full(group_fields, value)
}

fn sctpmap_fields(input: &str) -> IResult<&str, Sctpmap> {
    let (input, _) = tag("sctpmap:")(input)?;
    let (input, number) = take_while(|c: char| is_word_char(c) || c == '/')(input)?;
    let (input, _) = sp(input)?;
    let (input, app) = non_space0(input)?;
    let (input, max_message_size) = opt(preceded(sp, non_space0))(input)?;
    Ok((
        input,
        Sctpmap {
            number: number.to_string(),
            app: app.to_string(),
            max_message_size: max_message_size.and_then(non_empty),
        },
    ))
}

pub(crate) fn sctpmap(value: &str) -> Option<Sctpmap> {
    full(sctpmap_fields, value)
}

pub(crate) fn x_google_flag(value: &str) -> Option<XGoogleFlag> {
    prefixed_token("x-google-flag:", value).map(|flag| XGoogleFlag(flag.to_string()))
}

pub(crate) fn label(value: &str) -> Option<Label> {
    value
        .strip_prefix("label:")
        .filter(|label| !label.is_empty())
        .map(|label| Label(label.to_string()))
}

pub(crate) fn sctp_port(value: &str) -> Option<SctpPort> {
    full(preceded(tag("sctp-port:"), number), value).map(SctpPort)
}

pub(crate) fn max_message_size(value: &str) -> Option<MaxMessageSize> {
    full(preceded(tag("max-message-size:"), number), value).map(MaxMessageSize)
}
