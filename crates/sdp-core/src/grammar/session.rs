//! Session description lines (`v=` through `m=`)

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    combinator::{opt, rest},
    sequence::preceded,
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::{full, ip_version, is_word_char, non_space0, number, sp, word0};
use super::SdpLine;

value_record!(
    /// Protocol version (`v=`)
    Version(u32), 'v', ""
);
value_record!(
    /// Session name (`s=`)
    Name(String), 's', ""
);
value_record!(
    /// Session or media title (`i=`)
    Description(String), 'i', ""
);
value_record!(Uri(String), 'u', "");
value_record!(Email(String), 'e', "");
value_record!(Phone(String), 'p', "");
value_record!(Timezones(String), 'z', "");
value_record!(Repeats(String), 'r', "");

/// Originator and session identifier (`o=`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub username: String,
    pub session_id: u64,
    pub session_version: u64,
    pub net_type: String,
    pub ip_version: u8,
    pub address: String,
}

impl SdpLine for Origin {
    const KIND: char = 'o';
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} IP{} {}",
            self.username,
            self.session_id,
            self.session_version,
            self.net_type,
            self.ip_version,
            self.address
        )
    }
}

/// Session start and stop times (`t=`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    pub start: u64,
    pub stop: u64,
}

impl SdpLine for Timing {
    const KIND: char = 't';
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.start, self.stop)
    }
}

/// Connection data (`c=`), always of network type `IN`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub ip_version: u8,
    pub address: String,
}

impl SdpLine for Connection {
    const KIND: char = 'c';
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IN IP{} {}", self.ip_version, self.address)
    }
}

/// Bandwidth limit (`b=`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bandwidth {
    /// One of `TIAS`, `AS`, `CT`, `RR`, `RS`
    pub bw_type: String,
    pub limit: u64,
}

impl SdpLine for Bandwidth {
    const KIND: char = 'b';
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.bw_type, self.limit)
    }
}

/// Media description header (`m=`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaLine {
    /// Media type (audio, video, application, ...)
    pub media: String,
    pub port: u16,
    pub protocol: String,
    /// Payload type tokens in preference order
    pub payloads: Vec<String>,
}

impl MediaLine {
    /// Whether `payload` is listed on this line
    pub fn has_payload(&self, payload: &str) -> bool {
        self.payloads.iter().any(|p| p == payload)
    }
}

impl SdpLine for MediaLine {
    const KIND: char = 'm';
}

impl fmt::Display for MediaLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.media, self.port, self.protocol)?;
        for payload in &self.payloads {
            write!(f, " {}", payload)?;
        }
        Ok(())
    }
}

pub(crate) fn version(value: &str) -> Option<Version> {
    full(number, value).map(Version)
}

pub(crate) fn name(value: &str) -> Option<Name> {
    Some(Name(value.to_string()))
}

pub(crate) fn description(value: &str) -> Option<Description> {
    Some(Description(value.to_string()))
}

pub(crate) fn uri(value: &str) -> Option<Uri> {
    Some(Uri(value.to_string()))
}

pub(crate) fn email(value: &str) -> Option<Email> {
    Some(Email(value.to_string()))
}

pub(crate) fn phone(value: &str) -> Option<Phone> {
    Some(Phone(value.to_string()))
}

pub(crate) fn timezones(value: &str) -> Option<Timezones> {
    Some(Timezones(value.to_string()))
}

pub(crate) fn repeats(value: &str) -> Option<Repeats> {
    Some(Repeats(value.to_string()))
}

fn origin_fields(input: &str) -> IResult<&str, Origin> {
    let (input, username) = non_space0(input)?;
    let (input, _) = sp(input)?;
    let (input, session_id) = number(input)?;
    let (input, _) = sp(input)?;
    let (input, session_version) = number(input)?;
    let (input, _) = sp(input)?;
    let (input, net_type) = non_space0(input)?;
    let (input, _) = sp(input)?;
    let (input, ip_version) = ip_version(input)?;
    let (input, _) = sp(input)?;
    let (input, address) = non_space0(input)?;

    Ok((
        input,
        Origin {
            username: username.to_string(),
            session_id,
            session_version,
            net_type: net_type.to_string(),
            ip_version,
            address: address.to_string(),
        },
    ))
}

pub(crate) fn origin(value: &str) -> Option<Origin> {
    full(origin_fields, value)
}

fn timing_fields(input: &str) -> IResult<&str, Timing> {
    let (input, start) = number(input)?;
    let (input, _) = sp(input)?;
    let (input, stop) = number(input)?;
    Ok((input, Timing { start, stop }))
}

pub(crate) fn timing(value: &str) -> Option<Timing> {
    full(timing_fields, value)
}

fn connection_fields(input: &str) -> IResult<&str, Connection> {
    let (input, _) = tag("IN ")(input)?;
    let (input, ip_version) = ip_version(input)?;
    let (input, _) = sp(input)?;
    let (input, address) = non_space0(input)?;
    Ok((
        input,
        Connection {
            ip_version,
            address: address.to_string(),
        },
    ))
}

pub(crate) fn connection(value: &str) -> Option<Connection> {
    full(connection_fields, value)
}

fn bandwidth_fields(input: &str) -> IResult<&str, Bandwidth> {
    let (input, bw_type) = alt((tag("TIAS"), tag("AS"), tag("CT"), tag("RR"), tag("RS")))(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, limit) = number(input)?;
    Ok((
        input,
        Bandwidth {
            bw_type: bw_type.to_string(),
            limit,
        },
    ))
}

pub(crate) fn bandwidth(value: &str) -> Option<Bandwidth> {
    full(bandwidth_fields, value)
}

fn media_line_fields(input: &str) -> IResult<&str, MediaLine> {
    let (input, media) = word0(input)?;
    let (input, _) = sp(input)?;
    let (input, port) = number(input)?;
    let (input, _) = sp(input)?;
    let (input, protocol) = take_while(|c: char| is_word_char(c) || c == '/')(input)?;
    let (input, formats) = opt(preceded(sp, rest))(input)?;

    Ok((
        input,
        MediaLine {
            media: media.to_string(),
            port,
            protocol: protocol.to_string(),
            payloads: formats
                .map(|f| f.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        },
    ))
}

/// Matches an `m=` line value
pub fn media_line(value: &str) -> Option<MediaLine> {
    full(media_line_fields, value)
}
