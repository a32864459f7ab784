//! Source filters, media clocks, free-form descriptors and BFCP floor control

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::char,
    combinator::{opt, rest},
    sequence::{pair, preceded, separated_pair},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::{full, non_empty, non_space0, number, sp};
use super::SdpLine;

value_record!(Keywords(String), 'a', "keywds:");
value_record!(Content(String), 'a', "content:");
value_record!(
    /// BFCP floor control role (`c-only`, `s-only` or `c-s`)
    BfcpFloorCtrl(String), 'a', "floorctrl:"
);
value_record!(BfcpConfId(String), 'a', "confid:");
value_record!(BfcpUserId(String), 'a', "userid:");

/// Source-specific multicast filter (`a=source-filter:`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFilter {
    /// `incl` or `excl`
    pub filter_mode: String,
    pub net_type: String,
    /// `IP4`, `IP6` or `*`
    pub address_types: String,
    pub dest_address: String,
    pub src_list: String,
}

impl SdpLine for SourceFilter {}

impl fmt::Display for SourceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "source-filter: {} {} {} {} {}",
            self.filter_mode, self.net_type, self.address_types, self.dest_address, self.src_list
        )
    }
}

/// Reference clock source (`a=ts-refclk:ntp=pool.ntp.org`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TsRefClk {
    pub clksrc: String,
    pub clksrc_ext: Option<String>,
}

impl SdpLine for TsRefClk {}

impl fmt::Display for TsRefClk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ts-refclk:{}", self.clksrc)?;
        if let Some(ext) = &self.clksrc_ext {
            write!(f, "={}", ext)?;
        }
        Ok(())
    }
}

/// Media clock source (`a=mediaclk:direct=0 rate=1000/1001`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaClk {
    pub id: Option<String>,
    pub name: String,
    pub value: Option<String>,
    pub rate_numerator: Option<u32>,
    pub rate_denominator: Option<u32>,
}

impl SdpLine for MediaClk {}

impl fmt::Display for MediaClk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("mediaclk:")?;
        if let Some(id) = &self.id {
            write!(f, "id={} ", id)?;
        }
        f.write_str(&self.name)?;
        if let Some(value) = &self.value {
            write!(f, "={}", value)?;
        }
        if let (Some(numerator), Some(denominator)) = (self.rate_numerator, self.rate_denominator) {
            write!(f, " rate={}/{}", numerator, denominator)?;
        }
        Ok(())
    }
}

/// BFCP floor to media stream binding (`a=floorid:1 mstrm:10`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BfcpFloorId {
    pub id: String,
    pub m_stream: String,
}

impl SdpLine for BfcpFloorId {}

impl fmt::Display for BfcpFloorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "floorid:{} mstrm:{}", self.id, self.m_stream)
    }
}

fn spaces0(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c == ' ')(input)
}

fn source_filter_fields(input: &str) -> IResult<&str, SourceFilter> {
    let (input, _) = tag("source-filter:")(input)?;
    let (input, _) = spaces0(input)?;
    let (input, filter_mode) = alt((tag("excl"), tag("incl")))(input)?;
    let (input, _) = sp(input)?;
    let (input, net_type) = non_space0(input)?;
    let (input, _) = sp(input)?;
    let (input, address_types) = alt((tag("IP4"), tag("IP6"), tag("*")))(input)?;
    let (input, _) = sp(input)?;
    let (input, dest_address) = non_space0(input)?;
    let (input, _) = sp(input)?;
    let (input, src_list) = rest(input)?;

    Ok((
        input,
        SourceFilter {
            filter_mode: filter_mode.to_string(),
            net_type: net_type.to_string(),
            address_types: address_types.to_string(),
            dest_address: dest_address.to_string(),
            src_list: src_list.to_string(),
        },
    ))
}

pub(crate) fn source_filter(value: &str) -> Option<SourceFilter> {
    full(source_filter_fields, value)
}

fn clock_name(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| !c.is_whitespace() && c != '=')(input)
}

fn ts_refclk_fields(input: &str) -> IResult<&str, TsRefClk> {
    let (input, _) = tag("ts-refclk:")(input)?;
    let (input, clksrc) = clock_name(input)?;
    let (input, ext) = opt(preceded(char('='), non_space0))(input)?;
    Ok((
        input,
        TsRefClk {
            clksrc: clksrc.to_string(),
            clksrc_ext: ext.and_then(non_empty),
        },
    ))
}

pub(crate) fn ts_refclk(value: &str) -> Option<TsRefClk> {
    full(ts_refclk_fields, value)
}

fn mediaclk_fields(input: &str) -> IResult<&str, MediaClk> {
    let (input, _) = tag("mediaclk:")(input)?;
    let (input, id) = opt(preceded(tag("id="), non_space0))(input)?;
    let (input, _) = spaces0(input)?;
    let (input, name) = clock_name(input)?;
    let (input, value) = opt(preceded(char('='), non_space0))(input)?;
    let (input, rate) = opt(preceded(
        pair(spaces0, tag("rate=")),
        separated_pair(number, char('/'), number),
    ))(input)?;

    Ok((
        input,
        MediaClk {
            id: id.and_then(non_empty),
            name: name.to_string(),
            value: value.and_then(non_empty),
            rate_numerator: rate.map(|(numerator, _)| numerator),
            rate_denominator: rate.map(|(_, denominator)| denominator),
        },
    ))
}

pub(crate) fn mediaclk(value: &str) -> Option<MediaClk> {
    full(mediaclk_fields, value)
}

fn non_empty_suffix<'a>(prefix: &str, value: &'a str) -> Option<&'a str> {
    value.strip_prefix(prefix).filter(|rest| !rest.is_empty())
}

pub(crate) fn keywords(value: &str) -> Option<Keywords> {
    non_empty_suffix("keywds:", value).map(|k| Keywords(k.to_string()))
}

pub(crate) fn content(value: &str) -> Option<Content> {
    non_empty_suffix("content:", value).map(|c| Content(c.to_string()))
}

pub(crate) fn floor_ctrl(value: &str) -> Option<BfcpFloorCtrl> {
    full(
        preceded(
            tag("floorctrl:"),
            alt((tag("c-only"), tag("s-only"), tag("c-s"))),
        ),
        value,
    )
    .map(|role| BfcpFloorCtrl(role.to_string()))
}

fn digits(value: &str) -> Option<&str> {
    (!value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())).then_some(value)
}

pub(crate) fn conf_id(value: &str) -> Option<BfcpConfId> {
    value
        .strip_prefix("confid:")
        .and_then(digits)
        .map(|id| BfcpConfId(id.to_string()))
}

pub(crate) fn user_id(value: &str) -> Option<BfcpUserId> {
    value
        .strip_prefix("userid:")
        .and_then(digits)
        .map(|id| BfcpUserId(id.to_string()))
}

/// The floor id may itself contain spaces, so the stream marker is searched
/// from the right
pub(crate) fn floor_id(value: &str) -> Option<BfcpFloorId> {
    let body = value.strip_prefix("floorid:")?;
    [" m-stream:", " mstrm:"]
        .iter()
        .filter_map(|marker| {
            body.rfind(marker)
                .map(|at| (&body[..at], &body[at + marker.len()..]))
        })
        .filter(|(id, m_stream)| !id.is_empty() && !m_stream.is_empty())
        .max_by_key(|(id, _)| id.len())
        .map(|(id, m_stream)| BfcpFloorId {
            id: id.to_string(),
            m_stream: m_stream.to_string(),
        })
}
