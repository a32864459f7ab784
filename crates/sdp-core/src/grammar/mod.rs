//! SDP line grammar
//!
//! Every recognised line value maps to exactly one typed record. Lookup goes
//! through [`RULES`], a static table walked in priority order, so the first rule
//! whose kind matches and whose matcher accepts the whole value wins. Each
//! record's `Display` implementation is the inverse writer: writing a record
//! and matching the result again yields the same record.
//!
//! ```
//! use rvoip_sdp_core::grammar::{self, SdpRecord};
//!
//! let record = grammar::try_parse('a', "rtpmap:111 opus/48000/2").unwrap();
//! assert!(matches!(record, SdpRecord::RtpMap(_)));
//! assert_eq!(grammar::write(&record), "rtpmap:111 opus/48000/2");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a record holding the remainder of a line after a fixed prefix
macro_rules! value_record {
    ($(#[$meta:meta])* $name:ident($ty:ty), $kind:literal, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $name(pub $ty);

        impl $crate::grammar::SdpLine for $name {
            const KIND: char = $kind;
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

/// Declares a property attribute that carries no value (`a=rtcp-mux`)
///
/// The flag serializes as its literal so that `Some(flag)` stays distinct from
/// `None` in formats that write unit structs as null.
macro_rules! flag_record {
    ($(#[$meta:meta])* $name:ident, $literal:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name;

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str($literal)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> ::std::result::Result<Self, D::Error> {
                let value = <::std::string::String as ::serde::Deserialize>::deserialize(deserializer)?;
                Self::parse(&value).ok_or_else(|| {
                    <D::Error as ::serde::de::Error>::custom(format!("expected `{}`", $literal))
                })
            }
        }

        impl $name {
            pub(crate) fn parse(value: &str) -> Option<Self> {
                (value == $literal).then_some($name)
            }
        }

        impl $crate::grammar::SdpLine for $name {}

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($literal)
            }
        }
    };
}

pub mod common;
pub mod extensions;
pub mod ice;
pub mod rtp;
pub mod session;

pub use extensions::{
    BfcpConfId, BfcpFloorCtrl, BfcpFloorId, BfcpUserId, Content, Keywords, MediaClk,
    SourceFilter, TsRefClk,
};
pub use ice::{
    BundleOnly, Candidate, ConnectionType, EndOfCandidates, Fingerprint, Group, IceLite,
    IceOptions, IcePwd, IceUfrag, Label, MaxMessageSize, Mid, Msid, MsidSemantic,
    RemoteCandidates, RtcpMux, RtcpRsize, SctpPort, Sctpmap, Setup, XGoogleFlag,
};
pub use rtp::{
    Control, Crypto, Direction, Ext, ExtmapAllowMixed, Fmtp, Framerate, ImageAttr, MaxPtime,
    Ptime, Rid, Rtcp, RtcpFb, RtcpFbTrrInt, RtpMap, Simulcast, Simulcast03, Ssrc, SsrcGroup,
};
pub use session::{
    Bandwidth, Connection, Description, Email, MediaLine, Name, Origin, Phone, Repeats,
    Timezones, Timing, Uri, Version,
};

/// A typed SDP line value
///
/// `KIND` is the line type character written before `=`. Attribute records use
/// the default `a`.
pub trait SdpLine: fmt::Display {
    const KIND: char = 'a';
}

/// A line no grammar rule accepted, kept verbatim with its kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueLine {
    pub kind: char,
    pub value: String,
}

impl OpaqueLine {
    pub fn new(kind: char, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for OpaqueLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

macro_rules! sdp_records {
    ($($variant:ident),* $(,)?) => {
        /// One recognised SDP line, tagged by record shape
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub enum SdpRecord {
            $($variant($variant),)*
        }

        impl SdpRecord {
            /// Line type character this record is written under
            pub fn kind(&self) -> char {
                match self {
                    $(SdpRecord::$variant(_) => <$variant as SdpLine>::KIND,)*
                }
            }
        }

        impl fmt::Display for SdpRecord {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(SdpRecord::$variant(value) => fmt::Display::fmt(value, f),)*
                }
            }
        }

        $(
            impl From<$variant> for SdpRecord {
                fn from(value: $variant) -> Self {
                    SdpRecord::$variant(value)
                }
            }
        )*
    };
}

sdp_records! {
    Version, Origin, Name, Description, Uri, Email, Phone, Timezones, Repeats, Timing,
    Connection, Bandwidth, MediaLine,
    RtpMap, Fmtp, Control, Rtcp, RtcpFbTrrInt, RtcpFb, Ext, ExtmapAllowMixed, Crypto,
    Setup, ConnectionType, Mid, Msid, Ptime, MaxPtime, Direction, IceLite, IceUfrag,
    IcePwd, Fingerprint, Candidate, EndOfCandidates, RemoteCandidates, IceOptions, Ssrc,
    SsrcGroup, MsidSemantic, Group, RtcpMux, RtcpRsize, Sctpmap, XGoogleFlag, Rid,
    ImageAttr, Simulcast, Simulcast03, Framerate, SourceFilter, BundleOnly, Label,
    SctpPort, MaxMessageSize, TsRefClk, MediaClk, Keywords, Content, BfcpFloorCtrl,
    BfcpConfId, BfcpUserId, BfcpFloorId,
}

/// A grammar rule: the line kind it applies to, a name for diagnostics and the
/// matcher producing the record
#[derive(Clone, Copy)]
pub struct Rule {
    pub kind: char,
    pub name: &'static str,
    pub parse: fn(&str) -> Option<SdpRecord>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish()
    }
}

macro_rules! rule {
    ($kind:literal, $name:literal, $parser:path => $variant:ident) => {
        Rule {
            kind: $kind,
            name: $name,
            parse: |value| $parser(value).map(SdpRecord::$variant),
        }
    };
}

/// Grammar rules in priority order
pub static RULES: &[Rule] = &[
    rule!('v', "version", session::version => Version),
    rule!('o', "origin", session::origin => Origin),
    rule!('s', "name", session::name => Name),
    rule!('i', "description", session::description => Description),
    rule!('u', "uri", session::uri => Uri),
    rule!('e', "email", session::email => Email),
    rule!('p', "phone", session::phone => Phone),
    rule!('z', "timezones", session::timezones => Timezones),
    rule!('r', "repeats", session::repeats => Repeats),
    rule!('t', "timing", session::timing => Timing),
    rule!('c', "connection", session::connection => Connection),
    rule!('b', "bandwidth", session::bandwidth => Bandwidth),
    rule!('m', "media", session::media_line => MediaLine),
    rule!('a', "rtpmap", rtp::rtpmap => RtpMap),
    rule!('a', "fmtp", rtp::fmtp => Fmtp),
    rule!('a', "control", rtp::control => Control),
    rule!('a', "rtcp", rtp::rtcp => Rtcp),
    rule!('a', "rtcp-fb-trr-int", rtp::rtcp_fb_trr_int => RtcpFbTrrInt),
    rule!('a', "rtcp-fb", rtp::rtcp_fb => RtcpFb),
    rule!('a', "extmap", rtp::extmap => Ext),
    rule!('a', "extmap-allow-mixed", ExtmapAllowMixed::parse => ExtmapAllowMixed),
    rule!('a', "crypto", rtp::crypto => Crypto),
    rule!('a', "setup", ice::setup => Setup),
    rule!('a', "connection-type", ice::connection_type => ConnectionType),
    rule!('a', "mid", ice::mid => Mid),
    rule!('a', "msid", ice::msid => Msid),
    rule!('a', "ptime", rtp::ptime => Ptime),
    rule!('a', "maxptime", rtp::maxptime => MaxPtime),
    rule!('a', "direction", Direction::parse => Direction),
    rule!('a', "ice-lite", IceLite::parse => IceLite),
    rule!('a', "ice-ufrag", ice::ice_ufrag => IceUfrag),
    rule!('a', "ice-pwd", ice::ice_pwd => IcePwd),
    rule!('a', "fingerprint", ice::fingerprint => Fingerprint),
    rule!('a', "candidate", ice::candidate => Candidate),
    rule!('a', "end-of-candidates", EndOfCandidates::parse => EndOfCandidates),
    rule!('a', "remote-candidates", ice::remote_candidates => RemoteCandidates),
    rule!('a', "ice-options", ice::ice_options => IceOptions),
    rule!('a', "ssrc", rtp::ssrc => Ssrc),
    rule!('a', "ssrc-group", rtp::ssrc_group => SsrcGroup),
    rule!('a', "msid-semantic", ice::msid_semantic => MsidSemantic),
    rule!('a', "group", ice::group => Group),
    rule!('a', "rtcp-mux", RtcpMux::parse => RtcpMux),
    rule!('a', "rtcp-rsize", RtcpRsize::parse => RtcpRsize),
    rule!('a', "sctpmap", ice::sctpmap => Sctpmap),
    rule!('a', "x-google-flag", ice::x_google_flag => XGoogleFlag),
    rule!('a', "rid", rtp::rid => Rid),
    rule!('a', "imageattr", rtp::imageattr => ImageAttr),
    rule!('a', "simulcast", rtp::simulcast => Simulcast),
    rule!('a', "simulcast-03", rtp::simulcast03 => Simulcast03),
    rule!('a', "framerate", rtp::framerate => Framerate),
    rule!('a', "source-filter", extensions::source_filter => SourceFilter),
    rule!('a', "bundle-only", BundleOnly::parse => BundleOnly),
    rule!('a', "label", ice::label => Label),
    rule!('a', "sctp-port", ice::sctp_port => SctpPort),
    rule!('a', "max-message-size", ice::max_message_size => MaxMessageSize),
    rule!('a', "ts-refclk", extensions::ts_refclk => TsRefClk),
    rule!('a', "mediaclk", extensions::mediaclk => MediaClk),
    rule!('a', "keywds", extensions::keywords => Keywords),
    rule!('a', "content", extensions::content => Content),
    rule!('a', "floorctrl", extensions::floor_ctrl => BfcpFloorCtrl),
    rule!('a', "confid", extensions::conf_id => BfcpConfId),
    rule!('a', "userid", extensions::user_id => BfcpUserId),
    rule!('a', "floorid", extensions::floor_id => BfcpFloorId),
];

/// Matches a line value against the rules for `kind`, returning the first
/// record produced
pub fn try_parse(kind: char, value: &str) -> Option<SdpRecord> {
    RULES
        .iter()
        .filter(|rule| rule.kind == kind)
        .find_map(|rule| (rule.parse)(value))
}

/// Renders a record back to its line value (without the `k=` prefix)
pub fn write(record: &SdpRecord) -> String {
    record.to_string()
}
