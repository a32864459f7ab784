//! SDP document model
//!
//! An [`SdpDocument`] holds one [`SdpScope`] for the session level and one per
//! media section. A scope has a field for every record shape of the grammar:
//! singleton fields keep the last occurrence, list fields keep every occurrence
//! in encounter order. The field table below is the single source for both
//! storage and output order.

use serde::{Deserialize, Serialize};

use crate::grammar::*;

macro_rules! scope_field {
    (one, $ty:ty) => { Option<$ty> };
    (many, $ty:ty) => { Vec<$ty> };
}

macro_rules! scope_store {
    (one, $slot:expr, $value:expr) => {
        $slot = Some($value)
    };
    (many, $slot:expr, $value:expr) => {
        $slot.push($value)
    };
}

macro_rules! sdp_scope {
    ($($field:ident: $variant:ident => $mode:ident,)*) => {
        /// Every field an SDP scope can carry
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct SdpScope {
            $(pub $field: scope_field!($mode, $variant),)*
            /// Lines no grammar rule accepted, in encounter order
            pub invalid: Vec<OpaqueLine>,
        }

        impl SdpScope {
            /// Stores a record in the field for its shape
            pub fn store(&mut self, record: SdpRecord) {
                match record {
                    $(SdpRecord::$variant(value) => scope_store!($mode, self.$field, value),)*
                    // Media lines open sections and never live inside a scope
                    SdpRecord::MediaLine(line) => {
                        self.invalid.push(OpaqueLine::new('m', line.to_string()))
                    }
                }
            }

            /// Renders every recognised field as `k=value`, in output order
            pub fn record_lines(&self) -> Vec<String> {
                let mut lines = Vec::new();
                $(
                    for value in self.$field.iter() {
                        lines.push(format!("{}={}", <$variant as SdpLine>::KIND, value));
                    }
                )*
                lines
            }

            /// Whether no field is set and no opaque line is held
            pub fn is_empty(&self) -> bool {
                $(self.$field.is_empty() &&)* self.invalid.is_empty()
            }
        }
    };
}

trait FieldExt {
    fn is_empty(&self) -> bool;
}

impl<T> FieldExt for Option<T> {
    fn is_empty(&self) -> bool {
        self.is_none()
    }
}

sdp_scope! {
    version: Version => one,
    origin: Origin => one,
    name: Name => one,
    description: Description => one,
    uri: Uri => one,
    email: Email => one,
    phone: Phone => one,
    timezones: Timezones => one,
    repeats: Repeats => one,
    timing: Timing => one,
    connection: Connection => one,
    bandwidth: Bandwidth => many,
    rtp: RtpMap => many,
    fmtp: Fmtp => many,
    control: Control => one,
    rtcp: Rtcp => one,
    rtcp_fb_trr_int: RtcpFbTrrInt => many,
    rtcp_fb: RtcpFb => many,
    ext: Ext => many,
    extmap_allow_mixed: ExtmapAllowMixed => one,
    crypto: Crypto => many,
    setup: Setup => one,
    connection_type: ConnectionType => one,
    mid: Mid => one,
    msid: Msid => one,
    ptime: Ptime => one,
    maxptime: MaxPtime => one,
    direction: Direction => one,
    ice_lite: IceLite => one,
    ice_ufrag: IceUfrag => one,
    ice_pwd: IcePwd => one,
    fingerprint: Fingerprint => one,
    candidates: Candidate => many,
    end_of_candidates: EndOfCandidates => one,
    remote_candidates: RemoteCandidates => one,
    ice_options: IceOptions => one,
    ssrcs: Ssrc => many,
    ssrc_groups: SsrcGroup => many,
    msid_semantic: MsidSemantic => one,
    groups: Group => many,
    rtcp_mux: RtcpMux => one,
    rtcp_rsize: RtcpRsize => one,
    sctpmap: Sctpmap => one,
    x_google_flag: XGoogleFlag => one,
    rids: Rid => many,
    imageattrs: ImageAttr => many,
    simulcast: Simulcast => one,
    simulcast03: Simulcast03 => one,
    framerate: Framerate => one,
    source_filter: SourceFilter => one,
    bundle_only: BundleOnly => one,
    label: Label => one,
    sctp_port: SctpPort => one,
    max_message_size: MaxMessageSize => one,
    ts_refclocks: TsRefClk => many,
    mediaclk: MediaClk => one,
    keywords: Keywords => one,
    content: Content => one,
    bfcp_floor_ctrl: BfcpFloorCtrl => one,
    bfcp_conf_id: BfcpConfId => one,
    bfcp_user_id: BfcpUserId => one,
    bfcp_floor_id: BfcpFloorId => one,
}

impl SdpScope {
    /// First rtpmap entry for `payload`
    pub fn rtpmap(&self, payload: &str) -> Option<&RtpMap> {
        self.rtp.iter().find(|rtp| rtp.payload == payload)
    }

    /// First fmtp entry for `payload`
    pub fn fmtp(&self, payload: &str) -> Option<&Fmtp> {
        self.fmtp.iter().find(|fmtp| fmtp.payload == payload)
    }

    /// Payload types whose rtpmap names `codec` (case-insensitive)
    pub fn payloads_for_codec<'a>(&'a self, codec: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rtp
            .iter()
            .filter(move |rtp| rtp.codec.eq_ignore_ascii_case(codec))
            .map(|rtp| rtp.payload.as_str())
    }
}

/// One media section, opened by an `m=` line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdpMediaSection {
    /// `None` when the `m=` line did not match the grammar; its raw value is
    /// then held as an opaque `m` line in `fields`
    pub mline: Option<MediaLine>,
    pub fields: SdpScope,
}

impl SdpMediaSection {
    pub fn new(mline: MediaLine) -> Self {
        Self {
            mline: Some(mline),
            fields: SdpScope::default(),
        }
    }

    /// Media type from the `m=` line
    pub fn media_type(&self) -> Option<&str> {
        self.mline.as_ref().map(|m| m.media.as_str())
    }

    /// Payload tokens from the `m=` line, empty for an unparsed line
    pub fn payloads(&self) -> &[String] {
        self.mline
            .as_ref()
            .map(|m| m.payloads.as_slice())
            .unwrap_or_default()
    }

    pub fn mid(&self) -> Option<&str> {
        self.fields.mid.as_ref().map(|mid| mid.0.as_str())
    }

    pub fn is_audio(&self) -> bool {
        self.media_type() == Some("audio")
    }

    pub fn is_video(&self) -> bool {
        self.media_type() == Some("video")
    }
}

/// A parsed SDP document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdpDocument {
    pub session: SdpScope,
    pub media: Vec<SdpMediaSection>,
}

impl Default for SdpDocument {
    fn default() -> Self {
        Self {
            session: SdpScope {
                version: Some(Version(0)),
                ..SdpScope::default()
            },
            media: Vec::new(),
        }
    }
}

impl SdpDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Media section tagged with `mid`
    pub fn section_by_mid(&self, mid: &str) -> Option<&SdpMediaSection> {
        self.media.iter().find(|section| section.mid() == Some(mid))
    }

    pub fn audio_sections(&self) -> impl Iterator<Item = &SdpMediaSection> {
        self.media.iter().filter(|section| section.is_audio())
    }

    pub fn video_sections(&self) -> impl Iterator<Item = &SdpMediaSection> {
        self.media.iter().filter(|section| section.is_video())
    }
}
