//! [`SdpDocument`] to SDP text

use std::fmt;

use crate::grammar::{MediaLine, SdpLine};
use crate::model::{SdpDocument, SdpMediaSection, SdpScope};

const CRLF: &str = "\r\n";

/// Serializes a document to SDP text
///
/// The session scope comes first, then each media section headed by its `m=`
/// line. Within a scope fields are written in a fixed order and opaque lines
/// last. Lines are CRLF terminated, including the final one.
pub fn write_sdp(doc: &SdpDocument) -> String {
    let mut lines = scope_lines(&doc.session);
    for section in &doc.media {
        lines.extend(section_lines(section));
    }

    let mut out = lines.join(CRLF);
    out.push_str(CRLF);
    out
}

fn scope_lines(scope: &SdpScope) -> Vec<String> {
    let mut lines = scope.record_lines();
    lines.extend(
        scope
            .invalid
            .iter()
            .map(|line| format!("{}={}", line.kind, line.value)),
    );
    lines
}

fn section_lines(section: &SdpMediaSection) -> Vec<String> {
    let mut lines = Vec::new();

    match &section.mline {
        Some(mline) => lines.push(format!("{}={}", MediaLine::KIND, mline)),
        // An unparsed media line is held opaque and must head its section
        None => lines.extend(
            section
                .fields
                .invalid
                .iter()
                .filter(|line| line.kind == 'm')
                .map(|line| format!("m={}", line.value)),
        ),
    }

    lines.extend(section.fields.record_lines());
    lines.extend(
        section
            .fields
            .invalid
            .iter()
            .filter(|line| section.mline.is_some() || line.kind != 'm')
            .map(|line| format!("{}={}", line.kind, line.value)),
    );
    lines
}

impl fmt::Display for SdpDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&write_sdp(self))
    }
}
