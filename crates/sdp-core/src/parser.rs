//! SDP text to [`SdpDocument`]
//!
//! Parsing is line oriented: `m=` lines open media sections, every other line is
//! matched against the grammar and stored in the scope the cursor points at.
//! Only the shape of a line (`<kind>=<value>`) can fail a parse. Content the
//! grammar does not recognise is kept in the opaque bucket of its scope.

use std::str::FromStr;

use tracing::trace;

use crate::error::{Error, Result};
use crate::grammar::{self, common::split_lines, OpaqueLine, SdpRecord};
use crate::model::{SdpDocument, SdpMediaSection, SdpScope};

/// Parses SDP text into a document
///
/// Accepts CRLF or bare LF terminators and ignores empty lines.
///
/// # Errors
///
/// - [`Error::EmptyDocument`] if the text holds no non-empty line
/// - [`Error::MalformedLine`] if a line is shorter than two characters or has
///   no `=` after its kind
///
/// # Example
///
/// ```
/// use rvoip_sdp_core::parse_sdp;
///
/// let doc = parse_sdp("v=0\r\ns=-\r\nm=audio 9 RTP/AVP 0\r\na=mid:0\r\n").unwrap();
/// assert_eq!(doc.media.len(), 1);
/// assert_eq!(doc.media[0].mid(), Some("0"));
/// ```
pub fn parse_sdp(text: &str) -> Result<SdpDocument> {
    let mut doc = SdpDocument::new();
    let mut cursor: Option<usize> = None;
    let mut seen_lines = false;

    for (index, line) in split_lines(text).enumerate() {
        if line.is_empty() {
            continue;
        }
        seen_lines = true;
        let line_number = index + 1;
        let (kind, value) = split_line(line_number, line)?;

        if kind == 'm' {
            let section = match grammar::session::media_line(value) {
                Some(mline) => SdpMediaSection::new(mline),
                None => {
                    trace!(line_number, "unparsed media line kept opaque");
                    let mut section = SdpMediaSection::default();
                    section.fields.invalid.push(OpaqueLine::new('m', value));
                    section
                }
            };
            doc.media.push(section);
            cursor = Some(doc.media.len() - 1);
            continue;
        }

        let scope = active_scope(&mut doc, cursor);
        match grammar::try_parse(kind, value) {
            Some(record) => {
                trace!(line_number, kind = %kind, "matched");
                scope.store(record);
            }
            None => {
                trace!(line_number, kind = %kind, "no rule matched, kept opaque");
                scope.invalid.push(OpaqueLine::new(kind, value));
            }
        }
    }

    if !seen_lines {
        return Err(Error::EmptyDocument);
    }

    Ok(doc)
}

/// Parses a single line value into a record without building a document
pub fn parse_record(kind: char, value: &str) -> Option<SdpRecord> {
    grammar::try_parse(kind, value)
}

fn split_line(line_number: usize, line: &str) -> Result<(char, &str)> {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(kind), Some('=')) => Ok((kind, chars.as_str())),
        _ => Err(Error::malformed_line(line_number, line)),
    }
}

fn active_scope(doc: &mut SdpDocument, cursor: Option<usize>) -> &mut SdpScope {
    match cursor.and_then(|index| doc.media.get_mut(index)) {
        Some(section) => &mut section.fields,
        None => &mut doc.session,
    }
}

impl FromStr for SdpDocument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_sdp(s)
    }
}
