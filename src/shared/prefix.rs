//! Message Header Codec
//!
//! Every persisted message carries its sender and send time embedded as a
//! text prefix: `TAG(DD/MM HH:MM): body`. Human senders get a 3-character
//! uppercased tag; system-generated senders use a free-form tag. The
//! timestamp is day/month plus 24-hour hour:minute, always two digits, no
//! year.
//!
//! Decoding is lenient by contract: content that does not match the grammar
//! decodes to `None` and strips to itself unchanged, so unprefixed system
//! text flows through the same pipeline as user messages.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a human sender tag.
const HUMAN_TAG_LEN: usize = 3;

/// Byte length of the `(DD/MM HH:MM): ` portion of a header.
const STAMP_SECTION_LEN: usize = 15;

/// Build a sender tag for a human user: the first three characters of the
/// display name, uppercased. System senders bypass this and use their
/// label verbatim.
pub fn sender_tag(display_name: &str) -> String {
    display_name
        .chars()
        .take(HUMAN_TAG_LEN)
        .collect::<String>()
        .to_uppercase()
}

/// The day/month hour:minute timestamp embedded in a header.
///
/// The wire format carries no year, so this is a value object rather than a
/// `DateTime`: a decoded header round-trips exactly, and nothing downstream
/// needs to invent a year for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderStamp {
    pub day: u32,
    pub month: u32,
    pub hour: u32,
    pub minute: u32,
}

impl HeaderStamp {
    /// Take the day/month hour:minute fields from a full timestamp.
    pub fn from_datetime(at: &DateTime<Utc>) -> Self {
        Self {
            day: at.day(),
            month: at.month(),
            hour: at.hour(),
            minute: at.minute(),
        }
    }

    /// Stamp for the current instant.
    pub fn now() -> Self {
        Self::from_datetime(&Utc::now())
    }
}

impl fmt::Display for HeaderStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}/{:02} {:02}:{:02}",
            self.day, self.month, self.hour, self.minute
        )
    }
}

/// A successfully decoded header plus the remaining body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHeader {
    pub sender_tag: String,
    pub stamp: HeaderStamp,
    pub body: String,
}

/// Encode a header prefix: `TAG(DD/MM HH:MM): `.
pub fn encode_header(tag: &str, stamp: &HeaderStamp) -> String {
    format!("{}({}): ", tag, stamp)
}

/// Decode the header prefix from a message's content.
///
/// Returns `None` if the content does not match the grammar exactly.
/// Callers must treat unmatched content as body-only text with no sender
/// or timestamp.
pub fn decode_header(content: &str) -> Option<DecodedHeader> {
    let open = find_stamp_open(content)?;
    let bytes = content.as_bytes();
    let stamp = HeaderStamp {
        day: two_digits(&bytes[open + 1..]),
        month: two_digits(&bytes[open + 4..]),
        hour: two_digits(&bytes[open + 7..]),
        minute: two_digits(&bytes[open + 10..]),
    };
    Some(DecodedHeader {
        sender_tag: content[..open].to_string(),
        stamp,
        body: content[open + STAMP_SECTION_LEN..].to_string(),
    })
}

/// Remove the header prefix from content, if one is present.
///
/// Content without a matching header (system text, legacy messages) is
/// returned unchanged. Used when an editor needs only the human-authored
/// body for re-editing.
pub fn strip_header(content: &str) -> &str {
    match find_stamp_open(content) {
        Some(open) => &content[open + STAMP_SECTION_LEN..],
        None => content,
    }
}

/// Find the byte offset of the '(' opening a well-formed stamp section.
///
/// The tag is free-form for system senders, so every '(' is a candidate;
/// the first one followed by `DD/MM HH:MM): ` wins. A '(' at offset 0 would
/// mean an empty sender tag, which is not part of the grammar.
fn find_stamp_open(content: &str) -> Option<usize> {
    content
        .match_indices('(')
        .map(|(open, _)| open)
        .find(|&open| open > 0 && stamp_section_matches(&content.as_bytes()[open..]))
}

/// Check that `section` begins with `(DD/MM HH:MM): `.
fn stamp_section_matches(section: &[u8]) -> bool {
    if section.len() < STAMP_SECTION_LEN {
        return false;
    }
    section[0] == b'('
        && section[1].is_ascii_digit()
        && section[2].is_ascii_digit()
        && section[3] == b'/'
        && section[4].is_ascii_digit()
        && section[5].is_ascii_digit()
        && section[6] == b' '
        && section[7].is_ascii_digit()
        && section[8].is_ascii_digit()
        && section[9] == b':'
        && section[10].is_ascii_digit()
        && section[11].is_ascii_digit()
        && &section[12..15] == b"): "
}

fn two_digits(bytes: &[u8]) -> u32 {
    u32::from((bytes[0] - b'0') * 10 + (bytes[1] - b'0'))
}
