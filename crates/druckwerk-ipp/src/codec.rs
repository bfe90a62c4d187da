// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binary codec for IPP messages (RFC 8010 §3).  The wire format is:
//
// ```text
// version-number:  2 bytes (major, minor)
// operation-id or status-code: 2 bytes (big-endian u16)
// request-id:      4 bytes (big-endian u32)
// attribute-groups: variable
//   delimiter-tag: 1 byte (0x00..=0x0F)
//   attributes:    variable
//     value-tag:    1 byte
//     name-length:  2 bytes (big-endian u16)
//     name:         name-length bytes
//     value-length: 2 bytes (big-endian u16)
//     value:        value-length bytes
// end-of-attributes-tag: 1 byte (0x03)
// document-data: remainder
// ```
//
// An attribute record with an empty name is an additional value of the
// immediately preceding attribute (RFC 8010 §3.1.4).  Collections nest via
// begCollection / memberAttrName / endCollection records (§3.1.6).

use tracing::{debug, warn};

use druckwerk_core::{DruckwerkError, Result};

use crate::attribute::{IppAttribute, IppAttributeGroup};
use crate::message::IppMessage;
use crate::model::{self, DelimiterTag, IppVersion, ValueTag};
use crate::value::{CollectionMember, IppDateTime, IppValue};

/// Name and value fields of a TLV record are length-prefixed with a u16.
const MAX_FIELD_LEN: usize = u16::MAX as usize;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serialize a message to its wire bytes.
pub fn encode(message: &IppMessage) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128 + message.payload.len());
    buf.push(message.version.major);
    buf.push(message.version.minor);
    buf.extend_from_slice(&message.code.to_be_bytes());
    buf.extend_from_slice(&message.request_id.to_be_bytes());

    for group in &message.groups {
        buf.push(group.tag().as_u8());
        for attribute in group.attributes() {
            write_attribute(&mut buf, attribute)?;
        }
    }

    buf.push(DelimiterTag::EndOfAttributes.as_u8());
    buf.extend_from_slice(&message.payload);
    Ok(buf)
}

/// Write one attribute: the first value carries the name, additional values
/// are empty-name records.
fn write_attribute(buf: &mut Vec<u8>, attribute: &IppAttribute) -> Result<()> {
    let mut wire_name = attribute.name();
    for value in attribute.values() {
        write_value(buf, wire_name, value, attribute.name())?;
        wire_name = "";
    }
    Ok(())
}

fn write_value(buf: &mut Vec<u8>, wire_name: &str, value: &IppValue, attr_name: &str) -> Result<()> {
    match value {
        IppValue::Collection(members) => {
            write_tlv(buf, ValueTag::BegCollection.as_u8(), wire_name, attr_name, &[])?;
            for member in members {
                write_tlv(
                    buf,
                    ValueTag::MemberAttrName.as_u8(),
                    "",
                    attr_name,
                    member.name.as_bytes(),
                )?;
                for member_value in &member.values {
                    write_value(buf, "", member_value, attr_name)?;
                }
            }
            write_tlv(buf, ValueTag::EndCollection.as_u8(), "", attr_name, &[])
        }
        _ => {
            let bytes = scalar_bytes(value);
            write_tlv(buf, value.tag(), wire_name, attr_name, &bytes)
        }
    }
}

/// Wire bytes for every non-collection value syntax.
fn scalar_bytes(value: &IppValue) -> Vec<u8> {
    match value {
        IppValue::Integer(v) | IppValue::Enum(v) => v.to_be_bytes().to_vec(),
        IppValue::Boolean(v) => vec![u8::from(*v)],
        IppValue::OctetString(data) => data.clone(),
        IppValue::DateTime(dt) => datetime_bytes(dt),
        IppValue::Resolution {
            cross_feed,
            feed,
            units,
        } => {
            let mut b = Vec::with_capacity(9);
            b.extend_from_slice(&cross_feed.to_be_bytes());
            b.extend_from_slice(&feed.to_be_bytes());
            b.push(*units as u8);
            b
        }
        IppValue::RangeOfInteger { lower, upper } => {
            let mut b = Vec::with_capacity(8);
            b.extend_from_slice(&lower.to_be_bytes());
            b.extend_from_slice(&upper.to_be_bytes());
            b
        }
        IppValue::TextWithLanguage { language, text } => with_language_bytes(language, text),
        IppValue::NameWithLanguage { language, name } => with_language_bytes(language, name),
        IppValue::Text(s)
        | IppValue::Name(s)
        | IppValue::Keyword(s)
        | IppValue::Uri(s)
        | IppValue::UriScheme(s)
        | IppValue::Charset(s)
        | IppValue::NaturalLanguage(s)
        | IppValue::MimeMediaType(s)
        | IppValue::MemberAttrName(s) => s.as_bytes().to_vec(),
        IppValue::NoValue | IppValue::Unknown | IppValue::Unsupported => Vec::new(),
        IppValue::Other { data, .. } => data.clone(),
        // Handled by write_value before scalar_bytes is reached.
        IppValue::Collection(_) => Vec::new(),
    }
}

fn datetime_bytes(dt: &IppDateTime) -> Vec<u8> {
    let mut b = Vec::with_capacity(11);
    b.extend_from_slice(&dt.year.to_be_bytes());
    b.push(dt.month);
    b.push(dt.day);
    b.push(dt.hour);
    b.push(dt.minute);
    b.push(dt.second);
    b.push(dt.deci_second);
    b.push(dt.utc_direction);
    b.push(dt.utc_hours);
    b.push(dt.utc_minutes);
    b
}

/// Two length-prefixed fields packed into one value (RFC 8010 §3.9).
fn with_language_bytes(language: &str, content: &str) -> Vec<u8> {
    let mut b = Vec::with_capacity(4 + language.len() + content.len());
    b.extend_from_slice(&(language.len() as u16).to_be_bytes());
    b.extend_from_slice(language.as_bytes());
    b.extend_from_slice(&(content.len() as u16).to_be_bytes());
    b.extend_from_slice(content.as_bytes());
    b
}

fn write_tlv(
    buf: &mut Vec<u8>,
    tag: u8,
    wire_name: &str,
    attr_name: &str,
    value: &[u8],
) -> Result<()> {
    if wire_name.len() > MAX_FIELD_LEN || value.len() > MAX_FIELD_LEN {
        return Err(DruckwerkError::MalformedAttribute {
            attribute: attr_name.to_string(),
            offset: buf.len(),
            reason: format!(
                "field of {} bytes exceeds the 65535-byte TLV limit",
                wire_name.len().max(value.len())
            ),
        });
    }
    buf.push(tag);
    buf.extend_from_slice(&(wire_name.len() as u16).to_be_bytes());
    buf.extend_from_slice(wire_name.as_bytes());
    buf.extend_from_slice(&(value.len() as u16).to_be_bytes());
    buf.extend_from_slice(value);
    Ok(())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Cursor over the wire bytes; every read reports truncation with the offset
/// where it ran dry.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn pos(&self) -> usize {
        self.pos
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn peek_u8(&self) -> u8 {
        self.data[self.pos]
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.data.len() - self.pos;
        if remaining < n {
            return Err(DruckwerkError::TruncatedMessage {
                offset: self.pos,
                needed: n - remaining,
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

/// Parse wire bytes into a message.
///
/// Unrecognized value tags are preserved as [`IppValue::Other`] rather than
/// failing the whole message; everything else that disagrees with the RFC
/// shape is an error.
pub fn decode(data: &[u8]) -> Result<IppMessage> {
    let mut r = Reader::new(data);

    let major = r.u8()?;
    let minor = r.u8()?;
    let code = r.u16()?;
    let request_id = r.u32()?;

    let mut groups: Vec<IppAttributeGroup> = Vec::new();
    let mut current: Option<IppAttributeGroup> = None;

    while !r.is_empty() {
        let tag = r.peek_u8();

        // Delimiter tags occupy 0x00..=0x0F.
        if tag <= 0x0F {
            let delimiter_offset = r.pos();
            r.u8()?;
            if let Some(group) = current.take() {
                groups.push(group);
            }
            if tag == DelimiterTag::EndOfAttributes.as_u8() {
                break;
            }
            match DelimiterTag::from_u8(tag) {
                Some(t) => current = Some(IppAttributeGroup::new(t)),
                None => {
                    return Err(DruckwerkError::MalformedAttribute {
                        attribute: String::new(),
                        offset: delimiter_offset,
                        reason: format!("unrecognized delimiter tag 0x{tag:02x}"),
                    });
                }
            }
            continue;
        }

        let record_offset = r.pos();
        let (name, value) = read_record(&mut r)?;

        let Some(group) = current.as_mut() else {
            // An attribute before the first group delimiter is outside any
            // semantic scope; drop it rather than fail the message.
            warn!(attribute = %name, offset = record_offset, "attribute record before any group delimiter, discarded");
            continue;
        };

        if name.is_empty() {
            // Additional value of the preceding attribute.
            let Some(attribute) = group.last_mut() else {
                return Err(DruckwerkError::MalformedAttribute {
                    attribute: String::new(),
                    offset: record_offset,
                    reason: "additional value with no preceding attribute".into(),
                });
            };
            check_additional_tag(attribute, &value, record_offset)?;
            attribute.push_value(value);
        } else {
            group.push(IppAttribute::single(name, value));
        }
    }

    if let Some(group) = current.take() {
        groups.push(group);
    }

    let message = IppMessage {
        version: IppVersion { major, minor },
        code,
        request_id,
        groups,
        payload: r.rest().to_vec(),
    };

    check_charset(&message);
    Ok(message)
}

/// Enforce the one-tag-per-attribute invariant when appending an additional
/// value; out-of-band markers are exempt.
fn check_additional_tag(attribute: &IppAttribute, value: &IppValue, offset: usize) -> Result<()> {
    if value.is_out_of_band() {
        return Ok(());
    }
    let existing = attribute
        .values()
        .iter()
        .find(|v| !v.is_out_of_band())
        .map(IppValue::tag);
    match existing {
        Some(tag) if tag != value.tag() => Err(DruckwerkError::MalformedAttribute {
            attribute: attribute.name().to_string(),
            offset,
            reason: format!(
                "additional value tag 0x{:02x} does not match attribute tag 0x{tag:02x}",
                value.tag()
            ),
        }),
        _ => Ok(()),
    }
}

/// Text values are decoded as UTF-8; the negotiated `attributes-charset`
/// (first attribute of the first group) is honored when it is a charset we
/// can treat as UTF-8 and warned about otherwise.
fn check_charset(message: &IppMessage) {
    let declared = message
        .groups
        .first()
        .and_then(|g| g.attributes().first())
        .filter(|a| a.name() == model::name::ATTRIBUTES_CHARSET)
        .and_then(|a| a.value().as_str());
    match declared {
        None => debug!("no attributes-charset declared, defaulting to utf-8"),
        Some(cs) if cs.eq_ignore_ascii_case("utf-8") || cs.eq_ignore_ascii_case("us-ascii") => {}
        Some(cs) => warn!(charset = cs, "unsupported charset declared, decoding as utf-8"),
    }
}

/// Read one TLV record, returning its (possibly empty) name and value.
fn read_record(r: &mut Reader<'_>) -> Result<(String, IppValue)> {
    let value_tag = r.u8()?;
    let name = read_name(r)?;

    if value_tag == ValueTag::BegCollection.as_u8() {
        // The begCollection value is defined to be empty; skip whatever is
        // there and parse members until the matching endCollection.
        let skip = r.u16()? as usize;
        r.bytes(skip)?;
        let members = read_collection(r)?;
        return Ok((name, IppValue::Collection(members)));
    }

    let value_len = r.u16()? as usize;
    let value_offset = r.pos();
    let raw = r.bytes(value_len)?;
    let value = decode_value(value_tag, raw, &name, value_offset)?;
    Ok((name, value))
}

fn read_name(r: &mut Reader<'_>) -> Result<String> {
    let name_len = r.u16()? as usize;
    let name_offset = r.pos();
    let raw = r.bytes(name_len)?;
    match std::str::from_utf8(raw) {
        Ok(s) => Ok(s.to_string()),
        Err(_) => Err(DruckwerkError::MalformedAttribute {
            attribute: String::from_utf8_lossy(raw).into_owned(),
            offset: name_offset,
            reason: "attribute name is not valid UTF-8".into(),
        }),
    }
}

/// Parse the member records of a collection until endCollection.
fn read_collection(r: &mut Reader<'_>) -> Result<Vec<CollectionMember>> {
    let mut members: Vec<CollectionMember> = Vec::new();

    loop {
        let record_offset = r.pos();
        let tag = r.u8()?;

        if tag <= 0x0F {
            return Err(DruckwerkError::MalformedAttribute {
                attribute: String::new(),
                offset: record_offset,
                reason: "group delimiter inside a collection".into(),
            });
        }

        // Record names inside collections are defined empty; read and ignore.
        let _ = read_name(r)?;

        if tag == ValueTag::EndCollection.as_u8() {
            let skip = r.u16()? as usize;
            r.bytes(skip)?;
            return Ok(members);
        }

        if tag == ValueTag::MemberAttrName.as_u8() {
            let len = r.u16()? as usize;
            let name_offset = r.pos();
            let raw = r.bytes(len)?;
            let member_name = std::str::from_utf8(raw)
                .map_err(|_| DruckwerkError::MalformedAttribute {
                    attribute: String::new(),
                    offset: name_offset,
                    reason: "collection member name is not valid UTF-8".into(),
                })?
                .to_string();
            members.push(CollectionMember {
                name: member_name,
                values: Vec::new(),
            });
            continue;
        }

        let value = if tag == ValueTag::BegCollection.as_u8() {
            let skip = r.u16()? as usize;
            r.bytes(skip)?;
            IppValue::Collection(read_collection(r)?)
        } else {
            let value_len = r.u16()? as usize;
            let value_offset = r.pos();
            let raw = r.bytes(value_len)?;
            let member_name = members.last().map(|m| m.name.clone()).unwrap_or_default();
            decode_value(tag, raw, &member_name, value_offset)?
        };

        let Some(member) = members.last_mut() else {
            return Err(DruckwerkError::MalformedAttribute {
                attribute: String::new(),
                offset: record_offset,
                reason: "collection value before any memberAttrName".into(),
            });
        };
        member.values.push(value);
    }
}

/// Interpret the raw value bytes of one record according to its tag.
///
/// The byte-shape checks here (integer = 4 bytes, boolean = 1, dateTime =
/// 11, ...) are what turn a lying server into a diagnosable
/// `MalformedAttribute` instead of garbage data.
fn decode_value(tag: u8, raw: &[u8], attr_name: &str, offset: usize) -> Result<IppValue> {
    let malformed = |reason: String| DruckwerkError::MalformedAttribute {
        attribute: attr_name.to_string(),
        offset,
        reason,
    };

    let Some(value_tag) = ValueTag::from_u8(tag) else {
        warn!(
            tag,
            attribute = attr_name,
            "unrecognized value tag, preserving raw bytes"
        );
        return Ok(IppValue::Other {
            tag,
            data: raw.to_vec(),
        });
    };

    match value_tag {
        ValueTag::Integer | ValueTag::Enum => {
            if raw.len() != 4 {
                return Err(malformed(format!(
                    "integer value is {} bytes, expected 4",
                    raw.len()
                )));
            }
            let v = i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
            Ok(if value_tag == ValueTag::Integer {
                IppValue::Integer(v)
            } else {
                IppValue::Enum(v)
            })
        }
        ValueTag::Boolean => {
            if raw.len() != 1 {
                return Err(malformed(format!(
                    "boolean value is {} bytes, expected 1",
                    raw.len()
                )));
            }
            Ok(IppValue::Boolean(raw[0] != 0))
        }
        ValueTag::OctetString => Ok(IppValue::OctetString(raw.to_vec())),
        ValueTag::DateTime => {
            if raw.len() != 11 {
                return Err(malformed(format!(
                    "dateTime value is {} bytes, expected 11",
                    raw.len()
                )));
            }
            let direction = raw[8];
            if direction != b'+' && direction != b'-' {
                return Err(malformed(format!(
                    "dateTime UTC direction is 0x{direction:02x}, expected '+' or '-'"
                )));
            }
            Ok(IppValue::DateTime(IppDateTime {
                year: u16::from_be_bytes([raw[0], raw[1]]),
                month: raw[2],
                day: raw[3],
                hour: raw[4],
                minute: raw[5],
                second: raw[6],
                deci_second: raw[7],
                utc_direction: direction,
                utc_hours: raw[9],
                utc_minutes: raw[10],
            }))
        }
        ValueTag::Resolution => {
            if raw.len() != 9 {
                return Err(malformed(format!(
                    "resolution value is {} bytes, expected 9",
                    raw.len()
                )));
            }
            Ok(IppValue::Resolution {
                cross_feed: i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]),
                feed: i32::from_be_bytes([raw[4], raw[5], raw[6], raw[7]]),
                units: raw[8] as i8,
            })
        }
        ValueTag::RangeOfInteger => {
            if raw.len() != 8 {
                return Err(malformed(format!(
                    "rangeOfInteger value is {} bytes, expected 8",
                    raw.len()
                )));
            }
            Ok(IppValue::RangeOfInteger {
                lower: i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]),
                upper: i32::from_be_bytes([raw[4], raw[5], raw[6], raw[7]]),
            })
        }
        ValueTag::TextWithLanguage | ValueTag::NameWithLanguage => {
            let (language, content) = split_with_language(raw)
                .ok_or_else(|| malformed("malformed withLanguage value".into()))?;
            Ok(if value_tag == ValueTag::TextWithLanguage {
                IppValue::TextWithLanguage {
                    language,
                    text: content,
                }
            } else {
                IppValue::NameWithLanguage {
                    language,
                    name: content,
                }
            })
        }
        ValueTag::TextWithoutLanguage
        | ValueTag::NameWithoutLanguage
        | ValueTag::Keyword
        | ValueTag::Uri
        | ValueTag::UriScheme
        | ValueTag::Charset
        | ValueTag::NaturalLanguage
        | ValueTag::MimeMediaType => {
            let s = std::str::from_utf8(raw)
                .map_err(|_| malformed("value is not valid UTF-8".into()))?
                .to_string();
            Ok(match value_tag {
                ValueTag::TextWithoutLanguage => IppValue::Text(s),
                ValueTag::NameWithoutLanguage => IppValue::Name(s),
                ValueTag::Keyword => IppValue::Keyword(s),
                ValueTag::Uri => IppValue::Uri(s),
                ValueTag::UriScheme => IppValue::UriScheme(s),
                ValueTag::Charset => IppValue::Charset(s),
                ValueTag::NaturalLanguage => IppValue::NaturalLanguage(s),
                _ => IppValue::MimeMediaType(s),
            })
        }
        ValueTag::NoValue => Ok(IppValue::NoValue),
        ValueTag::Unknown => Ok(IppValue::Unknown),
        ValueTag::Unsupported => Ok(IppValue::Unsupported),
        ValueTag::BegCollection | ValueTag::EndCollection | ValueTag::MemberAttrName => Err(
            malformed("collection delimiter outside a collection".into()),
        ),
    }
}

/// Split an RFC 8010 §3.9 withLanguage value into (language, content).
fn split_with_language(raw: &[u8]) -> Option<(String, String)> {
    if raw.len() < 2 {
        return None;
    }
    let lang_len = u16::from_be_bytes([raw[0], raw[1]]) as usize;
    let lang_end = 2 + lang_len;
    if raw.len() < lang_end + 2 {
        return None;
    }
    let language = std::str::from_utf8(&raw[2..lang_end]).ok()?.to_string();
    let content_len = u16::from_be_bytes([raw[lang_end], raw[lang_end + 1]]) as usize;
    let content_start = lang_end + 2;
    if raw.len() != content_start + content_len {
        return None;
    }
    let content = std::str::from_utf8(&raw[content_start..]).ok()?.to_string();
    Some((language, content))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
