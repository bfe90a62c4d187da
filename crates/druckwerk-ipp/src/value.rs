// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed IPP attribute values.  One enum variant per RFC 8010 value syntax;
// everywhere a value is interpreted the match is exhaustive, so adding a
// syntax forces every consumer to decide what to do with it.

use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};

use crate::model::ValueTag;

/// An RFC 2579 DateAndTime value as it appears on the wire (11 octets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IppDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub deci_second: u8,
    /// b'+' or b'-', the direction of the UTC offset.
    pub utc_direction: u8,
    pub utc_hours: u8,
    pub utc_minutes: u8,
}

impl IppDateTime {
    /// Convert to a chrono timestamp.  Returns `None` for values that do not
    /// name a real instant (month 13, minute 72, ...).
    pub fn to_chrono(&self) -> Option<DateTime<FixedOffset>> {
        let offset_secs =
            i32::from(self.utc_hours) * 3600 + i32::from(self.utc_minutes) * 60;
        let offset = if self.utc_direction == b'-' {
            FixedOffset::west_opt(offset_secs)?
        } else {
            FixedOffset::east_opt(offset_secs)?
        };
        let dt = offset
            .with_ymd_and_hms(
                i32::from(self.year),
                u32::from(self.month),
                u32::from(self.day),
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
            .single()?;
        dt.checked_add_signed(TimeDelta::milliseconds(i64::from(self.deci_second) * 100))
    }

    /// Build from a chrono timestamp, truncating below deciseconds.
    pub fn from_chrono(dt: &DateTime<FixedOffset>) -> Self {
        use chrono::{Datelike, Timelike};
        let offset_secs = dt.offset().local_minus_utc();
        let (direction, offset_secs) = if offset_secs < 0 {
            (b'-', -offset_secs)
        } else {
            (b'+', offset_secs)
        };
        Self {
            year: dt.year() as u16,
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
            deci_second: (dt.timestamp_subsec_millis() / 100) as u8,
            utc_direction: direction,
            utc_hours: (offset_secs / 3600) as u8,
            utc_minutes: (offset_secs % 3600 / 60) as u8,
        }
    }
}

/// One member of a collection value: a name and its (possibly multiple)
/// values, order preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMember {
    pub name: String,
    pub values: Vec<IppValue>,
}

/// A single typed IPP attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IppValue {
    Integer(i32),
    Boolean(bool),
    /// Same wire shape as Integer, distinct semantics (job-state etc.).
    Enum(i32),
    OctetString(Vec<u8>),
    DateTime(IppDateTime),
    Resolution {
        cross_feed: i32,
        feed: i32,
        /// 3 = dots per inch, 4 = dots per centimetre.
        units: i8,
    },
    RangeOfInteger {
        lower: i32,
        upper: i32,
    },
    Collection(Vec<CollectionMember>),
    TextWithLanguage {
        language: String,
        text: String,
    },
    NameWithLanguage {
        language: String,
        name: String,
    },
    Text(String),
    Name(String),
    Keyword(String),
    Uri(String),
    UriScheme(String),
    Charset(String),
    NaturalLanguage(String),
    MimeMediaType(String),
    MemberAttrName(String),
    // Out-of-band markers (RFC 8010 §3.8).
    NoValue,
    Unknown,
    Unsupported,
    /// A value whose tag this implementation does not recognize.  The raw
    /// bytes are preserved so the rest of the message stays usable and the
    /// value survives a re-encode.
    Other {
        tag: u8,
        data: Vec<u8>,
    },
}

impl IppValue {
    /// The wire value-tag byte for this value.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Integer(_) => ValueTag::Integer.as_u8(),
            Self::Boolean(_) => ValueTag::Boolean.as_u8(),
            Self::Enum(_) => ValueTag::Enum.as_u8(),
            Self::OctetString(_) => ValueTag::OctetString.as_u8(),
            Self::DateTime(_) => ValueTag::DateTime.as_u8(),
            Self::Resolution { .. } => ValueTag::Resolution.as_u8(),
            Self::RangeOfInteger { .. } => ValueTag::RangeOfInteger.as_u8(),
            Self::Collection(_) => ValueTag::BegCollection.as_u8(),
            Self::TextWithLanguage { .. } => ValueTag::TextWithLanguage.as_u8(),
            Self::NameWithLanguage { .. } => ValueTag::NameWithLanguage.as_u8(),
            Self::Text(_) => ValueTag::TextWithoutLanguage.as_u8(),
            Self::Name(_) => ValueTag::NameWithoutLanguage.as_u8(),
            Self::Keyword(_) => ValueTag::Keyword.as_u8(),
            Self::Uri(_) => ValueTag::Uri.as_u8(),
            Self::UriScheme(_) => ValueTag::UriScheme.as_u8(),
            Self::Charset(_) => ValueTag::Charset.as_u8(),
            Self::NaturalLanguage(_) => ValueTag::NaturalLanguage.as_u8(),
            Self::MimeMediaType(_) => ValueTag::MimeMediaType.as_u8(),
            Self::MemberAttrName(_) => ValueTag::MemberAttrName.as_u8(),
            Self::NoValue => ValueTag::NoValue.as_u8(),
            Self::Unknown => ValueTag::Unknown.as_u8(),
            Self::Unsupported => ValueTag::Unsupported.as_u8(),
            Self::Other { tag, .. } => *tag,
        }
    }

    /// Human-readable name of the value's syntax, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Enum(_) => "enum",
            Self::OctetString(_) => "octetString",
            Self::DateTime(_) => "dateTime",
            Self::Resolution { .. } => "resolution",
            Self::RangeOfInteger { .. } => "rangeOfInteger",
            Self::Collection(_) => "collection",
            Self::TextWithLanguage { .. } => "textWithLanguage",
            Self::NameWithLanguage { .. } => "nameWithLanguage",
            Self::Text(_) => "textWithoutLanguage",
            Self::Name(_) => "nameWithoutLanguage",
            Self::Keyword(_) => "keyword",
            Self::Uri(_) => "uri",
            Self::UriScheme(_) => "uriScheme",
            Self::Charset(_) => "charset",
            Self::NaturalLanguage(_) => "naturalLanguage",
            Self::MimeMediaType(_) => "mimeMediaType",
            Self::MemberAttrName(_) => "memberAttrName",
            Self::NoValue => "no-value",
            Self::Unknown => "unknown",
            Self::Unsupported => "unsupported",
            Self::Other { .. } => "unrecognized",
        }
    }

    /// Out-of-band markers may be mixed into any attribute without breaking
    /// its one-tag-per-attribute invariant.
    pub fn is_out_of_band(&self) -> bool {
        matches!(self, Self::NoValue | Self::Unknown | Self::Unsupported)
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<i32> {
        match self {
            Self::Enum(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<IppDateTime> {
        match self {
            Self::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    /// The character-string content for any of the string syntaxes.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s)
            | Self::Name(s)
            | Self::Keyword(s)
            | Self::Uri(s)
            | Self::UriScheme(s)
            | Self::Charset(s)
            | Self::NaturalLanguage(s)
            | Self::MimeMediaType(s)
            | Self::MemberAttrName(s) => Some(s),
            Self::TextWithLanguage { text, .. } => Some(text),
            Self::NameWithLanguage { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl std::fmt::Display for IppValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(v) | Self::Enum(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::OctetString(data) => write!(f, "<{} octets>", data.len()),
            Self::DateTime(dt) => match dt.to_chrono() {
                Some(ts) => write!(f, "{}", ts.to_rfc3339()),
                None => write!(f, "<invalid dateTime>"),
            },
            Self::Resolution {
                cross_feed,
                feed,
                units,
            } => {
                let unit = if *units == 3 { "dpi" } else { "dpcm" };
                write!(f, "{cross_feed}x{feed} {unit}")
            }
            Self::RangeOfInteger { lower, upper } => write!(f, "{lower}-{upper}"),
            Self::Collection(members) => write!(f, "<collection of {}>", members.len()),
            Self::TextWithLanguage { text, .. } => f.write_str(text),
            Self::NameWithLanguage { name, .. } => f.write_str(name),
            Self::Text(s)
            | Self::Name(s)
            | Self::Keyword(s)
            | Self::Uri(s)
            | Self::UriScheme(s)
            | Self::Charset(s)
            | Self::NaturalLanguage(s)
            | Self::MimeMediaType(s)
            | Self::MemberAttrName(s) => f.write_str(s),
            Self::NoValue => f.write_str("<no-value>"),
            Self::Unknown => f.write_str("<unknown>"),
            Self::Unsupported => f.write_str("<unsupported>"),
            Self::Other { tag, data } => write!(f, "<tag 0x{tag:02x}, {} octets>", data.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_chrono_round_trip() {
        let dt = IppDateTime {
            year: 2026,
            month: 3,
            day: 14,
            hour: 9,
            minute: 26,
            second: 53,
            deci_second: 5,
            utc_direction: b'+',
            utc_hours: 1,
            utc_minutes: 0,
        };
        let chrono = dt.to_chrono().unwrap();
        assert_eq!(chrono.to_rfc3339(), "2026-03-14T09:26:53.500+01:00");
        assert_eq!(IppDateTime::from_chrono(&chrono), dt);
    }

    #[test]
    fn datetime_rejects_impossible_instants() {
        let dt = IppDateTime {
            year: 2026,
            month: 13,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
            deci_second: 0,
            utc_direction: b'+',
            utc_hours: 0,
            utc_minutes: 0,
        };
        assert!(dt.to_chrono().is_none());
    }

    #[test]
    fn string_accessor_covers_all_string_syntaxes() {
        assert_eq!(IppValue::Keyword("a4".into()).as_str(), Some("a4"));
        assert_eq!(IppValue::Uri("ipp://p".into()).as_str(), Some("ipp://p"));
        assert_eq!(
            IppValue::TextWithLanguage {
                language: "de".into(),
                text: "bereit".into()
            }
            .as_str(),
            Some("bereit")
        );
        assert_eq!(IppValue::Integer(1).as_str(), None);
    }

    #[test]
    fn out_of_band_markers() {
        assert!(IppValue::NoValue.is_out_of_band());
        assert!(IppValue::Unknown.is_out_of_band());
        assert!(IppValue::Unsupported.is_out_of_band());
        assert!(!IppValue::Integer(0).is_out_of_band());
    }
}
