// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wire-level constants of the IPP binary encoding: delimiter tags, value
// tags, operation ids, and status codes (RFC 8010 §3.5, RFC 8011 §4/§5).

use serde::{Deserialize, Serialize};

/// IPP protocol version carried in the first two bytes of every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IppVersion {
    pub major: u8,
    pub minor: u8,
}

impl IppVersion {
    pub const V1_1: IppVersion = IppVersion { major: 1, minor: 1 };
    pub const V2_0: IppVersion = IppVersion { major: 2, minor: 0 };
}

impl std::fmt::Display for IppVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Attribute-group delimiter tags (RFC 8010 §3.5.1).
///
/// Delimiters occupy the byte range 0x00..=0x0F; anything above is a value
/// tag belonging to an attribute record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DelimiterTag {
    OperationAttributes,
    JobAttributes,
    EndOfAttributes,
    PrinterAttributes,
    UnsupportedAttributes,
}

impl DelimiterTag {
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::OperationAttributes),
            0x02 => Some(Self::JobAttributes),
            0x03 => Some(Self::EndOfAttributes),
            0x04 => Some(Self::PrinterAttributes),
            0x05 => Some(Self::UnsupportedAttributes),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::OperationAttributes => 0x01,
            Self::JobAttributes => 0x02,
            Self::EndOfAttributes => 0x03,
            Self::PrinterAttributes => 0x04,
            Self::UnsupportedAttributes => 0x05,
        }
    }
}

/// Attribute value tags (RFC 8010 §3.5.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueTag {
    // Out-of-band markers.
    Unsupported,
    Unknown,
    NoValue,
    // Integer types.
    Integer,
    Boolean,
    Enum,
    // Octet-string types.
    OctetString,
    DateTime,
    Resolution,
    RangeOfInteger,
    BegCollection,
    TextWithLanguage,
    NameWithLanguage,
    EndCollection,
    // Character-string types.
    TextWithoutLanguage,
    NameWithoutLanguage,
    Keyword,
    Uri,
    UriScheme,
    Charset,
    NaturalLanguage,
    MimeMediaType,
    MemberAttrName,
}

impl ValueTag {
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x10 => Some(Self::Unsupported),
            0x12 => Some(Self::Unknown),
            0x13 => Some(Self::NoValue),
            0x21 => Some(Self::Integer),
            0x22 => Some(Self::Boolean),
            0x23 => Some(Self::Enum),
            0x30 => Some(Self::OctetString),
            0x31 => Some(Self::DateTime),
            0x32 => Some(Self::Resolution),
            0x33 => Some(Self::RangeOfInteger),
            0x34 => Some(Self::BegCollection),
            0x35 => Some(Self::TextWithLanguage),
            0x36 => Some(Self::NameWithLanguage),
            0x37 => Some(Self::EndCollection),
            0x41 => Some(Self::TextWithoutLanguage),
            0x42 => Some(Self::NameWithoutLanguage),
            0x44 => Some(Self::Keyword),
            0x45 => Some(Self::Uri),
            0x46 => Some(Self::UriScheme),
            0x47 => Some(Self::Charset),
            0x48 => Some(Self::NaturalLanguage),
            0x49 => Some(Self::MimeMediaType),
            0x4A => Some(Self::MemberAttrName),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Unsupported => 0x10,
            Self::Unknown => 0x12,
            Self::NoValue => 0x13,
            Self::Integer => 0x21,
            Self::Boolean => 0x22,
            Self::Enum => 0x23,
            Self::OctetString => 0x30,
            Self::DateTime => 0x31,
            Self::Resolution => 0x32,
            Self::RangeOfInteger => 0x33,
            Self::BegCollection => 0x34,
            Self::TextWithLanguage => 0x35,
            Self::NameWithLanguage => 0x36,
            Self::EndCollection => 0x37,
            Self::TextWithoutLanguage => 0x41,
            Self::NameWithoutLanguage => 0x42,
            Self::Keyword => 0x44,
            Self::Uri => 0x45,
            Self::UriScheme => 0x46,
            Self::Charset => 0x47,
            Self::NaturalLanguage => 0x48,
            Self::MimeMediaType => 0x49,
            Self::MemberAttrName => 0x4A,
        }
    }
}

/// IPP operation ids (RFC 8011 §4, plus the CUPS vendor range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    PrintJob,
    ValidateJob,
    CreateJob,
    SendDocument,
    CancelJob,
    GetJobAttributes,
    GetJobs,
    GetPrinterAttributes,
    CupsGetDefault,
    CupsGetPrinters,
}

impl Operation {
    pub fn as_u16(self) -> u16 {
        match self {
            Self::PrintJob => 0x0002,
            Self::ValidateJob => 0x0004,
            Self::CreateJob => 0x0005,
            Self::SendDocument => 0x0006,
            Self::CancelJob => 0x0008,
            Self::GetJobAttributes => 0x0009,
            Self::GetJobs => 0x000A,
            Self::GetPrinterAttributes => 0x000B,
            Self::CupsGetDefault => 0x4001,
            Self::CupsGetPrinters => 0x4002,
        }
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            0x0002 => Some(Self::PrintJob),
            0x0004 => Some(Self::ValidateJob),
            0x0005 => Some(Self::CreateJob),
            0x0006 => Some(Self::SendDocument),
            0x0008 => Some(Self::CancelJob),
            0x0009 => Some(Self::GetJobAttributes),
            0x000A => Some(Self::GetJobs),
            0x000B => Some(Self::GetPrinterAttributes),
            0x4001 => Some(Self::CupsGetDefault),
            0x4002 => Some(Self::CupsGetPrinters),
            _ => None,
        }
    }

    /// The operation name as it appears in RFC 8011 / CUPS documentation.
    pub fn name(self) -> &'static str {
        match self {
            Self::PrintJob => "Print-Job",
            Self::ValidateJob => "Validate-Job",
            Self::CreateJob => "Create-Job",
            Self::SendDocument => "Send-Document",
            Self::CancelJob => "Cancel-Job",
            Self::GetJobAttributes => "Get-Job-Attributes",
            Self::GetJobs => "Get-Jobs",
            Self::GetPrinterAttributes => "Get-Printer-Attributes",
            Self::CupsGetDefault => "CUPS-Get-Default",
            Self::CupsGetPrinters => "CUPS-Get-Printers",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// IPP status code (RFC 8011 §4.1.8 / appendix B).
///
/// Stored as the raw u16 so unknown vendor codes survive a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const SUCCESSFUL_OK: StatusCode = StatusCode(0x0000);
    pub const OK_IGNORED_OR_SUBSTITUTED: StatusCode = StatusCode(0x0001);
    pub const OK_CONFLICTING: StatusCode = StatusCode(0x0002);

    pub const CLIENT_ERROR_BAD_REQUEST: StatusCode = StatusCode(0x0400);
    pub const CLIENT_ERROR_FORBIDDEN: StatusCode = StatusCode(0x0401);
    pub const CLIENT_ERROR_NOT_AUTHENTICATED: StatusCode = StatusCode(0x0402);
    pub const CLIENT_ERROR_NOT_AUTHORIZED: StatusCode = StatusCode(0x0403);
    pub const CLIENT_ERROR_NOT_POSSIBLE: StatusCode = StatusCode(0x0404);
    pub const CLIENT_ERROR_TIMEOUT: StatusCode = StatusCode(0x0405);
    pub const CLIENT_ERROR_NOT_FOUND: StatusCode = StatusCode(0x0406);
    pub const CLIENT_ERROR_GONE: StatusCode = StatusCode(0x0407);
    pub const CLIENT_ERROR_REQUEST_ENTITY_TOO_LARGE: StatusCode = StatusCode(0x0408);
    pub const CLIENT_ERROR_DOCUMENT_FORMAT_NOT_SUPPORTED: StatusCode = StatusCode(0x040A);
    pub const CLIENT_ERROR_ATTRIBUTES_NOT_SUPPORTED: StatusCode = StatusCode(0x040B);

    pub const SERVER_ERROR_INTERNAL: StatusCode = StatusCode(0x0500);
    pub const SERVER_ERROR_OPERATION_NOT_SUPPORTED: StatusCode = StatusCode(0x0501);
    pub const SERVER_ERROR_SERVICE_UNAVAILABLE: StatusCode = StatusCode(0x0502);
    pub const SERVER_ERROR_VERSION_NOT_SUPPORTED: StatusCode = StatusCode(0x0503);
    pub const SERVER_ERROR_DEVICE_ERROR: StatusCode = StatusCode(0x0504);
    pub const SERVER_ERROR_TEMPORARY_ERROR: StatusCode = StatusCode(0x0505);
    pub const SERVER_ERROR_NOT_ACCEPTING_JOBS: StatusCode = StatusCode(0x0506);
    pub const SERVER_ERROR_BUSY: StatusCode = StatusCode(0x0507);
    pub const SERVER_ERROR_JOB_CANCELED: StatusCode = StatusCode(0x0508);

    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// The 0x0000..=0x00FF block is the successful range.
    pub fn is_success(self) -> bool {
        self.0 <= 0x00FF
    }

    /// RFC 8011 keyword for the well-known codes, "unknown" otherwise.
    pub fn keyword(self) -> &'static str {
        match self.0 {
            0x0000 => "successful-ok",
            0x0001 => "successful-ok-ignored-or-substituted-attributes",
            0x0002 => "successful-ok-conflicting-attributes",
            0x0400 => "client-error-bad-request",
            0x0401 => "client-error-forbidden",
            0x0402 => "client-error-not-authenticated",
            0x0403 => "client-error-not-authorized",
            0x0404 => "client-error-not-possible",
            0x0405 => "client-error-timeout",
            0x0406 => "client-error-not-found",
            0x0407 => "client-error-gone",
            0x0408 => "client-error-request-entity-too-large",
            0x040A => "client-error-document-format-not-supported",
            0x040B => "client-error-attributes-or-values-not-supported",
            0x0500 => "server-error-internal-error",
            0x0501 => "server-error-operation-not-supported",
            0x0502 => "server-error-service-unavailable",
            0x0503 => "server-error-version-not-supported",
            0x0504 => "server-error-device-error",
            0x0505 => "server-error-temporary-error",
            0x0506 => "server-error-not-accepting-jobs",
            0x0507 => "server-error-busy",
            0x0508 => "server-error-job-canceled",
            _ => "unknown",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (0x{:04x})", self.keyword(), self.0)
    }
}

/// Well-known attribute names used when building requests and reading
/// responses.
pub mod name {
    pub const ATTRIBUTES_CHARSET: &str = "attributes-charset";
    pub const ATTRIBUTES_NATURAL_LANGUAGE: &str = "attributes-natural-language";
    pub const STATUS_MESSAGE: &str = "status-message";
    pub const REQUESTED_ATTRIBUTES: &str = "requested-attributes";
    pub const REQUESTING_USER_NAME: &str = "requesting-user-name";
    pub const DOCUMENT_FORMAT: &str = "document-format";
    pub const DOCUMENT_NAME: &str = "document-name";
    pub const LAST_DOCUMENT: &str = "last-document";
    pub const JOB_ID: &str = "job-id";
    pub const JOB_URI: &str = "job-uri";
    pub const JOB_NAME: &str = "job-name";
    pub const JOB_STATE: &str = "job-state";
    pub const JOB_STATE_REASONS: &str = "job-state-reasons";
    pub const PRINTER_URI: &str = "printer-uri";
    pub const PRINTER_URI_SUPPORTED: &str = "printer-uri-supported";
    pub const PRINTER_NAME: &str = "printer-name";
    pub const PRINTER_STATE: &str = "printer-state";
    pub const PRINTER_STATE_REASONS: &str = "printer-state-reasons";
    pub const PRINTER_IS_ACCEPTING_JOBS: &str = "printer-is-accepting-jobs";
    pub const PRINTER_MAKE_AND_MODEL: &str = "printer-make-and-model";
    pub const PRINTER_LOCATION: &str = "printer-location";
    pub const PRINTER_INFO: &str = "printer-info";
    pub const DOCUMENT_FORMAT_SUPPORTED: &str = "document-format-supported";
}
