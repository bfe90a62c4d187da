// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Druckwerk.

use thiserror::Error;

/// How a transport-level failure came about.
///
/// Callers deciding on a retry policy need to tell a timed-out request apart
/// from a refused connection or a TLS negotiation failure, so the kind is
/// carried separately from the human-readable detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    /// TCP connect failed (refused, unreachable, DNS).
    Connect,
    /// The caller-configured timeout elapsed before a response arrived.
    Timeout,
    /// TLS negotiation or certificate validation failed.
    Tls,
    /// The HTTP exchange itself failed, or a non-2xx status arrived with a
    /// body that is not parsable IPP.
    Http,
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Tls => "tls",
            Self::Http => "http",
        };
        f.write_str(s)
    }
}

/// Top-level error type for all Druckwerk operations.
#[derive(Debug, Error)]
pub enum DruckwerkError {
    // -- Codec errors --
    #[error("malformed attribute '{attribute}' at offset {offset}: {reason}")]
    MalformedAttribute {
        attribute: String,
        offset: usize,
        reason: String,
    },

    #[error("attribute '{attribute}' holds {actual}, not {expected}")]
    TypeMismatch {
        attribute: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("message truncated at offset {offset}: {needed} more byte(s) required")]
    TruncatedMessage { offset: usize, needed: usize },

    // -- Transport errors --
    #[error("transport failure ({kind}): {detail}")]
    Transport {
        kind: TransportFailure,
        detail: String,
    },

    #[error("invalid printer URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    // -- Protocol-level failure: a well-formed IPP response with a
    // -- non-success status code.  Never swallowed, never retried here.
    #[error("server returned IPP status 0x{code:04x}: {message}")]
    Protocol {
        code: u16,
        message: String,
        /// Names from the unsupported-attributes group, when the server
        /// returned one.
        unsupported: Vec<String>,
    },

    #[error("response to {operation} is missing required attribute '{attribute}'")]
    MissingAttribute {
        operation: &'static str,
        attribute: &'static str,
    },

    // -- Directory --
    #[error("printer '{name}' not found")]
    PrinterNotFound { name: String },

    // -- Job submission --
    #[error("document {document_index} of job {job_id} failed: {source}")]
    MultiDocument {
        job_id: i32,
        document_index: usize,
        #[source]
        source: Box<DruckwerkError>,
    },

    #[error("invalid job transition: {from} -> {to}")]
    InvalidJobTransition { from: String, to: String },
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DruckwerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_display_includes_kind() {
        let err = DruckwerkError::Transport {
            kind: TransportFailure::Timeout,
            detail: "request timed out after 30s".into(),
        };
        let text = err.to_string();
        assert!(text.contains("timeout"));
        assert!(text.contains("30s"));
    }

    #[test]
    fn multi_document_reports_index_and_source() {
        let source = DruckwerkError::Protocol {
            code: 0x0506,
            message: "server-error-not-accepting-jobs".into(),
            unsupported: Vec::new(),
        };
        let err = DruckwerkError::MultiDocument {
            job_id: 42,
            document_index: 1,
            source: Box::new(source),
        };
        let text = err.to_string();
        assert!(text.contains("document 1"));
        assert!(text.contains("job 42"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
