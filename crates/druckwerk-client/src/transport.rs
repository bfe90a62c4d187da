// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blocking HTTP transport for IPP messages.
//
// IPP rides on HTTP POST with Content-Type application/ipp (RFC 8010 §4).
// `ipp://` maps to http on port 631, `ipps://` to https.  One exchange is
// one request/response pair; reqwest's connection pool reuses sockets
// underneath without any shared read/write state leaking across callers.

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use tracing::{debug, instrument, warn};

use druckwerk_core::{ClientConfig, DruckwerkError, Result, TransportFailure};
use druckwerk_ipp::codec;
use druckwerk_ipp::message::IppMessage;

use crate::digest::DigestChallenge;

/// The seam between protocol logic and the network.
///
/// The directory and job manager are generic over this, so tests drive them
/// with scripted responses and production uses [`IppTransport`].
pub trait Exchange {
    /// Send one request and return the decoded response.
    fn exchange(&self, request: IppMessage) -> Result<IppMessage>;
}

/// Username and password for queues that require authentication.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Blocking transport bound to one endpoint.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct IppTransport {
    endpoint: Url,
    http: Client,
    credentials: Option<Credentials>,
}

impl IppTransport {
    /// Build a transport for the given `ipp://`, `ipps://`, `http://` or
    /// `https://` URI.
    pub fn new(uri: &str, config: &ClientConfig) -> Result<Self> {
        let endpoint = endpoint_for(uri)?;

        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout);
        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build().map_err(|e| DruckwerkError::Transport {
            kind: TransportFailure::Http,
            detail: format!("building HTTP client: {e}"),
        })?;

        Ok(Self {
            endpoint,
            http,
            credentials: None,
        })
    }

    /// Attach credentials.  Sent preemptively as Basic; upgraded to Digest
    /// when the server challenges with one.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// The resolved HTTP endpoint this transport posts to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Retry the request once with a Digest answer to the 401 challenge.
    fn answer_digest_challenge(
        &self,
        challenge_header: &str,
        body: &[u8],
    ) -> Result<reqwest::blocking::Response> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            DruckwerkError::Transport {
                kind: TransportFailure::Http,
                detail: "server requires authentication but no credentials were configured".into(),
            }
        })?;

        let challenge = DigestChallenge::parse(challenge_header).ok_or_else(|| {
            DruckwerkError::Transport {
                kind: TransportFailure::Http,
                detail: format!("unsupported authentication challenge: {challenge_header}"),
            }
        })?;

        let cnonce = uuid::Uuid::new_v4().simple().to_string();
        let authorization = challenge.authorization(
            &credentials.username,
            &credentials.password,
            "POST",
            &request_uri(&self.endpoint),
            &cnonce,
            1,
        );

        debug!(realm = %challenge.realm, "answering Digest challenge");
        self.http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/ipp")
            .header(AUTHORIZATION, authorization)
            .body(body.to_vec())
            .send()
            .map_err(classify)
    }
}

impl Exchange for IppTransport {
    #[instrument(skip(self, request), fields(endpoint = %self.endpoint, code = request.code, request_id = request.request_id))]
    fn exchange(&self, request: IppMessage) -> Result<IppMessage> {
        let body = codec::encode(&request)?;

        let mut builder = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/ipp")
            .body(body.clone());
        if let Some(credentials) = &self.credentials {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let mut response = builder.send().map_err(classify)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            let challenge = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            match challenge {
                Some(header) if header.trim_start().starts_with("Digest") => {
                    response = self.answer_digest_challenge(&header, &body)?;
                }
                _ => {
                    return Err(DruckwerkError::Transport {
                        kind: TransportFailure::Http,
                        detail: "authentication rejected (HTTP 401)".into(),
                    });
                }
            }
        }

        let http_status = response.status();
        let bytes = response.bytes().map_err(classify)?;

        // A well-formed IPP body wins over the HTTP status: CUPS reports
        // IPP-level failures inside 200 responses, and some servers pair an
        // HTTP error status with a parsable IPP body.
        match codec::decode(&bytes) {
            Ok(message) => {
                debug!(
                    status = %message.status(),
                    bytes = bytes.len(),
                    "response decoded"
                );
                Ok(message)
            }
            Err(_) if !http_status.is_success() => {
                warn!(%http_status, "HTTP error with unparsable body");
                Err(DruckwerkError::Transport {
                    kind: TransportFailure::Http,
                    detail: format!("HTTP {http_status} with unparsable IPP body"),
                })
            }
            Err(decode_err) => Err(decode_err),
        }
    }
}

/// Map a printer URI to the HTTP endpoint it is served on.
fn endpoint_for(uri: &str) -> Result<Url> {
    let invalid = |reason: String| DruckwerkError::InvalidUri {
        uri: uri.to_string(),
        reason,
    };

    let parsed = Url::parse(uri).map_err(|e| invalid(e.to_string()))?;
    let scheme = match parsed.scheme() {
        "ipp" | "http" => "http",
        "ipps" | "https" => "https",
        other => return Err(invalid(format!("unsupported scheme '{other}'"))),
    };
    let host = parsed
        .host_str()
        .ok_or_else(|| invalid("missing host".into()))?;
    // IPP's registered port, used when the URI names none and the scheme
    // carries no convention of its own.
    let port = parsed.port().unwrap_or(match parsed.scheme() {
        "http" => 80,
        "https" => 443,
        _ => 631,
    });

    let mut rebuilt = format!("{scheme}://{host}:{port}{}", parsed.path());
    if let Some(query) = parsed.query() {
        rebuilt.push('?');
        rebuilt.push_str(query);
    }
    Url::parse(&rebuilt).map_err(|e| invalid(e.to_string()))
}

/// The request-target hashed into Digest's HA2 and echoed in `uri=`:
/// the path plus the query string when one is present (RFC 7616 §3.4).
fn request_uri(endpoint: &Url) -> String {
    match endpoint.query() {
        Some(query) => format!("{}?{query}", endpoint.path()),
        None => endpoint.path().to_string(),
    }
}

/// Sort a reqwest failure into the transport taxonomy.
fn classify(err: reqwest::Error) -> DruckwerkError {
    let detail = err.to_string();
    let kind = if err.is_timeout() {
        TransportFailure::Timeout
    } else if err.is_connect() {
        // TLS handshake failures surface through the connect path; sniff
        // the error chain to tell them apart from plain refusals.
        if error_chain_mentions_tls(&err) {
            TransportFailure::Tls
        } else {
            TransportFailure::Connect
        }
    } else {
        TransportFailure::Http
    };
    DruckwerkError::Transport { kind, detail }
}

fn error_chain_mentions_tls(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(err);
    while let Some(s) = source {
        let text = s.to_string().to_ascii_lowercase();
        if text.contains("tls") || text.contains("certificate") || text.contains("handshake") {
            return true;
        }
        source = s.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipp_scheme_maps_to_http_port_631() {
        let endpoint = endpoint_for("ipp://printserver/printers/office").unwrap();
        assert_eq!(endpoint.scheme(), "http");
        assert_eq!(endpoint.port(), Some(631));
        assert_eq!(endpoint.path(), "/printers/office");
    }

    #[test]
    fn ipps_scheme_maps_to_https() {
        let endpoint = endpoint_for("ipps://printserver:631/ipp/print").unwrap();
        assert_eq!(endpoint.scheme(), "https");
        assert_eq!(endpoint.port(), Some(631));
    }

    #[test]
    fn explicit_port_is_kept() {
        let endpoint = endpoint_for("ipp://host:8631/ipp/print").unwrap();
        assert_eq!(endpoint.port(), Some(8631));
    }

    #[test]
    fn http_scheme_keeps_web_default_port() {
        let endpoint = endpoint_for("http://host/printers/a").unwrap();
        assert_eq!(endpoint.port_or_known_default(), Some(80));
    }

    #[test]
    fn query_string_survives_endpoint_mapping() {
        let endpoint = endpoint_for("ipp://host/printers/office?waitjob=false").unwrap();
        assert_eq!(endpoint.query(), Some("waitjob=false"));
        assert_eq!(
            endpoint.as_str(),
            "http://host:631/printers/office?waitjob=false"
        );
    }

    #[test]
    fn digest_uri_includes_the_query_string() {
        let endpoint = endpoint_for("ipp://host/printers/office?waitjob=false").unwrap();
        assert_eq!(request_uri(&endpoint), "/printers/office?waitjob=false");

        let plain = endpoint_for("ipp://host/printers/office").unwrap();
        assert_eq!(request_uri(&plain), "/printers/office");
    }

    #[test]
    fn garbage_uri_is_invalid() {
        let err = endpoint_for("not a uri at all %%%").unwrap_err();
        assert!(matches!(err, DruckwerkError::InvalidUri { .. }));
    }

    #[test]
    fn unsupported_scheme_is_invalid() {
        let err = endpoint_for("ftp://host/queue").unwrap_err();
        match err {
            DruckwerkError::InvalidUri { reason, .. } => assert!(reason.contains("ftp")),
            other => panic!("expected InvalidUri, got {other:?}"),
        }
    }

    #[test]
    fn transport_builds_for_valid_uri() {
        let config = ClientConfig::default();
        let transport = IppTransport::new("ipp://localhost/printers/office", &config);
        assert!(transport.is_ok());
    }
}
