// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP Digest authentication (RFC 7616, with RFC 2617 compatibility).
// CUPS servers commonly challenge with Digest when a queue requires
// authentication; the transport answers the challenge on a single retry.

use md5::Md5;
use sha2::{Digest, Sha256};

/// Hash algorithm named by the challenge.  MD5 is the RFC 2617 default and
/// still what CUPS sends; SHA-256 is the RFC 7616 upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Sha256,
}

impl DigestAlgorithm {
    fn token(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha256 => "SHA-256",
        }
    }

    fn hash(self, input: &str) -> String {
        match self {
            Self::Md5 => hex::encode(Md5::digest(input.as_bytes())),
            Self::Sha256 => hex::encode(Sha256::digest(input.as_bytes())),
        }
    }
}

/// A parsed `WWW-Authenticate: Digest ...` challenge.
#[derive(Debug, Clone)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    /// The qop this client will use, when the server offered "auth".
    pub qop: Option<String>,
    pub algorithm: DigestAlgorithm,
}

impl DigestChallenge {
    /// Parse the header value.  Returns `None` when the scheme is not
    /// Digest or required parameters are missing.
    pub fn parse(header: &str) -> Option<Self> {
        let rest = header.trim().strip_prefix("Digest")?;
        let params = split_params(rest);

        let lookup = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.clone())
        };

        let realm = lookup("realm")?;
        let nonce = lookup("nonce")?;
        let opaque = lookup("opaque");

        // The server offers a comma-separated qop list; "auth" is the only
        // one supported here (auth-int would require hashing the body).
        let qop = lookup("qop").and_then(|offered| {
            offered
                .split(',')
                .map(str::trim)
                .find(|q| q.eq_ignore_ascii_case("auth"))
                .map(str::to_string)
        });

        let algorithm = match lookup("algorithm").as_deref() {
            None => DigestAlgorithm::Md5,
            Some(a) if a.eq_ignore_ascii_case("MD5") => DigestAlgorithm::Md5,
            Some(a) if a.eq_ignore_ascii_case("SHA-256") => DigestAlgorithm::Sha256,
            // MD5-sess and friends are not supported.
            Some(_) => return None,
        };

        Some(Self {
            realm,
            nonce,
            opaque,
            qop,
            algorithm,
        })
    }

    /// Compute the `Authorization` header value for one request.
    ///
    /// `nc` is the nonce count (1 for the first use of a nonce), `cnonce` a
    /// client-chosen random token.
    pub fn authorization(
        &self,
        username: &str,
        password: &str,
        method: &str,
        uri: &str,
        cnonce: &str,
        nc: u32,
    ) -> String {
        let ha1 = self
            .algorithm
            .hash(&format!("{username}:{}:{password}", self.realm));
        let ha2 = self.algorithm.hash(&format!("{method}:{uri}"));

        let response = match &self.qop {
            Some(qop) => self.algorithm.hash(&format!(
                "{ha1}:{}:{nc:08x}:{cnonce}:{qop}:{ha2}",
                self.nonce
            )),
            // RFC 2069 form, for servers that sent no qop.
            None => self.algorithm.hash(&format!("{ha1}:{}:{ha2}", self.nonce)),
        };

        let mut header = format!(
            "Digest username=\"{username}\", realm=\"{}\", nonce=\"{}\", uri=\"{uri}\", \
             response=\"{response}\", algorithm={}",
            self.realm,
            self.nonce,
            self.algorithm.token()
        );
        if let Some(qop) = &self.qop {
            header.push_str(&format!(", qop={qop}, nc={nc:08x}, cnonce=\"{cnonce}\""));
        }
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(", opaque=\"{opaque}\""));
        }
        header
    }
}

/// Split `key=value, key="quoted, value", ...` into pairs, honoring quotes.
fn split_params(input: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        // Skip separators.
        while matches!(chars.peek(), Some(c) if *c == ',' || c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        for c in chars.by_ref() {
            if c == '=' {
                break;
            }
            key.push(c);
        }

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                value.push(c);
            }
        } else {
            while let Some(c) = chars.peek() {
                if *c == ',' {
                    break;
                }
                value.push(*c);
                chars.next();
            }
        }

        let key = key.trim().to_string();
        if !key.is_empty() {
            params.push((key, value.trim().to_string()));
        }
    }
    params
}
