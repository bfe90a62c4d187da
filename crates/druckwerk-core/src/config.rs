// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the transport and job-submission layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Timeout for establishing a TCP/TLS connection.
    pub connect_timeout: Duration,
    /// Timeout for a whole request/response exchange.  Elapsing surfaces as
    /// a transport failure of kind `Timeout`.
    pub request_timeout: Duration,
    /// Value for `requesting-user-name` when a job does not name a user.
    pub requesting_user: String,
    /// Accept self-signed or otherwise invalid TLS certificates.  Many
    /// printers ship with self-signed certificates, so this is commonly
    /// needed for ipps:// targets.
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            requesting_user: default_user(),
            accept_invalid_certs: false,
        }
    }
}

/// The OS user, falling back to "anonymous" like CUPS itself does.
fn default_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| "anonymous".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_nonzero_timeouts() {
        let config = ClientConfig::default();
        assert!(config.connect_timeout > Duration::ZERO);
        assert!(config.request_timeout > Duration::ZERO);
        assert!(!config.requesting_user.is_empty());
        assert!(!config.accept_invalid_certs);
    }
}
