// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Convenience façade over one CUPS server: a directory and a job manager
// sharing a transport and one request-id sequence.

use std::sync::Arc;

use druckwerk_core::{ClientConfig, Result};

use crate::directory::{Printer, PrinterDirectory};
use crate::job::{JobManager, PrintJobRequest, SubmittedJob};
use crate::request_id::RequestIdSequence;
use crate::transport::{Credentials, IppTransport};

/// Client for one CUPS server.
pub struct CupsClient {
    config: ClientConfig,
    transport: IppTransport,
    server_uri: String,
    ids: Arc<RequestIdSequence>,
}

impl CupsClient {
    /// Connect to the server at `uri` (e.g. "ipp://localhost:631/").
    pub fn new(uri: &str, config: ClientConfig) -> Result<Self> {
        let transport = IppTransport::new(uri, &config)?;
        Ok(Self {
            config,
            transport,
            server_uri: uri.to_string(),
            ids: Arc::new(RequestIdSequence::new()),
        })
    }

    /// The local CUPS daemon on the default port.
    pub fn localhost() -> Result<Self> {
        Self::new("ipp://localhost:631/", ClientConfig::default())
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.transport = self.transport.with_credentials(credentials);
        self
    }

    /// A directory view.  Shares this client's transport and id sequence.
    pub fn directory(&self) -> PrinterDirectory<IppTransport> {
        PrinterDirectory::new(
            self.transport.clone(),
            self.server_uri.clone(),
            Arc::clone(&self.ids),
            self.config.requesting_user.clone(),
        )
    }

    /// A job manager.  Shares this client's transport and id sequence.
    pub fn jobs(&self) -> JobManager<IppTransport> {
        JobManager::new(
            self.transport.clone(),
            Arc::clone(&self.ids),
            self.config.requesting_user.clone(),
        )
    }

    /// Shorthand: submit a job through a fresh manager.
    pub fn print(&self, request: &PrintJobRequest) -> Result<SubmittedJob> {
        self.jobs().submit(request)
    }

    /// Shorthand: find a printer by name.
    pub fn printer(&self, name: &str) -> Result<Printer> {
        self.directory().find(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_for_local_server() {
        let client = CupsClient::localhost();
        assert!(client.is_ok());
    }

    #[test]
    fn views_share_one_id_sequence() {
        let client = CupsClient::localhost().unwrap();
        let directory = client.directory();
        let jobs = client.jobs();
        assert_eq!(Arc::strong_count(&client.ids), 3);
        drop(directory);
        drop(jobs);
        assert_eq!(Arc::strong_count(&client.ids), 1);
    }
}
