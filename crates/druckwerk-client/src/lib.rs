// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk client — everything that talks to a print server: the blocking
// HTTP transport with Basic/Digest authentication, the printer directory,
// and the print-job manager with its submission state machine.
//
// The protocol engine itself lives in `druckwerk-ipp`; this crate only
// moves messages and interprets responses.

pub mod cups;
pub mod digest;
pub mod directory;
pub mod job;
pub mod request_id;
mod response;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use cups::CupsClient;
pub use directory::{Printer, PrinterDirectory};
pub use job::{
    Document, JobLifecycle, JobManager, JobPhase, JobSelection, JobSummary, PrintJobRequest,
    SubmittedJob,
};
pub use request_id::RequestIdSequence;
pub use transport::{Credentials, Exchange, IppTransport};
