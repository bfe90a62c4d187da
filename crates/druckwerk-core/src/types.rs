// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Druckwerk IPP client.

use serde::{Deserialize, Serialize};

/// IPP job-state values (RFC 8011 §5.3.7).
///
/// Assigned by the server and observed by the client via polling; the client
/// never moves a job between these states on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    /// Queued, waiting to be processed.
    Pending,
    /// Held (e.g. job-hold-until), not a candidate for processing yet.
    PendingHeld,
    /// Currently printing.
    Processing,
    /// Processing interrupted (out of paper, jam, ...).
    ProcessingStopped,
    /// Cancelled by a client or operator.
    Canceled,
    /// Aborted by the server.
    Aborted,
    /// Finished successfully.
    Completed,
}

impl JobState {
    /// Decode a wire `job-state` enum value.
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            3 => Some(Self::Pending),
            4 => Some(Self::PendingHeld),
            5 => Some(Self::Processing),
            6 => Some(Self::ProcessingStopped),
            7 => Some(Self::Canceled),
            8 => Some(Self::Aborted),
            9 => Some(Self::Completed),
            _ => None,
        }
    }

    /// The wire enum value for this state.
    pub fn as_value(self) -> i32 {
        match self {
            Self::Pending => 3,
            Self::PendingHeld => 4,
            Self::Processing => 5,
            Self::ProcessingStopped => 6,
            Self::Canceled => 7,
            Self::Aborted => 8,
            Self::Completed => 9,
        }
    }

    /// Whether the job can never leave this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Canceled | Self::Aborted | Self::Completed)
    }

    /// The RFC 8011 keyword for this state.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PendingHeld => "pending-held",
            Self::Processing => "processing",
            Self::ProcessingStopped => "processing-stopped",
            Self::Canceled => "canceled",
            Self::Aborted => "aborted",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// IPP printer-state values (RFC 8011 §5.4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrinterState {
    Idle,
    Processing,
    Stopped,
}

impl PrinterState {
    /// Decode a wire `printer-state` enum value.
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            3 => Some(Self::Idle),
            4 => Some(Self::Processing),
            5 => Some(Self::Stopped),
            _ => None,
        }
    }

    /// The wire enum value for this state.
    pub fn as_value(self) -> i32 {
        match self {
            Self::Idle => 3,
            Self::Processing => 4,
            Self::Stopped => 5,
        }
    }

    /// The RFC 8011 keyword for this state.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for PrinterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Handle to a job that exists on the server.
///
/// The id is assigned by the server in the Print-Job or Create-Job response
/// and is what subsequent Get-Job-Attributes / Cancel-Job operations refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    /// Server-assigned integer job-id.
    pub id: i32,
    /// The `job-uri` attribute, when the server returned one.
    pub job_uri: Option<String>,
    /// URI of the printer the job was submitted to.
    pub printer_uri: String,
}

/// Snapshot of a job's server-side state, produced only from polling
/// responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub state: JobState,
    /// The `job-state-reasons` keywords ("none", "job-printing", ...).
    pub reasons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_state_wire_values_round_trip() {
        for value in 3..=9 {
            let state = JobState::from_value(value).unwrap();
            assert_eq!(state.as_value(), value);
        }
        assert_eq!(JobState::from_value(2), None);
        assert_eq!(JobState::from_value(10), None);
    }

    #[test]
    fn terminal_states() {
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Canceled.is_terminal());
        assert!(JobState::Aborted.is_terminal());
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::PendingHeld.is_terminal());
        assert!(!JobState::Processing.is_terminal());
        assert!(!JobState::ProcessingStopped.is_terminal());
    }

    #[test]
    fn printer_state_wire_values() {
        assert_eq!(PrinterState::from_value(3), Some(PrinterState::Idle));
        assert_eq!(PrinterState::from_value(5), Some(PrinterState::Stopped));
        assert_eq!(PrinterState::from_value(6), None);
    }
}
