// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print-job submission and tracking.
//
// A single-document job goes out as one Print-Job operation carrying the
// document as payload.  Multi-document jobs use Create-Job followed by one
// Send-Document per document, in caller order, with `last-document = true`
// only on the final one.  Job state afterwards is pull-only: the server
// never pushes transitions, the client polls Get-Job-Attributes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use druckwerk_core::{DruckwerkError, JobHandle, JobState, JobStatus, Result};
use druckwerk_ipp::attribute::IppAttribute;
use druckwerk_ipp::message::{IppMessage, IppRequestBuilder};
use druckwerk_ipp::model::{self, DelimiterTag, Operation};
use druckwerk_ipp::value::IppValue;

use crate::request_id::RequestIdSequence;
use crate::response;
use crate::transport::Exchange;

/// One document of a print job.
#[derive(Debug, Clone)]
pub struct Document {
    /// Shown in the queue as `document-name`.
    pub name: String,
    /// MIME type for `document-format`, e.g. "application/pdf".
    pub format: String,
    pub data: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, format: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            format: format.into(),
            data,
        }
    }
}

/// A print job before submission: target, documents, and job options.
///
/// Options keep insertion order; they are sent as job attributes exactly as
/// given, so callers control what reaches the server.
#[derive(Debug, Clone)]
pub struct PrintJobRequest {
    printer_uri: String,
    job_name: String,
    user_name: Option<String>,
    documents: Vec<Document>,
    options: Vec<(String, IppValue)>,
}

impl PrintJobRequest {
    pub fn new(printer_uri: impl Into<String>, job_name: impl Into<String>) -> Self {
        Self {
            printer_uri: printer_uri.into(),
            job_name: job_name.into(),
            user_name: None,
            documents: Vec::new(),
            options: Vec::new(),
        }
    }

    /// Override the configured requesting user for this job.
    pub fn user(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    /// Append a document.  Order is submission order.
    pub fn document(mut self, document: Document) -> Self {
        self.documents.push(document);
        self
    }

    /// Append an arbitrary job attribute.
    pub fn option(mut self, name: impl Into<String>, value: IppValue) -> Self {
        self.options.push((name.into(), value));
        self
    }

    pub fn copies(self, copies: i32) -> Self {
        self.option("copies", IppValue::Integer(copies))
    }

    /// E.g. "two-sided-long-edge".
    pub fn sides(self, keyword: impl Into<String>) -> Self {
        self.option("sides", IppValue::Keyword(keyword.into()))
    }

    /// E.g. "iso_a4_210x297mm".
    pub fn media(self, keyword: impl Into<String>) -> Self {
        self.option("media", IppValue::Keyword(keyword.into()))
    }

    pub fn printer_uri(&self) -> &str {
        &self.printer_uri
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}

/// Where a job is in its lifecycle.
///
/// `Built` and `Submitted` are client-local; everything after that is the
/// server's `job-state` as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Built,
    Submitted,
    Server(JobState),
}

impl JobPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Server(s) if s.is_terminal())
    }
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Built => f.write_str("built"),
            Self::Submitted => f.write_str("submitted"),
            Self::Server(state) => f.write_str(state.keyword()),
        }
    }
}

/// The lifecycle state machine.
///
/// Legal moves: Built -> Submitted; Submitted -> any non-terminal server
/// state; non-terminal server state -> any server state.  There is no way
/// back to Built or Submitted, and terminal states accept nothing.
#[derive(Debug)]
pub struct JobLifecycle {
    phase: JobPhase,
}

impl JobLifecycle {
    pub fn new() -> Self {
        Self {
            phase: JobPhase::Built,
        }
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    /// Take one step.  Illegal moves leave the phase untouched.
    pub fn advance(&mut self, next: JobPhase) -> Result<()> {
        let legal = match (self.phase, next) {
            (JobPhase::Built, JobPhase::Submitted) => true,
            (JobPhase::Submitted, JobPhase::Server(s)) => !s.is_terminal(),
            (JobPhase::Server(from), JobPhase::Server(_)) => !from.is_terminal(),
            _ => false,
        };
        if !legal {
            return Err(DruckwerkError::InvalidJobTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Record a state reported by the server.
    ///
    /// Polling is lossy: a short job can reach a terminal state before the
    /// first poll, so a terminal state observed straight after submission is
    /// taken via an implied pass through Processing.  Re-observing the same
    /// terminal state is a no-op; a different terminal state afterwards is
    /// an inconsistency and an error.
    pub fn observe(&mut self, state: JobState) -> Result<JobPhase> {
        match self.phase {
            JobPhase::Built => {
                return Err(DruckwerkError::InvalidJobTransition {
                    from: self.phase.to_string(),
                    to: state.to_string(),
                });
            }
            JobPhase::Submitted if state.is_terminal() => {
                debug!(%state, "terminal state in submission response, implying processing");
                self.advance(JobPhase::Server(JobState::Processing))?;
                self.advance(JobPhase::Server(state))?;
            }
            JobPhase::Server(from) if from.is_terminal() => {
                if from != state {
                    return Err(DruckwerkError::InvalidJobTransition {
                        from: from.to_string(),
                        to: state.to_string(),
                    });
                }
            }
            _ => self.advance(JobPhase::Server(state))?,
        }
        Ok(self.phase)
    }
}

impl Default for JobLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// A job the server has accepted, with its tracked lifecycle.
#[derive(Debug)]
pub struct SubmittedJob {
    pub handle: JobHandle,
    lifecycle: JobLifecycle,
}

impl SubmittedJob {
    pub fn phase(&self) -> JobPhase {
        self.lifecycle.phase()
    }
}

/// Which jobs a Get-Jobs listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSelection {
    NotCompleted,
    Completed,
    All,
}

impl JobSelection {
    fn keyword(self) -> &'static str {
        match self {
            Self::NotCompleted => "not-completed",
            Self::Completed => "completed",
            Self::All => "all",
        }
    }
}

/// One row of a Get-Jobs listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: i32,
    pub name: String,
    pub state: Option<JobState>,
    pub user: Option<String>,
}

/// Submits, polls, and cancels jobs over one transport.
pub struct JobManager<T: Exchange> {
    transport: T,
    ids: Arc<RequestIdSequence>,
    default_user: String,
}

impl<T: Exchange> JobManager<T> {
    pub fn new(transport: T, ids: Arc<RequestIdSequence>, default_user: impl Into<String>) -> Self {
        Self {
            transport,
            ids,
            default_user: default_user.into(),
        }
    }

    fn user_for(&self, request: &PrintJobRequest) -> String {
        request
            .user_name
            .clone()
            .unwrap_or_else(|| self.default_user.clone())
    }

    /// Submit a job.
    ///
    /// One document goes out as Print-Job; zero or several use Create-Job
    /// plus Send-Document per document.  A job created with no documents
    /// stays open on the server until [`send_document`](Self::send_document)
    /// delivers one marked last.
    #[instrument(skip(self, request), fields(printer = %request.printer_uri, job = %request.job_name, documents = request.documents.len()))]
    pub fn submit(&self, request: &PrintJobRequest) -> Result<SubmittedJob> {
        if request.documents.len() == 1 {
            self.submit_print_job(request)
        } else {
            self.submit_create_job(request)
        }
    }

    fn submit_print_job(&self, request: &PrintJobRequest) -> Result<SubmittedJob> {
        let document = &request.documents[0];
        let mut builder = IppRequestBuilder::new(Operation::PrintJob, self.ids.next())
            .operation_attribute(IppAttribute::single(
                model::name::PRINTER_URI,
                IppValue::Uri(request.printer_uri.clone()),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::REQUESTING_USER_NAME,
                IppValue::Name(self.user_for(request)),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::JOB_NAME,
                IppValue::Name(request.job_name.clone()),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::DOCUMENT_NAME,
                IppValue::Name(document.name.clone()),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::DOCUMENT_FORMAT,
                IppValue::MimeMediaType(document.format.clone()),
            ));
        for (name, value) in &request.options {
            builder = builder.job_attribute(IppAttribute::single(name.clone(), value.clone()));
        }
        let message = builder.payload(document.data.clone()).build();

        let response = self.transport.exchange(message)?;
        response::check_status(&response, Operation::PrintJob)?;
        self.accept_submission(request, &response, Operation::PrintJob)
    }

    fn submit_create_job(&self, request: &PrintJobRequest) -> Result<SubmittedJob> {
        let mut builder = IppRequestBuilder::new(Operation::CreateJob, self.ids.next())
            .operation_attribute(IppAttribute::single(
                model::name::PRINTER_URI,
                IppValue::Uri(request.printer_uri.clone()),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::REQUESTING_USER_NAME,
                IppValue::Name(self.user_for(request)),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::JOB_NAME,
                IppValue::Name(request.job_name.clone()),
            ));
        for (name, value) in &request.options {
            builder = builder.job_attribute(IppAttribute::single(name.clone(), value.clone()));
        }

        let response = self.transport.exchange(builder.build())?;
        response::check_status(&response, Operation::CreateJob)?;
        let mut job = self.accept_submission(request, &response, Operation::CreateJob)?;

        let total = request.documents.len();
        for (index, document) in request.documents.iter().enumerate() {
            let last = index + 1 == total;
            self.send_document_inner(&mut job, document, last, self.user_for(request))
                .map_err(|source| DruckwerkError::MultiDocument {
                    job_id: job.handle.id,
                    document_index: index,
                    source: Box::new(source),
                })?;
        }

        info!(job_id = job.handle.id, documents = total, "job submitted");
        Ok(job)
    }

    /// Turn a successful Print-Job/Create-Job response into a tracked job.
    fn accept_submission(
        &self,
        request: &PrintJobRequest,
        response: &IppMessage,
        operation: Operation,
    ) -> Result<SubmittedJob> {
        let id = response::required_job_id(response, operation)?;
        let handle = JobHandle {
            id,
            job_uri: response::job_uri(response),
            printer_uri: request.printer_uri.clone(),
        };

        let mut lifecycle = JobLifecycle::new();
        lifecycle.advance(JobPhase::Submitted)?;
        if let Some(state) = response::job_state(response)? {
            lifecycle.observe(state)?;
        }
        debug!(job_id = id, phase = %lifecycle.phase(), "submission accepted");
        Ok(SubmittedJob { handle, lifecycle })
    }

    /// Deliver one more document to an open job (Send-Document).
    pub fn send_document(
        &self,
        job: &mut SubmittedJob,
        document: &Document,
        last: bool,
    ) -> Result<()> {
        self.send_document_inner(job, document, last, self.default_user.clone())
    }

    fn send_document_inner(
        &self,
        job: &mut SubmittedJob,
        document: &Document,
        last: bool,
        user: String,
    ) -> Result<()> {
        let message = IppRequestBuilder::new(Operation::SendDocument, self.ids.next())
            .operation_attribute(IppAttribute::single(
                model::name::PRINTER_URI,
                IppValue::Uri(job.handle.printer_uri.clone()),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::JOB_ID,
                IppValue::Integer(job.handle.id),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::REQUESTING_USER_NAME,
                IppValue::Name(user),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::DOCUMENT_NAME,
                IppValue::Name(document.name.clone()),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::DOCUMENT_FORMAT,
                IppValue::MimeMediaType(document.format.clone()),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::LAST_DOCUMENT,
                IppValue::Boolean(last),
            ))
            .payload(document.data.clone())
            .build();

        let response = self.transport.exchange(message)?;
        response::check_status(&response, Operation::SendDocument)?;
        if let Some(state) = response::job_state(&response)? {
            job.lifecycle.observe(state)?;
        }
        debug!(job_id = job.handle.id, document = %document.name, last, "document sent");
        Ok(())
    }

    /// Ask the server whether it would accept this job (Validate-Job).
    /// Nothing is printed and no job is created.
    #[instrument(skip(self, request), fields(printer = %request.printer_uri))]
    pub fn validate(&self, request: &PrintJobRequest) -> Result<()> {
        let mut builder = IppRequestBuilder::new(Operation::ValidateJob, self.ids.next())
            .operation_attribute(IppAttribute::single(
                model::name::PRINTER_URI,
                IppValue::Uri(request.printer_uri.clone()),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::REQUESTING_USER_NAME,
                IppValue::Name(self.user_for(request)),
            ));
        if let Some(document) = request.documents.first() {
            builder = builder.operation_attribute(IppAttribute::single(
                model::name::DOCUMENT_FORMAT,
                IppValue::MimeMediaType(document.format.clone()),
            ));
        }
        for (name, value) in &request.options {
            builder = builder.job_attribute(IppAttribute::single(name.clone(), value.clone()));
        }

        let response = self.transport.exchange(builder.build())?;
        response::check_status(&response, Operation::ValidateJob)
    }

    /// Current server-side state of a job (Get-Job-Attributes).
    #[instrument(skip(self, handle), fields(job_id = handle.id))]
    pub fn status(&self, handle: &JobHandle) -> Result<JobStatus> {
        let message = IppRequestBuilder::new(Operation::GetJobAttributes, self.ids.next())
            .operation_attribute(IppAttribute::single(
                model::name::PRINTER_URI,
                IppValue::Uri(handle.printer_uri.clone()),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::JOB_ID,
                IppValue::Integer(handle.id),
            ))
            .operation_attribute(IppAttribute::new(
                model::name::REQUESTED_ATTRIBUTES,
                vec![
                    IppValue::Keyword(model::name::JOB_STATE.into()),
                    IppValue::Keyword(model::name::JOB_STATE_REASONS.into()),
                ],
            )?)
            .build();

        let response = self.transport.exchange(message)?;
        response::check_status(&response, Operation::GetJobAttributes)?;

        let state =
            response::job_state(&response)?.ok_or(DruckwerkError::MissingAttribute {
                operation: Operation::GetJobAttributes.name(),
                attribute: model::name::JOB_STATE,
            })?;
        Ok(JobStatus {
            state,
            reasons: response::job_state_reasons(&response),
        })
    }

    /// Poll once and fold the observed state into the job's lifecycle.
    pub fn poll(&self, job: &mut SubmittedJob) -> Result<JobPhase> {
        let status = self.status(&job.handle)?;
        job.lifecycle.observe(status.state)
    }

    /// Cancel a job (Cancel-Job).  Success means the server accepted the
    /// cancellation; the state observed by the next poll is authoritative.
    #[instrument(skip(self, handle), fields(job_id = handle.id))]
    pub fn cancel(&self, handle: &JobHandle) -> Result<()> {
        let message = IppRequestBuilder::new(Operation::CancelJob, self.ids.next())
            .operation_attribute(IppAttribute::single(
                model::name::PRINTER_URI,
                IppValue::Uri(handle.printer_uri.clone()),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::JOB_ID,
                IppValue::Integer(handle.id),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::REQUESTING_USER_NAME,
                IppValue::Name(self.default_user.clone()),
            ))
            .build();

        let response = self.transport.exchange(message)?;
        response::check_status(&response, Operation::CancelJob)?;
        info!(job_id = handle.id, "cancel accepted");
        Ok(())
    }

    /// List jobs on a printer (Get-Jobs).  Groups the server populated
    /// without a job-id are skipped.
    #[instrument(skip(self))]
    pub fn jobs(&self, printer_uri: &str, selection: JobSelection) -> Result<Vec<JobSummary>> {
        let message = IppRequestBuilder::new(Operation::GetJobs, self.ids.next())
            .operation_attribute(IppAttribute::single(
                model::name::PRINTER_URI,
                IppValue::Uri(printer_uri.to_string()),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::REQUESTING_USER_NAME,
                IppValue::Name(self.default_user.clone()),
            ))
            .operation_attribute(IppAttribute::single(
                "which-jobs",
                IppValue::Keyword(selection.keyword().into()),
            ))
            .operation_attribute(IppAttribute::new(
                model::name::REQUESTED_ATTRIBUTES,
                vec![
                    IppValue::Keyword(model::name::JOB_ID.into()),
                    IppValue::Keyword(model::name::JOB_NAME.into()),
                    IppValue::Keyword(model::name::JOB_STATE.into()),
                    IppValue::Keyword("job-originating-user-name".into()),
                ],
            )?)
            .build();

        let response = self.transport.exchange(message)?;
        response::check_status(&response, Operation::GetJobs)?;

        let mut summaries = Vec::new();
        for group in response.groups_of(DelimiterTag::JobAttributes) {
            let Some(id) = group
                .get(model::name::JOB_ID)
                .and_then(|a| a.value().as_integer())
            else {
                warn!("job group without job-id, skipped");
                continue;
            };
            summaries.push(JobSummary {
                id,
                name: group
                    .get(model::name::JOB_NAME)
                    .and_then(|a| a.value().as_str())
                    .unwrap_or_default()
                    .to_string(),
                state: group
                    .get(model::name::JOB_STATE)
                    .and_then(|a| a.value().as_enum())
                    .and_then(JobState::from_value),
                user: group
                    .get("job-originating-user-name")
                    .and_then(|a| a.value().as_str())
                    .map(str::to_string),
            });
        }
        debug!(count = summaries.len(), "job listing received");
        Ok(summaries)
    }
}
