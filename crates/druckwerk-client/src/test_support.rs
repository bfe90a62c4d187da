// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted transport for unit tests: records every request and replays a
// queued list of responses.

use std::cell::RefCell;
use std::collections::VecDeque;

use druckwerk_core::Result;
use druckwerk_ipp::attribute::{IppAttribute, IppAttributeGroup};
use druckwerk_ipp::message::IppMessage;
use druckwerk_ipp::model::{DelimiterTag, IppVersion, StatusCode};
use druckwerk_ipp::value::IppValue;

use crate::transport::Exchange;

pub(crate) struct ScriptedExchange {
    requests: RefCell<Vec<IppMessage>>,
    responses: RefCell<VecDeque<Result<IppMessage>>>,
}

impl ScriptedExchange {
    pub(crate) fn new(responses: Vec<Result<IppMessage>>) -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            responses: RefCell::new(responses.into()),
        }
    }

    /// The requests seen so far, in order.
    pub(crate) fn requests(&self) -> Vec<IppMessage> {
        self.requests.borrow().clone()
    }
}

impl Exchange for ScriptedExchange {
    fn exchange(&self, request: IppMessage) -> Result<IppMessage> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .expect("scripted transport ran out of responses")
    }
}

/// A successful response with no attribute groups beyond what `groups` adds.
pub(crate) fn ok_response(request_id: u32, groups: Vec<IppAttributeGroup>) -> IppMessage {
    let mut msg = IppMessage::new(
        IppVersion::V1_1,
        StatusCode::SUCCESSFUL_OK.as_u16(),
        request_id,
    );
    msg.groups = groups;
    msg
}

/// A job-attributes group announcing a freshly created job.
pub(crate) fn job_group(job_id: i32, state: Option<i32>) -> IppAttributeGroup {
    let mut group = IppAttributeGroup::new(DelimiterTag::JobAttributes);
    group.push(IppAttribute::single("job-id", IppValue::Integer(job_id)));
    group.push(IppAttribute::single(
        "job-uri",
        IppValue::Uri(format!("ipp://server/jobs/{job_id}")),
    ));
    if let Some(state) = state {
        group.push(IppAttribute::single("job-state", IppValue::Enum(state)));
    }
    group
}

/// An error response with the given status code.
pub(crate) fn error_response(request_id: u32, status: StatusCode) -> IppMessage {
    IppMessage::new(IppVersion::V1_1, status.as_u16(), request_id)
}
