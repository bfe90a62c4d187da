// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared response interpretation: status checking and the attribute
// extractions every operation needs.

use tracing::warn;

use druckwerk_core::{DruckwerkError, JobState, Result};
use druckwerk_ipp::message::IppMessage;
use druckwerk_ipp::model::{self, DelimiterTag, Operation};

/// Fail on a non-success IPP status, carrying the server's status-message
/// and any names from the unsupported-attributes group.
pub(crate) fn check_status(message: &IppMessage, operation: Operation) -> Result<()> {
    let status = message.status();
    if status.is_success() {
        return Ok(());
    }

    let unsupported: Vec<String> = message
        .groups_of(DelimiterTag::UnsupportedAttributes)
        .flat_map(|g| g.attributes().iter().map(|a| a.name().to_string()))
        .collect();
    let text = message
        .status_message()
        .map(str::to_string)
        .unwrap_or_else(|| status.keyword().to_string());

    warn!(%operation, %status, unsupported = unsupported.len(), "request rejected by server");
    Err(DruckwerkError::Protocol {
        code: status.as_u16(),
        message: text,
        unsupported,
    })
}

/// The server-assigned `job-id`, required in every job-creating response.
pub(crate) fn required_job_id(message: &IppMessage, operation: Operation) -> Result<i32> {
    message
        .attr(DelimiterTag::JobAttributes, model::name::JOB_ID)
        .ok_or(DruckwerkError::MissingAttribute {
            operation: operation.name(),
            attribute: model::name::JOB_ID,
        })?
        .as_integer()
}

pub(crate) fn job_uri(message: &IppMessage) -> Option<String> {
    message
        .attr(DelimiterTag::JobAttributes, model::name::JOB_URI)
        .and_then(|a| a.value().as_str())
        .map(str::to_string)
}

/// The `job-state` enum, decoded; an out-of-range value is malformed.
pub(crate) fn job_state(message: &IppMessage) -> Result<Option<JobState>> {
    let Some(attr) = message.attr(DelimiterTag::JobAttributes, model::name::JOB_STATE) else {
        return Ok(None);
    };
    let value = attr.as_enum()?;
    match JobState::from_value(value) {
        Some(state) => Ok(Some(state)),
        None => Err(DruckwerkError::MalformedAttribute {
            attribute: model::name::JOB_STATE.to_string(),
            offset: 0,
            reason: format!("job-state value {value} is outside the defined range 3..=9"),
        }),
    }
}

pub(crate) fn job_state_reasons(message: &IppMessage) -> Vec<String> {
    message
        .attr(DelimiterTag::JobAttributes, model::name::JOB_STATE_REASONS)
        .map(|a| a.strings().iter().map(|s| s.to_string()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use druckwerk_ipp::attribute::{IppAttribute, IppAttributeGroup};
    use druckwerk_ipp::model::{IppVersion, StatusCode};
    use druckwerk_ipp::value::IppValue;

    fn response_with_status(code: StatusCode) -> IppMessage {
        IppMessage::new(IppVersion::V1_1, code.as_u16(), 1)
    }

    #[test]
    fn success_status_passes() {
        let msg = response_with_status(StatusCode::SUCCESSFUL_OK);
        assert!(check_status(&msg, Operation::PrintJob).is_ok());
    }

    #[test]
    fn error_status_carries_unsupported_names() {
        let mut msg = response_with_status(StatusCode::CLIENT_ERROR_ATTRIBUTES_NOT_SUPPORTED);
        let mut group = IppAttributeGroup::new(DelimiterTag::UnsupportedAttributes);
        group.push(IppAttribute::single("job-hold-until", IppValue::Unsupported));
        group.push(IppAttribute::single("finishings", IppValue::Unsupported));
        msg.groups.push(group);

        let err = check_status(&msg, Operation::PrintJob).unwrap_err();
        match err {
            DruckwerkError::Protocol {
                code, unsupported, ..
            } => {
                assert_eq!(code, 0x040B);
                assert_eq!(unsupported, vec!["job-hold-until", "finishings"]);
            }
            other => panic!("expected Protocol, got {other:?}"),
        }
    }

    #[test]
    fn missing_job_id_is_reported_with_operation() {
        let msg = response_with_status(StatusCode::SUCCESSFUL_OK);
        let err = required_job_id(&msg, Operation::CreateJob).unwrap_err();
        match err {
            DruckwerkError::MissingAttribute {
                operation,
                attribute,
            } => {
                assert_eq!(operation, "Create-Job");
                assert_eq!(attribute, "job-id");
            }
            other => panic!("expected MissingAttribute, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_job_state_is_malformed() {
        let mut msg = response_with_status(StatusCode::SUCCESSFUL_OK);
        let mut group = IppAttributeGroup::new(DelimiterTag::JobAttributes);
        group.push(IppAttribute::single("job-state", IppValue::Enum(42)));
        msg.groups.push(group);

        assert!(matches!(
            job_state(&msg).unwrap_err(),
            DruckwerkError::MalformedAttribute { .. }
        ));
    }
}
