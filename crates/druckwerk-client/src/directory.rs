// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer directory: enumerating queues on a CUPS server and querying
// individual printer capabilities.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use druckwerk_core::{DruckwerkError, PrinterState, Result};
use druckwerk_ipp::attribute::{IppAttribute, IppAttributeGroup};
use druckwerk_ipp::message::IppRequestBuilder;
use druckwerk_ipp::model::{self, DelimiterTag, Operation};
use druckwerk_ipp::value::IppValue;

use crate::request_id::RequestIdSequence;
use crate::response;
use crate::transport::Exchange;

/// Snapshot of one printer at the moment it was queried.
///
/// The commonly used attributes are lifted into fields; the full attribute
/// group is retained for anything else (media sizes, color modes, vendor
/// extensions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Printer {
    pub name: String,
    /// The `printer-uri-supported` value, usable as a submission target.
    pub uri: String,
    pub state: PrinterState,
    pub state_reasons: Vec<String>,
    pub is_accepting_jobs: bool,
    pub make_and_model: Option<String>,
    pub location: Option<String>,
    pub info: Option<String>,
    pub document_formats: Vec<String>,
    /// When this snapshot was taken; printer state goes stale quickly.
    pub queried_at: DateTime<Utc>,
    attributes: IppAttributeGroup,
}

impl Printer {
    /// Build a snapshot from one printer-attributes group.
    pub(crate) fn from_group(group: &IppAttributeGroup, operation: Operation) -> Result<Self> {
        let required = |name: &'static str| {
            group.get(name).ok_or(DruckwerkError::MissingAttribute {
                operation: operation.name(),
                attribute: name,
            })
        };
        let optional_str = |name: &str| {
            group
                .get(name)
                .and_then(|a| a.value().as_str())
                .map(str::to_string)
        };

        let name = required(model::name::PRINTER_NAME)?.as_str()?.to_string();
        let uri = required(model::name::PRINTER_URI_SUPPORTED)?
            .as_str()?
            .to_string();

        let state_value = required(model::name::PRINTER_STATE)?.as_enum()?;
        let state = PrinterState::from_value(state_value).ok_or_else(|| {
            DruckwerkError::MalformedAttribute {
                attribute: model::name::PRINTER_STATE.to_string(),
                offset: 0,
                reason: format!("printer-state value {state_value} is outside 3..=5"),
            }
        })?;

        let state_reasons = group
            .get(model::name::PRINTER_STATE_REASONS)
            .map(|a| a.strings().iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();
        let is_accepting_jobs = group
            .get(model::name::PRINTER_IS_ACCEPTING_JOBS)
            .and_then(|a| a.value().as_boolean())
            .unwrap_or(true);
        let document_formats = group
            .get(model::name::DOCUMENT_FORMAT_SUPPORTED)
            .map(|a| a.strings().iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();

        Ok(Self {
            name,
            uri,
            state,
            state_reasons,
            is_accepting_jobs,
            make_and_model: optional_str(model::name::PRINTER_MAKE_AND_MODEL),
            location: optional_str(model::name::PRINTER_LOCATION),
            info: optional_str(model::name::PRINTER_INFO),
            document_formats,
            queried_at: Utc::now(),
            attributes: group.clone(),
        })
    }

    /// The full attribute group this snapshot was built from.
    pub fn attributes(&self) -> &IppAttributeGroup {
        &self.attributes
    }

    /// Any attribute by name, lifted field or not.
    pub fn attribute(&self, name: &str) -> Option<&IppAttribute> {
        self.attributes.get(name)
    }

    /// Whether the printer advertises support for the given MIME type.
    pub fn supports_format(&self, mime: &str) -> bool {
        self.document_formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(mime))
    }
}

/// Queries a CUPS server for its queues.
pub struct PrinterDirectory<T: Exchange> {
    transport: T,
    server_uri: String,
    ids: Arc<RequestIdSequence>,
    requesting_user: String,
}

impl<T: Exchange> PrinterDirectory<T> {
    pub fn new(
        transport: T,
        server_uri: impl Into<String>,
        ids: Arc<RequestIdSequence>,
        requesting_user: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            server_uri: server_uri.into(),
            ids,
            requesting_user: requesting_user.into(),
        }
    }

    /// All queues the server knows about (CUPS-Get-Printers).
    ///
    /// A printer group the server populated incompletely is skipped with a
    /// warning rather than failing the whole listing.
    #[instrument(skip(self), fields(server = %self.server_uri))]
    pub fn printers(&self) -> Result<Vec<Printer>> {
        let request = IppRequestBuilder::new(Operation::CupsGetPrinters, self.ids.next())
            .operation_attribute(IppAttribute::single(
                model::name::REQUESTING_USER_NAME,
                IppValue::Name(self.requesting_user.clone()),
            ))
            .build();
        let response = self.transport.exchange(request)?;
        response::check_status(&response, Operation::CupsGetPrinters)?;

        let mut printers = Vec::new();
        for group in response.groups_of(DelimiterTag::PrinterAttributes) {
            match Printer::from_group(group, Operation::CupsGetPrinters) {
                Ok(printer) => printers.push(printer),
                Err(err) => warn!(%err, "skipping incomplete printer group"),
            }
        }
        debug!(count = printers.len(), "printer listing received");
        Ok(printers)
    }

    /// The server's default queue (CUPS-Get-Default), or `None` when the
    /// server has no default configured.
    #[instrument(skip(self), fields(server = %self.server_uri))]
    pub fn default_printer(&self) -> Result<Option<Printer>> {
        let request = IppRequestBuilder::new(Operation::CupsGetDefault, self.ids.next())
            .operation_attribute(IppAttribute::single(
                model::name::REQUESTING_USER_NAME,
                IppValue::Name(self.requesting_user.clone()),
            ))
            .build();
        let response = self.transport.exchange(request)?;

        // "No default printer" is a not-found status, not a failure.
        if let Err(err) = response::check_status(&response, Operation::CupsGetDefault) {
            return match err {
                DruckwerkError::Protocol { code, .. } if code == 0x0406 => Ok(None),
                other => Err(other),
            };
        }

        let printer = match response.groups_of(DelimiterTag::PrinterAttributes).next() {
            Some(group) => Some(Printer::from_group(group, Operation::CupsGetDefault)?),
            None => None,
        };
        Ok(printer)
    }

    /// Find a queue by name, case-insensitively.
    #[instrument(skip(self), fields(server = %self.server_uri))]
    pub fn find(&self, name: &str) -> Result<Printer> {
        self.printers()?
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DruckwerkError::PrinterNotFound {
                name: name.to_string(),
            })
    }

    /// Full capability query for one printer (Get-Printer-Attributes).
    #[instrument(skip(self))]
    pub fn printer_attributes(&self, printer_uri: &str) -> Result<Printer> {
        let request = IppRequestBuilder::new(Operation::GetPrinterAttributes, self.ids.next())
            .operation_attribute(IppAttribute::single(
                model::name::PRINTER_URI,
                IppValue::Uri(printer_uri.to_string()),
            ))
            .operation_attribute(IppAttribute::single(
                model::name::REQUESTING_USER_NAME,
                IppValue::Name(self.requesting_user.clone()),
            ))
            .build();
        let response = self.transport.exchange(request)?;
        response::check_status(&response, Operation::GetPrinterAttributes)?;

        let group = response
            .groups_of(DelimiterTag::PrinterAttributes)
            .next()
            .ok_or(DruckwerkError::MissingAttribute {
                operation: Operation::GetPrinterAttributes.name(),
                attribute: "printer-attributes-tag",
            })?;
        Printer::from_group(group, Operation::GetPrinterAttributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedExchange, error_response, ok_response};
    use druckwerk_ipp::model::StatusCode;

    fn printer_group(name: &str, state: i32) -> IppAttributeGroup {
        let mut group = IppAttributeGroup::new(DelimiterTag::PrinterAttributes);
        group.push(IppAttribute::single(
            "printer-name",
            IppValue::Name(name.into()),
        ));
        group.push(IppAttribute::single(
            "printer-uri-supported",
            IppValue::Uri(format!("ipp://server/printers/{name}")),
        ));
        group.push(IppAttribute::single("printer-state", IppValue::Enum(state)));
        group.push(IppAttribute::single(
            "printer-is-accepting-jobs",
            IppValue::Boolean(true),
        ));
        group
    }

    fn directory(responses: Vec<Result<druckwerk_ipp::IppMessage>>) -> PrinterDirectory<ScriptedExchange> {
        PrinterDirectory::new(
            ScriptedExchange::new(responses),
            "ipp://server:631/",
            Arc::new(RequestIdSequence::new()),
            "tester",
        )
    }

    #[test]
    fn printers_parses_each_group() {
        let dir = directory(vec![Ok(ok_response(
            1,
            vec![printer_group("office", 3), printer_group("lab", 4)],
        ))]);

        let printers = dir.printers().unwrap();
        assert_eq!(printers.len(), 2);
        assert_eq!(printers[0].name, "office");
        assert_eq!(printers[0].state, PrinterState::Idle);
        assert_eq!(printers[1].state, PrinterState::Processing);
        assert_eq!(printers[1].uri, "ipp://server/printers/lab");
    }

    #[test]
    fn printers_sends_cups_get_printers() {
        let dir = directory(vec![Ok(ok_response(1, vec![]))]);
        dir.printers().unwrap();

        let requests = dir.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].code, 0x4002);
        let op = requests[0].operation_attributes().unwrap();
        assert_eq!(op.attributes()[0].name(), "attributes-charset");
    }

    #[test]
    fn incomplete_printer_group_is_skipped() {
        let mut broken = IppAttributeGroup::new(DelimiterTag::PrinterAttributes);
        broken.push(IppAttribute::single(
            "printer-name",
            IppValue::Name("ghost".into()),
        ));
        // No uri, no state.
        let dir = directory(vec![Ok(ok_response(
            1,
            vec![broken, printer_group("real", 3)],
        ))]);

        let printers = dir.printers().unwrap();
        assert_eq!(printers.len(), 1);
        assert_eq!(printers[0].name, "real");
    }

    #[test]
    fn find_is_case_insensitive() {
        let dir = directory(vec![Ok(ok_response(1, vec![printer_group("Office", 3)]))]);
        let printer = dir.find("OFFICE").unwrap();
        assert_eq!(printer.name, "Office");
    }

    #[test]
    fn find_unknown_name_is_printer_not_found() {
        let dir = directory(vec![Ok(ok_response(1, vec![printer_group("office", 3)]))]);
        let err = dir.find("basement").unwrap_err();
        match err {
            DruckwerkError::PrinterNotFound { name } => assert_eq!(name, "basement"),
            other => panic!("expected PrinterNotFound, got {other:?}"),
        }
    }

    #[test]
    fn default_printer_returns_the_configured_queue() {
        let dir = directory(vec![Ok(ok_response(1, vec![printer_group("office", 3)]))]);
        let printer = dir.default_printer().unwrap();
        assert_eq!(printer.unwrap().name, "office");
    }

    #[test]
    fn no_default_printer_is_none_not_error() {
        let dir = directory(vec![Ok(error_response(
            1,
            StatusCode::CLIENT_ERROR_NOT_FOUND,
        ))]);
        assert!(dir.default_printer().unwrap().is_none());
    }

    #[test]
    fn other_protocol_errors_on_default_still_fail() {
        let dir = directory(vec![Ok(error_response(
            1,
            StatusCode::SERVER_ERROR_INTERNAL,
        ))]);
        assert!(matches!(
            dir.default_printer().unwrap_err(),
            DruckwerkError::Protocol { code: 0x0500, .. }
        ));
    }

    #[test]
    fn supports_format_checks_case_insensitively() {
        let mut group = printer_group("office", 3);
        group.push(
            IppAttribute::new(
                "document-format-supported",
                vec![
                    IppValue::MimeMediaType("application/pdf".into()),
                    IppValue::MimeMediaType("image/jpeg".into()),
                ],
            )
            .unwrap(),
        );
        let printer = Printer::from_group(&group, Operation::CupsGetPrinters).unwrap();
        assert!(printer.supports_format("Application/PDF"));
        assert!(!printer.supports_format("text/html"));
    }
}
