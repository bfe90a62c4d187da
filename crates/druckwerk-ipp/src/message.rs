// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The in-memory form of one IPP request or response, plus a builder that
// enforces the RFC 8011 §4.1.4 ordering of the operation group.

use serde::{Deserialize, Serialize};

use crate::attribute::{IppAttribute, IppAttributeGroup};
use crate::model::{self, DelimiterTag, IppVersion, Operation, StatusCode};
use crate::value::IppValue;

/// A complete IPP message.
///
/// `code` is the operation-id on requests and the status-code on responses;
/// the 8-byte header does not distinguish the two, the direction of travel
/// does.  `payload` is the raw document content trailing the attribute
/// section in combined operations such as Print-Job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IppMessage {
    pub version: IppVersion,
    pub code: u16,
    pub request_id: u32,
    pub groups: Vec<IppAttributeGroup>,
    pub payload: Vec<u8>,
}

impl IppMessage {
    pub fn new(version: IppVersion, code: u16, request_id: u32) -> Self {
        Self {
            version,
            code,
            request_id,
            groups: Vec::new(),
            payload: Vec::new(),
        }
    }

    /// Interpret the code field as a response status.
    pub fn status(&self) -> StatusCode {
        StatusCode(self.code)
    }

    /// All groups with the given delimiter, in wire order.
    pub fn groups_of(&self, tag: DelimiterTag) -> impl Iterator<Item = &IppAttributeGroup> {
        self.groups.iter().filter(move |g| g.tag() == tag)
    }

    pub fn operation_attributes(&self) -> Option<&IppAttributeGroup> {
        self.groups_of(DelimiterTag::OperationAttributes).next()
    }

    /// First attribute with the given name in any group with the given tag.
    pub fn attr(&self, tag: DelimiterTag, name: &str) -> Option<&IppAttribute> {
        self.groups_of(tag).find_map(|g| g.get(name))
    }

    /// The `status-message` operation attribute, when present.
    pub fn status_message(&self) -> Option<&str> {
        self.attr(DelimiterTag::OperationAttributes, model::name::STATUS_MESSAGE)
            .and_then(|a| a.value().as_str())
    }
}

/// Builds request messages.
///
/// Seeds the operation group with `attributes-charset` and
/// `attributes-natural-language` in that order, which RFC 8011 requires to
/// be the first two attributes of every request.
#[derive(Debug)]
pub struct IppRequestBuilder {
    message: IppMessage,
}

impl IppRequestBuilder {
    pub fn new(operation: Operation, request_id: u32) -> Self {
        let mut operation_group = IppAttributeGroup::new(DelimiterTag::OperationAttributes);
        operation_group.push(IppAttribute::single(
            model::name::ATTRIBUTES_CHARSET,
            IppValue::Charset("utf-8".into()),
        ));
        operation_group.push(IppAttribute::single(
            model::name::ATTRIBUTES_NATURAL_LANGUAGE,
            IppValue::NaturalLanguage("en".into()),
        ));

        let mut message = IppMessage::new(IppVersion::V1_1, operation.as_u16(), request_id);
        message.groups.push(operation_group);
        Self { message }
    }

    pub fn version(mut self, version: IppVersion) -> Self {
        self.message.version = version;
        self
    }

    /// Append to the operation-attributes group.
    pub fn operation_attribute(mut self, attribute: IppAttribute) -> Self {
        // The operation group is always groups[0], created in new().
        self.message.groups[0].push(attribute);
        self
    }

    /// Append to the job-attributes group, creating it on first use.
    pub fn job_attribute(mut self, attribute: IppAttribute) -> Self {
        let group = self
            .message
            .groups
            .iter_mut()
            .find(|g| g.tag() == DelimiterTag::JobAttributes);
        match group {
            Some(g) => g.push(attribute),
            None => {
                let mut g = IppAttributeGroup::new(DelimiterTag::JobAttributes);
                g.push(attribute);
                self.message.groups.push(g);
            }
        }
        self
    }

    /// Attach document content to trail the attribute section.
    pub fn payload(mut self, bytes: Vec<u8>) -> Self {
        self.message.payload = bytes;
        self
    }

    pub fn build(self) -> IppMessage {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_puts_charset_first() {
        let msg = IppRequestBuilder::new(Operation::GetPrinterAttributes, 7)
            .operation_attribute(IppAttribute::single(
                model::name::PRINTER_URI,
                IppValue::Uri("ipp://host/printers/a".into()),
            ))
            .build();

        let op = msg.operation_attributes().unwrap();
        let names: Vec<_> = op.attributes().iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec!["attributes-charset", "attributes-natural-language", "printer-uri"]
        );
        assert_eq!(msg.code, 0x000B);
        assert_eq!(msg.request_id, 7);
        assert_eq!(msg.version, IppVersion::V1_1);
    }

    #[test]
    fn job_attribute_group_created_once() {
        let msg = IppRequestBuilder::new(Operation::CreateJob, 1)
            .job_attribute(IppAttribute::single("copies", IppValue::Integer(2)))
            .job_attribute(IppAttribute::single(
                "sides",
                IppValue::Keyword("two-sided-long-edge".into()),
            ))
            .build();

        let job_groups: Vec<_> = msg.groups_of(DelimiterTag::JobAttributes).collect();
        assert_eq!(job_groups.len(), 1);
        assert_eq!(job_groups[0].attributes().len(), 2);
    }

    #[test]
    fn attr_lookup_spans_groups_of_same_tag() {
        let mut msg = IppMessage::new(IppVersion::V1_1, 0, 1);
        let mut g1 = IppAttributeGroup::new(DelimiterTag::PrinterAttributes);
        g1.push(IppAttribute::single("printer-name", IppValue::Name("a".into())));
        let mut g2 = IppAttributeGroup::new(DelimiterTag::PrinterAttributes);
        g2.push(IppAttribute::single("printer-name", IppValue::Name("b".into())));
        msg.groups.push(g1);
        msg.groups.push(g2);

        let found = msg.attr(DelimiterTag::PrinterAttributes, "printer-name").unwrap();
        assert_eq!(found.value().as_str(), Some("a"));
        assert_eq!(msg.groups_of(DelimiterTag::PrinterAttributes).count(), 2);
    }
}
