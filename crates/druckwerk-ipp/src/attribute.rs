// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Attributes and attribute groups.  Groups keep insertion order because
// group boundaries and attribute order are significant in the framed wire
// encoding.

use serde::{Deserialize, Serialize};

use druckwerk_core::{DruckwerkError, Result};

use crate::model::{DelimiterTag, ValueTag};
use crate::value::{IppDateTime, IppValue};

/// A named attribute with one or more values.
///
/// Invariant: all values share one value tag, except that the out-of-band
/// markers (no-value, unknown, unsupported) may appear alongside any tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IppAttribute {
    name: String,
    values: Vec<IppValue>,
}

impl IppAttribute {
    /// Construct a multi-valued attribute, validating the one-tag invariant.
    pub fn new(name: impl Into<String>, values: Vec<IppValue>) -> Result<Self> {
        let name = name.into();
        if values.is_empty() {
            return Err(DruckwerkError::MalformedAttribute {
                attribute: name,
                offset: 0,
                reason: "attribute must carry at least one value".into(),
            });
        }
        let mut tag = None;
        for value in &values {
            if value.is_out_of_band() {
                continue;
            }
            match tag {
                None => tag = Some(value.tag()),
                Some(t) if t == value.tag() => {}
                Some(t) => {
                    return Err(DruckwerkError::MalformedAttribute {
                        attribute: name,
                        offset: 0,
                        reason: format!(
                            "mixed value tags 0x{t:02x} and 0x{:02x} in one attribute",
                            value.tag()
                        ),
                    });
                }
            }
        }
        Ok(Self { name, values })
    }

    /// Construct with an explicitly declared tag; every non-out-of-band
    /// value must match it.
    pub fn with_tag(name: impl Into<String>, tag: ValueTag, values: Vec<IppValue>) -> Result<Self> {
        let name = name.into();
        for value in &values {
            if !value.is_out_of_band() && value.tag() != tag.as_u8() {
                return Err(DruckwerkError::MalformedAttribute {
                    attribute: name,
                    offset: 0,
                    reason: format!(
                        "value of syntax {} does not match declared tag 0x{:02x}",
                        value.type_name(),
                        tag.as_u8()
                    ),
                });
            }
        }
        Self::new(name, values)
    }

    /// A single-valued attribute.  Cannot violate the tag invariant.
    pub fn single(name: impl Into<String>, value: IppValue) -> Self {
        Self {
            name: name.into(),
            values: vec![value],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[IppValue] {
        &self.values
    }

    /// The first value.  Construction guarantees at least one.
    pub fn value(&self) -> &IppValue {
        &self.values[0]
    }

    /// Used by the decoder for the empty-name "additional value" rule.
    pub(crate) fn push_value(&mut self, value: IppValue) {
        self.values.push(value);
    }

    fn mismatch(&self, expected: &'static str) -> DruckwerkError {
        DruckwerkError::TypeMismatch {
            attribute: self.name.clone(),
            expected,
            actual: self.value().type_name(),
        }
    }

    pub fn as_integer(&self) -> Result<i32> {
        self.value()
            .as_integer()
            .ok_or_else(|| self.mismatch("integer"))
    }

    pub fn as_enum(&self) -> Result<i32> {
        self.value().as_enum().ok_or_else(|| self.mismatch("enum"))
    }

    pub fn as_boolean(&self) -> Result<bool> {
        self.value()
            .as_boolean()
            .ok_or_else(|| self.mismatch("boolean"))
    }

    pub fn as_datetime(&self) -> Result<IppDateTime> {
        self.value()
            .as_datetime()
            .ok_or_else(|| self.mismatch("dateTime"))
    }

    /// Any character-string syntax.
    pub fn as_str(&self) -> Result<&str> {
        self.value()
            .as_str()
            .ok_or_else(|| self.mismatch("character-string"))
    }

    pub fn as_keyword(&self) -> Result<&str> {
        match self.value() {
            IppValue::Keyword(s) => Ok(s),
            _ => Err(self.mismatch("keyword")),
        }
    }

    /// All values rendered through the string accessor, skipping any that
    /// are not strings.  Convenient for 1setOf keyword attributes such as
    /// document-format-supported.
    pub fn strings(&self) -> Vec<&str> {
        self.values.iter().filter_map(IppValue::as_str).collect()
    }
}

/// An ordered sequence of attributes under one group delimiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IppAttributeGroup {
    tag: DelimiterTag,
    attributes: Vec<IppAttribute>,
}

impl IppAttributeGroup {
    pub fn new(tag: DelimiterTag) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
        }
    }

    pub fn tag(&self) -> DelimiterTag {
        self.tag
    }

    pub fn attributes(&self) -> &[IppAttribute] {
        &self.attributes
    }

    pub fn push(&mut self, attribute: IppAttribute) {
        self.attributes.push(attribute);
    }

    /// First attribute with the given name.
    pub fn get(&self, name: &str) -> Option<&IppAttribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut IppAttribute> {
        self.attributes.last_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_tags_are_rejected() {
        let err = IppAttribute::new(
            "copies",
            vec![IppValue::Integer(1), IppValue::Keyword("two".into())],
        )
        .unwrap_err();
        match err {
            DruckwerkError::MalformedAttribute { attribute, .. } => {
                assert_eq!(attribute, "copies");
            }
            other => panic!("expected MalformedAttribute, got {other:?}"),
        }
    }

    #[test]
    fn out_of_band_markers_may_mix() {
        let attr = IppAttribute::new(
            "job-impressions",
            vec![IppValue::Unknown, IppValue::Integer(12)],
        )
        .unwrap();
        assert_eq!(attr.values().len(), 2);
    }

    #[test]
    fn empty_value_list_is_rejected() {
        assert!(IppAttribute::new("sides", vec![]).is_err());
    }

    #[test]
    fn declared_tag_must_match_values() {
        let err = IppAttribute::with_tag(
            "job-id",
            ValueTag::Integer,
            vec![IppValue::Keyword("oops".into())],
        )
        .unwrap_err();
        assert!(matches!(err, DruckwerkError::MalformedAttribute { .. }));

        let ok = IppAttribute::with_tag("job-id", ValueTag::Integer, vec![IppValue::Integer(7)]);
        assert!(ok.is_ok());
    }

    #[test]
    fn typed_accessors_report_type_mismatch_with_name() {
        let attr = IppAttribute::single("job-state", IppValue::Enum(5));
        assert_eq!(attr.as_enum().unwrap(), 5);
        let err = attr.as_integer().unwrap_err();
        match err {
            DruckwerkError::TypeMismatch {
                attribute,
                expected,
                actual,
            } => {
                assert_eq!(attribute, "job-state");
                assert_eq!(expected, "integer");
                assert_eq!(actual, "enum");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn group_preserves_insertion_order() {
        let mut group = IppAttributeGroup::new(DelimiterTag::OperationAttributes);
        for name in ["attributes-charset", "attributes-natural-language", "printer-uri"] {
            group.push(IppAttribute::single(name, IppValue::Keyword("x".into())));
        }
        let names: Vec<_> = group.attributes().iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec!["attributes-charset", "attributes-natural-language", "printer-uri"]
        );
    }
}
