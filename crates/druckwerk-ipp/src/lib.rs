// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk IPP — the protocol engine: typed attribute model and binary
// message codec for the Internet Printing Protocol (RFC 8010/8011).
// Everything here is pure data transformation; the network lives in
// `druckwerk-client`.

pub mod attribute;
pub mod codec;
pub mod message;
pub mod model;
pub mod value;

pub use attribute::{IppAttribute, IppAttributeGroup};
pub use message::{IppMessage, IppRequestBuilder};
pub use model::{DelimiterTag, IppVersion, Operation, StatusCode, ValueTag};
pub use value::{CollectionMember, IppDateTime, IppValue};
