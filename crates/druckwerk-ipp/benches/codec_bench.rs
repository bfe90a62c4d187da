// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the IPP wire codec: request encoding, response
// decoding, and the document-payload path.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use druckwerk_ipp::attribute::{IppAttribute, IppAttributeGroup};
use druckwerk_ipp::codec::{decode, encode};
use druckwerk_ipp::message::{IppMessage, IppRequestBuilder};
use druckwerk_ipp::model::{DelimiterTag, IppVersion, Operation, StatusCode};
use druckwerk_ipp::value::IppValue;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A Get-Printer-Attributes request the way the client builds one.
fn attributes_request() -> IppMessage {
    IppRequestBuilder::new(Operation::GetPrinterAttributes, 42)
        .operation_attribute(IppAttribute::single(
            "printer-uri",
            IppValue::Uri("ipp://localhost:631/printers/office".into()),
        ))
        .operation_attribute(IppAttribute::single(
            "requesting-user-name",
            IppValue::Name("bench".into()),
        ))
        .build()
}

/// A Get-Printer-Attributes response with a realistically sized printer
/// group, the shape the decoder sees most often.
fn attributes_response() -> Vec<u8> {
    let mut msg = IppMessage::new(
        IppVersion::V1_1,
        StatusCode::SUCCESSFUL_OK.as_u16(),
        42,
    );
    let mut op = IppAttributeGroup::new(DelimiterTag::OperationAttributes);
    op.push(IppAttribute::single(
        "attributes-charset",
        IppValue::Charset("utf-8".into()),
    ));
    op.push(IppAttribute::single(
        "attributes-natural-language",
        IppValue::NaturalLanguage("en".into()),
    ));
    msg.groups.push(op);

    let mut printer = IppAttributeGroup::new(DelimiterTag::PrinterAttributes);
    printer.push(IppAttribute::single(
        "printer-name",
        IppValue::Name("Druckwerk Office".into()),
    ));
    printer.push(IppAttribute::single("printer-state", IppValue::Enum(3)));
    printer.push(IppAttribute::single(
        "printer-uri-supported",
        IppValue::Uri("ipp://localhost:631/printers/office".into()),
    ));
    printer.push(IppAttribute::single(
        "printer-is-accepting-jobs",
        IppValue::Boolean(true),
    ));
    printer.push(
        IppAttribute::new(
            "document-format-supported",
            vec![
                IppValue::MimeMediaType("application/pdf".into()),
                IppValue::MimeMediaType("image/jpeg".into()),
                IppValue::MimeMediaType("image/png".into()),
                IppValue::MimeMediaType("text/plain".into()),
            ],
        )
        .expect("homogeneous values"),
    );
    printer.push(
        IppAttribute::new(
            "printer-state-reasons",
            vec![IppValue::Keyword("none".into())],
        )
        .expect("homogeneous values"),
    );
    msg.groups.push(printer);

    encode(&msg).expect("fixture encodes")
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_encode_request(c: &mut Criterion) {
    let msg = attributes_request();
    c.bench_function("encode (Get-Printer-Attributes)", |b| {
        b.iter(|| {
            let bytes = encode(black_box(&msg));
            assert!(bytes.is_ok());
        });
    });

    // Print-Job with a 4 KiB document exercises the payload append path.
    let job = IppRequestBuilder::new(Operation::PrintJob, 100)
        .operation_attribute(IppAttribute::single(
            "printer-uri",
            IppValue::Uri("ipp://localhost:631/printers/office".into()),
        ))
        .operation_attribute(IppAttribute::single(
            "job-name",
            IppValue::Name("Benchmark Print Job".into()),
        ))
        .payload(vec![0xABu8; 4096])
        .build();

    c.bench_function("encode (Print-Job, 4 KiB document)", |b| {
        b.iter(|| {
            let bytes = encode(black_box(&job));
            assert!(bytes.is_ok());
        });
    });
}

fn bench_decode_response(c: &mut Criterion) {
    let data = attributes_response();
    c.bench_function("decode (printer attrs response)", |b| {
        b.iter(|| {
            let result = decode(black_box(&data));
            assert!(result.is_ok());
        });
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let msg = attributes_request();
    c.bench_function("encode + decode round trip", |b| {
        b.iter(|| {
            let bytes = encode(black_box(&msg)).expect("encode");
            let decoded = decode(&bytes).expect("decode");
            black_box(decoded);
        });
    });
}

criterion_group!(
    benches,
    bench_encode_request,
    bench_decode_response,
    bench_round_trip,
);
criterion_main!(benches);
