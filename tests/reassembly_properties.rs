//! Generated checks for `StreamResponseReassembler`.
//!
//! Responses and arbitrary byte streams are cut into random chunk sizes to
//! verify bounded working memory, field caps, determinism, and that the
//! record does not depend on where the transport split its reads.

use std::num::NonZeroUsize;

use hps_reassembler::{
    FailureReason,
    ReassemblerConfig,
    ResponseRecord,
    StepResult,
    StreamResponseReassembler,
};
use hps_testing::feed_all;
use proptest::{
    collection::vec,
    prelude::{Just, Strategy, any, prop_oneof},
    prop_assert,
    prop_assert_eq,
    sample::Index,
    test_runner::{Config as ProptestConfig, RngAlgorithm, TestCaseError, TestRng, TestRunner},
};
use rstest::rstest;

fn deterministic_runner(cases: u32) -> TestRunner {
    let config = ProptestConfig {
        cases,
        ..ProptestConfig::default()
    };
    let rng = TestRng::deterministic_rng(RngAlgorithm::ChaCha);
    TestRunner::new_with_rng(config, rng)
}

fn config(max_chunk: usize, max_field: usize) -> ReassemblerConfig {
    ReassemblerConfig::new(
        NonZeroUsize::new(max_chunk).expect("non-zero"),
        NonZeroUsize::new(max_field).expect("non-zero"),
    )
    .expect("valid config")
}

/// Cut `wire` into chunks whose sizes cycle through `sizes`.
fn split_by<'a>(wire: &'a [u8], sizes: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::new();
    let mut rest = wire;
    for size in sizes.iter().cycle() {
        if rest.is_empty() {
            break;
        }
        let (head, tail) = rest.split_at((*size).min(rest.len()));
        chunks.push(head);
        rest = tail;
    }
    chunks
}

fn outcome(
    config: &ReassemblerConfig,
    chunks: &[&[u8]],
) -> Result<ResponseRecord, FailureReason> {
    let mut reassembler = StreamResponseReassembler::new(config.clone()).expect("valid config");
    match feed_all(&mut reassembler, chunks.iter().copied()).expect("exchange is active") {
        StepResult::Completed => Ok(reassembler.take_result().expect("record is ready")),
        StepResult::Failed(reason) => Err(reason),
        StepResult::NeedMore => panic!("finish never reports NeedMore"),
    }
}

/// A header block free of CR and LF, so the only terminator is the one we
/// append.
fn header_text_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    vec(
        prop_oneof![b'a'..=b'z', b'A'..=b'Z', Just(b':'), Just(b' ')],
        0..max_len,
    )
}

fn chunk_sizes_strategy(max_chunk: usize) -> impl Strategy<Value = Vec<usize>> {
    vec(1..=max_chunk, 1..8)
}

#[rstest]
#[case(1540, 1024, 96)]
#[case(64, 32, 256)]
fn well_formed_responses_respect_field_caps(
    #[case] max_chunk: usize,
    #[case] max_field: usize,
    #[case] cases: u32,
) {
    let config = config(max_chunk, max_field);
    let mut runner = deterministic_runner(cases);
    let strategy = (
        100_u16..=599,
        header_text_strategy(max_field * 3),
        vec(any::<u8>(), 0..max_field * 3),
        chunk_sizes_strategy(max_chunk),
    );

    runner
        .run(&strategy, |(status, headers, body, sizes)| {
            let mut wire = format!("HTTP/1.1 {status} Reason\r\n").into_bytes();
            wire.extend_from_slice(&headers);
            wire.extend_from_slice(b"\r\n\r\n");
            wire.extend_from_slice(&body);

            let mut block = headers.clone();
            block.extend_from_slice(b"\r\n\r\n");

            let chunks = split_by(&wire, &sizes);
            let record = outcome(&config, &chunks)
                .map_err(|reason| TestCaseError::fail(format!("exchange failed: {reason}")))?;

            prop_assert_eq!(record.status_code(), status);
            prop_assert!(record.headers().len() <= max_field);
            prop_assert!(record.body().len() <= max_field);
            prop_assert_eq!(record.headers_truncated(), block.len() > max_field);
            prop_assert_eq!(record.headers(), &block[..block.len().min(max_field)]);
            prop_assert_eq!(record.body_truncated(), body.len() > max_field);
            prop_assert_eq!(record.body(), &body[..body.len().min(max_field)]);
            Ok(())
        })
        .expect("generated responses should respect caps");
}

#[rstest]
#[case(1540, 1024, 64)]
#[case(64, 32, 256)]
fn working_window_never_exceeds_capacity(
    #[case] max_chunk: usize,
    #[case] max_field: usize,
    #[case] cases: u32,
) {
    let config = config(max_chunk, max_field);
    let mut runner = deterministic_runner(cases);
    let stream = prop_oneof![
        vec(any::<u8>(), 0..max_chunk * 6),
        vec(any::<u8>(), 0..max_chunk * 6).prop_map(|tail| {
            let mut wire = b"HTTP/1.1 200 OK\r\n".to_vec();
            wire.extend(tail);
            wire
        }),
    ];
    let strategy = (stream, chunk_sizes_strategy(max_chunk));

    runner
        .run(&strategy, |(wire, sizes)| {
            let mut reassembler =
                StreamResponseReassembler::new(config.clone()).expect("valid config");
            reassembler.start();
            for chunk in split_by(&wire, &sizes) {
                let step = reassembler
                    .feed(chunk)
                    .map_err(|err| TestCaseError::fail(format!("feed rejected: {err}")))?;
                prop_assert!(reassembler.buffered_len() <= reassembler.capacity());
                if matches!(step, StepResult::Failed(_)) {
                    break;
                }
            }
            Ok(())
        })
        .expect("working window should stay bounded");
}

#[rstest]
#[case(1540, 1024)]
#[case(64, 32)]
fn identical_chunks_give_identical_outcomes(#[case] max_chunk: usize, #[case] max_field: usize) {
    let config = config(max_chunk, max_field);
    let mut runner = deterministic_runner(128);
    let wire = prop_oneof![
        vec(any::<u8>(), 0..max_chunk * 3),
        (header_text_strategy(max_field * 2), vec(any::<u8>(), 0..max_field * 2)).prop_map(
            |(headers, body)| hps_testing::response(204, &headers, &body)
        ),
    ];
    let strategy = (wire, chunk_sizes_strategy(max_chunk));

    runner
        .run(&strategy, |(wire, sizes)| {
            let chunks = split_by(&wire, &sizes);
            prop_assert_eq!(outcome(&config, &chunks), outcome(&config, &chunks));
            Ok(())
        })
        .expect("outcomes should be deterministic");
}

#[rstest]
#[case(1540, 1024)]
#[case(64, 32)]
fn two_way_splits_match_fixed_chunking(#[case] max_chunk: usize, #[case] max_field: usize) {
    let config = config(max_chunk, max_field);
    let mut runner = deterministic_runner(128);
    let strategy = (
        header_text_strategy(max_field * 2),
        vec(any::<u8>(), 0..max_field * 2),
        any::<Index>(),
    );

    runner
        .run(&strategy, |(headers, body, split)| {
            let wire = hps_testing::response(200, &headers, &body);
            let baseline = outcome(&config, &split_by(&wire, &[max_chunk]));
            let at = split.index(wire.len() + 1);
            let (head, tail) = wire.split_at(at);
            let pieces: Vec<&[u8]> = split_by(head, &[max_chunk])
                .into_iter()
                .chain(split_by(tail, &[max_chunk]))
                .collect();
            prop_assert_eq!(outcome(&config, &pieces), baseline);
            Ok(())
        })
        .expect("split point should not change the record");
}

#[test]
fn oversized_headers_never_deadlock() {
    let config = config(64, 32);
    let mut header = b"X-Pad: ".to_vec();
    header.extend(std::iter::repeat_n(b'p', 500));
    let wire = hps_testing::response(200, &header, b"done");

    for size in 1..=64 {
        let record = outcome(&config, &split_by(&wire, &[size]))
            .unwrap_or_else(|reason| panic!("chunk size {size} failed: {reason}"));
        assert!(record.headers_truncated());
        assert_eq!(record.headers().len(), 32);
        assert_eq!(record.body(), b"done");
    }
}
