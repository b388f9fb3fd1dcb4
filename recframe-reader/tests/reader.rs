//! End-to-end behaviour of the record reader.

mod common;

use bytes::Bytes;
use common::{frame, stream, CountingSource};
use proptest::prelude::*;
use recframe_reader::{
    FrameSection, JsonPayload, PayloadError, RawPayload, ReadError, ReaderConfig, RecordReader,
    Termination,
};
use serde::Deserialize;
use std::io::{Cursor, Write};
use tempfile::NamedTempFile;

fn collect_raw(bytes: Vec<u8>, config: ReaderConfig) -> (Vec<Bytes>, Vec<ReadError>, Termination) {
    let mut reader = RecordReader::with_config(Cursor::new(bytes), RawPayload, config);
    let mut records = Vec::new();
    let mut errors = Vec::new();
    for item in reader.by_ref() {
        match item {
            Ok(record) => records.push(record.value),
            Err(err) => errors.push(err),
        }
    }
    let termination = reader.termination().cloned().unwrap();
    (records, errors, termination)
}

#[test]
fn payload_sizes_0_5_1000() {
    let payloads = [vec![], vec![1u8; 5], vec![2u8; 1000]];
    let (records, errors, termination) = collect_raw(stream(&payloads), ReaderConfig::default());

    let sizes: Vec<usize> = records.iter().map(|r| r.len()).collect();
    assert_eq!(sizes, vec![0, 5, 1000]);
    assert!(errors.is_empty());
    assert_eq!(termination, Termination::CleanEnd);
}

#[test]
fn empty_source_reports_clean_end() {
    let (records, errors, termination) = collect_raw(Vec::new(), ReaderConfig::default());
    assert!(records.is_empty());
    assert!(errors.is_empty());
    assert_eq!(termination, Termination::CleanEnd);
}

#[test]
fn truncated_header_never_yields_partial_record() {
    let prior = stream(&[b"first".as_slice(), b"second"]);
    let next = frame(b"third");

    for n in 1..=7 {
        let mut bytes = prior.clone();
        bytes.extend_from_slice(&next[..n]);

        let (records, errors, termination) = collect_raw(bytes, ReaderConfig::default());
        assert_eq!(records, vec![Bytes::from("first"), Bytes::from("second")]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ReadError::TruncatedFrame { .. }));
        assert_eq!(
            termination,
            Termination::Truncated {
                offset: prior.len() as u64,
                section: FrameSection::Length,
                expected: 8,
                actual: n as u64,
            }
        );
    }
}

#[test]
fn oversized_length_stops_after_prior_records() {
    let mut bytes = stream(&[b"a".as_slice(), b"bb"]);
    let prior = bytes.len() as u64;
    bytes.extend_from_slice(&frame(&[0u8; 2048]));

    let config = ReaderConfig::new().with_max_record_size(1024);
    let (records, errors, termination) = collect_raw(bytes, config);
    assert_eq!(records.len(), 2);
    assert_eq!(errors.len(), 1);
    assert_eq!(
        termination,
        Termination::Oversized {
            offset: prior,
            length: 2048,
            max: 1024,
        }
    );
}

#[test]
fn decoding_twice_is_identical() {
    let bytes = stream(&[b"x".as_slice(), b"", b"yz", b"\x00\x01\x02"]);
    let first = collect_raw(bytes.clone(), ReaderConfig::default());
    let second = collect_raw(bytes, ReaderConfig::default());
    assert_eq!(first.0, second.0);
    assert_eq!(first.2, second.2);
}

#[test]
fn source_closed_exactly_once_on_every_path() {
    // Exhausted
    let (source, closes) = CountingSource::new(stream(&[b"a".as_slice(), b"b"]));
    let reader = RecordReader::new(source, RawPayload);
    assert_eq!(reader.count(), 2);
    assert_eq!(closes.get(), 1);

    // Abandoned after the first record
    let (source, closes) = CountingSource::new(stream(&[b"a".as_slice(), b"b"]));
    let mut reader = RecordReader::new(source, RawPayload);
    assert!(reader.next().unwrap().is_ok());
    drop(reader);
    assert_eq!(closes.get(), 1);

    // Malformed frame
    let mut bytes = frame(b"a");
    bytes.extend_from_slice(&[9, 9]);
    let (source, closes) = CountingSource::new(bytes);
    let mut reader = RecordReader::new(source, RawPayload);
    assert!(reader.next().unwrap().is_ok());
    assert!(reader.next().unwrap().is_err());
    assert_eq!(closes.get(), 1);
    assert!(reader.next().is_none());
    drop(reader);
    assert_eq!(closes.get(), 1);

    // Stopped early through a combinator
    let (source, closes) = CountingSource::new(stream(&[b"a".as_slice(), b"b", b"c"]));
    let taken: Vec<_> = RecordReader::new(source, RawPayload).take(1).collect();
    assert_eq!(taken.len(), 1);
    assert_eq!(closes.get(), 1);
}

#[derive(Debug, Deserialize, PartialEq)]
struct Event {
    step: u64,
    wall_time: f64,
}

#[test]
fn json_payloads_with_bad_record_in_the_middle() {
    let bytes = stream(&[
        br#"{"step":1,"wall_time":0.5}"#.as_slice(),
        b"not json",
        br#"{"step":2,"wall_time":1.5}"#,
    ]);
    let reader = RecordReader::new(Cursor::new(bytes), JsonPayload::<Event>::new());
    let items: Vec<_> = reader.collect();

    assert_eq!(items.len(), 3);
    assert_eq!(
        items[0].as_ref().unwrap().value,
        Event {
            step: 1,
            wall_time: 0.5
        }
    );
    assert!(matches!(
        items[1],
        Err(ReadError::Payload {
            index: 1,
            source: PayloadError::Json(_),
            ..
        })
    ));
    assert_eq!(items[2].as_ref().unwrap().value.step, 2);
}

#[test]
fn reads_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&stream(&[b"disk".as_slice(), b"backed"])).unwrap();
    file.flush().unwrap();

    let reader = RecordReader::open(file.path(), RawPayload, ReaderConfig::default()).unwrap();
    let values: Vec<Bytes> = reader.map(|r| r.unwrap().value).collect();
    assert_eq!(values, vec![Bytes::from("disk"), Bytes::from("backed")]);
}

proptest! {
    #[test]
    fn k_frames_yield_k_records(payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..256), 0..16)) {
        let (records, errors, termination) = collect_raw(stream(&payloads), ReaderConfig::default());
        prop_assert!(errors.is_empty());
        prop_assert_eq!(termination, Termination::CleanEnd);
        prop_assert_eq!(records.len(), payloads.len());
        for (record, payload) in records.iter().zip(&payloads) {
            prop_assert_eq!(record.as_ref(), payload.as_slice());
        }
    }

    #[test]
    fn any_truncation_keeps_prefix(
        payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..8),
        cut in any::<prop::sample::Index>(),
    ) {
        let bytes = stream(&payloads);
        let cut = cut.index(bytes.len());
        let (records, errors, termination) = collect_raw(bytes[..cut].to_vec(), ReaderConfig::default());

        prop_assert!(records.len() <= payloads.len());
        for (record, payload) in records.iter().zip(&payloads) {
            prop_assert_eq!(record.as_ref(), payload.as_slice());
        }
        if termination.is_clean() {
            prop_assert!(errors.is_empty());
        } else {
            prop_assert!(
                matches!(termination, Termination::Truncated { .. }),
                "unexpected termination"
            );
            prop_assert_eq!(errors.len(), 1);
        }
    }
}
