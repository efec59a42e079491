//! Property tests for the quantified invariants of the store engine.
//!
//! A fake codec stands in for real JPEG decoding so these tests can generate arbitrary
//! byte buffers instead of valid JPEGs, per `proptest`'s usual "fake the expensive
//! boundary" approach.

use std::io::{Read, Seek, SeekFrom};

use imgstore_core::{Error, ImageCodec, OpenMode, Result, Store, Variant};
use proptest::prelude::*;
use tempfile::tempdir;

#[derive(Debug, Clone, Copy, Default)]
struct FakeCodec;

impl ImageCodec for FakeCodec {
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32)> {
        Ok((bytes.len() as u32 + 1, bytes.len() as u32 + 1))
    }

    fn resize_to_fit(&self, bytes: &[u8], max_w: u16, max_h: u16) -> Result<Vec<u8>> {
        let mut out = vec![0xABu8; (max_w as usize + max_h as usize).min(bytes.len().max(1))];
        out.extend_from_slice(&bytes[..bytes.len().min(4)]);
        Ok(out)
    }
}

fn distinct_id_and_bytes_pairs() -> impl Strategy<Value = Vec<(String, Vec<u8>)>> {
    proptest::collection::vec(
        (
            "[a-z]{1,8}",
            proptest::collection::vec(any::<u8>(), 1..64),
        ),
        1..6,
    )
    .prop_map(|mut pairs| {
        let mut seen_ids = std::collections::HashSet::new();
        let mut seen_bytes = std::collections::HashSet::new();
        pairs.retain(|(id, bytes)| seen_ids.insert(id.clone()) && seen_bytes.insert(bytes.clone()));
        pairs
    })
}

proptest! {
    #[test]
    fn p1_round_trip_returns_exactly_what_was_inserted(pairs in distinct_id_and_bytes_pairs()) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.bin");
        Store::create(&path, pairs.len().max(1) as u32, (64, 64), (256, 256)).unwrap();
        let mut store = Store::open(&path, OpenMode::ReadWrite)
            .unwrap()
            .with_codec(Box::new(FakeCodec));

        for (id, bytes) in &pairs {
            store.insert(bytes, id).unwrap();
        }
        for (id, bytes) in &pairs {
            let back = store.read(id, Variant::Orig).unwrap();
            prop_assert_eq!(&back, bytes);
        }
    }

    #[test]
    fn p3_duplicate_id_always_rejected_regardless_of_content(
        id in "[a-z]{1,8}",
        bytes_a in proptest::collection::vec(any::<u8>(), 1..32),
        bytes_b in proptest::collection::vec(any::<u8>(), 1..32),
    ) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.bin");
        Store::create(&path, 4, (64, 64), (256, 256)).unwrap();
        let mut store = Store::open(&path, OpenMode::ReadWrite)
            .unwrap()
            .with_codec(Box::new(FakeCodec));

        store.insert(&bytes_a, &id).unwrap();
        let second = store.insert(&bytes_b, &id);
        prop_assert!(matches!(second, Err(Error::DuplicateId(_))));
    }

    #[test]
    fn p7_capacity_is_enforced_exactly(n in 1u32..8) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.bin");
        Store::create(&path, n, (64, 64), (256, 256)).unwrap();
        let mut store = Store::open(&path, OpenMode::ReadWrite)
            .unwrap()
            .with_codec(Box::new(FakeCodec));

        for i in 0..n {
            store.insert(&[i as u8], &format!("id-{i}")).unwrap();
        }
        let overflow = store.insert(&[255u8], "one-too-many");
        prop_assert!(matches!(overflow, Err(Error::FullImgStore(_))));
    }

    #[test]
    fn p8_version_strictly_increases_and_reads_do_not_bump_it(
        pairs in distinct_id_and_bytes_pairs(),
    ) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.bin");
        Store::create(&path, pairs.len().max(1) as u32, (64, 64), (256, 256)).unwrap();
        let mut store = Store::open(&path, OpenMode::ReadWrite)
            .unwrap()
            .with_codec(Box::new(FakeCodec));

        let mut last_version = header_version(&path);
        for (id, bytes) in &pairs {
            store.insert(bytes, id).unwrap();
            let version = header_version(&path);
            prop_assert!(version > last_version);
            last_version = version;
        }

        for (id, _) in &pairs {
            let _ = store.read(id, Variant::Orig).unwrap();
            let _ = store.list(imgstore_core::ListMode::Json).unwrap();
        }
        prop_assert_eq!(header_version(&path), last_version);
    }
}

fn header_version(path: &std::path::Path) -> u32 {
    let mut file = std::fs::File::open(path).unwrap();
    file.seek(SeekFrom::Start(32)).unwrap();
    let mut buf = [0u8; 4];
    file.read_exact(&mut buf).unwrap();
    u32::from_le_bytes(buf)
}

#[test]
fn p2_content_dedup_grows_the_file_by_the_payload_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("s.bin");
    Store::create(&path, 3, (64, 64), (256, 256)).unwrap();
    let mut store = Store::open(&path, OpenMode::ReadWrite)
        .unwrap()
        .with_codec(Box::new(FakeCodec));

    let bytes = vec![7u8; 40];
    let before = std::fs::metadata(&path).unwrap().len();
    store.insert(&bytes, "first").unwrap();
    store.insert(&bytes, "second").unwrap();
    let after = std::fs::metadata(&path).unwrap().len();

    assert_eq!(after - before, bytes.len() as u64);
}
