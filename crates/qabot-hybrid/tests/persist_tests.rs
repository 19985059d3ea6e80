use std::fs;

use qabot_core::{Error, QaPair, SynonymRule};
use qabot_hybrid::{build_index, retrieve, Index};
use tempfile::TempDir;

fn sample() -> Index {
    build_index(
        &[
            QaPair::new("company name", "The internship was completed at IMI Games."),
            QaPair::new("ocr preprocessing", "Canvas is upscaled and converted to a Blob."),
            QaPair::new("websocket filtering", "Ping/pong frames are filtered out."),
        ],
        &[
            SynonymRule::new("company", ["organization", "firm"]),
            SynonymRule::new("websocket", ["ws", "socket"]),
        ],
    )
    .unwrap()
}

#[test]
fn save_then_load_round_trips() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("model").join("qa_index.json");
    let index = sample();
    index.save(&path).unwrap();

    let loaded = Index::load(&path).unwrap();
    assert_eq!(loaded, index);
    for question in ["what organization", "ws filtering", "ocr"] {
        assert_eq!(
            retrieve(question, 3, 0.0, &loaded).unwrap(),
            retrieve(question, 3, 0.0, &index).unwrap()
        );
    }
    assert!(!tmp.path().join("model").join("qa_index.json.tmp").exists());
}

#[test]
fn identical_indexes_serialize_identically() {
    assert_eq!(sample().to_bytes().unwrap(), sample().to_bytes().unwrap());
}

#[test]
fn tampered_payload_fails_checksum() {
    let bytes = String::from_utf8(sample().to_bytes().unwrap()).unwrap();
    let tampered = bytes.replace("IMI Games", "XYZ Games");
    assert_ne!(bytes, tampered);
    assert!(matches!(Index::from_bytes(tampered.as_bytes()), Err(Error::MalformedPersistedIndex(_))));
}

#[test]
fn version_mismatch_is_rejected() {
    let bytes = String::from_utf8(sample().to_bytes().unwrap()).unwrap();
    for (from, to) in [
        ("\"format_version\":1", "\"format_version\":2"),
        ("\"normalizer_version\":1", "\"normalizer_version\":7"),
        ("\"weighting_version\":1", "\"weighting_version\":0"),
        ("\"format\":\"qabot-index\"", "\"format\":\"other-index\""),
    ] {
        assert!(bytes.contains(from), "missing {from}");
        let changed = bytes.replace(from, to);
        assert!(
            matches!(Index::from_bytes(changed.as_bytes()), Err(Error::MalformedPersistedIndex(_))),
            "accepted {to}"
        );
    }
}

#[test]
fn garbage_and_truncated_files_are_malformed() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("qa_index.json");

    fs::write(&path, b"definitely not an index").unwrap();
    assert!(matches!(Index::load(&path), Err(Error::MalformedPersistedIndex(_))));

    let bytes = sample().to_bytes().unwrap();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
    assert!(matches!(Index::load(&path), Err(Error::MalformedPersistedIndex(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let tmp = TempDir::new().unwrap();
    assert!(matches!(Index::load(&tmp.path().join("absent.json")), Err(Error::Io(_))));
}

#[test]
fn empty_index_round_trips() {
    let index = build_index(&[], &[]).unwrap();
    let loaded = Index::from_bytes(&index.to_bytes().unwrap()).unwrap();
    assert!(loaded.is_empty());
    assert!(retrieve("anything", 1, 0.0, &loaded).unwrap().is_empty());
}
