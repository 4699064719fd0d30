//! Persistence: JSON and legacy binary formats survive a save/load cycle
//! and keep the index invariants intact.

use remora::index::{binary, json, IndexBuilder, VsmIndex};

fn toks(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn sample() -> (remora::index::BuiltIndex, VsmIndex) {
    let built = IndexBuilder::from_records(
        vec![
            ("paper/2020-04", toks(&["graph", "based", "retrieval", "graph"])),
            ("paper/2019-11", toks(&["dense", "retrieval", "baseline"])),
            ("paper/2021-01", toks(&["graph", "neural", "ranking"])),
        ],
        toks(&[
            "graph",
            "based",
            "retrieval",
            "dense",
            "baseline",
            "neural",
            "ranking",
        ]),
    );
    let vsm = VsmIndex::from_store(&built.store, built.stats.doc_count);
    (built, vsm)
}

#[test]
fn json_save_load_preserves_everything() {
    let (built, vsm) = sample();
    let dir = tempfile::tempdir().unwrap();

    json::save_to_dir(dir.path(), &built, &vsm).unwrap();
    let (loaded, loaded_vsm) = json::load_from_dir(dir.path()).unwrap();

    assert_eq!(loaded.stats, built.stats);
    assert_eq!(loaded_vsm, vsm);

    assert_eq!(loaded.store.term_count(), built.store.term_count());
    for (term, postings) in built.store.terms() {
        assert_eq!(
            loaded.store.doc_frequency(term),
            postings.doc_frequency(),
            "df mismatch for {}",
            term
        );
        for (docno, posting) in postings.iter() {
            let doc_id = built.store.doc_id(docno).unwrap();
            let loaded_docno = loaded.store.docno(doc_id).unwrap();
            let loaded_posting = loaded
                .store
                .term_postings(term)
                .unwrap()
                .get(loaded_docno)
                .unwrap();
            assert_eq!(loaded_posting, posting);
        }
    }
}

#[test]
fn json_reserialization_is_byte_stable() {
    let (built, vsm) = sample();
    let dir = tempfile::tempdir().unwrap();
    json::save_to_dir(dir.path(), &built, &vsm).unwrap();
    let first = std::fs::read(dir.path().join(json::INDEX_FILE)).unwrap();

    let (loaded, loaded_vsm) = json::load_from_dir(dir.path()).unwrap();
    let second_dir = tempfile::tempdir().unwrap();
    json::save_to_dir(second_dir.path(), &loaded, &loaded_vsm).unwrap();
    let second = std::fs::read(second_dir.path().join(json::INDEX_FILE)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn loaded_index_keeps_invariants() {
    let (built, vsm) = sample();
    let dir = tempfile::tempdir().unwrap();
    json::save_to_dir(dir.path(), &built, &vsm).unwrap();
    let (loaded, _) = json::load_from_dir(dir.path()).unwrap();

    for (_, postings) in loaded.store.terms() {
        for (_, posting) in postings.iter() {
            // tf equals the number of positions, positions strictly increase
            assert_eq!(posting.term_frequency as usize, posting.positions.len());
            assert!(posting.positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

#[test]
fn missing_files_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = json::load_from_dir(dir.path()).unwrap_err();
    assert!(!err.is_query_error());
    assert!(err.to_string().contains("index.json"));
}

#[test]
fn legacy_binary_roundtrip() {
    let (built, _) = sample();
    let dir = tempfile::tempdir().unwrap();

    binary::write_legacy(&built.store, dir.path()).unwrap();
    let restored = binary::read_legacy(dir.path()).unwrap();

    assert_eq!(restored.doc_count(), built.store.doc_count());
    for (term, postings) in built.store.terms() {
        assert_eq!(restored.doc_frequency(term), postings.doc_frequency());
        for (docno, posting) in postings.iter() {
            let doc_id = built.store.doc_id(docno).unwrap();
            let restored_docno = restored.docno(doc_id).unwrap();
            assert_eq!(
                restored
                    .term_postings(term)
                    .unwrap()
                    .get(restored_docno)
                    .unwrap(),
                posting
            );
        }
    }
}

#[test]
fn legacy_truncated_file_is_corrupt_not_panic() {
    let (built, _) = sample();
    let dir = tempfile::tempdir().unwrap();
    binary::write_legacy(&built.store, dir.path()).unwrap();

    let path = dir.path().join(binary::INDEX_BIN);
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();

    assert!(binary::read_legacy(dir.path()).is_err());
}
