//! Loading hand-written store directories: tolerated problems and fatal
//! ones.

use std::fs;
use std::path::Path;

use oly_core::{Kind, SubKind};
use oly_persist::{load, IndexSource, PersistError, Problem};
use oly_store::{Store, StoreError};
use oly_test_utils::id;

fn write(dir: &Path, file: &str, text: &str) {
    fs::write(dir.join(file), text).unwrap();
}

#[test]
fn forward_references_resolve_across_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "char", "5001 char 0\nch\n wh 10101\n\n");
    write(dir.path(), "loc", "10101 loc forest\nna Forest\n\n");

    let mut store = Store::default();
    let report = load(&mut store, dir.path()).unwrap();
    assert!(report.is_clean(), "{:?}", report.warnings);
    assert_eq!(report.source, IndexSource::HeaderScan);
    assert_eq!(report.files_read, vec!["char".to_string(), "loc".to_string()]);
    let ch = store.get(id(5001)).unwrap().character().unwrap();
    assert_eq!(ch.location, Some(id(10101)));
}

#[test]
fn dangling_reference_loads_as_none_with_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "char",
        "5001 char 0\nch\n wh 10101\n ct 5001 10102 5001\n he 80\n\n",
    );

    let mut store = Store::default();
    let report = load(&mut store, dir.path()).unwrap();
    let ch = store.get(id(5001)).unwrap().character().unwrap();
    assert_eq!(ch.location, None);
    assert_eq!(ch.contacts, vec![id(5001), id(5001)]);
    assert_eq!(ch.health, 80);

    let dangling: Vec<_> = report
        .warnings
        .iter()
        .map(|w| (w.file.as_str(), w.line, w.id, w.problem.clone()))
        .collect();
    assert_eq!(
        dangling,
        vec![
            ("char", 3, Some(id(5001)), Problem::DanglingReference { raw: 10101 }),
            ("char", 4, Some(id(5001)), Problem::DanglingReference { raw: 10102 }),
        ]
    );
}

#[test]
fn obsolete_skill_ids_are_renumbered_on_load() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "skill",
        "600 skill category\nna Combat\nsk\n of 2\n\n610 skill 0\nsk\n rs 1\n\n",
    );
    write(dir.path(), "char", "5001 char 0\nch\n sl 1 2 14 0\n\n");

    let mut store = Store::default();
    let report = load(&mut store, dir.path()).unwrap();
    assert!(report.is_clean(), "{:?}", report.warnings);
    let ch = store.get(id(5001)).unwrap().character().unwrap();
    assert_eq!(ch.skills[0].skill, id(600));
    assert_eq!(ch.skills[0].know, 2);
    let combat = store.get(id(600)).unwrap().skill().unwrap();
    assert_eq!(combat.offered, vec![id(610)]);
    let sub = store.get(id(610)).unwrap().skill().unwrap();
    assert_eq!(sub.required_skill, Some(id(600)));
}

#[test]
fn block_missing_from_the_master_index_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "master", "5001 char 0 char\n");
    write(dir.path(), "char", "5001 char 0\nna Kept\n\n5002 char 0\nna Stray\n\n");

    let mut store = Store::default();
    let report = load(&mut store, dir.path()).unwrap();
    assert_eq!(report.source, IndexSource::Master);
    assert_eq!(report.blocks_read, 1);
    assert_eq!(
        report.warnings[0].problem,
        Problem::UnallocatedBlock { id: id(5002) }
    );
    assert_eq!(store.get(id(5001)).unwrap().name(), "Kept");
    assert!(!store.is_allocated(id(5002)));
}

#[test]
fn master_index_kind_wins_over_the_block_header() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "master", "5001 unform 0 char\n");
    write(dir.path(), "char", "5001 char 0\nna Waiting\n\n");

    let mut store = Store::default();
    load(&mut store, dir.path()).unwrap();
    assert_eq!(store.kind_of(id(5001)), Some(Kind::Unformed));
    assert_eq!(store.get(id(5001)).unwrap().name(), "Waiting");
}

#[test]
fn junk_lines_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "item",
        "# item types\nstray\n\n10 item 0\nna peasant\nil 10\nit\n wt abc\n\nbad header\n",
    );

    let mut store = Store::default();
    let report = load(&mut store, dir.path()).unwrap();
    let problems: Vec<_> = report.warnings.iter().map(|w| w.problem.clone()).collect();
    assert_eq!(
        problems,
        vec![
            Problem::StrayLine,
            Problem::PartialTuple { tag: "il".into() },
            Problem::BadNumber {
                token: "abc".into()
            },
            Problem::StrayLine,
        ]
    );
    let item = store.get(id(10)).unwrap();
    assert_eq!(item.name(), "peasant");
    assert!(item.items.is_empty());
}

#[test]
fn malformed_master_index_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "master", "5001 char\n");
    let err = load(&mut Store::default(), dir.path()).unwrap_err();
    assert!(matches!(err, PersistError::MasterIndex { line: 1, .. }), "{err}");
}

#[test]
fn master_index_naming_an_unknown_kind_or_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "master", "5001 wizard 0 char\n");
    assert!(matches!(
        load(&mut Store::default(), dir.path()),
        Err(PersistError::MasterIndex { .. })
    ));

    write(dir.path(), "master", "5001 char 0 attic\n");
    assert!(matches!(
        load(&mut Store::default(), dir.path()),
        Err(PersistError::MasterIndex { .. })
    ));
}

#[test]
fn malformed_json_index_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "master.json", "{\"version\": 1, \"entries\": [");
    assert!(matches!(
        load(&mut Store::default(), dir.path()),
        Err(PersistError::MasterIndex { .. })
    ));
}

#[test]
fn continuation_desync_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "player", "2001 player pl_regular\npl\n kn 1 2 \\\n\n");
    let err = load(&mut Store::default(), dir.path()).unwrap_err();
    match err {
        PersistError::ContinuationDesync { file, line } => {
            assert_eq!(file, "player");
            assert_eq!(line, 3);
        }
        other => panic!("expected desync, got {other}"),
    }
}

#[test]
fn duplicate_header_is_a_double_allocation() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "char", "5001 char 0\n\n");
    write(dir.path(), "unform", "5001 unform 0\n\n");
    let err = load(&mut Store::default(), dir.path()).unwrap_err();
    assert!(matches!(
        err,
        PersistError::Store(StoreError::DoubleAllocation { .. })
    ));
}

#[test]
fn tombstone_in_leftovers_is_recreated() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "misc", "5001 deleted 0\n\n");
    let mut store = Store::default();
    load(&mut store, dir.path()).unwrap();
    assert!(store.is_allocated(id(5001)));
    assert!(!store.is_live(id(5001)));
    assert_eq!(store.of_kind(Kind::Deleted).count(), 0);
    assert!(store
        .allocate_at(id(5001), Kind::Character, SubKind::None)
        .is_err());
}

#[test]
fn invalid_utf8_is_warned_and_the_file_still_loads() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("loc"),
        b"10101 loc forest\nna Caf\xE9\n\n10102 loc plain\nna Plains\nlo\n hi 1\n\n",
    )
    .unwrap();

    let mut store = Store::default();
    let report = load(&mut store, dir.path()).unwrap();
    let problems: Vec<_> = report
        .warnings
        .iter()
        .map(|w| (w.line, w.id, w.problem.clone()))
        .collect();
    assert_eq!(problems, vec![(2, Some(id(10101)), Problem::BadEncoding)]);
    assert_eq!(store.get(id(10101)).unwrap().name(), "Caf\u{FFFD}");
    let plain = store.get(id(10102)).unwrap();
    assert_eq!(plain.name(), "Plains");
    assert!(plain.location().unwrap().hidden);
}

#[test]
fn bad_header_is_reported_once_during_header_scan() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "item",
        "10 item 0\nna peasant\n\n1x item\nna junk\n\n",
    );

    let mut store = Store::default();
    let report = load(&mut store, dir.path()).unwrap();
    assert_eq!(report.source, IndexSource::HeaderScan);
    let problems: Vec<_> = report
        .warnings
        .iter()
        .map(|w| (w.line, w.problem.clone()))
        .collect();
    assert_eq!(problems, vec![(4, Problem::BadHeader)]);
    assert_eq!(store.len(), 1);
}
