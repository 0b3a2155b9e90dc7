//! Save/load round trips over the sample world.

use std::fs;
use std::path::Path;

use oly_core::{Kind, SubKind};
use oly_persist::{
    load, save, save_with, store_files, IndexSource, PersistConfig, PersistError, MASTER_FILE,
    MASTER_JSON_FILE,
};
use oly_store::{SkillEntry, Store, StoreConfig, StoreError};
use oly_test_utils::{id, sample_world, TestWorldBuilder, SAMPLE_SEED};

// ── Helpers ─────────────────────────────────────────────────────

fn fresh() -> Store {
    Store::new(StoreConfig::new().with_seed(SAMPLE_SEED))
}

fn snapshot(dir: &Path) -> Vec<(String, String)> {
    store_files()
        .chain([MASTER_FILE])
        .map(|f| {
            let text = fs::read_to_string(dir.join(f)).unwrap_or_default();
            (f.to_string(), text)
        })
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────

#[test]
fn save_load_save_is_byte_identical() {
    let world = sample_world();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    save(&world.store, first.path()).unwrap();
    let mut reloaded = fresh();
    let report = load(&mut reloaded, first.path()).unwrap();
    assert!(report.is_clean(), "{:?}", report.warnings);
    assert_eq!(report.source, IndexSource::Master);
    assert_eq!(report.allocated, world.store.len());

    save(&reloaded, second.path()).unwrap();
    assert_eq!(snapshot(first.path()), snapshot(second.path()));
}

#[test]
fn reloaded_world_matches_the_original() {
    let w = sample_world();
    let dir = tempfile::tempdir().unwrap();
    save(&w.store, dir.path()).unwrap();
    let mut store = fresh();
    load(&mut store, dir.path()).unwrap();

    let noble = store.get(w.noble).unwrap();
    assert_eq!(noble.name(), "Osswid the Brave");
    assert_eq!(noble.item_qty(w.peasant), 25);
    assert_eq!(noble.trades.len(), 1);
    let ch = noble.character().unwrap();
    assert_eq!(ch.location, Some(w.castle));
    assert_eq!(ch.contacts, vec![w.ghost]);
    assert_eq!(ch.skill(w.combat).map(|s| s.know), Some(2));
    assert_eq!(noble.command().map(|c| c.args.clone()), Some(vec![800, 0, -3]));
    assert!(noble.magic().unwrap().visions.contains(w.forest));

    assert_eq!(store.get(w.castle).unwrap().name(), "Castle {Grey}");
    let forest = store.get(w.forest).unwrap().location().unwrap();
    assert_eq!(
        forest.destinations.as_slice(),
        &[Some(w.plain), None, Some(w.plain)]
    );
    assert_eq!(store.get(w.player).unwrap().player().unwrap().known.len(), 10);
    assert_eq!(store.get(w.storm).unwrap().kind(), Kind::Storm);
    assert!(store.get(w.gate).unwrap().sub_location().is_none());

    for kind in Kind::ALL {
        assert_eq!(
            store.of_kind(kind).collect::<Vec<_>>(),
            w.store.of_kind(kind).collect::<Vec<_>>(),
            "{kind}"
        );
    }
}

#[test]
fn leftovers_hold_storms_and_tombstones() {
    let w = sample_world();
    let dir = tempfile::tempdir().unwrap();
    let report = save(&w.store, dir.path()).unwrap();
    assert_eq!(report.records_in("misc"), 2);
    assert_eq!(report.records_written, w.store.len());

    let misc = fs::read_to_string(dir.path().join("misc")).unwrap();
    assert!(misc.contains(&format!("{} storm rain\n", w.storm)));
    assert!(misc.contains(&format!("{} deleted 0\n\n", w.ghost)));
    let chars = fs::read_to_string(dir.path().join("char")).unwrap();
    let ghost_header = format!("{} ", w.ghost);
    assert!(!chars.lines().any(|l| l.starts_with(&ghost_header)));
}

#[test]
fn tombstones_stay_consumed_after_reload() {
    let w = sample_world();
    let dir = tempfile::tempdir().unwrap();
    save(&w.store, dir.path()).unwrap();
    let mut store = fresh();
    load(&mut store, dir.path()).unwrap();

    assert!(store.is_allocated(w.ghost));
    assert!(!store.is_live(w.ghost));
    assert_eq!(store.tombstone_count(), 1);
    assert!(matches!(
        store.allocate_at(w.ghost, Kind::Character, SubKind::None),
        Err(StoreError::DoubleAllocation { .. })
    ));
}

#[test]
fn long_lists_wrap_and_reparse_in_order() {
    let mut store = fresh();
    let noble = id(5001);
    store.allocate_at(noble, Kind::Character, SubKind::None).unwrap();
    let args: Vec<i32> = (1..=25).collect();
    store.get_mut(noble).unwrap().command_mut().args = args.clone();

    let dir = tempfile::tempdir().unwrap();
    save(&store, dir.path()).unwrap();
    let text = fs::read_to_string(dir.path().join("char")).unwrap();
    let ar: Vec<&str> = text
        .lines()
        .skip_while(|l| !l.starts_with(" ar"))
        .take(3)
        .collect();
    assert_eq!(ar[0].split_whitespace().count(), 1 + 11 + 1);
    assert_eq!(ar[1].split_whitespace().count(), 11 + 1);
    assert_eq!(ar[2].split_whitespace().count(), 3);
    assert!(ar[0].ends_with(" \\") && ar[1].ends_with(" \\"));

    let mut reloaded = fresh();
    load(&mut reloaded, dir.path()).unwrap();
    assert_eq!(reloaded.get(noble).unwrap().command().unwrap().args, args);
}

#[test]
fn wrap_width_does_not_change_what_loads() {
    let w = sample_world();
    let narrow = tempfile::tempdir().unwrap();
    let normal = tempfile::tempdir().unwrap();
    save_with(&w.store, narrow.path(), &PersistConfig::new().with_wrap_width(2)).unwrap();

    let mut store = fresh();
    let report = load(&mut store, narrow.path()).unwrap();
    assert!(report.is_clean());
    save(&store, normal.path()).unwrap();

    let direct = tempfile::tempdir().unwrap();
    save(&w.store, direct.path()).unwrap();
    assert_eq!(snapshot(normal.path()), snapshot(direct.path()));
}

#[test]
fn json_index_loads_when_legacy_master_is_missing() {
    let w = sample_world();
    let dir = tempfile::tempdir().unwrap();
    save_with(&w.store, dir.path(), &PersistConfig::new().with_json_index(true)).unwrap();
    assert!(dir.path().join(MASTER_JSON_FILE).exists());
    fs::remove_file(dir.path().join(MASTER_FILE)).unwrap();

    let mut store = fresh();
    let report = load(&mut store, dir.path()).unwrap();
    assert_eq!(report.source, IndexSource::Json);
    assert!(report.is_clean());
    assert_eq!(store.len(), w.store.len());
    assert!(!store.is_live(w.ghost));
}

#[test]
fn missing_index_falls_back_to_header_scan() {
    let w = sample_world();
    let dir = tempfile::tempdir().unwrap();
    save(&w.store, dir.path()).unwrap();
    fs::remove_file(dir.path().join(MASTER_FILE)).unwrap();

    let mut store = fresh();
    let report = load(&mut store, dir.path()).unwrap();
    assert_eq!(report.source, IndexSource::HeaderScan);
    assert!(report.is_clean(), "{:?}", report.warnings);
    assert_eq!(store.len(), w.store.len());
    assert_eq!(store.tombstone_count(), 1);
}

#[test]
fn loading_twice_into_one_store_is_a_double_allocation() {
    let w = sample_world();
    let dir = tempfile::tempdir().unwrap();
    save(&w.store, dir.path()).unwrap();
    let mut store = fresh();
    load(&mut store, dir.path()).unwrap();
    assert!(matches!(
        load(&mut store, dir.path()),
        Err(PersistError::Store(StoreError::DoubleAllocation { .. }))
    ));

    store.clear();
    load(&mut store, dir.path()).unwrap();
}

#[test]
fn empty_store_saves_and_loads() {
    let dir = tempfile::tempdir().unwrap();
    let report = save(&Store::default(), dir.path()).unwrap();
    assert_eq!(report.records_written, 0);
    let mut store = Store::default();
    let report = load(&mut store, dir.path()).unwrap();
    assert_eq!(report.allocated, 0);
    assert!(store.is_empty());
}

#[test]
fn skill_at_an_obsolete_id_survives_a_round_trip() {
    let mut store = TestWorldBuilder::new()
        .seed(SAMPLE_SEED)
        .entity(5, Kind::Skill, SubKind::SkillCategory, "Shipcraft")
        .entity(600, Kind::Skill, SubKind::SkillCategory, "Combat")
        .entity(5001, Kind::Character, SubKind::None, "Osswid")
        .build();
    store.get_mut(id(600)).unwrap().skill_mut().offered = vec![id(5)];
    store.get_mut(id(5001)).unwrap().character_mut().skills = vec![SkillEntry {
        skill: id(5),
        know: 1,
        days: 7,
        experience: 0,
    }];
    let dir = tempfile::tempdir().unwrap();
    save(&store, dir.path()).unwrap();

    let mut reloaded = fresh();
    let report = load(&mut reloaded, dir.path()).unwrap();
    assert!(report.is_clean(), "{:?}", report.warnings);
    let ch = reloaded.get(id(5001)).unwrap().character().unwrap();
    assert_eq!(ch.skills[0].skill, id(5));
    assert_eq!(ch.skills[0].days, 7);
    let combat = reloaded.get(id(600)).unwrap().skill().unwrap();
    assert_eq!(combat.offered, vec![id(5)]);
}

#[test]
fn saving_without_json_index_removes_a_stale_one() {
    let w = sample_world();
    let dir = tempfile::tempdir().unwrap();
    save_with(&w.store, dir.path(), &PersistConfig::new().with_json_index(true)).unwrap();
    assert!(dir.path().join(MASTER_JSON_FILE).exists());

    save(&w.store, dir.path()).unwrap();
    assert!(!dir.path().join(MASTER_JSON_FILE).exists());
    assert!(dir.path().join(MASTER_FILE).exists());
}
