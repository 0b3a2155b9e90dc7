//! A small but complete world touching every facet.
//!
//! [`sample_world`] builds the same store every time (fixed seed), so
//! tests can save it, reload it and compare against known ids.

use oly_core::{EntityId, Kind, SubKind};
use oly_store::{
    CommandState, Effect, EntityRecord, SkillEntry, Store, StoreConfig, Trade, TradeKind,
};

/// Seed used by [`sample_world`].
pub const SAMPLE_SEED: u64 = 0x01_1A_5EED;

/// Shorthand for a known-valid id.
///
/// # Panics
///
/// If `raw` is outside 1..=102,400.
pub fn id(raw: u32) -> EntityId {
    EntityId::new(raw).unwrap_or_else(|| panic!("{raw} is not a valid entity id"))
}

fn record(store: &mut Store, at: EntityId) -> &mut EntityRecord {
    store
        .get_mut(at)
        .unwrap_or_else(|| panic!("{at} is not allocated"))
}

/// Handles to the interesting entities of [`sample_world`].
pub struct SampleWorld {
    pub store: Store,
    pub combat: EntityId,
    pub magic: EntityId,
    pub peasant: EntityId,
    pub sword: EntityId,
    pub forest: EntityId,
    pub plain: EntityId,
    pub castle: EntityId,
    pub gate: EntityId,
    pub ship: EntityId,
    pub nation: EntityId,
    pub player: EntityId,
    pub noble: EntityId,
    pub storm: EntityId,
    pub ghost: EntityId,
}

/// Build the sample world.
///
/// Skills, item types and the nation sit at fixed static ids; everything
/// else is drawn from the allocator. One noble is deleted so the world
/// holds a tombstone, and a storm lands in the leftovers file.
pub fn sample_world() -> SampleWorld {
    let mut store = Store::new(StoreConfig::new().with_seed(SAMPLE_SEED));
    let mut fixed = |raw: u32, kind: Kind, sub_kind: SubKind, name: &str| {
        let at = id(raw);
        store
            .allocate_at(at, kind, sub_kind)
            .unwrap_or_else(|e| panic!("allocate_at({raw}): {e}"));
        record(&mut store, at).set_name(name);
        at
    };

    let combat = fixed(600, Kind::Skill, SubKind::SkillCategory, "Combat");
    let magic = fixed(800, Kind::Skill, SubKind::SkillMagic, "Magic");
    let peasant = fixed(10, Kind::Item, SubKind::None, "peasant");
    let sword = fixed(72, Kind::Item, SubKind::None, "sword");
    let nation = fixed(1001, Kind::Nation, SubKind::None, "Pen");

    let mut alloc = |kind: Kind, sub_kind: SubKind, name: &str| {
        let at = store
            .allocate(kind, sub_kind)
            .unwrap_or_else(|e| panic!("allocate({kind}): {e}"));
        record(&mut store, at).set_name(name);
        at
    };

    let forest = alloc(Kind::Location, SubKind::Forest, "Forest of Doom");
    let plain = alloc(Kind::Location, SubKind::Plain, "Grassy Plain");
    let castle = alloc(Kind::Location, SubKind::Castle, "Castle [Grey]");
    let gate = alloc(Kind::Gate, SubKind::None, "");
    let ship = alloc(Kind::Ship, SubKind::Galley, "Wave Runner");
    let player = alloc(Kind::Player, SubKind::PlayerRegular, "Red Hand");
    let noble = alloc(Kind::Character, SubKind::None, "Osswid the Brave");
    let storm = alloc(Kind::Storm, SubKind::Rain, "");
    let ghost = alloc(Kind::Character, SubKind::None, "Gone");

    let skill = record(&mut store, combat).skill_mut();
    skill.time_to_learn = 14;
    skill.np_cost = 1;
    skill.offered = vec![magic];
    record(&mut store, magic).skill_mut().required_skill = Some(combat);

    let item = record(&mut store, peasant).item_mut();
    item.weight = 100;
    item.land_cap = 15;
    item.base_price = 10;
    item.plural_name = "peasants".into();
    let item = record(&mut store, sword).item_mut();
    item.weight = 5;
    item.attack = 3;
    item.plural_name = "swords".into();

    let n = record(&mut store, nation).nation_mut();
    n.nation_name = "Pen".into();
    n.citizen = "Pennite".into();
    n.capital = Some(castle);
    n.joinable = true;

    let loc = record(&mut store, forest).location_mut();
    loc.destinations = [Some(plain), None, Some(plain), None].into_iter().collect();
    loc.civ = 2;
    loc.hidden = true;
    record(&mut store, plain).location_mut().destinations =
        [None, Some(forest)].into_iter().collect();
    let loc = record(&mut store, castle).location_mut();
    loc.location = Some(plain);
    loc.safe_haven = true;
    let sub = record(&mut store, castle).sub_location_mut();
    sub.defense = 40;
    sub.moat = true;
    sub.link_from = vec![forest];
    sub.capacity = 500;

    let g = record(&mut store, gate).gate_mut();
    g.to_loc = Some(forest);
    g.seal_key = 123;
    g.notify_jumps = Some(noble);

    let s = record(&mut store, ship).ship_mut();
    s.hulls = 2;
    s.sails = 3;
    s.damage = 10;
    record(&mut store, ship).effects.push(Effect {
        kind: 3,
        sub_kind: 0,
        days: 4,
        data: -1,
    });

    let p = record(&mut store, player).player_mut();
    p.full_name = "Rich Skrenta".into();
    p.email = "rich@example.org".into();
    p.password = "swordfish".into();
    p.noble_points = 12;
    p.first_turn = 1;
    p.nation = Some(nation);
    p.units = vec![noble];
    for known in [combat, magic, peasant, sword, forest, plain, castle, gate, ship, nation] {
        p.known.insert(known);
    }
    p.visited.insert(forest);
    p.visited.insert(plain);

    let r = record(&mut store, noble);
    r.add_item(peasant, 25);
    r.add_item(sword, 2);
    r.trades.push(Trade {
        kind: TradeKind::Buy,
        item: sword,
        qty: 1,
        cost: 60,
    });
    let ch = r.character_mut();
    ch.unit_item = Some(peasant);
    ch.loyalty_kind = 1;
    ch.loyalty_rate = 50;
    ch.health = 100;
    ch.guard = true;
    ch.attack = 80;
    ch.defense = 80;
    ch.break_point = 50;
    ch.contacts = vec![ghost];
    ch.location = Some(castle);
    ch.skills = vec![
        SkillEntry {
            skill: combat,
            know: 2,
            days: 14,
            experience: 3,
        },
        SkillEntry {
            skill: magic,
            know: 0,
            days: 5,
            experience: 0,
        },
    ];
    let mg = r.magic_mut();
    mg.max_aura = 20;
    mg.cur_aura = 17;
    mg.visions.insert(forest);
    mg.hide_self = true;
    let cm = r.command_mut();
    cm.line = "study 800".into();
    cm.state = CommandState::Run;
    cm.wait = 5;
    cm.args = vec![800, 0, -3];
    r.misc_mut().npc_memory.insert(player);

    record(&mut store, storm).misc_mut().storm_strength = 4;
    record(&mut store, storm).misc_mut().summoned_by = Some(noble);

    store
        .delete(ghost)
        .unwrap_or_else(|e| panic!("delete({ghost}): {e}"));

    SampleWorld {
        store,
        combat,
        magic,
        peasant,
        sword,
        forest,
        plain,
        castle,
        gate,
        ship,
        nation,
        player,
        noble,
        storm,
        ghost,
    }
}
