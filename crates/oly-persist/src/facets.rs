//! Per-facet field codecs and the record-tag dispatch table.
//!
//! Each facet type implements [`FacetCodec`]: a two-character record
//! tag, a writer for its non-default fields and a reader for one field
//! line. [`FACETS`] maps tags to type-erased entry points so the block
//! reader can dispatch on the tag it sees.

use std::io::{self, Write};

use oly_store::{
    CharacterFacet, CommandFacet, CommandState, Effect, EntityRecord, Facet, GateFacet, ItemFacet,
    ItemStack, LocationFacet, MagicFacet, MiscFacet, NationFacet, PlayerFacet, ShipFacet,
    SkillEntry, SkillFacet, SubLocationFacet, Trade, TradeKind,
};

use crate::error::Problem;
use crate::fields::{FieldCtx, FieldSink};

/// Reading and writing of one facet type.
pub(crate) trait FacetCodec: Facet {
    /// Record tag introducing the facet in a block.
    const TAG: &'static str;

    /// Write every non-default field.
    fn write_fields(&self, sink: &mut FieldSink<'_>) -> io::Result<()>;

    /// Apply one field line. Returns `false` for an unknown tag.
    fn read_field(&mut self, tag: &str, value: &str, ctx: &mut FieldCtx<'_>) -> bool;
}

// ── Box-level fields ────────────────────────────────────────────

pub(crate) fn write_box_fields(
    record: &EntityRecord,
    out: &mut dyn Write,
    wrap: usize,
) -> io::Result<()> {
    let mut sink = FieldSink::box_level(out, wrap);
    sink.text("na", record.name())?;
    sink.list(
        "il",
        record
            .items
            .iter()
            .flat_map(|s| [i64::from(s.item.get()), i64::from(s.qty)]),
    )?;
    sink.list(
        "tl",
        record.trades.iter().flat_map(|t| {
            [
                i64::from(t.kind.code()),
                i64::from(t.item.get()),
                i64::from(t.qty),
                i64::from(t.cost),
            ]
        }),
    )?;
    sink.list(
        "ef",
        record
            .effects
            .iter()
            .flat_map(|e| [e.kind, e.sub_kind, e.days, e.data]),
    )
}

/// Apply one box-level field line. Returns `false` for an unknown tag.
pub(crate) fn read_box_field(
    record: &mut EntityRecord,
    tag: &str,
    value: &str,
    ctx: &mut FieldCtx<'_>,
) -> bool {
    match tag {
        "na" => record.set_name(value),
        "il" => {
            for [item, qty] in ctx.tuples::<2>(tag, value) {
                let qty = ctx.int(qty);
                if let Some(item) = ctx.reference(item) {
                    record.items.push(ItemStack { item, qty });
                }
            }
        }
        "tl" => {
            for [kind, item, qty, cost] in ctx.tuples::<4>(tag, value) {
                let code = ctx.int(kind);
                let (qty, cost) = (ctx.int(qty), ctx.int(cost));
                let item = ctx.reference(item);
                let Some(kind) = TradeKind::from_code(code) else {
                    ctx.warn(Problem::BadValue {
                        tag: tag.to_string(),
                        token: code.to_string(),
                    });
                    continue;
                };
                if let Some(item) = item {
                    record.trades.push(Trade {
                        kind,
                        item,
                        qty,
                        cost,
                    });
                }
            }
        }
        "ef" => {
            for [kind, sub_kind, days, data] in ctx.tuples::<4>(tag, value) {
                record.effects.push(Effect {
                    kind: ctx.int(kind),
                    sub_kind: ctx.int(sub_kind),
                    days: ctx.int(days),
                    data: ctx.int(data),
                });
            }
        }
        _ => return false,
    }
    true
}

// ── Dispatch table ──────────────────────────────────────────────

type ReadFn = fn(&mut EntityRecord, &str, &str, &mut FieldCtx<'_>) -> bool;
type WriteFn = fn(&EntityRecord, &mut dyn Write, usize) -> io::Result<()>;

/// Type-erased entry points for one facet.
pub(crate) struct FacetEntry {
    pub(crate) tag: &'static str,
    pub(crate) read: ReadFn,
    pub(crate) write: WriteFn,
}

fn write_facet<F: FacetCodec>(facet: Option<&F>, out: &mut dyn Write, wrap: usize) -> io::Result<()> {
    match facet {
        Some(facet) if !facet.is_empty() => {
            writeln!(out, "{}", F::TAG)?;
            facet.write_fields(&mut FieldSink::facet(out, wrap))
        }
        _ => Ok(()),
    }
}

macro_rules! facet_table {
    ($( $ty:ty => $get:ident, $get_mut:ident; )*) => {
        /// Every facet, in the order blocks list them.
        pub(crate) static FACETS: &[FacetEntry] = &[
            $(
                FacetEntry {
                    tag: <$ty as FacetCodec>::TAG,
                    read: |record, tag, value, ctx| record.$get_mut().read_field(tag, value, ctx),
                    write: |record, out, wrap| write_facet(record.$get(), out, wrap),
                },
            )*
        ];
    };
}

facet_table! {
    CharacterFacet => character, character_mut;
    LocationFacet => location, location_mut;
    SubLocationFacet => sub_location, sub_location_mut;
    ItemFacet => item, item_mut;
    PlayerFacet => player, player_mut;
    SkillFacet => skill, skill_mut;
    GateFacet => gate, gate_mut;
    MiscFacet => misc, misc_mut;
    CommandFacet => command, command_mut;
    ShipFacet => ship, ship_mut;
    NationFacet => nation, nation_mut;
    MagicFacet => magic, magic_mut;
}

/// The table entry for a record tag.
pub(crate) fn facet_for(tag: &str) -> Option<&'static FacetEntry> {
    FACETS.iter().find(|entry| entry.tag == tag)
}

// ── Facet codecs ────────────────────────────────────────────────

impl FacetCodec for CharacterFacet {
    const TAG: &'static str = "ch";

    fn write_fields(&self, s: &mut FieldSink<'_>) -> io::Result<()> {
        s.reference("ni", self.unit_item)?;
        s.int("lk", self.loyalty_kind)?;
        s.int("lr", self.loyalty_rate)?;
        s.int("he", self.health)?;
        s.flag("si", self.sick)?;
        s.flag("gu", self.guard)?;
        s.int("bh", self.behind)?;
        s.int("at", self.attack)?;
        s.int("df", self.defense)?;
        s.int("mi", self.missile)?;
        s.flag("pr", self.prisoner)?;
        s.int("bp", self.break_point)?;
        s.refs("ct", &self.contacts)?;
        s.list(
            "sl",
            self.skills.iter().flat_map(|e| {
                [
                    i64::from(e.skill.get()),
                    i64::from(e.know),
                    i64::from(e.days),
                    i64::from(e.experience),
                ]
            }),
        )?;
        s.reference("wh", self.location)
    }

    fn read_field(&mut self, tag: &str, value: &str, ctx: &mut FieldCtx<'_>) -> bool {
        match tag {
            "ni" => self.unit_item = ctx.reference(value),
            "lk" => self.loyalty_kind = ctx.int(value),
            "lr" => self.loyalty_rate = ctx.int(value),
            "he" => self.health = ctx.int(value),
            "si" => self.sick = ctx.flag(value),
            "gu" => self.guard = ctx.flag(value),
            "bh" => self.behind = ctx.int(value),
            "at" => self.attack = ctx.int(value),
            "df" => self.defense = ctx.int(value),
            "mi" => self.missile = ctx.int(value),
            "pr" => self.prisoner = ctx.flag(value),
            "bp" => self.break_point = ctx.int(value),
            "ct" => self.contacts = ctx.refs(value),
            "sl" => {
                for [skill, know, days, experience] in ctx.tuples::<4>(tag, value) {
                    let (know, days, experience) = (ctx.int(know), ctx.int(days), ctx.int(experience));
                    if let Some(skill) = ctx.skill(skill) {
                        self.skills.push(SkillEntry {
                            skill,
                            know,
                            days,
                            experience,
                        });
                    }
                }
            }
            "wh" => self.location = ctx.reference(value),
            _ => return false,
        }
        true
    }
}

impl FacetCodec for LocationFacet {
    const TAG: &'static str = "lo";

    fn write_fields(&self, s: &mut FieldSink<'_>) -> io::Result<()> {
        s.positional("pd", &self.destinations)?;
        s.flag("hi", self.hidden)?;
        s.int("sh", self.shroud)?;
        s.int("ba", self.barrier)?;
        s.int("ci", self.civ)?;
        s.flag("sd", self.safe_haven)?;
        s.reference("wh", self.location)
    }

    fn read_field(&mut self, tag: &str, value: &str, ctx: &mut FieldCtx<'_>) -> bool {
        match tag {
            "pd" => self.destinations = ctx.positional(value),
            "hi" => self.hidden = ctx.flag(value),
            "sh" => self.shroud = ctx.int(value),
            "ba" => self.barrier = ctx.int(value),
            "ci" => self.civ = ctx.int(value),
            "sd" => self.safe_haven = ctx.flag(value),
            "wh" => self.location = ctx.reference(value),
            _ => return false,
        }
        true
    }
}

impl FacetCodec for SubLocationFacet {
    const TAG: &'static str = "sl";

    fn write_fields(&self, s: &mut FieldSink<'_>) -> io::Result<()> {
        s.refs("te", &self.teachers)?;
        s.int("dm", self.damage)?;
        s.int("de", self.defense)?;
        s.flag("mo", self.moat)?;
        s.refs("lt", &self.link_to)?;
        s.refs("lf", &self.link_from)?;
        s.reference("bs", self.bound_storm)?;
        s.int("sd", self.shaft_depth)?;
        s.int("ca", self.capacity)
    }

    fn read_field(&mut self, tag: &str, value: &str, ctx: &mut FieldCtx<'_>) -> bool {
        match tag {
            "te" => self.teachers = ctx.refs(value),
            "dm" => self.damage = ctx.int(value),
            "de" => self.defense = ctx.int(value),
            "mo" => self.moat = ctx.flag(value),
            "lt" => self.link_to = ctx.refs(value),
            "lf" => self.link_from = ctx.refs(value),
            "bs" => self.bound_storm = ctx.reference(value),
            "sd" => self.shaft_depth = ctx.int(value),
            "ca" => self.capacity = ctx.int(value),
            _ => return false,
        }
        true
    }
}

impl FacetCodec for ItemFacet {
    const TAG: &'static str = "it";

    fn write_fields(&self, s: &mut FieldSink<'_>) -> io::Result<()> {
        s.int("wt", self.weight)?;
        s.int("lc", self.land_cap)?;
        s.int("rc", self.ride_cap)?;
        s.int("fc", self.fly_cap)?;
        s.int("bp", self.base_price)?;
        s.text("pl", &self.plural_name)?;
        s.flag("an", self.animal)?;
        s.int("at", self.attack)?;
        s.int("df", self.defense)?;
        s.int("mi", self.missile)?;
        s.reference("wh", self.who_has)
    }

    fn read_field(&mut self, tag: &str, value: &str, ctx: &mut FieldCtx<'_>) -> bool {
        match tag {
            "wt" => self.weight = ctx.int(value),
            "lc" => self.land_cap = ctx.int(value),
            "rc" => self.ride_cap = ctx.int(value),
            "fc" => self.fly_cap = ctx.int(value),
            "bp" => self.base_price = ctx.int(value),
            "pl" => self.plural_name = value.trim().to_string(),
            "an" => self.animal = ctx.flag(value),
            "at" => self.attack = ctx.int(value),
            "df" => self.defense = ctx.int(value),
            "mi" => self.missile = ctx.int(value),
            "wh" => self.who_has = ctx.reference(value),
            _ => return false,
        }
        true
    }
}

impl FacetCodec for PlayerFacet {
    const TAG: &'static str = "pl";

    fn write_fields(&self, s: &mut FieldSink<'_>) -> io::Result<()> {
        s.text("fn", &self.full_name)?;
        s.text("em", &self.email)?;
        s.text("ve", &self.vis_email)?;
        s.text("pw", &self.password)?;
        s.int("np", self.noble_points)?;
        s.int("ft", self.first_turn)?;
        s.int("lt", self.last_order_turn)?;
        s.int("fo", self.format)?;
        s.reference("nt", self.nation)?;
        s.refs("un", &self.units)?;
        s.set("kn", &self.known)?;
        s.set("vl", &self.visited)
    }

    fn read_field(&mut self, tag: &str, value: &str, ctx: &mut FieldCtx<'_>) -> bool {
        match tag {
            "fn" => self.full_name = value.trim().to_string(),
            "em" => self.email = value.trim().to_string(),
            "ve" => self.vis_email = value.trim().to_string(),
            "pw" => self.password = value.trim().to_string(),
            "np" => self.noble_points = ctx.int(value),
            "ft" => self.first_turn = ctx.int(value),
            "lt" => self.last_order_turn = ctx.int(value),
            "fo" => self.format = ctx.int(value),
            "nt" => self.nation = ctx.reference(value),
            "un" => self.units = ctx.refs(value),
            "kn" => self.known.extend(ctx.set(value).iter()),
            "vl" => self.visited.extend(ctx.set(value).iter()),
            _ => return false,
        }
        true
    }
}

impl FacetCodec for SkillFacet {
    const TAG: &'static str = "sk";

    fn write_fields(&self, s: &mut FieldSink<'_>) -> io::Result<()> {
        s.int("tl", self.time_to_learn)?;
        s.int("tu", self.time_to_use)?;
        s.int("np", self.np_cost)?;
        s.reference("rs", self.required_skill)?;
        s.refs("of", &self.offered)?;
        s.refs("re", &self.research)
    }

    fn read_field(&mut self, tag: &str, value: &str, ctx: &mut FieldCtx<'_>) -> bool {
        match tag {
            "tl" => self.time_to_learn = ctx.int(value),
            "tu" => self.time_to_use = ctx.int(value),
            "np" => self.np_cost = ctx.int(value),
            "rs" => self.required_skill = ctx.skill(value),
            "of" => self.offered = ctx.skills(value),
            "re" => self.research = ctx.skills(value),
            _ => return false,
        }
        true
    }
}

impl FacetCodec for GateFacet {
    const TAG: &'static str = "gt";

    fn write_fields(&self, s: &mut FieldSink<'_>) -> io::Result<()> {
        s.reference("tl", self.to_loc)?;
        s.int("sk", self.seal_key)?;
        s.reference("nj", self.notify_jumps)?;
        s.reference("nu", self.notify_unseal)
    }

    fn read_field(&mut self, tag: &str, value: &str, ctx: &mut FieldCtx<'_>) -> bool {
        match tag {
            "tl" => self.to_loc = ctx.reference(value),
            "sk" => self.seal_key = ctx.int(value),
            "nj" => self.notify_jumps = ctx.reference(value),
            "nu" => self.notify_unseal = ctx.reference(value),
            _ => return false,
        }
        true
    }
}

impl FacetCodec for ShipFacet {
    const TAG: &'static str = "sh";

    fn write_fields(&self, s: &mut FieldSink<'_>) -> io::Result<()> {
        s.int("hu", self.hulls)?;
        s.int("fo", self.forts)?;
        s.int("sa", self.sails)?;
        s.int("ke", self.keels)?;
        s.int("ca", self.capacity)?;
        s.int("dm", self.damage)
    }

    fn read_field(&mut self, tag: &str, value: &str, ctx: &mut FieldCtx<'_>) -> bool {
        match tag {
            "hu" => self.hulls = ctx.int(value),
            "fo" => self.forts = ctx.int(value),
            "sa" => self.sails = ctx.int(value),
            "ke" => self.keels = ctx.int(value),
            "ca" => self.capacity = ctx.int(value),
            "dm" => self.damage = ctx.int(value),
            _ => return false,
        }
        true
    }
}

impl FacetCodec for NationFacet {
    const TAG: &'static str = "nt";

    fn write_fields(&self, s: &mut FieldSink<'_>) -> io::Result<()> {
        s.text("nm", &self.nation_name)?;
        s.text("ci", &self.citizen)?;
        s.reference("ca", self.capital)?;
        s.flag("ne", self.neutral)?;
        s.flag("jn", self.joinable)
    }

    fn read_field(&mut self, tag: &str, value: &str, ctx: &mut FieldCtx<'_>) -> bool {
        match tag {
            "nm" => self.nation_name = value.trim().to_string(),
            "ci" => self.citizen = value.trim().to_string(),
            "ca" => self.capital = ctx.reference(value),
            "ne" => self.neutral = ctx.flag(value),
            "jn" => self.joinable = ctx.flag(value),
            _ => return false,
        }
        true
    }
}

impl FacetCodec for MagicFacet {
    const TAG: &'static str = "mg";

    fn write_fields(&self, s: &mut FieldSink<'_>) -> io::Result<()> {
        s.int("ma", self.max_aura)?;
        s.int("ca", self.cur_aura)?;
        s.reference("ak", self.auraculum)?;
        s.set("vi", &self.visions)?;
        s.reference("pc", self.pledged_to)?;
        s.flag("hs", self.hide_self)?;
        s.int("qc", self.quick_cast)?;
        s.int("ab", self.ability_shroud)
    }

    fn read_field(&mut self, tag: &str, value: &str, ctx: &mut FieldCtx<'_>) -> bool {
        match tag {
            "ma" => self.max_aura = ctx.int(value),
            "ca" => self.cur_aura = ctx.int(value),
            "ak" => self.auraculum = ctx.reference(value),
            "vi" => self.visions.extend(ctx.set(value).iter()),
            "pc" => self.pledged_to = ctx.reference(value),
            "hs" => self.hide_self = ctx.flag(value),
            "qc" => self.quick_cast = ctx.int(value),
            "ab" => self.ability_shroud = ctx.int(value),
            _ => return false,
        }
        true
    }
}

impl FacetCodec for MiscFacet {
    const TAG: &'static str = "mi";

    fn write_fields(&self, s: &mut FieldSink<'_>) -> io::Result<()> {
        s.text("di", &self.display)?;
        s.set("nm", &self.npc_memory)?;
        s.int("cr", self.npc_created)?;
        s.reference("sm", self.summoned_by)?;
        s.reference("gc", self.garrison_castle)?;
        s.int("st", self.storm_strength)?;
        s.reference("ol", self.old_lord)
    }

    fn read_field(&mut self, tag: &str, value: &str, ctx: &mut FieldCtx<'_>) -> bool {
        match tag {
            "di" => self.display = value.trim().to_string(),
            "nm" => self.npc_memory.extend(ctx.set(value).iter()),
            "cr" => self.npc_created = ctx.int(value),
            "sm" => self.summoned_by = ctx.reference(value),
            "gc" => self.garrison_castle = ctx.reference(value),
            "st" => self.storm_strength = ctx.int(value),
            "ol" => self.old_lord = ctx.reference(value),
            _ => return false,
        }
        true
    }
}

impl FacetCodec for CommandFacet {
    const TAG: &'static str = "cm";

    fn write_fields(&self, s: &mut FieldSink<'_>) -> io::Result<()> {
        s.text("li", &self.line)?;
        s.int("st", self.state.code())?;
        s.int("wa", self.wait)?;
        s.flag("po", self.poll)?;
        s.int("pr", self.priority)?;
        s.list("ar", &self.args)
    }

    fn read_field(&mut self, tag: &str, value: &str, ctx: &mut FieldCtx<'_>) -> bool {
        match tag {
            "li" => self.line = value.trim().to_string(),
            "st" => {
                let code = ctx.int(value);
                match CommandState::from_code(code) {
                    Some(state) => self.state = state,
                    None => ctx.warn(Problem::BadValue {
                        tag: tag.to_string(),
                        token: value.trim().to_string(),
                    }),
                }
            }
            "wa" => self.wait = ctx.int(value),
            "po" => self.poll = ctx.flag(value),
            "pr" => self.priority = ctx.int(value),
            "ar" => self.args = ctx.ints(value),
            _ => return false,
        }
        true
    }
}
