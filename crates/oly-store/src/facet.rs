//! Optional attribute blocks ("facets") of an entity record.
//!
//! A facet is created the first time it is written through its `_mut`
//! accessor on [`EntityRecord`](crate::EntityRecord). An absent facet and
//! one holding only default values are equivalent: persistence writes
//! neither.
//!
//! References to other entities are `Option<EntityId>` (`None` is the null
//! reference) or `Vec<EntityId>` for reference lists.

use oly_core::EntityId;
use smallvec::SmallVec;

use crate::idset::IdSet;

/// Common behaviour of every facet.
pub trait Facet: Default + PartialEq {
    /// Human-readable facet name, used in diagnostics.
    const NAME: &'static str;

    /// Whether every field holds its default value.
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One known skill of a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkillEntry {
    /// The skill.
    pub skill: EntityId,
    /// Knowledge level; 0 while still being studied.
    pub know: i32,
    /// Days of study invested.
    pub days: i32,
    /// Experience gained through use.
    pub experience: i32,
}

/// Unit attributes of characters and unformed nobles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterFacet {
    /// Item type the unit is made of (noble, peasant, ...).
    pub unit_item: Option<EntityId>,
    /// Loyalty kind (contract, oath, fear, ...).
    pub loyalty_kind: i32,
    /// Loyalty strength.
    pub loyalty_rate: i32,
    /// Health percentage; -1 for units without health.
    pub health: i32,
    /// Whether the unit is sick.
    pub sick: bool,
    /// Whether the unit is guarding its location.
    pub guard: bool,
    /// Combat rank (0 front, higher is further behind).
    pub behind: i32,
    /// Personal attack rating.
    pub attack: i32,
    /// Personal defense rating.
    pub defense: i32,
    /// Personal missile rating.
    pub missile: i32,
    /// Whether the unit is held prisoner.
    pub prisoner: bool,
    /// Casualty percentage at which the unit breaks off.
    pub break_point: i32,
    /// Entities the unit has been contacted by.
    pub contacts: Vec<EntityId>,
    /// Known and partially studied skills.
    pub skills: Vec<SkillEntry>,
    /// Where the unit is.
    pub location: Option<EntityId>,
}

impl Facet for CharacterFacet {
    const NAME: &'static str = "character";
}

impl CharacterFacet {
    /// The entry for `skill`, if the unit has one.
    pub fn skill(&self, skill: EntityId) -> Option<&SkillEntry> {
        self.skills.iter().find(|s| s.skill == skill)
    }
}

/// Attributes shared by provinces and sub-locations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocationFacet {
    /// Exits in compass order (north, east, south, west, up, down);
    /// `None` marks a missing exit.
    pub destinations: SmallVec<[Option<EntityId>; 6]>,
    /// Whether the location is hidden.
    pub hidden: bool,
    /// Shroud strength against scrying.
    pub shroud: i32,
    /// Magical barrier strength.
    pub barrier: i32,
    /// Civilization level.
    pub civ: i32,
    /// Whether combat is forbidden here.
    pub safe_haven: bool,
    /// Enclosing location.
    pub location: Option<EntityId>,
}

impl Facet for LocationFacet {
    const NAME: &'static str = "location";
}

/// Sub-location and structure attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubLocationFacet {
    /// Characters teaching here.
    pub teachers: Vec<EntityId>,
    /// Structural damage percentage.
    pub damage: i32,
    /// Defense bonus.
    pub defense: i32,
    /// Whether the structure has a moat.
    pub moat: bool,
    /// Locations this one leads to.
    pub link_to: Vec<EntityId>,
    /// Locations that lead here.
    pub link_from: Vec<EntityId>,
    /// Storm bound to this location.
    pub bound_storm: Option<EntityId>,
    /// Depth of a mine shaft.
    pub shaft_depth: i32,
    /// Occupant capacity.
    pub capacity: i32,
}

impl Facet for SubLocationFacet {
    const NAME: &'static str = "sub-location";
}

/// Item type attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemFacet {
    /// Weight of one unit.
    pub weight: i32,
    /// Carrying capacity on land.
    pub land_cap: i32,
    /// Carrying capacity when ridden.
    pub ride_cap: i32,
    /// Carrying capacity when flying.
    pub fly_cap: i32,
    /// Base market price.
    pub base_price: i32,
    /// Plural display name.
    pub plural_name: String,
    /// Whether the item is an animal.
    pub animal: bool,
    /// Attack rating when fighting as a unit.
    pub attack: i32,
    /// Defense rating when fighting as a unit.
    pub defense: i32,
    /// Missile rating when fighting as a unit.
    pub missile: i32,
    /// Holder of a unique item.
    pub who_has: Option<EntityId>,
}

impl Facet for ItemFacet {
    const NAME: &'static str = "item";
}

/// Player account attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerFacet {
    /// Full name of the person behind the faction.
    pub full_name: String,
    /// Turn-report address.
    pub email: String,
    /// Address shown to other players.
    pub vis_email: String,
    /// Order password.
    pub password: String,
    /// Unspent noble points.
    pub noble_points: i32,
    /// Turn the player joined.
    pub first_turn: i32,
    /// Last turn orders were received.
    pub last_order_turn: i32,
    /// Report format flags.
    pub format: i32,
    /// Nation the player belongs to.
    pub nation: Option<EntityId>,
    /// Units controlled by the player.
    pub units: Vec<EntityId>,
    /// Entities the player knows about.
    pub known: IdSet,
    /// Locations the player has visited.
    pub visited: IdSet,
}

impl Facet for PlayerFacet {
    const NAME: &'static str = "player";
}

/// Skill definition attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkillFacet {
    /// Days of study required.
    pub time_to_learn: i32,
    /// Days needed to use the skill.
    pub time_to_use: i32,
    /// Noble point cost to learn.
    pub np_cost: i32,
    /// Prerequisite skill.
    pub required_skill: Option<EntityId>,
    /// Sub-skills offered once this one is known.
    pub offered: Vec<EntityId>,
    /// Sub-skills that must be researched.
    pub research: Vec<EntityId>,
}

impl Facet for SkillFacet {
    const NAME: &'static str = "skill";
}

/// Gate attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GateFacet {
    /// Destination.
    pub to_loc: Option<EntityId>,
    /// Key needed to pass a sealed gate; 0 when unsealed.
    pub seal_key: i32,
    /// Character notified when someone jumps through.
    pub notify_jumps: Option<EntityId>,
    /// Character notified when the gate is unsealed.
    pub notify_unseal: Option<EntityId>,
}

impl Facet for GateFacet {
    const NAME: &'static str = "gate";
}

/// Ship attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShipFacet {
    /// Hull count.
    pub hulls: i32,
    /// Fortification count.
    pub forts: i32,
    /// Sail count.
    pub sails: i32,
    /// Keel count.
    pub keels: i32,
    /// Cargo capacity.
    pub capacity: i32,
    /// Damage percentage.
    pub damage: i32,
}

impl Facet for ShipFacet {
    const NAME: &'static str = "ship";
}

/// Nation attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NationFacet {
    /// Nation name.
    pub nation_name: String,
    /// What members are called.
    pub citizen: String,
    /// Capital city.
    pub capital: Option<EntityId>,
    /// Whether the nation stays out of wars.
    pub neutral: bool,
    /// Whether new players may join.
    pub joinable: bool,
}

impl Facet for NationFacet {
    const NAME: &'static str = "nation";
}

/// Magician attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MagicFacet {
    /// Maximum aura.
    pub max_aura: i32,
    /// Current aura.
    pub cur_aura: i32,
    /// The magician's auraculum.
    pub auraculum: Option<EntityId>,
    /// Entities revealed through visions.
    pub visions: IdSet,
    /// Magician this one is pledged to.
    pub pledged_to: Option<EntityId>,
    /// Whether the magician hides from scrying.
    pub hide_self: bool,
    /// Quick-cast bonus.
    pub quick_cast: i32,
    /// Shroud strength against ability scrying.
    pub ability_shroud: i32,
}

impl Facet for MagicFacet {
    const NAME: &'static str = "magic";
}

/// Attributes that fit no other facet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MiscFacet {
    /// Free-form display string.
    pub display: String,
    /// Entities an NPC remembers.
    pub npc_memory: IdSet,
    /// Turn an NPC was created.
    pub npc_created: i32,
    /// Summoner of a summoned creature.
    pub summoned_by: Option<EntityId>,
    /// Castle a garrison belongs to.
    pub garrison_castle: Option<EntityId>,
    /// Strength of a storm.
    pub storm_strength: i32,
    /// Previous lord of a unit.
    pub old_lord: Option<EntityId>,
}

impl Facet for MiscFacet {
    const NAME: &'static str = "misc";
}

/// Execution state of an in-flight command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommandState {
    /// Loaded, not yet started.
    #[default]
    Load,
    /// Running over several days.
    Run,
    /// Finished.
    Done,
}

impl CommandState {
    /// Numeric form used in save files.
    pub const fn code(self) -> i32 {
        match self {
            Self::Load => 0,
            Self::Run => 1,
            Self::Done => 2,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Load),
            1 => Some(Self::Run),
            2 => Some(Self::Done),
            _ => None,
        }
    }
}

/// The order a unit is currently executing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandFacet {
    /// Order text as submitted.
    pub line: String,
    /// Execution state.
    pub state: CommandState,
    /// Days left to wait.
    pub wait: i32,
    /// Whether the command is re-polled each day.
    pub poll: bool,
    /// Scheduling priority.
    pub priority: i32,
    /// Parsed numeric arguments.
    pub args: Vec<i32>,
}

impl Facet for CommandFacet {
    const NAME: &'static str = "command";
}
