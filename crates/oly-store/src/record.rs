//! The entity record ("box"): fixed header, lazily created facets and
//! unordered collections.

use oly_core::{EntityId, Kind, SubKind};

use crate::facet::{
    CharacterFacet, CommandFacet, GateFacet, ItemFacet, LocationFacet, MagicFacet, MiscFacet,
    NationFacet, PlayerFacet, ShipFacet, SkillFacet, SubLocationFacet,
};

/// A quantity of one item held by an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemStack {
    /// Item type (or unique item).
    pub item: EntityId,
    /// Quantity held.
    pub qty: i32,
}

/// Direction of a pending market trade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TradeKind {
    /// Offer to buy.
    Buy,
    /// Offer to sell.
    Sell,
}

impl TradeKind {
    /// Numeric form used in save files.
    pub const fn code(self) -> i32 {
        match self {
            Self::Buy => 1,
            Self::Sell => 2,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Buy),
            2 => Some(Self::Sell),
            _ => None,
        }
    }
}

/// A pending buy or sell offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trade {
    /// Buy or sell.
    pub kind: TradeKind,
    /// Item traded.
    pub item: EntityId,
    /// Quantity offered.
    pub qty: i32,
    /// Price per unit.
    pub cost: i32,
}

/// A timed effect attached to an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Effect {
    /// Effect type.
    pub kind: i32,
    /// Effect sub-type.
    pub sub_kind: i32,
    /// Days remaining.
    pub days: i32,
    /// Effect-specific payload.
    pub data: i32,
}

/// Make a name safe for the text save format.
///
/// `[` and `]` delimit references in reports and orders, so they become
/// `{` and `}`. Control characters become spaces; surrounding whitespace
/// and trailing line-continuation backslashes are dropped.
pub fn sanitize_name(name: &str) -> String {
    let mapped: String = name
        .chars()
        .map(|c| match c {
            '[' => '{',
            ']' => '}',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    mapped
        .trim()
        .trim_end_matches(|c: char| c == '\\' || c.is_whitespace())
        .to_string()
}

#[derive(Clone, Debug, Default)]
struct Facets {
    character: Option<Box<CharacterFacet>>,
    location: Option<Box<LocationFacet>>,
    sub_location: Option<Box<SubLocationFacet>>,
    item: Option<Box<ItemFacet>>,
    player: Option<Box<PlayerFacet>>,
    skill: Option<Box<SkillFacet>>,
    gate: Option<Box<GateFacet>>,
    ship: Option<Box<ShipFacet>>,
    nation: Option<Box<NationFacet>>,
    magic: Option<Box<MagicFacet>>,
    misc: Option<Box<MiscFacet>>,
    command: Option<Box<CommandFacet>>,
}

/// One entity: header, optional facets and held collections.
///
/// Header fields other than the name are owned by the
/// [`Store`](crate::Store), which keeps the type indices in step with
/// them.
#[derive(Clone, Debug)]
pub struct EntityRecord {
    id: EntityId,
    kind: Kind,
    sub_kind: SubKind,
    name: String,
    /// Items held.
    pub items: Vec<ItemStack>,
    /// Pending market trades.
    pub trades: Vec<Trade>,
    /// Timed effects.
    pub effects: Vec<Effect>,
    facets: Facets,
}

impl EntityRecord {
    pub(crate) fn new(id: EntityId, kind: Kind, sub_kind: SubKind) -> Self {
        Self {
            id,
            kind,
            sub_kind,
            name: String::new(),
            items: Vec::new(),
            trades: Vec::new(),
            effects: Vec::new(),
            facets: Facets::default(),
        }
    }

    /// The record's id.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Primary type.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Secondary type.
    pub fn sub_kind(&self) -> SubKind {
        self.sub_kind
    }

    pub(crate) fn set_header(&mut self, kind: Kind, sub_kind: SubKind) {
        self.kind = kind;
        self.sub_kind = sub_kind;
    }

    /// Whether the record has been deleted.
    pub fn is_tombstone(&self) -> bool {
        self.kind.is_tombstone()
    }

    /// Display name; empty when unnamed.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename, sanitizing the new name with [`sanitize_name`].
    pub fn set_name(&mut self, name: &str) {
        self.name = sanitize_name(name);
    }

    /// Quantity of `item` held.
    pub fn item_qty(&self, item: EntityId) -> i32 {
        self.items
            .iter()
            .find(|s| s.item == item)
            .map_or(0, |s| s.qty)
    }

    /// Adjust the held quantity of `item` by `delta`, dropping the stack
    /// when it reaches zero. Returns the new quantity, saturated at the
    /// `i32` bounds.
    pub fn add_item(&mut self, item: EntityId, delta: i32) -> i32 {
        match self.items.iter().position(|s| s.item == item) {
            Some(pos) => {
                let qty = self.items[pos].qty.saturating_add(delta);
                if qty == 0 {
                    self.items.remove(pos);
                } else {
                    self.items[pos].qty = qty;
                }
                qty
            }
            None if delta != 0 => {
                self.items.push(ItemStack { item, qty: delta });
                delta
            }
            None => 0,
        }
    }

    /// Drop the name, every facet and every collection, keeping the header.
    pub(crate) fn strip(&mut self) {
        self.name.clear();
        self.items.clear();
        self.trades.clear();
        self.effects.clear();
        self.facets = Facets::default();
    }
}

macro_rules! facet_accessors {
    ($( $field:ident, $field_mut:ident, $take:ident: $ty:ty; )*) => {
        impl EntityRecord {
            $(
                #[doc = concat!("The ", stringify!($field), " facet, if it has been created.")]
                pub fn $field(&self) -> Option<&$ty> {
                    self.facets.$field.as_deref()
                }

                #[doc = concat!("The ", stringify!($field), " facet, created empty on first access.")]
                pub fn $field_mut(&mut self) -> &mut $ty {
                    self.facets.$field.get_or_insert_with(Default::default)
                }

                #[doc = concat!("Remove and return the ", stringify!($field), " facet.")]
                pub fn $take(&mut self) -> Option<$ty> {
                    self.facets.$field.take().map(|b| *b)
                }
            )*
        }
    };
}

facet_accessors! {
    character, character_mut, take_character: CharacterFacet;
    location, location_mut, take_location: LocationFacet;
    sub_location, sub_location_mut, take_sub_location: SubLocationFacet;
    item, item_mut, take_item: ItemFacet;
    player, player_mut, take_player: PlayerFacet;
    skill, skill_mut, take_skill: SkillFacet;
    gate, gate_mut, take_gate: GateFacet;
    ship, ship_mut, take_ship: ShipFacet;
    nation, nation_mut, take_nation: NationFacet;
    magic, magic_mut, take_magic: MagicFacet;
    misc, misc_mut, take_misc: MiscFacet;
    command, command_mut, take_command: CommandFacet;
}
