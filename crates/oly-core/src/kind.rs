//! Two-level entity classification: [`Kind`] and [`SubKind`].
//!
//! Both levels carry a stable lowercase name used in the text save format
//! and in the master index. The store keeps one enumeration index per
//! kind and one per sub-kind.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::KindError;

/// Primary type of an entity record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// A player (faction) account.
    Player,
    /// A character unit in play.
    Character,
    /// A province or sub-location.
    Location,
    /// An item type, or a unique item.
    Item,
    /// A skill definition.
    Skill,
    /// A magical gate between two locations.
    Gate,
    /// A road or hidden route between locations.
    Road,
    /// A ship.
    Ship,
    /// A posted sign or message.
    Post,
    /// A weather storm.
    Storm,
    /// A noble that has been promised but not yet formed.
    Unformed,
    /// A nation players may join.
    Nation,
    /// Tombstone left behind by deletion.
    Deleted,
    /// A character that has died but is kept for history.
    DeadCharacter,
}

impl Kind {
    /// Every kind, in save order.
    pub const ALL: [Kind; 14] = [
        Kind::Player,
        Kind::Character,
        Kind::Location,
        Kind::Item,
        Kind::Skill,
        Kind::Gate,
        Kind::Road,
        Kind::Ship,
        Kind::Post,
        Kind::Storm,
        Kind::Unformed,
        Kind::Nation,
        Kind::Deleted,
        Kind::DeadCharacter,
    ];

    /// Name used in save files and the master index.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Character => "char",
            Self::Location => "loc",
            Self::Item => "item",
            Self::Skill => "skill",
            Self::Gate => "gate",
            Self::Road => "road",
            Self::Ship => "ship",
            Self::Post => "post",
            Self::Storm => "storm",
            Self::Unformed => "unform",
            Self::Nation => "nation",
            Self::Deleted => "deleted",
            Self::DeadCharacter => "dead",
        }
    }

    /// File holding records of this kind, or `None` for kinds that are
    /// written to the leftovers file.
    pub const fn file_name(self) -> Option<&'static str> {
        match self {
            Self::Post | Self::Storm | Self::Deleted | Self::DeadCharacter => None,
            other => Some(other.name()),
        }
    }

    /// Whether this is the deletion tombstone.
    pub const fn is_tombstone(self) -> bool {
        matches!(self, Self::Deleted)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kind {
    type Err = KindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| KindError::UnknownKind(s.to_string()))
    }
}

macro_rules! sub_kinds {
    ($( $(#[$doc:meta])* $variant:ident => $name:literal, )*) => {
        /// Finer classification whose meaning depends on the [`Kind`].
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum SubKind {
            $( $(#[$doc])* $variant, )*
        }

        impl SubKind {
            /// Every sub-kind, in declaration order.
            pub const ALL: &'static [SubKind] = &[ $( SubKind::$variant, )* ];

            /// Name used in save files and the master index.
            pub const fn name(self) -> &'static str {
                match self {
                    $( SubKind::$variant => $name, )*
                }
            }
        }
    };
}

sub_kinds! {
    /// No sub-classification; printed as `0`.
    #[default]
    None => "0",

    // Provinces.
    /// Open ocean.
    Ocean => "ocean",
    /// Forest province.
    Forest => "forest",
    /// Plain province.
    Plain => "plain",
    /// Mountain province.
    Mountain => "mountain",
    /// Desert province.
    Desert => "desert",
    /// Swamp province.
    Swamp => "swamp",
    /// Underground province.
    Underground => "under",
    /// Cloud province.
    Cloud => "cloud",
    /// Faery province.
    Faery => "faery",
    /// Hades province.
    Hades => "hades",
    /// Tunnel in the underground.
    Tunnel => "tunnel",
    /// Chamber in the underground.
    Chamber => "chamber",

    // Natural sub-locations.
    /// Island.
    Island => "island",
    /// Ring of standing stones.
    StoneCircle => "stone_cir",
    /// Mallorn grove.
    MallornGrove => "mallorn_grove",
    /// Bog.
    Bog => "bog",
    /// Cave.
    Cave => "cave",
    /// City.
    City => "city",
    /// Monster lair.
    Lair => "lair",
    /// Graveyard.
    Graveyard => "graveyard",
    /// Ruins.
    Ruins => "ruins",
    /// Old battlefield.
    Battlefield => "battlefield",
    /// Enchanted forest.
    EnchantedForest => "ench_forest",
    /// Rocky hill.
    RockyHill => "rocky_hill",
    /// Circle of trees.
    TreeCircle => "tree_circle",
    /// Pits.
    Pits => "pits",
    /// Pasture.
    Pasture => "pasture",
    /// Oasis.
    Oasis => "oasis",
    /// Yew grove.
    YewGrove => "yew_grove",
    /// Sand pit.
    SandPit => "sand_pit",
    /// Sacred grove.
    SacredGrove => "sacred_grove",
    /// Poppy field.
    PoppyField => "poppy_field",

    // Structures.
    /// Castle.
    Castle => "castle",
    /// Tower.
    Tower => "tower",
    /// Temple.
    Temple => "temple",
    /// Inn.
    Inn => "inn",
    /// Mine.
    Mine => "mine",
    /// Collapsed mine.
    CollapsedMine => "collapsed_mine",
    /// Galley.
    Galley => "galley",
    /// Roundship.
    Roundship => "roundship",
    /// Structure still under construction.
    InProgress => "in_progress",

    // Players.
    /// Regular player.
    PlayerRegular => "pl_regular",
    /// Game master.
    PlayerGm => "pl_gm",
    /// Independent (non-player) faction.
    PlayerIndependent => "pl_indep",
    /// Monster faction.
    PlayerMonster => "pl_monster",
    /// Silent observer.
    PlayerSilent => "pl_silent",

    // Items.
    /// Remains of a dead character.
    DeadBody => "dead_body",
    /// Unique artifact.
    Artifact => "artifact",
    /// Potion.
    Potion => "potion",
    /// Scroll.
    Scroll => "scroll",
    /// Magic palantir.
    Palantir => "palantir",
    /// Auraculum.
    Auraculum => "auraculum",

    // Skills.
    /// Skill category (school).
    SkillCategory => "category",
    /// Skill learned under a category.
    SkillSubskill => "subskill",
    /// Magic skill.
    SkillMagic => "magic",

    // Storms.
    /// Rain storm.
    Rain => "rain",
    /// Wind storm.
    Wind => "wind",
    /// Fog bank.
    Fog => "fog",
    /// Mist.
    Mist => "mist",
}

impl SubKind {
    /// Whether this sub-kind classifies a province rather than a
    /// sub-location or structure.
    pub const fn is_province(self) -> bool {
        matches!(
            self,
            Self::Ocean
                | Self::Forest
                | Self::Plain
                | Self::Mountain
                | Self::Desert
                | Self::Swamp
                | Self::Underground
                | Self::Cloud
                | Self::Faery
                | Self::Hades
                | Self::Tunnel
                | Self::Chamber
        )
    }
}

impl fmt::Display for SubKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SubKind {
    type Err = KindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| KindError::UnknownSubKind(s.to_string()))
    }
}

// Both levels serialize as their save-file names.

impl Serialize for Kind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Kind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

impl Serialize for SubKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for SubKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}
