//! Renumbering of obsolete skill ids.
//!
//! Early saves numbered skills with small integers. Those ids were later
//! moved into the 600 block; a skill reference read from disk passes
//! through [`current_skill_id`] before it is validated, unless some
//! entity is allocated at the old id.

/// `(obsolete, current)` pairs, sorted by obsolete id.
const RENUMBERED: &[(u32, u32)] = &[
    (1, 600),
    (2, 610),
    (3, 620),
    (4, 630),
    (5, 640),
    (6, 650),
    (7, 660),
    (8, 670),
    (9, 680),
    (10, 690),
    (11, 700),
    (12, 710),
    (13, 720),
    (14, 730),
    (15, 740),
    (16, 750),
    (17, 760),
];

/// The current id for a skill id read from disk.
pub fn current_skill_id(raw: u32) -> u32 {
    RENUMBERED
        .binary_search_by_key(&raw, |&(old, _)| old)
        .map_or(raw, |i| RENUMBERED[i].1)
}
