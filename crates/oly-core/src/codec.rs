//! Conversion between entity ids and short alphanumeric codes.
//!
//! Each [`IdRange`] prints its ids in a fixed shape of letters (`C`, one of
//! `a`–`z`) and digits (`N`). Encoding subtracts the range base and spreads
//! the offset over the shape with mixed-radix arithmetic (base 26 for
//! letters, base 10 for digits, most significant position first). Decoding
//! classifies the input by its letter/digit pattern and inverts the same
//! arithmetic.
//!
//! | Range | Shape | Example |
//! |---|---|---|
//! | 1–9,999 | digits | `512` |
//! | 10,000–19,999 | `CCNN` | `ab01` = 10,101 |
//! | 20,000–26,759 | `CCN` | `aa0` = 20,000 |
//! | 26,760–33,519 | `CNC` | `a0a` = 26,760 |
//! | 33,520–36,119 | `CNN` | `a00` = 33,520 |
//! | 36,120–102,400 | `CCNC` | `aa0a` = 36,120 |

use crate::id::{EntityId, IdRange, MAX_ENTITY_ID};

/// One position of a printed code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Digit {
    Letter,
    Numeral,
}

use Digit::{Letter, Numeral};

impl Digit {
    const fn radix(self) -> u32 {
        match self {
            Letter => 26,
            Numeral => 10,
        }
    }
}

/// Shape of a coded range, most significant position first.
fn shape(range: IdRange) -> &'static [Digit] {
    match range {
        IdRange::Static => &[],
        IdRange::Province => &[Letter, Letter, Numeral, Numeral],
        IdRange::Player => &[Letter, Letter, Numeral],
        IdRange::PrimeCharacter => &[Letter, Numeral, Letter],
        IdRange::PrimeLocation => &[Letter, Numeral, Numeral],
        IdRange::Overflow => &[Letter, Letter, Numeral, Letter],
    }
}

/// Render an id as its short code.
///
/// Static-content ids print as plain decimal numbers.
pub fn encode(id: EntityId) -> String {
    let range = id.range();
    let positions = shape(range);
    if positions.is_empty() {
        return id.get().to_string();
    }

    let mut rest = id.get() - range.low();
    let mut out = vec![0u8; positions.len()];
    for (slot, digit) in out.iter_mut().zip(positions).rev() {
        let value = (rest % digit.radix()) as u8;
        rest /= digit.radix();
        *slot = match digit {
            Letter => b'a' + value,
            Numeral => b'0' + value,
        };
    }
    // The leading position absorbs whatever the fixed radices leave over;
    // for every valid id that still fits the 26 letters.
    debug_assert_eq!(rest, 0);
    String::from_utf8(out).unwrap_or_default()
}

/// Render an id as a bracketed reference, e.g. `[ab01]`.
pub fn bracketed(id: EntityId) -> String {
    format!("[{}]", encode(id))
}

/// Render `name [code]`, the form used in turn reports.
pub fn display_name(name: &str, id: EntityId) -> String {
    if name.is_empty() {
        bracketed(id)
    } else {
        format!("{name} {}", bracketed(id))
    }
}

/// Parse a code (or a plain decimal id) back into an id.
///
/// A leading `[` or `(` and a trailing `]` or `)` are ignored, as is
/// letter case. Returns `None` for anything that is not a recognized
/// shape or that lands outside its range; callers treat that as "no
/// reference".
pub fn decode(code: &str) -> Option<EntityId> {
    let code = code.trim();
    let code = code
        .strip_prefix('[')
        .or_else(|| code.strip_prefix('('))
        .unwrap_or(code);
    let code = code
        .strip_suffix(']')
        .or_else(|| code.strip_suffix(')'))
        .unwrap_or(code);
    if code.is_empty() || !code.is_ascii() {
        return None;
    }
    let bytes = code.as_bytes();

    if bytes.iter().all(u8::is_ascii_digit) {
        // Numeric references are accepted for every range.
        return code.parse::<u32>().ok().and_then(EntityId::new);
    }

    let range = IdRange::ALL
        .into_iter()
        .filter(|r| *r != IdRange::Static)
        .find(|r| matches_shape(bytes, shape(*r)))?;

    let mut offset = 0u32;
    for (&b, digit) in bytes.iter().zip(shape(range)) {
        let value = match digit {
            Letter => u32::from(b.to_ascii_lowercase() - b'a'),
            Numeral => u32::from(b - b'0'),
        };
        offset = offset * digit.radix() + value;
    }

    if offset >= range.len() {
        return None;
    }
    let raw = range.low() + offset;
    debug_assert!(raw <= MAX_ENTITY_ID);
    EntityId::new(raw)
}

fn matches_shape(bytes: &[u8], positions: &[Digit]) -> bool {
    bytes.len() == positions.len()
        && bytes.iter().zip(positions).all(|(b, d)| match d {
            Letter => b.is_ascii_alphabetic(),
            Numeral => b.is_ascii_digit(),
        })
}
