//! Compact drum notation: `x` for a hit, `-` for silence, `,` between beats.

mod decoder;

pub use decoder::{decode, decode_bars, decode_opt, decode_strict, split_bars, HIT, REST};
