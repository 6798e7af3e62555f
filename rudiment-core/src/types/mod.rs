// rudiment-core/src/types/mod.rs

pub mod bar_table;
pub mod frame;
pub mod hit;
pub mod recipe;
pub mod score;
pub mod sequence;
pub mod time;
pub mod voice;

pub use bar_table::{Bar, BarTable, Coordinate};
pub use frame::BeatFrame;
pub use hit::HitEvent;
pub use recipe::{bar_from_notes, bar_from_recipe, NoteValue, Rudiment};
pub use score::{Judgement, Scoreboard, TargetBoard, DEFAULT_TOLERANCE};
pub use sequence::{normalize_name, Exercise, Pattern};
pub use time::Time;
pub use voice::{PerVoice, Voice, Voices};
