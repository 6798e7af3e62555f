//! Limb voices and per-voice containers
//!
//! Every exercise tracks four independent voices. Their order is fixed
//! (right hand, left hand, right foot, left foot) and doubles as the
//! default sensor channel mapping.

use std::fmt;
use std::ops::{Index, IndexMut};

/// One of the four limbs tracked by an exercise
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Voice {
    RightHand,
    LeftHand,
    RightFoot,
    LeftFoot,
}

impl Voice {
    /// All voices in table order
    pub const ALL: [Voice; 4] = [
        Voice::RightHand,
        Voice::LeftHand,
        Voice::RightFoot,
        Voice::LeftFoot,
    ];

    /// Parse a voice from its key or a common alias (case-insensitive)
    pub fn from_name(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect();
        match normalized.as_str() {
            "rh" | "righthand" | "r" => Some(Voice::RightHand),
            "lh" | "lefthand" | "l" => Some(Voice::LeftHand),
            "rf" | "rightfoot" | "kick" | "bd" => Some(Voice::RightFoot),
            "lf" | "leftfoot" | "hihatfoot" => Some(Voice::LeftFoot),
            _ => None,
        }
    }

    /// Position of this voice in table order (0-3)
    pub fn index(&self) -> usize {
        match self {
            Voice::RightHand => 0,
            Voice::LeftHand => 1,
            Voice::RightFoot => 2,
            Voice::LeftFoot => 3,
        }
    }

    /// Sensor channel this voice is wired to by default
    pub fn channel(&self) -> i32 {
        self.index() as i32
    }

    /// Voice wired to a sensor channel, if any
    pub fn from_channel(channel: i32) -> Option<Self> {
        usize::try_from(channel)
            .ok()
            .and_then(|idx| Voice::ALL.get(idx).copied())
    }

    /// Two-letter key used in beat frames
    pub fn key(&self) -> &'static str {
        match self {
            Voice::RightHand => "rh",
            Voice::LeftHand => "lh",
            Voice::RightFoot => "rf",
            Voice::LeftFoot => "lf",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Voice::RightHand => "Right Hand",
            Voice::LeftHand => "Left Hand",
            Voice::RightFoot => "Right Foot",
            Voice::LeftFoot => "Left Foot",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Optional per-voice lists, one slot per [`Voice`].
///
/// Used for raw notation (`Voices<String>`) as well as decoded bars.
/// A `None` slot means the voice was not supplied at all.
#[derive(Clone, Debug, PartialEq)]
pub struct Voices<T> {
    slots: [Option<Vec<T>>; 4],
}

impl<T> Voices<T> {
    pub fn new() -> Self {
        Voices {
            slots: [None, None, None, None],
        }
    }

    /// Supply the list for one voice
    pub fn with(mut self, voice: Voice, items: Vec<T>) -> Self {
        self.slots[voice.index()] = Some(items);
        self
    }

    pub fn right_hand(self, items: Vec<T>) -> Self {
        self.with(Voice::RightHand, items)
    }

    pub fn left_hand(self, items: Vec<T>) -> Self {
        self.with(Voice::LeftHand, items)
    }

    pub fn right_foot(self, items: Vec<T>) -> Self {
        self.with(Voice::RightFoot, items)
    }

    pub fn left_foot(self, items: Vec<T>) -> Self {
        self.with(Voice::LeftFoot, items)
    }

    pub fn get(&self, voice: Voice) -> Option<&Vec<T>> {
        self.slots[voice.index()].as_ref()
    }

    /// Take the list for one voice out of the container
    pub fn take(&mut self, voice: Voice) -> Option<Vec<T>> {
        self.slots[voice.index()].take()
    }

    /// Whether no voice was supplied
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Apply a fallible conversion to every item of every supplied voice
    pub fn try_map<U, E, F>(self, mut f: F) -> Result<Voices<U>, E>
    where
        F: FnMut(Voice, T) -> Result<U, E>,
    {
        let mut out = Voices::new();
        for (voice, slot) in Voice::ALL.into_iter().zip(self.slots) {
            if let Some(items) = slot {
                let mapped = items
                    .into_iter()
                    .map(|item| f(voice, item))
                    .collect::<Result<Vec<U>, E>>()?;
                out.slots[voice.index()] = Some(mapped);
            }
        }
        Ok(out)
    }
}

impl<T> Default for Voices<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A fixed value for every voice, indexable by [`Voice`]
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerVoice<T> {
    pub rh: T,
    pub lh: T,
    pub rf: T,
    pub lf: T,
}

impl<T> PerVoice<T> {
    pub fn from_fn(mut f: impl FnMut(Voice) -> T) -> Self {
        PerVoice {
            rh: f(Voice::RightHand),
            lh: f(Voice::LeftHand),
            rf: f(Voice::RightFoot),
            lf: f(Voice::LeftFoot),
        }
    }

    /// Iterate as (voice, value) pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (Voice, &T)> {
        Voice::ALL.into_iter().map(move |v| (v, &self[v]))
    }
}

impl<T> Index<Voice> for PerVoice<T> {
    type Output = T;

    fn index(&self, voice: Voice) -> &T {
        match voice {
            Voice::RightHand => &self.rh,
            Voice::LeftHand => &self.lh,
            Voice::RightFoot => &self.rf,
            Voice::LeftFoot => &self.lf,
        }
    }
}

impl<T> IndexMut<Voice> for PerVoice<T> {
    fn index_mut(&mut self, voice: Voice) -> &mut T {
        match voice {
            Voice::RightHand => &mut self.rh,
            Voice::LeftHand => &mut self.lh,
            Voice::RightFoot => &mut self.rf,
            Voice::LeftFoot => &mut self.lf,
        }
    }
}
