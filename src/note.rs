use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// The twelve notes of the western chromatic scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Letter {
    C,
    Db,
    D,
    Eb,
    E,
    F,
    Gb,
    G,
    Ab,
    A,
    Bb,
    B,
}

const LETTERS: [Letter; 12] = [
    Letter::C,
    Letter::Db,
    Letter::D,
    Letter::Eb,
    Letter::E,
    Letter::F,
    Letter::Gb,
    Letter::G,
    Letter::Ab,
    Letter::A,
    Letter::Bb,
    Letter::B,
];

impl Letter {
    /// Make a pitch with this letter and the given octave.
    pub fn oct(self, octave: i8) -> Pitch {
        Pitch::new(self, octave)
    }
    /// Get the frequency of this letter in the given octave.
    pub fn frequency(&self, octave: i8) -> f64 {
        let half_steps = (octave as i32 - 4) * 12 + (*self as i32 - 9);
        440.0 * 2f64.powf(half_steps as f64 / 12.0)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A letter-octave pair representing a frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    /// The letter of the pitch
    pub letter: Letter,
    /// The octave of the pitch
    pub octave: i8,
}

impl Pitch {
    /// Make a new pitch with the given letter and octave
    pub fn new(letter: Letter, octave: i8) -> Self {
        Self { letter, octave }
    }
    /// Get the frequency of this pitch
    pub fn frequency(&self) -> f64 {
        self.letter.frequency(self.octave)
    }
    /// Make a pitch from some number of half-steps above C0
    pub fn from_half_steps(half_steps: i16) -> Self {
        let octave = half_steps.div_euclid(12) as i8;
        let letter = LETTERS[half_steps.rem_euclid(12) as usize];
        Self { letter, octave }
    }
    /// Get the number of half-steps above C0
    pub fn to_half_steps(&self) -> i16 {
        (self.octave as i16 * 12) + (self.letter as i16)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.octave)
    }
}

/// Parses names like `A4`, `Eb3`, and `C#5`
///
/// Sharps are read as the flat of the next letter.
impl FromStr for Pitch {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidNote(s.into());
        let mut chars = s.chars();
        let base = match chars.next().ok_or_else(invalid)?.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(invalid()),
        };
        let rest = chars.as_str();
        let (shift, octave) = if let Some(octave) = rest.strip_prefix('#') {
            (1, octave)
        } else if let Some(octave) = rest.strip_prefix('b') {
            (-1, octave)
        } else {
            (0, rest)
        };
        let octave: i16 = octave.parse().map_err(|_| invalid())?;
        if !(-1..=9).contains(&octave) {
            return Err(invalid());
        }
        Ok(Pitch::from_half_steps(octave * 12 + base + shift))
    }
}

impl Serialize for Pitch {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pitch {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// An entry in a note list: a frequency in Hz or a pitch name
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Note {
    /// A frequency in Hz
    Frequency(f64),
    /// A named pitch
    Pitch(Pitch),
}

impl Note {
    /// Get the frequency in Hz
    pub fn frequency(&self) -> f64 {
        match self {
            Note::Frequency(freq) => *freq,
            Note::Pitch(pitch) => pitch.frequency(),
        }
    }
}

/// Parse a JSON array of frequencies and pitch names into frequencies
///
/// ```
/// let notes = peptone::notes_from_json(r#"[440, "A5", 196.0]"#).unwrap();
/// assert_eq!(notes, [440.0, 880.0, 196.0]);
/// ```
pub fn notes_from_json(json: &str) -> Result<Vec<f64>> {
    let notes: Vec<Note> = serde_json::from_str(json)?;
    notes
        .iter()
        .map(|note| {
            let freq = note.frequency();
            if freq.is_finite() && freq > 0.0 {
                Ok(freq)
            } else {
                Err(Error::InvalidNote(freq.to_string()))
            }
        })
        .collect()
}
