//! Dice source - every random number in a game comes from here
//!
//! A `DiceSource` is a pure function of its seed and the sequence of calls
//! made against it. Two sources with the same seed answer the same calls
//! with the same faces.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Anything that can roll six-sided dice
///
/// The engine only ever asks for d6 faces; the other rolls derive from them,
/// so a scripted roller only has to supply d6 results.
pub trait DiceRoller {
    /// One six-sided die, 1..=6
    fn d6(&mut self) -> u8;

    /// Total dice rolled so far
    fn rolls_made(&self) -> u64;

    /// One three-sided die, derived from a d6 (1-2 → 1, 3-4 → 2, 5-6 → 3)
    fn d3(&mut self) -> u8 {
        (self.d6() + 1) / 2
    }

    /// Two dice, kept separate so doubles can be detected
    fn two_d6(&mut self) -> (u8, u8) {
        let first = self.d6();
        let second = self.d6();
        (first, second)
    }

    /// `count` d6 in roll order
    fn roll_d6s(&mut self, count: usize) -> Vec<u8> {
        (0..count).map(|_| self.d6()).collect()
    }

    /// A d6 that re-rolls a natural 1 once
    fn d6_reroll_ones(&mut self) -> u8 {
        match self.d6() {
            1 => self.d6(),
            roll => roll,
        }
    }

    /// A d6 that re-rolls once if below `threshold`
    fn d6_reroll_below(&mut self, threshold: u8) -> u8 {
        let roll = self.d6();
        if roll < threshold {
            self.d6()
        } else {
            roll
        }
    }
}

impl<D: DiceRoller + ?Sized> DiceRoller for Box<D> {
    fn d6(&mut self) -> u8 {
        (**self).d6()
    }

    fn rolls_made(&self) -> u64 {
        (**self).rolls_made()
    }
}

/// Seeded dice source backed by ChaCha8
#[derive(Debug, Clone)]
pub struct DiceSource {
    seed: u64,
    rng: ChaCha8Rng,
    rolls: u64,
}

impl DiceSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            rolls: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl DiceRoller for DiceSource {
    fn d6(&mut self) -> u8 {
        self.rolls += 1;
        self.rng.gen_range(1..=6)
    }

    fn rolls_made(&self) -> u64 {
        self.rolls
    }
}

/// Replays a fixed sequence of faces, wrapping at the end
///
/// Used to script exact scenarios (a natural 1, a double on a casting roll)
/// without searching for a seed that produces them.
#[derive(Debug, Clone)]
pub struct LoadedDice {
    faces: Vec<u8>,
    cursor: usize,
    rolls: u64,
}

impl LoadedDice {
    /// Faces outside 1..=6 are clamped into range. An empty list rolls 6s.
    pub fn new(faces: Vec<u8>) -> Self {
        let faces = if faces.is_empty() {
            vec![6]
        } else {
            faces.into_iter().map(|f| f.clamp(1, 6)).collect()
        };
        Self {
            faces,
            cursor: 0,
            rolls: 0,
        }
    }

    /// Every roll shows the same face
    pub fn always(face: u8) -> Self {
        Self::new(vec![face])
    }
}

impl DiceRoller for LoadedDice {
    fn d6(&mut self) -> u8 {
        let face = self.faces[self.cursor];
        self.cursor = (self.cursor + 1) % self.faces.len();
        self.rolls += 1;
        face
    }

    fn rolls_made(&self) -> u64 {
        self.rolls
    }
}
