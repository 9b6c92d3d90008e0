//! Seeded pseudo-random source
//!
//! Every random decision in the pipeline draws from a [`MapRng`], so the same
//! seed and configuration always produce the same map. Stages get their own
//! ChaCha stream through [`MapRng::for_stage`], which keeps stages that run
//! concurrently from sharing any state.

use std::fmt;
use std::hash::Hasher;

use fnv::FnvHasher;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed for a generation run
///
/// A seed is either an integer or arbitrary text. Text that parses as a `u64`
/// is stored as an integer, so `Seed::from("42")` and `Seed::from(42)` are the
/// same seed. The canonical form of a seed is its string rendering, and the
/// numeric PRNG seed is the FNV-1a hash of those bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Seed {
    /// An integer seed
    Int(u64),
    /// A textual seed
    Text(String),
}

impl Seed {
    /// Canonical string form of the seed
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Hash the canonical form into the 64-bit value fed to the PRNG
    pub fn to_u64(&self) -> u64 {
        let mut hasher = FnvHasher::default();
        hasher.write(self.canonical().as_bytes());
        hasher.finish()
    }
}

impl Default for Seed {
    fn default() -> Self {
        Seed::Int(0)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seed::Int(value) => write!(f, "{}", value),
            Seed::Text(text) => f.write_str(text),
        }
    }
}

impl From<u64> for Seed {
    fn from(seed: u64) -> Self {
        Seed::Int(seed)
    }
}

impl From<u32> for Seed {
    fn from(seed: u32) -> Self {
        Seed::Int(seed as u64)
    }
}

// Parse as an int when possible, otherwise keep the raw text
impl From<&str> for Seed {
    fn from(seed: &str) -> Self {
        match seed.parse::<u64>() {
            Ok(value) => Seed::Int(value),
            Err(_) => Seed::Text(seed.to_owned()),
        }
    }
}

impl From<String> for Seed {
    fn from(seed: String) -> Self {
        Seed::from(seed.as_str())
    }
}

/// Pipeline stages that draw random numbers
///
/// Each stage reads from its own ChaCha stream, so adding draws to one stage
/// never shifts the sequence another stage sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Points = 1,
    Boundary = 2,
    Template = 3,
    TerrainNoise = 4,
    Precipitation = 5,
    Rivers = 6,
    RiverPaths = 7,
}

/// Deterministic PRNG used by every generation stage
#[derive(Debug, Clone)]
pub struct MapRng {
    rng: ChaCha8Rng,
}

impl MapRng {
    /// Create a generator from a seed
    pub fn new(seed: &Seed) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed.to_u64()),
        }
    }

    /// Create the generator owned by one pipeline stage
    pub fn for_stage(seed: &Seed, stage: Stage) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.to_u64());
        rng.set_stream(stage as u64);
        Self { rng }
    }

    /// Uniform float in `[0, 1)`
    pub fn next_float(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Uniform integer in `[min, max]`. Returns `min` when the range is empty.
    pub fn next_int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Uniform float in `[min, max)`. Returns `min` when the range is empty.
    pub fn next_range(&mut self, min: f32, max: f32) -> f32 {
        if !(max > min) {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Returns true with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_float() < p
    }
}

impl RngCore for MapRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Seeds serialize as strings so 64-bit values survive JSON and TOML
#[cfg(feature = "serde")]
mod serde_seed {
    use super::Seed;
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::convert::TryInto;
    use std::fmt;

    impl Serialize for Seed {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.canonical())
        }
    }

    impl<'de> Deserialize<'de> for Seed {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(SeedVisitor)
        }
    }

    macro_rules! impl_visit {
        ($fname:ident, $type:ty) => {
            fn $fname<E>(self, value: $type) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .try_into()
                    .map(Seed::Int)
                    .map_err(|_| E::custom(format!("u64 out of range: {}", value)))
            }
        };
    }

    struct SeedVisitor;

    impl<'de> Visitor<'de> for SeedVisitor {
        type Value = Seed;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a positive integer or string")
        }

        impl_visit!(visit_u8, u8);
        impl_visit!(visit_u16, u16);
        impl_visit!(visit_u32, u32);
        impl_visit!(visit_u64, u64);
        impl_visit!(visit_i8, i8);
        impl_visit!(visit_i16, i16);
        impl_visit!(visit_i32, i32);
        impl_visit!(visit_i64, i64);

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_from_str() {
        assert_eq!(Seed::from("0"), Seed::Int(0));
        assert_eq!(Seed::from("12506774975058000"), Seed::Int(12506774975058000));
        assert_eq!(Seed::from("-1"), Seed::Text("-1".into()));
        assert_eq!(Seed::from("test-seed-1"), Seed::Text("test-seed-1".into()));
    }

    #[test]
    fn test_seed_canonical_form() {
        assert_eq!(Seed::from(42u64).canonical(), "42");
        assert_eq!(Seed::from("potato").canonical(), "potato");
        assert_eq!(Seed::from(42u64).to_u64(), Seed::from("42").to_u64());
        assert_ne!(Seed::from("a").to_u64(), Seed::from("b").to_u64());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = MapRng::new(&Seed::from("test-seed-1"));
        let mut b = MapRng::new(&Seed::from("test-seed-1"));
        for _ in 0..100 {
            assert_eq!(a.next_float(), b.next_float());
            assert_eq!(a.next_int(-5, 5), b.next_int(-5, 5));
        }
    }

    #[test]
    fn test_stage_streams_differ() {
        let seed = Seed::from(7u64);
        let mut points = MapRng::for_stage(&seed, Stage::Points);
        let mut rivers = MapRng::for_stage(&seed, Stage::Rivers);
        let a: Vec<u32> = (0..8).map(|_| points.next_u32()).collect();
        let b: Vec<u32> = (0..8).map(|_| rivers.next_u32()).collect();
        assert_ne!(a, b, "Stage streams should be independent");
    }

    #[test]
    fn test_ranges() {
        let mut rng = MapRng::new(&Seed::from(99u64));
        for _ in 0..1000 {
            let f = rng.next_float();
            assert!((0.0..1.0).contains(&f));

            let i = rng.next_int(3, 6);
            assert!((3..=6).contains(&i));

            let r = rng.next_range(-2.0, 2.0);
            assert!((-2.0..2.0).contains(&r));
        }
    }

    #[test]
    fn test_empty_ranges_return_min() {
        let mut rng = MapRng::new(&Seed::from(1u64));
        assert_eq!(rng.next_int(5, 5), 5);
        assert_eq!(rng.next_int(5, 2), 5);
        assert_eq!(rng.next_range(1.5, 1.5), 1.5);
        assert_eq!(rng.next_range(1.5, -3.0), 1.5);
    }

    #[test]
    fn test_shuffle_is_deterministic() {
        use rand::seq::SliceRandom;

        let mut a: Vec<u32> = (0..50).collect();
        let mut b = a.clone();
        a.shuffle(&mut MapRng::new(&Seed::from("shuffle")));
        b.shuffle(&mut MapRng::new(&Seed::from("shuffle")));
        assert_eq!(a, b);
        assert_ne!(a, (0..50).collect::<Vec<u32>>());
    }
}
