//! Fake-value provider backing the builder's randomness.
//!
//! Supplies human-looking names and dates plus opaque document ids, all
//! drawn from a single ChaCha8 RNG so a seeded build is fully
//! reproducible. Values are generated from curated arrays rather than a
//! natural-language corpus; the goal is plausible fixtures, not realism.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Character set for alphanumeric keys (lowercase letters + digits).
const KEY_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Document-id length: the first four dash-groups of a UUID (8+4+4+4).
const DOC_ID_LEN: usize = 20;

/// Unix seconds for 2020-01-01T00:00:00Z / 2024-01-01T00:00:00Z, the
/// window fixture timestamps are drawn from.
const DATE_WINDOW_START: i64 = 1_577_836_800;
const DATE_WINDOW_END: i64 = 1_704_067_200;

/// One year in seconds, the maximum gap for `date_time_between`.
const MAX_FOLLOWUP_SECS: i64 = 365 * 24 * 60 * 60;

const FIRST_NAMES: [&str; 20] = [
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen",
];

const LAST_NAMES: [&str; 20] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin",
];

/// Provider of fake field values and opaque ids.
///
/// Owns the build's only random source. `new(None)` seeds from entropy;
/// `new(Some(seed))` makes every downstream draw deterministic.
#[derive(Debug, Clone)]
pub struct FakeDataProvider {
    rng: ChaCha8Rng,
}

impl FakeDataProvider {
    /// Creates a provider, seeded explicitly or from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        Self { rng }
    }

    /// Creates a provider with a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    /// Returns a first name.
    pub fn first_name(&mut self) -> String {
        FIRST_NAMES[self.rng.random_range(0..FIRST_NAMES.len())].to_string()
    }

    /// Returns a last name.
    pub fn last_name(&mut self) -> String {
        LAST_NAMES[self.rng.random_range(0..LAST_NAMES.len())].to_string()
    }

    /// Returns a date of birth between 1954 and 2016.
    ///
    /// Days are capped at 28 so every (year, month, day) triple is a real
    /// calendar date.
    pub fn date_of_birth(&mut self) -> NaiveDate {
        let year = self.rng.random_range(1954..=2016);
        let month = self.rng.random_range(1..=12);
        let day = self.rng.random_range(1..=28);
        NaiveDate::from_ymd_opt(year, month, day).expect("day <= 28 is valid in every month")
    }

    /// Returns a datetime inside the fixture window (2020..2024).
    pub fn date_time(&mut self) -> DateTime<Utc> {
        let secs = self.rng.random_range(DATE_WINDOW_START..DATE_WINDOW_END);
        DateTime::from_timestamp(secs, 0).expect("window seconds are in chrono range")
    }

    /// Returns a datetime strictly later than `after`, at most a year on.
    pub fn date_time_between(&mut self, after: DateTime<Utc>) -> DateTime<Utc> {
        let gap = self.rng.random_range(1..=MAX_FOLLOWUP_SECS);
        after + TimeDelta::seconds(gap)
    }

    /// Returns an opaque 20-character hex document id (the first four
    /// dash-groups of a UUID). Bytes come from the provider's own RNG so
    /// seeded builds generate the same ids.
    pub fn doc_id(&mut self) -> String {
        let bytes: [u8; 16] = self.rng.random();
        let id = uuid::Builder::from_random_bytes(bytes).into_uuid();
        id.simple().to_string()[..DOC_ID_LEN].to_string()
    }

    /// Returns `count` fresh document ids.
    pub fn doc_ids(&mut self, count: usize) -> Vec<String> {
        (0..count).map(|_| self.doc_id()).collect()
    }

    /// Returns a random lowercase-alphanumeric string of the given length.
    pub fn alphanumeric(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| KEY_CHARSET[self.rng.random_range(0..KEY_CHARSET.len())] as char)
            .collect()
    }

    /// Returns `prefix` followed by `len` alphanumeric characters.
    pub fn prefixed(&mut self, prefix: &str, len: usize) -> String {
        format!("{}{}", prefix, self.alphanumeric(len))
    }

    /// Draws a count uniformly from an inclusive `(min, max)` range.
    pub fn count_between(&mut self, range: (usize, usize)) -> usize {
        self.rng.random_range(range.0..=range.1)
    }

    /// Returns a random boolean flag.
    pub fn flag(&mut self) -> bool {
        self.rng.random()
    }

    /// Returns a grade level in `[0, 12]`.
    pub fn grade(&mut self) -> u8 {
        self.rng.random_range(0..=12)
    }

    /// Picks one element of a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// Access to the underlying RNG for sampling helpers.
    pub(crate) fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}
