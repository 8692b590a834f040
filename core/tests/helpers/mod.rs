#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub fn rng(seed: u8) -> StdRng {
    StdRng::from_seed([seed; 32])
}

/// `count` distinct keys in random order.
pub fn shuffled_keys(rng: &mut StdRng, count: i64) -> Vec<i64> {
    let mut keys = (0..count).map(|k| k * 3 - count).collect::<Vec<i64>>();
    keys.shuffle(rng);
    keys
}

/// `count` values drawn from `[low, high)`, duplicates included.
pub fn random_values(rng: &mut StdRng, count: usize, low: i64, high: i64) -> Vec<i64> {
    (0..count).map(|_| rng.gen_range(low, high)).collect()
}
