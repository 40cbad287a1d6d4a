//! Seeded generator for node and key names.

use std::collections::HashSet;

use anyhow::ensure;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate `amount` distinct names `prefix + suffix`, where each suffix is
/// `suffix_len` random alphanumeric characters.
///
/// The same seed always yields the same names in the same order.
pub fn generate_names(
    prefix: &str,
    suffix_len: usize,
    amount: usize,
    seed: u64,
) -> anyhow::Result<Vec<String>> {
    let capacity = u32::try_from(suffix_len)
        .ok()
        .and_then(|len| (ALPHABET.len() as u128).checked_pow(len))
        .unwrap_or(u128::MAX);
    ensure!(
        amount as u128 <= capacity,
        "cannot generate {amount} distinct names with {suffix_len}-character suffixes"
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::with_capacity(amount);
    let mut names = Vec::with_capacity(amount);

    while names.len() < amount {
        let suffix: String = (0..suffix_len)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        let name = format!("{prefix}{suffix}");
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }

    Ok(names)
}
