#![allow(dead_code)]

mod mocks;

pub use mocks::MockFile;

use rand::distr::{Alphanumeric, SampleString};

/// Characters that exercise every quoting rule of the encoder.
const ALPHABET: [char; 14] = [
    'a', 'b', 'Z', '0', ' ', ',', ';', '"', '\n', '\r', '#', '\\', 'é', '\t',
];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A random cell: null about one time in eight, otherwise a short string
/// of characters drawn from [`ALPHABET`].
pub fn random_cell() -> Option<String> {
    let seed = Alphanumeric.sample_string(&mut rand::rng(), 9);
    let mut bytes = seed.bytes();
    let header = bytes.next().unwrap_or_default() as usize;
    if header % 8 == 0 {
        return None;
    }
    let length = header % 8 + 1;
    Some(
        bytes
            .take(length)
            .map(|b| ALPHABET[b as usize % ALPHABET.len()])
            .collect(),
    )
}

/// A random record of 2 to 5 cells.
pub fn random_record() -> Vec<Option<String>> {
    let width = Alphanumeric
        .sample_string(&mut rand::rng(), 1)
        .bytes()
        .next()
        .unwrap_or_default() as usize
        % 4
        + 2;
    (0..width).map(|_| random_cell()).collect()
}
