//! Seed derivation: prompt text → 32-bit seed → deterministic RNG.
//!
//! Identical prompts must yield byte-identical descriptions, so the
//! hash has to be stable across platforms and releases. FNV-1a over
//! the lower-cased, whitespace-trimmed prompt bytes.

use rand::rngs::StdRng;
use rand::SeedableRng;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Hash a prompt into a 32-bit seed, stable across runs.
pub fn seed_from_prompt(prompt: &str) -> u32 {
    let normalized = prompt.trim().to_lowercase();
    let mut hash = FNV_OFFSET;
    for byte in normalized.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Deterministic RNG for a seed. `stream` separates independent
/// consumers (base build vs. modifiers) so adding a draw to one stage
/// cannot shift the other.
pub fn rng_for(seed: u32, stream: u64) -> StdRng {
    StdRng::seed_from_u64((seed as u64) | (stream << 32))
}
