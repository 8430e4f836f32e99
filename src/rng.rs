//! Deterministic seeded pseudo-random generators (C6).
//!
//! Two interchangeable sources of randomness, named after
//! `Random::Generator::LinearCongruential` and
//! `Random::Generator::LaggedFibonacci4` in the lineage this crate descends
//! from: [`LinearCongruential32`]/[`LinearCongruential64`] for a cheap,
//! tiny-state generator, and [`LaggedFibonacci4`] for a higher-quality
//! generator suitable for seeding an optimizer's `iterate(rng)` calls. Both
//! implement [`UniformSource`], which layers uniform-integer and
//! uniform-float sampling over a generator's raw output.
//!
//! Entropy for seeding (`from_entropy`) is drawn from the operating system
//! via the `rand` crate; the generators themselves are otherwise
//! self-contained and never reach for `rand` during sampling, so a run seeded
//! explicitly is exactly reproducible.

mod lagged_fibonacci;
mod linear_congruential;

pub use lagged_fibonacci::LaggedFibonacci4;
pub use linear_congruential::{LinearCongruential32, LinearCongruential64};

/// A source of uniformly distributed raw integers, with uniform-integer and
/// uniform-float sampling built on top.
pub trait UniformSource {
    /// The bit width of this generator's native domain (32 or 64).
    fn bits(&self) -> u32 {
        64
    }

    /// The next raw value, uniform over `[0, 2^bits)`.
    fn next_u64(&mut self) -> u64;

    /// A uniform integer on `[0, bound]` (inclusive), via rejection sampling
    /// over the smallest power-of-two window covering `bound`.
    fn uniform_below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        let window = bound.checked_add(1).map_or(0, u64::next_power_of_two);
        let mask = window.wrapping_sub(1);
        loop {
            let candidate = self.next_u64() & mask;
            if candidate <= bound {
                return candidate;
            }
        }
    }

    /// A uniform float on `[0, 1)`: a raw sample divided by the generator's
    /// domain size, clamped strictly below 1 to absorb rounding at the top
    /// of the range.
    fn uniform_f64(&mut self) -> f64 {
        let domain = 2f64.powi(self.bits() as i32);
        let value = self.next_u64() as f64 / domain;
        value.min(f64::from_bits(1.0f64.to_bits() - 1))
    }
}
