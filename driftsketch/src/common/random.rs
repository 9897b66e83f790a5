// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Seeded randomness for reproducible resampling.
//!
//! Baseline calibration must be bit-identical across runs for the same seed,
//! so the permutation algorithm is fixed here rather than delegated to a
//! general purpose shuffle:
//!
//! 1. Each fold `f` derives its own seed as `splitmix64(seed ^ splitmix64(f))`.
//! 2. The fold seed initializes an [`XorShift64`] generator (13/7/17 shifts).
//! 3. Indices `0..n` are permuted with a descending Fisher-Yates pass: for
//!    `i` from `n - 1` down to `1`, draw `j` uniformly in `[0, i]` and swap
//!    positions `i` and `j`.
//! 4. Bounded draws use Lemire's multiply-shift: `(x * (i + 1)) >> 64` on the
//!    full 128-bit product of the next 64-bit output `x`.

/// Random number source for resampling.
pub trait RandomSource {
    /// Returns the next random 64-bit value.
    fn next_u64(&mut self) -> u64;

    /// Returns a value uniformly drawn from `[0, bound)`.
    ///
    /// `bound` must be non-zero.
    fn next_below(&mut self, bound: u64) -> u64 {
        debug_assert!(bound > 0, "bound must be positive");
        ((self.next_u64() as u128 * bound as u128) >> 64) as u64
    }
}

/// Xorshift-based random generator.
#[derive(Debug, Clone, Copy)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Creates a new generator using the provided seed.
    pub fn seeded(seed: u64) -> Self {
        let state = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self { state }
    }

    /// Creates the generator dedicated to one fold of a seeded computation.
    ///
    /// Folds never share generator state, so they can run in any order or in
    /// parallel and still reproduce the same permutations.
    pub fn for_fold(seed: u64, fold: u64) -> Self {
        Self::seeded(splitmix64(seed ^ splitmix64(fold)))
    }
}

impl RandomSource for XorShift64 {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// One step of the SplitMix64 mixer.
pub fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Returns a permutation of `0..n` drawn with a descending Fisher-Yates pass.
pub fn permutation<R: RandomSource>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.next_below(i as u64 + 1) as usize;
        indices.swap(i, j);
    }
    indices
}
