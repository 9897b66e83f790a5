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

//! Cross-validated divergence thresholds derived from reference data alone.
//!
//! Each fold shuffles the reference samples, takes two disjoint slices of
//! `cv_size` samples and measures their Jensen-Shannon divergence. The spread
//! of these self-divergences over all folds shows how much divergence to
//! expect when nothing has drifted, which makes the fold maximum (or average)
//! a reasonable threshold for [`calculate`](super::calculate).
//!
//! Folds draw from independent generators seeded per fold (see
//! [`XorShift64::for_fold`]), so results are bit-identical for a given seed.

use tracing::debug;

use super::DEFAULT_NUM_CV;
use super::jensen_shannon::aggregate_statistic;
use super::jensen_shannon::channel_statistics;
use super::jensen_shannon::check_non_negative;
use crate::common::XorShift64;
use crate::common::permutation;
use crate::error::Error;
use crate::tensor::Tensor;

/// Minimum, maximum and average self-divergence over all folds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineThresholds {
    min: f64,
    max: f64,
    avg: f64,
}

impl BaselineThresholds {
    /// Returns the smallest fold divergence.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Returns the largest fold divergence.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Returns the mean fold divergence.
    pub fn avg(&self) -> f64 {
        self.avg
    }
}

/// Parameters of a baseline calibration.
///
/// # Examples
///
/// ```
/// # use driftsketch::divergence::baseline::BaselineConfig;
/// # use driftsketch::tensor::Tensor;
/// let reference = Tensor::new(vec![20, 1, 4], (0..80).map(|v| (v % 7) as f64).collect()).unwrap();
/// let thresholds = BaselineConfig::new(5)
///     .with_num_cv(8)
///     .with_seed(42)
///     .calculate(&reference)
///     .unwrap();
/// assert!(thresholds.min() <= thresholds.avg() && thresholds.avg() <= thresholds.max());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineConfig {
    num_cv: usize,
    cv_size: usize,
    seed: u64,
    normalize: bool,
}

impl BaselineConfig {
    /// Creates a configuration comparing slices of `cv_size` samples, with
    /// [`DEFAULT_NUM_CV`] folds, seed 0 and no normalization.
    pub fn new(cv_size: usize) -> Self {
        Self {
            num_cv: DEFAULT_NUM_CV,
            cv_size,
            seed: 0,
            normalize: false,
        }
    }

    /// Sets the number of folds.
    pub fn with_num_cv(mut self, num_cv: usize) -> Self {
        self.num_cv = num_cv;
        self
    }

    /// Sets the seed of the resampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets whether divergences are normalized by element count.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Calibrates thresholds for [`calculate`](super::calculate).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
    /// there are no folds, if `cv_size` is zero or `2 * cv_size` exceeds the
    /// number of reference samples, or if the reference holds a negative value.
    pub fn calculate(&self, reference: &Tensor) -> Result<BaselineThresholds, Error> {
        self.check(reference)?;
        let mut acc = Accumulator::default();
        for fold in 0..self.num_cv {
            let (left, right) = self.split(reference, fold);
            acc.add(aggregate_statistic(&left, &right, self.normalize)?);
        }
        let thresholds = acc.finish(self.num_cv);
        debug!(
            num_cv = self.num_cv,
            cv_size = self.cv_size,
            min = thresholds.min,
            max = thresholds.max,
            avg = thresholds.avg,
            "calibrated divergence baseline"
        );
        Ok(thresholds)
    }

    /// Calibrates one set of thresholds per channel for
    /// [`calculate_per_channel`](super::calculate_per_channel).
    ///
    /// # Errors
    ///
    /// Same as [`calculate`](Self::calculate).
    pub fn calculate_per_channel(&self, reference: &Tensor) -> Result<Vec<BaselineThresholds>, Error> {
        self.check(reference)?;
        let mut accs = vec![Accumulator::default(); reference.num_channels()];
        for fold in 0..self.num_cv {
            let (left, right) = self.split(reference, fold);
            let statistics = channel_statistics(&left, &right, self.normalize)?;
            for (acc, statistic) in accs.iter_mut().zip(statistics) {
                acc.add(statistic);
            }
        }
        debug!(
            num_cv = self.num_cv,
            cv_size = self.cv_size,
            channels = accs.len(),
            "calibrated per-channel divergence baseline"
        );
        Ok(accs.into_iter().map(|acc| acc.finish(self.num_cv)).collect())
    }

    fn check(&self, reference: &Tensor) -> Result<(), Error> {
        if self.num_cv == 0 {
            return Err(Error::invalid_argument("at least one fold is required"));
        }
        if self.cv_size == 0 {
            return Err(Error::invalid_argument("cv_size must be positive"));
        }
        let available = reference.num_samples();
        if self.cv_size.saturating_mul(2) > available {
            return Err(Error::invalid_argument("two folds of cv_size exceed the reference samples")
                .with_context("cv_size", self.cv_size)
                .with_context("samples", available));
        }
        check_non_negative(reference, "reference")
    }

    fn split(&self, reference: &Tensor, fold: usize) -> (Tensor, Tensor) {
        let mut rng = XorShift64::for_fold(self.seed, fold as u64);
        let order = permutation(reference.num_samples(), &mut rng);
        let left = reference.select(&order[..self.cv_size]);
        let right = reference.select(&order[self.cv_size..2 * self.cv_size]);
        (left, right)
    }
}

/// Calibrates thresholds over `num_cv` folds of two `cv_size` slices.
///
/// Shorthand for [`BaselineConfig::calculate`].
pub fn calculate(
    reference: &Tensor,
    num_cv: usize,
    cv_size: usize,
    seed: u64,
    normalize: bool,
) -> Result<BaselineThresholds, Error> {
    BaselineConfig::new(cv_size)
        .with_num_cv(num_cv)
        .with_seed(seed)
        .with_normalize(normalize)
        .calculate(reference)
}

/// Per-channel variant of [`calculate`].
pub fn calculate_per_channel(
    reference: &Tensor,
    num_cv: usize,
    cv_size: usize,
    seed: u64,
    normalize: bool,
) -> Result<Vec<BaselineThresholds>, Error> {
    BaselineConfig::new(cv_size)
        .with_num_cv(num_cv)
        .with_seed(seed)
        .with_normalize(normalize)
        .calculate_per_channel(reference)
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    min: f64,
    max: f64,
    sum: f64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
        }
    }
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
    }

    fn finish(self, num_cv: usize) -> BaselineThresholds {
        let mut avg = self.sum / num_cv as f64;
        // rounding in the running sum can push the mean just past an extreme
        if self.min <= self.max {
            avg = avg.clamp(self.min, self.max);
        }
        BaselineThresholds {
            min: self.min,
            max: self.max,
            avg,
        }
    }
}
