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

//! Two-sample Kolmogorov-Smirnov drift tests.
//!
//! Two flavours share one result type and one p-value model:
//!
//! - [`exact`] compares two raw samples held in memory.
//! - [`ApproximateKsTest`] fits one [`QuantileSketch`](crate::gk::QuantileSketch)
//!   per reference column and later compares test batches against the sketches
//!   alone, so the raw reference data can be dropped after fitting.
//!
//! Samples with fewer than two points yield [`HypothesisTestResult::no_drift`]
//! instead of an error.
//!
//! # Usage
//!
//! ```rust
//! # use driftsketch::ks::{self, DEFAULT_SIGNIFICANCE};
//! let reference: Vec<f64> = (0..200).map(|i| i as f64).collect();
//! let shifted: Vec<f64> = (0..200).map(|i| i as f64 + 150.0).collect();
//! let result = ks::exact::calculate(&reference, &shifted, DEFAULT_SIGNIFICANCE).unwrap();
//! assert!(result.reject());
//! ```

mod approximate;
mod distribution;
pub mod exact;

pub use self::approximate::ApproximateKsTest;
pub use self::approximate::FittedSketchSet;
pub use self::approximate::statistic as approximate_statistic;
pub use self::distribution::asymptotic_p_value;

use crate::error::Error;

/// Default p-value cutoff.
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;
/// Sample size product below which the exact p-value replaces the asymptotic one.
pub const EXACT_P_VALUE_MAX_PRODUCT: u64 = 10_000;

/// Outcome of one hypothesis test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HypothesisTestResult {
    statistic: f64,
    p_value: f64,
    reject: bool,
}

impl HypothesisTestResult {
    /// Builds a result, rejecting the null hypothesis when `p_value <= significance`.
    pub fn new(statistic: f64, p_value: f64, significance: f64) -> Self {
        let p_value = p_value.clamp(0.0, 1.0);
        Self {
            statistic,
            p_value,
            reject: p_value <= significance,
        }
    }

    /// The neutral result reported for samples too small to test.
    pub fn no_drift() -> Self {
        Self {
            statistic: 0.0,
            p_value: 1.0,
            reject: false,
        }
    }

    /// Returns the test statistic.
    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    /// Returns the p-value in [0.0, 1.0].
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Returns true if the samples are judged to come from different distributions.
    pub fn reject(&self) -> bool {
        self.reject
    }
}

fn check_significance(significance: f64) -> Result<(), Error> {
    if !(0.0..=1.0).contains(&significance) {
        return Err(Error::invalid_argument("significance must be in [0.0, 1.0]")
            .with_context("significance", significance));
    }
    Ok(())
}
