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

//! Jensen-Shannon divergence tests for tensor batches.
//!
//! The divergence between a reference tensor and a hypothesis tensor of the
//! same shape is computed channel by channel (axis 1). [`calculate`] sums the
//! channel divergences into one statistic; [`calculate_per_channel`] reports
//! each channel against its own threshold. The [`baseline`] module derives
//! sensible thresholds by measuring the divergence of the reference data
//! against itself.
//!
//! # Usage
//!
//! ```rust
//! # use driftsketch::divergence;
//! # use driftsketch::tensor::Tensor;
//! let reference = Tensor::new(vec![4, 2, 3], (0..24).map(|v| v as f64).collect()).unwrap();
//! let result = divergence::calculate(&reference, &reference, 0.01, true).unwrap();
//! assert_eq!(result.statistic(), 0.0);
//! assert!(!result.reject());
//! ```

pub mod baseline;
mod jensen_shannon;

pub use self::jensen_shannon::calculate;
pub use self::jensen_shannon::calculate_per_channel;
pub use self::jensen_shannon::jensen_shannon_divergence;

/// Default number of cross-validation folds for baseline calibration.
pub const DEFAULT_NUM_CV: usize = 10;

/// Outcome of a divergence test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivergenceResult {
    statistic: f64,
    threshold: f64,
    reject: bool,
}

impl DivergenceResult {
    fn new(statistic: f64, threshold: f64) -> Self {
        Self {
            statistic,
            threshold,
            reject: statistic > threshold,
        }
    }

    /// Returns the divergence.
    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    /// Returns the threshold the divergence was compared with.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns true if the divergence exceeds the threshold.
    pub fn reject(&self) -> bool {
        self.reject
    }
}
