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

use std::collections::BTreeMap;

use tracing::debug;

use super::HypothesisTestResult;
use super::check_significance;
use super::distribution::asymptotic_p_value;
use crate::error::Error;
use crate::frame::Frame;
use crate::gk::QuantileSketch;

/// Reference sketches keyed by column name.
pub type FittedSketchSet = BTreeMap<String, QuantileSketch>;

/// Sketch-based two-sample KS test.
///
/// Fitting keeps only one [`QuantileSketch`] per numeric reference column, so
/// memory stays bounded no matter how large the reference data was. The fitted
/// set is read-only afterwards and can be queried against any number of test
/// batches.
///
/// # Examples
///
/// ```
/// # use driftsketch::frame::Frame;
/// # use driftsketch::ks::ApproximateKsTest;
/// let reference = Frame::new()
///     .with_numeric("x", (0..1000).map(|i| i as f64).collect())
///     .unwrap();
/// let test = ApproximateKsTest::fit(&reference, 0.01).unwrap();
///
/// let batch = Frame::new()
///     .with_numeric("x", (0..1000).map(|i| i as f64 + 600.0).collect())
///     .unwrap();
/// let results = test.calculate(&batch, 0.05).unwrap();
/// assert!(results["x"].reject());
/// ```
#[derive(Debug, Clone)]
pub struct ApproximateKsTest {
    epsilon: f64,
    sketches: FittedSketchSet,
}

impl ApproximateKsTest {
    /// Fits one sketch per numeric column of `reference`; other columns are ignored.
    ///
    /// # Panics
    ///
    /// Panics if epsilon is not in (0.0, 1.0).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if a
    /// numeric column contains NaN.
    pub fn fit(reference: &Frame, epsilon: f64) -> Result<Self, Error> {
        let mut sketches = FittedSketchSet::new();
        for (name, values) in reference.numeric_columns() {
            let mut sketch = QuantileSketch::new(epsilon);
            sketch
                .insert_many(values)
                .map_err(|err| err.with_context("column", name))?;
            debug!(
                column = name,
                n = sketch.n(),
                retained = sketch.num_retained(),
                "fitted reference sketch"
            );
            sketches.insert(name.to_string(), sketch);
        }
        Ok(Self { epsilon, sketches })
    }

    /// Wraps sketches that were fitted elsewhere.
    ///
    /// Test batches are sketched with `epsilon`.
    ///
    /// # Panics
    ///
    /// Panics if epsilon is not in (0.0, 1.0).
    pub fn from_sketches(epsilon: f64, sketches: FittedSketchSet) -> Self {
        assert!(
            epsilon > 0.0 && epsilon < 1.0,
            "epsilon must be in (0.0, 1.0), got {epsilon}"
        );
        Self { epsilon, sketches }
    }

    /// Returns the accuracy used for test batch sketches.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns the fitted reference sketches.
    pub fn sketches(&self) -> &FittedSketchSet {
        &self.sketches
    }

    /// Returns the fitted sketch of one column.
    pub fn sketch(&self, column: &str) -> Option<&QuantileSketch> {
        self.sketches.get(column)
    }

    /// Returns the fitted column names in sorted order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.sketches.keys().map(String::as_str)
    }

    /// Tests every numeric column of `batch` against its fitted reference.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaMismatch`](crate::error::ErrorKind::SchemaMismatch) if a
    /// numeric column of `batch` has no fitted sketch, and
    /// [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) for NaN
    /// values or a significance outside [0.0, 1.0].
    pub fn calculate(
        &self,
        batch: &Frame,
        significance: f64,
    ) -> Result<BTreeMap<String, HypothesisTestResult>, Error> {
        check_significance(significance)?;

        let mut results = BTreeMap::new();
        for (name, values) in batch.numeric_columns() {
            let reference = self
                .sketches
                .get(name)
                .ok_or_else(|| Error::missing_column(name))?;
            let result = self
                .calculate_column(reference, values, significance)
                .map_err(|err| err.with_context("column", name))?;
            debug!(
                column = name,
                statistic = result.statistic(),
                p_value = result.p_value(),
                reject = result.reject(),
                "approximate ks test"
            );
            results.insert(name.to_string(), result);
        }
        Ok(results)
    }

    fn calculate_column(
        &self,
        reference: &QuantileSketch,
        values: &[f64],
        significance: f64,
    ) -> Result<HypothesisTestResult, Error> {
        if reference.n() < 2 || values.len() < 2 {
            return Ok(HypothesisTestResult::no_drift());
        }

        let mut sketch = QuantileSketch::new(self.epsilon);
        sketch.insert_many(values)?;

        let d = statistic(reference, &sketch)?;
        let p_value = asymptotic_p_value(d, reference.n(), sketch.n());
        Ok(HypothesisTestResult::new(d, p_value, significance))
    }
}

/// Returns the approximate KS statistic between two sketches.
///
/// Both CDFs are evaluated at the union of the summary values of the two
/// sketches, and the largest absolute difference is reported. Each CDF value
/// is the midpoint of the sketch's [rank bounds](QuantileSketch::rank_bounds)
/// at that point, so its error is centered and at most `epsilon`. Empty
/// sketches compare as identical.
pub fn statistic(reference: &QuantileSketch, test: &QuantileSketch) -> Result<f64, Error> {
    let points = merged_breakpoints(reference, test);
    let (Some(reference_cdf), Some(test_cdf)) =
        (centered_cdf(reference, &points)?, centered_cdf(test, &points)?)
    else {
        return Ok(0.0);
    };

    let d = reference_cdf
        .iter()
        .zip(test_cdf.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f64, f64::max);
    Ok(d)
}

fn centered_cdf(sketch: &QuantileSketch, points: &[f64]) -> Result<Option<Vec<f64>>, Error> {
    let n = sketch.n() as f64;
    let bounds = sketch.rank_bounds(points)?;
    Ok(bounds.map(|bounds| {
        bounds
            .into_iter()
            .map(|(lower, upper)| (lower + upper) as f64 / (2.0 * n))
            .collect()
    }))
}

fn merged_breakpoints(a: &QuantileSketch, b: &QuantileSketch) -> Vec<f64> {
    let mut points: Vec<f64> = a
        .summary()
        .iter()
        .chain(b.summary())
        .map(|entry| entry.value())
        .collect();
    points.sort_by(f64::total_cmp);
    points.dedup();
    points
}
