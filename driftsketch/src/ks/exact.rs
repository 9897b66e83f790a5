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

//! Exact two-sample KS test over raw samples.
//!
//! Prefer this over the sketch-based test when both samples fit in memory,
//! for example in validation runs or on small batches.

use std::collections::BTreeMap;

use tracing::debug;

use super::EXACT_P_VALUE_MAX_PRODUCT;
use super::HypothesisTestResult;
use super::check_significance;
use super::distribution::asymptotic_p_value;
use super::distribution::exact_p_value;
use crate::error::Error;
use crate::frame::Frame;

/// Runs the two-sample KS test on two raw samples.
///
/// The p-value is exact when `n * m` is below
/// [`EXACT_P_VALUE_MAX_PRODUCT`](super::EXACT_P_VALUE_MAX_PRODUCT) and
/// asymptotic otherwise. Either sample holding fewer than two points yields
/// [`HypothesisTestResult::no_drift`].
///
/// # Errors
///
/// Returns [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if a
/// sample contains NaN or the significance is not in [0.0, 1.0].
pub fn calculate(
    reference: &[f64],
    test: &[f64],
    significance: f64,
) -> Result<HypothesisTestResult, Error> {
    check_significance(significance)?;
    if reference.len() < 2 || test.len() < 2 {
        return Ok(HypothesisTestResult::no_drift());
    }

    let reference = sorted(reference)?;
    let test = sorted(test)?;
    let (n, m) = (reference.len() as u64, test.len() as u64);

    let scaled = scaled_statistic(&reference, &test);
    let statistic = scaled as f64 / (n * m) as f64;
    let p_value = if n * m < EXACT_P_VALUE_MAX_PRODUCT {
        exact_p_value(scaled, n, m)
    } else {
        asymptotic_p_value(statistic, n, m)
    };
    Ok(HypothesisTestResult::new(statistic, p_value, significance))
}

/// Runs [`calculate`] on every numeric column of `test`.
///
/// # Errors
///
/// Returns [`SchemaMismatch`](crate::error::ErrorKind::SchemaMismatch) if
/// `reference` has no numeric column of the same name.
pub fn calculate_frame(
    reference: &Frame,
    test: &Frame,
    significance: f64,
) -> Result<BTreeMap<String, HypothesisTestResult>, Error> {
    let mut results = BTreeMap::new();
    for (name, values) in test.numeric_columns() {
        let baseline = reference
            .column(name)
            .and_then(|column| column.as_numeric())
            .ok_or_else(|| Error::missing_column(name))?;
        let result = calculate(baseline, values, significance)
            .map_err(|err| err.with_context("column", name))?;
        debug!(
            column = name,
            statistic = result.statistic(),
            p_value = result.p_value(),
            reject = result.reject(),
            "exact ks test"
        );
        results.insert(name.to_string(), result);
    }
    Ok(results)
}

fn sorted(sample: &[f64]) -> Result<Vec<f64>, Error> {
    if sample.iter().any(|value| value.is_nan()) {
        return Err(Error::invalid_argument("sample contains NaN"));
    }
    let mut sample = sample.to_vec();
    sample.sort_by(f64::total_cmp);
    Ok(sample)
}

/// Returns `max |i * m - j * n|` over the merged order of both sorted samples,
/// the KS statistic scaled by `n * m`.
fn scaled_statistic(reference: &[f64], test: &[f64]) -> u64 {
    let (n, m) = (reference.len(), test.len());
    let (mut i, mut j) = (0usize, 0usize);
    let mut max_gap = 0u64;
    while i < n && j < m {
        let x = reference[i].min(test[j]);
        while i < n && reference[i] <= x {
            i += 1;
        }
        while j < m && test[j] <= x {
            j += 1;
        }
        let gap = ((i * m) as i128 - (j * n) as i128).unsigned_abs() as u64;
        max_gap = max_gap.max(gap);
    }
    max_gap
}
