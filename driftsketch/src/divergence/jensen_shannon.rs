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

use super::DivergenceResult;
use crate::error::Error;
use crate::tensor::Tensor;

/// Returns the Jensen-Shannon divergence between two equally long arrays.
///
/// With `m = (p1 + p2) / 2` elementwise, this is
/// `(KL(p1 || m) + KL(p2 || m)) / 2` in nats. Entries where the distribution
/// value is zero contribute nothing to its KL term. Values are expected to be
/// non-negative.
///
/// # Panics
///
/// Panics if the arrays differ in length.
pub fn jensen_shannon_divergence(p1: &[f64], p2: &[f64]) -> f64 {
    assert_eq!(
        p1.len(),
        p2.len(),
        "distributions must have the same length"
    );
    let (mut kl1, mut kl2) = (0.0, 0.0);
    for (&a, &b) in p1.iter().zip(p2) {
        let m = (a + b) / 2.0;
        kl1 += kl_term(a, m);
        kl2 += kl_term(b, m);
    }
    (kl1 + kl2) / 2.0
}

fn kl_term(p: f64, m: f64) -> f64 {
    if p == 0.0 { 0.0 } else { p * (p / m).ln() }
}

/// Tests the summed channel divergence of two tensors against `threshold`.
///
/// With `normalize`, the sum is divided by the element count of `reference`.
///
/// # Errors
///
/// Returns [`SchemaMismatch`](crate::error::ErrorKind::SchemaMismatch) if the
/// shapes differ, and [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
/// if either tensor holds a negative value.
pub fn calculate(
    reference: &Tensor,
    hypothesis: &Tensor,
    threshold: f64,
    normalize: bool,
) -> Result<DivergenceResult, Error> {
    let statistic = aggregate_statistic(reference, hypothesis, normalize)?;
    Ok(DivergenceResult::new(statistic, threshold))
}

/// Tests each channel's divergence against its own threshold.
///
/// With `normalize`, each channel's divergence is divided by the number of
/// elements in that channel.
///
/// # Errors
///
/// Returns [`SchemaMismatch`](crate::error::ErrorKind::SchemaMismatch) if the
/// shapes differ, and [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
/// if there is not exactly one threshold per channel or a value is negative.
pub fn calculate_per_channel(
    reference: &Tensor,
    hypothesis: &Tensor,
    thresholds: &[f64],
    normalize: bool,
) -> Result<Vec<DivergenceResult>, Error> {
    check_inputs(reference, hypothesis)?;
    if thresholds.len() != reference.num_channels() {
        return Err(Error::invalid_argument("one threshold is required per channel")
            .with_context("channels", reference.num_channels())
            .with_context("thresholds", thresholds.len()));
    }
    let statistics = channel_statistics(reference, hypothesis, normalize)?;
    Ok(statistics
        .into_iter()
        .zip(thresholds)
        .map(|(statistic, &threshold)| DivergenceResult::new(statistic, threshold))
        .collect())
}

pub(super) fn aggregate_statistic(
    reference: &Tensor,
    hypothesis: &Tensor,
    normalize: bool,
) -> Result<f64, Error> {
    check_inputs(reference, hypothesis)?;
    let sum: f64 = (0..reference.num_channels())
        .map(|c| jensen_shannon_divergence(&reference.channel(c), &hypothesis.channel(c)))
        .sum();
    if normalize && !reference.is_empty() {
        Ok(sum / reference.len() as f64)
    } else {
        Ok(sum)
    }
}

pub(super) fn channel_statistics(
    reference: &Tensor,
    hypothesis: &Tensor,
    normalize: bool,
) -> Result<Vec<f64>, Error> {
    check_inputs(reference, hypothesis)?;
    let channel_len = reference.channel_len();
    Ok((0..reference.num_channels())
        .map(|c| {
            let js = jensen_shannon_divergence(&reference.channel(c), &hypothesis.channel(c));
            if normalize && channel_len > 0 {
                js / channel_len as f64
            } else {
                js
            }
        })
        .collect())
}

fn check_inputs(reference: &Tensor, hypothesis: &Tensor) -> Result<(), Error> {
    if reference.shape() != hypothesis.shape() {
        return Err(Error::shape_mismatch(reference.shape(), hypothesis.shape()));
    }
    check_non_negative(reference, "reference")?;
    check_non_negative(hypothesis, "hypothesis")
}

/// Divergence is defined over masses, so every value must be `>= 0`.
pub(super) fn check_non_negative(tensor: &Tensor, role: &'static str) -> Result<(), Error> {
    match tensor.data().iter().position(|&v| v < 0.0) {
        Some(idx) => Err(Error::invalid_argument("tensor holds a negative value")
            .with_context("tensor", role)
            .with_context("index", idx)
            .with_context("value", tensor.data()[idx])),
        None => Ok(()),
    }
}
