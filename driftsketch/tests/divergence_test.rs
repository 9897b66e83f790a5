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

use driftsketch::divergence;
use driftsketch::divergence::jensen_shannon_divergence;
use driftsketch::error::ErrorKind;
use driftsketch::tensor::Tensor;
use googletest::assert_that;
use googletest::prelude::gt;
use googletest::prelude::near;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn random_tensor(shape: Vec<usize>, seed: u64) -> Tensor {
    let len = shape.iter().product();
    let mut rng = SmallRng::seed_from_u64(seed);
    let data = (0..len).map(|_| rng.random_range(0.0..1.0)).collect();
    Tensor::new(shape, data).unwrap()
}

#[test]
fn test_tensor_validation() {
    let err = Tensor::new(vec![4], vec![0.0; 4]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = Tensor::new(vec![2, 3], vec![0.0; 5]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = Tensor::new(vec![1, 2], vec![0.0, f64::NAN]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_tensor_channels_and_samples() {
    let tensor = Tensor::new(vec![2, 2, 2], (0..8).map(|v| v as f64).collect()).unwrap();
    assert_eq!(tensor.num_samples(), 2);
    assert_eq!(tensor.num_channels(), 2);
    assert_eq!(tensor.channel_len(), 4);
    assert_eq!(tensor.channel(0), vec![0.0, 1.0, 4.0, 5.0]);
    assert_eq!(tensor.channel(1), vec![2.0, 3.0, 6.0, 7.0]);

    let selected = tensor.select(&[1, 1, 0]);
    assert_eq!(selected.shape(), &[3, 2, 2]);
    assert_eq!(selected.data(), &[4.0, 5.0, 6.0, 7.0, 4.0, 5.0, 6.0, 7.0, 0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn test_tensor_from_le_bytes() {
    let values: [f64; 6] = [0.25, 1.0, 2.5, 4.0, 8.0, 16.0];
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    let tensor = Tensor::from_le_bytes(vec![3, 2], &bytes).unwrap();
    assert_eq!(tensor.data(), &values);

    let err = Tensor::from_le_bytes(vec![4, 2], &bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_identical_tensors_do_not_diverge() {
    let tensor = random_tensor(vec![8, 3, 4, 4], 1);
    for normalize in [false, true] {
        let result = divergence::calculate(&tensor, &tensor, 1e-9, normalize).unwrap();
        assert_eq!(result.statistic(), 0.0);
        assert!(!result.reject());
    }

    let sparse = Tensor::new(vec![2, 1, 3], vec![0.0, 1.0, 0.0, 0.0, 0.0, 2.0]).unwrap();
    let result = divergence::calculate(&sparse, &sparse, 0.5, false).unwrap();
    assert_eq!(result.statistic(), 0.0);
}

#[test]
fn test_shape_mismatch() {
    let reference = random_tensor(vec![4, 3, 2], 2);
    let hypothesis = random_tensor(vec![4, 2, 3], 3);
    let err = divergence::calculate(&reference, &hypothesis, 0.1, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaMismatch);

    let err = divergence::calculate_per_channel(&reference, &hypothesis, &[0.1; 3], false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
}

#[test]
fn test_aggregate_sums_channels() {
    let reference = random_tensor(vec![6, 3, 5], 4);
    let hypothesis = random_tensor(vec![6, 3, 5], 5);

    let per_channel: f64 = (0..3)
        .map(|c| jensen_shannon_divergence(&reference.channel(c), &hypothesis.channel(c)))
        .sum();
    let raw = divergence::calculate(&reference, &hypothesis, 0.0, false).unwrap();
    assert_that!(raw.statistic(), near(per_channel, 1e-12));
    assert_that!(raw.statistic(), gt(0.0));
    assert!(raw.reject());
    assert_eq!(raw.threshold(), 0.0);

    let normalized = divergence::calculate(&reference, &hypothesis, 0.0, true).unwrap();
    assert_eq!(normalized.statistic(), raw.statistic() / reference.len() as f64);
}

#[test]
fn test_per_channel() {
    let reference = Tensor::new(vec![1, 2, 2], vec![1.0, 0.0, 0.5, 0.5]).unwrap();
    let hypothesis = Tensor::new(vec![1, 2, 2], vec![0.0, 1.0, 0.5, 0.5]).unwrap();

    let results = divergence::calculate_per_channel(&reference, &hypothesis, &[0.5, 0.5], false).unwrap();
    assert_eq!(results.len(), 2);
    assert_that!(results[0].statistic(), near(std::f64::consts::LN_2, 1e-12));
    assert!(results[0].reject());
    assert_eq!(results[1].statistic(), 0.0);
    assert!(!results[1].reject());

    let normalized = divergence::calculate_per_channel(&reference, &hypothesis, &[0.5, 0.5], true).unwrap();
    assert_that!(normalized[0].statistic(), near(std::f64::consts::LN_2 / 2.0, 1e-12));
    assert!(!normalized[0].reject());

    let err = divergence::calculate_per_channel(&reference, &hypothesis, &[0.5], false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_negative_values_are_rejected() {
    let reference = Tensor::new(vec![1, 1, 4], vec![-1.0, 0.5, 2.0, 3.0]).unwrap();
    let hypothesis = Tensor::new(vec![1, 1, 4], vec![1.0, 0.5, 2.0, 3.0]).unwrap();

    let err = divergence::calculate(&reference, &hypothesis, 0.1, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.context("tensor"), Some("reference"));

    let err = divergence::calculate(&hypothesis, &reference, 0.1, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.context("tensor"), Some("hypothesis"));

    let err = divergence::calculate_per_channel(&reference, &hypothesis, &[0.1], false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    // shape problems are reported before value problems
    let other = Tensor::new(vec![1, 2, 2], vec![1.0; 4]).unwrap();
    let err = divergence::calculate(&reference, &other, 0.1, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
}
