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

use driftsketch::error::ErrorKind;
use driftsketch::gk::DEFAULT_EPSILON;
use driftsketch::gk::QuantileSketch;
use proptest::prelude::*;

fn total_g(sketch: &QuantileSketch) -> u64 {
    sketch.summary().iter().map(|entry| entry.g()).sum()
}

/// Inserts `0..n` in a fixed scrambled order.
fn scrambled_sketch(epsilon: f64, n: u64) -> QuantileSketch {
    let mut sketch = QuantileSketch::new(epsilon);
    // 7919 is prime and coprime with every n used below
    for i in 0..n {
        sketch.insert(((i * 7919) % n) as f64).unwrap();
    }
    sketch
}

#[test]
fn test_epsilon_limits() {
    let _small = QuantileSketch::new(1e-6);
    let _large = QuantileSketch::new(0.99);
    assert_eq!(QuantileSketch::default().epsilon(), DEFAULT_EPSILON);
}

#[test]
#[should_panic(expected = "epsilon must be in")]
fn test_zero_epsilon_panics() {
    QuantileSketch::new(0.0);
}

#[test]
fn test_empty() {
    let sketch = QuantileSketch::new(0.01);
    assert!(sketch.is_empty());
    assert_eq!(sketch.n(), 0);
    assert_eq!(sketch.num_retained(), 0);
    assert_eq!(sketch.min_value(), None);
    assert_eq!(sketch.max_value(), None);
    assert_eq!(sketch.rank(1.0).unwrap(), None);
    assert_eq!(sketch.ranks(&[1.0, 2.0]).unwrap(), None);
    assert_eq!(sketch.rank_bounds(&[1.0]).unwrap(), None);
    assert_eq!(sketch.quantile(0.5).unwrap(), None);
    assert_eq!(sketch.cdf(&[0.0]).unwrap(), None);

    // NaN points are rejected even before any data arrives
    assert_eq!(sketch.rank(f64::NAN).unwrap_err().kind(), ErrorKind::InvalidArgument);
    assert_eq!(sketch.cdf(&[0.0, f64::NAN]).unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_worked_example() {
    let mut sketch = QuantileSketch::new(0.25);
    for value in [12.0, 10.0, 11.0, 10.0] {
        sketch.insert(value).unwrap();
    }
    assert_eq!(sketch.num_retained(), 4);
    assert_eq!(sketch.min_value(), Some(10.0));
    assert_eq!(sketch.max_value(), Some(12.0));
    assert_eq!(sketch.n(), 4);
    assert_eq!(total_g(&sketch), 4);

    let values: Vec<f64> = sketch.summary().iter().map(|e| e.value()).collect();
    assert_eq!(values, vec![10.0, 10.0, 11.0, 12.0]);
}

#[test]
fn test_nan_is_rejected() {
    let mut sketch = QuantileSketch::new(0.01);
    sketch.insert(1.0).unwrap();
    let err = sketch.insert(f64::NAN).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(sketch.n(), 1);

    let err = sketch.insert_many(&[2.0, f64::NAN, 3.0]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(sketch.n(), 2);

    assert_eq!(sketch.rank(f64::NAN).unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_quantile_out_of_range() {
    let mut sketch = QuantileSketch::new(0.01);
    sketch.insert(0.0).unwrap();
    for phi in [-0.1, 1.1, f64::NAN] {
        let err = sketch.quantile(phi).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}

#[test]
fn test_few_items_are_exact() {
    let mut sketch = QuantileSketch::new(0.1);
    sketch.insert_many(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

    assert_eq!(sketch.quantile(0.0).unwrap(), Some(1.0));
    assert_eq!(sketch.quantile(0.5).unwrap(), Some(3.0));
    assert_eq!(sketch.quantile(1.0).unwrap(), Some(5.0));

    assert_eq!(sketch.rank(0.0).unwrap(), Some(1));
    assert_eq!(sketch.rank(2.5).unwrap(), Some(2));
    assert_eq!(sketch.rank(3.0).unwrap(), Some(3));
    assert_eq!(sketch.rank(10.0).unwrap(), Some(5));
    assert_eq!(sketch.cdf(&[2.5, 5.0]).unwrap(), Some(vec![0.4, 1.0]));

    let bounds = sketch.rank_bounds(&[0.0, 2.5, 3.0, 5.0, 10.0]).unwrap().unwrap();
    assert_eq!(bounds, vec![(0, 0), (2, 2), (3, 3), (5, 5), (5, 5)]);
}

#[test]
fn test_rank_error_in_estimation_mode() {
    let n = 10_000u64;
    let epsilon = 0.01;
    let sketch = scrambled_sketch(epsilon, n);
    assert_eq!(total_g(&sketch), n);
    assert!(sketch.num_retained() < n as usize / 4);

    let tolerance = 2.0 * epsilon * n as f64 + 1.0;
    for v in (0..n).step_by(37) {
        let rank = sketch.rank(v as f64 + 0.5).unwrap().unwrap() as f64;
        let true_rank = (v + 1) as f64;
        assert!(
            (rank - true_rank).abs() <= tolerance,
            "rank of {v}: expected {true_rank} +/- {tolerance}, got {rank}"
        );
    }
}

#[test]
fn test_rank_bounds_contain_true_count() {
    for (epsilon, n) in [(0.01, 10_000u64), (0.05, 5_000), (0.001, 20_000)] {
        let sketch = scrambled_sketch(epsilon, n);
        let max_width = (2.0 * epsilon * n as f64) as u64;

        let points: Vec<f64> = (0..n).flat_map(|v| [v as f64, v as f64 + 0.5]).collect();
        let bounds = sketch.rank_bounds(&points).unwrap().unwrap();
        for (point, (lower, upper)) in points.iter().zip(bounds) {
            let true_count = point.floor() as u64 + 1;
            assert!(
                lower <= true_count && true_count <= upper,
                "count at {point}: {true_count} outside [{lower}, {upper}]"
            );
            assert!(upper - lower <= max_width, "interval at {point} is too wide");
        }
    }
}

#[test]
fn test_summary_size_is_bounded() {
    let n = 100_000u64;
    let sketch = scrambled_sketch(0.01, n);
    assert_eq!(total_g(&sketch), n);
    assert!(
        sketch.num_retained() < 10_000,
        "retained {} tuples",
        sketch.num_retained()
    );
    assert_eq!(sketch.min_value(), Some(0.0));
    assert_eq!(sketch.max_value(), Some((n - 1) as f64));
}

#[test]
fn test_sorted_and_reversed_streams() {
    let n = 5_000u64;
    let epsilon = 0.02;
    let mut ascending = QuantileSketch::new(epsilon);
    let mut descending = QuantileSketch::new(epsilon);
    for i in 0..n {
        ascending.insert(i as f64).unwrap();
        descending.insert((n - 1 - i) as f64).unwrap();
    }
    for sketch in [&ascending, &descending] {
        assert_eq!(total_g(sketch), n);
        let median = sketch.quantile(0.5).unwrap().unwrap();
        assert!((median + 1.0 - 0.5 * n as f64).abs() <= epsilon * n as f64 + 1.0);
    }
}

fn distinct_stream() -> impl Strategy<Value = Vec<f64>> {
    (1usize..3000).prop_flat_map(|n| Just((0..n).map(|i| i as f64).collect::<Vec<_>>()).prop_shuffle())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn property_quantiles_within_epsilon(
        values in distinct_stream(),
        epsilon in prop_oneof![Just(0.005), Just(0.02), Just(0.1)],
    ) {
        let mut sketch = QuantileSketch::new(epsilon);
        sketch.insert_many(&values).unwrap();

        let n = values.len() as f64;
        for step in 0..=20 {
            let phi = step as f64 / 20.0;
            let q = sketch.quantile(phi).unwrap().unwrap();
            // values are 0..n, so the true rank of q is q + 1
            let error = (q + 1.0 - phi * n).abs();
            prop_assert!(error <= epsilon * n + 1.0, "phi={} q={} n={}", phi, q, n);
        }
    }

    #[test]
    fn property_counts_are_conserved(
        values in proptest::collection::vec(-1.0e6f64..1.0e6, 1..4000),
        epsilon in 0.001f64..0.3,
    ) {
        let mut sketch = QuantileSketch::new(epsilon);
        sketch.insert_many(&values).unwrap();

        prop_assert_eq!(sketch.n(), values.len() as u64);
        prop_assert_eq!(total_g(&sketch), values.len() as u64);
        let summary = sketch.summary();
        prop_assert!(summary.windows(2).all(|w| w[0].value() <= w[1].value()));

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(sketch.min_value(), Some(min));
        prop_assert_eq!(sketch.max_value(), Some(max));
    }
}
