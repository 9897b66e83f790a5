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

//! Null distribution of the two-sample KS statistic.

use std::f64::consts::PI;

const SERIES_TOLERANCE: f64 = 1e-16;
const MAX_SERIES_TERMS: u32 = 100;
// below this the theta-function form of the Kolmogorov CDF converges faster
const THETA_FORM_CUTOFF: f64 = 1.18;

/// Returns the asymptotic p-value `P(D >= d)` for samples of sizes `n` and `m`.
///
/// Uses the Kolmogorov limiting distribution evaluated at
/// `z = d * sqrt(n * m / (n + m))`.
pub fn asymptotic_p_value(d: f64, n: u64, m: u64) -> f64 {
    let (n, m) = (n as f64, m as f64);
    let z = d * (n * m / (n + m)).sqrt();
    kolmogorov_survival(z)
}

/// Returns `1 - K(z)` where `K` is the Kolmogorov distribution function.
fn kolmogorov_survival(z: f64) -> f64 {
    if z <= 0.0 {
        return 1.0;
    }

    if z < THETA_FORM_CUTOFF {
        // K(z) = sqrt(2 pi) / z * sum_{k>=1} exp(-(2k - 1)^2 pi^2 / (8 z^2))
        let w = -PI * PI / (8.0 * z * z);
        let mut cdf = 0.0;
        for k in 1..=MAX_SERIES_TERMS {
            let odd = (2 * k - 1) as f64;
            let term = (odd * odd * w).exp();
            cdf += term;
            if term < SERIES_TOLERANCE {
                break;
            }
        }
        return (1.0 - (2.0 * PI).sqrt() / z * cdf).clamp(0.0, 1.0);
    }

    // 1 - K(z) = 2 * sum_{k>=1} (-1)^(k-1) exp(-2 k^2 z^2)
    let mut survival = 0.0;
    let mut sign = 1.0;
    for k in 1..=MAX_SERIES_TERMS {
        let k = k as f64;
        let term = (-2.0 * k * k * z * z).exp();
        survival += sign * term;
        if term < SERIES_TOLERANCE {
            break;
        }
        sign = -sign;
    }
    (2.0 * survival).clamp(0.0, 1.0)
}

/// Returns the exact p-value `P(D >= d)` for samples of sizes `n` and `m`.
///
/// `scaled` is the observed statistic multiplied by `n * m`, which is always an
/// integer `max |i * m - j * n|`. The probability that a uniformly random
/// interleaving of the two samples keeps `|i * m - j * n| < scaled` at every
/// step is computed with a row-by-row recursion over the `(n + 1) x (m + 1)`
/// lattice.
pub fn exact_p_value(scaled: u64, n: u64, m: u64) -> f64 {
    if scaled == 0 {
        return 1.0;
    }
    let (n, m) = (n as usize, m as usize);
    let total = n + m;
    let bound = scaled as i128;
    let inside = |i: usize, j: usize| ((i * m) as i128 - (j * n) as i128).abs() < bound;

    let mut row = vec![0.0f64; m + 1];
    for i in 0..=n {
        for j in 0..=m {
            if !inside(i, j) {
                row[j] = 0.0;
                continue;
            }
            if i == 0 && j == 0 {
                row[j] = 1.0;
                continue;
            }
            let mut prob = 0.0;
            if i > 0 {
                // row[j] still holds the value of (i - 1, j)
                prob += row[j] * (n - i + 1) as f64 / (total - i + 1 - j) as f64;
            }
            if j > 0 {
                prob += row[j - 1] * (m - j + 1) as f64 / (total - i - j + 1) as f64;
            }
            row[j] = prob;
        }
    }
    (1.0 - row[m]).clamp(0.0, 1.0)
}
