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

/// Returns the Greenwald-Khanna band of a tuple with the given `delta`.
///
/// With `p = floor(2 * epsilon * n)`, band 0 holds `delta == p` and band
/// `alpha >= 1` holds the deltas in
/// `(p - 2^alpha - (p mod 2^alpha), p - 2^(alpha-1) - (p mod 2^(alpha-1))]`.
/// Older tuples carry smaller deltas and therefore higher bands.
pub fn band(delta: u64, p: u64) -> u32 {
    if delta >= p {
        return 0;
    }
    let p = p as i128;
    let delta = delta as i128;
    let mut alpha = 1u32;
    loop {
        let half = 1i128 << (alpha - 1);
        let full = 1i128 << alpha;
        let upper = p - half - (p % half);
        let lower = p - full - (p % full);
        if lower < delta && delta <= upper {
            return alpha;
        }
        alpha += 1;
    }
}

/// Returns how many inserts happen between two compressions.
pub fn compress_steps(epsilon: f64) -> u64 {
    ((1.0 / (2.0 * epsilon)).floor() as u64).max(1)
}
