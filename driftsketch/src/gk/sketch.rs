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

use tracing::trace;

use super::DEFAULT_EPSILON;
use super::helper::band;
use super::helper::compress_steps;
use crate::error::Error;

/// One tuple of the sketch summary.
///
/// `g` is the number of stream items the tuple covers, and `delta` bounds the
/// additional uncertainty of its rank: the rank of `value` lies in
/// `[r_min, r_min + delta]` where `r_min` is the sum of `g` up to and including
/// this tuple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryEntry {
    value: f64,
    g: u64,
    delta: u64,
}

impl SummaryEntry {
    fn new(value: f64, g: u64, delta: u64) -> Self {
        Self { value, g, delta }
    }

    /// Returns the stored stream value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the number of stream items covered by this tuple.
    pub fn g(&self) -> u64 {
        self.g
    }

    /// Returns the rank uncertainty of this tuple.
    pub fn delta(&self) -> u64 {
        self.delta
    }
}

/// Greenwald-Khanna epsilon-approximate quantile sketch.
///
/// See the [gk module level documentation](crate::gk) for more.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileSketch {
    epsilon: f64,
    compress_steps: u64,
    summary: Vec<SummaryEntry>,
    min: f64,
    max: f64,
    n: u64,
}

impl Default for QuantileSketch {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}

impl QuantileSketch {
    /// Creates an empty sketch with the given accuracy.
    ///
    /// # Panics
    ///
    /// Panics if epsilon is not in (0.0, 1.0).
    ///
    /// # Examples
    ///
    /// ```
    /// # use driftsketch::gk::QuantileSketch;
    /// let sketch = QuantileSketch::new(0.01);
    /// assert_eq!(sketch.epsilon(), 0.01);
    /// assert!(sketch.is_empty());
    /// ```
    pub fn new(epsilon: f64) -> Self {
        assert!(
            epsilon > 0.0 && epsilon < 1.0,
            "epsilon must be in (0.0, 1.0), got {epsilon}"
        );
        Self {
            epsilon,
            compress_steps: compress_steps(epsilon),
            summary: Vec::new(),
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            n: 0,
        }
    }

    /// Returns the accuracy parameter of this sketch.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns the number of items inserted so far.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Returns true if the sketch has not seen any data.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Returns the number of tuples in the summary.
    pub fn num_retained(&self) -> usize {
        self.summary.len()
    }

    /// Returns the summary tuples in value order.
    pub fn summary(&self) -> &[SummaryEntry] {
        &self.summary
    }

    /// Returns the smallest value seen by the sketch.
    pub fn min_value(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.min)
        }
    }

    /// Returns the largest value seen by the sketch.
    pub fn max_value(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.max)
        }
    }

    /// Inserts a value into the sketch.
    ///
    /// The summary is compacted every `floor(1 / (2 * epsilon))` inserts.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) for
    /// NaN, which has no rank.
    pub fn insert(&mut self, value: f64) -> Result<(), Error> {
        if value.is_nan() {
            return Err(Error::invalid_argument("NaN cannot be inserted into a quantile sketch"));
        }
        if self.n % self.compress_steps == 0 {
            self.compress();
        }
        self.n += 1;
        self.update(value)
    }

    /// Inserts every value of the slice, stopping at the first failure.
    pub fn insert_many(&mut self, values: &[f64]) -> Result<(), Error> {
        for &value in values {
            self.insert(value)?;
        }
        Ok(())
    }

    /// Returns the approximate number of inserted items less than or equal to
    /// `value`.
    ///
    /// Values at or below the minimum rank as 1, values at or above the maximum
    /// rank as `n`. Returns `None` if the sketch is empty.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) for
    /// NaN.
    pub fn rank(&self, value: f64) -> Result<Option<u64>, Error> {
        let ranks = self.ranks(&[value])?;
        Ok(ranks.map(|ranks| ranks[0]))
    }

    /// Returns [`rank`](Self::rank) for each point, sharing one pass over the
    /// summary.
    pub fn ranks(&self, points: &[f64]) -> Result<Option<Vec<u64>>, Error> {
        check_points(points)?;
        if self.is_empty() {
            return Ok(None);
        }
        let min_ranks = self.min_ranks();

        let mut ranks = Vec::with_capacity(points.len());
        for &point in points {
            let rank = if point <= self.min {
                1
            } else if point >= self.max {
                self.n
            } else {
                min_ranks[self.locate(point)?] - 1
            };
            ranks.push(rank);
        }
        Ok(Some(ranks))
    }

    /// Returns `(lower, upper)` bounds on the number of inserted items less than
    /// or equal to each point.
    ///
    /// With `k` the last tuple whose value is `<= point`, the count is at least
    /// `r_min(k)` and at most `r_max(k + 1) - 1`. When the point is the value of
    /// tuple `k` itself, the upper bound is tightened to `r_max(k)`, which holds
    /// for streams without repeated values. The interval is at most
    /// `2 * epsilon * n` wide, so its midpoint is within `epsilon * n` of the
    /// true count. Returns `None` if the sketch is empty.
    pub fn rank_bounds(&self, points: &[f64]) -> Result<Option<Vec<(u64, u64)>>, Error> {
        check_points(points)?;
        if self.is_empty() {
            return Ok(None);
        }
        let min_ranks = self.min_ranks();
        let last = self.summary.len() - 1;

        let bounds = points
            .iter()
            .map(|&point| {
                let upto = self.summary.partition_point(|entry| entry.value <= point);
                if upto == 0 {
                    return (0, 0);
                }
                let k = upto - 1;
                if k == last {
                    return (self.n, self.n);
                }
                let lower = min_ranks[k];
                let next = self.summary[k + 1];
                let mut upper = min_ranks[k + 1] + next.delta - 1;
                let own = self.summary[k];
                if own.value == point {
                    upper = upper.min(lower + own.delta);
                }
                (lower, upper)
            })
            .collect();
        Ok(Some(bounds))
    }

    /// Returns the normalized rank `rank(x) / n` of each split point.
    ///
    /// Returns `None` if the sketch is empty.
    pub fn cdf(&self, split_points: &[f64]) -> Result<Option<Vec<f64>>, Error> {
        let n = self.n as f64;
        let ranks = self.ranks(split_points)?;
        Ok(ranks.map(|ranks| ranks.into_iter().map(|rank| rank as f64 / n).collect()))
    }

    /// Returns a value whose rank is within `epsilon * n` of `ceil(phi * n)`.
    ///
    /// Returns `None` if the sketch is empty.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
    /// phi is not in [0.0, 1.0].
    pub fn quantile(&self, phi: f64) -> Result<Option<f64>, Error> {
        if !(0.0..=1.0).contains(&phi) {
            return Err(Error::invalid_argument("phi must be in [0.0, 1.0]").with_context("phi", phi));
        }
        if self.is_empty() {
            return Ok(None);
        }

        let n = self.n as f64;
        let target = ((phi * n).ceil() as u64).max(1);
        if target >= self.n {
            return Ok(Some(self.max));
        }

        let target = target as f64;
        let slack = self.epsilon * n;
        let mut r_min = 0u64;
        for entry in &self.summary {
            r_min += entry.g;
            let r_max = r_min + entry.delta;
            if r_max as f64 - slack <= target && target <= r_min as f64 + slack {
                return Ok(Some(entry.value));
            }
        }
        Err(Error::invariant_violation("no summary tuple is within epsilon of the target rank")
            .with_context("phi", phi)
            .with_context("n", self.n))
    }

    /// Places `value` in the summary.
    ///
    /// A new interior tuple takes `g + delta - 1` of its successor, the tuple it
    /// is inserted in front of, rather than of its predecessor. The successor's
    /// rank bound is what limits the new value's rank, and this keeps
    /// `g + delta <= 2 * epsilon * n` for every tuple.
    fn update(&mut self, value: f64) -> Result<(), Error> {
        if self.summary.is_empty() {
            self.min = value;
            self.max = value;
            self.summary.push(SummaryEntry::new(value, 1, 0));
            return Ok(());
        }

        if value <= self.min {
            self.min = value;
            self.summary.insert(0, SummaryEntry::new(value, 1, 0));
        } else if value >= self.max {
            self.max = value;
            self.summary.push(SummaryEntry::new(value, 1, 0));
        } else {
            let idx = self.locate(value)?;
            let successor = self.summary[idx];
            let delta = successor.g + successor.delta - 1;
            self.summary.insert(idx, SummaryEntry::new(value, 1, delta));
        }
        Ok(())
    }

    fn min_ranks(&self) -> Vec<u64> {
        self.summary
            .iter()
            .scan(0u64, |r_min, entry| {
                *r_min += entry.g;
                Some(*r_min)
            })
            .collect()
    }

    /// Finds `i` with `summary[i - 1].value <= value < summary[i].value`.
    fn locate(&self, value: f64) -> Result<usize, Error> {
        let idx = self.summary.partition_point(|entry| entry.value <= value);
        if idx == 0 || idx >= self.summary.len() {
            return Err(Error::invariant_violation("no summary interval contains the value")
                .with_context("value", value)
                .with_context("retained", self.summary.len()));
        }
        Ok(idx)
    }

    /// Merges adjacent tuples whenever the Greenwald-Khanna rule allows it.
    ///
    /// Tuple `i` is absorbed, together with its descendants, into its right
    /// neighbor when its band does not exceed the neighbor's band and the
    /// combined coverage stays below `2 * epsilon * n`. The two smallest and
    /// two largest tuples are never touched.
    fn compress(&mut self) {
        let len = self.summary.len();
        if len < 6 {
            return;
        }

        let capacity = 2.0 * self.epsilon * self.n as f64;
        let p = capacity.floor() as u64;
        let mut bands: Vec<u32> = self.summary.iter().map(|e| band(e.delta, p)).collect();

        let mut i = len - 4;
        while i >= 2 {
            // descendants of i form the run directly to its left with lower bands
            let mut start = i;
            let mut g_star = self.summary[i].g;
            while start > 2 && bands[start - 1] < bands[i] {
                start -= 1;
                g_star += self.summary[start].g;
            }

            let next = self.summary[i + 1];
            if bands[i] <= bands[i + 1] && ((g_star + next.g + next.delta) as f64) < capacity {
                self.summary[i + 1].g += g_star;
                self.summary.drain(start..=i);
                bands.drain(start..=i);
                i = start - 1;
            } else {
                i -= 1;
            }
        }

        trace!(before = len, after = self.summary.len(), n = self.n, "compressed summary");
    }
}

fn check_points(points: &[f64]) -> Result<(), Error> {
    if let Some(idx) = points.iter().position(|point| point.is_nan()) {
        return Err(Error::invalid_argument("NaN has no rank").with_context("index", idx));
    }
    Ok(())
}
