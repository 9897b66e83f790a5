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

//! Greenwald-Khanna sketch for epsilon-approximate quantiles and ranks.
//!
//! The sketch keeps an ordered summary of `(value, g, delta)` tuples over a
//! stream of `f64` values. For a stream of `n` items, a quantile query returns
//! a value whose true rank is within `epsilon * n` of the requested rank, while
//! the summary holds `O((1 / epsilon) * log(epsilon * n))` tuples.
//!
//! The sketch is single-writer: [`QuantileSketch::insert`] takes `&mut self`.
//! Rank and quantile queries take `&self` and can run from many readers once
//! the sketch is shared immutably.
//!
//! # Usage
//!
//! ```rust
//! # use driftsketch::gk::QuantileSketch;
//! let mut sketch = QuantileSketch::new(0.01);
//! for i in 0..1000 {
//!     sketch.insert(i as f64).unwrap();
//! }
//! let median = sketch.quantile(0.5).unwrap().unwrap();
//! assert!((median - 500.0).abs() <= 0.01 * 1000.0 + 1.0);
//! ```

mod helper;
mod sketch;

pub use self::sketch::QuantileSketch;
pub use self::sketch::SummaryEntry;

/// Default accuracy parameter.
pub const DEFAULT_EPSILON: f64 = 0.001;
