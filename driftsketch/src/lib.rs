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

//! Streaming quantile sketches and drift hypothesis tests.
//!
//! This crate compares newly observed data against a reference distribution:
//!
//! - [`gk`]: Greenwald-Khanna epsilon-approximate quantile sketch.
//! - [`ks`]: exact and sketch-based two-sample Kolmogorov-Smirnov tests over
//!   named numeric columns.
//! - [`divergence`]: Jensen-Shannon divergence tests over tensor batches, and
//!   threshold calibration from reference data.
//!
//! All computations are synchronous and free of I/O. Inputs that do not fit
//! together fail with [`ErrorKind::SchemaMismatch`](error::ErrorKind), bad
//! parameters with `InvalidArgument`, and samples too small to test produce a
//! neutral, non-rejecting result.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod codec;

pub mod common;
pub mod divergence;
pub mod error;
pub mod frame;
pub mod gk;
pub mod ks;
pub mod tensor;
