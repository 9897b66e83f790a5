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

//! Dense `f64` tensors with an explicit shape.
//!
//! Axis 0 indexes samples and axis 1 indexes channels; any further axes are
//! flattened into each `(sample, channel)` block in row-major order.

use crate::codec::read_f64_le;
use crate::error::Error;

/// A dense, immutable, row-major tensor of at least two dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Tensor {
    /// Creates a tensor from its shape and row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
    /// the shape has fewer than two axes, if `data` does not hold exactly the
    /// product of the shape, or if any value is not finite.
    ///
    /// # Examples
    ///
    /// ```
    /// # use driftsketch::tensor::Tensor;
    /// // two samples, three channels, 2x2 pixels
    /// let tensor = Tensor::new(vec![2, 3, 2, 2], vec![0.5; 24]).unwrap();
    /// assert_eq!(tensor.num_channels(), 3);
    /// assert_eq!(tensor.channel(1).len(), 8);
    /// ```
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self, Error> {
        let expected = element_count(&shape)?;
        if data.len() != expected {
            return Err(Error::invalid_argument("data length does not match shape")
                .with_context("shape", format!("{shape:?}"))
                .with_context("expected", expected)
                .with_context("actual", data.len()));
        }
        if let Some(idx) = data.iter().position(|v| !v.is_finite()) {
            return Err(Error::invalid_argument("tensor contains a non-finite value")
                .with_context("index", idx));
        }
        Ok(Self { shape, data })
    }

    /// Decodes a tensor from a raw buffer of little-endian `f64` values.
    pub fn from_le_bytes(shape: Vec<usize>, bytes: &[u8]) -> Result<Self, Error> {
        let count = element_count(&shape)?;
        let data = read_f64_le(bytes, count)?;
        Self::new(shape, data)
    }

    /// Returns the shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the row-major data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Returns the total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the size of axis 0.
    pub fn num_samples(&self) -> usize {
        self.shape[0]
    }

    /// Returns the size of the channel axis.
    pub fn num_channels(&self) -> usize {
        self.shape[1]
    }

    /// Returns the number of elements in one channel across all samples.
    pub fn channel_len(&self) -> usize {
        self.num_samples() * self.block_len()
    }

    /// Returns every element of one channel, sample by sample.
    ///
    /// # Panics
    ///
    /// Panics if `channel` is out of range.
    pub fn channel(&self, channel: usize) -> Vec<f64> {
        let channels = self.num_channels();
        assert!(
            channel < channels,
            "channel must be < {channels}, got {channel}"
        );
        let block = self.block_len();
        let mut values = Vec::with_capacity(self.channel_len());
        for sample in 0..self.num_samples() {
            let start = (sample * channels + channel) * block;
            values.extend_from_slice(&self.data[start..start + block]);
        }
        values
    }

    /// Gathers the given samples along axis 0 into a new tensor.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range.
    pub fn select(&self, samples: &[usize]) -> Tensor {
        let stride = self.num_channels() * self.block_len();
        let mut data = Vec::with_capacity(samples.len() * stride);
        for &sample in samples {
            assert!(
                sample < self.num_samples(),
                "sample must be < {}, got {sample}",
                self.num_samples()
            );
            let start = sample * stride;
            data.extend_from_slice(&self.data[start..start + stride]);
        }
        let mut shape = self.shape.clone();
        shape[0] = samples.len();
        Tensor { shape, data }
    }

    /// Elements in one `(sample, channel)` block.
    fn block_len(&self) -> usize {
        self.shape[2..].iter().product()
    }
}

fn element_count(shape: &[usize]) -> Result<usize, Error> {
    if shape.len() < 2 {
        return Err(Error::invalid_argument("tensor needs a sample axis and a channel axis")
            .with_context("shape", format!("{shape:?}")));
    }
    shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| {
            Error::invalid_argument("tensor size overflows").with_context("shape", format!("{shape:?}"))
        })
}
