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

//! Named-column batches handed to the KS tests.

use crate::error::Error;

/// Values of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Numeric values, tested for drift.
    Numeric(Vec<f64>),
    /// Non-numeric values, ignored by the KS tests.
    Categorical(Vec<String>),
}

impl ColumnData {
    /// Returns the numeric values, or `None` for a categorical column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            ColumnData::Numeric(values) => Some(values.as_slice()),
            ColumnData::Categorical(_) => None,
        }
    }

    /// Returns the number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    /// Returns true if the column holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An ordered collection of uniquely named columns.
///
/// # Examples
///
/// ```
/// # use driftsketch::frame::{ColumnData, Frame};
/// let frame = Frame::new()
///     .with_column("age", ColumnData::Numeric(vec![31.0, 45.0]))
///     .unwrap()
///     .with_column("city", ColumnData::Categorical(vec!["a".into(), "b".into()]))
///     .unwrap();
/// let numeric: Vec<&str> = frame.numeric_columns().map(|(name, _)| name).collect();
/// assert_eq!(numeric, ["age"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<(String, ColumnData)>,
}

impl Frame {
    /// Creates a frame without columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if a
    /// column with the same name already exists.
    pub fn with_column(mut self, name: impl Into<String>, data: ColumnData) -> Result<Self, Error> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(Error::invalid_argument("duplicate column name").with_context("column", name));
        }
        self.columns.push((name, data));
        Ok(self)
    }

    /// Appends a numeric column.
    pub fn with_numeric(self, name: impl Into<String>, values: Vec<f64>) -> Result<Self, Error> {
        self.with_column(name, ColumnData::Numeric(values))
    }

    /// Returns the column with the given name.
    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, data)| data)
    }

    /// Returns the column names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates over numeric columns only, in insertion order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .filter_map(|(name, data)| data.as_numeric().map(|values| (name.as_str(), values)))
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}
