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

//! Error types for drift detection operations.

use std::fmt;

/// Category of an [`Error`].
///
/// Every kind is surfaced to the caller immediately; nothing in this crate
/// retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The inputs do not share a schema: a column has no fitted sketch, or two
    /// tensors have different shapes.
    SchemaMismatch,
    /// A parameter or an input value is outside its valid domain.
    InvalidArgument,
    /// An internal invariant was broken. This indicates a bug, never bad input.
    InternalInvariantViolation,
}

impl ErrorKind {
    /// Returns the name of this kind.
    pub const fn into_static(self) -> &'static str {
        match self {
            ErrorKind::SchemaMismatch => "SchemaMismatch",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::InternalInvariantViolation => "InternalInvariantViolation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.into_static())
    }
}

/// Error returned by every fallible driftsketch operation.
///
/// Besides its [`ErrorKind`] and message, an error may carry key/value context
/// (the offending column, shape or parameter) and an underlying source.
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl Error {
    /// Creates an error without context or source.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::new(),
            source: None,
        }
    }

    /// Appends a key/value pair describing where the error happened.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Attaches the lower-level error that caused this one, replacing any
    /// previous source.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::error::Error as _;
    /// use driftsketch::error::{Error, ErrorKind};
    ///
    /// let error = Error::new(ErrorKind::InvalidArgument, "tensor buffer is truncated");
    /// assert!(error.source().is_none());
    /// let error = error.set_source(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"));
    /// assert!(error.source().is_some());
    /// ```
    pub fn set_source(mut self, src: impl Into<anyhow::Error>) -> Self {
        self.source = Some(src.into());
        self
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the value recorded for a context key, if any.
    pub fn context(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    fn write_context(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.context.iter().enumerate() {
            let sep = if i == 0 { "" } else { ", " };
            write!(f, "{sep}{k}: {v}")?;
        }
        Ok(())
    }
}

impl Error {
    pub(crate) fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaMismatch, message)
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub(crate) fn invariant_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalInvariantViolation, message)
    }

    pub(crate) fn missing_column(name: &str) -> Self {
        Self::schema_mismatch("column has no fitted reference").with_context("column", name)
    }

    pub(crate) fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::schema_mismatch("tensor shapes differ")
            .with_context("expected", format!("{expected:?}"))
            .with_context("actual", format!("{actual:?}"))
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return f
                .debug_struct("Error")
                .field("kind", &self.kind)
                .field("message", &self.message)
                .field("context", &self.context)
                .field("source", &self.source)
                .finish();
        }

        write!(f, "{}: {}", self.kind, self.message)?;
        if !self.context.is_empty() {
            f.write_str("\n    context: ")?;
            self.write_context(f)?;
        }
        if let Some(source) = &self.source {
            write!(f, "\n    caused by: {source:#}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.context.is_empty() {
            f.write_str(", context: { ")?;
            self.write_context(f)?;
            f.write_str(" }")?;
        }
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, ", source: {source}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|source| source.as_ref())
    }
}
