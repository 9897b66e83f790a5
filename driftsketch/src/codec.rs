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

use std::io::Cursor;

use byteorder::LittleEndian;
use byteorder::ReadBytesExt;

use crate::error::Error;

const F64_SIZE: usize = 8;

/// Decodes exactly `count` little-endian `f64` values from `bytes`.
pub(crate) fn read_f64_le(bytes: &[u8], count: usize) -> Result<Vec<f64>, Error> {
    let expected = count.checked_mul(F64_SIZE).ok_or_else(|| {
        Error::invalid_argument("buffer size overflows").with_context("count", count)
    })?;
    if bytes.len() > expected {
        return Err(Error::invalid_argument("buffer has trailing bytes")
            .with_context("expected", expected)
            .with_context("actual", bytes.len()));
    }

    let mut cursor = Cursor::new(bytes);
    let mut values = vec![0.0; count];
    cursor.read_f64_into::<LittleEndian>(&mut values).map_err(|err| {
        Error::invalid_argument("buffer is truncated")
            .with_context("expected", expected)
            .with_context("actual", bytes.len())
            .set_source(err)
    })?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn encode(values: &[f64]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_read_values() {
        let bytes = encode(&[1.5, -2.0, 0.0]);
        assert_eq!(read_f64_le(&bytes, 3).unwrap(), vec![1.5, -2.0, 0.0]);
    }

    #[test]
    fn test_truncated_buffer() {
        let bytes = encode(&[1.5, -2.0]);
        let err = read_f64_le(&bytes[..12], 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_trailing_bytes() {
        let bytes = encode(&[1.5, -2.0]);
        let err = read_f64_le(&bytes, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
