//! Cell-ID bit-field decoding.
//!
//! Geometry identifiers pack several fields (subdetector, side, layer, ...)
//! into one 64-bit word. The layout is described by an encoding string of
//! comma-separated `name:width` or `name:offset:width` entries. A negative
//! width marks a signed field stored in two's complement. Fields without an
//! explicit offset start where the previous field ended.
#![allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]

use crate::error::ConfigError;

/// Encoding of tracker cell IDs.
pub const TRACKER_CELL_ID_ENCODING: &str = "system:5,side:-2,layer:6,module:11,sensor:8";

/// One field of a cell-ID encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Offset of the lowest bit.
    pub offset: u32,
    /// Width in bits.
    pub width: u32,
    /// Two's-complement signed field.
    pub signed: bool,
}

impl FieldDescriptor {
    #[inline]
    fn low_mask(&self) -> u64 {
        if self.width == 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    /// Extracts this field from a cell ID.
    #[inline]
    #[must_use]
    pub fn extract(&self, cell_id: u64) -> i64 {
        let mask = self.low_mask();
        let raw = (cell_id >> self.offset) & mask;
        if self.signed && (raw >> (self.width - 1)) & 1 == 1 {
            (raw | !mask) as i64
        } else {
            raw as i64
        }
    }
}

/// Decoder for a fixed cell-ID encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellIdDecoder {
    encoding: String,
    fields: Vec<FieldDescriptor>,
}

impl CellIdDecoder {
    /// Parses an encoding string.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidEncoding`] for malformed entries, zero or
    /// oversized widths, duplicate names or overlapping fields.
    pub fn new(encoding: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEncoding {
            encoding: encoding.to_string(),
            reason,
        };

        let mut fields: Vec<FieldDescriptor> = Vec::new();
        let mut used: u64 = 0;
        let mut next_offset: u32 = 0;

        for entry in encoding.split(',').map(str::trim) {
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            let (name, offset, width) = match parts.as_slice() {
                [name, width] => (*name, next_offset, *width),
                [name, offset, width] => {
                    let offset = offset
                        .parse::<u32>()
                        .map_err(|_| invalid(format!("bad offset in '{entry}'")))?;
                    (*name, offset, *width)
                }
                _ => return Err(invalid(format!("malformed field '{entry}'"))),
            };

            if name.is_empty() {
                return Err(invalid(format!("unnamed field '{entry}'")));
            }
            if fields.iter().any(|f| f.name == name) {
                return Err(invalid(format!("duplicate field '{name}'")));
            }

            let width = width
                .parse::<i32>()
                .map_err(|_| invalid(format!("bad width in '{entry}'")))?;
            let signed = width < 0;
            let width = width.unsigned_abs();
            if width == 0 || offset.checked_add(width).map_or(true, |end| end > 64) {
                return Err(invalid(format!("field '{name}' does not fit in 64 bits")));
            }

            let field = FieldDescriptor {
                name: name.to_string(),
                offset,
                width,
                signed,
            };
            let mask = field.low_mask() << offset;
            if used & mask != 0 {
                return Err(invalid(format!("field '{name}' overlaps another field")));
            }
            used |= mask;
            next_offset = offset + width;
            fields.push(field);
        }

        Ok(Self {
            encoding: encoding.to_string(),
            fields,
        })
    }

    /// Decoder for [`TRACKER_CELL_ID_ENCODING`].
    ///
    /// # Errors
    /// Never fails for the built-in encoding; the `Result` mirrors [`Self::new`].
    pub fn tracker() -> Result<Self, ConfigError> {
        Self::new(TRACKER_CELL_ID_ENCODING)
    }

    /// The encoding string this decoder was built from.
    #[must_use]
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Field descriptors in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Index of a named field.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownField`] if the encoding lacks the field.
    pub fn field_index(&self, name: &str) -> Result<usize, ConfigError> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| ConfigError::UnknownField(name.to_string()))
    }

    /// Decodes the field at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range; obtain it from [`Self::field_index`].
    #[inline]
    #[must_use]
    pub fn get(&self, cell_id: u64, index: usize) -> i64 {
        self.fields[index].extract(cell_id)
    }

    /// Decodes a field by name.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownField`] if the encoding lacks the field.
    pub fn value(&self, cell_id: u64, name: &str) -> Result<i64, ConfigError> {
        Ok(self.get(cell_id, self.field_index(name)?))
    }

    /// Packs field values into a cell ID. Unnamed fields are zero.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownField`] for names not in the encoding.
    pub fn encode(&self, values: &[(&str, i64)]) -> Result<u64, ConfigError> {
        let mut cell_id = 0u64;
        for (name, value) in values {
            let field = &self.fields[self.field_index(name)?];
            cell_id |= ((*value as u64) & field.low_mask()) << field.offset;
        }
        Ok(cell_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_layout() {
        let decoder = CellIdDecoder::tracker().unwrap();
        let offsets: Vec<(u32, u32)> = decoder
            .fields()
            .iter()
            .map(|f| (f.offset, f.width))
            .collect();
        assert_eq!(offsets, vec![(0, 5), (5, 2), (7, 6), (13, 11), (24, 8)]);
        assert!(decoder.fields()[1].signed);
    }

    #[test]
    fn test_decode_fields() {
        let decoder = CellIdDecoder::tracker().unwrap();
        // system=3, side=-1, layer=5, module=17, sensor=2
        let cell_id = 3 | (0b11 << 5) | (5 << 7) | (17 << 13) | (2 << 24);
        assert_eq!(decoder.value(cell_id, "system").unwrap(), 3);
        assert_eq!(decoder.value(cell_id, "side").unwrap(), -1);
        assert_eq!(decoder.value(cell_id, "layer").unwrap(), 5);
        assert_eq!(decoder.value(cell_id, "module").unwrap(), 17);
        assert_eq!(decoder.value(cell_id, "sensor").unwrap(), 2);
    }

    #[test]
    fn test_encode_decode_signed() {
        let decoder = CellIdDecoder::tracker().unwrap();
        let cell_id = decoder
            .encode(&[("system", 30), ("side", -2), ("layer", 63)])
            .unwrap();
        assert_eq!(decoder.value(cell_id, "system").unwrap(), 30);
        assert_eq!(decoder.value(cell_id, "side").unwrap(), -2);
        assert_eq!(decoder.value(cell_id, "layer").unwrap(), 63);
        assert_eq!(decoder.value(cell_id, "module").unwrap(), 0);
    }

    #[test]
    fn test_explicit_offsets() {
        let decoder = CellIdDecoder::new("system:0:8,barrel:8:2,layer:16:4").unwrap();
        assert_eq!(decoder.value(0x0003_0000, "layer").unwrap(), 3);
    }

    #[test]
    fn test_invalid_encodings() {
        for bad in [
            "system",
            "system:0",
            "system:x",
            "system:40,layer:30",
            "a:4,a:4",
            "a:0:8,b:4:8",
            ":4",
        ] {
            assert!(
                matches!(
                    CellIdDecoder::new(bad),
                    Err(ConfigError::InvalidEncoding { .. })
                ),
                "accepted '{bad}'"
            );
        }
    }

    #[test]
    fn test_unknown_field() {
        let decoder = CellIdDecoder::tracker().unwrap();
        assert_eq!(
            decoder.field_index("stave"),
            Err(ConfigError::UnknownField("stave".to_string()))
        );
    }
}
