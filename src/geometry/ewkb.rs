//! Hex-encoded extended well-known binary (EWKB) points
//!
//! Layout of a 2D point:
//!
//! ```text
//! [order: u8][type: u32][srid: u32 if type & 0x20000000][lng: f64][lat: f64]
//! ```
//!
//! Multi-byte fields use the byte order announced by the first byte.

use crate::constants::wkb::{
    BIG_ENDIAN, LITTLE_ENDIAN, M_FLAG, POINT_TYPE, SRID_FLAG, TYPE_MASK, Z_FLAG,
};
use crate::geometry::{DecodeFailure, Point};
use serde::{Deserialize, Serialize};

/// Byte order of multi-byte fields in a binary payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// NDR, flag value 1
    #[default]
    LittleEndian,
    /// XDR, flag value 0
    BigEndian,
}

impl ByteOrder {
    /// Interpret a byte order flag
    pub fn from_flag(flag: u8) -> Result<Self, DecodeFailure> {
        match flag {
            LITTLE_ENDIAN => Ok(Self::LittleEndian),
            BIG_ENDIAN => Ok(Self::BigEndian),
            other => Err(DecodeFailure::UnknownByteOrder(other)),
        }
    }

    /// The flag byte for this order
    pub fn flag(self) -> u8 {
        match self {
            Self::LittleEndian => LITTLE_ENDIAN,
            Self::BigEndian => BIG_ENDIAN,
        }
    }
}

/// Sequential reader over a byte slice
///
/// Every read checks the remaining length and reports truncation as a
/// [`DecodeFailure`] instead of panicking.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at offset 0, reading little-endian until told otherwise
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            order: ByteOrder::LittleEndian,
        }
    }

    /// Set the byte order used by subsequent multi-byte reads
    pub fn set_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    /// Current offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeFailure> {
        let end = self.pos + N;
        let slice = self.bytes.get(self.pos..end).ok_or(DecodeFailure::Truncated {
            offset: self.pos,
            needed: N,
            available: self.remaining(),
        })?;

        let mut buf = [0u8; N];
        buf.copy_from_slice(slice);
        self.pos = end;
        Ok(buf)
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8, DecodeFailure> {
        let [b] = self.take::<1>()?;
        Ok(b)
    }

    /// Read a u32 in the cursor's byte order
    pub fn read_u32(&mut self) -> Result<u32, DecodeFailure> {
        let buf = self.take::<4>()?;
        Ok(match self.order {
            ByteOrder::LittleEndian => u32::from_le_bytes(buf),
            ByteOrder::BigEndian => u32::from_be_bytes(buf),
        })
    }

    /// Read an IEEE-754 double in the cursor's byte order
    pub fn read_f64(&mut self) -> Result<f64, DecodeFailure> {
        let buf = self.take::<8>()?;
        Ok(match self.order {
            ByteOrder::LittleEndian => f64::from_le_bytes(buf),
            ByteOrder::BigEndian => f64::from_be_bytes(buf),
        })
    }

    /// Skip `n` bytes
    pub fn skip(&mut self, n: usize) -> Result<(), DecodeFailure> {
        if self.remaining() < n {
            return Err(DecodeFailure::Truncated {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        self.pos += n;
        Ok(())
    }
}

/// Strip `0x` (or the PostgreSQL `\x` bytea escape) and hex-decode
fn hex_payload(raw: &str) -> Result<Vec<u8>, DecodeFailure> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .or_else(|| trimmed.strip_prefix("\\x"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(DecodeFailure::InvalidHex("no bytes".to_string()));
    }

    hex::decode(digits).map_err(|e| match e {
        hex::FromHexError::OddLength => DecodeFailure::InvalidHex("odd number of digits".to_string()),
        other => DecodeFailure::InvalidHex(other.to_string()),
    })
}

/// Decode a point from raw EWKB bytes
pub fn decode_bytes(bytes: &[u8]) -> Result<Point, DecodeFailure> {
    let mut cursor = ByteCursor::new(bytes);

    let order = ByteOrder::from_flag(cursor.read_u8()?)?;
    cursor.set_order(order);

    let type_code = cursor.read_u32()?;
    if type_code & TYPE_MASK != POINT_TYPE || type_code & (Z_FLAG | M_FLAG) != 0 {
        return Err(DecodeFailure::UnsupportedGeometry(type_code));
    }
    if type_code & SRID_FLAG != 0 {
        cursor.skip(4)?;
    }

    let lng = cursor.read_f64()?;
    let lat = cursor.read_f64()?;

    if cursor.remaining() > 0 {
        return Err(DecodeFailure::TrailingBytes(cursor.remaining()));
    }

    Point::decoded(lng, lat)
}

/// Decode a point from a hex-encoded EWKB string
pub fn decode_hex(raw: &str) -> Result<Point, DecodeFailure> {
    decode_bytes(&hex_payload(raw)?)
}

/// Encode a point as raw EWKB bytes
pub fn encode_bytes(point: &Point, order: ByteOrder, srid: Option<u32>) -> Vec<u8> {
    let type_code = match srid {
        Some(_) => POINT_TYPE | SRID_FLAG,
        None => POINT_TYPE,
    };

    let mut out = Vec::with_capacity(25);
    out.push(order.flag());
    match order {
        ByteOrder::LittleEndian => {
            out.extend_from_slice(&type_code.to_le_bytes());
            if let Some(srid) = srid {
                out.extend_from_slice(&srid.to_le_bytes());
            }
            out.extend_from_slice(&point.lng().to_le_bytes());
            out.extend_from_slice(&point.lat().to_le_bytes());
        }
        ByteOrder::BigEndian => {
            out.extend_from_slice(&type_code.to_be_bytes());
            if let Some(srid) = srid {
                out.extend_from_slice(&srid.to_be_bytes());
            }
            out.extend_from_slice(&point.lng().to_be_bytes());
            out.extend_from_slice(&point.lat().to_be_bytes());
        }
    }
    out
}

/// Encode a point as upper-case hex EWKB, the form PostGIS prints
pub fn encode_ewkb_hex(point: &Point, order: ByteOrder, srid: Option<u32>) -> String {
    hex::encode_upper(encode_bytes(point, order, srid))
}
