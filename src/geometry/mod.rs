//! Point geometry codec
//!
//! Converts between [`Point`] and the two forms a spatial column can hold:
//! - well-known text (`POINT(lng lat)`, optionally `SRID=n;` prefixed)
//! - hex-encoded extended well-known binary (byte order flag, type code,
//!   optional SRID, two doubles)
//!
//! Decoding never panics. Every malformed input maps to a [`DecodeFailure`]
//! so the rendering path can skip the value instead of crashing.

pub mod ewkb;
pub mod wkt;

use crate::constants::geo::{MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use ewkb::{encode_ewkb_hex, ByteCursor, ByteOrder};
pub use wkt::{encode_ewkt, encode_with_precision, DEFAULT_PRECISION};

/// A validated geographic point (longitude, latitude) in degrees
///
/// Fields are private so that every `Point` in the program satisfies the
/// range invariant. Use [`Point::new`] to build one from untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct Point {
    lng: f64,
    lat: f64,
}

/// Unvalidated wire shape of a point, used only for deserialization
#[derive(Debug, Deserialize)]
struct RawPoint {
    lng: f64,
    lat: f64,
}

impl TryFrom<RawPoint> for Point {
    type Error = crate::error::Error;

    fn try_from(raw: RawPoint) -> Result<Self> {
        Point::new(raw.lng, raw.lat)
    }
}

impl Point {
    /// Create a point, validating the coordinate ranges
    ///
    /// Longitude: -180 to 180
    /// Latitude: -90 to 90
    pub fn new(lng: f64, lat: f64) -> Result<Self> {
        if !lng.is_finite() || !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&lng) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                lng
            )));
        }
        if !lat.is_finite() || !(MIN_LATITUDE..=MAX_LATITUDE).contains(&lat) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                lat
            )));
        }
        Ok(Self { lng, lat })
    }

    /// Longitude in degrees
    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Latitude in degrees
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Build a point from decoded coordinates, mapping range errors to a decode failure
    pub(crate) fn decoded(lng: f64, lat: f64) -> std::result::Result<Self, DecodeFailure> {
        Self::new(lng, lat).map_err(|_| DecodeFailure::OutOfRange { lng, lat })
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.lng, self.lat)
    }
}

/// Why a stored geometry value could not be turned into a [`Point`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeFailure {
    #[error("empty geometry value")]
    Empty,

    #[error("malformed point text: {0}")]
    Syntax(String),

    #[error("invalid coordinate number: {0:?}")]
    InvalidNumber(String),

    #[error("invalid hex payload: {0}")]
    InvalidHex(String),

    #[error("unknown byte order flag: {0}")]
    UnknownByteOrder(u8),

    #[error("unsupported geometry type code: {0:#010x}")]
    UnsupportedGeometry(u32),

    #[error("truncated geometry: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("{0} unexpected trailing bytes after point")]
    TrailingBytes(usize),

    #[error("coordinates out of range: lng {lng}, lat {lat}")]
    OutOfRange { lng: f64, lat: f64 },
}

/// Which wire form a stored geometry value uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", content = "value", rename_all = "snake_case")]
pub enum GeometryWireValue {
    /// Well-known text, e.g. `POINT(-74.08 4.6)`
    Text(String),
    /// Hex-encoded EWKB, e.g. `0101000000...`
    Binary(String),
}

impl GeometryWireValue {
    /// Classify a raw stored value by its leading keyword
    pub fn classify(raw: &str) -> Self {
        if wkt::looks_like_text(raw) {
            Self::Text(raw.to_string())
        } else {
            Self::Binary(raw.to_string())
        }
    }

    /// Short name of the form ("text" or "binary")
    pub fn form(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
        }
    }

    /// Decode this value into a point
    pub fn decode(&self) -> std::result::Result<Point, DecodeFailure> {
        match self {
            Self::Text(text) => wkt::decode_text(text),
            Self::Binary(hex) => ewkb::decode_hex(hex),
        }
    }
}

/// Decode a stored geometry value in either wire form
pub fn decode(wire: &str) -> std::result::Result<Point, DecodeFailure> {
    if wire.trim().is_empty() {
        return Err(DecodeFailure::Empty);
    }
    GeometryWireValue::classify(wire).decode()
}

/// Encode a point as well-known text for storage
///
/// Always pads to [`DEFAULT_PRECISION`] digits; `codec.precision` only
/// applies to the CLI and HTTP encode paths via [`encode_with_precision`].
pub fn encode(point: &Point) -> String {
    wkt::encode_with_precision(point, DEFAULT_PRECISION)
}

/// Decode a batch of stored values, keeping only those that decode
///
/// Failures are logged and skipped; the rendering path draws what it can.
pub fn decode_many<'a, I>(values: I) -> Vec<Point>
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .filter_map(|wire| match decode(wire) {
            Ok(point) => Some(point),
            Err(e) => {
                debug!("Skipping undecodable geometry {:?}: {}", wire, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const LE_POINT: &str = "010100000085EB51B81E8552C06666666666661240";
    const LE_POINT_SRID: &str = "0101000020E610000085EB51B81E8552C06666666666661240";

    #[test]
    fn test_point_validation() {
        assert!(Point::new(-74.08, 4.60).is_ok());
        assert!(Point::new(180.0, 90.0).is_ok());
        assert!(Point::new(-180.0, -90.0).is_ok());
        assert!(Point::new(180.1, 0.0).is_err());
        assert!(Point::new(0.0, -90.5).is_err());
        assert!(Point::new(f64::NAN, 0.0).is_err());
        assert!(Point::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_point_deserialize_validates() {
        let ok: Point = serde_json::from_str(r#"{"lng": -74.08, "lat": 4.6}"#).unwrap();
        assert_eq!(ok.lng(), -74.08);

        let bad = serde_json::from_str::<Point>(r#"{"lng": 0.0, "lat": 95.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_decode_dispatches_on_form() {
        let text = decode("POINT(-74.08 4.6)").unwrap();
        let binary = decode(LE_POINT).unwrap();
        assert_eq!(text, binary);
    }

    #[test]
    fn test_decode_srid_payload_matches_plain() {
        assert_eq!(decode(LE_POINT).unwrap(), decode(LE_POINT_SRID).unwrap());
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode(""), Err(DecodeFailure::Empty));
        assert_eq!(decode("   "), Err(DecodeFailure::Empty));
    }

    #[test]
    fn test_classify() {
        assert_eq!(GeometryWireValue::classify("POINT(1 2)").form(), "text");
        assert_eq!(GeometryWireValue::classify("  point (1 2)").form(), "text");
        assert_eq!(GeometryWireValue::classify("SRID=4326;POINT(1 2)").form(), "text");
        assert_eq!(GeometryWireValue::classify(LE_POINT).form(), "binary");
    }

    #[test]
    fn test_round_trip() {
        let samples = [
            (0.0, 0.0),
            (-74.08, 4.60),
            (180.0, 90.0),
            (-180.0, -90.0),
            (13.404954, 52.520008),
            (-0.000001, 0.0000001),
            (151.2092955, -33.8688197),
            (1.0 / 3.0, -2.0 / 3.0),
        ];

        for (lng, lat) in samples {
            let point = Point::new(lng, lat).unwrap();
            let decoded = decode(&encode(&point)).unwrap();
            assert_abs_diff_eq!(decoded.lng(), lng, epsilon = 1e-12);
            assert_abs_diff_eq!(decoded.lat(), lat, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_decode_many_skips_failures() {
        let points = decode_many(["POINT(1 2)", "", "POINT(1)", LE_POINT, "0101"]);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], Point::new(1.0, 2.0).unwrap());
    }

    #[test]
    fn test_wire_value_serialization() {
        let value = GeometryWireValue::Text("POINT(1 2)".to_string());
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"form":"text","value":"POINT(1 2)"}"#);
    }
}
