//! facility-geo: spatial location subsystem for a facility console
//!
//! Places facilities and parking spaces on a map.
//!
//! ## Features
//!
//! - Point geometry codec: well-known text and hex EWKB (either byte order,
//!   optional SRID), decoding without panics
//! - Reverse geocoding through a Mapbox-style places endpoint
//! - Click-to-locate picker where the last click wins, even when lookups
//!   complete out of order
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use facility_geo::geometry::{self, Point};
//!
//! let stored = "0101000020E610000085EB51B81E8552C06666666666661240";
//! let point = geometry::decode(stored).unwrap();
//! assert_eq!(point, Point::new(-74.08, 4.60).unwrap());
//!
//! let text = geometry::encode(&point);
//! assert_eq!(text, "POINT(-74.080000 4.600000)");
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod geocode;
pub mod geometry;
pub mod picker;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use geocode::{AddressInfo, GeocodeResult, ReverseGeocoder};
pub use geometry::{DecodeFailure, GeometryWireValue, Point};
pub use picker::{LocationPicker, LocationSelection, PickerState};
