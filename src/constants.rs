//! Centralized constants for the facility-geo crate

/// Geographic constants
pub mod geo {
    /// Smallest valid longitude in degrees
    pub const MIN_LONGITUDE: f64 = -180.0;

    /// Largest valid longitude in degrees
    pub const MAX_LONGITUDE: f64 = 180.0;

    /// Smallest valid latitude in degrees
    pub const MIN_LATITUDE: f64 = -90.0;

    /// Largest valid latitude in degrees
    pub const MAX_LATITUDE: f64 = 90.0;
}

/// Well-known binary layout constants
pub mod wkb {
    /// Byte order flag for big-endian (XDR) payloads
    pub const BIG_ENDIAN: u8 = 0;

    /// Byte order flag for little-endian (NDR) payloads
    pub const LITTLE_ENDIAN: u8 = 1;

    /// Geometry type code for a 2D point
    pub const POINT_TYPE: u32 = 1;

    /// Type code flag announcing a 4-byte SRID after the type code
    pub const SRID_FLAG: u32 = 0x2000_0000;

    /// Type code flag for a Z coordinate
    pub const Z_FLAG: u32 = 0x8000_0000;

    /// Type code flag for an M coordinate
    pub const M_FLAG: u32 = 0x4000_0000;

    /// Mask selecting the base geometry type from a type code
    pub const TYPE_MASK: u32 = 0x0000_FFFF;

    /// Byte length of a 2D point without an SRID (1 + 4 + 8 + 8)
    pub const POINT_LEN: usize = 21;

    /// Byte length of a 2D point with an SRID (1 + 4 + 4 + 8 + 8)
    pub const POINT_WITH_SRID_LEN: usize = 25;
}

/// External API endpoints
pub mod api {
    /// Mapbox API host
    pub const MAPBOX_URL: &str = "https://api.mapbox.com";

    /// Path of the Mapbox places endpoint, relative to the host
    pub const MAPBOX_PLACES_PATH: &str = "geocoding/v5/mapbox.places";

    /// Environment variable consulted when no access token is configured
    pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";
}
