//! Default configuration values

use crate::constants::api::MAPBOX_URL;

/// Default geocoding provider base URL
pub const DEFAULT_GEOCODER_URL: &str = MAPBOX_URL;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7979;

/// Default minimum fractional digits in encoded point text
pub const DEFAULT_PRECISION: usize = crate::geometry::DEFAULT_PRECISION;

/// Fewest fractional digits `codec.precision` may request
pub const MIN_PRECISION: usize = DEFAULT_PRECISION;

/// Most fractional digits `codec.precision` may request
pub const MAX_PRECISION: usize = 17;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "facility-geo";
