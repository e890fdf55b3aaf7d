//! Reverse geocoding
//!
//! Turns a [`Point`] into address components. The provider response is
//! validated once at the network boundary and reduced to a [`GeocodeResult`];
//! nothing downstream touches raw JSON.

pub mod mapbox;

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Address components attached to a selected location
///
/// Each field is independently optional. `None` means the provider returned
/// no matching feature for it, not that the lookup failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInfo {
    /// Full formatted address (`place_name` of the best feature)
    pub direccion: Option<String>,
    /// City, from the first `place` context entry
    pub ciudad: Option<String>,
    /// Country, from the first `country` context entry
    pub pais: Option<String>,
    /// Neighborhood, from the first `neighborhood` context entry
    pub zona: Option<String>,
}

impl AddressInfo {
    /// Whether no component is present
    pub fn is_empty(&self) -> bool {
        self.direccion.is_none() && self.ciudad.is_none() && self.pais.is_none() && self.zona.is_none()
    }
}

/// Outcome of a reverse geocode lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum GeocodeResult {
    /// The provider matched at least one feature
    Found(AddressInfo),
    /// The provider answered but had no features for the coordinate
    Empty,
    /// Transport failure, non-2xx status or an unreadable body
    NetworkError(String),
}

impl GeocodeResult {
    /// The address, if one was found
    pub fn found(&self) -> Option<&AddressInfo> {
        match self {
            Self::Found(address) => Some(address),
            _ => None,
        }
    }

    /// Address components, all `None` unless the lookup found a feature
    pub fn into_address_info(self) -> AddressInfo {
        match self {
            Self::Found(address) => address,
            Self::Empty | Self::NetworkError(_) => AddressInfo::default(),
        }
    }
}

/// Trait for reverse geocoding backends
///
/// Lookups are infallible at the type level: every failure is folded into
/// [`GeocodeResult::NetworkError`] so a click never surfaces as an error.
pub trait ReverseGeocoder: Send + Sync {
    /// Backend name, for logs and status output
    fn name(&self) -> &'static str;

    /// Resolve a point to address components
    fn reverse_geocode(
        &self,
        point: Point,
    ) -> impl std::future::Future<Output = GeocodeResult> + Send;
}
