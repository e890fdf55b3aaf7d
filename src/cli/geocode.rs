//! Geocode command handler
//!
//! Reverse geocodes one coordinate with the configured provider.

use crate::config::Config;
use crate::error::Result;
use crate::geocode::mapbox::MapboxGeocoder;
use crate::geocode::{GeocodeResult, ReverseGeocoder};
use crate::geometry::Point;
use clap::Args;

/// Geocode command arguments
#[derive(Args)]
pub struct GeocodeArgs {
    /// Longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Render a lookup result as text
fn format_text(point: &Point, result: &GeocodeResult) -> String {
    let mut lines = vec![format!("coordinate: {}", point)];

    match result {
        GeocodeResult::Found(address) => {
            let fields = [
                ("direccion", &address.direccion),
                ("ciudad", &address.ciudad),
                ("zona", &address.zona),
                ("pais", &address.pais),
            ];
            for (name, value) in fields {
                lines.push(format!("{:<11} {}", format!("{}:", name), value.as_deref().unwrap_or("-")));
            }
        }
        GeocodeResult::Empty => lines.push("no address found".to_string()),
        GeocodeResult::NetworkError(reason) => lines.push(format!("lookup failed: {}", reason)),
    }

    lines.join("\n")
}

/// Run the geocode command
pub async fn run(args: GeocodeArgs) -> Result<()> {
    let config = Config::load()?;
    let point = Point::new(args.lng, args.lat)?;

    let geocoder = MapboxGeocoder::new(&config.geocoder)?;
    if !geocoder.has_token() {
        eprintln!("Warning: no access token; set geocoder.access_token or MAPBOX_ACCESS_TOKEN");
    }

    let result = geocoder.reverse_geocode(point).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", format_text(&point, &result));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::AddressInfo;

    #[test]
    fn test_format_found() {
        let point = Point::new(-74.08, 4.6).unwrap();
        let result = GeocodeResult::Found(AddressInfo {
            direccion: Some("Carrera 7".to_string()),
            ciudad: Some("Bogotá".to_string()),
            pais: None,
            zona: None,
        });

        let text = format_text(&point, &result);
        assert!(text.contains("coordinate: -74.08, 4.6"));
        assert!(text.contains("direccion:  Carrera 7"));
        assert!(text.contains("ciudad:     Bogotá"));
        assert!(text.contains("pais:       -"));
    }

    #[test]
    fn test_format_failures() {
        let point = Point::new(0.0, 0.0).unwrap();
        assert!(format_text(&point, &GeocodeResult::Empty).contains("no address found"));
        assert!(format_text(&point, &GeocodeResult::NetworkError("503".to_string()))
            .contains("lookup failed: 503"));
    }
}
