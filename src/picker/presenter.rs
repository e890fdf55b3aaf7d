//! Map presenter seam
//!
//! The mapping component is external. The picker only ever writes to it:
//! move the marker, show a popup. It is never read back as a source of truth.

use crate::geocode::AddressInfo;
use crate::geometry::Point;
use tracing::debug;

/// Write-only surface of an interactive map
pub trait MapPresenter: Send {
    /// Place (or move) the selection marker
    fn set_marker(&mut self, point: Point);

    /// Show an informational popup at the marker
    fn show_popup(&mut self, html: &str);
}

/// Presenter for headless use (CLI, HTTP API) that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPresenter;

impl MapPresenter for TracingPresenter {
    fn set_marker(&mut self, point: Point) {
        debug!("Marker moved to {}", point);
    }

    fn show_popup(&mut self, html: &str) {
        debug!("Popup: {}", html);
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Popup markup for a resolved selection
///
/// Provider text is escaped; it is not trusted markup.
pub fn popup_html(point: &Point, address: Option<&AddressInfo>) -> String {
    let mut html = String::from("<div class=\"location-popup\">");

    if let Some(address) = address {
        if let Some(direccion) = &address.direccion {
            html.push_str(&format!("<strong>{}</strong>", escape_html(direccion)));
        }
        let area: Vec<&str> = [&address.zona, &address.ciudad, &address.pais]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .collect();
        if !area.is_empty() {
            html.push_str(&format!("<p>{}</p>", escape_html(&area.join(", "))));
        }
    }

    html.push_str(&format!(
        "<small>{:.6}, {:.6}</small></div>",
        point.lat(),
        point.lng()
    ));
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_with_address() {
        let point = Point::new(-74.08, 4.6).unwrap();
        let address = AddressInfo {
            direccion: Some("Carrera 7 #26-20".to_string()),
            ciudad: Some("Bogotá".to_string()),
            pais: Some("Colombia".to_string()),
            zona: None,
        };

        let html = popup_html(&point, Some(&address));
        assert!(html.contains("<strong>Carrera 7 #26-20</strong>"));
        assert!(html.contains("<p>Bogotá, Colombia</p>"));
        assert!(html.contains("4.600000, -74.080000"));
    }

    #[test]
    fn test_popup_without_address() {
        let point = Point::new(1.5, 2.5).unwrap();
        let html = popup_html(&point, None);
        assert!(!html.contains("<strong>"));
        assert!(!html.contains("<p>"));
        assert!(html.contains("2.500000, 1.500000"));
    }

    #[test]
    fn test_popup_escapes_provider_text() {
        let point = Point::new(0.0, 0.0).unwrap();
        let address = AddressInfo {
            direccion: Some("<script>alert('x')</script> & co".to_string()),
            ..Default::default()
        };

        let html = popup_html(&point, Some(&address));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; co"));
    }
}
