//! Well-known text point form
//!
//! Accepts `POINT(lng lat)` with any keyword case and surrounding whitespace,
//! optionally preceded by an EWKT `SRID=n;` prefix.

use crate::geometry::{DecodeFailure, Point};

/// Minimum fractional digits written by [`crate::geometry::encode`]
///
/// Six digits is roughly 0.1 m at the equator.
pub const DEFAULT_PRECISION: usize = 6;

const KEYWORD: &str = "POINT";

/// Strip a leading `SRID=n;` prefix, if present
fn strip_srid_prefix(text: &str) -> Result<&str, DecodeFailure> {
    let Some(head) = text.get(..5) else {
        return Ok(text);
    };
    if !head.eq_ignore_ascii_case("SRID=") {
        return Ok(text);
    }

    let (srid, rest) = text[5..]
        .split_once(';')
        .ok_or_else(|| DecodeFailure::Syntax("SRID prefix without ';'".to_string()))?;
    srid.trim()
        .parse::<u32>()
        .map_err(|_| DecodeFailure::Syntax(format!("invalid SRID {:?}", srid)))?;

    Ok(rest.trim_start())
}

/// Whether `raw` starts (after trimming and an optional SRID prefix) with the point keyword
pub fn looks_like_text(raw: &str) -> bool {
    let trimmed = raw.trim_start();
    let body = strip_srid_prefix(trimmed).unwrap_or(trimmed);
    let is_srid = trimmed
        .get(..5)
        .is_some_and(|head| head.eq_ignore_ascii_case("SRID="));

    is_srid
        || body
            .get(..KEYWORD.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(KEYWORD))
}

fn parse_coordinate(token: &str) -> Result<f64, DecodeFailure> {
    let value: f64 = token
        .parse()
        .map_err(|_| DecodeFailure::InvalidNumber(token.to_string()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DecodeFailure::InvalidNumber(token.to_string()))
    }
}

/// Decode a textual point
pub fn decode_text(raw: &str) -> Result<Point, DecodeFailure> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DecodeFailure::Empty);
    }

    let body = strip_srid_prefix(trimmed)?;
    let rest = match body.get(..KEYWORD.len()) {
        Some(head) if head.eq_ignore_ascii_case(KEYWORD) => &body[KEYWORD.len()..],
        _ => return Err(DecodeFailure::Syntax(format!("expected {} keyword", KEYWORD))),
    };

    let open = rest
        .find('(')
        .ok_or_else(|| DecodeFailure::Syntax("missing '('".to_string()))?;
    if !rest[..open].trim().is_empty() {
        // Covers `POINT EMPTY`, `POINT Z (...)` and similar variants
        return Err(DecodeFailure::Syntax(format!(
            "unexpected {:?} before '('",
            rest[..open].trim()
        )));
    }

    let inner_and_tail = &rest[open + 1..];
    let close = inner_and_tail
        .find(')')
        .ok_or_else(|| DecodeFailure::Syntax("missing ')'".to_string()))?;
    let inner = &inner_and_tail[..close];
    if inner.contains('(') {
        return Err(DecodeFailure::Syntax("nested '(' in point".to_string()));
    }
    if !inner_and_tail[close + 1..].trim().is_empty() {
        return Err(DecodeFailure::Syntax("trailing text after ')'".to_string()));
    }

    let tokens: Vec<&str> = inner.split_whitespace().collect();
    let [lng, lat] = tokens.as_slice() else {
        return Err(DecodeFailure::Syntax(format!(
            "expected 2 coordinates, found {}",
            tokens.len()
        )));
    };

    Point::decoded(parse_coordinate(lng)?, parse_coordinate(lat)?)
}

/// Format a coordinate with the shortest exact representation, padded to `min_digits`
fn format_coordinate(value: f64, min_digits: usize) -> String {
    let shortest = value.to_string();
    let fractional = shortest
        .split_once('.')
        .map(|(_, frac)| frac.len())
        .unwrap_or(0);

    if fractional >= min_digits {
        shortest
    } else {
        format!("{:.*}", min_digits, value)
    }
}

/// Encode a point as `POINT(lng lat)` with at least `min_digits` fractional digits
///
/// Digits beyond `min_digits` are kept when needed to reproduce the exact value.
pub fn encode_with_precision(point: &Point, min_digits: usize) -> String {
    format!(
        "{}({} {})",
        KEYWORD,
        format_coordinate(point.lng(), min_digits),
        format_coordinate(point.lat(), min_digits)
    )
}

/// Encode a point as EWKT, `SRID=n;POINT(lng lat)`
pub fn encode_ewkt(point: &Point, srid: u32) -> String {
    format!(
        "SRID={};{}",
        srid,
        encode_with_precision(point, DEFAULT_PRECISION)
    )
}
