//! Resolution of `.prj` WKT to an EPSG code.
//!
//! Only the identifier is needed: the definition itself comes from the EPSG database.
//! The top-level `AUTHORITY["EPSG", ...]` (WKT1) or `ID["EPSG", ...]` (WKT2) wins;
//! ESRI-flavoured files without one fall back to a table of well-known names.

use geoupload_core_common::Crs;

/// Returns the EPSG CRS described by `wkt`, if it can be identified.
#[must_use]
pub fn crs_from_prj(wkt: &str) -> Option<Crs> {
    let wkt = wkt.trim();
    if let Some(code) = top_level_authority(wkt) {
        return Some(Crs::from_epsg(code));
    }
    root_name(wkt).and_then(|name| crs_from_name(&name))
}

fn top_level_authority(wkt: &str) -> Option<u16> {
    let bytes = wkt.as_bytes();
    let mut depth = 0usize;
    let mut in_quotes = false;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'[' | b'(' if !in_quotes => depth += 1,
            b']' | b')' if !in_quotes => depth = depth.saturating_sub(1),
            _ if !in_quotes && depth == 1 && i > 0 && matches!(bytes[i - 1], b',' | b' ') => {
                let rest = &wkt[i..];
                let body = strip_keyword(rest, "AUTHORITY[").or_else(|| strip_keyword(rest, "ID["));
                if let Some(body) = body
                    && let Some(code) = parse_authority_body(body)
                {
                    return Some(code);
                }
            },
            _ => {},
        }
    }
    None
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    head.eq_ignore_ascii_case(keyword)
        .then(|| &text[keyword.len()..])
}

fn parse_authority_body(body: &str) -> Option<u16> {
    let end = body.find(']')?;
    let mut parts = body[..end].split(',').map(|p| p.trim().trim_matches('"'));
    let authority = parts.next()?;
    if !authority.eq_ignore_ascii_case("EPSG") {
        return None;
    }
    parts.next()?.parse().ok()
}

fn root_name(wkt: &str) -> Option<String> {
    let start = wkt.find('"')? + 1;
    let len = wkt[start..].find('"')?;
    Some(
        wkt[start..start + len]
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect(),
    )
}

fn crs_from_name(name: &str) -> Option<Crs> {
    let code = match name {
        "gcswgs1984" | "wgs84" | "wgs1984" => 4326,
        "wgs1984webmercatorauxiliarysphere" | "wgs84pseudomercator" | "wgs1984webmercator" => 3857,
        "gcsrgf1993" | "rgf93" => 4171,
        "rgf1993lambert93" | "rgf93lambert93" => 2154,
        "gcsetrs1989" | "etrs89" => 4258,
        _ => return utm_zone(name),
    };
    Some(Crs::from_epsg(code))
}

/// `WGS_1984_UTM_Zone_31N` and friends.
fn utm_zone(name: &str) -> Option<Crs> {
    let rest = name
        .strip_prefix("wgs1984utmzone")
        .or_else(|| name.strip_prefix("wgs84utmzone"))?;
    let (zone, hemisphere) = rest.split_at(rest.len().checked_sub(1)?);
    let zone: u16 = zone.parse().ok()?;
    if !(1..=60).contains(&zone) {
        return None;
    }
    match hemisphere {
        "n" => Some(Crs::from_epsg(32600 + zone)),
        "s" => Some(Crs::from_epsg(32700 + zone)),
        _ => None,
    }
}
