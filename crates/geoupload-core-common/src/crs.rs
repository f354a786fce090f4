//! Spatial reference system identifiers.
//!
//! A [`Crs`] is an EPSG code. Identifiers arrive in many spellings (`EPSG:4326`,
//! OGC URNs, GML srsName URLs); [`Crs::parse`] folds them to the code and reports
//! whether the spelling promises the authority's axis order.

use std::fmt;
use std::str::FromStr;

use proj4rs::Proj;
use thiserror::Error;

/// Errors produced while interpreting a CRS identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CrsError {
    /// The identifier does not follow any recognized spelling.
    #[error("Unrecognized CRS identifier '{identifier}'")]
    Unrecognized {
        /// The identifier as given
        identifier: String,
    },

    /// The code is well-formed but has no known definition.
    #[error("Unknown CRS {crs}: {reason}")]
    UnknownCode {
        /// The CRS that failed to resolve
        crs: Crs,
        /// Reason reported by the definitions database
        reason: String,
    },
}

/// An EPSG coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Crs {
    code: u16,
}

/// Result of parsing a CRS spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCrs {
    /// The CRS the identifier names.
    pub crs: Crs,
    /// True when the spelling (URN or `/def/crs/` URL) declares authority axis order.
    pub authority_axis_order: bool,
}

impl Crs {
    /// WGS 84 geographic (EPSG:4326).
    pub const WGS84: Crs = Crs { code: 4326 };
    /// WGS 84 / Pseudo-Mercator (EPSG:3857).
    pub const WEB_MERCATOR: Crs = Crs { code: 3857 };

    #[must_use]
    pub const fn from_epsg(code: u16) -> Self {
        Self { code }
    }

    #[must_use]
    pub fn epsg(&self) -> u16 {
        self.code
    }

    /// Parses an identifier into a [`Crs`].
    ///
    /// # Errors
    ///
    /// Returns [`CrsError::Unrecognized`] if the identifier matches no known spelling.
    pub fn parse(identifier: &str) -> Result<Self, CrsError> {
        Self::parse_with_axis_hint(identifier).map(|parsed| parsed.crs)
    }

    /// Like [`Crs::parse`], also reporting whether the spelling carries authority axis order.
    ///
    /// # Errors
    ///
    /// Returns [`CrsError::Unrecognized`] if the identifier matches no known spelling.
    pub fn parse_with_axis_hint(identifier: &str) -> Result<ParsedCrs, CrsError> {
        let trimmed = identifier.trim();
        let lower = trimmed.to_ascii_lowercase();
        let unrecognized = || CrsError::Unrecognized {
            identifier: identifier.to_string(),
        };

        if lower == "crs:84" || lower.ends_with(":ogc:1.3:crs84") || lower.ends_with("/ogc/1.3/crs84") {
            return Ok(ParsedCrs {
                crs: Crs::WGS84,
                authority_axis_order: false,
            });
        }

        let (code, authority_axis_order) = if let Some(rest) = lower.strip_prefix("epsg:") {
            (rest, false)
        } else if let Some(rest) = lower.strip_prefix("urn:ogc:def:crs:epsg:") {
            // urn:ogc:def:crs:EPSG:<version>:<code>, version may be empty
            (rest.rsplit(':').next().unwrap_or_default(), true)
        } else if let Some(rest) = lower.strip_prefix("urn:x-ogc:def:crs:epsg:") {
            (rest.rsplit(':').next().unwrap_or_default(), true)
        } else if lower.starts_with("http://www.opengis.net/def/crs/epsg/")
            || lower.starts_with("https://www.opengis.net/def/crs/epsg/")
        {
            (lower.rsplit('/').next().unwrap_or_default(), true)
        } else if let Some((_, rest)) = lower.split_once("epsg.xml#") {
            (rest, false)
        } else {
            (lower.as_str(), false)
        };

        let code = code.trim().parse::<u16>().map_err(|_| unrecognized())?;
        if code == 0 {
            return Err(unrecognized());
        }
        Ok(ParsedCrs {
            crs: Crs::from_epsg(code),
            authority_axis_order,
        })
    }

    /// Resolves the full definition of this CRS.
    ///
    /// # Errors
    ///
    /// Returns [`CrsError::UnknownCode`] if the code has no definition.
    pub fn definition(&self) -> Result<Proj, CrsError> {
        Proj::from_epsg_code(self.code).map_err(|err| CrsError::UnknownCode {
            crs: *self,
            reason: err.to_string(),
        })
    }

    /// Returns `true` for geographic (long/lat) systems.
    ///
    /// EPSG declares latitude first for these, which is what authority axis order means here.
    ///
    /// # Errors
    ///
    /// Returns [`CrsError::UnknownCode`] if the code has no definition.
    pub fn is_geographic(&self) -> Result<bool, CrsError> {
        Ok(self.definition()?.is_latlong())
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.code)
    }
}

impl FromStr for Crs {
    type Err = CrsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Crs::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_spellings() {
        assert_eq!(Crs::parse("EPSG:3857").unwrap(), Crs::WEB_MERCATOR);
        assert_eq!(Crs::parse("epsg:2154").unwrap().epsg(), 2154);
        assert_eq!(Crs::parse("4326").unwrap(), Crs::WGS84);
        assert_eq!(Crs::parse("CRS:84").unwrap(), Crs::WGS84);
        assert_eq!(
            Crs::parse("http://www.opengis.net/gml/srs/epsg.xml#4326").unwrap(),
            Crs::WGS84
        );
    }

    #[test]
    fn urn_spellings_declare_authority_axis_order() {
        let parsed = Crs::parse_with_axis_hint("urn:ogc:def:crs:EPSG::4326").unwrap();
        assert_eq!(parsed.crs, Crs::WGS84);
        assert!(parsed.authority_axis_order);

        let parsed = Crs::parse_with_axis_hint("urn:ogc:def:crs:EPSG:6.6:2154").unwrap();
        assert_eq!(parsed.crs.epsg(), 2154);
        assert!(parsed.authority_axis_order);

        let parsed =
            Crs::parse_with_axis_hint("http://www.opengis.net/def/crs/EPSG/0/3857").unwrap();
        assert_eq!(parsed.crs, Crs::WEB_MERCATOR);
        assert!(parsed.authority_axis_order);

        assert!(!Crs::parse_with_axis_hint("EPSG:4326").unwrap().authority_axis_order);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Crs::parse("EPSG:abc"),
            Err(CrsError::Unrecognized { .. })
        ));
        assert!(Crs::parse("").is_err());
        assert!(Crs::parse("EPSG:0").is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let crs: Crs = "EPSG:2154".parse().unwrap();
        assert_eq!(crs.to_string(), "EPSG:2154");
        assert_eq!(crs.to_string().parse::<Crs>().unwrap(), crs);
    }

    #[test]
    fn geographic_detection() {
        assert!(Crs::WGS84.is_geographic().unwrap());
        assert!(!Crs::WEB_MERCATOR.is_geographic().unwrap());
        assert!(matches!(
            Crs::from_epsg(1).definition(),
            Err(CrsError::UnknownCode { .. })
        ));
    }
}
