//! Coordinate reprojection between EPSG systems.
//!
//! Definitions come from the EPSG database bundled with `proj4rs`. Output axis order is
//! an explicit [`AxisOrder`] value handed to each [`Reprojector`].

use std::fmt;
use std::str::FromStr;

use geo::MapCoords;
use geo_types::{Coord, Geometry};
use geoupload_core_common::{Crs, FeatureRecord};
use proj4rs::Proj;
use proj4rs::transform::transform;

use crate::error::{ConfigError, ReprojectionError};

/// Axis order of written coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AxisOrder {
    /// Always (x, y): longitude/easting first, latitude/northing second.
    #[default]
    ForceXy,
    /// The target CRS authority order: geographic EPSG systems put latitude first.
    Authority,
}

impl AxisOrder {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AxisOrder::ForceXy => "xy",
            AxisOrder::Authority => "authority",
        }
    }
}

impl fmt::Display for AxisOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AxisOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xy" | "force-xy" | "lonlat" => Ok(AxisOrder::ForceXy),
            "authority" => Ok(AxisOrder::Authority),
            other => Err(ConfigError::InvalidOption {
                option: "axis-order".to_string(),
                message: format!("'{other}' is not one of: xy, authority"),
            }),
        }
    }
}

struct Projections {
    from: Proj,
    to: Proj,
    from_degrees: bool,
    to_degrees: bool,
}

/// Transforms geometries from one CRS to another.
pub struct Reprojector {
    source: Crs,
    target: Crs,
    projections: Option<Projections>,
    swap_output: bool,
}

impl Reprojector {
    /// Resolves both systems and prepares the transformation.
    ///
    /// Identical systems under [`AxisOrder::ForceXy`] give an identity reprojector that
    /// leaves coordinates untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ReprojectionError::UnknownCrs`] when either code has no definition.
    pub fn new(source: Crs, target: Crs, axis_order: AxisOrder) -> Result<Self, ReprojectionError> {
        let to = target.definition()?;
        let swap_output = axis_order == AxisOrder::Authority && to.is_latlong();
        let projections = if source == target {
            None
        } else {
            let from = source.definition()?;
            Some(Projections {
                from_degrees: from.is_latlong(),
                to_degrees: to.is_latlong(),
                from,
                to,
            })
        };
        Ok(Self {
            source,
            target,
            projections,
            swap_output,
        })
    }

    #[must_use]
    pub fn source(&self) -> Crs {
        self.source
    }

    #[must_use]
    pub fn target(&self) -> Crs {
        self.target
    }

    /// Returns `true` when coordinates come out exactly as they went in.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.projections.is_none() && !self.swap_output
    }

    /// Transforms one coordinate.
    ///
    /// # Errors
    ///
    /// Returns the `proj4rs` error for coordinates outside the projection's domain.
    pub fn transform_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>, proj4rs::errors::Error> {
        let mut out = coord;
        if let Some(p) = &self.projections {
            let mut point = if p.from_degrees {
                (coord.x.to_radians(), coord.y.to_radians(), 0.0)
            } else {
                (coord.x, coord.y, 0.0)
            };
            transform(&p.from, &p.to, &mut point)?;
            out = if p.to_degrees {
                Coord {
                    x: point.0.to_degrees(),
                    y: point.1.to_degrees(),
                }
            } else {
                Coord { x: point.0, y: point.1 }
            };
        }
        if self.swap_output {
            out = Coord { x: out.y, y: out.x };
        }
        Ok(out)
    }

    /// Transforms every coordinate of `geometry`.
    ///
    /// # Errors
    ///
    /// Returns the first coordinate failure.
    pub fn transform_geometry(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>, proj4rs::errors::Error> {
        geometry.try_map_coords(|coord| self.transform_coord(coord))
    }

    /// Reprojects the geometry of `feature` and tags it with the target CRS.
    ///
    /// # Errors
    ///
    /// Returns [`ReprojectionError::Transform`] naming the feature on failure.
    pub fn reproject_feature(&self, mut feature: FeatureRecord) -> Result<FeatureRecord, ReprojectionError> {
        if !self.is_identity()
            && let Some(geometry) = &feature.geometry
        {
            let transformed = self
                .transform_geometry(geometry)
                .map_err(|err| ReprojectionError::Transform {
                    feature: feature.id.clone(),
                    from: self.source,
                    to: self.target,
                    message: err.to_string(),
                })?;
            feature.geometry = Some(transformed);
        }
        feature.crs = Some(self.target);
        Ok(feature)
    }
}
