use crate::error::{ProcessingError, Result};
use crate::spatial::crs::Crs;
use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::Proj;
use tracing::debug;

/// Transforms coordinates from one CRS to another.
///
/// Geographic coordinates are degrees on both sides of the API; the conversion
/// to the radians that `proj4rs` expects happens internally. A source equal to
/// the target is an identity transform and leaves coordinates untouched.
pub struct Reprojector {
    projections: Option<(Proj, Proj)>,
    source_geographic: bool,
    target_geographic: bool,
}

impl Reprojector {
    pub fn new(source: &Crs, target: &Crs) -> Result<Self> {
        if source == target {
            debug!(crs = %source, "identity reprojection");
            return Ok(Self {
                projections: None,
                source_geographic: source.is_geographic(),
                target_geographic: target.is_geographic(),
            });
        }

        let source_proj = build_proj(source)?;
        let target_proj = build_proj(target)?;
        debug!(from = %source, to = %target, "created reprojection");

        Ok(Self {
            projections: Some((source_proj, target_proj)),
            source_geographic: source.is_geographic(),
            target_geographic: target.is_geographic(),
        })
    }

    pub fn is_identity(&self) -> bool {
        self.projections.is_none()
    }

    pub fn transform_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let Some((source, target)) = &self.projections else {
            return Ok(coord);
        };

        let mut point = if self.source_geographic {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };

        proj4rs::transform::transform(source, target, &mut point).map_err(|e| {
            ProcessingError::Projection(format!("({}, {}): {}", coord.x, coord.y, e))
        })?;

        if self.target_geographic {
            Ok(Coord {
                x: point.0.to_degrees(),
                y: point.1.to_degrees(),
            })
        } else {
            Ok(Coord {
                x: point.0,
                y: point.1,
            })
        }
    }

    pub fn transform_multi_polygon(&self, geometry: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        if self.is_identity() {
            return Ok(geometry.clone());
        }
        geometry.try_map_coords(|coord| self.transform_coord(coord))
    }
}

fn build_proj(crs: &Crs) -> Result<Proj> {
    let definition = crs.proj4_definition()?;
    Proj::from_proj_string(definition)
        .map_err(|e| ProcessingError::Projection(format!("{}: {}", crs, e)))
}
