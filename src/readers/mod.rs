pub mod geojson_reader;
pub mod shapefile_reader;

pub use geojson_reader::GeoJsonReader;
pub use shapefile_reader::ShapefileReader;

use crate::archive::temp_manager::{has_extension, TempFileManager};
use crate::error::{ProcessingError, Result};
use crate::models::Layer;
use geo::{Geometry, MultiPolygon};
use std::path::Path;
use tracing::info;

/// Vector formats accepted as layer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    GeoJson,
    Shapefile,
    /// A zip holding one shapefile bundle or GeoJSON file
    Zip,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        if has_extension(path, "geojson") || has_extension(path, "json") {
            Ok(InputFormat::GeoJson)
        } else if has_extension(path, "shp") {
            Ok(InputFormat::Shapefile)
        } else if has_extension(path, "zip") {
            Ok(InputFormat::Zip)
        } else {
            Err(ProcessingError::UnsupportedFormat(path.display().to_string()))
        }
    }
}

/// Read a polygon layer, choosing the reader from the file extension.
pub fn read_layer(path: &Path, name: &str) -> Result<Layer> {
    let layer = match InputFormat::from_path(path)? {
        InputFormat::GeoJson => GeoJsonReader::new().read_layer(path, name)?,
        InputFormat::Shapefile => ShapefileReader::new().read_layer(path, name)?,
        InputFormat::Zip => {
            let mut manager = TempFileManager::new()?;
            manager.extract_all(path)?;
            let inner = manager.find_layer_file()?;
            if InputFormat::from_path(&inner)? == InputFormat::Shapefile {
                ShapefileReader::new().read_layer(&inner, name)?
            } else {
                GeoJsonReader::new().read_layer(&inner, name)?
            }
        }
    };

    info!(
        layer = name,
        path = %path.display(),
        features = layer.len(),
        crs = %layer.crs.as_ref().map(|c| c.to_string()).unwrap_or_else(|| "undeclared".to_string()),
        "loaded layer"
    );
    Ok(layer)
}

/// Polygonal geometry as a multipolygon; anything else is an error.
pub(crate) fn into_multi_polygon(
    geometry: Geometry<f64>,
    layer: &str,
    index: usize,
) -> Result<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Ok(MultiPolygon(vec![polygon])),
        Geometry::MultiPolygon(multi) => Ok(multi),
        other => Err(ProcessingError::NonPolygonal {
            layer: layer.to_string(),
            index,
            kind: geometry_kind(&other).to_string(),
        }),
    }
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Text form of a numeric attribute; integral values print without a fraction.
pub(crate) fn float_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
