use crate::error::{ProcessingError, Result};
use crate::models::{Attributes, Layer, LayerFeature};
use crate::readers::{float_text, into_multi_polygon};
use crate::spatial::Crs;
use geojson::{Feature, GeoJson, JsonObject, JsonValue};
use std::path::Path;

pub struct GeoJsonReader;

impl GeoJsonReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_layer(&self, path: &Path, name: &str) -> Result<Layer> {
        let text = std::fs::read_to_string(path)?;
        self.parse_layer(&text, path, name)
    }

    /// Parse a FeatureCollection (or a lone Feature) into a layer.
    ///
    /// The CRS comes from the pre-RFC 7946 `crs` member when present;
    /// otherwise it is WGS84, as RFC 7946 defines.
    pub fn parse_layer(&self, text: &str, source: &Path, name: &str) -> Result<Layer> {
        let (features, foreign_members) = match text.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(collection) => {
                (collection.features, collection.foreign_members)
            }
            GeoJson::Feature(feature) => (vec![feature], None),
            GeoJson::Geometry(_) => {
                return Err(ProcessingError::InvalidFormat(format!(
                    "{} holds a bare geometry, expected features",
                    source.display()
                )))
            }
        };

        let crs = foreign_members
            .as_ref()
            .and_then(|members| members.get("crs"))
            .map(parse_crs_member)
            .transpose()?
            .unwrap_or(Crs::WGS84);

        let features = features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| convert_feature(index, feature, name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Layer::new(name, source.to_path_buf(), Some(crs), features))
    }
}

impl Default for GeoJsonReader {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_feature(index: usize, feature: Feature, layer: &str) -> Result<LayerFeature> {
    let geometry = match feature.geometry {
        Some(geometry) => {
            let geometry: geo::Geometry<f64> = geometry.value.try_into()?;
            Some(into_multi_polygon(geometry, layer, index)?)
        }
        None => None,
    };

    let attributes = feature
        .properties
        .as_ref()
        .map(properties_to_attributes)
        .unwrap_or_default();

    Ok(LayerFeature::new(index, geometry, attributes))
}

fn properties_to_attributes(properties: &JsonObject) -> Attributes {
    properties
        .iter()
        .map(|(key, value)| (key.clone(), property_text(value)))
        .collect()
}

fn property_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(float_text).unwrap_or_else(|| n.to_string()),
        }),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// `{"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::2262"}}`
/// or the older `{"type": "EPSG", "properties": {"code": 2262}}`.
fn parse_crs_member(member: &JsonValue) -> Result<Crs> {
    let properties = member.get("properties");

    if let Some(name) = properties.and_then(|p| p.get("name")).and_then(|n| n.as_str()) {
        return Crs::parse(name);
    }

    if let Some(code) = properties.and_then(|p| p.get("code")).and_then(|c| c.as_u64()) {
        return u16::try_from(code)
            .map(Crs::Epsg)
            .map_err(|_| ProcessingError::UnsupportedCrs(code.to_string()));
    }

    Err(ProcessingError::UnsupportedCrs(member.to_string()))
}
