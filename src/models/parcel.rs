use crate::config::FieldMapping;
use crate::models::LayerFeature;
use geo::{Centroid, MultiPolygon, Point};

/// A tax parcel: boundary plus the address attributes carried to the output.
#[derive(Debug, Clone)]
pub struct Parcel {
    pub street_number: Option<String>,
    pub street_name: Option<String>,
    pub ward: Option<String>,
    pub geometry: Option<MultiPolygon<f64>>,
}

impl Parcel {
    pub fn from_feature(feature: LayerFeature, fields: &FieldMapping) -> Self {
        Self {
            street_number: feature.attribute(&fields.street_number).map(str::to_string),
            street_name: feature.attribute(&fields.street_name).map(str::to_string),
            ward: feature.attribute(&fields.parcel_ward).map(str::to_string),
            geometry: feature.geometry,
        }
    }

    /// Representative point used as the join key; `None` for empty or null geometry.
    pub fn centroid(&self) -> Option<Point<f64>> {
        self.geometry.as_ref().and_then(|g| g.centroid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use std::collections::HashMap;

    #[test]
    fn test_from_feature_maps_fields() {
        let geometry = MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
            (x: 0.0, y: 0.0),
        ]]);
        let attributes: HashMap<String, Option<String>> = [
            ("ADDRESSNUM".to_string(), Some("123".to_string())),
            ("ADDRESSNAM".to_string(), Some("MAIN ST".to_string())),
            ("CITY_WARD".to_string(), None),
        ]
        .into_iter()
        .collect();

        let parcel = Parcel::from_feature(
            LayerFeature::new(0, Some(geometry), attributes),
            &FieldMapping::default(),
        );

        assert_eq!(parcel.street_number.as_deref(), Some("123"));
        assert_eq!(parcel.street_name.as_deref(), Some("MAIN ST"));
        assert_eq!(parcel.ward, None);
        let centroid = parcel.centroid().unwrap();
        assert!((centroid.x() - 1.0).abs() < 1e-9);
        assert!((centroid.y() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_null_geometry_has_no_centroid() {
        let parcel = Parcel {
            street_number: Some("1".to_string()),
            street_name: Some("ELM ST".to_string()),
            ward: None,
            geometry: None,
        };
        assert!(parcel.centroid().is_none());
    }
}
