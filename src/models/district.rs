use crate::config::FieldMapping;
use crate::models::LayerFeature;
use geo::{BoundingRect, Contains, MultiPolygon, Point, Rect};

/// A council district boundary with its identifier and optional ward label.
#[derive(Debug, Clone)]
pub struct District {
    pub id: Option<String>,
    pub ward: Option<String>,
    pub geometry: MultiPolygon<f64>,
    envelope: Option<Rect<f64>>,
}

impl District {
    pub fn new(id: Option<String>, ward: Option<String>, geometry: MultiPolygon<f64>) -> Self {
        let envelope = geometry.bounding_rect();
        Self {
            id,
            ward,
            geometry,
            envelope,
        }
    }

    /// Build from a layer feature; features without geometry yield `None`.
    pub fn from_feature(feature: LayerFeature, fields: &FieldMapping) -> Option<Self> {
        let id = feature.attribute(&fields.district_id).map(str::to_string);
        let ward = fields
            .district_ward
            .as_deref()
            .and_then(|name| feature.attribute(name))
            .map(str::to_string);
        feature
            .geometry
            .map(|geometry| Self::new(id, ward, geometry))
    }

    /// Strict containment: a point on the boundary is not within the district.
    pub fn contains(&self, point: &Point<f64>) -> bool {
        match self.envelope {
            Some(rect) if !rect_covers(&rect, point) => false,
            Some(_) => self.geometry.contains(point),
            None => false,
        }
    }
}

fn rect_covers(rect: &Rect<f64>, point: &Point<f64>) -> bool {
    point.x() >= rect.min().x
        && point.x() <= rect.max().x
        && point.y() >= rect.min().y
        && point.y() <= rect.max().y
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn district() -> District {
        District::new(
            Some("3".to_string()),
            Some("B".to_string()),
            MultiPolygon(vec![polygon![
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 10.0),
                (x: 0.0, y: 10.0),
                (x: 0.0, y: 0.0),
            ]]),
        )
    }

    #[test]
    fn test_contains_interior_point() {
        assert!(district().contains(&Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_excludes_outside_and_boundary_points() {
        let d = district();
        assert!(!d.contains(&Point::new(15.0, 5.0)));
        assert!(!d.contains(&Point::new(10.0, 5.0)));
    }

    #[test]
    fn test_feature_without_geometry_is_skipped() {
        let feature = LayerFeature::new(0, None, Default::default());
        assert!(District::from_feature(feature, &FieldMapping::default()).is_none());
    }
}
