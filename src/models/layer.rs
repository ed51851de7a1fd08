use crate::error::{ProcessingError, Result};
use crate::spatial::{Crs, Reprojector};
use geo::{BoundingRect, MultiPolygon, Rect};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

/// Attribute values coerced to text; `None` marks a null value.
pub type Attributes = HashMap<String, Option<String>>;

#[derive(Debug, Clone)]
pub struct LayerFeature {
    pub index: usize,
    pub geometry: Option<MultiPolygon<f64>>,
    pub attributes: Attributes,
}

impl LayerFeature {
    pub fn new(index: usize, geometry: Option<MultiPolygon<f64>>, attributes: Attributes) -> Self {
        Self {
            index,
            geometry,
            attributes,
        }
    }

    /// Non-null attribute value by source field name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|v| v.as_deref())
    }
}

/// A polygon layer read from a vector file, kept fully in memory.
#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub source: PathBuf,
    /// CRS declared by the file, if any
    pub crs: Option<Crs>,
    pub field_names: BTreeSet<String>,
    pub features: Vec<LayerFeature>,
}

impl Layer {
    pub fn new(name: &str, source: PathBuf, crs: Option<Crs>, features: Vec<LayerFeature>) -> Self {
        let field_names = features
            .iter()
            .flat_map(|f| f.attributes.keys().cloned())
            .collect();

        Self {
            name: name.to_string(),
            source,
            crs,
            field_names,
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Declared CRS; a layer without one (a shapefile with no `.prj`) cannot be projected.
    pub fn declared_crs(&self) -> Result<Crs> {
        self.crs.clone().ok_or_else(|| ProcessingError::UndeclaredCrs {
            layer: self.name.clone(),
        })
    }

    /// Fail unless every named field appears on at least one feature.
    ///
    /// A layer with no features and no declared fields has no schema to check.
    pub fn require_fields(&self, fields: &[&str]) -> Result<()> {
        if self.features.is_empty() && self.field_names.is_empty() {
            return Ok(());
        }
        for field in fields {
            if !self.field_names.contains(*field) {
                return Err(ProcessingError::MissingField {
                    layer: self.name.clone(),
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Reproject every geometry and relabel the layer with the target CRS.
    pub fn reproject(mut self, target: &Crs) -> Result<Self> {
        let source = self.declared_crs()?;
        let reprojector = Reprojector::new(&source, target)?;

        if !reprojector.is_identity() {
            for feature in &mut self.features {
                if let Some(geometry) = &feature.geometry {
                    feature.geometry = Some(reprojector.transform_multi_polygon(geometry)?);
                }
            }
        }

        self.crs = Some(target.clone());
        Ok(self)
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.features
            .iter()
            .filter_map(|f| f.geometry.as_ref().and_then(|g| g.bounding_rect()))
            .reduce(|acc, rect| {
                Rect::new(
                    (acc.min().x.min(rect.min().x), acc.min().y.min(rect.min().y)),
                    (acc.max().x.max(rect.max().x), acc.max().y.max(rect.max().y)),
                )
            })
    }

    pub fn null_geometry_count(&self) -> usize {
        self.features.iter().filter(|f| f.geometry.is_none()).count()
    }

    pub fn summary(&self) -> String {
        let crs = match &self.crs {
            Some(crs) => crs.to_string(),
            None => "undeclared".to_string(),
        };
        let fields = self
            .field_names
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        let mut summary = format!(
            "Layer: {}\n\
            Source: {}\n\
            Features: {}\n\
            Null geometries: {}\n\
            CRS: {}\n\
            Fields ({}): {}",
            self.name,
            self.source.display(),
            self.len(),
            self.null_geometry_count(),
            crs,
            self.field_names.len(),
            fields
        );

        if let Some(rect) = self.bounding_rect() {
            summary.push_str(&format!(
                "\nExtent: ({:.3}, {:.3}) - ({:.3}, {:.3})",
                rect.min().x,
                rect.min().y,
                rect.max().x,
                rect.max().y
            ));
        }

        summary
    }
}
