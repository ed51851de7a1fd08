use crate::error::{ProcessingError, Result};
use crate::models::{Attributes, Layer, LayerFeature};
use crate::readers::{float_text, into_multi_polygon};
use crate::spatial::Crs;
use shapefile::dbase::FieldValue;
use shapefile::Shape;
use std::path::Path;
use tracing::debug;

/// Reads an ESRI shapefile together with its `.dbf` attributes and `.prj` CRS.
pub struct ShapefileReader;

impl ShapefileReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_layer(&self, path: &Path, name: &str) -> Result<Layer> {
        let crs = read_prj(path)?;
        let field_names = read_field_names(path)?;

        let mut reader = shapefile::Reader::from_path(path)?;
        let mut features = Vec::new();

        for (index, shape_record) in reader.iter_shapes_and_records().enumerate() {
            let (shape, record) = shape_record?;

            let geometry = match shape {
                Shape::NullShape => None,
                shape => {
                    let geometry = geo::Geometry::<f64>::try_from(shape).map_err(|e| {
                        ProcessingError::InvalidFormat(format!(
                            "{} feature {}: {:?}",
                            name, index, e
                        ))
                    })?;
                    Some(into_multi_polygon(geometry, name, index)?)
                }
            };

            let attributes: Attributes = field_names
                .iter()
                .map(|field| (field.clone(), record.get(field).and_then(field_text)))
                .collect();

            features.push(LayerFeature::new(index, geometry, attributes));
        }

        Ok(Layer::new(name, path.to_path_buf(), crs, features))
    }
}

impl Default for ShapefileReader {
    fn default() -> Self {
        Self::new()
    }
}

/// CRS from the sibling `.prj` file; `None` when there is no such file.
fn read_prj(shp_path: &Path) -> Result<Option<Crs>> {
    let prj_path = shp_path.with_extension("prj");
    if !prj_path.exists() {
        debug!(path = %prj_path.display(), "no .prj file, CRS undeclared");
        return Ok(None);
    }

    let wkt = std::fs::read_to_string(&prj_path)?;
    Crs::from_wkt(wkt.trim()).map(Some)
}

fn read_field_names(shp_path: &Path) -> Result<Vec<String>> {
    let dbf_path = shp_path.with_extension("dbf");
    let reader = shapefile::dbase::Reader::from_path(&dbf_path)?;
    Ok(reader
        .fields()
        .iter()
        .map(|field| field.name().to_string())
        .collect())
}

fn field_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(text) => text.as_ref().map(|t| t.trim_end().to_string()),
        FieldValue::Numeric(number) => number.map(float_text),
        FieldValue::Float(number) => number.map(|n| float_text(n as f64)),
        FieldValue::Integer(number) => Some(number.to_string()),
        FieldValue::Double(number) => Some(float_text(*number)),
        FieldValue::Logical(flag) => flag.map(|f| f.to_string()),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use shapefile::dbase::{FieldName, Record, TableWriterBuilder};
    use shapefile::{Point, Polygon, PolygonRing};
    use std::path::PathBuf;
    use tempfile::TempDir;

    const NY_WEST_PRJ: &str = r#"PROJCS["NAD_1983_StatePlane_New_York_West_FIPS_3103_Feet",GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],UNIT["Foot_US",0.3048006096012192]]"#;

    fn field(name: &str) -> FieldName {
        FieldName::try_from(name).unwrap()
    }

    /// Two square parcels in state plane feet with a `.prj`; returns the `.shp` path.
    pub(crate) fn write_parcel_shapefile(dir: &Path) -> PathBuf {
        let shp_path = dir.join("parcels.shp");
        let table = TableWriterBuilder::new()
            .add_character_field(field("ADDRESSNUM"), 10)
            .add_character_field(field("ADDRESSNAM"), 40)
            .add_numeric_field(field("CITY_WARD"), 4, 0);

        {
            let mut writer = shapefile::Writer::from_path(&shp_path, table).unwrap();
            for (x0, number, name, ward) in [
                (100.0, "123", "MAIN ST", Some(3.0)),
                (500.0, "9", "FAR RD   ", None),
            ] {
                let polygon = Polygon::new(PolygonRing::Outer(vec![
                    Point::new(x0, 100.0),
                    Point::new(x0, 110.0),
                    Point::new(x0 + 10.0, 110.0),
                    Point::new(x0 + 10.0, 100.0),
                    Point::new(x0, 100.0),
                ]));
                let mut record = Record::default();
                record.insert(
                    "ADDRESSNUM".to_string(),
                    FieldValue::Character(Some(number.to_string())),
                );
                record.insert(
                    "ADDRESSNAM".to_string(),
                    FieldValue::Character(Some(name.to_string())),
                );
                record.insert("CITY_WARD".to_string(), FieldValue::Numeric(ward));
                writer.write_shape_and_record(&polygon, &record).unwrap();
            }
        }

        std::fs::write(shp_path.with_extension("prj"), NY_WEST_PRJ).unwrap();
        shp_path
    }

    #[test]
    fn test_read_written_shapefile() -> Result<()> {
        let dir = TempDir::new()?;
        let shp_path = write_parcel_shapefile(dir.path());

        let layer = ShapefileReader::new().read_layer(&shp_path, "parcels")?;
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.crs, Some(Crs::Epsg(2262)));
        assert_eq!(
            layer.field_names.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["ADDRESSNAM", "ADDRESSNUM", "CITY_WARD"]
        );

        let first = &layer.features[0];
        assert_eq!(first.attribute("ADDRESSNUM"), Some("123"));
        assert_eq!(first.attribute("ADDRESSNAM"), Some("MAIN ST"));
        assert_eq!(first.attribute("CITY_WARD"), Some("3"));

        let second = &layer.features[1];
        assert_eq!(second.attribute("ADDRESSNAM"), Some("FAR RD"));
        assert_eq!(second.attribute("CITY_WARD"), None);

        let rect = layer.bounding_rect().unwrap();
        assert_eq!((rect.min().x, rect.min().y), (100.0, 100.0));
        assert_eq!((rect.max().x, rect.max().y), (510.0, 110.0));
        Ok(())
    }

    #[test]
    fn test_shapefile_without_prj_is_undeclared() -> Result<()> {
        let dir = TempDir::new()?;
        let shp_path = write_parcel_shapefile(dir.path());
        std::fs::remove_file(shp_path.with_extension("prj"))?;

        let layer = ShapefileReader::new().read_layer(&shp_path, "parcels")?;
        assert_eq!(layer.crs, None);
        assert!(matches!(
            layer.declared_crs(),
            Err(ProcessingError::UndeclaredCrs { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_field_text_coercion() {
        assert_eq!(
            field_text(&FieldValue::Character(Some("MAIN ST   ".to_string()))),
            Some("MAIN ST".to_string())
        );
        assert_eq!(field_text(&FieldValue::Character(None)), None);
        assert_eq!(field_text(&FieldValue::Numeric(Some(123.0))), Some("123".to_string()));
        assert_eq!(field_text(&FieldValue::Numeric(None)), None);
        assert_eq!(field_text(&FieldValue::Integer(4)), Some("4".to_string()));
    }

    #[test]
    fn test_read_prj() -> Result<()> {
        let dir = TempDir::new()?;
        let shp = dir.path().join("districts.shp");
        assert_eq!(read_prj(&shp)?, None);

        std::fs::write(
            dir.path().join("districts.prj"),
            r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#,
        )?;
        assert_eq!(read_prj(&shp)?, Some(Crs::WGS84));
        Ok(())
    }

    #[test]
    fn test_missing_shapefile_fails() {
        let dir = TempDir::new().unwrap();
        let result = ShapefileReader::new().read_layer(&dir.path().join("missing.shp"), "parcels");
        assert!(result.is_err());
    }
}
