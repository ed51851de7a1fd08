use crate::config::{AppConfig, WardSource};
use crate::error::{ProcessingError, Result};
use crate::models::{AddressRecord, District, Layer, Parcel};
use crate::processors::{AddressBuilder, JoinReport};
use crate::readers::read_layer;
use crate::spatial::{DistrictIndex, SpatialJoiner};
use crate::utils::constants::{LAYER_DISTRICTS, LAYER_PARCELS};
use crate::utils::progress::ProgressReporter;
use tracing::{info, warn};

pub struct PipelineOutput {
    pub records: Vec<AddressRecord>,
    pub report: JoinReport,
}

/// Parcel to council district enrichment: load, align CRSs, project,
/// join centroids to districts, and clean the address rows.
pub struct DistrictPipeline {
    config: AppConfig,
}

impl DistrictPipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Read both layers from the configured paths and process them.
    pub fn run(&self, progress: Option<&ProgressReporter>) -> Result<PipelineOutput> {
        if let Some(p) = progress {
            p.set_message("Reading layers...");
        }
        let parcels = read_layer(&self.config.parcels_path, LAYER_PARCELS)?;
        let districts = read_layer(&self.config.districts_path, LAYER_DISTRICTS)?;

        self.process(parcels, districts, progress)
    }

    pub fn process(
        &self,
        parcels: Layer,
        districts: Layer,
        progress: Option<&ProgressReporter>,
    ) -> Result<PipelineOutput> {
        self.check_fields(&parcels, &districts)?;

        if let Some(p) = progress {
            p.set_message("Reprojecting layers...");
        }
        let (parcels, districts) = self.align_crs(parcels, districts)?;

        let parcels: Vec<Parcel> = parcels
            .features
            .into_iter()
            .map(|f| Parcel::from_feature(f, &self.config.fields))
            .collect();

        let district_total = districts.len();
        let districts: Vec<District> = districts
            .features
            .into_iter()
            .filter_map(|f| District::from_feature(f, &self.config.fields))
            .collect();
        if districts.len() < district_total {
            warn!(
                skipped = district_total - districts.len(),
                "district features without geometry ignored"
            );
        }
        let index = DistrictIndex::new(districts);

        if let Some(p) = progress {
            p.start_count(
                parcels.len() as u64,
                &format!(
                    "Joining {} parcels to {} districts...",
                    parcels.len(),
                    index.len()
                ),
            );
        }
        let joiner = SpatialJoiner::new(self.config.worker_count());
        let matches = joiner.join(&parcels, &index, progress)?;

        let builder = AddressBuilder::new(self.config.ward_source);
        let (records, report) = builder.build(&parcels, &matches, &index);

        info!(
            parcels = report.total_parcels,
            written = report.written_records,
            dropped = report.dropped_missing_address,
            unmatched = report.unmatched_parcels,
            overlapping = report.overlapping_parcels,
            "spatial join complete"
        );

        Ok(PipelineOutput { records, report })
    }

    fn check_fields(&self, parcels: &Layer, districts: &Layer) -> Result<()> {
        let fields = &self.config.fields;
        parcels.require_fields(&[fields.street_number.as_str(), fields.street_name.as_str()])?;
        districts.require_fields(&[fields.district_id.as_str()])?;

        let parcel_ward = parcels.require_fields(&[fields.parcel_ward.as_str()]);
        let district_ward = match &fields.district_ward {
            Some(name) => districts.require_fields(&[name.as_str()]),
            None => Err(ProcessingError::MissingField {
                layer: districts.name.clone(),
                field: "ward".to_string(),
            }),
        };

        match self.config.ward_source {
            WardSource::Parcel => parcel_ward,
            WardSource::District => district_ward,
            WardSource::ParcelThenDistrict => parcel_ward.or(district_ward),
        }
    }

    /// Bring districts into the parcel CRS, then both into the projected CRS.
    fn align_crs(&self, mut parcels: Layer, mut districts: Layer) -> Result<(Layer, Layer)> {
        if let Some(crs) = &self.config.parcels_crs {
            parcels.crs = Some(crs.clone());
        }
        if let Some(crs) = &self.config.districts_crs {
            districts.crs = Some(crs.clone());
        }

        let parcel_crs = parcels.declared_crs()?;
        let district_crs = districts.declared_crs()?;
        if district_crs != parcel_crs {
            info!(from = %district_crs, to = %parcel_crs, "district CRS differs from parcels, reprojecting");
            districts = districts.reproject(&parcel_crs)?;
        }

        let projected = &self.config.projected_crs;
        if projected.is_geographic() {
            warn!(crs = %projected, "target CRS is geographic; centroids will be approximate");
        }

        Ok((parcels.reproject(projected)?, districts.reproject(projected)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LayerFeature;
    use crate::spatial::Crs;
    use geo::{polygon, MultiPolygon};
    use std::path::PathBuf;

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ]])
    }

    fn feature(index: usize, geometry: MultiPolygon<f64>, fields: &[(&str, &str)]) -> LayerFeature {
        LayerFeature::new(
            index,
            Some(geometry),
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), Some(v.to_string())))
                .collect(),
        )
    }

    fn projected_config() -> AppConfig {
        AppConfig {
            projected_crs: Crs::Epsg(2262),
            max_workers: 1,
            ..AppConfig::default()
        }
    }

    fn layers() -> (Layer, Layer) {
        let parcels = Layer::new(
            LAYER_PARCELS,
            PathBuf::from("parcels.geojson"),
            Some(Crs::Epsg(2262)),
            vec![
                feature(
                    0,
                    square(100.0, 100.0, 10.0),
                    &[("ADDRESSNUM", "123"), ("ADDRESSNAM", "MAIN ST"), ("CITY_WARD", "B")],
                ),
                feature(
                    1,
                    square(5000.0, 5000.0, 10.0),
                    &[("ADDRESSNUM", "9"), ("ADDRESSNAM", "FAR RD"), ("CITY_WARD", "C")],
                ),
            ],
        );
        let districts = Layer::new(
            LAYER_DISTRICTS,
            PathBuf::from("districts.geojson"),
            Some(Crs::Epsg(2262)),
            vec![feature(0, square(0.0, 0.0, 1000.0), &[("DIST_ID", "3")])],
        );
        (parcels, districts)
    }

    #[test]
    fn test_process_joins_and_keeps_unmatched() -> Result<()> {
        let (parcels, districts) = layers();
        let output = DistrictPipeline::new(projected_config()).process(parcels, districts, None)?;

        assert_eq!(output.records.len(), 2);
        assert_eq!(output.records[0].street_number, "123");
        assert_eq!(output.records[0].council_district.as_deref(), Some("3"));
        assert_eq!(output.records[0].ward.as_deref(), Some("B"));
        assert_eq!(output.records[1].council_district, None);
        assert_eq!(output.report.unmatched_parcels, 1);
        Ok(())
    }

    #[test]
    fn test_missing_district_field_fails() {
        let (parcels, districts) = layers();
        let config = AppConfig {
            fields: crate::config::FieldMapping {
                district_id: "COUNCIL".to_string(),
                ..Default::default()
            },
            ..projected_config()
        };

        let result = DistrictPipeline::new(config).process(parcels, districts, None);
        assert!(matches!(result, Err(ProcessingError::MissingField { .. })));
    }

    #[test]
    fn test_mismatched_crs_is_aligned() -> Result<()> {
        // Districts in WGS84 around Syracuse, parcels in state plane feet
        let districts = Layer::new(
            LAYER_DISTRICTS,
            PathBuf::from("districts.geojson"),
            Some(Crs::WGS84),
            vec![feature(
                0,
                square(-76.20, 43.00, 0.10),
                &[("DIST_ID", "1"), ("CITY_WARD", "4")],
            )],
        );
        let forward = crate::spatial::Reprojector::new(&Crs::WGS84, &Crs::Epsg(2262))?;
        let parcel_geometry = forward.transform_multi_polygon(&square(-76.151, 43.049, 0.001))?;
        let parcels = Layer::new(
            LAYER_PARCELS,
            PathBuf::from("parcels.geojson"),
            Some(Crs::Epsg(2262)),
            vec![feature(
                0,
                parcel_geometry,
                &[("ADDRESSNUM", "500"), ("ADDRESSNAM", "S SALINA ST")],
            )],
        );

        let output = DistrictPipeline::new(projected_config()).process(parcels, districts, None)?;
        assert_eq!(output.records.len(), 1);
        assert_eq!(output.records[0].council_district.as_deref(), Some("1"));
        assert_eq!(output.records[0].ward.as_deref(), Some("4"));
        Ok(())
    }

    #[test]
    fn test_undeclared_crs_needs_override() -> Result<()> {
        let (mut parcels, districts) = layers();
        parcels.crs = None;

        match DistrictPipeline::new(projected_config()).process(parcels.clone(), districts.clone(), None) {
            Err(ProcessingError::UndeclaredCrs { layer }) => assert_eq!(layer, LAYER_PARCELS),
            Err(other) => panic!("expected undeclared CRS error, got {}", other),
            Ok(_) => panic!("expected undeclared CRS error"),
        }

        let config = AppConfig {
            parcels_crs: Some(Crs::Epsg(2262)),
            ..projected_config()
        };
        let output = DistrictPipeline::new(config).process(parcels, districts, None)?;
        assert_eq!(output.records[0].council_district.as_deref(), Some("3"));
        Ok(())
    }
}
