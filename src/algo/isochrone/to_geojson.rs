//! GeoJSON conversion for isochrone maps

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoJsonValue};
use serde_json::json;

use crate::Error;
use crate::model::{Isochrone, IsochroneMap};

impl IsochroneMap {
    /// Converts the map to a GeoJSON `FeatureCollection`, one polygon
    /// feature per isochrone in ascending threshold order.
    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .isochrones()
            .iter()
            .map(|isochrone| self.isochrone_feature(isochrone))
            .collect();

        FeatureCollection {
            bbox: self
                .envelope()
                .map(|rect| vec![rect.min().x, rect.min().y, rect.max().x, rect.max().y]),
            features,
            foreign_members: None,
        }
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()).map_err(|e| Error::GeoJsonError(e.to_string()))
    }

    fn isochrone_feature(&self, isochrone: &Isochrone) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("group_index".to_string(), json!(self.traveller_id()));
        properties.insert("value".to_string(), json!(isochrone.value()));
        properties.insert(
            "center".to_string(),
            json!([self.center().x(), self.center().y()]),
        );
        properties.insert("area".to_string(), json!(isochrone.area()));
        if let Some(factor) = isochrone.reach_factor() {
            properties.insert("reachfactor".to_string(), json!(factor));
        }
        for (name, value) in isochrone.attributes() {
            properties.insert(name.clone(), json!(value));
        }

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(GeoJsonValue::from(isochrone.geometry()))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}
