use crate::error::CatalogError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

const PAGE_SIZE: &str = "1000";

/// A geographic vertex in degrees.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

/// Ground coverage of a product. Rings are lists of positions, the first ring
/// of a polygon is its exterior.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum Footprint {
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Footprint {
    /// Converts a GeoJSON geometry object.
    pub fn from_geojson(geometry: &Value) -> Result<Self, String> {
        let kind = geometry
            .get("type")
            .and_then(Value::as_str)
            .ok_or("geometry has no type")?;
        let coordinates = geometry
            .get("coordinates")
            .ok_or("geometry has no coordinates")?;

        match kind {
            "Polygon" => Ok(Self::Polygon(polygon(coordinates)?)),
            "MultiPolygon" => coordinates
                .as_array()
                .ok_or("coordinates are not an array")?
                .iter()
                .map(polygon)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::MultiPolygon),
            other => Err(format!("geometry type {other} is not a polygon")),
        }
    }

    pub fn exterior(&self) -> Option<&[Position]> {
        match self {
            Self::Polygon(rings) => rings.first().map(Vec::as_slice),
            Self::MultiPolygon(polygons) => polygons.first()?.first().map(Vec::as_slice),
        }
    }
}

fn polygon(coordinates: &Value) -> Result<Vec<Vec<Position>>, String> {
    let rings: Vec<Vec<Vec<f64>>> =
        serde_json::from_value(coordinates.clone()).map_err(|e| e.to_string())?;
    rings
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .map(|pos| match pos[..] {
                    [lon, lat, ..] => Ok(Position { lon, lat }),
                    _ => Err(format!("position with {} values", pos.len())),
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

/// The logical identifier of a product: its name up to the first `.`.
pub fn logical_identifier(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub identifier: String,
    pub footprint: Footprint,
}

#[derive(Debug, Default)]
pub struct ResultSet {
    pub records: Vec<ProductRecord>,
    pub total: usize,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(rename = "@odata.count")]
    count: Option<usize>,
    value: Vec<RawProduct>,
}

#[derive(Deserialize)]
struct RawProduct {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "GeoFootprint")]
    footprint: Value,
}

impl TryFrom<RawProduct> for ProductRecord {
    type Error = CatalogError;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        let footprint =
            Footprint::from_geojson(&raw.footprint).map_err(|reason| CatalogError::Footprint {
                name: raw.name.clone(),
                reason,
            })?;
        Ok(Self {
            identifier: logical_identifier(&raw.name).to_string(),
            id: raw.id,
            name: raw.name,
            footprint,
        })
    }
}

/// Parses an OData `Products` response body.
pub fn parse_results(body: &str) -> Result<ResultSet, CatalogError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    let records = response
        .value
        .into_iter()
        .map(ProductRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let total = response.count.unwrap_or(records.len());
    Ok(ResultSet { records, total })
}

pub struct CatalogClient {
    client: Client,
    endpoint: Url,
}

impl CatalogClient {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub async fn search(&self, filter: &str) -> Result<ResultSet, CatalogError> {
        debug!(%filter, "Searching catalog");
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("$filter", filter), ("$count", "True"), ("$top", PAGE_SIZE)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }

        let body = response.text().await?;
        parse_results(&body)
    }
}
