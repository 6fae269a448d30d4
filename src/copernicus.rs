//! Copernicus Data Space Ecosystem endpoints and fixed request values.
use serde::{Deserialize, Serialize};
use url::Url;

pub const COLLECTION: &str = "SENTINEL-2";

/// Public OpenID client used for password grants.
pub const CLIENT_ID: &str = "cdse-public";

const CATALOG_URL: &str = "https://catalogue.dataspace.copernicus.eu/odata/v1/Products";
const IDENTITY_URL: &str =
    "https://identity.dataspace.copernicus.eu/auth/realms/CDSE/protocol/openid-connect/token";
const CONTENT_URL: &str = "https://catalogue.dataspace.copernicus.eu/odata/v1/";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Endpoints {
    /// OData `Products` search endpoint.
    pub catalog: Url,
    /// OpenID token endpoint.
    pub identity: Url,
    /// Base that `Products({id})/$value` is joined onto.
    pub content: Url,
}

impl Endpoints {
    pub fn product_url(&self, product_id: &str) -> Result<Url, url::ParseError> {
        self.content.join(&format!("Products({product_id})/$value"))
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            catalog: Url::parse(CATALOG_URL).expect("Catalog url should always parse"),
            identity: Url::parse(IDENTITY_URL).expect("Identity url should always parse"),
            content: Url::parse(CONTENT_URL).expect("Content url should always parse"),
        }
    }
}
