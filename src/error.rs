use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CriteriaError {
    #[error("Bounding box needs 4 values (min_lon min_lat max_lon max_lat), got {0}")]
    BboxArity(usize),
    #[error("Invalid bounding box coordinate '{0}'")]
    BboxValue(String),
    #[error("Bounding box minimum must be below maximum on both axes")]
    BboxOrder,
    #[error("Start date {start} is after end date {end}")]
    DateOrder {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    #[error("Cloud cover must be between 0 and 100, got {0}")]
    CloudCover(f64),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Catalog responded with {0}")]
    Status(StatusCode),
    #[error("Malformed catalog response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Unsupported footprint for {name}: {reason}")]
    Footprint { name: String, reason: String },
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Identity provider rejected the credentials ({status})")]
    Rejected { status: StatusCode },
    #[error("Token response has no access_token field")]
    MissingToken,
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("Unable to read response body: {0}")]
    Body(#[source] reqwest::Error),
    #[error("Content endpoint responded with {0}")]
    Status(StatusCode),
    #[error("Redirect {0} without a Location header")]
    MissingLocation(StatusCode),
    #[error("Invalid redirect location '{0}'")]
    InvalidLocation(String),
    #[error("Gave up after {0} redirects")]
    TooManyRedirects(usize),
    #[error("Invalid product url: {0}")]
    Url(#[from] url::ParseError),
    #[error("Token cannot be used as a header value")]
    InvalidToken,
    #[error("Unable to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Unable to write product: {0}")]
    Sink(#[from] std::io::Error),
}

/// Failures that end a batch before any product is downloaded.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Unable to open download session: {0}")]
    Session(#[source] DownloadError),
}
