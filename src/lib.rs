pub mod auth;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod copernicus;
pub mod criteria;
pub mod error;
pub mod query;
pub mod session;
pub mod sink;

pub use auth::Credentials;
pub use batch::{BatchDownloader, BatchReport, DownloadOutcome};
pub use config::Settings;
pub use criteria::{BoundingBox, SearchCriteria};
pub use sink::ZipDirectorySink;
