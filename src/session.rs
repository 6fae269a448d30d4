use crate::auth::AuthToken;
use crate::copernicus::Endpoints;
use crate::error::DownloadError;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode};
use tracing::debug;
use url::Url;

pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Statuses that send the session to another location.
fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
    )
}

enum FetchState {
    Requesting(Url),
    Redirecting { response: Response, url: Url, hops: usize },
    Fetching(Response),
    Done(Bytes),
    Failed(DownloadError),
}

/// Authenticated HTTP context shared by every download in a batch.
///
/// The client never follows redirects by itself: the content endpoint hands
/// out a chain of 3xx hops to the storage host, and each hop is resolved
/// explicitly so the chain length stays bounded.
pub struct DownloadSession {
    client: Client,
    endpoints: Endpoints,
    max_redirects: usize,
}

impl DownloadSession {
    pub fn new(
        token: &AuthToken,
        endpoints: Endpoints,
        max_redirects: usize,
    ) -> Result<Self, DownloadError> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.secret()))
            .map_err(|_| DownloadError::InvalidToken)?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .redirect(Policy::none())
            .build()
            .map_err(DownloadError::Client)?;

        Ok(Self {
            client,
            endpoints,
            max_redirects,
        })
    }

    pub async fn fetch(&self, product_id: &str) -> Result<Bytes, DownloadError> {
        let url = self.endpoints.product_url(product_id)?;
        self.fetch_url(url).await
    }

    pub async fn fetch_url(&self, url: Url) -> Result<Bytes, DownloadError> {
        let mut state = FetchState::Requesting(url);
        loop {
            state = match state {
                FetchState::Requesting(url) => match self.get(url.clone()).await {
                    Ok(response) => self.classify(response, url, 0),
                    Err(e) => FetchState::Failed(e),
                },
                FetchState::Redirecting {
                    response,
                    url,
                    hops,
                } => {
                    if hops > self.max_redirects {
                        FetchState::Failed(DownloadError::TooManyRedirects(self.max_redirects))
                    } else {
                        match next_location(&response, &url) {
                            Ok(next) => {
                                debug!(hop = hops, location = %next, "Following redirect");
                                match self.get(next.clone()).await {
                                    Ok(response) => self.classify(response, next, hops),
                                    Err(e) => FetchState::Failed(e),
                                }
                            }
                            Err(e) => FetchState::Failed(e),
                        }
                    }
                }
                FetchState::Fetching(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        FetchState::Failed(DownloadError::Status(status))
                    } else {
                        match response.bytes().await {
                            Ok(bytes) => FetchState::Done(bytes),
                            Err(e) => FetchState::Failed(DownloadError::Body(e)),
                        }
                    }
                }
                FetchState::Done(bytes) => return Ok(bytes),
                FetchState::Failed(e) => return Err(e),
            };
        }
    }

    fn classify(&self, response: Response, url: Url, hops: usize) -> FetchState {
        if is_redirect(response.status()) {
            FetchState::Redirecting {
                response,
                url,
                hops: hops + 1,
            }
        } else {
            FetchState::Fetching(response)
        }
    }

    async fn get(&self, url: Url) -> Result<Response, DownloadError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(DownloadError::Request)
    }
}

fn next_location(response: &Response, current: &Url) -> Result<Url, DownloadError> {
    let location = response
        .headers()
        .get(LOCATION)
        .ok_or(DownloadError::MissingLocation(response.status()))?;
    let location = location.to_str().map_err(|_| {
        DownloadError::InvalidLocation(String::from_utf8_lossy(location.as_bytes()).into_owned())
    })?;
    current
        .join(location)
        .map_err(|_| DownloadError::InvalidLocation(location.to_string()))
}
