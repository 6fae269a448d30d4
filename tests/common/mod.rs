#![allow(dead_code)]
use axum::body::Body;
use axum::response::{IntoResponse, Response};
use axum::Router;
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use sentinel_fetch::copernicus::Endpoints;
use sentinel_fetch::Settings;
use std::future::IntoFuture;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

pub const TOKEN: &str = "eyJhbGciOiJSUzI1NiJ9.test.signature";

/// An axum app served on an ephemeral local port for the life of the value.
pub struct MockServer {
    pub base: Url,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockServer {
    pub async fn start(app: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        tokio::spawn(server.into_future());

        Self {
            base: Url::parse(&format!("http://{addr}/")).expect("base url"),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn url(&self, path: &str) -> Url {
        self.base.join(path).expect("mock url")
    }

    /// Endpoints laid out as `/catalog/Products`, `/token` and `/odata/`.
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            catalog: self.url("catalog/Products"),
            identity: self.url("token"),
            content: self.url("odata/"),
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            endpoints: self.endpoints(),
            ..Settings::default()
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn hit(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// A catalog body with one polygon record per name, ids `p1`, `p2`, ...
pub fn catalog_body(names: &[&str]) -> serde_json::Value {
    let value: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            serde_json::json!({
                "Id": format!("p{}", i + 1),
                "Name": name,
                "GeoFootprint": {
                    "type": "Polygon",
                    "coordinates": [[[10.0, 10.0], [10.0, 20.0], [20.0, 20.0], [20.0, 10.0], [10.0, 10.0]]]
                }
            })
        })
        .collect();
    serde_json::json!({ "@odata.count": names.len(), "value": value })
}

/// A 200 response whose body breaks off after the first chunk.
pub fn truncated_body() -> Response {
    let head = stream::once(async { Ok::<_, io::Error>(Bytes::from_static(b"PK\x03\x04")) });
    let tail = stream::once(async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Err::<Bytes, _>(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "upstream went away",
        ))
    });
    Body::from_stream(head.chain(tail)).into_response()
}
