mod common;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use common::{catalog_body, MockServer, TOKEN};
use reqwest::Client;
use sentinel_fetch::auth::{Credentials, TokenProvider};
use sentinel_fetch::catalog::CatalogClient;
use sentinel_fetch::error::{AuthError, CatalogError};
use std::collections::HashMap;

#[tokio::test]
async fn test_search_sends_odata_params() {
    let app = Router::new().route(
        "/catalog/Products",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            let ok = params.get("$filter").map(String::as_str) == Some("Collection/Name eq 'SENTINEL-2'")
                && params.get("$count").map(String::as_str) == Some("True")
                && params.get("$top").map(String::as_str) == Some("1000");
            if ok {
                Ok(Json(catalog_body(&["S2A_MSIL2A_20230101.SAFE", "S2B_MSIL2A_20230103.SAFE"])))
            } else {
                Err(StatusCode::BAD_REQUEST)
            }
        }),
    );
    let server = MockServer::start(app).await;
    let catalog = CatalogClient::new(Client::new(), server.endpoints().catalog);

    let results = catalog
        .search("Collection/Name eq 'SENTINEL-2'")
        .await
        .unwrap();

    assert_eq!(results.total, 2);
    let identifiers: Vec<_> = results.records.iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(identifiers, vec!["S2A_MSIL2A_20230101", "S2B_MSIL2A_20230103"]);
}

#[tokio::test]
async fn test_search_error_status() {
    let app = Router::new().route(
        "/catalog/Products",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
    );
    let server = MockServer::start(app).await;
    let catalog = CatalogClient::new(Client::new(), server.endpoints().catalog);

    let err = catalog.search("x").await.unwrap_err();
    assert!(matches!(err, CatalogError::Status(StatusCode::SERVICE_UNAVAILABLE)));
}

#[tokio::test]
async fn test_search_malformed_body() {
    let app = Router::new().route("/catalog/Products", get(|| async { "<html>oops</html>" }));
    let server = MockServer::start(app).await;
    let catalog = CatalogClient::new(Client::new(), server.endpoints().catalog);

    let err = catalog.search("x").await.unwrap_err();
    assert!(matches!(err, CatalogError::Malformed(_)));
}

fn identity_app() -> Router {
    Router::new().route(
        "/token",
        post(|Form(form): Form<HashMap<String, String>>| async move {
            let expected = [
                ("client_id", "cdse-public"),
                ("username", "operator"),
                ("password", "secret"),
                ("grant_type", "password"),
            ];
            let valid = expected
                .iter()
                .all(|(k, v)| form.get(*k).map(String::as_str) == Some(*v));
            if valid {
                Ok(Json(serde_json::json!({
                    "access_token": TOKEN,
                    "expires_in": 600,
                    "token_type": "Bearer"
                })))
            } else {
                Err((StatusCode::UNAUTHORIZED, "invalid_grant"))
            }
        }),
    )
}

#[tokio::test]
async fn test_authenticate() {
    let server = MockServer::start(identity_app()).await;
    let tokens = TokenProvider::new(Client::new(), server.endpoints().identity);

    let token = tokens
        .authenticate(&Credentials::new("operator", "secret"))
        .await
        .unwrap();
    assert_eq!(token.secret(), TOKEN);
}

#[tokio::test]
async fn test_authenticate_rejected() {
    let server = MockServer::start(identity_app()).await;
    let tokens = TokenProvider::new(Client::new(), server.endpoints().identity);

    let err = tokens
        .authenticate(&Credentials::new("operator", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Rejected {
            status: StatusCode::UNAUTHORIZED
        }
    ));
}

#[tokio::test]
async fn test_authenticate_without_token_field() {
    let app = Router::new().route(
        "/token",
        post(|| async { Json(serde_json::json!({"token_type": "Bearer"})) }),
    );
    let server = MockServer::start(app).await;
    let tokens = TokenProvider::new(Client::new(), server.endpoints().identity);

    let err = tokens
        .authenticate(&Credentials::new("operator", "secret"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::MissingToken));
}
