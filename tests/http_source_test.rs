use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use news_fetch_engine::config::NewsApiConfig;
use news_fetch_engine::model::category::Category;
use news_fetch_engine::source::http_source::NewsApiSource;
use news_fetch_engine::source::traits::ContentSource;

const API_KEY: &str = "test-key";
const EXHAUSTED_KEY: &str = "exhausted-key";

fn article(title: &str, url: &str) -> serde_json::Value {
    json!({
        "source": {"id": null, "name": "Fake Wire"},
        "author": "Reporter",
        "title": title,
        "description": "desc",
        "url": url,
        "urlToImage": null,
        "publishedAt": "2023-06-07T10:00:00Z",
        "content": null
    })
}

/// Fake NewsAPI `top-headlines`: echoes the query back in article titles.
async fn top_headlines(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let key = headers
        .get("X-Api-Key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if key == EXHAUSTED_KEY {
        return Json(json!({
            "status": "error",
            "code": "rateLimited",
            "message": "You have made too many requests recently."
        }))
        .into_response();
    }
    if key != API_KEY {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Your API key is invalid."
            })),
        )
            .into_response();
    }

    let selector = params
        .get("category")
        .or_else(|| params.get("sources"))
        .cloned()
        .unwrap_or_default();

    let page = params.get("page").cloned().unwrap_or_default();
    let page_size = params.get("pageSize").cloned().unwrap_or_default();
    let title = format!("{}:{}:{}", selector, page, page_size);

    Json(json!({
        "status": "ok",
        "totalResults": 3,
        "articles": [
            article(&title, "https://example.com/1"),
            article("[Removed]", "https://removed.com"),
            article(&format!("{} second", title), "https://example.com/2"),
        ]
    }))
    .into_response()
}

async fn start_server() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = Router::new().route("/top-headlines", get(top_headlines));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

fn source_for(addr: SocketAddr, api_key: &str) -> NewsApiSource {
    NewsApiSource::new(NewsApiConfig {
        base_url: format!("http://{}/", addr),
        api_key: api_key.to_string(),
    })
}

#[tokio::test]
async fn test_fetch_general_top_headlines() {
    let (addr, _handle) = start_server().await;
    let source = source_for(addr, API_KEY);

    let articles = source.fetch(Category::General, 0, 10).await.unwrap();
    // The "[Removed]" placeholder is dropped.
    assert_eq!(articles.len(), 2);
    // Engine page 0 is upstream page 1.
    assert_eq!(articles[0].title, "general:1:10");
    assert_eq!(articles[1].title, "general:1:10 second");
    assert_eq!(articles[0].author_text(), "Reporter");
}

#[tokio::test]
async fn test_fetch_publisher_uses_sources_param() {
    let (addr, _handle) = start_server().await;
    let source = source_for(addr, API_KEY);

    let articles = source.fetch(Category::Bloomberg, 2, 5).await.unwrap();
    assert_eq!(articles[0].title, "bloomberg:3:5");
}

#[tokio::test]
async fn test_auth_rejection_surfaces_api_message() {
    let (addr, _handle) = start_server().await;
    let source = source_for(addr, "wrong-key");

    let err = source.fetch(Category::Axios, 0, 10).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("HTTP 401"), "{}", msg);
    assert!(msg.contains("apiKeyInvalid"), "{}", msg);

    source.update_api_key(API_KEY.to_string());
    assert!(source.fetch(Category::Axios, 0, 10).await.is_ok());
}

#[tokio::test]
async fn test_error_status_in_ok_response() {
    let (addr, _handle) = start_server().await;
    let source = source_for(addr, EXHAUSTED_KEY);

    let err = source.fetch(Category::General, 0, 10).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "rateLimited: You have made too many requests recently."
    );
}

#[tokio::test]
async fn test_unreachable_host_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = source_for(addr, API_KEY);
    assert!(source.fetch(Category::General, 0, 10).await.is_err());
}
