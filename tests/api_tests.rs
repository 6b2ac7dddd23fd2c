use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tower::ServiceExt;

use scout::api::models::{DocumentView, SearchResponse};

mod common;
use common::*;

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn post_json<T: DeserializeOwned>(
    router: Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, T) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(router, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

mod results_route {
    use super::*;

    #[tokio::test]
    async fn test_empty_query_is_rejected_in_envelope() {
        let (status, envelope): (_, SearchResponse) = post_json(
            router(sample_corpus()),
            "/results",
            json!({ "query": "   ", "algorithm": "BM" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            envelope.error_message.as_deref(),
            Some("Please enter a search query.")
        );
        assert!(envelope.results.is_none());
    }

    #[tokio::test]
    async fn test_unknown_algorithm_is_rejected_in_envelope() {
        let (status, envelope): (_, SearchResponse) = post_json(
            router(sample_corpus()),
            "/results",
            json!({ "query": "garlic", "algorithm": "bm" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            envelope.error_message.as_deref(),
            Some("Invalid search algorithm selected.")
        );
    }

    #[tokio::test]
    async fn test_missing_fields_read_as_empty() {
        let (status, envelope): (_, SearchResponse) =
            post_json(router(sample_corpus()), "/results", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            envelope.error_message.as_deref(),
            Some("Please enter a search query.")
        );
    }

    #[tokio::test]
    async fn test_successful_search_fills_envelope() {
        let (status, envelope): (_, SearchResponse) = post_json(
            router(sample_corpus()),
            "/results",
            json!({ "query": "compiler borrow", "algorithm": "VM" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(envelope.error_message.is_none());
        assert_eq!(envelope.query.as_deref(), Some("compiler borrow"));
        assert_eq!(envelope.algorithm.as_deref(), Some("VM"));
        assert_eq!(envelope.total_results, Some(3));
        assert!(envelope.processing_time_ms.is_some());

        let results = envelope.results.unwrap();
        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["borrow.txt", "rust.txt", "pasta.txt"]);
        assert!(results[0].url.starts_with("/documents/"));
        assert_eq!(results[0].snippet, "compiler compiler borrow");
    }

    #[tokio::test]
    async fn test_search_without_matches_is_empty_list() {
        let (_, envelope): (_, SearchResponse) = post_json(
            router(sample_corpus()),
            "/results",
            json!({ "query": "quantum", "algorithm": "EBM" }),
        )
        .await;
        assert_eq!(envelope.results, Some(vec![]));
        assert_eq!(envelope.total_results, Some(0));
        assert!(envelope.error_message.is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_is_client_error() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/results")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = send(router(sample_corpus()), request).await;
        assert!(status.is_client_error());
    }
}

mod documents_route {
    use super::*;

    #[tokio::test]
    async fn test_blank_query_lists_every_document() {
        let (status, envelope): (_, SearchResponse) = post_json(
            router(sample_corpus()),
            "/documents",
            json!({ "query": "", "algorithm": "" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(envelope.total_results, Some(3));
        let titles: Vec<String> = envelope
            .results
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["rust.txt", "pasta.txt", "borrow.txt"]);
    }

    #[tokio::test]
    async fn test_query_searches() {
        let (_, envelope): (_, SearchResponse) = post_json(
            router(sample_corpus()),
            "/documents",
            json!({ "query": "garlic", "algorithm": "BM" }),
        )
        .await;
        assert_eq!(envelope.total_results, Some(1));
        assert_eq!(envelope.results.unwrap()[0].title, "pasta.txt");
    }

    #[tokio::test]
    async fn test_query_still_validates_algorithm() {
        let (_, envelope): (_, SearchResponse) = post_json(
            router(sample_corpus()),
            "/documents",
            json!({ "query": "garlic", "algorithm": "XYZ" }),
        )
        .await;
        assert_eq!(
            envelope.error_message.as_deref(),
            Some("Invalid search algorithm selected.")
        );
    }

    #[tokio::test]
    async fn test_get_lists_documents() {
        let (status, body) = get(router(sample_corpus()), "/documents").await;
        assert_eq!(status, StatusCode::OK);
        let envelope: SearchResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.total_results, Some(3));
    }

    #[tokio::test]
    async fn test_get_single_document() {
        let corpus = sample_corpus();
        let id = corpus[1].id.to_hex();
        let (status, body) = get(router(corpus), &format!("/documents/{id}")).await;
        assert_eq!(status, StatusCode::OK);

        let view: DocumentView = serde_json::from_slice(&body).unwrap();
        assert_eq!(view.id, id);
        assert_eq!(view.filename, "pasta.txt");
        assert_eq!(view.language, "en");
        assert!(view.text.contains("garlic"));
    }

    #[tokio::test]
    async fn test_unknown_document_is_not_found() {
        let id = mongodb::bson::oid::ObjectId::new().to_hex();
        let (status, _) = get(router(sample_corpus()), &format!("/documents/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_document_id_is_bad_request() {
        let (status, body) = get(router(sample_corpus()), "/documents/not-an-id").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8_lossy(&body).contains("not-an-id"));
    }
}

mod store_failures {
    use super::*;

    const SEARCH_FAILED: &str = "An error occurred during search: disk gone";
    const LISTING_FAILED: &str = "An error occurred while retrieving documents: disk gone";

    #[tokio::test]
    async fn test_results_reports_search_failure() {
        for algorithm in ["BM", "EBM", "VM"] {
            let (status, envelope): (_, SearchResponse) = post_json(
                failing_router(),
                "/results",
                json!({ "query": "garlic", "algorithm": algorithm }),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(envelope.error_message.as_deref(), Some(SEARCH_FAILED));
            assert!(envelope.results.is_none());
        }
    }

    #[tokio::test]
    async fn test_documents_listing_reports_retrieval_failure() {
        let (status, envelope): (_, SearchResponse) = post_json(
            failing_router(),
            "/documents",
            json!({ "query": " ", "algorithm": "BM" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(envelope.error_message.as_deref(), Some(LISTING_FAILED));

        let (status, body) = get(failing_router(), "/documents").await;
        assert_eq!(status, StatusCode::OK);
        let envelope: SearchResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.error_message.as_deref(), Some(LISTING_FAILED));
    }

    #[tokio::test]
    async fn test_documents_query_reports_search_failure() {
        let (_, envelope): (_, SearchResponse) = post_json(
            failing_router(),
            "/documents",
            json!({ "query": "garlic", "algorithm": "EBM" }),
        )
        .await;
        assert_eq!(envelope.error_message.as_deref(), Some(SEARCH_FAILED));
    }

    #[tokio::test]
    async fn test_validation_runs_before_the_store() {
        let (_, envelope): (_, SearchResponse) = post_json(
            failing_router(),
            "/results",
            json!({ "query": "garlic", "algorithm": "XYZ" }),
        )
        .await;
        assert_eq!(
            envelope.error_message.as_deref(),
            Some("Invalid search algorithm selected.")
        );
    }

    #[tokio::test]
    async fn test_single_document_failure_is_server_error() {
        let id = mongodb::bson::oid::ObjectId::new().to_hex();
        let (status, body) = get(failing_router(), &format!("/documents/{id}")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(String::from_utf8_lossy(&body), LISTING_FAILED);
    }
}
