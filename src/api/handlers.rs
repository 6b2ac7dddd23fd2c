use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mongodb::bson::oid::ObjectId;
use std::time::Instant;

use crate::query_engine::{Algorithm, SearchError};

use super::AppState;
use super::models::{DocumentView, SearchRequest, SearchResponse, SearchResult};

/// `POST /results`
pub async fn results_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Json<SearchResponse> {
    Json(run_search(&state, request).await)
}

/// `POST /documents`: a blank query lists every document, anything else searches.
pub async fn documents_search_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Json<SearchResponse> {
    if request.query.trim().is_empty() {
        return Json(list_documents(&state).await);
    }
    Json(run_search(&state, request).await)
}

/// `GET /documents`
pub async fn documents_list_handler(State(state): State<AppState>) -> Json<SearchResponse> {
    Json(list_documents(&state).await)
}

/// `GET /documents/:id`
pub async fn document_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentView>, (StatusCode, String)> {
    let id = ObjectId::parse_str(&id)
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("Invalid document id: {id}")))?;

    let document = state.store.find_document(id).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            SearchError::Retrieval(e).to_string(),
        )
    })?;

    document
        .map(|d| Json(DocumentView::from(d)))
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Document not found".to_string()))
}

fn validate(request: &SearchRequest) -> Result<Algorithm, SearchError> {
    if request.query.trim().is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    request.algorithm.parse()
}

async fn run_search(state: &AppState, request: SearchRequest) -> SearchResponse {
    let start = Instant::now();

    let algorithm = match validate(&request) {
        Ok(algorithm) => algorithm,
        Err(e) => {
            log::debug!("rejected search request {:?}: {}", request, e);
            return SearchResponse::error(e.to_string());
        }
    };

    let ranked = match state
        .engine
        .search(state.store.as_ref(), &request.query, algorithm)
        .await
    {
        Ok(ranked) => ranked,
        Err(e) => {
            log::error!("search failed: {:#}", e);
            return SearchResponse::error(SearchError::Search(e).to_string());
        }
    };

    let results: Vec<SearchResult> = ranked
        .iter()
        .map(|scored| SearchResult::from_document(&scored.document))
        .collect();

    log::info!(
        "{} search for {:?} returned {} results",
        algorithm,
        request.query,
        results.len()
    );

    SearchResponse {
        query: Some(request.query),
        algorithm: Some(algorithm.to_string()),
        processing_time_ms: Some(start.elapsed().as_millis()),
        ..SearchResponse::with_results(results)
    }
}

async fn list_documents(state: &AppState) -> SearchResponse {
    let start = Instant::now();
    match state.store.list_documents().await {
        Ok(documents) => {
            let results = documents.iter().map(SearchResult::from_document).collect();
            SearchResponse {
                processing_time_ms: Some(start.elapsed().as_millis()),
                ..SearchResponse::with_results(results)
            }
        }
        Err(e) => {
            log::error!("listing documents failed: {:#}", e);
            SearchResponse::error(SearchError::Retrieval(e).to_string())
        }
    }
}
