#![allow(dead_code)]

use anyhow::{Result, bail};
use axum::Router;
use futures::future::BoxFuture;
use mongodb::bson::oid::ObjectId;
use std::path::Path;
use std::sync::Arc;

use scout::api::models::SearchResult;
use scout::api::{AppState, create_router};
use scout::client::Surface;
use scout::data_models::{IndexedDocument, Language};
use scout::db::{DocumentStore, MemoryDocuments};
use scout::query_engine::{QueryEngine, Weighting};

/// Surface that remembers what it was asked to show.
#[derive(Default, Debug)]
pub struct RecordingSurface {
    pub clears: usize,
    pub items: Vec<SearchResult>,
    pub alerts: Vec<String>,
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.clears += 1;
        self.items.clear();
    }

    fn append_item(&mut self, result: &SearchResult) {
        self.items.push(result.clone());
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

pub fn doc(filename: &str, text: &str) -> IndexedDocument {
    IndexedDocument::new(filename.to_string(), text.to_string(), Language::En)
}

pub fn arabic_doc(filename: &str, text: &str) -> IndexedDocument {
    IndexedDocument::new(filename.to_string(), text.to_string(), Language::Ar)
}

pub fn sample_corpus() -> Vec<IndexedDocument> {
    vec![
        doc("rust.txt", "The rust compiler enforces borrow rules at compile time"),
        doc("pasta.txt", "Tomato sauce with garlic and fresh basil over pasta"),
        doc("borrow.txt", "compiler compiler borrow"),
    ]
}

pub fn app_state(documents: Vec<IndexedDocument>) -> AppState {
    AppState::new(
        Arc::new(QueryEngine::new(Weighting::TermFrequency)),
        Arc::new(MemoryDocuments::from_documents(documents)),
    )
}

pub fn router(documents: Vec<IndexedDocument>) -> Router {
    create_router(app_state(documents), Path::new("static"))
}

/// Store whose every call fails, as when the database goes away mid-request.
pub struct FailingStore;

impl DocumentStore for FailingStore {
    fn list_documents(&self) -> BoxFuture<'_, Result<Vec<IndexedDocument>>> {
        Box::pin(async { bail!("disk gone") })
    }

    fn find_document(&self, _id: ObjectId) -> BoxFuture<'_, Result<Option<IndexedDocument>>> {
        Box::pin(async { bail!("disk gone") })
    }

    fn upsert_document(&self, _document: IndexedDocument) -> BoxFuture<'_, Result<ObjectId>> {
        Box::pin(async { bail!("disk gone") })
    }
}

pub fn failing_router() -> Router {
    let state = AppState::new(
        Arc::new(QueryEngine::new(Weighting::TermFrequency)),
        Arc::new(FailingStore),
    );
    create_router(state, Path::new("static"))
}

/// Serves `router` on an ephemeral localhost port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// HTTP client that never routes localhost through a proxy.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
