pub mod analyzer;
pub mod api;
pub mod client;
pub mod config;
pub mod data_models;
pub mod db;
pub mod indexer;
pub mod preferences;
pub mod query_engine;
