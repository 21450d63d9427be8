//! Catalog browsing, viewing history and rule-based recommendations for a
//! streaming demo, served over HTTP from a single JSON document.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
