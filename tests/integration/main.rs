//! Integration tests for Catalog Miner
//!
//! These tests use wiremock to stand in for both a storefront and the
//! ingestion API, and run the pipeline end-to-end over real HTTP.

mod common;
mod http_tests;
mod pipeline_tests;
