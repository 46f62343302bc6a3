//! Integration tests with mock HTTP server

mod engine_http;
mod mock_server;
