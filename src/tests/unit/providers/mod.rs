//! Catalog Provider Unit Tests
//!
//! Uses wiremock for HTTP mocking to test:
//! - Request formatting and auth headers
//! - Response parsing (success and error cases)
//! - Item creation round trip

mod rest_tests;
