//! Integration tests
//!
//! End-to-end flows through the public API of each component

mod api_test;
mod bus_test;
mod config_test;
mod editor_test;
