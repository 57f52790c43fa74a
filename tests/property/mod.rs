//! Property-based tests

mod indent_proptest;
mod reconcile_proptest;
