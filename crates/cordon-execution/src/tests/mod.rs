//! Unit tests for the cordon-execution crate.

mod support;
