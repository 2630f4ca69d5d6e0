//! Block device tests
