//! On-flash layout tests
