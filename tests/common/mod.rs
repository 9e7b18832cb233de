#![allow(dead_code)]

pub use batchgrade_test_utils::builders;
pub use batchgrade_test_utils::fake_backend;
pub use batchgrade_test_utils::{init_tracing, with_timeout};
