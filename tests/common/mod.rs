#![allow(dead_code)]

pub use trialflow_test_utils::{builders, fake_executor, init_tracing, with_timeout};
