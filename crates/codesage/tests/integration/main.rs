//! Integration tests for codesage
//!
//! These tests require the language toolchains (python3, node, javac, g++)
//! to be installed on the host.
//! Run with: cargo test -p codesage --features toolchain-tests

#![cfg(feature = "toolchain-tests")]

use std::sync::Arc;
use std::time::Duration;

use codesage::Sandbox;

mod analysis;
mod compilation;
mod execution;

pub(crate) fn test_sandbox() -> Arc<Sandbox> {
    Arc::new(Sandbox::with_limits(Duration::from_secs(5), 2))
}

pub(crate) fn short_deadline_sandbox() -> Arc<Sandbox> {
    Arc::new(Sandbox::with_limits(Duration::from_millis(500), 2))
}
