//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::fmt::Debug;

use nexus_linked::{Identify, List};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a test-writer subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// Payload with an identity and a value, as stored by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub value: u64,
}

impl Record {
    pub fn new(id: impl Into<String>, value: u64) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

impl Identify for Record {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Asserts the head-to-tail and tail-to-head walks visit the same nodes.
pub fn assert_links_agree<T: Debug>(list: &List<T>) {
    let forward = list.snapshot();

    let mut backward = Vec::with_capacity(forward.len());
    let mut current = list.tail();
    while let Some(node) = current {
        current = list.previous(&node);
        backward.push(node);
        assert!(
            backward.len() <= forward.len(),
            "backward walk longer than forward walk"
        );
    }
    backward.reverse();

    assert_eq!(forward, backward);
    assert_eq!(forward.len(), list.len());
    assert_eq!(list.head(), forward.first().cloned());
    assert_eq!(list.tail(), forward.last().cloned());
}
