//! Position acquisition abstraction
//!
//! A position request resolves exactly once, to a position or an error. There
//! is no timeout or cancellation at this level.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::PositionError;
use crate::workout::Coordinates;

/// Trait for sources of the user's current position
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Resolve the current position
    async fn current_position(&self) -> Result<Coordinates, PositionError>;
}

/// Position source that reports a configured position
#[derive(Debug, Clone, Default)]
pub struct FixedPosition {
    position: Option<Coordinates>,
}

impl FixedPosition {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        self.position.ok_or(PositionError::NotConfigured)
    }
}

/// Mock position source with scripted responses
#[derive(Debug, Default)]
pub struct MockPositionSource {
    responses: Mutex<VecDeque<Result<Coordinates, PositionError>>>,
    requests: AtomicUsize,
}

impl MockPositionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source whose first request succeeds with `position`
    pub fn at(position: Coordinates) -> Self {
        let source = Self::new();
        source.add_response(Ok(position));
        source
    }

    /// Source whose first request fails with `error`
    pub fn failing(error: PositionError) -> Self {
        let source = Self::new();
        source.add_response(Err(error));
        source
    }

    /// Add a response for the next request
    pub fn add_response(&self, response: Result<Coordinates, PositionError>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Number of requests made so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PositionSource for MockPositionSource {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(PositionError::Unavailable(
                    "no mock response configured".into(),
                ))
            })
    }
}
