// Copyright 2025 Lars Brubaker
// License: MIT
//
// Error type shared by the sweep engines.
//
// Every fallible step (pool growth, heap growth, renderer callback) returns
// crate::Result and is propagated with `?`; sweep state is owned by the
// calling frame, so an early return releases every pool.

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A pool, heap, or span buffer failed to grow.
    #[error("out of memory while growing sweep storage")]
    NoMemory,

    /// The span renderer or trapezoid sink reported a failure.
    #[error("renderer failed: {0}")]
    Renderer(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A rectilinear-only entry point was handed a sloped edge.
    #[error("input contains non axis-aligned edges")]
    NotRectilinear,
}

impl Error {
    /// Wrap an arbitrary renderer error.
    pub fn renderer<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Renderer(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::NoMemory
    }
}

impl From<smallvec::CollectionAllocErr> for Error {
    fn from(_: smallvec::CollectionAllocErr) -> Self {
        Error::NoMemory
    }
}
