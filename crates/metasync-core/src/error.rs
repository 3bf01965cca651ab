//! Error types for `metasync-core`.

use thiserror::Error;

use crate::{asset::AssetKind, synchronizer::LoopState};

/// A boxed collaborator error, as it crosses a trait seam.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
  /// Required connection or connector settings are missing.
  #[error("configuration error: {0}")]
  Configuration(String),

  /// The catalog could not be opened or enumerated.
  #[error("catalog source unavailable: {0}")]
  SourceUnavailable(#[source] BoxError),

  /// A single object could not be extracted; the rest of the pass continues.
  #[error("failed to extract {kind} {name}: {source}")]
  Extraction {
    kind:   AssetKind,
    name:   String,
    #[source]
    source: BoxError,
  },

  /// The sink rejected one asset.
  #[error("sink rejected asset {id}: {source}")]
  Sink {
    id:     String,
    #[source]
    source: BoxError,
  },

  #[error("state store error: {0}")]
  StateStore(#[source] BoxError),

  #[error("synchronizer cannot {action} while {state}")]
  Lifecycle {
    action: &'static str,
    state:  LoopState,
  },
}

impl Error {
  pub fn source_unavailable(
    e: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::SourceUnavailable(Box::new(e))
  }

  pub fn state_store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::StateStore(Box::new(e))
  }

  /// Whether this failure is confined to a single object.
  pub fn is_partial(&self) -> bool {
    matches!(self, Self::Extraction { .. } | Self::Sink { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
