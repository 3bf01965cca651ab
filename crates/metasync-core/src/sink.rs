//! The sink that receives assets.

use std::future::Future;

use crate::asset::Asset;

/// Receives one asset per call.
///
/// Implementations must treat repeated pushes of the same [`Asset::id`] as an
/// upsert. A returned error affects only that asset: the pass logs it and
/// moves on to the next one.
pub trait AssetSink: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn on_asset_updated<'a>(
    &'a self,
    asset: &'a Asset,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

impl<T: AssetSink> AssetSink for std::sync::Arc<T> {
  type Error = T::Error;

  fn on_asset_updated<'a>(
    &'a self,
    asset: &'a Asset,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a {
    (**self).on_asset_updated(asset)
  }
}
