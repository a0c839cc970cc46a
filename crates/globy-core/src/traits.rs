use crate::types::ImageItem;
use futures::future::BoxFuture;

/// Abstracts the lookup backend so the controller can be driven by a fake
/// transport in tests.
///
/// The returned future must own everything it captures (`'static`): the
/// controller runs it in a spawned task and cancels a superseded lookup by
/// aborting that task, so the future cannot borrow from the caller.
pub trait SearchTransport: Send + Sync {
    fn search(&self, query: &str) -> BoxFuture<'static, anyhow::Result<Vec<ImageItem>>>;
}
