use std::future::Future;

use xsent_core::Post;

use crate::error::HarvestError;

/// The external post source. Date bounds travel inside `query` as
/// `since:`/`until:` operators.
pub trait Harvester: Send + Sync {
    /// Runs one search returning at most `limit` posts.
    fn harvest(
        &self,
        query: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Post>, HarvestError>> + Send;
}
