use async_trait::async_trait;

use crate::domain::{ReferenceLoad, ReferencePolicy};

/// Supplies the reference corpus for a turn.
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    /// Never fails: an unreadable corpus comes back as
    /// [`ReferenceLoad::Unavailable`].
    async fn load(&self) -> ReferenceLoad;

    fn policy(&self) -> ReferencePolicy;
}
