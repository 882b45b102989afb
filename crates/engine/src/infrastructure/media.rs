//! Media search adapters.

use async_trait::async_trait;

use crate::infrastructure::ports::{MediaError, MediaRef, MediaSearchPort};

/// Media search that never finds anything; hints are shown as text only.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMediaSearch;

#[async_trait]
impl MediaSearchPort for NoMediaSearch {
    async fn search(&self, _query: &str) -> Result<Option<MediaRef>, MediaError> {
        Ok(None)
    }
}
