//! Offset pagination for list endpoints, `{data, total}` envelope.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    10
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl PageQuery {
    pub const MAX_LIMIT: u64 = 100;

    /// Offset of the first row of the requested page.
    pub fn offset(&self) -> Result<u64, ApiError> {
        if self.page < 1 {
            return Err(ApiError::validation("Le numéro de page doit être >= 1"));
        }
        if self.limit < 1 || self.limit > Self::MAX_LIMIT {
            return Err(ApiError::validation(format!(
                "La limite doit être comprise entre 1 et {}",
                Self::MAX_LIMIT
            )));
        }
        Ok((self.page - 1) * self.limit)
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
}
