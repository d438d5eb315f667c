//! Merchant registry.

use std::collections::HashMap;

use crate::error::DomainError;

/// Pre-loaded merchant credentials, read-only for the life of the
/// service. Merchants are identities here, not entities: an id paired
/// with the API key it must present.
#[derive(Debug, Clone, Default)]
pub struct MerchantDirectory {
    api_keys: HashMap<String, String>,
}

impl MerchantDirectory {
    pub fn preloaded(api_keys: HashMap<String, String>) -> MerchantDirectory {
        MerchantDirectory { api_keys }
    }

    /// Unknown merchants and wrong keys are deliberately the same error.
    pub fn authenticate(&self, merchant_id: &str, api_key: &str) -> Result<(), DomainError> {
        if self.api_keys.get(merchant_id).map(String::as_str) != Some(api_key) {
            return Err(DomainError::InvalidMerchant);
        }
        Ok(())
    }
}
