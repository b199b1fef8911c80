//! Contractor / credit directory seam.
//!
//! External registries (the contractor register, the municipal credit
//! bureau) sit behind the [`Directory`] trait. Exactly two
//! implementations exist: [`MockDirectory`] here (static table, used in
//! development and tests) and the HTTP client in `fisca-api`. Which one
//! runs is decided once from configuration at process start.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from directory lookups.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The upstream registry could not be reached.
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    /// The upstream answered with something unusable.
    #[error("Malformed directory response: {0}")]
    Malformed(String),
}

/// A contractor as the registry knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractorInfo {
    /// Registry code.
    pub code: String,
    /// Legal name.
    pub name: String,
    /// Whether the registration is active.
    pub active: bool,
    /// Whether the contractor is in good credit standing.
    pub in_good_standing: bool,
}

impl ContractorInfo {
    /// A contractor is eligible for new contracts when registered,
    /// active, and in good standing.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.active && self.in_good_standing
    }
}

/// Lookup interface over external registries.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Looks up a contractor by registry code. `Ok(None)` means the code
    /// is unknown, which is not a transport failure.
    async fn contractor(&self, code: &str) -> Result<Option<ContractorInfo>, DirectoryError>;
}

/// Static in-memory directory for development and tests.
#[derive(Debug, Clone, Default)]
pub struct MockDirectory {
    contractors: HashMap<String, ContractorInfo>,
}

impl MockDirectory {
    /// Creates an empty mock directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock with a handful of plausible entries.
    #[must_use]
    pub fn with_samples() -> Self {
        let mut mock = Self::new();
        mock.insert(ContractorInfo {
            code: "CTR-0001".to_string(),
            name: "Alborz Construction Co.".to_string(),
            active: true,
            in_good_standing: true,
        });
        mock.insert(ContractorInfo {
            code: "CTR-0002".to_string(),
            name: "Parsian Road Works".to_string(),
            active: true,
            in_good_standing: false,
        });
        mock.insert(ContractorInfo {
            code: "CTR-0003".to_string(),
            name: "Dormant Holdings".to_string(),
            active: false,
            in_good_standing: true,
        });
        mock
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, info: ContractorInfo) {
        self.contractors.insert(info.code.clone(), info);
    }
}

#[async_trait]
impl Directory for MockDirectory {
    async fn contractor(&self, code: &str) -> Result<Option<ContractorInfo>, DirectoryError> {
        Ok(self.contractors.get(code).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        // The mock never yields, so a noop waker is enough to poll it.
        use std::task::{Context, Poll, Waker};

        let mut context = Context::from_waker(Waker::noop());
        let mut future = Box::pin(future);
        loop {
            if let Poll::Ready(output) = future.as_mut().poll(&mut context) {
                return output;
            }
        }
    }

    #[test]
    fn test_known_contractor_found() {
        let mock = MockDirectory::with_samples();
        let info = block_on(mock.contractor("CTR-0001")).unwrap().unwrap();
        assert!(info.is_eligible());
    }

    #[test]
    fn test_unknown_contractor_is_none() {
        let mock = MockDirectory::with_samples();
        assert!(block_on(mock.contractor("CTR-9999")).unwrap().is_none());
    }

    #[test]
    fn test_eligibility_rules() {
        let mock = MockDirectory::with_samples();
        let bad_credit = block_on(mock.contractor("CTR-0002")).unwrap().unwrap();
        assert!(!bad_credit.is_eligible());
        let inactive = block_on(mock.contractor("CTR-0003")).unwrap().unwrap();
        assert!(!inactive.is_eligible());
    }
}
