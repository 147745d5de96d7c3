//! Correction collaborator boundary

use crate::error::CorrectionError;
use crate::types::{CorrectionMode, CorrectionResult};

/// External text-correction service
///
/// The session only depends on this contract; the concrete provider, its
/// prompts and its response schema live behind it.
#[async_trait::async_trait]
pub trait Corrector: Send + Sync {
    /// Correct `text` using the profile for `mode`
    async fn perform_correction(
        &self,
        text: &str,
        mode: CorrectionMode,
    ) -> Result<CorrectionResult, CorrectionError>;

    /// Return the name of this corrector for logging
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrector_trait_object_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Corrector>();
    }
}
