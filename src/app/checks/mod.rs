mod based_on_ubi;

pub use based_on_ubi::BasedOnUbiCheck;

use std::sync::Arc;

use crate::app::ImageReference;
use crate::domain::certification::{
    check_error::CheckError, help_text::HelpText, metadata::Metadata,
};

/// A single, independently evaluable unit of certification policy.
///
/// `validate` returns `Ok(false)` when the image was fully evaluated and does
/// not satisfy the policy, and `Err` only when no verdict could be reached.
/// Implementations must not keep state between invocations.
#[async_trait::async_trait]
pub trait Check: Send + Sync {
    async fn validate(&self, image: &ImageReference) -> Result<bool, CheckError>;

    fn name(&self) -> &str;

    fn metadata(&self) -> Metadata;

    fn help(&self) -> HelpText;
}

/// Every check the container policy is made of, in reporting order.
pub fn container_policy() -> Vec<Arc<dyn Check>> {
    vec![Arc::new(BasedOnUbiCheck) as Arc<dyn Check>]
}
