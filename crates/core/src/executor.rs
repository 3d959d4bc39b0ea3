//! Transaction submission and outcome classification.

use creek_chain::{ChainClient, TransactionRequest, TransactionResult, TransactionSigner};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::DelayRange;
use crate::error::{ActionError, ActionResult};
use crate::timing::pause;

/// Submits built transactions and decides success from the declared status.
pub struct TransactionExecutor {
    chain: Arc<dyn ChainClient>,
    /// Pause after every successful execution
    cooldown: DelayRange,
}

impl TransactionExecutor {
    pub fn new(chain: Arc<dyn ChainClient>, cooldown: DelayRange) -> Self {
        Self { chain, cooldown }
    }

    /// Sign, submit and classify `request`.
    ///
    /// A failed status becomes [`ActionError::OnChainExecution`]; the
    /// cooldown only runs after a success.
    #[instrument(skip(self, request, signer), fields(address = %signer.address()))]
    pub async fn execute(
        &self,
        label: &str,
        request: &TransactionRequest,
        signer: &dyn TransactionSigner,
    ) -> ActionResult<TransactionResult> {
        let result = self.chain.submit_transaction(request, signer).await?;

        if !result.is_success() {
            let reason = result
                .error
                .clone()
                .unwrap_or_else(|| "unknown failure".to_string());
            warn!(
                action = label,
                digest = %result.short_digest(),
                reason = %reason,
                "Transaction failed on chain"
            );
            return Err(ActionError::OnChainExecution {
                digest: result.digest,
                reason,
            });
        }

        info!(
            action = label,
            digest = %result.short_digest(),
            commands = request.commands.len(),
            "Transaction succeeded"
        );
        pause(self.cooldown, "post-success cooldown").await;
        Ok(result)
    }
}
