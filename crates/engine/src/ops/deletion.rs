use crate::{Capability, DeleteToken, DeletionStep, ResultEngine};

use super::Engine;

impl Engine {
    /// Opens the deletion workflow: the first page of the conversation
    /// becomes the candidate list.
    pub async fn delete_menu(
        &self,
        conversation_key: &str,
        capability: Capability,
    ) -> ResultEngine<DeletionStep> {
        if !capability.is_admin() {
            return Ok(DeletionStep::Ignored);
        }

        let page = self.page(conversation_key, 1).await?;
        if page.transactions.is_empty() {
            return Ok(DeletionStep::Nothing);
        }
        Ok(DeletionStep::Selecting(page.transactions))
    }

    /// Advances the deletion workflow with a token from a previous step.
    ///
    /// The capability is checked again on every step, so a replayed token
    /// from a non-admin does nothing. Confirming an id that no longer exists
    /// still reports [`DeletionStep::Deleted`].
    pub async fn delete_step(
        &self,
        conversation_key: &str,
        capability: Capability,
        token: DeleteToken,
    ) -> ResultEngine<DeletionStep> {
        if !capability.is_admin() {
            return Ok(DeletionStep::Ignored);
        }

        match token {
            DeleteToken::Select(id) => Ok(self
                .transaction(conversation_key, id)
                .await?
                .map_or(DeletionStep::Gone(id), DeletionStep::Confirming)),
            DeleteToken::Confirm(id) => {
                let removed = self.delete(conversation_key, id).await?;
                tracing::info!(
                    "delete of transaction {id} in {conversation_key} confirmed (removed: {removed})"
                );
                Ok(DeletionStep::Deleted(id))
            }
            DeleteToken::Cancel(id) => Ok(DeletionStep::Cancelled(id)),
        }
    }
}
