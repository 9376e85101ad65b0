//! Freemium usage accounting after a successful submission.

use std::sync::Arc;

use scheduleprep_domain::{Freemium, Result};
use tracing::{debug, info};

use crate::scheduling_ports::UsageCounterRepository;

pub struct UsageMeter {
    repository: Arc<dyn UsageCounterRepository>,
}

impl UsageMeter {
    pub fn new(repository: Arc<dyn UsageCounterRepository>) -> Self {
        Self { repository }
    }

    /// Decrement the user's remaining usage by one.
    ///
    /// Returns the updated counter, or `None` when the user has no counter
    /// or it is already exhausted.
    pub async fn record_submission(&self, user_id: &str) -> Result<Option<Freemium>> {
        let Some(counter) = self.repository.get_freemium_by_user_id(user_id).await? else {
            debug!(user_id, "no usage counter");
            return Ok(None);
        };
        if counter.usage <= 0 {
            debug!(user_id, "usage already exhausted");
            return Ok(None);
        }

        let updated = self.repository.update_freemium_usage(&counter.id, counter.usage - 1).await?;
        info!(user_id, remaining = updated.usage, "usage recorded");
        Ok(Some(updated))
    }
}
