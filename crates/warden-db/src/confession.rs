//! Anonymous confession submission with a per-user cooldown.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use sqlx::AnyPool;
use warden_common::{
    config::ConfessionConfig,
    error::{WardenError, WardenResult},
    models::{Confession, ConfessionCategory},
    snowflake::Snowflake,
    validation,
};

use crate::{
    cooldown::{CooldownState, CooldownStore},
    repository::confessions,
    Database,
};

#[derive(Clone)]
pub struct ConfessionService {
    pool: AnyPool,
    cooldowns: Arc<dyn CooldownStore>,
    window: Duration,
    max_length: usize,
}

fn cooldown_key(user_id: Snowflake) -> String {
    format!("warden:confess:{user_id}")
}

impl ConfessionService {
    pub fn new(
        pool: AnyPool,
        cooldowns: Arc<dyn CooldownStore>,
        window: Duration,
        max_length: usize,
    ) -> Self {
        Self {
            pool,
            cooldowns,
            window,
            max_length,
        }
    }

    pub fn from_config(db: &Database, config: &ConfessionConfig) -> Self {
        Self::new(
            db.pool.clone(),
            db.cooldown_store(),
            Duration::from_secs(config.rate_limit_secs),
            config.max_length,
        )
    }

    /// Store a confession from `user_id`.
    ///
    /// The submitter is only used as the cooldown key and is not stored. The
    /// cooldown is taken before the insert and handed back if the insert
    /// fails, so a failed submission does not lock the user out.
    pub async fn submit(
        &self,
        user_id: Snowflake,
        category: ConfessionCategory,
        content: &str,
        now: DateTime<Utc>,
    ) -> WardenResult<Confession> {
        validation::validate_confession(content, self.max_length)?;

        let key = cooldown_key(user_id);
        if let CooldownState::Active { remaining } =
            self.cooldowns.try_acquire(&key, self.window).await?
        {
            let retry_after_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX);
            tracing::debug!(retry_after_ms, "Confession rejected by cooldown");
            return Err(WardenError::RateLimited { retry_after_ms });
        }

        match confessions::create(&self.pool, content.trim(), category, now).await {
            Ok(confession) => {
                tracing::info!(id = confession.id, %category, "Confession stored");
                Ok(confession)
            }
            Err(e) => {
                if let Err(release_err) = self.cooldowns.release(&key).await {
                    tracing::warn!(error = %release_err, "Failed to release confession cooldown");
                }
                Err(e.into())
            }
        }
    }

    /// Record the message a confession was posted as.
    pub async fn attach_message(&self, id: i64, message_id: Snowflake) -> WardenResult<Confession> {
        confessions::attach_message(&self.pool, id, message_id)
            .await?
            .ok_or_else(|| WardenError::not_found(format!("Confession #{id}")))
    }

    /// Soft-delete a confession.
    pub async fn remove(&self, id: i64) -> WardenResult<Confession> {
        let confession = confessions::mark_deleted(&self.pool, id).await?;
        tracing::info!(id, "Confession removed");
        Ok(confession)
    }
}
