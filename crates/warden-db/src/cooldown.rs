//! Per-key cooldowns (confession rate limiting).
//!
//! [`MemoryCooldown`] keeps state in-process. [`RedisCooldown`] shares it
//! across processes and is chosen by [`crate::Database::cooldown_store`] when
//! Redis is configured.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tokio::{sync::Mutex, time::Instant};
use warden_common::error::WardenResult;

use crate::redis_pool;

/// Outcome of [`CooldownStore::try_acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownState {
    /// No cooldown was running; one has now been started.
    Ready,
    /// A cooldown is running.
    Active { remaining: Duration },
}

#[async_trait]
pub trait CooldownStore: Send + Sync {
    /// Start a cooldown of `window` for `key` unless one is already running.
    async fn try_acquire(&self, key: &str, window: Duration) -> WardenResult<CooldownState>;

    /// Drop the cooldown for `key`, if any.
    async fn release(&self, key: &str) -> WardenResult<()>;
}

/// In-process cooldowns on the tokio clock.
#[derive(Default)]
pub struct MemoryCooldown {
    expires: Mutex<HashMap<String, Instant>>,
}

impl MemoryCooldown {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CooldownStore for MemoryCooldown {
    async fn try_acquire(&self, key: &str, window: Duration) -> WardenResult<CooldownState> {
        let now = Instant::now();
        let mut expires = self.expires.lock().await;
        expires.retain(|_, until| *until > now);

        if let Some(until) = expires.get(key) {
            return Ok(CooldownState::Active {
                remaining: *until - now,
            });
        }
        expires.insert(key.to_string(), now + window);
        Ok(CooldownState::Ready)
    }

    async fn release(&self, key: &str) -> WardenResult<()> {
        self.expires.lock().await.remove(key);
        Ok(())
    }
}

/// Cooldowns stored as expiring Redis keys.
pub struct RedisCooldown {
    conn: ConnectionManager,
}

impl RedisCooldown {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CooldownStore for RedisCooldown {
    async fn try_acquire(&self, key: &str, window: Duration) -> WardenResult<CooldownState> {
        let mut conn = self.conn.clone();
        let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX).max(1);

        // The key can expire between SET and PTTL; try once more in that case.
        for _ in 0..2 {
            if redis_pool::set_nx_px(&mut conn, key, "1", window_ms).await? {
                return Ok(CooldownState::Ready);
            }
            if let Some(ms) = redis_pool::pttl(&mut conn, key).await? {
                return Ok(CooldownState::Active {
                    remaining: Duration::from_millis(ms),
                });
            }
        }
        tracing::warn!(key, "Cooldown key kept vanishing between SET and PTTL");
        Ok(CooldownState::Active {
            remaining: Duration::ZERO,
        })
    }

    async fn release(&self, key: &str) -> WardenResult<()> {
        let mut conn = self.conn.clone();
        redis_pool::del(&mut conn, key).await?;
        Ok(())
    }
}
