//! Redis helpers.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// `SET key value NX PX ttl_ms`. Returns `true` if the key was created.
pub async fn set_nx_px(
    conn: &mut ConnectionManager,
    key: &str,
    value: &str,
    ttl_ms: u64,
) -> Result<bool, redis::RedisError> {
    let reply: Option<String> = redis::cmd("SET")
        .arg(key)
        .arg(value)
        .arg("NX")
        .arg("PX")
        .arg(ttl_ms)
        .query_async(conn)
        .await?;
    Ok(reply.is_some())
}

/// Remaining time to live in milliseconds. `None` if the key is gone or has
/// no expiry.
pub async fn pttl(conn: &mut ConnectionManager, key: &str) -> Result<Option<u64>, redis::RedisError> {
    let ms: i64 = conn.pttl(key).await?;
    Ok(u64::try_from(ms).ok())
}

/// Delete a key.
pub async fn del(conn: &mut ConnectionManager, key: &str) -> Result<(), redis::RedisError> {
    conn.del(key).await
}
