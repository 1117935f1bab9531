//! Repository layer — query functions organized by table.

pub mod afk;
pub mod confessions;
pub mod integrity;
pub mod members;
pub mod moderation_logs;

/// Upper bound applied to every caller-supplied page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`, defaulting to 50.
pub fn page_size(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, MAX_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_clamps() {
        assert_eq!(page_size(None), 50);
        assert_eq!(page_size(Some(0)), 1);
        assert_eq!(page_size(Some(10)), 10);
        assert_eq!(page_size(Some(10_000)), MAX_PAGE_SIZE);
    }
}
