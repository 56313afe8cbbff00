/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as an order ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms, collision-free at hub scale)
///
/// Rendered as decimal digits, so IDs never contain the `:` delimiter
/// used by callback action tokens.
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_id_is_positive_and_colon_free() {
        for _ in 0..64 {
            let id = snowflake_id();
            assert!(id > 0);
            assert!(!id.to_string().contains(':'));
        }
    }

    #[test]
    fn test_snowflake_id_mostly_unique() {
        use std::collections::HashSet;
        let ids: HashSet<i64> = (0..32).map(|_| snowflake_id()).collect();
        // Collisions at this sample size would mean the random bits are broken
        assert!(ids.len() >= 30);
    }
}
