//! Wall-clock estimate for a block-height expiry
//!
//! A linear projection over the average block interval. The chain gives
//! no better signal, so the estimate drifts with actual block times;
//! good enough for "expires in about three hours" displays.

use chrono::{DateTime, Duration, Utc};

/// Estimate when `target_block` will be (or was) mined.
///
/// A target below the current height lands in the past, which callers
/// must read as "already expired", not as an error.
pub fn estimate_expiry(
    target_block: u64,
    current_block: u64,
    block_interval_secs: u64,
) -> DateTime<Utc> {
    let delta_blocks = target_block as i64 - current_block as i64;
    Utc::now() + Duration::seconds(delta_blocks * block_interval_secs as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn future_block_projects_forward() {
        let before = Utc::now();
        let estimate = estimate_expiry(100, 90, 2);
        let after = Utc::now();

        // 10 blocks ahead at 2s each = 20s out
        assert!(estimate >= before + Duration::seconds(20));
        assert!(estimate <= after + Duration::seconds(20));
    }

    #[test]
    fn past_block_projects_backward() {
        let estimate = estimate_expiry(80, 90, 2);
        assert!(estimate < Utc::now(), "target below current height is already expired");
    }

    #[test]
    fn current_block_is_roughly_now() {
        let before = Utc::now();
        let estimate = estimate_expiry(90, 90, 2);
        assert!(estimate >= before && estimate <= Utc::now());
    }
}
