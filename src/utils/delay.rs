// src/utils/delay.rs

//! Randomised waits between requests.

use std::time::Duration;

use rand::Rng;

use crate::models::DelayRange;

/// Draw a duration from `range`.
pub fn pick(range: DelayRange) -> Duration {
    if range.is_zero() {
        return Duration::ZERO;
    }
    let lo = range.min_ms.min(range.max_ms);
    let ms = rand::thread_rng().gen_range(lo..=range.max_ms);
    Duration::from_millis(ms)
}

/// Sleep for a random duration drawn from `range`.
pub async fn random_pause(range: DelayRange, reason: &str) {
    let wait = pick(range);
    if wait.is_zero() {
        return;
    }
    log::debug!("Waiting {} ms ({})", wait.as_millis(), reason);
    tokio::time::sleep(wait).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_within_range() {
        let range = DelayRange::new(10, 20);
        for _ in 0..100 {
            let d = pick(range);
            assert!(d >= Duration::from_millis(10) && d <= Duration::from_millis(20));
        }
    }

    #[test]
    fn test_zero_range_is_immediate() {
        assert_eq!(pick(DelayRange::none()), Duration::ZERO);
    }
}
