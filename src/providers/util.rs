use anyhow::{Error, Result, anyhow};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(anyhow::Error::from) {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Seconds from now until the next occurrence of `hour:minute` UTC.
///
/// Used to expire cached SEC responses when the next daily NAV publication
/// lands.
pub fn seconds_until(hour: u32, minute: u32) -> Result<u64> {
    use chrono::{Duration as ChronoDuration, Utc};

    let now = Utc::now();
    let today_target = now
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| anyhow!("Invalid refresh time {hour}:{minute}"))?
        .and_utc();

    let target = if today_target > now {
        today_target
    } else {
        today_target + ChronoDuration::days(1)
    };

    Ok((target - now).num_seconds().max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_until_is_within_a_day() {
        let secs = seconds_until(19, 0).unwrap();
        assert!(secs <= 24 * 60 * 60);
    }

    #[test]
    fn test_seconds_until_rejects_invalid_time() {
        assert!(seconds_until(25, 0).is_err());
    }
}
