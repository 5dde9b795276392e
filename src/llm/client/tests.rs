#[cfg(test)]
mod tests {
    use crate::llm::client::RetryPolicy;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            floor: Duration::from_millis(1),
            ceiling: Duration::from_millis(8),
            multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_transient_failures() {
        let policy = fast_policy(5);
        let calls = AtomicU32::new(0);

        let result = policy
            .run(|| async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(anyhow::anyhow!("transient"))
                } else {
                    Ok(n)
                }
            })
            .await
            .unwrap();

        assert_eq!(result, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_attempt_cap() {
        let policy = fast_policy(3);
        let calls = AtomicU32::new(0);

        let result: anyhow::Result<()> = policy
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow::anyhow!("permanent"))
            })
            .await;

        assert!(result.is_err());
        // 尝试次数受上限约束
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_backoff_delay_is_bounded() {
        let policy = RetryPolicy {
            attempts: 10,
            floor: Duration::from_millis(100),
            ceiling: Duration::from_millis(1000),
            multiplier: 2.0,
        };
        for attempt in 1..10 {
            let delay = policy.delay_for(attempt);
            // 抖动±20%之内仍应落在下限×0.8与上限×1.2之间
            assert!(delay >= Duration::from_millis(80), "attempt {}", attempt);
            assert!(delay <= Duration::from_millis(1200), "attempt {}", attempt);
        }
    }
}
