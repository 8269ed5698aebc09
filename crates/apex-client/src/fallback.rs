//! Ordered fallback over alternative requests

use std::future::Future;
use tracing::debug;

/// Run `candidates` strictly in order and return the first success
///
/// A candidate is only started after the previous one failed. Each failure
/// is logged at debug level; `None` means every candidate failed.
pub async fn first_successful<I, F, Fut, T, E>(candidates: I) -> Option<T>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    for (attempt, candidate) in candidates.into_iter().enumerate() {
        match candidate().await {
            Ok(value) => return Some(value),
            Err(error) => debug!(attempt, %error, "candidate failed, trying next"),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn stops_at_first_success() {
        let calls = AtomicUsize::new(0);
        let outcomes: Vec<Result<u32, &str>> = vec![Err("404"), Ok(7), Ok(8)];

        let result = first_successful(outcomes.into_iter().map(|outcome| {
            let calls = &calls;
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                outcome
            }
        }))
        .await;

        assert_eq!(result, Some(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn none_when_all_fail() {
        let outcomes: Vec<Result<u32, String>> = vec![Err("a".into()), Err("b".into())];
        let result = first_successful(
            outcomes
                .into_iter()
                .map(|outcome| move || async move { outcome }),
        )
        .await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn empty_candidates_yield_none() {
        let candidates: Vec<fn() -> std::future::Ready<Result<(), String>>> = Vec::new();
        assert_eq!(first_successful(candidates).await, None);
    }
}
