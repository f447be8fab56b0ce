//! Bounded fan-out over blocking jobs.

use anyhow::anyhow;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

/// Run `job` over every item with at most `limit` jobs in flight.
///
/// Results come back in input order. After the first failure no further job
/// is dispatched; jobs already running are drained and the first error (in
/// completion order) is returned. A `limit` of zero is treated as one.
pub async fn run_bounded<T, R, F>(items: Vec<T>, limit: usize, job: F) -> anyhow::Result<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> anyhow::Result<R> + Send + Sync + 'static,
{
    let limit = limit.max(1);
    let total = items.len();
    let job = Arc::new(job);

    let mut pending = items.into_iter().enumerate();
    let mut results: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();
    let mut set: JoinSet<(usize, anyhow::Result<R>)> = JoinSet::new();
    let mut first_error: Option<anyhow::Error> = None;

    debug!(jobs = total, limit, "dispatching worker pool");

    loop {
        while first_error.is_none() && set.len() < limit {
            let Some((index, item)) = pending.next() else {
                break;
            };
            let job = Arc::clone(&job);
            set.spawn_blocking(move || (index, job(item)));
        }

        let Some(joined) = set.join_next().await else {
            break;
        };

        match joined {
            Ok((index, Ok(value))) => results[index] = Some(value),
            Ok((index, Err(err))) => {
                debug!(job = index, "worker job failed");
                first_error.get_or_insert(err);
            }
            Err(join_err) => {
                first_error.get_or_insert(anyhow!("worker panicked: {join_err}"));
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }

    results
        .into_iter()
        .enumerate()
        .map(|(index, r)| r.ok_or_else(|| anyhow!("worker job {index} produced no result")))
        .collect()
}
