//! Structured fan-out over tokio tasks
//!
//! Two shapes are used by the aggregator:
//!
//! - join-all: every task must succeed; the first failure aborts the rest.
//! - race: the first task that finds something wins and the rest are aborted;
//!   declines and failures are collected until every task has reported.
//!
//! Aborting is done by dropping. Every spawned task is owned either by an
//! [`AbortOnDrop`] guard or by a `JoinSet`, so an early return or an outer
//! timeout never leaves a read running in the background.

use crate::probe::ProbeOutcome;
use crate::{Error, Result};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::task::{JoinError, JoinHandle, JoinSet};

/// A spawned task that is aborted when the guard is dropped
pub struct AbortOnDrop<T>(JoinHandle<T>);

impl<T: Send + 'static> AbortOnDrop<T> {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self(tokio::spawn(future))
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl<T> Future for AbortOnDrop<T> {
    type Output = std::result::Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

/// Await a guarded read and fold the join error into the read's own error
pub async fn settle<T, E>(task: AbortOnDrop<std::result::Result<T, E>>) -> Result<T>
where
    Error: From<E>,
{
    match task.await {
        Ok(result) => result.map_err(Error::from),
        Err(err) => Err(Error::TaskFailed(err.to_string())),
    }
}

/// Run every future as its own task and collect the results in input order
///
/// Fails fast: the first error aborts every task still running.
pub async fn join_ordered<T, F>(futures: Vec<F>) -> Result<Vec<T>>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    let mut set = JoinSet::new();
    let mut slots: Vec<Option<T>> = Vec::with_capacity(futures.len());
    for (index, future) in futures.into_iter().enumerate() {
        slots.push(None);
        set.spawn(async move { (index, future.await) });
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, Ok(value))) => slots[index] = Some(value),
            Ok((_, Err(err))) => {
                set.abort_all();
                return Err(err);
            }
            Err(err) => {
                set.abort_all();
                return Err(err.into());
            }
        }
    }

    Ok(slots.into_iter().flatten().collect())
}

/// How a race ended
#[derive(Debug, Default)]
pub struct RaceResult {
    /// Index and finding of the first contender to report one
    pub winner: Option<(usize, String)>,

    pub declined: usize,

    /// Failures seen before the race ended; the index is unknown when the
    /// task itself died
    pub failed: Vec<(Option<usize>, String)>,
}

/// Run every contender as its own task; the first `Found` wins
///
/// The winner aborts the remaining contenders. Without a winner the race
/// ends once every contender has declined or failed.
pub async fn race_first_found<F>(contenders: Vec<F>) -> RaceResult
where
    F: Future<Output = ProbeOutcome> + Send + 'static,
{
    let mut set = JoinSet::new();
    for (index, contender) in contenders.into_iter().enumerate() {
        set.spawn(async move { (index, contender.await) });
    }

    let mut result = RaceResult::default();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, ProbeOutcome::Found(issue))) => {
                set.abort_all();
                result.winner = Some((index, issue));
                break;
            }
            Ok((_, ProbeOutcome::Declined)) => result.declined += 1,
            Ok((index, ProbeOutcome::Failed(reason))) => result.failed.push((Some(index), reason)),
            Err(err) => result.failed.push((None, err.to_string())),
        }
    }
    result
}
