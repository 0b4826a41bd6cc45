use crate::chunk::{complement, trials};
use crate::types::{Reduction, Stats};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::convert::Infallible;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

pub fn ddmin_parallel<T, F>(elements: Vec<T>, oracle: F, pool: &ThreadPool) -> Reduction<T>
where
    T: Clone + Send + Sync,
    F: Fn(&[T]) -> bool + Sync,
{
    match try_ddmin_parallel(
        elements,
        |candidate| Ok::<_, Infallible>(oracle(candidate)),
        pool,
    ) {
        Ok(reduction) => reduction,
        Err(never) => match never {},
    }
}

pub fn try_ddmin_parallel<T, E, F>(
    elements: Vec<T>,
    oracle: F,
    pool: &ThreadPool,
) -> Result<Reduction<T>, E>
where
    T: Clone + Send + Sync,
    E: Send,
    F: Fn(&[T]) -> Result<bool, E> + Sync,
{
    let original_len = elements.len();
    let oracle_calls = AtomicU64::new(0);
    let mut rounds = 0;
    let mut current = elements;
    let mut granularity = 2;

    while current.len() >= 2 {
        rounds += 1;
        let round: Vec<(usize, Range<usize>)> = trials(current.len(), granularity).collect();
        let winner = pool.install(|| {
            round.par_iter().find_map_first(|(index, chunk)| {
                let candidate = complement(&current, chunk.clone());
                oracle_calls.fetch_add(1, Ordering::Relaxed);
                match oracle(&candidate) {
                    Ok(true) => Some(Ok((*index, candidate))),
                    Ok(false) => {
                        trace!(granularity, index, "trial did not reproduce");
                        None
                    }
                    Err(err) => Some(Err(err)),
                }
            })
        });

        match winner.transpose()? {
            Some((index, candidate)) => {
                debug!(
                    from = current.len(),
                    to = candidate.len(),
                    granularity,
                    index,
                    "adopted complement"
                );
                current = candidate;
                granularity = 2;
            }
            None => {
                if granularity >= current.len() {
                    break;
                }
                granularity = (granularity * 2).min(current.len());
                debug!(len = current.len(), granularity, "increased granularity");
            }
        }
    }

    let stats = Stats {
        oracle_calls: oracle_calls.into_inner(),
        rounds,
    };
    debug!(
        original_len,
        minimized_len = current.len(),
        oracle_calls = stats.oracle_calls,
        rounds = stats.rounds,
        "parallel minimization finished"
    );
    Ok(Reduction {
        original_len,
        elements: current,
        stats,
    })
}
