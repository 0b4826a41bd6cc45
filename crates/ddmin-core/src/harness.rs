use crate::minimize::try_ddmin;
use crate::minimize_parallel::try_ddmin_parallel;
use crate::types::Outcome;
use rayon::ThreadPool;
use tracing::info;

pub fn reduce<T, E, F>(elements: Vec<T>, mut oracle: F) -> Result<Outcome<T>, E>
where
    T: Clone,
    F: FnMut(&[T]) -> Result<bool, E>,
{
    if elements.is_empty() {
        return Ok(Outcome::NothingToReduce { oracle_calls: 0 });
    }
    if !oracle(&elements)? {
        info!(len = elements.len(), "full input does not reproduce");
        return Ok(Outcome::NothingToReduce { oracle_calls: 1 });
    }

    let mut reduction = try_ddmin(elements, oracle)?;
    reduction.stats.oracle_calls += 1;
    Ok(Outcome::Reduced(reduction))
}

pub fn reduce_parallel<T, E, F>(
    elements: Vec<T>,
    oracle: F,
    pool: &ThreadPool,
) -> Result<Outcome<T>, E>
where
    T: Clone + Send + Sync,
    E: Send,
    F: Fn(&[T]) -> Result<bool, E> + Sync,
{
    if elements.is_empty() {
        return Ok(Outcome::NothingToReduce { oracle_calls: 0 });
    }
    if !oracle(&elements)? {
        info!(len = elements.len(), "full input does not reproduce");
        return Ok(Outcome::NothingToReduce { oracle_calls: 1 });
    }

    let mut reduction = try_ddmin_parallel(elements, oracle, pool)?;
    reduction.stats.oracle_calls += 1;
    Ok(Outcome::Reduced(reduction))
}
