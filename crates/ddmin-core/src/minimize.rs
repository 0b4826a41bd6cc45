use crate::chunk::{complement, trials};
use crate::types::{Reduction, Stats};
use std::convert::Infallible;
use tracing::{debug, trace};

pub fn ddmin<T, F>(elements: Vec<T>, mut oracle: F) -> Reduction<T>
where
    T: Clone,
    F: FnMut(&[T]) -> bool,
{
    match try_ddmin(elements, |candidate| Ok::<_, Infallible>(oracle(candidate))) {
        Ok(reduction) => reduction,
        Err(never) => match never {},
    }
}

pub fn try_ddmin<T, E, F>(elements: Vec<T>, mut oracle: F) -> Result<Reduction<T>, E>
where
    T: Clone,
    F: FnMut(&[T]) -> Result<bool, E>,
{
    let original_len = elements.len();
    let mut stats = Stats::default();
    let mut current = elements;
    let mut granularity = 2;

    while current.len() >= 2 {
        stats.rounds += 1;
        let mut adopted = None;
        for (index, chunk) in trials(current.len(), granularity) {
            let candidate = complement(&current, chunk);
            stats.oracle_calls += 1;
            let reproduces = oracle(&candidate)?;
            trace!(granularity, index, len = candidate.len(), reproduces, "trial");
            if reproduces {
                adopted = Some(candidate);
                break;
            }
        }

        match adopted {
            Some(candidate) => {
                debug!(
                    from = current.len(),
                    to = candidate.len(),
                    granularity,
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

    debug!(
        original_len,
        minimized_len = current.len(),
        oracle_calls = stats.oracle_calls,
        rounds = stats.rounds,
        "minimization finished"
    );
    Ok(Reduction {
        original_len,
        elements: current,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_element_is_returned_without_oracle_calls() {
        let reduction = ddmin(vec!["only"], |_candidate| panic!("oracle must not run"));
        assert_eq!(reduction.elements, vec!["only"]);
        assert_eq!(reduction.stats, Stats::default());
    }

    #[test]
    fn empty_input_is_returned_without_oracle_calls() {
        let reduction = ddmin(Vec::<u32>::new(), |_candidate| panic!("oracle must not run"));
        assert!(reduction.elements.is_empty());
        assert!(!reduction.is_reduced());
    }

    #[test]
    fn oracle_error_stops_the_run() {
        let mut calls = 0;
        let result = try_ddmin(vec![1, 2, 3, 4], |_candidate| {
            calls += 1;
            if calls == 2 {
                Err("oracle crashed")
            } else {
                Ok(false)
            }
        });
        assert_eq!(result, Err("oracle crashed"));
        assert_eq!(calls, 2);
    }
}
