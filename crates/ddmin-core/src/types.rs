use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Reduced,
    AlreadyMinimal,
    NothingToReduce,
    Reproduces,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Reduced => "reduced",
            Status::AlreadyMinimal => "already_minimal",
            Status::NothingToReduce => "nothing_to_reduce",
            Status::Reproduces => "reproduces",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub oracle_calls: u64,
    pub rounds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reduction<T> {
    pub original_len: usize,
    pub elements: Vec<T>,
    pub stats: Stats,
}

impl<T> Reduction<T> {
    pub fn minimized_len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_reduced(&self) -> bool {
        self.elements.len() < self.original_len
    }

    pub fn into_elements(self) -> Vec<T> {
        self.elements
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    NothingToReduce { oracle_calls: u64 },
    Reduced(Reduction<T>),
}

impl<T> Outcome<T> {
    pub fn status(&self) -> Status {
        match self {
            Outcome::NothingToReduce { .. } => Status::NothingToReduce,
            Outcome::Reduced(reduction) if reduction.is_reduced() => Status::Reduced,
            Outcome::Reduced(_) => Status::AlreadyMinimal,
        }
    }

    pub fn oracle_calls(&self) -> u64 {
        match self {
            Outcome::NothingToReduce { oracle_calls } => *oracle_calls,
            Outcome::Reduced(reduction) => reduction.stats.oracle_calls,
        }
    }

    pub fn reduction(&self) -> Option<&Reduction<T>> {
        match self {
            Outcome::NothingToReduce { .. } => None,
            Outcome::Reduced(reduction) => Some(reduction),
        }
    }
}
