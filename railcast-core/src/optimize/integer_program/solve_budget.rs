use std::time::{Duration, Instant};

/// limits on a branch and bound search. when either runs out the search stops and
/// reports the best solution found so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolveBudget {
    pub node_limit: Option<u64>,
    pub time_limit: Option<Duration>,
}

impl Default for SolveBudget {
    fn default() -> Self {
        SolveBudget {
            node_limit: None,
            time_limit: Some(Duration::from_secs(10)),
        }
    }
}

impl SolveBudget {
    pub fn unlimited() -> SolveBudget {
        SolveBudget {
            node_limit: None,
            time_limit: None,
        }
    }

    pub fn is_exhausted(&self, nodes: u64, started: &Instant) -> bool {
        let out_of_nodes = self.node_limit.map(|limit| nodes >= limit).unwrap_or(false);
        let out_of_time = self
            .time_limit
            .map(|limit| started.elapsed() >= limit)
            .unwrap_or(false);
        out_of_nodes || out_of_time
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_node_limit() {
        let budget = SolveBudget {
            node_limit: Some(2),
            time_limit: None,
        };
        let started = Instant::now();
        assert!(!budget.is_exhausted(1, &started));
        assert!(budget.is_exhausted(2, &started));
        assert!(!SolveBudget::unlimited().is_exhausted(u64::MAX, &started));
    }

    #[test]
    fn test_zero_time_limit() {
        let budget = SolveBudget {
            node_limit: None,
            time_limit: Some(Duration::ZERO),
        };
        assert!(budget.is_exhausted(0, &Instant::now()));
    }
}
