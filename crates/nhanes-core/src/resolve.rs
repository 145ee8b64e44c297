//! Cycle token resolution.
//!
//! A token is one of:
//!
//! - a range `START-END`, where each side is a year fragment
//! - an exact cycle label such as `2005-2006`
//! - a partial year such as `2005`, matching every cycle containing it
//!
//! Ranges are tried first, so an exact label resolves through the range
//! path to itself. Tokens matching nothing resolve to nothing; callers
//! decide whether an empty result is an error.

use tracing::warn;

use nhanes_model::{CYCLE_SEPARATOR, Cycle};

use crate::config::RangePolicy;

/// Expands cycle tokens against the registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleResolver {
    policy: RangePolicy,
}

impl CycleResolver {
    pub fn new(policy: RangePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RangePolicy {
        self.policy
    }

    /// Resolve several tokens, concatenating their cycles in input order.
    /// Duplicates are kept.
    pub fn resolve<I, S>(&self, tokens: I) -> Vec<Cycle>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokens
            .into_iter()
            .flat_map(|token| self.resolve_token(token.as_ref()))
            .collect()
    }

    /// Resolve a single token, in registry order.
    pub fn resolve_token(&self, token: &str) -> Vec<Cycle> {
        let token = token.trim();
        if token.is_empty() {
            return Vec::new();
        }
        if let Some((start, end)) = token.split_once(CYCLE_SEPARATOR) {
            return self.resolve_range(token, start.trim(), end.trim());
        }
        if let Some(cycle) = Cycle::from_label(token) {
            return vec![cycle];
        }
        Cycle::all().filter(|cycle| cycle.contains(token)).collect()
    }

    fn resolve_range(&self, token: &str, start: &str, end: &str) -> Vec<Cycle> {
        if start.is_empty() || end.is_empty() || end.contains(CYCLE_SEPARATOR) {
            return Vec::new();
        }

        let mut cycles = Vec::new();
        for cycle in Cycle::all() {
            if !cycles.is_empty() || cycle.contains(start) {
                cycles.push(cycle);
            }
            if cycle.contains(end) {
                // an end seen before any start is a reversed range
                return cycles;
            }
        }

        if cycles.is_empty() {
            return cycles;
        }
        match self.policy {
            RangePolicy::OpenEnded => {
                warn!(
                    token,
                    end, "range end matches no cycle; running to the last registered cycle"
                );
                cycles
            }
            RangePolicy::Strict => {
                warn!(token, end, "range end matches no cycle; range ignored");
                Vec::new()
            }
        }
    }
}

/// Resolve tokens with the default (open-ended) range policy.
pub fn resolve<I, S>(tokens: I) -> Vec<Cycle>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    CycleResolver::default().resolve(tokens)
}

/// Drop repeated cycles, keeping first appearances in input order.
pub fn unique_cycles(cycles: &[Cycle]) -> Vec<Cycle> {
    let mut unique = Vec::with_capacity(cycles.len());
    for &cycle in cycles {
        if !unique.contains(&cycle) {
            unique.push(cycle);
        }
    }
    unique
}

/// Drop repeated cycles and put the rest in registry order.
pub fn distinct_cycles(cycles: &[Cycle]) -> Vec<Cycle> {
    let mut distinct = cycles.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    distinct
}
