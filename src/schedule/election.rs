use super::{DelegateScheduler, ScheduleError};
use crate::state::{AccountStore, DelegateStore};
use std::collections::BTreeMap;
use tracing::{debug, trace};

impl DelegateScheduler {
    /// Top `delegates_per_term` candidates by staked vote weight, ties broken
    /// by account name
    pub fn elect_next_term_delegates(&self) -> Result<Vec<String>, ScheduleError> {
        let elected: Vec<String> = self
            .rank_candidates()?
            .into_iter()
            .take(self.core_state.delegates_per_term as usize)
            .map(|(name, _)| name)
            .collect();

        debug!("Elected {} delegates", elected.len());
        Ok(elected)
    }

    /// Every registered delegate with its vote weight, best first
    pub fn rank_candidates(&self) -> Result<Vec<(String, u128)>, ScheduleError> {
        let candidates = self
            .store
            .get_all_delegates()?
            .into_iter()
            .map(|delegate| delegate.account_name);

        let mut ballots = vec![];
        for vote in self.store.get_all_delegate_votes()? {
            let weight = self
                .store
                .get_staked_balance(&vote.voter)?
                .map(|staked| staked.staked_balance)
                .unwrap_or_default();
            trace!("{} backs {} with {weight}", vote.voter, vote.delegate);
            ballots.push((vote.delegate, weight));
        }

        Ok(rank_candidates(candidates, ballots))
    }
}

/// Sum `ballots` per candidate and order by weight descending, then name.
/// Ballots for names outside `candidates` are ignored.
pub fn rank_candidates(
    candidates: impl IntoIterator<Item = String>,
    ballots: impl IntoIterator<Item = (String, u64)>,
) -> Vec<(String, u128)> {
    let mut weights: BTreeMap<String, u128> =
        candidates.into_iter().map(|name| (name, 0)).collect();

    for (delegate, weight) in ballots {
        if let Some(total) = weights.get_mut(&delegate) {
            *total += weight as u128;
        }
    }

    let mut ranked: Vec<(String, u128)> = weights.into_iter().collect();
    ranked.sort_by(|(a_name, a_weight), (b_name, b_weight)| {
        b_weight.cmp(a_weight).then_with(|| a_name.cmp(b_name))
    });
    ranked
}
