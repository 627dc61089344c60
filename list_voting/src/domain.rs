//! Read-only views of the election that the counting engine requires.
//!
//! The engine never mutates any of these objects. Any storage layer can plug
//! into the count by implementing the traits; the `builder` module provides
//! plain in-memory implementations.

use crate::config::{OtherListVote, SameListVote};

pub trait Candidate {
    fn id(&self) -> &str;
    fn list_id(&self) -> &str;
    /// Declared rank on the list. Lower comes first.
    fn priority(&self) -> u32;
    /// Receives an automatic bonus on every ballot cast for its list.
    fn pre_cumulated(&self) -> bool;
    fn meta(&self, key: &str) -> Option<&str>;

    fn gender(&self) -> Option<&str> {
        self.meta("gender")
    }
}

pub trait ElectionList {
    type Candidate: Candidate;

    fn id(&self) -> &str;
    /// The candidates, ordered by priority.
    fn candidates(&self) -> &[Self::Candidate];
}

/// A census group of voters.
pub trait Pollbook {
    fn id(&self) -> &str;
    fn weight(&self) -> f64;
    fn weight_per_vote(&self) -> f64;
    fn weight_per_pollbook(&self) -> f64;
    fn scale_factor(&self) -> f64;
    fn ballot_count(&self) -> u64;
}

pub trait Ballot {
    fn id(&self) -> &str;
    fn chosen_list(&self) -> &str;
    fn personal_votes_same(&self) -> &[SameListVote];
    fn personal_votes_other(&self) -> &[OtherListVote];
    fn pollbook_id(&self) -> Option<&str>;
    /// Canonical text of the ballot, used to order ballots for audits.
    fn raw_string(&self) -> &str;
}

/// A minimum-representation constraint over a subset of the candidates.
pub trait QuotaGroup {
    fn name(&self) -> &str;
    fn members(&self) -> &[String];
    fn min_value(&self) -> u32;
    fn min_value_substitutes(&self) -> u32;
}

pub trait Election {
    type List: ElectionList;
    type Ballot: Ballot;
    type Pollbook: Pollbook;
    type Quota: QuotaGroup;

    fn id(&self) -> &str;
    /// The type discriminator that selects the counting strategy.
    fn election_type(&self) -> &str;
    fn num_choosable(&self) -> u32;
    fn num_substitutes(&self) -> u32;
    fn start(&self) -> Option<&str>;
    fn end(&self) -> Option<&str>;
    fn lists(&self) -> &[Self::List];
    fn pollbooks(&self) -> &[Self::Pollbook];
    fn ballots(&self) -> &[Self::Ballot];
    fn quotas(&self) -> &[Self::Quota];

    /// All the candidates of all the lists, in list order.
    fn candidates(&self) -> Vec<&<Self::List as ElectionList>::Candidate> {
        self.lists()
            .iter()
            .flat_map(|l| l.candidates().iter())
            .collect()
    }
}
