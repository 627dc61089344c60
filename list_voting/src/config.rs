// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

use crate::quotient::{self, QuotientFn};

/// A personal vote for a candidate on the list chosen by the ballot.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct SameListVote {
    pub candidate_id: String,
    /// A cumulated vote counts twice.
    pub cumulated: bool,
}

/// A personal vote lent to a candidate of another list.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct OtherListVote {
    pub candidate_id: String,
    pub list_id: String,
}

/// The counting methods known to the result assembler, keyed by the type
/// discriminator carried by the election.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ElectionType {
    /// Divisors 1, 3, 5, ...
    SainteLague,
    /// Divisors 1.4, 3, 5, ...
    ModifiedSainteLague,
}

impl ElectionType {
    pub fn from_type(discriminator: &str) -> Option<ElectionType> {
        match discriminator {
            "sainte_lague" => Some(ElectionType::SainteLague),
            "modified_sainte_lague" => Some(ElectionType::ModifiedSainteLague),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElectionType::SainteLague => "sainte_lague",
            ElectionType::ModifiedSainteLague => "modified_sainte_lague",
        }
    }

    pub fn quotient(&self) -> QuotientFn {
        match self {
            ElectionType::SainteLague => quotient::standard,
            ElectionType::ModifiedSainteLague => quotient::modified,
        }
    }
}

// ******** Output data structures *********

/// One line of the allocation audit trail.
#[derive(PartialEq, Debug, Clone)]
pub struct SeatAward {
    /// 1-based seat number.
    pub seat: u32,
    pub list_id: String,
    /// The vote number that won the seat.
    pub vote_number: f64,
    /// Set when the seat was decided by a seeded draw.
    pub drawn: bool,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ListResult {
    pub list_id: String,
    pub mandates: u32,
    pub list_votes: u64,
    /// All the candidates of the list, best ranked first.
    pub sorted_candidates_with_votes: Vec<(String, f64)>,
}

impl ListResult {
    /// The candidates elected on this list.
    pub fn elected(&self) -> &[(String, f64)] {
        let n = (self.mandates as usize).min(self.sorted_candidates_with_votes.len());
        &self.sorted_candidates_with_votes[..n]
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct ElectionResult {
    pub election_id: String,
    pub election_type: ElectionType,
    pub num_mandates: u32,
    pub lists: BTreeMap<String, ListResult>,
    pub seat_awards: Vec<SeatAward>,
    pub ballot_count: u64,
    pub pollbook_ballot_counts: BTreeMap<String, u64>,
}

/// Errors that prevent the counting from completing successfully.
///
/// Any of them aborts the whole run: no partial result is ever returned.
#[derive(PartialEq, Debug, Clone)]
pub enum VotingErrors {
    /// The number of seats to fill is zero.
    NoSeats,
    /// No counting strategy is registered for this type discriminator.
    UnsupportedElectionType(String),
    /// Several lists share the highest vote number and the seat cannot be
    /// placed without a draw.
    TieRequiresRandomDraw {
        seat: u32,
        tied: Vec<(String, f64)>,
    },
    /// All the lists ran out of candidates before the last seat.
    InsufficientCandidates { seats: u32, placed: u32 },
    UnknownList {
        ballot_id: String,
        list_id: String,
    },
    UnknownCandidate {
        ballot_id: String,
        list_id: String,
        candidate_id: String,
    },
    UnknownPollbook {
        ballot_id: String,
        pollbook_id: String,
    },
    TooManyPersonalVotes {
        ballot_id: String,
        count: usize,
        num_choosable: u32,
    },
    /// The same identifier was declared twice.
    DuplicateId(String),
    UnknownQuotaRule(String),
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::NoSeats => write!(f, "the election has no seat to fill"),
            VotingErrors::UnsupportedElectionType(t) => {
                write!(f, "unsupported election type: {:?}", t)
            }
            VotingErrors::TieRequiresRandomDraw { seat, tied } => {
                write!(f, "seat {} requires a random draw between:", seat)?;
                for (list_id, vote_number) in tied.iter() {
                    write!(f, " {} ({})", list_id, vote_number)?;
                }
                Ok(())
            }
            VotingErrors::InsufficientCandidates { seats, placed } => write!(
                f,
                "only {} of {} seats could be placed: the lists ran out of candidates",
                placed, seats
            ),
            VotingErrors::UnknownList { ballot_id, list_id } => {
                write!(f, "ballot {}: unknown list {}", ballot_id, list_id)
            }
            VotingErrors::UnknownCandidate {
                ballot_id,
                list_id,
                candidate_id,
            } => write!(
                f,
                "ballot {}: candidate {} is not on list {}",
                ballot_id, candidate_id, list_id
            ),
            VotingErrors::UnknownPollbook {
                ballot_id,
                pollbook_id,
            } => write!(f, "ballot {}: unknown pollbook {}", ballot_id, pollbook_id),
            VotingErrors::TooManyPersonalVotes {
                ballot_id,
                count,
                num_choosable,
            } => write!(
                f,
                "ballot {}: {} personal votes for {} seats",
                ballot_id, count, num_choosable
            ),
            VotingErrors::DuplicateId(id) => write!(f, "duplicate identifier: {}", id),
            VotingErrors::UnknownQuotaRule(key) => write!(f, "unknown quota rule: {:?}", key),
        }
    }
}

// ********* Configuration **********

/// What to do when several lists compete for the last seats with exactly the
/// same vote number.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// Stop the count with `VotingErrors::TieRequiresRandomDraw`.
    RequireDraw,
    /// Order the tied lists by a SHA-256 digest of the seed, the seat number
    /// and the list id. The draw is logged and flagged in the seat awards.
    SeededDraw(u32),
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct CountingRules {
    /// Bonus given on every ballot to the pre-cumulated candidates of the
    /// chosen list.
    pub pre_cumulate_weight: f64,
    pub tiebreak_mode: TieBreakMode,
    /// Overrides the number of seats declared by the election.
    pub num_mandates: Option<u32>,
}

impl CountingRules {
    pub const DEFAULT_RULES: CountingRules = CountingRules {
        pre_cumulate_weight: 0.25,
        tiebreak_mode: TieBreakMode::RequireDraw,
        num_mandates: None,
    };
}

impl Default for CountingRules {
    fn default() -> Self {
        CountingRules::DEFAULT_RULES
    }
}
