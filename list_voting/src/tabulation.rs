use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, info};

use crate::config::VotingErrors;
use crate::domain::{Ballot, Candidate, Election, ElectionList, Pollbook};

/// The raw counts of an election.
#[derive(PartialEq, Debug, Clone)]
pub struct Tally {
    /// list id -> candidate id -> personal votes
    pub person_votes: HashMap<String, HashMap<String, f64>>,
    /// list id -> list votes
    pub list_votes: HashMap<String, u64>,
    pub ballot_count: u64,
    /// pollbook id -> number of ballots counted
    pub pollbook_ballot_counts: BTreeMap<String, u64>,
}

// What the tabulation needs to know about a list.
struct ListIndex<'a> {
    candidates: HashSet<&'a str>,
    pre_cumulated: Vec<&'a str>,
}

/// Counts the list votes and the personal votes of all the ballots.
///
/// Every ballot hands out `num_choosable` list votes: the votes lent to
/// candidates of other lists go to these lists, the rest goes to the chosen
/// list. Personal votes count 1, or 2 when cumulated. Pre-cumulated candidates
/// of the chosen list get `pre_cumulate_weight` on every ballot.
///
/// The ballots are expected to be valid. Any inconsistency is still reported
/// as an error instead of being counted.
pub fn count_votes<E: Election>(
    election: &E,
    num_choosable: u32,
    pre_cumulate_weight: f64,
) -> Result<Tally, VotingErrors> {
    let mut index: HashMap<&str, ListIndex> = HashMap::new();
    let mut person_votes: HashMap<String, HashMap<String, f64>> = HashMap::new();
    let mut list_votes: HashMap<String, u64> = HashMap::new();
    for l in election.lists().iter() {
        index.insert(
            l.id(),
            ListIndex {
                candidates: l.candidates().iter().map(|c| c.id()).collect(),
                pre_cumulated: l
                    .candidates()
                    .iter()
                    .filter(|c| c.pre_cumulated())
                    .map(|c| c.id())
                    .collect(),
            },
        );
        person_votes.insert(
            l.id().to_string(),
            l.candidates()
                .iter()
                .map(|c| (c.id().to_string(), 0.0))
                .collect(),
        );
        list_votes.insert(l.id().to_string(), 0);
    }
    let mut pollbook_ballot_counts: BTreeMap<String, u64> = election
        .pollbooks()
        .iter()
        .map(|p| (p.id().to_string(), 0))
        .collect();

    // A fixed processing order keeps the floating point sums reproducible.
    let mut ballots: Vec<&E::Ballot> = election.ballots().iter().collect();
    ballots.sort_by(|b1, b2| {
        b1.raw_string()
            .cmp(b2.raw_string())
            .then_with(|| b1.id().cmp(b2.id()))
    });
    info!(
        "count_votes: counting {} ballots for {} lists, {} votes per ballot",
        ballots.len(),
        index.len(),
        num_choosable
    );

    for b in ballots.iter() {
        let chosen = b.chosen_list();
        let chosen_index = index.get(chosen).ok_or_else(|| VotingErrors::UnknownList {
            ballot_id: b.id().to_string(),
            list_id: chosen.to_string(),
        })?;

        if let Some(pid) = b.pollbook_id() {
            let c = pollbook_ballot_counts.get_mut(pid).ok_or_else(|| {
                VotingErrors::UnknownPollbook {
                    ballot_id: b.id().to_string(),
                    pollbook_id: pid.to_string(),
                }
            })?;
            *c += 1;
        }

        let num_same = b.personal_votes_same().len();
        let num_other = b.personal_votes_other().len();
        if num_same + num_other > num_choosable as usize {
            return Err(VotingErrors::TooManyPersonalVotes {
                ballot_id: b.id().to_string(),
                count: num_same + num_other,
                num_choosable,
            });
        }

        // The check above guarantees that there is no underflow.
        let lent = num_other as u64;
        *list_votes.entry(chosen.to_string()).or_insert(0) += num_choosable as u64 - lent;

        for v in b.personal_votes_same().iter() {
            if !chosen_index.candidates.contains(v.candidate_id.as_str()) {
                return Err(VotingErrors::UnknownCandidate {
                    ballot_id: b.id().to_string(),
                    list_id: chosen.to_string(),
                    candidate_id: v.candidate_id.clone(),
                });
            }
            let weight = if v.cumulated { 2.0 } else { 1.0 };
            add_person_vote(&mut person_votes, chosen, &v.candidate_id, weight);
        }

        for v in b.personal_votes_other().iter() {
            let other_index =
                index
                    .get(v.list_id.as_str())
                    .ok_or_else(|| VotingErrors::UnknownList {
                        ballot_id: b.id().to_string(),
                        list_id: v.list_id.clone(),
                    })?;
            if !other_index.candidates.contains(v.candidate_id.as_str()) {
                return Err(VotingErrors::UnknownCandidate {
                    ballot_id: b.id().to_string(),
                    list_id: v.list_id.clone(),
                    candidate_id: v.candidate_id.clone(),
                });
            }
            *list_votes.entry(v.list_id.clone()).or_insert(0) += 1;
            add_person_vote(&mut person_votes, &v.list_id, &v.candidate_id, 1.0);
        }

        for cid in chosen_index.pre_cumulated.iter() {
            add_person_vote(&mut person_votes, chosen, cid, pre_cumulate_weight);
        }
    }

    debug!("count_votes: list votes: {:?}", list_votes);
    debug!("count_votes: person votes: {:?}", person_votes);
    Ok(Tally {
        person_votes,
        list_votes,
        ballot_count: ballots.len() as u64,
        pollbook_ballot_counts,
    })
}

fn add_person_vote(
    person_votes: &mut HashMap<String, HashMap<String, f64>>,
    list_id: &str,
    candidate_id: &str,
    weight: f64,
) {
    let e = person_votes
        .entry(list_id.to_string())
        .or_default()
        .entry(candidate_id.to_string())
        .or_insert(0.0);
    *e += weight;
}
