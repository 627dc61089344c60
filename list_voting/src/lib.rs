mod config;
pub mod allocation;
pub mod builder;
pub mod domain;
pub mod manual;
pub mod quota;
pub mod quotient;
pub mod ranking;
pub mod tabulation;

use log::{debug, info};

use std::collections::BTreeMap;

pub use crate::config::*;
use crate::domain::{Election, ElectionList, QuotaGroup};

/// Counts an election and assembles the result of every list.
///
/// The counting strategy is selected by the type discriminator of the
/// election. The number of seats is the `num_choosable` of the election,
/// unless the rules override it.
///
/// Arguments:
/// * `election` the closed election, with all its ballots
/// * `rules` the parameters of this count
pub fn run_election<E: Election>(
    election: &E,
    rules: &CountingRules,
) -> Result<ElectionResult, VotingErrors> {
    let election_type = ElectionType::from_type(election.election_type()).ok_or_else(|| {
        VotingErrors::UnsupportedElectionType(election.election_type().to_string())
    })?;
    let num_mandates = rules.num_mandates.unwrap_or_else(|| election.num_choosable());
    info!(
        "run_election: election {} ({:?}, {} -> {}): {} seats, {} lists, {} ballots, rules: {:?}",
        election.id(),
        election_type,
        election.start().unwrap_or("?"),
        election.end().unwrap_or("?"),
        num_mandates,
        election.lists().len(),
        election.ballots().len(),
        rules
    );
    for q in election.quotas().iter() {
        // Quotas are not enforced by the allocation.
        info!(
            "run_election: declared quota {}: min {} among {} candidates",
            q.name(),
            q.min_value(),
            q.members().len()
        );
    }

    let tally = tabulation::count_votes(
        election,
        election.num_choosable(),
        rules.pre_cumulate_weight,
    )?;

    let alloc = allocation::allocate_seats(
        election.lists(),
        &tally.list_votes,
        num_mandates,
        election_type.quotient(),
        rules.tiebreak_mode,
    )?;
    debug!("run_election: mandates: {:?}", alloc.mandates);

    let mut lists: BTreeMap<String, ListResult> = BTreeMap::new();
    for l in election.lists().iter() {
        let sorted = ranking::rank_candidates(l.candidates(), tally.person_votes.get(l.id()));
        let res = ListResult {
            list_id: l.id().to_string(),
            mandates: alloc.mandates.get(l.id()).copied().unwrap_or(0),
            list_votes: tally.list_votes.get(l.id()).copied().unwrap_or(0),
            sorted_candidates_with_votes: sorted,
        };
        info!(
            "run_election: list {}: {} votes, {} seats, elected: {:?}",
            res.list_id,
            res.list_votes,
            res.mandates,
            res.elected()
        );
        lists.insert(l.id().to_string(), res);
    }

    Ok(ElectionResult {
        election_id: election.id().to_string(),
        election_type,
        num_mandates,
        lists,
        seat_awards: alloc.seat_awards,
        ballot_count: tally.ballot_count,
        pollbook_ballot_counts: tally.pollbook_ballot_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Builder, CandidateData};

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn candidates(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn two_lists_three_seats() {
        init_logs();
        let mut builder = Builder::new("sainte_lague", 3)
            .unwrap()
            .list_2(
                "A",
                vec![
                    CandidateData::new("a1"),
                    CandidateData::new("a2"),
                    CandidateData::new("a3").with_pre_cumulation(true),
                ],
            )
            .unwrap()
            .list("B", &candidates(&["b1", "b2"]))
            .unwrap();
        // A: 30 * 3 + 10 lent votes. B: 10 * 2 + 4 * 3.
        for _ in 0..30 {
            builder.add_ballot("A", &[("a2", false)], &[]).unwrap();
        }
        for _ in 0..10 {
            builder.add_ballot("B", &[("b2", true)], &[("a1", "A")]).unwrap();
        }
        for _ in 0..4 {
            builder.add_ballot_simple("B").unwrap();
        }
        let election = builder.build();
        let res = run_election(&election, &CountingRules::DEFAULT_RULES).unwrap();

        let a = &res.lists["A"];
        let b = &res.lists["B"];
        assert_eq!(a.list_votes, 100);
        assert_eq!(b.list_votes, 32);
        assert_eq!(a.mandates, 2);
        assert_eq!(b.mandates, 1);
        assert_eq!(res.num_mandates, 3);
        assert_eq!(res.ballot_count, 44);
        assert_eq!(
            a.sorted_candidates_with_votes,
            vec![
                ("a2".to_string(), 30.0),
                ("a1".to_string(), 10.0),
                ("a3".to_string(), 7.5),
            ]
        );
        assert_eq!(
            a.elected(),
            &[("a2".to_string(), 30.0), ("a1".to_string(), 10.0)]
        );
        assert_eq!(b.elected(), &[("b2".to_string(), 20.0)]);
        let total: u32 = res.lists.values().map(|l| l.mandates).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn unsupported_type() {
        let election = Builder::new("stv", 1)
            .unwrap()
            .list("A", &candidates(&["a1"]))
            .unwrap()
            .build();
        assert_eq!(
            run_election(&election, &CountingRules::DEFAULT_RULES),
            Err(VotingErrors::UnsupportedElectionType("stv".to_string()))
        );
    }

    #[test]
    fn tie_aborts_the_count() {
        let mut builder = Builder::new("sainte_lague", 1)
            .unwrap()
            .list("A", &candidates(&["a1"]))
            .unwrap()
            .list("B", &candidates(&["b1"]))
            .unwrap();
        builder.add_ballot_simple("A").unwrap();
        builder.add_ballot_simple("B").unwrap();
        let election = builder.build();
        let res = run_election(&election, &CountingRules::DEFAULT_RULES);
        assert!(matches!(
            res,
            Err(VotingErrors::TieRequiresRandomDraw { seat: 1, .. })
        ));

        let rules = CountingRules {
            tiebreak_mode: TieBreakMode::SeededDraw(7),
            ..CountingRules::DEFAULT_RULES
        };
        let res = run_election(&election, &rules).unwrap();
        assert_eq!(res.seat_awards.len(), 1);
        assert!(res.seat_awards[0].drawn);
    }

    #[test]
    fn seats_can_be_overridden() {
        let mut builder = Builder::new("modified_sainte_lague", 5)
            .unwrap()
            .list("A", &candidates(&["a1", "a2"]))
            .unwrap()
            .list("B", &candidates(&["b1", "b2"]))
            .unwrap();
        for _ in 0..3 {
            builder.add_ballot_simple("A").unwrap();
        }
        builder.add_ballot_simple("B").unwrap();
        let election = builder.build();
        let rules = CountingRules {
            num_mandates: Some(2),
            ..CountingRules::DEFAULT_RULES
        };
        let res = run_election(&election, &rules).unwrap();
        assert_eq!(res.election_type, ElectionType::ModifiedSainteLague);
        // 15 against 5 list votes.
        assert_eq!(res.lists["A"].list_votes, 15);
        assert_eq!(res.lists["A"].mandates, 2);
        assert_eq!(res.lists["B"].mandates, 0);
    }
}
