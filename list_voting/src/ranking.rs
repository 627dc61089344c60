use std::collections::HashMap;

use crate::domain::Candidate;

/// Orders the candidates of a list by decreasing personal votes. Candidates
/// with the same number of votes keep their declared priority.
///
/// Candidates missing from `person_votes` count as having no vote.
pub fn rank_candidates<C: Candidate>(
    candidates: &[C],
    person_votes: Option<&HashMap<String, f64>>,
) -> Vec<(String, f64)> {
    let mut ranked: Vec<(&C, f64)> = candidates
        .iter()
        .map(|c| {
            let votes = person_votes
                .and_then(|pv| pv.get(c.id()))
                .copied()
                .unwrap_or(0.0);
            (c, votes)
        })
        .collect();
    ranked.sort_by(|(c1, v1), (c2, v2)| {
        v2.total_cmp(v1)
            .then_with(|| c1.priority().cmp(&c2.priority()))
    });
    ranked
        .into_iter()
        .map(|(c, votes)| (c.id().to_string(), votes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CandidateData;

    fn candidate(id: &str, priority: u32) -> CandidateData {
        CandidateData {
            priority,
            ..CandidateData::new(id)
        }
    }

    #[test]
    fn votes_first_then_priority() {
        let candidates = vec![
            candidate("c0", 0),
            candidate("c1", 1),
            candidate("c2", 2),
            candidate("c3", 3),
        ];
        let votes: HashMap<String, f64> = [("c1", 3.0), ("c2", 4.25), ("c3", 3.0)]
            .iter()
            .map(|(id, v)| (id.to_string(), *v))
            .collect();
        let ranked = rank_candidates(&candidates, Some(&votes));
        assert_eq!(
            ranked,
            vec![
                ("c2".to_string(), 4.25),
                ("c1".to_string(), 3.0),
                ("c3".to_string(), 3.0),
                ("c0".to_string(), 0.0),
            ]
        );
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let candidates = vec![candidate("late", 5), candidate("early", 1)];
        let ranked = rank_candidates(&candidates, None);
        let ids: Vec<&str> = ranked.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }
}
