//! Minimum-representation quotas.
//!
//! Rules are registered under a string key and resolved once, when the
//! configuration is loaded. The quotas are computed for reporting only: the
//! seat allocation does not reserve seats for them.

use std::collections::BTreeMap;
use std::str::FromStr;

use log::debug;

use crate::config::VotingErrors;
use crate::domain::{Candidate, Election, QuotaGroup};

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Quota {
    pub name: String,
    /// Candidate ids.
    pub members: Vec<String>,
    pub min_value: u32,
    pub min_value_substitutes: u32,
}

impl QuotaGroup for Quota {
    fn name(&self) -> &str {
        &self.name
    }
    fn members(&self) -> &[String] {
        &self.members
    }
    fn min_value(&self) -> u32 {
        self.min_value
    }
    fn min_value_substitutes(&self) -> u32 {
        self.min_value_substitutes
    }
}

/// What a quota rule gets to see of the election.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct QuotaInput<'a> {
    pub num_choosable: u32,
    pub num_substitutes: u32,
    /// (candidate id, gender)
    pub candidates: Vec<(&'a str, Option<&'a str>)>,
}

impl<'a> QuotaInput<'a> {
    pub fn from_election<E: Election>(election: &'a E) -> QuotaInput<'a> {
        QuotaInput {
            num_choosable: election.num_choosable(),
            num_substitutes: election.num_substitutes(),
            candidates: election
                .candidates()
                .into_iter()
                .map(|c| (c.id(), c.gender()))
                .collect(),
        }
    }
}

pub type QuotaGenerator = fn(&QuotaInput) -> Vec<Quota>;

/// The registered quota rules.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum QuotaRuleId {
    /// About 40% of the seats for each gender.
    Gender40,
}

impl QuotaRuleId {
    pub const ALL: [QuotaRuleId; 1] = [QuotaRuleId::Gender40];

    pub fn key(&self) -> &'static str {
        match self {
            QuotaRuleId::Gender40 => "gender_40",
        }
    }

    pub fn generator(&self) -> QuotaGenerator {
        match self {
            QuotaRuleId::Gender40 => gender_40,
        }
    }

    pub fn generate<E: Election>(&self, election: &E) -> Vec<Quota> {
        let input = QuotaInput::from_election(election);
        let quotas = (self.generator())(&input);
        debug!("quota rule {}: {:?}", self.key(), quotas);
        quotas
    }
}

impl FromStr for QuotaRuleId {
    type Err = VotingErrors;

    fn from_str(key: &str) -> Result<QuotaRuleId, VotingErrors> {
        QuotaRuleId::ALL
            .iter()
            .find(|r| r.key() == key)
            .copied()
            .ok_or_else(|| VotingErrors::UnknownQuotaRule(key.to_string()))
    }
}

/// Minimum number of seats per gender among `num_seats`.
pub fn gender_40_min_value(num_seats: u32) -> u32 {
    match num_seats {
        0 | 1 => 0,
        2 | 3 => 1,
        // ceil(0.4 * n) without going through floating point.
        n => (2 * n + 4) / 5,
    }
}

/// One quota per gender found among the candidates.
pub fn gender_40(input: &QuotaInput) -> Vec<Quota> {
    if input.num_choosable <= 1 {
        return Vec::new();
    }
    let mut by_gender: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (cid, gender) in input.candidates.iter() {
        if let Some(g) = gender {
            by_gender.entry(*g).or_default().push(cid.to_string());
        }
    }
    let min_value = gender_40_min_value(input.num_choosable);
    let min_value_substitutes = gender_40_min_value(input.num_substitutes);
    by_gender
        .into_iter()
        .map(|(gender, members)| Quota {
            name: gender.to_string(),
            members,
            min_value,
            min_value_substitutes,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Builder, CandidateData};

    fn input(num_choosable: u32) -> QuotaInput<'static> {
        QuotaInput {
            num_choosable,
            num_substitutes: 2,
            candidates: vec![
                ("c1", Some("female")),
                ("c2", Some("male")),
                ("c3", Some("female")),
                ("c4", None),
            ],
        }
    }

    #[test]
    fn thresholds() {
        assert_eq!(gender_40_min_value(1), 0);
        assert_eq!(gender_40_min_value(2), 1);
        assert_eq!(gender_40_min_value(3), 1);
        assert_eq!(gender_40_min_value(4), 2);
        assert_eq!(gender_40_min_value(5), 2);
        assert_eq!(gender_40_min_value(10), 4);
        assert_eq!(gender_40_min_value(11), 5);
    }

    #[test]
    fn no_quota_for_a_single_seat() {
        assert!(gender_40(&input(1)).is_empty());
        assert!(gender_40(&input(0)).is_empty());
    }

    #[test]
    fn one_quota_per_gender() {
        let quotas = gender_40(&input(3));
        assert_eq!(
            quotas,
            vec![
                Quota {
                    name: "female".to_string(),
                    members: vec!["c1".to_string(), "c3".to_string()],
                    min_value: 1,
                    min_value_substitutes: 1,
                },
                Quota {
                    name: "male".to_string(),
                    members: vec!["c2".to_string()],
                    min_value: 1,
                    min_value_substitutes: 1,
                },
            ]
        );
        assert!(gender_40(&input(10)).iter().all(|q| q.min_value == 4));
        assert!(gender_40(&input(11)).iter().all(|q| q.min_value == 5));
    }

    #[test]
    fn registry_lookup() {
        assert_eq!("gender_40".parse::<QuotaRuleId>(), Ok(QuotaRuleId::Gender40));
        assert_eq!(
            "gender_50".parse::<QuotaRuleId>(),
            Err(VotingErrors::UnknownQuotaRule("gender_50".to_string()))
        );
        for rule in QuotaRuleId::ALL {
            assert_eq!(rule.key().parse::<QuotaRuleId>(), Ok(rule));
        }
    }

    #[test]
    fn generate_from_election() {
        let election = Builder::new("sainte_lague", 4)
            .unwrap()
            .list_2(
                "A",
                vec![
                    CandidateData::new("a1").with_gender("female"),
                    CandidateData::new("a2").with_gender("male"),
                ],
            )
            .unwrap()
            .list_2("B", vec![CandidateData::new("b1").with_gender("female")])
            .unwrap()
            .build();
        let quotas = QuotaRuleId::Gender40.generate(&election);
        assert_eq!(quotas.len(), 2);
        assert_eq!(quotas[0].name(), "female");
        assert_eq!(quotas[0].members(), &["a1".to_string(), "b1".to_string()]);
        assert_eq!(quotas[0].min_value(), 2);
        assert_eq!(quotas[1].min_value_substitutes(), 0);
    }
}
