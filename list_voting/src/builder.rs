use std::collections::{BTreeMap, HashSet};

pub use crate::config::*;
use crate::domain;
use crate::quota::Quota;

// ********* In-memory views **********

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct CandidateData {
    pub id: String,
    pub list_id: String,
    pub priority: u32,
    pub pre_cumulated: bool,
    pub meta: BTreeMap<String, String>,
}

impl CandidateData {
    pub fn new(id: &str) -> CandidateData {
        CandidateData {
            id: id.to_string(),
            list_id: String::new(),
            priority: 0,
            pre_cumulated: false,
            meta: BTreeMap::new(),
        }
    }

    pub fn with_gender(self, gender: &str) -> CandidateData {
        self.with_meta("gender", gender)
    }

    pub fn with_meta(mut self, key: &str, value: &str) -> CandidateData {
        self.meta.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_pre_cumulation(mut self, pre_cumulated: bool) -> CandidateData {
        self.pre_cumulated = pre_cumulated;
        self
    }
}

impl domain::Candidate for CandidateData {
    fn id(&self) -> &str {
        &self.id
    }
    fn list_id(&self) -> &str {
        &self.list_id
    }
    fn priority(&self) -> u32 {
        self.priority
    }
    fn pre_cumulated(&self) -> bool {
        self.pre_cumulated
    }
    fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(|s| s.as_str())
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ListData {
    pub id: String,
    pub candidates: Vec<CandidateData>,
}

impl domain::ElectionList for ListData {
    type Candidate = CandidateData;

    fn id(&self) -> &str {
        &self.id
    }
    fn candidates(&self) -> &[CandidateData] {
        &self.candidates
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct PollbookData {
    pub id: String,
    pub weight: f64,
    pub weight_per_vote: f64,
    pub weight_per_pollbook: f64,
    pub scale_factor: f64,
    pub ballot_count: u64,
}

impl PollbookData {
    /// A pollbook with neutral weights.
    pub fn new(id: &str) -> PollbookData {
        PollbookData {
            id: id.to_string(),
            weight: 1.0,
            weight_per_vote: 1.0,
            weight_per_pollbook: 1.0,
            scale_factor: 1.0,
            ballot_count: 0,
        }
    }
}

impl domain::Pollbook for PollbookData {
    fn id(&self) -> &str {
        &self.id
    }
    fn weight(&self) -> f64 {
        self.weight
    }
    fn weight_per_vote(&self) -> f64 {
        self.weight_per_vote
    }
    fn weight_per_pollbook(&self) -> f64 {
        self.weight_per_pollbook
    }
    fn scale_factor(&self) -> f64 {
        self.scale_factor
    }
    fn ballot_count(&self) -> u64 {
        self.ballot_count
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct BallotData {
    pub id: String,
    pub chosen_list: String,
    pub personal_votes_same: Vec<SameListVote>,
    pub personal_votes_other: Vec<OtherListVote>,
    pub pollbook_id: Option<String>,
    pub raw_string: String,
}

impl BallotData {
    /// Creates a ballot and its canonical string.
    ///
    /// The canonical string looks like `list|cand1,cand2*|cand3@list2`, where
    /// `*` marks a cumulated vote.
    pub fn new(
        id: &str,
        chosen_list: &str,
        personal_votes_same: Vec<SameListVote>,
        personal_votes_other: Vec<OtherListVote>,
        pollbook_id: Option<String>,
    ) -> BallotData {
        let same: Vec<String> = personal_votes_same
            .iter()
            .map(|v| {
                if v.cumulated {
                    format!("{}*", v.candidate_id)
                } else {
                    v.candidate_id.clone()
                }
            })
            .collect();
        let other: Vec<String> = personal_votes_other
            .iter()
            .map(|v| format!("{}@{}", v.candidate_id, v.list_id))
            .collect();
        let raw_string = format!("{}|{}|{}", chosen_list, same.join(","), other.join(","));
        BallotData {
            id: id.to_string(),
            chosen_list: chosen_list.to_string(),
            personal_votes_same,
            personal_votes_other,
            pollbook_id,
            raw_string,
        }
    }
}

impl domain::Ballot for BallotData {
    fn id(&self) -> &str {
        &self.id
    }
    fn chosen_list(&self) -> &str {
        &self.chosen_list
    }
    fn personal_votes_same(&self) -> &[SameListVote] {
        &self.personal_votes_same
    }
    fn personal_votes_other(&self) -> &[OtherListVote] {
        &self.personal_votes_other
    }
    fn pollbook_id(&self) -> Option<&str> {
        self.pollbook_id.as_deref()
    }
    fn raw_string(&self) -> &str {
        &self.raw_string
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct ElectionData {
    pub id: String,
    pub election_type: String,
    pub num_choosable: u32,
    pub num_substitutes: u32,
    pub start: Option<String>,
    pub end: Option<String>,
    pub lists: Vec<ListData>,
    pub pollbooks: Vec<PollbookData>,
    pub ballots: Vec<BallotData>,
    pub quotas: Vec<Quota>,
}

impl domain::Election for ElectionData {
    type List = ListData;
    type Ballot = BallotData;
    type Pollbook = PollbookData;
    type Quota = Quota;

    fn id(&self) -> &str {
        &self.id
    }
    fn election_type(&self) -> &str {
        &self.election_type
    }
    fn num_choosable(&self) -> u32 {
        self.num_choosable
    }
    fn num_substitutes(&self) -> u32 {
        self.num_substitutes
    }
    fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }
    fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }
    fn lists(&self) -> &[ListData] {
        &self.lists
    }
    fn pollbooks(&self) -> &[PollbookData] {
        &self.pollbooks
    }
    fn ballots(&self) -> &[BallotData] {
        &self.ballots
    }
    fn quotas(&self) -> &[Quota] {
        &self.quotas
    }
}

// ********* Builder **********

/// A builder for assembling an election in memory.
///
/// Candidates receive their priority from their declaration order on the
/// list. Ballots receive a generated id and their canonical string.
///
/// ```
/// use list_voting::builder::Builder;
/// # use list_voting::VotingErrors;
///
/// let mut builder = Builder::new("sainte_lague", 2)?
///     .list("A", &["anna".to_string(), "bob".to_string()])?
///     .list("B", &["clara".to_string()])?;
///
/// builder.add_ballot_simple("A")?;
/// builder.add_ballot("B", &[("clara", true)], &[("anna", "A")])?;
///
/// let election = builder.build();
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _election: ElectionData,
    pub(crate) _ids: HashSet<String>,
    pub(crate) _ballot_ids: HashSet<String>,
}

impl Builder {
    pub fn new(election_type: &str, num_choosable: u32) -> Result<Builder, VotingErrors> {
        if num_choosable == 0 {
            return Err(VotingErrors::NoSeats);
        }
        Ok(Builder {
            _election: ElectionData {
                id: "election".to_string(),
                election_type: election_type.to_string(),
                num_choosable,
                num_substitutes: 0,
                start: None,
                end: None,
                lists: Vec::new(),
                pollbooks: Vec::new(),
                ballots: Vec::new(),
                quotas: Vec::new(),
            },
            _ids: HashSet::new(),
            _ballot_ids: HashSet::new(),
        })
    }

    pub fn id(mut self, id: &str) -> Builder {
        self._election.id = id.to_string();
        self
    }

    pub fn substitutes(mut self, num_substitutes: u32) -> Builder {
        self._election.num_substitutes = num_substitutes;
        self
    }

    pub fn period(mut self, start: Option<String>, end: Option<String>) -> Builder {
        self._election.start = start;
        self._election.end = end;
        self
    }

    pub fn pollbook(mut self, pollbook: PollbookData) -> Result<Builder, VotingErrors> {
        if self._election.pollbooks.iter().any(|p| p.id == pollbook.id) {
            return Err(VotingErrors::DuplicateId(pollbook.id));
        }
        self._election.pollbooks.push(pollbook);
        Ok(self)
    }

    /// Adds a list whose candidates have no metadata.
    pub fn list(self, id: &str, candidates: &[String]) -> Result<Builder, VotingErrors> {
        let cands: Vec<CandidateData> = candidates.iter().map(|c| CandidateData::new(c)).collect();
        self.list_2(id, cands)
    }

    /// Adds a list. The candidates are expected in their declared order.
    pub fn list_2(
        mut self,
        id: &str,
        candidates: Vec<CandidateData>,
    ) -> Result<Builder, VotingErrors> {
        if self._election.lists.iter().any(|l| l.id == id) {
            return Err(VotingErrors::DuplicateId(id.to_string()));
        }
        let mut cands: Vec<CandidateData> = Vec::new();
        for (idx, c) in candidates.into_iter().enumerate() {
            if !self._ids.insert(c.id.clone()) {
                return Err(VotingErrors::DuplicateId(c.id));
            }
            cands.push(CandidateData {
                list_id: id.to_string(),
                priority: idx as u32,
                ..c
            });
        }
        self._election.lists.push(ListData {
            id: id.to_string(),
            candidates: cands,
        });
        Ok(self)
    }

    pub fn quota(mut self, quota: Quota) -> Builder {
        self._election.quotas.push(quota);
        self
    }

    /// Adds a ballot for a list, without any personal vote.
    pub fn add_ballot_simple(&mut self, chosen_list: &str) -> Result<(), VotingErrors> {
        self.add_ballot(chosen_list, &[], &[])
    }

    /// Adds a ballot.
    ///
    /// same: the personal votes on the chosen list, with the cumulation flag.
    /// other: the votes lent to other lists, as (candidate, list) pairs.
    pub fn add_ballot(
        &mut self,
        chosen_list: &str,
        same: &[(&str, bool)],
        other: &[(&str, &str)],
    ) -> Result<(), VotingErrors> {
        let id = format!("ballot-{:08}", self._election.ballots.len() + 1);
        let ballot = BallotData::new(
            &id,
            chosen_list,
            same.iter()
                .map(|(cid, cumulated)| SameListVote {
                    candidate_id: cid.to_string(),
                    cumulated: *cumulated,
                })
                .collect(),
            other
                .iter()
                .map(|(cid, lid)| OtherListVote {
                    candidate_id: cid.to_string(),
                    list_id: lid.to_string(),
                })
                .collect(),
            None,
        );
        self.add_ballot_2(ballot)
    }

    pub fn add_ballot_2(&mut self, ballot: BallotData) -> Result<(), VotingErrors> {
        if !self._ballot_ids.insert(ballot.id.clone()) {
            return Err(VotingErrors::DuplicateId(ballot.id));
        }
        if let Some(pid) = ballot.pollbook_id.as_deref() {
            if let Some(p) = self._election.pollbooks.iter_mut().find(|p| p.id == pid) {
                p.ballot_count += 1;
            }
        }
        self._election.ballots.push(ballot);
        Ok(())
    }

    pub fn build(self) -> ElectionData {
        self._election
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Ballot, Candidate, Election};

    #[test]
    fn priorities_follow_declaration_order() {
        let election = Builder::new("sainte_lague", 1)
            .unwrap()
            .list_2(
                "A",
                vec![
                    CandidateData::new("a1").with_gender("female"),
                    CandidateData::new("a2").with_pre_cumulation(true),
                ],
            )
            .unwrap()
            .build();
        let cands = election.candidates();
        assert_eq!(cands.len(), 2);
        assert_eq!(cands[0].priority(), 0);
        assert_eq!(cands[1].priority(), 1);
        assert_eq!(cands[1].list_id(), "A");
        assert_eq!(cands[0].gender(), Some("female"));
        assert!(cands[1].pre_cumulated());
    }

    #[test]
    fn rejects_duplicates() {
        let res = Builder::new("sainte_lague", 1)
            .unwrap()
            .list("A", &["x".to_string()])
            .unwrap()
            .list("B", &["x".to_string()]);
        assert_eq!(res.err(), Some(VotingErrors::DuplicateId("x".to_string())));

        let res = Builder::new("sainte_lague", 1)
            .unwrap()
            .list("A", &[])
            .unwrap()
            .list("A", &[]);
        assert!(res.is_err());
    }

    #[test]
    fn rejects_zero_seats() {
        assert_eq!(
            Builder::new("sainte_lague", 0).err(),
            Some(VotingErrors::NoSeats)
        );
    }

    #[test]
    fn canonical_string_and_pollbook_counters() {
        let mut builder = Builder::new("sainte_lague", 3)
            .unwrap()
            .pollbook(PollbookData::new("staff"))
            .unwrap();
        builder
            .add_ballot_2(BallotData::new(
                "b1",
                "A",
                vec![SameListVote {
                    candidate_id: "a1".to_string(),
                    cumulated: true,
                }],
                vec![OtherListVote {
                    candidate_id: "b1".to_string(),
                    list_id: "B".to_string(),
                }],
                Some("staff".to_string()),
            ))
            .unwrap();
        builder.add_ballot("A", &[("a2", false)], &[]).unwrap();
        let election = builder.build();
        assert_eq!(election.ballots[0].raw_string(), "A|a1*|b1@B");
        assert_eq!(election.ballots[1].raw_string(), "A|a2|");
        assert_eq!(election.ballots[1].id(), "ballot-00000002");
        assert_eq!(election.pollbooks[0].ballot_count, 1);
    }
}
