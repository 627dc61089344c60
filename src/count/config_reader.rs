use crate::count::*;

use list_voting::quota::QuotaRuleId;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    pub election: String,
    #[serde(rename = "type")]
    pub election_type: String,
    pub seats: u32,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionSettings {
    pub id: String,
    #[serde(rename = "type")]
    pub election_type: String,
    #[serde(rename = "numChoosable")]
    pub num_choosable: u32,
    #[serde(rename = "numSubstitutes")]
    pub num_substitutes: Option<u32>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(rename = "preCumulateWeight")]
    pub pre_cumulate_weight: Option<f64>,
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: Option<String>,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<JSValue>,
    #[serde(rename = "quotaRule")]
    pub quota_rule: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PollbookConfig {
    pub id: String,
    pub weight: Option<f64>,
    #[serde(rename = "weightPerVote")]
    pub weight_per_vote: Option<f64>,
    #[serde(rename = "weightPerPollbook")]
    pub weight_per_pollbook: Option<f64>,
    #[serde(rename = "scaleFactor")]
    pub scale_factor: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CandidateConfig {
    pub id: String,
    pub name: Option<String>,
    pub gender: Option<String>,
    #[serde(rename = "preCumulated")]
    pub pre_cumulated: Option<bool>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    pub id: String,
    pub name: Option<String>,
    pub candidates: Vec<CandidateConfig>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SameVoteConfig {
    pub candidate: String,
    pub cumulated: Option<bool>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OtherVoteConfig {
    pub candidate: String,
    pub list: String,
}

/// A ballot, as written in the configuration or in a ballot file.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BallotConfig {
    pub id: Option<String>,
    #[serde(rename = "chosenList")]
    pub chosen_list: String,
    #[serde(rename = "personalVotesSame", default)]
    pub personal_votes_same: Vec<SameVoteConfig>,
    #[serde(rename = "personalVotesOther", default)]
    pub personal_votes_other: Vec<OtherVoteConfig>,
    pub pollbook: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BallotSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub election: ElectionSettings,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub pollbooks: Vec<PollbookConfig>,
    pub lists: Vec<ListConfig>,
    #[serde(default)]
    pub ballots: Vec<BallotConfig>,
    #[serde(rename = "ballotSources", default)]
    pub ballot_sources: Vec<BallotSource>,
}

/// The rules after validation.
#[derive(PartialEq, Debug, Clone)]
pub struct ValidatedRules {
    pub counting: CountingRules,
    pub quota_rule: Option<QuotaRuleId>,
}

pub fn read_config(path: &str) -> CountResult<ElectionConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(&contents).context(ParsingJsonSnafu { path })
}

pub fn read_summary(path: &str) -> CountResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

/// Checks the rules of the configuration. Unknown options are rejected here,
/// before any ballot is read.
pub fn validate_rules(rules: &RulesConfig) -> CountResult<ValidatedRules> {
    let tiebreak_mode = match rules.tiebreak_mode.as_deref() {
        None | Some("requireDraw") => TieBreakMode::RequireDraw,
        Some("seededDraw") => {
            let seed = match read_js_int(&rules.random_seed) {
                Some(x) => x,
                None => {
                    whatever!(
                        "tiebreak mode seededDraw requires a numeric randomSeed, got {:?}",
                        rules.random_seed
                    )
                }
            };
            TieBreakMode::SeededDraw(seed)
        }
        Some(x) => {
            whatever!("unknown tiebreak mode {:?}", x)
        }
    };
    let pre_cumulate_weight = match rules.pre_cumulate_weight {
        None => CountingRules::DEFAULT_RULES.pre_cumulate_weight,
        Some(w) if w.is_finite() && w >= 0.0 => w,
        Some(w) => {
            whatever!("preCumulateWeight must be a non-negative number, got {}", w)
        }
    };
    let quota_rule = match rules.quota_rule.as_deref() {
        Some(key) => Some(key.parse::<QuotaRuleId>().context(InvalidElectionSnafu {})?),
        None => None,
    };
    Ok(ValidatedRules {
        counting: CountingRules {
            pre_cumulate_weight,
            tiebreak_mode,
            num_mandates: None,
        },
        quota_rule,
    })
}

fn read_js_int(x: &Option<JSValue>) -> Option<u32> {
    match x {
        Some(JSValue::Number(n)) => n.as_u64().and_then(|x| u32::try_from(x).ok()),
        Some(JSValue::String(s)) => s.parse::<u32>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(js: JSValue) -> RulesConfig {
        serde_json::from_value(js).unwrap()
    }

    #[test]
    fn default_rules() {
        let r = validate_rules(&RulesConfig::default()).unwrap();
        assert_eq!(r.counting, CountingRules::DEFAULT_RULES);
        assert_eq!(r.quota_rule, None);
    }

    #[test]
    fn seeded_draw() {
        let r = validate_rules(&rules(json!({"tiebreakMode": "seededDraw", "randomSeed": "12"})))
            .unwrap();
        assert_eq!(r.counting.tiebreak_mode, TieBreakMode::SeededDraw(12));
        let r = validate_rules(&rules(json!({"tiebreakMode": "seededDraw", "randomSeed": 3})))
            .unwrap();
        assert_eq!(r.counting.tiebreak_mode, TieBreakMode::SeededDraw(3));
        assert!(validate_rules(&rules(json!({"tiebreakMode": "seededDraw"}))).is_err());
    }

    #[test]
    fn unknown_options_fail_at_load() {
        assert!(validate_rules(&rules(json!({"tiebreakMode": "coinFlip"}))).is_err());
        assert!(validate_rules(&rules(json!({"preCumulateWeight": -1.0}))).is_err());
        match validate_rules(&rules(json!({"quotaRule": "gender_50"}))) {
            Err(CountError::InvalidElection { source }) => {
                assert_eq!(source, VotingErrors::UnknownQuotaRule("gender_50".to_string()))
            }
            x => panic!("unexpected {:?}", x),
        }
        let r = validate_rules(&rules(json!({"quotaRule": "gender_40", "preCumulateWeight": 0.5})))
            .unwrap();
        assert_eq!(r.quota_rule, Some(QuotaRuleId::Gender40));
        assert_eq!(r.counting.pre_cumulate_weight, 0.5);
    }
}
