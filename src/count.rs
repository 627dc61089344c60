use log::{debug, info, warn};

use list_voting::builder::{BallotData, Builder, CandidateData, ElectionData, PollbookData};
use list_voting::domain::QuotaGroup;
use list_voting::quota::Quota;
use list_voting::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::count::config_reader::*;

pub mod config_reader;
pub mod io_json;

#[derive(Debug, Snafu)]
pub enum CountError {
    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}: {source}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error parsing line {lineno} of {path}: {source}"))]
    ParsingJsonLine {
        source: serde_json::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error serializing the summary: {source}"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}: {source}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Invalid election description: {source}"))]
    InvalidElection { source: VotingErrors },
    #[snafu(display("The count failed: {source}"))]
    Counting { source: VotingErrors },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type CountResult<T> = Result<T, CountError>;

// Vote quantities are printed with a fixed precision, trailing zeros removed.
fn decimal(v: f64) -> String {
    let s = format!("{:.6}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn result_lists_to_json(rs: &ElectionResult) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for list_res in rs.lists.values() {
        let candidates: Vec<JSValue> = list_res
            .sorted_candidates_with_votes
            .iter()
            .map(|(cid, votes)| json!({"id": cid, "votes": decimal(*votes)}))
            .collect();
        let elected: Vec<String> = list_res
            .elected()
            .iter()
            .map(|(cid, _)| cid.clone())
            .collect();
        l.push(json!({
            "list": list_res.list_id,
            "mandates": list_res.mandates,
            "listVotes": list_res.list_votes,
            "candidates": candidates,
            "elected": elected,
        }));
    }
    l
}

fn seat_awards_to_json(rs: &ElectionResult) -> Vec<JSValue> {
    rs.seat_awards
        .iter()
        .map(|s| {
            json!({
                "seat": s.seat,
                "list": s.list_id,
                "voteNumber": decimal(s.vote_number),
                "drawn": s.drawn,
            })
        })
        .collect()
}

fn quotas_to_json(quotas: &[Quota]) -> Vec<JSValue> {
    quotas
        .iter()
        .map(|q| {
            json!({
                "name": q.name(),
                "members": q.members(),
                "minValue": q.min_value(),
                "minValueSubstitutes": q.min_value_substitutes(),
            })
        })
        .collect()
}

fn build_summary_js(
    config: &ElectionConfig,
    rs: &ElectionResult,
    quotas: Option<&[Quota]>,
) -> JSValue {
    let c = OutputConfig {
        contest: config.output_settings.contest_name.clone(),
        date: config.output_settings.contest_date.clone(),
        election: rs.election_id.clone(),
        election_type: rs.election_type.as_str().to_string(),
        seats: rs.num_mandates,
    };
    let mut js = json!({
        "config": c,
        "results": result_lists_to_json(rs),
        "seats": seat_awards_to_json(rs),
        "ballots": {
            "total": rs.ballot_count,
            "pollbooks": rs.pollbook_ballot_counts,
        },
    });
    if let Some(qs) = quotas {
        js["quotas"] = JSValue::Array(quotas_to_json(qs));
    }
    js
}

/// Turns the configuration into the in-memory election.
pub fn build_election(
    config: &ElectionConfig,
    ballots: Vec<BallotConfig>,
) -> CountResult<ElectionData> {
    let settings = &config.election;
    let mut builder = Builder::new(&settings.election_type, settings.num_choosable)
        .context(InvalidElectionSnafu {})?
        .id(&settings.id)
        .substitutes(settings.num_substitutes.unwrap_or(0))
        .period(settings.start.clone(), settings.end.clone());

    for p in config.pollbooks.iter() {
        let pollbook = PollbookData {
            weight: p.weight.unwrap_or(1.0),
            weight_per_vote: p.weight_per_vote.unwrap_or(1.0),
            weight_per_pollbook: p.weight_per_pollbook.unwrap_or(1.0),
            scale_factor: p.scale_factor.unwrap_or(1.0),
            ..PollbookData::new(&p.id)
        };
        builder = builder.pollbook(pollbook).context(InvalidElectionSnafu {})?;
    }

    for l in config.lists.iter() {
        let candidates: Vec<CandidateData> = l
            .candidates
            .iter()
            .map(|c| {
                let mut cd = CandidateData::new(&c.id)
                    .with_pre_cumulation(c.pre_cumulated.unwrap_or(false));
                if let Some(g) = c.gender.as_deref() {
                    cd = cd.with_gender(g);
                }
                if let Some(n) = c.name.as_deref() {
                    cd = cd.with_meta("name", n);
                }
                cd
            })
            .collect();
        debug!("build_election: list {} ({:?}): {:?}", l.id, l.name, candidates);
        builder = builder
            .list_2(&l.id, candidates)
            .context(InvalidElectionSnafu {})?;
    }

    for (idx, b) in ballots.into_iter().enumerate() {
        let id = b
            .id
            .clone()
            .unwrap_or_else(|| format!("ballot-{:08}", idx + 1));
        let same: Vec<SameListVote> = b
            .personal_votes_same
            .iter()
            .map(|v| SameListVote {
                candidate_id: v.candidate.clone(),
                cumulated: v.cumulated.unwrap_or(false),
            })
            .collect();
        let other: Vec<OtherListVote> = b
            .personal_votes_other
            .iter()
            .map(|v| OtherListVote {
                candidate_id: v.candidate.clone(),
                list_id: v.list.clone(),
            })
            .collect();
        builder
            .add_ballot_2(BallotData::new(
                &id,
                &b.chosen_list,
                same,
                other,
                b.pollbook.clone(),
            ))
            .context(InvalidElectionSnafu {})?;
    }
    Ok(builder.build())
}

/// Runs the count described by a configuration file and returns the summary.
///
/// The summary goes to `out` ('stdout' or a file path). Without `out`, it is
/// written in the output directory of the configuration if any, or printed.
pub fn run_count(
    config_path: &str,
    check_summary_path: Option<String>,
    out: Option<String>,
) -> CountResult<JSValue> {
    let config = read_config(config_path)?;
    info!("config: {:?}", config.output_settings);

    // Validate the rules before reading any ballot.
    let rules = validate_rules(&config.rules)?;
    info!("rules: {:?}", rules);

    let root_p = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu {})?;

    let mut ballots: Vec<BallotConfig> = config
        .ballots
        .iter()
        .enumerate()
        .map(|(idx, b)| BallotConfig {
            id: b
                .id
                .clone()
                .or_else(|| Some(format!("inline-{:08}", idx + 1))),
            ..b.clone()
        })
        .collect();
    for source in config.ballot_sources.iter() {
        let mut file_ballots = io_json::read_ballot_source(root_p, source)?;
        ballots.append(&mut file_ballots);
    }
    if ballots.is_empty() {
        warn!("No ballot found for election {}", config.election.id);
    }
    info!("Read {} ballots", ballots.len());

    let election = build_election(&config, ballots)?;
    let result = run_election(&election, &rules.counting).context(CountingSnafu {})?;
    let quotas: Option<Vec<Quota>> = rules.quota_rule.map(|r| r.generate(&election));

    let result_js = build_summary_js(&config, &result, quotas.as_deref());
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(WritingJsonSnafu {})?;

    let out_path: Option<String> = out.or_else(|| {
        config.output_settings.output_directory.as_ref().map(|d| {
            let p: PathBuf = root_p.join(d).join(format!("{}_summary.json", config.election.id));
            p.display().to_string()
        })
    });
    match out_path.as_deref() {
        None | Some("stdout") => {
            println!("{}", pretty_js_stats);
        }
        Some(p) => {
            info!("Writing summary to {}", p);
            fs::write(p, &pretty_js_stats).context(WritingFileSnafu { path: p })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(&summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(WritingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu {}.fail();
        }
    }

    Ok(result_js)
}

#[cfg(test)]
fn test_dir() -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "tests", "data"].iter().collect()
}

#[cfg(test)]
fn run_election_test(test_name: &str) -> CountResult<JSValue> {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = test_dir().join(test_name);
    info!("Running test {}", test_name);
    let config_p = dir.join(format!("{}_config.json", test_name));
    let summary_p = dir.join(format!("{}_expected_summary.json", test_name));
    let summary = if summary_p.exists() {
        Some(summary_p.display().to_string())
    } else {
        None
    };
    run_count(
        config_p.display().to_string().as_str(),
        summary,
        Some("stdout".to_string()),
    )
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    if let Err(e) = run_election_test(test_name) {
        panic!("test {} failed: {}", test_name, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals() {
        assert_eq!(decimal(0.0), "0");
        assert_eq!(decimal(100.0), "100");
        assert_eq!(decimal(7.5), "7.5");
        assert_eq!(decimal(100.0 / 3.0), "33.333333");
    }

    #[test]
    fn two_lists() {
        test_wrapper("two_lists");
    }

    #[test]
    fn list_votes_are_integers() {
        let js = run_election_test("two_lists").unwrap();
        assert_eq!(js["results"][0]["listVotes"], json!(10));
        assert_eq!(js["results"][1]["listVotes"], json!(5));
    }

    #[test]
    fn ballot_sources() {
        test_wrapper("ballot_sources");
    }

    #[test]
    fn gender_quotas() {
        test_wrapper("gender_quotas");
    }

    #[test]
    fn seeded_tiebreak() {
        let js = run_election_test("seeded_tiebreak").unwrap();
        let seats = js["seats"].as_array().unwrap();
        assert_eq!(seats.len(), 1);
        assert_eq!(seats[0]["drawn"], JSValue::Bool(true));
    }

    #[test]
    fn tie_requires_draw() {
        match run_election_test("tie_requires_draw") {
            Err(CountError::Counting {
                source: VotingErrors::TieRequiresRandomDraw { seat, tied },
            }) => {
                assert_eq!(seat, 1);
                let names: Vec<&str> = tied.iter().map(|(l, _)| l.as_str()).collect();
                assert_eq!(names, vec!["A", "B", "C"]);
            }
            x => panic!("expected a tie, got {:?}", x),
        }
    }

    #[test]
    fn unknown_election_type() {
        assert!(matches!(
            run_election_test("unknown_type"),
            Err(CountError::Counting {
                source: VotingErrors::UnsupportedElectionType(_)
            })
        ));
    }

    #[test]
    fn unknown_candidate() {
        assert!(matches!(
            run_election_test("unknown_candidate"),
            Err(CountError::Counting {
                source: VotingErrors::UnknownCandidate { .. }
            })
        ));
    }
}
