// Primitives for reading ballot files.

use std::path::Path;

use crate::count::*;

/// Reads all the ballots of a source.
///
/// Ballots without an id receive one built from the file name and their
/// position in the file.
pub fn read_ballot_source(root: &Path, source: &BallotSource) -> CountResult<Vec<BallotConfig>> {
    let p: PathBuf = root.join(&source.file_path);
    let path = p.as_path().display().to_string();
    info!("Attempting to read ballot file {:?}", path);
    let mut ballots = match source.provider.as_str() {
        "json" => read_json(&path)?,
        "jsonl" => read_jsonl(&path)?,
        x => {
            whatever!("Provider not implemented {:?}", x)
        }
    };
    let default_id = make_default_id(&source.file_path);
    for (idx, b) in ballots.iter_mut().enumerate() {
        if b.id.is_none() {
            b.id = Some(default_id(idx + 1));
        }
    }
    debug!("read_ballot_source: {} ballots in {:?}", ballots.len(), path);
    Ok(ballots)
}

fn read_json(path: &str) -> CountResult<Vec<BallotConfig>> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(&contents).context(ParsingJsonSnafu { path })
}

// One ballot per line. Empty lines are skipped.
fn read_jsonl(path: &str) -> CountResult<Vec<BallotConfig>> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let mut res: Vec<BallotConfig> = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let b: BallotConfig = serde_json::from_str(line).context(ParsingJsonLineSnafu {
            path,
            lineno: idx + 1,
        })?;
        res.push(b);
    }
    Ok(res)
}

fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ids() {
        let f = make_default_id("data/ballots.jsonl");
        assert_eq!(f(3), "ballots.jsonl-00000003");
    }
}
