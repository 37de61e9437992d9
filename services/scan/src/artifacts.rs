//! Artifact emission: `candidates.jsonl`, `ledger.jsonl`, and `manifest.json`,
//! each written to `*.tmp` and renamed into place on success so a partial
//! file never appears at the canonical path (spec §4.10, §6).

use chrono::{DateTime, Utc};
use cryptorun_types::{CompositeScore, EntryResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to write {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("failed to serialize artifact: {0}")]
    Serialize(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerLine {
    pub symbol: String,
    pub score: f64,
    pub regime: String,
    pub contributions: BTreeMap<String, f64>,
    pub weights: BTreeMap<String, f64>,
    pub social_contribution: f64,
}

impl LedgerLine {
    pub fn from_score(score: &CompositeScore) -> Self {
        Self {
            symbol: score.symbol.as_str().to_string(),
            score: score.score,
            regime: score.regime.label().to_string(),
            contributions: score.contributions.iter().map(|(k, v)| (k.clone(), v.contribution)).collect(),
            weights: score.weights.clone(),
            social_contribution: score.social_contribution,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ManifestEntry {
    pub id: String,
    pub family: String,
    pub run_id: String,
    pub timestamp: String,
    pub paths: Vec<String>,
    pub total_bytes: u64,
    pub pass: bool,
    pub is_last_run: bool,
    pub is_last_pass: bool,
    pub is_pinned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ManifestSummary {
    pub total_entries: usize,
    pub family_counts: BTreeMap<String, usize>,
    pub pass_count: usize,
    pub fail_count: usize,
    pub oldest_timestamp: Option<String>,
    pub newest_timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
    pub summary: ManifestSummary,
}

impl Manifest {
    pub fn build(entries: Vec<ManifestEntry>) -> Self {
        let mut summary = ManifestSummary { total_entries: entries.len(), ..Default::default() };
        for entry in &entries {
            *summary.family_counts.entry(entry.family.clone()).or_insert(0) += 1;
            if entry.pass {
                summary.pass_count += 1;
            } else {
                summary.fail_count += 1;
            }
            if summary.oldest_timestamp.as_deref().map(|t| entry.timestamp < *t).unwrap_or(true) {
                summary.oldest_timestamp = Some(entry.timestamp.clone());
            }
            if summary.newest_timestamp.as_deref().map(|t| entry.timestamp > *t).unwrap_or(true) {
                summary.newest_timestamp = Some(entry.timestamp.clone());
            }
        }
        Self { entries, summary }
    }

    pub fn by_id(&self, id: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn by_family<'a>(&'a self, family: &'a str) -> impl Iterator<Item = &'a ManifestEntry> {
        self.entries.iter().filter(move |e| e.family == family)
    }

    pub fn by_run_id<'a>(&'a self, run_id: &'a str) -> impl Iterator<Item = &'a ManifestEntry> {
        self.entries.iter().filter(move |e| e.run_id == run_id)
    }
}

pub fn manifest_entry_id(paths: &[String], family: &str, run_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(paths.join(",").as_bytes());
    hasher.update(b"|");
    hasher.update(family.as_bytes());
    hasher.update(b"|");
    hasher.update(run_id.as_bytes());
    hex::encode(hasher.finalize())
}

/// Writes `contents` to `path.tmp` then renames into place. Never leaves a
/// partial file at `path`.
fn atomic_write(path: &Path, contents: &[u8]) -> Result<u64, ArtifactError> {
    let tmp_path = path.with_extension(format!("{}.tmp", path.extension().and_then(|e| e.to_str()).unwrap_or("tmp")));
    {
        let mut file = std::fs::File::create(&tmp_path)
            .map_err(|e| ArtifactError::Io { path: tmp_path.clone(), message: e.to_string() })?;
        file.write_all(contents).map_err(|e| ArtifactError::Io { path: tmp_path.clone(), message: e.to_string() })?;
        file.sync_all().map_err(|e| ArtifactError::Io { path: tmp_path.clone(), message: e.to_string() })?;
    }
    std::fs::rename(&tmp_path, path).map_err(|e| ArtifactError::Io { path: path.to_path_buf(), message: e.to_string() })?;
    Ok(contents.len() as u64)
}

fn write_jsonl<T: Serialize>(path: &Path, rows: &[T]) -> Result<u64, ArtifactError> {
    let mut buf = Vec::new();
    for row in rows {
        let line = serde_json::to_string(row).map_err(|e| ArtifactError::Serialize(e.to_string()))?;
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
    }
    atomic_write(path, &buf)
}

pub struct WrittenArtifacts {
    pub manifest: Manifest,
    pub candidates_path: PathBuf,
    pub ledger_path: PathBuf,
    pub manifest_path: PathBuf,
}

/// Writes `candidates.jsonl` and `ledger.jsonl`, then a `manifest.json`
/// describing both families for this run, all atomically.
pub fn write_artifacts(
    out_dir: &Path,
    run_id: &str,
    candidates: &[EntryResult],
    ledger: &[LedgerLine],
    now: DateTime<Utc>,
) -> Result<WrittenArtifacts, ArtifactError> {
    std::fs::create_dir_all(out_dir).map_err(|e| ArtifactError::Io { path: out_dir.to_path_buf(), message: e.to_string() })?;

    let candidates_path = out_dir.join("candidates.jsonl");
    let ledger_path = out_dir.join("ledger.jsonl");
    let manifest_path = out_dir.join("manifest.json");

    let candidates_bytes = write_jsonl(&candidates_path, candidates)?;
    let ledger_bytes = write_jsonl(&ledger_path, ledger)?;

    let timestamp = now.to_rfc3339();
    let overall_pass = candidates.iter().any(|c| c.overall_pass);

    let entries = vec![
        ManifestEntry {
            id: manifest_entry_id(&[candidates_path.display().to_string()], "candidates", run_id),
            family: "candidates".to_string(),
            run_id: run_id.to_string(),
            timestamp: timestamp.clone(),
            paths: vec![candidates_path.display().to_string()],
            total_bytes: candidates_bytes,
            pass: overall_pass,
            is_last_run: true,
            is_last_pass: overall_pass,
            is_pinned: false,
        },
        ManifestEntry {
            id: manifest_entry_id(&[ledger_path.display().to_string()], "ledger", run_id),
            family: "ledger".to_string(),
            run_id: run_id.to_string(),
            timestamp,
            paths: vec![ledger_path.display().to_string()],
            total_bytes: ledger_bytes,
            pass: true,
            is_last_run: true,
            is_last_pass: true,
            is_pinned: false,
        },
    ];
    let manifest = Manifest::build(entries);
    let manifest_json = serde_json::to_vec_pretty(&manifest).map_err(|e| ArtifactError::Serialize(e.to_string()))?;
    atomic_write(&manifest_path, &manifest_json)?;

    Ok(WrittenArtifacts { manifest, candidates_path, ledger_path, manifest_path })
}

/// Rebuilds a `Manifest` by reading `candidates.jsonl`/`ledger.jsonl` back
/// off disk rather than from in-memory scan state (Testable Property 11:
/// scanning the same directory twice must yield identical entries and
/// summary counters). Pure function of the bytes currently in `out_dir`, so
/// repeated calls with no intervening write are idempotent by construction.
pub fn rescan_dir(out_dir: &Path, run_id: &str, timestamp: DateTime<Utc>) -> Result<Manifest, ArtifactError> {
    let candidates_path = out_dir.join("candidates.jsonl");
    let ledger_path = out_dir.join("ledger.jsonl");

    let read_len = |path: &Path| -> Result<u64, ArtifactError> {
        std::fs::metadata(path).map(|m| m.len()).map_err(|e| ArtifactError::Io { path: path.to_path_buf(), message: e.to_string() })
    };
    let candidates_bytes = read_len(&candidates_path)?;
    let ledger_bytes = read_len(&ledger_path)?;

    let candidates_text = std::fs::read_to_string(&candidates_path)
        .map_err(|e| ArtifactError::Io { path: candidates_path.clone(), message: e.to_string() })?;
    let overall_pass = candidates_text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|line| serde_json::from_str::<EntryResult>(line).map(|r| r.overall_pass))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ArtifactError::Serialize(e.to_string()))?
        .into_iter()
        .any(|pass| pass);

    let timestamp = timestamp.to_rfc3339();
    let entries = vec![
        ManifestEntry {
            id: manifest_entry_id(&[candidates_path.display().to_string()], "candidates", run_id),
            family: "candidates".to_string(),
            run_id: run_id.to_string(),
            timestamp: timestamp.clone(),
            paths: vec![candidates_path.display().to_string()],
            total_bytes: candidates_bytes,
            pass: overall_pass,
            is_last_run: true,
            is_last_pass: overall_pass,
            is_pinned: false,
        },
        ManifestEntry {
            id: manifest_entry_id(&[ledger_path.display().to_string()], "ledger", run_id),
            family: "ledger".to_string(),
            run_id: run_id.to_string(),
            timestamp,
            paths: vec![ledger_path.display().to_string()],
            total_bytes: ledger_bytes,
            pass: true,
            is_last_run: true,
            is_last_pass: true,
            is_pinned: false,
        },
    ];
    Ok(Manifest::build(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptorun_types::{CandidateState, GateCheck, Symbol};

    fn sample_result(pass: bool, score: f64) -> EntryResult {
        EntryResult {
            symbol: Symbol::parse("BTC-USD").unwrap(),
            overall_pass: pass,
            checks: vec![GateCheck { name: "score".to_string(), value: score, threshold: 75.0, passed: pass, reason: None }],
            failure_reasons: if pass { vec![] } else { vec!["SCORE_BELOW".to_string()] },
            passed_gates: if pass { vec!["score".to_string()] } else { vec![] },
            evaluation_ms: 1,
            timestamp_ms: 1,
            state: if pass { CandidateState::Pass } else { CandidateState::Fail },
        }
    }

    #[test]
    fn writes_artifacts_and_no_tmp_file_remains() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = vec![sample_result(true, 80.0), sample_result(false, 60.0)];
        let ledger = vec![];
        let written = write_artifacts(dir.path(), "run-1", &candidates, &ledger, Utc::now()).unwrap();

        assert!(written.candidates_path.exists());
        assert!(written.ledger_path.exists());
        assert!(written.manifest_path.exists());
        assert!(!dir.path().join("candidates.jsonl.tmp").exists());

        let manifest = written.manifest;
        assert_eq!(manifest.summary.total_entries, 2);
        assert!(manifest.by_family("candidates").next().is_some());
    }

    #[test]
    fn testable_property_11_rescan_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = vec![sample_result(true, 80.0), sample_result(false, 60.0)];
        write_artifacts(dir.path(), "run-1", &candidates, &[], Utc::now()).unwrap();

        let now = Utc::now();
        let first = rescan_dir(dir.path(), "run-1", now).unwrap();
        let second = rescan_dir(dir.path(), "run-1", now).unwrap();

        assert_eq!(first.entries.len(), second.entries.len());
        for (a, b) in first.entries.iter().zip(second.entries.iter()) {
            assert_eq!(a.id, b.id);
        }
        assert_eq!(first.summary.total_entries, second.summary.total_entries);
        assert_eq!(first.summary.pass_count, second.summary.pass_count);
        assert_eq!(first.summary.fail_count, second.summary.fail_count);
    }

    #[test]
    fn manifest_entry_id_is_deterministic() {
        let a = manifest_entry_id(&["p".to_string()], "candidates", "run-1");
        let b = manifest_entry_id(&["p".to_string()], "candidates", "run-1");
        assert_eq!(a, b);
        assert_ne!(a, manifest_entry_id(&["p".to_string()], "ledger", "run-1"));
    }
}
