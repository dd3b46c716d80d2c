//! `pm3 commit`: the commitment of a JSON document.
//!
//! Prints the SHA-256 of the document's canonical form. With `--verify`,
//! compares against an expected commitment instead and exits 1 on mismatch.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use pm3_crypto::{commit, verify_commitment, Commitment};

/// Arguments for `pm3 commit`.
#[derive(Args, Debug)]
pub struct CommitArgs {
    /// JSON document to commit to.
    pub file: PathBuf,

    /// Expected commitment (64 lowercase hex characters).
    #[arg(long)]
    pub verify: Option<String>,
}

/// Execute the commit subcommand.
pub fn run_commit(args: &CommitArgs, out: &mut impl Write) -> Result<u8> {
    let raw = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let document: Value = serde_json::from_slice(&raw)
        .with_context(|| format!("{} is not JSON", args.file.display()))?;

    match &args.verify {
        None => {
            let commitment = commit(&document)
                .with_context(|| format!("failed to canonicalize {}", args.file.display()))?;
            writeln!(out, "{}", commitment.as_str())?;
            Ok(0)
        }
        Some(expected) => {
            let expected = Commitment::from_hex(expected).context("invalid --verify value")?;
            if verify_commitment(&expected, &document) {
                writeln!(out, "OK")?;
                Ok(0)
            } else {
                writeln!(out, "MISMATCH")?;
                Ok(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_doc(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("doc.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    fn run(args: &CommitArgs) -> (u8, String) {
        let mut out = Vec::new();
        let code = run_commit(args, &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn key_order_does_not_change_the_commitment() {
        let dir = tempfile::tempdir().unwrap();
        let a = run(&CommitArgs {
            file: write_doc(&dir, r#"{"b":1,"a":"x"}"#),
            verify: None,
        });
        let b = run(&CommitArgs {
            file: write_doc(&dir, r#"{ "a": "x", "b": 1 }"#),
            verify: None,
        });
        assert_eq!(a.0, 0);
        assert_eq!(a.1, b.1);
        assert_eq!(a.1.trim().len(), 64);
    }

    #[test]
    fn verify_reports_match_and_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_doc(&dir, r#"{"a":1}"#);
        let (_, hash) = run(&CommitArgs {
            file: file.clone(),
            verify: None,
        });

        let (code, text) = run(&CommitArgs {
            file: file.clone(),
            verify: Some(hash.trim().to_string()),
        });
        assert_eq!((code, text.trim()), (0, "OK"));

        let (code, text) = run(&CommitArgs {
            file,
            verify: Some("00".repeat(32)),
        });
        assert_eq!((code, text.trim()), (1, "MISMATCH"));
    }

    #[test]
    fn non_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = CommitArgs {
            file: write_doc(&dir, "not json"),
            verify: None,
        };
        assert!(run_commit(&args, &mut Vec::new()).is_err());
    }
}
