//! Parsers for the machine-readable formats requested from `git`.
//!
//! Every format uses ASCII unit (`0x1f`) and record (`0x1e`) separators so
//! that commit messages and ref names never need escaping.

use crate::vcs::{
    domain::{Branch, BranchName, Commit, CommitData, CommitId},
    ports::{VcsError, VcsResult},
};
use chrono::{DateTime, FixedOffset};

pub(super) const FIELD_SEPARATOR: char = '\u{1f}';
pub(super) const RECORD_SEPARATOR: char = '\u{1e}';

/// `for-each-ref` format: refname, object name, committer date.
pub(super) const BRANCH_FORMAT: &str = "%(refname)%1f%(objectname)%1f%(committerdate:iso-strict)";

/// `log`/`show` format; the file list from `--name-only` follows the last
/// separator.
pub(super) const COMMIT_FORMAT: &str = "--format=%x1e%H%x1f%an%x1f%ae%x1f%cI%x1f%B%x1f";

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Parses `for-each-ref` output into branches.
pub(super) fn parse_branches(output: &str) -> VcsResult<Vec<Branch>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_branch_line)
        .collect()
}

fn parse_branch_line(line: &str) -> VcsResult<Branch> {
    let mut fields = line.split(FIELD_SEPARATOR);
    let (Some(refname), Some(object), Some(date), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed("git for-each-ref", line));
    };
    let name = refname
        .strip_prefix(BRANCH_REF_PREFIX)
        .ok_or_else(|| malformed("git for-each-ref", refname))?;

    Ok(Branch::new(
        BranchName::new(name)?,
        CommitId::parse(object)?,
        parse_timestamp("git for-each-ref", date)?,
    ))
}

/// Parses `log`/`show` output produced with [`COMMIT_FORMAT`].
pub(super) fn parse_commits(output: &str) -> VcsResult<Vec<Commit>> {
    output
        .split(RECORD_SEPARATOR)
        .filter(|record| !record.trim().is_empty())
        .map(parse_commit_record)
        .collect()
}

fn parse_commit_record(record: &str) -> VcsResult<Commit> {
    let mut fields = record.splitn(6, FIELD_SEPARATOR);
    let (Some(id), Some(author_name), Some(author_email), Some(date), Some(message), Some(files)) = (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) else {
        return Err(malformed("git log", record));
    };

    Ok(Commit::new(CommitData {
        id: CommitId::parse(id.trim())?,
        author_name: author_name.to_owned(),
        author_email: author_email.to_owned(),
        message: message.trim_end().to_owned(),
        committed_at: parse_timestamp("git log", date)?,
        files_changed: count_files(files),
    }))
}

fn count_files(listing: &str) -> usize {
    listing
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count()
}

fn parse_timestamp(command: &str, raw: &str) -> VcsResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw.trim()).map_err(|err| VcsError::MalformedOutput {
        command: command.to_owned(),
        detail: format!("bad timestamp '{raw}': {err}"),
    })
}

fn malformed(command: &str, fragment: &str) -> VcsError {
    VcsError::MalformedOutput {
        command: command.to_owned(),
        detail: format!("unrecognised record '{}'", fragment.escape_debug()),
    }
}

/// Heuristic used alongside the unmerged-path check: git reports content
/// conflicts with `CONFLICT (...)` lines and a closing hint.
pub(super) fn mentions_conflict(text: &str) -> bool {
    text.to_ascii_lowercase().contains("conflict")
}
