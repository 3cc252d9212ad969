//! Scrapes `pcluster --help` style output.
//!
//! Pure text-in, names-out functions; running the CLI lives in
//! [`crate::catalog`].

use pcluster_common::{CompletionError, Result};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Line that precedes the subcommand list in argparse output
const POSITIONAL_MARKER: &str = "positional arguments:";

/// `{create,update,delete}`
static SUBCOMMAND_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{((?:[^{},]+,)+[^{},]+)\}").unwrap());

/// `-c CONFIG_FILE, --config CONFIG_FILE`, `--help`, `-nw, --nowait`
static FLAG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(-[A-Za-z][A-Za-z0-9]*)(?:\s+(?:[A-Z][A-Z0-9_]*|\{[^}]*\}))?,\s+)?(--[A-Za-z0-9][A-Za-z0-9_-]*)(?:[\s=]+(?:[A-Z][A-Z0-9_]*|\{[^}]*\}))?",
    )
    .unwrap()
});

/// Subcommands listed on the line after `positional arguments:`.
///
/// Fails with `DiscoveryParse` when the marker is absent or the next line is
/// not a brace list; never returns a partial guess.
pub fn parse_subcommands(help_text: &str) -> Result<Vec<String>> {
    let mut lines = help_text.lines().map(str::trim);

    if !lines.any(|line| line.contains(POSITIONAL_MARKER)) {
        return Err(CompletionError::DiscoveryParse(format!(
            "no `{}` line in help output",
            POSITIONAL_MARKER
        )));
    }

    let next = lines.next().unwrap_or_default();
    let captures = SUBCOMMAND_LIST.captures(next).ok_or_else(|| {
        CompletionError::DiscoveryParse(format!(
            "line after `{}` is not a subcommand list: {:?}",
            POSITIONAL_MARKER, next
        ))
    })?;

    Ok(captures[1].split(',').map(|name| name.trim().to_string()).collect())
}

/// Flag spellings found in a subcommand's help text, in order of appearance.
///
/// Best effort: lines that do not look like option lines are skipped.
pub fn parse_flags(help_text: &str) -> Vec<String> {
    let mut flags: Vec<String> = Vec::new();

    for line in help_text.lines().map(str::trim) {
        let Some(captures) = FLAG_LINE.captures(line) else {
            continue;
        };
        for spelling in [captures.get(1), captures.get(2)].into_iter().flatten() {
            let spelling = spelling.as_str();
            if !flags.iter().any(|f| f == spelling) {
                flags.push(spelling.to_string());
            }
        }
    }

    debug!("Parsed {} flags from help output", flags.len());
    flags
}
