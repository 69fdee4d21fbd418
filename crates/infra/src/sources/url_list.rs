//! List-of-URLs files
//!
//! Either INI style, `name = url` entries under `[section]` headers, or one
//! URL per line. `#` and `;` start comment lines in both.

use std::path::Path;

use blockgate_domain::{Result, SyncError};
use tracing::debug;

/// URLs listed in `path`; a missing file lists none.
///
/// # Errors
/// Returns `SyncError::Source` if the file exists but cannot be read.
pub async fn read_url_file(path: &Path) -> Result<Vec<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(parse_url_list(&contents)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no url list file");
            Ok(Vec::new())
        }
        Err(err) => Err(SyncError::Source(format!("failed to read {}: {err}", path.display()))),
    }
}

/// Parse either format; a file whose first entry is a section header is INI.
pub fn parse_url_list(contents: &str) -> Vec<String> {
    let mut entries = contents.lines().map(str::trim).filter(|line| !is_comment(line)).peekable();

    let ini = entries.peek().is_some_and(|line| is_section(line));
    if !ini {
        return entries.map(str::to_owned).collect();
    }

    entries
        .filter(|line| !is_section(line))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let value = value.trim();
            (!key.trim().is_empty() && !value.is_empty()).then(|| value.to_owned())
        })
        .collect()
}

/// Whitespace-separated URLs, as given in `ADLIST_URLS`.
pub fn split_urls(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_owned).collect()
}

fn is_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with(';')
}

fn is_section(line: &str) -> bool {
    line.starts_with('[') && line.ends_with(']')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ini_entries() {
        let contents = "\
# block lists
[Lists]
ads = https://lists.example/ads.txt
; disabled = https://lists.example/old.txt
tracking=https://lists.example/track.txt?format=hosts

[Extra]
empty =
misc = https://lists.example/misc.txt
";
        assert_eq!(
            parse_url_list(contents),
            vec![
                "https://lists.example/ads.txt",
                "https://lists.example/track.txt?format=hosts",
                "https://lists.example/misc.txt",
            ]
        );
    }

    #[test]
    fn parses_plain_lines() {
        let contents = "https://a.example/list.txt\n\n# comment\n  https://b.example/hosts  \n";
        assert_eq!(parse_url_list(contents), vec!["https://a.example/list.txt", "https://b.example/hosts"]);
    }

    #[test]
    fn splits_env_urls_on_any_whitespace() {
        assert_eq!(split_urls(" https://a/x\n\thttps://b/y  "), vec!["https://a/x", "https://b/y"]);
        assert!(split_urls("   ").is_empty());
    }

    #[tokio::test]
    async fn missing_file_lists_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(read_url_file(&dir.path().join("adlist.ini")).await.unwrap().is_empty());
    }
}
