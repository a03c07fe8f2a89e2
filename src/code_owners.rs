//! CODEOWNERS generation
//!
//! Every typings package is owned by the GitHub users listed in its
//! "Definitions by:" header.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::TYPES_DIRECTORY_NAME;
use crate::packages::TypingsData;

const HEADER: &str = "# This file is generated.
# Add yourself to the \"Definitions by:\" list instead.
# See https://github.com/DefinitelyTyped/DefinitelyTyped#edit-an-existing-package";

/// Render the CODEOWNERS file for the given packages
pub fn generate(typings: &[TypingsData]) -> String {
    let max_path_len = typings
        .iter()
        .map(|t| t.subdirectory_path().len())
        .max()
        .unwrap_or(0);

    let lines: Vec<String> = typings
        .iter()
        .filter_map(|t| entry(t, max_path_len))
        .collect();

    format!("{}\n\n{}\n", HEADER, lines.join("\n"))
}

/// One line per package with at least one GitHub username
fn entry(pkg: &TypingsData, max_path_len: usize) -> Option<String> {
    let users: Vec<String> = pkg.github_usernames().map(|u| format!("@{}", u)).collect();
    if users.is_empty() {
        return None;
    }

    let path = format!("{}/", pkg.subdirectory_path());
    Some(format!(
        "/{}/{:<width$} {}",
        TYPES_DIRECTORY_NAME,
        path,
        users.join(" "),
        width = max_path_len
    ))
}

pub fn code_owners_path(definitely_typed_path: &Path) -> PathBuf {
    definitely_typed_path.join(".github").join("CODEOWNERS")
}

/// Write CODEOWNERS into the DefinitelyTyped checkout
pub fn write(definitely_typed_path: &Path, typings: &[TypingsData]) -> std::io::Result<PathBuf> {
    let path = code_owners_path(definitely_typed_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, generate(typings))?;
    info!("Wrote {} owners entries to {:?}", typings.len(), path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packages::{AllPackages, Contributor};
    use tempfile::TempDir;

    fn contributor(github: Option<&str>) -> Contributor {
        Contributor {
            name: "Someone".to_string(),
            url: "https://example.com".to_string(),
            github_username: github.map(|g| g.to_string()),
        }
    }

    fn typings(name: &str, major: u32, contributors: Vec<Contributor>) -> TypingsData {
        TypingsData {
            name: name.to_string(),
            major,
            minor: 0,
            content_hash: String::new(),
            typescript_version: "2.3".to_string(),
            contributors,
            is_latest: false,
        }
    }

    fn sample() -> AllPackages {
        AllPackages::new(
            vec![
                typings("jquery", 3, vec![contributor(Some("alice")), contributor(Some("bob"))]),
                typings("node", 8, vec![contributor(Some("carol"))]),
                typings("node", 10, vec![contributor(Some("carol"))]),
                typings("anonymous", 1, vec![contributor(None)]),
            ],
            vec![],
        )
    }

    #[test]
    fn generate_pads_paths_to_longest_subdirectory() {
        let text = generate(sample().all_typings());

        // "anonymous" is the longest path even though it has no entry
        let expected = "# This file is generated.
# Add yourself to the \"Definitions by:\" list instead.
# See https://github.com/DefinitelyTyped/DefinitelyTyped#edit-an-existing-package

/types/jquery/   @alice @bob
/types/node/v8/  @carol
/types/node/     @carol
";
        assert_eq!(text, expected);
    }

    #[test]
    fn generate_skips_packages_without_github_users() {
        let text = generate(sample().all_typings());

        assert!(!text.contains("anonymous"));
    }

    #[test]
    fn write_creates_github_directory() {
        let temp_dir = TempDir::new().unwrap();

        let path = write(temp_dir.path(), sample().all_typings()).unwrap();

        assert_eq!(path, temp_dir.path().join(".github").join("CODEOWNERS"));
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("# This file is generated."));
    }
}
