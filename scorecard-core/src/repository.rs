//! Repository coordinates

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::{Error, Result};

/// Identifies a GitHub repository by owner and name
///
/// Both fields are required and never defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepositoryCoordinate {
    owner: String,
    repo: String,
}

impl RepositoryCoordinate {
    /// Create a coordinate, rejecting parts that are not a single path segment
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self> {
        let owner = owner.into().trim().to_string();
        let repo = repo.into().trim().to_string();

        check_part("owner", &owner)?;
        check_part("name", &repo)?;

        Ok(Self { owner, repo })
    }

    /// Repository owner (user or organization)
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Canonical web URL, `https://github.com/<owner>/<repo>`
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepositoryCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepositoryCoordinate {
    type Err = Error;

    /// Supports formats:
    /// - owner/repo
    /// - https://github.com/owner/repo
    /// - git@github.com:owner/repo.git
    fn from_str(s: &str) -> Result<Self> {
        let (owner, repo) = parse_github_url(s.trim())?;
        Self::new(owner, repo)
    }
}

fn check_part(label: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidRepository(format!(
            "repository {} must not be empty",
            label
        )));
    }
    // dot segments would be collapsed when the value lands in a URL path
    if value == "." || value == ".." || value.contains('/') {
        return Err(Error::InvalidRepository(format!(
            "repository {} is not a valid path segment: {}",
            label, value
        )));
    }
    Ok(())
}

fn parse_github_url(input: &str) -> Result<(String, String)> {
    // scp-style SSH remote
    if let Some(rest) = input.strip_prefix("git@") {
        return match rest.strip_prefix("github.com:") {
            Some(path) => owner_and_repo(path, input),
            None => Err(Error::InvalidRepository(format!(
                "not a github.com SSH URL: {}",
                input
            ))),
        };
    }

    if input.contains("://") {
        let url = url::Url::parse(input).map_err(|e| Error::InvalidRepository(e.to_string()))?;
        if !matches!(url.scheme(), "https" | "http") {
            return Err(Error::InvalidRepository(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }
        if !matches!(url.host_str(), Some("github.com" | "www.github.com")) {
            return Err(Error::InvalidRepository(format!(
                "not a github.com URL: {}",
                input
            )));
        }
        return owner_and_repo(url.path(), input);
    }

    owner_and_repo(input, input)
}

/// Split `owner/repo[.git]`; anything other than exactly two parts is rejected
fn owner_and_repo(path: &str, input: &str) -> Result<(String, String)> {
    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    match path.split('/').collect::<Vec<_>>().as_slice() {
        [owner, repo] => Ok((owner.to_string(), repo.to_string())),
        _ => Err(Error::InvalidRepository(format!(
            "{}. Expected owner/repo or a github.com repository URL",
            input
        ))),
    }
}
