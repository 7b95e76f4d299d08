//! Repository context: the fixed set of files a scorecard is built from

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ContentsClient, Result};

/// Files read for every scorecard, in fetch order
pub const CONTEXT_FILES: [&str; 2] = ["README.md", "CODEOWNERS"];

/// Filename to content (decoded text or the not-found sentinel)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryContext(BTreeMap<String, String>);

impl RepositoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: impl Into<String>, content: impl Into<String>) {
        self.0.insert(filename.into(), content.into());
    }

    pub fn get(&self, filename: &str) -> Option<&str> {
        self.0.get(filename).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl ContentsClient {
    /// Fetch every file in [`CONTEXT_FILES`], one after another
    ///
    /// The result always has exactly those keys; files that could not be
    /// fetched hold the sentinel. Only a malformed successful response fails
    /// the whole call.
    pub async fn fetch_repo_context(&self, owner: &str, repo: &str) -> Result<RepositoryContext> {
        let mut context = RepositoryContext::new();

        for filename in CONTEXT_FILES {
            let content = self.fetch_file(owner, repo, filename).await?;
            context.insert(filename, content);
        }

        info!(owner, repo, files = context.len(), "Fetched repository context");
        Ok(context)
    }
}
