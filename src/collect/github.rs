//! GitHub REST source: recursive git tree listing plus the contents API.

use super::{CollectError, EntryKind, Source, TreeEntry};
use crate::config::RepoConfig;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;

const ACCEPT: &str = "application/vnd.github+json";

pub struct GithubSource {
    agent: ureq::Agent,
    config: RepoConfig,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    path: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: Option<String>,
}

impl GithubSource {
    pub fn new(config: RepoConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("nanosdoc/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent, config }
    }

    fn get(&self, url: &str) -> ureq::Request {
        let request = self.agent.get(url).set("Accept", ACCEPT);
        match &self.config.token {
            Some(token) => request.set("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }
}

impl Source for GithubSource {
    fn list(&self) -> Result<Vec<TreeEntry>, CollectError> {
        let response: TreeResponse = self
            .get(&self.config.tree_url())
            .query("recursive", "1")
            .call()
            .map_err(|e| CollectError::Listing(describe(e)))?
            .into_json()
            .map_err(|e| CollectError::Listing(e.to_string()))?;

        if response.truncated {
            tracing::warn!("repository tree listing was truncated by the API");
        }

        Ok(tree_entries(response.tree))
    }

    fn fetch(&self, path: &str) -> Result<Option<String>, CollectError> {
        let response: ContentResponse = self
            .get(&self.config.contents_url(path))
            .query("ref", &self.config.reference)
            .call()
            .map_err(|e| CollectError::Fetch {
                path: path.to_string(),
                message: describe(e),
            })?
            .into_json()
            .map_err(|e| CollectError::Decode {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        match response.content {
            Some(content) => decode_content(path, &content).map(Some),
            None => Ok(None),
        }
    }
}

/// Keep blobs and trees; submodules (`commit`), unknown kinds and entries
/// without a path are dropped.
fn tree_entries(items: Vec<TreeItem>) -> Vec<TreeEntry> {
    items
        .into_iter()
        .filter_map(|item| {
            let kind = match item.kind.as_deref() {
                Some("blob") => EntryKind::Blob,
                Some("tree") => EntryKind::Tree,
                _ => return None,
            };
            Some(TreeEntry {
                path: item.path?,
                kind,
            })
        })
        .collect()
}

/// Decode a contents-API payload: base64 wrapped at 60 columns, UTF-8 inside.
fn decode_content(path: &str, content: &str) -> Result<String, CollectError> {
    let decode_err = |message: String| CollectError::Decode {
        path: path.to_string(),
        message,
    };

    let compact: String = content.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| decode_err(format!("invalid base64: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| decode_err(format!("invalid UTF-8: {}", e)))
}

fn describe(err: ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, response) => {
            format!("HTTP {} {}", code, response.status_text())
        }
        ureq::Error::Transport(transport) => transport.to_string(),
    }
}
