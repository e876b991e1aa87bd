//! Repository coordinates for the GitHub source.

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Which repository and revision to read descriptors from.
#[derive(Debug, Clone)]
pub struct RepoConfig {
    /// Bearer token; public repositories can be read without one.
    pub token: Option<String>,
    pub owner: String,
    pub repo: String,
    /// Branch, tag or commit SHA.
    pub reference: String,
    pub api_url: String,
}

impl RepoConfig {
    pub fn tree_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/git/trees/{}",
            self.api_base(),
            self.owner,
            self.repo,
            self.reference
        )
    }

    /// Contents-API URL for `path`. Each segment is percent-encoded, the
    /// separating slashes are kept.
    pub fn contents_url(&self, path: &str) -> String {
        let encoded: Vec<_> = path
            .trim_start_matches('/')
            .split('/')
            .map(urlencoding::encode)
            .collect();
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base(),
            self.owner,
            self.repo,
            encoded.join("/")
        )
    }

    fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}
