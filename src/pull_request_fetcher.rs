use crate::config::QueryConfig;
use crate::error::{ExportError, Result};
use crate::github::{GitHubClient, IssueSearch};
use crate::paginator::paginate;
use chrono::{DateTime, Utc};
use octocrab::models::issues::Issue;
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub author_login: String,
    pub author_profile_url: String,
    pub pull_request_url: String,
    pub created_at: DateTime<Utc>,
    pub labels: BTreeSet<String>,
}

impl From<Issue> for PullRequest {
    fn from(issue: Issue) -> Self {
        Self {
            author_login: issue.user.login,
            author_profile_url: issue.user.html_url.to_string(),
            pull_request_url: issue.html_url.to_string(),
            created_at: issue.created_at,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}

/// Build the GitHub search expression for the configured window.
///
/// Produces e.g. `is:pr org:Kentico created:2018-10-01..2018-10-31 -label:invalid is:public`.
pub fn build_search(query: &QueryConfig) -> Result<IssueSearch> {
    if query.organization.trim().is_empty() {
        return Err(ExportError::Config {
            message: "organization must not be empty".to_string(),
        });
    }
    if query.created_from > query.created_to {
        return Err(ExportError::Config {
            message: format!(
                "date window {}..{} ends before it starts",
                query.created_from, query.created_to
            ),
        });
    }

    let mut terms = vec![
        "is:pr".to_string(),
        format!("org:{}", query.organization),
        format!(
            "created:{}..{}",
            query.created_from.format("%Y-%m-%d"),
            query.created_to.format("%Y-%m-%d")
        ),
    ];
    for label in &query.excluded_labels {
        // Quote labels containing spaces so the search treats them as one term
        if label.contains(' ') {
            terms.push(format!("-label:\"{}\"", label));
        } else {
            terms.push(format!("-label:{}", label));
        }
    }
    if !query.visibility.is_empty() {
        terms.push(format!("is:{}", query.visibility));
    }

    Ok(IssueSearch {
        q: terms.join(" "),
        sort: query.sort.clone(),
        order: query.order.clone(),
    })
}

pub struct PullRequestFetcher<'a> {
    client: &'a GitHubClient,
    search: IssueSearch,
}

impl<'a> PullRequestFetcher<'a> {
    pub fn new(client: &'a GitHubClient, query: &QueryConfig) -> Result<Self> {
        Ok(Self {
            client,
            search: build_search(query)?,
        })
    }

    pub fn search(&self) -> &IssueSearch {
        &self.search
    }

    /// All pull requests matching the search, newest first as GitHub sorts them.
    ///
    /// Fails rather than returning a truncated list when the search matches
    /// more pull requests than GitHub will page through.
    pub async fn fetch(&self) -> Result<Vec<PullRequest>> {
        debug!("Searching pull requests: {}", self.search.q);

        let client = self.client;
        let search = &self.search;
        let issues = paginate("pull requests", move |page| {
            client.search_issues_page(search, page)
        })
        .await?;

        let pull_requests: Vec<PullRequest> = issues.into_iter().map(PullRequest::from).collect();
        info!("Fetched {} pull requests", pull_requests.len());

        Ok(pull_requests)
    }
}
