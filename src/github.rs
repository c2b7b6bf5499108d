use crate::config::GitHubConfig;
use crate::error::{ExportError, Result};
use crate::paginator::{Page, PageRequest};
use anyhow::Context;
use octocrab::Octocrab;
use octocrab::models::Author;
use octocrab::models::issues::Issue;
use std::time::Duration;
use tracing::{debug, warn};

/// Search parameters passed through to `GET /search/issues`
#[derive(Debug, Clone)]
pub struct IssueSearch {
    pub q: String,
    pub sort: String,
    pub order: String,
}

/// GitHub client bound to one access token.
///
/// The token is fixed at construction; there is no way to re-authenticate an
/// existing client.
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig, token: &str) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(config.api_url.as_str())
            .with_context(|| format!("Invalid GitHub API url {}", config.api_url))?
            .set_connect_timeout(Some(timeout))
            .set_read_timeout(Some(timeout))
            .build()
            .context("Failed to build GitHub client")?;

        Ok(Self { client })
    }

    /// Check the token against `GET /user` and return the authenticated login
    pub async fn verify_credentials(&self) -> Result<String> {
        let user = self.client.current().user().await.map_err(|e| match e {
            octocrab::Error::GitHub { source, .. }
                if matches!(source.status_code.as_u16(), 401 | 403) =>
            {
                ExportError::Authentication {
                    status: source.status_code.as_u16(),
                }
            }
            other => upstream_error("credential check", other),
        })?;

        debug!("Authenticated as {}", user.login);
        Ok(user.login)
    }

    /// One page of `GET /orgs/{org}/members`
    pub async fn list_org_members_page(
        &self,
        org: &str,
        page: PageRequest,
    ) -> Result<Page<Author>> {
        let result = self
            .client
            .orgs(org)
            .list_members()
            .per_page(page.per_page)
            .page(page.page)
            .send()
            .await
            .map_err(|e| upstream_error(&format!("members of {} (page {})", org, page.page), e))?;

        Ok(Page {
            has_next: result.next.is_some(),
            total_count: result.total_count,
            items: result.items,
        })
    }

    /// One page of `GET /search/issues`
    pub async fn search_issues_page(
        &self,
        search: &IssueSearch,
        page: PageRequest,
    ) -> Result<Page<Issue>> {
        let result = self
            .client
            .search()
            .issues_and_pull_requests(search.q.as_str())
            .sort(search.sort.as_str())
            .order(search.order.as_str())
            .per_page(page.per_page)
            .page(page.page)
            .send()
            .await
            .map_err(|e| upstream_error(&format!("issue search (page {})", page.page), e))?;

        if result.incomplete_results == Some(true) {
            warn!(
                "GitHub reported incomplete search results ({:?} total matches)",
                result.total_count
            );
        }

        Ok(Page {
            has_next: result.next.is_some(),
            total_count: result.total_count,
            items: result.items,
        })
    }
}

/// Classify a failed request; a 401 on any endpoint means the token went bad
fn upstream_error(context: &str, error: octocrab::Error) -> ExportError {
    match error {
        octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 401 => {
            ExportError::Authentication {
                status: source.status_code.as_u16(),
            }
        }
        octocrab::Error::GitHub { source, .. } => ExportError::UpstreamStatus {
            context: context.to_string(),
            status: source.status_code.as_u16(),
        },
        other => ExportError::upstream(context, other),
    }
}
