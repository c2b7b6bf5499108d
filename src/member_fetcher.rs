use crate::error::Result;
use crate::github::GitHubClient;
use crate::paginator::paginate;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationMember {
    pub login: String,
    pub html_url: String,
}

pub struct MemberFetcher<'a> {
    client: &'a GitHubClient,
    organization: String,
}

impl<'a> MemberFetcher<'a> {
    pub fn new(client: &'a GitHubClient, organization: impl Into<String>) -> Self {
        Self {
            client,
            organization: organization.into(),
        }
    }

    /// All members of the organization, in the order GitHub lists them
    pub async fn fetch(&self) -> Result<Vec<OrganizationMember>> {
        let client = self.client;
        let org = self.organization.as_str();
        let users = paginate("members", move |page| client.list_org_members_page(org, page)).await?;

        let members: Vec<OrganizationMember> = users
            .into_iter()
            .map(|user| OrganizationMember {
                login: user.login,
                html_url: user.html_url.to_string(),
            })
            .collect();

        info!(
            "Fetched {} members of {}",
            members.len(),
            self.organization
        );

        Ok(members)
    }
}
