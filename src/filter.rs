use crate::member_fetcher::OrganizationMember;
use crate::pull_request_fetcher::PullRequest;
use std::collections::HashSet;
use tracing::debug;

/// Keep pull requests whose author is not an organization member.
///
/// Logins are compared exactly (GitHub returns the canonical casing on both
/// endpoints). Input order is preserved and an author with several pull
/// requests keeps one entry per pull request.
pub fn filter_external(
    pull_requests: Vec<PullRequest>,
    members: &[OrganizationMember],
) -> Vec<PullRequest> {
    let member_logins: HashSet<&str> = members.iter().map(|m| m.login.as_str()).collect();

    pull_requests
        .into_iter()
        .filter(|pr| {
            let internal = member_logins.contains(pr.author_login.as_str());
            if internal {
                debug!("Skipping {} by member {}", pr.pull_request_url, pr.author_login);
            }
            !internal
        })
        .collect()
}
