pub mod config;
pub mod error;
pub mod exporter;
pub mod filter;
pub mod github;
pub mod member_fetcher;
pub mod paginator;
pub mod pull_request_fetcher;

pub use config::Config;
pub use error::ExportError;
pub use exporter::{ContributionRecord, ExportSummary, Exporter};
pub use filter::filter_external;
pub use github::GitHubClient;
pub use member_fetcher::{MemberFetcher, OrganizationMember};
pub use pull_request_fetcher::{PullRequest, PullRequestFetcher};
