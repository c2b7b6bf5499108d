//! Export of external pull requests to a delimited file
//!
//! The column set is fixed, so an empty result still yields a well-formed
//! header-only file.

use crate::config::{OutputConfig, QueryConfig};
use crate::error::{ExportError, Result};
use crate::filter::filter_external;
use crate::github::GitHubClient;
use crate::member_fetcher::MemberFetcher;
use crate::pull_request_fetcher::{PullRequest, PullRequestFetcher};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Column names, in output order
pub const HEADER: [&str; 3] = ["login", "loginUrl", "pullRequestUrl"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRecord {
    pub login: String,
    pub login_url: String,
    pub pull_request_url: String,
}

impl From<PullRequest> for ContributionRecord {
    fn from(pr: PullRequest) -> Self {
        Self {
            login: pr.author_login,
            login_url: pr.author_profile_url,
            pull_request_url: pr.pull_request_url,
        }
    }
}

/// Everything gathered from GitHub for one run
#[derive(Debug, Clone)]
pub struct Collection {
    pub member_count: usize,
    pub pull_request_count: usize,
    pub records: Vec<ContributionRecord>,
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub members: usize,
    pub pull_requests: usize,
    pub external: usize,
    pub output_path: PathBuf,
}

pub struct Exporter {
    client: GitHubClient,
    query: QueryConfig,
    output: OutputConfig,
    delimiter: u8,
}

impl Exporter {
    pub fn new(client: GitHubClient, query: QueryConfig, output: OutputConfig) -> Result<Self> {
        let delimiter = output
            .delimiter_byte()
            .map_err(|e| ExportError::Config {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            query,
            output,
            delimiter,
        })
    }

    /// Authenticate, fetch members and pull requests, and keep the external ones.
    ///
    /// Fails with [`ExportError::EmptyResult`] when nothing survives and the
    /// output is configured to reject empty exports.
    pub async fn collect(&self) -> Result<Collection> {
        let login = self.client.verify_credentials().await?;
        info!("Authenticated to GitHub as {}", login);

        let member_fetcher = MemberFetcher::new(&self.client, self.query.organization.as_str());
        let pr_fetcher = PullRequestFetcher::new(&self.client, &self.query)?;

        let (members, pull_requests) =
            futures::try_join!(member_fetcher.fetch(), pr_fetcher.fetch())?;

        let member_count = members.len();
        let pull_request_count = pull_requests.len();
        let records: Vec<ContributionRecord> = filter_external(pull_requests, &members)
            .into_iter()
            .map(ContributionRecord::from)
            .collect();

        info!(
            "{} of {} pull requests are from outside {}",
            records.len(),
            pull_request_count,
            self.query.organization
        );

        if records.is_empty() {
            if self.output.fail_on_empty {
                return Err(ExportError::EmptyResult);
            }
            warn!("No external pull requests found, export is header only");
        }

        Ok(Collection {
            member_count,
            pull_request_count,
            records,
        })
    }

    /// Serialize collected records with the configured delimiter
    pub fn render(&self, records: &[ContributionRecord]) -> Result<Vec<u8>> {
        render(records, self.delimiter)
    }

    /// Run the whole export and write the output file
    pub async fn generate(&self) -> Result<ExportSummary> {
        let collection = self.collect().await?;

        let bytes = self.render(&collection.records)?;
        write_output(&self.output.path, &bytes)?;

        info!(
            "Wrote {} records to {}",
            collection.records.len(),
            self.output.path.display()
        );

        Ok(ExportSummary {
            members: collection.member_count,
            pull_requests: collection.pull_request_count,
            external: collection.records.len(),
            output_path: self.output.path.clone(),
        })
    }
}

/// Serialize records as delimited text: header row, then one row per record
pub fn render(records: &[ContributionRecord], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Serialize(csv::Error::from(e.into_error())))
}

/// Replace `path` with `contents`.
///
/// Writes a temp file in the target directory and renames it over the
/// target, so a failed run never leaves a truncated export behind. The temp
/// file is removed on every error path.
pub fn write_output(path: &Path, contents: &[u8]) -> Result<()> {
    let write_err = |source: std::io::Error| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}
