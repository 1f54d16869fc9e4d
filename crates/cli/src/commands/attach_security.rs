//! `attach-security-config`: attach one code security configuration to many
//! repositories, one API call per batch.

use tracing::{info, info_span, Instrument};

use domain::{BatchPartitioner, ConfigurationName, OwnerName, RepositoryName, RepositoryRef};
use github::GitHubClient;

use super::{ErrorPolicy, Failures};
use crate::settings::Settings;

/// Resolves the configuration by name, then attaches it batch by batch.
///
/// An unknown configuration name fails the run before anything is attached.
/// Repositories whose id cannot be resolved are left out of their batch. Each
/// repository counts once towards the failure summary, whether its lookup or
/// its batch failed.
pub async fn run(
    github: &GitHubClient,
    owner: &OwnerName,
    config_name: &ConfigurationName,
    repositories: &[RepositoryName],
    settings: &Settings,
    policy: ErrorPolicy,
) -> anyhow::Result<()> {
    let configuration = github.code_security_configuration_id(owner, config_name).await?;
    info!(%owner, %config_name, %configuration, repositories = repositories.len(), "Attaching code security configuration");

    let partitioner = BatchPartitioner::new(settings.batch_size);
    let batch_count = partitioner.batch_count(repositories.len());
    let mut failures = Failures::new(policy);

    for (number, batch) in partitioner.partition(repositories).enumerate() {
        let span = info_span!("batch", number = number + 1, of = batch_count, size = batch.len());
        async {
            let mut ids = Vec::with_capacity(batch.len());
            let mut resolved = Vec::with_capacity(batch.len());
            for name in batch.items() {
                let repo = RepositoryRef::new(owner.clone(), name.clone());
                match github.repository_id(&repo).await {
                    Ok(id) => {
                        ids.push(id);
                        resolved.push(repo);
                    }
                    Err(e) => failures.record(&repo, Err(e))?,
                }
            }
            if ids.is_empty() {
                return anyhow::Ok(());
            }

            let result = github.attach_code_security_configuration(owner, configuration, &ids).await;
            if result.is_ok() {
                info!(attached = ids.len(), "Batch attached");
            }
            let label = format!(
                "batch {} (rows {}-{})",
                number + 1,
                batch.start_index() + 1,
                batch.start_index() + batch.len()
            );
            failures.record_batch(label, &resolved, result)
        }
        .instrument(span)
        .await?;
    }

    failures.finish()
}
