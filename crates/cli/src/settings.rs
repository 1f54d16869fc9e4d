//! Typed settings resolved once at start-up and passed to each command.

use domain::{ApiTimeout, BatchSize, ConfigError, ConfigResolver, Credential, OrganizationName, OwnerName};

pub const GITHUB_PAT_VAR: &str = "GITHUB_PAT";
pub const GITHUB_ORG_VAR: &str = "GITHUB_ORG";
pub const AZURE_DEVOPS_PAT_VAR: &str = "AZURE_DEVOPS_PAT";
pub const AZURE_DEVOPS_ORG_VAR: &str = "AZURE_DEVOPS_ORG";
pub const CATEGORY_LABEL_LANGUAGE_VAR: &str = "CATEGORY_LABEL_LANGUAGE";
pub const CATEGORY_LABEL_TEAM_VAR: &str = "CATEGORY_LABEL_TEAM";

/// Settings shared by every command. Resolving them never fails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub batch_size: BatchSize,
    pub api_timeout: ApiTimeout,
    /// Add a `Languages` column to inventory reports.
    pub label_languages: bool,
    /// Add `Team Name` and `Owner` columns to inventory reports.
    pub label_teams: bool,
}

impl Settings {
    pub fn resolve(resolver: &ConfigResolver) -> Self {
        Self {
            batch_size: resolver.batch_size(),
            api_timeout: resolver.api_timeout(),
            label_languages: resolver.flag(CATEGORY_LABEL_LANGUAGE_VAR),
            label_teams: resolver.flag(CATEGORY_LABEL_TEAM_VAR),
        }
    }
}

/// GitHub token from `GITHUB_PAT`.
pub fn github_token(resolver: &ConfigResolver) -> Result<Credential, ConfigError> {
    resolver.credential(GITHUB_PAT_VAR)
}

/// GitHub organisation from `GITHUB_ORG`.
pub fn github_organization(resolver: &ConfigResolver) -> Result<OwnerName, ConfigError> {
    OwnerName::new(resolver.require(GITHUB_ORG_VAR)?).ok_or_else(|| ConfigError::MissingConfiguration {
        name: GITHUB_ORG_VAR.to_string(),
    })
}

/// Credentials and organisation for Azure DevOps.
#[derive(Debug, Clone)]
pub struct AzureDevOpsAccess {
    pub organization: OrganizationName,
    pub token: Credential,
}

impl AzureDevOpsAccess {
    /// Reads `AZURE_DEVOPS_PAT` and `AZURE_DEVOPS_ORG`; both are required.
    pub fn resolve(resolver: &ConfigResolver) -> Result<Self, ConfigError> {
        let token = resolver.credential(AZURE_DEVOPS_PAT_VAR)?;
        let organization = OrganizationName::new(resolver.require(AZURE_DEVOPS_ORG_VAR)?).ok_or_else(|| {
            ConfigError::MissingConfiguration {
                name: AZURE_DEVOPS_ORG_VAR.to_string(),
            }
        })?;
        Ok(Self { organization, token })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = Settings::resolve(&ConfigResolver::from_pairs(Vec::<(String, String)>::new()));
        assert_eq!(settings.batch_size.get(), 1);
        assert_eq!(settings.api_timeout.as_duration(), Duration::from_secs(60));
        assert!(!settings.label_languages);
        assert!(!settings.label_teams);
    }

    #[test]
    fn category_flags_are_read() {
        let resolver = ConfigResolver::from_pairs([
            (CATEGORY_LABEL_LANGUAGE_VAR, "True"),
            (CATEGORY_LABEL_TEAM_VAR, "1"),
            ("BATCH_SIZE", "25"),
        ]);
        let settings = Settings::resolve(&resolver);
        assert!(settings.label_languages);
        assert!(!settings.label_teams);
        assert_eq!(settings.batch_size.get(), 25);
    }

    #[test]
    fn github_organization_is_required() {
        let err = github_organization(&ConfigResolver::from_pairs([(GITHUB_ORG_VAR, "  ")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingConfiguration {
                name: GITHUB_ORG_VAR.into()
            }
        );
    }

    #[test]
    fn azure_devops_access_needs_both_values() {
        let missing_org = ConfigResolver::from_pairs([(AZURE_DEVOPS_PAT_VAR, "pat")]);
        let err = AzureDevOpsAccess::resolve(&missing_org).unwrap_err();
        assert!(err.to_string().contains(AZURE_DEVOPS_ORG_VAR));

        let complete = ConfigResolver::from_pairs([(AZURE_DEVOPS_PAT_VAR, "pat"), (AZURE_DEVOPS_ORG_VAR, "contoso")]);
        let access = AzureDevOpsAccess::resolve(&complete).unwrap();
        assert_eq!(access.organization.as_str(), "contoso");
        assert_eq!(access.token.expose(), "pat");
    }
}
