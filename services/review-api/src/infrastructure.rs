// Infrastructure layer modules
pub mod corpus_config;
pub mod corpus_provisioner;
pub mod lambda_env;
pub mod local_invoke;
pub mod logging;
pub mod provision_manifest;
pub mod status_config;

// Re-exports
pub use corpus_config::{CorpusConfig, CorpusConfigError};
pub use corpus_provisioner::{
    provision_corpora, CorpusProvisionError, CorpusProvisioner, HttpCorpusProvisioner,
    ProvisionOutcome, ProvisionedCorpus,
};
pub use lambda_env::is_lambda_environment;
pub use local_invoke::LocalInvokeArgs;
pub use logging::{init_logging, init_logging_with, LogFormat};
#[cfg(test)]
pub use logging::init_test_logging;
pub use provision_manifest::{ManifestEntry, ProvisionManifest, MANIFEST_FILE_NAME};
pub use status_config::StatusConfig;
