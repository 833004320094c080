// コーパス取得マニフェスト
//
// 取得したコーパスの一覧を保存先ディレクトリに`manifest.json`として書き出す。
// デプロイ時に取得したものと実行時に取得したものを区別するための記録。

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::corpus_config::CorpusConfig;
use super::corpus_provisioner::{CorpusProvisionError, ProvisionOutcome, ProvisionedCorpus};

/// マニフェストのファイル名
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// マニフェストの1エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// コーパス名（`<category>/<id>`）
    pub corpus: String,
    /// 取得元URL
    pub url: String,
    /// 取得結果（`downloaded` / `already_present`）
    pub outcome: String,
    /// ダウンロードしたバイト数（取得済みだった場合は省略）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
}

/// コーパス取得マニフェスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionManifest {
    /// 取得完了時刻（RFC 3339）
    pub provisioned_at: String,
    /// 取得したコーパス
    pub corpora: Vec<ManifestEntry>,
}

impl ProvisionManifest {
    /// 取得結果からマニフェストを作成
    pub fn new(
        config: &CorpusConfig,
        provisioned: &[ProvisionedCorpus],
        provisioned_at: DateTime<Utc>,
    ) -> Self {
        let corpora = provisioned
            .iter()
            .map(|p| {
                let (outcome, bytes) = match p.outcome {
                    ProvisionOutcome::Downloaded { bytes } => ("downloaded", Some(bytes)),
                    ProvisionOutcome::AlreadyPresent => ("already_present", None),
                };

                ManifestEntry {
                    corpus: p.corpus.to_string(),
                    url: config
                        .archive_url(&p.corpus)
                        .map(|u| u.to_string())
                        .unwrap_or_default(),
                    outcome: outcome.to_string(),
                    bytes,
                }
            })
            .collect();

        Self {
            provisioned_at: provisioned_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            corpora,
        }
    }

    /// 現在時刻でマニフェストを作成
    pub fn now(config: &CorpusConfig, provisioned: &[ProvisionedCorpus]) -> Self {
        Self::new(config, provisioned, Utc::now())
    }

    /// マニフェストファイルのパス
    pub fn path_in(corpus_dir: &Path) -> PathBuf {
        corpus_dir.join(MANIFEST_FILE_NAME)
    }

    /// 保存先ディレクトリにマニフェストを書き出す
    pub async fn write_to(&self, corpus_dir: &Path) -> Result<PathBuf, CorpusProvisionError> {
        let path = Self::path_in(corpus_dir);

        let json = serde_json::to_vec_pretty(self).map_err(|e| CorpusProvisionError::Io {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        tokio::fs::create_dir_all(corpus_dir)
            .await
            .map_err(|source| CorpusProvisionError::Io {
                path: corpus_dir.to_path_buf(),
                source,
            })?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|source| CorpusProvisionError::Io {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), entries = self.corpora.len(), "マニフェストを書き出し");
        Ok(path)
    }
}
