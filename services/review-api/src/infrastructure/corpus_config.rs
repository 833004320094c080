// コーパス取得設定
//
// 言語データパッケージの配布元URLと保存先ディレクトリを
// 環境変数から読み込むインフラストラクチャ層コンポーネント。

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;
use url::Url;

use super::lambda_env::parse_bool;
use crate::domain::Corpus;

/// 環境変数名: 起動時のコーパス取得を行うか
pub const ENV_CORPUS_PROVISIONING: &str = "CORPUS_PROVISIONING";

/// 環境変数名: コーパス保存先ディレクトリ
pub const ENV_CORPUS_DIR: &str = "CORPUS_DIR";

/// 環境変数名: パッケージ配布元のベースURL
pub const ENV_CORPUS_BASE_URL: &str = "CORPUS_BASE_URL";

/// コーパス保存先のデフォルト（Lambdaで書き込み可能なのは/tmp配下のみ）
pub const DEFAULT_CORPUS_DIR: &str = "/tmp/nltk_data";

/// パッケージ配布元のデフォルト
pub const DEFAULT_CORPUS_BASE_URL: &str =
    "https://raw.githubusercontent.com/nltk/nltk_data/gh-pages/packages";

/// コーパス設定のエラー型
#[derive(Debug, Error)]
pub enum CorpusConfigError {
    /// URLとしてパースできない
    #[error("無効なベースURL: {url} ({source})")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// http/https以外のスキーム
    #[error("サポートされていないURLスキーム: {0}")]
    UnsupportedScheme(String),
}

/// コーパス取得設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusConfig {
    /// 起動時にコーパスを取得するか
    enabled: bool,
    /// 保存先ディレクトリ
    corpus_dir: PathBuf,
    /// 配布元ベースURL（末尾は必ず`/`）
    base_url: Url,
}

impl CorpusConfig {
    /// 環境変数から設定を読み込み
    ///
    /// - CORPUS_PROVISIONING: 起動時に取得するか（デフォルト: true）
    /// - CORPUS_DIR: 保存先ディレクトリ（デフォルト: /tmp/nltk_data）
    /// - CORPUS_BASE_URL: 配布元ベースURL（デフォルト: NLTKデータのGitHub Pages）
    pub fn from_env() -> Result<Self, CorpusConfigError> {
        let get_optional_string = |key: &str| -> Option<String> {
            std::env::var(key).ok().filter(|s| !s.trim().is_empty())
        };

        let enabled = match get_optional_string(ENV_CORPUS_PROVISIONING) {
            Some(value) => parse_bool(&value).unwrap_or_else(|| {
                warn!(
                    env = ENV_CORPUS_PROVISIONING,
                    value = %value,
                    "真偽値として解釈できないためコーパス取得を有効として扱う"
                );
                true
            }),
            None => true,
        };

        let corpus_dir = get_optional_string(ENV_CORPUS_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CORPUS_DIR));

        let base_url = get_optional_string(ENV_CORPUS_BASE_URL)
            .unwrap_or_else(|| DEFAULT_CORPUS_BASE_URL.to_string());

        match Self::new(enabled, corpus_dir.clone(), &base_url) {
            // 取得しない場合はベースURLを使わないため、不正な値でも起動を止めない
            Err(e) if !enabled => {
                warn!(
                    env = ENV_CORPUS_BASE_URL,
                    error = %e,
                    "コーパス取得が無効のためベースURLの不正を無視"
                );
                Self::new(enabled, corpus_dir, DEFAULT_CORPUS_BASE_URL)
            }
            result => result,
        }
    }

    /// 明示的な値で作成
    ///
    /// ベースURLはhttp/httpsの絶対URLである必要がある。
    pub fn new(
        enabled: bool,
        corpus_dir: impl Into<PathBuf>,
        base_url: &str,
    ) -> Result<Self, CorpusConfigError> {
        Ok(Self {
            enabled,
            corpus_dir: corpus_dir.into(),
            base_url: parse_base_url(base_url)?,
        })
    }

    /// 保存先ディレクトリを差し替えた設定を返す
    pub fn with_corpus_dir(mut self, corpus_dir: impl Into<PathBuf>) -> Self {
        self.corpus_dir = corpus_dir.into();
        self
    }

    /// 配布元ベースURLを差し替えた設定を返す
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, CorpusConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// 起動時にコーパスを取得するか
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// 保存先ディレクトリ
    pub fn corpus_dir(&self) -> &Path {
        &self.corpus_dir
    }

    /// 配布元ベースURL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// コーパスアーカイブのダウンロードURL
    pub fn archive_url(&self, corpus: &Corpus) -> Result<Url, url::ParseError> {
        self.base_url.join(&corpus.archive_url_path())
    }

    /// コーパスアーカイブのローカル保存先
    pub fn archive_path(&self, corpus: &Corpus) -> PathBuf {
        self.corpus_dir.join(corpus.archive_path())
    }
}

/// ベースURLをパースし、末尾を`/`に正規化する
///
/// `Url::join`は末尾が`/`でないと最後のパス要素を置き換えるため。
fn parse_base_url(value: &str) -> Result<Url, CorpusConfigError> {
    let trimmed = value.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };

    let url = Url::parse(&normalized).map_err(|source| CorpusConfigError::InvalidBaseUrl {
        url: trimmed.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CorpusConfigError::UnsupportedScheme(other.to_string())),
    }
}
