// 言語データコーパス
//
// sentimentハンドラーが起動時に必要とする言語データパッケージの識別子。
// パッケージは`<category>/<id>`で識別され、配布元とローカルの両方で
// `<category>/<id>.zip`という相対パスに配置される。

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// 文分割モデルのカテゴリ
pub const CATEGORY_TOKENIZERS: &str = "tokenizers";

/// コーパスのカテゴリ
pub const CATEGORY_CORPORA: &str = "corpora";

/// パッケージアーカイブの拡張子
const ARCHIVE_EXTENSION: &str = "zip";

/// コーパス名のパースエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorpusNameError {
    /// `<category>/<id>`形式ではない
    #[error("コーパス名は<category>/<id>形式で指定してください: {0}")]
    InvalidFormat(String),
    /// 英数字・`_`・`-`以外の文字を含む
    #[error("コーパス名に使用できない文字が含まれています: {0}")]
    InvalidCharacter(String),
}

/// 言語データパッケージ
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Corpus {
    category: String,
    id: String,
}

impl Corpus {
    /// 新しいコーパス識別子を作成
    ///
    /// カテゴリとIDはパス要素として使われるため、
    /// 英数字・`_`・`-`のみを許可する。
    pub fn new(
        category: impl Into<String>,
        id: impl Into<String>,
    ) -> Result<Self, CorpusNameError> {
        let category = category.into();
        let id = id.into();

        for part in [&category, &id] {
            if part.is_empty() {
                return Err(CorpusNameError::InvalidFormat(format!("{}/{}", category, id)));
            }
            if !part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Err(CorpusNameError::InvalidCharacter(format!("{}/{}", category, id)));
            }
        }

        Ok(Self { category, id })
    }

    /// 文分割モデル（punkt）
    pub fn punkt() -> Self {
        Self {
            category: CATEGORY_TOKENIZERS.to_string(),
            id: "punkt".to_string(),
        }
    }

    /// ストップワード一覧（stopwords）
    pub fn stopwords() -> Self {
        Self {
            category: CATEGORY_CORPORA.to_string(),
            id: "stopwords".to_string(),
        }
    }

    /// sentimentハンドラーが必要とするコーパス一覧
    pub fn sentiment_defaults() -> Vec<Self> {
        vec![Self::punkt(), Self::stopwords()]
    }

    /// カテゴリを取得
    pub fn category(&self) -> &str {
        &self.category
    }

    /// IDを取得
    pub fn id(&self) -> &str {
        &self.id
    }

    /// アーカイブの相対パス（`<category>/<id>.zip`）
    pub fn archive_path(&self) -> PathBuf {
        PathBuf::from(&self.category).join(format!("{}.{}", self.id, ARCHIVE_EXTENSION))
    }

    /// 配布元URLに連結するアーカイブの相対URLパス
    pub fn archive_url_path(&self) -> String {
        format!("{}/{}.{}", self.category, self.id, ARCHIVE_EXTENSION)
    }
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.id)
    }
}

impl FromStr for Corpus {
    type Err = CorpusNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, id) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| CorpusNameError::InvalidFormat(s.to_string()))?;
        Self::new(category, id)
    }
}
