// コーパス取得（プロビジョニング）
//
// sentimentハンドラーが必要とする言語データパッケージを配布元から取得し、
// ローカルディレクトリに保存する。取得済みのパッケージは再取得しない。
// リクエスト処理とは切り離され、プロセス起動時またはデプロイ時に一度だけ実行される。

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use super::corpus_config::CorpusConfig;
use crate::domain::Corpus;

/// 最大再試行回数
const MAX_RETRIES: u32 = 3;

/// リクエストタイムアウト（秒）
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// 接続タイムアウト（秒）
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// ダウンロード中の一時ファイルに付与する拡張子
const PARTIAL_SUFFIX: &str = "part";

/// コーパス取得のエラー型
#[derive(Debug, Error)]
pub enum CorpusProvisionError {
    /// ファイル操作エラー
    #[error("ファイル操作エラー: {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// ネットワークエラー（再試行後も失敗）
    #[error("ネットワークエラー: {0}")]
    Network(String),

    /// 配布元が成功以外のステータスを返した
    #[error("HTTPエラー: status={status}, url={url}")]
    HttpStatus { status: u16, url: String },

    /// 配布元が空のアーカイブを返した
    #[error("空のアーカイブ: {0}")]
    EmptyArchive(String),

    /// ダウンロードURLの組み立てに失敗
    #[error("URL組み立てエラー: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl CorpusProvisionError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// 1コーパスの取得結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// 配布元からダウンロードした
    Downloaded { bytes: u64 },
    /// 既にローカルに存在した（ネットワークアクセスなし）
    AlreadyPresent,
}

/// 取得済みコーパス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedCorpus {
    pub corpus: Corpus,
    pub outcome: ProvisionOutcome,
}

/// コーパス取得トレイト（テスト用の抽象化）
#[async_trait]
pub trait CorpusProvisioner: Send + Sync {
    /// コーパスがローカルに存在することを保証する
    ///
    /// 既に存在する場合は何もしない（冪等）。
    ///
    /// # 戻り値
    /// * `Ok(ProvisionOutcome)` - 取得結果
    /// * `Err(CorpusProvisionError)` - エラー
    async fn ensure(&self, corpus: &Corpus) -> Result<ProvisionOutcome, CorpusProvisionError>;
}

/// 複数のコーパスを順番に取得する
///
/// 最初に失敗したコーパスで処理を中断し、そのエラーを返す。
pub async fn provision_corpora<P>(
    provisioner: &P,
    corpora: &[Corpus],
) -> Result<Vec<ProvisionedCorpus>, CorpusProvisionError>
where
    P: CorpusProvisioner + ?Sized,
{
    let mut provisioned = Vec::with_capacity(corpora.len());

    for corpus in corpora {
        let outcome = provisioner.ensure(corpus).await.map_err(|e| {
            error!(corpus = %corpus, error = %e, "コーパスの取得に失敗");
            e
        })?;

        provisioned.push(ProvisionedCorpus {
            corpus: corpus.clone(),
            outcome,
        });
    }

    info!(count = provisioned.len(), "コーパスの取得が完了");
    Ok(provisioned)
}

/// HTTPで配布元からコーパスを取得する実装
///
/// 指数バックオフによる再試行機能を持つ。
#[derive(Clone)]
pub struct HttpCorpusProvisioner {
    /// HTTPクライアント（再試行ミドルウェア付き）
    client: ClientWithMiddleware,
    /// 取得設定
    config: CorpusConfig,
}

impl std::fmt::Debug for HttpCorpusProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCorpusProvisioner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpCorpusProvisioner {
    /// 設定からHttpCorpusProvisionerを作成
    pub fn new(config: CorpusConfig) -> Result<Self, CorpusProvisionError> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_RETRIES);
        Self::with_retry_policy(config, retry_policy)
    }

    /// 再試行ポリシーを指定して作成
    fn with_retry_policy(
        config: CorpusConfig,
        retry_policy: ExponentialBackoff,
    ) -> Result<Self, CorpusProvisionError> {
        info!(
            base_url = %config.base_url(),
            corpus_dir = %config.corpus_dir().display(),
            "HttpCorpusProvisionerを初期化"
        );

        let base_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CorpusProvisionError::Network(e.to_string()))?;

        let client = ClientBuilder::new(base_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client, config })
    }

    /// アーカイブをダウンロードしてバイト列を返す
    async fn download(&self, url: &str) -> Result<Vec<u8>, CorpusProvisionError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            error!(url = %url, error = %e, "コーパスのダウンロードリクエスト失敗");
            CorpusProvisionError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(url = %url, status = %status, "配布元がエラーを返却");
            return Err(CorpusProvisionError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CorpusProvisionError::Network(e.to_string()))?;

        if bytes.is_empty() {
            return Err(CorpusProvisionError::EmptyArchive(url.to_string()));
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl CorpusProvisioner for HttpCorpusProvisioner {
    #[instrument(skip(self, corpus), fields(corpus = %corpus))]
    async fn ensure(&self, corpus: &Corpus) -> Result<ProvisionOutcome, CorpusProvisionError> {
        let target = self.config.archive_path(corpus);

        if is_present(&target).await {
            debug!(path = %target.display(), "コーパスは取得済み");
            return Ok(ProvisionOutcome::AlreadyPresent);
        }

        let url = self.config.archive_url(corpus)?;
        info!(url = %url, "コーパスをダウンロード");

        let bytes = self.download(url.as_str()).await?;
        write_atomically(&target, &bytes).await?;

        info!(
            path = %target.display(),
            bytes = bytes.len(),
            "コーパスを保存"
        );

        Ok(ProvisionOutcome::Downloaded {
            bytes: bytes.len() as u64,
        })
    }
}

/// 空でないファイルとして存在するか
async fn is_present(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// 一時ファイルに書き込んでからリネームする
///
/// 書き込み途中で失敗しても、取得済みと判定されるファイルを残さない。
async fn write_atomically(target: &Path, bytes: &[u8]) -> Result<(), CorpusProvisionError> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CorpusProvisionError::io(parent, e))?;
    }

    let partial = partial_path(target);

    if let Err(e) = tokio::fs::write(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(CorpusProvisionError::io(&partial, e));
    }

    tokio::fs::rename(&partial, target)
        .await
        .map_err(|e| CorpusProvisionError::io(target, e))
}

/// ダウンロード中の一時ファイルパス（`<name>.zip.part`）
fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::init_test_logging;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// 固定レスポンスを返すHTTPサーバーを起動し、ベースURLとリクエスト数を返す
    async fn spawn_fixed_server(
        status_line: &'static str,
        body: &'static [u8],
    ) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                hits_clone.fetch_add(1, Ordering::SeqCst);

                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let header = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status_line,
                    body.len()
                );
                let _ = socket.write_all(header.as_bytes()).await;
                let _ = socket.write_all(body).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), hits)
    }

    fn provisioner(dir: &Path, base_url: &str) -> HttpCorpusProvisioner {
        let config = CorpusConfig::new(true, dir, base_url).unwrap();
        HttpCorpusProvisioner::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_ensure_downloads_then_reports_already_present() {
        init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let (base_url, hits) = spawn_fixed_server("200 OK", b"PK\x03\x04fake-archive").await;
        let provisioner = provisioner(dir.path(), &base_url);
        let corpus = Corpus::punkt();

        let first = provisioner.ensure(&corpus).await.unwrap();
        assert_eq!(first, ProvisionOutcome::Downloaded { bytes: 16 });

        let saved = std::fs::read(dir.path().join("tokenizers").join("punkt.zip")).unwrap();
        assert_eq!(saved, b"PK\x03\x04fake-archive");

        let second = provisioner.ensure(&corpus).await.unwrap();
        assert_eq!(second, ProvisionOutcome::AlreadyPresent);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    /// 取得済みの場合はネットワークにアクセスしない
    #[tokio::test]
    async fn test_ensure_existing_file_skips_network() {
        init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let corpus = Corpus::stopwords();
        let target = dir.path().join("corpora").join("stopwords.zip");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, b"existing").unwrap();

        // 到達不能なポートを指定しても成功する
        let provisioner = provisioner(dir.path(), "http://127.0.0.1:9");

        let outcome = provisioner.ensure(&corpus).await.unwrap();
        assert_eq!(outcome, ProvisionOutcome::AlreadyPresent);
        assert_eq!(std::fs::read(&target).unwrap(), b"existing");
    }

    #[tokio::test]
    async fn test_ensure_not_found_leaves_no_file() {
        init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let (base_url, hits) = spawn_fixed_server("404 Not Found", b"missing").await;
        let provisioner = provisioner(dir.path(), &base_url);

        let err = provisioner.ensure(&Corpus::punkt()).await.unwrap_err();

        match err {
            CorpusProvisionError::HttpStatus { status, url } => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/tokenizers/punkt.zip"));
            }
            other => panic!("予期しないエラー: {other:?}"),
        }

        let target = dir.path().join("tokenizers").join("punkt.zip");
        assert!(!target.exists());
        assert!(!partial_path(&target).exists());
        // 404は再試行対象外
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    /// 5xxは指数バックオフで最大3回再試行され、合計4回リクエストされる
    #[tokio::test]
    async fn test_ensure_retries_transient_errors() {
        init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let (base_url, hits) = spawn_fixed_server("503 Service Unavailable", b"busy").await;
        let config = CorpusConfig::new(true, dir.path(), &base_url).unwrap();
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(1), Duration::from_millis(10))
            .build_with_max_retries(MAX_RETRIES);
        let provisioner = HttpCorpusProvisioner::with_retry_policy(config, retry_policy).unwrap();

        let err = provisioner.ensure(&Corpus::punkt()).await.unwrap_err();

        assert!(matches!(err, CorpusProvisionError::HttpStatus { status: 503, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), MAX_RETRIES as usize + 1);
        assert!(!dir.path().join("tokenizers").join("punkt.zip").exists());
    }

    #[tokio::test]
    async fn test_ensure_empty_body_is_error() {
        init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let (base_url, _hits) = spawn_fixed_server("200 OK", b"").await;
        let provisioner = provisioner(dir.path(), &base_url);

        let err = provisioner.ensure(&Corpus::punkt()).await.unwrap_err();
        assert!(matches!(err, CorpusProvisionError::EmptyArchive(_)));
        assert!(!dir.path().join("tokenizers").join("punkt.zip").exists());
    }

    #[test]
    fn test_partial_path() {
        let target = Path::new("/tmp/nltk/corpora/stopwords.zip");
        assert_eq!(
            partial_path(target),
            PathBuf::from("/tmp/nltk/corpora/stopwords.zip.part")
        );
    }

    /// テスト用のモック実装
    struct MockProvisioner {
        present: Mutex<Vec<Corpus>>,
        fail_on: Option<Corpus>,
        calls: AtomicUsize,
    }

    impl MockProvisioner {
        fn new(fail_on: Option<Corpus>) -> Self {
            Self {
                present: Mutex::new(Vec::new()),
                fail_on,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CorpusProvisioner for MockProvisioner {
        async fn ensure(&self, corpus: &Corpus) -> Result<ProvisionOutcome, CorpusProvisionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.fail_on.as_ref() == Some(corpus) {
                return Err(CorpusProvisionError::HttpStatus {
                    status: 503,
                    url: corpus.archive_url_path(),
                });
            }

            let mut present = self.present.lock().unwrap();
            if present.contains(corpus) {
                return Ok(ProvisionOutcome::AlreadyPresent);
            }
            present.push(corpus.clone());
            Ok(ProvisionOutcome::Downloaded { bytes: 1 })
        }
    }

    #[tokio::test]
    async fn test_provision_corpora_is_idempotent() {
        init_test_logging();
        let provisioner = MockProvisioner::new(None);
        let corpora = Corpus::sentiment_defaults();

        let first = provision_corpora(&provisioner, &corpora).await.unwrap();
        assert!(first
            .iter()
            .all(|p| p.outcome == ProvisionOutcome::Downloaded { bytes: 1 }));

        let second = provision_corpora(&provisioner, &corpora).await.unwrap();
        assert!(second
            .iter()
            .all(|p| p.outcome == ProvisionOutcome::AlreadyPresent));
        assert_eq!(second[0].corpus, Corpus::punkt());
        assert_eq!(second[1].corpus, Corpus::stopwords());
    }

    /// 最初の失敗で中断し、以降のコーパスは取得しない
    #[tokio::test]
    async fn test_provision_corpora_stops_at_first_failure() {
        init_test_logging();
        let provisioner = MockProvisioner::new(Some(Corpus::punkt()));

        let err = provision_corpora(&provisioner, &Corpus::sentiment_defaults())
            .await
            .unwrap_err();

        assert!(matches!(err, CorpusProvisionError::HttpStatus { status: 503, .. }));
        assert_eq!(provisioner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provision_corpora_accepts_trait_object() {
        let provisioner: Box<dyn CorpusProvisioner> = Box::new(MockProvisioner::new(None));
        let result = provision_corpora(provisioner.as_ref(), &[Corpus::stopwords()])
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
    }
}
