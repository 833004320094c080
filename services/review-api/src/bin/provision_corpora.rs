/// コーパス取得CLI
///
/// sentimentハンドラーが必要とする言語データをデプロイ前に取得する。
/// 事前に取得しておけば、sentiment Lambdaの起動時取得はネットワークアクセスなしで完了する。
///
/// # 環境変数
/// - CORPUS_DIR: コーパス保存先（コマンドライン引数で上書き可能）
/// - CORPUS_BASE_URL: コーパス配布元ベースURL（コマンドライン引数で上書き可能）
///
/// # 実行例
/// ```bash
/// # sentiment用のコーパスを取得
/// cargo run --bin provision_corpora -- --dir ./layer/nltk_data
///
/// # 取得するコーパスを指定
/// cargo run --bin provision_corpora -- --corpus tokenizers/punkt --corpus corpora/wordnet
/// ```
use std::path::PathBuf;

use clap::Parser;
use lambda_runtime::Error;
use review_api::application::setup_corpora;
use review_api::domain::Corpus;
use review_api::infrastructure::{
    init_logging, CorpusConfig, HttpCorpusProvisioner, ProvisionOutcome,
};
use tracing::info;

/// コマンドライン引数
#[derive(Parser, Debug)]
#[command(name = "provision_corpora")]
#[command(about = "sentimentハンドラー用の言語データを取得")]
struct CliArgs {
    /// 保存先ディレクトリ（環境変数CORPUS_DIRより優先される）
    #[arg(long, short = 'd')]
    dir: Option<PathBuf>,

    /// 配布元ベースURL（環境変数CORPUS_BASE_URLより優先される）
    #[arg(long, short = 'u')]
    base_url: Option<String>,

    /// 取得するコーパス（<category>/<id>、複数指定可）
    /// 省略時はtokenizers/punktとcorpora/stopwords
    #[arg(long = "corpus", short = 'c')]
    corpora: Vec<Corpus>,
}

impl CliArgs {
    /// 環境変数の設定に引数の上書きを適用
    fn apply_to(&self, mut config: CorpusConfig) -> Result<CorpusConfig, Error> {
        if let Some(dir) = &self.dir {
            config = config.with_corpus_dir(dir);
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url)?;
        }
        Ok(config)
    }

    /// 取得対象のコーパス
    fn corpora(&self) -> Vec<Corpus> {
        if self.corpora.is_empty() {
            Corpus::sentiment_defaults()
        } else {
            self.corpora.clone()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    let args = CliArgs::parse();
    let config = args.apply_to(CorpusConfig::from_env()?)?;
    let corpora = args.corpora();

    let provisioner = HttpCorpusProvisioner::new(config.clone())?;
    let provisioned = setup_corpora(&provisioner, &config, &corpora).await?;

    for p in &provisioned {
        match p.outcome {
            ProvisionOutcome::Downloaded { bytes } => {
                info!(corpus = %p.corpus, bytes, "ダウンロード済み");
            }
            ProvisionOutcome::AlreadyPresent => {
                info!(corpus = %p.corpus, "取得済みのためスキップ");
            }
        }
    }

    Ok(())
}
