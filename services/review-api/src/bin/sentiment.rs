/// sentiment Lambdaエントリポイント
///
/// レビュー本文の感情分類を行う予定のハンドラーのスタブ。
/// 現状は分類を行わず、受信したイベントを固定メッセージと共にエコーする。
///
/// 分類に必要となる言語データ（punkt, stopwords）は、ランタイムループ開始前に一度だけ取得する。
/// 取得に失敗した場合は起動エラーとして終了する。
///
/// # 環境変数
/// - CORPUS_PROVISIONING: 起動時にコーパスを取得するか（デフォルト: true）
/// - CORPUS_DIR: コーパス保存先（デフォルト: /tmp/nltk_data）
/// - CORPUS_BASE_URL: コーパス配布元ベースURL
/// - AWS_LAMBDA_FUNCTION_NAME: 未設定の場合はローカルで1回だけ実行する
use clap::Parser;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use review_api::application::{setup_corpora, EchoHandler};
use review_api::domain::{Corpus, HandlerResponse};
use review_api::infrastructure::{
    init_logging, is_lambda_environment, CorpusConfig, HttpCorpusProvisioner, LocalInvokeArgs,
};
use serde_json::Value;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!("sentiment Lambda関数を初期化");

    // 言語データの取得（リクエスト処理とは独立した起動時処理）
    let corpus_config = CorpusConfig::from_env()?;
    if corpus_config.enabled() {
        let provisioner = HttpCorpusProvisioner::new(corpus_config.clone())?;
        setup_corpora(&provisioner, &corpus_config, &Corpus::sentiment_defaults()).await?;
    } else {
        info!("コーパス取得は無効化されています");
    }

    let echo_handler = EchoHandler::sentiment();

    if is_lambda_environment() {
        let echo_handler = &echo_handler;
        lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
            handler(echo_handler, event).await
        }))
        .await
    } else {
        info!("ローカルで1回実行");
        let args = LocalInvokeArgs::parse();
        let response = echo_handler.handle(args.event()?)?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }
}

/// Lambda関数のメインハンドラー
///
/// イベントの内容によって分岐しない。
async fn handler(
    echo_handler: &EchoHandler,
    event: LambdaEvent<Value>,
) -> Result<HandlerResponse, Error> {
    let (payload, context) = event.into_parts();

    info!(request_id = %context.request_id, "sentimentリクエスト受信");

    Ok(echo_handler.handle(payload)?)
}
