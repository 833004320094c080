/// status Lambdaエントリポイント
///
/// 死活監視用のハンドラー。受信したイベントを固定メッセージと共にエコーし、
/// 常にstatusCode 200を返す。
///
/// # 環境変数
/// - STATUS_INCLUDE_HEADERS: Content-Typeヘッダーを付与するか（デフォルト: true）
/// - AWS_LAMBDA_FUNCTION_NAME: 未設定の場合はローカルで1回だけ実行する
///
/// # ローカル実行
/// ```bash
/// cargo run --bin status -- --event '{"foo": "bar"}'
/// ```
use clap::Parser;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use review_api::application::EchoHandler;
use review_api::domain::HandlerResponse;
use review_api::infrastructure::{
    init_logging, is_lambda_environment, LocalInvokeArgs, StatusConfig,
};
use serde_json::Value;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    let config = StatusConfig::from_env();
    let echo_handler = EchoHandler::status(config.include_headers);

    info!(
        include_headers = config.include_headers,
        "status Lambda関数を初期化"
    );

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
/// コンテキストはリクエストIDのログ出力にのみ使用する。
async fn handler(
    echo_handler: &EchoHandler,
    event: LambdaEvent<Value>,
) -> Result<HandlerResponse, Error> {
    let (payload, context) = event.into_parts();

    info!(request_id = %context.request_id, "statusリクエスト受信");

    Ok(echo_handler.handle(payload)?)
}
