/// ログ基盤モジュール
///
/// tracingクレートによる構造化ログ設定を提供する。
/// Lambda環境ではCloudWatch向けにJSON形式で標準出力へ、
/// ローカル実行ではレスポンス出力と混ざらないよう人間が読みやすい形式で標準エラーへ出力する。
use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::lambda_env::is_lambda_environment;

/// ログサブスクライバー初期化用の同期プリミティブ
static INIT: Once = Once::new();

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON形式（標準出力、Lambda/CloudWatch向け）
    Json,
    /// コンパクトなテキスト形式（標準エラー、ローカル実行向け）
    Compact,
}

impl LogFormat {
    /// 実行環境からログ形式を決定
    pub fn detect() -> Self {
        if is_lambda_environment() {
            Self::Json
        } else {
            Self::Compact
        }
    }
}

/// 実行環境に応じたログサブスクライバーを初期化する
///
/// 環境変数`RUST_LOG`またはデフォルトのログレベル（info）でフィルタリングを行う。
/// 複数回呼び出しても安全で、最初の呼び出しのみ初期化を実行する。
///
/// # 使用例
/// ```ignore
/// use review_api::infrastructure::init_logging;
///
/// init_logging();
/// tracing::info!("Lambda function started");
/// ```
pub fn init_logging() {
    init_logging_with(LogFormat::detect());
}

/// 指定した形式でログサブスクライバーを初期化する
pub fn init_logging_with(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                let json_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .flatten_event(true)
                    .with_current_span(false);

                let _ = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(json_layer)
                    .try_init();
            }
            LogFormat::Compact => {
                let fmt_layer = tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact();

                let _ = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .try_init();
            }
        }
    });
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
///
/// # 注意
/// この関数はテスト専用であり、本番環境では`init_logging`を使用すること。
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::lambda_env::ENV_LAMBDA_FUNCTION_NAME;
    use serial_test::serial;

    unsafe fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    #[test]
    fn test_init_test_logging_idempotent() {
        init_test_logging();
        init_test_logging();
        init_test_logging();
    }

    /// 本番用初期化はテスト用サブスクライバー設定後に呼ばれてもパニックしない
    #[test]
    fn test_init_logging_after_test_logging_does_not_panic() {
        init_test_logging();
        init_logging_with(LogFormat::Json);
        init_logging_with(LogFormat::Compact);
    }

    #[test]
    #[serial(lambda_env)]
    fn test_detect_json_in_lambda() {
        unsafe { set_env(ENV_LAMBDA_FUNCTION_NAME, "review-api-dev-status") };
        assert_eq!(LogFormat::detect(), LogFormat::Json);
        unsafe { remove_env(ENV_LAMBDA_FUNCTION_NAME) };
    }

    #[test]
    #[serial(lambda_env)]
    fn test_detect_compact_outside_lambda() {
        unsafe { remove_env(ENV_LAMBDA_FUNCTION_NAME) };
        assert_eq!(LogFormat::detect(), LogFormat::Compact);
    }

    /// コンテキスト情報付きログが出力できることを確認
    #[test]
    fn test_log_with_request_context() {
        init_test_logging();

        let span = tracing::info_span!("invocation", request_id = "req-123", handler = "status");
        let _guard = span.enter();

        tracing::info!(include_headers = true, "イベント受信");
        tracing::debug!(corpus = "tokenizers/punkt", "コーパス確認");
    }
}
