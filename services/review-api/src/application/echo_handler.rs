/// エコーハンドラー
///
/// 受信したイベントを固定メッセージと共にそのまま返却する。
/// statusハンドラーとsentimentハンドラーはどちらもこのハンドラーの設定違いとして表現する。
use serde_json::Value;
use tracing::debug;

use crate::domain::{EchoBody, HandlerResponse, ResponseError};

/// statusハンドラーの固定メッセージ
pub const STATUS_MESSAGE: &str = "With CI/CD in place X attempt";

/// sentimentハンドラーの固定メッセージ
pub const SENTIMENT_MESSAGE: &str = "Go Serverless v1.0! Your function executed successfully!";

/// イベントをエコーするハンドラー
///
/// イベントの内容は検証も解釈もしない。どの入力に対しても
/// statusCode 200 のレスポンスを返す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoHandler {
    /// body.message に入る固定メッセージ
    message: String,
    /// `Content-Type: application/json`ヘッダーを付与するか
    include_headers: bool,
}

impl EchoHandler {
    /// 新しいハンドラーを作成
    pub fn new(message: impl Into<String>, include_headers: bool) -> Self {
        Self {
            message: message.into(),
            include_headers,
        }
    }

    /// statusハンドラー
    ///
    /// 重複していた2つのstatusハンドラーはヘッダー有無のみが異なるため、
    /// `include_headers`で切り替える。
    pub fn status(include_headers: bool) -> Self {
        Self::new(STATUS_MESSAGE, include_headers)
    }

    /// sentimentハンドラー（スタブ）
    ///
    /// 感情分類は行わず、イベントをエコーするのみ。ヘッダーは付与しない。
    pub fn sentiment() -> Self {
        Self::new(SENTIMENT_MESSAGE, false)
    }

    /// 固定メッセージを取得
    pub fn message(&self) -> &str {
        &self.message
    }

    /// ヘッダー付与の有無を取得
    pub fn include_headers(&self) -> bool {
        self.include_headers
    }

    /// イベントを処理してレスポンスを生成
    ///
    /// # Arguments
    /// * `event` - 呼び出し元から受け取ったイベント（無加工でエコーされる）
    ///
    /// # Returns
    /// statusCode 200 のレスポンス
    pub fn handle(&self, event: Value) -> Result<HandlerResponse, ResponseError> {
        let echo = EchoBody::new(self.message.clone(), event);
        let response = HandlerResponse::ok(&echo, self.include_headers)?;

        debug!(
            include_headers = self.include_headers,
            body_len = response.body.len(),
            "エコーレスポンスを生成"
        );

        Ok(response)
    }
}
