// エコーレスポンス
//
// Lambdaハンドラーが返却するレスポンス（statusCode / headers / body）と、
// body内にJSON文字列として格納されるエコー本文を定義するドメイン層コンポーネント。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 全ハンドラーが返却するステータスコード
pub const STATUS_OK: u16 = 200;

/// Content-Typeヘッダー名
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// JSONレスポンスのContent-Type
pub const APPLICATION_JSON: &str = "application/json";

/// レスポンス構築のエラー型
#[derive(Debug, Error)]
pub enum ResponseError {
    /// エコー本文のJSONシリアライズに失敗
    #[error("エコー本文のシリアライズに失敗: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// エコー本文
///
/// `body`フィールドにJSON文字列として格納される。
/// `input`には呼び出し元のイベントが無加工で入る。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoBody {
    /// 固定メッセージ
    pub message: String,
    /// 受信したイベント
    pub input: Value,
}

impl EchoBody {
    /// 新しいエコー本文を作成
    pub fn new(message: impl Into<String>, input: Value) -> Self {
        Self {
            message: message.into(),
            input,
        }
    }
}

/// ハンドラーレスポンス
///
/// ホスティング基盤（API Gateway Lambdaプロキシ統合）が解釈する形式。
/// `headers`が`None`の場合はシリアライズ結果からキーごと省略される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    /// HTTPステータスコード（常に200）
    pub status_code: u16,
    /// レスポンスヘッダー
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// JSONエンコード済みのエコー本文
    pub body: String,
}

impl HandlerResponse {
    /// エコー本文から200レスポンスを構築
    ///
    /// # Arguments
    /// * `echo` - body に格納するエコー本文
    /// * `include_headers` - `Content-Type: application/json`ヘッダーを付与するか
    pub fn ok(echo: &EchoBody, include_headers: bool) -> Result<Self, ResponseError> {
        let body = serde_json::to_string(echo)?;

        let headers = include_headers.then(|| {
            BTreeMap::from([(
                CONTENT_TYPE_HEADER.to_string(),
                APPLICATION_JSON.to_string(),
            )])
        });

        Ok(Self {
            status_code: STATUS_OK,
            headers,
            body,
        })
    }

    /// bodyをエコー本文としてデコード
    pub fn decode_body(&self) -> Result<EchoBody, ResponseError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}
