// statusハンドラー設定
//
// 重複していた2つのstatusハンドラーの差異（Content-Typeヘッダーの有無）を
// 環境変数で明示的に選択するインフラストラクチャ層コンポーネント。

use tracing::warn;

use super::lambda_env::parse_bool;

/// 環境変数名: ヘッダー付与の有無
pub const ENV_STATUS_INCLUDE_HEADERS: &str = "STATUS_INCLUDE_HEADERS";

/// ヘッダー付与のデフォルト値
///
/// デプロイされていたstatusハンドラーはContent-Typeヘッダーを返していたため、それに合わせる。
pub const DEFAULT_STATUS_INCLUDE_HEADERS: bool = true;

/// statusハンドラー設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusConfig {
    /// `Content-Type: application/json`ヘッダーを付与するか
    pub include_headers: bool,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            include_headers: DEFAULT_STATUS_INCLUDE_HEADERS,
        }
    }
}

impl StatusConfig {
    /// 環境変数から設定を読み込み
    ///
    /// - STATUS_INCLUDE_HEADERS: `true/false/1/0/yes/no/on/off`（デフォルト: true）
    ///
    /// 未設定の場合はデフォルト値、解釈できない値の場合は警告を出してデフォルト値を使用する。
    pub fn from_env() -> Self {
        let include_headers = match std::env::var(ENV_STATUS_INCLUDE_HEADERS) {
            Ok(value) => parse_bool(&value).unwrap_or_else(|| {
                warn!(
                    env = ENV_STATUS_INCLUDE_HEADERS,
                    value = %value,
                    default = DEFAULT_STATUS_INCLUDE_HEADERS,
                    "真偽値として解釈できないためデフォルト値を使用"
                );
                DEFAULT_STATUS_INCLUDE_HEADERS
            }),
            Err(_) => DEFAULT_STATUS_INCLUDE_HEADERS,
        };

        Self { include_headers }
    }

    /// テスト用に明示的な値で作成
    pub fn new(include_headers: bool) -> Self {
        Self { include_headers }
    }
}
