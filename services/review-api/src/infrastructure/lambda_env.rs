// Lambda実行環境の判定
//
// Lambdaランタイムが設定する環境変数の有無で、
// ランタイムループとローカル1回実行のどちらで起動するかを決める。

/// Lambdaランタイムが設定する関数名の環境変数
pub const ENV_LAMBDA_FUNCTION_NAME: &str = "AWS_LAMBDA_FUNCTION_NAME";

/// Lambda環境で実行されているかどうか
pub fn is_lambda_environment() -> bool {
    std::env::var(ENV_LAMBDA_FUNCTION_NAME)
        .map(|name| !name.trim().is_empty())
        .unwrap_or(false)
}

/// 真偽値の環境変数値をパース
///
/// `true/false`, `1/0`, `yes/no`, `on/off`を大文字小文字を区別せずに受け付ける。
/// それ以外は`None`を返す。
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
