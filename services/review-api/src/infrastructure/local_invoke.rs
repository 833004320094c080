// ローカル実行
//
// Lambda環境外でハンドラーバイナリを起動した場合に、
// コマンドライン引数のイベントで1回だけハンドラーを呼び出すための引数定義。

use clap::Parser;
use serde_json::Value;

/// ローカル実行時のコマンドライン引数
#[derive(Parser, Debug, Default)]
#[command(about = "ハンドラーをローカルで1回実行し、レスポンスを標準出力に書き出す")]
pub struct LocalInvokeArgs {
    /// ハンドラーに渡すイベント（JSON）
    /// 省略時は空文字列のイベントを渡す
    #[arg(long, short = 'e')]
    pub event: Option<String>,
}

impl LocalInvokeArgs {
    /// イベントをJSONとしてパース
    ///
    /// 未指定の場合は空文字列`""`をイベントとする。
    pub fn event(&self) -> Result<Value, serde_json::Error> {
        match &self.event {
            Some(raw) => serde_json::from_str(raw),
            None => Ok(Value::String(String::new())),
        }
    }
}
