// アプリケーション層モジュール
pub mod corpus_setup;
pub mod echo_handler;

// 再エクスポート
pub use corpus_setup::setup_corpora;
pub use echo_handler::{EchoHandler, SENTIMENT_MESSAGE, STATUS_MESSAGE};
