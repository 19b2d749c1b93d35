//! tokio-tcp-http11 エラー型

/// tokio-tcp-http11 エラー
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O エラー
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// リクエストのデコードエラー
    #[error("HTTP decode error: {0}")]
    Decode(#[from] tcp_http11::Error),
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
