//! リクエストハンドラー

use std::fmt;
use std::future::Future;

use tcp_http11::{Request, StatusCode};

/// ハンドラーが返すエラー
///
/// `status` と `message` がそのままレスポンスのステータスとボディになる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    /// レスポンスのステータスコード
    pub status: StatusCode,
    /// レスポンスのボディ
    pub message: String,
}

impl HandlerError {
    /// 新しいハンドラーエラーを作成
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BadRequest, message)
    }

    /// 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InternalServerError, message)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for HandlerError {}

/// HTTP リクエストハンドラー
///
/// 成功時はレスポンスボディを返す。ステータスは 200 OK になる。
pub trait Handler: Send + Sync + 'static {
    /// リクエストを処理してレスポンスボディを返す
    fn handle(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Vec<u8>, HandlerError>> + Send;
}

/// 関数からハンドラーを作成
impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<u8>, HandlerError>> + Send,
{
    fn handle(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Vec<u8>, HandlerError>> + Send {
        (self)(request)
    }
}
