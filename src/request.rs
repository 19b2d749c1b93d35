use crate::error::Error;
use crate::headers::Headers;
use crate::method::Method;

/// HTTP リクエスト
///
/// デコーダーが Done に到達した時点で確定し、以降は変更されない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP メソッド
    pub method: Method,
    /// リクエストターゲット (ex. "/", "/coffee")
    pub target: String,
    /// HTTP バージョン ("HTTP/" 以降の部分, ex. "1.1")
    pub version: String,
    /// ヘッダー
    pub headers: Headers,
    /// ボディ
    pub body: Vec<u8>,
}

impl Request {
    /// 新しいリクエストを作成 (HTTP/1.1)
    pub fn new(method: Method, target: &str) -> Self {
        Self {
            method,
            target: target.to_string(),
            version: "1.1".to_string(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// ヘッダーを追加 (ビルダーパターン)
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }

    /// ボディを設定 (ビルダーパターン)
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Content-Length ヘッダーの値を取得
    ///
    /// 数字以外を含む値は `None`。
    pub fn content_length(&self) -> Option<usize> {
        self.get_header("Content-Length")
            .and_then(|v| parse_content_length(v).ok())
    }
}

/// Content-Length の値をパース (数字のみ)
pub(crate) fn parse_content_length(value: &str) -> Result<usize, Error> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidContentLength(value.to_string()));
    }
    value
        .parse::<usize>()
        .map_err(|_| Error::InvalidContentLength(value.to_string()))
}
