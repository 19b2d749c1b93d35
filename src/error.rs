use std::fmt;

/// リクエストデコードエラー
///
/// いずれも接続単位で致命的。デコーダーはエラー後に再同期しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// リクエストラインが不正
    MalformedRequestLine(String),
    /// 未知のメソッド
    InvalidMethod(String),
    /// ヘッダー行にコロンがない
    MissingColon,
    /// コロンの直前に空白がある
    SpaceBeforeColon,
    /// ヘッダー名に使用できない文字が含まれている
    InvalidHeaderFieldName(String),
    /// Content-Length が非負整数として解釈できない
    InvalidContentLength(String),
    /// Content-Length を超えるボディを受信した
    BodyOverflow { size: usize, limit: usize },
    /// リクエスト完了前に入力が尽きた
    UnexpectedEof,
    /// バッファサイズ超過
    BufferOverflow { size: usize, limit: usize },
    /// ヘッダー数超過
    TooManyHeaders { count: usize, limit: usize },
    /// ヘッダー行が長すぎる
    HeaderLineTooLong { size: usize, limit: usize },
    /// ボディサイズ超過
    BodyTooLarge { size: usize, limit: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedRequestLine(line) => write!(f, "invalid request line: {}", line),
            Error::InvalidMethod(method) => write!(f, "invalid method: {}", method),
            Error::MissingColon => write!(f, "malformed header: missing colon"),
            Error::SpaceBeforeColon => write!(f, "malformed header: space before colon"),
            Error::InvalidHeaderFieldName(name) => {
                write!(f, "invalid header field name: {:?}", name)
            }
            Error::InvalidContentLength(value) => {
                write!(f, "invalid Content-Length: {:?}", value)
            }
            Error::BodyOverflow { size, limit } => {
                write!(f, "body length is greater than content length: {} > {}", size, limit)
            }
            Error::UnexpectedEof => write!(f, "unexpected EOF while parsing request"),
            Error::BufferOverflow { size, limit } => {
                write!(f, "buffer overflow: {} > {}", size, limit)
            }
            Error::TooManyHeaders { count, limit } => {
                write!(f, "too many headers: {} > {}", count, limit)
            }
            Error::HeaderLineTooLong { size, limit } => {
                write!(f, "header line too long: {} > {}", size, limit)
            }
            Error::BodyTooLarge { size, limit } => {
                write!(f, "body too large: {} > {}", size, limit)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            Error::MissingColon.to_string(),
            "malformed header: missing colon"
        );
        assert_eq!(
            Error::InvalidMethod("FETCH".to_string()).to_string(),
            "invalid method: FETCH"
        );
        assert_eq!(
            Error::BodyOverflow { size: 12, limit: 11 }.to_string(),
            "body length is greater than content length: 12 > 11"
        );
        assert_eq!(
            Error::UnexpectedEof.to_string(),
            "unexpected EOF while parsing request"
        );
    }
}
