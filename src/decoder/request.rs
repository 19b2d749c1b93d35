//! HTTP リクエストデコーダー

use crate::error::Error;
use crate::headers::{Headers, find_line};
use crate::limits::DecoderLimits;
use crate::method::Method;
use crate::request::{Request, parse_content_length};

use super::phase::DecodeState;

/// デコード済みリクエストライン
#[derive(Debug, Clone, PartialEq, Eq)]
struct RequestLine {
    method: Method,
    target: String,
    version: String,
}

/// HTTP リクエストデコーダー (Sans I/O)
///
/// 1 接続につき 1 リクエストをデコードする。
/// `decode()` は I/O を行わず、ブロックもしない。
#[derive(Debug)]
pub struct RequestDecoder {
    state: DecodeState,
    request_line: Option<RequestLine>,
    headers: Headers,
    /// パース済みヘッダー行数 (同名ヘッダーの結合前)
    header_lines: usize,
    body: Vec<u8>,
    limits: DecoderLimits,
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestDecoder {
    /// 新しいデコーダーを作成
    pub fn new() -> Self {
        Self::with_limits(DecoderLimits::default())
    }

    /// 制限付きでデコーダーを作成
    pub fn with_limits(limits: DecoderLimits) -> Self {
        Self {
            state: DecodeState::RequestLine,
            request_line: None,
            headers: Headers::new(),
            header_lines: 0,
            body: Vec::new(),
            limits,
        }
    }

    /// 制限設定を取得
    pub fn limits(&self) -> &DecoderLimits {
        &self.limits
    }

    /// 現在のデコード状態を取得
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// デコードが完了したかどうか
    pub fn is_done(&self) -> bool {
        self.state == DecodeState::Done
    }

    /// デコード済みのメソッドを取得
    pub fn method(&self) -> Option<Method> {
        self.request_line.as_ref().map(|l| l.method)
    }

    /// デコード済みのリクエストターゲットを取得
    pub fn target(&self) -> Option<&str> {
        self.request_line.as_ref().map(|l| l.target.as_str())
    }

    /// デコード済みの HTTP バージョンを取得
    pub fn version(&self) -> Option<&str> {
        self.request_line.as_ref().map(|l| l.version.as_str())
    }

    /// これまでにデコードしたヘッダーを取得
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// これまでに読み取ったボディを取得
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// デコード結果をリクエストとして取り出す
    ///
    /// Done に到達していない場合は `UnexpectedEof` を返す。
    /// リクエストラインがないまま Done になった場合 (空のリクエスト) は
    /// `MalformedRequestLine` を返す。
    pub fn into_request(self) -> Result<Request, Error> {
        if self.state != DecodeState::Done {
            return Err(Error::UnexpectedEof);
        }
        let line = self
            .request_line
            .ok_or_else(|| Error::MalformedRequestLine("empty request".to_string()))?;
        Ok(Request {
            method: line.method,
            target: line.target,
            version: line.version,
            headers: self.headers,
            body: self.body,
        })
    }

    /// バッファをデコードして消費したバイト数を返す
    ///
    /// 1 回の呼び出しで進めるのは 1 ステップ (リクエストライン 1 行、ヘッダー 1 行、
    /// またはボディ断片) だけ。呼び出し側は消費分を取り除いてから再度呼び出す。
    /// 0 が返った場合は追加データが必要。
    ///
    /// Done 到達後の呼び出しは常に `Ok(0)` を返す。
    pub fn decode(&mut self, buf: &[u8]) -> Result<usize, Error> {
        if self.state == DecodeState::Done {
            return Ok(0);
        }

        // リクエストライン待ちで単独の CRLF だけが届いた場合は空のリクエストとして完了扱い
        // ヘッダー待ちでは通常の終端処理、ボディ待ちではボディデータとして扱う
        if buf == b"\r\n" && self.state == DecodeState::RequestLine {
            self.state = DecodeState::Done;
            return Ok(2);
        }

        match self.state {
            DecodeState::RequestLine => self.decode_request_line(buf),
            DecodeState::Headers => self.decode_header_line(buf),
            DecodeState::Body { content_length } => self.decode_body(buf, content_length),
            DecodeState::Done => Ok(0),
        }
    }

    fn decode_request_line(&mut self, buf: &[u8]) -> Result<usize, Error> {
        let Some(pos) = find_line(buf) else {
            self.check_line_size(buf.len())?;
            return Ok(0);
        };
        self.check_line_size(pos)?;

        let line = std::str::from_utf8(&buf[..pos]).map_err(|_| {
            Error::MalformedRequestLine(String::from_utf8_lossy(&buf[..pos]).into_owned())
        })?;
        self.request_line = Some(parse_request_line(line)?);
        self.state = DecodeState::Headers;

        Ok(pos + 2)
    }

    fn decode_header_line(&mut self, buf: &[u8]) -> Result<usize, Error> {
        // 制限はヘッダーマップに反映する前に検査する
        match find_line(buf) {
            None => {
                self.check_line_size(buf.len())?;
                return Ok(0);
            }
            Some(0) => {}
            Some(pos) => {
                self.check_line_size(pos)?;
                if self.header_lines >= self.limits.max_headers_count {
                    return Err(Error::TooManyHeaders {
                        count: self.header_lines + 1,
                        limit: self.limits.max_headers_count,
                    });
                }
            }
        }

        let (n, done) = self.headers.parse_one_line(buf)?;
        if !done {
            self.header_lines += 1;
            return Ok(n);
        }

        // ヘッダー完了、ボディの有無で遷移先を決める
        self.state = match self.headers.get("content-length") {
            None | Some("") => DecodeState::Done,
            Some(value) => {
                let content_length = parse_content_length(value)?;
                if content_length > self.limits.max_body_size {
                    return Err(Error::BodyTooLarge {
                        size: content_length,
                        limit: self.limits.max_body_size,
                    });
                }
                if content_length == 0 {
                    DecodeState::Done
                } else {
                    DecodeState::Body { content_length }
                }
            }
        };

        Ok(n)
    }

    fn decode_body(&mut self, buf: &[u8], content_length: usize) -> Result<usize, Error> {
        let remaining = content_length - self.body.len();
        if remaining == 0 {
            self.state = DecodeState::Done;
            return Ok(0);
        }

        // ボディが約束されているのにデータがない
        if self.body.is_empty() && buf.is_empty() {
            return Err(Error::UnexpectedEof);
        }

        let size = self.body.len() + buf.len();
        if size > content_length {
            return Err(Error::BodyOverflow {
                size,
                limit: content_length,
            });
        }

        if remaining > buf.len() {
            // 部分的なボディ
            self.body.extend_from_slice(buf);
            return Ok(buf.len());
        }

        self.body.extend_from_slice(&buf[..remaining]);
        if self.body.len() == content_length {
            self.state = DecodeState::Done;
        }
        Ok(remaining)
    }

    fn check_line_size(&self, size: usize) -> Result<(), Error> {
        if size > self.limits.max_header_line_size {
            return Err(Error::HeaderLineTooLong {
                size,
                limit: self.limits.max_header_line_size,
            });
        }
        Ok(())
    }
}

/// リクエストラインをパース
///
/// Format: METHOD SP TARGET SP HTTP/VERSION
fn parse_request_line(line: &str) -> Result<RequestLine, Error> {
    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts.as_slice() else {
        return Err(Error::MalformedRequestLine(line.to_string()));
    };

    let method: Method = method.parse()?;
    let (_, version) = version
        .split_once('/')
        .ok_or_else(|| Error::MalformedRequestLine(line.to_string()))?;

    Ok(RequestLine {
        method,
        target: target.to_string(),
        version: version.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 消費分を取り除きながら、バッファが尽きるか進まなくなるまでデコードする
    fn drive(decoder: &mut RequestDecoder, buf: &mut Vec<u8>) -> Result<(), Error> {
        while !buf.is_empty() {
            let n = decoder.decode(buf)?;
            if n == 0 {
                break;
            }
            buf.drain(..n);
        }
        Ok(())
    }

    #[test]
    fn request_line() {
        let mut decoder = RequestDecoder::new();
        let n = decoder.decode(b"GET / HTTP/1.1\r\nHost: x\r\n").unwrap();
        assert_eq!(n, 16);
        assert_eq!(decoder.state(), DecodeState::Headers);
        assert_eq!(decoder.method(), Some(Method::Get));
        assert_eq!(decoder.target(), Some("/"));
        assert_eq!(decoder.version(), Some("1.1"));
    }

    #[test]
    fn request_line_partial() {
        let mut decoder = RequestDecoder::new();
        assert_eq!(decoder.decode(b"GET / HTT").unwrap(), 0);
        assert_eq!(decoder.decode(b"GET / HTTP/1.1\r").unwrap(), 0);
        assert_eq!(decoder.state(), DecodeState::RequestLine);
        assert_eq!(decoder.method(), None);
    }

    #[test]
    fn request_line_wrong_token_count() {
        for line in [
            "/coffee HTTP/1.1\r\n",
            "GET  / HTTP/1.1\r\n",
            "GET / HTTP/1.1 extra\r\n",
            "GET\r\n",
        ] {
            let mut decoder = RequestDecoder::new();
            assert!(
                matches!(
                    decoder.decode(line.as_bytes()),
                    Err(Error::MalformedRequestLine(_))
                ),
                "{line:?}"
            );
        }
    }

    #[test]
    fn request_line_invalid_method() {
        let mut decoder = RequestDecoder::new();
        assert_eq!(
            decoder.decode(b"FETCH / HTTP/1.1\r\n\r\n"),
            Err(Error::InvalidMethod("FETCH".to_string()))
        );
    }

    #[test]
    fn request_line_version_without_slash() {
        let mut decoder = RequestDecoder::new();
        assert!(matches!(
            decoder.decode(b"GET / HTTP1.1\r\n\r\n"),
            Err(Error::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn request_without_content_length_is_done_after_headers() {
        let mut decoder = RequestDecoder::new();
        let mut buf = b"GET / HTTP/1.1\r\nHost: localhost:42069\r\nAccept: */*\r\n\r\n".to_vec();
        drive(&mut decoder, &mut buf).unwrap();
        assert!(decoder.is_done());
        assert!(buf.is_empty());

        let request = decoder.into_request().unwrap();
        assert_eq!(request.headers.get("host"), Some("localhost:42069"));
        assert_eq!(request.headers.get("accept"), Some("*/*"));
        assert!(request.body.is_empty());
    }

    #[test]
    fn one_header_line_per_call() {
        let mut decoder = RequestDecoder::new();
        let data = b"GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\n\r\n";
        assert_eq!(decoder.decode(data).unwrap(), 16);
        assert_eq!(decoder.decode(&data[16..]).unwrap(), 6);
        assert_eq!(decoder.headers().len(), 1);
        assert_eq!(decoder.decode(&data[22..]).unwrap(), 6);
        assert_eq!(decoder.headers().len(), 2);
        assert_eq!(decoder.state(), DecodeState::Headers);
        assert_eq!(decoder.decode(&data[28..]).unwrap(), 2);
        assert!(decoder.is_done());
    }

    #[test]
    fn header_terminator_moves_to_body() {
        let mut decoder = RequestDecoder::new();
        let mut buf = b"POST / HTTP/1.1\r\nContent-Length: 11\r\n\r\n".to_vec();
        drive(&mut decoder, &mut buf).unwrap();
        assert_eq!(decoder.state(), DecodeState::Body { content_length: 11 });
        assert!(buf.is_empty());
    }

    #[test]
    fn body_in_one_call() {
        let mut decoder = RequestDecoder::new();
        let mut buf = b"POST / HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello world".to_vec();
        drive(&mut decoder, &mut buf).unwrap();
        assert!(decoder.is_done());
        assert_eq!(decoder.body(), b"hello world");
    }

    #[test]
    fn body_in_pieces() {
        let mut decoder = RequestDecoder::new();
        let mut buf = b"POST / HTTP/1.1\r\nContent-Length: 11\r\n\r\n".to_vec();
        drive(&mut decoder, &mut buf).unwrap();

        assert_eq!(decoder.decode(b"hel").unwrap(), 3);
        assert_eq!(decoder.state(), DecodeState::Body { content_length: 11 });
        assert_eq!(decoder.decode(b"lo wor").unwrap(), 6);
        assert!(!decoder.is_done());
        assert_eq!(decoder.decode(b"ld").unwrap(), 2);
        assert!(decoder.is_done());
        assert_eq!(decoder.body(), b"hello world");
    }

    #[test]
    fn body_overflow() {
        let mut decoder = RequestDecoder::new();
        let mut buf = b"POST / HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello world!".to_vec();
        assert_eq!(
            drive(&mut decoder, &mut buf),
            Err(Error::BodyOverflow {
                size: 12,
                limit: 11
            })
        );
    }

    #[test]
    fn body_overflow_after_partial_body() {
        let mut decoder = RequestDecoder::new();
        let mut buf = b"POST / HTTP/1.1\r\nContent-Length: 4\r\n\r\n".to_vec();
        drive(&mut decoder, &mut buf).unwrap();
        assert_eq!(decoder.decode(b"ab").unwrap(), 2);
        assert!(matches!(
            decoder.decode(b"cde"),
            Err(Error::BodyOverflow { size: 5, limit: 4 })
        ));
    }

    #[test]
    fn body_promised_but_no_data() {
        let mut decoder = RequestDecoder::new();
        let mut buf = b"POST / HTTP/1.1\r\nContent-Length: 4\r\n\r\n".to_vec();
        drive(&mut decoder, &mut buf).unwrap();
        assert_eq!(decoder.decode(b""), Err(Error::UnexpectedEof));
    }

    #[test]
    fn partial_body_with_empty_buffer_needs_more_data() {
        let mut decoder = RequestDecoder::new();
        let mut buf = b"POST / HTTP/1.1\r\nContent-Length: 4\r\n\r\nab".to_vec();
        drive(&mut decoder, &mut buf).unwrap();
        assert_eq!(decoder.decode(b"").unwrap(), 0);
        assert_eq!(decoder.state(), DecodeState::Body { content_length: 4 });
    }

    #[test]
    fn invalid_content_length() {
        for value in ["abc", "-1", "+5", "1 2", "10, 10"] {
            let mut decoder = RequestDecoder::new();
            let mut buf = format!("POST / HTTP/1.1\r\nContent-Length: {value}\r\n\r\n").into_bytes();
            assert!(
                matches!(
                    drive(&mut decoder, &mut buf),
                    Err(Error::InvalidContentLength(_))
                ),
                "{value:?}"
            );
        }
    }

    #[test]
    fn empty_content_length_means_no_body() {
        let mut decoder = RequestDecoder::new();
        let mut buf = b"POST / HTTP/1.1\r\nContent-Length:\r\n\r\n".to_vec();
        drive(&mut decoder, &mut buf).unwrap();
        assert!(decoder.is_done());
    }

    #[test]
    fn zero_content_length_means_no_body() {
        let mut decoder = RequestDecoder::new();
        let mut buf = b"POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n".to_vec();
        drive(&mut decoder, &mut buf).unwrap();
        assert!(decoder.is_done());
        assert!(decoder.body().is_empty());
    }

    #[test]
    fn done_is_idempotent() {
        let mut decoder = RequestDecoder::new();
        let mut buf = b"GET / HTTP/1.1\r\n\r\n".to_vec();
        drive(&mut decoder, &mut buf).unwrap();
        assert!(decoder.is_done());
        assert_eq!(decoder.decode(b"GET /again HTTP/1.1\r\n").unwrap(), 0);
        assert_eq!(decoder.decode(b"").unwrap(), 0);
        assert_eq!(decoder.decode(b"\r\n").unwrap(), 0);
        assert!(decoder.is_done());
        assert_eq!(decoder.target(), Some("/"));
    }

    #[test]
    fn bare_crlf_completes_immediately() {
        let mut decoder = RequestDecoder::new();
        assert_eq!(decoder.decode(b"\r\n").unwrap(), 2);
        assert!(decoder.is_done());
        assert!(matches!(
            decoder.into_request(),
            Err(Error::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn bare_crlf_in_body_is_body_data() {
        let mut decoder = RequestDecoder::new();
        let mut buf = b"POST / HTTP/1.1\r\nContent-Length: 4\r\n\r\n".to_vec();
        drive(&mut decoder, &mut buf).unwrap();
        assert_eq!(decoder.decode(b"\r\n").unwrap(), 2);
        assert_eq!(decoder.state(), DecodeState::Body { content_length: 4 });
        assert_eq!(decoder.decode(b"\r\n").unwrap(), 2);
        assert!(decoder.is_done());
        assert_eq!(decoder.body(), b"\r\n\r\n");
    }

    #[test]
    fn crlf_after_content_length_header_is_terminator() {
        let mut decoder = RequestDecoder::new();
        decoder.decode(b"POST / HTTP/1.1\r\n").unwrap();
        decoder.decode(b"Content-Length: 3\r\n").unwrap();
        assert_eq!(decoder.decode(b"\r\n").unwrap(), 2);
        assert_eq!(decoder.state(), DecodeState::Body { content_length: 3 });
    }

    #[test]
    fn into_request_before_done() {
        let mut decoder = RequestDecoder::new();
        decoder.decode(b"GET / HTTP/1.1\r\n").unwrap();
        assert_eq!(decoder.into_request(), Err(Error::UnexpectedEof));
    }

    #[test]
    fn header_error_propagates() {
        let mut decoder = RequestDecoder::new();
        let mut buf = b"GET / HTTP/1.1\r\nHost : x\r\n\r\n".to_vec();
        assert_eq!(drive(&mut decoder, &mut buf), Err(Error::SpaceBeforeColon));
    }

    #[test]
    fn too_many_headers() {
        let limits = DecoderLimits {
            max_headers_count: 2,
            ..DecoderLimits::default()
        };
        let mut decoder = RequestDecoder::with_limits(limits);
        let mut buf = b"GET / HTTP/1.1\r\nA: 1\r\nA: 2\r\nA: 3\r\n\r\n".to_vec();
        assert_eq!(
            drive(&mut decoder, &mut buf),
            Err(Error::TooManyHeaders { count: 3, limit: 2 })
        );
    }

    #[test]
    fn header_line_too_long_without_crlf() {
        let limits = DecoderLimits {
            max_header_line_size: 16,
            ..DecoderLimits::default()
        };
        let mut decoder = RequestDecoder::with_limits(limits);
        assert_eq!(
            decoder.decode(b"GET /a-very-long-target"),
            Err(Error::HeaderLineTooLong { size: 23, limit: 16 })
        );
    }

    #[test]
    fn header_line_too_long_is_not_merged() {
        let limits = DecoderLimits {
            max_header_line_size: 15,
            ..DecoderLimits::default()
        };
        let mut decoder = RequestDecoder::with_limits(limits);
        assert_eq!(decoder.decode(b"GET / HTTP/1.1\r\n"), Ok(16));
        assert_eq!(
            decoder.decode(b"X-Long-Name: value\r\n"),
            Err(Error::HeaderLineTooLong { size: 18, limit: 15 })
        );
        assert_eq!(decoder.headers().get("x-long-name"), None);
        assert!(decoder.headers().is_empty());
    }

    #[test]
    fn too_many_headers_is_not_merged() {
        let limits = DecoderLimits {
            max_headers_count: 1,
            ..DecoderLimits::default()
        };
        let mut decoder = RequestDecoder::with_limits(limits);
        let mut buf = b"GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\n\r\n".to_vec();
        assert_eq!(
            drive(&mut decoder, &mut buf),
            Err(Error::TooManyHeaders { count: 2, limit: 1 })
        );
        assert_eq!(decoder.headers().get("a"), Some("1"));
        assert_eq!(decoder.headers().get("b"), None);
    }

    #[test]
    fn limits_accessor() {
        assert_eq!(RequestDecoder::new().limits(), &DecoderLimits::default());

        let limits = DecoderLimits {
            max_headers_count: 7,
            ..DecoderLimits::default()
        };
        let decoder = RequestDecoder::with_limits(limits.clone());
        assert_eq!(decoder.limits(), &limits);
    }

    #[test]
    fn unlimited_accepts_many_headers() {
        let mut data = b"GET / HTTP/1.1\r\n".to_vec();
        for i in 0..200 {
            data.extend_from_slice(format!("X-Header-{}: {}\r\n", i, i).as_bytes());
        }
        data.extend_from_slice(b"\r\n");

        // デフォルト (100 個) では失敗する
        let mut decoder = RequestDecoder::new();
        let mut buf = data.clone();
        assert_eq!(
            drive(&mut decoder, &mut buf),
            Err(Error::TooManyHeaders {
                count: 101,
                limit: 100
            })
        );

        let mut decoder = RequestDecoder::with_limits(DecoderLimits::unlimited());
        let mut buf = data;
        drive(&mut decoder, &mut buf).unwrap();
        assert!(decoder.is_done());
        assert_eq!(decoder.headers().len(), 200);
        assert_eq!(decoder.headers().get("x-header-199"), Some("199"));
    }

    #[test]
    fn body_too_large() {
        let limits = DecoderLimits {
            max_body_size: 10,
            ..DecoderLimits::default()
        };
        let mut decoder = RequestDecoder::with_limits(limits);
        let mut buf = b"POST / HTTP/1.1\r\nContent-Length: 11\r\n\r\n".to_vec();
        assert_eq!(
            drive(&mut decoder, &mut buf),
            Err(Error::BodyTooLarge { size: 11, limit: 10 })
        );
    }
}
