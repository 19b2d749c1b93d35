use crate::headers::Headers;
use crate::request::Request;
use crate::response::Response;

/// リクエストをエンコード
pub fn encode_request(request: &Request) -> Vec<u8> {
    let mut buf = Vec::new();

    // Request line: METHOD SP TARGET SP HTTP/VERSION CRLF
    buf.extend_from_slice(request.method.as_str().as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(request.target.as_bytes());
    buf.extend_from_slice(b" HTTP/");
    buf.extend_from_slice(request.version.as_bytes());
    buf.extend_from_slice(b"\r\n");

    encode_headers(&mut buf, &request.headers, request.body.len());
    buf.extend_from_slice(&request.body);

    buf
}

/// レスポンスをエンコード
pub fn encode_response(response: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line: HTTP/1.1 SP STATUS-CODE SP REASON-PHRASE CRLF
    buf.extend_from_slice(b"HTTP/1.1 ");
    buf.extend_from_slice(response.status.as_u16().to_string().as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(response.status.reason_phrase().as_bytes());
    buf.extend_from_slice(b"\r\n");

    encode_headers(&mut buf, &response.headers, response.body.len());
    buf.extend_from_slice(&response.body);

    buf
}

/// ヘッダーと終端の空行を書き込む
///
/// ボディがあって Content-Length が未設定の場合は自動で付与する。
fn encode_headers(buf: &mut Vec<u8>, headers: &Headers, body_len: usize) {
    for (name, value) in headers {
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    if body_len > 0 && !headers.contains("content-length") {
        buf.extend_from_slice(b"content-length: ");
        buf.extend_from_slice(body_len.to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // End of headers
    buf.extend_from_slice(b"\r\n");
}

impl Request {
    /// リクエストをバイト列にエンコード
    pub fn encode(&self) -> Vec<u8> {
        encode_request(self)
    }
}

impl Response {
    /// レスポンスをバイト列にエンコード
    pub fn encode(&self) -> Vec<u8> {
        encode_response(self)
    }
}
