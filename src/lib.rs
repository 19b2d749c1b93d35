//! # tcp_http11
//!
//! 依存なしのインクリメンタル HTTP/1.1 リクエストデコーダー (Sans I/O)
//!
//! ## 特徴
//!
//! - **依存なし**: 標準ライブラリのみ使用
//! - **Sans I/O**: I/O を完全に分離した設計
//! - **インクリメンタル**: 任意の位置で分割されたデータを順にデコードできる
//!
//! ## 使い方
//!
//! ```rust
//! use tcp_http11::{Method, RequestDecoder, Response, StatusCode};
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buf = Vec::new();
//!
//! // 受信データを 8 バイトずつ投入する
//! for chunk in b"GET / HTTP/1.1\r\nHost: localhost:42069\r\n\r\n".chunks(8) {
//!     buf.extend_from_slice(chunk);
//!     loop {
//!         let n = decoder.decode(&buf).unwrap();
//!         if n == 0 {
//!             break;
//!         }
//!         buf.drain(..n);
//!     }
//! }
//!
//! let request = decoder.into_request().unwrap();
//! assert_eq!(request.method, Method::Get);
//! assert_eq!(request.headers.get("Host"), Some("localhost:42069"));
//!
//! // レスポンスを作成してエンコード
//! let response = Response::with_default_headers(StatusCode::Ok, b"Hello World!".to_vec());
//! let bytes = response.encode();
//! assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

mod decoder;
mod encoder;
mod error;
mod headers;
mod limits;
mod method;
mod request;
mod response;

pub use decoder::{DecodeState, RequestDecoder};
pub use encoder::{encode_request, encode_response};
pub use error::Error;
pub use headers::Headers;
pub use limits::DecoderLimits;
pub use method::Method;
pub use request::Request;
pub use response::{Response, StatusCode, default_headers};
