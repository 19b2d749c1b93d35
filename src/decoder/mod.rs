//! HTTP/1.1 リクエストデコーダーモジュール
//!
//! Sans I/O 設計に基づくインクリメンタルデコーダーを提供。
//! デコーダーはバッファを保持しない。呼び出し側が未消費データを保持し、
//! `decode()` が返した消費バイト数だけ先頭を取り除いて再度呼び出す。
//!
//! ## 使い方
//!
//! ```rust
//! use tcp_http11::{DecodeState, Method, RequestDecoder};
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buf = b"POST /coffee HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello".to_vec();
//!
//! while !decoder.is_done() {
//!     let n = decoder.decode(&buf).unwrap();
//!     // 実際の使用では n == 0 のときにネットワーク I/O で追加データを読む
//!     assert!(n > 0);
//!     buf.drain(..n);
//! }
//! assert_eq!(decoder.state(), DecodeState::Done);
//!
//! let request = decoder.into_request().unwrap();
//! assert_eq!(request.method, Method::Post);
//! assert_eq!(request.target, "/coffee");
//! assert_eq!(request.version, "1.1");
//! assert_eq!(request.body, b"hello");
//! ```

mod phase;
mod request;

// 公開 API
pub use phase::DecodeState;
pub use request::RequestDecoder;
