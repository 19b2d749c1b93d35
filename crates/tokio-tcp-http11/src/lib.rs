//! tokio_tcp_http11 - Tokio integration for tcp_http11
//!
//! tcp_http11 の Sans I/O デコーダーを tokio の TCP ソケットに接続する。
//!
//! ## 特徴
//!
//! - **tcp_http11 ベース**: 読み取りループだけを持ち、パースはデコーダーに任せる
//! - **1 接続 1 リクエスト**: レスポンスを書き込んだら必ず接続を閉じる
//! - **停止可能**: `ShutdownHandle` で受け付けループを止められる
//!
//! ## リクエストの読み取り
//!
//! ```ignore
//! use tcp_http11::DecoderLimits;
//! use tokio_tcp_http11::read_request;
//!
//! let request = read_request(&mut stream, 8192, &DecoderLimits::default()).await?;
//! println!("{} {}", request.method, request.target);
//! ```
//!
//! ## サーバー
//!
//! ```ignore
//! use tokio_tcp_http11::{HandlerError, Request, Server};
//!
//! async fn handler(request: Request) -> Result<Vec<u8>, HandlerError> {
//!     match request.target.as_str() {
//!         "/myproblem" => Err(HandlerError::internal("Woopsie, my bad\n")),
//!         _ => Ok(b"Hello World!".to_vec()),
//!     }
//! }
//!
//! let server = Server::bind("0.0.0.0:8080").await?;
//! server.serve(handler).await?;
//! ```

pub mod error;
pub mod handler;
pub mod reader;
pub mod server;

pub use error::{Error, Result};
pub use handler::{Handler, HandlerError};
pub use reader::read_request;
pub use server::{DEFAULT_READ_BUFFER_SIZE, Server, ShutdownHandle};

// tcp_http11 の型を re-export
pub use tcp_http11::{DecoderLimits, Request, Response, StatusCode};
