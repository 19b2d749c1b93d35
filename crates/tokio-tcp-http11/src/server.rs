//! TCP サーバー
//!
//! 1 接続につき 1 リクエストを読み取り、ハンドラーの結果をレスポンスとして書き込んで閉じる。
//!
//! ## 使い方
//!
//! ```ignore
//! use tokio_tcp_http11::{Request, Server};
//!
//! let server = Server::bind("0.0.0.0:8080").await?;
//! let shutdown = server.shutdown_handle();
//! tokio::spawn(async move {
//!     let _ = tokio::signal::ctrl_c().await;
//!     shutdown.close();
//! });
//! server
//!     .serve(|_request: Request| async { Ok(b"Hello World!".to_vec()) })
//!     .await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tcp_http11::{DecoderLimits, Response, StatusCode};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::handler::Handler;
use crate::reader::read_request;

/// デフォルトの 1 回あたりの読み取りサイズ
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8192;

/// サーバー停止用ハンドル
///
/// クローンしたハンドルのどれからでも停止できる。停止後に受け付けた接続はない。
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    inner: Arc<ShutdownState>,
}

#[derive(Debug, Default)]
struct ShutdownState {
    closed: AtomicBool,
    notify: Notify,
}

impl ShutdownHandle {
    /// 受け付けループを停止する
    ///
    /// 処理中の接続は中断しない。
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        // 待機中でなくても次の notified() が即座に完了するよう permit を残す
        self.inner.notify.notify_one();
    }

    /// 停止済みかどうか
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    async fn notified(&self) {
        self.inner.notify.notified().await;
    }
}

/// TCP サーバー
pub struct Server {
    listener: TcpListener,
    read_buffer_size: usize,
    limits: DecoderLimits,
    shutdown: ShutdownHandle,
}

impl Server {
    /// 指定アドレスにバインド
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            limits: DecoderLimits::default(),
            shutdown: ShutdownHandle::default(),
        })
    }

    /// 1 回あたりの読み取りサイズを設定
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// デコーダーの制限を設定
    pub fn limits(mut self, limits: DecoderLimits) -> Self {
        self.limits = limits;
        self
    }

    /// ローカルアドレスを取得
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// 停止用ハンドルを取得
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// サーバーを起動
    ///
    /// `ShutdownHandle::close()` が呼ばれるまで接続を受け付け続ける。
    pub async fn serve<H: Handler>(self, handler: H) -> Result<()> {
        let config = Arc::new(self.connection_config());
        let handler = Arc::new(handler);

        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!(addr = %addr, "server listening");
        }

        loop {
            if self.shutdown.is_closed() {
                break;
            }

            let accepted = tokio::select! {
                result = self.listener.accept() => result,
                _ = self.shutdown.notified() => break,
            };

            let (stream, peer_addr) = match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    if self.shutdown.is_closed() {
                        break;
                    }
                    tracing::warn!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            tracing::debug!(peer = %peer_addr, "connection accepted");
            let config = config.clone();
            let handler = handler.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, peer_addr, config, handler).await {
                    tracing::warn!(peer = %peer_addr, error = %e, "connection error");
                }
            });
        }

        tracing::info!("server stopped");
        Ok(())
    }

    /// 単一の接続を処理
    #[cfg(test)]
    pub(crate) async fn handle_one<H: Handler>(self, handler: H) -> Result<()> {
        let (stream, peer_addr) = self.listener.accept().await?;
        let config = Arc::new(self.connection_config());
        handle_connection(stream, peer_addr, config, Arc::new(handler)).await
    }

    fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            read_buffer_size: self.read_buffer_size,
            limits: self.limits.clone(),
        }
    }
}

struct ConnectionConfig {
    read_buffer_size: usize,
    limits: DecoderLimits,
}

/// 接続を処理
///
/// デコードエラーは 400 を返す。I/O エラーはレスポンスを書かずに終了する。
async fn handle_connection<H: Handler>(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    config: Arc<ConnectionConfig>,
    handler: Arc<H>,
) -> Result<()> {
    let response =
        match read_request(&mut stream, config.read_buffer_size, &config.limits).await {
            Ok(request) => {
                tracing::debug!(
                    peer = %peer_addr,
                    method = %request.method,
                    target = %request.target,
                    "request received"
                );
                match handler.handle(request).await {
                    Ok(body) => Response::with_default_headers(StatusCode::Ok, body),
                    Err(e) => {
                        tracing::debug!(peer = %peer_addr, status = e.status.as_u16(), "handler error");
                        Response::with_default_headers(e.status, e.message.into_bytes())
                    }
                }
            }
            Err(Error::Decode(e)) => {
                tracing::warn!(peer = %peer_addr, error = %e, "failed to decode request");
                Response::with_default_headers(StatusCode::BadRequest, b"Bad Request".to_vec())
            }
            Err(e) => return Err(e),
        };

    stream.write_all(&response.encode()).await?;
    stream.flush().await?;
    stream.shutdown().await?;
    tracing::debug!(peer = %peer_addr, status = response.status.as_u16(), "connection closed");
    Ok(())
}
