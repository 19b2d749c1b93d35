//! HTTP サーバーの例 (tokio)
//!
//! 使い方:
//!   # ポート 8080 で起動
//!   cargo run -p http11_server
//!
//!   # ログレベルを変更
//!   RUST_LOG=debug cargo run -p http11_server -- --port 42069
//!
//! 動作確認:
//!   curl -v http://localhost:8080/
//!   curl -v http://localhost:8080/yourproblem
//!   curl -v http://localhost:8080/myproblem
//!
//! Ctrl-C で停止する。

use tcp_http11::Request;
use tokio_tcp_http11::{HandlerError, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct ServerOptions {
    port: u16,
    read_size: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = parse_args()?;

    let addr = format!("0.0.0.0:{}", options.port);
    let server = Server::bind(&addr)
        .await?
        .read_buffer_size(options.read_size);

    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
        }
        tracing::info!("shutting down");
        shutdown.close();
    });

    println!("HTTP server listening on http://{}", addr);
    server.serve(handle).await?;
    Ok(())
}

async fn handle(request: Request) -> Result<Vec<u8>, HandlerError> {
    match request.target.as_str() {
        "/yourproblem" => Err(HandlerError::bad_request(
            "Your problem is not my problem\n",
        )),
        "/myproblem" => Err(HandlerError::internal("Woopsie, my bad\n")),
        _ => Ok(b"Hello World!".to_vec()),
    }
}

fn parse_args() -> Result<ServerOptions, Box<dyn std::error::Error>> {
    let mut args = noargs::raw_args();
    args.metadata_mut().app_name = "http11_server";

    // --help フラグ
    noargs::HELP_FLAG.take_help(&mut args);

    // --version フラグ
    let version_flag: bool = noargs::flag("version")
        .short('V')
        .doc("Show version")
        .take(&mut args)
        .is_present();
    if version_flag {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    // --port オプション
    let port: u16 = noargs::opt("port")
        .short('p')
        .doc("Port to listen on")
        .default("8080")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // --read-size オプション
    let read_size: usize = noargs::opt("read-size")
        .doc("Bytes to read from a connection at a time")
        .default("8192")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // 未知の引数があればエラー、ヘルプが返されたら表示
    if let Some(help) = args.finish().map_err(|e| format!("{:?}", e))? {
        print!("{}", help);
        std::process::exit(0);
    }

    Ok(ServerOptions { port, read_size })
}
