//! 受信したリクエストを標準出力に表示する例
//!
//! 使い方:
//!   cargo run -p tcp_listener -- --port 42069
//!
//! 動作確認:
//!   curl -X POST -d 'hello world' http://localhost:42069/coffee

use tcp_http11::{DecoderLimits, Request};
use tokio::net::TcpListener;
use tokio_tcp_http11::read_request;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = parse_args()?;
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    let limits = DecoderLimits::default();
    loop {
        let (mut stream, peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "failed to accept connection");
                continue;
            }
        };
        tracing::info!(peer = %peer_addr, "connection accepted");

        // 1 接続ずつ順番に処理する
        match read_request(&mut stream, 8, &limits).await {
            Ok(request) => print_request(&request),
            Err(e) => tracing::warn!(peer = %peer_addr, error = %e, "failed to read request"),
        }
        tracing::info!(peer = %peer_addr, "connection closed");
    }
}

fn print_request(request: &Request) {
    println!("Request line:");
    println!("- Method: {}", request.method);
    println!("- Target: {}", request.target);
    println!("- Version: {}", request.version);
    println!("Headers:");
    for (name, value) in &request.headers {
        println!("- {}: {}", name, value);
    }
    println!("Body:");
    println!("{}", String::from_utf8_lossy(&request.body));
}

fn parse_args() -> Result<u16, Box<dyn std::error::Error>> {
    let mut args = noargs::raw_args();
    args.metadata_mut().app_name = "tcp_listener";

    // --help フラグ
    noargs::HELP_FLAG.take_help(&mut args);

    // --port オプション
    let port: u16 = noargs::opt("port")
        .short('p')
        .doc("Port to listen on")
        .default("8080")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // 未知の引数があればエラー、ヘルプが返されたら表示
    if let Some(help) = args.finish().map_err(|e| format!("{:?}", e))? {
        print!("{}", help);
        std::process::exit(0);
    }

    Ok(port)
}
