//! 接続からリクエストを 1 件読み取るループ
//!
//! デコーダーは I/O を行わないため、ここで未消費データのバッファを保持し、
//! 読み取りとデコードを交互に行う。

use tcp_http11::{DecoderLimits, Request, RequestDecoder};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Result;

/// リクエストを 1 件読み取る
///
/// 1 回の read は最大 `read_size` バイト。デコーダーがデータを消費した場合は
/// 読み取りを挟まずに再度デコードし、消費がない場合だけ追加で読み取る。
///
/// - デコーダーが Done に到達したらリクエストを返す (残りのデータは捨てる)
/// - デコード後も残っている未消費データが `max_buffer_size` を超えたら `BufferOverflow`
/// - 完了前に EOF に到達した場合は `UnexpectedEof`
/// - デコードエラー / read エラーはその場で返す
pub async fn read_request<R>(
    reader: &mut R,
    read_size: usize,
    limits: &DecoderLimits,
) -> Result<Request>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = RequestDecoder::with_limits(limits.clone());
    let mut buf: Vec<u8> = Vec::new();
    let mut scratch = vec![0u8; read_size.max(1)];
    let mut eof = false;

    loop {
        // ボディ待ちで空のバッファを渡すと EOF 扱いになるため、EOF 前は読み取りを優先する
        if !buf.is_empty() || eof {
            let n = decoder.decode(&buf)?;
            if decoder.is_done() {
                return Ok(decoder.into_request()?);
            }
            if n > 0 {
                buf.drain(..n);
                continue;
            }
        }

        // デコーダーが消費できなかったデータだけを上限の対象にする
        if buf.len() > limits.max_buffer_size {
            return Err(tcp_http11::Error::BufferOverflow {
                size: buf.len(),
                limit: limits.max_buffer_size,
            }
            .into());
        }

        if eof {
            return Err(tcp_http11::Error::UnexpectedEof.into());
        }

        let n = reader.read(&mut scratch).await?;
        if n == 0 {
            eof = true;
            continue;
        }
        buf.extend_from_slice(&scratch[..n]);
    }
}
