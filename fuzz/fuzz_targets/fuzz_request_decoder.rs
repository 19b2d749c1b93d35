#![no_main]

use libfuzzer_sys::fuzz_target;
use tcp_http11::{Error, Request, RequestDecoder};

/// 最大 `chunk_size` バイトずつ届く前提で読み取りループを回す
fn decode_in_chunks(data: &[u8], chunk_size: usize) -> Result<Request, Error> {
    let mut decoder = RequestDecoder::new();
    let mut buf: Vec<u8> = Vec::new();
    let mut pos = 0;
    let mut eof = false;

    loop {
        if !buf.is_empty() || eof {
            let n = decoder.decode(&buf)?;
            assert!(n <= buf.len());
            if decoder.is_done() {
                return decoder.into_request();
            }
            if n > 0 {
                buf.drain(..n);
                continue;
            }
        }
        if eof {
            return Err(Error::UnexpectedEof);
        }

        let end = (pos + chunk_size).min(data.len());
        if end == pos {
            eof = true;
        } else {
            buf.extend_from_slice(&data[pos..end]);
            pos = end;
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let whole = decode_in_chunks(data, data.len().max(1));

    if let Ok(request) = &whole {
        // ボディ長は content-length を超えない
        if let Some(content_length) = request.content_length() {
            assert!(request.body.len() <= content_length);
        }
        let _ = request.encode();
    }

    // 分割して届いても成功したリクエストは同じになる
    let chunked = decode_in_chunks(data, 17);
    if let (Ok(a), Ok(b)) = (&whole, &chunked) {
        assert_eq!(a, b);
    }
});
