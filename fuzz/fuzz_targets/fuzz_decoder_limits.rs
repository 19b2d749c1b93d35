#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tcp_http11::{DecodeState, DecoderLimits, RequestDecoder};

#[derive(Arbitrary, Debug)]
struct FuzzLimits {
    max_headers_count: u16,
    max_header_line_size: u16,
    max_body_size: u32,
    chunk_size: u8,
    data: Vec<u8>,
}

fn build_limits(input: &FuzzLimits) -> DecoderLimits {
    DecoderLimits {
        max_buffer_size: usize::MAX,
        max_headers_count: input.max_headers_count as usize,
        max_header_line_size: input.max_header_line_size as usize,
        max_body_size: input.max_body_size as usize,
    }
}

fuzz_target!(|input: FuzzLimits| {
    let limits = build_limits(&input);
    let mut decoder = RequestDecoder::with_limits(limits.clone());
    let chunk_size = (input.chunk_size as usize).max(1);

    let mut buf: Vec<u8> = Vec::new();
    for chunk in input.data.chunks(chunk_size) {
        buf.extend_from_slice(chunk);
        loop {
            match decoder.decode(&buf) {
                Ok(0) => break,
                Ok(n) => {
                    buf.drain(..n);
                }
                Err(_) => return,
            }
            if decoder.is_done() {
                break;
            }
        }
        if decoder.is_done() {
            break;
        }
    }

    assert!(decoder.headers().len() <= limits.max_headers_count);
    if let DecodeState::Body { content_length } = decoder.state() {
        assert!(content_length <= limits.max_body_size);
        assert!(decoder.body().len() < content_length);
    }
});
