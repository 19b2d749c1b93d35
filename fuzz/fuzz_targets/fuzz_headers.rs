#![no_main]

use libfuzzer_sys::fuzz_target;
use tcp_http11::Headers;

fuzz_target!(|data: &[u8]| {
    let mut headers = Headers::new();
    let mut pos = 0;

    while pos < data.len() {
        match headers.parse_one_line(&data[pos..]) {
            Ok((0, _)) => break,
            Ok((n, done)) => {
                assert!(pos + n <= data.len());
                pos += n;
                if done {
                    break;
                }
            }
            Err(_) => break,
        }
    }

    // 名前は常に小文字
    for (name, _) in &headers {
        assert_eq!(name, name.to_ascii_lowercase());
        assert!(headers.get(name).is_some());
    }
});
