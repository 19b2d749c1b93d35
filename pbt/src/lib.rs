//! PBT テスト共通ユーティリティ

use proptest::prelude::*;

// ========================================
// ヘッダー生成
// ========================================

/// token 文字 (RFC 9110 Section 5.6.2)
pub fn token_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        prop::sample::select(vec![
            '!', '#', '$', '%', '&', '\'', '*', '+', '-', '.', '^', '_', '`', '|', '~',
        ]),
    ]
}

/// ヘッダー名: 1-32 文字の token
pub fn header_name() -> impl Strategy<Value = String> {
    proptest::collection::vec(token_char(), 1..=32).prop_map(|chars| chars.into_iter().collect())
}

/// ヘッダー値: 前後に空白を含まない表示可能 ASCII (空も可)
pub fn header_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[!-~]".prop_map(|s| s),
        "[!-~][ -~]{0,62}[!-~]".prop_map(|s| s),
    ]
}

/// ヘッダー名に使えない文字
pub fn non_token_char() -> impl Strategy<Value = char> {
    prop::sample::select(vec![
        '(', ')', '<', '>', '@', ',', ';', '\\', '"', '/', '[', ']', '?', '=', '{', '}', '©',
    ])
}

// ========================================
// リクエスト生成
// ========================================

/// サポートするメソッド
pub fn method() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "CONNECT", "TRACE", "PATCH",
    ])
}

/// リクエストターゲット
pub fn request_target() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/".to_string()),
        "/[a-zA-Z0-9/_.-]{1,64}".prop_map(|s| s),
    ]
}

/// ボディ
pub fn body() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..256)
}
