//! デコード状態の定義

/// デコード状態
///
/// 遷移は `RequestLine -> Headers -> Body -> Done` の順で単調に進み、後戻りしない。
/// `Body` を経由せずに `Headers` から `Done` へ進む場合もある。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    /// リクエストライン待ち
    RequestLine,
    /// ヘッダー待ち
    Headers,
    /// ボディ読み取り中 (Content-Length)
    Body { content_length: usize },
    /// 完了
    Done,
}
