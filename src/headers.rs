//! ヘッダーフィールドのパース
//!
//! 1 回の呼び出しで CRLF 終端のヘッダー行を最大 1 行だけパースする。
//! 呼び出し側は戻り値の消費バイト数だけバッファを進めて再度呼び出す。
//!
//! ```rust
//! use tcp_http11::Headers;
//!
//! let mut headers = Headers::new();
//! let data = b"Host: localhost:42069\r\n\r\n";
//!
//! let (n, done) = headers.parse_one_line(data).unwrap();
//! assert_eq!((n, done), (23, false));
//! assert_eq!(headers.get("host"), Some("localhost:42069"));
//!
//! let (n, done) = headers.parse_one_line(&data[23..]).unwrap();
//! assert_eq!((n, done), (2, true));
//! ```

use std::collections::BTreeMap;

use crate::error::Error;

/// 大文字小文字を区別しないヘッダーマップ
///
/// 名前は挿入時に ASCII 小文字化される。
/// 同名ヘッダーの値は到着順に `", "` で連結される。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: BTreeMap<String, String>,
}

impl Headers {
    /// 空のヘッダーマップを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ヘッダー行を 1 行パースしてマップに反映
    ///
    /// 戻り値は `(消費バイト数, ヘッダーセクション終了か)`。
    ///
    /// - CRLF が見つからない場合は `(0, false)` (データ不足)
    /// - 空行の場合は `(2, true)` (ヘッダーセクション終了)
    /// - それ以外は `(行長 + 2, false)`
    ///
    /// エラー時は何も消費しない。
    pub fn parse_one_line(&mut self, buf: &[u8]) -> Result<(usize, bool), Error> {
        let Some(pos) = find_line(buf) else {
            return Ok((0, false));
        };
        if pos == 0 {
            return Ok((2, true));
        }

        let line = &buf[..pos];
        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or(Error::MissingColon)?;
        // "Name : value" は不正
        if colon > 0 && line[colon - 1] == b' ' {
            return Err(Error::SpaceBeforeColon);
        }

        let name = line[..colon].trim_ascii();
        let value = line[colon + 1..].trim_ascii();
        if !is_valid_field_name(name) {
            return Err(Error::InvalidHeaderFieldName(
                String::from_utf8_lossy(name).into_owned(),
            ));
        }

        let name = String::from_utf8_lossy(name);
        let value = String::from_utf8_lossy(value);
        self.append(&name, &value);

        Ok((pos + 2, false))
    }

    /// ヘッダーを追加
    ///
    /// 既に同名のヘッダーがある場合は `", "` で連結する。
    pub fn append(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.fields.get_mut(&name) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => {
                self.fields.insert(name, value.to_string());
            }
        }
    }

    /// ヘッダーを設定 (既存の値は置き換える)
    pub fn set(&mut self, name: &str, value: &str) {
        self.fields
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// ヘッダーが存在するか確認
    ///
    /// 値が空でも存在するものとして扱う。
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(&name.to_ascii_lowercase())
    }

    /// ヘッダーを削除
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.fields.remove(&name.to_ascii_lowercase())
    }

    /// ヘッダー数
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 名前順にイテレート
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// 最初の CRLF の位置を返す
pub(crate) fn find_line(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

fn is_valid_field_name(name: &[u8]) -> bool {
    !name.is_empty() && name.iter().copied().all(is_token_char)
}

/// token 文字か確認 (RFC 9110 Section 5.6.2)
pub(crate) fn is_token_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'0'..=b'9' | b'A'..=b'Z' | b'^' | b'_' | b'`' | b'a'..=b'z' | b'|' | b'~'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_single_header() {
        let mut headers = Headers::new();
        let (n, done) = headers
            .parse_one_line(b"Host: localhost:42069\r\n\r\n")
            .unwrap();
        assert_eq!(headers.get("host"), Some("localhost:42069"));
        assert_eq!(n, 23);
        assert!(!done);
    }

    #[test]
    fn valid_single_header_with_extra_whitespace() {
        let mut headers = Headers::new();
        let (n, done) = headers
            .parse_one_line(b"       Host:    localhost:42069    \r\n\r\n")
            .unwrap();
        assert_eq!(headers.get("host"), Some("localhost:42069"));
        assert_eq!(n, 37);
        assert!(!done);
    }

    #[test]
    fn need_more_data() {
        let mut headers = Headers::new();
        assert_eq!(headers.parse_one_line(b"Host: local").unwrap(), (0, false));
        assert_eq!(headers.parse_one_line(b"").unwrap(), (0, false));
        assert_eq!(headers.parse_one_line(b"\r").unwrap(), (0, false));
        assert!(headers.is_empty());
    }

    #[test]
    fn section_done() {
        let mut headers = Headers::new();
        assert_eq!(headers.parse_one_line(b"\r\nbody").unwrap(), (2, true));
        assert!(headers.is_empty());
    }

    #[test]
    fn repeated_header_is_joined() {
        let mut headers = Headers::new();
        let data = b"Host: localhost:42069\r\nHost: localhost:8080\r\n\r\n";
        let (n, _) = headers.parse_one_line(data).unwrap();
        assert_eq!(n, 23);
        let (n, _) = headers.parse_one_line(&data[23..]).unwrap();
        assert_eq!(n, 22);
        assert_eq!(headers.get("host"), Some("localhost:42069, localhost:8080"));
        assert_eq!(headers.parse_one_line(&data[45..]).unwrap(), (2, true));
    }

    #[test]
    fn empty_value_is_distinct_from_absent() {
        let mut headers = Headers::new();
        headers.parse_one_line(b"X-Empty:\r\n").unwrap();
        assert!(headers.contains("x-empty"));
        assert_eq!(headers.get("X-Empty"), Some(""));
        assert!(!headers.contains("x-other"));

        headers.parse_one_line(b"X-Empty: later\r\n").unwrap();
        assert_eq!(headers.get("x-empty"), Some(", later"));
    }

    #[test]
    fn name_is_lowercased() {
        let mut headers = Headers::new();
        headers.parse_one_line(b"Content-TYPE: text/plain\r\n").unwrap();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec![("content-type", "text/plain")]);
    }

    #[test]
    fn space_before_colon() {
        let mut headers = Headers::new();
        let result = headers.parse_one_line(b"       Host : localhost:42069       \r\n\r\n");
        assert_eq!(result, Err(Error::SpaceBeforeColon));
        assert!(headers.is_empty());
    }

    #[test]
    fn invalid_field_name() {
        let mut headers = Headers::new();
        let result = headers.parse_one_line("       H©st: localhost:42069       \r\n\r\n".as_bytes());
        assert!(matches!(result, Err(Error::InvalidHeaderFieldName(_))));
        assert!(headers.is_empty());
    }

    #[test]
    fn empty_field_name() {
        let mut headers = Headers::new();
        let result = headers.parse_one_line(b": value\r\n");
        assert!(matches!(result, Err(Error::InvalidHeaderFieldName(_))));
    }

    #[test]
    fn missing_colon() {
        let mut headers = Headers::new();
        let result = headers.parse_one_line(b"Host localhost:42069\r\n\r\n");
        assert_eq!(result, Err(Error::MissingColon));
    }

    #[test]
    fn token_chars() {
        for b in b"!#$%&'*+-.^_`|~09AZaz" {
            assert!(is_token_char(*b), "{:?}", *b as char);
        }
        for b in b" \t\"(),/:;<=>?@[\\]{}" {
            assert!(!is_token_char(*b), "{:?}", *b as char);
        }
    }

    #[test]
    fn set_and_remove() {
        let mut headers = Headers::new();
        headers.append("Connection", "keep-alive");
        headers.set("CONNECTION", "close");
        assert_eq!(headers.get("connection"), Some("close"));
        assert_eq!(headers.remove("Connection"), Some("close".to_string()));
        assert!(headers.is_empty());
    }
}
