// Size of the buffer handed to native calls that return strings.
pub const STRING_BUFFER_SIZE: usize = 256;

// Copy a C string out of a fixed buffer: stop at the first NUL, or at the end of the buffer if
// there is none.  Bytes that are not UTF-8 are replaced.

pub fn cstrdup(s: &[cty::c_char]) -> String {
    let bytes = s.iter().map(|c| *c as u8).collect::<Vec<u8>>();
    bytes_to_string(&bytes)
}

pub fn bytes_to_string(s: &[u8]) -> String {
    let end = s.iter().position(|c| *c == 0).unwrap_or(s.len());
    String::from_utf8_lossy(&s[..end]).to_string()
}

// Copy `s` into a fixed C buffer, truncating so that a terminator always fits.
pub fn copy_to_buffer(s: &str, buf: &mut [u8]) {
    if buf.is_empty() {
        return;
    }
    let n = s.len().min(buf.len() - 1);
    buf[..n].copy_from_slice(&s.as_bytes()[..n]);
    buf[n] = 0;
}

// JSON string body: " and \ are escaped, as are newline, return and tab.  Other control
// characters become spaces.
pub fn json_quote(s: &str) -> String {
    let mut t = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                t.push('\\');
                t.push(c);
            }
            '\n' => t.push_str("\\n"),
            '\r' => t.push_str("\\r"),
            '\t' => t.push_str("\\t"),
            c if c < ' ' => t.push(' '),
            c => t.push(c),
        }
    }
    t
}

// A CSV field is quoted when it holds a comma or a quote; quotes inside are doubled.
pub fn csv_quote(s: &str) -> String {
    if !s.contains(|c: char| c == ',' || c == '"') {
        return s.to_string();
    }
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[test]
pub fn cstrdup_test() {
    let buf: [cty::c_char; 8] = [72, 105, 0, 33, 0, 0, 0, 0];
    assert!(cstrdup(&buf) == "Hi");
    assert!(bytes_to_string(b"DCU") == "DCU");
    assert!(bytes_to_string(b"") == "");
    let mut out = [0xFFu8; 4];
    copy_to_buffer("hygon", &mut out);
    assert!(&out == b"hyg\0");
    assert!(bytes_to_string(&out) == "hyg");
}

#[test]
pub fn json_quote_test() {
    assert!(&json_quote("abcde") == "abcde");
    assert!(&json_quote(r#"abc\de"#) == r#"abc\\de"#);
    assert!(&json_quote(r#"abc"de"#) == r#"abc\"de"#);
    assert!(&json_quote("abc\nde") == r#"abc\nde"#);
    assert!(&json_quote("abc\u{0008}de") == r#"abc de"#);
}

#[test]
pub fn csv_quote_test() {
    assert!(&csv_quote("abcde") == "abcde");
    assert!(&csv_quote(r#"abc,de"#) == r#""abc,de""#);
    assert!(&csv_quote(r#"abc"de"#) == r#""abc""de""#);
}
