// tests/lines.rs

use proptest::prelude::*;

use zedamigo_exec::lines::{contains_bytes, into_lines, next_line_lossy};

#[test]
fn into_lines_table() {
    let cases: &[(&str, &[&str])] = &[
        ("", &[]),
        ("\n\n\n", &[]),
        ("line1\r\nline2\r", &["line1", "line2"]),
        ("a\nb\nc", &["a", "b", "c"]),
        ("\r\r only\r\n\r\n", &["only"]),
        ("mixed\rcarriage\nreturns\r\n", &["mixed", "carriage", "returns"]),
        ("  spaced  \n", &["  spaced  "]),
    ];

    for (input, expected) in cases {
        let got = into_lines(input.as_bytes());
        assert_eq!(&got, expected, "input {input:?}");
    }
}

#[test]
fn into_lines_replaces_invalid_utf8() {
    let got = into_lines(b"ok\n\xffbad\n");
    assert_eq!(got, vec!["ok".to_string(), "\u{fffd}bad".to_string()]);
}

#[test]
fn contains_bytes_basics() {
    assert!(contains_bytes(b"eve login: ", b"login:"));
    assert!(!contains_bytes(b"log in:", b"login:"));
    assert!(contains_bytes(b"anything", b""));
    assert!(!contains_bytes(b"", b"x"));
}

#[tokio::test]
async fn next_line_lossy_strips_terminators() {
    let data: &[u8] = b"first\r\nsecond\nlast";
    let mut reader = tokio::io::BufReader::new(data);
    let mut buf = Vec::new();

    let mut lines = Vec::new();
    while let Some(line) = next_line_lossy(&mut reader, &mut buf)
        .await
        .expect("in-memory read cannot fail")
    {
        lines.push(line);
    }

    assert_eq!(lines, vec!["first", "second", "last"]);
}

proptest! {
    #[test]
    fn into_lines_never_yields_empty_or_broken_lines(input in ".{0,200}") {
        for line in into_lines(input.as_bytes()) {
            prop_assert!(!line.is_empty());
            prop_assert!(!line.contains('\n'));
            prop_assert!(!line.contains('\r'));
        }
    }

    #[test]
    fn into_lines_keeps_all_other_content(parts in proptest::collection::vec("[a-z ]{0,12}", 0..12),
                                          seps in proptest::collection::vec(prop_oneof![Just("\n"), Just("\r"), Just("\r\n")], 12)) {
        let mut input = String::new();
        for (part, sep) in parts.iter().zip(seps.iter()) {
            input.push_str(part);
            input.push_str(sep);
        }

        let expected: Vec<String> = parts.iter().filter(|p| !p.is_empty()).cloned().collect();
        prop_assert_eq!(into_lines(input.as_bytes()), expected);
    }
}
