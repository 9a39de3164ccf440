// src/lines.rs

//! Line and substring helpers shared by the stream scanners, the file
//! monitor and the socket relay.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Split raw bytes into lines.
///
/// `\r`, `\n` and `\r\n` all count as line breaks, empty lines are dropped
/// and empty input yields no lines. A trailing partial line is kept.
pub fn into_lines(data: &[u8]) -> Vec<String> {
    data.split(|b| *b == b'\n' || *b == b'\r')
        .filter(|line| !line.is_empty())
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect()
}

/// Read the next `\n` terminated line, without the terminator (and without a
/// trailing `\r`).
///
/// Invalid UTF-8 is replaced rather than treated as an error, serial console
/// output is not guaranteed to be clean. Returns `Ok(None)` at EOF.
pub async fn next_line_lossy<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let n = reader.read_until(b'\n', buf).await?;
    if n == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// Literal substring search over bytes. An empty needle matches anything.
pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}
