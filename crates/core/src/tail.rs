use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Chunk size for backward reading: 8KB.
const CHUNK_SIZE: u64 = 8 * 1024;

/// Read the last `n` lines from a file without loading the entire file.
///
/// Strategy: seek to EOF, read backwards in 8KB chunks until `n + 1`
/// newlines have been seen (the extra one bounds the first wanted line),
/// then split and keep the last `n`.
/// Returns lines in file order (oldest first).
///
/// - `n == 0` returns an empty vec
/// - An empty file returns an empty vec
/// - A trailing newline at EOF does not produce an empty last line
/// - Lines longer than the chunk size are assembled correctly
pub fn tail_lines(path: &Path, n: usize) -> io::Result<Vec<String>> {
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut file = File::open(path)?;
    let file_len = file.metadata()?.len();

    if file_len == 0 {
        return Ok(Vec::new());
    }

    let mut collected: Vec<u8> = Vec::new();
    let mut remaining = file_len;
    let target_newlines = n.saturating_add(1);
    let mut newline_count = 0usize;

    while remaining > 0 {
        let chunk_len = remaining.min(CHUNK_SIZE);
        let offset = remaining - chunk_len;

        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; chunk_len as usize];
        file.read_exact(&mut buf)?;

        newline_count += memchr::memchr_iter(b'\n', &buf).count();

        buf.append(&mut collected);
        collected = buf;
        remaining = offset;

        if newline_count >= target_newlines {
            break;
        }
    }

    let text = String::from_utf8_lossy(&collected);
    let text = text.as_ref();
    let text = text.strip_suffix('\n').unwrap_or(text);

    if text.is_empty() {
        return Ok(Vec::new());
    }

    let all_lines: Vec<&str> = text.split('\n').collect();
    let start = all_lines.len().saturating_sub(n);

    Ok(all_lines[start..]
        .iter()
        .map(|s| s.strip_suffix('\r').unwrap_or(s).to_string())
        .collect())
}
