//! Streaming line counter.
//!
//! Counting rule, given the file size and the number `nl` of linefeed bytes:
//!
//! - size 0 → 0 lines
//! - `nl == 0` → 1 line (content without a terminator)
//! - otherwise → `nl + 1`, whether or not the last byte is a terminator
//!
//! Carriage returns are not counted, so `\r\n` contributes exactly one line.
//! Content is read in chunks; memory use does not grow with file size.

use std::io::{BufRead, BufReader, Read};
use std::time::SystemTime;

use crate::error::LinemarkError;
use crate::source::fs::{FileIdentity, FileSystem};
use crate::Result;

/// Default ceiling above which files are not counted (10 MiB).
pub const DEFAULT_SIZE_LIMIT: u64 = 10 * 1024 * 1024;

const CHUNK_SIZE: usize = 64 * 1024;

/// Line count of a file together with the stat values it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountedFile {
    pub lines: u64,
    pub size: u64,
    pub mod_time: SystemTime,
}

/// Count lines in a byte stream of known size.
pub fn count_lines<R: Read>(reader: R, size: u64) -> std::io::Result<u64> {
    if size == 0 {
        return Ok(0);
    }

    let mut reader = BufReader::with_capacity(CHUNK_SIZE, reader);
    let mut newlines: u64 = 0;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        newlines += bytecount::count(buf, b'\n') as u64;
        let len = buf.len();
        reader.consume(len);
    }

    Ok(if newlines == 0 { 1 } else { newlines + 1 })
}

/// Count lines in an in-memory string.
pub fn count_text_lines(text: &str) -> u64 {
    let bytes = text.as_bytes();
    count_lines(bytes, bytes.len() as u64).unwrap_or(0)
}

/// Stat, size-check and count one file.
///
/// The size ceiling is checked before the file is opened.
pub fn count_file(fs: &dyn FileSystem, id: &FileIdentity, size_limit: u64) -> Result<CountedFile> {
    let stat = fs.stat(id)?;
    if !stat.is_file {
        return Err(LinemarkError::NotRegularFile(id.path().to_path_buf()));
    }
    if stat.size > size_limit {
        return Err(LinemarkError::TooLarge {
            path: id.path().to_path_buf(),
            size: stat.size,
            limit: size_limit,
        });
    }

    let reader = fs.open(id)?;
    let lines =
        count_lines(reader, stat.size).map_err(|e| LinemarkError::from_io(id.path(), e))?;

    Ok(CountedFile {
        lines,
        size: stat.size,
        mod_time: stat.mod_time,
    })
}

/// Read a whole file as text, replacing invalid UTF-8.
///
/// Used for SLOC classification, which needs the full content. At most
/// `size_limit` bytes are buffered even if the file grows after the stat.
pub fn read_text(fs: &dyn FileSystem, id: &FileIdentity, size_limit: u64) -> Result<String> {
    let stat = fs.stat(id)?;
    if !stat.is_file {
        return Err(LinemarkError::NotRegularFile(id.path().to_path_buf()));
    }
    if stat.size > size_limit {
        return Err(LinemarkError::TooLarge {
            path: id.path().to_path_buf(),
            size: stat.size,
            limit: size_limit,
        });
    }

    // The file may have grown since the stat; never buffer past the ceiling.
    let mut bytes = Vec::with_capacity(stat.size as usize);
    fs.open(id)?
        .take(size_limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| LinemarkError::from_io(id.path(), e))?;
    if bytes.len() as u64 > size_limit {
        return Err(LinemarkError::TooLarge {
            path: id.path().to_path_buf(),
            size: bytes.len() as u64,
            limit: size_limit,
        });
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::fs::{DirEntry, FileStat, LocalFs};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_empty_content() {
        assert_eq!(count_text_lines(""), 0);
    }

    #[test]
    fn test_single_line_without_terminator() {
        assert_eq!(count_text_lines("Hello World"), 1);
    }

    #[test]
    fn test_lf_lines() {
        assert_eq!(count_text_lines("Line 1\nLine 2\nLine 3"), 3);
    }

    #[test]
    fn test_crlf_lines() {
        assert_eq!(count_text_lines("Line 1\r\nLine 2\r\nLine 3"), 3);
    }

    #[test]
    fn test_trailing_terminator_counts_extra_line() {
        assert_eq!(count_text_lines("Line 1\nLine 2\n"), 3);
        assert_eq!(count_text_lines("\n"), 2);
    }

    #[test]
    fn test_thousand_lines() {
        let text = (1..=1000)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(count_text_lines(&text), 1000);
    }

    #[test]
    fn test_lone_carriage_returns_are_not_lines() {
        assert_eq!(count_text_lines("a\rb\rc"), 1);
    }

    #[test]
    fn test_counts_across_chunk_boundaries() {
        let text = "x\n".repeat(CHUNK_SIZE);
        assert_eq!(count_text_lines(&text), CHUNK_SIZE as u64 + 1);
    }

    #[test]
    fn test_zero_size_short_circuits() {
        // The stated size wins: a zero-size file is never read.
        let reader: &[u8] = b"a\nb\n";
        assert_eq!(count_lines(reader, 0).unwrap(), 0);
    }

    #[test]
    fn test_count_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("main.rs");
        fs::write(&path, "fn main() {\n    println!(\"Hello\");\n}").unwrap();

        let counted = count_file(&LocalFs, &FileIdentity::file(&path), DEFAULT_SIZE_LIMIT).unwrap();
        assert_eq!(counted.lines, 3);
        assert_eq!(counted.size, 36);
    }

    #[test]
    fn test_count_file_too_large() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("big.txt");
        fs::write(&path, "0123456789").unwrap();

        let result = count_file(&LocalFs, &FileIdentity::file(&path), 5);
        assert!(matches!(
            result,
            Err(LinemarkError::TooLarge { size: 10, limit: 5, .. })
        ));
    }

    #[test]
    fn test_count_file_rejects_directory() {
        let temp = tempdir().unwrap();
        let result = count_file(&LocalFs, &FileIdentity::file(temp.path()), DEFAULT_SIZE_LIMIT);
        assert!(matches!(result, Err(LinemarkError::NotRegularFile(_))));
    }

    #[test]
    fn test_count_file_missing() {
        let result = count_file(
            &LocalFs,
            &FileIdentity::file("/nonexistent/file.txt"),
            DEFAULT_SIZE_LIMIT,
        );
        assert!(matches!(result, Err(LinemarkError::NotFound(_))));
    }

    /// Reports a fixed size on stat but streams `content` on open,
    /// like a file that grows between the two calls.
    struct GrowingFs {
        stated_size: u64,
        content: Vec<u8>,
    }

    impl FileSystem for GrowingFs {
        fn open(&self, _id: &FileIdentity) -> Result<Box<dyn Read + Send>> {
            Ok(Box::new(std::io::Cursor::new(self.content.clone())))
        }

        fn stat(&self, _id: &FileIdentity) -> Result<FileStat> {
            Ok(FileStat {
                is_dir: false,
                is_file: true,
                size: self.stated_size,
                mod_time: SystemTime::UNIX_EPOCH,
            })
        }

        fn list_dir(&self, id: &FileIdentity) -> Result<Vec<DirEntry>> {
            Err(LinemarkError::NotFound(id.path().to_path_buf()))
        }
    }

    #[test]
    fn test_read_text_stops_at_size_limit() {
        let grown = GrowingFs {
            stated_size: 4,
            content: b"line\n".repeat(100),
        };
        let result = read_text(&grown, &FileIdentity::file("/grown.txt"), 10);
        assert!(matches!(
            result,
            Err(LinemarkError::TooLarge { size: 11, limit: 10, .. })
        ));

        // Growth that stays within the ceiling is read in full
        let small = GrowingFs {
            stated_size: 2,
            content: b"a\nb\nc".to_vec(),
        };
        let text = read_text(&small, &FileIdentity::file("/small.txt"), 10).unwrap();
        assert_eq!(text, "a\nb\nc");
    }

    #[test]
    fn test_read_text_lossy() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("latin1.txt");
        fs::write(&path, [b'a', 0xE9, b'\n', b'b']).unwrap();

        let text = read_text(&LocalFs, &FileIdentity::file(&path), DEFAULT_SIZE_LIMIT).unwrap();
        assert!(text.starts_with('a'));
        assert!(text.ends_with("\nb"));
    }
}
