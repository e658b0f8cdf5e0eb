//! JSON line I/O
//!
//! - Input: one JSON object per line
//! - Output: one JSON object per line, `{"status":"ok","data":…}` or
//!   `{"status":"error","code":…,"message":…}`
//! - UTF-8 only

use std::io::{BufRead, Write};

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::errors::CliResult;

/// Reads one request per non-blank line.
///
/// A line that fails to parse yields its JSON error; reading goes on with
/// the next line. An I/O error is returned as-is.
pub fn read_requests<T, R>(reader: R) -> impl Iterator<Item = std::io::Result<Result<T, serde_json::Error>>>
where
    T: DeserializeOwned,
    R: BufRead,
{
    reader
        .lines()
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|line| line.map(|l| serde_json::from_str(&l)))
}

/// Write a success response line
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_line(out, &response)
}

/// Write an error response line
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_line(out, &response)
}

fn write_line<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
