// ABOUTME: Source side of the SCP protocol, driven over any byte stream.
// ABOUTME: Sends a single file to a remote `scp -t` sink and checks every acknowledgement.

use super::error::{Error, Result};
use std::fmt;
use std::fs::Metadata;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Remote command that receives a file at `destination`.
pub fn sink_command(destination: &str) -> String {
    format!("scp -t {}", shell_quote(destination))
}

/// Quote a string for a POSIX shell.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// The `C` record announcing a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub mode: u32,
    pub size: u64,
    pub name: String,
}

impl FileHeader {
    pub fn new(mode: u32, size: u64, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.contains('/') || name.contains('\n') {
            return Err(Error::Transfer(format!("invalid file name: {:?}", name)));
        }
        Ok(Self {
            mode: mode & 0o7777,
            size,
            name,
        })
    }

    /// Build the header for a local file.
    pub fn for_file(source: &Path, metadata: &Metadata) -> Result<Self> {
        if !metadata.is_file() {
            return Err(Error::Transfer(format!(
                "{} is not a regular file",
                source.display()
            )));
        }
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Transfer(format!("no file name in {}", source.display())))?;
        Self::new(file_mode(metadata), metadata.len(), name)
    }
}

impl fmt::Display for FileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "C{:04o} {} {}", self.mode, self.size, self.name)
    }
}

#[cfg(unix)]
fn file_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn file_mode(_metadata: &Metadata) -> u32 {
    0o644
}

/// Send `header.size` bytes from `source` to the sink on the other end of `stream`.
///
/// The sink speaks first with a zero byte, then acknowledges the header and
/// the trailing zero after the content. Status 1 (warning) or 2 (fatal) is
/// followed by a message line and aborts the transfer.
pub async fn send<S, R>(stream: &mut S, source: &mut R, header: &FileHeader) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    read_ack(stream).await?;

    stream
        .write_all(header.to_string().as_bytes())
        .await
        .map_err(write_failed)?;
    stream.flush().await.map_err(write_failed)?;
    read_ack(stream).await?;

    let copied = tokio::io::copy(&mut source.take(header.size), stream)
        .await
        .map_err(|e| Error::Transfer(format!("failed to stream file content: {}", e)))?;
    if copied != header.size {
        return Err(Error::Transfer(format!(
            "local file ended after {} of {} bytes",
            copied, header.size
        )));
    }

    stream.write_all(&[0]).await.map_err(write_failed)?;
    stream.flush().await.map_err(write_failed)?;
    read_ack(stream).await?;

    // EOF tells the sink there are no more files.
    stream.shutdown().await.map_err(write_failed)?;
    Ok(())
}

fn write_failed(e: std::io::Error) -> Error {
    Error::Transfer(format!("failed to write to remote: {}", e))
}

async fn read_ack<S: AsyncRead + Unpin>(stream: &mut S) -> Result<()> {
    let mut status = [0u8; 1];
    match stream.read(&mut status).await {
        Ok(0) => Err(Error::Transfer(
            "remote closed the stream before acknowledging".to_string(),
        )),
        Ok(_) => match status[0] {
            0 => Ok(()),
            1 | 2 => {
                let message = read_line(stream).await?;
                Err(Error::Transfer(message))
            }
            other => Err(Error::Transfer(format!(
                "unexpected acknowledgement byte {:#04x}",
                other
            ))),
        },
        Err(e) => Err(Error::Transfer(format!("failed to read acknowledgement: {}", e))),
    }
}

async fn read_line<S: AsyncRead + Unpin>(stream: &mut S) -> Result<String> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match stream.read(&mut byte).await {
            Ok(0) => break,
            Ok(_) if byte[0] == b'\n' => break,
            Ok(_) => line.push(byte[0]),
            Err(e) => return Err(Error::Transfer(format!("failed to read error message: {}", e))),
        }
    }
    Ok(String::from_utf8_lossy(&line).trim().to_string())
}
