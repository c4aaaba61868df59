//! # Character Device Link
//!
//! Writes jobs to a printer exposed as a device node: the Linux USB printer
//! class (`/dev/usb/lp0`), a USB-serial adapter (`/dev/ttyUSB0`) or a macOS
//! serial node (`/dev/cu.usbserial-*`).
//!
//! ## TTY Configuration
//!
//! Serial nodes are switched to raw mode before writing so binary data
//! passes through unmodified:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR, ICRNL
//! - **No flow control**: IXON, IXOFF, IXANY
//! - **No output processing**: OPOST (no CR/LF translation)
//! - **8-bit characters**: CS8, no parity
//! - **Non-canonical, no echo**
//!
//! Non-TTY nodes (usblp) are written as-is.
//!
//! ## Chunked Writes
//!
//! Large jobs are written in 4096-byte chunks with a short pause between
//! chunks so small printer buffers don't overflow.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::PrinterLink;
use crate::error::BridgeError;

/// Default write timeout for device links.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// Printer reachable through a device node.
#[derive(Debug, Clone)]
pub struct DeviceLink {
    path: PathBuf,
    timeout: Duration,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl DeviceLink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_TIMEOUT,
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        }
    }

}

#[async_trait]
impl PrinterLink for DeviceLink {
    fn endpoint(&self) -> String {
        self.path.display().to_string()
    }

    async fn write(&self, data: &[u8]) -> Result<(), BridgeError> {
        let path = self.path.clone();
        let chunk_size = self.chunk_size;
        let chunk_delay = self.chunk_delay;
        let data = data.to_vec();

        debug!(device = %path.display(), bytes = data.len(), "Writing to device");

        let job = tokio::task::spawn_blocking(move || {
            write_blocking(&path, &data, chunk_size, chunk_delay)
        });

        match tokio::time::timeout(self.timeout, job).await {
            Ok(Ok(result)) => {
                result?;
                info!(device = %self.path.display(), "Job written to device");
                Ok(())
            }
            Ok(Err(e)) => Err(BridgeError::Internal(format!("Device write task failed: {}", e))),
            Err(_) => Err(BridgeError::Transport(format!(
                "Timed out writing to {} after {:?}",
                self.path.display(),
                self.timeout
            ))),
        }
    }
}

fn write_blocking(
    path: &Path,
    data: &[u8],
    chunk_size: usize,
    chunk_delay: Duration,
) -> Result<(), BridgeError> {
    let mut file = OpenOptions::new().write(true).open(path).map_err(|e| {
        BridgeError::Transport(format!("Failed to open {}: {}", path.display(), e))
    })?;

    configure_if_tty(&file)?;

    let mut chunks = data.chunks(chunk_size.max(1)).peekable();
    while let Some(chunk) = chunks.next() {
        file.write_all(chunk)
            .map_err(|e| BridgeError::Transport(format!("Write failed: {}", e)))?;
        if chunks.peek().is_some() && !chunk_delay.is_zero() {
            thread::sleep(chunk_delay);
        }
    }

    file.flush()
        .map_err(|e| BridgeError::Transport(format!("Flush failed: {}", e)))
}

#[cfg(unix)]
fn configure_if_tty(file: &File) -> Result<(), BridgeError> {
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    if unsafe { libc::isatty(fd) } == 1 {
        configure_tty_raw(fd)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn configure_if_tty(_file: &File) -> Result<(), BridgeError> {
    Ok(())
}

/// Put a TTY file descriptor into raw mode.
///
/// IXON/IXOFF/IXANY must be off: 0x11 and 0x13 occur in ESC/POS parameters.
#[cfg(unix)]
fn configure_tty_raw(fd: i32) -> Result<(), BridgeError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(BridgeError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(BridgeError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}
