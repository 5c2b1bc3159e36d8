//! Serial device port.
//!
//! Line state is read with `TIOCMGET` and set with `TIOCMSET`; break
//! pulses go through `tcsendbreak`. HUPCL is cleared on open so that the
//! lines the UPS depends on stay up when the device is closed.

use ccups_common::ups::driver::{SerialPort, UpsError};
use ccups_common::ups::lines::SerialLines;
use nix::errno::Errno;
use nix::sys::termios::{self, ControlFlags, SetArg};
use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use tracing::{debug, info};

nix::ioctl_read_bad!(
    /// Read modem control lines.
    tiocmget,
    libc::TIOCMGET,
    libc::c_int
);
nix::ioctl_write_ptr_bad!(
    /// Set modem control lines.
    tiocmset,
    libc::TIOCMSET,
    libc::c_int
);

/// Serial device the UPS cable is attached to.
#[derive(Debug)]
pub struct TtyPort {
    /// Device path, for messages
    device: String,
    /// Open device
    file: File,
}

impl TtyPort {
    /// Open `device` for control-line access.
    ///
    /// # Errors
    /// Returns `UpsError::DeviceOpen` if the device cannot be opened or its
    /// terminal attributes cannot be updated.
    pub fn open(device: &str) -> Result<Self, UpsError> {
        let open_err = |reason: String| UpsError::DeviceOpen {
            device: device.to_string(),
            reason,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(device)
            .map_err(|e| open_err(e.to_string()))?;

        let mut tio = termios::tcgetattr(&file).map_err(|e| open_err(format!("tcgetattr: {e}")))?;
        // don't hang up on last close
        tio.control_flags.remove(ControlFlags::HUPCL);
        termios::tcsetattr(&file, SetArg::TCSANOW, &tio)
            .map_err(|e| open_err(format!("tcsetattr: {e}")))?;

        info!("Opened serial device {}", device);
        Ok(Self {
            device: device.to_string(),
            file,
        })
    }

    /// Device path.
    pub fn device(&self) -> &str {
        &self.device
    }
}

impl SerialPort for TtyPort {
    fn read_lines(&mut self) -> Result<SerialLines, UpsError> {
        let mut bits: libc::c_int = 0;
        // SAFETY: the fd is owned by `self.file` and `bits` outlives the call.
        unsafe { tiocmget(self.file.as_raw_fd(), &mut bits) }
            .map_err(|e| UpsError::HardwareRead(format!("ioctl TIOCMGET: {e}")))?;
        Ok(SerialLines::from_raw(bits))
    }

    fn set_lines(&mut self, lines: SerialLines) -> Result<(), UpsError> {
        let bits: libc::c_int = lines.bits();
        debug!("{}: TIOCMSET {:#06x}", self.device, bits);
        // SAFETY: the fd is owned by `self.file` and `bits` outlives the call.
        unsafe { tiocmset(self.file.as_raw_fd(), &bits) }
            .map_err(|e| UpsError::HardwareWrite(format!("ioctl TIOCMSET: {e}")))?;
        Ok(())
    }

    fn send_break(&mut self, duration: i32) -> Result<(), UpsError> {
        debug!("{}: tcsendbreak({})", self.device, duration);
        termios::tcsendbreak(&self.file, duration).map_err(|e| match e {
            Errno::ENOTTY | Errno::ENOSYS | Errno::EOPNOTSUPP => {
                UpsError::UnsupportedOperation(format!("tcsendbreak: {e}"))
            }
            _ => UpsError::HardwareWrite(format!("tcsendbreak: {e}")),
        })
    }
}
