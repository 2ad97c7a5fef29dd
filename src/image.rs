//! Image files backing the emulated chip
//!
//! The array contents live in the image file itself. Information rows and
//! their lock bits live next to it in a `.irow` file: four 256-byte rows
//! followed by one byte holding the lock bits.

use is25lq_core::chip::{density, DENSITIES, INFO_ROW_COUNT, INFO_ROW_SIZE};
use is25lq_core::register::FunctionRegister;
use is25lq_dummy::{DummyConfig, DummyFlash};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const ROW_SIZE: usize = INFO_ROW_SIZE as usize;
const ROWS_LEN: usize = ROW_SIZE * INFO_ROW_COUNT as usize;

/// Image file errors
#[derive(Debug, Error)]
pub enum ImageError {
    /// Reading or writing a file failed
    #[error("{}: {}", .path.display(), .source)]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The image length matches no known part
    #[error("image size {0} bytes does not match any IS25LQ part")]
    UnknownSize(usize),

    /// The requested capacity code is not a known part
    #[error("capacity code 0x{0:02X} is not an IS25LQ part")]
    UnknownCapacity(u8),

    /// The image length disagrees with the requested capacity
    #[error("image is {actual} bytes but capacity 0x{code:02X} needs {expected}")]
    SizeMismatch {
        /// Requested capacity code
        code: u8,
        /// Size implied by the capacity code
        expected: usize,
        /// Size of the image file
        actual: usize,
    },

    /// The information row file has the wrong length
    #[error("{}: information row file must be {} bytes", .0.display(), ROWS_LEN + 1)]
    BadInfoRows(PathBuf),
}

/// Capacity code of the part whose array is exactly `len` bytes
pub fn capacity_for_size(len: usize) -> Option<u8> {
    DENSITIES
        .iter()
        .find(|d| d.geometry.capacity() as usize == len)
        .map(|d| d.code)
}

/// Path of the information row file belonging to an image
pub fn info_rows_path(image: &Path) -> PathBuf {
    image.with_extension("irow")
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ImageError + '_ {
    move |source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// An image file loaded into memory
pub struct Image {
    path: PathBuf,
    capacity_code: u8,
    data: Vec<u8>,
    info_rows: Vec<u8>,
    locks: FunctionRegister,
}

impl Image {
    /// Load an image, or create an erased one if the file does not exist
    ///
    /// `capacity` picks the part for a new image and must agree with the
    /// size of an existing one.
    pub fn open(path: &Path, capacity: Option<u8>) -> Result<Self, ImageError> {
        if let Some(code) = capacity {
            if density(code).is_none() {
                return Err(ImageError::UnknownCapacity(code));
            }
        }

        let (capacity_code, data) = if path.exists() {
            let data = fs::read(path).map_err(io_error(path))?;
            let code = capacity_for_size(data.len()).ok_or(ImageError::UnknownSize(data.len()))?;
            if let Some(requested) = capacity {
                if requested != code {
                    let expected = density(requested)
                        .map(|d| d.geometry.capacity() as usize)
                        .unwrap_or(0);
                    return Err(ImageError::SizeMismatch {
                        code: requested,
                        expected,
                        actual: data.len(),
                    });
                }
            }
            log::debug!("Loaded {} bytes from {}", data.len(), path.display());
            (code, data)
        } else {
            let code = capacity.unwrap_or(0x13);
            let size = density(code)
                .map(|d| d.geometry.capacity() as usize)
                .ok_or(ImageError::UnknownCapacity(code))?;
            log::info!("Creating erased {} byte image {}", size, path.display());
            (code, vec![0xFF; size])
        };

        let rows_path = info_rows_path(path);
        let (info_rows, locks) = if rows_path.exists() {
            let raw = fs::read(&rows_path).map_err(io_error(&rows_path))?;
            if raw.len() != ROWS_LEN + 1 {
                return Err(ImageError::BadInfoRows(rows_path));
            }
            let locks = FunctionRegister::from(raw[ROWS_LEN]).locks();
            (raw[..ROWS_LEN].to_vec(), locks)
        } else {
            (vec![0xFF; ROWS_LEN], FunctionRegister::empty())
        };

        Ok(Self {
            path: path.to_path_buf(),
            capacity_code,
            data,
            info_rows,
            locks,
        })
    }

    /// Capacity code of the emulated part
    pub fn capacity_code(&self) -> u8 {
        self.capacity_code
    }

    /// Build an emulated chip holding this image
    pub fn to_bus(&self, config: DummyConfig) -> DummyFlash {
        let config = DummyConfig {
            capacity_code: self.capacity_code,
            ..config
        };
        let mut bus = DummyFlash::with_data(config, &self.data);
        for (row, chunk) in self.info_rows.chunks(ROW_SIZE).enumerate() {
            bus.info_row_mut(row as u8).copy_from_slice(chunk);
        }
        bus.set_row_locks(self.locks);
        bus
    }

    /// Take the chip contents back into the image
    pub fn update_from(&mut self, bus: &DummyFlash) {
        self.data.copy_from_slice(bus.data());
        for row in 0..INFO_ROW_COUNT {
            let start = row as usize * ROW_SIZE;
            self.info_rows[start..start + ROW_SIZE].copy_from_slice(bus.info_row(row));
        }
        self.locks = bus.function_register().locks();
    }

    /// Write the image and its information rows back to disk
    pub fn save(&self) -> Result<(), ImageError> {
        fs::write(&self.path, &self.data).map_err(io_error(&self.path))?;

        let rows_path = info_rows_path(&self.path);
        let mut raw = self.info_rows.clone();
        raw.push(self.locks.bits());
        fs::write(&rows_path, raw).map_err(io_error(&rows_path))?;

        log::debug!("Saved {}", self.path.display());
        Ok(())
    }
}
