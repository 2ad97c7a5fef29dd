//! Read command implementation

use super::Flash;
use crate::cli::ReadMode;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Default chunk size for reading (4 KiB)
const READ_CHUNK_SIZE: usize = 4096;

/// Run the read command
pub fn run_read(
    flash: &mut Flash,
    output: &Path,
    start: Option<u32>,
    length: Option<u32>,
    mode: ReadMode,
) -> Result<(), Box<dyn std::error::Error>> {
    let capacity = flash.geometry().ok_or("flash not initialized")?.capacity();
    let start = start.unwrap_or(0);
    let length = match length {
        Some(len) => len,
        None => capacity.checked_sub(start).ok_or("start is past the end of the chip")?,
    };

    if mode == ReadMode::Quad {
        flash.enable_quad()?;
    }

    let data = read_flash_with_progress(flash, start, length as usize, mode)?;

    let mut file = File::create(output)?;
    file.write_all(&data)?;

    println!("Wrote {} bytes to {:?}", data.len(), output);
    Ok(())
}

/// Read a region with progress bar
pub fn read_flash_with_progress(
    flash: &mut Flash,
    start: u32,
    length: usize,
    mode: ReadMode,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut data = vec![0u8; length];

    let pb = ProgressBar::new(length as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );

    let mut offset = 0usize;
    while offset < length {
        let chunk_size = std::cmp::min(READ_CHUNK_SIZE, length - offset);
        let chunk = &mut data[offset..offset + chunk_size];
        let addr = start + offset as u32;

        match mode {
            ReadMode::Single => flash.read(addr, chunk)?,
            ReadMode::Fast => flash.fast_read(addr, chunk)?,
            ReadMode::Dual => flash.dual_fast_read(addr, chunk)?,
            ReadMode::Quad => flash.quad_fast_read(addr, chunk)?,
        }

        offset += chunk_size;
        pb.set_position(offset as u64);
    }

    pb.finish_with_message("Read complete");
    Ok(data)
}
