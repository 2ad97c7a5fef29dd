//! Write command implementation
//!
//! Writes are read-modify-write per 4 KiB sector: a sector is only erased
//! when the new data needs a 0 to become a 1 again.

use super::{settle, Flash};
use crate::cli::ReadMode;
use crate::commands::read::read_flash_with_progress;
use indicatif::{ProgressBar, ProgressStyle};
use is25lq_core::spi::opcodes::{PAGE_SIZE, SECTOR_SIZE};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Run the write command
pub fn run_write(
    flash: &mut Flash,
    input: &Path,
    start: u32,
    verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let capacity = flash.geometry().ok_or("flash not initialized")?.capacity();

    let mut file = File::open(input)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    println!("Read {} bytes from {:?}", data.len(), input);

    if data.is_empty() {
        return Err("Input file is empty".into());
    }
    if start as u64 + data.len() as u64 > capacity as u64 {
        return Err(format!(
            "Write range 0x{:06X}..0x{:06X} is outside chip bounds (0x{:06X})",
            start,
            start as u64 + data.len() as u64,
            capacity
        )
        .into());
    }

    write_flash_with_progress(flash, start, &data)?;

    if verify {
        let actual = read_flash_with_progress(flash, start, data.len(), ReadMode::Fast)?;
        if let Some(i) = actual.iter().zip(data.iter()).position(|(a, e)| a != e) {
            return Err(format!(
                "Verification failed at 0x{:06X}: expected 0x{:02X}, got 0x{:02X}",
                start + i as u32,
                data[i],
                actual[i]
            )
            .into());
        }
        println!("Verification passed");
    }

    println!("Wrote {} bytes at 0x{:06X}", data.len(), start);
    Ok(())
}

/// Returns true if programming `new` over `current` needs an erase first
fn needs_erase(current: &[u8], new: &[u8]) -> bool {
    current.iter().zip(new.iter()).any(|(c, n)| c & n != *n)
}

/// Write a region sector by sector with progress bar
pub fn write_flash_with_progress(
    flash: &mut Flash,
    start: u32,
    data: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let end = start + data.len() as u32;

    let pb = ProgressBar::new(data.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) Writing")?
            .progress_chars("#>-"),
    );

    let mut buf = vec![0u8; SECTOR_SIZE as usize];
    let mut sector = start - start % SECTOR_SIZE;
    while sector < end {
        let lo = std::cmp::max(sector, start);
        let hi = std::cmp::min(sector + SECTOR_SIZE, end);
        let new = &data[(lo - start) as usize..(hi - start) as usize];

        flash.read(sector, &mut buf)?;
        let current = &mut buf[(lo - sector) as usize..(hi - sector) as usize];

        if current[..] != new[..] {
            if needs_erase(current, new) {
                log::debug!("Erasing sector 0x{:06X}", sector);
                current.copy_from_slice(new);
                flash.erase_sector(sector)?;
                settle(flash)?;
                for (i, page) in buf.chunks(PAGE_SIZE as usize).enumerate() {
                    if page.iter().any(|&b| b != 0xFF) {
                        flash.write(sector + (i as u32) * PAGE_SIZE, page)?;
                    }
                }
            } else {
                flash.write(lo, new)?;
            }
        }

        pb.set_position((hi - start) as u64);
        sector += SECTOR_SIZE;
    }

    pb.finish_with_message("Write complete");
    Ok(())
}
