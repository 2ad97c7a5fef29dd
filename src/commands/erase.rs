//! Erase command implementation

use super::{settle, Flash};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Run the erase command
pub fn run_erase(
    flash: &mut Flash,
    start: Option<u32>,
    length: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    match (start, length) {
        (Some(start_addr), Some(len)) => {
            erase_region_with_progress(flash, start_addr, len)?;
            println!("Erased {} bytes starting at 0x{:06X}", len, start_addr);
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err("Both --start and --length must be specified for partial erase".into());
        }
        (None, None) => {
            chip_erase_with_progress(flash)?;
            println!("Chip erase complete");
        }
    }

    Ok(())
}

/// Erase entire chip with progress spinner
pub fn chip_erase_with_progress(flash: &mut Flash) -> Result<(), Box<dyn std::error::Error>> {
    let total_size = flash.geometry().ok_or("flash not initialized")?.capacity();

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!(
        "Erasing {} bytes (this may take a while)...",
        total_size
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    flash.erase_chip()?;
    settle(flash)?;

    pb.finish_with_message(format!("Erased {} bytes", total_size));
    Ok(())
}

/// Erase a region with progress spinner
pub fn erase_region_with_progress(
    flash: &mut Flash,
    start: u32,
    length: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let capacity = flash.geometry().ok_or("flash not initialized")?.capacity();
    if start as u64 + length as u64 > capacity as u64 {
        return Err(format!(
            "Erase range 0x{:06X}..0x{:06X} is outside chip bounds (0x{:06X})",
            start,
            start as u64 + length as u64,
            capacity
        )
        .into());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Erasing 0x{:06X}..0x{:06X}", start, start + length));
    pb.enable_steady_tick(Duration::from_millis(100));

    // Picks 64 KiB, 32 KiB or 4 KiB erases as alignment allows
    flash.erase_range(start, length)?;

    pb.finish_with_message("Erase complete");
    Ok(())
}
