//! Information row commands

use super::{settle, Flash};
use is25lq_core::chip::INFO_ROW_SIZE;
use std::fs;
use std::path::Path;

/// Dump an information row to stdout or a file
pub fn run_read(
    flash: &mut Flash,
    row: u8,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut buf = vec![0u8; INFO_ROW_SIZE as usize];
    flash.read_information_row(row, 0, &mut buf)?;

    match output {
        Some(path) => {
            fs::write(path, &buf)?;
            println!("Wrote information row {} to {:?}", row, path);
        }
        None => {
            for (i, line) in buf.chunks(16).enumerate() {
                let hex: Vec<String> = line.iter().map(|b| format!("{:02X}", b)).collect();
                println!("{:02X}: {}", i * 16, hex.join(" "));
            }
        }
    }
    Ok(())
}

/// Program an information row from a file
pub fn run_program(
    flash: &mut Flash,
    row: u8,
    input: &Path,
    offset: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    flash.program_information_row(row, offset, &data)?;
    settle(flash)?;
    println!(
        "Programmed {} bytes into information row {} at offset {}",
        data.len(),
        row,
        offset
    );
    Ok(())
}

/// Lock an information row
pub fn run_lock(flash: &mut Flash, row: u8) -> Result<(), Box<dyn std::error::Error>> {
    flash.lock_information_row(row)?;
    println!("Information row {} is now locked", row);
    Ok(())
}
