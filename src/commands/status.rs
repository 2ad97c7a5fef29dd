//! Register and reset commands

use super::Flash;

/// Print the status and function registers, optionally changing them
pub fn run_status(
    flash: &mut Flash,
    enable_quad: bool,
    protect: Option<u8>,
) -> Result<(), Box<dyn std::error::Error>> {
    if enable_quad {
        flash.enable_quad()?;
        println!("Quad Enable set");
    }
    if let Some(level) = protect {
        if level > 0x0F {
            return Err(format!("Protection level {} out of range (0-15)", level).into());
        }
        let status = flash.read_status()?;
        flash.write_status(status.with_block_protection(level))?;
        println!("Block protection set to {}", level);
    }

    let status = flash.read_status()?;
    println!("Status register:   0x{:02X}", status.bits());
    println!("  WIP  (busy):           {}", status.is_busy());
    println!("  WEL  (write enabled):  {}", status.write_enabled());
    println!("  BP   (protection):     {}", status.block_protection());
    println!("  QE   (quad enable):    {}", status.quad_enabled());
    println!("  SRWD (status locked):  {}", status.write_disabled());

    let function = flash.read_function_register()?;
    println!("Function register: 0x{:02X}", function.bits());
    println!("  Program suspended:     {}", function.program_suspended());
    println!("  Erase suspended:       {}", function.erase_suspended());
    for row in 0..4u8 {
        println!(
            "  Info row {} locked:     {}",
            row,
            function.is_row_locked(row)
        );
    }

    Ok(())
}

/// Software reset the chip
pub fn run_reset(flash: &mut Flash) -> Result<(), Box<dyn std::error::Error>> {
    flash.reset()?;
    println!("Reset complete");
    Ok(())
}
