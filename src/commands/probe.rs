//! Probe and unique id commands

use super::Flash;
use is25lq_core::chip::density;

/// Print what the driver found during init plus the secondary ids
pub fn run_probe(flash: &mut Flash) -> Result<(), Box<dyn std::error::Error>> {
    let id = flash.identification().ok_or("flash not initialized")?;
    let geometry = flash.geometry().ok_or("flash not initialized")?;
    let name = density(id.capacity).map(|d| d.name).unwrap_or("unknown");

    println!("Found flash chip:");
    println!("  Name:     {}", name);
    println!(
        "  Size:     {} bytes ({} KiB)",
        geometry.capacity(),
        geometry.capacity() / 1024
    );
    println!(
        "  JEDEC ID: {:02X} {:04X}",
        id.manufacturer_id,
        id.device_id()
    );
    println!(
        "  Layout:   {} x 64 KiB, {} x 32 KiB, {} x 4 KiB",
        geometry.blocks64, geometry.blocks32, geometry.sectors
    );

    let product = flash.read_product_id()?;
    let (manufacturer, device) = flash.read_manufacturer_device_id()?;
    println!("  Product:  {:02X} (0xAB), {:02X} {:02X} (0x90)", product, manufacturer, device);

    let mut signature = [0u8; 4];
    flash.read_sfdp(0, &mut signature)?;
    if &signature == b"SFDP" {
        println!("  SFDP:     present");
    } else {
        println!("  SFDP:     not found");
    }

    Ok(())
}

/// Print the factory unique id
pub fn run_uid(flash: &mut Flash) -> Result<(), Box<dyn std::error::Error>> {
    let uid = flash.read_unique_id()?;
    let hex: Vec<String> = uid.iter().map(|b| format!("{:02X}", b)).collect();
    println!("{}", hex.join(""));
    Ok(())
}
