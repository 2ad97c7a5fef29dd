//! IS25LQ instruction set
//!
//! These byte values are the wire contract with the chip and must not be
//! changed.

// ============================================================================
// Read commands - 3-byte address
// ============================================================================

/// Read Data (up to 33 MHz)
pub const RD: u8 = 0x03;
/// Fast Read
pub const FR: u8 = 0x0B;
/// Fast Read Dual I/O (1-2-2)
pub const FRDIO: u8 = 0xBB;
/// Fast Read Quad Output (1-1-4)
pub const FRQO: u8 = 0x6B;

// ============================================================================
// Program / erase
// ============================================================================

/// Page Program
pub const PP: u8 = 0x02;
/// Sector Erase 4KB
pub const SER: u8 = 0xD7;
/// Block Erase 32KB
pub const BER32: u8 = 0x52;
/// Block Erase 64KB
pub const BER64: u8 = 0xD8;
/// Chip Erase
pub const CER: u8 = 0xC7;
/// Chip Erase (alternate opcode)
pub const CER_60: u8 = 0x60;

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - required before any write/erase operation
pub const WREN: u8 = 0x06;
/// Write Disable - clears WEL bit in status register
pub const WRDI: u8 = 0x04;

// ============================================================================
// Register operations
// ============================================================================

/// Read Status Register
pub const RDSR: u8 = 0x05;
/// Write Status Register
pub const WRSR: u8 = 0x01;
/// Read Function Register
pub const RDFR: u8 = 0x48;
/// Write Function Register
pub const WRFR: u8 = 0x42;

// ============================================================================
// Identification
// ============================================================================

/// Read Product Identification (legacy 8-bit device id)
pub const RDID: u8 = 0xAB;
/// Read Manufacturer and Product ID by JEDEC ID command
pub const RDJDID: u8 = 0x9F;
/// Read Manufacturer and Device ID
pub const RDMDID: u8 = 0x90;
/// Read Unique ID Number
pub const RDUID: u8 = 0x4B;
/// SFDP Read
pub const RDSFDP: u8 = 0x5A;

// ============================================================================
// Power management / reset
// ============================================================================

/// Deep Power Down
pub const DP: u8 = 0xB9;
/// Release from Deep Power Down (same opcode as RDID)
pub const RDPD: u8 = 0xAB;
/// Software Reset Enable
pub const RSTEN: u8 = 0x66;
/// Software Reset
pub const RST: u8 = 0x99;

// ============================================================================
// Information row
// ============================================================================

/// Program Information Row
pub const IRP: u8 = 0x62;
/// Read Information Row
pub const IRRD: u8 = 0x68;

// ============================================================================
// Geometry constants
// ============================================================================

/// Page program granularity
pub const PAGE_SIZE: u32 = 0x100;
/// Smallest erase unit
pub const SECTOR_SIZE: u32 = 0x1000;
/// 32 KiB block size
pub const BLOCK32_SIZE: u32 = 0x8000;
/// 64 KiB block size
pub const BLOCK64_SIZE: u32 = 0x10000;

/// ISSI JEDEC manufacturer id
pub const ISSI_MANUFACTURER_ID: u8 = 0x9D;
