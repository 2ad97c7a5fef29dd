//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a string as a hex or decimal u8
fn parse_hex_u8(s: &str) -> Result<u8, String> {
    let value = parse_hex_u32(s)?;
    u8::try_from(value).map_err(|_| format!("Value out of range: {}", s))
}

#[derive(Parser)]
#[command(name = "is25lq")]
#[command(author, version, about = "IS25LQ flash tool over an emulated chip", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Image file backing the emulated chip (created erased if missing)
    #[arg(long, global = true, default_value = "is25lq.bin")]
    pub image: PathBuf,

    /// Capacity code for a new image (0x09, 0x10, 0x11, 0x12 or 0x13)
    #[arg(long, global = true, value_parser = parse_hex_u8)]
    pub capacity: Option<u8>,

    /// Wait for erase/program through the controller's status watch
    #[arg(long, global = true)]
    pub watch: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Read command used for array reads
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadMode {
    /// Read Data (0x03)
    #[default]
    Single,
    /// Fast Read (0x0B)
    Fast,
    /// Fast Read Dual I/O (0xBB)
    Dual,
    /// Fast Read Quad Output (0x6B), sets QE first
    Quad,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Identify the chip
    Probe,

    /// Print the factory unique id
    Uid,

    /// Read flash contents to file
    Read {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Start address (hex with 0x prefix, or decimal)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Number of bytes to read (default: to end of chip)
        #[arg(long, value_parser = parse_hex_u32)]
        length: Option<u32>,

        /// Read command to use
        #[arg(long, value_enum, default_value_t = ReadMode::Single)]
        mode: ReadMode,
    },

    /// Write file to flash
    Write {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Start address (hex with 0x prefix, or decimal)
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        start: u32,

        /// Skip reading back and comparing after the write
        #[arg(long)]
        no_verify: bool,
    },

    /// Erase flash (whole chip unless a range is given)
    Erase {
        /// Start address, must be 4 KiB aligned
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Length in bytes, must be a multiple of 4 KiB
        #[arg(long, value_parser = parse_hex_u32)]
        length: Option<u32>,
    },

    /// Show or change the status and function registers
    Status {
        /// Set the Quad Enable bit
        #[arg(long)]
        enable_quad: bool,

        /// Set the block protection level (0-15)
        #[arg(long, value_parser = parse_hex_u8)]
        protect: Option<u8>,
    },

    /// Software reset the chip
    Reset,

    /// Information row operations
    #[command(subcommand)]
    InfoRow(InfoRowCommands),
}

impl Commands {
    /// Returns true if the command can change the chip contents
    pub fn mutates(&self) -> bool {
        match self {
            Commands::Write { .. } | Commands::Erase { .. } => true,
            Commands::Status {
                enable_quad,
                protect,
            } => *enable_quad || protect.is_some(),
            Commands::InfoRow(cmd) => !matches!(cmd, InfoRowCommands::Read { .. }),
            Commands::Probe | Commands::Uid | Commands::Read { .. } | Commands::Reset => false,
        }
    }
}

#[derive(Subcommand)]
pub enum InfoRowCommands {
    /// Dump an information row
    Read {
        /// Row index (0-3)
        row: u8,

        /// Write the row to this file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Program an information row from a file
    Program {
        /// Row index (0-3)
        row: u8,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Offset within the row
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        offset: u32,
    },

    /// Permanently lock an information row
    Lock {
        /// Row index (0-3)
        row: u8,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_hex_u32("0x1000"), Ok(0x1000));
        assert_eq!(parse_hex_u32("4096"), Ok(4096));
        assert!(parse_hex_u32("0xZZ").is_err());
        assert_eq!(parse_hex_u8("0x13"), Ok(0x13));
        assert!(parse_hex_u8("0x100").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::parse_from([
            "is25lq", "--image", "a.bin", "read", "-o", "out.bin", "--start", "0x100", "--mode",
            "quad",
        ]);
        assert_eq!(cli.image, PathBuf::from("a.bin"));
        match cli.command {
            Commands::Read {
                start, mode, length, ..
            } => {
                assert_eq!(start, Some(0x100));
                assert_eq!(length, None);
                assert_eq!(mode, ReadMode::Quad);
            }
            _ => panic!("expected read"),
        }

        let cli = Cli::parse_from(["is25lq", "info-row", "lock", "2"]);
        assert!(cli.command.mutates());
        let cli = Cli::parse_from(["is25lq", "-vv", "probe"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.command.mutates());
    }
}
