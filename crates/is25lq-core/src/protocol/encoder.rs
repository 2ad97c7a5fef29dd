//! Logical operation to command descriptor encoding
//!
//! Every operation has a fixed opcode and a fixed bus-mode combination.
//! Nothing here is inferred from the data being moved: the same operation
//! always yields the same descriptor shape, only the address value and
//! payload length vary.

use crate::spi::{opcodes, Command, IoMode};

/// Logical flash operations the driver can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Read Data (0x03)
    Read,
    /// Fast Read (0x0B)
    FastRead,
    /// Fast Read Dual I/O (0xBB)
    DualFastRead,
    /// Fast Read Quad Output (0x6B)
    QuadFastRead,
    /// Page Program (0x02)
    PageProgram,
    /// Sector Erase 4 KiB (0xD7)
    SectorErase,
    /// Block Erase 32 KiB (0x52)
    BlockErase32,
    /// Block Erase 64 KiB (0xD8)
    BlockErase64,
    /// Chip Erase (0xC7)
    ChipErase,
    /// Write Enable (0x06)
    WriteEnable,
    /// Write Disable (0x04)
    WriteDisable,
    /// Read Status Register (0x05)
    ReadStatus,
    /// Write Status Register (0x01)
    WriteStatus,
    /// Read Function Register (0x48)
    ReadFunction,
    /// Write Function Register (0x42)
    WriteFunction,
    /// Read Product Identification, legacy 8-bit id (0xAB)
    ReadProductId,
    /// Read JEDEC ID (0x9F)
    ReadJedecId,
    /// Read Manufacturer and Device ID (0x90)
    ReadManufacturerDeviceId,
    /// Read Unique ID (0x4B)
    ReadUniqueId,
    /// Read SFDP table (0x5A)
    ReadSfdp,
    /// Read Information Row (0x68)
    ReadInfoRow,
    /// Program Information Row (0x62)
    ProgramInfoRow,
    /// Deep Power Down (0xB9)
    DeepPowerDown,
    /// Release from Deep Power Down (0xAB)
    ReleasePowerDown,
    /// Software Reset Enable (0x66)
    ResetEnable,
    /// Software Reset (0x99)
    Reset,
}

impl Operation {
    /// Instruction byte sent on the wire
    pub const fn opcode(&self) -> u8 {
        match self {
            Self::Read => opcodes::RD,
            Self::FastRead => opcodes::FR,
            Self::DualFastRead => opcodes::FRDIO,
            Self::QuadFastRead => opcodes::FRQO,
            Self::PageProgram => opcodes::PP,
            Self::SectorErase => opcodes::SER,
            Self::BlockErase32 => opcodes::BER32,
            Self::BlockErase64 => opcodes::BER64,
            Self::ChipErase => opcodes::CER,
            Self::WriteEnable => opcodes::WREN,
            Self::WriteDisable => opcodes::WRDI,
            Self::ReadStatus => opcodes::RDSR,
            Self::WriteStatus => opcodes::WRSR,
            Self::ReadFunction => opcodes::RDFR,
            Self::WriteFunction => opcodes::WRFR,
            Self::ReadProductId => opcodes::RDID,
            Self::ReadJedecId => opcodes::RDJDID,
            Self::ReadManufacturerDeviceId => opcodes::RDMDID,
            Self::ReadUniqueId => opcodes::RDUID,
            Self::ReadSfdp => opcodes::RDSFDP,
            Self::ReadInfoRow => opcodes::IRRD,
            Self::ProgramInfoRow => opcodes::IRP,
            Self::DeepPowerDown => opcodes::DP,
            Self::ReleasePowerDown => opcodes::RDPD,
            Self::ResetEnable => opcodes::RSTEN,
            Self::Reset => opcodes::RST,
        }
    }

    /// Returns true if the chip only accepts this operation with the
    /// write enable latch set
    pub const fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::PageProgram
                | Self::SectorErase
                | Self::BlockErase32
                | Self::BlockErase64
                | Self::ChipErase
                | Self::WriteStatus
                | Self::WriteFunction
                | Self::ProgramInfoRow
        )
    }

    /// Returns true if completion of this operation is reported to the
    /// notification sink
    pub const fn notifies(&self) -> bool {
        matches!(
            self,
            Self::PageProgram
                | Self::SectorErase
                | Self::BlockErase32
                | Self::BlockErase64
                | Self::ChipErase
                | Self::ProgramInfoRow
        )
    }
}

/// Build the command descriptor for an operation
///
/// `address` is ignored by operations without an address phase and `len`
/// by operations without a data phase. Operations whose address is
/// "don't care" on the chip side are encoded with address 0.
pub const fn encode(op: Operation, address: u32, len: usize) -> Command {
    let opcode = op.opcode();
    match op {
        Operation::Read | Operation::FastRead => Command::read_3b(opcode, address, len),
        Operation::DualFastRead => {
            Command::read_3b(opcode, address, len).with_io_mode(IoMode::DualIo)
        }
        Operation::QuadFastRead => Command::read_3b(opcode, address, len)
            .with_io_mode(IoMode::QuadOut)
            .with_dummy_cycles(8),
        Operation::PageProgram | Operation::ProgramInfoRow => {
            Command::write_3b(opcode, address, len)
        }
        Operation::SectorErase | Operation::BlockErase32 | Operation::BlockErase64 => {
            Command::erase_3b(opcode, address)
        }
        Operation::ReadStatus | Operation::ReadFunction => Command::read_reg(opcode, 1),
        Operation::WriteStatus | Operation::WriteFunction => Command::write_reg(opcode, 1),
        Operation::ReadProductId => Command::read_3b(opcode, 0, 1),
        Operation::ReadJedecId => Command::read_reg(opcode, 3),
        Operation::ReadManufacturerDeviceId => Command::read_3b(opcode, 0, 2),
        Operation::ReadUniqueId | Operation::ReadSfdp | Operation::ReadInfoRow => {
            let address = match op {
                Operation::ReadUniqueId => 0,
                _ => address,
            };
            Command::read_3b(opcode, address, len).with_dummy_cycles(8)
        }
        Operation::ChipErase
        | Operation::WriteEnable
        | Operation::WriteDisable
        | Operation::DeepPowerDown
        | Operation::ReleasePowerDown
        | Operation::ResetEnable
        | Operation::Reset => Command::simple(opcode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::{AddressWidth, Direction};

    /// (opcode, address width, data lines, dummy cycles, direction)
    fn shape(cmd: &Command) -> (u8, AddressWidth, u8, u8, Direction) {
        (
            cmd.opcode,
            cmd.address_width,
            cmd.data_lines(),
            cmd.dummy_cycles,
            cmd.direction,
        )
    }

    #[test]
    fn test_read_family() {
        use AddressWidth::ThreeByte;
        use Direction::In;

        assert_eq!(shape(&encode(Operation::Read, 0x100, 16)), (0x03, ThreeByte, 1, 0, In));
        assert_eq!(shape(&encode(Operation::FastRead, 0x100, 16)), (0x0B, ThreeByte, 1, 0, In));
        assert_eq!(shape(&encode(Operation::DualFastRead, 0x100, 16)), (0xBB, ThreeByte, 2, 0, In));
        assert_eq!(shape(&encode(Operation::QuadFastRead, 0x100, 16)), (0x6B, ThreeByte, 4, 8, In));

        let dual = encode(Operation::DualFastRead, 0x100, 16);
        assert_eq!(dual.io_mode.addr_lines(), 2);
        let quad = encode(Operation::QuadFastRead, 0x100, 16);
        assert_eq!(quad.io_mode.addr_lines(), 1);
        assert_eq!(quad.address, Some(0x100));
        assert_eq!(quad.data_len, 16);
    }

    #[test]
    fn test_program_and_erase() {
        let pp = encode(Operation::PageProgram, 0x2000, 256);
        assert_eq!(shape(&pp), (0x02, AddressWidth::ThreeByte, 1, 0, Direction::Out));
        assert_eq!(pp.data_len, 256);

        for (op, opcode) in [
            (Operation::SectorErase, 0xD7),
            (Operation::BlockErase32, 0x52),
            (Operation::BlockErase64, 0xD8),
        ] {
            let cmd = encode(op, 0x1_0000, 99);
            assert_eq!(shape(&cmd), (opcode, AddressWidth::ThreeByte, 0, 0, Direction::None));
            assert_eq!(cmd.address, Some(0x1_0000));
            assert_eq!(cmd.data_len, 0);
        }

        let ce = encode(Operation::ChipErase, 0x1234, 0);
        assert_eq!(shape(&ce), (0xC7, AddressWidth::None, 0, 0, Direction::None));
        assert_eq!(ce.address, None);
    }

    #[test]
    fn test_registers_and_ids() {
        use AddressWidth::{None as NoAddr, ThreeByte};
        use Direction::{In, Out};

        assert_eq!(shape(&encode(Operation::ReadStatus, 0, 0)), (0x05, NoAddr, 1, 0, In));
        assert_eq!(shape(&encode(Operation::WriteStatus, 0, 0)), (0x01, NoAddr, 1, 0, Out));
        assert_eq!(shape(&encode(Operation::ReadFunction, 0, 0)), (0x48, NoAddr, 1, 0, In));
        assert_eq!(shape(&encode(Operation::WriteFunction, 0, 0)), (0x42, NoAddr, 1, 0, Out));
        assert_eq!(shape(&encode(Operation::ReadJedecId, 0, 0)), (0x9F, NoAddr, 1, 0, In));
        assert_eq!(shape(&encode(Operation::ReadProductId, 0, 0)), (0xAB, ThreeByte, 1, 0, In));
        assert_eq!(shape(&encode(Operation::ReadUniqueId, 0x55, 16)), (0x4B, ThreeByte, 1, 8, In));

        assert_eq!(encode(Operation::ReadJedecId, 0, 0).data_len, 3);
        assert_eq!(encode(Operation::ReadStatus, 0, 7).data_len, 1);
        // Unique ID address is don't-care and always sent as zero
        assert_eq!(encode(Operation::ReadUniqueId, 0x55, 16).address, Some(0));
    }

    #[test]
    fn test_control_commands_have_no_phases() {
        for (op, opcode) in [
            (Operation::WriteEnable, 0x06),
            (Operation::WriteDisable, 0x04),
            (Operation::ResetEnable, 0x66),
            (Operation::Reset, 0x99),
            (Operation::DeepPowerDown, 0xB9),
            (Operation::ReleasePowerDown, 0xAB),
        ] {
            let cmd = encode(op, 0xABCDEF, 42);
            assert_eq!(shape(&cmd), (opcode, AddressWidth::None, 0, 0, Direction::None));
            assert!(!cmd.has_address());
            assert_eq!(cmd.io_mode, IoMode::Single);
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = encode(Operation::QuadFastRead, 0x4_0000, 128);
        let b = encode(Operation::QuadFastRead, 0x4_0000, 128);
        assert_eq!(a, b);
    }

    #[test]
    fn test_mutating_classification() {
        assert!(Operation::PageProgram.is_mutating());
        assert!(Operation::WriteFunction.is_mutating());
        assert!(!Operation::Read.is_mutating());
        assert!(!Operation::WriteEnable.is_mutating());
        assert!(Operation::ChipErase.notifies());
        assert!(!Operation::WriteStatus.notifies());
    }
}
