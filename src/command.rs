pub trait OpCode {
    fn op_code(&self) -> u8;
}

/// ROM commands select an addressing mode before any device-specific command.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    ReadRom = 0x33,
    MatchRom = 0x55,
    SkipRom = 0xCC,
    SearchRom = 0xF0,
}

impl OpCode for Command {
    fn op_code(&self) -> u8 {
        *self as _
    }
}
