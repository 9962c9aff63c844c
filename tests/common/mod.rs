//! A scripted 1-Wire slave population driven entirely by the master's bit
//! traffic, standing in for real hardware behind the `OneWire` trait.
//!
//! Read slots return the wired-AND of every responding device (an idle or
//! empty line reads high through the pull-up), which is what makes search
//! collisions and multi-drop Read-ROM garbage come out right.

#![allow(dead_code)]

use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use onewire_gpio::{crc8, crc8_word, Error, OneWire};

const READ_ROM: u8 = 0x33;
const MATCH_ROM: u8 = 0x55;
const SKIP_ROM: u8 = 0xCC;
const SEARCH_ROM: u8 = 0xF0;

const CONVERT: u8 = 0x44;
const WRITE_SCRATCHPAD: u8 = 0x4E;
const READ_SCRATCHPAD: u8 = 0xBE;

/// Builds a CRC-valid address from a family code and 48-bit serial.
pub fn device_address(family: u8, serial: u64) -> u64 {
    let body = u64::from(family) | ((serial & 0xFFFF_FFFF_FFFF) << 8);
    let (crc, _) = crc8_word(body, 7);
    body | (u64::from(crc) << 56)
}

/// A 9-byte scratchpad with the given raw temperature bytes, realistic
/// alarm/configuration fill, and a correct trailing CRC.
pub fn scratchpad(temperature: [u8; 2]) -> [u8; 9] {
    let mut sp = [
        temperature[0],
        temperature[1],
        0x4B,
        0x46,
        0x7F,
        0xFF,
        0x0C,
        0x10,
        0x00,
    ];
    sp[8] = crc8(&sp[..8]);
    sp
}

pub struct SimDevice {
    pub address: u64,
    pub scratchpad: [u8; 9],
    in_search: bool,
}

impl SimDevice {
    fn bit(&self, pos: u8) -> bool {
        self.address >> pos & 1 == 1
    }
}

/// Which device(s) the last ROM command left addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    None,
    One(usize),
    All,
}

#[derive(Clone, Copy)]
enum Phase {
    Idle,
    RomCommand,
    SearchRead { pos: u8 },
    SearchComplement { pos: u8 },
    SearchWrite { pos: u8 },
    RomRead { pos: u8 },
    MatchRom { pos: u8, candidate: u64 },
    Function,
    ScratchpadRead { pos: u16 },
    ScratchpadWrite { bytes: [u8; 3], count: u8 },
}

pub struct SimBus {
    pub devices: Vec<SimDevice>,
    phase: Phase,
    byte_accum: u8,
    bits_accumulated: u8,
    selection: Selection,
    /// Reset pulses seen, i.e. bus passes including the initial one.
    pub resets: u32,
    /// Convert commands seen, with the selection they addressed.
    pub converts: Vec<Selection>,
    /// Write-scratchpad sequences seen: selection and the TH/TL/config
    /// bytes that followed.
    pub scratchpad_writes: Vec<(Selection, [u8; 3])>,
}

impl SimBus {
    pub fn new(addresses: &[u64]) -> Self {
        SimBus {
            devices: addresses
                .iter()
                .map(|&address| SimDevice {
                    address,
                    scratchpad: scratchpad([0x50, 0x05]),
                    in_search: false,
                })
                .collect(),
            phase: Phase::Idle,
            byte_accum: 0,
            bits_accumulated: 0,
            selection: Selection::None,
            resets: 0,
            converts: Vec::new(),
            scratchpad_writes: Vec::new(),
        }
    }

    pub fn with_scratchpads(addresses: &[u64], scratchpads: &[[u8; 9]]) -> Self {
        let mut sim = Self::new(addresses);
        for (device, sp) in sim.devices.iter_mut().zip(scratchpads) {
            device.scratchpad = *sp;
        }
        sim
    }

    /// Accumulates one bit of an LSB-first byte; returns it when complete.
    fn push_bit(&mut self, bit: bool) -> Option<u8> {
        self.byte_accum >>= 1;
        if bit {
            self.byte_accum |= 0x80;
        }
        self.bits_accumulated += 1;
        if self.bits_accumulated == 8 {
            self.bits_accumulated = 0;
            Some(self.byte_accum)
        } else {
            None
        }
    }

    fn participants(&self) -> impl Iterator<Item = &SimDevice> {
        self.devices.iter().filter(|d| d.in_search)
    }

    fn dispatch_rom_command(&mut self, cmd: u8) -> Phase {
        match cmd {
            SEARCH_ROM => {
                for device in &mut self.devices {
                    device.in_search = true;
                }
                Phase::SearchRead { pos: 0 }
            }
            READ_ROM => Phase::RomRead { pos: 0 },
            MATCH_ROM => Phase::MatchRom {
                pos: 0,
                candidate: 0,
            },
            SKIP_ROM => {
                self.selection = Selection::All;
                Phase::Function
            }
            _ => Phase::Idle,
        }
    }

    fn dispatch_function_command(&mut self, cmd: u8) -> Phase {
        match cmd {
            CONVERT => {
                self.converts.push(self.selection);
                Phase::Idle
            }
            READ_SCRATCHPAD => Phase::ScratchpadRead { pos: 0 },
            WRITE_SCRATCHPAD => Phase::ScratchpadWrite {
                bytes: [0; 3],
                count: 0,
            },
            _ => Phase::Idle,
        }
    }
}

impl OneWire for SimBus {
    type Error = Infallible;

    fn reset(&mut self, _delay: &mut impl DelayNs) -> Result<(), Error<Infallible>> {
        self.resets += 1;
        self.bits_accumulated = 0;
        self.selection = Selection::None;
        if self.devices.is_empty() {
            self.phase = Phase::Idle;
            Err(Error::NoPresence)
        } else {
            self.phase = Phase::RomCommand;
            Ok(())
        }
    }

    fn write_bit(&mut self, _delay: &mut impl DelayNs, bit: bool) -> Result<(), Infallible> {
        match self.phase {
            Phase::RomCommand => {
                if let Some(cmd) = self.push_bit(bit) {
                    self.phase = self.dispatch_rom_command(cmd);
                }
            }
            Phase::SearchWrite { pos } => {
                // The written bit prunes every disagreeing device from the
                // rest of the pass.
                for device in &mut self.devices {
                    if device.in_search && device.bit(pos) != bit {
                        device.in_search = false;
                    }
                }
                self.phase = if pos == 63 {
                    self.selection = match self.devices.iter().position(|d| d.in_search) {
                        Some(i) => Selection::One(i),
                        None => Selection::None,
                    };
                    Phase::Function
                } else {
                    Phase::SearchRead { pos: pos + 1 }
                };
            }
            Phase::MatchRom { pos, candidate } => {
                let candidate = candidate | (u64::from(bit) << pos);
                self.phase = if pos == 63 {
                    self.selection = match self
                        .devices
                        .iter()
                        .position(|d| d.address == candidate)
                    {
                        Some(i) => Selection::One(i),
                        None => Selection::None,
                    };
                    Phase::Function
                } else {
                    Phase::MatchRom {
                        pos: pos + 1,
                        candidate,
                    }
                };
            }
            Phase::Function => {
                if let Some(cmd) = self.push_bit(bit) {
                    self.phase = self.dispatch_function_command(cmd);
                }
            }
            Phase::ScratchpadWrite { mut bytes, count } => {
                if let Some(byte) = self.push_bit(bit) {
                    bytes[count as usize] = byte;
                    self.phase = if count == 2 {
                        self.scratchpad_writes.push((self.selection, bytes));
                        Phase::Idle
                    } else {
                        Phase::ScratchpadWrite {
                            bytes,
                            count: count + 1,
                        }
                    };
                } else {
                    self.phase = Phase::ScratchpadWrite { bytes, count };
                }
            }
            // Writes into an idle or read-only phase fall off the end of
            // whatever transaction was in flight.
            _ => {}
        }
        Ok(())
    }

    fn read_bit(&mut self, _delay: &mut impl DelayNs) -> Result<bool, Infallible> {
        let bit = match self.phase {
            Phase::SearchRead { pos } => {
                // Low wins on the shared line: reads 1 only if no
                // participant holds a 0 there.
                let bit = self.participants().all(|d| d.bit(pos));
                self.phase = Phase::SearchComplement { pos };
                bit
            }
            Phase::SearchComplement { pos } => {
                let bit = self.participants().all(|d| !d.bit(pos));
                self.phase = Phase::SearchWrite { pos };
                bit
            }
            Phase::RomRead { pos } => {
                // Every device answers Read-ROM; with more than one on the
                // bus the result is their wired-AND.
                let bit = self.devices.iter().all(|d| d.bit(pos));
                self.phase = if pos == 63 {
                    Phase::Idle
                } else {
                    Phase::RomRead { pos: pos + 1 }
                };
                bit
            }
            Phase::ScratchpadRead { pos } => {
                let bit = match self.selection {
                    Selection::One(i) => {
                        let sp = &self.devices[i].scratchpad;
                        sp[(pos / 8) as usize] >> (pos % 8) & 1 == 1
                    }
                    // Nobody drives the line.
                    _ => true,
                };
                self.phase = if pos == 71 {
                    Phase::Idle
                } else {
                    Phase::ScratchpadRead { pos: pos + 1 }
                };
                bit
            }
            _ => true,
        };
        Ok(bit)
    }
}
