//! Resolves any 16-bit CPU address to a ROM byte and its [`Offset`] record,
//! abstracting over the target architecture's bank-window layout. Static
//! mapping only: windows are set up once at construction and never
//! re-mapped during analysis, unlike the teacher's runtime `Mapper` trait
//! which switches banks on every write to a mapper register.

use crate::cpu::CpuProfile;
use crate::error::{DisasmError, DisasmResult};
use crate::offset::Offset;

/// One fixed-size chunk of the PRG image, carrying its own offset records.
#[derive(Debug)]
pub struct Bank {
    pub data: Vec<u8>,
    pub offsets: Vec<Offset>,
}

impl Bank {
    fn new(data: Vec<u8>) -> Bank {
        let len = data.len();
        Bank {
            data,
            offsets: (0..len).map(|_| Offset::default()).collect(),
        }
    }
}

/// Resolves CPU addresses to ROM bytes via a fixed window/bank layout. For
/// the 6502 profile this is however many `bank_window_size()`-sized windows
/// the PRG image divides into; for single-bank profiles (CHIP-8) there is
/// exactly one window covering the whole program.
#[derive(Debug)]
pub struct AddressMapper {
    code_base: u16,
    window_size: u16,
    banks: Vec<Bank>,
}

impl AddressMapper {
    /// Build a mapper over `prg`, partitioned into `profile.bank_window_size()`
    /// chunks starting at `profile.code_base()`. `DisasmError::StructuralConfig`
    /// if `prg`'s length isn't a whole multiple of the window size.
    pub fn new(profile: &dyn CpuProfile, prg: &[u8]) -> DisasmResult<AddressMapper> {
        AddressMapper::with_code_base(profile, prg, profile.code_base())
    }

    /// Like [`AddressMapper::new`], but with an explicit `code_base` instead
    /// of `profile.code_base()`. Used for the 6502 half-PRG mirroring case
    /// (spec.md §4.5), where the reset vector picks 0x8000 or 0xC000.
    pub fn with_code_base(profile: &dyn CpuProfile, prg: &[u8], code_base: u16) -> DisasmResult<AddressMapper> {
        let window_size = profile.bank_window_size();
        if window_size == 0 || prg.len() % window_size as usize != 0 {
            return Err(DisasmError::StructuralConfig(format!(
                "PRG length {} is not a multiple of the bank window size {}",
                prg.len(),
                window_size
            )));
        }

        let banks = prg
            .chunks(window_size as usize)
            .map(|chunk| Bank::new(chunk.to_vec()))
            .collect();

        Ok(AddressMapper { code_base, window_size, banks })
    }

    /// Offset inside the bank currently mapped at `addr`'s window, or
    /// `None` if `addr` falls below `code_base` or past the last bank.
    pub fn mapped_bank_index(&self, addr: u16) -> Option<usize> {
        if addr < self.code_base {
            return None;
        }
        let offset_into_banks = (addr - self.code_base) as usize;
        let window = offset_into_banks / self.window_size as usize;
        if window >= self.banks.len() {
            return None;
        }
        Some(offset_into_banks % self.window_size as usize)
    }

    fn bank_for(&self, addr: u16) -> Option<usize> {
        if addr < self.code_base {
            return None;
        }
        let window = (addr - self.code_base) as usize / self.window_size as usize;
        if window < self.banks.len() {
            Some(window)
        } else {
            None
        }
    }

    pub fn mapped_bank(&self, addr: u16) -> Option<&Bank> {
        self.bank_for(addr).map(|window| &self.banks[window])
    }

    pub fn offset_info(&self, addr: u16) -> Option<&Offset> {
        let window = self.bank_for(addr)?;
        let index = self.mapped_bank_index(addr)?;
        self.banks[window].offsets.get(index)
    }

    pub fn offset_info_mut(&mut self, addr: u16) -> Option<&mut Offset> {
        let window = self.bank_for(addr)?;
        let index = (addr - self.code_base) as usize % self.window_size as usize;
        self.banks[window].offsets.get_mut(index)
    }

    /// Up to `max_len` contiguous bytes starting at `addr`, truncated at the
    /// end of the backing bank. Used by the tracer to hand the `CpuProfile`
    /// a decode window without borrowing the mapper across the call.
    pub fn read_slice(&self, addr: u16, max_len: usize) -> Vec<u8> {
        let Some(window) = self.bank_for(addr) else {
            return Vec::new();
        };
        let Some(index) = self.mapped_bank_index(addr) else {
            return Vec::new();
        };
        let bank = &self.banks[window];
        let end = (index + max_len).min(bank.data.len());
        bank.data[index..end].to_vec()
    }

    pub fn read_memory(&self, addr: u16) -> DisasmResult<u8> {
        let window = self.bank_for(addr).ok_or(DisasmError::MemoryRead { addr })?;
        let index = self.mapped_bank_index(addr).ok_or(DisasmError::MemoryRead { addr })?;
        self.banks[window]
            .data
            .get(index)
            .copied()
            .ok_or(DisasmError::MemoryRead { addr })
    }

    pub fn code_base(&self) -> u16 {
        self.code_base
    }

    pub fn window_size(&self) -> u16 {
        self.window_size
    }

    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Mos6502;

    #[test]
    fn rejects_prg_not_a_multiple_of_window_size() {
        let cpu = Mos6502::default();
        let prg = vec![0u8; 100];
        let err = AddressMapper::new(&cpu, &prg).unwrap_err();
        assert!(matches!(err, DisasmError::StructuralConfig(_)));
    }

    #[test]
    fn reads_bytes_across_bank_boundaries() {
        let cpu = Mos6502::default();
        let mut prg = vec![0u8; 0x8000];
        prg[0] = 0xAA;
        prg[0x4000] = 0xBB;
        let mapper = AddressMapper::new(&cpu, &prg).unwrap();
        assert_eq!(mapper.read_memory(0x8000).unwrap(), 0xAA);
        assert_eq!(mapper.read_memory(0xC000).unwrap(), 0xBB);
    }

    #[test]
    fn with_code_base_overrides_the_profile_default() {
        let cpu = Mos6502::default();
        let mut prg = vec![0u8; 0x4000];
        prg[0] = 0xAA;
        let mapper = AddressMapper::with_code_base(&cpu, &prg, 0xC000).unwrap();
        assert_eq!(mapper.read_memory(0xC000).unwrap(), 0xAA);
        assert!(mapper.read_memory(0x8000).is_err());
    }

    #[test]
    fn read_below_code_base_is_a_memory_error() {
        let cpu = Mos6502::default();
        let prg = vec![0u8; 0x4000];
        let mapper = AddressMapper::new(&cpu, &prg).unwrap();
        assert!(matches!(
            mapper.read_memory(0x0000),
            Err(DisasmError::MemoryRead { addr: 0x0000 })
        ));
    }
}
