// SPDX-License-Identifier: GPL-3.0-or-later

//! Hardware register representation and the backings a logiCVC register
//! file can live behind.
//!
//! All offsets are byte offsets from the start of the IP core register
//! window. Registers are 32 bits wide and word aligned.
//!

use core::ptr;
use std::collections::BTreeMap;

use tracing::warn;

/// One 32-bit word of the logiCVC register window.
///
/// Only ever reached through a pointer into mapped device memory; the
/// accessors never let the compiler cache or elide an access.
///
#[repr(transparent)]
pub struct Register(u32);

impl Register {

    /// Volatile read of the register word
    #[inline(always)]
    pub unsafe fn lw(&self) -> u32 {
        ptr::addr_of!(self.0).read_volatile()
    }

    /// Volatile write of the register word
    #[inline(always)]
    pub unsafe fn sw(&mut self, word: u32) {
        ptr::addr_of_mut!(self.0).write_volatile(word)
    }

}

/// Word access to a register file by byte offset.
///
/// `read_direct` and `write_direct` reach the hardware even when a backing
/// keeps a shadow copy; they are meant for registers with side effects on
/// access such as the interrupt status register.
///
pub trait RegisterAccess {

    fn read(&mut self, offset: u32) -> u32;

    fn write(&mut self, offset: u32, value: u32);

    #[inline(always)]
    fn read_direct(&mut self, offset: u32) -> u32 {
        self.read(offset)
    }

    #[inline(always)]
    fn write_direct(&mut self, offset: u32, value: u32) {
        self.write(offset, value)
    }

    /// Read a register as a bitfield view
    #[inline(always)]
    fn read_as<T>(&mut self, offset: u32) -> T
        where
            T: From<u32>,
            Self: Sized,
    {
        self.read(offset).into()
    }

    /// Write a bitfield view to a register
    #[inline(always)]
    fn write_as<T>(&mut self, offset: u32, value: T)
        where
            T: Into<u32>,
            Self: Sized,
    {
        self.write(offset, value.into())
    }

    /// Read-modify-write of a single register, returning the written word
    fn modify<F>(&mut self, offset: u32, f: F) -> u32
        where
            F: FnOnce(u32) -> u32,
            Self: Sized,
    {
        let value = f(self.read(offset));
        self.write(offset, value);
        value
    }

}

impl<R> RegisterAccess for &mut R
    where
        R: RegisterAccess + ?Sized,
{

    fn read(&mut self, offset: u32) -> u32 {
        (**self).read(offset)
    }

    fn write(&mut self, offset: u32, value: u32) {
        (**self).write(offset, value)
    }

    fn read_direct(&mut self, offset: u32) -> u32 {
        (**self).read_direct(offset)
    }

    fn write_direct(&mut self, offset: u32, value: u32) {
        (**self).write_direct(offset, value)
    }

}

/// Memory-mapped register window accessed with volatile loads and stores
///
pub struct Mmio {
    base: *mut Register,
    len: usize,
}

// The window is plain device memory; exclusive access is enforced by
// `&mut self` on every accessor.
unsafe impl Send for Mmio {}

impl Mmio {

    /// Wrap a mapped register window of `len` bytes.
    ///
    /// # Safety
    ///
    /// `base` must be word aligned and point to `len` bytes of device memory
    /// that stay mapped, and are not accessed through any other path, for
    /// the lifetime of the returned value.
    ///
    pub unsafe fn new(base: *mut u32, len: usize) -> Self {
        Self {
            base: base.cast(),
            len,
        }
    }

    fn slot(&self, offset: u32) -> Option<usize> {
        let offset = offset as usize;
        if offset % 4 != 0 || offset + 4 > self.len {
            return None;
        }
        Some(offset / 4)
    }

}

impl RegisterAccess for Mmio {

    fn read(&mut self, offset: u32) -> u32 {
        match self.slot(offset) {
            Some(index) => unsafe { (*self.base.add(index)).lw() },
            None => {
                warn!(offset, "register read outside mapped window");
                0
            }
        }
    }

    fn write(&mut self, offset: u32, value: u32) {
        match self.slot(offset) {
            Some(index) => unsafe { (*self.base.add(index)).sw(value) },
            None => warn!(offset, value, "register write outside mapped window"),
        }
    }

}

/// Write-through cache over a register file.
///
/// logiCVC can be synthesized without readable registers; reads then come
/// from the last value written. When the hardware is readable each read
/// refreshes the cache instead.
///
pub struct Shadowed<R> {
    inner: R,
    readable: bool,
    shadow: BTreeMap<u32, u32>,
}

impl<R> Shadowed<R>
    where
        R: RegisterAccess,
{

    pub fn new(inner: R, readable: bool) -> Self {
        Self {
            inner,
            readable,
            shadow: BTreeMap::new(),
        }
    }

    /// Last value written to or read from `offset`
    pub fn cached(&self, offset: u32) -> Option<u32> {
        self.shadow.get(&offset).copied()
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

}

impl<R> RegisterAccess for Shadowed<R>
    where
        R: RegisterAccess,
{

    fn read(&mut self, offset: u32) -> u32 {
        if self.readable {
            let value = self.inner.read(offset);
            self.shadow.insert(offset, value);
            value
        } else {
            self.cached(offset).unwrap_or(0)
        }
    }

    fn write(&mut self, offset: u32, value: u32) {
        self.shadow.insert(offset, value);
        self.inner.write(offset, value);
    }

    fn read_direct(&mut self, offset: u32) -> u32 {
        self.inner.read_direct(offset)
    }

    fn write_direct(&mut self, offset: u32, value: u32) {
        self.inner.write_direct(offset, value)
    }

}

/// In-memory register file recording every write in order
///
#[derive(Debug, Clone, Default)]
pub struct RegisterFile {
    words: Vec<u32>,
    journal: Vec<(u32, u32)>,
}

impl RegisterFile {

    /// Zeroed register file spanning `len` bytes
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len / 4],
            journal: Vec::new(),
        }
    }

    /// Read without going through the register interface
    pub fn peek(&self, offset: u32) -> u32 {
        self.words.get(offset as usize / 4).copied().unwrap_or(0)
    }

    /// Store without recording a write, e.g. to model hardware state
    pub fn poke(&mut self, offset: u32, value: u32) {
        if let Some(word) = self.words.get_mut(offset as usize / 4) {
            *word = value;
        }
    }

    /// Writes issued so far as `(offset, value)` pairs
    pub fn journal(&self) -> &[(u32, u32)] {
        &self.journal
    }

    pub fn take_journal(&mut self) -> Vec<(u32, u32)> {
        core::mem::take(&mut self.journal)
    }

}

impl RegisterAccess for RegisterFile {

    fn read(&mut self, offset: u32) -> u32 {
        self.peek(offset)
    }

    fn write(&mut self, offset: u32, value: u32) {
        self.journal.push((offset, value));
        self.poke(offset, value);
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_file_journals_writes() {
        let mut regs = RegisterFile::new(0x100);
        regs.write(0x10, 7);
        regs.write(0x08, 3);
        assert_eq!(regs.read(0x10), 7);
        assert_eq!(regs.journal(), &[(0x10, 7), (0x08, 3)]);
        assert_eq!(regs.take_journal().len(), 2);
        assert!(regs.journal().is_empty());
    }

    #[test]
    fn register_file_ignores_out_of_range() {
        let mut regs = RegisterFile::new(0x10);
        regs.poke(0x40, 1);
        assert_eq!(regs.read(0x40), 0);
    }

    #[test]
    fn modify_applies_closure() {
        let mut regs = RegisterFile::new(0x10);
        regs.poke(0x4, 0b1010);
        let written = regs.modify(0x4, |v| v | 1);
        assert_eq!(written, 0b1011);
        assert_eq!(regs.peek(0x4), 0b1011);
    }

    #[test]
    fn shadow_serves_reads_of_write_only_registers() {
        let mut hw = RegisterFile::new(0x100);
        hw.poke(0x20, 0xDEAD);
        let mut regs = Shadowed::new(hw, false);
        assert_eq!(regs.read(0x20), 0);
        regs.write(0x20, 0x1234);
        regs.inner_mut().poke(0x20, 0xFFFF);
        assert_eq!(regs.read(0x20), 0x1234);
        assert_eq!(regs.read_direct(0x20), 0xFFFF);
    }

    #[test]
    fn readable_shadow_refreshes_cache() {
        let mut hw = RegisterFile::new(0x100);
        hw.poke(0x20, 0xBEEF);
        let mut regs = Shadowed::new(hw, true);
        assert_eq!(regs.read(0x20), 0xBEEF);
        assert_eq!(regs.cached(0x20), Some(0xBEEF));
    }

    #[test]
    fn mmio_accesses_backing_words() {
        let mut words = [0u32; 4];
        let mut regs = unsafe { Mmio::new(words.as_mut_ptr(), 16) };
        regs.write(8, 0xAA55);
        assert_eq!(regs.read(8), 0xAA55);
        assert_eq!(regs.read(16), 0);
        regs.write(3, 1);
        drop(regs);
        assert_eq!(words[2], 0xAA55);
        assert_eq!(words[0], 0);
    }

}

// eof
