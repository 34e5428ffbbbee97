//! The gadget locator (spec component E): scans a Mach-O image's
//! executable segments for a fixed list of instruction-sequence patterns.

use std::sync::atomic::{AtomicBool, Ordering};

use itertools::Itertools;

use crate::error::MemctlError;

/// A single executable segment, as read from a Mach-O load command.
/// Implementors of [`ExecutableImage`] hand these out; this crate never
/// parses Mach-O itself (spec.md §1 — out of scope, interface only).
pub struct Segment<'a> {
    pub data: &'a [u8],
    pub vmaddr: u64,
    pub initprot: u32,
    pub maxprot: u32,
}

bitflags::bitflags! {
    /// VM protection bits, matching the `vm_prot_t` values Mach-O load
    /// commands carry for `initprot`/`maxprot`.
    pub struct Prot: u32 {
        const READ    = 0b001;
        const WRITE   = 0b010;
        const EXECUTE = 0b100;
    }
}

pub const PROT_READ: u32 = Prot::READ.bits;
pub const PROT_EXECUTE: u32 = Prot::EXECUTE.bits;

impl<'a> Segment<'a> {
    fn is_executable(&self) -> bool {
        let effective = Prot::from_bits_truncate(self.initprot & self.maxprot);
        effective.contains(Prot::READ | Prot::EXECUTE)
    }
}

/// The Mach-O reader collaborator (§6): enumerates the segments of an
/// image. A real implementation would parse load commands; tests use an
/// in-memory `Vec<Segment>`.
pub trait ExecutableImage {
    fn segments(&self) -> &[Segment<'_>];
}

/// A named instruction-sequence pattern to search for.
#[derive(Debug, Clone, Copy)]
pub struct GadgetPattern {
    pub name: &'static str,
    pub words: &'static [u32],
}

/// One gadget's resolution state: unresolved until [`GadgetTable::locate`]
/// finds its first match.
#[derive(Debug, Clone)]
struct GadgetEntry {
    pattern: GadgetPattern,
    address: Option<u64>,
}

/// The full set of gadgets the JOP engine is configured to look for, plus
/// their resolved (post-slide) addresses once located.
#[derive(Debug, Clone)]
pub struct GadgetTable {
    entries: Vec<GadgetEntry>,
}

impl GadgetTable {
    pub fn new(patterns: &[GadgetPattern]) -> Self {
        GadgetTable { entries: patterns.iter().map(|&pattern| GadgetEntry { pattern, address: None }).collect() }
    }

    pub fn address_of(&self, name: &str) -> Option<u64> {
        self.entries.iter().find(|e| e.pattern.name == name).and_then(|e| e.address)
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        self.address_of(name).is_some()
    }

    pub fn all_resolved(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.is_resolved(n))
    }

    fn all_found(&self) -> bool {
        self.entries.iter().all(|e| e.address.is_some())
    }

    /// Scan every executable segment of `image` for every unresolved
    /// gadget, aborting cleanly if `interrupted` becomes true. First match
    /// wins per gadget; later duplicate matches are ignored.
    pub fn locate(&mut self, image: &dyn ExecutableImage, slide: u64, interrupted: &AtomicBool) -> Result<(), MemctlError> {
        tracing::debug!(gadgets = self.entries.len(), slide, "gadget scan starting");
        for segment in image.segments() {
            if !segment.is_executable() {
                continue;
            }
            let words = segment.data.len() / 4;
            for i in 0..words {
                if i % 4096 == 0 && interrupted.load(Ordering::Relaxed) {
                    tracing::warn!(vmaddr = segment.vmaddr, offset = i, "gadget scan interrupted");
                    return Err(MemctlError::Interrupted);
                }
                if self.all_found() {
                    tracing::debug!("gadget scan found every pattern");
                    return Ok(());
                }
                for entry in self.entries.iter_mut().filter(|e| e.address.is_none()) {
                    let len = entry.pattern.words.len();
                    if len == 0 || i + len > words {
                        continue;
                    }
                    let candidate = word_slice(segment.data, i, len);
                    if candidate == entry.pattern.words {
                        entry.address = Some(segment.vmaddr + 4 * i as u64 + slide);
                        tracing::debug!(name = entry.pattern.name, address = entry.address, "gadget resolved");
                    }
                }
            }
        }
        if !self.all_found() {
            let missing = self.entries.iter().filter(|e| e.address.is_none()).map(|e| e.pattern.name).join(", ");
            tracing::debug!(missing = %missing, "gadget scan finished with unresolved patterns");
        }
        Ok(())
    }
}

fn word_slice(data: &[u8], start: usize, len: usize) -> Vec<u32> {
    (start..start + len)
        .map(|i| u32::from_le_bytes(data[4 * i..4 * i + 4].try_into().unwrap()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedImage<'a> {
        segments: Vec<Segment<'a>>,
    }

    impl<'a> ExecutableImage for FixedImage<'a> {
        fn segments(&self) -> &[Segment<'_>] {
            &self.segments
        }
    }

    #[test]
    fn locates_single_word_gadget() {
        let mut code = vec![0u8; 16];
        code[8..12].copy_from_slice(&0xd65f_03c0u32.to_le_bytes());
        let image = FixedImage {
            segments: vec![Segment { data: &code, vmaddr: 0x1000, initprot: PROT_READ | PROT_EXECUTE, maxprot: PROT_READ | PROT_EXECUTE }],
        };
        let mut table = GadgetTable::new(&[GadgetPattern { name: "RET", words: &[0xd65f_03c0] }]);
        table.locate(&image, 0x500, &AtomicBool::new(false)).unwrap();
        assert_eq!(table.address_of("RET"), Some(0x1000 + 8 + 0x500));
    }

    #[test]
    fn skips_non_executable_segments() {
        let mut code = vec![0u8; 8];
        code[0..4].copy_from_slice(&0xd65f_03c0u32.to_le_bytes());
        let image = FixedImage { segments: vec![Segment { data: &code, vmaddr: 0x2000, initprot: PROT_READ, maxprot: PROT_READ }] };
        let mut table = GadgetTable::new(&[GadgetPattern { name: "RET", words: &[0xd65f_03c0] }]);
        table.locate(&image, 0, &AtomicBool::new(false)).unwrap();
        assert_eq!(table.address_of("RET"), None);
    }

    #[test]
    fn first_match_wins() {
        let mut code = vec![0u8; 16];
        code[0..4].copy_from_slice(&0xd65f_03c0u32.to_le_bytes());
        code[12..16].copy_from_slice(&0xd65f_03c0u32.to_le_bytes());
        let image = FixedImage {
            segments: vec![Segment { data: &code, vmaddr: 0x3000, initprot: PROT_READ | PROT_EXECUTE, maxprot: PROT_READ | PROT_EXECUTE }],
        };
        let mut table = GadgetTable::new(&[GadgetPattern { name: "RET", words: &[0xd65f_03c0] }]);
        table.locate(&image, 0, &AtomicBool::new(false)).unwrap();
        assert_eq!(table.address_of("RET"), Some(0x3000));
    }

    #[rstest::rstest]
    #[case(PROT_READ | PROT_EXECUTE, PROT_READ | PROT_EXECUTE, true)]
    #[case(PROT_READ | PROT_EXECUTE, PROT_READ, false)]
    #[case(PROT_READ, PROT_READ | PROT_EXECUTE, false)]
    #[case(PROT_EXECUTE, PROT_EXECUTE, false)]
    #[case(0, PROT_READ | PROT_EXECUTE, false)]
    #[case(Prot::all().bits, Prot::all().bits, true)]
    fn segment_is_executable_needs_read_and_execute_in_both_masks(
        #[case] initprot: u32,
        #[case] maxprot: u32,
        #[case] expected: bool,
    ) {
        let segment = Segment { data: &[], vmaddr: 0, initprot, maxprot };
        assert_eq!(segment.is_executable(), expected);
    }
}
