//! The symbol table (spec component G): a dual-sorted symbol/address index
//! consumed by ksim (to name scan/exec targets) and the JOP engine (to
//! resolve the kernel function a call strategy should invoke).
//!
//! The table owns two parallel arrays — `symbol[i]`/`address[i]` — plus two
//! permutations that keep them searchable without re-sorting the arrays
//! themselves: `sort_symbol` orders indices lexicographically by name,
//! `sort_address` orders indices numerically by address. `segment` bounds
//! the "guessed" size of whichever symbol is last in a loaded segment.

/// A loaded address range, used to bound the guessed size of the last
/// symbol within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: u64,
    pub end: u64,
}

/// A dual-sorted symbol/address index, built once from a Mach-O symbol
/// table and growable afterwards via [`SymbolTable::add_symbol`].
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbol: Vec<String>,
    address: Vec<u64>,
    sort_symbol: Vec<usize>,
    sort_address: Vec<usize>,
    segments: Vec<Segment>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Build from already-collected `(symbol, address)` pairs (standing in
    /// for `symbol_table_init_with_macho`'s `collect_symbol` pass — the
    /// Mach-O symtab walk itself is the Mach-O reader collaborator's job,
    /// out of scope here per spec.md §1).
    pub fn from_entries(entries: Vec<(String, u64)>, segments: Vec<Segment>) -> Self {
        let count = entries.len();
        let mut symbol = Vec::with_capacity(count);
        let mut address = Vec::with_capacity(count);
        for (name, addr) in entries {
            symbol.push(name);
            address.push(addr);
        }
        let sort_symbol = sorting_permutation(count, |a, b| symbol[a].cmp(&symbol[b]));
        let sort_address = sorting_permutation(count, |a, b| address[a].cmp(&address[b]));
        SymbolTable { symbol, address, sort_symbol, sort_address, segments }
    }

    pub fn len(&self) -> usize {
        self.symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbol.is_empty()
    }

    fn find_index_of_symbol(&self, name: &str) -> Result<usize, usize> {
        self.sort_symbol.binary_search_by(|&i| self.symbol[i].as_str().cmp(name))
    }

    fn find_index_of_address(&self, address: u64) -> Result<usize, usize> {
        self.sort_address.binary_search_by(|&i| self.address[i].cmp(&address))
    }

    fn segment_containing(&self, address: u64) -> Option<Segment> {
        self.segments.iter().copied().find(|s| s.start <= address && address < s.end)
    }

    /// The address of the next symbol after `address` (skipping any that
    /// share it), bounded by the end of the containing segment.
    fn symbol_end_address(&self, address: u64, segment_end: u64) -> u64 {
        let sort_index = match self.find_index_of_address(address.wrapping_add(1)) {
            Ok(i) => i,
            Err(i) => i,
        };
        if sort_index == self.sort_address.len() {
            return segment_end;
        }
        let next = self.address[self.sort_address[sort_index]];
        next.min(segment_end)
    }

    /// Resolve a symbol name to `(address, size)`. `size` is the distance
    /// to the start of the next symbol, bounded by the containing
    /// segment's end.
    pub fn resolve_symbol(&self, name: &str) -> Option<(u64, u64)> {
        let index = self.sort_symbol[self.find_index_of_symbol(name).ok()?];
        let start = self.address[index];
        let segment_end = self.segment_containing(start).map(|s| s.end);
        let size = segment_end.map(|end| self.symbol_end_address(start, end) - start).unwrap_or(0);
        Some((start, size))
    }

    /// Resolve an address to `(symbol, size, offset)`: the symbol at or
    /// before `address` within its containing segment, the symbol's
    /// guessed size, and `address`'s offset from the symbol's start.
    pub fn resolve_address(&self, address: u64) -> Option<(&str, u64, u64)> {
        let segment = self.segment_containing(address)?;
        let index = match self.find_index_of_address(address) {
            Ok(i) => self.sort_address[i],
            Err(insertion) => {
                if insertion == 0 {
                    return None;
                }
                self.sort_address[insertion - 1]
            }
        };
        let start = self.address[index];
        let size = self.symbol_end_address(address, segment.end) - start;
        Some((&self.symbol[index], size, address - start))
    }

    /// Insert a new symbol, keeping both sort permutations in order.
    /// Returns `false` (mirroring `symbol_table_add_symbol`'s
    /// already-present check) if `name` is already in the table.
    pub fn add_symbol(&mut self, name: impl Into<String>, address: u64) -> bool {
        let name = name.into();
        let sort_symbol_index = match self.find_index_of_symbol(&name) {
            Ok(_) => return false,
            Err(i) => i,
        };
        let count = self.symbol.len();
        self.symbol.push(name);
        self.address.push(address);
        self.sort_symbol.insert(sort_symbol_index, count);
        let sort_address_index = match self.find_index_of_address(address) {
            Ok(i) => i,
            Err(i) => i,
        };
        self.sort_address.insert(sort_address_index, count);
        true
    }
}

/// The permutation of `0..count` that sorts the underlying array under
/// `less`, used for both `sort_symbol` and `sort_address` at construction.
fn sorting_permutation(count: usize, mut less: impl FnMut(usize, usize) -> std::cmp::Ordering) -> Vec<usize> {
    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by(|&a, &b| less(a, b));
    order
}
