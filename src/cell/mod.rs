/*
* Copyright (C) 2019-2023 EverX. All Rights Reserved.
*
* Licensed under the SOFTWARE EVALUATION License (the "License"); you may not use
* this file except in compliance with the License.
*
* Unless required by applicable law or agreed to in writing, software
* distributed under the License is distributed on an "AS IS" BASIS,
* WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
* See the License for the specific EVERX DEV software governing permissions and
* limitations under the License.
*/

use crate::{error, fail, Sha256, types::{ExceptionCode, Result, UInt256}};
use sha2::Digest;
use smallvec::SmallVec;
use std::{
    cmp::min, collections::HashSet, convert::TryFrom, fmt::{self, Display, Formatter},
    ops::{BitOr, BitOrAssign}, sync::Arc
};

pub const SHA256_SIZE: usize = 32;
pub const DEPTH_SIZE: usize = 2;
pub const MAX_REFERENCES_COUNT: usize = 4;
pub const MAX_DATA_BITS: usize = 1023;
pub const MAX_DATA_BYTES: usize = 128; // including tag
pub const MAX_LEVEL: usize = 3;
pub const MAX_LEVEL_MASK: u8 = 7;
pub const MAX_DEPTH: u16 = 1024;

#[derive(Debug, Default, Eq, PartialEq, Clone, Copy, Hash)]
pub enum CellType {
    Unknown,
    #[default]
    Ordinary,
    PrunedBranch,
    LibraryReference,
    MerkleProof,
    MerkleUpdate,
}

impl CellType {
    pub fn is_exotic(&self) -> bool {
        *self != CellType::Ordinary
    }
}

/// Bitmask of levels which have their own hash and depth in the cell.
/// Bit `n` set means level `n + 1` is significant, level 0 always is.
#[derive(Debug, Default, Eq, PartialEq, Clone, Copy, Hash)]
pub struct LevelMask(u8);

impl LevelMask {
    pub const fn new() -> Self {
        LevelMask(0)
    }

    pub fn with_level(level: u8) -> Self {
        LevelMask(match level {
            0 => 0,
            1 => 1,
            2 => 3,
            3 => 7,
            _ => {
                log::error!("{} {}", file!(), line!());
                0
            }
        })
    }

    pub fn is_valid(mask: u8) -> bool {
        mask <= MAX_LEVEL_MASK
    }

    pub fn with_mask(mask: u8) -> Self {
        if Self::is_valid(mask) {
            LevelMask(mask)
        } else {
            log::error!("{} {}", file!(), line!());
            LevelMask(0)
        }
    }

    pub fn for_merkle_cell(children_mask: LevelMask) -> Self {
        LevelMask(children_mask.0 >> 1)
    }

    pub fn mask(&self) -> u8 {
        self.0
    }

    /// Number of the highest significant level (0..=3)
    pub fn level(&self) -> u8 {
        (u8::BITS - self.0.leading_zeros()) as u8
    }

    /// Position of the own hash among the cell's hashes: count of set bits
    pub fn hash_index(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn hash_count(&self) -> usize {
        self.hash_index() + 1
    }

    // rows - cell mask
    //       0(0)  1(1)  2(3)  3(7)  columns - level(projection)
    // 000     0     0     0     0
    // 001     0     1     1     1
    // 010     0     0     2     2
    // 011     0     1     3     3
    // 100     0     0     0     4
    // 101     0     1     1     5
    // 110     0     0     2     6
    // 111     0     1     3     7
    pub fn apply(&self, level: usize) -> Self {
        LevelMask(self.0 & LevelMask::with_level(min(level, MAX_LEVEL) as u8).0)
    }

    pub fn is_significant(&self, level: usize) -> bool {
        level == 0 || (level <= MAX_LEVEL && (self.0 >> (level - 1)) & 1 != 0)
    }
}

impl BitOr for LevelMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        LevelMask::with_mask(self.0 | rhs.0)
    }
}

impl BitOrAssign for LevelMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Display for LevelMask {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:03b}", self.0)
    }
}

impl TryFrom<u8> for CellType {
    type Error = failure::Error;
    fn try_from(num: u8) -> Result<CellType> {
        let typ = match num {
            1 => CellType::PrunedBranch,
            2 => CellType::LibraryReference,
            3 => CellType::MerkleProof,
            4 => CellType::MerkleUpdate,
            0xff => CellType::Ordinary,
            _ => fail!("Unknown cell type {}", num)
        };
        Ok(typ)
    }
}

impl From<CellType> for u8 {
    fn from(ct: CellType) -> u8 {
        match ct {
            CellType::Unknown => 0,
            CellType::Ordinary => 0xff,
            CellType::PrunedBranch => 1,
            CellType::LibraryReference => 2,
            CellType::MerkleProof => 3,
            CellType::MerkleUpdate => 4,
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match *self {
            CellType::Ordinary => "Ordinary",
            CellType::PrunedBranch => "Pruned branch",
            CellType::LibraryReference => "Library reference",
            CellType::MerkleProof => "Merkle proof",
            CellType::MerkleUpdate => "Merkle update",
            CellType::Unknown => "Unknown",
        };
        f.write_str(msg)
    }
}

/// Immutable cell contents together with hashes and depths calculated at construction
pub struct DataCell {
    cell_type: CellType,
    // bits are packed starting from the most significant one, unused tail bits are zero
    data: SmallVec<[u8; MAX_DATA_BYTES]>,
    bit_length: usize,
    references: SmallVec<[Cell; MAX_REFERENCES_COUNT]>,
    level_mask: LevelMask,
    hashes: SmallVec<[UInt256; 4]>,
    depths: SmallVec<[u16; 4]>,
}

impl DataCell {
    fn with_params(
        references: SmallVec<[Cell; MAX_REFERENCES_COUNT]>,
        data: &[u8],
        bit_length: usize,
        cell_type: CellType,
    ) -> Result<Self> {
        if data.len() * 8 < bit_length {
            fail!(ExceptionCode::FatalError)
        }
        let mut data = SmallVec::from_slice(&data[..(bit_length + 7) / 8]);
        let shift = bit_length % 8;
        if let (true, Some(last)) = (shift != 0, data.last_mut()) {
            *last &= 0xFF << (8 - shift);
        }
        let mut cell = DataCell {
            cell_type,
            data,
            bit_length,
            references,
            level_mask: LevelMask::new(),
            hashes: SmallVec::new(),
            depths: SmallVec::new(),
        };
        cell.level_mask = cell.check_structure()?;
        cell.finalize()?;
        Ok(cell)
    }

    fn empty() -> Self {
        DataCell {
            cell_type: CellType::Ordinary,
            data: SmallVec::new(),
            bit_length: 0,
            references: SmallVec::new(),
            level_mask: LevelMask::new(),
            hashes: SmallVec::from_slice(&[UInt256::DEFAULT_CELL_HASH]),
            depths: SmallVec::from_slice(&[0]),
        }
    }

    // Validates layout of the cell for its type and derives its level mask
    fn check_structure(&self) -> Result<LevelMask> {
        match self.cell_type {
            CellType::Ordinary => self.check_ordinary(),
            CellType::PrunedBranch => self.check_pruned_branch(),
            CellType::LibraryReference => self.check_library_reference(),
            CellType::MerkleProof => self.check_merkle_proof(),
            CellType::MerkleUpdate => self.check_merkle_update(),
            CellType::Unknown => fail!("Unknown cell type")
        }
    }

    fn check_ordinary(&self) -> Result<LevelMask> {
        if self.bit_length > MAX_DATA_BITS {
            fail!("Ordinary cell can't have more than {} bits, got {}", MAX_DATA_BITS, self.bit_length)
        }
        if self.references.len() > MAX_REFERENCES_COUNT {
            fail!("Ordinary cell can't have more than {} refs, got {}", MAX_REFERENCES_COUNT, self.references.len())
        }
        let mut mask = LevelMask::new();
        for child in self.references.iter() {
            mask |= child.level_mask();
        }
        Ok(mask)
    }

    fn check_pruned_branch(&self) -> Result<LevelMask> {
        // level_mask + reserved byte + hashes + depths
        if self.bit_length < 16 {
            fail!("Pruned branch cell can't have less than 16 bits, got {}", self.bit_length)
        }
        if !self.references.is_empty() {
            fail!("Pruned branch cell can't have refs, got {}", self.references.len())
        }
        let mask = self.data[0];
        if !LevelMask::is_valid(mask) {
            fail!("Pruned branch has an invalid level mask {:08b}", mask)
        }
        let mask = LevelMask(mask);
        let level = mask.level() as usize;
        if level == 0 || level > MAX_LEVEL {
            fail!("Pruned branch has an invalid level {}", level)
        }
        let expected = 8 * (1 + 1 + mask.apply(level - 1).hash_count() * (SHA256_SIZE + DEPTH_SIZE));
        if self.bit_length != expected {
            fail!("Pruned branch has an invalid data: {} bits, {} expected", self.bit_length, expected)
        }
        Ok(mask)
    }

    fn check_library_reference(&self) -> Result<LevelMask> {
        // type + hash
        if self.bit_length != 8 * (1 + SHA256_SIZE) {
            fail!("Library reference has an invalid data: {} bits, {} expected", self.bit_length, 8 * (1 + SHA256_SIZE))
        }
        if !self.references.is_empty() {
            fail!("Library reference has an invalid refs: {} != 0", self.references.len())
        }
        Ok(LevelMask::new())
    }

    fn check_merkle_proof(&self) -> Result<LevelMask> {
        // type + hash + depth
        if self.bit_length != 8 * (1 + SHA256_SIZE + DEPTH_SIZE) {
            fail!("Merkle Proof has an invalid data: {} bits, {} expected", self.bit_length, 8 * (1 + SHA256_SIZE + DEPTH_SIZE))
        }
        if self.references.len() != 1 {
            fail!("Merkle Proof has an invalid refs: {} != 1", self.references.len())
        }
        let child = &self.references[0];
        if self.data[1..1 + SHA256_SIZE] != child.hash(0).as_slice()[..] {
            fail!("Merkle Proof hash mismatch")
        }
        if self.read_depth(1 + SHA256_SIZE) != child.depth(0) {
            fail!("Merkle Proof depth mismatch")
        }
        Ok(LevelMask::for_merkle_cell(child.level_mask()))
    }

    fn check_merkle_update(&self) -> Result<LevelMask> {
        // type + 2 * hash + 2 * depth
        if self.bit_length != 8 * (1 + 2 * (SHA256_SIZE + DEPTH_SIZE)) {
            fail!("Merkle Update has an invalid data: {} bits, {} expected", self.bit_length, 8 * (1 + 2 * (SHA256_SIZE + DEPTH_SIZE)))
        }
        if self.references.len() != 2 {
            fail!("Merkle Update has an invalid refs: {} != 2", self.references.len())
        }
        for (i, child) in self.references.iter().enumerate() {
            let offset = 1 + i * SHA256_SIZE;
            if self.data[offset..offset + SHA256_SIZE] != child.hash(0).as_slice()[..] {
                fail!("Merkle Update ref #{} hash mismatch", i)
            }
        }
        for (i, child) in self.references.iter().enumerate() {
            if self.read_depth(1 + 2 * SHA256_SIZE + i * DEPTH_SIZE) != child.depth(0) {
                fail!("Merkle Update ref #{} depth mismatch", i)
            }
        }
        let children_mask = self.references[0].level_mask() | self.references[1].level_mask();
        Ok(LevelMask::for_merkle_cell(children_mask))
    }

    fn read_depth(&self, offset: usize) -> u16 {
        u16::from_be_bytes([self.data[offset], self.data[offset + 1]])
    }

    fn finalize(&mut self) -> Result<()> {
        let is_merkle_cell = self.is_merkle();
        let level_mask = self.level_mask;
        // Pruned branch keeps lower hashes in its data, only representation hash is calculated
        let hash_index_offset = if self.is_pruned() { level_mask.hash_count() - 1 } else { 0 };
        let mut hash_index = 0;
        for level_index in 0..=level_mask.level() as usize {
            if !level_mask.is_significant(level_index) {
                continue
            }
            if hash_index < hash_index_offset {
                hash_index += 1;
                continue
            }
            let level = level_index + is_merkle_cell as usize;
            let mut hasher = Sha256::new();

            // descr bytes
            hasher.update([
                calc_d1(level_mask.apply(level_index), self.cell_type, self.references.len()),
                calc_d2(self.bit_length),
            ]);

            // data or previous level hash
            if hash_index == hash_index_offset {
                hasher.update(self.augmented_data());
            } else {
                hasher.update(self.hashes[hash_index - hash_index_offset - 1].as_slice());
            }

            // depth
            let mut max_child_depth = None;
            for child in self.references.iter() {
                let child_depth = child.depth(level);
                max_child_depth = max_child_depth.max(Some(child_depth));
                hasher.update(child_depth.to_be_bytes());
            }
            let depth = match max_child_depth {
                Some(child_depth) if child_depth >= MAX_DEPTH => {
                    fail!("Cell depth can't be more than {}", MAX_DEPTH)
                }
                Some(child_depth) => child_depth + 1,
                None => 0
            };

            // hashes
            for child in self.references.iter() {
                hasher.update(child.hash(level).as_slice());
            }

            let hash: [u8; 32] = hasher.finalize().into();
            self.hashes.push(UInt256::with_array(hash));
            self.depths.push(depth);
            hash_index += 1;
        }
        Ok(())
    }

    fn is_merkle(&self) -> bool {
        matches!(self.cell_type, CellType::MerkleProof | CellType::MerkleUpdate)
    }

    fn is_pruned(&self) -> bool {
        self.cell_type == CellType::PrunedBranch
    }

    fn augmented_data(&self) -> SmallVec<[u8; MAX_DATA_BYTES]> {
        let mut data = self.data.clone();
        let shift = self.bit_length % 8;
        if let (true, Some(last)) = (shift != 0, data.last_mut()) {
            *last |= 0x80 >> shift;
        }
        data
    }

    fn hash(&self, level: usize) -> UInt256 {
        let hash_index = self.level_mask.apply(level).hash_index();
        if self.is_pruned() {
            let this_hash_index = self.level_mask.hash_index();
            if hash_index != this_hash_index {
                let offset = 2 + hash_index * SHA256_SIZE;
                return UInt256::from_be_bytes(&self.data[offset..offset + SHA256_SIZE])
            }
            return self.hashes[0]
        }
        self.hashes[hash_index]
    }

    fn depth(&self, level: usize) -> u16 {
        let hash_index = self.level_mask.apply(level).hash_index();
        if self.is_pruned() {
            let this_hash_index = self.level_mask.hash_index();
            if hash_index != this_hash_index {
                return self.read_depth(2 + this_hash_index * SHA256_SIZE + hash_index * DEPTH_SIZE)
            }
            return self.depths[0]
        }
        self.depths[hash_index]
    }
}

#[derive(Clone)]
pub struct Cell(Arc<DataCell>);

lazy_static::lazy_static!{
    pub(crate) static ref CELL_DEFAULT: Cell = Cell(Arc::new(DataCell::empty()));
}

impl Cell {
    /// Creates cell of given type, `data` holds at least `bit_length` bits
    pub fn with_params(
        references: Vec<Cell>,
        data: &[u8],
        bit_length: usize,
        cell_type: CellType,
    ) -> Result<Cell> {
        let references = SmallVec::from_vec(references);
        Ok(Cell(Arc::new(DataCell::with_params(references, data, bit_length, cell_type)?)))
    }

    pub fn with_bits(bits: &[bool], references: Vec<Cell>, cell_type: CellType) -> Result<Cell> {
        let mut data = vec![0u8; (bits.len() + 7) / 8];
        for (i, _) in bits.iter().enumerate().filter(|(_, bit)| **bit) {
            data[i / 8] |= 0x80 >> (i % 8);
        }
        Cell::with_params(references, &data, bits.len(), cell_type)
    }

    pub fn reference(&self, index: usize) -> Result<Cell> {
        self.0.references.get(index).cloned().ok_or_else(|| error!(ExceptionCode::CellUnderflow))
    }

    pub fn references(&self) -> &[Cell] {
        &self.0.references
    }

    pub fn references_count(&self) -> usize {
        self.0.references.len()
    }

    /// Data bytes without completion tag
    pub fn data(&self) -> &[u8] {
        &self.0.data
    }

    pub fn bit_length(&self) -> usize {
        self.0.bit_length
    }

    pub fn bits(&self) -> Vec<bool> {
        (0..self.bit_length())
            .map(|i| self.0.data[i / 8] & (0x80 >> (i % 8)) != 0)
            .collect()
    }

    pub fn cell_type(&self) -> CellType {
        self.0.cell_type
    }

    pub fn is_exotic(&self) -> bool {
        self.cell_type().is_exotic()
    }

    pub fn is_merkle(&self) -> bool {
        self.0.is_merkle()
    }

    pub fn is_pruned(&self) -> bool {
        self.0.is_pruned()
    }

    pub fn level_mask(&self) -> LevelMask {
        self.0.level_mask
    }

    pub fn level(&self) -> u8 {
        self.0.level_mask.level()
    }

    /// Returns cell's hash for given level (`MAX_LEVEL` - representation hash)
    pub fn hash(&self, level: usize) -> UInt256 {
        self.0.hash(level)
    }

    /// Returns cell's depth for given level
    pub fn depth(&self, level: usize) -> u16 {
        self.0.depth(level)
    }

    /// Returns hashes of all significant levels, representation one is the last
    pub fn hashes(&self) -> Vec<UInt256> {
        (0..=MAX_LEVEL)
            .filter(|level| self.level_mask().is_significant(*level))
            .map(|level| self.hash(level))
            .collect()
    }

    pub fn depths(&self) -> Vec<u16> {
        (0..=MAX_LEVEL)
            .filter(|level| self.level_mask().is_significant(*level))
            .map(|level| self.depth(level))
            .collect()
    }

    pub fn repr_hash(&self) -> UInt256 {
        self.0.hash(MAX_LEVEL)
    }

    pub fn repr_depth(&self) -> u16 {
        self.0.depth(MAX_LEVEL)
    }

    /// Refs descriptor byte as it goes to the representation of level `MAX_LEVEL`
    pub fn refs_descriptor(&self) -> u8 {
        calc_d1(self.level_mask(), self.cell_type(), self.references_count())
    }

    pub fn bits_descriptor(&self) -> u8 {
        calc_d2(self.bit_length())
    }

    /// Data with completion tag if the last byte is incomplete
    pub fn augmented_data(&self) -> SmallVec<[u8; MAX_DATA_BYTES]> {
        self.0.augmented_data()
    }

    /// Counts unique cells in the tree, fails if there are more than `max`
    pub fn count_cells(&self, max: usize) -> Result<usize> {
        let mut visited = HashSet::new();
        let mut queue = vec!(self.clone());
        while let Some(cell) = queue.pop() {
            if !visited.insert(cell.repr_hash()) {
                continue
            }
            if visited.len() > max {
                fail!("count exceeds max {}", max)
            }
            queue.extend(cell.references().iter().cloned());
        }
        Ok(visited.len())
    }

    /// Fift-hex representation of the bits: upper case, `_` marks a completion tag
    pub fn to_hex_string(&self) -> String {
        let mut data = self.0.data.clone();
        append_tag(&mut data, self.bit_length());
        to_hex_string(data, self.bit_length(), false)
    }

    /// Renders the tree in Fift-hex, each cell on its own line indented by depth
    pub fn print(&self, indent: usize) -> String {
        let mut result = String::new();
        self.print_to(&mut result, indent);
        result
    }

    fn print_to(&self, result: &mut String, indent: usize) {
        result.extend(std::iter::repeat(' ').take(indent));
        result.push_str("x{");
        result.push_str(&self.to_hex_string());
        result.push_str("}\n");
        for child in self.references() {
            child.print_to(result, indent + 1);
        }
    }

    pub fn to_fift(&self) -> String {
        self.print(0)
    }
}

impl Default for Cell {
    fn default() -> Self {
        CELL_DEFAULT.clone()
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Cell) -> bool {
        self.repr_hash() == other.repr_hash()
    }
}

impl PartialEq<UInt256> for Cell {
    fn eq(&self, other_hash: &UInt256) -> bool {
        &self.repr_hash() == other_hash
    }
}

impl Eq for Cell {}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:x}", self.repr_hash())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_fift())
    }
}

/// Calculates data's length in bits with respect to completion tag
pub fn find_tag(bitsting: &[u8]) -> usize {
    let mut length = bitsting.len() * 8;
    for x in bitsting.iter().rev() {
        if *x == 0 {
            length -= 8;
        } else {
            length -= 1 + x.trailing_zeros() as usize;
            break;
        }
    }
    length
}

/// Puts completion tag right after `bits` bits, a whole tag byte is added for aligned data
pub fn append_tag(data: &mut SmallVec<[u8; MAX_DATA_BYTES]>, bits: usize) {
    let shift = bits % 8;
    if shift == 0 || data.is_empty() {
        data.truncate(bits / 8);
        data.push(0x80);
    } else {
        data.truncate(1 + bits / 8);
        if let Some(last_byte) = data.last_mut() {
            *last_byte = (*last_byte & (0xFF << (8 - shift))) | (0x80 >> shift);
        }
    }
}

// Cell layout on the wire:
// [D1] [D2] [data: 0..128 bytes] (refs indexes)
// first byte is so called desription byte 1:
// | level mask| store hashes| exotic| refs count|
// |      7 6 5|            4|      3|      2 1 0|
pub(crate) const LEVELMASK_D1_OFFSET: usize = 5;
pub(crate) const HASHES_D1_FLAG: u8 = 16;
pub(crate) const EXOTIC_D1_FLAG: u8 = 8;
pub(crate) const REFS_D1_MASK: u8 = 7;
// next byte is desription byte 2 contains data size: ceil(bits / 8) + floor(bits / 8)

#[inline(always)]
pub(crate) fn calc_d1(level_mask: LevelMask, cell_type: CellType, refs_count: usize) -> u8 {
    (level_mask.mask() << LEVELMASK_D1_OFFSET) |
    (cell_type.is_exotic() as u8 * EXOTIC_D1_FLAG) |
    refs_count as u8
}

#[inline(always)]
pub(crate) fn calc_d2(data_bit_len: usize) -> u8 {
    ((data_bit_len / 8) << 1) as u8 + (data_bit_len % 8 != 0) as u8
}

pub(crate) fn to_hex_string(data: impl AsRef<[u8]>, len: usize, lower: bool) -> String {
    if len == 0 {
        return String::new();
    }
    let mut result = if lower {
        hex::encode(data)
    } else {
        hex::encode_upper(data)
    };
    match len % 8 {
        0 => {
            result.pop();
            result.pop();
        }
        1..=3 => {
            result.pop();
            result.push('_')
        }
        4 => {
            result.pop();
        }
        _ => result.push('_')
    }
    result
}

mod slice;

pub use self::slice::*;

pub mod builder;

pub use self::builder::*;

mod builder_operations;

pub use self::builder_operations::*;

#[cfg(test)]
#[path = "tests/test_cell.rs"]
mod tests;
