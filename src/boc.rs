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

use std::{
    collections::{HashMap, HashSet},
    io::{Cursor, Write},
};

use crc::{Crc, CRC_32_ISCSI, Digest};
const CASTAGNOLI: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

use crate::{
    cell::{BuilderData, Cell, CellType, DEPTH_SIZE, find_tag, LevelMask, MAX_DATA_BYTES, MAX_REFERENCES_COUNT, SHA256_SIZE},
    base64_decode, base64_encode, ByteOrderRead, error, fail, parse_slice_base, Result, UInt256,
};

const BOC_INDEXED_TAG: u32 = 0x68ff65f3; // lean, is used only for read
const BOC_INDEXED_CRC32_TAG: u32 = 0xacc3a728; // lean, is used only for read
const BOC_GENERIC_TAG: u32 = 0xb5ee9c72;

const MAX_ROOTS_COUNT: usize = 1024;

/// Order in which cells are laid out, parents always precede their children
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TopologicalOrder {
    #[default]
    BreadthFirst,
    DepthFirst,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BocOptions {
    pub include_index: bool,
    pub include_crc: bool,
    pub cache_bits: bool,
    pub order: TopologicalOrder,
}

impl Default for BocOptions {
    fn default() -> Self {
        BocOptions {
            include_index: false,
            include_crc: true,
            cache_bits: false,
            order: TopologicalOrder::BreadthFirst,
        }
    }
}

pub struct BocWriter {
    cells: Vec<Cell>,
    indexes: HashMap<UInt256, usize>,
    roots_indexes: Vec<usize>,
}

pub fn write_boc(root_cell: &Cell) -> Result<Vec<u8>> {
    write_boc_ex(std::slice::from_ref(root_cell), &BocOptions::default())
}

pub fn write_boc_ex(root_cells: &[Cell], options: &BocOptions) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    BocWriter::with_params(root_cells.iter().cloned(), options.order)?.write_ex(&mut buf, options)?;
    Ok(buf)
}

pub fn write_boc_base64(root_cell: &Cell) -> Result<String> {
    Ok(base64_encode(write_boc(root_cell)?))
}

impl BocWriter {
    pub fn with_root(root_cell: &Cell) -> Result<Self> {
        Self::with_roots([root_cell.clone()])
    }

    pub fn with_roots(root_cells: impl IntoIterator<Item = Cell>) -> Result<Self> {
        Self::with_params(root_cells, TopologicalOrder::default())
    }

    pub fn with_params(root_cells: impl IntoIterator<Item = Cell>, order: TopologicalOrder) -> Result<Self> {
        #[cfg(not(target_family = "wasm"))]
        let now = std::time::Instant::now();
        let mut boc = BocWriter {
            cells: Vec::new(),
            indexes: HashMap::new(),
            roots_indexes: Vec::new(),
        };
        let mut roots = Vec::new();
        let mut roots_set = HashSet::new();
        for root_cell in root_cells {
            if !roots_set.insert(root_cell.repr_hash()) {
                fail!("roots must be all unique")
            }
            boc.append(root_cell.clone());
            roots.push(root_cell);
        }
        if roots.is_empty() {
            fail!("there must be at least one root cell")
        }
        match order {
            TopologicalOrder::BreadthFirst => boc.breadth_first_sort(roots.clone()),
            TopologicalOrder::DepthFirst => boc.depth_first_sort(&roots),
        }
        for root in roots.iter() {
            let index = boc.index_of(root)?;
            boc.roots_indexes.push(index);
        }
        boc.check_order()?;
        #[cfg(not(target_family = "wasm"))]
        log::trace!("TIME BocWriter::with_params: {}ms, cells: {}", now.elapsed().as_millis(), boc.cells.len());
        Ok(boc)
    }

    pub fn roots_count(&self) -> usize {
        self.roots_indexes.len()
    }

    pub fn cells_count(&self) -> usize {
        self.cells.len()
    }

    fn index_of(&self, cell: &Cell) -> Result<usize> {
        self.indexes.get(&cell.repr_hash()).copied()
            .ok_or_else(|| error!("cell {:x} is not in the bag", cell.repr_hash()))
    }

    fn append(&mut self, cell: Cell) {
        self.indexes.insert(cell.repr_hash(), self.cells.len());
        self.cells.push(cell);
    }

    // moves already known cell to the end so it goes after its new parent
    fn reappend(&mut self, index: usize) {
        let cell = self.cells.remove(index);
        self.cells.push(cell);
        for (i, cell) in self.cells.iter().enumerate().skip(index) {
            self.indexes.insert(cell.repr_hash(), i);
        }
    }

    fn process(&mut self, cell: &Cell) {
        match self.indexes.get(&cell.repr_hash()).copied() {
            Some(index) => self.reappend(index),
            None => self.append(cell.clone()),
        }
    }

    fn breadth_first_sort(&mut self, roots: Vec<Cell>) {
        let mut level = roots;
        while !level.is_empty() {
            let mut next_level = Vec::new();
            for cell in level.iter() {
                for child in cell.references() {
                    self.process(child);
                    next_level.push(child.clone());
                }
            }
            level = next_level;
        }
    }

    fn depth_first_sort(&mut self, roots: &[Cell]) {
        for root in roots {
            let mut stack = vec![(root.clone(), 0)];
            while let Some((cell, scanned)) = stack.last_mut() {
                if *scanned == cell.references_count() {
                    stack.pop();
                    continue
                }
                let child = cell.references()[*scanned].clone();
                *scanned += 1;
                self.process(&child);
                stack.push((child, 0));
            }
        }
    }

    fn check_order(&self) -> Result<()> {
        for (index, cell) in self.cells.iter().enumerate() {
            for child in cell.references() {
                if self.index_of(child)? <= index {
                    fail!("Topological order is broken")
                }
            }
        }
        Ok(())
    }

    pub fn write<T: Write>(self, dest: &mut T) -> Result<()> {
        self.write_ex(dest, &BocOptions::default())
    }

    pub fn write_ex<T: Write>(self, dest: &mut T, options: &BocOptions) -> Result<()> {
        if options.include_crc {
            let mut dest_wrapped = IoCrcFilter::new_writer(dest);
            self.write_ex_impl(&mut dest_wrapped, options)?;
            dest_wrapped.finalize()
        } else {
            self.write_ex_impl(dest, options)
        }
    }

    fn write_ex_impl<T: Write>(&self, dest: &mut T, options: &BocOptions) -> Result<()> {
        if options.cache_bits && !options.include_index {
            fail!("cache bits can be used only with index")
        }
        let ref_size = Self::number_of_bytes_to_fit(self.cells.len());
        let mut cells_data = Vec::new();
        let mut index = Vec::with_capacity(self.cells.len());
        for cell in self.cells.iter() {
            cells_data.push(cell.refs_descriptor());
            cells_data.push(cell.bits_descriptor());
            cells_data.extend_from_slice(&cell.augmented_data());
            for child in cell.references() {
                let child_index = self.index_of(child)?;
                cells_data.extend_from_slice(&(child_index as u64).to_be_bytes()[(8 - ref_size)..]);
            }
            index.push(cells_data.len());
        }
        let total_cells_size = cells_data.len();
        let offset_size = Self::number_of_bytes_to_fit(total_cells_size << options.cache_bits as usize);

        // magic
        dest.write_all(&BOC_GENERIC_TAG.to_be_bytes())?;

        // has index | has CRC | has cache bits | flags   | ref_size
        // 7         | 6       | 5              | 4 3     | 2 1 0
        dest.write_all(&[
            (options.include_index as u8) << 7 |
            (options.include_crc as u8) << 6 |
            (options.cache_bits as u8) << 5 |
            ref_size as u8
        ])?;

        dest.write_all(&[offset_size as u8])?; // off_bytes:(## 8) { off_bytes <= 8 }
        dest.write_all(&(self.cells.len() as u64).to_be_bytes()[(8 - ref_size)..])?;
        dest.write_all(&(self.roots_count() as u64).to_be_bytes()[(8 - ref_size)..])?;
        dest.write_all(&0_u64.to_be_bytes()[(8 - ref_size)..])?;
        dest.write_all(&(total_cells_size as u64).to_be_bytes()[(8 - offset_size)..])?;

        // root_list
        for root_index in self.roots_indexes.iter() {
            dest.write_all(&(*root_index as u64).to_be_bytes()[(8 - ref_size)..])?;
        }

        // index of cumulative offsets
        if options.include_index {
            for offset in index {
                let offset = (offset as u64) << options.cache_bits as usize;
                dest.write_all(&offset.to_be_bytes()[(8 - offset_size)..])?;
            }
        }

        dest.write_all(&cells_data)?;
        Ok(())
    }

    fn number_of_bytes_to_fit(l: usize) -> usize {
        let mut n = 0;
        let mut l1 = l;

        while l1 != 0 {
            l1 >>= 8;
            n += 1;
        }

        n.max(1)
    }
}

#[derive(Clone, Debug)]
pub struct RawCell {
    pub cell_type: CellType,
    pub data: Vec<u8>,
    pub bit_length: usize,
    pub refs: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BocHeader {
    pub magic: u32,
    pub roots_count: usize,
    pub ref_size: usize,
    pub index_included: bool,
    pub cells_count: usize,
    pub offset_size: usize,
    pub has_crc: bool,
    pub has_cache_bits: bool,
    pub roots_indexes: Vec<usize>,
    pub tot_cells_size: usize,
}

pub struct BocReaderResult {
    pub roots: Vec<Cell>,
    pub header: BocHeader,
}

impl BocReaderResult {
    pub fn withdraw_single_root(mut self) -> Result<Cell> {
        match self.roots.len() {
            0 => fail!("Error parsing cells tree: empty root"),
            1 => Ok(self.roots.remove(0)),
            r => fail!("Error parsing cells tree: too many roots {}", r)
        }
    }
}

pub struct BocReader {
    max_roots: usize,
}

impl Default for BocReader {
    fn default() -> Self {
        BocReader { max_roots: MAX_ROOTS_COUNT }
    }
}

pub fn read_boc(data: impl AsRef<[u8]>) -> Result<BocReaderResult> {
    BocReader::new().read(data.as_ref())
}

pub fn read_single_root_boc(data: impl AsRef<[u8]>) -> Result<Cell> {
    read_boc(data)?.withdraw_single_root()
}

pub fn read_boc_base64(data: &str) -> Result<BocReaderResult> {
    read_boc(base64_decode(data)?)
}

// Fails with `msg` if less than `len` bytes left after cursor position
fn check_len(src: &Cursor<&[u8]>, len: usize, msg: &str) -> Result<()> {
    let left = src.get_ref().len().saturating_sub(src.position() as usize);
    if left < len {
        fail!("{}: {} bytes left, {} needed", msg, left, len)
    }
    Ok(())
}

impl BocReader {
    pub fn new() -> Self { Self::default() }

    pub fn set_max_roots(mut self, max_roots: usize) -> Self {
        self.max_roots = max_roots;
        self
    }

    pub fn read(self, data: &[u8]) -> Result<BocReaderResult> {
        #[cfg(not(target_family = "wasm"))]
        let now = std::time::Instant::now();
        let mut src = Cursor::new(data);

        let header = self.read_header(&mut src)?;
        let cells_start = src.position() as usize;
        let cells_end = cells_start + header.tot_cells_size;

        if header.has_crc {
            check_len(&src, header.tot_cells_size + 4, "Not enough bytes for crc32c hashsum")?;
            let crc = CASTAGNOLI.checksum(&data[..cells_end]);
            let read_crc = Cursor::new(&data[cells_end..]).read_le_u32()?;
            if read_crc != crc {
                fail!("Crc32c hashsum mismatch: {:08x} != {:08x}", read_crc, crc)
            }
        }
        let total_len = cells_end + header.has_crc as usize * 4;
        if data.len() > total_len {
            fail!("Too much bytes in BoC serialization: {} > {}", data.len(), total_len)
        }

        #[cfg(not(target_family = "wasm"))]
        let now1 = std::time::Instant::now();
        let mut cells_src = Cursor::new(&data[cells_start..cells_end]);
        let mut raw_cells = Vec::with_capacity(header.cells_count);
        for cell_index in 0..header.cells_count {
            raw_cells.push(Self::read_raw_cell(&mut cells_src, header.ref_size, cell_index, header.cells_count)?);
        }
        if cells_src.position() as usize != header.tot_cells_size {
            fail!("BoC cells data size mismatch: {} bytes read, {} declared",
                cells_src.position(), header.tot_cells_size)
        }
        #[cfg(not(target_family = "wasm"))]
        let reading_time = now1.elapsed().as_millis();

        // Resolving references & constructing cells from leaves to roots
        #[cfg(not(target_family = "wasm"))]
        let now1 = std::time::Instant::now();
        let mut done_cells: Vec<Option<Cell>> = vec![None; header.cells_count];
        for (cell_index, raw_cell) in raw_cells.into_iter().enumerate().rev() {
            let mut refs = Vec::with_capacity(raw_cell.refs.len());
            for ref_index in raw_cell.refs {
                let child = done_cells[ref_index].clone().ok_or_else(|| error!("Topological order is broken"))?;
                refs.push(child);
            }
            let cell = Cell::with_params(refs, &raw_cell.data, raw_cell.bit_length, raw_cell.cell_type)?;
            done_cells[cell_index] = Some(cell);
        }
        #[cfg(not(target_family = "wasm"))]
        let constructing_time = now1.elapsed().as_millis();

        let mut roots = Vec::with_capacity(header.roots_count);
        for index in header.roots_indexes.iter() {
            roots.push(done_cells[*index].clone().ok_or_else(|| error!("Invalid root index {}", index))?);
        }

        #[cfg(not(target_family = "wasm"))]
        log::trace!(
            "TIME read_boc: {}ms (reading cells: {}, creating cells: {}), cells: {}",
            now.elapsed().as_millis(), reading_time, constructing_time, header.cells_count
        );

        Ok(BocReaderResult {
            roots,
            header,
        })
    }

    fn read_header(&self, src: &mut Cursor<&[u8]>) -> Result<BocHeader> {
        check_len(src, 4 + 1, "Not enough bytes for magic prefix")?;
        let magic = src.read_be_u32()?;
        let first_byte = src.read_byte()?;
        let index_included;
        let mut has_crc = false;
        let ref_size;
        let mut has_cache_bits = false;

        match magic {
            BOC_INDEXED_TAG => {
                ref_size = first_byte as usize;
                index_included = true;
            },
            BOC_INDEXED_CRC32_TAG => {
                ref_size = first_byte as usize;
                index_included = true;
                has_crc = true;
            },
            BOC_GENERIC_TAG => {
                index_included = first_byte & 0b1000_0000 != 0;
                has_crc = first_byte & 0b0100_0000 != 0;
                has_cache_bits = first_byte & 0b0010_0000 != 0;
                let flags = (first_byte & 0b0001_1000) >> 3;
                if flags != 0 {
                    fail!("non-zero flags field is not supported")
                }
                ref_size = (first_byte & 0b0000_0111) as usize;
            },
            _ => fail!("Bad magic prefix {:08x}", magic)
        };

        if has_cache_bits && !index_included {
            fail!("invalid header: cache bits without index")
        }

        if ref_size == 0 || ref_size > 4 {
            fail!("ref size has to be more than 0 and less or equal 4, actual value: {}", ref_size)
        }

        check_len(src, 1, "Not enough bytes for encoding cells counters")?;
        let offset_size = src.read_byte()? as usize;
        if offset_size == 0 || offset_size > 8 {
            fail!("offset size has to be more than 0 and less or equal 8, actual value: {}", offset_size)
        }

        check_len(src, 3 * ref_size + offset_size, "Not enough bytes for encoding cells counters")?;
        let cells_count = src.read_be_uint(ref_size)?; // cells:(##(size * 8))
        let roots_count = src.read_be_uint(ref_size)?; // roots:(##(size * 8))
        let absent_count = src.read_be_uint(ref_size)?; // absent:(##(size * 8)) { roots + absent <= cells }
        let tot_cells_size = src.read_be_uint(offset_size)?; // tot_cells_size:(##(off_bytes * 8))

        if cells_count == 0 {
            fail!("cell count is zero")
        }
        if roots_count == 0 {
            fail!("root cell count is zero")
        }
        if roots_count > self.max_roots {
            fail!("too many roots {}, maximum is {}", roots_count, self.max_roots)
        }
        if magic != BOC_GENERIC_TAG && roots_count > 1 {
            fail!("roots count has to be 1 for lean BoC, actual value: {}", roots_count)
        }
        if roots_count + absent_count > cells_count {
            fail!("roots count + absent count has to be less or equal than cells count, roots: {}, \
                absent: {}, cells: {}", roots_count, absent_count, cells_count);
        }
        if absent_count != 0 {
            fail!("absent cells are not supported")
        }

        let max_cell_size =
            2 + // descr bytes
            4 * (DEPTH_SIZE + SHA256_SIZE) + // stored hashes & depths
            MAX_DATA_BYTES +
            MAX_REFERENCES_COUNT * ref_size;
        let min_cell_size = 2; // descr bytes only
        // every cell except roots is referenced at least once
        let tot_cells_size_minimal = cells_count.saturating_mul(min_cell_size + ref_size) - ref_size * roots_count;
        if tot_cells_size < tot_cells_size_minimal {
            fail!("tot_cells_size ({}) is too small with respect to cells_count ({})", tot_cells_size, cells_count)
        }
        if tot_cells_size > cells_count.saturating_mul(max_cell_size) {
            fail!("tot_cells_size ({}) is too big with respect to cells_count ({})", tot_cells_size, cells_count)
        }

        let roots_indexes = if magic == BOC_GENERIC_TAG {
            // root_list:(roots * ##(size * 8))
            check_len(src, roots_count * ref_size, "Not enough bytes for encoding root cells hashes")?;
            let mut roots_indexes = Vec::with_capacity(roots_count);
            for _ in 0..roots_count {
                let index = src.read_be_uint(ref_size)?;
                if index >= cells_count {
                    fail!("Invalid root index {} (greater than cells count {})", index, cells_count);
                }
                roots_indexes.push(index);
            }
            roots_indexes
        } else {
            vec![0]
        };

        if index_included {
            // cumulative offsets are not needed to read cells sequentially
            check_len(src, cells_count * offset_size, "Not enough bytes for index encoding")?;
            src.set_position(src.position() + (cells_count * offset_size) as u64);
        }

        check_len(src, tot_cells_size, "Not enough bytes for cells data")?;

        Ok(BocHeader {
            magic,
            roots_count,
            ref_size,
            index_included,
            cells_count,
            offset_size,
            has_crc,
            has_cache_bits,
            roots_indexes,
            tot_cells_size,
        })
    }

    fn read_raw_cell(
        src: &mut Cursor<&[u8]>,
        ref_size: usize,
        cell_index: usize,
        cells_count: usize,
    ) -> Result<RawCell> {
        check_len(src, 2, "BoC not enough bytes to encode cell descriptors")?;
        let d1 = src.read_byte()?;
        let level_mask = LevelMask::with_mask(d1 >> 5);
        let refs_count = (d1 & 7) as usize;
        let has_hashes = d1 & 16 != 0;
        let is_exotic = d1 & 8 != 0;
        if refs_count == 7 && has_hashes {
            fail!("BoC can't deserialize absent cell")
        }
        if refs_count > MAX_REFERENCES_COUNT {
            fail!("BoC cell can't have more than {} refs, got {}", MAX_REFERENCES_COUNT, refs_count)
        }

        let d2 = src.read_byte()?;
        let is_augmented = d2 & 1 != 0;
        let data_size = (d2 >> 1) as usize + is_augmented as usize;
        let hashes_count = match has_hashes {
            false => 0,
            // pruned branch keeps only representation hash
            true if is_exotic && refs_count == 0 && level_mask.mask() != 0 => 1,
            true => level_mask.hash_count(),
        };
        let hashes_size = hashes_count * (SHA256_SIZE + DEPTH_SIZE);
        check_len(src, hashes_size + data_size + ref_size * refs_count, "BoC not enough bytes to encode cell data")?;
        src.set_position(src.position() + hashes_size as u64);

        let start = src.position() as usize;
        let data = src.get_ref()[start..start + data_size].to_vec();
        src.set_position((start + data_size) as u64);

        let bit_length = if is_augmented {
            if data.last() == Some(&0) {
                fail!("BoC cell #{} has incorrectly augmented bits", cell_index)
            }
            find_tag(&data)
        } else {
            data_size * 8
        };

        let cell_type = if is_exotic {
            if bit_length < 8 {
                fail!("BoC not enough bytes for an exotic cell type")
            }
            let cell_type = CellType::try_from(data[0])?;
            if cell_type == CellType::Ordinary {
                fail!("BoC an exotic cell can't be of ordinary type")
            }
            cell_type
        } else {
            CellType::Ordinary
        };

        let mut refs = Vec::with_capacity(refs_count);
        for _ in 0..refs_count {
            let r = src.read_be_uint(ref_size)?;
            if r <= cell_index {
                fail!("Topological order is broken: cell #{} refers to #{}", cell_index, r)
            }
            if r >= cells_count {
                fail!("reference out of range, cells_count: {}, ref: {}, cell_index: {}", cells_count, r, cell_index)
            }
            refs.push(r);
        }
        Ok(RawCell { cell_type, data, bit_length, refs })
    }
}

/// Parses Fift-hex dump like `x{A7_}` with one space indent per tree level, returns all roots
pub fn read_fift(data: &str) -> Result<Vec<Cell>> {
    if data.trim().is_empty() {
        fail!("Empty fift hex")
    }
    let mut stack: Vec<(usize, BuilderData)> = Vec::new();
    let mut roots = Vec::new();
    let mut parsed = 0;
    for line in data.lines() {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        let hex = match trimmed.trim_end().strip_prefix("x{").and_then(|s| s.strip_suffix('}')) {
            Some(hex) => hex,
            None => {
                if !trimmed.is_empty() {
                    log::warn!("skipping bad fift hex line: {}", line);
                }
                continue
            }
        };
        let bitstring = parse_slice_base(hex, 0, 16).ok_or_else(|| error!("Bad fift hex: {}", line))?;
        let builder = BuilderData::with_bitstring(bitstring)?;
        close_fift_nodes(&mut stack, &mut roots, indent)?;
        stack.push((indent, builder));
        parsed += 1;
    }
    if parsed == 0 {
        fail!("Bad fift hex")
    }
    close_fift_nodes(&mut stack, &mut roots, 0)?;
    Ok(roots)
}

// finalizes all nodes indented not less than `indent` and attaches them to parents
fn close_fift_nodes(stack: &mut Vec<(usize, BuilderData)>, roots: &mut Vec<Cell>, indent: usize) -> Result<()> {
    while stack.last().map_or(false, |(top, _)| *top >= indent) {
        if let Some((_, builder)) = stack.pop() {
            let cell = builder.into_cell()?;
            match stack.last_mut() {
                Some((_, parent)) => { parent.store_ref(cell)?; }
                None => roots.push(cell),
            }
        }
    }
    Ok(())
}

/// Wraps I/O operations and computes CRC32-C of the data being processed
struct IoCrcFilter<'a, T> {
    io_object: &'a mut T,
    hasher: Digest<'a, u32>
}

impl<'a, T: Write> IoCrcFilter<'a, T> {
    pub fn new_writer(io_object: &'a mut T) -> Self {
        IoCrcFilter {
            io_object,
            hasher: CASTAGNOLI.digest()
        }
    }

    pub fn finalize(self) -> Result<()> {
        let crc = self.hasher.finalize();
        self.io_object.write_all(&crc.to_le_bytes())?;
        Ok(())
    }
}

impl<'a, T> Write for IoCrcFilter<'a, T> where T: Write {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.io_object.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.io_object.flush()
    }
}

#[cfg(test)]
#[path = "tests/test_boc.rs"]
mod tests;
