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

use std::fmt;

use crate::fail;
use crate::cell::{Cell, CellType, find_tag, MAX_DATA_BITS, SliceData};
use crate::types::{ExceptionCode, Result};

const EXACT_CAPACITY: usize = 128;

/// Append-only accumulator of bits and references which is finalized into a `Cell`
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct BuilderData {
    data: Vec<u8>,
    length_in_bits: usize,
    references: Vec<Cell>,
    cell_type: CellType,
    capacity: usize,
}

impl Default for BuilderData {
    fn default() -> Self {
        BuilderData::new()
    }
}

impl BuilderData {
    pub const fn new() -> Self {
        Self::with_capacity(MAX_DATA_BITS)
    }

    /// Builder which accepts up to `capacity` bits
    pub const fn with_capacity(capacity: usize) -> Self {
        BuilderData {
            data: Vec::new(),
            length_in_bits: 0,
            references: Vec::new(),
            cell_type: CellType::Ordinary,
            capacity,
        }
    }

    pub fn with_raw(data: impl AsRef<[u8]>, length_in_bits: usize) -> Result<BuilderData> {
        let mut builder = BuilderData::new();
        builder.data.reserve_exact(EXACT_CAPACITY);
        builder.append_raw(data.as_ref(), length_in_bits)?;
        Ok(builder)
    }

    pub fn with_raw_and_refs<TRefs>(data: impl AsRef<[u8]>, length_in_bits: usize, refs: TRefs) -> Result<BuilderData>
    where
        TRefs: IntoIterator<Item = Cell>
    {
        let mut builder = BuilderData::with_raw(data, length_in_bits)?;
        for value in refs {
            builder.checked_append_reference(value)?;
        }
        Ok(builder)
    }

    /// Creates builder from bitstring terminated with completion tag
    pub fn with_bitstring(data: impl AsRef<[u8]>) -> Result<BuilderData> {
        let data = data.as_ref();
        BuilderData::with_raw(data, find_tag(data))
    }

    pub fn from_cell(cell: &Cell) -> Result<BuilderData> {
        let mut builder = BuilderData::with_raw_and_refs(
            cell.data(),
            cell.bit_length(),
            cell.references().iter().cloned()
        )?;
        builder.cell_type = cell.cell_type();
        Ok(builder)
    }

    pub fn from_slice(slice: &SliceData) -> Result<BuilderData> {
        let mut builder = BuilderData::new();
        builder.append_raw(&slice.get_bytestring(0), slice.remaining_bits())?;
        for i in 0..slice.remaining_references() {
            builder.checked_append_reference(slice.reference(i)?)?;
        }
        Ok(builder)
    }

    /// Finalizes builder into a cell of the type set by `set_type` (ordinary by default)
    pub fn into_cell(self) -> Result<Cell> {
        Cell::with_params(self.references, &self.data, self.length_in_bits, self.cell_type)
    }

    pub fn references(&self) -> &[Cell] {
        self.references.as_slice()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn length_in_bits(&self) -> usize {
        self.length_in_bits
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    pub fn set_type(&mut self, cell_type: CellType) {
        self.cell_type = cell_type;
    }

    pub fn is_empty(&self) -> bool {
        self.length_in_bits() == 0 && self.references().is_empty()
    }

    pub(crate) fn check_bits_overflow(&self, bits: usize) -> Result<()> {
        if bits > self.bits_free() {
            fail!(ExceptionCode::CellOverflow)
        }
        Ok(())
    }

    pub(crate) fn check_refs_overflow(&self, count: usize) -> Result<()> {
        if count > self.references_free() {
            fail!(ExceptionCode::CellOverflow)
        }
        Ok(())
    }

    /// Appends first `bits` bits of `slice`, bits are counted from the most significant one
    pub fn append_raw(&mut self, slice: &[u8], bits: usize) -> Result<&mut Self> {
        if slice.len() * 8 < bits {
            fail!(ExceptionCode::FatalError)
        }
        self.check_bits_overflow(bits)?;
        if bits == 0 {
            return Ok(self)
        }
        let slice = &slice[..(bits + 7) / 8];
        let shift = self.length_in_bits % 8;
        if shift == 0 {
            self.data.extend_from_slice(slice);
        } else {
            // last byte has `shift` bits in use and zeros after them
            for byte in slice {
                if let Some(last_byte) = self.data.last_mut() {
                    *last_byte |= byte >> shift;
                }
                self.data.push(byte << (8 - shift));
            }
        }
        self.length_in_bits += bits;
        self.data.truncate((self.length_in_bits + 7) / 8);
        let tail = self.length_in_bits % 8;
        if let (true, Some(last_byte)) = (tail != 0, self.data.last_mut()) {
            *last_byte &= 0xFF << (8 - tail);
        }
        Ok(self)
    }

    pub fn checked_append_reference(&mut self, cell: Cell) -> Result<&mut Self> {
        self.check_refs_overflow(1)?;
        self.references.push(cell);
        Ok(self)
    }

    pub fn trunc(&mut self, length_in_bits: usize) -> Result<()> {
        if self.length_in_bits < length_in_bits {
            fail!(ExceptionCode::FatalError)
        }
        let mut data = std::mem::take(&mut self.data);
        data.truncate((length_in_bits + 7) / 8);
        self.length_in_bits = 0;
        self.append_raw(&data, length_in_bits)?;
        Ok(())
    }
}

impl TryFrom<BuilderData> for Cell {
    type Error = failure::Error;
    fn try_from(builder: BuilderData) -> Result<Cell> {
        builder.into_cell()
    }
}

impl fmt::UpperHex for BuilderData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(&self.data))
    }
}

impl fmt::Binary for BuilderData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        (0..self.length_in_bits)
            .try_for_each(|i| write!(f, "{}", (self.data[i / 8] >> (7 - i % 8)) & 1))
    }
}
