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
use std::ops::Range;

use num::{BigInt, BigUint, One};
use smallvec::SmallVec;

use crate::{error, fail, parse_slice_base};
use crate::address::MsgAddress;
use crate::cell::{BuilderData, Cell, CellType, MAX_DATA_BYTES};
use super::builder_operations::var_len_bits;
use crate::coins::{Coins, Jettons};
use crate::types::{ExceptionCode, Result, UInt256};

/// Read cursor over a cell: windows of not yet consumed bits and references
#[derive(Eq, Clone)]
pub struct SliceData {
    cell: Cell,
    data_window: Range<usize>,
    references_window: Range<usize>,
}

impl PartialEq for SliceData {
    fn eq(&self, slice: &SliceData) -> bool {
        self.remaining_bits() == slice.remaining_bits()
            && self.remaining_references() == slice.remaining_references()
            && self.get_bytestring(0) == slice.get_bytestring(0)
            && self.references_window.clone().zip(slice.references_window.clone())
                .all(|(i, j)| self.cell.references()[i] == slice.cell.references()[j])
    }
}

impl Default for SliceData {
    fn default() -> Self {
        SliceData::from(Cell::default())
    }
}

impl From<&Cell> for SliceData {
    fn from(cell: &Cell) -> SliceData {
        SliceData::from(cell.clone())
    }
}

impl From<Cell> for SliceData {
    fn from(cell: Cell) -> SliceData {
        SliceData {
            references_window: 0..cell.references_count(),
            data_window: 0..cell.bit_length(),
            cell
        }
    }
}

impl Cell {
    pub fn slice(&self) -> SliceData {
        SliceData::from(self)
    }
}

impl SliceData {
    pub fn new_empty() -> SliceData {
        SliceData::default()
    }

    /// Parses Fift-hex bit string without braces, like `A7_`
    pub fn from_string(value: &str) -> Result<SliceData> {
        let vec = parse_slice_base(value, 0, 16).ok_or_else(|| error!(ExceptionCode::FatalError))?;
        Ok(BuilderData::with_bitstring(vec)?.into_cell()?.into())
    }

    pub fn remaining_references(&self) -> usize {
        self.references_window.len()
    }

    pub fn remaining_bits(&self) -> usize {
        self.data_window.len()
    }

    /// No bits and no references left
    pub fn is_empty(&self) -> bool {
        self.data_window.is_empty() && self.references_window.is_empty()
    }

    /// returns internal cell regardless window settings
    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    /// constructs new cell from the remaining window
    pub fn into_cell(self) -> Result<Cell> {
        if self.references_window.start == 0 && self.data_window.start == 0
            && self.references_window.end == self.cell.references_count()
            && self.data_window.end == self.cell.bit_length() {
            Ok(self.cell)
        } else {
            BuilderData::from_slice(&self)?.into_cell()
        }
    }

    pub fn reference(&self, i: usize) -> Result<Cell> {
        if self.references_window.start + i < self.references_window.end {
            self.cell.reference(self.references_window.start + i)
        } else {
            fail!(ExceptionCode::CellUnderflow)
        }
    }

    pub fn cell_type(&self) -> CellType {
        self.cell.cell_type()
    }

    pub fn get_bit_opt(&self, offset: usize) -> Option<bool> {
        if offset >= self.remaining_bits() {
            None
        } else {
            let index = self.data_window.start + offset;
            Some((self.cell.data()[index / 8] >> (7 - index % 8) & 1) != 0)
        }
    }

    pub fn get_bit(&self, offset: usize) -> Result<bool> {
        self.get_bit_opt(offset).ok_or_else(|| error!(ExceptionCode::CellUnderflow))
    }

    // caller guarantees offset + bits <= remaining_bits
    fn bytes_at(&self, offset: usize, bits: usize) -> Vec<u8> {
        let start = self.data_window.start + offset;
        let data = self.cell.data();
        let first = start / 8;
        let shift = start % 8;
        let mut result = (0..(bits + 7) / 8).map(|i| {
            let hi = data[first + i] << shift;
            let lo = match shift {
                0 => 0,
                shift => data.get(first + i + 1).map_or(0, |byte| byte >> (8 - shift))
            };
            hi | lo
        }).collect::<Vec<_>>();
        if let (true, Some(last)) = (bits % 8 != 0, result.last_mut()) {
            *last &= 0xFF << (8 - bits % 8);
        }
        result
    }

    /// Remaining bits starting from offset, left aligned
    pub fn get_bytestring(&self, offset: usize) -> Vec<u8> {
        let bits = self.remaining_bits().saturating_sub(offset);
        self.bytes_at(offset, bits)
    }

    fn check_bits(&self, bits: usize) -> Result<()> {
        if bits > self.remaining_bits() {
            fail!(ExceptionCode::CellUnderflow)
        }
        Ok(())
    }

    pub fn move_by(&mut self, offset: usize) -> Result<()> {
        self.check_bits(offset)?;
        self.data_window.start += offset;
        Ok(())
    }

    pub fn skip(&mut self, bits: usize) -> Result<&mut Self> {
        self.move_by(bits)?;
        Ok(self)
    }

    pub fn load_bit(&mut self) -> Result<bool> {
        let bit = self.get_bit(0)?;
        self.data_window.start += 1;
        Ok(bit)
    }

    pub fn preload_bit(&self) -> Result<bool> {
        self.get_bit(0)
    }

    pub fn load_bits(&mut self, bits: usize) -> Result<Vec<bool>> {
        let result = self.preload_bits(bits)?;
        self.data_window.start += bits;
        Ok(result)
    }

    pub fn preload_bits(&self, bits: usize) -> Result<Vec<bool>> {
        self.check_bits(bits)?;
        Ok((0..bits).filter_map(|i| self.get_bit_opt(i)).collect())
    }

    /// Loads `bits` bits as left aligned byte string
    pub fn load_bitstring(&mut self, bits: usize) -> Result<Vec<u8>> {
        let result = self.preload_bitstring(bits)?;
        self.data_window.start += bits;
        Ok(result)
    }

    pub fn preload_bitstring(&self, bits: usize) -> Result<Vec<u8>> {
        self.check_bits(bits)?;
        Ok(self.bytes_at(0, bits))
    }

    pub fn load_bytes(&mut self, bytes: usize) -> Result<Vec<u8>> {
        self.load_bitstring(bytes * 8)
    }

    pub fn preload_bytes(&self, bytes: usize) -> Result<Vec<u8>> {
        self.preload_bitstring(bytes * 8)
    }

    pub fn load_hash(&mut self) -> Result<UInt256> {
        UInt256::from_slice(&self.load_bytes(32)?)
    }

    pub fn preload_hash(&self) -> Result<UInt256> {
        UInt256::from_slice(&self.preload_bytes(32)?)
    }

    /// Loads unsigned integer up to 64 bits
    pub fn load_uint(&mut self, bits: usize) -> Result<u64> {
        let value = self.preload_uint(bits)?;
        self.data_window.start += bits;
        Ok(value)
    }

    pub fn preload_uint(&self, bits: usize) -> Result<u64> {
        if bits > 64 {
            fail!("too many bits {} > 64", bits)
        }
        self.check_bits(bits)?;
        if bits == 0 {
            return Ok(0)
        }
        let mut buf = [0u8; 8];
        let bytes = self.bytes_at(0, bits);
        buf[..bytes.len()].copy_from_slice(&bytes);
        Ok(u64::from_be_bytes(buf) >> (64 - bits))
    }

    /// Loads two's complement integer up to 64 bits
    pub fn load_int(&mut self, bits: usize) -> Result<i64> {
        let value = self.preload_int(bits)?;
        self.data_window.start += bits;
        Ok(value)
    }

    pub fn preload_int(&self, bits: usize) -> Result<i64> {
        let value = self.preload_uint(bits)?;
        if bits == 0 {
            return Ok(0)
        }
        Ok(((value << (64 - bits)) as i64) >> (64 - bits))
    }

    pub fn load_u8(&mut self) -> Result<u8> {
        Ok(self.load_uint(8)? as u8)
    }
    pub fn load_u16(&mut self) -> Result<u16> {
        Ok(self.load_uint(16)? as u16)
    }
    pub fn load_u32(&mut self) -> Result<u32> {
        Ok(self.load_uint(32)? as u32)
    }
    pub fn load_u64(&mut self) -> Result<u64> {
        self.load_uint(64)
    }
    pub fn load_i8(&mut self) -> Result<i8> {
        Ok(self.load_int(8)? as i8)
    }
    pub fn load_i16(&mut self) -> Result<i16> {
        Ok(self.load_int(16)? as i16)
    }
    pub fn load_i32(&mut self) -> Result<i32> {
        Ok(self.load_int(32)? as i32)
    }
    pub fn load_i64(&mut self) -> Result<i64> {
        self.load_int(64)
    }

    pub fn load_big_uint(&mut self, bits: usize) -> Result<BigUint> {
        let value = self.preload_big_uint(bits)?;
        self.data_window.start += bits;
        Ok(value)
    }

    pub fn preload_big_uint(&self, bits: usize) -> Result<BigUint> {
        self.check_bits(bits)?;
        let bytes = self.bytes_at(0, bits);
        Ok(BigUint::from_bytes_be(&bytes) >> (bytes.len() * 8 - bits))
    }

    pub fn load_big_int(&mut self, bits: usize) -> Result<BigInt> {
        let value = self.preload_big_int(bits)?;
        self.data_window.start += bits;
        Ok(value)
    }

    pub fn preload_big_int(&self, bits: usize) -> Result<BigInt> {
        let value = BigInt::from(self.preload_big_uint(bits)?);
        if bits != 0 && self.get_bit(0)? {
            return Ok(value - (BigInt::one() << bits))
        }
        Ok(value)
    }

    /// Loads VarUInteger with `max_len` bytes limit
    pub fn load_var_uint(&mut self, max_len: usize) -> Result<BigUint> {
        let mut slice = self.clone();
        let len = slice.load_uint(var_len_bits(max_len))? as usize;
        let value = slice.load_big_uint(len * 8)?;
        *self = slice;
        Ok(value)
    }

    pub fn preload_var_uint(&self, max_len: usize) -> Result<BigUint> {
        self.clone().load_var_uint(max_len)
    }

    /// Loads VarInteger with `max_len` bytes limit
    pub fn load_var_int(&mut self, max_len: usize) -> Result<BigInt> {
        let mut slice = self.clone();
        let len = slice.load_uint(var_len_bits(max_len))? as usize;
        let value = slice.load_big_int(len * 8)?;
        *self = slice;
        Ok(value)
    }

    pub fn preload_var_int(&self, max_len: usize) -> Result<BigInt> {
        self.clone().load_var_int(max_len)
    }

    /// Loads UTF-8 string of `bytes` length or of all remaining whole bytes
    pub fn load_string(&mut self, bytes: Option<usize>) -> Result<String> {
        let bytes = bytes.unwrap_or(self.remaining_bits() / 8);
        let mut slice = self.clone();
        let data = slice.load_bytes(bytes)?;
        let string = String::from_utf8(data).map_err(|err| error!("invalid utf-8 string: {}", err))?;
        *self = slice;
        Ok(string)
    }

    pub fn preload_string(&self, bytes: Option<usize>) -> Result<String> {
        self.clone().load_string(bytes)
    }

    pub fn load_ref(&mut self) -> Result<Cell> {
        let cell = self.preload_ref()?;
        self.references_window.start += 1;
        Ok(cell)
    }

    pub fn preload_ref(&self) -> Result<Cell> {
        self.reference(0)
    }

    /// addr_none$00 or addr_std$10 anycast:(Maybe Anycast) workchain_id:int8 address:bits256
    pub fn load_address(&mut self) -> Result<MsgAddress> {
        let mut slice = self.clone();
        let address = match slice.load_uint(2)? {
            0b00 => MsgAddress::AddrNone,
            0b10 => {
                // anycast is not supported, the bit is skipped
                slice.move_by(1)?;
                let workchain_id = slice.load_i8()?;
                let address = slice.load_hash()?;
                MsgAddress::with_standard(workchain_id, address)
            }
            flags => fail!("bad address flag bits {:02b}", flags)
        };
        *self = slice;
        Ok(address)
    }

    pub fn preload_address(&self) -> Result<MsgAddress> {
        self.clone().load_address()
    }

    pub fn load_coins(&mut self) -> Result<Coins> {
        Ok(Coins::from(self.load_var_uint(16)?))
    }

    pub fn preload_coins(&self) -> Result<Coins> {
        self.clone().load_coins()
    }

    pub fn load_jettons(&mut self) -> Result<Jettons> {
        Ok(Jettons::from(self.load_var_uint(16)?))
    }

    pub fn preload_jettons(&self) -> Result<Jettons> {
        self.clone().load_jettons()
    }

    /// Loads dictionary root: `0` bit gives `None`, `1` bit wraps the bit and next reference into a cell
    pub fn load_dict(&mut self) -> Result<Option<Cell>> {
        let mut slice = self.clone();
        if !slice.load_bit()? {
            *self = slice;
            return Ok(None)
        }
        let root = slice.load_ref()?;
        let cell = Cell::with_bits(&[true], vec![root], CellType::Ordinary)?;
        *self = slice;
        Ok(Some(cell))
    }

    pub fn preload_dict(&self) -> Result<Option<Cell>> {
        self.clone().load_dict()
    }

    pub fn skip_dict(&mut self) -> Result<&mut Self> {
        self.load_dict()?;
        Ok(self)
    }

    pub fn as_hex_string(&self) -> String {
        self.hex_string(true)
    }

    fn hex_string(&self, lower: bool) -> String {
        let len = self.remaining_bits();
        let mut data: SmallVec<[u8; MAX_DATA_BYTES]> = self.get_bytestring(0).into();
        super::append_tag(&mut data, len);
        super::to_hex_string(data.as_slice(), len, lower)
    }
}

impl fmt::Debug for SliceData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:x}", self)
    }
}

impl fmt::Display for SliceData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "data: {}..{}, references: {}..{}, data slice: x{{{:X}}}",
            self.data_window.start,
            self.data_window.end,
            self.references_window.start,
            self.references_window.end,
            self)
    }
}

impl fmt::LowerHex for SliceData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.hex_string(true))
    }
}

impl fmt::UpperHex for SliceData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.hex_string(false))
    }
}

#[cfg(test)]
#[path = "tests/test_slice.rs"]
mod tests;
