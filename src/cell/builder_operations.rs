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

use num::{BigInt, BigUint, One, Signed, Zero};

use crate::{error, fail};
use crate::address::MsgAddress;
use crate::cell::{BuilderData, Cell, CellType, MAX_REFERENCES_COUNT, SliceData};
use crate::coins::TokenAmount;
use crate::types::{ExceptionCode, Result};

/// Anything which serializes to a dictionary root cell: presence bit and optional root reference
pub trait Dictionary {
    fn cell(&self) -> Result<Cell>;
}

impl Dictionary for Option<Cell> {
    fn cell(&self) -> Result<Cell> {
        match self {
            Some(root) => Cell::with_bits(&[true], vec![root.clone()], CellType::Ordinary),
            None => Cell::with_bits(&[false], vec![], CellType::Ordinary),
        }
    }
}

/// Width of the length field of VarInteger with `max_len` bytes: ceil(log2(max_len))
pub(crate) fn var_len_bits(max_len: usize) -> usize {
    (usize::BITS - max_len.saturating_sub(1).leading_zeros()) as usize
}

// minimal count of bytes to keep value in two's complement form
fn signed_bytes_len(value: &BigInt) -> usize {
    if value.is_zero() {
        return 0
    }
    let magnitude = if value.is_negative() {
        (-value - BigInt::one()).magnitude().bits()
    } else {
        value.magnitude().bits()
    };
    (magnitude as usize + 1 + 7) / 8
}

fn pack_bits(bits: &[bool]) -> Vec<u8> {
    let mut data = vec![0u8; (bits.len() + 7) / 8];
    for (i, _) in bits.iter().enumerate().filter(|(_, bit)| **bit) {
        data[i / 8] |= 0x80 >> (i % 8);
    }
    data
}

impl BuilderData {
    /// maximum number of references
    pub fn references_capacity() -> usize {
        MAX_REFERENCES_COUNT
    }
    /// used number of references
    pub fn references_used(&self) -> usize {
        self.references().len()
    }
    /// free number of references
    pub fn references_free(&self) -> usize {
        MAX_REFERENCES_COUNT - self.references().len()
    }
    /// used number of bits
    pub fn bits_used(&self) -> usize {
        self.length_in_bits()
    }
    /// free number of bits
    pub fn bits_free(&self) -> usize {
        self.capacity().saturating_sub(self.bits_used())
    }

    pub fn check_enough_refs(&self, count: usize) -> bool {
        count <= self.references_free()
    }

    pub fn check_enough_space(&self, size: usize) -> bool {
        size <= self.bits_free()
    }

    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self> {
        self.append_raw(&[if bit { 0x80 } else { 0 }], 1)
    }

    pub fn store_bits(&mut self, bits: &[bool]) -> Result<&mut Self> {
        self.check_bits_overflow(bits.len())?;
        self.append_raw(&pack_bits(bits), bits.len())
    }

    /// Stores `value` as unsigned integer of `bits` width (up to 64)
    pub fn store_uint(&mut self, value: u64, bits: usize) -> Result<&mut Self> {
        if bits > 64 {
            fail!("store_uint supports up to 64 bits, got {}", bits)
        }
        if bits < 64 && value >> bits != 0 {
            fail!(ExceptionCode::RangeCheckError)
        }
        self.check_bits_overflow(bits)?;
        if bits == 0 {
            return Ok(self)
        }
        self.append_raw(&(value << (64 - bits)).to_be_bytes(), bits)
    }

    /// Stores `value` as two's complement integer of `bits` width (up to 64)
    pub fn store_int(&mut self, value: i64, bits: usize) -> Result<&mut Self> {
        if bits > 64 {
            fail!("store_int supports up to 64 bits, got {}", bits)
        }
        let fits = match bits {
            0 => value == 0,
            bits => {
                let bound = 1i128 << (bits - 1);
                (-bound..bound).contains(&(value as i128))
            }
        };
        if !fits {
            fail!(ExceptionCode::RangeCheckError)
        }
        let mask = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
        self.store_uint(value as u64 & mask, bits)
    }

    pub fn store_u8(&mut self, value: u8) -> Result<&mut Self> {
        self.append_raw(&[value], 8)
    }
    pub fn store_u16(&mut self, value: u16) -> Result<&mut Self> {
        self.append_raw(&value.to_be_bytes(), 16)
    }
    pub fn store_u32(&mut self, value: u32) -> Result<&mut Self> {
        self.append_raw(&value.to_be_bytes(), 32)
    }
    pub fn store_u64(&mut self, value: u64) -> Result<&mut Self> {
        self.append_raw(&value.to_be_bytes(), 64)
    }
    pub fn store_i8(&mut self, value: i8) -> Result<&mut Self> {
        self.append_raw(&value.to_be_bytes(), 8)
    }
    pub fn store_i16(&mut self, value: i16) -> Result<&mut Self> {
        self.append_raw(&value.to_be_bytes(), 16)
    }
    pub fn store_i32(&mut self, value: i32) -> Result<&mut Self> {
        self.append_raw(&value.to_be_bytes(), 32)
    }
    pub fn store_i64(&mut self, value: i64) -> Result<&mut Self> {
        self.append_raw(&value.to_be_bytes(), 64)
    }

    /// Stores arbitrary precision unsigned integer of `bits` width
    pub fn store_big_uint(&mut self, value: &BigUint, bits: usize) -> Result<&mut Self> {
        if value.bits() as usize > bits {
            fail!(ExceptionCode::RangeCheckError)
        }
        self.check_bits_overflow(bits)?;
        if bits == 0 {
            return Ok(self)
        }
        let len = (bits + 7) / 8;
        // left align value inside len bytes
        let aligned = value << (len * 8 - bits);
        let bytes = aligned.to_bytes_be();
        let mut data = vec![0u8; len];
        data[len - bytes.len()..].copy_from_slice(&bytes);
        self.append_raw(&data, bits)
    }

    /// Stores arbitrary precision signed integer of `bits` width in two's complement form
    pub fn store_big_int(&mut self, value: &BigInt, bits: usize) -> Result<&mut Self> {
        let fits = match bits {
            0 => value.is_zero(),
            bits => {
                let bound = BigInt::one() << (bits - 1);
                *value >= -bound.clone() && *value < bound
            }
        };
        if !fits {
            fail!(ExceptionCode::RangeCheckError)
        }
        let unsigned = if value.is_negative() {
            (BigInt::one() << bits) + value
        } else {
            value.clone()
        };
        match unsigned.to_biguint() {
            Some(unsigned) => self.store_big_uint(&unsigned, bits),
            None => fail!(ExceptionCode::FatalError)
        }
    }

    /// Stores VarUInteger: byte count in ceil(log2(max_len)) bits, then value bytes.
    /// Zero is stored as zero byte count without value bytes.
    pub fn store_var_uint(&mut self, value: &BigUint, max_len: usize) -> Result<&mut Self> {
        let len_bits = var_len_bits(max_len);
        let len = (value.bits() as usize + 7) / 8;
        if len >= max_len.max(1) && !value.is_zero() {
            fail!(ExceptionCode::RangeCheckError)
        }
        self.check_bits_overflow(len_bits + len * 8)?;
        self.store_uint(len as u64, len_bits)?;
        self.store_big_uint(value, len * 8)
    }

    /// Stores VarInteger: the same as VarUInteger, value bytes are in two's complement form
    pub fn store_var_int(&mut self, value: &BigInt, max_len: usize) -> Result<&mut Self> {
        let len_bits = var_len_bits(max_len);
        let len = signed_bytes_len(value);
        if len >= max_len.max(1) && !value.is_zero() {
            fail!(ExceptionCode::RangeCheckError)
        }
        self.check_bits_overflow(len_bits + len * 8)?;
        self.store_uint(len as u64, len_bits)?;
        self.store_big_int(value, len * 8)
    }

    pub fn store_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.append_raw(bytes, bytes.len() * 8)
    }

    pub fn store_string(&mut self, value: &str) -> Result<&mut Self> {
        self.store_bytes(value.as_bytes())
    }

    pub fn store_ref(&mut self, cell: Cell) -> Result<&mut Self> {
        self.checked_append_reference(cell)
    }

    pub fn store_refs(&mut self, cells: &[Cell]) -> Result<&mut Self> {
        self.check_refs_overflow(cells.len())?;
        for cell in cells {
            self.checked_append_reference(cell.clone())?;
        }
        Ok(self)
    }

    /// Appends remaining bits and references of the slice
    pub fn store_slice(&mut self, slice: &SliceData) -> Result<&mut Self> {
        self.check_bits_overflow(slice.remaining_bits())?;
        self.check_refs_overflow(slice.remaining_references())?;
        self.append_raw(&slice.get_bytestring(0), slice.remaining_bits())?;
        for i in 0..slice.remaining_references() {
            self.checked_append_reference(slice.reference(i)?)?;
        }
        Ok(self)
    }

    pub fn store_cell_data(&mut self, cell: &Cell) -> Result<&mut Self> {
        self.store_slice(&SliceData::from(cell))
    }

    pub fn store_builder(&mut self, other: &BuilderData) -> Result<&mut Self> {
        self.check_bits_overflow(other.length_in_bits())?;
        self.check_refs_overflow(other.references().len())?;
        self.append_raw(other.data(), other.length_in_bits())?;
        for cell in other.references() {
            self.checked_append_reference(cell.clone())?;
        }
        Ok(self)
    }

    /// addr_none$00 or addr_std$10 anycast:(Maybe Anycast) workchain_id:int8 address:bits256
    pub fn store_address(&mut self, address: &MsgAddress) -> Result<&mut Self> {
        match address {
            MsgAddress::AddrNone => self.store_uint(0b00, 2),
            MsgAddress::AddrStd { workchain_id, address } => {
                self.check_bits_overflow(MsgAddress::STD_BITS)?;
                self.store_uint(0b10, 2)?
                    .store_bit(false)?
                    .store_i8(*workchain_id)?
                    .store_bytes(address.as_slice())
            }
        }
    }

    pub fn store_coins(&mut self, coins: &impl TokenAmount) -> Result<&mut Self> {
        if coins.is_negative() {
            fail!("coins value can't be negative")
        }
        self.store_token_amount(coins)
    }

    pub fn store_jettons(&mut self, jettons: &impl TokenAmount) -> Result<&mut Self> {
        if jettons.is_negative() {
            fail!("jettons value can't be negative")
        }
        self.store_token_amount(jettons)
    }

    fn store_token_amount(&mut self, amount: &impl TokenAmount) -> Result<&mut Self> {
        let nano = amount.to_nano().to_biguint().ok_or_else(|| error!(ExceptionCode::RangeCheckError))?;
        self.store_var_uint(&nano, 16)
    }

    pub fn store_dict(&mut self, dict: &impl Dictionary) -> Result<&mut Self> {
        self.store_cell_data(&dict.cell()?)
    }
}

#[cfg(test)]
#[path = "tests/test_builder.rs"]
mod tests;
