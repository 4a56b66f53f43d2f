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

use num::FromPrimitive;
use std::{cmp, convert::TryInto, fmt, fmt::{LowerHex, UpperHex}, str};

pub type Result<T> = std::result::Result<T, failure::Error>;
pub type Status = Result<()>;

#[macro_export]
macro_rules! error {
    ($error:literal) => {
        failure::err_msg(format!("{} {}:{}", $error, file!(), line!()))
    };
    ($error:expr) => {
        failure::Error::from($error)
    };
    ($fmt:expr, $($arg:tt)+) => {
        failure::err_msg(format!("{} {}:{}", format!($fmt, $($arg)*), file!(), line!()))
    };
}

#[macro_export]
macro_rules! fail {
    ($error:literal) => {
        return Err(failure::err_msg(format!("{} {}:{}", $error, file!(), line!())))
    };
    ($error:expr) => {
        return Err($crate::error!($error))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err(failure::err_msg(format!("{} {}:{}", format!($fmt, $($arg)*), file!(), line!())))
    };
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct UInt256([u8; 32]);

impl PartialEq<Vec<u8>> for UInt256 {
    fn eq(&self, other: &Vec<u8>) -> bool {
        other.len() == 32 && &self.0 == other.as_slice()
    }
}

impl UInt256 {

    pub const fn with_array(data: [u8; 32]) -> Self {
        Self(data)
    }

    pub const fn as_slice(&self) -> &[u8; 32] {
        &self.0
    }

    // Returns solid string like this: 96a296d224f285c67bee93c30f8a309157f0daa35dc5b87e410b78630a09cfc7
    pub fn to_hex_string(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_str(value: &str) -> Result<Self> {
        let bytes = match value.len() {
            64 => hex::decode(value)?,
            44 => base64::decode(value)?,
            len => fail!("invalid hash string length {} (64 hex or 44 base64 symbols expected)", len)
        };
        Ok(Self::from_be_bytes(&bytes))
    }

    /// Right-aligns `value` into 32 bytes, extra leading bytes are dropped
    pub fn from_be_bytes(value: &[u8]) -> Self {
        let mut data = [0; 32];
        let len = cmp::min(value.len(), 32);
        let offset = 32 - len;
        data[offset..].copy_from_slice(&value[value.len() - len..]);
        Self(data)
    }

    pub fn from_slice(value: &[u8]) -> Result<Self> {
        match value.try_into() {
            Ok(hash) => Ok(Self(hash)),
            Err(_) => fail!("hash must be 32 bytes long, got {}", value.len())
        }
    }

    #[cfg(test)]
    pub fn rand() -> Self {
        Self(rand::random::<[u8; 32]>())
    }

    // hash of default cell 0x96a296d224f285c67bee93c30f8a309157f0daa35dc5b87e410b78630a09cfc7;
    pub const DEFAULT_CELL_HASH: UInt256 = UInt256([150, 162, 150, 210, 36, 242, 133, 198, 123, 238, 147,
        195, 15, 138, 48, 145, 87, 240, 218, 163, 93, 197, 184, 126, 65, 11, 120, 99, 10, 9, 207, 199]);
}

impl From<[u8; 32]> for UInt256 {
    fn from(data: [u8; 32]) -> Self {
        UInt256(data)
    }
}

impl From<UInt256> for [u8; 32] {
    fn from(value: UInt256) -> Self {
        value.0
    }
}

impl AsRef<[u8]> for UInt256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl str::FromStr for UInt256 {
    type Err = failure::Error;
    fn from_str(value: &str) -> Result<Self> {
        UInt256::from_str(value)
    }
}

impl fmt::Debug for UInt256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        LowerHex::fmt(self, f)
    }
}

impl fmt::Display for UInt256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        LowerHex::fmt(self, f)
    }
}

impl LowerHex for UInt256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x")?;
        }
        write!(f, "{}", hex::encode(self.0))
    }
}

impl UpperHex for UInt256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x")?;
        }
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

// Exceptions *****************************************************************

#[derive(Clone, Copy, Debug, num_derive::FromPrimitive, PartialEq, Eq, failure::Fail)]
pub enum ExceptionCode {
    #[fail(display = "range check error")]
    RangeCheckError = 5,
    #[fail(display = "cell overflow")]
    CellOverflow = 8,
    #[fail(display = "cell underflow")]
    CellUnderflow = 9,
    #[fail(display = "fatal error")]
    FatalError = 12,
}

impl ExceptionCode {
    pub fn from_usize(number: usize) -> Option<ExceptionCode> {
        FromPrimitive::from_usize(number)
    }
}

pub trait ByteOrderRead {
    fn read_be_uint(&mut self, bytes: usize) -> std::io::Result<usize>;
    fn read_byte(&mut self) -> std::io::Result<u8>;
    fn read_be_u32(&mut self) -> std::io::Result<u32>;
    fn read_le_u32(&mut self) -> std::io::Result<u32>;
}

impl<T: std::io::Read> ByteOrderRead for T {
    fn read_be_uint(&mut self, bytes: usize) -> std::io::Result<usize> {
        match bytes {
            1..=8 => {
                let mut buf = [0; 8];
                self.read_exact(&mut buf[8 - bytes..])?;
                Ok(u64::from_be_bytes(buf) as usize)
            }
            _ => Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "too many bytes to read in usize")),
        }
    }

    fn read_byte(&mut self) -> std::io::Result<u8> {
        let mut buf = [0];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_be_u32(&mut self) -> std::io::Result<u32> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    fn read_le_u32(&mut self) -> std::io::Result<u32> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}

#[cfg(test)]
#[path = "tests/test_types.rs"]
mod tests;
