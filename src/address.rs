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

use crate::{error, fail};
use crate::types::{Result, UInt256};

/// Message address as it is stored in cells
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum MsgAddress {
    #[default]
    AddrNone,
    AddrStd {
        workchain_id: i8,
        address: UInt256,
    },
}

impl MsgAddress {
    /// Bits of addr_std without anycast: tag + anycast flag + workchain + address
    pub const STD_BITS: usize = 2 + 1 + 8 + 256;

    pub const fn none() -> Self {
        MsgAddress::AddrNone
    }

    pub fn with_standard(workchain_id: i8, address: UInt256) -> Self {
        MsgAddress::AddrStd { workchain_id, address }
    }

    pub fn is_none(&self) -> bool {
        *self == MsgAddress::AddrNone
    }

    pub fn workchain_id(&self) -> Option<i8> {
        match self {
            MsgAddress::AddrNone => None,
            MsgAddress::AddrStd { workchain_id, .. } => Some(*workchain_id),
        }
    }

    pub fn address(&self) -> Option<&UInt256> {
        match self {
            MsgAddress::AddrNone => None,
            MsgAddress::AddrStd { address, .. } => Some(address),
        }
    }

    /// Parses raw form `workchain:hex`
    pub fn from_str(value: &str) -> Result<Self> {
        let (workchain_id, address) = value.split_once(':')
            .ok_or_else(|| error!("wrong address format {}", value))?;
        let workchain_id = workchain_id.parse::<i8>()
            .map_err(|err| error!("wrong workchain id {}: {}", workchain_id, err))?;
        if address.len() != 64 {
            fail!("wrong address length {}, 64 hex symbols expected", address.len())
        }
        Ok(MsgAddress::with_standard(workchain_id, UInt256::from_str(address)?))
    }
}

impl std::str::FromStr for MsgAddress {
    type Err = failure::Error;
    fn from_str(value: &str) -> Result<Self> {
        MsgAddress::from_str(value)
    }
}

impl fmt::Display for MsgAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MsgAddress::AddrNone => f.write_str("none"),
            MsgAddress::AddrStd { workchain_id, address } => write!(f, "{}:{:x}", workchain_id, address),
        }
    }
}

#[cfg(test)]
#[path = "tests/test_address.rs"]
mod tests;
