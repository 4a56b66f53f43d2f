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

use num::{BigInt, BigUint, Signed, Zero};

use crate::{error, fail};
use crate::types::Result;

pub const COINS_DECIMALS: u8 = 9;
pub const MAX_DECIMALS: u8 = 18;

/// Amount which is stored in a cell as VarUInteger 16 of its nano units
pub trait TokenAmount {
    fn is_negative(&self) -> bool;
    fn to_nano(&self) -> BigInt;
}

// parses "123.456" into nano units with `decimals` digits after the point
fn parse_decimal(value: &str, decimals: u8) -> Result<BigInt> {
    let invalid = || error!("Invalid coins/jettons value {}", value);
    let (negative, value) = match value.strip_prefix('-') {
        Some(value) => (true, value),
        None => (false, value)
    };
    let (int_part, frac_part) = value.split_once('.').unwrap_or((value, ""));
    if int_part.is_empty() || frac_part.len() > decimals as usize
        || !int_part.chars().chain(frac_part.chars()).all(|ch| ch.is_ascii_digit()) {
        return Err(invalid())
    }
    let digits = format!("{}{:0<width$}", int_part, frac_part, width = decimals as usize);
    let nano = digits.parse::<BigInt>().map_err(|_| invalid())?;
    Ok(if negative { -nano } else { nano })
}

fn format_decimal(f: &mut fmt::Formatter, nano: &BigInt, decimals: u8) -> fmt::Result {
    let digits = nano.magnitude().to_string();
    let decimals = decimals as usize;
    let digits = format!("{:0>width$}", digits, width = decimals + 1);
    let (int_part, frac_part) = digits.split_at(digits.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if nano.is_negative() {
        f.write_str("-")?;
    }
    match frac_part.is_empty() {
        true => write!(f, "{}", int_part),
        false => write!(f, "{}.{}", int_part, frac_part)
    }
}

/// Native currency amount kept in nanocoins
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coins(BigInt);

impl Coins {
    pub fn from_nano(nano: impl Into<BigInt>) -> Self {
        Coins(nano.into())
    }

    /// Parses amount in coins like `1.5`
    pub fn from_str(value: &str) -> Result<Self> {
        Ok(Coins(parse_decimal(value, COINS_DECIMALS)?))
    }

    pub fn nano(&self) -> &BigInt {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl TokenAmount for Coins {
    fn is_negative(&self) -> bool {
        self.0.is_negative()
    }
    fn to_nano(&self) -> BigInt {
        self.0.clone()
    }
}

impl From<BigUint> for Coins {
    fn from(nano: BigUint) -> Self {
        Coins(BigInt::from(nano))
    }
}

impl std::str::FromStr for Coins {
    type Err = failure::Error;
    fn from_str(value: &str) -> Result<Self> {
        Coins::from_str(value)
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        format_decimal(f, &self.0, COINS_DECIMALS)
    }
}

/// Jetton balance kept in nano units, `decimals` digits after the point (0..=18)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Jettons {
    nano: BigInt,
    decimals: u8,
}

impl Default for Jettons {
    fn default() -> Self {
        Jettons { nano: BigInt::zero(), decimals: COINS_DECIMALS }
    }
}

impl Jettons {
    pub fn from_nano(nano: impl Into<BigInt>, decimals: u8) -> Result<Self> {
        if decimals > MAX_DECIMALS {
            fail!("Invalid decimals value {}, must be 0-{}", decimals, MAX_DECIMALS)
        }
        Ok(Jettons { nano: nano.into(), decimals })
    }

    pub fn from_str(value: &str, decimals: u8) -> Result<Self> {
        if decimals > MAX_DECIMALS {
            fail!("Invalid decimals value {}, must be 0-{}", decimals, MAX_DECIMALS)
        }
        Ok(Jettons { nano: parse_decimal(value, decimals)?, decimals })
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Same amount interpreted with other decimals, nano units are kept
    pub fn with_decimals(self, decimals: u8) -> Result<Self> {
        Jettons::from_nano(self.nano, decimals)
    }
}

impl TokenAmount for Jettons {
    fn is_negative(&self) -> bool {
        self.nano.is_negative()
    }
    fn to_nano(&self) -> BigInt {
        self.nano.clone()
    }
}

impl From<BigUint> for Jettons {
    fn from(nano: BigUint) -> Self {
        Jettons { nano: BigInt::from(nano), decimals: COINS_DECIMALS }
    }
}

impl fmt::Display for Jettons {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        format_decimal(f, &self.nano, self.decimals)
    }
}

#[cfg(test)]
#[path = "tests/test_coins.rs"]
mod tests;
