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

pub mod types;
pub use self::types::*;

pub mod wrappers;
pub use self::wrappers::*;

pub mod cell;
pub use self::cell::*;

pub mod address;
pub use self::address::*;

pub mod coins;
pub use self::coins::*;

pub mod boc;
pub use self::boc::*;

/// Parses hex (or other `base`) bit string with optional `_` completion tag into tagged bytes
pub fn parse_slice_base(slice: &str, mut bits: usize, base: u32) -> Option<Vec<u8>> {
    debug_assert!(bits < 8, "it is offset to get slice parsed");
    let mut acc = 0u8;
    let mut data = vec![];
    let mut completion_tag = false;
    for ch in slice.chars() {
        if completion_tag {
            return None
        }
        match ch.to_digit(base) {
            Some(x) => if bits < 4 {
                acc |= (x << (4 - bits)) as u8;
                bits += 4;
            } else {
                data.push(acc | (x as u8 >> (bits - 4)));
                acc = (x << (12 - bits)) as u8;
                bits -= 4;
            }
            None => match ch {
                '_' => completion_tag = true,
                _ => return None
            }
        }
    }
    if bits != 0 {
        if !completion_tag {
            acc |= 1 << (7 - bits);
        }
        if acc != 0 || data.is_empty() {
            data.push(acc);
        }
    } else if !completion_tag {
        data.push(0x80);
    }
    Some(data)
}
