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

use super::*;
use crate::{base64_decode, base64_encode, cell::Cell, sha256_digest};
use std::io::Cursor;

#[test]
fn test_uint256_formatting() {
    let value = UInt256::from_str("1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef").unwrap();
    assert_eq!(value.to_string(), "1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef");
    assert_eq!(format!("{:?}", value), "1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef");
    assert_eq!(format!("{:x}", value), "1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef");
    assert_eq!(format!("{:#x}", value), "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef");
    assert_eq!(format!("{:#X}", value), "0x1234567890ABCDEF1234567890ABCDEF1234567890ABCDEF1234567890ABCDEF");
    assert_eq!(value.to_hex_string(), format!("{:x}", value));
}

#[test]
fn test_uint256_construct() {
    assert_eq!(UInt256::from_be_bytes(&0x0123456789ABCDEFu64.to_be_bytes()), UInt256::from_str("0000000000000000000000000000000000000000000000000123456789ABCDEF").unwrap());
    assert_eq!(UInt256::from_be_bytes(&0x0123456789ABCDEFu64.to_le_bytes()), UInt256::from_str("000000000000000000000000000000000000000000000000EFCDAB8967452301").unwrap());
    assert_eq!(UInt256::from_be_bytes(&[1, 2, 3]), UInt256::from_str("0000000000000000000000000000000000000000000000000000000000010203").unwrap());
    assert_eq!(UInt256::from_be_bytes(&[0xFF; 40]), UInt256::with_array([0xFF; 32]));

    assert_eq!(UInt256::default(), UInt256::with_array([0; 32]));

    let hash = UInt256::rand();
    assert_eq!(UInt256::from_slice(hash.as_slice()).unwrap(), hash);
    assert_eq!(UInt256::from(<[u8; 32]>::from(hash)), hash);
    assert_eq!(hash, hash.as_slice().to_vec());
    UInt256::from_slice(&[0; 31]).expect_err("hash is 32 bytes long");
}

#[test]
fn test_uint256_parse() {
    let hex = "96a296d224f285c67bee93c30f8a309157f0daa35dc5b87e410b78630a09cfc7";
    let value: UInt256 = hex.parse().unwrap();
    assert_eq!(value, UInt256::DEFAULT_CELL_HASH);
    assert_eq!(value, Cell::default().repr_hash());

    let base64 = base64_encode(value.as_slice());
    assert_eq!(base64.len(), 44);
    assert_eq!(UInt256::from_str(&base64).unwrap(), value);
    assert_eq!(base64_decode(&base64).unwrap(), value.as_slice().to_vec());

    UInt256::from_str("1234").expect_err("wrong length");
    UInt256::from_str(&"z".repeat(64)).expect_err("not a hex string");
    base64_decode("!!!").expect_err("not a base64 string");
}

#[test]
fn test_uint256_ordering() {
    assert!(UInt256::from_str("b5fb2792ecc96042d5f2f739c0a2586896c60719d1d8ad34f9d5f7ff578ffd89").unwrap() <
            UInt256::from_str("de48d8a9c6823c908cbf72c42f60d993424e4ac5298a16c6b811c9876b366827").unwrap());

    assert!(UInt256::from_str("de48d8a9c6823c908cbf72c42f60d993424e4ac5298a16c6b811c9876b366827").unwrap() >
            UInt256::from_str("15de0c10aaed5c7b9cdef181fd1b00abb8890ea5a1b86c961d7125e00c114691").unwrap());
}

#[test]
fn test_sha256_digest() {
    let hash = UInt256::with_array(sha256_digest(b"abc"));
    assert_eq!(hash.to_hex_string(), "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
}

#[test]
fn test_exception_codes() {
    assert_eq!(ExceptionCode::from_usize(5), Some(ExceptionCode::RangeCheckError));
    assert_eq!(ExceptionCode::from_usize(8), Some(ExceptionCode::CellOverflow));
    assert_eq!(ExceptionCode::from_usize(9), Some(ExceptionCode::CellUnderflow));
    assert_eq!(ExceptionCode::from_usize(12), Some(ExceptionCode::FatalError));
    assert_eq!(ExceptionCode::from_usize(6), None);
    assert_eq!(ExceptionCode::CellUnderflow.to_string(), "cell underflow");

    let err = error!(ExceptionCode::RangeCheckError);
    assert_eq!(err.downcast_ref::<ExceptionCode>(), Some(&ExceptionCode::RangeCheckError));
    let err = error!("value {} is too big", 300);
    assert!(err.to_string().starts_with("value 300 is too big "));
}

#[test]
fn test_byte_order_read() {
    let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
    let mut src = Cursor::new(&data[..]);
    assert_eq!(src.read_byte().unwrap(), 0x01);
    assert_eq!(src.read_be_uint(3).unwrap(), 0x020304);
    assert_eq!(src.read_be_u32().unwrap(), 0x05060708);
    src.read_le_u32().expect_err("only one byte left");

    let mut src = Cursor::new(&data[..]);
    assert_eq!(src.read_le_u32().unwrap(), 0x04030201);
    src.read_be_uint(9).expect_err("usize can't keep 9 bytes");
    src.read_be_uint(0).expect_err("zero width is not allowed");
}
