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
use crate::{Coins, Jettons, UInt256};
use rand::Rng;

fn assert_exception(err: failure::Error, code: ExceptionCode) {
    assert_eq!(err.downcast_ref::<ExceptionCode>(), Some(&code), "{}", err);
}

mod builder_append {
    use super::*;

    #[test]
    fn nothing_to_empty() {
        let builder = BuilderData::with_raw(vec![0xFF], 0).unwrap();
        assert!(builder.data().is_empty());
        assert_eq!(builder.length_in_bits(), 0);

        let builder = BuilderData::with_bitstring(Vec::<u8>::new()).unwrap();
        assert!(builder.data().is_empty());
        assert_eq!(builder.length_in_bits(), 0);
        assert!(builder.is_empty());
    }

    #[test]
    fn one_byte_to_empty() {
        let result_table = [
            [0x80], [0xC0], [0xE0], [0xF0], [0xF8], [0xFC], [0xFE]
        ];
        for x in 1..result_table.len() {
            let builder = BuilderData::with_raw(vec![0xFF], x).unwrap();
            assert_eq!(builder.data(), result_table[x - 1]);
            assert_eq!(builder.length_in_bits(), x);
        }

        let builder = BuilderData::with_raw(vec![0xFF], 8).unwrap();
        assert_eq!(builder.data(), &[0xFF]);
        assert_eq!(builder.length_in_bits(), 8);
    }

    #[test]
    fn two_bytes_to_empty() {
        let result_table = [
            [0xFF, 0x80], [0xFF, 0xC0], [0xFF, 0xE0], [0xFF, 0xF0], [0xFF, 0xF8], [0xFF, 0xFC], [0xFF, 0xFE]
        ];
        for x in 1..result_table.len() {
            let builder = BuilderData::with_raw(vec![0xFF, 0xFF], x + 8).unwrap();
            assert_eq!(builder.data(), result_table[x - 1]);
            assert_eq!(builder.length_in_bits(), x + 8);
        }

        let builder = BuilderData::with_raw(vec![0xFF, 0xFF], 16).unwrap();
        assert_eq!(builder.data(), &[0xFF, 0xFF]);
        assert_eq!(builder.length_in_bits(), 16);
    }

    #[test]
    fn one_byte_raw_by_bit() {
        let result_table = [
            [0x80], [0xC0], [0xE0], [0xF0], [0xF8], [0xFC], [0xFE]
        ];
        let mut builder = BuilderData::new();
        for (x, v) in result_table.iter().enumerate() {
            builder.append_raw(&[0xFF], 1).unwrap();
            assert_eq!(builder.data(), *v);
            assert_eq!(builder.length_in_bits(), x + 1);
        }

        builder.append_raw(&[0xFF], 1).unwrap();
        assert_eq!(builder.data(), &[0xFF]);
        assert_eq!(builder.length_in_bits(), 8);
    }

    #[test]
    fn two_bytes_raw_by_bit() {
        let result_table = [
            [0xFF, 0x80], [0xFF, 0xC0], [0xFF, 0xE0], [0xFF, 0xF0], [0xFF, 0xF8], [0xFF, 0xFC], [0xFF, 0xFE]
        ];
        let mut builder = BuilderData::with_raw(vec![0xFF], 8).unwrap();

        for (x, v) in result_table.iter().enumerate() {
            builder.append_raw(&[0xFF], 1).unwrap();
            assert_eq!(builder.data(), *v);
            assert_eq!(builder.length_in_bits(), x + 9);
        }

        builder.append_raw(&[0xFF], 1).unwrap();
        assert_eq!(builder.data(), &[0xFF, 0xFF]);
        assert_eq!(builder.length_in_bits(), 16);
    }

    #[test]
    fn raw_too_short() {
        let mut builder = BuilderData::new();
        let err = builder.append_raw(&[0xFF], 9).unwrap_err();
        assert_exception(err, ExceptionCode::FatalError);
        assert_eq!(builder.length_in_bits(), 0);
    }

    #[test]
    fn u8_to_empty() {
        let mut data = BuilderData::new();
        data.store_u8(100).unwrap();
        assert_eq!(data.data(), &[100]);
        assert_eq!(data.length_in_bits(), 8);
    }

    #[test]
    fn u16_to_empty() {
        let mut data = BuilderData::new();
        data.store_u16(1123).unwrap();
        assert_eq!(data.data(), &[0x4, 0x63]);
        assert_eq!(data.length_in_bits(), 16);
    }

    #[test]
    fn u32_to_empty() {
        let mut data = BuilderData::new();
        data.store_u32(1123).unwrap();
        assert_eq!(data.data(), &[0x0, 0x0, 0x4, 0x63]);
        assert_eq!(data.length_in_bits(), 32);
    }

    #[test]
    fn u64_to_empty() {
        let mut data = BuilderData::new();
        data.store_u64(1123).unwrap();
        assert_eq!(data.data(), &[0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x4, 0x63]);
        assert_eq!(data.length_in_bits(), 64);
    }

    #[test]
    fn i32_few_times() {
        let mut data = BuilderData::new();
        for _i in 0..2 {
            data.store_i32(-1).unwrap();
        }
        assert_eq!(data.data(), &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(data.length_in_bits(), 64);
    }

    #[test]
    fn i8_few_times() {
        let mut data = BuilderData::new();
        for i in 0..5 {
            data.store_i8(i).unwrap();
        }
        assert_eq!(data.data(), &[0, 1, 2, 3, 4]);
        assert_eq!(data.length_in_bits(), 40);
    }

    #[test]
    fn one_byte_by_bit_bool() {
        let result_table = [
            [0x80], [0x80], [0xA0], [0xA0], [0xA8], [0xA8], [0xAA]
        ];
        let mut builder = BuilderData::new();
        for (x, v) in result_table.iter().enumerate() {
            builder.store_bit(x % 2 == 0).unwrap();
            assert_eq!(builder.data(), *v);
            assert_eq!(builder.length_in_bits(), x + 1);
        }
    }

    #[test]
    fn bits_array() {
        let mut builder = BuilderData::new();
        builder.store_bits(&[true, false, true, true, false, false, true, true, true]).unwrap();
        assert_eq!(builder.data(), &[0xB3, 0x80]);
        assert_eq!(builder.length_in_bits(), 9);
        assert_eq!(format!("{:b}", builder), "101100111");
    }

    #[test]
    fn to_builder() {
        let mut builder = BuilderData::with_raw(vec![0xFF], 7).unwrap();
        let builder2 = BuilderData::with_raw(vec![0xFF], 7).unwrap();

        builder.store_builder(&builder2).unwrap();
        assert_eq!(builder.data(), &[0xFF, 0xFC]);
        assert_eq!(builder.length_in_bits(), 14);

        let mut builder3 = BuilderData::with_raw(vec![0xAA], 6).unwrap();
        let builder4 = BuilderData::with_raw(vec![0xAA], 6).unwrap();

        builder3.store_builder(&builder4).unwrap();
        assert_eq!(builder3.data(), &[0xAA, 0xA0]);
        assert_eq!(builder3.length_in_bits(), 12);

        builder.store_builder(&builder3).unwrap();
        assert_eq!(builder.data(), &[0xFF, 0xFE, 0xAA, 0x80]);
        assert_eq!(builder.length_in_bits(), 26);
    }

    #[test]
    fn tagged_data() {
        let mut builder = BuilderData::with_bitstring(vec![0xFF, 0x80]).unwrap();
        assert_eq!(builder.length_in_bits(), 8);
        assert_eq!(builder.data(), &[0xFF]);
        builder.store_builder(&BuilderData::with_bitstring(vec![0xFF, 0x80]).unwrap()).unwrap();
        assert_eq!(builder.length_in_bits(), 16);
        assert_eq!(builder.data(), &[0xFF, 0xFF]);
        builder.store_builder(&BuilderData::with_bitstring(vec![0xF8]).unwrap()).unwrap();
        assert_eq!(builder.length_in_bits(), 20);
        assert_eq!(builder.data(), &[0xFF, 0xFF, 0xF0]);

        let mut builder2 = BuilderData::with_bitstring(vec![0xF8]).unwrap();
        assert_eq!(builder2.length_in_bits(), 4);
        assert_eq!(builder2.data(), &[0xF0]);
        builder2.store_builder(&BuilderData::with_bitstring(vec![0xFF, 0xFF, 0xF8]).unwrap()).unwrap();
        assert_eq!(builder2.length_in_bits(), 24);
        assert_eq!(builder2.data(), &[0xFF, 0xFF, 0xFF]);
    }
}

#[test]
fn test_bitstring_append() {
    let mut a = BuilderData::with_bitstring(vec![0x01, 0x80]).unwrap();
    let b = BuilderData::with_bitstring(vec![0x02, 0x80]).unwrap();
    a.store_builder(&b).unwrap();
    assert_eq!(&a, &BuilderData::with_bitstring(vec![0x01, 0x02, 0x80]).unwrap())
}

#[test]
fn test_bitstring_with_long_completion_tag() {
    let mut a = BuilderData::with_bitstring(vec![0x80, 0x00, 0x00]).unwrap();
    let b = BuilderData::with_bitstring(vec![0x02, 0x80, 0x00, 0x00]).unwrap();
    a.store_builder(&b).unwrap();
    assert_eq!(&a, &BuilderData::with_bitstring(vec![0x02, 0x80]).unwrap())
}

#[test]
fn test_trunc() {
    let mut builder = BuilderData::with_raw(vec![0xFF, 0xFF], 16).unwrap();
    builder.trunc(9).unwrap();
    assert_eq!(builder.data(), &[0xFF, 0x80]);
    assert_eq!(builder.length_in_bits(), 9);
    builder.trunc(20).expect_err("can't grow by truncation");
    builder.trunc(0).unwrap();
    assert!(builder.is_empty());
}

#[test]
fn test_bits_overflow() {
    let mut builder = BuilderData::with_capacity(8);
    let err = builder.store_bits(&[false; 9]).unwrap_err();
    assert_exception(err, ExceptionCode::CellOverflow);
    assert_eq!(builder.length_in_bits(), 0);

    builder.store_uint(5, 3).unwrap();
    assert_eq!(builder.bits_free(), 5);
    assert!(builder.check_enough_space(5));
    assert!(!builder.check_enough_space(6));
    builder.store_u8(1).expect_err("only 5 bits are free");
    assert_eq!(builder.data(), &[0xA0]);
    assert_eq!(builder.length_in_bits(), 3);

    let mut builder = BuilderData::new();
    builder.store_bytes(&[0x55; 127]).unwrap();
    builder.store_uint(3, 7).unwrap();
    assert_eq!(builder.bits_free(), 0);
    assert_exception(builder.store_bit(true).unwrap_err(), ExceptionCode::CellOverflow);
    builder.into_cell().unwrap();
}

#[test]
fn test_refs_overflow() {
    let child = Cell::default();
    let mut builder = BuilderData::new();
    for _ in 0..BuilderData::references_capacity() {
        builder.store_ref(child.clone()).unwrap();
    }
    assert_eq!(builder.references_used(), 4);
    assert_eq!(builder.references_free(), 0);
    assert!(!builder.check_enough_refs(1));
    let err = builder.store_ref(child.clone()).unwrap_err();
    assert_exception(err, ExceptionCode::CellOverflow);
    assert_eq!(builder.references_used(), 4);

    let mut builder = BuilderData::new();
    builder.store_refs(&[child.clone(), child.clone()]).unwrap();
    builder.store_refs(&[child.clone(), child.clone(), child.clone()]).expect_err("only 2 refs are free");
    assert_eq!(builder.references().len(), 2);
    assert_eq!(builder.references()[1], child);
}

#[test]
fn test_store_uint_range() {
    let mut builder = BuilderData::new();
    assert_exception(builder.store_uint(256, 8).unwrap_err(), ExceptionCode::RangeCheckError);
    assert_exception(builder.store_int(-129, 8).unwrap_err(), ExceptionCode::RangeCheckError);
    assert_exception(builder.store_int(128, 8).unwrap_err(), ExceptionCode::RangeCheckError);
    assert_exception(builder.store_int(1, 0).unwrap_err(), ExceptionCode::RangeCheckError);
    builder.store_uint(1, 65).expect_err("too many bits");
    assert!(builder.is_empty());

    builder.store_uint(0xABC, 12).unwrap();
    assert_eq!(builder.data(), &[0xAB, 0xC0]);
    assert_eq!(format!("{:X}", builder), "ABC0");

    let mut builder = BuilderData::new();
    builder.store_int(-128, 8).unwrap();
    builder.store_int(-1, 3).unwrap();
    builder.store_uint(u64::MAX, 64).unwrap();
    builder.store_int(i64::MIN, 64).unwrap();
    builder.store_uint(0, 0).unwrap();
    assert_eq!(builder.length_in_bits(), 139);
    assert_eq!(&builder.data()[..2], &[0x80, 0xFF]);

    let mut slice = SliceData::from(builder.into_cell().unwrap());
    assert_eq!(slice.load_int(8).unwrap(), -128);
    assert_eq!(slice.load_int(3).unwrap(), -1);
    assert_eq!(slice.load_uint(64).unwrap(), u64::MAX);
    assert_eq!(slice.load_i64().unwrap(), i64::MIN);
    assert_eq!(slice.remaining_bits(), 0);
}

#[test]
fn test_store_big_integers() {
    let mut builder = BuilderData::new();
    builder.store_big_uint(&BigUint::from(0x1FFu32), 9).unwrap();
    assert_eq!(builder.data(), &[0xFF, 0x80]);
    assert_exception(builder.store_big_uint(&BigUint::from(0x200u32), 9).unwrap_err(), ExceptionCode::RangeCheckError);

    let mut builder = BuilderData::new();
    builder.store_big_int(&BigInt::from(-2), 10).unwrap();
    assert_eq!(builder.data(), &[0xFF, 0x80]);
    assert_exception(builder.store_big_int(&BigInt::from(512), 10).unwrap_err(), ExceptionCode::RangeCheckError);
    builder.store_big_int(&BigInt::from(-512), 10).unwrap();

    let big = (BigInt::one() << 200usize) - 12345u32;
    let mut builder = BuilderData::new();
    builder.store_big_int(&big, 257).unwrap();
    builder.store_big_int(&-big.clone(), 257).unwrap();
    let mut slice = SliceData::from(builder.into_cell().unwrap());
    assert_eq!(slice.load_big_int(257).unwrap(), big);
    assert_eq!(slice.load_big_int(257).unwrap(), -big);
}

#[test]
fn test_var_len_bits() {
    assert_eq!(var_len_bits(1), 0);
    assert_eq!(var_len_bits(2), 1);
    assert_eq!(var_len_bits(8), 3);
    assert_eq!(var_len_bits(16), 4);
    assert_eq!(var_len_bits(32), 5);

    assert_eq!(signed_bytes_len(&BigInt::zero()), 0);
    assert_eq!(signed_bytes_len(&BigInt::from(127)), 1);
    assert_eq!(signed_bytes_len(&BigInt::from(128)), 2);
    assert_eq!(signed_bytes_len(&BigInt::from(-128)), 1);
    assert_eq!(signed_bytes_len(&BigInt::from(-129)), 2);
}

#[test]
fn test_store_var_uint() {
    let mut builder = BuilderData::new();
    builder.store_var_uint(&BigUint::from(169u32), 16).unwrap();
    assert_eq!(builder.data(), &[0x1A, 0x90]);
    assert_eq!(builder.length_in_bits(), 12);

    let mut builder = BuilderData::new();
    builder.store_var_uint(&BigUint::zero(), 16).unwrap();
    assert_eq!(builder.data(), &[0x00]);
    assert_eq!(builder.length_in_bits(), 4);

    let max = (BigUint::one() << 120usize) - 1u32;
    let mut builder = BuilderData::new();
    builder.store_var_uint(&max, 16).unwrap();
    assert_eq!(builder.length_in_bits(), 4 + 15 * 8);
    assert_exception(
        builder.store_var_uint(&(BigUint::one() << 120usize), 16).unwrap_err(),
        ExceptionCode::RangeCheckError
    );
    assert_eq!(builder.length_in_bits(), 4 + 15 * 8);

    builder.store_var_uint(&BigUint::from(169u32), 16).unwrap();
    builder.store_var_uint(&BigUint::zero(), 16).unwrap();
    let mut slice = SliceData::from(builder.into_cell().unwrap());
    assert_eq!(slice.load_var_uint(16).unwrap(), max);
    assert_eq!(slice.load_var_uint(16).unwrap(), BigUint::from(169u32));
    assert_eq!(slice.load_var_uint(16).unwrap(), BigUint::zero());
    assert!(slice.is_empty());
}

#[test]
fn test_store_var_int() {
    let mut builder = BuilderData::new();
    builder.store_var_int(&BigInt::from(-1), 16).unwrap();
    assert_eq!(builder.data(), &[0x1F, 0xF0]);
    assert_eq!(builder.length_in_bits(), 12);

    builder.store_var_int(&BigInt::from(128), 16).unwrap();
    assert_eq!(builder.length_in_bits(), 12 + 4 + 16);
    builder.store_var_int(&BigInt::zero(), 32).unwrap();
    builder.store_var_int(&BigInt::from(-129), 32).unwrap();

    let mut slice = SliceData::from(builder.into_cell().unwrap());
    assert_eq!(slice.load_var_int(16).unwrap(), BigInt::from(-1));
    assert_eq!(slice.load_var_int(16).unwrap(), BigInt::from(128));
    assert_eq!(slice.load_var_int(32).unwrap(), BigInt::zero());
    assert_eq!(slice.load_var_int(32).unwrap(), BigInt::from(-129));
    assert!(slice.is_empty());

    let mut builder = BuilderData::new();
    assert_exception(
        builder.store_var_int(&-(BigInt::one() << 127usize), 16).unwrap_err(),
        ExceptionCode::RangeCheckError
    );
    assert!(builder.is_empty());
}

#[test]
fn test_store_address() {
    let address = MsgAddress::with_standard(-1, UInt256::with_array([0x11; 32]));
    let mut builder = BuilderData::new();
    builder.store_address(&address).unwrap();
    assert_eq!(builder.length_in_bits(), MsgAddress::STD_BITS);
    assert_eq!(&builder.data()[..2], &[0x9F, 0xE2]);
    builder.store_address(&MsgAddress::none()).unwrap();
    assert_eq!(builder.length_in_bits(), MsgAddress::STD_BITS + 2);

    let mut slice = SliceData::from(builder.into_cell().unwrap());
    assert_eq!(slice.load_address().unwrap(), address);
    assert_eq!(slice.load_address().unwrap(), MsgAddress::AddrNone);
    assert!(slice.is_empty());

    let mut builder = BuilderData::with_capacity(MsgAddress::STD_BITS - 1);
    builder.store_address(&address).expect_err("address doesn't fit");
    assert!(builder.is_empty());
}

#[test]
fn test_store_coins() {
    let coins = Coins::from_str("1.5").unwrap();
    let mut builder = BuilderData::new();
    builder.store_coins(&coins).unwrap();
    assert_eq!(builder.data(), &[0x45, 0x96, 0x82, 0xF0, 0x00]);
    assert_eq!(builder.length_in_bits(), 36);

    let jettons = Jettons::from_str("2.5", 6).unwrap();
    builder.store_jettons(&jettons).unwrap();
    builder.store_coins(&Coins::default()).unwrap();

    let mut slice = SliceData::from(builder.into_cell().unwrap());
    assert_eq!(slice.load_coins().unwrap(), Coins::from_nano(1_500_000_000u64));
    assert_eq!(slice.load_jettons().unwrap().to_nano(), BigInt::from(2_500_000));
    assert!(slice.load_coins().unwrap().is_zero());

    let mut builder = BuilderData::new();
    let err = builder.store_coins(&Coins::from_nano(-1)).unwrap_err();
    assert!(err.to_string().contains("negative"), "{}", err);
    let err = builder.store_jettons(&Jettons::from_nano(-5, 3).unwrap()).unwrap_err();
    assert!(err.to_string().contains("negative"), "{}", err);
    assert!(builder.is_empty());
}

#[test]
fn test_store_dict() {
    let root = Cell::with_bits(&[true, true], vec![], CellType::Ordinary).unwrap();
    let mut builder = BuilderData::new();
    builder.store_dict(&None::<Cell>).unwrap();
    builder.store_dict(&Some(root.clone())).unwrap();
    assert_eq!(builder.length_in_bits(), 2);
    assert_eq!(builder.data(), &[0x40]);
    assert_eq!(builder.references(), &[root.clone()]);

    let mut slice = SliceData::from(builder.into_cell().unwrap());
    assert_eq!(slice.load_dict().unwrap(), None);
    let dict = slice.load_dict().unwrap().unwrap();
    assert_eq!(dict.bit_length(), 1);
    assert_eq!(dict.reference(0).unwrap(), root);
    assert!(slice.is_empty());
}

#[test]
fn test_store_string_and_slice() {
    let mut builder = BuilderData::new();
    builder.store_string("hello").unwrap();
    let cell = builder.into_cell().unwrap();
    assert_eq!(cell.to_hex_string(), "68656C6C6F");
    assert_eq!(SliceData::from(&cell).load_string(None).unwrap(), "hello");

    let child = Cell::with_bits(&[false], vec![], CellType::Ordinary).unwrap();
    let source = BuilderData::with_raw_and_refs(vec![0xAB, 0xCD], 16, vec![cell.clone(), child.clone()])
        .unwrap()
        .into_cell()
        .unwrap();
    let mut slice = SliceData::from(&source);
    slice.skip(4).unwrap();
    slice.load_ref().unwrap();

    let mut builder = BuilderData::new();
    builder.store_bit(true).unwrap();
    builder.store_slice(&slice).unwrap();
    assert_eq!(builder.length_in_bits(), 13);
    assert_eq!(builder.data(), &[0xDE, 0x68]);
    assert_eq!(builder.references(), &[child]);

    let mut builder = BuilderData::new();
    builder.store_cell_data(&source).unwrap();
    assert_eq!(builder.into_cell().unwrap(), source);
}

#[test]
fn test_from_cell() {
    let child = Cell::with_bits(&[true], vec![], CellType::Ordinary).unwrap();
    let cell = BuilderData::with_raw_and_refs(vec![0x12, 0x34], 14, vec![child])
        .unwrap()
        .into_cell()
        .unwrap();
    let builder = BuilderData::from_cell(&cell).unwrap();
    assert_eq!(builder.length_in_bits(), 14);
    assert_eq!(builder.cell_type(), CellType::Ordinary);
    assert_eq!(Cell::try_from(builder).unwrap(), cell);

    let mut slice = SliceData::from(&cell);
    slice.skip(6).unwrap();
    let builder = BuilderData::from_slice(&slice).unwrap();
    assert_eq!(builder.data(), &[0x8D]);
    assert_eq!(builder.length_in_bits(), 8);
    assert_eq!(builder.references_used(), 1);
}

#[test]
fn test_random_store_load() {
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let mut builder = BuilderData::new();
        let mut values = Vec::new();
        while builder.bits_free() > 64 {
            let bits = rng.gen_range(1..=64usize);
            let value = match bits {
                64 => rng.gen::<u64>(),
                bits => rng.gen::<u64>() >> (64 - bits)
            };
            builder.store_uint(value, bits).unwrap();
            values.push((value, bits));
        }
        let mut slice = SliceData::from(builder.into_cell().unwrap());
        for (value, bits) in values {
            assert_eq!(slice.load_uint(bits).unwrap(), value);
        }
        assert_eq!(slice.remaining_bits(), 0);
    }
}
