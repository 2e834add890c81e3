/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use structstream::prelude::*;

const TYPES: [&str; 18] = [
    "u1", "s1", "u2le", "u2be", "s2le", "s2be", "u4le", "u4be", "s4le", "s4be", "u8le", "u8be",
    "s8le", "s8be", "f4le", "f4be", "f8le", "f8be",
];

fn random_value(r: &mut SmallRng, ty: NumType) -> Value {
    let bits = ty.width() * 8;
    match ty.kind() {
        NumKind::Unsigned => Value::U64(r.random::<u64>() >> (64 - bits)),
        NumKind::Signed => Value::I64(r.random::<i64>() >> (64 - bits)),
        // raw bit patterns, so NaN payloads and subnormals show up too
        NumKind::Float if bits == 32 => Value::F32(f32::from_bits(r.random())),
        NumKind::Float => Value::F64(f64::from_bits(r.random())),
    }
}

/// Compare values by their bits, since NaNs are never equal to themselves.
fn same_bits(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
        (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
        _ => a == b,
    }
}

#[test]
fn test_dispatch_roundtrip() -> Result<()> {
    const N: usize = 10_000;
    let mut r = SmallRng::seed_from_u64(0);
    let types = TYPES
        .iter()
        .map(|s| s.parse::<NumType>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut fields = Vec::with_capacity(N);
    let mut write = Stream::with_size(N * 8);
    for _ in 0..N {
        let ty = types[r.random_range(0..types.len())];
        let value = random_value(&mut r, ty);
        ty.write(&mut write, &value)?;
        fields.push((ty, value));
    }
    let end = write.pos()?;

    write.seek(0)?;
    for (ty, value) in &fields {
        let read = ty.read(&mut write)?;
        assert!(same_bits(&read, value), "{}: {:?} != {:?}", ty, read, value);
    }
    assert_eq!(write.pos()?, end);
    Ok(())
}

#[test]
fn test_nan_payloads() -> Result<()> {
    // quiet and signalling NaNs of both widths are copied bit for bit
    let f4le: NumType = "f4le".parse()?;
    for bits in [0x7fa0_0001_u32, 0xffc0_1234, 0x7f80_0001, 0x7fc0_0000] {
        let data = bits.to_le_bytes();
        let mut io = Stream::from_bytes(data);
        let value = f4le.read(&mut io)?;
        assert!(same_bits(&value, &Value::F32(f32::from_bits(bits))));
        assert_eq!(f4le.encode(&value)?, data);
    }
    let f8be: NumType = "f8be".parse()?;
    for bits in [0x7ff4_0000_0000_0001_u64, 0xfff8_0000_dead_beef] {
        let data = bits.to_be_bytes();
        let mut io = Stream::from_bytes(data);
        let value = f8be.read(&mut io)?;
        assert!(same_bits(&value, &Value::F64(f64::from_bits(bits))));
        assert_eq!(f8be.encode(&value)?, data);
    }
    Ok(())
}

#[test]
fn test_static_and_dynamic_agree() -> Result<()> {
    let mut r = SmallRng::seed_from_u64(1);
    for _ in 0..1000 {
        let v: u32 = r.random();
        let mut io = Stream::with_size(8);
        io.write_u4le(v)?;
        io.write_num::<u32>(v, ByteOrder::Big)?;
        let bytes = io.to_byte_array()?;
        let le: NumType = "u4le".parse()?;
        let be: NumType = "u4be".parse()?;
        assert_eq!(le.encode(&Value::from(v))?, bytes[..4]);
        assert_eq!(be.encode(&Value::from(v))?, bytes[4..]);
    }
    Ok(())
}

#[test]
fn test_not_representable() -> Result<()> {
    let mut io = Stream::with_size(8);
    let u1: NumType = "u1".parse()?;
    let s4: NumType = "s4be".parse()?;
    assert!(matches!(
        u1.write(&mut io, &Value::U64(256)),
        Err(StreamError::NotRepresentable { .. })
    ));
    assert!(matches!(
        u1.write(&mut io, &Value::I64(-1)),
        Err(StreamError::NotRepresentable { .. })
    ));
    assert!(matches!(
        s4.write(&mut io, &Value::F64(1.0)),
        Err(StreamError::NotRepresentable { .. })
    ));
    assert!(matches!(
        s4.write(&mut io, &Value::Bytes(vec![1, 2, 3, 4])),
        Err(StreamError::NotRepresentable { .. })
    ));
    // nothing was written
    assert_eq!(io.pos()?, 0);
    Ok(())
}

#[test]
fn test_short_read() -> Result<()> {
    let mut io = Stream::from_bytes([1_u8, 2, 3]);
    match io.read_u4be() {
        Err(StreamError::Eof {
            requested,
            available,
        }) => assert_eq!((requested, available), (4, 3)),
        other => panic!("unexpected result {:?}", other),
    }
    Ok(())
}
