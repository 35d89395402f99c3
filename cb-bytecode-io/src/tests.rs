use cb_core::chunk::{Chunk, FunctionEntry};
use cb_core::value::Value;

use super::*;

fn sample_chunk() -> Chunk {
  let mut chunk = Chunk::new("sample");
  chunk.add_constant(Value::Nil);
  chunk.add_constant(Value::Number(3.5));
  chunk.add_constant(Value::Str("hi".into()));
  chunk.add_constant(Value::Bool(true));
  chunk.intern_name("x");
  chunk.intern_name("add");
  chunk.add_function(FunctionEntry { name_index: 1, arity: 2, entry_offset: 7 });
  chunk.push_op(cb_core::chunk::OpCode::Const, 1, 1);
  chunk.push_u16(0, 1, 1);
  chunk.push_op(cb_core::chunk::OpCode::Halt, 1, 3);
  chunk
}

#[test]
fn round_trips_every_field_byte_for_byte() {
  let chunk = sample_chunk();
  let bytes = serialize(&chunk);
  let back = deserialize(&bytes, "sample").expect("deserialize failed");
  assert_eq!(back, chunk);
}

#[test]
fn bad_magic_is_rejected_as_io_error() {
  let mut bytes = serialize(&sample_chunk());
  bytes[0] = 0;
  let err = deserialize(&bytes, "sample").unwrap_err();
  assert_eq!(err.kind, cb_core::errors::ErrorKind::IoError);
}

#[test]
fn truncated_payload_is_rejected_not_panicked() {
  let bytes = serialize(&sample_chunk());
  let truncated = &bytes[..bytes.len() - 4];
  assert!(deserialize(truncated, "sample").is_err());
}

#[test]
fn unknown_trailing_bytes_are_ignored() {
  let mut bytes = serialize(&sample_chunk());
  bytes.extend_from_slice(&[1, 2, 3, 4, 5]);
  let back = deserialize(&bytes, "sample").expect("deserialize failed");
  assert_eq!(back, sample_chunk());
}

#[test]
fn a_higher_version_number_is_still_accepted() {
  let mut bytes = serialize(&sample_chunk());
  bytes[4..6].copy_from_slice(&99u16.to_le_bytes());
  assert!(deserialize(&bytes, "sample").is_ok());
}

#[test]
fn bundle_footer_round_trips_and_detects() {
  let host = vec![0xAAu8; 32];
  let payload = serialize(&sample_chunk());
  let bundled = append_bundle(&host, &payload);
  let found = detect_bundle_payload(&bundled).expect("footer not detected");
  assert_eq!(found, payload.as_slice());
}

#[test]
fn a_plain_executable_with_no_footer_is_not_detected() {
  let host = vec![0xAAu8; 32];
  assert!(detect_bundle_payload(&host).is_none());
}

#[quickcheck_macros::quickcheck]
fn number_constants_round_trip_through_serialization(nums: Vec<f64>) -> bool {
  let mut chunk = Chunk::new("prop");
  for n in nums.into_iter().filter(|n| !n.is_nan()) {
    chunk.add_constant(Value::Number(n));
  }
  let bytes = serialize(&chunk);
  let back = deserialize(&bytes, "prop").expect("deserialize failed");
  back == chunk
}

#[quickcheck_macros::quickcheck]
fn arbitrary_code_and_debug_tables_round_trip(code: Vec<u8>) -> bool {
  let mut chunk = Chunk::new("prop");
  for (i, byte) in code.into_iter().enumerate() {
    chunk.push_byte(byte, i as u32, (i * 2) as u32);
  }
  let bytes = serialize(&chunk);
  let back = deserialize(&bytes, "prop").expect("deserialize failed");
  back == chunk
}
