use cb_core::chunk::OpCode;
use cb_objects::{Pointer, Value};

use crate::convert::to_i64;
use crate::{Step, VmResult, VM};

impl<'a> VM<'a> {
  /// Heap and pointer opcodes (§4.7 "Pointers and heap"): a `Value::Pointer`
  /// names a heap block and byte offset, resolved through `self.heap`.
  pub(crate) fn exec_memory_op(&mut self, op: OpCode) -> VmResult<Step> {
    match op {
      OpCode::Alloc => {
        let size = self.pop_number(0).max(0.0) as usize;
        let ptr = self.heap.alloc(size);
        self.push(Value::Pointer(ptr));
      }
      OpCode::Free => {
        let ptr = self.pop_pointer();
        self.heap.free(ptr);
        self.push(Value::Nil);
      }
      OpCode::PtrAdd => {
        let delta = to_i64(self.pop_number(0));
        let ptr = self.pop_pointer();
        self.push(Value::Pointer(self.heap.ptr_add(ptr, delta)));
      }
      OpCode::Load8 => {
        let offset = self.pop_number(0);
        let ptr = self.pop_pointer();
        self.push(Value::Number(self.heap.load8(offset_ptr(ptr, offset)) as f64));
      }
      OpCode::Store8 => {
        let offset = self.pop_number(0);
        let ptr = self.pop_pointer();
        let value = self.pop_number(0);
        self.heap.store8(offset_ptr(ptr, offset), to_i64(value) as u8);
        self.push(Value::Nil);
      }
      OpCode::Load16 => {
        let offset = self.pop_number(0);
        let ptr = self.pop_pointer();
        self.push(Value::Number(self.heap.load16(offset_ptr(ptr, offset)) as f64));
      }
      OpCode::Store16 => {
        let offset = self.pop_number(0);
        let ptr = self.pop_pointer();
        let value = self.pop_number(0);
        self.heap.store16(offset_ptr(ptr, offset), to_i64(value) as u16);
        self.push(Value::Nil);
      }
      OpCode::Load32 => {
        let offset = self.pop_number(0);
        let ptr = self.pop_pointer();
        self.push(Value::Number(self.heap.load32(offset_ptr(ptr, offset)) as f64));
      }
      OpCode::Store32 => {
        let offset = self.pop_number(0);
        let ptr = self.pop_pointer();
        let value = self.pop_number(0);
        self.heap.store32(offset_ptr(ptr, offset), to_i64(value) as u32);
        self.push(Value::Nil);
      }
      OpCode::Load64 => {
        let offset = self.pop_number(0);
        let ptr = self.pop_pointer();
        self.push(Value::Number(self.heap.load64(offset_ptr(ptr, offset)) as f64));
      }
      OpCode::Store64 => {
        let offset = self.pop_number(0);
        let ptr = self.pop_pointer();
        let value = self.pop_number(0);
        self.heap.store64(offset_ptr(ptr, offset), to_i64(value) as u64);
        self.push(Value::Nil);
      }
      OpCode::LoadF32 => {
        let offset = self.pop_number(0);
        let ptr = self.pop_pointer();
        self.push(Value::Number(self.heap.load_f32(offset_ptr(ptr, offset)) as f64));
      }
      OpCode::StoreF32 => {
        let offset = self.pop_number(0);
        let ptr = self.pop_pointer();
        let value = self.pop_number(0);
        self.heap.store_f32(offset_ptr(ptr, offset), value as f32);
        self.push(Value::Nil);
      }
      OpCode::Memcpy => {
        let len = self.pop_number(0).max(0.0) as usize;
        let src = self.pop_pointer();
        let dst = self.pop_pointer();
        self.heap.memcpy(dst, src, len);
        self.push(Value::Nil);
      }
      OpCode::Memset => {
        let len = self.pop_number(0).max(0.0) as usize;
        let value = self.pop_number(0);
        let ptr = self.pop_pointer();
        self.heap.memset(ptr, to_i64(value) as u8, len);
        self.push(Value::Nil);
      }
      OpCode::PtrDiff => {
        let b = self.pop_pointer();
        let a = self.pop_pointer();
        self.push(Value::Number(self.heap.ptr_diff(a, b) as f64));
      }
      OpCode::Realloc => {
        let new_size = self.pop_number(0).max(0.0) as usize;
        let ptr = self.pop_pointer();
        self.push(Value::Pointer(self.heap.realloc(ptr, new_size)));
      }
      OpCode::BlockSize => {
        let ptr = self.pop_pointer();
        self.push(Value::Number(self.heap.block_size(ptr) as f64));
      }
      OpCode::PtrOffset => {
        let ptr = self.pop_pointer();
        self.push(Value::Number(ptr.offset as f64));
      }
      OpCode::PtrBlock => {
        let ptr = self.pop_pointer();
        self.push(Value::Number(ptr.block_index as f64));
      }
      OpCode::PackF64Le => {
        let n = self.pop_number(0);
        self.push(Value::Pointer(self.pack_bytes(&n.to_le_bytes())));
      }
      OpCode::PackU16Le => {
        let n = to_i64(self.pop_number(0)) as u16;
        self.push(Value::Pointer(self.pack_bytes(&n.to_le_bytes())));
      }
      OpCode::PackU32Le => {
        let n = to_i64(self.pop_number(0)) as u32;
        self.push(Value::Pointer(self.pack_bytes(&n.to_le_bytes())));
      }
      _ => unreachable!("{:?} is not a memory opcode", op),
    }
    Ok(Step::Continue)
  }

  fn pop_pointer(&mut self) -> Pointer {
    self.pop().as_pointer().unwrap_or_default()
  }

  /// Packing ops have no spare `Value` variant to stash raw bytes in, so they
  /// allocate a fresh heap block and write the little-endian encoding into
  /// it, returning a pointer — the same shape `OP_ALLOC` produces.
  fn pack_bytes(&mut self, bytes: &[u8]) -> Pointer {
    let ptr = self.heap.alloc(bytes.len());
    for (i, b) in bytes.iter().enumerate() {
      self.heap.store8(Pointer { block_index: ptr.block_index, offset: i as u32 }, *b);
    }
    ptr
  }
}

fn offset_ptr(ptr: Pointer, offset: f64) -> Pointer {
  Pointer { block_index: ptr.block_index, offset: ptr.offset.saturating_add(to_i64(offset).max(0) as u32) }
}
