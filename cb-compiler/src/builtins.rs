//! The `__`-prefixed builtin call table (§4.5): "Calls to identifiers
//! beginning with `__` compile to their dedicated opcode... with
//! argument-stack order defined per opcode." Only a handful of opcodes carry
//! an immediate operand (the catalogue in §6); the rest simply pop their
//! fixed argument count straight off the stack.

use cb_core::chunk::OpCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
  Fixed(u8),
  /// Carries a trailing `u8 argc` operand (`OP_FORMAT`, the variable-argc
  /// FFI opcodes).
  Variable,
}

pub struct BuiltinSpec {
  pub name: &'static str,
  pub op: OpCode,
  pub arity: Arity,
}

/// `print` and the handful of builtins whose return value is never
/// meaningful to auto-echo at the top level (§4.5's "known statement-like
/// builtins" list plus the memory/container mutators documented in §6's
/// argument-stack-order section).
pub const STATEMENT_LIKE: &[&str] = &[
  "__append",
  "__pop",
  "__map_set",
  "__store8",
  "__store16",
  "__store32",
  "__store64",
  "__storef32",
  "__memcpy",
  "__memset",
  "__free",
  "__exit",
  "__array_reserve",
  "__array_clear",
  "__map_del",
  "__map_clear",
  "__fclose",
  "__fwrite",
  "__write_file",
];

macro_rules! spec {
  ($name:expr, $op:ident, fixed $n:expr) => {
    BuiltinSpec { name: $name, op: OpCode::$op, arity: Arity::Fixed($n) }
  };
  ($name:expr, $op:ident, variable) => {
    BuiltinSpec { name: $name, op: OpCode::$op, arity: Arity::Variable }
  };
}

pub const BUILTINS: &[BuiltinSpec] = &[
  spec!("__alloc", Alloc, fixed 1),
  spec!("__free", Free, fixed 1),
  spec!("__ptr_add", PtrAdd, fixed 2),
  spec!("__load8", Load8, fixed 2),
  spec!("__store8", Store8, fixed 3),
  spec!("__load16", Load16, fixed 2),
  spec!("__store16", Store16, fixed 3),
  spec!("__load32", Load32, fixed 2),
  spec!("__store32", Store32, fixed 3),
  spec!("__load64", Load64, fixed 2),
  spec!("__store64", Store64, fixed 3),
  spec!("__loadf32", LoadF32, fixed 2),
  spec!("__storef32", StoreF32, fixed 3),
  spec!("__memcpy", Memcpy, fixed 3),
  spec!("__memset", Memset, fixed 3),
  spec!("__ptr_diff", PtrDiff, fixed 2),
  spec!("__realloc", Realloc, fixed 2),
  spec!("__block_size", BlockSize, fixed 1),
  spec!("__ptr_offset", PtrOffset, fixed 1),
  spec!("__ptr_block", PtrBlock, fixed 1),
  spec!("__pack_f64le", PackF64Le, fixed 1),
  spec!("__pack_u16le", PackU16Le, fixed 1),
  spec!("__pack_u32le", PackU32Le, fixed 1),
  spec!("__read_file", ReadFile, fixed 1),
  spec!("__write_file", WriteFile, fixed 2),
  spec!("__file_exists", FileExists, fixed 1),
  spec!("__fopen", Fopen, fixed 2),
  spec!("__fclose", Fclose, fixed 1),
  spec!("__fread", Fread, fixed 2),
  spec!("__freadline", Freadline, fixed 1),
  spec!("__fwrite", Fwrite, fixed 2),
  spec!("__stdin", Stdin, fixed 0),
  spec!("__stdout", Stdout, fixed 0),
  spec!("__stderr", Stderr, fixed 0),
  spec!("__assert", Assert, fixed 1),
  spec!("__panic", Panic, fixed 1),
  spec!("__exit", Exit, fixed 1),
  spec!("__emit_chunk", EmitChunk, fixed 0),
  spec!("__opcode_id", OpcodeId, fixed 1),
  spec!("__calln_arr", CallnArr, fixed 2),
  spec!("__len", Len, fixed 1),
  spec!("__append", Append, fixed 2),
  spec!("__pop", ArrayPop, fixed 1),
  spec!("__array_reserve", ArrayReserve, fixed 2),
  spec!("__array_clear", ArrayClear, fixed 1),
  spec!("__new_map", NewMap, fixed 0),
  spec!("__map_get", MapGet, fixed 2),
  spec!("__map_set", MapSet, fixed 3),
  spec!("__map_has", MapHas, fixed 2),
  spec!("__map_del", MapDel, fixed 2),
  spec!("__map_keys", MapKeys, fixed 1),
  spec!("__map_size", MapSize, fixed 1),
  spec!("__map_clear", MapClear, fixed 1),
  spec!("__str_index", StrIndex, fixed 2),
  spec!("__substr", Substr, fixed 3),
  spec!("__str_find", StrFind, fixed 2),
  spec!("__split", Split, fixed 2),
  spec!("__str_cat", StrCat, fixed 2),
  spec!("__join", Join, fixed 2),
  spec!("__trim", Trim, fixed 1),
  spec!("__replace", Replace, fixed 3),
  spec!("__str_upper", StrUpper, fixed 1),
  spec!("__str_lower", StrLower, fixed 1),
  spec!("__str_contains", StrContains, fixed 2),
  spec!("__format", Format, variable),
  spec!("__starts_with", StartsWith, fixed 2),
  spec!("__ends_with", EndsWith, fixed 2),
  spec!("__ord", Ord, fixed 1),
  spec!("__chr", Chr, fixed 1),
  spec!("__to_string", ToString, fixed 1),
  spec!("__parse_int", ParseInt, fixed 1),
  spec!("__parse_float", ParseFloat, fixed 1),
  spec!("__floor", Floor, fixed 1),
  spec!("__ceil", Ceil, fixed 1),
  spec!("__round", Round, fixed 1),
  spec!("__sqrt", Sqrt, fixed 1),
  spec!("__abs", Abs, fixed 1),
  spec!("__pow", Pow, fixed 2),
  spec!("__exp", Exp, fixed 1),
  spec!("__log", Log, fixed 1),
  spec!("__sin", Sin, fixed 1),
  spec!("__cos", Cos, fixed 1),
  spec!("__tan", Tan, fixed 1),
  spec!("__asin", Asin, fixed 1),
  spec!("__acos", Acos, fixed 1),
  spec!("__atan", Atan, fixed 1),
  spec!("__atan2", Atan2, fixed 2),
  spec!("__random", Random, fixed 0),
  spec!("__band", BAnd, fixed 2),
  spec!("__bor", BOr, fixed 2),
  spec!("__bxor", BXor, fixed 2),
  spec!("__shl", Shl, fixed 2),
  spec!("__shr", Shr, fixed 2),
  spec!("__ffi_call", FfiCall, variable),
  spec!("__ffi_call_sig", FfiCallSig, variable),
  spec!("__ffi_proc", FfiProc, fixed 2),
  spec!("__ffi_call_ptr", FfiCallPtr, variable),
];

pub fn lookup(name: &str) -> Option<&'static BuiltinSpec> {
  BUILTINS.iter().find(|b| b.name == name)
}

pub fn is_statement_like(name: &str) -> bool {
  STATEMENT_LIKE.contains(&name)
}
