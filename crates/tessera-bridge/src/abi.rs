// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// C ABI view of tagged values.
//
// Platform code built separately from the engine (Swift, Kotlin via JNI, C++)
// never sees `TaggedValue` directly. It receives a `*const RawValue` whose
// layout is fixed by `#[repr(C)]` and reads it through the `tessera_value_*`
// functions below.
//
// ## Scope contract
//
// A raw handle is lent by a `ValueScope` and is valid only until that scope
// is dropped. The text pointer inside a string handle points into the lender's
// `TaggedValue`, so a consumer that needs the data afterwards must copy it
// (`RawValue::to_tagged`, or a memcpy on the C side) before returning.
// Handles must not be sent to another thread.
//
// When poisoning is enabled (debug builds by default) the scope clears every
// handle it lent as it ends and parks the allocation in a small per-thread
// quarantine. A handle retained past its scope then reads as
// `ValueKind::Invalid` with an error diagnostic instead of touching freed
// memory, as long as it is read before the quarantine recycles it.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::c_char;
use std::marker::PhantomData;

use tessera_core::types::ValueKind;
use tracing::error;

use crate::value::TaggedValue;

/// Set on handles whose lending scope has ended.
pub const FLAG_POISONED: u32 = 0x1;

/// Poisoned handles kept alive per thread before they are really freed.
const QUARANTINE_CAPACITY: usize = 256;

/// UTF-8 text borrowed from the value's owner. Not NUL-terminated.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawText {
    pub ptr: *const c_char,
    pub len: usize,
}

/// Payload storage; the active field is selected by `RawValue::kind`.
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawPayload {
    pub integer: i64,
    pub double: f64,
    pub boolean: u8,
    pub text: RawText,
}

/// Binary-stable handle shared with platform code.
#[repr(C)]
pub struct RawValue {
    kind: u32,
    flags: u32,
    payload: RawPayload,
}

const _: () = assert!(std::mem::offset_of!(RawValue, kind) == 0);
const _: () = assert!(std::mem::offset_of!(RawValue, flags) == 4);
const _: () = assert!(std::mem::offset_of!(RawValue, payload) == 8);
const _: () = assert!(std::mem::size_of::<RawText>() == 2 * std::mem::size_of::<usize>());

impl RawValue {
    fn lent(value: &TaggedValue) -> Self {
        let payload = match value.kind() {
            ValueKind::String => {
                let text = value.as_str();
                RawPayload {
                    text: RawText {
                        ptr: text.as_ptr().cast(),
                        len: text.len(),
                    },
                }
            }
            ValueKind::Integer => RawPayload {
                integer: value.as_integer(),
            },
            ValueKind::Double => RawPayload {
                double: value.as_double(),
            },
            ValueKind::Boolean => RawPayload {
                boolean: u8::from(value.as_boolean()),
            },
            ValueKind::Invalid => RawPayload { integer: 0 },
        };
        Self {
            kind: value.kind().code(),
            flags: 0,
            payload,
        }
    }

    /// A string handle over text owned by foreign code. The text is not
    /// validated here; `as_str` validates on read.
    ///
    /// # Safety
    /// `ptr` must be null or point to `len` readable bytes that stay alive
    /// and unmodified for as long as the handle is used.
    pub unsafe fn foreign_string(ptr: *const c_char, len: usize) -> Self {
        let len = if ptr.is_null() { 0 } else { len };
        Self {
            kind: ValueKind::String.code(),
            flags: 0,
            payload: RawPayload {
                text: RawText { ptr, len },
            },
        }
    }

    pub fn integer(value: i64) -> Self {
        Self {
            kind: ValueKind::Integer.code(),
            flags: 0,
            payload: RawPayload { integer: value },
        }
    }

    pub fn double(value: f64) -> Self {
        Self {
            kind: ValueKind::Double.code(),
            flags: 0,
            payload: RawPayload { double: value },
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            kind: ValueKind::Boolean.code(),
            flags: 0,
            payload: RawPayload {
                boolean: u8::from(value),
            },
        }
    }

    /// Reborrow a raw handle.
    ///
    /// # Safety
    /// `ptr` must be null or point to a `RawValue` that is alive for `'a`:
    /// lent in the caller's current scope, or built by the caller.
    pub unsafe fn from_ptr<'a>(ptr: *const RawValue) -> Option<&'a RawValue> {
        // SAFETY: forwarded to the caller.
        unsafe { ptr.as_ref() }
    }

    pub fn is_poisoned(&self) -> bool {
        self.flags & FLAG_POISONED != 0
    }

    /// The handle's kind; `Invalid` for poisoned handles and unknown codes.
    pub fn kind(&self) -> ValueKind {
        if self.is_poisoned() {
            error!(
                target: "tessera::abi",
                "value handle read after its lending scope ended"
            );
            return ValueKind::Invalid;
        }
        ValueKind::from_code(self.kind)
    }

    pub fn is_kind(&self, kind: ValueKind) -> bool {
        self.kind() == kind
    }

    pub fn is_string(&self) -> bool {
        self.is_kind(ValueKind::String)
    }

    pub fn is_integer(&self) -> bool {
        self.is_kind(ValueKind::Integer)
    }

    /// Raw text bytes of a string handle; `None` on kind mismatch.
    pub fn text_bytes(&self) -> Option<&[u8]> {
        if !self.is_string() {
            return None;
        }
        // SAFETY: kind is String, so `text` is the active union field.
        let text = unsafe { self.payload.text };
        if text.ptr.is_null() {
            return Some(&[]);
        }
        // SAFETY: the lender guarantees `len` readable bytes at `ptr` for as
        // long as the handle is valid, which bounds `&self`.
        Some(unsafe { std::slice::from_raw_parts(text.ptr.cast::<u8>(), text.len) })
    }

    /// Text view; `""` on kind mismatch or when foreign text is not UTF-8.
    pub fn as_str(&self) -> &str {
        self.text_bytes()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .unwrap_or("")
    }

    pub fn as_integer(&self) -> i64 {
        if !self.is_integer() {
            return 0;
        }
        // SAFETY: kind is Integer.
        unsafe { self.payload.integer }
    }

    pub fn as_double(&self) -> f64 {
        if !self.is_kind(ValueKind::Double) {
            return 0.0;
        }
        // SAFETY: kind is Double.
        unsafe { self.payload.double }
    }

    pub fn as_boolean(&self) -> bool {
        if !self.is_kind(ValueKind::Boolean) {
            return false;
        }
        // SAFETY: kind is Boolean.
        unsafe { self.payload.boolean != 0 }
    }

    /// Copy the payload into an owned value that outlives the handle.
    pub fn to_tagged(&self) -> Option<TaggedValue> {
        match self.kind() {
            ValueKind::String => Some(TaggedValue::string(self.as_str())),
            ValueKind::Integer => Some(TaggedValue::integer(self.as_integer())),
            ValueKind::Double => Some(TaggedValue::double(self.as_double())),
            ValueKind::Boolean => Some(TaggedValue::boolean(self.as_boolean())),
            ValueKind::Invalid => None,
        }
    }

    fn poison(&mut self) {
        self.kind = ValueKind::Invalid.code();
        self.flags |= FLAG_POISONED;
        self.payload = RawPayload {
            text: RawText {
                ptr: std::ptr::null(),
                len: 0,
            },
        };
    }
}

thread_local! {
    static QUARANTINE: RefCell<VecDeque<Box<RawValue>>> = const { RefCell::new(VecDeque::new()) };
}

fn quarantine(handle: Box<RawValue>) {
    // During thread teardown the quarantine may already be gone; the handle
    // is then simply freed.
    let _ = QUARANTINE.try_with(|cell| {
        let mut parked = cell.borrow_mut();
        if parked.len() == QUARANTINE_CAPACITY {
            parked.pop_front();
        }
        parked.push_back(handle);
    });
}

/// Lends raw handles for the duration of one boundary call.
///
/// The `'v` lifetime ties every lent handle to the values it borrows from, so
/// the scope cannot outlive them.
pub struct ValueScope<'v> {
    handles: Vec<Box<RawValue>>,
    poison: bool,
    _lent: PhantomData<&'v TaggedValue>,
}

impl<'v> ValueScope<'v> {
    pub fn new(poison: bool) -> Self {
        Self {
            handles: Vec::new(),
            poison,
            _lent: PhantomData,
        }
    }

    /// Lend `value` as a raw handle valid until this scope is dropped.
    pub fn lend(&mut self, value: &'v TaggedValue) -> *const RawValue {
        let handle = Box::new(RawValue::lent(value));
        let ptr: *const RawValue = &*handle;
        self.handles.push(handle);
        ptr
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Drop for ValueScope<'_> {
    fn drop(&mut self) {
        if !self.poison {
            return;
        }
        for mut handle in self.handles.drain(..) {
            handle.poison();
            quarantine(handle);
        }
    }
}

/// Lend a single value to `f` and end the scope when `f` returns.
pub fn lend<R>(value: &TaggedValue, poison: bool, f: impl FnOnce(*const RawValue) -> R) -> R {
    let mut scope = ValueScope::new(poison);
    let handle = scope.lend(value);
    f(handle)
}

// ---------------------------------------------------------------------------
// Exported accessor surface
// ---------------------------------------------------------------------------
//
// Every function accepts a null handle and answers it like a kind mismatch.

/// Kind code of `value` (`0` for null or poisoned handles).
///
/// # Safety
/// `value` must be null or a handle that is valid in the caller's scope.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tessera_value_kind(value: *const RawValue) -> u32 {
    // SAFETY: forwarded to the caller.
    match unsafe { RawValue::from_ptr(value) } {
        Some(raw) => raw.kind().code(),
        None => ValueKind::Invalid.code(),
    }
}

/// # Safety
/// See [`tessera_value_kind`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tessera_value_is_string(value: *const RawValue) -> bool {
    // SAFETY: forwarded to the caller.
    unsafe { RawValue::from_ptr(value) }.is_some_and(RawValue::is_string)
}

/// # Safety
/// See [`tessera_value_kind`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tessera_value_is_integer(value: *const RawValue) -> bool {
    // SAFETY: forwarded to the caller.
    unsafe { RawValue::from_ptr(value) }.is_some_and(RawValue::is_integer)
}

/// Borrowed text of a string handle, with its byte length in `out_len`.
/// Returns null (and length 0) on kind mismatch.
///
/// # Safety
/// See [`tessera_value_kind`]. `out_len` must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tessera_value_as_string(
    value: *const RawValue,
    out_len: *mut usize,
) -> *const c_char {
    // SAFETY: forwarded to the caller.
    let bytes = unsafe { RawValue::from_ptr(value) }.and_then(RawValue::text_bytes);
    let (ptr, len) = match bytes {
        Some(bytes) => (bytes.as_ptr().cast::<c_char>(), bytes.len()),
        None => (std::ptr::null(), 0),
    };
    if !out_len.is_null() {
        // SAFETY: non-null and writable per the contract above.
        unsafe { out_len.write(len) };
    }
    ptr
}

/// Integer payload, `0` on kind mismatch.
///
/// # Safety
/// See [`tessera_value_kind`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tessera_value_as_integer(value: *const RawValue) -> i64 {
    // SAFETY: forwarded to the caller.
    unsafe { RawValue::from_ptr(value) }.map_or(0, RawValue::as_integer)
}

/// Double payload, `0.0` on kind mismatch.
///
/// # Safety
/// See [`tessera_value_kind`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tessera_value_as_double(value: *const RawValue) -> f64 {
    // SAFETY: forwarded to the caller.
    unsafe { RawValue::from_ptr(value) }.map_or(0.0, RawValue::as_double)
}

/// Boolean payload, `false` on kind mismatch.
///
/// # Safety
/// See [`tessera_value_kind`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tessera_value_as_boolean(value: *const RawValue) -> bool {
    // SAFETY: forwarded to the caller.
    unsafe { RawValue::from_ptr(value) }.is_some_and(RawValue::as_boolean)
}

/// Build a string handle over caller-owned text. The caller keeps ownership
/// of the bytes.
///
/// # Safety
/// `ptr` must be null or point to `len` readable bytes that stay alive and
/// unmodified for as long as the handle is used.
///
/// Calling it without `unsafe` does not compile:
///
/// ```compile_fail,E0133
/// use tessera_bridge::abi::tessera_value_from_string;
///
/// let raw = tessera_value_from_string(16 as *const std::ffi::c_char, 64);
/// ```
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tessera_value_from_string(ptr: *const c_char, len: usize) -> RawValue {
    // SAFETY: forwarded to the caller.
    unsafe { RawValue::foreign_string(ptr, len) }
}

#[unsafe(no_mangle)]
pub extern "C" fn tessera_value_from_integer(value: i64) -> RawValue {
    RawValue::integer(value)
}

#[unsafe(no_mangle)]
pub extern "C" fn tessera_value_from_double(value: f64) -> RawValue {
    RawValue::double(value)
}

#[unsafe(no_mangle)]
pub extern "C" fn tessera_value_from_boolean(value: bool) -> RawValue {
    RawValue::boolean(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_string(handle: *const RawValue) -> Option<String> {
        let mut len = usize::MAX;
        let ptr = unsafe { tessera_value_as_string(handle, &mut len) };
        if ptr.is_null() {
            assert_eq!(len, 0);
            return None;
        }
        let bytes = unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) };
        Some(String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn string_through_abi() {
        let value = TaggedValue::from("x");
        lend(&value, true, |handle| unsafe {
            assert_eq!(tessera_value_kind(handle), ValueKind::String.code());
            assert!(tessera_value_is_string(handle));
            assert!(!tessera_value_is_integer(handle));
            assert_eq!(read_string(handle).as_deref(), Some("x"));
            assert_eq!(tessera_value_as_integer(handle), 0);
        });
    }

    #[test]
    fn integer_through_abi() {
        let value = TaggedValue::from(-42_i64);
        lend(&value, true, |handle| unsafe {
            assert_eq!(tessera_value_kind(handle), ValueKind::Integer.code());
            assert!(tessera_value_is_integer(handle));
            assert!(!tessera_value_is_string(handle));
            assert_eq!(tessera_value_as_integer(handle), -42);
            assert_eq!(read_string(handle), None);
        });
    }

    #[test]
    fn double_and_boolean_through_abi() {
        let size = TaggedValue::double(14.5);
        let flag = TaggedValue::boolean(true);
        let mut scope = ValueScope::new(false);
        let size_handle = scope.lend(&size);
        let flag_handle = scope.lend(&flag);
        assert_eq!(scope.len(), 2);
        unsafe {
            assert_eq!(tessera_value_as_double(size_handle), 14.5);
            assert!(!tessera_value_as_boolean(size_handle));
            assert!(tessera_value_as_boolean(flag_handle));
            assert_eq!(tessera_value_as_double(flag_handle), 0.0);
        }
    }

    #[test]
    fn null_handle_reads_as_invalid() {
        let null = std::ptr::null();
        unsafe {
            assert_eq!(tessera_value_kind(null), ValueKind::Invalid.code());
            assert!(!tessera_value_is_string(null));
            assert_eq!(tessera_value_as_integer(null), 0);
            assert!(!tessera_value_as_boolean(null));
        }
        assert_eq!(read_string(null), None);
    }

    #[test]
    fn retained_handle_is_poisoned() {
        let value = TaggedValue::from("short-lived");
        let retained = lend(&value, true, |handle| handle);

        // The allocation is parked in this thread's quarantine.
        let raw = unsafe { RawValue::from_ptr(retained) }.unwrap();
        assert!(raw.is_poisoned());
        assert_eq!(raw.kind(), ValueKind::Invalid);
        assert_eq!(raw.as_str(), "");
        assert_eq!(raw.to_tagged(), None);
        assert_eq!(read_string(retained), None);
    }

    #[test]
    fn copy_out_survives_scope() {
        let value = TaggedValue::from("keep me");
        let copied = lend(&value, true, |handle| {
            unsafe { RawValue::from_ptr(handle) }.and_then(RawValue::to_tagged)
        });
        assert_eq!(copied, Some(TaggedValue::from("keep me")));
    }

    #[test]
    fn foreign_text_is_validated() {
        let good = b"caf\xc3\xa9";
        // SAFETY: `good` outlives `raw` and holds exactly `len` bytes.
        let raw = unsafe { tessera_value_from_string(good.as_ptr().cast(), good.len()) };
        assert_eq!(raw.as_str(), "café");

        let bad = [0xff_u8, 0xfe];
        // SAFETY: as above.
        let raw = unsafe { tessera_value_from_string(bad.as_ptr().cast(), bad.len()) };
        assert!(raw.is_string());
        assert_eq!(raw.as_str(), "");
        assert_eq!(raw.text_bytes(), Some(&bad[..]));
    }

    #[test]
    fn null_foreign_text_ignores_length() {
        // SAFETY: a null pointer is always accepted; the length is dropped.
        let raw = unsafe { tessera_value_from_string(std::ptr::null(), 12) };
        assert!(raw.is_string());
        assert_eq!(raw.text_bytes(), Some(&[][..]));
        assert_eq!(raw.as_str(), "");
        assert_eq!(raw.to_tagged(), Some(TaggedValue::string("")));

        // SAFETY: as above.
        let raw = unsafe { RawValue::foreign_string(std::ptr::null(), usize::MAX) };
        assert_eq!(raw.text_bytes(), Some(&[][..]));
    }

    #[test]
    fn foreign_scalars_round_into_tagged() {
        assert_eq!(
            tessera_value_from_integer(9).to_tagged(),
            Some(TaggedValue::integer(9))
        );
        assert_eq!(
            tessera_value_from_boolean(true).to_tagged(),
            Some(TaggedValue::boolean(true))
        );
        assert_eq!(tessera_value_from_double(2.0).kind(), ValueKind::Double);
    }
}
