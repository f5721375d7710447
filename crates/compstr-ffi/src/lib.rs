// FFI functions are inherently unsafe; callers must ensure pointer validity.
// Safety contracts are documented per-function in the public API comments.
#![allow(clippy::missing_safety_doc)]

// compstr-ffi: C-compatible layer over the input-context table.
//
// Memory management rules:
// - Opaque `ImcTable` pointer: created by `compstr_table_new`, freed by
//   `compstr_table_free`.
// - Input contexts are plain `u32` handles owned by their table; 0 is never
//   a valid handle.
// - Error strings written through `error_out`: caller frees with
//   `compstr_free_str`.
// - Output buffers are caller-owned; `buf_len == 0` is a size probe and
//   `buf` may then be NULL.
//
// The table is not synchronized. Callers serialize access to one table.

use std::ffi::{CString, c_char, c_int};
use std::slice;

use compstr_core::codepage::CP_ACP;
use compstr_imc::{ClientConfig, Himc, ImcConfig, ImcTable};

// ── Table lifecycle ─────────────────────────────────────────────

/// Create an input-context table.
///
/// `default_ansi_code_page` is what `CP_ACP` (0) resolves to for every
/// context of the table; pass 0 for the built-in default (1252).
#[unsafe(no_mangle)]
pub extern "C" fn compstr_table_new(default_ansi_code_page: u32) -> *mut ImcTable {
    let mut config = ImcConfig::default();
    if default_ansi_code_page != CP_ACP {
        config = config.with_default_ansi_code_page(default_ansi_code_page);
    }
    Box::into_raw(Box::new(ImcTable::new(config)))
}

/// Free a table created by `compstr_table_new`, with all of its contexts.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compstr_table_free(table: *mut ImcTable) {
    if !table.is_null() {
        drop(unsafe { Box::from_raw(table) });
    }
}

// ── Context lifecycle ───────────────────────────────────────────

/// Create an input context for a client.
///
/// `wide != 0` stores the client's composition strings as UTF-16, otherwise
/// in `code_page` (0 for the table's ANSI code page).
///
/// Returns the new handle, or 0 on failure (NULL table, unsupported code page).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compstr_context_create(
    table: *mut ImcTable,
    wide: c_int,
    code_page: u32,
) -> u32 {
    let Some(table) = (unsafe { table.as_mut() }) else {
        return 0;
    };
    let client = ClientConfig {
        wide: wide != 0,
        code_page,
    };
    match table.create_context(client) {
        Ok(himc) => himc.0,
        Err(e) => {
            tracing::warn!(error = %e, "compstr_context_create failed");
            0
        }
    }
}

/// Destroy an input context. Returns 1 if it existed, 0 otherwise.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compstr_context_destroy(table: *mut ImcTable, himc: u32) -> c_int {
    let Some(table) = (unsafe { table.as_mut() }) else {
        return 0;
    };
    c_int::from(table.destroy_context(Himc(himc)))
}

/// Install a composition-string record on a context.
///
/// `data` + `len`: the complete record blob, copied by the call. It must be
/// stored in the context's encoding.
///
/// Returns 1 on success, 0 on failure. On failure, if `error_out` is
/// non-NULL, it receives a heap-allocated error string that the caller must
/// free with `compstr_free_str`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compstr_context_attach(
    table: *mut ImcTable,
    himc: u32,
    data: *const u8,
    len: usize,
    error_out: *mut *mut c_char,
) -> c_int {
    let Some(table) = (unsafe { table.as_mut() }) else {
        set_error(error_out, "table is null");
        return 0;
    };
    if data.is_null() || len == 0 {
        set_error(error_out, "data is null or empty");
        return 0;
    }
    let blob = unsafe { slice::from_raw_parts(data, len) }.to_vec();
    match table.attach_composition_string(Himc(himc), blob) {
        Ok(()) => 1,
        Err(e) => {
            set_error(error_out, &e.to_string());
            0
        }
    }
}

// ── Query path ──────────────────────────────────────────────────

/// Read a composition-string field as narrow (code-page) text.
///
/// `buf_len == 0` returns the required size in bytes without writing.
/// Otherwise at most `buf_len` bytes are written to `buf` and the number
/// written is returned. The cursor and delta-start fields return their value.
///
/// Returns `IMM_ERROR_GENERAL` (-2) for an unknown `index`, and 0 for a NULL
/// table, an unknown handle, a context without a composition string, or a
/// NULL `buf` with a non-zero `buf_len`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn imm_get_composition_string_a(
    table: *const ImcTable,
    himc: u32,
    index: u32,
    buf: *mut u8,
    buf_len: u32,
) -> i32 {
    let Some(table) = (unsafe { table.as_ref() }) else {
        return 0;
    };
    let Some(out) = (unsafe { out_buffer(buf, buf_len) }) else {
        return 0;
    };
    table.get_composition_string_a(Himc(himc), index, out)
}

/// Read a composition-string field as wide (UTF-16LE) text.
///
/// Same contract as `imm_get_composition_string_a`; sizes are in bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn imm_get_composition_string_w(
    table: *const ImcTable,
    himc: u32,
    index: u32,
    buf: *mut u8,
    buf_len: u32,
) -> i32 {
    let Some(table) = (unsafe { table.as_ref() }) else {
        return 0;
    };
    let Some(out) = (unsafe { out_buffer(buf, buf_len) }) else {
        return 0;
    };
    table.get_composition_string_w(Himc(himc), index, out)
}

/// Write path for narrow clients. Not supported: always returns 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn imm_set_composition_string_a(
    table: *mut ImcTable,
    himc: u32,
    index: u32,
    comp: *const u8,
    comp_len: u32,
    read: *const u8,
    read_len: u32,
) -> c_int {
    let Some(table) = (unsafe { table.as_mut() }) else {
        return 0;
    };
    let comp = unsafe { in_buffer(comp, comp_len) };
    let read = unsafe { in_buffer(read, read_len) };
    c_int::from(table.set_composition_string_a(Himc(himc), index, comp, read))
}

/// Write path for wide clients. Not supported: always returns 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn imm_set_composition_string_w(
    table: *mut ImcTable,
    himc: u32,
    index: u32,
    comp: *const u8,
    comp_len: u32,
    read: *const u8,
    read_len: u32,
) -> c_int {
    let Some(table) = (unsafe { table.as_mut() }) else {
        return 0;
    };
    let comp = unsafe { in_buffer(comp, comp_len) };
    let read = unsafe { in_buffer(read, read_len) };
    c_int::from(table.set_composition_string_w(Himc(himc), index, comp, read))
}

// ── Utility functions ───────────────────────────────────────────

/// Return the library version string.
///
/// The returned pointer is static. Do NOT free it.
#[unsafe(no_mangle)]
pub extern "C" fn compstr_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr().cast()
}

/// Free a heap-allocated C string returned through `error_out`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compstr_free_str(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ── Internal helpers ────────────────────────────────────────────

/// Caller's output buffer. An empty slice for a probe; `None` when a
/// non-zero length comes with a NULL pointer.
unsafe fn out_buffer<'a>(buf: *mut u8, len: u32) -> Option<&'a mut [u8]> {
    if len == 0 {
        return Some(&mut []);
    }
    if buf.is_null() {
        return None;
    }
    Some(unsafe { slice::from_raw_parts_mut(buf, len as usize) })
}

unsafe fn in_buffer<'a>(data: *const u8, len: u32) -> &'a [u8] {
    if data.is_null() || len == 0 {
        return &[];
    }
    unsafe { slice::from_raw_parts(data, len as usize) }
}

fn str_to_c(s: &str) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

fn set_error(out: *mut *mut c_char, msg: &str) {
    if !out.is_null() {
        unsafe {
            *out = str_to_c(msg);
        }
    }
}
