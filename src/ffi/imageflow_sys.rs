// Phase 2: Hand-written FFI bindings for the imageflow engine ABI.
// We bind the symbols directly rather than running bindgen over the shipped
// header; the surface is small and the signatures are stable per ABI major.

use libc::{c_char, size_t};

/// ABI version pair this binding was written against. The engine accepts a
/// request when the major matches exactly and the requested minor does not
/// exceed the engine's minor.
pub const ABI_VERSION_MAJOR: u32 = 3;
pub const ABI_VERSION_MINOR: u32 = 0;

/// Opaque representation of the engine's context structure.
/// We never access internal fields; all interaction goes through the C API.
#[repr(C)]
pub struct ImageflowContext {
    _opaque: [u8; 0],
}

/// Opaque representation of one completed request's result, owned by the
/// context that produced it.
#[repr(C)]
pub struct ImageflowJsonResponse {
    _opaque: [u8; 0],
}

/// How long a buffer handed to the engine must remain valid.
#[repr(C)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Lifetime {
    /// The engine copies the buffer before returning; it may be freed as
    /// soon as the call returns.
    OutlivesFunctionCall = 0,
    /// The engine borrows the buffer; it must stay valid and unmodified
    /// until the context is destroyed.
    OutlivesContext = 1,
}

unsafe extern "C" {
    // --- ABI introspection ---

    pub fn imageflow_abi_compatible(
        imageflow_abi_ver_major: u32,
        imageflow_abi_ver_minor: u32,
    ) -> bool;
    pub fn imageflow_abi_version_major() -> u32;
    pub fn imageflow_abi_version_minor() -> u32;

    // --- Context creation and destruction ---

    /// Returns NULL if allocation fails or the requested version pair is
    /// incompatible with the loaded engine.
    pub fn imageflow_context_create(
        imageflow_abi_ver_major: u32,
        imageflow_abi_ver_minor: u32,
    ) -> *mut ImageflowContext;
    pub fn imageflow_context_destroy(context: *mut ImageflowContext);

    // --- Error channel ---

    pub fn imageflow_context_has_error(context: *mut ImageflowContext) -> bool;
    pub fn imageflow_context_error_recoverable(context: *mut ImageflowContext) -> bool;
    pub fn imageflow_context_error_try_clear(context: *mut ImageflowContext) -> bool;
    pub fn imageflow_context_error_code(context: *mut ImageflowContext) -> i32;
    pub fn imageflow_context_error_as_exit_code(context: *mut ImageflowContext) -> i32;
    pub fn imageflow_context_error_as_http_code(context: *mut ImageflowContext) -> i32;

    /// Writes the current error (message and native stack frames) into
    /// `buffer` as null-terminated UTF-8. `bytes_written`, when non-NULL,
    /// receives the byte count excluding the terminator. Returns false when
    /// the message was truncated to fit `buffer_length`.
    pub fn imageflow_context_error_write_to_buffer(
        context: *mut ImageflowContext,
        buffer: *mut c_char,
        buffer_length: size_t,
        bytes_written: *mut size_t,
    ) -> bool;

    // --- JSON request/response ---

    /// Synchronously dispatches a JSON request to the named endpoint.
    /// Returns NULL on failure; the context error flag must be consulted to
    /// distinguish failure from an empty result.
    pub fn imageflow_context_send_json(
        context: *mut ImageflowContext,
        method: *const c_char,
        json_buffer: *const u8,
        json_buffer_size: size_t,
    ) -> *const ImageflowJsonResponse;

    /// Extracts status code and payload pointer/length from a response.
    /// The payload pointer is valid until the response (or its context) is
    /// destroyed. Returns false if the handle could not be read.
    pub fn imageflow_json_response_read(
        context: *mut ImageflowContext,
        response_in: *const ImageflowJsonResponse,
        status_as_http_code_out: *mut i64,
        buffer_utf8_no_nulls_out: *mut *const u8,
        buffer_size_out: *mut size_t,
    ) -> bool;

    pub fn imageflow_json_response_destroy(
        context: *mut ImageflowContext,
        response: *mut ImageflowJsonResponse,
    ) -> bool;

    // --- Job I/O buffers ---

    pub fn imageflow_context_add_input_buffer(
        context: *mut ImageflowContext,
        io_id: i32,
        buffer: *const u8,
        buffer_byte_count: size_t,
        lifetime: Lifetime,
    ) -> bool;

    pub fn imageflow_context_add_output_buffer(
        context: *mut ImageflowContext,
        io_id: i32,
    ) -> bool;

    /// Writes the engine-owned output buffer's pointer and length to the
    /// out-parameters. The pointer is read-only and valid until context
    /// destruction or until a later operation grows the buffer.
    pub fn imageflow_context_get_output_buffer_by_id(
        context: *mut ImageflowContext,
        io_id: i32,
        result_buffer: *mut *const u8,
        result_buffer_length: *mut size_t,
    ) -> bool;
}
