// Phase 3: 安全ラッパー（Context/JsonResponse型、RAII Drop）

use std::ffi::CString;
use std::ptr;
use std::slice;

use libc::c_char;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::imageflow_sys as sys;
use crate::error::{BridgeError, Result};
use crate::json::endpoints;
use crate::json::messages::{EmptyRequest, GetVersionInfoResponse, VersionInfo};

/// Status code the engine uses for a successful request.
pub const STATUS_OK: i64 = 200;

/// Initial capacity for the native error formatting buffer; doubled on
/// truncation up to [`MAX_ERROR_MESSAGE_BYTES`].
const INITIAL_ERROR_BUFFER_BYTES: usize = 2048;
const MAX_ERROR_MESSAGE_BYTES: usize = 1 << 20;

/// Version pair exposed by the loaded engine.
pub fn abi_version() -> (u32, u32) {
    unsafe {
        (
            sys::imageflow_abi_version_major(),
            sys::imageflow_abi_version_minor(),
        )
    }
}

/// Asks the loaded engine whether it accepts the given version pair.
pub fn abi_compatible(major: u32, minor: u32) -> bool {
    unsafe { sys::imageflow_abi_compatible(major, minor) }
}

/// Safe wrapper around one engine session.
///
/// Owns the native context handle exclusively; the handle is destroyed
/// exactly once when the `Context` is dropped. Responses produced by
/// [`Context::send`] borrow the context and therefore cannot outlive it.
///
/// A context is single-threaded: the wrapper holds a raw pointer and is
/// neither `Send` nor `Sync`, so the one-context-one-thread rule is enforced
/// by the type system rather than by documentation alone.
pub struct Context {
    ptr: *mut sys::ImageflowContext,
}

impl Context {
    /// Create a context negotiating the ABI version this binding was
    /// written against.
    pub fn create() -> Result<Self> {
        Self::create_with_version(sys::ABI_VERSION_MAJOR, sys::ABI_VERSION_MINOR)
    }

    /// Create a context negotiating an explicit ABI version pair.
    ///
    /// # Arguments
    /// * `major` - Requested ABI major; must equal the engine's major
    /// * `minor` - Requested ABI minor; must not exceed the engine's minor
    ///
    /// # Returns
    /// `Ok(Context)` on success. A NULL handle from the engine (version
    /// mismatch or allocation failure) maps to `Err`; there is no retry.
    pub fn create_with_version(major: u32, minor: u32) -> Result<Self> {
        let ptr = unsafe { sys::imageflow_context_create(major, minor) };
        if ptr.is_null() {
            let (engine_major, engine_minor) = abi_version();
            Err(BridgeError::context(format!(
                "Failed to create engine context: requested ABI {major}.{minor}, \
                 engine provides {engine_major}.{engine_minor}"
            )))
        } else {
            debug!(major, minor, "created engine context");
            Ok(Context { ptr })
        }
    }

    /// True if a prior operation on this context failed. The flag is not
    /// consumed by reading it.
    pub fn has_error(&self) -> bool {
        unsafe { sys::imageflow_context_has_error(self.ptr) }
    }

    /// True if the current error state can be cleared with
    /// [`Context::try_clear_error`]. Panics and critical errors cannot.
    pub fn error_recoverable(&self) -> bool {
        unsafe { sys::imageflow_context_error_recoverable(self.ptr) }
    }

    /// Attempts to clear a recoverable error. Returns true if the context
    /// is error-free afterwards. Once an unrecoverable error is set, the
    /// only safe path is to drop the context and create a new one.
    pub fn try_clear_error(&mut self) -> bool {
        unsafe { sys::imageflow_context_error_try_clear(self.ptr) }
    }

    /// Numeric error category code; 0 when no error is set.
    pub fn error_code(&self) -> i32 {
        unsafe { sys::imageflow_context_error_code(self.ptr) }
    }

    /// Unix exit code suggested for the current error state.
    pub fn error_as_exit_code(&self) -> i32 {
        unsafe { sys::imageflow_context_error_as_exit_code(self.ptr) }
    }

    /// HTTP status code suggested for the current error state.
    pub fn error_as_http_code(&self) -> i32 {
        unsafe { sys::imageflow_context_error_as_http_code(self.ptr) }
    }

    /// Formats the last error into a caller-supplied buffer.
    ///
    /// Writes at most `buffer.len()` bytes (null-terminated UTF-8) and
    /// truncates when the message does not fit; the buffer is never
    /// overflowed. Returns the number of message bytes written, excluding
    /// the terminator.
    pub fn write_error_to_buffer(&self, buffer: &mut [u8]) -> Result<usize> {
        if buffer.is_empty() {
            return Err(BridgeError::usage("Error buffer capacity must be non-zero"));
        }
        let mut written: libc::size_t = 0;
        unsafe {
            sys::imageflow_context_error_write_to_buffer(
                self.ptr,
                buffer.as_mut_ptr() as *mut c_char,
                buffer.len(),
                &mut written,
            );
        }
        Ok(written.min(buffer.len()))
    }

    /// Returns the full formatted error message, or `None` when no error is
    /// set. Grows the buffer until the engine reports a complete write, so
    /// the message is never truncated (bounded by an internal cap).
    pub fn error_message(&self) -> Option<String> {
        if !self.has_error() {
            return None;
        }
        let mut capacity = INITIAL_ERROR_BUFFER_BYTES;
        loop {
            let mut buffer = vec![0u8; capacity];
            let mut written: libc::size_t = 0;
            let complete = unsafe {
                sys::imageflow_context_error_write_to_buffer(
                    self.ptr,
                    buffer.as_mut_ptr() as *mut c_char,
                    buffer.len(),
                    &mut written,
                )
            };
            if complete || capacity >= MAX_ERROR_MESSAGE_BYTES {
                buffer.truncate(written.min(capacity));
                return Some(String::from_utf8_lossy(&buffer).into_owned());
            }
            capacity = capacity.saturating_mul(2);
        }
    }

    /// Synchronously dispatches a JSON request to the named endpoint and
    /// blocks until the engine produces a result or fails.
    ///
    /// # Arguments
    /// * `endpoint` - Slash-delimited method path, e.g. `v1/get_version_info`
    /// * `payload` - UTF-8 JSON document, passed by pointer and length
    ///
    /// # Returns
    /// `Ok(JsonResponse)` borrowing this context. Both failure signals are
    /// checked independently: a set error flag yields `Err` with the
    /// formatted native message even when the engine handed back a response
    /// handle, and an absent handle without an error flag is reported as
    /// its own failure.
    pub fn send(&self, endpoint: &str, payload: &[u8]) -> Result<JsonResponse<'_>> {
        let method = CString::new(endpoint).map_err(|_| {
            BridgeError::usage(format!(
                "Endpoint contains an interior NUL byte: {endpoint:?}"
            ))
        })?;

        debug!(endpoint, payload_len = payload.len(), "sending JSON request");
        let response = unsafe {
            sys::imageflow_context_send_json(
                self.ptr,
                method.as_ptr(),
                payload.as_ptr(),
                payload.len(),
            )
        };

        if self.has_error() {
            // The engine may still hand back a response object describing
            // the error; it must not leak.
            if !response.is_null() {
                drop(JsonResponse {
                    ctx: self,
                    ptr: response,
                });
            }
            return Err(BridgeError::request(self.last_error(&format!(
                "Request to '{endpoint}' failed with no error message"
            ))));
        }

        if response.is_null() {
            return Err(BridgeError::request(format!(
                "Engine returned no response for '{endpoint}' and no error state"
            )));
        }

        Ok(JsonResponse {
            ctx: self,
            ptr: response,
        })
    }

    /// Serialize `request`, send it to `endpoint`, require [`STATUS_OK`]
    /// and deserialize the payload.
    ///
    /// A response with another status is surfaced as a status error carrying
    /// the payload text; transport failures surface as request errors.
    pub fn call<Req, Resp>(&self, endpoint: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let payload = serde_json::to_vec(request)?;
        let response = self.send(endpoint, &payload)?;
        let body = response.read()?;
        if body.status != STATUS_OK {
            return Err(BridgeError::status(format!(
                "Endpoint '{endpoint}' answered status {}: {}",
                body.status,
                String::from_utf8_lossy(body.bytes)
            )));
        }
        Ok(serde_json::from_slice(body.bytes)?)
    }

    /// Query the engine's build/version information.
    pub fn get_version_info(&self) -> Result<VersionInfo> {
        let answer: GetVersionInfoResponse =
            self.call(endpoints::GET_VERSION_INFO, &EmptyRequest::default())?;
        Ok(answer.version_info)
    }

    /// Register `bytes` as input `io_id` for subsequent job requests.
    ///
    /// The engine copies the buffer before returning; the borrow-until-
    /// context-death mode of the ABI is not exposed because it cannot be
    /// made safe without pinning guarantees.
    pub fn add_input_bytes(&mut self, io_id: i32, bytes: &[u8]) -> Result<()> {
        let ok = unsafe {
            sys::imageflow_context_add_input_buffer(
                self.ptr,
                io_id,
                bytes.as_ptr(),
                bytes.len(),
                sys::Lifetime::OutlivesFunctionCall,
            )
        };
        if ok {
            Ok(())
        } else {
            Err(BridgeError::request(self.last_error(&format!(
                "Failed to add input buffer {io_id}"
            ))))
        }
    }

    /// Register a growable output buffer under `io_id`, managed by the
    /// engine and freed with the context.
    pub fn add_output_buffer(&mut self, io_id: i32) -> Result<()> {
        let ok = unsafe { sys::imageflow_context_add_output_buffer(self.ptr, io_id) };
        if ok {
            Ok(())
        } else {
            Err(BridgeError::request(self.last_error(&format!(
                "Failed to add output buffer {io_id}"
            ))))
        }
    }

    /// Copy the current contents of output buffer `io_id`.
    ///
    /// The bytes are copied out because the engine-owned pointer can move
    /// when a later request grows the buffer.
    pub fn output_buffer(&self, io_id: i32) -> Result<Vec<u8>> {
        let mut buffer: *const u8 = ptr::null();
        let mut buffer_len: libc::size_t = 0;
        let ok = unsafe {
            sys::imageflow_context_get_output_buffer_by_id(
                self.ptr,
                io_id,
                &mut buffer,
                &mut buffer_len,
            )
        };
        if !ok {
            return Err(BridgeError::request(self.last_error(&format!(
                "Failed to read output buffer {io_id}"
            ))));
        }
        if buffer.is_null() || buffer_len == 0 {
            return Ok(Vec::new());
        }
        Ok(unsafe { slice::from_raw_parts(buffer, buffer_len) }.to_vec())
    }

    fn last_error(&self, fallback: &str) -> String {
        self.error_message()
            .unwrap_or_else(|| fallback.to_string())
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        unsafe {
            if !self.ptr.is_null() {
                sys::imageflow_context_destroy(self.ptr);
                self.ptr = ptr::null_mut();
            }
        }
    }
}

/// Safe wrapper around one completed request's result.
///
/// Borrows the context that produced it, so the response cannot outlive the
/// context; the native handle is released exactly once on drop.
pub struct JsonResponse<'c> {
    ctx: &'c Context,
    ptr: *const sys::ImageflowJsonResponse,
}

/// Status code plus raw payload bytes extracted from a response.
///
/// A successful read can still carry a non-200 status; callers branch on
/// `status` separately from the success of [`JsonResponse::read`] itself.
pub struct ResponseBody<'a> {
    pub status: i64,
    pub bytes: &'a [u8],
}

impl JsonResponse<'_> {
    /// Extract the status code and payload from this response.
    ///
    /// The returned slice borrows the response and stays valid until the
    /// response is dropped.
    pub fn read(&self) -> Result<ResponseBody<'_>> {
        let mut status: i64 = 0;
        let mut buffer: *const u8 = ptr::null();
        let mut buffer_len: libc::size_t = 0;
        let ok = unsafe {
            sys::imageflow_json_response_read(
                self.ctx.ptr,
                self.ptr,
                &mut status,
                &mut buffer,
                &mut buffer_len,
            )
        };
        if !ok {
            return Err(BridgeError::response(
                self.ctx.last_error("Failed to read JSON response"),
            ));
        }
        let bytes: &[u8] = if buffer.is_null() || buffer_len == 0 {
            &[]
        } else {
            unsafe { slice::from_raw_parts(buffer, buffer_len) }
        };
        Ok(ResponseBody { status, bytes })
    }
}

impl Drop for JsonResponse<'_> {
    fn drop(&mut self) {
        // Failure here means the handle was not found in the context's
        // allocation list; nothing further can be done in a destructor.
        let _ = unsafe {
            sys::imageflow_json_response_destroy(self.ctx.ptr, self.ptr.cast_mut())
        };
    }
}
