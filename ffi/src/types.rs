//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use skip_core::error::ApiError;
use skip_core::fetch::{Commit, FetchTicket};
use skip_core::http::HttpMethod;
use skip_core::types::DisplaySkipRecord;

/// Opaque handle to a `SkipClient`.
pub struct FfiSkipClient {
    pub(crate) inner: skip_core::SkipClient,
}

/// Opaque handle to a `SkipFetcher`.
pub struct FfiSkipFetcher {
    pub(crate) inner: skip_core::SkipFetcher,
}

/// Allocate a C string. Interior NULs yield an empty string.
pub(crate) fn to_c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Release a C string allocated by `to_c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// The C caller executes it and hands the response back through
/// `skip_parse_by_location` or `skip_fetcher_complete`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: skip_core::HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: to_c_string(req.url),
            headers,
            headers_len,
        }))
    }

    /// Free everything `from_core` allocated.
    pub(crate) unsafe fn free(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers: Box<[FfiHeader]> = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller builds this on the stack after executing a request. The FFI
/// layer reads but does not free these fields; null strings read as empty.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub status_text: *const c_char,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Status = 1,
    Transport = 2,
    Parse = 3,
    InvalidQuery = 4,
    Panic = 5,
    NullArg = 6,
}

/// A display-ready skip exposed to C. The full record, including
/// pass-through fields, is available from `skip_fetcher_state_json`.
#[repr(C)]
pub struct FfiSkip {
    pub id: u64,
    pub name: *mut c_char,
    pub price: *mut c_char,
    pub capacity: *mut c_char,
    pub size: u32,
    pub hire_period: u32,
    pub allowed_on_road: bool,
    pub allows_heavy_waste: bool,
    pub price_before_vat: f64,
    pub price_after_vat: f64,
    pub vat: f64,
}

impl FfiSkip {
    fn from_core(skip: DisplaySkipRecord) -> Self {
        FfiSkip {
            id: skip.id,
            name: to_c_string(skip.name),
            price: to_c_string(skip.price),
            capacity: to_c_string(skip.capacity),
            size: skip.size,
            hire_period: skip.hire_period,
            allowed_on_road: skip.allowed_on_road,
            allows_heavy_waste: skip.allows_heavy_waste,
            price_before_vat: skip.price_before_vat,
            price_after_vat: skip.price_after_vat,
            vat: skip.vat,
        }
    }

    fn free_fields(&self) {
        free_c_string(self.name);
        free_c_string(self.price);
        free_c_string(self.capacity);
    }
}

#[repr(C)]
pub struct FfiSkipList {
    pub items: *mut FfiSkip,
    pub len: u32,
}

/// Result envelope for `skip_parse_by_location`.
///
/// On success `error_code` is `Ok`, `error_message` is null and `skips`
/// points to the transformed list. On failure `error_code` describes the
/// category, `error_message` is a human-readable C string and `skips` is
/// null.
#[repr(C)]
pub struct FfiSkipResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub rejected: u32,
    pub skips: *mut FfiSkipList,
}

impl FfiSkipResult {
    pub(crate) fn ok_skips(skips: Vec<DisplaySkipRecord>, rejected: usize) -> *mut Self {
        let len = skips.len() as u32;
        let items = if skips.is_empty() {
            std::ptr::null_mut()
        } else {
            let boxed: Box<[FfiSkip]> = skips.into_iter().map(FfiSkip::from_core).collect();
            Box::into_raw(boxed) as *mut FfiSkip
        };
        Box::into_raw(Box::new(FfiSkipResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            rejected: rejected as u32,
            skips: Box::into_raw(Box::new(FfiSkipList { items, len })),
        }))
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let error_code = match &err {
            ApiError::Status { .. } => FfiErrorCode::Status,
            ApiError::Transport(_) => FfiErrorCode::Transport,
            ApiError::Parse(_) => FfiErrorCode::Parse,
            ApiError::InvalidQuery(_) => FfiErrorCode::InvalidQuery,
        };
        Self::error(error_code, err.status().unwrap_or(0), &err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, 0, &format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, 0, msg)
    }

    fn error(error_code: FfiErrorCode, http_status: u16, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiSkipResult {
            error_code,
            error_message: to_c_string(msg),
            http_status,
            rejected: 0,
            skips: std::ptr::null_mut(),
        }))
    }

    /// Free the envelope and everything it owns.
    pub(crate) unsafe fn free(result: *mut Self) {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.skips.is_null() {
            return;
        }
        let list = unsafe { Box::from_raw(result.skips) };
        if !list.items.is_null() && list.len > 0 {
            let items: Box<[FfiSkip]> = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(list.items, list.len as usize))
            };
            for item in items.iter() {
                item.free_fields();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Fetcher types
// ---------------------------------------------------------------------------

/// One fetch cycle handed to the C host. `request` is null when the cycle
/// already failed without I/O (e.g. a blank postcode).
#[repr(C)]
pub struct FfiFetchTicket {
    pub token: u64,
    pub request: *mut FfiHttpRequest,
}

impl FfiFetchTicket {
    pub(crate) fn from_core(ticket: FetchTicket) -> *mut Self {
        let request = match ticket.request() {
            Some(req) => FfiHttpRequest::from_core(req.clone()),
            None => std::ptr::null_mut(),
        };
        Box::into_raw(Box::new(FfiFetchTicket {
            token: ticket.token().value(),
            request,
        }))
    }

    pub(crate) unsafe fn free(ticket: *mut Self) {
        let ticket = unsafe { Box::from_raw(ticket) };
        if !ticket.request.is_null() {
            unsafe { FfiHttpRequest::free(ticket.request) };
        }
    }
}

#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiCommit {
    Applied = 0,
    Superseded = 1,
    AlreadySettled = 2,
    NullArg = 3,
    Panic = 4,
}

impl From<Commit> for FfiCommit {
    fn from(c: Commit) -> Self {
        match c {
            Commit::Applied => FfiCommit::Applied,
            Commit::Superseded => FfiCommit::Superseded,
            Commit::AlreadySettled => FfiCommit::AlreadySettled,
        }
    }
}
