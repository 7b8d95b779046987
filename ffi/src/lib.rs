//! C-ABI wrapper around `skip-core`.
//!
//! # Overview
//! Exposes the skip lookup and the fetch lifecycle through `extern "C"`
//! functions so a presentation layer written in any language with a C FFI
//! can drive the wizard's data without linking serde or an HTTP stack.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Stateless calls (`skip_build_by_location` / `skip_parse_by_location`)
//!   mirror `SkipClient` 1:1.
//! - The fetcher hands out `FfiFetchTicket`s; the host executes the request
//!   and reports back with `skip_fetcher_complete` or `skip_fetcher_fail`.
//!   Stale tokens are rejected by the core.
//! - The C caller owns all returned pointers and must call the matching
//!   `skip_free_*` / `*_free` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use skip_core::error::ApiError;
use skip_core::fetch::RequestToken;
use skip_core::http::HttpResponse;
use skip_core::transform::transform_skips;
use skip_core::types::Location;

use types::*;

/// Read a C string. Null reads as empty; invalid UTF-8 is replaced lossily.
fn read_c_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// Convert a host response. A body that is not UTF-8 cannot be JSON, so it
/// fails as a parse error instead of reaching the decoder.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> Result<HttpResponse, ApiError> {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }
            .to_str()
            .map_err(|_| ApiError::Parse("response body is not valid UTF-8".to_string()))?
            .to_string()
    };
    Ok(HttpResponse {
        status: resp.status,
        status_text: read_c_str(resp.status_text),
        headers: Vec::new(),
        body,
    })
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `SkipClient` bound to `base_url`. A null `base_url` selects
/// the origin compiled into the library.
///
/// The caller must free the returned pointer with `skip_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn skip_client_new(base_url: *const c_char) -> *mut FfiSkipClient {
    catch_unwind(|| {
        let inner = if base_url.is_null() {
            skip_core::SkipClient::default()
        } else {
            skip_core::SkipClient::new(&read_c_str(base_url))
        };
        Box::into_raw(Box::new(FfiSkipClient { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `skip_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn skip_client_free(client: *mut FfiSkipClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Stateless lookup
// ---------------------------------------------------------------------------

/// Build the location lookup request. `area` may be null.
///
/// Returns null if `client` or `postcode` is null, or the postcode is blank.
/// The caller must free the returned pointer with `skip_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn skip_build_by_location(
    client: *const FfiSkipClient,
    postcode: *const c_char,
    area: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || postcode.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let location = Location::new(read_c_str(postcode), read_c_str(area));
        match client.inner.build_skips_by_location(&location) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Parse a lookup response and transform it into display records.
#[unsafe(no_mangle)]
pub extern "C" fn skip_parse_by_location(
    client: *const FfiSkipClient,
    response: *const FfiHttpResponse,
) -> *mut FfiSkipResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiSkipResult::null_arg("client");
        }
        if response.is_null() {
            return FfiSkipResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let parsed = ffi_response_to_core(resp)
            .and_then(|response| client.inner.parse_skips_by_location(response));
        match parsed {
            Ok(batch) => FfiSkipResult::ok_skips(transform_skips(&batch.records), batch.rejected),
            Err(e) => FfiSkipResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiSkipResult::panic("panic in skip_parse_by_location"))
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Mount a fetcher for `(postcode, area)`; `area` may be null.
///
/// The first cycle's ticket is written to `ticket_out` when it is non-null;
/// free it with `skip_free_ticket`. Returns null if `client` is null.
/// The caller must free the fetcher with `skip_fetcher_free`.
#[unsafe(no_mangle)]
pub extern "C" fn skip_fetcher_new(
    client: *const FfiSkipClient,
    postcode: *const c_char,
    area: *const c_char,
    ticket_out: *mut *mut FfiFetchTicket,
) -> *mut FfiSkipFetcher {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let location = Location::new(read_c_str(postcode), read_c_str(area));
        let (inner, ticket) = skip_core::SkipFetcher::mount(client.inner.clone(), location);
        if !ticket_out.is_null() {
            unsafe { *ticket_out = FfiFetchTicket::from_core(ticket) };
        }
        Box::into_raw(Box::new(FfiSkipFetcher { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a fetcher created by `skip_fetcher_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn skip_fetcher_free(fetcher: *mut FfiSkipFetcher) {
    if !fetcher.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(fetcher) });
        });
    }
}

/// Change location. Returns a ticket for the new cycle, or null when the
/// location is unchanged or an argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn skip_fetcher_set_location(
    fetcher: *mut FfiSkipFetcher,
    postcode: *const c_char,
    area: *const c_char,
) -> *mut FfiFetchTicket {
    catch_unwind(|| {
        if fetcher.is_null() {
            return std::ptr::null_mut();
        }
        let fetcher = unsafe { &mut *fetcher };
        let location = Location::new(read_c_str(postcode), read_c_str(area));
        match fetcher.inner.set_location(location) {
            Some(ticket) => FfiFetchTicket::from_core(ticket),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Start a new cycle for the current location.
#[unsafe(no_mangle)]
pub extern "C" fn skip_fetcher_refetch(fetcher: *mut FfiSkipFetcher) -> *mut FfiFetchTicket {
    catch_unwind(|| {
        if fetcher.is_null() {
            return std::ptr::null_mut();
        }
        let fetcher = unsafe { &mut *fetcher };
        FfiFetchTicket::from_core(fetcher.inner.refetch())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Whether `token` still belongs to the cycle awaiting a response. Hosts use
/// this to abort superseded in-flight requests.
#[unsafe(no_mangle)]
pub extern "C" fn skip_fetcher_is_current(fetcher: *const FfiSkipFetcher, token: u64) -> bool {
    catch_unwind(|| {
        if fetcher.is_null() {
            return false;
        }
        let fetcher = unsafe { &*fetcher };
        fetcher.inner.is_current(RequestToken::from_value(token))
    })
    .unwrap_or(false)
}

/// Report the response received for `token`.
#[unsafe(no_mangle)]
pub extern "C" fn skip_fetcher_complete(
    fetcher: *mut FfiSkipFetcher,
    token: u64,
    response: *const FfiHttpResponse,
) -> FfiCommit {
    catch_unwind(|| {
        if fetcher.is_null() || response.is_null() {
            return FfiCommit::NullArg;
        }
        let fetcher = unsafe { &mut *fetcher };
        let resp = unsafe { &*response };
        fetcher
            .inner
            .complete(RequestToken::from_value(token), ffi_response_to_core(resp))
            .into()
    })
    .unwrap_or(FfiCommit::Panic)
}

/// Report that the request for `token` could not complete. `message` is
/// stored verbatim as the state's error message.
#[unsafe(no_mangle)]
pub extern "C" fn skip_fetcher_fail(
    fetcher: *mut FfiSkipFetcher,
    token: u64,
    message: *const c_char,
) -> FfiCommit {
    catch_unwind(|| {
        if fetcher.is_null() {
            return FfiCommit::NullArg;
        }
        let fetcher = unsafe { &mut *fetcher };
        let err = ApiError::Transport(read_c_str(message));
        fetcher
            .inner
            .complete(RequestToken::from_value(token), Err(err))
            .into()
    })
    .unwrap_or(FfiCommit::Panic)
}

/// Current `FetchState` as JSON (`{"skips":[...],"loading":..,"error":..}`).
///
/// Returns null if `fetcher` is null. Free with `skip_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn skip_fetcher_state_json(fetcher: *const FfiSkipFetcher) -> *mut c_char {
    catch_unwind(|| {
        if fetcher.is_null() {
            return std::ptr::null_mut();
        }
        let fetcher = unsafe { &*fetcher };
        match serde_json::to_string(fetcher.inner.state()) {
            Ok(json) => to_c_string(json),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by `skip_build_by_location`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn skip_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiHttpRequest::free(req) });
}

/// Free a result returned by `skip_parse_by_location`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn skip_free_result(result: *mut FfiSkipResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiSkipResult::free(result) });
}

/// Free a ticket and the request it carries. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn skip_free_ticket(ticket: *mut FfiFetchTicket) {
    if ticket.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiFetchTicket::free(ticket) });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn skip_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
