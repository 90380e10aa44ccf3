//! FFI bindings for the posture engine
//!
//! This module provides C-compatible functions for calling the engine from the
//! service layer in other languages. All functions use C strings
//! (null-terminated) and return allocated memory that must be freed by the
//! caller using `posture_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EngineConfig;
use crate::pipeline::{rank_leaderboard, score_detection, PostureProcessor};
use crate::ranking::percentile_rank;
use crate::scoring::partial_score;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Parse a JSON array of numbers
fn parse_population(json: &str) -> Result<Vec<f64>, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid population JSON: {e}"))
}

// ============================================================================
// Stateless API
// ============================================================================

/// Partial score for one body part. Returns 0.0 when `total_predictions` is 0.
#[no_mangle]
pub extern "C" fn posture_partial_score(correct_count: u32, total_predictions: u32) -> f64 {
    partial_score(correct_count, total_predictions)
}

/// Percentile rank of `user_score` within `population` (`len` values).
///
/// # Safety
/// - `population` must point to `len` readable doubles, or be NULL when `len` is 0.
#[no_mangle]
pub unsafe extern "C" fn posture_percentile_rank(
    user_score: f64,
    population: *const f64,
    len: usize,
) -> f64 {
    if population.is_null() || len == 0 {
        return 0.0;
    }
    let scores = std::slice::from_raw_parts(population, len);
    percentile_rank(user_score, scores)
}

/// Score a detection record JSON and return a detection report JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `posture_free_string`.
/// - Returns NULL on error; call `posture_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn posture_score_detection(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match score_detection(json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Rank a JSON array of leaderboard members by `sort_key` ("level" or "score").
///
/// # Safety
/// - `members_json` and `sort_key` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `posture_free_string`.
/// - Returns NULL on error; call `posture_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn posture_leaderboard(
    members_json: *const c_char,
    sort_key: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let members = match cstr_to_string(members_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid members string pointer");
            return ptr::null_mut();
        }
    };

    let sort = match cstr_to_string(sort_key) {
        Some(s) => s,
        None => {
            set_last_error("Invalid sort key string pointer");
            return ptr::null_mut();
        }
    };

    match rank_leaderboard(&members, &sort, &EngineConfig::default()) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a PostureProcessor
pub struct PostureProcessorHandle {
    processor: PostureProcessor,
}

/// Create a new PostureProcessor.
///
/// # Safety
/// - `config_json` may be NULL for the default configuration, otherwise it
///   must be a valid null-terminated C string.
/// - Must be freed with `posture_processor_free`.
/// - Returns NULL on error; call `posture_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn posture_processor_new(
    config_json: *const c_char,
) -> *mut PostureProcessorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        EngineConfig::default()
    } else {
        let json = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match EngineConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    let handle = Box::new(PostureProcessorHandle {
        processor: PostureProcessor::with_config(&config),
    });
    Box::into_raw(handle)
}

/// Free a PostureProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `posture_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn posture_processor_free(processor: *mut PostureProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Score a detection record and fold it into the processor's aggregate.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `posture_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `posture_free_string`.
/// - Returns NULL on error; call `posture_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn posture_processor_process(
    processor: *mut PostureProcessorHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match handle.processor.process(&json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Profile report for the processor's aggregate against a population.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `posture_processor_new`.
/// - `population_json` must be a valid null-terminated C string holding a JSON
///   array of all-time scores.
/// - Returns a newly allocated string that must be freed with `posture_free_string`.
/// - Returns NULL on error; call `posture_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn posture_processor_profile(
    processor: *mut PostureProcessorHandle,
    population_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    let population = match cstr_to_string(population_json) {
        Some(s) => match parse_population(&s) {
            Ok(p) => p,
            Err(e) => {
                set_last_error(&e);
                return ptr::null_mut();
            }
        },
        None => {
            set_last_error("Invalid population string pointer");
            return ptr::null_mut();
        }
    };

    match handle.processor.profile_json(&population) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Save the processor's aggregate to JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `posture_processor_new`.
/// - Returns a newly allocated string that must be freed with `posture_free_string`.
/// - Returns NULL on error; call `posture_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn posture_processor_save_aggregate(
    processor: *mut PostureProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    match handle.processor.save_aggregate() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Load the processor's aggregate from JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `posture_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `posture_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn posture_processor_load_aggregate(
    processor: *mut PostureProcessorHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return -1;
        }
    };

    match handle.processor.load_aggregate(&json_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by engine functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an engine function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn posture_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local string that is valid until the next
///   engine call on the same thread.
/// - Returns NULL if no error occurred.
/// - Do NOT free the returned pointer.
#[no_mangle]
pub unsafe extern "C" fn posture_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}
