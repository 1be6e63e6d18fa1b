//! Foundation string and bundle helpers.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use objc::runtime::{Class, Object};
use objc::{msg_send, sel, sel_impl};

/// Autoreleased `NSString` copy of `value`, or nil if it contains a NUL byte.
///
/// # Safety
///
/// Needs an autorelease pool in scope, or the string leaks.
pub unsafe fn ns_string(value: &str) -> *mut Object
{
    let (Some(cls), Ok(value)) = (Class::get("NSString"), CString::new(value)) else {
        return std::ptr::null_mut();
    };
    msg_send![cls, stringWithUTF8String: value.as_ptr()]
}

/// Rust copy of an `NSString`; `None` for nil.
///
/// # Safety
///
/// `string` must be nil or point to a live `NSString`.
pub unsafe fn to_string(string: *mut Object) -> Option<String>
{
    if string.is_null() {
        return None;
    }
    let utf8: *const c_char = msg_send![string, UTF8String];
    if utf8.is_null() {
        return None;
    }
    Some(CStr::from_ptr(utf8).to_string_lossy().into_owned())
}

unsafe fn main_bundle() -> *mut Object
{
    match Class::get("NSBundle") {
        Some(cls) => msg_send![cls, mainBundle],
        None => std::ptr::null_mut(),
    }
}

pub fn bundle_identifier() -> Option<String>
{
    unsafe {
        let bundle = main_bundle();
        if bundle.is_null() {
            return None;
        }
        let identifier: *mut Object = msg_send![bundle, bundleIdentifier];
        to_string(identifier)
    }
}

/// `CFBundleDisplayName`, falling back to `CFBundleName`.
pub fn display_name() -> Option<String>
{
    unsafe {
        let bundle = main_bundle();
        if bundle.is_null() {
            return None;
        }
        ["CFBundleDisplayName", "CFBundleName"].into_iter().find_map(|key| {
            let value: *mut Object = msg_send![bundle, objectForInfoDictionaryKey: ns_string(key)];
            to_string(value)
        })
    }
}
