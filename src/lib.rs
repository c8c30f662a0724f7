//! CV Generator DLL
//!
//! C ABI bridge over `cv-pdf-creator` for host applications. CVs and layout
//! overrides cross the boundary as JSON strings in the camelCase data format.
//! Every function returning `c_int` yields `0` on success and `-1` on failure;
//! failures are reported through the `log` facade.

use anyhow::{anyhow, Context, Result};
use cv_pdf_creator::{
    CvDocument, CvGenerator, CvInformation, FontResource, FontStyle, LayoutOverride,
};
use log::error;
use std::ffi::{c_void, CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

/// Reads a required C string argument.
unsafe fn required_str(ptr: *const c_char, name: &str) -> Result<String> {
    if ptr.is_null() {
        return Err(anyhow!("`{}` is null", name));
    }
    Ok(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// Reads an optional C string argument; null and blank both mean absent.
unsafe fn optional_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let value = CStr::from_ptr(ptr).to_string_lossy().into_owned();
    (!value.trim().is_empty()).then_some(value)
}

fn parse_inputs(cv_json: &str, config_json: Option<&str>) -> Result<(CvInformation, LayoutOverride)> {
    let cv = CvInformation::from_json(cv_json).context("invalid CV JSON")?;
    let patch = match config_json {
        Some(json) => LayoutOverride::from_json(json).context("invalid layout JSON")?,
        None => LayoutOverride::default(),
    };
    Ok((cv, patch))
}

unsafe fn render(
    generator: &mut CvGenerator,
    cv_json: *const c_char,
    config_json: *const c_char,
) -> Result<CvDocument> {
    let cv_json = required_str(cv_json, "cv_json")?;
    let config_json = optional_str(config_json);
    let (cv, patch) = parse_inputs(&cv_json, config_json.as_deref())?;
    generator.generate_cv(&cv, &patch)
}

fn status(result: Result<()>, what: &str) -> c_int {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{} failed: {:#}", what, e);
            -1
        }
    }
}

unsafe fn generator_mut<'a>(handle: *mut c_void) -> Result<&'a mut CvGenerator> {
    if handle.is_null() {
        return Err(anyhow!("generator handle is null"));
    }
    Ok(&mut *(handle as *mut CvGenerator))
}

/// One-shot generation with the default A4 PDF generator.
///
/// `config_json` may be null.
#[no_mangle]
pub extern "C" fn generate_cv_pdf_ffi(
    cv_json: *const c_char,
    config_json: *const c_char,
    output_path: *const c_char,
) -> c_int {
    let result = unsafe {
        (|| -> Result<()> {
            let output_path = required_str(output_path, "output_path")?;
            let mut generator = CvGenerator::pdf();
            render(&mut generator, cv_json, config_json)?.save(&output_path)
        })()
    };
    status(result, "CV generation")
}

/// Creates a reusable generator. Release it with [`cv_generator_free`].
#[no_mangle]
pub extern "C" fn cv_generator_new() -> *mut c_void {
    Box::into_raw(Box::new(CvGenerator::pdf())) as *mut c_void
}

#[no_mangle]
pub extern "C" fn cv_generator_free(handle: *mut c_void) {
    if !handle.is_null() {
        unsafe {
            let _ = Box::from_raw(handle as *mut CvGenerator);
        }
    }
}

/// Registers a TrueType/OpenType file under `font_id`.
///
/// `font_style` is `"normal"` or `"bold"`; null means normal.
#[no_mangle]
pub extern "C" fn cv_generator_add_font(
    handle: *mut c_void,
    font_path: *const c_char,
    font_id: *const c_char,
    font_style: *const c_char,
) -> c_int {
    let result = unsafe {
        (|| -> Result<()> {
            let generator = generator_mut(handle)?;
            let path = required_str(font_path, "font_path")?;
            let id = required_str(font_id, "font_id")?;
            let style = match optional_str(font_style) {
                Some(style) => FontStyle::parse(&style)
                    .ok_or_else(|| anyhow!("unknown font style `{}`", style))?,
                None => FontStyle::Normal,
            };
            let font = FontResource::from_path(&path, id, style)
                .with_context(|| format!("failed to read font {}", path))?;
            generator.add_font(font);
            Ok(())
        })()
    };
    status(result, "font registration")
}

#[no_mangle]
pub extern "C" fn cv_generator_generate(
    handle: *mut c_void,
    cv_json: *const c_char,
    config_json: *const c_char,
    output_path: *const c_char,
) -> c_int {
    let result = unsafe {
        (|| -> Result<()> {
            let generator = generator_mut(handle)?;
            let output_path = required_str(output_path, "output_path")?;
            render(generator, cv_json, config_json)?.save(&output_path)
        })()
    };
    status(result, "CV generation")
}

/// Renders to a `data:application/pdf;filename=CV.pdf;base64,...` string.
///
/// Returns null on failure. Release the string with [`free_string`].
#[no_mangle]
pub extern "C" fn cv_generator_data_uri(
    handle: *mut c_void,
    cv_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    let result = unsafe {
        (|| -> Result<CString> {
            let generator = generator_mut(handle)?;
            let document = render(generator, cv_json, config_json)?;
            Ok(CString::new(document.data_uri("CV.pdf"))?)
        })()
    };
    match result {
        Ok(uri) => uri.into_raw(),
        Err(e) => {
            error!("data URI generation failed: {:#}", e);
            ptr::null_mut()
        }
    }
}

/// Frees a string returned by this library.
#[no_mangle]
pub extern "C" fn free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
