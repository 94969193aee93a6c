//! Raw bindgen output for the llama.cpp C API.
//!
//! Everything here is `unsafe`; use the safe wrappers in `journal-core`.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]
#![allow(clippy::all)]

include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
