use std::env;
use std::path::{Path, PathBuf};

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let out = PathBuf::from(env::var("OUT_DIR").unwrap());
    let whisper_cpp_dir = env::var("WHISPER_CPP_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| manifest_dir.join("../../vendor/whisper.cpp"));
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    println!("cargo:rerun-if-env-changed=WHISPER_PREBUILT_DIR");
    println!("cargo:rerun-if-env-changed=WHISPER_CPP_DIR");
    println!("cargo:rerun-if-env-changed=WHISPER_SHARED_GGML");
    println!("cargo:rerun-if-changed=wrapper.h");

    // Same three modes as llama-sys: prebuilt dir, cmake from source, or
    // empty bindings when neither is present. With empty bindings the
    // `whisper` feature of journal-core fails to compile on unresolved
    // `whisper_sys::*` items.
    let (lib_dir, include_dir) = if let Ok(prebuilt) = env::var("WHISPER_PREBUILT_DIR") {
        let prebuilt = PathBuf::from(&prebuilt);
        assert!(
            prebuilt.exists(),
            "WHISPER_PREBUILT_DIR={} does not exist",
            prebuilt.display()
        );
        println!(
            "cargo:warning=Using prebuilt whisper.cpp from {}",
            prebuilt.display()
        );
        (lib_subdir(&prebuilt), prebuilt.join("include"))
    } else if whisper_cpp_dir.join("CMakeLists.txt").exists() {
        let dst = cmake::Config::new(&whisper_cpp_dir)
            .define("BUILD_SHARED_LIBS", "OFF")
            .define("WHISPER_BUILD_TESTS", "OFF")
            .define("WHISPER_BUILD_EXAMPLES", "OFF")
            .define("WHISPER_BUILD_SERVER", "OFF")
            .define("GGML_METAL", "OFF")
            .define("GGML_CUDA", "OFF")
            .build();
        (lib_subdir(&dst), dst.join("include"))
    } else {
        println!(
            "cargo:warning=whisper.cpp not found at {} and WHISPER_PREBUILT_DIR unset; \
             generating empty bindings",
            whisper_cpp_dir.display()
        );
        std::fs::write(out.join("bindings.rs"), "").expect("Failed to write bindings");
        return;
    };

    println!("cargo:rustc-link-search=native={}", lib_dir.display());
    println!("cargo:rustc-link-lib=static=whisper");

    // whisper.cpp vendors its own ggml. When llama-sys is linked into the
    // same binary the two copies collide, so WHISPER_SHARED_GGML=1 skips
    // them here and relies on the ones llama-sys already links.
    if env::var("WHISPER_SHARED_GGML").is_err() {
        for name in &["ggml", "ggml-base", "ggml-cpu"] {
            if lib_dir.join(format!("lib{name}.a")).exists() {
                println!("cargo:rustc-link-lib=static={name}");
            }
        }
    }

    match target_os.as_str() {
        "linux" | "android" => {
            println!("cargo:rustc-link-lib=stdc++");
            println!("cargo:rustc-link-lib=m");
            if target_os == "linux" {
                println!("cargo:rustc-link-lib=pthread");
                println!("cargo:rustc-link-lib=gomp");
            }
        }
        "macos" | "ios" => {
            println!("cargo:rustc-link-lib=framework=Accelerate");
            println!("cargo:rustc-link-lib=c++");
        }
        _ => {}
    }

    let mut builder = bindgen::Builder::default()
        .header("wrapper.h")
        .clang_arg(format!("-I{}", include_dir.display()));

    let ggml_include = whisper_cpp_dir.join("ggml/include");
    if ggml_include.exists() {
        builder = builder.clang_arg(format!("-I{}", ggml_include.display()));
    }

    let bindings = builder
        .allowlist_function("whisper_.*")
        .allowlist_type("whisper_.*")
        .allowlist_type("ggml_log_level")
        .allowlist_var("WHISPER_.*")
        .derive_default(true)
        .size_t_is_usize(true)
        .generate()
        .expect("Failed to generate bindings");

    bindings
        .write_to_file(out.join("bindings.rs"))
        .expect("Failed to write bindings");
}

fn lib_subdir(root: &Path) -> PathBuf {
    if root.join("lib64").exists() {
        root.join("lib64")
    } else {
        root.join("lib")
    }
}
