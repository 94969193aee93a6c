use std::env;
use std::path::{Path, PathBuf};

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let out = PathBuf::from(env::var("OUT_DIR").unwrap());
    let llama_cpp_dir = env::var("LLAMA_CPP_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| manifest_dir.join("../../vendor/llama.cpp"));
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    println!("cargo:rerun-if-env-changed=LLAMA_PREBUILT_DIR");
    println!("cargo:rerun-if-env-changed=LLAMA_CPP_DIR");
    println!("cargo:rerun-if-changed=wrapper.h");

    // ── Determine build mode ──────────────────────────────────────────
    //
    // Mode A: **Prebuilt**: `LLAMA_PREBUILT_DIR` points at a directory
    //   holding `lib/{libllama.a, libggml*.a}` and `include/`.
    //
    // Mode B: **CMake**: build llama.cpp from `LLAMA_CPP_DIR`
    //   (default `vendor/llama.cpp`).
    //
    // Mode C: neither is available: emit empty bindings so the rest of
    //   the workspace builds. Enabling the `llama` feature of journal-core
    //   then fails to compile on unresolved `llama_sys::*` items; the
    //   warning below names the missing source directory.

    let (lib_dir, include_dir) = if let Ok(prebuilt) = env::var("LLAMA_PREBUILT_DIR") {
        let prebuilt = PathBuf::from(&prebuilt);
        assert!(
            prebuilt.exists(),
            "LLAMA_PREBUILT_DIR={} does not exist",
            prebuilt.display()
        );
        println!(
            "cargo:warning=Using prebuilt llama.cpp from {}",
            prebuilt.display()
        );
        (lib_subdir(&prebuilt), prebuilt.join("include"))
    } else if llama_cpp_dir.join("CMakeLists.txt").exists() {
        // CPU only: the bridge never offloads to a GPU.
        let dst = cmake::Config::new(&llama_cpp_dir)
            .define("BUILD_SHARED_LIBS", "OFF")
            .define("LLAMA_BUILD_SERVER", "OFF")
            .define("LLAMA_BUILD_TESTS", "OFF")
            .define("LLAMA_BUILD_EXAMPLES", "OFF")
            .define("LLAMA_BUILD_TOOLS", "OFF")
            .define("LLAMA_BUILD_COMMON", "OFF")
            .define("GGML_METAL", "OFF")
            .define("GGML_CUDA", "OFF")
            .build();
        (lib_subdir(&dst), dst.join("include"))
    } else {
        println!(
            "cargo:warning=llama.cpp not found at {} and LLAMA_PREBUILT_DIR unset; \
             generating empty bindings",
            llama_cpp_dir.display()
        );
        std::fs::write(out.join("bindings.rs"), "").expect("Failed to write bindings");
        return;
    };

    // ── Link libraries ────────────────────────────────────────────────
    println!("cargo:rustc-link-search=native={}", lib_dir.display());
    println!("cargo:rustc-link-lib=static=llama");

    // ggml libraries: probe which ones exist
    for name in &["ggml", "ggml-base", "ggml-cpu"] {
        if lib_dir.join(format!("lib{name}.a")).exists() {
            println!("cargo:rustc-link-lib=static={name}");
        }
    }

    match target_os.as_str() {
        "linux" | "android" => {
            println!("cargo:rustc-link-lib=stdc++");
            println!("cargo:rustc-link-lib=m");
            if target_os == "linux" {
                println!("cargo:rustc-link-lib=pthread");
                println!("cargo:rustc-link-lib=gomp"); // OpenMP (used by ggml-cpu)
            }
        }
        "macos" | "ios" => {
            println!("cargo:rustc-link-lib=framework=Accelerate");
            println!("cargo:rustc-link-lib=c++");
        }
        _ => {}
    }

    // ── Generate Rust bindings ────────────────────────────────────────
    let mut builder = bindgen::Builder::default()
        .header("wrapper.h")
        .clang_arg(format!("-I{}", include_dir.display()));

    let ggml_include = llama_cpp_dir.join("ggml/include");
    if ggml_include.exists() {
        builder = builder.clang_arg(format!("-I{}", ggml_include.display()));
    }

    let bindings = builder
        .allowlist_function("llama_.*")
        .allowlist_type("llama_.*")
        .allowlist_type("ggml_log_level")
        .allowlist_var("LLAMA_.*")
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
