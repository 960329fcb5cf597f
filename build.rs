use std::env;

fn main() {
    // Link the native engine only when the "engine" feature is enabled.
    if env::var_os("CARGO_FEATURE_ENGINE").is_none() {
        return;
    }

    // IMAGEFLOW_LIB_PATH points at the directory holding libimageflow.
    // When unset, the system linker search path is used as-is.
    if let Ok(lib_path) = env::var("IMAGEFLOW_LIB_PATH") {
        println!("cargo:rustc-link-search=native={lib_path}");
    }

    println!("cargo:rustc-link-lib=dylib=imageflow");

    println!("cargo:rerun-if-env-changed=IMAGEFLOW_LIB_PATH");
}
