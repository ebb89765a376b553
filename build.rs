fn main() {
    println!("cargo:rerun-if-env-changed=OPENCL_LIB_DIR");

    // Only configure OpenCL when gpu feature is enabled
    if std::env::var_os("CARGO_FEATURE_GPU").is_some() {
        // Non-standard install locations are passed in through the environment
        if let Ok(dir) = std::env::var("OPENCL_LIB_DIR") {
            println!("cargo:rustc-link-search=native={}", dir);
        }
        println!("cargo:rustc-link-lib=OpenCL");
    }
}
