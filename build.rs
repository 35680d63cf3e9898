use std::env;

fn main() {
    let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_else(|_| "x86_64".to_string());
    println!("cargo:rustc-link-search=native/{arch}");
    if let Ok(rocm) = env::var("ROCM_PATH") {
        println!("cargo:rustc-link-search={rocm}/lib");
    }
    println!("cargo:rerun-if-env-changed=ROCM_PATH");
}
