//! Build script for dissector-core
//!
//! This script checks build requirements before compilation:
//! - Minimum Rust version (Edition 2021 = Rust 1.56.0+)
//! - Target platform (the tweak only does useful work on iOS)
//!
//! ## Requirements
//!
//! - **Rust**: Edition 2021 (Rust 1.56.0 or newer)
//! - **Target**: iOS for the injected library; macOS and Linux hosts are
//!   supported for the CLI and the test suite

fn main()
{
    println!("cargo:rerun-if-changed=build.rs");

    // Check minimum Rust version
    if let Ok(rustc_version) = rustc_version::version() {
        let min_rust_version = rustc_version::Version::new(1, 56, 0);

        assert!(
            rustc_version >= min_rust_version,
            "dissector-core requires Rust {min_rust_version} or newer (Edition 2021), found {rustc_version}"
        );
    } else {
        // If we can't get version (e.g., in some build environments), just warn
        println!("cargo:warning=could not verify Rust version");
    }

    check_target();
}

fn check_target()
{
    // Build scripts run on the host, so ask cargo about the target instead of using cfg!
    let os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let vendor = std::env::var("CARGO_CFG_TARGET_VENDOR").unwrap_or_default();

    if vendor != "apple" {
        println!("cargo:warning=dissector-core is built for {os}; debugger libraries can only be injected on Apple targets");
    }
}
