//! Sets `DESK_VERSION`, which `deskctl --version` and the startup log print.

fn main() {
    // A packaged build can pin DESK_VERSION; a plain checkout reports Cargo.toml's version.
    let version = match std::env::var("DESK_VERSION") {
        Ok(pinned) if !pinned.trim().is_empty() => pinned.trim().to_string(),
        _ => env!("CARGO_PKG_VERSION").to_string(),
    };

    println!("cargo:rustc-env=DESK_VERSION={}", version);
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=DESK_VERSION");
}
