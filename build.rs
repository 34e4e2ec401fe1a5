use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=FFMPEG_DIR");
    println!("cargo:rerun-if-env-changed=VCPKG_ROOT");

    // Only the `decode` feature links against FFmpeg.
    if env::var_os("CARGO_FEATURE_DECODE").is_none() {
        return;
    }

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" || env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=The `decode` feature needs FFmpeg. On Windows, install it via vcpkg and set FFMPEG_DIR."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let ffmpeg_dir = PathBuf::from(&vcpkg_root).join("installed").join(&triplet);
    if ffmpeg_dir.exists() {
        println!(
            "cargo:warning=Found vcpkg FFmpeg at {}; set FFMPEG_DIR to it for reliable builds.",
            ffmpeg_dir.display()
        );
    } else {
        println!(
            "cargo:warning=VCPKG_ROOT is set but no FFmpeg install was found at {}.",
            ffmpeg_dir.display()
        );
    }
}
