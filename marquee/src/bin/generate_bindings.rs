//! Generate UniFFI Swift bindings for the Marquee host extension
//!
//! Run: cargo run --bin generate-bindings
//!
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │ DEPENDENCY MAP - Output paths must match the host Xcode project             │
//! │                                                                             │
//! │ Inputs:                                                                     │
//! │   target/release/libmarquee.dylib   ← Built library for bindgen             │
//! │                                                                             │
//! │ Outputs:                                                                    │
//! │   host/Sources/MarqueeCore/marqueeFFI.h       ← C header                    │
//! │   host/Sources/MarqueeCore/module.modulemap   ← Clang module map            │
//! │   host/Sources/MarqueeCore/libmarquee.a       ← Universal static lib        │
//! │   host/Sources/MarqueeBridge/marquee.swift    ← Swift bindings              │
//! └─────────────────────────────────────────────────────────────────────────────┘

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const LIB_NAME: &str = "marquee";
const FFI_MODULE: &str = "MarqueeCoreFFI";

fn main() -> Result<()> {
    let rust_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let project_root = rust_dir
        .parent()
        .context("crate directory has no parent")?;

    // Match the deployment target of the host app
    env::set_var("MACOSX_DEPLOYMENT_TARGET", "15.0");

    println!("Building Rust library...");
    run_cmd("cargo", &["build", "--release", "--lib"], &rust_dir)?;

    println!("Generating Swift bindings...");
    let dylib = format!("target/release/lib{LIB_NAME}.dylib");
    run_cmd(
        "cargo",
        &[
            "run",
            "--bin",
            "uniffi-bindgen",
            "generate",
            "--library",
            &dylib,
            "--language",
            "swift",
            "--out-dir",
            "generated",
        ],
        &rust_dir,
    )?;

    let core_dest = project_root.join("host/Sources/MarqueeCore");
    let bridge_dest = project_root.join("host/Sources/MarqueeBridge");
    let generated = rust_dir.join("generated");
    fs::create_dir_all(&core_dest)?;
    fs::create_dir_all(&bridge_dest)?;

    // Swift 6 concurrency + module import fixups
    println!("Copying generated Swift file...");
    let swift_file = format!("{LIB_NAME}.swift");
    let header_file = format!("{LIB_NAME}FFI.h");
    let swift_content = fs::read_to_string(generated.join(&swift_file))
        .with_context(|| format!("reading {swift_file}"))?
        .replace(
            "private var initializationResult",
            "nonisolated(unsafe) private var initializationResult",
        )
        .replace(
            &format!("#if canImport({LIB_NAME}FFI)"),
            &format!("#if canImport({FFI_MODULE})"),
        )
        .replace(
            &format!("import {LIB_NAME}FFI"),
            &format!("import {FFI_MODULE}"),
        );
    fs::write(bridge_dest.join(&swift_file), swift_content)?;

    fs::copy(generated.join(&header_file), core_dest.join(&header_file))
        .with_context(|| format!("copying {header_file}"))?;

    println!("Writing modulemap...");
    fs::write(
        core_dest.join("module.modulemap"),
        format!("module {FFI_MODULE} {{\n    header \"{header_file}\"\n    export *\n}}\n"),
    )?;

    println!("Building universal static library...");
    for target in ["aarch64-apple-darwin", "x86_64-apple-darwin"] {
        run_cmd(
            "cargo",
            &["build", "--release", "--lib", "--target", target],
            &rust_dir,
        )?;
    }

    let static_lib = format!("lib{LIB_NAME}.a");
    let universal = core_dest.join(&static_lib);
    run_cmd(
        "lipo",
        &[
            "-create",
            &format!("target/aarch64-apple-darwin/release/{static_lib}"),
            &format!("target/x86_64-apple-darwin/release/{static_lib}"),
            "-output",
            &universal.to_string_lossy(),
        ],
        &rust_dir,
    )?;

    println!("Done! Bindings regenerated successfully.");
    println!("  - {}", bridge_dest.join(&swift_file).display());
    println!("  - {}", core_dest.join(&header_file).display());
    println!("  - {}", core_dest.join("module.modulemap").display());
    println!("  - {}", universal.display());
    Ok(())
}

fn run_cmd(program: &str, args: &[&str], dir: &Path) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .status()
        .with_context(|| format!("failed to run {program}"))?;

    if !status.success() {
        bail!("{program} failed with status: {status}");
    }
    Ok(())
}
