// build.rs

use chrono::Utc;
use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // OUT_DIR is always set by cargo for build scripts
    let Ok(out_dir) = env::var("OUT_DIR") else {
        panic!("OUT_DIR not set; build.rs must be run by cargo");
    };
    let dest_path = Path::new(&out_dir).join("build_info.rs");

    let build_date = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

    // BUILD_DATE is logged by the binary at startup
    if let Err(e) = fs::write(
        &dest_path,
        format!("pub const BUILD_DATE: &str = \"{}\";", build_date),
    ) {
        panic!("failed to write {}: {}", dest_path.display(), e);
    }

    println!("cargo:rerun-if-changed=build.rs");
}
