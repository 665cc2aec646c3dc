use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    // Marker reported by /api/health so a running server can be matched to its build.
    let build_id = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "dev".to_string());
    println!("cargo:rustc-env=RELIEF_BUILD_ID={}", build_id);
}
