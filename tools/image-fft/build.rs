use chrono::Datelike;

fn main() {
    println!("cargo:rustc-env=BUILD_YEAR={}", chrono::Local::now().year());
    println!("cargo:rerun-if-changed=build.rs");
}
