use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=EXECABLE_DEFAULT_MANIFEST");

    // Distributors may bake in a launcher manifest location; nothing is
    // exported when the variable is unset.
    if let Ok(raw_hint) = env::var("EXECABLE_DEFAULT_MANIFEST") {
        if raw_hint.trim().is_empty() {
            return;
        }
        let candidate = PathBuf::from(raw_hint);
        let canonical = candidate.canonicalize().unwrap_or(candidate);

        println!(
            "cargo:rustc-env=EXECABLE_DEFAULT_MANIFEST={}",
            canonical.display()
        );
    }
}
