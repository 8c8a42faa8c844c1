// Version metadata for `dlens --version`

use std::env;
use std::process::Command;

/// Release tarballs have no .git; packagers pass the commit in instead
const COMMIT_OVERRIDE: &str = "DATALENS_BUILD_COMMIT";

fn describe_head() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=7"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-env-changed={}", COMMIT_OVERRIDE);

    let commit = env::var(COMMIT_OVERRIDE)
        .ok()
        .filter(|c| !c.trim().is_empty())
        .or_else(describe_head)
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=DATALENS_COMMIT={}", commit);

    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=DATALENS_TARGET={}", target);
}
