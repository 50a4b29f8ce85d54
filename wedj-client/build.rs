//! Stamps the `wedj` binary with the values its startup log line prints.

use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";

struct BuildStamp {
    git_hash: String,
    timestamp: String,
    profile: String,
}

impl BuildStamp {
    fn collect() -> Self {
        Self {
            git_hash: git(&["rev-parse", "--short=8", "HEAD"]).unwrap_or_else(|| UNKNOWN.into()),
            timestamp: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            profile: env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.into()),
        }
    }

    fn emit(&self) {
        for (name, value) in [
            ("GIT_HASH", &self.git_hash),
            ("BUILD_TIMESTAMP", &self.timestamp),
            ("BUILD_PROFILE", &self.profile),
        ] {
            println!("cargo:rustc-env={}={}", name, value);
        }
    }
}

/// Trimmed stdout of a successful git command
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    BuildStamp::collect().emit();

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
