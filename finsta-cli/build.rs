use std::path::{Path, PathBuf};
use std::process::Command;

/// Trimmed stdout of a successful git command run in `repo`.
fn git(repo: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(repo).args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
}

/// `<short sha>`, suffixed with `-dirty` when tracked files have changes.
fn revision(repo: &Path) -> Option<String> {
    let sha = git(repo, &["rev-parse", "--short", "HEAD"]).filter(|s| !s.is_empty())?;
    let dirty = git(repo, &["status", "--porcelain", "--untracked-files=no"])
        .is_some_and(|s| !s.is_empty());
    Some(if dirty { format!("{sha}-dirty") } else { sha })
}

fn main() {
    let manifest = PathBuf::from(std::env::var_os("CARGO_MANIFEST_DIR").unwrap_or_else(|| ".".into()));
    let repo = manifest.parent().map(Path::to_path_buf).unwrap_or(manifest);

    // Outside a git checkout cargo keeps its default of rerunning on any
    // package change. Inside one, rerun when HEAD, the branch tip or the
    // index moves.
    if let Some(git_dir) = git(&repo, &["rev-parse", "--absolute-git-dir"]).map(PathBuf::from) {
        println!("cargo:rerun-if-changed=build.rs");
        println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
        println!("cargo:rerun-if-changed={}", git_dir.join("index").display());
        if let Some(branch) = git(&repo, &["symbolic-ref", "-q", "HEAD"]) {
            println!("cargo:rerun-if-changed={}", git_dir.join(branch).display());
        }
    }

    let revision = revision(&repo).unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=FINSTA_BUILD_SHA={revision}");
}
