use std::{env, path::PathBuf};

pub fn test_dir() -> PathBuf {
    env::current_dir()
        .expect("Unable to get working directory")
        .join("data")
}

#[allow(dead_code)] // Avoid a false positive on the dead code analysis.
pub fn invalid(name: &str) -> PathBuf {
    test_dir().join("invalid").join(name)
}
