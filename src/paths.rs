//! Where flightpath keeps its files.
//!
//! Installed builds store `config.toml` in the platform config directory
//! (`~/.config/flightpath/` on Linux, `~/Library/Application Support/flightpath/`
//! on macOS). Development runs started from a checkout keep using the
//! working directory so a local `config.toml` next to `Cargo.toml` wins.

use std::path::PathBuf;

const APP_DIR: &str = "flightpath";

/// True when running from a source checkout (a `Cargo.toml` sits in the
/// working directory).
pub fn is_dev_checkout() -> bool {
    std::env::current_dir()
        .map(|cwd| cwd.join("Cargo.toml").is_file())
        .unwrap_or(false)
}

/// Directory holding `config.toml`.
pub fn config_dir() -> PathBuf {
    if is_dev_checkout() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tests_run_from_checkout() {
        // cargo runs unit tests with the package root as working directory
        assert!(is_dev_checkout());
    }

    #[test]
    fn test_config_dir_is_cwd_in_checkout() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config_dir(), cwd);
    }
}
