//! User credential table, file-backed with preset fallback accounts.

use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Verifies `user:password` pairs loaded at startup.
///
/// Read-only after construction, so dispatch workers share it without
/// locking.
pub struct Credentials {
    users: HashMap<String, String>,
}

impl Credentials {
    /// Loads `user:password` lines from `path`, skipping blank lines and
    /// lines without a separator. On any read failure the preset accounts
    /// are installed instead so the server stays usable.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let mut users = HashMap::new();
                for line in contents.lines() {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if let Some((user, pass)) = line.split_once(':') {
                        debug!("Loaded user: {}", user.trim());
                        users.insert(user.trim().to_string(), pass.trim().to_string());
                    }
                }
                info!("Loaded {} users from {}", users.len(), path.display());
                Self { users }
            }
            Err(e) => {
                warn!(
                    "Could not read users file {}: {}; using default accounts",
                    path.display(),
                    e
                );
                Self::defaults()
            }
        }
    }

    /// Preset accounts used when no users file is available.
    pub fn defaults() -> Self {
        let mut users = HashMap::new();
        users.insert("admin".to_string(), "password123".to_string());
        users.insert("filippo".to_string(), "test2024".to_string());
        Self { users }
    }

    /// True when `user` exists and `pass` matches the stored password.
    pub fn verify(&self, user: &str, pass: &str) -> bool {
        self.users.get(user).map_or(false, |stored| stored == pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_verify_preset_accounts() {
        let credentials = Credentials::defaults();
        assert!(credentials.verify("admin", "password123"));
        assert!(credentials.verify("filippo", "test2024"));
        assert!(!credentials.verify("admin", "wrong"));
        assert!(!credentials.verify("nobody", "password123"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let credentials = Credentials::load(Path::new("/definitely/not/here/users.txt"));
        assert!(credentials.verify("admin", "password123"));
    }

    #[test]
    fn file_entries_replace_the_defaults() {
        let path = std::env::temp_dir().join("credentials_test_users.txt");
        {
            let mut file = fs::File::create(&path).unwrap();
            writeln!(file, "alice:wonderland").unwrap();
            writeln!(file).unwrap();
            writeln!(file, "malformed line without separator").unwrap();
            writeln!(file, "  bob : builder ").unwrap();
        }

        let credentials = Credentials::load(&path);
        fs::remove_file(&path).ok();

        assert!(credentials.verify("alice", "wonderland"));
        assert!(credentials.verify("bob", "builder"));
        assert!(!credentials.verify("admin", "password123"));
    }
}
