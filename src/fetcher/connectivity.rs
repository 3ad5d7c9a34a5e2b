//! Network availability check consulted before every API call.

use std::fs;
use std::path::{Path, PathBuf};

pub trait Connectivity {
    /// True when at least one active network path can reach the internet.
    fn has_connection(&self) -> bool;
}

/// Fixed answer, used when probing is disabled and in tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticConnectivity(pub bool);

impl Connectivity for StaticConnectivity {
    fn has_connection(&self) -> bool {
        self.0
    }
}

/// Inspects the host's network interfaces.
///
/// On Linux this walks `/sys/class/net` and reports a connection when any
/// non-loopback interface is up. Hosts without that tree are reported as
/// connected.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    root: PathBuf,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self::with_root("/sys/class/net")
    }

    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn interface_is_up(path: &Path) -> bool {
        let operstate = fs::read_to_string(path.join("operstate")).unwrap_or_default();
        match operstate.trim() {
            "up" => true,
            // Tunnels and some virtual links never report "up".
            "unknown" => fs::read_to_string(path.join("carrier"))
                .map(|c| c.trim() == "1")
                .unwrap_or(false),
            _ => false,
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl Connectivity for SystemProbe {
    fn has_connection(&self) -> bool {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Cannot enumerate {}: {}", self.root.display(), e);
                return true;
            }
        };

        entries
            .flatten()
            .filter(|entry| entry.file_name() != "lo")
            .any(|entry| Self::interface_is_up(&entry.path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_iface(root: &Path, name: &str, operstate: &str, carrier: Option<&str>) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("operstate"), format!("{}\n", operstate)).unwrap();
        if let Some(carrier) = carrier {
            fs::write(dir.join("carrier"), format!("{}\n", carrier)).unwrap();
        }
    }

    #[test]
    fn test_static() {
        assert!(StaticConnectivity(true).has_connection());
        assert!(!StaticConnectivity(false).has_connection());
    }

    #[test]
    fn test_loopback_only_is_offline() {
        let dir = tempfile::tempdir().unwrap();
        add_iface(dir.path(), "lo", "unknown", Some("1"));
        assert!(!SystemProbe::with_root(dir.path()).has_connection());
    }

    #[test]
    fn test_interface_up() {
        let dir = tempfile::tempdir().unwrap();
        add_iface(dir.path(), "lo", "unknown", Some("1"));
        add_iface(dir.path(), "eth0", "down", None);
        add_iface(dir.path(), "wlan0", "up", None);
        assert!(SystemProbe::with_root(dir.path()).has_connection());
    }

    #[test]
    fn test_unknown_state_uses_carrier() {
        let dir = tempfile::tempdir().unwrap();
        add_iface(dir.path(), "tun0", "unknown", Some("0"));
        assert!(!SystemProbe::with_root(dir.path()).has_connection());

        add_iface(dir.path(), "wg0", "unknown", Some("1"));
        assert!(SystemProbe::with_root(dir.path()).has_connection());
    }

    #[test]
    fn test_missing_tree_reports_connected() {
        let dir = tempfile::tempdir().unwrap();
        let probe = SystemProbe::with_root(dir.path().join("missing"));
        assert!(probe.has_connection());
    }
}
