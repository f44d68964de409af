//! Loading the server's D-Bus protocol module.
//!
//! PulseAudio only exposes its bus once `module-dbus-protocol` is loaded. These
//! helpers drive `pactl`; they can also be replaced by a line in
//! `/etc/pulse/default.pa`:
//!
//! ```text
//! load-module module-dbus-protocol
//! ```

use std::process::Command;

use crate::error::{BusError, Result};

/// Name of the server module that exposes the D-Bus interface.
pub const DBUS_MODULE: &str = "module-dbus-protocol";

/// Whether the D-Bus protocol module is currently loaded.
pub fn module_is_loaded() -> Result<bool> {
    let listing = pactl(&["list", "modules", "short"])?;
    Ok(is_module_listed(&listing, DBUS_MODULE))
}

/// Load the D-Bus protocol module.
pub fn load_module() -> Result<()> {
    pactl(&["load-module", DBUS_MODULE]).map(|_| ())
}

/// Unload the D-Bus protocol module.
pub fn unload_module() -> Result<()> {
    pactl(&["unload-module", DBUS_MODULE]).map(|_| ())
}

/// Whether `module` appears in `pactl list modules short` output.
///
/// Each line is `index<TAB>name<TAB>arguments<TAB>...`.
pub fn is_module_listed(listing: &str, module: &str) -> bool {
    listing
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|name| name == module)
}

fn pactl(args: &[&str]) -> Result<String> {
    tracing::debug!("pactl {}", args.join(" "));
    let output = Command::new("pactl")
        .args(args)
        .output()
        .map_err(|e| BusError::Command(format!("pactl: {}", e)))?;

    if !output.status.success() {
        return Err(BusError::Command(format!(
            "pactl {}: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
0\tmodule-device-restore\t\t
1\tmodule-stream-restore\t\t
7\tmodule-dbus-protocol\t\t
12\tmodule-native-protocol-unix\t\t
";

    #[test]
    fn test_module_listed() {
        assert!(is_module_listed(LISTING, DBUS_MODULE));
        assert!(is_module_listed(LISTING, "module-stream-restore"));
    }

    #[test]
    fn test_module_not_listed() {
        assert!(!is_module_listed(LISTING, "module-dbus"));
        assert!(!is_module_listed("", DBUS_MODULE));
    }
}
