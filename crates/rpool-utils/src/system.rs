use nix::sys::utsname::uname;

/// Returns the machine hardware name of the running host, as `uname -m` reports it.
///
/// Falls back to the compile-time target architecture if `uname(2)` fails.
pub fn machine() -> String {
    uname()
        .map(|info| info.machine().to_string_lossy().into_owned())
        .unwrap_or_else(|_| std::env::consts::ARCH.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine() {
        let machine = machine();
        assert!(!machine.is_empty());
        assert!(!machine.contains('/'));

        #[cfg(all(target_arch = "x86_64", target_os = "linux"))]
        assert_eq!(machine, "x86_64");

        #[cfg(all(target_arch = "aarch64", target_os = "linux"))]
        assert_eq!(machine, "aarch64");
    }
}
