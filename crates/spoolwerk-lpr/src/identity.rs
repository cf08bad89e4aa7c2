// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local host and user identity, as embedded in control files.

/// Keep only printable ASCII (33..=127), preserving order.
///
/// Host and user names can contain spaces, control characters or non-ASCII
/// text; none of that may reach the control file.
pub fn sanitize(text: &str) -> String {
    text.chars().filter(|&c| ('\u{21}'..='\u{7f}').contains(&c)).collect()
}

/// Sanitized machine and user name of the submitting side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    machine_name: String,
    user_name: String,
}

impl HostIdentity {
    /// Build an identity from raw names.  Both are sanitized.
    pub fn new(machine_name: &str, user_name: &str) -> Self {
        Self {
            machine_name: sanitize(machine_name),
            user_name: sanitize(user_name),
        }
    }

    /// Look up the local host name and the current user.
    pub fn lookup() -> Self {
        let machine = gethostname::gethostname().to_string_lossy().into_owned();
        let user = ["USER", "USERNAME", "LOGNAME"]
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| "unknown".to_string());
        Self::new(&machine, &user)
    }

    pub fn machine_name(&self) -> &str {
        &self.machine_name
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_drops_space_control_and_non_ascii() {
        assert_eq!(sanitize("print host\t01"), "printhost01");
        assert_eq!(sanitize("b\u{fc}ro-pc"), "bro-pc");
        assert_eq!(sanitize("\u{7f}a\u{80}b"), "\u{7f}ab");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn sanitize_keeps_every_printable_ascii_character_in_order() {
        let printable: String = (33u8..=127).map(char::from).collect();
        assert_eq!(sanitize(&printable), printable);

        let mixed: String = (0u8..=255).map(char::from).collect();
        let kept = sanitize(&mixed);
        assert!(kept.chars().all(|c| (33..=127).contains(&(c as u32))));
        assert_eq!(kept, printable);
    }

    #[test]
    fn identity_is_sanitized() {
        let id = HostIdentity::new("my host", "j doe");
        assert_eq!(id.machine_name(), "myhost");
        assert_eq!(id.user_name(), "jdoe");
    }

    #[test]
    fn lookup_yields_printable_names() {
        let id = HostIdentity::lookup();
        assert!(id.machine_name().chars().all(|c| c.is_ascii_graphic() || c == '\u{7f}'));
        assert!(id.user_name().chars().all(|c| c.is_ascii_graphic() || c == '\u{7f}'));
    }
}
