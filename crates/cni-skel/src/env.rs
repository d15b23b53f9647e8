//! Environment lookup used to read the `CNI_*` variables.

use std::collections::HashMap;

/// Source of environment variables.
///
/// An unset variable and a variable set to the empty string are
/// indistinguishable: both read as `""`.
pub trait Environment {
    /// Read a variable, returning an empty string when it is unset.
    fn get(&self, key: &str) -> String;
}

/// The real process environment.
///
/// Values that are not valid UTF-8 are read lossily, so a set variable is
/// never mistaken for a missing one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn get(&self, key: &str) -> String {
        std::env::var_os(key)
            .map(|value| value.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl Environment for HashMap<String, String> {
    fn get(&self, key: &str) -> String {
        HashMap::get(self, key).cloned().unwrap_or_default()
    }
}

impl Environment for HashMap<&str, &str> {
    fn get(&self, key: &str) -> String {
        HashMap::get(self, key).map(|v| (*v).to_string()).unwrap_or_default()
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn get(&self, key: &str) -> String {
        (**self).get(key)
    }
}
