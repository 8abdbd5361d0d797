use std::sync::Arc;

use super::adapters::SharedRunner;

pub fn default_runner() -> SharedRunner {
    #[cfg(target_os = "macos")]
    {
        Arc::new(super::adapters::osascript::OsascriptRunner::new())
    }

    #[cfg(not(target_os = "macos"))]
    {
        Arc::new(super::adapters::portable::PortableRunner::new())
    }
}
