//! Configuration access port.

use std::time::Duration;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// Whole seconds read with [`ConfigPort::get_int`]; negative values clamp to zero.
    fn get_secs(&self, section: &str, key: &str, default: u64) -> Duration {
        let secs = self.get_int(section, key, default as i64);
        Duration::from_secs(secs.max(0) as u64)
    }
}
