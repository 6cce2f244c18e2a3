//! Host CPU information
//!
//! Reported next to each run so a worker count can be read against the cores
//! that actually served it.

use std::fs;

/// Number of logical CPUs available to this process
///
/// Reads /proc/cpuinfo on Linux and falls back to the num_cpus crate elsewhere.
pub fn available_cpus() -> usize {
    if let Ok(cpuinfo) = fs::read_to_string("/proc/cpuinfo") {
        let count = cpuinfo.lines()
            .filter(|line| line.starts_with("processor"))
            .count();
        if count > 0 {
            return count;
        }
    }

    num_cpus::get()
}

/// True when more workers were requested than there are CPUs to run them
pub fn is_oversubscribed(workers: usize, cpus: usize) -> bool {
    workers > cpus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_cpus() {
        let cpus = available_cpus();
        assert!(cpus >= 1);
        assert!(cpus <= 4096);
    }

    #[test]
    fn test_is_oversubscribed() {
        assert!(!is_oversubscribed(4, 8));
        assert!(!is_oversubscribed(8, 8));
        assert!(is_oversubscribed(100, 8));
    }
}
