//! Hosts-file entries for local hostname routing.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use rasactl_core::{RasactlError, RasactlResult};

/// A hosts file mapping hostnames to one address.
#[derive(Debug, Clone)]
pub struct HostsFile {
    path: PathBuf,
    address: String,
}

impl HostsFile {
    pub fn new(path: &Path, address: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            address: address.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the current user may modify the file.
    pub fn is_writable(&self) -> bool {
        std::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .is_ok()
    }

    /// Map `host` to the configured address. Adding twice is a no-op.
    pub fn add(&self, host: &str) -> RasactlResult<()> {
        let mut content = self.read()?;
        if lines_naming(&content, host).next().is_some() {
            debug!(%host, "hosts entry already present");
            return Ok(());
        }
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&format!("{}\t{host}\n", self.address));
        self.write(&content)?;
        info!(%host, file = %self.path.display(), "added hosts entry");
        Ok(())
    }

    /// Unmap `host`, dropping lines left without any name. Removing a
    /// missing entry is a no-op.
    pub fn remove(&self, host: &str) -> RasactlResult<()> {
        let content = self.read()?;
        if lines_naming(&content, host).next().is_none() {
            return Ok(());
        }
        let mut kept: String = content
            .lines()
            .filter_map(|line| strip_host(line, host))
            .collect::<Vec<_>>()
            .join("\n");
        if !kept.is_empty() && content.ends_with('\n') {
            kept.push('\n');
        }
        self.write(&kept)?;
        info!(%host, file = %self.path.display(), "removed hosts entry");
        Ok(())
    }

    fn read(&self) -> RasactlResult<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write(&self, content: &str) -> RasactlResult<()> {
        std::fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, e: std::io::Error) -> RasactlError {
        RasactlError::Command {
            program: "hosts".to_string(),
            message: format!("{}: {e}", self.path.display()),
        }
    }
}

fn lines_naming<'a>(content: &'a str, host: &'a str) -> impl Iterator<Item = &'a str> {
    content.lines().filter(move |line| names_host(line, host))
}

/// Whether a hosts line maps `host`; comments are ignored.
fn names_host(line: &str, host: &str) -> bool {
    let entry = line.split('#').next().unwrap_or_default();
    entry.split_whitespace().skip(1).any(|name| name == host)
}

/// `line` without `host` among its names; `None` when no name is left.
fn strip_host(line: &str, host: &str) -> Option<String> {
    if !names_host(line, host) {
        return Some(line.to_string());
    }
    let (entry, comment) = line.split_at(line.find('#').unwrap_or(line.len()));
    let mut fields = entry.split_whitespace();
    let address = fields.next()?;
    let names: Vec<&str> = fields.filter(|name| *name != host).collect();
    if names.is_empty() {
        return None;
    }

    let mut kept = format!("{address}\t{}", names.join(" "));
    if !comment.is_empty() {
        kept.push(' ');
        kept.push_str(comment);
    }
    Some(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts_with(content: &str) -> (tempfile::TempDir, HostsFile) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, content).unwrap();
        let hosts = HostsFile::new(&path, "127.0.0.1");
        (dir, hosts)
    }

    fn content(hosts: &HostsFile) -> String {
        std::fs::read_to_string(hosts.path()).unwrap()
    }

    #[test]
    fn add_appends_entry_once() {
        let (_dir, hosts) = hosts_with("127.0.0.1 localhost");
        hosts.add("demo.rasactl.local.io").unwrap();
        hosts.add("demo.rasactl.local.io").unwrap();
        assert_eq!(
            content(&hosts),
            "127.0.0.1 localhost\n127.0.0.1\tdemo.rasactl.local.io\n"
        );
    }

    #[test]
    fn remove_keeps_other_lines() {
        let (_dir, hosts) = hosts_with(
            "127.0.0.1 localhost\n127.0.0.1\tdemo.rasactl.local.io\n10.0.0.1 other.rasactl.local.io\n",
        );
        hosts.remove("demo.rasactl.local.io").unwrap();
        assert_eq!(
            content(&hosts),
            "127.0.0.1 localhost\n10.0.0.1 other.rasactl.local.io\n"
        );
    }

    #[test]
    fn remove_keeps_other_names_on_shared_line() {
        let (_dir, hosts) = hosts_with(
            "127.0.0.1 localhost\n127.0.0.1 demo.rasactl.local.io other.rasactl.local.io # kind\n",
        );
        hosts.remove("demo.rasactl.local.io").unwrap();
        assert_eq!(
            content(&hosts),
            "127.0.0.1 localhost\n127.0.0.1\tother.rasactl.local.io # kind\n"
        );

        hosts.remove("other.rasactl.local.io").unwrap();
        assert_eq!(content(&hosts), "127.0.0.1 localhost\n");
    }

    #[test]
    fn remove_missing_entry_leaves_file_untouched() {
        let (_dir, hosts) = hosts_with("127.0.0.1 localhost\n");
        hosts.remove("demo.rasactl.local.io").unwrap();
        assert_eq!(content(&hosts), "127.0.0.1 localhost\n");
    }

    #[test]
    fn commented_names_do_not_count() {
        assert!(!names_host("# 127.0.0.1 demo.rasactl.local.io", "demo.rasactl.local.io"));
        assert!(!names_host("127.0.0.1 localhost # demo.rasactl.local.io", "demo.rasactl.local.io"));
        assert!(names_host("127.0.0.1 a demo.rasactl.local.io", "demo.rasactl.local.io"));
    }

    #[test]
    fn missing_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = HostsFile::new(&dir.path().join("hosts"), "127.0.0.1");
        assert!(!hosts.is_writable());
        hosts.add("demo.rasactl.local.io").unwrap();
        assert_eq!(content(&hosts), "127.0.0.1\tdemo.rasactl.local.io\n");
        assert!(hosts.is_writable());
    }
}
