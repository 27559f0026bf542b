//! Typed service unit definitions
//!
//! Holds the directives this tool emits for .service units and renders
//! them back to unit-file text.

use std::time::Duration;

/// Service type determines startup notification
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ServiceType {
    #[default]
    Exec,     // Ready once the binary has been executed
    Oneshot,  // Run once, no main process
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Exec => "exec",
            ServiceType::Oneshot => "oneshot",
        }
    }
}

/// Restart policy
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum RestartPolicy {
    #[default]
    No,
    OnFailure,
}

impl RestartPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestartPolicy::No => "no",
            RestartPolicy::OnFailure => "on-failure",
        }
    }
}

/// A command line for one of the Exec*= directives
///
/// Arguments are emitted verbatim, one per continuation line, so any
/// quoting must already be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub program: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn render(&self) -> String {
        let mut text = self.program.clone();
        for arg in &self.args {
            text.push_str(" \\\n  ");
            text.push_str(arg);
        }
        text
    }
}

/// [Unit] section
#[derive(Debug, Clone, Default)]
pub struct UnitSection {
    pub description: Option<String>,
    pub wants: Vec<String>,
    pub part_of: Vec<String>,
    pub after: Vec<String>,
}

impl UnitSection {
    pub(super) fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        if let Some(description) = &self.description {
            entries.push(("Description", description.clone()));
        }
        for unit in &self.wants {
            entries.push(("Wants", unit.clone()));
        }
        for unit in &self.part_of {
            entries.push(("PartOf", unit.clone()));
        }
        for unit in &self.after {
            entries.push(("After", unit.clone()));
        }
        entries
    }
}

/// [Service] section
#[derive(Debug, Clone, Default)]
pub struct ServiceSection {
    pub slice: Option<String>,
    pub service_type: ServiceType,

    // Restart
    pub restart: RestartPolicy,
    pub restart_sec: Option<Duration>,
    pub timeout_stop_sec: Option<Duration>,
    pub timeout_start_sec: Option<Duration>,
    pub remain_after_exit: bool,

    // Credentials
    pub user: Option<String>,
    pub group: Option<String>,

    // Resource limits (cgroup v2)
    pub cpu_quota: Option<u32>,    // percentage (100 = 1 core)
    pub memory_high: Option<u64>,  // bytes
    pub memory_max: Option<u64>,   // bytes

    // Execution
    pub exec_start: Vec<Command>,
    pub exec_stop: Vec<Command>,
    pub exec_stop_post: Vec<Command>,
}

impl ServiceSection {
    pub(super) fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();

        if let Some(slice) = &self.slice {
            entries.push(("Slice", slice.clone()));
        }
        entries.push(("Type", self.service_type.as_str().to_string()));
        if self.restart != RestartPolicy::No {
            entries.push(("Restart", self.restart.as_str().to_string()));
        }
        if let Some(d) = self.restart_sec {
            entries.push(("RestartSec", format!("{}s", d.as_secs())));
        }
        if let Some(d) = self.timeout_stop_sec {
            entries.push(("TimeoutStopSec", d.as_secs().to_string()));
        }
        if let Some(d) = self.timeout_start_sec {
            entries.push(("TimeoutStartSec", d.as_secs().to_string()));
        }

        if let Some(user) = &self.user {
            entries.push(("User", user.clone()));
        }
        if let Some(group) = &self.group {
            entries.push(("Group", group.clone()));
        }

        if let Some(quota) = self.cpu_quota {
            entries.push(("CPUAccounting", "true".to_string()));
            entries.push(("CPUQuota", format!("{}%", quota)));
        }
        if self.memory_high.is_some() || self.memory_max.is_some() {
            entries.push(("MemoryAccounting", "true".to_string()));
            if let Some(bytes) = self.memory_high {
                entries.push(("MemoryHigh", bytes.to_string()));
            }
            if let Some(bytes) = self.memory_max {
                entries.push(("MemoryMax", bytes.to_string()));
            }
        }

        for cmd in &self.exec_start {
            entries.push(("ExecStart", cmd.render()));
        }
        if self.remain_after_exit {
            entries.push(("RemainAfterExit", "yes".to_string()));
        }
        for cmd in &self.exec_stop {
            entries.push(("ExecStop", cmd.render()));
        }
        for cmd in &self.exec_stop_post {
            entries.push(("ExecStopPost", cmd.render()));
        }

        entries
    }
}

/// [Install] section
#[derive(Debug, Clone, Default)]
pub struct InstallSection {
    pub wanted_by: Vec<String>,
}

impl InstallSection {
    pub(super) fn entries(&self) -> Vec<(&'static str, String)> {
        self.wanted_by
            .iter()
            .map(|unit| ("WantedBy", unit.clone()))
            .collect()
    }
}

/// Complete service unit
#[derive(Debug, Clone)]
pub struct ServiceUnit {
    pub name: String,
    /// Comment lines written above the first section
    pub comments: Vec<String>,
    pub install: InstallSection,
    pub unit: UnitSection,
    pub service: ServiceSection,
}

impl ServiceUnit {
    pub fn new(name: String) -> Self {
        Self {
            name,
            comments: Vec::new(),
            install: InstallSection::default(),
            unit: UnitSection::default(),
            service: ServiceSection::default(),
        }
    }

    pub(super) fn sections(&self) -> Vec<(&'static str, Vec<(&'static str, String)>)> {
        vec![
            ("Install", self.install.entries()),
            ("Unit", self.unit.entries()),
            ("Service", self.service.entries()),
        ]
    }

    pub fn render(&self) -> String {
        super::render(&self.comments, &self.sections())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_render() {
        let cmd = Command::new("/usr/bin/podman").arg("stop").args(["--ignore", "web"]);
        assert_eq!(cmd.render(), "/usr/bin/podman \\\n  stop \\\n  --ignore \\\n  web");
        assert_eq!(Command::new("/bin/true").render(), "/bin/true");
    }

    #[test]
    fn test_no_limits_no_accounting() {
        let section = ServiceSection::default();
        let keys: Vec<_> = section.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Type"]);
    }

    #[test]
    fn test_memory_accounting() {
        let section = ServiceSection {
            memory_max: Some(4096),
            ..ServiceSection::default()
        };
        let entries = section.entries();
        assert!(entries.contains(&("MemoryAccounting", "true".into())));
        assert!(entries.contains(&("MemoryMax", "4096".into())));
        assert!(!entries.iter().any(|(k, _)| *k == "MemoryHigh" || *k == "CPUAccounting"));
    }

    #[test]
    fn test_restart_durations() {
        let section = ServiceSection {
            restart: RestartPolicy::OnFailure,
            restart_sec: Some(Duration::from_secs(10)),
            timeout_stop_sec: Some(Duration::from_secs(70)),
            ..ServiceSection::default()
        };
        let entries = section.entries();
        assert!(entries.contains(&("Restart", "on-failure".into())));
        assert!(entries.contains(&("RestartSec", "10s".into())));
        assert!(entries.contains(&("TimeoutStopSec", "70".into())));
    }
}
