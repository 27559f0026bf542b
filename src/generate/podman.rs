//! Container command lines
//!
//! Builds the `podman run`, `podman stop` and `podman rm` invocations
//! for a service unit. Values that may contain arbitrary text are single
//! quoted with C-style escapes, which the service manager undoes when it
//! splits the command line.

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{ContainerFlag, DevicePassthrough, OutboundAddress, PublishPort, Service, Volume, VolumeFlag};
use crate::resolver::{AddressResolver, HostLookup};
use crate::units::Command;

use super::GeneratorOptions;

/// Escape `value` so it survives unquoting inside a quoted unit-file word
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            // specifier and variable expansion
            '%' => escaped.push_str("%%"),
            '$' => escaped.push_str("$$"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Escape and wrap in single quotes
pub fn quote(value: &str) -> String {
    format!("'{}'", escape(value))
}

fn absolute(path: &Path) -> Result<String> {
    let path = std::path::absolute(path).map_err(|e| Error::io(path, e))?;
    Ok(path.display().to_string())
}

fn device_arg(device: &DevicePassthrough) -> String {
    let mut mapping = format!("{}:{}", device.host_path.display(), device.mounted_at.display());
    if !device.permissions.is_empty() {
        mapping.push(':');
        mapping.extend(device.permissions.iter().map(|p| p.letter()));
    }
    format!("--device={}", quote(&mapping))
}

fn volume_arg(volume: &Volume) -> Result<String> {
    let flags: Vec<&str> = volume.effective_flags().iter().map(VolumeFlag::as_str).collect();
    let mapping = format!(
        "{}:{}:{}",
        absolute(volume.host_path())?,
        absolute(volume.mounted_at())?,
        flags.join(",")
    );
    Ok(format!("--volume {}", quote(&mapping)))
}

fn network_arg<L: HostLookup>(
    resolver: &AddressResolver<L>,
    outbound: &OutboundAddress,
) -> Result<String> {
    let ipv6 = resolver.resolve_ipv6(&outbound.ipv6)?;
    let mut mapping = format!("slirp4netns:outbound_addr6={}", ipv6);
    if let Some(host) = &outbound.ipv4 {
        let ipv4 = resolver.resolve_ipv4(host)?;
        mapping.push_str(&format!(",outbound_addr={}", ipv4));
    }
    if let Some(mtu) = outbound.mtu {
        mapping.push_str(&format!(",mtu={}", mtu));
    }
    Ok(format!("--network={}", quote(&mapping)))
}

fn publish_arg<L: HostLookup>(resolver: &AddressResolver<L>, port: &PublishPort) -> Result<String> {
    let address = resolver.resolve_for_port(port.host(), port.family())?;
    let mapping = format!(
        "{}:{}:{}/{}",
        address,
        port.external(),
        port.internal(),
        port.port_type().as_str()
    );
    Ok(format!("--publish {}", quote(&mapping)))
}

/// `podman run` for a service, named after its unit
pub fn run_command<L: HostLookup>(
    options: &GeneratorOptions,
    resolver: &AddressResolver<L>,
    service: &Service,
    unit_name: &str,
) -> Result<Command> {
    let mut cmd = Command::new(options.podman.display().to_string())
        .arg("run")
        .arg(format!("--name {}", unit_name));

    if service.has_flag(ContainerFlag::ReadOnlyRoot) {
        cmd = cmd.arg("--read-only");
    }
    if service.has_flag(ContainerFlag::RemapUserToContainerRoot) {
        cmd = cmd.arg("--user 0:0");
    }
    cmd = cmd.args(["--rm", "--replace"]);

    cmd = cmd.args(service.devices.iter().map(device_arg));

    let mut names: Vec<&String> = service.environment.keys().collect();
    names.sort();
    for name in names {
        let value = &service.environment[name];
        cmd = cmd.arg(format!("--env {}", quote(&format!("{}={}", name, value))));
    }

    for volume in &service.volumes {
        cmd = cmd.arg(volume_arg(volume)?);
    }

    if let Some(outbound) = &service.outbound_address {
        cmd = cmd.arg(network_arg(resolver, outbound)?);
    }

    for port in &service.ports {
        cmd = cmd.arg(publish_arg(resolver, port)?);
    }

    cmd = cmd.arg(escape(&service.image.to_string()));

    if !service.arguments.is_empty() {
        let args: Vec<String> = service.arguments.iter().map(|a| quote(a)).collect();
        cmd = cmd.arg(args.join(" "));
    }

    Ok(cmd)
}

/// `podman stop` for the container behind `unit_name`
pub fn stop_command(options: &GeneratorOptions, unit_name: &str) -> Command {
    Command::new(options.podman.display().to_string()).args([
        "stop".to_string(),
        "--ignore".to_string(),
        format!("--time {}", options.stop_timeout.as_secs()),
        unit_name.to_string(),
    ])
}

/// `podman rm --force` for the container behind `unit_name`
pub fn remove_command(options: &GeneratorOptions, unit_name: &str) -> Command {
    Command::new(options.podman.display().to_string()).args([
        "rm".to_string(),
        "--ignore".to_string(),
        "--force".to_string(),
        format!("--time {}", options.stop_timeout.as_secs()),
        unit_name.to_string(),
    ])
}
