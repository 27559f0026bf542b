//! Integration tests for unit generation
//!
//! Builds configurations through the public API, generates units against
//! a fixed host table, and reads the text back with the unit parser.

use podsd::model::{AddressFamily, Limits, OciImage, PortType, PublishPort, RunAs};
use podsd::units::{first_value, parse_file, ParsedFile};
use podsd::{
    AddressResolver, Configuration, ElementId, GeneratedUnit, Service, ServiceGroup, ServiceName,
    StaticHosts, UnitGenerator,
};
use uuid::Uuid;

fn id(n: u128) -> ElementId {
    ElementId::new(Uuid::from_u128(n))
}

fn group(name: &str, n: u128) -> ServiceGroup {
    ServiceGroup {
        name: ServiceName::new(name).unwrap(),
        description: format!("{} group", name),
        id: id(n),
    }
}

fn service(name: &str, n: u128) -> Service {
    let mut svc = Service::new(
        ServiceName::new(name).unwrap(),
        id(n),
        OciImage {
            registry: "example.org".into(),
            name: name.into(),
            tag: "1.2.3".into(),
            hash: "sha256:0123".into(),
        },
        RunAs {
            user: "app".into(),
            group: "app".into(),
        },
    );
    svc.description = format!("{} server", name);
    svc
}

fn hosts() -> AddressResolver<StaticHosts> {
    AddressResolver::new(
        StaticHosts::new()
            .with("web.example", ["192.0.2.10".parse().unwrap()])
            .with("v6.example", ["2001:db8::1".parse().unwrap()]),
    )
}

fn generate(config: &Configuration) -> podsd::Result<Vec<GeneratedUnit>> {
    UnitGenerator::new(config, hosts()).generate()
}

fn unit<'a>(units: &'a [GeneratedUnit], file_name: &str) -> &'a GeneratedUnit {
    units
        .iter()
        .find(|u| u.file_name == file_name)
        .unwrap_or_else(|| panic!("{} was not generated", file_name))
}

fn parsed(units: &[GeneratedUnit], file_name: &str) -> ParsedFile {
    parse_file(&unit(units, file_name).text).unwrap()
}

fn value(parsed: &ParsedFile, section: &str, key: &str) -> Option<String> {
    first_value(parsed, section, key).map(str::to_string)
}

/// Group "services" containing service "web" publishing 8080 -> 80
fn scenario() -> Configuration {
    let mut web = service("web", 2);
    web.ports
        .push(PublishPort::new("web.example", 8080, 80, AddressFamily::Ipv4, PortType::Tcp).unwrap());

    let mut builder = Configuration::builder();
    builder.begin_group(group("services", 1)).unwrap();
    builder.add_service(web).unwrap();
    builder.end_group();
    builder.build().unwrap()
}

#[test]
fn test_group_with_service_scenario() {
    let units = generate(&scenario()).unwrap();
    let files: Vec<_> = units.iter().map(|u| u.file_name.as_str()).collect();
    assert_eq!(files, vec!["services.service", "services.slice", "services.web.service"]);

    let web = parsed(&units, "services.web.service");
    assert_eq!(value(&web, "[Unit]", "PartOf").as_deref(), Some("services.service"));
    assert_eq!(value(&web, "[Unit]", "After").as_deref(), Some("services.service"));
    assert_eq!(value(&web, "[Install]", "WantedBy").as_deref(), Some("services.service"));
    assert_eq!(
        value(&web, "[Service]", "Slice").as_deref(),
        Some("services-services-web.slice")
    );
    assert_eq!(
        value(&web, "[Unit]", "Description").as_deref(),
        Some("web server (1.2.3)")
    );

    let exec = value(&web, "[Service]", "ExecStart").unwrap();
    assert!(exec.contains("--publish '192.0.2.10:8080:80/tcp'"), "{}", exec);
    assert!(exec.contains("--name services.web"));
    assert!(exec.ends_with("example.org/web:1.2.3@sha256:0123"));
}

#[test]
fn test_group_control_and_slice_units() {
    let units = generate(&scenario()).unwrap();

    let control = parsed(&units, "services.service");
    assert_eq!(value(&control, "[Service]", "Type").as_deref(), Some("oneshot"));
    assert_eq!(value(&control, "[Service]", "RemainAfterExit").as_deref(), Some("yes"));
    assert_eq!(value(&control, "[Service]", "ExecStart").as_deref(), Some("/bin/true"));
    assert_eq!(
        value(&control, "[Service]", "Slice").as_deref(),
        Some("services-services.slice")
    );
    assert_eq!(
        value(&control, "[Install]", "WantedBy").as_deref(),
        Some("multi-user.target")
    );
    assert_eq!(
        value(&control, "[Unit]", "Description").as_deref(),
        Some("services group (Control service)")
    );

    let slice = parsed(&units, "services.slice");
    assert_eq!(
        value(&slice, "[Unit]", "Description").as_deref(),
        Some("services group (Slice)")
    );
    assert!(!slice.contains_key("[Service]"));
}

#[test]
fn test_header_names_element() {
    let units = generate(&scenario()).unwrap();
    let web = unit(&units, "services.web.service");
    let expected = format!(
        "#\n#  Automatically generated; do not edit.\n#  $ServiceID: {}\n#\n\n[Install]\n",
        id(2)
    );
    assert!(web.text.starts_with(&expected), "{}", web.text);
    assert_eq!(web.element, id(2));
}

#[test]
fn test_section_order() {
    let units = generate(&scenario()).unwrap();
    let text = &unit(&units, "services.web.service").text;
    let install = text.find("[Install]").unwrap();
    let unit_section = text.find("[Unit]").unwrap();
    let service_section = text.find("[Service]").unwrap();
    assert!(install < unit_section && unit_section < service_section);
}

#[test]
fn test_parents_precede_children() {
    let mut builder = Configuration::builder();
    builder.begin_group(group("outer", 1)).unwrap();
    builder.begin_group(group("inner", 2)).unwrap();
    builder.add_service(service("db", 3)).unwrap();
    builder.end_group();
    builder.end_group();
    let units = generate(&builder.build().unwrap()).unwrap();

    let files: Vec<_> = units.iter().map(|u| u.file_name.as_str()).collect();
    assert_eq!(
        files,
        vec![
            "outer.service",
            "outer.slice",
            "outer.inner.service",
            "outer.inner.slice",
            "outer.inner.db.service",
        ]
    );

    let db = parsed(&units, "outer.inner.db.service");
    assert_eq!(value(&db, "[Unit]", "PartOf").as_deref(), Some("outer.inner.service"));
    assert_eq!(
        value(&db, "[Service]", "Slice").as_deref(),
        Some("services-outer-inner-db.slice")
    );
}

#[test]
fn test_each_root_wanted_by_multi_user() {
    let mut builder = Configuration::builder();
    builder.begin_group(group("a", 1)).unwrap();
    builder.end_group();
    builder.begin_group(group("b", 2)).unwrap();
    builder.end_group();
    builder.add_service(service("solo", 3)).unwrap();
    let config = builder.build().unwrap();
    assert_eq!(config.roots().count(), 3);

    let units = generate(&config).unwrap();
    let wanted_by_target = units
        .iter()
        .filter(|u| u.file_name.ends_with(".service"))
        .filter(|u| {
            let p = parse_file(&u.text).unwrap();
            value(&p, "[Install]", "WantedBy").as_deref() == Some("multi-user.target")
        })
        .count();
    assert_eq!(wanted_by_target, 3);

    let solo = parsed(&units, "solo.service");
    assert_eq!(value(&solo, "[Unit]", "After").as_deref(), Some("network-online.target"));
    assert!(value(&solo, "[Unit]", "PartOf").is_none());
}

#[test]
fn test_long_running_service_settings() {
    let mut builder = Configuration::builder();
    builder.add_service(service("web", 1)).unwrap();
    let units = generate(&builder.build().unwrap()).unwrap();

    let web = parsed(&units, "web.service");
    assert_eq!(value(&web, "[Service]", "Type").as_deref(), Some("exec"));
    assert_eq!(value(&web, "[Service]", "Restart").as_deref(), Some("on-failure"));
    assert_eq!(value(&web, "[Service]", "RestartSec").as_deref(), Some("10s"));
    assert_eq!(value(&web, "[Service]", "TimeoutStopSec").as_deref(), Some("70"));
    assert_eq!(value(&web, "[Service]", "User").as_deref(), Some("app"));
    assert_eq!(
        value(&web, "[Service]", "ExecStop").as_deref(),
        Some("/usr/bin/podman stop --ignore --time 60 web")
    );
    assert_eq!(
        value(&web, "[Service]", "ExecStopPost").as_deref(),
        Some("/usr/bin/podman rm --ignore --force --time 60 web")
    );
}

#[test]
fn test_one_shot_service() {
    let mut job = service("job", 1);
    job.one_shot = true;
    let mut builder = Configuration::builder();
    builder.add_service(job).unwrap();
    let units = generate(&builder.build().unwrap()).unwrap();

    let job = parsed(&units, "job.service");
    assert_eq!(value(&job, "[Service]", "Type").as_deref(), Some("oneshot"));
    assert!(value(&job, "[Service]", "Restart").is_none());
}

#[test]
fn test_limits_emitted_only_when_set() {
    let mut limited = service("limited", 1);
    limited.limits = Limits {
        cpu_percent: Some(50),
        memory_limit_soft: Some(1_000_000),
        memory_limit_hard: None,
    };
    let mut builder = Configuration::builder();
    builder.add_service(limited).unwrap();
    builder.add_service(service("free", 2)).unwrap();
    let units = generate(&builder.build().unwrap()).unwrap();

    let limited = parsed(&units, "limited.service");
    assert_eq!(value(&limited, "[Service]", "CPUAccounting").as_deref(), Some("true"));
    assert_eq!(value(&limited, "[Service]", "CPUQuota").as_deref(), Some("50%"));
    assert_eq!(value(&limited, "[Service]", "MemoryAccounting").as_deref(), Some("true"));
    assert_eq!(value(&limited, "[Service]", "MemoryHigh").as_deref(), Some("1000000"));
    assert!(value(&limited, "[Service]", "MemoryMax").is_none());

    let free = parsed(&units, "free.service");
    for key in ["CPUAccounting", "CPUQuota", "MemoryAccounting", "MemoryHigh", "MemoryMax"] {
        assert!(value(&free, "[Service]", key).is_none(), "{} was emitted", key);
    }
}

#[test]
fn test_environment_sorted_and_tokenizes() {
    let mut web = service("web", 1);
    for (k, v) in [("ZULU", "last"), ("ALPHA", "first one"), ("MIKE", "x=y")] {
        web.environment.insert(k.into(), v.into());
    }
    let mut builder = Configuration::builder();
    builder.add_service(web).unwrap();
    let units = generate(&builder.build().unwrap()).unwrap();

    let exec = value(&parsed(&units, "web.service"), "[Service]", "ExecStart").unwrap();
    let words = shlex::split(&exec).unwrap();
    let env: Vec<_> = words
        .windows(2)
        .filter(|w| w[0] == "--env")
        .map(|w| w[1].clone())
        .collect();
    assert_eq!(env, vec!["ALPHA=first one", "MIKE=x=y", "ZULU=last"]);
}

#[test]
fn test_ipv6_port_is_bracketed() {
    let mut web = service("web", 1);
    web.ports
        .push(PublishPort::new("v6.example", 443, 8443, AddressFamily::Ipv6, PortType::Udp).unwrap());
    let mut builder = Configuration::builder();
    builder.add_service(web).unwrap();
    let units = generate(&builder.build().unwrap()).unwrap();

    let exec = value(&parsed(&units, "web.service"), "[Service]", "ExecStart").unwrap();
    assert!(exec.contains("--publish '[2001:db8::1]:443:8443/udp'"), "{}", exec);
}

#[test]
fn test_dns_failure_aborts_whole_run() {
    let mut web = service("web", 2);
    web.ports
        .push(PublishPort::new("missing.example", 80, 80, AddressFamily::Ipv4, PortType::Tcp).unwrap());
    let mut builder = Configuration::builder();
    builder.add_service(service("ok", 1)).unwrap();
    builder.add_service(web).unwrap();

    let err = generate(&builder.build().unwrap()).unwrap_err();
    assert_eq!(err.code(), "error-dns");
    assert_eq!(err.attributes()["Host"], "missing.example");
}

#[test]
fn test_wrong_family_is_dns_error() {
    let mut web = service("web", 1);
    web.ports
        .push(PublishPort::new("web.example", 80, 80, AddressFamily::Ipv6, PortType::Tcp).unwrap());
    let mut builder = Configuration::builder();
    builder.add_service(web).unwrap();

    let err = generate(&builder.build().unwrap()).unwrap_err();
    assert_eq!(err.code(), "error-dns");
    assert_eq!(err.attributes()["Family"], "IPv6");
}

#[test]
fn test_multi_line_description_aborts_generation() {
    let mut web = service("web", 1);
    web.description = "Web\nExecStartPre=/bin/rm -rf /srv".into();
    let mut builder = Configuration::builder();
    builder.add_service(web).unwrap();

    let err = generate(&builder.build().unwrap()).unwrap_err();
    assert_eq!(err.code(), "error-unit-syntax");
    assert_eq!(err.attributes()["Unit"], "web.service");
}

#[test]
fn test_trailing_backslash_in_user_aborts_generation() {
    let mut web = service("web", 1);
    web.run_as.user = "app\\".into();
    let mut builder = Configuration::builder();
    builder.add_service(web).unwrap();

    let err = generate(&builder.build().unwrap()).unwrap_err();
    assert_eq!(err.code(), "error-unit-syntax");
}

#[test]
fn test_generation_is_deterministic() {
    let config = scenario();
    assert_eq!(generate(&config).unwrap(), generate(&config).unwrap());
}

#[test]
fn test_empty_configuration() {
    let config = Configuration::builder().build().unwrap();
    assert!(generate(&config).unwrap().is_empty());
}
