//! Service units for containers

use std::time::Duration;

use crate::error::Result;
use crate::model::Service;
use crate::resolver::HostLookup;
use crate::units::{RestartPolicy, ServiceSection, ServiceType, ServiceUnit, Unit, UnitSection};

use super::{header, podman, UnitGenerator, NETWORK_ONLINE_TARGET};

const RESTART_SEC: Duration = Duration::from_secs(10);
const TIMEOUT_START_SEC: Duration = Duration::from_secs(300);
/// Extra time the service manager waits beyond the container stop timeout
const STOP_SLACK: Duration = Duration::from_secs(10);

impl<L: HostLookup> UnitGenerator<'_, L> {
    pub(super) fn service_unit(&self, service: &Service) -> Result<Unit> {
        let name = self.unit_name(&service.id)?;
        let mut svc = ServiceUnit::new(name.clone());
        svc.comments = header(&service.id);
        svc.install = self.install_section(&service.id)?;

        let parent = self.parent_unit_name(&service.id)?;
        svc.unit = UnitSection {
            description: Some(format!("{} ({})", service.description, service.image.tag)),
            wants: vec![NETWORK_ONLINE_TARGET.to_string()],
            part_of: parent.iter().map(|p| format!("{}.service", p)).collect(),
            after: match &parent {
                Some(p) => vec![format!("{}.service", p)],
                None => vec![NETWORK_ONLINE_TARGET.to_string()],
            },
        };

        let mut section = ServiceSection {
            slice: Some(format!("{}.slice", self.slice_name(&service.id)?)),
            user: Some(service.run_as.user.clone()),
            group: Some(service.run_as.group.clone()),
            cpu_quota: service.limits.cpu_percent,
            memory_high: service.limits.memory_limit_soft,
            memory_max: service.limits.memory_limit_hard,
            ..ServiceSection::default()
        };

        if service.one_shot {
            section.service_type = ServiceType::Oneshot;
        } else {
            section.service_type = ServiceType::Exec;
            section.restart = RestartPolicy::OnFailure;
            section.restart_sec = Some(RESTART_SEC);
            section.timeout_stop_sec = Some(self.options.stop_timeout + STOP_SLACK);
            section.timeout_start_sec = Some(TIMEOUT_START_SEC);
        }

        section.exec_start = vec![podman::run_command(&self.options, &self.resolver, service, &name)?];
        section.exec_stop = vec![podman::stop_command(&self.options, &name)];
        section.exec_stop_post = vec![podman::remove_command(&self.options, &name)];
        svc.service = section;

        Ok(Unit::Service(svc))
    }
}
