//! Control service and slice units for groups

use crate::error::Result;
use crate::model::ServiceGroup;
use crate::resolver::HostLookup;
use crate::units::{Command, ServiceSection, ServiceType, ServiceUnit, SliceUnit, Unit, UnitSection};

use super::{header, UnitGenerator};

impl<L: HostLookup> UnitGenerator<'_, L> {
    /// A oneshot control service that members order against, and the group's slice
    pub(super) fn group_units(&self, group: &ServiceGroup) -> Result<Vec<Unit>> {
        let name = self.unit_name(&group.id)?;

        let mut control = ServiceUnit::new(name.clone());
        control.comments = header(&group.id);
        control.install = self.install_section(&group.id)?;
        control.unit = UnitSection {
            description: Some(format!("{} (Control service)", group.description)),
            ..UnitSection::default()
        };
        control.service = ServiceSection {
            slice: Some(format!("{}.slice", self.slice_name(&group.id)?)),
            service_type: ServiceType::Oneshot,
            exec_start: vec![Command::new("/bin/true")],
            remain_after_exit: true,
            ..ServiceSection::default()
        };

        let mut slice = SliceUnit::new(name);
        slice.comments = header(&group.id);
        slice.unit.description = Some(format!("{} (Slice)", group.description));

        Ok(vec![Unit::Service(control), Unit::Slice(slice)])
    }
}
