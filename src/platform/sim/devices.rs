use crate::platform::{CameraDevice, CameraFacing, DeviceDirectory};

/// Cameras listed in the config file
pub struct ConfiguredDevices {
    facings: Vec<CameraFacing>,
}

impl ConfiguredDevices {
    pub fn new(facings: Vec<CameraFacing>) -> Self {
        Self { facings }
    }
}

impl DeviceDirectory for ConfiguredDevices {
    fn find_device(&self, facing: CameraFacing) -> Option<CameraDevice> {
        self.facings.contains(&facing).then(|| CameraDevice {
            id: format!("sim-{facing}"),
            name: format!("Simulated {facing} camera"),
            facing,
        })
    }
}
