use crate::clock::Clock;
use crate::i2c::I2CBus;
use crate::sensors::unified::{Sensor, SensorEvent, SensorInfo};

use super::{Fxos8700, Fxos8700Error};

/// Accéléromètre seul, adossé au pilote
pub struct Accelerometer<'a, B, C> {
    driver: &'a mut Fxos8700<B, C>,
}

impl<'a, B: I2CBus, C: Clock> Accelerometer<'a, B, C> {
    pub(super) fn new(driver: &'a mut Fxos8700<B, C>) -> Self {
        Accelerometer { driver }
    }
}

impl<B: I2CBus, C: Clock> Sensor for Accelerometer<'_, B, C> {
    type Error = Fxos8700Error;

    fn get_event(&mut self) -> Result<SensorEvent, Fxos8700Error> {
        self.driver.get_events().map(|(accel, _)| accel)
    }

    fn get_sensor(&self) -> SensorInfo {
        SensorInfo {
            name: "FXOS8700_A".to_string(),
            ..self.driver.accel_info()
        }
    }
}

/// Magnétomètre seul, adossé au pilote
pub struct Magnetometer<'a, B, C> {
    driver: &'a mut Fxos8700<B, C>,
}

impl<'a, B: I2CBus, C: Clock> Magnetometer<'a, B, C> {
    pub(super) fn new(driver: &'a mut Fxos8700<B, C>) -> Self {
        Magnetometer { driver }
    }
}

impl<B: I2CBus, C: Clock> Sensor for Magnetometer<'_, B, C> {
    type Error = Fxos8700Error;

    fn get_event(&mut self) -> Result<SensorEvent, Fxos8700Error> {
        self.driver.get_events().map(|(_, mag)| mag)
    }

    fn get_sensor(&self) -> SensorInfo {
        SensorInfo {
            name: "FXOS8700_M".to_string(),
            ..self.driver.mag_info()
        }
    }
}
