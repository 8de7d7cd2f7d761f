//! Contrat commun des capteurs : événements horodatés et fiches descriptives.
//!
//! Un pilote remplit ces structures, il ne les définit pas. Les valeurs sont en
//! unités physiques (m/s² pour l'accélération, µT pour le champ magnétique).

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Gravité terrestre standard (m/s²)
pub const SENSORS_GRAVITY_STANDARD: f32 = 9.80665;

/// Nature de la mesure portée par un événement
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SensorType {
    #[default]
    Unknown,
    Accelerometer,
    MagneticField,
}

/// Mesure horodatée d'un capteur 3 axes
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SensorEvent {
    pub sensor_id: i32,
    pub sensor_type: SensorType,
    /// Millisecondes, horloge monotone du pilote
    pub timestamp: u64,
    pub data: Vector3<f32>,
}

impl SensorEvent {
    pub fn new(sensor_id: i32, sensor_type: SensorType, timestamp: u64, data: Vector3<f32>) -> Self {
        SensorEvent { sensor_id, sensor_type, timestamp, data }
    }

    /// Retourne un événement vide
    pub fn empty() -> Self {
        SensorEvent {
            sensor_id: 0,
            sensor_type: SensorType::Unknown,
            timestamp: 0,
            data: Vector3::zeros(),
        }
    }
}

impl Default for SensorEvent {
    fn default() -> Self {
        Self::empty()
    }
}

/// Fiche descriptive d'un capteur (limites, résolution, période min.)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct SensorInfo {
    pub name: String,
    pub version: i32,
    pub sensor_id: i32,
    pub sensor_type: SensorType,
    pub max_value: f32,
    pub min_value: f32,
    pub resolution: f32,
    /// Période minimale entre deux mesures (secondes)
    pub min_delay: f32,
}

/// Capteur unique : une mesure et une fiche
pub trait Sensor {
    type Error;

    fn get_event(&mut self) -> Result<SensorEvent, Self::Error>;

    fn get_sensor(&self) -> SensorInfo;
}
