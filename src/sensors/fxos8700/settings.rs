use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::sensors::unified::SENSORS_GRAVITY_STANDARD;

/// Pleine échelle de l'accéléromètre (XYZ_DATA_CFG fs[1:0])
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AccelRange {
    #[default]
    #[serde(rename = "2g")]
    Range2G,
    #[serde(rename = "4g")]
    Range4G,
    #[serde(rename = "8g")]
    Range8G,
}

impl AccelRange {
    pub fn bits(self) -> u8 {
        match self {
            AccelRange::Range2G => 0b00,
            AccelRange::Range4G => 0b01,
            AccelRange::Range8G => 0b10,
        }
    }

    /// Sensibilité en g par LSB (mots de 14 bits)
    pub fn sensitivity(self) -> f32 {
        match self {
            AccelRange::Range2G => 0.000244,
            AccelRange::Range4G => 0.000488,
            AccelRange::Range8G => 0.000976,
        }
    }

    /// Facteur d'échelle en m/s² par LSB
    pub fn scale(self) -> f32 {
        self.sensitivity() * SENSORS_GRAVITY_STANDARD
    }

    /// Valeur max mesurable (en g)
    pub fn max_g(self) -> f32 {
        match self {
            AccelRange::Range2G => 2.0,
            AccelRange::Range4G => 4.0,
            AccelRange::Range8G => 8.0,
        }
    }

    /// Valeur min mesurable (en g), le complément à deux n'est pas symétrique
    pub fn min_g(self) -> f32 {
        match self {
            AccelRange::Range2G => -1.999,
            AccelRange::Range4G => -3.998,
            AccelRange::Range8G => -7.996,
        }
    }
}

impl fmt::Display for AccelRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}g", self.max_g() as u8)
    }
}

impl FromStr for AccelRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().trim_start_matches('±').to_lowercase().trim_end_matches('g') {
            "2" => Ok(AccelRange::Range2G),
            "4" => Ok(AccelRange::Range4G),
            "8" => Ok(AccelRange::Range8G),
            _ => Err(anyhow!("Plage accéléromètre inconnue: {} (2g, 4g, 8g)", s)),
        }
    }
}

/// Mode de fonctionnement (M_CTRL_REG1 m_hms[1:0])
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SensorMode {
    #[serde(rename = "accel")]
    AccelOnly,
    #[serde(rename = "mag")]
    MagOnly,
    #[default]
    Hybrid,
}

impl SensorMode {
    pub fn bits(self) -> u8 {
        match self {
            SensorMode::AccelOnly => 0b00,
            SensorMode::MagOnly => 0b01,
            SensorMode::Hybrid => 0b11,
        }
    }

    pub fn is_hybrid(self) -> bool {
        self == SensorMode::Hybrid
    }
}

impl fmt::Display for SensorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nom = match self {
            SensorMode::AccelOnly => "accel",
            SensorMode::MagOnly => "mag",
            SensorMode::Hybrid => "hybrid",
        };
        write!(f, "{}", nom)
    }
}

impl FromStr for SensorMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "accel" | "accel-only" => Ok(SensorMode::AccelOnly),
            "mag" | "mag-only" => Ok(SensorMode::MagOnly),
            "hybrid" | "hybride" => Ok(SensorMode::Hybrid),
            _ => Err(anyhow!("Mode inconnu: {} (accel, mag, hybrid)", s)),
        }
    }
}

/// Etat système (SYSMOD sysmod[1:0])
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemStatus {
    Standby,
    Wake,
    Sleep,
}

impl SystemStatus {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => SystemStatus::Standby,
            0b01 => SystemStatus::Wake,
            _ => SystemStatus::Sleep,
        }
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nom = match self {
            SystemStatus::Standby => "STANDBY",
            SystemStatus::Wake => "WAKE",
            SystemStatus::Sleep => "SLEEP",
        };
        write!(f, "{}", nom)
    }
}

/// Fréquence de sortie (ODR)
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputDataRate {
    #[serde(rename = "800hz")]
    Odr800Hz,
    #[serde(rename = "400hz")]
    Odr400Hz,
    #[serde(rename = "200hz")]
    Odr200Hz,
    #[default]
    #[serde(rename = "100hz")]
    Odr100Hz,
    #[serde(rename = "50hz")]
    Odr50Hz,
    #[serde(rename = "25hz")]
    Odr25Hz,
    #[serde(rename = "12.5hz")]
    Odr12_5Hz,
    #[serde(rename = "6.25hz")]
    Odr6_25Hz,
    #[serde(rename = "3.125hz")]
    Odr3_125Hz,
    #[serde(rename = "1.5625hz")]
    Odr1_5625Hz,
    #[serde(rename = "0.7813hz")]
    Odr0_7813Hz,
}

/// Ligne de la table ODR : bits dr[2:0] de CTRL_REG1 selon le mode, `None` si indisponible
#[derive(Clone, Copy, Debug)]
pub struct OdrEntry {
    pub rate: OutputDataRate,
    pub hz: f32,
    pub hybrid: Option<u8>,
    pub single: Option<u8>,
}

/// Le même motif dr donne une fréquence moitié en mode hybride
pub static ODR_TABLE: [OdrEntry; 11] = [
    OdrEntry { rate: OutputDataRate::Odr800Hz, hz: 800.0, hybrid: None, single: Some(0b000) },
    OdrEntry { rate: OutputDataRate::Odr400Hz, hz: 400.0, hybrid: Some(0b000), single: Some(0b001) },
    OdrEntry { rate: OutputDataRate::Odr200Hz, hz: 200.0, hybrid: Some(0b001), single: Some(0b010) },
    OdrEntry { rate: OutputDataRate::Odr100Hz, hz: 100.0, hybrid: Some(0b010), single: Some(0b011) },
    OdrEntry { rate: OutputDataRate::Odr50Hz, hz: 50.0, hybrid: Some(0b011), single: Some(0b100) },
    OdrEntry { rate: OutputDataRate::Odr25Hz, hz: 25.0, hybrid: Some(0b100), single: None },
    OdrEntry { rate: OutputDataRate::Odr12_5Hz, hz: 12.5, hybrid: None, single: Some(0b101) },
    OdrEntry { rate: OutputDataRate::Odr6_25Hz, hz: 6.25, hybrid: Some(0b101), single: Some(0b110) },
    OdrEntry { rate: OutputDataRate::Odr3_125Hz, hz: 3.125, hybrid: Some(0b110), single: None },
    OdrEntry { rate: OutputDataRate::Odr1_5625Hz, hz: 1.5625, hybrid: None, single: Some(0b111) },
    OdrEntry { rate: OutputDataRate::Odr0_7813Hz, hz: 0.7813, hybrid: Some(0b111), single: None },
];

impl OutputDataRate {
    /// Position dans `ODR_TABLE`
    fn index(self) -> usize {
        match self {
            OutputDataRate::Odr800Hz => 0,
            OutputDataRate::Odr400Hz => 1,
            OutputDataRate::Odr200Hz => 2,
            OutputDataRate::Odr100Hz => 3,
            OutputDataRate::Odr50Hz => 4,
            OutputDataRate::Odr25Hz => 5,
            OutputDataRate::Odr12_5Hz => 6,
            OutputDataRate::Odr6_25Hz => 7,
            OutputDataRate::Odr3_125Hz => 8,
            OutputDataRate::Odr1_5625Hz => 9,
            OutputDataRate::Odr0_7813Hz => 10,
        }
    }

    fn entry(self) -> &'static OdrEntry {
        &ODR_TABLE[self.index()]
    }

    pub fn hz(self) -> f32 {
        self.entry().hz
    }

    /// Bits dr[2:0] pour ce mode, `None` si la fréquence n'y est pas disponible
    pub fn dr_bits(self, mode: SensorMode) -> Option<u8> {
        let entry = self.entry();
        if mode.is_hybrid() {
            entry.hybrid
        } else {
            entry.single
        }
    }

    pub fn is_available(self, mode: SensorMode) -> bool {
        self.dr_bits(mode).is_some()
    }

    /// Fréquence correspondant aux bits dr[2:0] dans ce mode
    pub fn from_dr_bits(dr: u8, mode: SensorMode) -> Option<Self> {
        ODR_TABLE
            .iter()
            .find(|e| {
                let bits = if mode.is_hybrid() { e.hybrid } else { e.single };
                bits == Some(dr & 0b111)
            })
            .map(|e| e.rate)
    }

    /// Fréquences disponibles dans ce mode, de la plus rapide à la plus lente
    pub fn available(mode: SensorMode) -> impl Iterator<Item = OutputDataRate> {
        ODR_TABLE.iter().filter(move |e| e.rate.is_available(mode)).map(|e| e.rate)
    }
}

impl fmt::Display for OutputDataRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz", self.hz())
    }
}

impl FromStr for OutputDataRate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let valeur = s.trim().to_lowercase();
        let valeur: f32 = valeur
            .trim_end_matches("hz")
            .trim()
            .parse()
            .map_err(|_| anyhow!("ODR invalide: {}", s))?;

        ODR_TABLE
            .iter()
            .find(|e| (e.hz - valeur).abs() < 0.001)
            .map(|e| e.rate)
            .ok_or_else(|| anyhow!("ODR inconnue: {}", s))
    }
}

/// Ratio de sur-échantillonnage du magnétomètre (M_CTRL_REG1 m_os[2:0])
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum MagOversamplingRatio {
    Osr0,
    Osr1,
    Osr2,
    Osr3,
    Osr4,
    Osr5,
    Osr6,
    #[default]
    Osr7,
}

impl MagOversamplingRatio {
    pub fn bits(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MagOversamplingRatio {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> anyhow::Result<Self> {
        match value {
            0 => Ok(MagOversamplingRatio::Osr0),
            1 => Ok(MagOversamplingRatio::Osr1),
            2 => Ok(MagOversamplingRatio::Osr2),
            3 => Ok(MagOversamplingRatio::Osr3),
            4 => Ok(MagOversamplingRatio::Osr4),
            5 => Ok(MagOversamplingRatio::Osr5),
            6 => Ok(MagOversamplingRatio::Osr6),
            7 => Ok(MagOversamplingRatio::Osr7),
            _ => Err(anyhow!("OSR hors limites: {} (0..=7)", value)),
        }
    }
}

impl From<MagOversamplingRatio> for u8 {
    fn from(ratio: MagOversamplingRatio) -> u8 {
        ratio.bits()
    }
}

impl fmt::Display for MagOversamplingRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl FromStr for MagOversamplingRatio {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let valeur: u8 = s.trim().parse().map_err(|_| anyhow!("OSR invalide: {}", s))?;
        MagOversamplingRatio::try_from(valeur)
    }
}
