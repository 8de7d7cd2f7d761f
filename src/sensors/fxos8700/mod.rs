//! Pilote FXOS8700 : accéléromètre 14 bits et magnétomètre 16 bits sur un même bus I2C.
//!
//! Toute écriture de configuration se fait capteur en veille (bit ACTIVE à 0),
//! le pilote entre et sort de veille autour de chaque réglage.

mod error;
mod facade;
pub mod reader;
pub mod registry;
pub mod settings;

use log::{debug, info, warn};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::Config;
use crate::i2c::I2CBus;
use crate::sensors::unified::{Sensor, SensorEvent, SensorInfo, SensorType, SENSORS_GRAVITY_STANDARD};

pub use error::Fxos8700Error;
pub use facade::{Accelerometer, Magnetometer};
pub use settings::{AccelRange, MagOversamplingRatio, OutputDataRate, SensorMode, SystemStatus};

use registry::*;

pub type Result<T> = std::result::Result<T, Fxos8700Error>;

pub const ACCEL_SENSOR_ID: i32 = 8701;
pub const MAG_SENSOR_ID: i32 = 8702;

/// µT par LSB du magnétomètre
pub const MAG_UT_LSB: f32 = 0.1;
pub const MAG_MAX_UT: f32 = 1200.0;

/// Période min. annoncée par les fiches (secondes)
pub const MIN_DELAY: f32 = 0.01;

pub const STANDBY_POLL_MS: u64 = 10;
pub const STANDBY_TIMEOUT_MS: u64 = 500;

/// Dernière mesure brute (LSB) d'un capteur 3 axes
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawData {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawData {
    pub fn to_vector(self) -> Vector3<f32> {
        Vector3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

/// Axe accéléromètre : 14 bits alignés à gauche
pub fn decode_accel_axis(msb: u8, lsb: u8) -> i16 {
    i16::from_be_bytes([msb, lsb]) >> 2
}

/// Axe magnétomètre : 16 bits
pub fn decode_mag_axis(msb: u8, lsb: u8) -> i16 {
    i16::from_be_bytes([msb, lsb])
}

pub struct Fxos8700<B, C> {
    bus: Option<B>,
    clock: C,
    accel_sensor_id: i32,
    mag_sensor_id: i32,
    standby_timeout_ms: u64,
    range: AccelRange,
    mode: SensorMode,
    rate: OutputDataRate,
    ratio: MagOversamplingRatio,
    accel_raw: RawData,
    mag_raw: RawData,
}

impl<B: I2CBus, C: Clock> Fxos8700<B, C> {
    /// Constructeur (aucun accès au bus avant `begin`)
    pub fn new(accel_sensor_id: i32, mag_sensor_id: i32, clock: C) -> Self {
        Fxos8700 {
            bus: None,
            clock,
            accel_sensor_id,
            mag_sensor_id,
            standby_timeout_ms: STANDBY_TIMEOUT_MS,
            range: AccelRange::default(),
            mode: SensorMode::default(),
            rate: OutputDataRate::default(),
            ratio: MagOversamplingRatio::default(),
            accel_raw: RawData::default(),
            mag_raw: RawData::default(),
        }
    }

    /// Constructeur à partir des identifiants et du délai de la configuration
    pub fn from_config(config: &Config, clock: C) -> Self {
        let mut fxos = Self::new(config.accel_sensor_id, config.mag_sensor_id, clock);
        fxos.set_standby_timeout(config.standby_timeout_ms);
        fxos
    }

    /// Délai max. d'attente d'un changement de mode (ms)
    pub fn set_standby_timeout(&mut self, timeout_ms: u64) {
        self.standby_timeout_ms = timeout_ms;
    }

    pub fn is_initialized(&self) -> bool {
        self.bus.is_some()
    }

    /// Lie le bus, vérifie l'identité puis applique la configuration par défaut
    pub fn begin(&mut self, adresse: u16, mut bus: B) -> Result<()> {
        info!("[FXOS8700] Initialisation ({:#04x}) ...", adresse);
        self.bus = None;

        bus.set_slave(adresse)
            .map_err(|e| Fxos8700Error::Init(format!("adresse {:#04x}: {}", adresse, e)))?;

        let id = bus
            .lecture_word(FXOS8700_WHO_AM_I)
            .map_err(|e| Fxos8700Error::Init(format!("lecture WHO_AM_I: {}", e)))?;

        if id != FXOS8700_ID {
            warn!("[FXOS8700] Mauvais capteur ? WHO_AM_I = {:#04x}", id);
            return Err(Fxos8700Error::Identity { found: id, expected: FXOS8700_ID });
        }

        self.bus = Some(bus);
        if let Err(e) = self.initialize() {
            warn!("[FXOS8700] ERREUR: {}", e);
            self.bus = None;
            return Err(e);
        }

        info!(
            "[FXOS8700] Capteur prêt ({}, {}, {}, OSR {}).",
            self.range, self.mode, self.rate, self.ratio
        );
        Ok(())
    }

    /// Configuration par défaut : ±2g, bas bruit, haute résolution, hybride, 100Hz, OSR 7
    fn initialize(&mut self) -> Result<()> {
        self.set_accel_range(AccelRange::Range2G)?;

        self.standby(true)?;
        {
            let bus = self.bus()?;
            bus.ecriture_bit8(FXOS8700_CTRL_REG1, FXOS8700_CTRL_REG1_LNOISE_BIT, true)?;
            bus.ecriture_bits8(
                FXOS8700_CTRL_REG2,
                FXOS8700_CTRL_REG2_MODS_BIT,
                FXOS8700_CTRL_REG2_MODS_LENGTH,
                FXOS8700_CTRL_REG2_MODS_HIGH_RES,
            )?;
        }
        self.standby(false)?;

        self.set_sensor_mode(SensorMode::Hybrid)?;
        self.set_output_data_rate(OutputDataRate::Odr100Hz)?;
        self.set_mag_oversampling_ratio(MagOversamplingRatio::Osr7)?;

        self.accel_raw = RawData::default();
        self.mag_raw = RawData::default();
        Ok(())
    }

    /// Applique une configuration complète (plage, mode, OSR puis ODR)
    pub fn apply(&mut self, config: &Config) -> Result<()> {
        self.set_standby_timeout(config.standby_timeout_ms);
        self.set_accel_range(config.range)?;
        self.set_sensor_mode(config.mode)?;
        self.set_mag_oversampling_ratio(config.ratio)?;
        self.set_output_data_rate(config.rate)?;
        Ok(())
    }

    /// Libère le bus
    pub fn release(self) -> Option<B> {
        info!("[FXOS8700] Libération du bus.");
        self.bus
    }

    /// Accès direct au bus (diagnostic)
    pub fn bus_mut(&mut self) -> Option<&mut B> {
        self.bus.as_mut()
    }

    fn bus(&mut self) -> Result<&mut B> {
        self.bus.as_mut().ok_or(Fxos8700Error::NotInitialized)
    }

    /// Etat système courant (SYSMOD)
    pub fn system_status(&mut self) -> Result<SystemStatus> {
        let bits = self.bus()?.lecture_bits8(FXOS8700_SYSMOD, FXOS8700_SYSMOD_BIT, FXOS8700_SYSMOD_LENGTH)?;
        Ok(SystemStatus::from_bits(bits))
    }

    /// Entre (true) ou sort (false) de veille et attends que SYSMOD le confirme
    pub fn standby(&mut self, standby: bool) -> Result<()> {
        self.bus()?
            .ecriture_bit8(FXOS8700_CTRL_REG1, FXOS8700_CTRL_REG1_ACTIVE_BIT, !standby)?;

        let debut = self.clock.millis();
        loop {
            let en_veille = self.system_status()? == SystemStatus::Standby;
            if en_veille == standby {
                return Ok(());
            }

            let attente = self.clock.millis().saturating_sub(debut);
            if attente >= self.standby_timeout_ms {
                let target = if standby { "STANDBY" } else { "ACTIF" };
                warn!("[FXOS8700] SYSMOD bloqué, mode {} non atteint après {} ms", target, attente);
                return Err(Fxos8700Error::Timeout { target, waited_ms: attente });
            }

            self.clock.delay_ms(STANDBY_POLL_MS);
        }
    }

    /// Défini la pleine échelle de l'accéléromètre (±8g désactive le mode bas bruit)
    pub fn set_accel_range(&mut self, range: AccelRange) -> Result<()> {
        self.standby(true)?;
        {
            let bus = self.bus()?;
            bus.ecriture_bits8(
                FXOS8700_XYZ_DATA_CFG,
                FXOS8700_XYZ_DATA_CFG_FS_BIT,
                FXOS8700_XYZ_DATA_CFG_FS_LENGTH,
                range.bits(),
            )?;

            // Le mode bas bruit est limité à ±4g
            if range == AccelRange::Range8G {
                bus.ecriture_bit8(FXOS8700_CTRL_REG1, FXOS8700_CTRL_REG1_LNOISE_BIT, false)?;
            }
        }
        // Le champ suit le registre, même si la sortie de veille échoue
        self.range = range;
        debug!("[FXOS8700] Plage: {}", range);

        self.standby(false)
    }

    /// Défini le mode (accéléromètre, magnétomètre ou hybride)
    pub fn set_sensor_mode(&mut self, mode: SensorMode) -> Result<()> {
        // Les bits dr ne désignent pas la même fréquence selon le mode
        let rate = if self.rate.is_available(mode) {
            self.rate
        } else {
            let dr = self.rate.dr_bits(self.mode).unwrap_or_default();
            OutputDataRate::from_dr_bits(dr, mode).unwrap_or_default()
        };
        let dr = rate
            .dr_bits(mode)
            .ok_or(Fxos8700Error::InvalidConfiguration { rate, mode })?;

        self.standby(true)?;
        {
            let bus = self.bus()?;
            bus.ecriture_bits8(
                FXOS8700_M_CTRL_REG1,
                FXOS8700_M_CTRL_REG1_HMS_BIT,
                FXOS8700_M_CTRL_REG1_HMS_LENGTH,
                mode.bits(),
            )?;
            bus.ecriture_bit8(FXOS8700_M_CTRL_REG2, FXOS8700_M_CTRL_REG2_HYB_AUTOINC_BIT, mode.is_hybrid())?;
            bus.ecriture_bits8(FXOS8700_CTRL_REG1, FXOS8700_CTRL_REG1_DR_BIT, FXOS8700_CTRL_REG1_DR_LENGTH, dr)?;
        }

        if rate != self.rate {
            warn!("[FXOS8700] ODR {} indisponible en mode {}, ODR effective: {}", self.rate, mode, rate);
        }
        self.mode = mode;
        self.rate = rate;
        debug!("[FXOS8700] Mode: {}", mode);

        self.standby(false)
    }

    /// Défini la fréquence de sortie, refusée si elle n'existe pas dans le mode courant
    pub fn set_output_data_rate(&mut self, rate: OutputDataRate) -> Result<()> {
        let dr = match rate.dr_bits(self.mode) {
            Some(dr) => dr,
            None => {
                warn!("[FXOS8700] ODR {} refusée en mode {}", rate, self.mode);
                return Err(Fxos8700Error::InvalidConfiguration { rate, mode: self.mode });
            }
        };

        self.standby(true)?;
        self.bus()?
            .ecriture_bits8(FXOS8700_CTRL_REG1, FXOS8700_CTRL_REG1_DR_BIT, FXOS8700_CTRL_REG1_DR_LENGTH, dr)?;
        self.rate = rate;
        debug!("[FXOS8700] ODR: {}", rate);

        self.standby(false)
    }

    /// Défini le sur-échantillonnage du magnétomètre
    pub fn set_mag_oversampling_ratio(&mut self, ratio: MagOversamplingRatio) -> Result<()> {
        self.standby(true)?;
        self.bus()?.ecriture_bits8(
            FXOS8700_M_CTRL_REG1,
            FXOS8700_M_CTRL_REG1_OS_BIT,
            FXOS8700_M_CTRL_REG1_OS_LENGTH,
            ratio.bits(),
        )?;
        self.ratio = ratio;
        debug!("[FXOS8700] OSR: {}", ratio);

        self.standby(false)
    }

    pub fn accel_range(&self) -> AccelRange {
        self.range
    }

    pub fn sensor_mode(&self) -> SensorMode {
        self.mode
    }

    pub fn output_data_rate(&self) -> OutputDataRate {
        self.rate
    }

    pub fn mag_oversampling_ratio(&self) -> MagOversamplingRatio {
        self.ratio
    }

    /// Dernière mesure brute de l'accéléromètre
    pub fn accel_raw(&self) -> RawData {
        self.accel_raw
    }

    /// Dernière mesure brute du magnétomètre
    pub fn mag_raw(&self) -> RawData {
        self.mag_raw
    }

    /// Lecture en rafale des deux capteurs (même horodatage)
    pub fn get_events(&mut self) -> Result<(SensorEvent, SensorEvent)> {
        let mut buffer = [0u8; FXOS8700_BURST_LEN];
        self.bus()?.ecriture_lecture(&[FXOS8700_STATUS], &mut buffer)?;
        let timestamp = self.clock.millis();

        self.accel_raw = RawData {
            x: decode_accel_axis(buffer[1], buffer[2]),
            y: decode_accel_axis(buffer[3], buffer[4]),
            z: decode_accel_axis(buffer[5], buffer[6]),
        };
        self.mag_raw = RawData {
            x: decode_mag_axis(buffer[7], buffer[8]),
            y: decode_mag_axis(buffer[9], buffer[10]),
            z: decode_mag_axis(buffer[11], buffer[12]),
        };

        let accel = SensorEvent::new(
            self.accel_sensor_id,
            SensorType::Accelerometer,
            timestamp,
            self.accel_raw.to_vector() * self.range.scale(),
        );
        let mag = SensorEvent::new(
            self.mag_sensor_id,
            SensorType::MagneticField,
            timestamp,
            self.mag_raw.to_vector() * MAG_UT_LSB,
        );

        Ok((accel, mag))
    }

    /// Remplis les événements demandés, remis à zéro avant la lecture
    pub fn read_events(&mut self, mut accel: Option<&mut SensorEvent>, mut mag: Option<&mut SensorEvent>) -> Result<()> {
        if let Some(event) = accel.as_deref_mut() {
            *event = SensorEvent::empty();
        }
        if let Some(event) = mag.as_deref_mut() {
            *event = SensorEvent::empty();
        }

        let (accel_event, mag_event) = self.get_events()?;

        if let Some(event) = accel {
            *event = accel_event;
        }
        if let Some(event) = mag {
            *event = mag_event;
        }
        Ok(())
    }

    /// Fiche de l'accéléromètre pour la plage courante
    pub fn accel_info(&self) -> SensorInfo {
        let g = SENSORS_GRAVITY_STANDARD;
        SensorInfo {
            name: "FXOS8700".to_string(),
            version: 1,
            sensor_id: self.accel_sensor_id,
            sensor_type: SensorType::Accelerometer,
            max_value: self.range.max_g() * g,
            min_value: self.range.min_g() * g,
            resolution: self.range.scale(),
            min_delay: MIN_DELAY,
        }
    }

    /// Fiche du magnétomètre
    pub fn mag_info(&self) -> SensorInfo {
        SensorInfo {
            name: "FXOS8700".to_string(),
            version: 1,
            sensor_id: self.mag_sensor_id,
            sensor_type: SensorType::MagneticField,
            max_value: MAG_MAX_UT,
            min_value: -MAG_MAX_UT,
            resolution: MAG_UT_LSB,
            min_delay: MIN_DELAY,
        }
    }

    /// Fiches des deux capteurs (aucun accès au bus)
    pub fn get_sensors(&self) -> (SensorInfo, SensorInfo) {
        (self.accel_info(), self.mag_info())
    }

    /// Vue accéléromètre seul
    pub fn accelerometer(&mut self) -> Accelerometer<'_, B, C> {
        Accelerometer::new(self)
    }

    /// Vue magnétomètre seul
    pub fn magnetometer(&mut self) -> Magnetometer<'_, B, C> {
        Magnetometer::new(self)
    }
}

/// Lecture d'un seul capteur selon le mode : impossible en hybride
impl<B: I2CBus, C: Clock> Sensor for Fxos8700<B, C> {
    type Error = Fxos8700Error;

    fn get_event(&mut self) -> Result<SensorEvent> {
        match self.mode {
            SensorMode::AccelOnly => self.get_events().map(|(accel, _)| accel),
            SensorMode::MagOnly => self.get_events().map(|(_, mag)| mag),
            SensorMode::Hybrid => Err(Fxos8700Error::HybridSingleRead),
        }
    }

    fn get_sensor(&self) -> SensorInfo {
        match self.mode {
            SensorMode::MagOnly => self.mag_info(),
            _ => self.accel_info(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{SimulatedClock, SimulatedFxos8700, Transaction};

    type Capteur = Fxos8700<SimulatedFxos8700, SimulatedClock>;

    fn capteur() -> (Capteur, SimulatedClock) {
        let clock = SimulatedClock::new();
        let mut fxos = Fxos8700::new(ACCEL_SENSOR_ID, MAG_SENSOR_ID, clock.clone());
        fxos.begin(FXOS8700_ADDR, SimulatedFxos8700::new()).unwrap();
        (fxos, clock)
    }

    fn sim(fxos: &mut Capteur) -> &mut SimulatedFxos8700 {
        fxos.bus_mut().unwrap()
    }

    fn proche(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn begin_applique_la_configuration_par_defaut() {
        let (mut fxos, _) = capteur();

        assert!(fxos.is_initialized());
        assert_eq!(fxos.accel_range(), AccelRange::Range2G);
        assert_eq!(fxos.sensor_mode(), SensorMode::Hybrid);
        assert_eq!(fxos.output_data_rate(), OutputDataRate::Odr100Hz);
        assert_eq!(fxos.mag_oversampling_ratio(), MagOversamplingRatio::Osr7);
        assert_eq!(fxos.accel_raw(), RawData::default());

        let bus = sim(&mut fxos);
        assert_eq!(bus.address(), Some(FXOS8700_ADDR));
        assert_eq!(bus.register(FXOS8700_XYZ_DATA_CFG), 0x00);
        // actif, bas bruit, dr = 0b010 (100Hz hybride)
        assert_eq!(bus.register(FXOS8700_CTRL_REG1), 0b0001_0101);
        assert_eq!(bus.register(FXOS8700_CTRL_REG2), 0b10);
        // hybride, OSR 7
        assert_eq!(bus.register(FXOS8700_M_CTRL_REG1), 0b0001_1111);
        assert_eq!(bus.register(FXOS8700_M_CTRL_REG2), 0b0010_0000);
        assert_eq!(bus.active_config_writes(), 0);
    }

    #[test]
    fn begin_refuse_un_autre_capteur() {
        let mut bus = SimulatedFxos8700::new();
        bus.set_identity(0x6A);
        let mut fxos = Fxos8700::new(ACCEL_SENSOR_ID, MAG_SENSOR_ID, SimulatedClock::new());

        let erreur = fxos.begin(FXOS8700_ADDR, bus).unwrap_err();

        assert!(matches!(erreur, Fxos8700Error::Identity { found: 0x6A, expected: 0xC7 }));
        assert!(erreur.is_init());
        assert!(!fxos.is_initialized());
        assert!(matches!(fxos.get_events(), Err(Fxos8700Error::NotInitialized)));
        assert!(matches!(fxos.standby(true), Err(Fxos8700Error::NotInitialized)));
    }

    #[test]
    fn begin_sur_bus_en_panne() {
        let mut bus = SimulatedFxos8700::new();
        bus.set_failure(true);
        let mut fxos = Fxos8700::new(ACCEL_SENSOR_ID, MAG_SENSOR_ID, SimulatedClock::new());

        let erreur = fxos.begin(FXOS8700_ADDR, bus).unwrap_err();

        assert!(matches!(erreur, Fxos8700Error::Init(_)));
        assert!(fxos.release().is_none());
    }

    #[test]
    fn lecture_combinee_en_une_transaction() {
        let (mut fxos, _) = capteur();
        {
            let bus = sim(&mut fxos);
            bus.poke(FXOS8700_OUT_X_MSB, &[0x10, 0x00, 0xFF, 0xFC, 0x00, 0x00]);
            bus.poke(FXOS8700_M_OUT_X_MSB, &[0xFF, 0xFF, 0x00, 0x0A, 0x00, 0x00]);
            bus.clear_transactions();
        }

        let (accel, mag) = fxos.get_events().unwrap();

        assert_eq!(
            sim(&mut fxos).transactions(),
            vec![Transaction::WriteRead { ecriture: vec![FXOS8700_STATUS], lecture: 13 }]
        );
        assert_eq!(fxos.accel_raw(), RawData { x: 1024, y: -1, z: 0 });
        assert_eq!(fxos.mag_raw(), RawData { x: -1, y: 10, z: 0 });

        assert_eq!(accel.sensor_id, ACCEL_SENSOR_ID);
        assert_eq!(accel.sensor_type, SensorType::Accelerometer);
        assert!(proche(accel.data.x, 1024.0 * 0.000244 * SENSORS_GRAVITY_STANDARD));
        assert!(proche(accel.data.y, -0.000244 * SENSORS_GRAVITY_STANDARD));

        assert_eq!(mag.sensor_id, MAG_SENSOR_ID);
        assert_eq!(mag.sensor_type, SensorType::MagneticField);
        assert!(proche(mag.data.x, -0.1));
        assert!(proche(mag.data.y, 1.0));
    }

    #[test]
    fn decodage_des_axes() {
        assert_eq!(decode_accel_axis(0x7F, 0xFC), 8191);
        assert_eq!(decode_accel_axis(0x80, 0x00), -8192);
        assert_eq!(decode_accel_axis(0xFF, 0xFC), -1);
        assert_eq!(decode_mag_axis(0x80, 0x00), i16::MIN);
        assert_eq!(decode_mag_axis(0x01, 0x02), 0x0102);
    }

    #[test]
    fn horodatage_commun_et_croissant() {
        let (mut fxos, clock) = capteur();

        clock.advance(7);
        let (accel, mag) = fxos.get_events().unwrap();
        assert_eq!(accel.timestamp, mag.timestamp);

        clock.advance(5);
        let (suivant, _) = fxos.get_events().unwrap();
        assert_eq!(suivant.timestamp, accel.timestamp + 5);
    }

    #[test]
    fn echelle_suit_la_plage() {
        let (mut fxos, _) = capteur();
        sim(&mut fxos).set_accel_raw(RawData { x: 100, y: 0, z: 0 });

        fxos.set_accel_range(AccelRange::Range8G).unwrap();
        let (accel, _) = fxos.get_events().unwrap();

        assert!(proche(accel.data.x, 100.0 * 0.000976 * SENSORS_GRAVITY_STANDARD));
    }

    #[test]
    fn read_events_partiel() {
        let (mut fxos, _) = capteur();
        sim(&mut fxos).set_mag_raw(RawData { x: 300, y: 0, z: -300 });

        let mut mag = SensorEvent::empty();
        fxos.read_events(None, Some(&mut mag)).unwrap();

        assert_eq!(mag.sensor_type, SensorType::MagneticField);
        assert!(proche(mag.data.x, 30.0));
        assert!(proche(mag.data.z, -30.0));
    }

    #[test]
    fn read_events_remet_a_zero_en_cas_d_erreur() {
        let (mut fxos, _) = capteur();
        let mut accel = SensorEvent::new(1, SensorType::Accelerometer, 42, Vector3::new(1.0, 2.0, 3.0));
        let mut mag = accel;
        sim(&mut fxos).set_failure(true);

        let resultat = fxos.read_events(Some(&mut accel), Some(&mut mag));

        assert!(matches!(resultat, Err(Fxos8700Error::Transport(_))));
        assert_eq!(accel, SensorEvent::empty());
        assert_eq!(mag, SensorEvent::empty());
    }

    #[test]
    fn erreur_de_transport_conserve_les_mesures_brutes() {
        let (mut fxos, _) = capteur();
        sim(&mut fxos).set_accel_raw(RawData { x: 5, y: 6, z: 7 });
        fxos.get_events().unwrap();

        sim(&mut fxos).set_failure(true);
        assert!(fxos.get_events().is_err());
        assert_eq!(fxos.accel_raw(), RawData { x: 5, y: 6, z: 7 });
    }

    #[test]
    fn odr_invalide_refusee_sans_trafic() {
        let (mut fxos, _) = capteur();
        sim(&mut fxos).clear_transactions();

        let resultat = fxos.set_output_data_rate(OutputDataRate::Odr800Hz);

        assert!(matches!(
            resultat,
            Err(Fxos8700Error::InvalidConfiguration { rate: OutputDataRate::Odr800Hz, mode: SensorMode::Hybrid })
        ));
        assert_eq!(fxos.output_data_rate(), OutputDataRate::Odr100Hz);
        assert!(sim(&mut fxos).transactions().is_empty());
    }

    #[test]
    fn odr_ne_modifie_que_les_bits_dr() {
        let (mut fxos, _) = capteur();

        fxos.set_output_data_rate(OutputDataRate::Odr25Hz).unwrap();

        assert_eq!(fxos.output_data_rate(), OutputDataRate::Odr25Hz);
        // actif et bas bruit conservés, dr = 0b100
        assert_eq!(sim(&mut fxos).register(FXOS8700_CTRL_REG1), 0b0010_0101);
    }

    #[test]
    fn mode_simple_conserve_une_odr_compatible() {
        let (mut fxos, _) = capteur();

        fxos.set_sensor_mode(SensorMode::AccelOnly).unwrap();
        assert_eq!(fxos.output_data_rate(), OutputDataRate::Odr100Hz);
        let bus = sim(&mut fxos);
        assert_eq!(bus.register(FXOS8700_M_CTRL_REG1) & 0b11, 0b00);
        assert_eq!(bus.register(FXOS8700_M_CTRL_REG2), 0x00);
        assert_eq!((bus.register(FXOS8700_CTRL_REG1) >> 3) & 0b111, 0b011);

        fxos.set_output_data_rate(OutputDataRate::Odr800Hz).unwrap();
        assert_eq!(fxos.output_data_rate(), OutputDataRate::Odr800Hz);
        assert_eq!((sim(&mut fxos).register(FXOS8700_CTRL_REG1) >> 3) & 0b111, 0b000);
    }

    #[test]
    fn changement_de_mode_avec_odr_indisponible() {
        let (mut fxos, _) = capteur();
        fxos.set_output_data_rate(OutputDataRate::Odr25Hz).unwrap();

        fxos.set_sensor_mode(SensorMode::MagOnly).unwrap();

        // Même motif dr (0b100), lu comme 50Hz hors hybride
        assert_eq!(fxos.output_data_rate(), OutputDataRate::Odr50Hz);
        assert!(fxos.output_data_rate().is_available(fxos.sensor_mode()));
        assert_eq!((sim(&mut fxos).register(FXOS8700_CTRL_REG1) >> 3) & 0b111, 0b100);
    }

    #[test]
    fn plage_8g_desactive_le_bas_bruit() {
        let (mut fxos, _) = capteur();

        fxos.set_accel_range(AccelRange::Range4G).unwrap();
        assert_eq!(sim(&mut fxos).register(FXOS8700_XYZ_DATA_CFG), 0b01);
        assert_ne!(sim(&mut fxos).register(FXOS8700_CTRL_REG1) & 0b100, 0);

        fxos.set_accel_range(AccelRange::Range8G).unwrap();
        assert_eq!(fxos.accel_range(), AccelRange::Range8G);
        assert_eq!(sim(&mut fxos).register(FXOS8700_XYZ_DATA_CFG), 0b10);
        assert_eq!(sim(&mut fxos).register(FXOS8700_CTRL_REG1) & 0b100, 0);

        // Le retour à ±2g ne réactive pas le bas bruit
        fxos.set_accel_range(AccelRange::Range2G).unwrap();
        assert_eq!(sim(&mut fxos).register(FXOS8700_CTRL_REG1) & 0b100, 0);
    }

    #[test]
    fn oversampling_magnetometre() {
        let (mut fxos, _) = capteur();

        fxos.set_mag_oversampling_ratio(MagOversamplingRatio::Osr3).unwrap();

        assert_eq!(fxos.mag_oversampling_ratio(), MagOversamplingRatio::Osr3);
        assert_eq!(sim(&mut fxos).register(FXOS8700_M_CTRL_REG1), 0b0000_1111);
    }

    #[test]
    fn aucun_reglage_hors_veille() {
        let (mut fxos, _) = capteur();

        fxos.set_accel_range(AccelRange::Range8G).unwrap();
        fxos.set_sensor_mode(SensorMode::AccelOnly).unwrap();
        fxos.set_output_data_rate(OutputDataRate::Odr12_5Hz).unwrap();
        fxos.set_mag_oversampling_ratio(MagOversamplingRatio::Osr0).unwrap();
        fxos.set_sensor_mode(SensorMode::Hybrid).unwrap();

        let bus = sim(&mut fxos);
        assert_eq!(bus.active_config_writes(), 0);
        assert_eq!(bus.register(FXOS8700_SYSMOD), 0b01);
    }

    #[test]
    fn aller_retour_veille_conserve_la_configuration() {
        let (mut fxos, _) = capteur();
        fxos.set_accel_range(AccelRange::Range4G).unwrap();
        fxos.set_sensor_mode(SensorMode::MagOnly).unwrap();
        fxos.set_output_data_rate(OutputDataRate::Odr12_5Hz).unwrap();
        fxos.set_mag_oversampling_ratio(MagOversamplingRatio::Osr2).unwrap();
        let avant = sim(&mut fxos).register(FXOS8700_CTRL_REG1);

        fxos.standby(true).unwrap();
        assert_eq!(fxos.system_status().unwrap(), SystemStatus::Standby);
        assert_eq!(sim(&mut fxos).register(FXOS8700_CTRL_REG1), avant & !0x01);

        fxos.standby(false).unwrap();
        assert_eq!(fxos.system_status().unwrap(), SystemStatus::Wake);
        assert_eq!(sim(&mut fxos).register(FXOS8700_CTRL_REG1), avant);
        assert_eq!(fxos.accel_range(), AccelRange::Range4G);
        assert_eq!(fxos.sensor_mode(), SensorMode::MagOnly);
        assert_eq!(fxos.output_data_rate(), OutputDataRate::Odr12_5Hz);
        assert_eq!(fxos.mag_oversampling_ratio(), MagOversamplingRatio::Osr2);
    }

    #[test]
    fn reglage_conserve_si_la_sortie_de_veille_echoue() {
        let (mut fxos, _) = capteur();
        fxos.set_standby_timeout(20);
        fxos.standby(true).unwrap();
        sim(&mut fxos).freeze_sysmod(true);

        let resultat = fxos.set_accel_range(AccelRange::Range4G);
        assert!(matches!(resultat, Err(Fxos8700Error::Timeout { target: "ACTIF", .. })));
        assert_eq!(fxos.accel_range(), AccelRange::Range4G);
        assert_eq!(sim(&mut fxos).register(FXOS8700_XYZ_DATA_CFG), 0b01);

        assert!(fxos.set_sensor_mode(SensorMode::AccelOnly).is_err());
        assert_eq!(fxos.sensor_mode(), SensorMode::AccelOnly);
        assert_eq!(sim(&mut fxos).register(FXOS8700_M_CTRL_REG1) & 0b11, 0b00);

        assert!(fxos.set_output_data_rate(OutputDataRate::Odr800Hz).is_err());
        assert_eq!(fxos.output_data_rate(), OutputDataRate::Odr800Hz);
        assert_eq!((sim(&mut fxos).register(FXOS8700_CTRL_REG1) >> 3) & 0b111, 0b000);

        assert!(fxos.set_mag_oversampling_ratio(MagOversamplingRatio::Osr1).is_err());
        assert_eq!(fxos.mag_oversampling_ratio(), MagOversamplingRatio::Osr1);

        // Les mesures utilisent l'échelle réellement programmée
        sim(&mut fxos).set_accel_raw(RawData { x: 100, y: 0, z: 0 });
        let (accel, _) = fxos.get_events().unwrap();
        assert!(proche(accel.data.x, 100.0 * 0.000488 * SENSORS_GRAVITY_STANDARD));
    }

    #[test]
    fn veille_attend_sysmod() {
        let (mut fxos, clock) = capteur();
        sim(&mut fxos).set_sysmod_latency(3);
        let attentes = clock.delays();

        fxos.standby(true).unwrap();

        assert_eq!(clock.delays() - attentes, 3);
        assert_eq!(fxos.system_status().unwrap(), SystemStatus::Standby);
    }

    #[test]
    fn veille_bornee_dans_le_temps() {
        let (mut fxos, clock) = capteur();
        fxos.set_standby_timeout(50);
        sim(&mut fxos).freeze_sysmod(true);
        let debut = clock.millis();

        let resultat = fxos.standby(true);

        assert!(matches!(resultat, Err(Fxos8700Error::Timeout { target: "STANDBY", .. })));
        assert!(clock.millis() - debut >= 50);
    }

    #[test]
    fn reglage_abandonne_si_la_veille_echoue() {
        let (mut fxos, _) = capteur();
        fxos.set_standby_timeout(20);
        sim(&mut fxos).freeze_sysmod(true);

        assert!(fxos.set_accel_range(AccelRange::Range4G).is_err());
        assert_eq!(fxos.accel_range(), AccelRange::Range2G);
        assert_eq!(sim(&mut fxos).register(FXOS8700_XYZ_DATA_CFG), 0x00);
    }

    #[test]
    fn fiches_selon_la_plage() {
        let (mut fxos, _) = capteur();
        fxos.set_accel_range(AccelRange::Range4G).unwrap();
        sim(&mut fxos).clear_transactions();

        let (accel, mag) = fxos.get_sensors();

        assert_eq!(accel.name, "FXOS8700");
        assert_eq!(accel.sensor_id, ACCEL_SENSOR_ID);
        assert_eq!(accel.sensor_type, SensorType::Accelerometer);
        assert!(proche(accel.max_value, 4.0 * SENSORS_GRAVITY_STANDARD));
        assert!(proche(accel.min_value, -3.998 * SENSORS_GRAVITY_STANDARD));
        assert!(proche(accel.resolution, 0.000488 * SENSORS_GRAVITY_STANDARD));
        assert!(proche(accel.min_delay, 0.01));

        assert_eq!(mag.sensor_id, MAG_SENSOR_ID);
        assert_eq!(mag.sensor_type, SensorType::MagneticField);
        assert_eq!(mag.max_value, 1200.0);
        assert_eq!(mag.min_value, -1200.0);
        assert!(proche(mag.resolution, 0.1));

        assert!(sim(&mut fxos).transactions().is_empty());
    }

    #[test]
    fn lecture_simple_selon_le_mode() {
        let (mut fxos, _) = capteur();
        assert!(matches!(fxos.get_event(), Err(Fxos8700Error::HybridSingleRead)));

        fxos.set_sensor_mode(SensorMode::AccelOnly).unwrap();
        assert_eq!(fxos.get_event().unwrap().sensor_type, SensorType::Accelerometer);
        assert_eq!(fxos.get_sensor().sensor_type, SensorType::Accelerometer);

        fxos.set_sensor_mode(SensorMode::MagOnly).unwrap();
        assert_eq!(fxos.get_event().unwrap().sensor_type, SensorType::MagneticField);
        assert_eq!(fxos.get_sensor().sensor_type, SensorType::MagneticField);
    }

    #[test]
    fn applique_une_configuration() {
        let (mut fxos, _) = capteur();
        let config = Config {
            range: AccelRange::Range8G,
            mode: SensorMode::AccelOnly,
            rate: OutputDataRate::Odr800Hz,
            ratio: MagOversamplingRatio::Osr2,
            ..Config::new()
        };

        fxos.apply(&config).unwrap();

        assert_eq!(fxos.accel_range(), AccelRange::Range8G);
        assert_eq!(fxos.sensor_mode(), SensorMode::AccelOnly);
        assert_eq!(fxos.output_data_rate(), OutputDataRate::Odr800Hz);
        assert_eq!(fxos.mag_oversampling_ratio(), MagOversamplingRatio::Osr2);
    }

    #[test]
    fn identifiants_personnalises() {
        let mut fxos = Fxos8700::new(11, 12, SimulatedClock::new());
        fxos.begin(FXOS8700_ADDR, SimulatedFxos8700::new()).unwrap();

        let (accel, mag) = fxos.get_events().unwrap();
        assert_eq!((accel.sensor_id, mag.sensor_id), (11, 12));
        assert_eq!(fxos.get_sensors().1.sensor_id, 12);
    }
}
