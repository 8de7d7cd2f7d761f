//! FXOS8700 simulé au niveau registre, pour les tests et les builds sans capteur réel.
//!
//! Le simulateur garde une table de registres, applique l'auto-incrément (avec
//! le saut 0x06 -> 0x33 en mode hyb_autoinc), fait suivre SYSMOD au bit ACTIVE
//! et journalise toutes les transactions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::anyhow;

use crate::clock::Clock;
use crate::i2c::I2CBus;
use crate::sensors::fxos8700::registry::*;
use crate::sensors::fxos8700::RawData;

/// Transaction vue sur le bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Write { data: Vec<u8> },
    Read { len: usize },
    WriteRead { ecriture: Vec<u8>, lecture: usize },
}

const SYSMOD_STANDBY: u8 = 0b00;
const SYSMOD_WAKE: u8 = 0b01;

#[derive(Debug, Clone)]
pub struct SimulatedFxos8700 {
    registres: [u8; 0x80],
    pointeur: u8,
    adresse: Option<u16>,
    transactions: Vec<Transaction>,
    active_config_writes: usize,
    failure: bool,
    sysmod: u8,
    sysmod_latency: u32,
    sysmod_pending: u32,
    sysmod_frozen: bool,
    #[cfg(feature = "fake-sensors")]
    noise: bool,
}

impl SimulatedFxos8700 {
    pub fn new() -> Self {
        let mut registres = [0u8; 0x80];
        registres[FXOS8700_WHO_AM_I as usize] = FXOS8700_ID;

        SimulatedFxos8700 {
            registres,
            pointeur: 0,
            adresse: None,
            transactions: Vec::new(),
            active_config_writes: 0,
            failure: false,
            sysmod: SYSMOD_STANDBY,
            sysmod_latency: 0,
            sysmod_pending: 0,
            sysmod_frozen: false,
            #[cfg(feature = "fake-sensors")]
            noise: false,
        }
    }

    /// Génère des mesures bruitées (capteur à plat, champ terrestre) à chaque lecture en rafale
    #[cfg(feature = "fake-sensors")]
    pub fn with_noise(mut self) -> Self {
        self.noise = true;
        self.registres[FXOS8700_M_CTRL_REG2 as usize] |= 1 << FXOS8700_M_CTRL_REG2_HYB_AUTOINC_BIT;
        self
    }

    /// Remplace la valeur de WHO_AM_I
    pub fn set_identity(&mut self, id: u8) {
        self.registres[FXOS8700_WHO_AM_I as usize] = id;
    }

    /// Toutes les transactions échouent tant que la panne est active
    pub fn set_failure(&mut self, failure: bool) {
        self.failure = failure;
    }

    /// Nombre de lectures de SYSMOD avant que le changement de mode soit visible
    pub fn set_sysmod_latency(&mut self, lectures: u32) {
        self.sysmod_latency = lectures;
    }

    /// SYSMOD ne suit plus le bit ACTIVE (capteur figé)
    pub fn freeze_sysmod(&mut self, frozen: bool) {
        self.sysmod_frozen = frozen;
    }

    /// Place une mesure accéléromètre (14 bits alignés à gauche)
    pub fn set_accel_raw(&mut self, raw: RawData) {
        for (i, axe) in [raw.x, raw.y, raw.z].iter().enumerate() {
            let octets = (axe << 2).to_be_bytes();
            self.poke(FXOS8700_OUT_X_MSB + 2 * i as u8, &octets);
        }
        self.registres[FXOS8700_STATUS as usize] = 0x0F;
    }

    /// Place une mesure magnétomètre (16 bits)
    pub fn set_mag_raw(&mut self, raw: RawData) {
        for (i, axe) in [raw.x, raw.y, raw.z].iter().enumerate() {
            self.poke(FXOS8700_M_OUT_X_MSB + 2 * i as u8, &axe.to_be_bytes());
        }
        self.registres[FXOS8700_M_DR_STATUS as usize] = 0x0F;
    }

    /// Ecrit directement dans la table, sans transaction ni contrôle
    pub fn poke(&mut self, debut: u8, octets: &[u8]) {
        for (i, octet) in octets.iter().enumerate() {
            self.registres[(debut as usize + i) & 0x7F] = *octet;
        }
    }

    /// Valeur actuelle d'un registre, sans transaction
    pub fn register(&self, reg: u8) -> u8 {
        if reg == FXOS8700_SYSMOD {
            return self.sysmod;
        }
        self.registres[(reg & 0x7F) as usize]
    }

    pub fn address(&self) -> Option<u16> {
        self.adresse
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    pub fn clear_transactions(&mut self) {
        self.transactions.clear();
    }

    /// Ecritures de configuration reçues hors veille (ignorées par un vrai capteur)
    pub fn active_config_writes(&self) -> usize {
        self.active_config_writes
    }

    fn is_active(&self) -> bool {
        self.registres[FXOS8700_CTRL_REG1 as usize] & (1 << FXOS8700_CTRL_REG1_ACTIVE_BIT) != 0
    }

    fn suivant(&self, reg: u8) -> u8 {
        let hyb_autoinc = self.registres[FXOS8700_M_CTRL_REG2 as usize] & (1 << FXOS8700_M_CTRL_REG2_HYB_AUTOINC_BIT) != 0;

        if reg == FXOS8700_OUT_Z_LSB && hyb_autoinc {
            FXOS8700_M_OUT_X_MSB
        } else {
            (reg + 1) & 0x7F
        }
    }

    fn ecrire_registre(&mut self, reg: u8, valeur: u8) {
        match reg {
            FXOS8700_STATUS..=FXOS8700_OUT_Z_LSB
            | FXOS8700_SYSMOD
            | FXOS8700_WHO_AM_I
            | FXOS8700_M_DR_STATUS..=FXOS8700_M_OUT_Z_LSB => return,
            _ => {}
        }

        let ancien = self.registres[reg as usize];
        if self.is_active() && FXOS8700_CONFIG_REGISTERS.contains(&reg) {
            let active_seul = reg == FXOS8700_CTRL_REG1 && (ancien ^ valeur) & !(1 << FXOS8700_CTRL_REG1_ACTIVE_BIT) == 0;
            if !active_seul {
                self.active_config_writes += 1;
            }
        }

        self.registres[reg as usize] = valeur;

        if reg == FXOS8700_CTRL_REG1 && (ancien ^ valeur) & (1 << FXOS8700_CTRL_REG1_ACTIVE_BIT) != 0 {
            self.sysmod_pending = self.sysmod_latency;
            self.rafraichir_sysmod();
        }
    }

    fn rafraichir_sysmod(&mut self) {
        if self.sysmod_frozen || self.sysmod_pending > 0 {
            return;
        }
        self.sysmod = if self.is_active() { SYSMOD_WAKE } else { SYSMOD_STANDBY };
    }

    fn lire_registre(&mut self, reg: u8) -> u8 {
        if reg == FXOS8700_SYSMOD {
            if self.sysmod_pending > 0 {
                self.sysmod_pending -= 1;
                return self.sysmod;
            }
            self.rafraichir_sysmod();
            return self.sysmod;
        }
        self.registres[reg as usize]
    }

    #[cfg(not(feature = "fake-sensors"))]
    fn debut_rafale(&mut self) {}

    #[cfg(feature = "fake-sensors")]
    fn debut_rafale(&mut self) {
        use rand::Rng;

        if !self.noise {
            return;
        }

        let mut rng = rand::thread_rng();
        let accel = RawData {
            x: rng.gen_range(-40..=40),
            y: rng.gen_range(-40..=40),
            z: 4096 + rng.gen_range(-40..=40),
        };
        let mag = RawData {
            x: 220 + rng.gen_range(-15..=15),
            y: -35 + rng.gen_range(-15..=15),
            z: -410 + rng.gen_range(-15..=15),
        };
        self.set_accel_raw(accel);
        self.set_mag_raw(mag);
    }

    fn verifier(&self) -> anyhow::Result<()> {
        if self.failure {
            return Err(anyhow!("NACK (bus simulé en panne)"));
        }
        Ok(())
    }

    fn ecrire(&mut self, data: &[u8]) -> anyhow::Result<()> {
        let (reg, valeurs) = data.split_first().ok_or_else(|| anyhow!("écriture vide"))?;
        self.pointeur = *reg & 0x7F;
        for valeur in valeurs {
            self.ecrire_registre(self.pointeur, *valeur);
            self.pointeur = self.suivant(self.pointeur);
        }
        Ok(())
    }

    fn lire(&mut self, buffer: &mut [u8]) {
        if self.pointeur == FXOS8700_STATUS {
            self.debut_rafale();
        }

        for octet in buffer.iter_mut() {
            *octet = self.lire_registre(self.pointeur);
            self.pointeur = self.suivant(self.pointeur);
        }
    }
}

impl Default for SimulatedFxos8700 {
    fn default() -> Self {
        Self::new()
    }
}

impl I2CBus for SimulatedFxos8700 {
    fn set_slave(&mut self, adresse: u16) -> anyhow::Result<()> {
        self.verifier()?;
        self.adresse = Some(adresse);
        Ok(())
    }

    fn ecriture(&mut self, buffer: &[u8]) -> anyhow::Result<()> {
        self.verifier()?;
        self.transactions.push(Transaction::Write { data: buffer.to_vec() });
        self.ecrire(buffer)
    }

    fn lecture(&mut self, buffer: &mut [u8]) -> anyhow::Result<()> {
        self.verifier()?;
        self.transactions.push(Transaction::Read { len: buffer.len() });
        self.lire(buffer);
        Ok(())
    }

    fn ecriture_lecture(&mut self, ecriture: &[u8], lecture: &mut [u8]) -> anyhow::Result<()> {
        self.verifier()?;
        self.transactions.push(Transaction::WriteRead {
            ecriture: ecriture.to_vec(),
            lecture: lecture.len(),
        });
        self.ecrire(ecriture)?;
        self.lire(lecture);
        Ok(())
    }
}

/// Horloge simulée : le temps n'avance que par `delay_ms` ou `advance`.
/// Les clones partagent le même temps.
#[derive(Clone, Debug, Default)]
pub struct SimulatedClock {
    maintenant: Arc<AtomicU64>,
    attentes: Arc<AtomicU64>,
}

impl SimulatedClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.maintenant.fetch_add(ms, Ordering::SeqCst);
    }

    /// Nombre d'appels à `delay_ms`
    pub fn delays(&self) -> u64 {
        self.attentes.load(Ordering::SeqCst)
    }
}

impl Clock for SimulatedClock {
    fn millis(&self) -> u64 {
        self.maintenant.load(Ordering::SeqCst)
    }

    fn delay_ms(&mut self, ms: u64) {
        self.attentes.fetch_add(1, Ordering::SeqCst);
        self.advance(ms);
    }
}
