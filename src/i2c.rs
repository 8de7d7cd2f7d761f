#[cfg(feature = "real-sensors")]
use rppal::i2c::I2c;

/// Transport I2C utilisé par les pilotes.
///
/// Les quatre primitives sont à implémenter, les accès registre (octet, bits)
/// sont fournis par défaut à partir de `ecriture` et `ecriture_lecture`.
pub trait I2CBus {
    /// Sélectionne l'esclave à adresser pour les transactions suivantes
    fn set_slave(&mut self, adresse: u16) -> anyhow::Result<()>;

    /// Ecrit N octets sur l'esclave
    fn ecriture(&mut self, buffer: &[u8]) -> anyhow::Result<()>;

    /// Lis N octets depuis l'esclave
    fn lecture(&mut self, buffer: &mut [u8]) -> anyhow::Result<()>;

    /// Ecrit puis lis dans une seule transaction (repeated start)
    fn ecriture_lecture(&mut self, ecriture: &[u8], lecture: &mut [u8]) -> anyhow::Result<()>;

    /// Ecrit un octet (word) dans un registre 8 bits
    fn ecriture_word(&mut self, command: u8, data: u8) -> anyhow::Result<()> {
        self.ecriture(&[command, data])
    }

    /// Lecture d'un octet (word) dans un registre 8 bits
    fn lecture_word(&mut self, command: u8) -> anyhow::Result<u8> {
        let mut buffer = [0u8];
        self.ecriture_lecture(&[command], &mut buffer)?;
        Ok(buffer[0])
    }

    /// Lis un bit sur la position donnée d'un registre 8 bits
    fn lecture_bit8(&mut self, command: u8, bit: u8) -> anyhow::Result<bool> {
        Ok(self.lecture_bits8(command, bit, 1)? == 1)
    }

    /// Ecrit un bit sur la position donnée d'un registre 8 bits
    fn ecriture_bit8(&mut self, command: u8, bit: u8, state: bool) -> anyhow::Result<()> {
        self.ecriture_bits8(command, bit, 1, state as u8)
    }

    /// Lis un ensemble de bits sur une position donnée d'un registre 8 bits
    fn lecture_bits8(&mut self, command: u8, bit: u8, lenght: u8) -> anyhow::Result<u8> {
        let registre = self.lecture_word(command)?;
        Ok((registre & masque(bit, lenght)) >> bit)
    }

    /// Ecrit un ensemble de bits sur une position donnée d'un registre 8 bits (les autres bits sont conservés)
    fn ecriture_bits8(&mut self, command: u8, bit: u8, lenght: u8, value_to_write: u8) -> anyhow::Result<()> {
        let filtre = masque(bit, lenght);
        let registre = self.lecture_word(command)?;
        let registre = (registre & !filtre) | ((value_to_write << bit) & filtre);
        self.ecriture_word(command, registre)
    }
}

/// Masque de `lenght` bits à partir du bit `bit`
pub fn masque(bit: u8, lenght: u8) -> u8 {
    (((1u16 << lenght) - 1) << bit) as u8
}

#[cfg(feature = "real-sensors")]
impl I2CBus for I2c {
    fn set_slave(&mut self, adresse: u16) -> anyhow::Result<()> {
        self.set_slave_address(adresse)?;
        Ok(())
    }

    fn ecriture(&mut self, buffer: &[u8]) -> anyhow::Result<()> {
        let ecrit = self.write(buffer)?;
        if ecrit != buffer.len() {
            anyhow::bail!("écriture partielle ({}/{} octets)", ecrit, buffer.len());
        }
        Ok(())
    }

    fn lecture(&mut self, buffer: &mut [u8]) -> anyhow::Result<()> {
        let lu = self.read(buffer)?;
        if lu != buffer.len() {
            anyhow::bail!("lecture partielle ({}/{} octets)", lu, buffer.len());
        }
        Ok(())
    }

    fn ecriture_lecture(&mut self, ecriture: &[u8], lecture: &mut [u8]) -> anyhow::Result<()> {
        self.write_read(ecriture, lecture)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{SimulatedFxos8700, Transaction};

    #[test]
    fn masque_couvre_les_bits_demandes() {
        assert_eq!(masque(0, 1), 0b0000_0001);
        assert_eq!(masque(3, 3), 0b0011_1000);
        assert_eq!(masque(2, 3), 0b0001_1100);
        assert_eq!(masque(0, 8), 0xFF);
    }

    #[test]
    fn ecriture_bits8_conserve_les_autres_bits() {
        let mut bus = SimulatedFxos8700::new();
        bus.ecriture_word(0x2A, 0b1100_0101).unwrap();

        bus.ecriture_bits8(0x2A, 3, 3, 0b010).unwrap();

        assert_eq!(bus.lecture_word(0x2A).unwrap(), 0b1101_0101);
        assert_eq!(bus.lecture_bits8(0x2A, 3, 3).unwrap(), 0b010);
    }

    #[test]
    fn ecriture_bits8_tronque_la_valeur_au_champ() {
        let mut bus = SimulatedFxos8700::new();
        bus.ecriture_word(0x5B, 0x00).unwrap();

        bus.ecriture_bits8(0x5B, 0, 2, 0xFF).unwrap();

        assert_eq!(bus.lecture_word(0x5B).unwrap(), 0b0000_0011);
    }

    #[test]
    fn bit8_lecture_et_ecriture() {
        let mut bus = SimulatedFxos8700::new();
        bus.ecriture_bit8(0x5C, 5, true).unwrap();
        assert!(bus.lecture_bit8(0x5C, 5).unwrap());

        bus.ecriture_bit8(0x5C, 5, false).unwrap();
        assert!(!bus.lecture_bit8(0x5C, 5).unwrap());
    }

    #[test]
    fn lecture_word_passe_par_une_transaction_unique() {
        let mut bus = SimulatedFxos8700::new();
        bus.lecture_word(0x0D).unwrap();

        assert_eq!(
            bus.transactions(),
            vec![Transaction::WriteRead { ecriture: vec![0x0D], lecture: 1 }]
        );
    }
}
