// ==========================================
// Horloge injectable
// ==========================================
// Le moteur ne lit jamais l'heure système directement: l'horloge est un
// port injecté, remplaçable par une horloge fixe dans les tests.
// ==========================================

use chrono::{NaiveDate, NaiveDateTime, Utc};

/// Source de temps du moteur.
pub trait Clock: Send + Sync {
    /// Instant courant (UTC, sans fuseau).
    fn now(&self) -> NaiveDateTime;

    /// Date du jour.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Horloge système.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// Horloge fixe pour les tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: NaiveDateTime,
}

impl FixedClock {
    pub fn new(instant: NaiveDateTime) -> Self {
        Self { instant }
    }

    pub fn at_date(date: NaiveDate) -> Self {
        Self {
            instant: date.and_hms_opt(12, 0, 0).expect("heure valide"),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.instant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_is_stable() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let clock = FixedClock::at_date(date);
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.today(), date);
    }
}
