//! Listener-Registry – Geordnete Menge registrierter Listener
//!
//! Die Registry haelt pro Kategorie die Listener in Registrierungsreihenfolge.
//! Gleichheit ist Referenz-Identitaet (`Arc`-Adresse), nicht Wertgleichheit.
//!
//! ## Snapshot-Isolation
//! Die Liste liegt als `Arc<Vec<_>>` hinter einem Mutex. Ein Snapshot ist ein
//! Klon des aeusseren `Arc` und damit unveraenderlich. Aenderungen kopieren
//! die Liste (`Arc::make_mut`), sobald ein Snapshot noch in Benutzung ist.
//! Der Dispatcher iteriert ausserhalb des Locks, Listener duerfen die
//! Registry daher aus ihrem Callback heraus veraendern.

use parking_lot::Mutex;
use std::sync::Arc;

/// Unveraenderliche Momentaufnahme der Listener einer Kategorie
pub(crate) type Snapshot<L> = Arc<Vec<Arc<L>>>;

/// Thread-sichere, geordnete Listener-Menge mit Identitaetsvergleich
pub struct ListenerRegistry<L: ?Sized> {
    listeners: Mutex<Snapshot<L>>,
}

impl<L: ?Sized> ListenerRegistry<L> {
    /// Erstellt eine leere Registry
    pub fn neu() -> Self {
        Self {
            listeners: Mutex::new(Arc::new(Vec::new())),
        }
    }

    /// Fuegt einen Listener am Ende hinzu
    ///
    /// Gibt `false` zurueck wenn dieselbe Instanz bereits registriert ist;
    /// die bestehende Position bleibt dann unveraendert.
    pub fn hinzufuegen(&self, listener: Arc<L>) -> bool {
        let mut guard = self.listeners.lock();
        if guard.iter().any(|l| gleiche_instanz(l, &listener)) {
            return false;
        }
        Arc::make_mut(&mut *guard).push(listener);
        true
    }

    /// Entfernt einen Listener, `false` wenn er nicht registriert war
    pub fn entfernen(&self, listener: &Arc<L>) -> bool {
        let mut guard = self.listeners.lock();
        let Some(index) = guard.iter().position(|l| gleiche_instanz(l, listener)) else {
            return false;
        };
        Arc::make_mut(&mut *guard).remove(index);
        true
    }

    /// Prueft ob die Instanz registriert ist
    pub fn enthaelt(&self, listener: &Arc<L>) -> bool {
        self.listeners
            .lock()
            .iter()
            .any(|l| gleiche_instanz(l, listener))
    }

    /// Anzahl registrierter Listener
    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Momentaufnahme in Registrierungsreihenfolge
    pub(crate) fn snapshot(&self) -> Snapshot<L> {
        Arc::clone(&*self.listeners.lock())
    }
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self::neu()
    }
}

impl<L: ?Sized> std::fmt::Debug for ListenerRegistry<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("anzahl", &self.len())
            .finish()
    }
}

/// Referenz-Identitaet, unabhaengig von der vtable eines Trait-Objekts
pub(crate) fn gleiche_instanz<L: ?Sized>(a: &Arc<L>, b: &Arc<L>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Zaehler: Send + Sync {
        fn wert(&self) -> u32;
    }

    struct Fest(u32);

    impl Zaehler for Fest {
        fn wert(&self) -> u32 {
            self.0
        }
    }

    fn werte(snapshot: &Snapshot<dyn Zaehler>) -> Vec<u32> {
        snapshot.iter().map(|l| l.wert()).collect()
    }

    #[test]
    fn reihenfolge_bleibt_erhalten() {
        let registry: ListenerRegistry<dyn Zaehler> = ListenerRegistry::neu();
        for i in 1..=3 {
            assert!(registry.hinzufuegen(Arc::new(Fest(i))));
        }
        assert_eq!(werte(&registry.snapshot()), vec![1, 2, 3]);
    }

    #[test]
    fn doppelte_registrierung_ist_noop() {
        let registry: ListenerRegistry<dyn Zaehler> = ListenerRegistry::neu();
        let a: Arc<dyn Zaehler> = Arc::new(Fest(1));
        let b: Arc<dyn Zaehler> = Arc::new(Fest(2));

        assert!(registry.hinzufuegen(Arc::clone(&a)));
        assert!(registry.hinzufuegen(Arc::clone(&b)));
        assert!(!registry.hinzufuegen(Arc::clone(&a)));

        assert_eq!(registry.len(), 2);
        assert_eq!(werte(&registry.snapshot()), vec![1, 2]);
    }

    #[test]
    fn wertgleiche_instanzen_sind_verschieden() {
        let registry: ListenerRegistry<dyn Zaehler> = ListenerRegistry::neu();
        assert!(registry.hinzufuegen(Arc::new(Fest(7))));
        assert!(registry.hinzufuegen(Arc::new(Fest(7))));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn entfernen_unbekannter_listener_ist_noop() {
        let registry: ListenerRegistry<dyn Zaehler> = ListenerRegistry::neu();
        let a: Arc<dyn Zaehler> = Arc::new(Fest(1));
        assert!(!registry.entfernen(&a));
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_ist_von_spaeteren_aenderungen_isoliert() {
        let registry: ListenerRegistry<dyn Zaehler> = ListenerRegistry::neu();
        let a: Arc<dyn Zaehler> = Arc::new(Fest(1));
        let b: Arc<dyn Zaehler> = Arc::new(Fest(2));
        registry.hinzufuegen(Arc::clone(&a));
        registry.hinzufuegen(Arc::clone(&b));

        let snapshot = registry.snapshot();
        registry.entfernen(&a);
        registry.hinzufuegen(Arc::new(Fest(3)));

        assert_eq!(werte(&snapshot), vec![1, 2]);
        assert_eq!(werte(&registry.snapshot()), vec![2, 3]);
        assert!(!registry.enthaelt(&a));
        assert!(registry.enthaelt(&b));
    }

    #[test]
    fn paralleles_hinzufuegen_verliert_nichts() {
        let registry: Arc<ListenerRegistry<dyn Zaehler>> = Arc::new(ListenerRegistry::neu());
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        registry.hinzufuegen(Arc::new(Fest(t * 100 + i)));
                        let _ = registry.snapshot();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(registry.len(), 400);
    }
}
