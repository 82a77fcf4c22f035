//! Merge parsed schedule records into the vehicle store.

use std::future::Future;

use fleetwatch_core::db::DatabaseError;
use tracing::{debug, info, warn};

use crate::storage::{FleetDatabase, ScheduleRecord};

/// Keyed insert-if-absent storage for schedule records.
pub trait VehicleStore {
    /// Insert `record` unless its bus number exists. `Ok(false)` means the
    /// key was already present and nothing changed.
    fn insert_if_absent(
        &self,
        record: &ScheduleRecord,
    ) -> impl Future<Output = Result<bool, DatabaseError>> + Send;
}

impl VehicleStore for FleetDatabase {
    async fn insert_if_absent(&self, record: &ScheduleRecord) -> Result<bool, DatabaseError> {
        self.insert_vehicle_if_absent(record).await
    }
}

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// First-write-wins merge of schedule records.
pub struct Reconciler<S> {
    store: S,
}

impl<S: VehicleStore> Reconciler<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Insert every record whose bus number is new.
    ///
    /// Existing keys are skipped without error. A record the store rejects
    /// is logged and counted; the pass continues with the next one.
    pub async fn reconcile(&self, records: &[ScheduleRecord]) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        for record in records {
            match self.store.insert_if_absent(record).await {
                Ok(true) => summary.inserted += 1,
                Ok(false) => {
                    debug!(bus_number = %record.bus_number, "Vehicle already stored, skipping");
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!(bus_number = %record.bus_number, error = %e, "Failed to store vehicle");
                    summary.failed += 1;
                }
            }
        }

        info!(
            inserted = summary.inserted,
            skipped = summary.skipped,
            failed = summary.failed,
            "Schedule reconciliation finished"
        );
        summary
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    fn record(bus_number: &str, route: &str) -> ScheduleRecord {
        ScheduleRecord {
            vehicle_type: "bus".into(),
            route: route.into(),
            schedule: 1,
            shift: 1,
            bus_number: bus_number.into(),
            low_floor: false,
            trip_start: 300,
            trip_end: 1300,
            direction_id: 1,
            direction_type: "a-b".into(),
            direction_name: "Center".into(),
        }
    }

    /// In-memory store that rejects one configured bus number.
    #[derive(Default)]
    struct FlakyStore {
        rows: Mutex<HashMap<String, ScheduleRecord>>,
        reject: Option<&'static str>,
    }

    impl VehicleStore for FlakyStore {
        async fn insert_if_absent(&self, record: &ScheduleRecord) -> Result<bool, DatabaseError> {
            if self.reject == Some(record.bus_number.as_str()) {
                return Err(DatabaseError::Query("disk I/O error".into()));
            }
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(&record.bus_number) {
                return Ok(false);
            }
            rows.insert(record.bus_number.clone(), record.clone());
            Ok(true)
        }
    }

    #[tokio::test]
    async fn second_pass_is_a_no_op() {
        let db = FleetDatabase::open_in_memory().await.unwrap();
        let reconciler = Reconciler::new(db.clone());
        let records = [record("B1", "1"), record("B2", "2")];

        let first = reconciler.reconcile(&records).await;
        assert_eq!(first.inserted, 2);

        let before = db.list_vehicles().await.unwrap();
        let second = reconciler.reconcile(&records).await;
        let after = db.list_vehicles().await.unwrap();

        assert_eq!(
            second,
            ReconcileSummary {
                inserted: 0,
                skipped: 2,
                failed: 0
            }
        );
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn existing_key_keeps_original_attributes() {
        let db = FleetDatabase::open_in_memory().await.unwrap();
        db.insert_vehicle_if_absent(&record("B1", "original"))
            .await
            .unwrap();

        let summary = Reconciler::new(db.clone())
            .reconcile(&[record("B1", "replacement")])
            .await;

        assert_eq!(summary.skipped, 1);
        assert_eq!(db.get_vehicle("B1").await.unwrap().route, "original");
    }

    #[tokio::test]
    async fn duplicate_keys_within_one_pass_keep_the_first() {
        let db = FleetDatabase::open_in_memory().await.unwrap();
        let summary = Reconciler::new(db.clone())
            .reconcile(&[record("B1", "first"), record("B1", "second")])
            .await;

        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(db.get_vehicle("B1").await.unwrap().route, "first");
    }

    #[tokio::test]
    async fn failing_record_does_not_stop_the_pass() {
        let store = FlakyStore {
            reject: Some("B2"),
            ..FlakyStore::default()
        };
        let reconciler = Reconciler::new(store);

        let summary = reconciler
            .reconcile(&[record("B1", "1"), record("B2", "2"), record("B3", "3")])
            .await;

        assert_eq!(
            summary,
            ReconcileSummary {
                inserted: 2,
                skipped: 0,
                failed: 1
            }
        );
        let rows = reconciler.store.rows.lock().unwrap();
        assert!(rows.contains_key("B1"));
        assert!(rows.contains_key("B3"));
        assert!(!rows.contains_key("B2"));
    }
}
