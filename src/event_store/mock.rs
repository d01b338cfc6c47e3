//! Mock data seeding for demos and local development

use tracing::info;

use super::store::{EventStore, EventStoreResult};
use crate::types::Payload;
use crate::utils::{current_time, minutes_before};

impl EventStore {
    /// Store `count` backfilled pairs of "sales" and "users" events
    ///
    /// Pair `i` is stamped `i` minutes before now, so the store ends up
    /// holding timestamps in descending order. Returns the number of
    /// events stored.
    pub fn generate_mock_data(&self, count: u32) -> EventStoreResult<usize> {
        let now = current_time();

        for i in 0..count {
            let ts = minutes_before(now, i);

            self.store(
                Payload::new("sales", "mock")
                    .at(ts)
                    .with_value("amount", 100 + i as i64)
                    .with_value("region", "Europe"),
            )?;

            self.store(
                Payload::new("users", "mock")
                    .at(ts)
                    .with_value("active", 50 + i as i64)
                    .with_value("region", "North America"),
            )?;
        }

        let stored = count as usize * 2;
        info!(events = stored, "Seeded mock data");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use chrono::{DateTime, Utc};

    #[test]
    fn test_generate_mock_data() {
        let store = EventStore::new();
        let stored = store.generate_mock_data(3).unwrap();

        assert_eq!(stored, 6);
        assert_eq!(store.len(), 6);

        let sales = store.get_data_by_type("sales", DateTime::<Utc>::MIN_UTC);
        let amounts: Vec<_> = sales.iter().map(|p| p.values["amount"].clone()).collect();
        assert_eq!(amounts, vec![Value::Int(100), Value::Int(101), Value::Int(102)]);
        assert!(sales[0].timestamp > sales[1].timestamp);

        let users = store.get_data_by_type("users", DateTime::<Utc>::MIN_UTC);
        assert_eq!(users[2].values["active"], Value::Int(52));
        assert_eq!(users[2].values["region"], Value::from("North America"));
        assert!(users.iter().all(|p| p.source == "mock"));
    }
}
