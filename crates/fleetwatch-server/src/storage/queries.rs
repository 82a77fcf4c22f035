//! Database queries for the Fleetwatch server.

use fleetwatch_core::db::{DatabaseError, unix_timestamp};

use super::db::FleetDatabase;
use super::models::{
    InspectionChecklist, InspectionResult, RouteInfo, ScheduleRecord, User, UserInfo,
};
use crate::auth::Role;

impl FleetDatabase {
    // =========================================================================
    // Credential queries
    // =========================================================================

    /// Create a credential. Fails with `Conflict` if the username exists.
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO users (username, password_hash, role, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_user_by_username(username).await
    }

    /// Get a credential by username.
    pub async fn get_user_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "SELECT username, password_hash, role, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("User {username}")))
    }

    /// List all credentials without their hashes.
    pub async fn list_users(&self) -> Result<Vec<UserInfo>, DatabaseError> {
        let users = sqlx::query_as::<_, UserInfo>(
            "SELECT username, role, created_at FROM users ORDER BY username",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(users)
    }

    // =========================================================================
    // Vehicle queries
    // =========================================================================

    /// Insert a schedule record unless its bus number is already stored.
    ///
    /// Returns `true` if a row was inserted, `false` if the key existed.
    pub async fn insert_vehicle_if_absent(
        &self,
        record: &ScheduleRecord,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO vehicles (vehicle_type, route, schedule, shift, bus_number, low_floor, \
             trip_start, trip_end, direction_id, direction_type, direction_name) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(bus_number) DO NOTHING",
        )
        .bind(&record.vehicle_type)
        .bind(&record.route)
        .bind(record.schedule)
        .bind(record.shift)
        .bind(&record.bus_number)
        .bind(record.low_floor)
        .bind(record.trip_start)
        .bind(record.trip_end)
        .bind(record.direction_id)
        .bind(&record.direction_type)
        .bind(&record.direction_name)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get a vehicle by bus number.
    pub async fn get_vehicle(&self, bus_number: &str) -> Result<ScheduleRecord, DatabaseError> {
        sqlx::query_as::<_, ScheduleRecord>("SELECT * FROM vehicles WHERE bus_number = ?")
            .bind(bus_number)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Vehicle {bus_number}")))
    }

    /// List all vehicles ordered by bus number.
    pub async fn list_vehicles(&self) -> Result<Vec<ScheduleRecord>, DatabaseError> {
        let vehicles =
            sqlx::query_as::<_, ScheduleRecord>("SELECT * FROM vehicles ORDER BY bus_number")
                .fetch_all(self.pool())
                .await?;

        Ok(vehicles)
    }

    /// Routes served by a bus. Empty if the bus is unknown.
    pub async fn get_routes_for_bus(
        &self,
        bus_number: &str,
    ) -> Result<Vec<RouteInfo>, DatabaseError> {
        let routes = sqlx::query_as::<_, RouteInfo>(
            "SELECT bus_number, route FROM vehicles WHERE bus_number = ?",
        )
        .bind(bus_number)
        .fetch_all(self.pool())
        .await?;

        Ok(routes)
    }

    pub async fn count_vehicles(&self) -> Result<i64, DatabaseError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vehicles")
            .fetch_one(self.pool())
            .await?;

        Ok(row.0)
    }

    // =========================================================================
    // Inspection result queries
    // =========================================================================

    /// Record an inspection submitted by `username`, timestamped now.
    pub async fn create_result(
        &self,
        username: &str,
        checklist: &InspectionChecklist,
    ) -> Result<InspectionResult, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "INSERT INTO results (username, bus_number, gas_tank_filled, external_damage, \
             washing_needed, technical_repair, vehicle_ready, recorded_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(username)
        .bind(&checklist.bus_number)
        .bind(checklist.gas_tank_filled)
        .bind(checklist.external_damage)
        .bind(checklist.washing_needed)
        .bind(checklist.technical_repair)
        .bind(checklist.vehicle_ready())
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_result(result.last_insert_rowid()).await
    }

    pub async fn get_result(&self, id: i64) -> Result<InspectionResult, DatabaseError> {
        sqlx::query_as::<_, InspectionResult>("SELECT * FROM results WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Result {id}")))
    }

    /// List inspection results, newest first.
    pub async fn list_results(&self) -> Result<Vec<InspectionResult>, DatabaseError> {
        let results = sqlx::query_as::<_, InspectionResult>(
            "SELECT * FROM results ORDER BY recorded_at DESC, id DESC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(results)
    }
}
