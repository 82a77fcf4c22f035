//! Data models for Fleetwatch storage.

use serde::{Deserialize, Serialize};

use crate::auth::claims::{Role, UnknownRole};

/// Stored credential. Never serialized to clients.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: i64,
}

impl User {
    pub fn role(&self) -> Result<Role, UnknownRole> {
        self.role.parse()
    }
}

/// Public view of a credential for the admin user listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserInfo {
    pub username: String,
    pub role: String,
    pub created_at: i64,
}

/// One line of the vehicle schedule file, keyed by `bus_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScheduleRecord {
    pub vehicle_type: String,
    pub route: String,
    pub schedule: i64,
    pub shift: i64,
    pub bus_number: String,
    pub low_floor: bool,
    pub trip_start: i64,
    pub trip_end: i64,
    pub direction_id: i64,
    pub direction_type: String,
    pub direction_name: String,
}

/// Route served by a bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RouteInfo {
    pub bus_number: String,
    pub route: String,
}

/// Checklist submitted by an inspector.
///
/// Field names follow the API (`snake_case`); the web client's camelCase
/// names are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionChecklist {
    #[serde(alias = "busNumber")]
    pub bus_number: String,
    #[serde(default, alias = "gasTankFilled")]
    pub gas_tank_filled: bool,
    #[serde(default, alias = "externalDamage")]
    pub external_damage: bool,
    #[serde(default, alias = "washingNeeded")]
    pub washing_needed: bool,
    #[serde(default, alias = "technicalRepair")]
    pub technical_repair: bool,
}

impl InspectionChecklist {
    /// A vehicle is ready when fuelled and no damage, washing or repair is
    /// flagged.
    pub const fn vehicle_ready(&self) -> bool {
        self.gas_tank_filled
            && !self.external_damage
            && !self.washing_needed
            && !self.technical_repair
    }
}

/// Stored inspection result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InspectionResult {
    pub id: i64,
    pub username: String,
    pub bus_number: String,
    pub gas_tank_filled: bool,
    pub external_damage: bool,
    pub washing_needed: bool,
    pub technical_repair: bool,
    pub vehicle_ready: bool,
    pub recorded_at: i64,
}
