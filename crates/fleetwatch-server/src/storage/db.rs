//! SQLite database handle for the Fleetwatch server.

fleetwatch_core::define_database!(FleetDatabase, "Fleet database migrations complete");
