//! Lectura del snapshot completo del store
//!
//! Las tres tablas se piden en paralelo. Si cualquiera falla la lectura
//! entera falla: los informes nunca se calculan con datos parciales.

use serde::Serialize;

use crate::models::fuel_log::FuelLog;
use crate::models::maintenance::MaintenanceLog;
use crate::models::vehicle::Vehicle;
use crate::repositories::FleetStore;
use crate::utils::errors::AppResult;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub vehicles: Vec<Vehicle>,
    pub fuel_logs: Vec<FuelLog>,
    pub maintenance: Vec<MaintenanceLog>,
}

pub async fn load_snapshot(store: &dyn FleetStore) -> AppResult<Snapshot> {
    let (vehicles, fuel_logs, maintenance) = futures::try_join!(
        store.list_vehicles(),
        store.list_fuel_logs(None),
        store.list_maintenance(None),
    )?;

    tracing::debug!(
        "📸 Snapshot ({}): {} vehículos, {} cargas, {} mantenimientos",
        store.backend_name(),
        vehicles.len(),
        fuel_logs.len(),
        maintenance.len()
    );

    Ok(Snapshot {
        vehicles,
        fuel_logs,
        maintenance,
    })
}
