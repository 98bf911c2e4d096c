use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod money;

pub use money::Micros;

/// Fuel grades sold at the station, in fixed report order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FuelType {
    Ado,
    Ulp,
    Zoom,
}

impl FuelType {
    /// Every grade, in the order reconciliation output and reports use.
    pub const ALL: [FuelType; 3] = [FuelType::Ado, FuelType::Ulp, FuelType::Zoom];

    pub fn as_str(self) -> &'static str {
        match self {
            FuelType::Ado => "ADO",
            FuelType::Ulp => "ULP",
            FuelType::Zoom => "ZOOM",
        }
    }
}

impl std::fmt::Display for FuelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hardware class of a metering point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MeterKind {
    Gantry,
    Drum,
    Pump,
}

/// Physical storage tank with its last committed volume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    pub id: String,
    pub name: String,
    pub fuel_type: FuelType,
    pub capacity_litres: f64,
    pub current_volume_litres: f64,
}

impl Tank {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        fuel_type: FuelType,
        capacity_litres: f64,
        current_volume_litres: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fuel_type,
            capacity_litres,
            current_volume_litres,
        }
    }
}

/// Metering point with its last committed totaliser reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Meter {
    pub id: String,
    pub name: String,
    pub kind: MeterKind,
    pub last_reading: f64,
}

impl Meter {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: MeterKind,
        last_reading: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            last_reading,
        }
    }
}

/// Access role attached to a station user.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Operator,
    StockController,
    Supervisor,
    Admin,
}

impl Role {
    /// Roles allowed to approve and lock a reconciliation record.
    pub fn can_approve(self) -> bool {
        matches!(self, Role::Supervisor | Role::Admin)
    }

    /// Roles allowed to amend figures on a pending record.  Operators
    /// capture; corrections go through stock control or above.
    pub fn can_amend(self) -> bool {
        matches!(self, Role::StockController | Role::Supervisor | Role::Admin)
    }
}

/// Station staff member who records or approves shifts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}

/// Lifecycle state of a reconciliation record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordStatus {
    Pending,
    Approved,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Pending => "PENDING",
            RecordStatus::Approved => "APPROVED",
        }
    }
}

/// Figures captured before an amendment overwrote them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: u32,
    pub calculated_sales: f64,
    pub variance: f64,
    pub changed_by: String,
    pub reason: String,
    pub ts_utc: DateTime<Utc>,
}

/// One fuel grade reconciled over one trading day.
///
/// Volumes are litres; `revenue` is fixed-point micros.  `version` starts at
/// 1 and `version_history` holds the pre-amendment figures for every bump.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub id: Uuid,
    pub date: NaiveDate,
    pub fuel_type: FuelType,
    pub opening_stock: f64,
    pub receipts: f64,
    pub transfers: f64,
    pub calculated_sales: f64,
    pub actual_dips: f64,
    pub variance: f64,
    pub revenue: Micros,
    pub status: RecordStatus,
    pub is_locked: bool,
    pub operator_id: String,
    pub approver_id: Option<String>,
    pub ts_utc: DateTime<Utc>,
    pub version: u32,
    pub version_history: Vec<VersionEntry>,
}

/// Pump price per grade, in micros per litre.
pub type PriceTable = BTreeMap<FuelType, Micros>;

/// Build a price table from `(grade, price)` pairs.
pub fn price_table<I>(entries: I) -> PriceTable
where
    I: IntoIterator<Item = (FuelType, Micros)>,
{
    entries.into_iter().collect()
}

/// Full master-data snapshot for one site: tanks, meters, staff and the
/// current pump prices.  Loaded from station config and treated as
/// read-only by the engine; commits roll it forward via explicit events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub tanks: Vec<Tank>,
    pub meters: Vec<Meter>,
    pub users: Vec<User>,
    pub prices: PriceTable,
}

impl Station {
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }
}

/// Fresh record id.  Isolated here so engine code stays free of direct
/// uuid calls and tests can assert on everything except `id`.
pub fn new_record_id() -> Uuid {
    Uuid::new_v4()
}
