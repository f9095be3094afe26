use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Leave types mirror the rows of the administrative entitlement table.
/// The string forms are what the storage layer and API carry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, EnumIter,
)]
pub enum LeaveType {
    #[serde(rename = "Casual Leave")]
    #[strum(serialize = "Casual Leave")]
    Casual,
    #[serde(rename = "Earned Leave")]
    #[strum(serialize = "Earned Leave")]
    Earned,
    #[serde(rename = "Half Pay Leave")]
    #[strum(serialize = "Half Pay Leave")]
    HalfPay,
    #[serde(rename = "Commuted Leave")]
    #[strum(serialize = "Commuted Leave")]
    Commuted,
    #[serde(rename = "Medical Leave")]
    #[strum(serialize = "Medical Leave")]
    Medical,
    #[serde(rename = "Special Leave")]
    #[strum(serialize = "Special Leave")]
    Special,
    #[serde(rename = "Child Care Leave")]
    #[strum(serialize = "Child Care Leave")]
    ChildCare,
    #[serde(rename = "Parental Leave")]
    #[strum(serialize = "Parental Leave")]
    Parental,
}

impl LeaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::Casual => "Casual Leave",
            LeaveType::Earned => "Earned Leave",
            LeaveType::HalfPay => "Half Pay Leave",
            LeaveType::Commuted => "Commuted Leave",
            LeaveType::Medical => "Medical Leave",
            LeaveType::Special => "Special Leave",
            LeaveType::ChildCare => "Child Care Leave",
            LeaveType::Parental => "Parental Leave",
        }
    }
}
