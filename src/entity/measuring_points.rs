use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "measuring_points")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: Option<DateTimeWithTimeZone>,
    pub name: String,
    /// Sent as the `session_id` header to the metering API
    pub point_id: String,
    /// Sent as the `visitor_uuid` header to the metering API
    pub point_uuid: String,
    #[sea_orm(unique)]
    pub measuring_id: String,
    #[serde(skip_serializing)]
    pub api_key: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
