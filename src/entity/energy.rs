use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One production reading per measuring point and calendar day.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "energy")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub created_at: Option<DateTimeWithTimeZone>,
    pub date: Date,
    pub energy_made: f64,
    pub energy_wasted: f64,
    pub measuring_point_id: i32,
    pub daylight_duration_in_seconds: Option<f64>,
    pub maximum_temperature: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
