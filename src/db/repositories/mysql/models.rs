//! Queryable row structs and their conversions into the domain row types.
//!
//! Timestamps are stored naive in UTC; the conversion pins them to
//! `DateTime<Utc>` here so nothing downstream has to guess.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;

use crate::db::models::{ExtremesRow, LaeqDataRow, LaeqRow, MetricsRow, MqttStatusRow};

pub(super) fn naive_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&naive)
}

#[derive(Debug, Queryable)]
pub struct DbLaeqRow {
    pub id: i64,
    pub value: Option<f64>,
    pub created_at: NaiveDateTime,
}

impl From<DbLaeqRow> for LaeqRow {
    fn from(row: DbLaeqRow) -> Self {
        Self {
            id: row.id,
            value: row.value,
            created_at: naive_to_utc(row.created_at),
        }
    }
}

#[derive(Debug, Queryable)]
pub struct DbLaeqDataRow {
    pub id: i64,
    pub value: Option<f64>,
    pub sample_type: String,
    pub created_at: NaiveDateTime,
}

impl From<DbLaeqDataRow> for LaeqDataRow {
    fn from(row: DbLaeqDataRow) -> Self {
        Self {
            id: row.id,
            value: row.value,
            sample_type: row.sample_type,
            created_at: naive_to_utc(row.created_at),
        }
    }
}

#[derive(Debug, Queryable)]
pub struct DbMetricsRow {
    pub id: i64,
    pub l10: Option<f64>,
    pub l50: Option<f64>,
    pub l90: Option<f64>,
    pub created_at: NaiveDateTime,
}

impl From<DbMetricsRow> for MetricsRow {
    fn from(row: DbMetricsRow) -> Self {
        Self {
            id: row.id,
            l10: row.l10,
            l50: row.l50,
            l90: row.l90,
            created_at: naive_to_utc(row.created_at),
        }
    }
}

#[derive(Debug, Queryable)]
pub struct DbExtremesRow {
    pub id: i64,
    pub lmin: Option<f64>,
    pub lmax: Option<f64>,
    pub created_at: NaiveDateTime,
}

impl From<DbExtremesRow> for ExtremesRow {
    fn from(row: DbExtremesRow) -> Self {
        Self {
            id: row.id,
            lmin: row.lmin,
            lmax: row.lmax,
            created_at: naive_to_utc(row.created_at),
        }
    }
}

#[derive(Debug, Queryable)]
pub struct DbMqttStatusRow {
    pub id: i64,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<DbMqttStatusRow> for MqttStatusRow {
    fn from(row: DbMqttStatusRow) -> Self {
        Self {
            id: row.id,
            status: row.status,
            created_at: naive_to_utc(row.created_at),
            updated_at: naive_to_utc(row.updated_at),
        }
    }
}
