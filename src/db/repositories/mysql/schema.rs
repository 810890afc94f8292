//! Diesel table definitions for the monitoring database.
//!
//! Column names follow the live MySQL schema, including the capitalized
//! metric columns; `sql_name` keeps the Rust side snake_case.

diesel::table! {
    laeq (id) {
        id -> Bigint,
        value -> Nullable<Double>,
        created_at -> Datetime,
    }
}

diesel::table! {
    laeq_data (id) {
        id -> Bigint,
        value -> Nullable<Double>,
        #[sql_name = "type"]
        sample_type -> Varchar,
        created_at -> Datetime,
    }
}

diesel::table! {
    laeq_metrics (id) {
        id -> Bigint,
        #[sql_name = "L10"]
        l10 -> Nullable<Double>,
        #[sql_name = "L50"]
        l50 -> Nullable<Double>,
        #[sql_name = "L90"]
        l90 -> Nullable<Double>,
        created_at -> Datetime,
    }
}

diesel::table! {
    laeq_lmin_lmax (id) {
        id -> Bigint,
        #[sql_name = "Lmin"]
        lmin -> Nullable<Double>,
        #[sql_name = "Lmax"]
        lmax -> Nullable<Double>,
        created_at -> Datetime,
    }
}

diesel::table! {
    mqtt_status (id) {
        id -> Bigint,
        status -> Varchar,
        created_at -> Datetime,
        updated_at -> Datetime,
    }
}
