// @generated manually, following the shape `diesel print-schema` emits.

pub mod sql_types {
    #[derive(diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "Payment_Intent_Status_Type"))]
    pub struct IntentStatusType;

    #[derive(diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "Destination_Mode_Type"))]
    pub struct DestinationModeType;

    #[derive(diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "Environment_Type"))]
    pub struct EnvironmentType;

    #[derive(diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "Event_Outcome_Type"))]
    pub struct EventOutcomeType;
}

diesel::table! {
    use diesel::sql_types::*;
    use super::sql_types::IntentStatusType;
    use super::sql_types::DestinationModeType;
    use super::sql_types::EnvironmentType;

    payment_intents (payment_hash) {
        payment_hash -> Text,
        total_amount_sat -> Int8,
        base_amount_sat -> Int8,
        tip_amount_sat -> Int8,
        tip_percent -> Double,
        display_currency -> Text,
        base_amount_display -> Nullable<Text>,
        tip_amount_display -> Nullable<Text>,
        memo -> Nullable<Text>,
        user_api_key_hash -> Nullable<Text>,
        user_wallet_id -> Nullable<Text>,
        destination_mode -> DestinationModeType,
        user_api_key -> Nullable<Text>,
        ln_address_username -> Nullable<Text>,
        ln_address_wallet_id -> Nullable<Text>,
        npubcash_address -> Nullable<Text>,
        nwc_uri -> Nullable<Text>,
        tip_recipients -> Jsonb,
        environment -> EnvironmentType,
        status -> IntentStatusType,
        created_at -> Timestamptz,
        expires_at -> Timestamptz,
        processed_at -> Nullable<Timestamptz>,
        metadata -> Jsonb,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use super::sql_types::EventOutcomeType;

    payment_events (id) {
        id -> Int8,
        payment_hash -> Text,
        kind -> Text,
        outcome -> EventOutcomeType,
        metadata -> Nullable<Jsonb>,
        error_message -> Nullable<Text>,
        ts -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(payment_events, payment_intents,);
