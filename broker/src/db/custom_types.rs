use crate::db::intent_store::DestinationMode;
use crate::db::intent_store::Environment;
use crate::db::intent_store::EventOutcome;
use crate::db::intent_store::IntentStatus;
use crate::schema::sql_types::DestinationModeType;
use crate::schema::sql_types::EnvironmentType;
use crate::schema::sql_types::EventOutcomeType;
use crate::schema::sql_types::IntentStatusType;
use diesel::deserialize;
use diesel::deserialize::FromSql;
use diesel::pg::Pg;
use diesel::pg::PgValue;
use diesel::serialize;
use diesel::serialize::IsNull;
use diesel::serialize::Output;
use diesel::serialize::ToSql;
use std::io::Write;

impl ToSql<IntentStatusType, Pg> for IntentStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            IntentStatus::Pending => out.write_all(b"pending")?,
            IntentStatus::Processing => out.write_all(b"processing")?,
            IntentStatus::Completed => out.write_all(b"completed")?,
            IntentStatus::Failed => out.write_all(b"failed")?,
            IntentStatus::Expired => out.write_all(b"expired")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<IntentStatusType, Pg> for IntentStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"pending" => Ok(IntentStatus::Pending),
            b"processing" => Ok(IntentStatus::Processing),
            b"completed" => Ok(IntentStatus::Completed),
            b"failed" => Ok(IntentStatus::Failed),
            b"expired" => Ok(IntentStatus::Expired),
            other => Err(format!("Unrecognized IntentStatus variant: {other:?}").into()),
        }
    }
}

impl ToSql<DestinationModeType, Pg> for DestinationMode {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            DestinationMode::ApiKey => out.write_all(b"api_key")?,
            DestinationMode::LnAddress => out.write_all(b"ln_address")?,
            DestinationMode::NpubCash => out.write_all(b"npub_cash")?,
            DestinationMode::Nwc => out.write_all(b"nwc")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<DestinationModeType, Pg> for DestinationMode {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"api_key" => Ok(DestinationMode::ApiKey),
            b"ln_address" => Ok(DestinationMode::LnAddress),
            b"npub_cash" => Ok(DestinationMode::NpubCash),
            b"nwc" => Ok(DestinationMode::Nwc),
            other => Err(format!("Unrecognized DestinationMode variant: {other:?}").into()),
        }
    }
}

impl ToSql<EnvironmentType, Pg> for Environment {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            Environment::Production => out.write_all(b"production")?,
            Environment::Staging => out.write_all(b"staging")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<EnvironmentType, Pg> for Environment {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"production" => Ok(Environment::Production),
            b"staging" => Ok(Environment::Staging),
            other => Err(format!("Unrecognized Environment variant: {other:?}").into()),
        }
    }
}

impl ToSql<EventOutcomeType, Pg> for EventOutcome {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            EventOutcome::Success => out.write_all(b"success")?,
            EventOutcome::Failure => out.write_all(b"failure")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<EventOutcomeType, Pg> for EventOutcome {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"success" => Ok(EventOutcome::Success),
            b"failure" => Ok(EventOutcome::Failure),
            other => Err(format!("Unrecognized EventOutcome variant: {other:?}").into()),
        }
    }
}
