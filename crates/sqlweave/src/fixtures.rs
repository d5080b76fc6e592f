//! Shared entities for unit tests.

use crate::metadata::{ColumnInfo, ColumnType, Entity, EntityMetadata};
use crate::value::Value;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TestEntity {
    pub id: i64,
    pub code: String,
    pub name: Option<String>,
    pub amount: f64,
    pub created: NaiveDateTime,
}

impl TestEntity {
    pub fn new(id: i64, code: &str, amount: f64) -> Self {
        Self {
            id,
            code: code.to_string(),
            name: None,
            amount,
            created: NaiveDateTime::MIN,
        }
    }
}

impl Entity for TestEntity {
    fn describe() -> EntityMetadata {
        EntityMetadata::new("TestEntity", "TestEntity")
            .schema("TestSchema")
            .column(
                ColumnInfo::new("id", ColumnType::Int)
                    .column_name("Id")
                    .primary_key()
                    .identity(),
            )
            .column(
                ColumnInfo::new("code", ColumnType::Text)
                    .column_name("Code")
                    .display_name("Airport Code")
                    .required(),
            )
            .column(ColumnInfo::new("name", ColumnType::Text).column_name("Name"))
            .column(ColumnInfo::new("amount", ColumnType::Float).column_name("Amount"))
            .column(
                ColumnInfo::new("created", ColumnType::DateTime)
                    .column_name("Created")
                    .read_only(),
            )
    }

    fn value(&self, property: &str) -> Option<Value> {
        match property {
            "id" => Some(self.id.into()),
            "code" => Some(self.code.clone().into()),
            "name" => Some(self.name.clone().into()),
            "amount" => Some(self.amount.into()),
            "created" => Some(self.created.into()),
            _ => None,
        }
    }
}

/// Entity with a caller-assigned key and an encrypted column.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Patient {
    pub id: i64,
    pub name: String,
    pub ssn: String,
}

impl Entity for Patient {
    fn describe() -> EntityMetadata {
        EntityMetadata::new("Patient", "Patient")
            .encryption("PiiKey", "PiiCert")
            .column(ColumnInfo::new("id", ColumnType::Int).column_name("Id").primary_key())
            .column(ColumnInfo::new("name", ColumnType::Text).column_name("Name"))
            .column(
                ColumnInfo::new("ssn", ColumnType::Text)
                    .column_name("Ssn")
                    .encrypted(),
            )
    }

    fn value(&self, property: &str) -> Option<Value> {
        match property {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "ssn" => Some(self.ssn.clone().into()),
            _ => None,
        }
    }
}
