use std::collections::BTreeMap;
use std::mem;

use chrono::{
    DateTime,
    Utc
};
use serde::{
    Deserialize,
    Serialize
};
use tracing::debug;

use crate::error::modelerror::ModelError;
use crate::sample::sampletable::SampleTable;

pub type Attributes = BTreeMap<String, String>;

/// 一次推送出去的量測結果。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    timestamp: DateTime<Utc>,
    name: String,
    attributes: Attributes,
    value: SampleTable,
}

impl Measurement {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn value(&self) -> &SampleTable {
        &self.value
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// 具名的觀測值記錄器，累積到 push 為止。
#[derive(Clone, Debug)]
pub struct Histogram {
    name: String,
    description: Option<String>,
    attributes: Attributes,
    table: SampleTable,
}

impl Histogram {
    pub fn new(name: &str) -> Histogram {
        Histogram {
            name: name.to_owned(),
            description: None,
            attributes: Attributes::new(),
            table: SampleTable::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Histogram {
        self.description = Some(description.to_owned());
        self
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Histogram {
        self.attributes.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// 尚未推送的累積樣本。
    pub fn pending(&self) -> &SampleTable {
        &self.table
    }

    pub fn record(&mut self, value: f64) -> Result<(), ModelError> {
        self.table.add(value)
    }

    /// 取走目前累積的樣本並打上時間戳；沒有樣本時回傳 `None`。
    pub fn push(&mut self) -> Option<Measurement> {
        self.push_at(Utc::now())
    }

    pub fn push_at(&mut self, timestamp: DateTime<Utc>) -> Option<Measurement> {
        if self.table.is_empty() {
            return None;
        }
        let value = mem::take(&mut self.table);
        debug!(name = %self.name, observations = value.total(), "histogram pushed");
        Some(Measurement {
            timestamp,
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            value,
        })
    }
}
