use serde::{Deserialize, Serialize};

use super::{FieldValue, Record};
use crate::error::SwapError;
use crate::speed_tier::{classify_value, SpeedTier};
use crate::store::{AttributeDef, AttributeType};

/// Attribute names of the coverage projection.
///
/// Defaults follow the deployed broadband schema. Every name can be
/// overridden, since the stores in circulation disagree on conventions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
    pub geometry: String,
    pub provider_code: String,
    pub transport_technology: String,
    pub max_download: String,
    pub max_upload: String,
    pub last_edit: String,
    pub last_verified: String,
    pub identifier: String,
    /// Archive only.
    pub data_round: String,
    /// Archive only.
    pub speed_tier: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            geometry: "SHAPE".into(),
            provider_code: "UTProvCode".into(),
            transport_technology: "TransTech".into(),
            max_download: "MAXADDOWN".into(),
            max_upload: "MAXADUP".into(),
            last_edit: "LastEdit".into(),
            last_verified: "LastVerified".into(),
            identifier: "Identifier".into(),
            data_round: "DataRound".into(),
            speed_tier: "MAXADDNTIA".into(),
        }
    }
}

impl FieldMap {
    /// The eight attributes copied out of a live store.
    pub fn feature_attributes(&self) -> Vec<&str> {
        vec![
            self.geometry.as_str(),
            self.provider_code.as_str(),
            self.transport_technology.as_str(),
            self.max_download.as_str(),
            self.max_upload.as_str(),
            self.last_edit.as_str(),
            self.last_verified.as_str(),
            self.identifier.as_str(),
        ]
    }

    /// Feature attributes followed by the round label and tier code.
    pub fn archive_attributes(&self) -> Vec<&str> {
        let mut attributes = self.feature_attributes();
        attributes.push(self.data_round.as_str());
        attributes.push(self.speed_tier.as_str());
        attributes
    }

    /// Schema of an archive-shaped store (used for the staging copy).
    pub fn archive_schema(&self) -> Vec<AttributeDef> {
        vec![
            AttributeDef::new(&self.geometry, AttributeType::Geometry),
            AttributeDef::text(&self.provider_code, 50),
            AttributeDef::text(&self.transport_technology, 10),
            AttributeDef::new(&self.max_download, AttributeType::Double),
            AttributeDef::new(&self.max_upload, AttributeType::Double),
            AttributeDef::new(&self.last_edit, AttributeType::Date),
            AttributeDef::new(&self.last_verified, AttributeType::Date),
            AttributeDef::text(&self.identifier, crate::identifier::IDENTIFIER_FIELD_LENGTH),
            AttributeDef::text(&self.data_round, 50),
            AttributeDef::text(&self.speed_tier, 2),
        ]
    }
}

/// Fixed projection of a live coverage row. Values are carried verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub geometry: FieldValue,
    pub provider_code: FieldValue,
    pub transport_technology: FieldValue,
    pub max_download_speed: FieldValue,
    pub max_upload_speed: FieldValue,
    pub last_edit: FieldValue,
    pub last_verified: FieldValue,
    pub identifier: FieldValue,
}

impl FeatureRecord {
    pub fn from_record(record: &Record, fields: &FieldMap) -> Self {
        Self {
            geometry: record.get(&fields.geometry).clone(),
            provider_code: record.get(&fields.provider_code).clone(),
            transport_technology: record.get(&fields.transport_technology).clone(),
            max_download_speed: record.get(&fields.max_download).clone(),
            max_upload_speed: record.get(&fields.max_upload).clone(),
            last_edit: record.get(&fields.last_edit).clone(),
            last_verified: record.get(&fields.last_verified).clone(),
            identifier: record.get(&fields.identifier).clone(),
        }
    }

    pub fn into_record(self, fields: &FieldMap) -> Record {
        Record::new()
            .with(&fields.geometry, self.geometry)
            .with(&fields.provider_code, self.provider_code)
            .with(&fields.transport_technology, self.transport_technology)
            .with(&fields.max_download, self.max_download_speed)
            .with(&fields.max_upload, self.max_upload_speed)
            .with(&fields.last_edit, self.last_edit)
            .with(&fields.last_verified, self.last_verified)
            .with(&fields.identifier, self.identifier)
    }
}

/// A feature snapshot tagged with the round it was archived in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub feature: FeatureRecord,
    pub data_round: String,
    pub speed_tier: SpeedTier,
}

impl ArchiveRecord {
    /// Tags `feature` with `data_round`, deriving the tier from its max
    /// download speed. Fails when that speed is not numeric.
    pub fn new(feature: FeatureRecord, data_round: impl Into<String>) -> Result<Self, SwapError> {
        let speed_tier = classify_value(&feature.max_download_speed)?;
        Ok(Self {
            feature,
            data_round: data_round.into(),
            speed_tier,
        })
    }

    pub fn into_record(self, fields: &FieldMap) -> Record {
        self.feature
            .into_record(fields)
            .with(&fields.data_round, self.data_round)
            .with(&fields.speed_tier, self.speed_tier.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_row() -> Record {
        Record::new()
            .with("SHAPE", FieldValue::Geometry(vec![0, 1]))
            .with("UTProvCode", "ACME")
            .with("TransTech", "50")
            .with("MAXADDOWN", 25.0)
            .with("MAXADUP", 3.0)
            .with("Identifier", "{00000000-0000-0000-0000-000000000001}")
            .with("Comments", "not projected")
    }

    #[test]
    fn feature_projection_drops_unlisted_attributes() {
        let fields = FieldMap::default();
        let feature = FeatureRecord::from_record(&live_row(), &fields);
        let record = feature.into_record(&fields);

        assert_eq!(record.len(), 8);
        assert!(!record.contains("Comments"));
        assert!(record.get("LastEdit").is_null());
        assert_eq!(record.get("UTProvCode").as_text(), Some("ACME"));
    }

    #[test]
    fn archive_record_carries_round_and_tier() {
        let fields = FieldMap::default();
        let feature = FeatureRecord::from_record(&live_row(), &fields);
        let archived = ArchiveRecord::new(feature, "2024 Q2").unwrap();
        assert_eq!(archived.speed_tier.code(), "8");

        let record = archived.into_record(&fields);
        assert_eq!(record.len(), 10);
        assert_eq!(record.get("DataRound").as_text(), Some("2024 Q2"));
        assert_eq!(record.get("MAXADDNTIA").as_text(), Some("8"));
    }

    #[test]
    fn archive_record_rejects_missing_speed() {
        let fields = FieldMap::default();
        let feature = FeatureRecord::from_record(&Record::new().with("UTProvCode", "ACME"), &fields);
        let err = ArchiveRecord::new(feature, "2024 Q2").unwrap_err();
        assert!(err.is_conversion());
    }

    #[test]
    fn custom_field_names_drive_the_projection() {
        let fields = FieldMap {
            provider_code: "Provider".into(),
            speed_tier: "Tier".into(),
            ..FieldMap::default()
        };
        assert!(fields.feature_attributes().contains(&"Provider"));
        assert_eq!(fields.archive_attributes().last(), Some(&"Tier"));
        assert_eq!(fields.archive_schema().len(), 10);
    }
}
