use std::io::Write;

use serde::Serialize;

use crate::workforce::domain::{BulkPredictions, EmployeeProfile, ProfileField};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ExportRow {
    employee_index: usize,
    attrition_risk: u8,
    attrition_risk_probability: f64,
    performance_rating: Option<u8>,
    retention_risk: Option<u8>,
    retention_risk_probability: Option<f64>,
}

/// One row per attrition result; missing performance or retention cells are left blank.
pub fn write_bulk_csv<W: Write>(bulk: &BulkPredictions, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (index, attrition) in bulk.attrition.iter().enumerate() {
        let retention = bulk.retention.get(index);
        csv_writer.serialize(ExportRow {
            employee_index: index,
            attrition_risk: attrition.risk,
            attrition_risk_probability: attrition.probability,
            performance_rating: bulk.performance.get(index).map(|p| p.rating),
            retention_risk: retention.map(|r| r.risk),
            retention_risk_probability: retention.map(|r| r.probability),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn bulk_csv(bulk: &BulkPredictions) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_bulk_csv(bulk, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Upload template: the required columns followed by one example row.
pub fn write_profile_template<W: Write>(
    sample: &EmployeeProfile,
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(ProfileField::ordered().map(ProfileField::key))?;
    csv_writer.write_record(ProfileField::ordered().map(|field| sample.display_value(field)))?;
    csv_writer.flush()?;
    Ok(())
}

pub fn profile_template_csv(sample: &EmployeeProfile) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_profile_template(sample, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
