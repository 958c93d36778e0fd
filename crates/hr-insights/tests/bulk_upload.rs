//! Integration specifications for CSV uploads as seen by callers outside the crate.

use hr_insights::workforce::import::MAX_REPORTED_ROWS;
use hr_insights::workforce::report::profile_template_csv;
use hr_insights::workforce::{BulkImportError, BulkUpload, EmployeeProfile};

const HEADER: &str = "Age,Gender,Department,JobRole,MonthlyIncome,YearsAtCompany,OverTime,\
JobSatisfaction,WorkLifeBalance,TotalWorkingYears,TrainingTimesLastYear,JobInvolvement,\
EnvironmentSatisfaction,RelationshipSatisfaction";

fn underage_rows(count: usize) -> String {
    let mut csv = format!("{HEADER}\n");
    for _ in 0..count {
        csv.push_str("17,Male,Sales,Sales Executive,4200,1,No,3,3,1,2,3,3,3\n");
    }
    csv
}

#[test]
fn row_messages_are_capped_for_large_uploads() {
    let rows = MAX_REPORTED_ROWS + 2;

    match BulkUpload::from_bytes(underage_rows(rows)) {
        Err(BulkImportError::InvalidRows { messages, total }) => {
            assert_eq!(messages.len(), MAX_REPORTED_ROWS);
            assert_eq!(total, rows);
        }
        other => panic!("expected row validation failure, got {other:?}"),
    }
}

#[test]
fn served_template_is_accepted_back() {
    let sample = EmployeeProfile {
        age: 29,
        monthly_income: 4200,
        ..EmployeeProfile::default()
    };
    let template = profile_template_csv(&sample).expect("template renders");

    let upload = BulkUpload::from_bytes(template).expect("template parses");
    assert_eq!(upload.profiles(), &[sample]);
}
