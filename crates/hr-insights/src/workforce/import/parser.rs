use std::io::Read;
use std::str::FromStr;

use serde::Deserialize;

use super::BulkImportError;
use crate::workforce::domain::{ChoiceError, EmployeeProfile, ProfileField};

pub const MAX_REPORTED_ROWS: usize = 10;

/// Parses every row of an upload, collecting row-level messages instead of stopping early.
pub(crate) fn parse_profiles<R: Read>(reader: R) -> Result<Vec<EmployeeProfile>, BulkImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let missing: Vec<String> = ProfileField::ordered()
        .into_iter()
        .map(ProfileField::key)
        .filter(|key| !headers.iter().any(|header| header == *key))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(BulkImportError::MissingColumns(missing));
    }

    let mut profiles = Vec::new();
    let mut messages = Vec::new();
    for (index, record) in csv_reader.deserialize::<EmployeeRow>().enumerate() {
        match record?.into_profile() {
            Ok(profile) => profiles.push(profile),
            Err(problems) => messages.extend(
                problems
                    .into_iter()
                    .map(|problem| format!("Row {index}: {problem}")),
            ),
        }
    }

    if !messages.is_empty() {
        let total = messages.len();
        messages.truncate(MAX_REPORTED_ROWS);
        return Err(BulkImportError::InvalidRows { messages, total });
    }
    if profiles.is_empty() {
        return Err(BulkImportError::Empty);
    }
    Ok(profiles)
}

/// Raw cells; typed conversion happens in `into_profile` so every problem can be reported.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EmployeeRow {
    age: String,
    gender: String,
    department: String,
    job_role: String,
    monthly_income: String,
    years_at_company: String,
    over_time: String,
    job_satisfaction: String,
    work_life_balance: String,
    total_working_years: String,
    training_times_last_year: String,
    job_involvement: String,
    environment_satisfaction: String,
    relationship_satisfaction: String,
}

impl EmployeeRow {
    fn into_profile(self) -> Result<EmployeeProfile, Vec<String>> {
        let mut problems = Vec::new();

        let job_satisfaction = scale(&mut problems, "JobSatisfaction", &self.job_satisfaction);
        let work_life_balance = scale(&mut problems, "WorkLifeBalance", &self.work_life_balance);
        let job_involvement = scale(&mut problems, "JobInvolvement", &self.job_involvement);
        let environment_satisfaction = scale(
            &mut problems,
            "EnvironmentSatisfaction",
            &self.environment_satisfaction,
        );
        let relationship_satisfaction = scale(
            &mut problems,
            "RelationshipSatisfaction",
            &self.relationship_satisfaction,
        );
        let over_time = choice(&mut problems, &self.over_time, "OverTime must be 'Yes' or 'No'.");
        let age = bounded(&mut problems, "Age", &self.age, |age| {
            (18..=100)
                .contains(&age)
                .then_some(age as i32)
                .ok_or("Age must be between 18 and 100.")
        });
        let monthly_income = bounded(
            &mut problems,
            "MonthlyIncome",
            &self.monthly_income,
            |income| {
                (income > 0)
                    .then_some(income)
                    .ok_or("MonthlyIncome must be greater than 0.")
            },
        );
        let years_at_company =
            non_negative(&mut problems, "YearsAtCompany", &self.years_at_company);
        let total_working_years =
            non_negative(&mut problems, "TotalWorkingYears", &self.total_working_years);
        let training_times_last_year = bounded(
            &mut problems,
            "TrainingTimesLastYear",
            &self.training_times_last_year,
            |count| {
                if count < 0 {
                    Err("TrainingTimesLastYear cannot be negative.")
                } else {
                    u8::try_from(count).map_err(|_| "TrainingTimesLastYear is out of range.")
                }
            },
        );
        let gender = choice(&mut problems, &self.gender, "Gender must be 'Male' or 'Female'.");
        let department = choice_with_options(&mut problems, &self.department);
        let job_role = choice_with_options(&mut problems, &self.job_role);

        match (
            age,
            gender,
            department,
            job_role,
            monthly_income,
            years_at_company,
            over_time,
            job_satisfaction,
            work_life_balance,
            total_working_years,
            training_times_last_year,
            job_involvement,
            environment_satisfaction,
            relationship_satisfaction,
        ) {
            (
                Some(age),
                Some(gender),
                Some(department),
                Some(job_role),
                Some(monthly_income),
                Some(years_at_company),
                Some(over_time),
                Some(job_satisfaction),
                Some(work_life_balance),
                Some(total_working_years),
                Some(training_times_last_year),
                Some(job_involvement),
                Some(environment_satisfaction),
                Some(relationship_satisfaction),
            ) if problems.is_empty() => Ok(EmployeeProfile {
                age,
                gender,
                department,
                job_role,
                monthly_income,
                years_at_company,
                over_time,
                job_satisfaction,
                work_life_balance,
                total_working_years,
                training_times_last_year,
                job_involvement,
                environment_satisfaction,
                relationship_satisfaction,
            }),
            _ => Err(problems),
        }
    }
}

/// Integral cell value; `4.0` is accepted, `4.5` is not.
fn whole_number(column: &str, raw: &str) -> Result<i64, String> {
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => Ok(value as i64),
        Ok(_) => Err(format!("{column} must be a whole number.")),
        Err(_) => Err(format!("{column} must be a number.")),
    }
}

fn bounded<T>(
    problems: &mut Vec<String>,
    column: &str,
    raw: &str,
    check: impl FnOnce(i64) -> Result<T, &'static str>,
) -> Option<T> {
    let outcome = whole_number(column, raw)
        .and_then(|value| check(value).map_err(str::to_string));
    match outcome {
        Ok(value) => Some(value),
        Err(problem) => {
            problems.push(problem);
            None
        }
    }
}

fn scale(problems: &mut Vec<String>, column: &'static str, raw: &str) -> Option<u8> {
    let message = format!("{column} must be between 1 and 5.");
    let outcome = whole_number(column, raw).and_then(|value| {
        if (1..=5).contains(&value) {
            Ok(value as u8)
        } else {
            Err(message)
        }
    });
    match outcome {
        Ok(value) => Some(value),
        Err(problem) => {
            problems.push(problem);
            None
        }
    }
}

fn non_negative(problems: &mut Vec<String>, column: &str, raw: &str) -> Option<i32> {
    let outcome = whole_number(column, raw).and_then(|value| {
        if value < 0 {
            Err(format!("{column} cannot be negative."))
        } else {
            i32::try_from(value).map_err(|_| format!("{column} is out of range."))
        }
    });
    match outcome {
        Ok(value) => Some(value),
        Err(problem) => {
            problems.push(problem);
            None
        }
    }
}

fn choice<T: FromStr>(problems: &mut Vec<String>, raw: &str, message: &str) -> Option<T> {
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            problems.push(message.to_string());
            None
        }
    }
}

fn choice_with_options<T>(problems: &mut Vec<String>, raw: &str) -> Option<T>
where
    T: FromStr<Err = ChoiceError>,
{
    match raw.parse() {
        Ok(value) => Some(value),
        Err(err) => {
            problems.push(err.to_string());
            None
        }
    }
}
