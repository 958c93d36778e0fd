use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Employee attributes sent to the prediction services and read by the heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmployeeProfile {
    pub age: i32,
    pub gender: Gender,
    pub department: Department,
    pub job_role: JobRole,
    pub monthly_income: i64,
    pub years_at_company: i32,
    pub over_time: OverTime,
    pub job_satisfaction: u8,
    pub work_life_balance: u8,
    pub total_working_years: i32,
    pub training_times_last_year: u8,
    pub job_involvement: u8,
    pub environment_satisfaction: u8,
    pub relationship_satisfaction: u8,
}

impl Default for EmployeeProfile {
    /// Initial state of the prediction form; also the context profile for broadcast fallbacks.
    fn default() -> Self {
        Self {
            age: 35,
            gender: Gender::Male,
            department: Department::Sales,
            job_role: JobRole::Manager,
            monthly_income: 10_000,
            years_at_company: 10,
            over_time: OverTime::No,
            job_satisfaction: 5,
            work_life_balance: 5,
            total_working_years: 15,
            training_times_last_year: 5,
            job_involvement: 5,
            environment_satisfaction: 5,
            relationship_satisfaction: 5,
        }
    }
}

impl EmployeeProfile {
    /// Applies the enforced constraints from the field table, collecting every failure.
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        let messages: Vec<String> = ProfileField::ordered()
            .into_iter()
            .filter_map(|field| {
                let constraint = field.constraint()?;
                let value = self.numeric(field)?;
                (!constraint.admits(value)).then(|| constraint.message.to_string())
            })
            .collect();

        if messages.is_empty() {
            Ok(())
        } else {
            Err(ProfileValidationError { messages })
        }
    }

    pub fn works_overtime(&self) -> bool {
        self.over_time == OverTime::Yes
    }

    /// Numeric value of a field, `None` for choice fields.
    pub fn numeric(&self, field: ProfileField) -> Option<i64> {
        let value = match field {
            ProfileField::Age => i64::from(self.age),
            ProfileField::MonthlyIncome => self.monthly_income,
            ProfileField::YearsAtCompany => i64::from(self.years_at_company),
            ProfileField::JobSatisfaction => i64::from(self.job_satisfaction),
            ProfileField::WorkLifeBalance => i64::from(self.work_life_balance),
            ProfileField::TotalWorkingYears => i64::from(self.total_working_years),
            ProfileField::TrainingTimesLastYear => i64::from(self.training_times_last_year),
            ProfileField::JobInvolvement => i64::from(self.job_involvement),
            ProfileField::EnvironmentSatisfaction => i64::from(self.environment_satisfaction),
            ProfileField::RelationshipSatisfaction => i64::from(self.relationship_satisfaction),
            ProfileField::Gender
            | ProfileField::Department
            | ProfileField::JobRole
            | ProfileField::OverTime => return None,
        };
        Some(value)
    }

    pub fn display_value(&self, field: ProfileField) -> String {
        match field {
            ProfileField::Gender => self.gender.label().to_string(),
            ProfileField::Department => self.department.label().to_string(),
            ProfileField::JobRole => self.job_role.label().to_string(),
            ProfileField::OverTime => self.over_time.label().to_string(),
            numeric => self
                .numeric(numeric)
                .map(|value| value.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Local validation failure raised before any prediction call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .messages.join(" "))]
pub struct ProfileValidationError {
    pub messages: Vec<String>,
}

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const OPTIONS: &'static [&'static str] = &[$($label),+];

            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = ChoiceError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match raw.trim() {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(ChoiceError {
                        field: $field,
                        options: Self::OPTIONS,
                    }),
                }
            }
        }
    };
}

choice_enum!(Gender, "Gender" { Male => "Male", Female => "Female" });

choice_enum!(Department, "Department" {
    Sales => "Sales",
    ResearchAndDevelopment => "Research & Development",
    HumanResources => "Human Resources",
});

choice_enum!(JobRole, "JobRole" {
    SalesExecutive => "Sales Executive",
    ResearchScientist => "Research Scientist",
    Manager => "Manager",
});

choice_enum!(OverTime, "OverTime" { Yes => "Yes", No => "No" });

/// Raised when a choice field holds a value outside its option list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be one of {}.", quoted(.options))]
pub struct ChoiceError {
    pub field: &'static str,
    pub options: &'static [&'static str],
}

fn quoted(options: &[&str]) -> String {
    options
        .iter()
        .map(|option| format!("'{option}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Statically declared field table driving validation and form generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProfileField {
    Age,
    Gender,
    Department,
    JobRole,
    MonthlyIncome,
    YearsAtCompany,
    OverTime,
    JobSatisfaction,
    WorkLifeBalance,
    TotalWorkingYears,
    TrainingTimesLastYear,
    JobInvolvement,
    EnvironmentSatisfaction,
    RelationshipSatisfaction,
}

impl ProfileField {
    pub const fn ordered() -> [ProfileField; 14] {
        [
            ProfileField::Age,
            ProfileField::Gender,
            ProfileField::Department,
            ProfileField::JobRole,
            ProfileField::MonthlyIncome,
            ProfileField::YearsAtCompany,
            ProfileField::OverTime,
            ProfileField::JobSatisfaction,
            ProfileField::WorkLifeBalance,
            ProfileField::TotalWorkingYears,
            ProfileField::TrainingTimesLastYear,
            ProfileField::JobInvolvement,
            ProfileField::EnvironmentSatisfaction,
            ProfileField::RelationshipSatisfaction,
        ]
    }

    /// Column / JSON key used on the wire.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::Department => "Department",
            Self::JobRole => "JobRole",
            Self::MonthlyIncome => "MonthlyIncome",
            Self::YearsAtCompany => "YearsAtCompany",
            Self::OverTime => "OverTime",
            Self::JobSatisfaction => "JobSatisfaction",
            Self::WorkLifeBalance => "WorkLifeBalance",
            Self::TotalWorkingYears => "TotalWorkingYears",
            Self::TrainingTimesLastYear => "TrainingTimesLastYear",
            Self::JobInvolvement => "JobInvolvement",
            Self::EnvironmentSatisfaction => "EnvironmentSatisfaction",
            Self::RelationshipSatisfaction => "RelationshipSatisfaction",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::Department => "Department",
            Self::JobRole => "Job Role",
            Self::MonthlyIncome => "Monthly Income",
            Self::YearsAtCompany => "Years At Company",
            Self::OverTime => "Over Time",
            Self::JobSatisfaction => "Job Satisfaction",
            Self::WorkLifeBalance => "Work Life Balance",
            Self::TotalWorkingYears => "Total Working Years",
            Self::TrainingTimesLastYear => "Training Times Last Year",
            Self::JobInvolvement => "Job Involvement",
            Self::EnvironmentSatisfaction => "Environment Satisfaction",
            Self::RelationshipSatisfaction => "Relationship Satisfaction",
        }
    }

    pub const fn input(self) -> FieldInput {
        match self {
            Self::Gender => FieldInput::Choice {
                options: Gender::OPTIONS,
            },
            Self::Department => FieldInput::Choice {
                options: Department::OPTIONS,
            },
            Self::JobRole => FieldInput::Choice {
                options: JobRole::OPTIONS,
            },
            Self::OverTime => FieldInput::Choice {
                options: OverTime::OPTIONS,
            },
            Self::JobSatisfaction
            | Self::WorkLifeBalance
            | Self::JobInvolvement
            | Self::EnvironmentSatisfaction
            | Self::RelationshipSatisfaction => FieldInput::Scale { min: 1, max: 5 },
            Self::TrainingTimesLastYear => FieldInput::Scale { min: 0, max: 5 },
            Self::Age | Self::MonthlyIncome | Self::YearsAtCompany | Self::TotalWorkingYears => {
                FieldInput::Number
            }
        }
    }

    /// Constraints re-checked locally; other fields rely on the input range alone.
    pub const fn constraint(self) -> Option<FieldConstraint> {
        match self {
            Self::Age => Some(FieldConstraint {
                min: 18,
                max: Some(100),
                message: "Age must be between 18 and 100.",
            }),
            Self::MonthlyIncome => Some(FieldConstraint {
                min: 1,
                max: None,
                message: "Monthly Income must be greater than 0.",
            }),
            Self::YearsAtCompany => Some(FieldConstraint {
                min: 0,
                max: None,
                message: "Years at Company cannot be negative.",
            }),
            _ => None,
        }
    }

    pub fn descriptor(self) -> FieldDescriptor {
        FieldDescriptor {
            key: self.key(),
            label: self.label(),
            input: self.input(),
            constraint: self.constraint(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldInput {
    Choice { options: &'static [&'static str] },
    Scale { min: u8, max: u8 },
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldConstraint {
    pub min: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    pub message: &'static str,
}

impl FieldConstraint {
    pub fn admits(&self, value: i64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }
}

/// Serializable form description for UI generation.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub input: FieldInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<FieldConstraint>,
}

pub fn form_fields() -> Vec<FieldDescriptor> {
    ProfileField::ordered()
        .into_iter()
        .map(ProfileField::descriptor)
        .collect()
}

/// Attrition service response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttritionPrediction {
    #[serde(rename = "AttritionRisk", deserialize_with = "wire::flag")]
    pub risk: u8,
    #[serde(rename = "AttritionRiskProbability", default)]
    pub probability: f64,
}

impl AttritionPrediction {
    pub fn is_high_risk(&self) -> bool {
        self.risk == 1
    }
}

/// Performance service response, rating on a 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformancePrediction {
    #[serde(rename = "PerformanceRating", deserialize_with = "wire::rating")]
    pub rating: u8,
}

/// Retention service response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetentionPrediction {
    #[serde(rename = "RetentionRisk", deserialize_with = "wire::flag")]
    pub risk: u8,
    #[serde(rename = "RetentionRiskProbability", default)]
    pub probability: f64,
}

impl RetentionPrediction {
    pub fn is_high_risk(&self) -> bool {
        self.risk == 1
    }
}

/// The three typed responses for one employee.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub attrition: AttritionPrediction,
    pub performance: PerformancePrediction,
    pub retention: RetentionPrediction,
}

/// Results of one bulk upload. `profiles` holds the parsed upload rows when they were retained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkPredictions {
    pub attrition: Vec<AttritionPrediction>,
    pub performance: Vec<PerformancePrediction>,
    pub retention: Vec<RetentionPrediction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<EmployeeProfile>,
}

impl BulkPredictions {
    /// Employee count, taken from the attrition series.
    pub fn len(&self) -> usize {
        self.attrition.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrition.is_empty() && self.performance.is_empty() && self.retention.is_empty()
    }

    /// Row profile when retained, otherwise the caller's context profile.
    pub fn profile_at<'a>(
        &'a self,
        index: usize,
        fallback: &'a EmployeeProfile,
    ) -> &'a EmployeeProfile {
        self.profiles.get(index).unwrap_or(fallback)
    }
}

/// Probability in [0, 1] as a percentage with exactly two decimals.
pub fn format_percentage(probability: f64) -> String {
    format!("{:.2}", probability * 100.0)
}

mod wire {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub(super) fn flag<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        if raw == 0.0 {
            Ok(0)
        } else if raw == 1.0 {
            Ok(1)
        } else {
            Err(D::Error::custom(format!("risk flag must be 0 or 1, got {raw}")))
        }
    }

    pub(super) fn rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        let rounded = raw.round();
        if (1.0..=5.0).contains(&rounded) {
            Ok(rounded as u8)
        } else {
            Err(D::Error::custom(format!(
                "performance rating must be between 1 and 5, got {raw}"
            )))
        }
    }
}
