use serde::Serialize;

use crate::workforce::domain::{format_percentage, EmployeeProfile, PredictionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceVerdict {
    Exceptional,
    Satisfactory,
    Underperforming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttritionVerdict {
    HighRisk,
    LowRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionVerdict {
    ValuableAtRisk,
    LowPriorityRisk,
    Stable,
}

/// Selected branch plus its rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative<V> {
    pub verdict: V,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanations {
    pub performance: Narrative<PerformanceVerdict>,
    pub attrition: Narrative<AttritionVerdict>,
    pub retention: Narrative<RetentionVerdict>,
}

pub fn explain(profile: &EmployeeProfile, results: &PredictionResult) -> Explanations {
    Explanations {
        performance: performance_narrative(profile, results),
        attrition: attrition_narrative(profile, results),
        retention: retention_narrative(profile, results),
    }
}

pub fn performance_narrative(
    profile: &EmployeeProfile,
    results: &PredictionResult,
) -> Narrative<PerformanceVerdict> {
    let rating = results.performance.rating;
    let role = profile.job_role;
    let department = profile.department;
    let satisfaction = profile.job_satisfaction;
    let balance = profile.work_life_balance;
    let overtime = profile.over_time;

    if rating >= 4 {
        Narrative {
            verdict: PerformanceVerdict::Exceptional,
            text: format!(
                "This employee is performing exceptionally well with a rating of {rating}/5. \
                 They are highly engaged in their role as a {role} in the {department} department, \
                 contributing significantly to team goals. Their job satisfaction ({satisfaction}/5) \
                 and involvement ({involvement}/5) suggest they enjoy their work and are motivated. \
                 However, their work-life balance ({balance}/5) should be monitored to prevent \
                 burnout, especially with overtime status ({overtime}).",
                involvement = profile.job_involvement,
            ),
        }
    } else if rating >= 3 {
        Narrative {
            verdict: PerformanceVerdict::Satisfactory,
            text: format!(
                "This employee's performance is satisfactory at a rating of {rating}/5. \
                 Working as a {role} in {department}, they meet expectations but may lack the \
                 extra drive seen in top performers. Their satisfaction ({satisfaction}/5) and \
                 environment satisfaction ({environment}/5) are decent, but low work-life balance \
                 ({balance}/5) or overtime ({overtime}) could be hindering higher output. \
                 Improvement is possible with support.",
                environment = profile.environment_satisfaction,
            ),
        }
    } else {
        Narrative {
            verdict: PerformanceVerdict::Underperforming,
            text: format!(
                "This employee is underperforming with a rating of {rating}/5. As a {role} in \
                 {department}, they struggle to meet expectations. Low job satisfaction \
                 ({satisfaction}/5), poor work-life balance ({balance}/5), and possibly excessive \
                 overtime ({overtime}) are likely contributors. This could lead to disengagement \
                 or turnover if not addressed promptly."
            ),
        }
    }
}

pub fn attrition_narrative(
    profile: &EmployeeProfile,
    results: &PredictionResult,
) -> Narrative<AttritionVerdict> {
    let probability = format_percentage(results.attrition.probability);
    let role = profile.job_role;
    let tenure = profile.years_at_company;
    let income = profile.monthly_income;
    let satisfaction = profile.job_satisfaction;
    let balance = profile.work_life_balance;
    let overtime = profile.over_time;

    if results.attrition.is_high_risk() {
        Narrative {
            verdict: AttritionVerdict::HighRisk,
            text: format!(
                "There's a high chance ({probability}%) this employee might leave. Given their \
                 role as a {role} with {tenure} years at the company and a monthly income of \
                 ${income}, factors like low job satisfaction ({satisfaction}/5) or poor \
                 work-life balance ({balance}/5) could be driving this risk. Their overtime status \
                 ({overtime}) and environment satisfaction ({environment}/5) suggest \
                 dissatisfaction or burnout. If unaddressed, this could lead to a loss of talent, \
                 increasing hiring costs.",
                environment = profile.environment_satisfaction,
            ),
        }
    } else {
        Narrative {
            verdict: AttritionVerdict::LowRisk,
            text: format!(
                "The likelihood of this employee leaving is low ({probability}%). As a {role} in \
                 {department} with {tenure} years of tenure, they seem stable. Their job \
                 satisfaction ({satisfaction}/5), work-life balance ({balance}/5), and income \
                 (${income}) indicate they're content. However, monitor overtime ({overtime}) to \
                 maintain this stability.",
                department = profile.department,
            ),
        }
    }
}

pub fn retention_narrative(
    profile: &EmployeeProfile,
    results: &PredictionResult,
) -> Narrative<RetentionVerdict> {
    let probability = format_percentage(results.retention.probability);
    let rating = results.performance.rating;
    let role = profile.job_role;
    let tenure = profile.years_at_company;
    let income = profile.monthly_income;
    let satisfaction = profile.job_satisfaction;
    let balance = profile.work_life_balance;
    let overtime = profile.over_time;

    if results.retention.is_high_risk() && rating >= 4 {
        Narrative {
            verdict: RetentionVerdict::ValuableAtRisk,
            text: format!(
                "Despite a high retention risk ({probability}%), this employee is valuable with a \
                 performance rating of {rating}/5. As a {role}, their {tenure} years of experience \
                 and ${income} income make them worth retaining. Low work-life balance \
                 ({balance}/5) or overtime ({overtime}) might push them away. To retain them, \
                 offer flexible hours, a raise, or recognition to boost their satisfaction \
                 ({satisfaction}/5)."
            ),
        }
    } else if results.retention.is_high_risk() {
        Narrative {
            verdict: RetentionVerdict::LowPriorityRisk,
            text: format!(
                "This employee has a high retention risk ({probability}%) and a performance rating \
                 of {rating}/5. Working as a {role}, their tenure ({tenure} years) and satisfaction \
                 ({satisfaction}/5) suggest disengagement. Overtime ({overtime}) or poor \
                 environment satisfaction ({environment}/5) could be factors. Retention may not be \
                 critical unless performance improves; consider training or reassignment.",
                environment = profile.environment_satisfaction,
            ),
        }
    } else {
        Narrative {
            verdict: RetentionVerdict::Stable,
            text: format!(
                "Retention risk is low ({probability}%) for this {role}. With a performance rating \
                 of {rating}/5 and {tenure} years at the company, they're likely to stay. Their \
                 satisfaction ({satisfaction}/5) and work-life balance ({balance}/5) are positive \
                 indicators. Maintain this by ensuring overtime ({overtime}) doesn't increase and \
                 their income (${income}) remains competitive."
            ),
        }
    }
}
