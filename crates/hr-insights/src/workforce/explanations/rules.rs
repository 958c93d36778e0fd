use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::workforce::domain::EmployeeProfile;

/// Predicate over one employee. Thresholds are inclusive where the name says "at most/least".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    JobSatisfactionAtMost(u8),
    WorkLifeBalanceAtMost(u8),
    EnvironmentSatisfactionAtMost(u8),
    TrainingAtMost(u8),
    TenureAtLeast(i32),
    IncomeBelow(i64),
    OverTime,
}

impl Condition {
    pub fn matches(&self, subject: &RuleSubject<'_>) -> bool {
        let profile = subject.profile;
        match *self {
            Self::JobSatisfactionAtMost(limit) => profile.job_satisfaction <= limit,
            Self::WorkLifeBalanceAtMost(limit) => profile.work_life_balance <= limit,
            Self::EnvironmentSatisfactionAtMost(limit) => {
                profile.environment_satisfaction <= limit
            }
            Self::TrainingAtMost(limit) => profile.training_times_last_year <= limit,
            Self::TenureAtLeast(years) => profile.years_at_company >= years,
            Self::IncomeBelow(amount) => profile.monthly_income < amount,
            Self::OverTime => profile.works_overtime(),
        }
    }
}

/// Inputs a guard rule can read.
#[derive(Debug, Clone, Copy)]
pub struct RuleSubject<'a> {
    pub profile: &'a EmployeeProfile,
    pub rating: u8,
}

/// Reason/action pair. Templates may reference `{job_satisfaction}`, `{work_life_balance}`,
/// `{environment_satisfaction}`, `{training}`, `{tenure}`, `{income}` and `{rating}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub reason: String,
    pub action: String,
}

impl Recommendation {
    fn new(reason: &str, action: &str) -> Self {
        Self {
            reason: reason.to_string(),
            action: action.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardRule {
    pub when: Condition,
    #[serde(flatten)]
    pub recommendation: Recommendation,
}

/// Ordered rules evaluated first-match, with a mandatory fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardChain {
    pub rules: Vec<GuardRule>,
    pub fallback: Recommendation,
}

/// Rendered outcome of a chain. `rule` is `None` when the fallback fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule: Option<usize>,
    pub reason: String,
    pub action: String,
}

impl GuardChain {
    pub fn evaluate(&self, subject: &RuleSubject<'_>) -> Finding {
        let (rule, recommendation) = self
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.when.matches(subject))
            .map(|(index, rule)| (Some(index), &rule.recommendation))
            .unwrap_or((None, &self.fallback));

        Finding {
            rule,
            reason: render(&recommendation.reason, subject),
            action: render(&recommendation.action, subject),
        }
    }
}

fn render(template: &str, subject: &RuleSubject<'_>) -> String {
    let profile = subject.profile;
    [
        ("{job_satisfaction}", profile.job_satisfaction.to_string()),
        ("{work_life_balance}", profile.work_life_balance.to_string()),
        (
            "{environment_satisfaction}",
            profile.environment_satisfaction.to_string(),
        ),
        ("{training}", profile.training_times_last_year.to_string()),
        ("{tenure}", profile.years_at_company.to_string()),
        ("{income}", profile.monthly_income.to_string()),
        ("{rating}", subject.rating.to_string()),
    ]
    .into_iter()
    .fold(template.to_string(), |text, (placeholder, value)| {
        text.replace(placeholder, &value)
    })
}

/// Which view a watchlist is built for; each has its own wording and thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewContext {
    Bulk,
    HistoryBulk,
    HistoryIndividual,
}

impl ViewContext {
    pub const fn ordered() -> [ViewContext; 3] {
        [
            ViewContext::Bulk,
            ViewContext::HistoryBulk,
            ViewContext::HistoryIndividual,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            ViewContext::Bulk => "Bulk upload",
            ViewContext::HistoryBulk => "History (bulk runs)",
            ViewContext::HistoryIndividual => "History (individual runs)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistRules {
    pub at_risk: GuardChain,
    pub underperformer: GuardChain,
}

/// Guard chains for every view context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleBook {
    pub bulk: WatchlistRules,
    pub history_bulk: WatchlistRules,
    pub history_individual: WatchlistRules,
}

#[derive(Debug, thiserror::Error)]
pub enum RuleBookError {
    #[error("failed to read rule book {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("rule book {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl RuleBook {
    pub fn for_context(&self, context: ViewContext) -> &WatchlistRules {
        match context {
            ViewContext::Bulk => &self.bulk,
            ViewContext::HistoryBulk => &self.history_bulk,
            ViewContext::HistoryIndividual => &self.history_individual,
        }
    }

    /// Loads a JSON rule book override.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleBookError> {
        let path = path.as_ref();
        let document = fs::read_to_string(path).map_err(|source| RuleBookError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&document).map_err(|source| RuleBookError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn standard() -> Self {
        Self {
            bulk: WatchlistRules {
                at_risk: GuardChain {
                    rules: vec![
                        GuardRule {
                            when: Condition::JobSatisfactionAtMost(3),
                            recommendation: Recommendation::new(
                                "low job satisfaction ({job_satisfaction}/5) likely contributes to their desire to leave",
                                "address job satisfaction through career development opportunities or role-specific feedback",
                            ),
                        },
                        GuardRule {
                            when: Condition::WorkLifeBalanceAtMost(3),
                            recommendation: Recommendation::new(
                                "poor work-life balance ({work_life_balance}/5) may be causing burnout",
                                "offer flexible working hours or remote work options",
                            ),
                        },
                        GuardRule {
                            when: Condition::OverTime,
                            recommendation: Recommendation::new(
                                "frequent overtime could be driving dissatisfaction",
                                "reduce overtime demands or provide compensation for extra hours",
                            ),
                        },
                    ],
                    fallback: Recommendation::new(
                        "their high performance ({rating}/5) may attract external offers",
                        "offer a promotion or salary increase to match market rates",
                    ),
                },
                underperformer: GuardChain {
                    rules: vec![
                        GuardRule {
                            when: Condition::JobSatisfactionAtMost(2),
                            recommendation: Recommendation::new(
                                "low job satisfaction ({job_satisfaction}/5) suggests disengagement from their role",
                                "conduct one-on-one meetings to understand their concerns and align their role with personal goals",
                            ),
                        },
                        GuardRule {
                            when: Condition::EnvironmentSatisfactionAtMost(2),
                            recommendation: Recommendation::new(
                                "poor environment satisfaction ({environment_satisfaction}/5) indicates discomfort in their work setting",
                                "improve workplace conditions or consider team/role reassignment",
                            ),
                        },
                        GuardRule {
                            when: Condition::TrainingAtMost(2),
                            recommendation: Recommendation::new(
                                "limited training ({training} sessions last year) may leave them unprepared",
                                "enroll them in targeted training programs to enhance skills",
                            ),
                        },
                        GuardRule {
                            when: Condition::OverTime,
                            recommendation: Recommendation::new(
                                "excessive overtime could be impacting their productivity",
                                "adjust workload to eliminate overtime and monitor stress levels",
                            ),
                        },
                    ],
                    fallback: Recommendation::new(
                        "their performance ({rating}/5) falls below expectations",
                        "implement a performance improvement plan with clear milestones",
                    ),
                },
            },
            history_bulk: WatchlistRules {
                at_risk: GuardChain {
                    rules: vec![
                        GuardRule {
                            when: Condition::TenureAtLeast(10),
                            recommendation: Recommendation::new(
                                "long tenure ({tenure} years) suggests they may seek new challenges",
                                "offer a promotion or leadership role to re-engage them",
                            ),
                        },
                        GuardRule {
                            when: Condition::IncomeBelow(5000),
                            recommendation: Recommendation::new(
                                "relatively low income (${income}) may drive them to competitors",
                                "review their compensation to align with industry standards",
                            ),
                        },
                        GuardRule {
                            when: Condition::JobSatisfactionAtMost(3),
                            recommendation: Recommendation::new(
                                "low job satisfaction ({job_satisfaction}/5) indicates disengagement",
                                "provide mentorship or project variety to boost motivation",
                            ),
                        },
                    ],
                    fallback: Recommendation::new(
                        "high performance ({rating}/5) makes them attractive to other employers",
                        "recognize their contributions with bonuses or public acknowledgment",
                    ),
                },
                underperformer: GuardChain {
                    rules: vec![
                        GuardRule {
                            when: Condition::TrainingAtMost(1),
                            recommendation: Recommendation::new(
                                "minimal training ({training} sessions) limits their effectiveness",
                                "provide intensive skill-building workshops",
                            ),
                        },
                        GuardRule {
                            when: Condition::EnvironmentSatisfactionAtMost(2),
                            recommendation: Recommendation::new(
                                "low environment satisfaction ({environment_satisfaction}/5) suggests an unsuitable work setting",
                                "relocate them to a different team or office",
                            ),
                        },
                        GuardRule {
                            when: Condition::JobSatisfactionAtMost(2),
                            recommendation: Recommendation::new(
                                "low job satisfaction ({job_satisfaction}/5) reduces motivation",
                                "explore their career aspirations and align tasks accordingly",
                            ),
                        },
                    ],
                    fallback: Recommendation::new(
                        "performance ({rating}/5) is consistently below expectations",
                        "initiate a formal performance review with clear improvement targets",
                    ),
                },
            },
            history_individual: WatchlistRules {
                at_risk: GuardChain {
                    rules: vec![
                        GuardRule {
                            when: Condition::WorkLifeBalanceAtMost(2),
                            recommendation: Recommendation::new(
                                "poor work-life balance ({work_life_balance}/5) may cause burnout",
                                "implement flexible schedules or wellness programs",
                            ),
                        },
                        GuardRule {
                            when: Condition::OverTime,
                            recommendation: Recommendation::new(
                                "overtime demands could reduce their commitment",
                                "limit overtime and ensure adequate rest periods",
                            ),
                        },
                    ],
                    fallback: Recommendation::new(
                        "their high performance ({rating}/5) attracts external opportunities",
                        "offer retention bonuses or career advancement paths",
                    ),
                },
                underperformer: GuardChain {
                    rules: vec![
                        GuardRule {
                            when: Condition::OverTime,
                            recommendation: Recommendation::new(
                                "overtime may overwhelm their capacity",
                                "reduce workload and prioritize key tasks",
                            ),
                        },
                        GuardRule {
                            when: Condition::JobSatisfactionAtMost(2),
                            recommendation: Recommendation::new(
                                "low job satisfaction ({job_satisfaction}/5) hinders performance",
                                "offer coaching to address dissatisfaction",
                            ),
                        },
                    ],
                    fallback: Recommendation::new(
                        "performance ({rating}/5) does not meet standards",
                        "set up a performance improvement plan with regular check-ins",
                    ),
                },
            },
        }
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workforce::domain::OverTime;

    #[test]
    fn fallback_fires_when_no_rule_matches() {
        let profile = EmployeeProfile::default();
        let subject = RuleSubject {
            profile: &profile,
            rating: 5,
        };
        let finding = RuleBook::standard().bulk.at_risk.evaluate(&subject);
        assert_eq!(finding.rule, None);
        assert_eq!(
            finding.reason,
            "their high performance (5/5) may attract external offers"
        );
    }

    #[test]
    fn templates_interpolate_profile_values() {
        let profile = EmployeeProfile {
            monthly_income: 3200,
            years_at_company: 2,
            ..EmployeeProfile::default()
        };
        let subject = RuleSubject {
            profile: &profile,
            rating: 4,
        };
        let finding = RuleBook::standard().history_bulk.at_risk.evaluate(&subject);
        assert_eq!(finding.rule, Some(1));
        assert_eq!(
            finding.reason,
            "relatively low income ($3200) may drive them to competitors"
        );
    }

    #[test]
    fn conditions_round_trip_through_json() {
        let chain = GuardChain {
            rules: vec![GuardRule {
                when: Condition::OverTime,
                recommendation: Recommendation::new("overtime", "rest"),
            }],
            fallback: Recommendation::new("default", "review"),
        };
        let json = serde_json::to_string(&chain).expect("serializes");
        let parsed: GuardChain = serde_json::from_str(&json).expect("parses");
        assert_eq!(parsed, chain);

        let profile = EmployeeProfile {
            over_time: OverTime::Yes,
            ..EmployeeProfile::default()
        };
        let finding = parsed.evaluate(&RuleSubject {
            profile: &profile,
            rating: 2,
        });
        assert_eq!(finding.rule, Some(0));
    }

    #[test]
    fn rule_book_override_loads_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("rules.json");
        let document = serde_json::to_string(&RuleBook::standard()).expect("serializes");
        fs::write(&path, document).expect("writes");
        let loaded = RuleBook::from_path(&path).expect("loads");
        assert_eq!(loaded, RuleBook::standard());

        let missing = RuleBook::from_path(path.with_extension("missing"));
        assert!(matches!(missing, Err(RuleBookError::Io { .. })));
    }
}
