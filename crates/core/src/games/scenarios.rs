//! Multiple-choice money strategy scenarios.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::SCENARIO_COINS_PER_CORRECT;
use crate::errors::{Result, ValidationError};
use crate::validation::{FieldRule, Schema, Validate};

#[derive(Debug, Clone)]
pub struct Scenario {
    pub id: &'static str,
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    pub answer: usize,
    pub explanation: &'static str,
}

/// Client-facing scenario without its answer.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioView {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
}

impl From<&Scenario> for ScenarioView {
    fn from(s: &Scenario) -> Self {
        Self {
            id: s.id.to_string(),
            prompt: s.prompt.to_string(),
            options: s.options.iter().map(|o| o.to_string()).collect(),
        }
    }
}

static SCENARIOS: &[Scenario] = &[
    Scenario {
        id: "emergency-fund",
        prompt: "Your monthly expenses are 30,000. How large should a starter emergency fund be?",
        options: &["5,000", "Three to six months of expenses", "One year of salary", "None, use a credit card"],
        answer: 1,
        explanation: "Three to six months of expenses covers most job gaps and repairs.",
    },
    Scenario {
        id: "card-minimum",
        prompt: "Your credit card charges 36% a year. You can pay the minimum or the full bill. What do you do?",
        options: &["Pay the minimum and invest the rest", "Pay the full bill", "Skip this month"],
        answer: 1,
        explanation: "Few investments reliably beat 36% interest; clearing the bill is a guaranteed return.",
    },
    Scenario {
        id: "avalanche",
        prompt: "You have a 20% loan of 500 and a 10% loan of 2,000. Which strategy minimizes total interest?",
        options: &["Snowball: smallest balance first", "Avalanche: highest rate first", "Split extra payments evenly"],
        answer: 1,
        explanation: "Avalanche targets the most expensive debt, so less interest accrues overall.",
    },
    Scenario {
        id: "sale-impulse",
        prompt: "A 50% off sale on headphones you did not plan to buy ends tonight. What is the saving?",
        options: &["Half the price", "Nothing, it was unplanned spending", "The full price"],
        answer: 1,
        explanation: "Money spent on something you did not need is spending, not saving.",
    },
    Scenario {
        id: "budget-rule",
        prompt: "Under the 50/30/20 rule, what share of take-home pay goes to savings and debt repayment?",
        options: &["50%", "30%", "20%", "10%"],
        answer: 2,
        explanation: "50% needs, 30% wants, 20% savings and extra debt payments.",
    },
];

pub fn scenarios() -> &'static [Scenario] {
    SCENARIOS
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub scenario_id: String,
    pub choice: usize,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuiz {
    pub answers: Vec<QuizAnswer>,
}

static SUBMIT_QUIZ_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![FieldRule::array("answers")
        .required()
        .length(1, SCENARIOS.len())])
});

impl Validate for SubmitQuiz {
    fn schema() -> &'static Schema {
        &SUBMIT_QUIZ_SCHEMA
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFeedback {
    pub scenario_id: String,
    pub correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub correct: usize,
    pub total: usize,
    /// Coins credited by this submission; scenarios solved earlier earn none.
    pub coins_earned: i64,
    pub feedback: Vec<ScenarioFeedback>,
    /// Balance after crediting; filled in by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<i64>,
}

/// Grades a submission. Each scenario may be answered once.
pub fn grade(answers: &[QuizAnswer]) -> Result<QuizResult> {
    let mut seen = HashSet::new();
    let mut feedback = Vec::with_capacity(answers.len());
    for answer in answers {
        let scenario = SCENARIOS
            .iter()
            .find(|s| s.id == answer.scenario_id)
            .ok_or_else(|| {
                ValidationError::invalid(format!("Unknown scenario '{}'", answer.scenario_id))
            })?;
        if !seen.insert(scenario.id) {
            return Err(ValidationError::invalid(format!(
                "Scenario '{}' answered more than once",
                scenario.id
            ))
            .into());
        }
        if answer.choice >= scenario.options.len() {
            return Err(ValidationError::invalid(format!(
                "Choice {} is out of range for scenario '{}'",
                answer.choice, scenario.id
            ))
            .into());
        }
        feedback.push(ScenarioFeedback {
            scenario_id: scenario.id.to_string(),
            correct: answer.choice == scenario.answer,
            explanation: scenario.explanation.to_string(),
        });
    }

    let correct = feedback.iter().filter(|f| f.correct).count();
    Ok(QuizResult {
        correct,
        total: feedback.len(),
        coins_earned: correct as i64 * SCENARIO_COINS_PER_CORRECT,
        feedback,
        balance: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(id: &str, choice: usize) -> QuizAnswer {
        QuizAnswer {
            scenario_id: id.into(),
            choice,
        }
    }

    #[test]
    fn test_catalog_answers_are_in_range() {
        for s in scenarios() {
            assert!(s.answer < s.options.len(), "{}", s.id);
        }
    }

    #[test]
    fn test_view_hides_answer() {
        let view = serde_json::to_value(ScenarioView::from(&scenarios()[0])).unwrap();
        assert!(view.get("answer").is_none());
        assert!(view.get("explanation").is_none());
    }

    #[test]
    fn test_grade_counts_correct_answers() {
        let result = grade(&[answer("avalanche", 1), answer("budget-rule", 0)]).unwrap();
        assert_eq!(result.correct, 1);
        assert_eq!(result.total, 2);
        assert_eq!(result.coins_earned, SCENARIO_COINS_PER_CORRECT);
        assert!(result.feedback[0].correct);
    }

    #[test]
    fn test_grade_rejects_bad_submissions() {
        assert!(grade(&[answer("nope", 0)]).is_err());
        assert!(grade(&[answer("avalanche", 1), answer("avalanche", 1)]).is_err());
        assert!(grade(&[answer("avalanche", 9)]).is_err());
    }
}
