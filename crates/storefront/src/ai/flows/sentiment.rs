//! Sentiment analysis over a seller's reviews.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use kala_connect_core::Product;

use crate::ai::schema::{array, enumeration, number, object, string};
use crate::ai::{Flow, GenerationError, GenerationModel, run_flow};

/// Highest sentiment score.
pub const MAX_SENTIMENT_SCORE: f64 = 10.0;

/// One review as sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewForAnalysis {
    pub product_name: String,
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentInput {
    pub reviews: Vec<ReviewForAnalysis>,
}

impl SentimentInput {
    /// Flatten the reviews of `products`.
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        let reviews = products
            .iter()
            .flat_map(|p| {
                p.reviews.iter().map(|r| ReviewForAnalysis {
                    product_name: p.name.clone(),
                    rating: r.rating,
                    comment: r.comment.clone(),
                })
            })
            .collect();
        Self { reviews }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSentiment {
    pub overall_sentiment: Sentiment,
    /// 0 (very negative) to 10 (very positive).
    pub sentiment_score: f64,
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub actionable_suggestions: Vec<String>,
}

pub struct AnalyzeReviewSentiment;

impl Flow for AnalyzeReviewSentiment {
    const NAME: &'static str = "analyze_review_sentiment";
    type Input = SentimentInput;
    type Output = ReviewSentiment;

    fn validate(input: &Self::Input) -> Result<(), GenerationError> {
        if input.reviews.is_empty() {
            return Err(GenerationError::NoReviews);
        }
        Ok(())
    }

    fn prompt(input: &Self::Input) -> String {
        let reviews = serde_json::to_string_pretty(&input.reviews).unwrap_or_default();
        format!(
            "You analyse customer feedback for sellers on KalaConnect, a marketplace for Indian handicrafts.\n\n\
             Reviews:\n{reviews}\n\n\
             Report:\n\
             1. overallSentiment: Positive, Negative or Neutral.\n\
             2. sentimentScore: 0 (extremely negative) to 10 (extremely positive), 5 being neutral, \
             weighing both ratings and the tone of the comments.\n\
             3. positiveKeywords: the 3-5 themes customers praise most.\n\
             4. negativeKeywords: the 3-5 most common complaints.\n\
             5. actionableSuggestions: 2-3 concrete changes the seller could make to products, \
             listings or service based on this feedback."
        )
    }

    fn output_schema() -> Value {
        object(&[
            (
                "overallSentiment",
                enumeration("Overall sentiment", &["Positive", "Negative", "Neutral"]),
            ),
            ("sentimentScore", number("Score from 0 to 10")),
            ("positiveKeywords", array("Praised themes", string("Theme"))),
            ("negativeKeywords", array("Complaints", string("Theme"))),
            ("actionableSuggestions", array("Suggestions for the seller", string("Suggestion"))),
        ])
    }

    fn check_output(output: &Self::Output) -> Result<(), String> {
        if !(0.0..=MAX_SENTIMENT_SCORE).contains(&output.sentiment_score) {
            return Err(format!(
                "sentimentScore {} is outside 0-{MAX_SENTIMENT_SCORE}",
                output.sentiment_score
            ));
        }
        Ok(())
    }
}

/// Analyse the reviews left on `products`.
///
/// # Errors
///
/// Returns `GenerationError::NoReviews` when none of the products has a
/// review; otherwise see [`run_flow`].
pub async fn analyze_review_sentiment(
    model: &dyn GenerationModel,
    products: &[Product],
) -> Result<ReviewSentiment, GenerationError> {
    run_flow::<AnalyzeReviewSentiment>(model, &SentimentInput::from_products(products)).await
}
