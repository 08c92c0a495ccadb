use serde::Serialize;

use super::{ExplainError, Explanation};

/// Highlight color for words that support the explained class
const SUPPORT_RGB: &str = "255, 127, 14";

/// Highlight color for words that oppose the explained class
const OPPOSE_RGB: &str = "31, 119, 180";

static TEMPLATE: &str = r#"<div class="explanation">
  <h3>Prediction probability for {{ class_name | escape }}: {{ probability }}</h3>
  <p>Local model prediction {{ local_prediction }}, fit score {{ score }}</p>
  <table>
    <tr><th>Word</th><th>Weight</th><th>Supports</th></tr>
    {%- for feature in features %}
    <tr><td>{{ feature.word | escape }}</td><td>{{ feature.weight }}</td><td>{{ feature.supports | escape }}</td></tr>
    {%- endfor %}
  </table>
  <p class="text">
    {%- for token in tokens -%}
    {%- if token.color -%}
    <span style="background-color: {{ token.color }}">{{ token.word | escape }}</span>
    {%- else -%}
    {{ token.word | escape }}
    {%- endif %} {% endfor -%}
  </p>
</div>
"#;

#[derive(Serialize)]
struct Feature {
    word: String,
    weight: String,
    supports: String,
}

#[derive(Serialize)]
struct Token<'a> {
    word: &'a str,
    color: Option<String>,
}

#[derive(Serialize)]
struct Context<'a> {
    class_name: &'a str,
    probability: String,
    local_prediction: String,
    score: String,
    features: Vec<Feature>,
    tokens: Vec<Token<'a>>,
}

impl Explanation {
    /// The class a negative weight pushes toward
    fn opposing_class(&self) -> String {
        match self.class_names.as_slice() {
            [_, second] if self.class == 0 => second.clone(),
            [first, _] => first.clone(),
            _ => format!("not {}", self.class_name()),
        }
    }

    /// Render the explanation as a self-contained HTML fragment: a table of word weights and
    /// the text with each explained word highlighted toward the class it supports
    pub fn render_html(&self, text: &str) -> Result<String, ExplainError> {
        let strongest = self
            .weights
            .iter()
            .map(|w| w.weight.abs())
            .fold(0.0f32, f32::max);

        let opposing = self.opposing_class();

        let features = self
            .weights
            .iter()
            .map(|w| Feature {
                word: w.word.clone(),
                weight: format!("{:.3}", w.weight),
                supports: if w.weight >= 0.0 {
                    self.class_name().to_string()
                } else {
                    opposing.clone()
                },
            })
            .collect();

        let tokens = text
            .split_whitespace()
            .map(|word| Token {
                word,
                color: self
                    .weight_of(word)
                    .filter(|_| strongest > 0.0)
                    .map(|weight| {
                        let rgb = if weight >= 0.0 { SUPPORT_RGB } else { OPPOSE_RGB };
                        let alpha = 0.2 + 0.8 * weight.abs() / strongest;

                        format!("rgba({rgb}, {alpha:.2})")
                    }),
            })
            .collect();

        let context = Context {
            class_name: self.class_name(),
            probability: format!("{:.3}", self.probability),
            local_prediction: format!("{:.3}", self.local_prediction),
            score: format!("{:.3}", self.score),
            features,
            tokens,
        };

        let template = liquid::ParserBuilder::with_stdlib()
            .build()?
            .parse(TEMPLATE)?;

        Ok(template.render(&liquid::to_object(&context)?)?)
    }
}
