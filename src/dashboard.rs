// Copyright 2022 Jacob Miesner
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Dashboard
//! Owns one model per task, built once and reused for every request, and dispatches a text
//! to the task selected by the host.
//!
//! Keyword extraction is always available. The other tasks need their model backend to be
//! injected with the `with_*` methods.
//!
//! ```no_run
//! use nlp_dashboard::dashboard::{Dashboard, DashboardConfig, Task};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = DashboardConfig::default();
//! let text = config.example_text.clone();
//! let dashboard = Dashboard::new(config)?;
//! let output = dashboard.run(Task::KeywordExtraction, &text)?;
//! println!("{}", serde_json::to_string_pretty(&output)?);
//! # Ok(())
//! # }
//! ```

use crate::common::error::DashboardError;
use crate::common::Config;
use crate::pipelines::annotation::{AnnotationStyle, Segment};
use crate::pipelines::emotion::{Emotion, EmotionModel};
use crate::pipelines::keywords_extraction::{
    KeywordExtractionConfig, KeywordExtractionModel, MAX_KEYWORDS_LIMIT,
};
use crate::pipelines::ner::{Entity, NERModel, DEFAULT_EXCLUDED_ENTITIES};
use crate::pipelines::pos_tagging::{POSModel, POSTag};
use crate::pipelines::sentiment::{Sentiment, SentimentModel};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Text shown in the dashboard before the user provides one
pub const EXAMPLE_TEXT: &str = "This is example text that contains both names of organizations \
like Hugging Face and cities like New York, all while portraying an upbeat attitude.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// # Dashboard configuration
/// Every field is optional in the JSON file and falls back to its default.
pub struct DashboardConfig {
    pub example_text: String,
    /// Number of keywords extracted when the host does not pick one
    pub default_max_keywords: usize,
    pub keyword_style: AnnotationStyle,
    /// Entity words never highlighted in the NER annotation
    pub ner_excluded_entities: Vec<String>,
    /// Inclusive range of keyword lengths, in words
    pub keyword_ngram_range: (usize, usize),
}

impl Config for DashboardConfig {}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            example_text: EXAMPLE_TEXT.to_string(),
            default_max_keywords: 5,
            keyword_style: AnnotationStyle::default(),
            ner_excluded_entities: DEFAULT_EXCLUDED_ENTITIES
                .iter()
                .map(ToString::to_string)
                .collect(),
            keyword_ngram_range: (1, 3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// # Tasks offered by the dashboard, in menu order
pub enum Task {
    SentimentAnalysis,
    KeywordExtraction,
    PartOfSpeechTagging,
    EmotionDetection,
    NamedEntityRecognition,
}

impl Task {
    pub const ALL: [Task; 5] = [
        Task::SentimentAnalysis,
        Task::KeywordExtraction,
        Task::PartOfSpeechTagging,
        Task::EmotionDetection,
        Task::NamedEntityRecognition,
    ];

    /// Display name of the task
    pub fn name(&self) -> &'static str {
        match self {
            Task::SentimentAnalysis => "Sentiment Analysis",
            Task::KeywordExtraction => "Keyword Extraction",
            Task::PartOfSpeechTagging => "Part of Speech Tagging",
            Task::EmotionDetection => "Emotion Detection",
            Task::NamedEntityRecognition => "Named Entity Recognition",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
/// # Result of a dashboard task
pub enum TaskOutput {
    Sentiment(Vec<Sentiment>),
    Emotion(Vec<Emotion>),
    Keywords {
        /// `None` when no keyword occurs in the text
        annotation: Option<Vec<Segment>>,
        keywords: Vec<String>,
    },
    PartOfSpeech {
        tags: Vec<POSTag>,
        annotation: Vec<Segment>,
    },
    Entities {
        entities: Vec<Entity>,
        annotation: Vec<Segment>,
    },
}

/// # Dashboard holding the task models
pub struct Dashboard {
    config: DashboardConfig,
    keyword_extraction_model: KeywordExtractionModel<'static>,
    sentiment_model: Option<SentimentModel>,
    emotion_model: Option<EmotionModel>,
    pos_model: Option<POSModel>,
    ner_model: Option<NERModel>,
}

impl Dashboard {
    /// Build a new `Dashboard` with the keyword extraction model only
    ///
    /// # Arguments
    ///
    /// * `config` - `DashboardConfig`
    pub fn new(config: DashboardConfig) -> Result<Dashboard, DashboardError> {
        if !(1..=MAX_KEYWORDS_LIMIT).contains(&config.default_max_keywords) {
            return Err(DashboardError::InvalidConfigurationError(format!(
                "default_max_keywords must be between 1 and {MAX_KEYWORDS_LIMIT}, got {}",
                config.default_max_keywords
            )));
        }
        let keyword_extraction_model = KeywordExtractionModel::new(KeywordExtractionConfig {
            ngram_range: config.keyword_ngram_range,
            num_keywords: config.default_max_keywords,
            annotation_style: config.keyword_style.clone(),
            ..Default::default()
        })?;
        info!("Dashboard ready");
        Ok(Dashboard {
            config,
            keyword_extraction_model,
            sentiment_model: None,
            emotion_model: None,
            pos_model: None,
            ner_model: None,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn with_sentiment(mut self, sentiment_model: SentimentModel) -> Self {
        self.sentiment_model = Some(sentiment_model);
        self
    }

    pub fn with_emotion(mut self, emotion_model: EmotionModel) -> Self {
        self.emotion_model = Some(emotion_model);
        self
    }

    pub fn with_pos(mut self, pos_model: POSModel) -> Self {
        self.pos_model = Some(pos_model);
        self
    }

    /// Registers the NER model, applying the configured entity exclusion list
    pub fn with_ner(mut self, ner_model: NERModel) -> Self {
        self.ner_model =
            Some(ner_model.with_excluded_entities(self.config.ner_excluded_entities.clone()));
        self
    }

    /// Tasks whose model is available
    pub fn available_tasks(&self) -> Vec<Task> {
        Task::ALL
            .into_iter()
            .filter(|task| match task {
                Task::SentimentAnalysis => self.sentiment_model.is_some(),
                Task::KeywordExtraction => true,
                Task::PartOfSpeechTagging => self.pos_model.is_some(),
                Task::EmotionDetection => self.emotion_model.is_some(),
                Task::NamedEntityRecognition => self.ner_model.is_some(),
            })
            .collect()
    }

    /// Runs a task on a text. Keyword extraction uses `default_max_keywords`.
    pub fn run(&self, task: Task, text: &str) -> Result<TaskOutput, DashboardError> {
        debug!(%task, "Running dashboard task");
        match task {
            Task::SentimentAnalysis => Ok(TaskOutput::Sentiment(
                Self::require(&self.sentiment_model, task)?.predict(text)?,
            )),
            Task::KeywordExtraction => self.run_keywords(text, self.config.default_max_keywords),
            Task::PartOfSpeechTagging => {
                let pos_model = Self::require(&self.pos_model, task)?;
                let tags = pos_model.predict(text)?;
                let annotation = pos_model.annotate(text, &tags);
                Ok(TaskOutput::PartOfSpeech { tags, annotation })
            }
            Task::EmotionDetection => Ok(TaskOutput::Emotion(
                Self::require(&self.emotion_model, task)?.predict(text)?,
            )),
            Task::NamedEntityRecognition => {
                let ner_model = Self::require(&self.ner_model, task)?;
                let entities = ner_model.predict(text)?;
                let annotation = ner_model.annotate(text, &entities);
                Ok(TaskOutput::Entities {
                    entities,
                    annotation,
                })
            }
        }
    }

    /// Runs keyword extraction with an explicit number of keywords (1 to 10)
    pub fn run_keywords(
        &self,
        text: &str,
        max_keywords: usize,
    ) -> Result<TaskOutput, DashboardError> {
        let (annotation, keywords) = self.keyword_extraction_model.generate(text, max_keywords)?;
        Ok(TaskOutput::Keywords {
            annotation,
            keywords,
        })
    }

    fn require<T>(model: &Option<T>, task: Task) -> Result<&T, DashboardError> {
        model.as_ref().ok_or_else(|| {
            DashboardError::InvalidConfigurationError(format!("No model registered for {task}"))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tasks_follow_menu_order() {
        let names = Task::ALL.iter().map(Task::name).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "Sentiment Analysis",
                "Keyword Extraction",
                "Part of Speech Tagging",
                "Emotion Detection",
                "Named Entity Recognition",
            ]
        );
    }

    #[test]
    fn missing_model_is_a_configuration_error() -> anyhow::Result<()> {
        let dashboard = Dashboard::new(DashboardConfig::default())?;
        assert_eq!(dashboard.available_tasks(), vec![Task::KeywordExtraction]);
        assert!(matches!(
            dashboard.run(Task::SentimentAnalysis, "text"),
            Err(DashboardError::InvalidConfigurationError(_))
        ));
        Ok(())
    }

    #[test]
    fn invalid_default_keyword_count_is_rejected() {
        let config = DashboardConfig {
            default_max_keywords: 11,
            ..Default::default()
        };
        assert!(Dashboard::new(config).is_err());
    }
}
