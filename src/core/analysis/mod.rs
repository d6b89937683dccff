//! Analyzer construction from stored analysis configuration.
//!
//! Index settings persist analyzers as plain data: a named analyzer
//! references a tokenizer and an ordered list of token filters, either
//! built-in ones by name or custom ones declared next to it with a
//! `type` and free-form parameters:
//!
//! ```json
//! {
//!   "analyzer": {
//!     "default": { "tokenizer": "standard", "token_filter": ["lowercase", "prefix"] }
//!   },
//!   "token_filter": {
//!     "prefix": { "type": "edge_ngram", "min_gram": 2, "max_gram": 10 }
//!   }
//! }
//! ```
//!
//! [`build_analyzers`] turns that into Tantivy [`TextAnalyzer`]s. Parameters
//! are validated here rather than at deserialization so a stored definition
//! always loads and a bad one fails with [`TesseraError::InvalidAnalysis`].

mod edge_ngram;

pub use edge_ngram::EdgeNgramFilter;

use crate::core::error::{Result, TesseraError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tantivy::tokenizer::{
    AlphaNumOnlyFilter, AsciiFoldingFilter, Language, LowerCaser, NgramTokenizer, RawTokenizer,
    RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter, TextAnalyzer, TextAnalyzerBuilder,
    TokenStream, WhitespaceTokenizer,
};

/// Name of the analyzer used when a field does not pick one
pub const DEFAULT_ANALYZER: &str = "default";

/// Token length limit of the built-in `standard` analyzer
const STANDARD_MAX_TOKEN_LEN: usize = 40;

/// Constructed analyzers keyed by name
pub type Analyzers = HashMap<String, TextAnalyzer>;

/// Stored analysis configuration of an index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub analyzer: BTreeMap<String, AnalyzerConfig>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tokenizer: BTreeMap<String, ComponentConfig>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub token_filter: BTreeMap<String, ComponentConfig>,
}

impl AnalysisConfig {
    /// True when no analyzer is declared
    pub fn is_empty(&self) -> bool {
        self.analyzer.is_empty()
    }
}

/// One named analyzer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// `custom` (implied when a tokenizer is set), `standard`, `simple`,
    /// `keyword`, `whitespace` or `stop`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer: Option<String>,

    #[serde(default, alias = "filter", skip_serializing_if = "Vec::is_empty")]
    pub token_filter: Vec<String>,

    /// Stop words for the `standard` and `stop` analyzer types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopwords: Option<Vec<String>>,
}

/// A custom tokenizer or token filter: a `type` plus its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl ComponentConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: serde_json::Map::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: serde_json::Value) -> Self {
        self.params.insert(key.to_string(), value);
        self
    }

    fn usize_param(&self, key: &str, default: Option<usize>) -> Result<usize> {
        match self.params.get(key) {
            Some(value) => value
                .as_u64()
                .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
                .map(|v| v as usize)
                .ok_or_else(|| {
                    invalid(format!(
                        "parameter '{key}' of '{}' must be a non-negative integer, got {value}",
                        self.kind
                    ))
                }),
            None => default.ok_or_else(|| {
                invalid(format!(
                    "'{}' is missing required parameter '{key}'",
                    self.kind
                ))
            }),
        }
    }

    fn str_param(&self, key: &str) -> Result<Option<&str>> {
        match self.params.get(key) {
            None => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(invalid(format!(
                "parameter '{key}' of '{}' must be a string, got {other}",
                self.kind
            ))),
        }
    }

    fn string_list_param(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.params.get(key) {
            None => Ok(None),
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        invalid(format!(
                            "parameter '{key}' of '{}' must contain only strings",
                            self.kind
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(other) => Err(invalid(format!(
                "parameter '{key}' of '{}' must be a list of strings, got {other}",
                self.kind
            ))),
        }
    }
}

/// Build every analyzer declared in `config`
pub fn build_analyzers(config: &AnalysisConfig) -> Result<Analyzers> {
    let mut analyzers = HashMap::with_capacity(config.analyzer.len());

    for (name, analyzer) in &config.analyzer {
        let built = build_analyzer(config, analyzer).map_err(|e| match e {
            TesseraError::InvalidAnalysis(msg) => {
                TesseraError::InvalidAnalysis(format!("analyzer '{name}': {msg}"))
            }
            other => other,
        })?;
        analyzers.insert(name.clone(), built);
    }

    Ok(analyzers)
}

/// Analyzer types usable by name without being declared
pub const BUILTIN_ANALYZERS: [&str; 5] = ["standard", "simple", "keyword", "whitespace", "stop"];

/// Build a built-in analyzer by type name
pub fn builtin_analyzer(name: &str) -> Result<TextAnalyzer> {
    let config = AnalysisConfig::default();
    let analyzer = AnalyzerConfig {
        kind: Some(name.to_string()),
        ..AnalyzerConfig::default()
    };
    build_analyzer(&config, &analyzer)
}

/// Run `text` through `analyzer` and collect the token texts
pub fn analyze(analyzer: &TextAnalyzer, text: &str) -> Vec<String> {
    let mut analyzer = analyzer.clone();
    let mut stream = analyzer.token_stream(text);
    let mut tokens = Vec::new();
    stream.process(&mut |token| tokens.push(token.text.clone()));
    tokens
}

fn build_analyzer(config: &AnalysisConfig, analyzer: &AnalyzerConfig) -> Result<TextAnalyzer> {
    let kind = match (analyzer.kind.as_deref(), analyzer.tokenizer.is_some()) {
        (Some(kind), _) => kind,
        (None, true) => "custom",
        (None, false) => "standard",
    };

    let builder = match kind {
        "custom" => {
            let tokenizer = analyzer
                .tokenizer
                .as_deref()
                .ok_or_else(|| invalid("custom analyzer requires a tokenizer".to_string()))?;
            let mut builder = tokenizer_builder(config, tokenizer)?;
            for filter in &analyzer.token_filter {
                builder = apply_filter(config, builder, filter)?;
            }
            builder
        }
        "standard" => {
            let builder = TextAnalyzer::builder(SimpleTokenizer::default())
                .filter(RemoveLongFilter::limit(STANDARD_MAX_TOKEN_LEN))
                .filter(LowerCaser)
                .dynamic();
            match &analyzer.stopwords {
                Some(words) => builder.filter_dynamic(StopWordFilter::remove(words.clone())),
                None => builder,
            }
        }
        "simple" => TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .dynamic(),
        "keyword" => TextAnalyzer::builder(RawTokenizer::default()).dynamic(),
        "whitespace" => TextAnalyzer::builder(WhitespaceTokenizer::default()).dynamic(),
        "stop" => {
            let stop = match &analyzer.stopwords {
                Some(words) => StopWordFilter::remove(words.clone()),
                None => language_stop_words(Language::English)?,
            };
            TextAnalyzer::builder(SimpleTokenizer::default())
                .filter(LowerCaser)
                .filter(stop)
                .dynamic()
        }
        other => return Err(invalid(format!("unknown analyzer type '{other}'"))),
    };

    Ok(builder.build())
}

fn tokenizer_builder(config: &AnalysisConfig, name: &str) -> Result<TextAnalyzerBuilder> {
    if let Some(component) = config.tokenizer.get(name) {
        return custom_tokenizer(component);
    }
    builtin_tokenizer(name).ok_or_else(|| invalid(format!("unknown tokenizer '{name}'")))
}

fn builtin_tokenizer(kind: &str) -> Option<TextAnalyzerBuilder> {
    let builder = match kind {
        "standard" | "simple" => TextAnalyzer::builder(SimpleTokenizer::default()).dynamic(),
        "whitespace" => TextAnalyzer::builder(WhitespaceTokenizer::default()).dynamic(),
        "keyword" | "raw" => TextAnalyzer::builder(RawTokenizer::default()).dynamic(),
        _ => return None,
    };
    Some(builder)
}

fn custom_tokenizer(component: &ComponentConfig) -> Result<TextAnalyzerBuilder> {
    match component.kind.as_str() {
        kind @ ("ngram" | "edge_ngram") => {
            let (min_gram, max_gram) = gram_bounds(component)?;
            let tokenizer = NgramTokenizer::new(min_gram, max_gram, kind == "edge_ngram")
                .map_err(|e| invalid(format!("{kind} tokenizer: {e}")))?;
            Ok(TextAnalyzer::builder(tokenizer).dynamic())
        }
        other => builtin_tokenizer(other)
            .ok_or_else(|| invalid(format!("unknown tokenizer type '{other}'"))),
    }
}

fn apply_filter(
    config: &AnalysisConfig,
    builder: TextAnalyzerBuilder,
    name: &str,
) -> Result<TextAnalyzerBuilder> {
    match config.token_filter.get(name) {
        Some(component) => custom_filter(builder, component),
        None => builtin_filter(builder, name),
    }
}

fn builtin_filter(builder: TextAnalyzerBuilder, kind: &str) -> Result<TextAnalyzerBuilder> {
    let builder = match kind {
        "lowercase" => builder.filter_dynamic(LowerCaser),
        "ascii_folding" | "asciifolding" => builder.filter_dynamic(AsciiFoldingFilter),
        "alphanum_only" => builder.filter_dynamic(AlphaNumOnlyFilter),
        "stemmer" => builder.filter_dynamic(Stemmer::new(Language::English)),
        "stop" => builder.filter_dynamic(language_stop_words(Language::English)?),
        other => return Err(invalid(format!("unknown token filter '{other}'"))),
    };
    Ok(builder)
}

fn custom_filter(
    builder: TextAnalyzerBuilder,
    component: &ComponentConfig,
) -> Result<TextAnalyzerBuilder> {
    let builder = match component.kind.as_str() {
        "stop" => {
            let filter = match component.string_list_param("stopwords")? {
                Some(words) => StopWordFilter::remove(words),
                None => {
                    let language = component.str_param("language")?.unwrap_or("english");
                    language_stop_words(parse_language(language)?)?
                }
            };
            builder.filter_dynamic(filter)
        }
        "stemmer" => {
            let language = component.str_param("language")?.unwrap_or("english");
            builder.filter_dynamic(Stemmer::new(parse_language(language)?))
        }
        "length" | "remove_long" => {
            let max = component.usize_param("max", None)?;
            if max == 0 {
                return Err(invalid(format!("'{}' max must be positive", component.kind)));
            }
            builder.filter_dynamic(RemoveLongFilter::limit(max))
        }
        "edge_ngram" => {
            let (min_gram, max_gram) = gram_bounds(component)?;
            builder.filter_dynamic(EdgeNgramFilter::new(min_gram, max_gram))
        }
        other => return builtin_filter(builder, other),
    };
    Ok(builder)
}

fn gram_bounds(component: &ComponentConfig) -> Result<(usize, usize)> {
    let min_gram = component.usize_param("min_gram", Some(1))?;
    let max_gram = component.usize_param("max_gram", Some(2))?;
    if min_gram == 0 || min_gram > max_gram {
        return Err(invalid(format!(
            "'{}' requires 0 < min_gram <= max_gram, got {min_gram}..{max_gram}",
            component.kind
        )));
    }
    Ok((min_gram, max_gram))
}

fn language_stop_words(language: Language) -> Result<StopWordFilter> {
    StopWordFilter::new(language)
        .ok_or_else(|| invalid(format!("no stop word list for {language:?}")))
}

fn parse_language(name: &str) -> Result<Language> {
    let language = match name.to_ascii_lowercase().as_str() {
        "arabic" => Language::Arabic,
        "danish" => Language::Danish,
        "dutch" => Language::Dutch,
        "english" => Language::English,
        "finnish" => Language::Finnish,
        "french" => Language::French,
        "german" => Language::German,
        "greek" => Language::Greek,
        "hungarian" => Language::Hungarian,
        "italian" => Language::Italian,
        "norwegian" => Language::Norwegian,
        "portuguese" => Language::Portuguese,
        "romanian" => Language::Romanian,
        "russian" => Language::Russian,
        "spanish" => Language::Spanish,
        "swedish" => Language::Swedish,
        "tamil" => Language::Tamil,
        "turkish" => Language::Turkish,
        other => return Err(invalid(format!("unsupported language '{other}'"))),
    };
    Ok(language)
}

fn invalid(msg: String) -> TesseraError {
    TesseraError::InvalidAnalysis(msg)
}
