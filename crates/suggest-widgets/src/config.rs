#![forbid(unsafe_code)]

//! Autocomplete configuration.
//!
//! [`AutocompleteConfig`] is the one configuration surface. Embedders either
//! build it in Rust ([`AutocompleteConfig::new`] plus field updates) or parse
//! it from JSON with camelCase keys:
//!
//! ```json
//! {
//!   "inputId": "search",
//!   "listId": "search-list",
//!   "wrapperId": "search-panel",
//!   "clearId": "search-clear",
//!   "source": { "kind": "numberedLists", "idPrefix": "list-", "ceiling": 20,
//!               "maxConsecutiveMisses": 3, "fields": [".name", ".district"] },
//!   "anchorSelector": ".search-field",
//!   "debounceDelayMs": 120,
//!   "maxResults": 50,
//!   "gap": { "viewportFraction": 0.01 },
//!   "filterHook": { "hook": "fsAttributes.cmsfilter.reload", "event": "suggest:filter" }
//! }
//! ```
//!
//! Every optional key has a default. A bare `"sourceSelector"` or
//! `"sourceClass"` string stands in for a selector `source`.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use suggest_core::geometry::Rect;
use suggest_core::retry::RetryPolicy;
use suggest_core::selector::{Selector, SelectorError};
use suggest_text::MatchOptions;
use suggest_text::matcher::{DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_RESULTS, DEFAULT_MIN_QUERY_LEN};

/// Term source used when the configuration names none.
pub const DEFAULT_SOURCE_CLASS: &str = "suggest-term";

/// Input debounce.
pub const DEFAULT_DEBOUNCE_MS: u64 = 120;

/// Quiet period after content mutations before terms are re-collected.
pub const DEFAULT_MUTATION_DEBOUNCE_MS: u64 = 500;

/// Gap between input and panel.
pub const DEFAULT_GAP_PX: f64 = 4.0;

/// Numbered-list defaults.
pub const DEFAULT_LIST_ID_PREFIX: &str = "list-";
pub const DEFAULT_LIST_CEILING: u32 = 20;
pub const DEFAULT_MAX_CONSECUTIVE_MISSES: u32 = 3;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Configuration could not be parsed or is inconsistent.
#[derive(Debug)]
pub enum ConfigError {
    /// Malformed JSON or wrong value types.
    Json(serde_json::Error),
    /// A value is out of range or conflicts with another.
    Invalid {
        /// The camelCase key path.
        field: &'static str,
        /// What is wrong.
        reason: String,
    },
    /// A selector string did not parse.
    Selector {
        /// The camelCase key path.
        field: &'static str,
        /// Parser error.
        error: SelectorError,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid configuration JSON: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid `{field}`: {reason}"),
            Self::Selector { field, error } => write!(f, "invalid selector in `{field}`: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Invalid { .. } => None,
            Self::Selector { error, .. } => Some(error),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

fn parse_selector(field: &'static str, input: &str) -> Result<Selector, ConfigError> {
    Selector::parse(input).map_err(|error| ConfigError::Selector { field, error })
}

fn parse_selectors(field: &'static str, inputs: &[String]) -> Result<Vec<Selector>, ConfigError> {
    inputs.iter().map(|s| parse_selector(field, s)).collect()
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// How terms are discovered on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    /// Every element matching `selector`. With `fields`, the text of each
    /// field element beneath a match is taken instead (union of all fields).
    Selector {
        /// Source element selector.
        selector: Selector,
        /// Optional sub-selectors scoped under each source element.
        fields: Vec<Selector>,
    },
    /// Containers `{id_prefix}1 ..= {id_prefix}{ceiling}`, probed in order.
    /// Gaps are tolerated; probing stops after `max_consecutive_misses`
    /// missing containers in a row.
    NumberedLists {
        /// Id prefix of the numbered containers.
        id_prefix: String,
        /// Highest container number probed.
        ceiling: u32,
        /// Consecutive missing containers that end the probe.
        max_consecutive_misses: u32,
        /// Field selectors scoped under each container. At least one.
        fields: Vec<Selector>,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Selector {
            selector: Selector::class(DEFAULT_SOURCE_CLASS),
            fields: Vec::new(),
        }
    }
}

/// Vertical gap between the input's bottom edge and the panel.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Gap {
    /// Fixed CSS pixels.
    Px(f64),
    /// Fraction of the viewport height.
    ViewportFraction(f64),
}

impl Default for Gap {
    fn default() -> Self {
        Self::Px(DEFAULT_GAP_PX)
    }
}

impl Gap {
    /// The gap in CSS pixels for `viewport`.
    #[must_use]
    pub fn resolve(&self, viewport: &Rect) -> f64 {
        match *self {
            Self::Px(px) => px,
            Self::ViewportFraction(fraction) => viewport.height * fraction,
        }
    }

    fn value(&self) -> f64 {
        match *self {
            Self::Px(v) | Self::ViewportFraction(v) => v,
        }
    }
}

/// Optional third-party filter integration run after each commit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterHookConfig {
    /// Hook name, resolved by the host (dotted paths allowed).
    pub hook: String,
    /// Custom event dispatched on the input when the hook exists.
    #[serde(default)]
    pub event: Option<String>,
}

/// Complete, validated autocomplete configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteConfig {
    /// Id of the text input.
    pub input_id: String,
    /// Id of the result list container.
    pub list_id: String,
    /// Id of the positioned panel wrapping the list.
    pub wrapper_id: String,
    /// Id of an optional clear button.
    pub clear_id: Option<String>,
    /// Term discovery strategy.
    pub source: SourceConfig,
    /// Nearest ancestor of the input matching this is the positioning
    /// anchor; the input's parent otherwise.
    pub anchor_selector: Option<Selector>,
    /// Quiet period after typing before filtering.
    pub debounce_delay: Duration,
    /// Quiet period after content mutations before re-collecting terms.
    pub mutation_debounce: Duration,
    /// Result cap, minimum query length and cache size.
    pub matching: MatchOptions,
    /// Panel gap.
    pub gap: Gap,
    /// Mount retry schedule.
    pub mount_retry: RetryPolicy,
    /// External filter integration.
    pub filter_hook: Option<FilterHookConfig>,
}

impl AutocompleteConfig {
    /// A configuration with defaults for everything but the element ids.
    #[must_use]
    pub fn new(
        input_id: impl Into<String>,
        list_id: impl Into<String>,
        wrapper_id: impl Into<String>,
    ) -> Self {
        Self {
            input_id: input_id.into(),
            list_id: list_id.into(),
            wrapper_id: wrapper_id.into(),
            clear_id: None,
            source: SourceConfig::default(),
            anchor_selector: None,
            debounce_delay: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            mutation_debounce: Duration::from_millis(DEFAULT_MUTATION_DEBOUNCE_MS),
            matching: MatchOptions::default(),
            gap: Gap::default(),
            mount_retry: RetryPolicy::default(),
            filter_hook: None,
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;
        raw.resolve()
    }

    /// Parse and validate an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_value(value)?;
        raw.resolve()
    }

    /// Check ranges and cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, id) in [
            ("inputId", &self.input_id),
            ("listId", &self.list_id),
            ("wrapperId", &self.wrapper_id),
        ] {
            if id.trim().is_empty() {
                return Err(ConfigError::invalid(field, "must not be empty"));
            }
        }
        if self.clear_id.as_ref().is_some_and(|id| id.trim().is_empty()) {
            return Err(ConfigError::invalid("clearId", "must not be empty"));
        }
        if self.matching.max_results == 0 {
            return Err(ConfigError::invalid("maxResults", "must be at least 1"));
        }
        if let SourceConfig::NumberedLists {
            ceiling,
            max_consecutive_misses,
            fields,
            ..
        } = &self.source
        {
            if *ceiling == 0 {
                return Err(ConfigError::invalid("source.ceiling", "must be at least 1"));
            }
            if *max_consecutive_misses == 0 {
                return Err(ConfigError::invalid(
                    "source.maxConsecutiveMisses",
                    "must be at least 1",
                ));
            }
            if fields.is_empty() {
                return Err(ConfigError::invalid(
                    "source.fields",
                    "numbered lists need at least one field selector",
                ));
            }
        }
        let gap = self.gap.value();
        if !gap.is_finite() || gap < 0.0 {
            return Err(ConfigError::invalid("gap", "must be a finite, non-negative number"));
        }
        if matches!(self.gap, Gap::ViewportFraction(f) if f > 1.0) {
            return Err(ConfigError::invalid("gap.viewportFraction", "must not exceed 1"));
        }
        if self.mount_retry.max_attempts == 0 {
            return Err(ConfigError::invalid("mountRetry.maxAttempts", "must be at least 1"));
        }
        let multiplier = self.mount_retry.multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(ConfigError::invalid(
                "mountRetry.multiplier",
                "must be a finite number of at least 1",
            ));
        }
        if let Some(hook) = &self.filter_hook {
            if hook.hook.trim().is_empty() {
                return Err(ConfigError::invalid("filterHook.hook", "must not be empty"));
            }
            if hook.event.as_ref().is_some_and(|e| e.trim().is_empty()) {
                return Err(ConfigError::invalid("filterHook.event", "must not be empty"));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_mutation_debounce_ms() -> u64 {
    DEFAULT_MUTATION_DEBOUNCE_MS
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_min_query_length() -> usize {
    DEFAULT_MIN_QUERY_LEN
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_id_prefix() -> String {
    DEFAULT_LIST_ID_PREFIX.to_string()
}

fn default_ceiling() -> u32 {
    DEFAULT_LIST_CEILING
}

fn default_max_misses() -> u32 {
    DEFAULT_MAX_CONSECUTIVE_MISSES
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConfig {
    input_id: String,
    list_id: String,
    wrapper_id: String,
    #[serde(default)]
    clear_id: Option<String>,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    source_selector: Option<String>,
    #[serde(default)]
    source_class: Option<String>,
    #[serde(default)]
    anchor_selector: Option<String>,
    #[serde(default = "default_debounce_ms")]
    debounce_delay_ms: u64,
    #[serde(default = "default_mutation_debounce_ms")]
    mutation_debounce_ms: u64,
    #[serde(default = "default_max_results")]
    max_results: usize,
    #[serde(default = "default_min_query_length")]
    min_query_length: usize,
    #[serde(default = "default_cache_capacity")]
    cache_capacity: usize,
    #[serde(default)]
    gap: Gap,
    #[serde(default)]
    mount_retry: RawRetry,
    #[serde(default)]
    filter_hook: Option<FilterHookConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
enum RawSource {
    Selector {
        selector: String,
        #[serde(default)]
        fields: Vec<String>,
    },
    NumberedLists {
        #[serde(default = "default_id_prefix")]
        id_prefix: String,
        #[serde(default = "default_ceiling")]
        ceiling: u32,
        #[serde(default = "default_max_misses")]
        max_consecutive_misses: u32,
        #[serde(default)]
        fields: Vec<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
struct RawRetry {
    max_attempts: u32,
    initial_delay_ms: u64,
    multiplier: f64,
    max_delay_ms: u64,
}

impl Default for RawRetry {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            multiplier: policy.multiplier,
            max_delay_ms: policy.max_delay.as_millis() as u64,
        }
    }
}

impl RawConfig {
    fn resolve(self) -> Result<AutocompleteConfig, ConfigError> {
        let source = match (self.source, self.source_selector, self.source_class) {
            (None, None, None) => SourceConfig::default(),
            (Some(source), None, None) => source.resolve()?,
            (None, Some(selector), None) => SourceConfig::Selector {
                selector: parse_selector("sourceSelector", &selector)?,
                fields: Vec::new(),
            },
            (None, None, Some(class)) => {
                let class = class.trim().trim_start_matches('.');
                if class.is_empty() || class.contains(char::is_whitespace) {
                    return Err(ConfigError::invalid("sourceClass", "must be a single class name"));
                }
                SourceConfig::Selector {
                    selector: Selector::class(class),
                    fields: Vec::new(),
                }
            }
            _ => {
                return Err(ConfigError::invalid(
                    "source",
                    "give only one of `source`, `sourceSelector`, `sourceClass`",
                ));
            }
        };

        let anchor_selector = self
            .anchor_selector
            .as_deref()
            .map(|s| parse_selector("anchorSelector", s))
            .transpose()?;

        let config = AutocompleteConfig {
            input_id: self.input_id,
            list_id: self.list_id,
            wrapper_id: self.wrapper_id,
            clear_id: self.clear_id,
            source,
            anchor_selector,
            debounce_delay: Duration::from_millis(self.debounce_delay_ms),
            mutation_debounce: Duration::from_millis(self.mutation_debounce_ms),
            matching: MatchOptions {
                max_results: self.max_results,
                min_query_len: self.min_query_length,
                cache_capacity: self.cache_capacity,
            },
            gap: self.gap,
            mount_retry: RetryPolicy {
                max_attempts: self.mount_retry.max_attempts,
                initial_delay: Duration::from_millis(self.mount_retry.initial_delay_ms),
                multiplier: self.mount_retry.multiplier,
                max_delay: Duration::from_millis(self.mount_retry.max_delay_ms),
            },
            filter_hook: self.filter_hook,
        };
        config.validate()?;
        Ok(config)
    }
}

impl RawSource {
    fn resolve(self) -> Result<SourceConfig, ConfigError> {
        Ok(match self {
            Self::Selector { selector, fields } => SourceConfig::Selector {
                selector: parse_selector("source.selector", &selector)?,
                fields: parse_selectors("source.fields", &fields)?,
            },
            Self::NumberedLists {
                id_prefix,
                ceiling,
                max_consecutive_misses,
                fields,
            } => SourceConfig::NumberedLists {
                id_prefix,
                ceiling,
                max_consecutive_misses,
                fields: parse_selectors("source.fields", &fields)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{"inputId":"q","listId":"l","wrapperId":"w"}"#;

    fn invalid_field(result: Result<AutocompleteConfig, ConfigError>) -> &'static str {
        match result {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn minimal_json_uses_defaults() {
        let config = AutocompleteConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config, AutocompleteConfig::new("q", "l", "w"));
        assert_eq!(config.debounce_delay, Duration::from_millis(120));
        assert_eq!(config.matching.max_results, 50);
        assert_eq!(config.matching.min_query_len, 1);
        assert_eq!(config.gap, Gap::Px(4.0));
    }

    #[test]
    fn numbered_lists_source() {
        let config = AutocompleteConfig::from_json(
            r#"{"inputId":"q","listId":"l","wrapperId":"w",
                "source":{"kind":"numberedLists","ceiling":10,"fields":[".name",".district"]}}"#,
        )
        .unwrap();
        let SourceConfig::NumberedLists {
            id_prefix,
            ceiling,
            max_consecutive_misses,
            fields,
        } = config.source
        else {
            panic!("wrong source kind");
        };
        assert_eq!(id_prefix, "list-");
        assert_eq!(ceiling, 10);
        assert_eq!(max_consecutive_misses, 3);
        assert_eq!(fields, [Selector::class("name"), Selector::class("district")]);
    }

    #[test]
    fn bare_source_class_and_selector() {
        let by_class = AutocompleteConfig::from_json(
            r#"{"inputId":"q","listId":"l","wrapperId":"w","sourceClass":".city"}"#,
        )
        .unwrap();
        assert_eq!(
            by_class.source,
            SourceConfig::Selector {
                selector: Selector::class("city"),
                fields: Vec::new()
            }
        );

        let by_selector = AutocompleteConfig::from_json(
            r#"{"inputId":"q","listId":"l","wrapperId":"w","sourceSelector":"[data-term]"}"#,
        )
        .unwrap();
        assert!(matches!(by_selector.source, SourceConfig::Selector { .. }));
    }

    #[test]
    fn conflicting_sources_rejected() {
        let result = AutocompleteConfig::from_json(
            r#"{"inputId":"q","listId":"l","wrapperId":"w","sourceClass":"a","sourceSelector":".b"}"#,
        );
        assert_eq!(invalid_field(result), "source");
    }

    #[test]
    fn gap_variants() {
        let config = AutocompleteConfig::from_json(
            r#"{"inputId":"q","listId":"l","wrapperId":"w","gap":{"viewportFraction":0.01}}"#,
        )
        .unwrap();
        assert_eq!(config.gap.resolve(&Rect::from_size(1000.0, 800.0)), 8.0);
        assert_eq!(Gap::Px(4.0).resolve(&Rect::default()), 4.0);
    }

    #[test]
    fn retry_overrides() {
        let config = AutocompleteConfig::from_json(
            r#"{"inputId":"q","listId":"l","wrapperId":"w","mountRetry":{"maxAttempts":2,"initialDelayMs":50}}"#,
        )
        .unwrap();
        assert_eq!(config.mount_retry.max_attempts, 2);
        assert_eq!(config.mount_retry.initial_delay, Duration::from_millis(50));
        assert_eq!(config.mount_retry.max_delay, Duration::from_secs(2));
    }

    #[test]
    fn range_checks() {
        let json = |extra: &str| format!(r#"{{"inputId":"q","listId":"l","wrapperId":"w",{extra}}}"#);
        let cases = [
            (r#""maxResults":0"#, "maxResults"),
            (r#""clearId":" ""#, "clearId"),
            (r#""gap":{"px":-1}"#, "gap"),
            (r#""gap":{"viewportFraction":2}"#, "gap.viewportFraction"),
            (r#""mountRetry":{"maxAttempts":0}"#, "mountRetry.maxAttempts"),
            (r#""mountRetry":{"multiplier":0.5}"#, "mountRetry.multiplier"),
            (
                r#""source":{"kind":"numberedLists","ceiling":0,"fields":[".n"]}"#,
                "source.ceiling",
            ),
            (r#""source":{"kind":"numberedLists"}"#, "source.fields"),
            (r#""filterHook":{"hook":""}"#, "filterHook.hook"),
        ];
        for (extra, field) in cases {
            let result = AutocompleteConfig::from_json(&json(extra));
            assert_eq!(invalid_field(result), field, "case {extra}");
        }

        let blank_input = AutocompleteConfig::from_json(r#"{"inputId":" ","listId":"l","wrapperId":"w"}"#);
        assert_eq!(invalid_field(blank_input), "inputId");
    }

    #[test]
    fn bad_selector_is_reported_with_field() {
        let result = AutocompleteConfig::from_json(
            r#"{"inputId":"q","listId":"l","wrapperId":"w","anchorSelector":"div > span"}"#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::Selector {
                field: "anchorSelector",
                ..
            })
        ));
    }

    #[test]
    fn unknown_keys_and_bad_json_rejected() {
        assert!(matches!(
            AutocompleteConfig::from_json(r#"{"inputId":"q","listId":"l","wrapperId":"w","maxResult":5}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            AutocompleteConfig::from_json("{"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            AutocompleteConfig::from_json(r#"{"listId":"l","wrapperId":"w"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn error_display_names_field() {
        let err = ConfigError::invalid("maxResults", "must be at least 1");
        assert_eq!(err.to_string(), "invalid `maxResults`: must be at least 1");
    }
}
