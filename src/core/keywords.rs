//! Dictionary-based search keyword expansion
//!
//! Turns a short query into core words, synonyms, related words and
//! context words so a caller can run progressively wider searches.
//! Output is deterministic: lists are deduplicated in insertion order and
//! ranked with a stable sort.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{check_not_blank, KbError, KbResult};

const BUILTIN_DICTIONARY: &str = include_str!("keywords.toml");
const MAX_CONTEXT_WORDS: usize = 10;
const DOMAIN_CONTEXT_WORDS: usize = 6;
const PRODUCT_CONTEXT_WORDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionMode {
    /// Synonyms and related words
    Basic,
    /// Adds context words from the base, domain, product and query tables
    #[default]
    Comprehensive,
    /// Same word sets as `Comprehensive`
    Contextual,
}

impl ExpansionMode {
    pub fn includes_context(&self) -> bool {
        !matches!(self, ExpansionMode::Basic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpansionMode::Basic => "basic",
            ExpansionMode::Comprehensive => "comprehensive",
            ExpansionMode::Contextual => "contextual",
        }
    }
}

impl fmt::Display for ExpansionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpansionMode {
    type Err = KbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(ExpansionMode::Basic),
            "comprehensive" => Ok(ExpansionMode::Comprehensive),
            "contextual" => Ok(ExpansionMode::Contextual),
            other => Err(KbError::invalid(
                "expansion_type",
                format!(
                    "unknown mode '{}'; expected basic, comprehensive or contextual",
                    other
                ),
            )),
        }
    }
}

/// A business domain recognised from trigger words
#[derive(Debug, Clone, Deserialize)]
pub struct Domain {
    pub name: String,
    pub triggers: Vec<String>,
    #[serde(default)]
    pub expansions: Vec<String>,
    /// Expansions listed first, in this order
    #[serde(default)]
    pub priority: Vec<String>,
    #[serde(default)]
    pub context: Vec<String>,
}

impl Domain {
    fn ordered_expansions(&self) -> impl Iterator<Item = &String> {
        self.priority
            .iter()
            .filter(|w| self.expansions.contains(w))
            .chain(self.expansions.iter().filter(|w| !self.priority.contains(w)))
    }
}

/// Context words added when any trigger occurs in the query
#[derive(Debug, Clone, Deserialize)]
pub struct QueryFeature {
    pub triggers: Vec<String>,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dictionary {
    #[serde(default)]
    pub base_context: Vec<String>,
    #[serde(default)]
    pub synonyms: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub contexts: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub similar: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub domains: Vec<Domain>,
    #[serde(default)]
    pub product_contexts: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub query_features: Vec<QueryFeature>,
}

/// Result of one expansion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordExpansion {
    pub original_query: String,
    pub mode: ExpansionMode,
    pub core_words: Vec<String>,
    pub domains: Vec<String>,
    pub synonyms: Vec<String>,
    pub related_words: Vec<String>,
    pub context_words: Vec<String>,
}

impl KeywordExpansion {
    pub fn total_words(&self) -> usize {
        self.core_words.len()
            + self.synonyms.len()
            + self.related_words.len()
            + self.context_words.len()
    }

    /// Precise, widened and full search strings
    pub fn search_combinations(&self) -> [String; 3] {
        let widen = |related: usize, max: usize| {
            self.related_words
                .iter()
                .take(related)
                .chain(&self.core_words)
                .chain(&self.synonyms)
                .take(max)
                .cloned()
                .collect::<Vec<_>>()
                .join(" ")
        };
        [
            self.core_words
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(" "),
            widen(2, 5),
            widen(4, 8),
        ]
    }
}

pub struct KeywordExpander {
    dictionary: Dictionary,
}

fn push_unique(list: &mut Vec<String>, word: &str) {
    if !list.iter().any(|w| w == word) {
        list.push(word.to_string());
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn lookup<'a>(map: &'a BTreeMap<String, Vec<String>>, word: &str) -> Option<&'a Vec<String>> {
    map.iter()
        .find(|(key, _)| eq_ignore_case(key, word))
        .map(|(_, v)| v)
}

impl KeywordExpander {
    pub fn new(dictionary: Dictionary) -> Self {
        Self { dictionary }
    }

    /// Expander over the dictionary compiled into the binary
    pub fn builtin() -> Result<Self, toml::de::Error> {
        Self::from_toml(BUILTIN_DICTIONARY)
    }

    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        Ok(Self::new(toml::from_str(source)?))
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn expand(&self, query: &str, mode: ExpansionMode) -> KbResult<KeywordExpansion> {
        check_not_blank("original_query", query)?;
        let query = query.trim();

        let mut core_words = Vec::new();
        for word in query.split_whitespace() {
            push_unique(&mut core_words, word);
        }

        let domain = self.identify_domain(query);
        let synonyms = self.rank(self.collect_synonyms(query, &core_words), query, &core_words);

        let related_words = self.rank(self.collect_related(domain, &core_words), query, &core_words);

        let context_words = if mode.includes_context() {
            self.collect_context(query, domain, &synonyms)
        } else {
            Vec::new()
        };

        let expansion = KeywordExpansion {
            original_query: query.to_string(),
            mode,
            core_words,
            domains: domain.map(|d| d.name.clone()).into_iter().collect(),
            synonyms,
            related_words,
            context_words,
        };
        tracing::info!(
            query,
            mode = %mode,
            total = expansion.total_words(),
            "keywords expanded"
        );
        Ok(expansion)
    }

    /// Whether any word loosely associated with `word` occurs in `text`
    fn is_similar(&self, word: &str, text: &str) -> bool {
        let text = text.to_lowercase();
        lookup(&self.dictionary.similar, word)
            .is_some_and(|list| list.iter().any(|s| text.contains(&s.to_lowercase())))
    }

    /// First domain, in dictionary order, with a trigger in the query
    fn identify_domain(&self, query: &str) -> Option<&Domain> {
        let query_lower = query.to_lowercase();
        self.dictionary.domains.iter().find(|domain| {
            domain.triggers.iter().any(|trigger| {
                query_lower.contains(&trigger.to_lowercase()) || self.is_similar(trigger, query)
            })
        })
    }

    fn collect_synonyms(&self, query: &str, core_words: &[String]) -> Vec<String> {
        let synonyms = &self.dictionary.synonyms;
        let mut found = Vec::new();
        let mut add = |list: &Vec<String>| {
            for w in list {
                push_unique(&mut found, w);
            }
        };

        if let Some(list) = lookup(synonyms, query) {
            add(list);
        }

        for word in core_words {
            if let Some(list) = lookup(synonyms, word) {
                add(list);
                continue;
            }
            let word_lower = word.to_lowercase();
            if let Some((_, list)) = synonyms.iter().find(|(key, _)| {
                let key = key.to_lowercase();
                key.contains(&word_lower) || word_lower.contains(&key)
            }) {
                add(list);
            }
            if let Some((_, list)) = synonyms.iter().find(|(key, _)| self.is_similar(key, word)) {
                add(list);
            }
        }
        found
    }

    fn collect_related(&self, domain: Option<&Domain>, core_words: &[String]) -> Vec<String> {
        let mut related = Vec::new();
        if let Some(domain) = domain {
            for w in domain.ordered_expansions() {
                push_unique(&mut related, w);
            }
        }

        let contexts = &self.dictionary.contexts;
        for word in core_words {
            let list = lookup(contexts, word).or_else(|| {
                contexts
                    .iter()
                    .find(|(key, _)| self.is_similar(key, word))
                    .map(|(_, v)| v)
            });
            for w in list.into_iter().flatten() {
                push_unique(&mut related, w);
            }
        }
        related
    }

    /// Base words, then domain, product and query-feature words, capped
    fn collect_context(&self, query: &str, domain: Option<&Domain>, synonyms: &[String]) -> Vec<String> {
        let mut context = Vec::new();
        for w in &self.dictionary.base_context {
            push_unique(&mut context, w);
        }
        if let Some(domain) = domain {
            for w in domain.context.iter().take(DOMAIN_CONTEXT_WORDS) {
                push_unique(&mut context, w);
            }
        }

        // only the first product named among the synonyms contributes
        let product = synonyms
            .iter()
            .find_map(|s| lookup(&self.dictionary.product_contexts, s));
        for w in product.into_iter().flatten().take(PRODUCT_CONTEXT_WORDS) {
            push_unique(&mut context, w);
        }

        let query_lower = query.to_lowercase();
        let feature = self.dictionary.query_features.iter().find(|f| {
            f.triggers
                .iter()
                .any(|t| query_lower.contains(&t.to_lowercase()))
        });
        for w in feature.into_iter().flat_map(|f| &f.words) {
            push_unique(&mut context, w);
        }

        context.truncate(MAX_CONTEXT_WORDS);
        context
    }

    /// Sort by relevance, highest first; ties keep insertion order
    fn rank(&self, words: Vec<String>, query: &str, core_words: &[String]) -> Vec<String> {
        let mut scored: Vec<(u32, String)> = words
            .into_iter()
            .map(|w| (self.relevance(&w, query, core_words), w))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, w)| w).collect()
    }

    fn relevance(&self, word: &str, query: &str, core_words: &[String]) -> u32 {
        let word_lower = word.to_lowercase();
        let mut score = 0;

        if query.to_lowercase().contains(&word_lower) {
            score += 100;
        }

        for token in core_words {
            let token_lower = token.to_lowercase();
            if word_lower.contains(&token_lower) {
                score += 80;
            }

            for (key, list) in &self.dictionary.synonyms {
                if eq_ignore_case(key, token) {
                    if list.iter().any(|s| s == word) {
                        score += 60;
                    }
                } else if list.iter().any(|s| eq_ignore_case(s, token))
                    && (key == word || list.iter().any(|s| s == word))
                {
                    score += 50;
                }
            }

            for (key, list) in &self.dictionary.similar {
                let key_lower = key.to_lowercase();
                if key_lower == token_lower || token_lower.contains(&key_lower) {
                    if list.iter().any(|s| eq_ignore_case(s, word)) {
                        score += 40;
                    }
                } else if list.iter().any(|s| eq_ignore_case(s, token)) && key_lower == word_lower {
                    score += 40;
                }
            }

            for (key, list) in &self.dictionary.contexts {
                let key_lower = key.to_lowercase();
                if key_lower == token_lower || token_lower.contains(&key_lower) {
                    if list.iter().any(|s| s == word) {
                        score += 50;
                    }
                } else if self.is_similar(key, token) && list.iter().any(|s| s == word) {
                    score += 45;
                }
            }
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expander() -> KeywordExpander {
        KeywordExpander::builtin().unwrap()
    }

    #[test]
    fn test_builtin_dictionary_parses() {
        let e = expander();
        assert!(!e.dictionary().synonyms.is_empty());
        assert!(!e.dictionary().domains.is_empty());
        assert!(!e.dictionary().base_context.is_empty());
    }

    #[test]
    fn test_empty_query_rejected() {
        let e = expander();
        assert!(matches!(
            e.expand("   ", ExpansionMode::Basic),
            Err(KbError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_basic_mode_has_no_context() {
        let e = expander();
        let x = e.expand("税号", ExpansionMode::Basic).unwrap();
        assert_eq!(x.core_words, vec!["税号"]);
        assert!(x.synonyms.contains(&"纳税人识别号".to_string()));
        assert!(x.related_words.contains(&"发票抬头".to_string()));
        assert!(x.context_words.is_empty());
        assert_eq!(x.domains, vec!["亚信企业内部事务"]);
    }

    #[test]
    fn test_related_words_in_every_mode() {
        let e = expander();
        let basic = e.expand("报销 流程", ExpansionMode::Basic).unwrap();
        let full = e.expand("报销 流程", ExpansionMode::Comprehensive).unwrap();
        assert!(basic.related_words.contains(&"审批".to_string()));
        assert_eq!(basic.related_words, full.related_words);
    }

    #[test]
    fn test_comprehensive_includes_base_and_domain_context() {
        let e = expander();
        let x = e.expand("报销", ExpansionMode::Comprehensive).unwrap();
        assert_eq!(&x.context_words[..4], &["亚信数字", "公司", "员工", "部门"]);
        assert!(x.context_words.contains(&"财务合规".to_string()));
        assert!(x.context_words.len() <= MAX_CONTEXT_WORDS);

        let contextual = e.expand("报销", ExpansionMode::Contextual).unwrap();
        assert_eq!(contextual.context_words, x.context_words);
    }

    #[test]
    fn test_product_and_query_feature_context() {
        let e = expander();
        // no domain matches, so product (CBS) and billing feature words follow the base
        let x = e.expand("计费", ExpansionMode::Comprehensive).unwrap();
        assert!(x.domains.is_empty());
        assert_eq!(
            x.context_words,
            vec![
                "亚信数字", "公司", "员工", "部门", "计费准确", "账单管理", "收入保障", "财务对账",
                "财务合规", "成本控制",
            ]
        );
    }

    #[test]
    fn test_contextual_adds_context_words() {
        let e = expander();
        let x = e.expand("网管 运维", ExpansionMode::Contextual).unwrap();
        assert_eq!(x.domains, vec!["技术运维"]);
        assert_eq!(x.context_words.len(), MAX_CONTEXT_WORDS);
        assert_eq!(x.context_words[0], "亚信数字");
    }

    #[test]
    fn test_ranked_by_relevance() {
        let e = expander();
        let x = e.expand("运维", ExpansionMode::Basic).unwrap();
        assert_eq!(x.synonyms.last().map(String::as_str), Some("IPOSS"));
        assert!(x.synonyms[0].contains("运维"));
    }

    #[test]
    fn test_case_insensitive_product_names() {
        let e = expander();
        let x = e.expand("iposs", ExpansionMode::Basic).unwrap();
        assert!(x.synonyms.contains(&"智慧运维管理平台".to_string()));
        assert_eq!(x.domains, vec!["运营商产品解决方案"]);
    }

    #[test]
    fn test_deterministic_and_deduplicated() {
        let e = expander();
        let a = e.expand("财务 税务 财务", ExpansionMode::Contextual).unwrap();
        let b = e.expand("财务 税务 财务", ExpansionMode::Contextual).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.core_words, vec!["财务", "税务"]);

        let mut unique = a.synonyms.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), a.synonyms.len());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Basic".parse::<ExpansionMode>().unwrap(), ExpansionMode::Basic);
        assert_eq!(
            "contextual".parse::<ExpansionMode>().unwrap(),
            ExpansionMode::Contextual
        );
        assert!("wide".parse::<ExpansionMode>().is_err());
    }

    #[test]
    fn test_search_combinations() {
        let x = KeywordExpansion {
            original_query: "a b".to_string(),
            mode: ExpansionMode::Comprehensive,
            core_words: vec!["a".into(), "b".into()],
            domains: vec![],
            synonyms: vec!["s1".into(), "s2".into(), "s3".into(), "s4".into()],
            related_words: vec!["r1".into(), "r2".into(), "r3".into()],
            context_words: vec![],
        };
        let [precise, widened, full] = x.search_combinations();
        assert_eq!(precise, "a b");
        assert_eq!(widened, "r1 r2 a b s1");
        assert_eq!(full, "r1 r2 r3 a b s1 s2 s3");
    }
}
