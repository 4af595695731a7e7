//! Backend selection per document and tenant.
//!
//! Exactly one backend handles a document: the rule-based extractor by
//! default, a generative provider when the tenant is entitled to it, or
//! nobody when the text is too short and has to go back to OCR.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::extractors::RuleBasedExtractor;
use super::rules::{digits_only, validate_fiscal_id};
use super::ruleset::RuleStore;
use super::ExpenseExtractor;
use crate::ai::{AiClient, AiPlan, GenerativeExtractor};
use crate::error::{ExtractionError, GenerativeError, Result};
use crate::models::config::{AiProvider, EngineConfig};
use crate::models::document::Document;
use crate::models::expense::{Expense, ExpenseType};

/// What a tenant is entitled to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantPolicy {
    /// AI entitlement tier. `None` disables generative extraction.
    pub ai_plan: Option<AiPlan>,

    /// Provider override; the configured provider otherwise.
    pub provider: Option<AiProvider>,

    /// Types allowed to use AI. `None` allows every type.
    pub enabled_types: Option<HashSet<ExpenseType>>,

    /// Surface AI failures instead of falling back to rules.
    pub ai_only: bool,
}

impl TenantPolicy {
    /// Rule-based extraction only.
    pub fn rules_only() -> Self {
        Self::default()
    }

    /// Generative extraction on the given tier, rules as fallback.
    pub fn ai(plan: AiPlan) -> Self {
        Self {
            ai_plan: Some(plan),
            ..Self::default()
        }
    }

    pub fn with_provider(mut self, provider: AiProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_enabled_types(mut self, types: impl IntoIterator<Item = ExpenseType>) -> Self {
        self.enabled_types = Some(types.into_iter().collect());
        self
    }

    pub fn with_ai_only(mut self, ai_only: bool) -> Self {
        self.ai_only = ai_only;
        self
    }

    /// Whether `expense_type` goes to a generative backend.
    pub fn ai_enabled_for(&self, expense_type: ExpenseType) -> bool {
        self.ai_plan.is_some()
            && self
                .enabled_types
                .as_ref()
                .is_none_or(|types| types.contains(&expense_type))
    }
}

/// Backend chosen for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    RuleBased,
    Generative(AiProvider),
    /// Text is missing or too short; the document goes back to OCR.
    OcrResubmission,
}

/// Pick the backend for `document` under `policy`.
pub fn select_backend(document: &Document, policy: &TenantPolicy, config: &EngineConfig) -> Backend {
    let length = document.text_len();
    if length == 0 || length < config.extraction.min_text_length {
        return Backend::OcrResubmission;
    }

    if policy.ai_enabled_for(document.expense_type) {
        Backend::Generative(policy.provider.unwrap_or(config.ai.provider))
    } else {
        Backend::RuleBased
    }
}

/// Routes each document to one backend and normalizes the result.
#[derive(Clone)]
pub struct ExtractionRouter {
    rules: RuleBasedExtractor,
    clients: HashMap<AiProvider, AiClient>,
    config: EngineConfig,
    default_policy: TenantPolicy,
}

impl ExtractionRouter {
    /// Router over a rule-based extractor, without generative clients.
    pub fn new(rules: RuleBasedExtractor, config: EngineConfig) -> Self {
        Self {
            rules,
            clients: HashMap::new(),
            config,
            default_policy: TenantPolicy::default(),
        }
    }

    /// Build from configuration.
    ///
    /// Loads the built-in rules plus the configured rule file and creates a
    /// client for every provider that has credentials. The mock client is
    /// created only when it is the configured provider.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let store = RuleStore::with_defaults();
        if let Some(path) = &config.rules.path {
            let json = std::fs::read_to_string(path)?;
            let loaded = store.load_json(&json)?;
            info!("Loaded {} pattern rules from {}", loaded, path.display());
        }

        let mut router = Self::new(
            RuleBasedExtractor::new(std::sync::Arc::new(store)),
            config,
        );
        let mut providers = vec![AiProvider::OpenAi, AiProvider::Gemini];
        if router.config.ai.provider == AiProvider::Mock {
            providers.push(AiProvider::Mock);
        }
        for provider in providers {
            match AiClient::from_config(provider, &router.config.ai) {
                Ok(client) => {
                    router.clients.insert(provider, client);
                }
                Err(e) => debug!("Provider {} unavailable: {}", provider, e),
            }
        }
        Ok(router)
    }

    /// Register (or replace) the client of its provider.
    pub fn with_client(mut self, client: AiClient) -> Self {
        self.clients.insert(client.provider(), client);
        self
    }

    /// Policy used through [`ExpenseExtractor`].
    pub fn with_default_policy(mut self, policy: TenantPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn select_backend(&self, document: &Document, policy: &TenantPolicy) -> Backend {
        select_backend(document, policy, &self.config)
    }

    /// Extract `document` under `policy`.
    pub async fn extract_with_policy(
        &self,
        document: &Document,
        policy: &TenantPolicy,
    ) -> Result<Expense> {
        let document = self.with_region(document);
        let backend = self.select_backend(&document, policy);
        info!(
            "Routing {} document of company {} to {:?}",
            document.expense_type, document.company_id, backend
        );

        if backend == Backend::OcrResubmission {
            return Err(ExtractionError::TextUnavailable {
                length: document.text_len(),
            }
            .into());
        }
        if !document.expense_type.has_schema() {
            return Err(ExtractionError::Unclassified.into());
        }

        let mut expense = match backend {
            Backend::Generative(provider) => {
                match self.extract_generative(&document, policy, provider).await {
                    Ok(expense) => expense,
                    Err(e) if policy.ai_only => return Err(e),
                    Err(e) => {
                        warn!(
                            "Generative extraction with {} failed, falling back to rules: {}",
                            provider, e
                        );
                        self.rules.extract_document(&document)?
                    }
                }
            }
            _ => self.rules.extract_document(&document)?,
        };

        self.normalize_parties(&mut expense);
        Ok(expense)
    }

    async fn extract_generative(
        &self,
        document: &Document,
        policy: &TenantPolicy,
        provider: AiProvider,
    ) -> Result<Expense> {
        let client = self
            .clients
            .get(&provider)
            .cloned()
            .ok_or_else(|| GenerativeError::NotConfigured(provider.to_string()))?;

        GenerativeExtractor::new(
            client,
            policy.ai_plan.unwrap_or_default(),
            self.config.ai.max_input_chars,
        )
        .extract(document)
        .await
    }

    fn with_region<'a>(&self, document: &'a Document) -> Cow<'a, Document> {
        if document.region_code.trim().is_empty() {
            let mut owned = document.clone();
            owned.region_code = self.config.extraction.default_region.clone();
            Cow::Owned(owned)
        } else {
            Cow::Borrowed(document)
        }
    }

    /// Digits-only party ids. When so configured, an issuer name is kept
    /// only alongside an issuer id that passes the checksum.
    fn normalize_parties(&self, expense: &mut Expense) {
        let header = expense.header_mut();

        header.recipient_id = header
            .recipient_id
            .take()
            .map(|id| digits_only(&id))
            .filter(|id| !id.is_empty());

        let Some(issuer_id) = header
            .issuer_id
            .take()
            .map(|id| digits_only(&id))
            .filter(|id| !id.is_empty())
        else {
            if self.config.extraction.discard_invalid_issuer_id && header.issuer_name.is_some() {
                debug!("Discarding issuer name without an issuer id");
                header.issuer_name = None;
            }
            return;
        };

        if validate_fiscal_id(&issuer_id) {
            let name_missing = header
                .issuer_name
                .as_deref()
                .is_none_or(|name| name.trim().is_empty());
            if name_missing {
                header.issuer_name = Some(issuer_id.clone());
            }
            header.issuer_id = Some(issuer_id);
        } else if self.config.extraction.discard_invalid_issuer_id {
            warn!("Discarding issuer id {} that fails the CPF/CNPJ checksum", issuer_id);
            header.issuer_name = None;
        } else {
            header.issuer_id = Some(issuer_id);
        }
    }
}

impl Default for ExtractionRouter {
    fn default() -> Self {
        Self::new(RuleBasedExtractor::default(), EngineConfig::default())
    }
}

#[async_trait]
impl ExpenseExtractor for ExtractionRouter {
    async fn extract(&self, document: &Document) -> Result<Expense> {
        self.extract_with_policy(document, &self.default_policy).await
    }
}
